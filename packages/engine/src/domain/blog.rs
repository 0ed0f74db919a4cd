//! Insights blog: posts in memory, comments persisted to key-value storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::{KeyValueStore, StorageError};

/// Storage key holding the JSON comment list
pub const COMMENTS_KEY: &str = "igrowthic_comments";
pub const DEFAULT_AUTHOR: &str = "Admin User";
const WORDS_PER_MINUTE: usize = 200;
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("comment author is blank")]
    BlankAuthor,

    #[error("comment text is blank")]
    BlankText,

    #[error("post title is blank")]
    BlankTitle,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    /// HTML body
    pub content: String,
    pub author: String,
    pub date: String,
    pub category: String,
    pub read_time: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub category: String,
    pub excerpt: String,
    /// Plain text; newlines become `<br />`
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    pub author: String,
    pub text: String,
    pub date: String,
}

/// `"N min read"` at 200 words per minute, never below one minute.
pub fn read_time(content: &str) -> String {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// `Jan 5, 2026` style date. `month` is zero-based like `Date.getMonth()`.
pub fn format_date(year: i32, month: u32, day: u32) -> String {
    let name = MONTHS.get(month as usize).copied().unwrap_or("Jan");
    format!("{name} {day}, {year}")
}

fn post(id: u64, title: &str, excerpt: &str, content: &str, author: &str, date: &str, category: &str, minutes: u32) -> BlogPost {
    BlogPost {
        id,
        title: title.into(),
        excerpt: excerpt.into(),
        content: content.into(),
        author: author.into(),
        date: date.into(),
        category: category.into(),
        read_time: format!("{minutes} min read"),
    }
}

/// Posts the blog starts with, newest last.
pub fn seed_posts() -> Vec<BlogPost> {
    vec![
        post(
            1,
            "The AI Revolution in Short-Form Video: 2026 Edition",
            "Hyper-personalized content is the new baseline. Learn how iGROWTHIC uses generative AI to tailor every frame to the viewer's persona...",
            "<h2>The Shift to Short-Form</h2>\
<p>By 2026, short-form video has evolved. It's no longer just about 'stopping the scroll'; it's about algorithmic resonance. AI now predicts viewer fatigue before the first frame even plays.</p>\
<h3>The AI Hook Strategy</h3>\
<p>The first 1.5 seconds are now the only battleground. We utilize predictive eye-tracking heatmaps to ensure the viewer's focus is locked exactly where the conversion happens.</p>\
<h3>Platform Dominance</h3>\
<p>Instagram and YouTube are now integrated with mixed-reality layers. Short-form isn't just content; it's an immersive entry point into your brand's digital world.</p>",
            "Growth Strategy Team",
            "Jan 12, 2026",
            "Video Production",
            5,
        ),
        post(
            2,
            "Mastering Hyper-Local SEO for Real Estate in 2026",
            "Zero-click searches are dominating. Learn how to become the featured snippet for every high-value real estate query in your city.",
            "<h2>The Local Authority Framework</h2>\
<p>Real estate SEO in 2026 is about 'Answer Engine Optimization'. When a client asks their AI assistant for 'best investment property near me', your brand must be the only answer.</p>\
<h3>Virtual Neighborhood Ownership</h3>\
<p>Google's 2026 updates prioritize real-time social signals. Your local dominance is measured by how often people physically visit and digitally interact with your curated neighborhood tags.</p>",
            "SEO Dept",
            "Feb 10, 2026",
            "Real Estate",
            4,
        ),
        post(
            3,
            "The Death of Generic Branding",
            "In the age of AI saturation, authenticity is the only luxury. Discover how we build brands that feel human in a digital-first world.",
            "<h2>The Commoditization Trap</h2>\
<p>In 2026, AI can build a logo and a website in 10 seconds. What it can't build is a soul. Brand identity is now the only moat that can't be crossed by code.</p>\
<h3>Building Your Story</h3>\
<p>A brand is the sum of every interaction. In 2026, we focus on 'micro-moments' of delight that prove there's a human behind the screen.</p>",
            "Creative Director",
            "Mar 08, 2026",
            "Branding",
            6,
        ),
        post(
            4,
            "Founder-Led Growth: The B2B Playbook for 2026",
            "Enterprise buyers no longer talk to sales reps first. They follow founders. Learn how to scale your personal brand to 7 figures.",
            "<h2>The Human-to-Human Era</h2>\
<p>B2B marketing has shifted. Companies don't buy from companies; people buy from people they feel they've known for years via LinkedIn and professional networks.</p>\
<h3>The Influence Funnel</h3>\
<p>Your personal brand is your new business development department. By the time a client reaches out, they are already 80% through the sales cycle thanks to your consistent digital presence.</p>",
            "B2B Specialist",
            "Apr 05, 2026",
            "Growth Hacking",
            7,
        ),
    ]
}

#[derive(Clone, Debug)]
pub struct Blog {
    posts: Vec<BlogPost>,
}

impl Default for Blog {
    fn default() -> Self {
        Self { posts: seed_posts() }
    }
}

impl Blog {
    pub fn new(posts: Vec<BlogPost>) -> Self {
        Self { posts }
    }

    /// Newest first
    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn post(&self, id: u64) -> Option<&BlogPost> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Put a new post at the top of the list.
    pub fn publish(&mut self, draft: NewPost, id: u64, date: String) -> Result<&BlogPost, BlogError> {
        if draft.title.trim().is_empty() {
            return Err(BlogError::BlankTitle);
        }
        let post = BlogPost {
            id,
            read_time: read_time(&draft.content),
            content: draft.content.replace('\n', "<br />"),
            title: draft.title,
            excerpt: draft.excerpt,
            author: DEFAULT_AUTHOR.to_string(),
            date,
            category: draft.category,
        };
        self.posts.insert(0, post);
        Ok(&self.posts[0])
    }
}

/// Comments for every post, mirrored to storage after each change.
pub struct CommentBoard<S: KeyValueStore> {
    store: S,
    comments: Vec<Comment>,
}

impl<S: KeyValueStore> CommentBoard<S> {
    /// Read the stored list. Missing, unreadable or corrupt data starts empty.
    pub fn load(store: S) -> Self {
        let comments = match store.get(COMMENTS_KEY) {
            Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|err| {
                log::warn!("discarding corrupt comments: {err}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("comments unavailable: {err}");
                Vec::new()
            }
        };
        Self { store, comments }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Comments on one post, oldest first
    pub fn for_post(&self, post_id: u64) -> Vec<&Comment> {
        self.comments.iter().filter(|c| c.post_id == post_id).collect()
    }

    pub fn count_for(&self, post_id: u64) -> usize {
        self.comments.iter().filter(|c| c.post_id == post_id).count()
    }

    /// Append a comment. Author and text must not be blank; they are stored
    /// as typed. If storage rejects the write the comment is dropped again.
    pub fn add(&mut self, post_id: u64, author: &str, text: &str, id: u64, date: String) -> Result<Comment, BlogError> {
        if author.trim().is_empty() {
            return Err(BlogError::BlankAuthor);
        }
        if text.trim().is_empty() {
            return Err(BlogError::BlankText);
        }
        let comment = Comment {
            id,
            post_id,
            author: author.to_string(),
            text: text.to_string(),
            date,
        };
        self.comments.push(comment.clone());
        if let Err(err) = self.persist() {
            self.comments.pop();
            return Err(err);
        }
        Ok(comment)
    }

    /// Returns false if no comment had that id. A failed write leaves the
    /// list as it was.
    pub fn delete(&mut self, id: u64) -> Result<bool, BlogError> {
        let previous = self.comments.clone();
        self.comments.retain(|c| c.id != id);
        let removed = self.comments.len() != previous.len();
        if let Err(err) = self.persist() {
            self.comments = previous;
            return Err(err);
        }
        Ok(removed)
    }

    fn persist(&mut self) -> Result<(), BlogError> {
        let json = serde_json::to_string(&self.comments).map_err(StorageError::from)?;
        self.store.set(COMMENTS_KEY, &json)?;
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    fn stored(board: CommentBoard<MemoryStore>) -> Vec<Comment> {
        let json = board.into_store().get(COMMENTS_KEY).unwrap().unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn read_time_rounds_up_with_a_one_minute_floor() {
        assert_eq!(read_time(""), "1 min read");
        assert_eq!(read_time("one two three"), "1 min read");
        assert_eq!(read_time(&"w ".repeat(200)), "1 min read");
        assert_eq!(read_time(&"w ".repeat(201)), "2 min read");
        assert_eq!(read_time(&"w\n".repeat(1_000)), "5 min read");
    }

    #[test]
    fn dates_use_short_month_names() {
        assert_eq!(format_date(2026, 0, 12), "Jan 12, 2026");
        assert_eq!(format_date(2026, 11, 5), "Dec 5, 2026");
    }

    #[test]
    fn new_posts_go_first() {
        let mut blog = Blog::default();
        assert_eq!(blog.posts().len(), 4);
        let draft = NewPost {
            title: "Q3 Playbook".into(),
            category: "Strategy".into(),
            excerpt: "What changed".into(),
            content: "Line one\nLine two".into(),
        };
        let post = blog.publish(draft, 99, "May 1, 2026".into()).unwrap();
        assert_eq!(post.author, DEFAULT_AUTHOR);
        assert_eq!(post.content, "Line one<br />Line two");
        assert_eq!(post.read_time, "1 min read");
        assert_eq!(blog.posts()[0].id, 99);
        assert_eq!(blog.posts().len(), 5);
        assert!(blog.post(3).is_some());
    }

    #[test]
    fn untitled_posts_are_rejected() {
        let mut blog = Blog::default();
        assert!(matches!(blog.publish(NewPost::default(), 1, String::new()), Err(BlogError::BlankTitle)));
        assert_eq!(blog.posts().len(), 4);
    }

    #[test]
    fn comments_persist_on_every_change() {
        let mut board = CommentBoard::load(MemoryStore::new());
        board.add(1, "Ana", "Great read", 10, "Jan 1, 2026".into()).unwrap();
        board.add(2, "Raj", "Agreed", 11, "Jan 2, 2026".into()).unwrap();
        board.add(1, "Lee", "Saved this", 12, "Jan 3, 2026".into()).unwrap();

        assert_eq!(board.count_for(1), 2);
        assert_eq!(board.for_post(1)[1].author, "Lee");
        assert!(board.delete(10).unwrap());
        assert!(!board.delete(10).unwrap());

        let saved = stored(board);
        assert_eq!(saved.iter().map(|c| c.id).collect::<Vec<_>>(), vec![11, 12]);
    }

    #[test]
    fn stored_comments_are_read_back() {
        let json = r#"[{"id":5,"postId":3,"author":"Kim","text":"Nice","date":"Mar 9, 2026"}]"#;
        let board = CommentBoard::load(MemoryStore::new().with_entry(COMMENTS_KEY, json));
        assert_eq!(board.for_post(3).len(), 1);
        assert_eq!(board.comments()[0].author, "Kim");
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let board = CommentBoard::load(MemoryStore::new().with_entry(COMMENTS_KEY, "{not a list"));
        assert!(board.comments().is_empty());
    }

    #[test]
    fn blank_comments_are_rejected_and_not_stored() {
        let mut board = CommentBoard::load(MemoryStore::new());
        assert!(matches!(board.add(1, "  ", "hi", 1, String::new()), Err(BlogError::BlankAuthor)));
        assert!(matches!(board.add(1, "Ana", "\n", 2, String::new()), Err(BlogError::BlankText)));
        assert!(board.comments().is_empty());
        assert_eq!(board.into_store().get(COMMENTS_KEY).unwrap(), None);
    }

    /// Reads back a fixed list and rejects every write, like a full quota.
    struct FullStore(&'static str);

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(Some(self.0.to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("QuotaExceededError".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("QuotaExceededError".into()))
        }
    }

    #[test]
    fn failed_writes_leave_the_board_unchanged() {
        let json = r#"[{"id":5,"postId":3,"author":"Kim","text":"Nice","date":"Mar 9, 2026"}]"#;
        let mut board = CommentBoard::load(FullStore(json));

        let err = board.add(3, "Ana", "Great read", 6, "Mar 10, 2026".into()).unwrap_err();
        assert!(matches!(err, BlogError::Storage(StorageError::Write(_))));
        assert_eq!(board.count_for(3), 1);

        assert!(board.delete(5).is_err());
        assert_eq!(board.comments().len(), 1);
        assert_eq!(board.comments()[0].id, 5);
    }
}
