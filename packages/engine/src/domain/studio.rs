//! Growth Studio content ideas.

use serde::{Deserialize, Serialize};

use crate::services::{GenerationError, GenerationRequest, TextGenerator};

const SYSTEM_INSTRUCTION: &str = "You are the Lead Content Strategist at iGROWTHIC. \
You specialize in viral, high-retention content hooks and structures for 2026.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignGoal {
    Viral,
    Sales,
    Engagement,
}

impl CampaignGoal {
    pub const ALL: [CampaignGoal; 3] = [CampaignGoal::Viral, CampaignGoal::Sales, CampaignGoal::Engagement];

    pub fn as_str(self) -> &'static str {
        match self {
            CampaignGoal::Viral => "Viral",
            CampaignGoal::Sales => "Sales",
            CampaignGoal::Engagement => "Engagement",
        }
    }

    /// Case-insensitive name lookup
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub title: String,
    pub hook: String,
    /// Content format, e.g. "Reels / Shorts"
    #[serde(rename = "type")]
    pub format: String,
}

impl ContentIdea {
    fn new(title: &str, hook: &str, format: &str) -> Self {
        Self {
            title: title.into(),
            hook: hook.into(),
            format: format.into(),
        }
    }
}

/// The three built-in ideas for a goal.
pub fn fallback_ideas(goal: CampaignGoal) -> Vec<ContentIdea> {
    match goal {
        CampaignGoal::Viral => vec![
            ContentIdea::new(
                "The 'Secret Hack' Reveal",
                "Did you know that 90% of [Niche] professionals are doing [Common Task] wrong?",
                "Short-form Video",
            ),
            ContentIdea::new(
                "Before vs After Transformation",
                "How we took [Problem] and turned it into [Result] in 24 hours.",
                "Reels / Shorts",
            ),
            ContentIdea::new(
                "Unpopular Opinion",
                "Stop doing [Popular Trend]. Here is why it's killing your brand growth.",
                "Educational Video",
            ),
        ],
        CampaignGoal::Sales => vec![
            ContentIdea::new(
                "The Scarcity Tease",
                "We only have 3 spots left for our [Service] rollout this quarter.",
                "Direct Response",
            ),
            ContentIdea::new(
                "The 'Why Now' Story",
                "The 2026 market shift is here. If you aren't using [Product], you're falling behind.",
                "Conversion Focus",
            ),
            ContentIdea::new(
                "Client Win Breakdown",
                "How [Client Name] hit [Big Number] using our 3-step framework.",
                "Case Study",
            ),
        ],
        CampaignGoal::Engagement => vec![
            ContentIdea::new(
                "Community Poll",
                "A vs B: Which [Niche Accessory] are you rocking this season?",
                "Interactive Story",
            ),
            ContentIdea::new(
                "AMA - Behind the Scenes",
                "Ever wondered how we build our [Process]? Ask me anything below.",
                "Community Building",
            ),
            ContentIdea::new(
                "The Daily Grind",
                "A day in the life of a [Niche] founder. The reality no one sees.",
                "Vlog",
            ),
        ],
    }
}

pub fn idea_request(niche: &str, goal: CampaignGoal) -> GenerationRequest {
    GenerationRequest::new(format!(
        "Generate 3 specific content ideas for a business in the \"{}\" niche with the campaign goal of \"{}\". \
Respond with a JSON array of objects with string fields \"title\", \"hook\" and \"type\".",
        niche.trim(),
        goal.as_str()
    ))
    .with_system_instruction(SYSTEM_INSTRUCTION)
    .json()
}

/// Parse a generator reply. An empty array counts as no answer.
pub fn parse_ideas(text: &str) -> Result<Vec<ContentIdea>, GenerationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Empty);
    }
    let ideas: Vec<ContentIdea> =
        serde_json::from_str(text).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    if ideas.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(ideas)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdeaSource {
    Remote,
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdeaBatch {
    pub source: IdeaSource,
    pub ideas: Vec<ContentIdea>,
}

/// Ideas for `niche`, or the goal's built-in ideas if generation fails.
/// A blank niche asks nothing and returns `None`.
pub async fn generate_ideas<G: TextGenerator>(generator: &G, niche: &str, goal: CampaignGoal) -> Option<IdeaBatch> {
    if niche.trim().is_empty() {
        return None;
    }
    let reply = generator.generate(&idea_request(niche, goal)).await;
    let batch = match reply.and_then(|text| parse_ideas(&text)) {
        Ok(ideas) => IdeaBatch {
            source: IdeaSource::Remote,
            ideas,
        },
        Err(err) => {
            log::warn!("studio idea generation failed ({err}), using built-in ideas");
            IdeaBatch {
                source: IdeaSource::Fallback,
                ideas: fallback_ideas(goal),
            }
        }
    };
    Some(batch)
}
