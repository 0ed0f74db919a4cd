//! "Instant Growth" strategy advisor.
//!
//! A keyword table answers locally. The remote generator is tried first when
//! one is configured; anything it does wrong falls back to the table.

use crate::services::{GenerationRequest, TextGenerator};

const SYSTEM_INSTRUCTION: &str = "You are the Lead Growth Strategist at iGROWTHIC. \
Answer with exactly three actionable marketing pillars, one per line, each as 'Title: explanation'.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Niche {
    RealEstate,
    Tech,
    Lifestyle,
    General,
}

impl Niche {
    /// Checked in this order; the first category with a matching keyword wins.
    const KEYWORDS: [(Niche, &'static [&'static str]); 3] = [
        (Niche::RealEstate, &["real estate", "property", "home"]),
        (Niche::Tech, &["tech", "software", "saas", "app"]),
        (Niche::Lifestyle, &["lifestyle", "fashion", "gym", "health"]),
    ];

    /// Substring match on the lowercased input.
    pub fn classify(input: &str) -> Self {
        let query = input.trim().to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| query.contains(w)))
            .map_or(Niche::General, |(niche, _)| *niche)
    }

    pub fn tips(self) -> &'static [&'static str; 3] {
        match self {
            Niche::General => &[
                "Multi-Channel Synergy: Ensure your brand voice is consistent across Reels, LinkedIn, and Email.",
                "Data-Driven Iteration: Use weekly engagement analytics to cut underperforming content pillars immediately.",
                "Psychological Pricing: Structure your offers to emphasize high-value transformation over commodity cost.",
            ],
            Niche::RealEstate => &[
                "Hyper-Local Dominance: Create neighborhood-specific 'POV' reels showing the luxury lifestyle of specific pin codes.",
                "Zero-Click Authority: Optimize your content for Google's 'Search Generative Experience' by answering niche price-point queries directly.",
                "Agent Authenticity: Transition from 'Listing Focused' to 'Lifestyle Focused' content to build human trust.",
            ],
            Niche::Tech => &[
                "Founder-Led Authority: Scale the personal brand of your leadership to humanize complex technical solutions.",
                "Feature-to-Benefit Transformation: Use 3D motion graphics to visualize 'invisible' tech advantages in 15 seconds.",
                "Community Flywheel: Build a gated Discord or newsletter ecosystem that turns casual viewers into loyal product advocates.",
            ],
            Niche::Lifestyle => &[
                "Cinematic Narrative: Shift from products to stories. Show the aspiration, not just the item.",
                "Influencer Amplification: Use 'Whitelisted Ads' to run performance marketing through trusted creator profiles.",
                "Scarcity Engineering: Utilize drop-based marketing cycles to create artificial but effective engagement peaks.",
            ],
        }
    }
}

/// Tips for `input` from the local table, one per line.
pub fn local_strategy(input: &str) -> String {
    Niche::classify(input).tips().join("\n")
}

pub fn strategy_request(input: &str) -> GenerationRequest {
    GenerationRequest::new(format!(
        "Give three marketing pillars to grow a business described as: \"{}\".",
        input.trim()
    ))
    .with_system_instruction(SYSTEM_INSTRUCTION)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdviceSource {
    Remote,
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advice {
    pub source: AdviceSource,
    pub text: String,
}

impl Advice {
    /// Non-blank lines, trimmed
    pub fn pillars(&self) -> Vec<&str> {
        self.text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
    }
}

/// Ask `generator` once and fall back to the local table on any failure.
/// Blank input asks nothing and returns `None`.
pub async fn advise<G: TextGenerator>(generator: &G, input: &str) -> Option<Advice> {
    if input.trim().is_empty() {
        return None;
    }
    let advice = match generator.generate(&strategy_request(input)).await {
        Ok(text) if !text.trim().is_empty() => Advice {
            source: AdviceSource::Remote,
            text: text.trim().to_string(),
        },
        Ok(_) => {
            log::warn!("strategy generator returned nothing, using local tips");
            local_advice(input)
        }
        Err(err) => {
            log::warn!("strategy generator failed ({err}), using local tips");
            local_advice(input)
        }
    };
    Some(advice)
}

fn local_advice(input: &str) -> Advice {
    Advice {
        source: AdviceSource::Local,
        text: local_strategy(input),
    }
}
