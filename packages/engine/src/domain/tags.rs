/// Services shown in the tag cloud, in drop order. Compact devices show a
/// prefix of this list.
pub const BRAND_TAGS: [&str; 22] = [
    "Social Media Management",
    "Branding & Strategy",
    "Video Production",
    "Performance Marketing",
    "UI/UX Design",
    "SEO Optimization",
    "Lead Generation",
    "Content Creation",
    "Analytics",
    "Meta Ads",
    "Google Ads",
    "App Development",
    "Web Design",
    "Influencer Marketing",
    "Growth Hacking",
    "Email Marketing",
    "Copywriting",
    "CRM Solutions",
    "E-commerce",
    "AI Strategy",
    "Market Research",
    "Brand Identity",
];

pub fn brand_tags() -> Vec<String> {
    BRAND_TAGS.iter().map(|s| s.to_string()).collect()
}
