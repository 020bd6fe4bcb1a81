//! Deterministic mock generator, used when no API key is configured.
//!
//! Returns the first N canned variants for the requested tone so local
//! development and demos behave identically run to run.

use async_trait::async_trait;

use crate::generation::{Mode, PostGenerator, Tone};
use crate::llm_client::LlmError;

const NEUTRAL_IDEAS: &[&str] = &[
    "5 lessons I learned after 3 years in tech leadership",
    "The skills that matter most for career growth in 2025",
    "Why I changed my approach to team management",
    "What I wish I knew before starting my first startup",
    "The biggest misconception about remote work productivity",
];

const VIRAL_IDEAS: &[&str] = &[
    "🚨 The #1 mistake I see new developers make (and how to avoid it)",
    "Plot twist: The 'soft skills' everyone ignores are actually the most valuable",
    "I was doing LinkedIn completely wrong for 3 years. Here's what I learned:",
    "This one change increased my productivity by 300% (no joke)",
    "🔥 Hot take: Your degree doesn't matter as much as you think",
];

const PROFESSIONAL_IDEAS: &[&str] = &[
    "Strategic insights from scaling a team from 5 to 50 engineers",
    "Data-driven approaches to improving software delivery performance",
    "Leadership principles that drive sustainable growth in tech organizations",
    "How to build resilient systems: Lessons from production incidents",
    "The evolution of engineering culture in high-growth startups",
];

const CONCISE_IDEAS: &[&str] = &[
    "3 rules for better code reviews",
    "Remote work: 5 tools that changed everything",
    "Why I quit my 6-figure job",
    "The best career advice in 10 words",
    "1 habit that doubled my productivity",
];

const NEUTRAL_REWRITES: &[&str] = &[
    "After 5 years in tech, I've learned that success isn't just about coding skills",
    "Here's what I discovered about building effective remote teams",
    "The career pivot that changed my perspective on leadership",
];

const VIRAL_REWRITES: &[&str] = &[
    "🚨 This career mistake cost me $50K (and how you can avoid it)",
    "Plot twist: Quitting my 6-figure job was the best decision I ever made",
    "I was doing LinkedIn completely wrong for 3 years. Here's what I learned:",
];

const PROFESSIONAL_REWRITES: &[&str] = &[
    "Strategic lessons from transitioning to senior leadership in technology",
    "How data-driven decision making transformed our engineering organization",
    "Building sustainable growth: Insights from scaling technical teams",
];

const CONCISE_REWRITES: &[&str] = &[
    "Left my job. Started a company. Here's why:",
    "5 years in tech. 3 key lessons:",
    "Remote work changed everything. Here's how:",
];

fn variants_for(mode: Mode, tone: Tone) -> &'static [&'static str] {
    match (mode, tone) {
        (Mode::Generate, Tone::Neutral) => NEUTRAL_IDEAS,
        (Mode::Generate, Tone::Viral) => VIRAL_IDEAS,
        (Mode::Generate, Tone::Professional) => PROFESSIONAL_IDEAS,
        (Mode::Generate, Tone::Concise) => CONCISE_IDEAS,
        (Mode::Optimize, Tone::Neutral) => NEUTRAL_REWRITES,
        (Mode::Optimize, Tone::Viral) => VIRAL_REWRITES,
        (Mode::Optimize, Tone::Professional) => PROFESSIONAL_REWRITES,
        (Mode::Optimize, Tone::Concise) => CONCISE_REWRITES,
    }
}

pub struct MockGenerator;

#[async_trait]
impl PostGenerator for MockGenerator {
    async fn generate(
        &self,
        mode: Mode,
        tone: Tone,
        _input: &str,
    ) -> Result<Vec<String>, LlmError> {
        let variants = variants_for(mode, tone)
            .iter()
            .take(mode.variant_count())
            .map(|s| s.to_string())
            .collect();
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_returns_five_variants() {
        let variants = MockGenerator
            .generate(Mode::Generate, Tone::Neutral, "any topic")
            .await
            .unwrap();
        assert_eq!(variants.len(), 5);
        assert!(variants.iter().all(|v| !v.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_optimize_returns_three_variants() {
        let variants = MockGenerator
            .generate(Mode::Optimize, Tone::Professional, "my post")
            .await
            .unwrap();
        assert_eq!(variants.len(), 3);
    }

    #[tokio::test]
    async fn test_tone_selects_distinct_sets() {
        let viral = MockGenerator
            .generate(Mode::Generate, Tone::Viral, "x")
            .await
            .unwrap();
        let concise = MockGenerator
            .generate(Mode::Generate, Tone::Concise, "x")
            .await
            .unwrap();
        assert_ne!(viral, concise);
    }

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let a = MockGenerator
            .generate(Mode::Generate, Tone::Viral, "x")
            .await
            .unwrap();
        let b = MockGenerator
            .generate(Mode::Generate, Tone::Viral, "x")
            .await
            .unwrap();
        assert_eq!(a, b);
    }
}
