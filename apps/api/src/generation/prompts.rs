// All LLM prompt constants for the generation facade.

use crate::generation::{Mode, Tone};

/// System prompt for idea generation.
pub const GENERATE_SYSTEM: &str = "You're PostPilot, an AI assistant specialized in LinkedIn \
    content generation. Create engaging, professional content that drives engagement.";

/// System prompt for post optimization.
pub const OPTIMIZE_SYSTEM: &str = "You're PostPilot, an AI assistant specialized in LinkedIn \
    content optimization. Help improve tone, clarity, and hooks while maintaining the \
    original message.";

pub fn system_prompt(mode: Mode) -> &'static str {
    match mode {
        Mode::Generate => GENERATE_SYSTEM,
        Mode::Optimize => OPTIMIZE_SYSTEM,
    }
}

/// Tone calibration line embedded in every prompt.
pub fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Neutral => "Keep a balanced, professional tone that's neither too casual nor too formal.",
        Tone::Viral => "Make it engaging, attention-grabbing, and shareable. Use hooks, emojis, and compelling language that drives engagement.",
        Tone::Professional => "Use a smart, authoritative tone that demonstrates expertise and builds credibility.",
        Tone::Concise => "Keep it brief and to the point. Focus on clarity and impact with minimal words.",
    }
}

/// Builds the user prompt for one generation call. The response contract is
/// a JSON array of strings — `parse_string_array` depends on it.
pub fn build_prompt(mode: Mode, tone: Tone, input: &str) -> String {
    let tone_line = tone_instruction(tone);
    match mode {
        Mode::Generate => format!(
            r#"Generate 5 LinkedIn post ideas based on these topics: "{input}"

Tone: {tone_line}

Rules:
- Each idea should be a compelling title/hook (1-2 sentences max)
- Make them engaging and LinkedIn-appropriate
- Focus on professional insights, lessons learned, or industry trends
- Return as a JSON array of strings."#
        ),
        Mode::Optimize => format!(
            r#"Improve this LinkedIn post by making it more engaging and compelling:

Original post:
"{input}"

Tone: {tone_line}

Rules:
- Make the hook more compelling
- Improve clarity and flow
- Keep it professional yet conversational
- Maintain the original message and key points
- Return 3 improved variations as a JSON array of strings."#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_prompt_embeds_topic_and_tone() {
        let p = build_prompt(Mode::Generate, Tone::Viral, "remote work");
        assert!(p.contains("remote work"));
        assert!(p.contains(tone_instruction(Tone::Viral)));
        assert!(p.contains("5 LinkedIn post ideas"));
        assert!(p.contains("JSON array of strings"));
    }

    #[test]
    fn test_optimize_prompt_embeds_original_post() {
        let p = build_prompt(Mode::Optimize, Tone::Concise, "My old post text");
        assert!(p.contains("My old post text"));
        assert!(p.contains("3 improved variations"));
        assert!(p.contains(tone_instruction(Tone::Concise)));
    }

    #[test]
    fn test_tone_instructions_are_distinct() {
        let tones = [Tone::Neutral, Tone::Viral, Tone::Professional, Tone::Concise];
        for (i, a) in tones.iter().enumerate() {
            for b in &tones[i + 1..] {
                assert_ne!(tone_instruction(*a), tone_instruction(*b));
            }
        }
    }
}
