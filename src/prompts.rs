//! Fixed instruction templates for persona and headshot generation.

pub const EXPERT_WITNESS_SYSTEM_PROMPT: &str = "\
You are an AI assistant that creates detailed expert witness personas for legal proceedings.

Create a realistic, credible expert witness profile that includes:
- Professional background and credentials
- Areas of expertise relevant to the case
- Communication style and key strengths
- Brief experience summary

Keep the response focused and professional for legal use.";

pub const AVATAR_IMAGE_PROMPT: &str = "\
Professional headshot portrait of an expert witness:
- Business formal attire (suit or professional clothing)
- Confident and trustworthy expression
- Clean, neutral background
- Professional lighting
- Photorealistic style
- Age-appropriate for their experience level
- Suitable for legal proceedings";

/// User-turn prompt embedding the normalized case description.
pub fn expert_witness_user_prompt(case_text: &str) -> String {
    format!(
        "Create an expert witness persona for the following case description:\n\
        \"{case_text}\"\n\n\
        Include:\n\
        - Name and title\n\
        - Education and credentials\n\
        - Years of experience\n\
        - Key areas of expertise\n\
        - Notable qualifications\n\
        - Professional strengths\n\n\
        Make it realistic and suitable for legal testimony."
    )
}

/// Image prompt for the headshot, optionally specialized with a short
/// persona summary.
pub fn avatar_image_prompt(persona_summary: &str) -> String {
    if persona_summary.trim().is_empty() {
        AVATAR_IMAGE_PROMPT.to_string()
    } else {
        format!("{AVATAR_IMAGE_PROMPT}\n\nPersona: {}", persona_summary.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_case_text() {
        let prompt = expert_witness_user_prompt("Medical malpractice involving surgical error");
        assert!(prompt.contains("Medical malpractice involving surgical error"));
        assert!(prompt.contains("legal testimony"));
    }

    #[test]
    fn test_image_prompt_with_summary() {
        let prompt = avatar_image_prompt("Dr. Jane Smith, orthopedic surgeon");
        assert!(prompt.starts_with(AVATAR_IMAGE_PROMPT));
        assert!(prompt.contains("Persona: Dr. Jane Smith"));
    }

    #[test]
    fn test_image_prompt_without_summary_is_base_prompt() {
        assert_eq!(avatar_image_prompt("   "), AVATAR_IMAGE_PROMPT);
    }
}
