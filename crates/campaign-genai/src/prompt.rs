//! Prompt assembly for the content generator.

use std::fmt::Write as _;

use campaign_core::{BrandProfile, CampaignBrief};

const DEFAULT_IMAGE_DIRECTION: &str = "Professional photo taken with the most expensive camera \
in the world, 8k, hyper-realistic, the scene matching the service and venue perfectly.";

/// Builds the system instruction for one brief.
///
/// Combines the brand voice and call-to-action footer, specialty knowledge
/// when the brief's service has any, formatting rules, and the exact JSON
/// shape the model must return.
#[must_use]
pub fn build_system_prompt(brief: &CampaignBrief, brand: &BrandProfile) -> String {
    let mut prompt = String::with_capacity(4096);

    let _ = writeln!(
        prompt,
        "You are a world-class marketing copywriter for \"{}\", {}.",
        brand.name, brand.description
    );
    prompt.push('\n');
    let _ = writeln!(prompt, "Brand Voice: {}", brief.tone);
    let _ = writeln!(
        prompt,
        "Key Persona: {} ({}, {}).",
        brand.founder.name, brand.founder.title, brand.founder.experience
    );
    let _ = writeln!(prompt, "Target Audience: {}", brief.audience);
    let _ = writeln!(prompt, "Selected Service: {}", brief.service);
    if brief.feature_founder {
        let _ = writeln!(
            prompt,
            "Voice: YES, feature the founder. Write in the first person as {} ({}). \
             Use \"I\" and \"my\". Share personal insights from {}. Be warm, authoritative, and welcoming.",
            brand.founder.name, brand.founder.title, brand.founder.experience
        );
    } else {
        let _ = writeln!(
            prompt,
            "Voice: write in the \"{}\" brand voice (we/us). Professional, elegant, and inviting.",
            brand.name
        );
    }

    prompt.push_str("\n[MUSIC ATMOSPHERE]\n");
    if brief.has_music() {
        let _ = writeln!(
            prompt,
            "The event features live music: \"{}\". Explicitly describe how this musical choice \
             creates an unforgettable, engaging atmosphere.",
            brief.music_choice.trim()
        );
    } else {
        prompt.push_str("No specific music selected.\n");
    }

    let specialty = brand.specialty_for(&brief.service);
    if let Some(specialty) = specialty {
        let _ = writeln!(
            prompt,
            "\n[{} KNOWLEDGE]\nUse the following details and be specific about them:\n{}",
            specialty.service.to_uppercase(),
            specialty.knowledge.trim()
        );
    }

    prompt.push_str("\nCRITICAL REQUIREMENTS:\n");
    prompt.push_str(
        "1. PERSUASION: Use strong, emotional, and persuasive keywords \
         (e.g. \"Exclusive\", \"Bespoke\", \"Unforgettable\", \"Stress-Free\").\n",
    );
    prompt.push_str(
        "2. CALL TO ACTION: every post MUST end with exactly these contact lines:\n",
    );
    for line in brand.contact_lines.iter().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(prompt, "   {}", line.trim());
    }
    let _ = writeln!(
        prompt,
        "3. VIRALITY: include at least {} trending wedding/travel hashtags at the end of every post.",
        brand.min_hashtags
    );
    prompt.push_str(
        "4. FORMATTING: use DOUBLE SPACING (two newlines) between the main content, \
         the call to action, and the hashtags.\n",
    );

    let image_direction = if let Some(direction) =
        specialty.and_then(|s| s.image_direction.as_deref())
    {
        direction.trim().to_string()
    } else if brief.has_music() {
        format!(
            "Wedding reception scene featuring {}, cinematic lighting, photorealistic, 8k, joyful atmosphere.",
            brief.music_choice.trim()
        )
    } else {
        DEFAULT_IMAGE_DIRECTION.to_string()
    };
    let _ = writeln!(prompt, "5. IMAGE PROMPT: {image_direction}");
    if !brief.aesthetic_profile.trim().is_empty() {
        let _ = writeln!(
            prompt,
            "   Visual aesthetic for the image prompt: {}.",
            brief.aesthetic_profile.trim()
        );
    }

    prompt.push_str(
        "\nTask: generate marketing content for 5 platforms plus 1 image prompt.\n\
         Return JSON ONLY, no markdown formatting, with exactly these string fields:\n\
         {\n\
         \x20 \"facebook\": \"Post text...\",\n\
         \x20 \"instagram\": \"Caption text...\",\n\
         \x20 \"reels\": \"Script/Idea...\",\n\
         \x20 \"tiktok\": \"Script/Idea...\",\n\
         \x20 \"youtube\": \"Video Title + Description...\",\n\
         \x20 \"imagePrompt\": \"Detailed AI image prompt...\"\n\
         }\n",
    );

    prompt
}

/// Builds the single user turn sent alongside the system instruction.
#[must_use]
pub fn build_user_prompt(brief: &CampaignBrief) -> String {
    format!(
        "Generate campaign for {} targeting {}.",
        brief.service, brief.audience
    )
}

#[cfg(test)]
mod tests {
    use campaign_core::{FounderPersona, Specialty};

    use super::*;

    fn brand() -> BrandProfile {
        BrandProfile {
            name: "Vallarta Vows".to_string(),
            description: "a wedding agency".to_string(),
            founder: FounderPersona {
                name: "Robin".to_string(),
                title: "Founder".to_string(),
                experience: "15+ years".to_string(),
            },
            contact_lines: vec!["WhatsApp: +1 555".to_string(), "vows.example".to_string()],
            min_hashtags: 15,
            specialties: vec![Specialty {
                service: "Catering Menu".to_string(),
                knowledge: "Taco Night menu with Churros.".to_string(),
                image_direction: Some("Close-up glossy food photography".to_string()),
            }],
        }
    }

    fn brief(service: &str, music: &str, founder: bool) -> CampaignBrief {
        CampaignBrief {
            service: service.to_string(),
            audience: "Luxury Seekers".to_string(),
            tone: "Elegant & Timeless".to_string(),
            music_choice: music.to_string(),
            aesthetic_profile: "Golden Hour Glow".to_string(),
            feature_founder: founder,
        }
    }

    #[test]
    fn catering_brief_includes_specialty_knowledge_and_food_direction() {
        let prompt = build_system_prompt(&brief("Catering Menu", "", false), &brand());
        assert!(prompt.contains("Taco Night menu with Churros."));
        assert!(prompt.contains("Close-up glossy food photography"));
    }

    #[test]
    fn non_specialty_brief_omits_specialty_knowledge() {
        let prompt = build_system_prompt(&brief("Private Villa", "", false), &brand());
        assert!(!prompt.contains("Taco Night"));
        assert!(prompt.contains("most expensive camera"));
    }

    #[test]
    fn music_brief_describes_atmosphere_and_reception_scene() {
        let prompt = build_system_prompt(&brief("Private Villa", "Mariachi Band", false), &brand());
        assert!(prompt.contains("live music: \"Mariachi Band\""));
        assert!(prompt.contains("Wedding reception scene featuring Mariachi Band"));
    }

    #[test]
    fn founder_voice_switches_to_first_person() {
        let with = build_system_prompt(&brief("Vow Renewal", "", true), &brand());
        let without = build_system_prompt(&brief("Vow Renewal", "", false), &brand());
        assert!(with.contains("first person as Robin"));
        assert!(without.contains("brand voice (we/us)"));
    }

    #[test]
    fn formatting_rules_and_footer_are_always_present() {
        let prompt = build_system_prompt(&brief("Vow Renewal", "", false), &brand());
        assert!(prompt.contains("DOUBLE SPACING"));
        assert!(prompt.contains("at least 15"));
        assert!(prompt.contains("   WhatsApp: +1 555"));
        assert!(prompt.contains("\"imagePrompt\""));
        assert!(prompt.contains("Golden Hour Glow"));
    }

    #[test]
    fn user_prompt_names_service_and_audience() {
        assert_eq!(
            build_user_prompt(&brief("Vow Renewal", "", false)),
            "Generate campaign for Vow Renewal targeting Luxury Seekers."
        );
    }
}
