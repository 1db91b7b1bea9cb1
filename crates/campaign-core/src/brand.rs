use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The founder persona used when a brief asks for the founder's voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FounderPersona {
    pub name: String,
    pub title: String,
    /// Short credential line, e.g. "15+ years of experience".
    pub experience: String,
}

/// Domain knowledge injected only when a brief targets `service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub service: String,
    pub knowledge: String,
    /// Image direction that replaces the default guidance for this service.
    #[serde(default)]
    pub image_direction: Option<String>,
}

/// Brand voice and knowledge base fed to the content generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub name: String,
    pub description: String,
    pub founder: FounderPersona,
    /// Footer appended verbatim to every post, one line each.
    pub contact_lines: Vec<String>,
    #[serde(default = "default_hashtag_count")]
    pub min_hashtags: u8,
    #[serde(default)]
    pub specialties: Vec<Specialty>,
}

fn default_hashtag_count() -> u8 {
    15
}

impl BrandProfile {
    /// Knowledge block for `service`, matched case-insensitively.
    #[must_use]
    pub fn specialty_for(&self, service: &str) -> Option<&Specialty> {
        let wanted = service.trim();
        self.specialties
            .iter()
            .find(|s| s.service.eq_ignore_ascii_case(wanted))
    }
}

/// Load and validate the brand profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brand_profile(path: &Path) -> Result<BrandProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_brand_profile(&content)
}

/// Parse and validate a brand profile from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_brand_profile(yaml: &str) -> Result<BrandProfile, ConfigError> {
    let profile: BrandProfile = serde_yaml::from_str(yaml)?;
    validate_brand_profile(&profile)?;
    Ok(profile)
}

fn validate_brand_profile(profile: &BrandProfile) -> Result<(), ConfigError> {
    if profile.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "brand name must be non-empty".to_string(),
        ));
    }

    if profile.founder.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "founder name must be non-empty".to_string(),
        ));
    }

    if profile.contact_lines.iter().all(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "at least one contact line is required".to_string(),
        ));
    }

    if profile.min_hashtags == 0 {
        return Err(ConfigError::Validation(
            "min_hashtags must be at least 1".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for specialty in &profile.specialties {
        if specialty.knowledge.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "specialty '{}' has empty knowledge",
                specialty.service
            )));
        }
        if !seen.insert(specialty.service.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate specialty service: '{}'",
                specialty.service
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "brand_test.rs"]
mod tests;
