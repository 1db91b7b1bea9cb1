//! Generation parameter pools shared by manual requests and the scheduler.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::campaign::CampaignBrief;

/// Service whose briefs receive the catering knowledge block.
pub const CATERING_SERVICE: &str = "Catering Menu";

pub const SERVICES: &[&str] = &[
    "Barefoot Beach Wedding",
    "Terra Noble Event Center",
    "Private Villa",
    "Wedding Party at Sea",
    "Catholic Church Wedding",
    "Vow Renewal",
    "Intimate Elopement",
    CATERING_SERVICE,
];

pub const AUDIENCES: &[&str] = &[
    "Luxury Seekers",
    "Budget-Conscious",
    "Adventure Enthusiasts",
    "Intimate/Elopement",
    "LGBTQ+ Couples",
];

pub const TONES: &[&str] = &[
    "Romantic & Heartfelt",
    "Modern & Chic",
    "Elegant & Timeless",
    "High-Energy Party",
    "Relaxed & Spiritual",
];

/// The empty entry means no live music is featured.
pub const MUSIC_OPTIONS: &[&str] = &[
    "",
    "Romantic Guitar Trio",
    "Mariachi Band",
    "10-Piece Mariachi Big Band",
    "Saxophone Sunset Set",
    "Live DJ & Percussion",
];

pub const AESTHETICS: &[&str] = &[
    "Golden Hour Glow",
    "Cinematic Drama",
    "Midnight Glow",
    "Bright & Airy",
    "Vintage Film",
];

/// Draws one value from each pool and flips the founder-voice coin.
///
/// # Panics
///
/// Panics if `founder_probability` is outside `0.0..=1.0`; configuration
/// loading rejects such values.
pub fn random_brief<R: Rng + ?Sized>(rng: &mut R, founder_probability: f64) -> CampaignBrief {
    CampaignBrief {
        service: pick(rng, SERVICES),
        audience: pick(rng, AUDIENCES),
        tone: pick(rng, TONES),
        music_choice: pick(rng, MUSIC_OPTIONS),
        aesthetic_profile: pick(rng, AESTHETICS),
        feature_founder: rng.random_bool(founder_probability),
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&str]) -> String {
    pool.choose(rng).copied().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn random_brief_draws_from_every_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let brief = random_brief(&mut rng, 0.5);
            assert!(SERVICES.contains(&brief.service.as_str()));
            assert!(AUDIENCES.contains(&brief.audience.as_str()));
            assert!(TONES.contains(&brief.tone.as_str()));
            assert!(MUSIC_OPTIONS.contains(&brief.music_choice.as_str()));
            assert!(AESTHETICS.contains(&brief.aesthetic_profile.as_str()));
        }
    }

    #[test]
    fn founder_probability_bounds_are_respected() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!((0..20).all(|_| !random_brief(&mut rng, 0.0).feature_founder));
        assert!((0..20).all(|_| random_brief(&mut rng, 1.0).feature_founder));
    }

    #[test]
    fn catering_is_in_service_pool() {
        assert!(SERVICES.contains(&CATERING_SERVICE));
    }

    #[test]
    fn music_pool_includes_no_music_choice() {
        assert!(MUSIC_OPTIONS.contains(&""));
    }
}
