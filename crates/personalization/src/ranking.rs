//! Personalized candidate scoring and adaptive response style.

use serde::{Deserialize, Serialize};

use crate::learning::{EXPLORATION, PRICE_SENSITIVITY};
use crate::profile::{InteractionStyle, UserProfile};

/// Price sensitivity above which cheaper candidates are favored.
const PRICE_SENSITIVE_ABOVE: f32 = 0.7;
/// Price sensitivity below which pricier candidates are favored.
const PRICE_SEEKING_BELOW: f32 = 0.3;
/// Exploration tendency above which novelty matters.
const EXPLORATION_ABOVE: f32 = 0.6;

/// A product candidate to be ranked for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    /// Coarse category key, matching `UserProfile.preferences` keys.
    pub category: String,
    /// Upstream relevance score in [0, 1].
    pub base_score: f32,
    /// Normalized price level in [0, 1] (0 = cheapest on offer).
    pub price_level: f32,
    /// Novelty for this user in [0, 1] (1 = never seen).
    pub novelty: f32,
}

/// Personalized score for one candidate, clamped to [0, 1].
///
/// `0.4 x base + 0.3 x category preference + 0.2 x price factor +
/// 0.1 x novelty factor`. The price factor inverts with price level for
/// price-sensitive users, aligns with it for price-seeking users and is
/// neutral otherwise; novelty only matters for exploratory users.
pub fn personalized_score(profile: &UserProfile, candidate: &Candidate) -> f32 {
    let category_preference = profile.preference(&candidate.category);

    let sensitivity = profile.behavior(PRICE_SENSITIVITY);
    let price_factor = if sensitivity > PRICE_SENSITIVE_ABOVE {
        1.0 - candidate.price_level
    } else if sensitivity < PRICE_SEEKING_BELOW {
        candidate.price_level
    } else {
        1.0
    };

    let novelty_factor = if profile.behavior(EXPLORATION) > EXPLORATION_ABOVE {
        candidate.novelty
    } else {
        0.5
    };

    let score = 0.4 * candidate.base_score
        + 0.3 * category_preference
        + 0.2 * price_factor
        + 0.1 * novelty_factor;
    score.clamp(0.0, 1.0)
}

/// How replies should be shaped for one user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResponseLength {
    Short,
    Medium,
    Long,
}

/// Response shaping hints derived from the learned interaction style.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdaptiveStyle {
    pub response_length: ResponseLength,
    pub include_details: bool,
    pub use_examples: bool,
    pub proactive_suggestions: bool,
}

impl AdaptiveStyle {
    /// Fixed mapping from interaction style to response shaping.
    pub fn for_style(style: InteractionStyle) -> Self {
        match style {
            InteractionStyle::Detailed => Self {
                response_length: ResponseLength::Long,
                include_details: true,
                use_examples: true,
                proactive_suggestions: true,
            },
            InteractionStyle::Brief => Self {
                response_length: ResponseLength::Short,
                include_details: false,
                use_examples: false,
                proactive_suggestions: false,
            },
            InteractionStyle::Balanced => Self {
                response_length: ResponseLength::Medium,
                include_details: true,
                use_examples: false,
                proactive_suggestions: true,
            },
            InteractionStyle::Neutral => Self {
                response_length: ResponseLength::Medium,
                include_details: true,
                use_examples: false,
                proactive_suggestions: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(base: f32, price: f32, novelty: f32) -> Candidate {
        Candidate {
            name: "apple".to_string(),
            category: "水果".to_string(),
            base_score: base,
            price_level: price,
            novelty,
        }
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let profile = UserProfile::new("u1");
        for base in [0.0, 0.5, 1.0] {
            for price in [0.0, 1.0] {
                let s = personalized_score(&profile, &candidate(base, price, 1.0));
                assert!((0.0..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn preferred_category_outranks_neutral_one() {
        let mut profile = UserProfile::new("u1");
        profile.adjust_preference("水果", 0.4);
        let fruit = candidate(0.5, 0.5, 0.5);
        let mut soap = fruit.clone();
        soap.category = "日用品".to_string();
        assert!(
            personalized_score(&profile, &fruit) > personalized_score(&profile, &soap)
        );
    }

    #[test]
    fn price_sensitive_users_favor_cheap_candidates() {
        let mut profile = UserProfile::new("u1");
        profile
            .behavior_patterns
            .insert(PRICE_SENSITIVITY.to_string(), 0.9);
        let cheap = candidate(0.5, 0.1, 0.5);
        let pricey = candidate(0.5, 0.9, 0.5);
        assert!(
            personalized_score(&profile, &cheap) > personalized_score(&profile, &pricey)
        );
    }

    #[test]
    fn price_seeking_users_favor_premium_candidates() {
        let mut profile = UserProfile::new("u1");
        profile
            .behavior_patterns
            .insert(PRICE_SENSITIVITY.to_string(), 0.1);
        let cheap = candidate(0.5, 0.1, 0.5);
        let pricey = candidate(0.5, 0.9, 0.5);
        assert!(
            personalized_score(&profile, &pricey) > personalized_score(&profile, &cheap)
        );
    }

    #[test]
    fn novelty_only_matters_for_exploratory_users() {
        let mut settled = UserProfile::new("u1");
        settled
            .behavior_patterns
            .insert(EXPLORATION.to_string(), 0.2);
        let novel = candidate(0.5, 0.5, 1.0);
        let familiar = candidate(0.5, 0.5, 0.0);
        assert_eq!(
            personalized_score(&settled, &novel),
            personalized_score(&settled, &familiar)
        );

        let mut explorer = UserProfile::new("u2");
        explorer
            .behavior_patterns
            .insert(EXPLORATION.to_string(), 0.9);
        assert!(
            personalized_score(&explorer, &novel) > personalized_score(&explorer, &familiar)
        );
    }

    #[test]
    fn adaptive_style_mapping_is_fixed() {
        let detailed = AdaptiveStyle::for_style(InteractionStyle::Detailed);
        assert_eq!(detailed.response_length, ResponseLength::Long);
        assert!(detailed.include_details && detailed.use_examples);

        let brief = AdaptiveStyle::for_style(InteractionStyle::Brief);
        assert_eq!(brief.response_length, ResponseLength::Short);
        assert!(!brief.include_details && !brief.proactive_suggestions);

        let neutral = AdaptiveStyle::for_style(InteractionStyle::Neutral);
        assert_eq!(neutral.response_length, ResponseLength::Medium);
        assert!(!neutral.proactive_suggestions);
    }
}
