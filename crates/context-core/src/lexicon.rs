//! Injectable word lists for entity, category and sentiment detection.
//!
//! All matching is substring-based over lower-cased text. Case and
//! partial-word matches are accepted; that is a documented limitation of
//! the lexicon approach, not a bug. Defaults cover the retail grocery
//! domain (English and Chinese terms); tests substitute minimal tables.

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;

/// Word lists per entity kind, scanned against normalized turn content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityLexicon {
    pub products: Vec<String>,
    pub categories: Vec<String>,
    pub qualities: Vec<String>,
    pub price_terms: Vec<String>,
    pub quantity_terms: Vec<String>,
}

fn terms(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for EntityLexicon {
    fn default() -> Self {
        Self {
            products: terms(&[
                "apple", "banana", "orange", "grape", "watermelon", "strawberry", "milk",
                "yogurt", "bread", "rice", "noodles", "egg", "tomato", "potato", "cabbage",
                "cucumber", "苹果", "香蕉", "橙子", "葡萄", "西瓜", "草莓", "牛奶", "酸奶",
                "面包", "大米", "面条", "鸡蛋", "西红柿", "土豆", "白菜", "黄瓜",
            ]),
            categories: terms(&["fruit", "vegetable", "dairy", "staple", "水果", "蔬菜", "乳制品", "主食"]),
            qualities: terms(&[
                "fresh", "sweet", "ripe", "organic", "imported", "新鲜", "甜", "熟", "有机", "进口",
            ]),
            price_terms: terms(&[
                "price", "how much", "cheap", "expensive", "discount", "deal", "价格", "多少钱",
                "便宜", "贵", "折扣", "优惠",
            ]),
            quantity_terms: terms(&[
                "kilo", "pound", "box", "bag", "bottle", "dozen", "公斤", "斤", "箱", "袋", "瓶", "打",
            ]),
        }
    }
}

impl EntityLexicon {
    /// Returns every (kind, term) pair whose term occurs in `content`.
    ///
    /// Content is lower-cased before matching; lexicon terms are assumed
    /// to already be lower case.
    pub fn scan(&self, content: &str) -> Vec<(EntityKind, &str)> {
        let normalized = content.to_lowercase();
        let groups = [
            (EntityKind::Product, &self.products),
            (EntityKind::Category, &self.categories),
            (EntityKind::Quality, &self.qualities),
            (EntityKind::Price, &self.price_terms),
            (EntityKind::Quantity, &self.quantity_terms),
        ];
        let mut matches = Vec::new();
        for (kind, words) in groups {
            for word in words {
                if normalized.contains(word.as_str()) {
                    matches.push((kind, word.as_str()));
                }
            }
        }
        matches
    }

    /// Number of distinct lexicon hits in `content`, used for importance scoring.
    pub fn match_count(&self, content: &str) -> usize {
        self.scan(content).len()
    }
}

/// Maps product terms to a coarse preference category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLexicon {
    /// (category key, product terms) pairs. Category keys are the keys
    /// used in `UserProfile.preferences`.
    pub categories: Vec<(String, Vec<String>)>,
}

impl Default for CategoryLexicon {
    fn default() -> Self {
        Self {
            categories: vec![
                (
                    "水果".to_string(),
                    terms(&[
                        "apple", "banana", "orange", "grape", "watermelon", "strawberry", "苹果",
                        "香蕉", "橙子", "葡萄", "西瓜", "草莓",
                    ]),
                ),
                (
                    "蔬菜".to_string(),
                    terms(&["tomato", "potato", "cabbage", "cucumber", "西红柿", "土豆", "白菜", "黄瓜"]),
                ),
                (
                    "乳制品".to_string(),
                    terms(&["milk", "yogurt", "cheese", "牛奶", "酸奶", "奶酪"]),
                ),
                (
                    "主食".to_string(),
                    terms(&["bread", "rice", "noodles", "面包", "大米", "面条"]),
                ),
            ],
        }
    }
}

impl CategoryLexicon {
    /// Returns the category key for a product mention, if any term matches.
    pub fn categorize(&self, product: &str) -> Option<&str> {
        let normalized = product.to_lowercase();
        for (category, words) in &self.categories {
            if words.iter().any(|w| normalized.contains(w.as_str())) {
                return Some(category.as_str());
            }
        }
        None
    }
}

/// Positive/negative term lists for the satisfaction heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentLexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        Self {
            positive: terms(&[
                "good", "great", "thanks", "thank", "perfect", "helpful", "nice", "love",
                "好", "不错", "谢谢", "满意", "喜欢", "棒",
            ]),
            negative: terms(&[
                "bad", "wrong", "terrible", "useless", "slow", "hate", "awful",
                "不好", "差", "不对", "讨厌", "失望", "糟",
            ]),
        }
    }
}

impl SentimentLexicon {
    /// Counts positive and negative lexicon hits in `feedback`.
    pub fn hit_counts(&self, feedback: &str) -> (usize, usize) {
        let normalized = feedback.to_lowercase();
        let positive = self
            .positive
            .iter()
            .filter(|w| normalized.contains(w.as_str()))
            .count();
        let negative = self
            .negative
            .iter()
            .filter(|w| normalized.contains(w.as_str()))
            .count();
        (positive, negative)
    }
}

/// Intents that nudge a style preference upward regardless of satisfaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleNudges {
    /// (intent label, preference key) pairs.
    pub nudges: Vec<(String, String)>,
}

impl Default for StyleNudges {
    fn default() -> Self {
        Self {
            nudges: vec![
                ("recommendation".to_string(), "proactive_suggestions".to_string()),
                ("price_query".to_string(), "price_conscious".to_string()),
                ("comparison".to_string(), "detail_oriented".to_string()),
            ],
        }
    }
}

impl StyleNudges {
    /// Returns the preference key nudged by `intent`, if any.
    pub fn preference_for(&self, intent: &str) -> Option<&str> {
        self.nudges
            .iter()
            .find(|(label, _)| label == intent)
            .map(|(_, key)| key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_matches_products_and_price_terms() {
        let lexicon = EntityLexicon::default();
        let matches = lexicon.scan("How much is the Apple?");
        assert!(matches.contains(&(EntityKind::Product, "apple")));
        assert!(matches.iter().any(|(kind, _)| *kind == EntityKind::Price));
    }

    #[test]
    fn scan_matches_chinese_terms() {
        let lexicon = EntityLexicon::default();
        let matches = lexicon.scan("苹果多少钱一斤");
        assert!(matches.contains(&(EntityKind::Product, "苹果")));
        assert!(matches.contains(&(EntityKind::Price, "多少钱")));
        assert!(matches.contains(&(EntityKind::Quantity, "斤")));
    }

    #[test]
    fn categorize_maps_apple_to_fruit() {
        let lexicon = CategoryLexicon::default();
        assert_eq!(lexicon.categorize("apple"), Some("水果"));
        assert_eq!(lexicon.categorize("苹果"), Some("水果"));
        assert_eq!(lexicon.categorize("soap"), None);
    }

    #[test]
    fn sentiment_counts_both_polarities() {
        let lexicon = SentimentLexicon::default();
        assert_eq!(lexicon.hit_counts("great, thanks!"), (2, 0));
        assert_eq!(lexicon.hit_counts("bad and wrong"), (0, 2));
        assert_eq!(lexicon.hit_counts("ok"), (0, 0));
    }

    #[test]
    fn style_nudge_lookup() {
        let nudges = StyleNudges::default();
        assert_eq!(nudges.preference_for("recommendation"), Some("proactive_suggestions"));
        assert_eq!(nudges.preference_for("greeting"), None);
    }
}
