//! Personalization configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;

/// Personalization tuning interface.
pub trait PersonalizationConfig: Send + Sync {
    /// Interactions required before any learning update runs.
    fn min_interactions(&self) -> usize;
    /// Step size for preference updates.
    fn learning_rate(&self) -> f32;
    /// Ring-buffer capacity of the per-user interaction history.
    fn history_capacity(&self) -> usize;
    /// Window of recent interactions for behavior-pattern updates.
    fn behavior_window(&self) -> usize;
    /// Window of recent interactions for interaction-style updates.
    fn style_window(&self) -> usize;
}

/// Personalization config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvPersonalizationConfig {
    pub min_interactions: usize,
    pub learning_rate: f32,
    pub history_capacity: usize,
    pub behavior_window: usize,
    pub style_window: usize,
}

impl PersonalizationConfig for EnvPersonalizationConfig {
    fn min_interactions(&self) -> usize {
        self.min_interactions
    }
    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
    fn history_capacity(&self) -> usize {
        self.history_capacity
    }
    fn behavior_window(&self) -> usize {
        self.behavior_window
    }
    fn style_window(&self) -> usize {
        self.style_window
    }
}

impl Default for EnvPersonalizationConfig {
    fn default() -> Self {
        Self {
            min_interactions: 5,
            learning_rate: 0.1,
            history_capacity: 1000,
            behavior_window: 20,
            style_window: 10,
        }
    }
}

impl EnvPersonalizationConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let min_interactions = env::var("SHOPBOT_MIN_INTERACTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.min_interactions);
        let learning_rate = env::var("SHOPBOT_LEARNING_RATE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.learning_rate);
        let history_capacity = env::var("SHOPBOT_HISTORY_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.history_capacity);
        let behavior_window = env::var("SHOPBOT_BEHAVIOR_WINDOW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.behavior_window);
        let style_window = env::var("SHOPBOT_STYLE_WINDOW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.style_window);
        Ok(Self {
            min_interactions,
            learning_rate,
            history_capacity,
            behavior_window,
            style_window,
        })
    }
}
