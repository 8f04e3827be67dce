//! Error types for the context/personalization subsystem.
//!
//! Most degraded conditions are handled internally (see [`ContextError`]
//! variants for the taxonomy); public operations return values rather than
//! errors wherever a neutral default exists.

use thiserror::Error;

/// Degraded-condition taxonomy for the context subsystem.
///
/// Nothing here should normally reach the orchestrator: providers being
/// down degrades to heuristic fallbacks, malformed feedback becomes
/// neutral satisfaction, capacity overruns evict silently and unknown
/// intents self-loop. The variants exist so internal code paths and logs
/// can name what they degraded from.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Embedding or intent provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Feedback text could not be interpreted: {0}")]
    MalformedFeedback(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("No dialogue transition for intent: {0}")]
    UnknownIntent(String),
}

/// Result type for subsystem operations; uses [`ContextError`].
pub type Result<T> = std::result::Result<T, ContextError>;
