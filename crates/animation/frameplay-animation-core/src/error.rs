//! Error types for animation playback and data handling

use serde::{Deserialize, Serialize};

/// Errors raised by the playback core.
///
/// Malformed per-frame input (negative frame lookups, out-of-range seeks) is
/// logged and ignored instead of surfacing here; these variants cover the
/// operations that hand a result back to the caller.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// A keyframe or event was addressed with a negative frame
    #[error("Negative frame index: {frame}")]
    NegativeFrame { frame: i32 },

    /// Keyframe data could not be accepted
    #[error("Invalid keyframe data: {reason}")]
    InvalidKeyFrame { reason: String },

    /// All per-instance event slots are in use
    #[error("Frame event slots exhausted (capacity {capacity}) while adding '{event_id}'")]
    EventSlotsExhausted { event_id: String, capacity: usize },

    /// The skeleton hierarchy is malformed
    #[error("Invalid skeleton: {reason}")]
    InvalidSkeleton { reason: String },

    /// Asset resolution failed
    #[error("Asset load failed for '{asset}': {reason}")]
    AssetLoad { asset: String, reason: String },

    /// An operation required a loaded animation
    #[error("Animation instance '{instance}' is not loaded")]
    NotLoaded { instance: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimationError {
    /// Check if playback can continue after this error
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NegativeFrame { .. }
                | Self::EventSlotsExhausted { .. }
                | Self::AssetLoad { .. }
                | Self::NotLoaded { .. }
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::NegativeFrame { .. } | Self::InvalidKeyFrame { .. } => "keyframe",
            Self::EventSlotsExhausted { .. } => "event",
            Self::InvalidSkeleton { .. } => "skeleton",
            Self::AssetLoad { .. } | Self::NotLoaded { .. } => "asset",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let err = AnimationError::EventSlotsExhausted {
            event_id: "footstep".to_string(),
            capacity: 16,
        };
        assert_eq!(err.category(), "event");
        assert!(err.is_recoverable());

        let err = AnimationError::InvalidSkeleton {
            reason: "joint 2 precedes its parent".to_string(),
        };
        assert_eq!(err.category(), "skeleton");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: AnimationError = json_err.into();
        assert!(matches!(err, AnimationError::Serialization { .. }));
        assert_eq!(err.category(), "serialization");
    }
}
