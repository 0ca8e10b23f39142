//! Frameplay Animation Core
//!
//! Frame-based playback and blending of keyframe and skeletal animations.
//! Hosts drive a [`AnimationController`] once per tick with a delta time, a
//! target exposing capabilities (transform, skew, scalar, skeleton) and an
//! [`EventSink`] for frame events. Controllers own [`AnimationInstance`]s,
//! each playing one shared [`Animation`] with its own clock, play mode,
//! direction and weight.

pub mod animation;
pub mod asset;
pub mod component;
pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod events;
pub mod ids;
pub mod instance;
pub mod keyframe;
pub mod mixer;
pub mod player;
pub mod skeleton;
pub mod state;
pub mod stored_animation;
pub mod target;
pub mod value;

// Re-exports for hosts
pub use animation::{Animation, AnimationChannel, SharedAnimation, SkeletalClip};
pub use asset::{
    AnimationAssetLoader, AnimationAssetRef, JsonAnimationAsset, LoadedAnimation,
    ResidentAnimationAsset,
};
pub use component::{AnimationComponent, TrackCreationInfo};
pub use config::{Config, NEGLIGIBLE_WEIGHT};
pub use controller::{AnimationController, ControllerKind};
pub use editor::AnimationEditor;
pub use error::AnimationError;
pub use events::{
    EventDispatcher, EventSink, FrameEvent, FrameEventData, FrameEventType, PlayDirection,
    ANIMATION_EVENT_TRACK_FINISHED, ANIMATION_EVENT_TRACK_STARTED, MAX_EVENTS_PER_FRAME,
};
pub use ids::{InstId, OwnerId, PlayerId};
pub use instance::{AnimationInstance, InstanceCreationData, PlayMode};
pub use keyframe::{KeyFrame, KeyFrameTrack};
pub use mixer::SkeletalMixer;
pub use player::AnimationPlayer;
pub use skeleton::{Joint, Skeleton, SkeletonComponent};
pub use state::AnimationState;
pub use stored_animation::{animation_to_json, parse_animation_json, parse_skeleton_json};
pub use target::{AnimationTarget, Capability, CapabilityKind};
pub use value::{BlendMethod, InterpolationMethod, Transform};

/// Result alias for fallible core operations.
pub type Result<T> = core::result::Result<T, AnimationError>;
