//! Animation resources.
//!
//! An [`Animation`] is immutable once built: one channel (a keyframe track or
//! a skeletal clip) plus the events authored on its frames. Instances share it
//! through [`SharedAnimation`], whose snapshot is swapped wholesale on edit.

pub mod skeletal;

use std::sync::{Arc, PoisonError, RwLock};

use glam::{Quat, Vec2, Vec3};

use crate::events::FrameData;
use crate::keyframe::KeyFrameTrack;
use crate::state::AnimationState;
use crate::target::AnimationTarget;
use crate::value::Transform;

pub use skeletal::{JointTrack, SamplingContext, SkeletalClip, TimedKey};

/// What an animation drives.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimationChannel {
    Bool(KeyFrameTrack<bool>),
    Integer(KeyFrameTrack<i32>),
    Float(KeyFrameTrack<f32>),
    Skew(KeyFrameTrack<Vec2>),
    Translation(KeyFrameTrack<Vec3>),
    Rotation(KeyFrameTrack<Quat>),
    Scale(KeyFrameTrack<Vec3>),
    Transform(KeyFrameTrack<Transform>),
    Skeletal(SkeletalClip),
}

impl AnimationChannel {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnimationChannel::Bool(_) => "bool",
            AnimationChannel::Integer(_) => "integer",
            AnimationChannel::Float(_) => "float",
            AnimationChannel::Skew(_) => "skew",
            AnimationChannel::Translation(_) => "translation",
            AnimationChannel::Rotation(_) => "rotation",
            AnimationChannel::Scale(_) => "scale",
            AnimationChannel::Transform(_) => "transform",
            AnimationChannel::Skeletal(_) => "skeletal",
        }
    }

    fn last_key_frame(&self) -> Option<i32> {
        Some(match self {
            AnimationChannel::Bool(t) => t.last_frame(),
            AnimationChannel::Integer(t) => t.last_frame(),
            AnimationChannel::Float(t) => t.last_frame(),
            AnimationChannel::Skew(t) => t.last_frame(),
            AnimationChannel::Translation(t) => t.last_frame(),
            AnimationChannel::Rotation(t) => t.last_frame(),
            AnimationChannel::Scale(t) => t.last_frame(),
            AnimationChannel::Transform(t) => t.last_frame(),
            AnimationChannel::Skeletal(_) => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    channel: AnimationChannel,
    frame_data: FrameData,
}

impl Animation {
    pub fn new(channel: AnimationChannel) -> Self {
        Self::with_frame_data(channel, FrameData::default())
    }

    pub fn with_frame_data(channel: AnimationChannel, frame_data: FrameData) -> Self {
        Self {
            channel,
            frame_data,
        }
    }

    #[inline]
    pub fn channel(&self) -> &AnimationChannel {
        &self.channel
    }

    #[inline]
    pub fn frame_data(&self) -> &FrameData {
        &self.frame_data
    }

    /// Last frame playback can reach.
    pub fn last_frame(&self) -> i32 {
        match &self.channel {
            AnimationChannel::Skeletal(clip) => clip.last_frame(),
            channel => channel.last_key_frame().unwrap_or(0),
        }
    }

    /// Length in frames.
    pub fn duration_in_frames(&self) -> f32 {
        match &self.channel {
            AnimationChannel::Skeletal(clip) => clip.duration_in_frames(),
            _ => (self.last_frame() + 1) as f32,
        }
    }

    /// Frames per second used to convert this animation's frames to time.
    /// Keyframe channels follow `configured`; skeletal clips keep their own grid.
    pub fn frame_rate(&self, configured: f32) -> f32 {
        match &self.channel {
            AnimationChannel::Skeletal(_) => SkeletalClip::FRAME_RATE,
            _ => configured,
        }
    }

    /// Length in seconds when keyframes play at `configured` frames per second.
    pub fn duration_seconds(&self, configured: f32) -> f32 {
        self.duration_in_frames() / self.frame_rate(configured)
    }

    /// Push the value at `frame` into `target`.
    ///
    /// Additive-style channels are scaled by the state's full weight:
    /// translation toward zero, rotation toward identity, scale and skew
    /// toward their neutral values. Transforms and scalars are set as is.
    pub fn apply(&self, frame: i32, state: &mut AnimationState, target: &mut dyn AnimationTarget) {
        let player = state.player;
        let weight = state.full_weight();
        match &self.channel {
            AnimationChannel::Bool(track) => {
                if let (Some(value), Some(t)) = (track.sample(frame, state), target.scalar_target(player)) {
                    t.animate_bool(value);
                }
            }
            AnimationChannel::Integer(track) => {
                if let (Some(value), Some(t)) = (track.sample(frame, state), target.scalar_target(player)) {
                    t.animate_integer(value);
                }
            }
            AnimationChannel::Float(track) => {
                if let (Some(value), Some(t)) = (track.sample(frame, state), target.scalar_target(player)) {
                    t.animate_float(value);
                }
            }
            AnimationChannel::Skew(track) => {
                if let (Some(value), Some(t)) = (track.sample(frame, state), target.skew_target(player)) {
                    t.animate_skew(Vec2::ZERO.lerp(value, weight));
                }
            }
            AnimationChannel::Translation(track) => {
                if let (Some(value), Some(t)) =
                    (track.sample(frame, state), target.transform_target(player))
                {
                    t.animate_translation(value * weight);
                }
            }
            AnimationChannel::Rotation(track) => {
                if let (Some(value), Some(t)) =
                    (track.sample(frame, state), target.transform_target(player))
                {
                    t.animate_rotation(Quat::IDENTITY.slerp(value, weight));
                }
            }
            AnimationChannel::Scale(track) => {
                if let (Some(value), Some(t)) =
                    (track.sample(frame, state), target.transform_target(player))
                {
                    t.animate_scale(Vec3::ONE.lerp(value, weight));
                }
            }
            AnimationChannel::Transform(track) => {
                if let (Some(value), Some(t)) =
                    (track.sample(frame, state), target.transform_target(player))
                {
                    t.animate_transform(value);
                }
            }
            AnimationChannel::Skeletal(clip) => clip.apply(frame, state, target),
        }
    }
}

/// Shared slot holding the current snapshot of an animation.
#[derive(Clone, Debug)]
pub struct SharedAnimation(Arc<RwLock<Arc<Animation>>>);

impl SharedAnimation {
    pub fn new(animation: Animation) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(animation))))
    }

    /// Current snapshot. Holders keep it alive across a concurrent replace.
    pub fn snapshot(&self) -> Arc<Animation> {
        let guard = self.0.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a new snapshot for every instance sharing this slot.
    pub fn replace(&self, animation: Animation) {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(animation);
    }

    pub fn ptr_eq(&self, other: &SharedAnimation) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Animation> for SharedAnimation {
    fn from(animation: Animation) -> Self {
        Self::new(animation)
    }
}
