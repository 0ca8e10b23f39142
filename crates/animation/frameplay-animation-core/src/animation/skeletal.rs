//! Runtime skeletal clips sampled per joint.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FRAME_RATE;
use crate::error::AnimationError;
use crate::skeleton::Skeleton;
use crate::state::AnimationState;
use crate::target::AnimationTarget;
use crate::value::{BlendMethod, Interpolate, Transform};

/// A joint channel key at `time` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedKey<T> {
    pub time: f32,
    pub value: T,
}

/// Keys for one joint. Empty channels are filled in at sampling time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JointTrack {
    #[serde(default)]
    pub translations: Vec<TimedKey<Vec3>>,
    #[serde(default)]
    pub rotations: Vec<TimedKey<Quat>>,
    #[serde(default)]
    pub scales: Vec<TimedKey<Vec3>>,
}

impl JointTrack {
    fn sort(&mut self) {
        self.translations.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.rotations.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.scales.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

/// Per-instance key cursors, one `[translation, rotation, scale]` triple per joint.
#[derive(Clone, Debug, Default)]
pub struct SamplingContext {
    cursors: Vec<[usize; 3]>,
}

impl SamplingContext {
    fn resize(&mut self, joints: usize) {
        self.cursors.resize(joints, [0; 3]);
    }
}

/// Compact clip: one [`JointTrack`] per skeleton joint, indexed like the skeleton.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkeletalClip {
    pub name: String,
    duration: f32,
    tracks: Vec<JointTrack>,
}

impl SkeletalClip {
    /// Clips are resampled on a fixed grid of this many frames per second,
    /// independent of the controller's configured rate.
    pub const FRAME_RATE: f32 = DEFAULT_FRAME_RATE;

    pub fn new(
        name: impl Into<String>,
        duration: f32,
        mut tracks: Vec<JointTrack>,
    ) -> Result<Self, AnimationError> {
        if duration.is_nan() || duration <= 0.0 {
            return Err(AnimationError::InvalidKeyFrame {
                reason: format!("skeletal clip duration must be positive, got {duration}"),
            });
        }
        for track in &mut tracks {
            track.sort();
        }
        Ok(Self {
            name: name.into(),
            duration,
            tracks,
        })
    }

    /// Clip length in seconds.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn duration_in_frames(&self) -> f32 {
        self.duration * Self::FRAME_RATE
    }

    pub fn last_frame(&self) -> i32 {
        (self.duration_in_frames().ceil() as i32 - 1).max(0)
    }

    /// Sample every joint at `ratio` of the clip into `out`.
    ///
    /// Channels without keys take the rest pose, or identity for additive
    /// layers so they contribute nothing.
    pub fn sample(
        &self,
        ratio: f32,
        context: &mut SamplingContext,
        skeleton: &Skeleton,
        blend_method: BlendMethod,
        out: &mut Vec<Transform>,
    ) {
        let time = ratio.clamp(0.0, 1.0) * self.duration;
        let joints = skeleton.num_joints();
        context.resize(joints);
        out.clear();
        for (index, joint) in skeleton.joints().iter().enumerate() {
            let rest = match blend_method {
                BlendMethod::Mix => joint.rest_pose,
                BlendMethod::Additive => Transform::IDENTITY,
            };
            let Some(track) = self.tracks.get(index) else {
                out.push(rest);
                continue;
            };
            let cursor = &mut context.cursors[index];
            out.push(Transform {
                translation: sample_keys(&track.translations, time, &mut cursor[0])
                    .unwrap_or(rest.translation),
                rotation: sample_keys(&track.rotations, time, &mut cursor[1])
                    .unwrap_or(rest.rotation),
                scale: sample_keys(&track.scales, time, &mut cursor[2]).unwrap_or(rest.scale),
            });
        }
    }

    /// Sample into the target skeleton's scratch pose for this instance.
    pub fn apply(&self, frame: i32, state: &mut AnimationState, target: &mut dyn AnimationTarget) {
        if frame < 0 {
            log::warn!(
                "instance '{}': skeletal sample at negative frame {frame}",
                state.anim_instance_name
            );
            return;
        }
        let Some(skeleton_target) = target.skeleton_target(state.player) else {
            return;
        };
        let parts = skeleton_target.skeleton_parts();
        if self.tracks.len() > parts.skeleton.num_joints() {
            log::warn!(
                "clip '{}' has {} tracks for a {}-joint skeleton; extra tracks ignored",
                self.name,
                self.tracks.len(),
                parts.skeleton.num_joints()
            );
        }
        let ratio = frame as f32 / self.duration_in_frames();
        let track = parts.runtime.track_mut(&state.anim_instance_name);
        self.sample(
            ratio,
            &mut track.context,
            parts.skeleton,
            state.blend_method,
            &mut track.locals,
        );
        track.blend_method = state.blend_method;
        track.weight = if state.is_stopped {
            0.0
        } else {
            state.full_weight()
        };
        track.active = true;
    }
}

/// Interpolated value at `time`, moving `cursor` to the bracketing key.
fn sample_keys<T: Interpolate>(keys: &[TimedKey<T>], time: f32, cursor: &mut usize) -> Option<T> {
    match keys {
        [] => return None,
        [only] => return Some(only.value),
        _ => {}
    }
    let last_interval = keys.len() - 2;
    let mut from = (*cursor).min(last_interval);
    while from < last_interval && keys[from + 1].time <= time {
        from += 1;
    }
    while from > 0 && keys[from].time > time {
        from -= 1;
    }
    *cursor = from;

    let (a, b) = (&keys[from], &keys[from + 1]);
    let span = b.time - a.time;
    let t = if span > 0.0 {
        ((time - a.time) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Some(T::interpolate(&a.value, &b.value, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key<T>(time: f32, value: T) -> TimedKey<T> {
        TimedKey { time, value }
    }

    #[test]
    fn sample_keys_clamps_outside_range() {
        let keys = vec![key(0.5, 1.0_f32), key(1.0, 3.0)];
        let mut cursor = 0;
        assert_eq!(sample_keys(&keys, 0.0, &mut cursor), Some(1.0));
        assert_eq!(sample_keys(&keys, 0.75, &mut cursor), Some(2.0));
        assert_eq!(sample_keys(&keys, 2.0, &mut cursor), Some(3.0));
    }

    #[test]
    fn clip_requires_positive_duration() {
        assert!(SkeletalClip::new("idle", 0.0, vec![]).is_err());
        let clip = SkeletalClip::new("idle", 0.5, vec![]).unwrap();
        assert_eq!(clip.duration_in_frames(), 30.0);
        assert_eq!(clip.last_frame(), 29);
    }
}
