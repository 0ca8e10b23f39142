//! Accumulate-then-commit editing of keyframe animations.
//!
//! Edits never touch a live animation. [`AnimationEditor::commit`] builds a
//! fresh immutable [`Animation`]; [`AnimationEditor::commit_into`] swaps it
//! into a [`SharedAnimation`] so every instance picks it up on its next tick.

use std::collections::BTreeMap;

use crate::animation::{Animation, AnimationChannel, SharedAnimation};
use crate::error::AnimationError;
use crate::events::{FrameData, FrameEvent};
use crate::keyframe::{KeyFrame, KeyFrameTrack};
use crate::value::Interpolate;

#[derive(Clone, Debug)]
pub struct AnimationEditor<T> {
    keyframes: BTreeMap<i32, T>,
    frame_data: FrameData,
}

impl<T: Interpolate> Default for AnimationEditor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Interpolate> AnimationEditor<T> {
    pub fn new() -> Self {
        Self {
            keyframes: BTreeMap::new(),
            frame_data: FrameData::default(),
        }
    }

    /// Start from an existing track and its events.
    pub fn from_track(track: &KeyFrameTrack<T>, frame_data: &FrameData) -> Self {
        Self {
            keyframes: track.key_frames().iter().map(|kf| (kf.frame, kf.value)).collect(),
            frame_data: frame_data.clone(),
        }
    }

    pub fn add_key_frame(&mut self, frame: i32, value: T) -> Result<(), AnimationError> {
        if frame < 0 {
            return Err(AnimationError::NegativeFrame { frame });
        }
        self.keyframes.insert(frame, value);
        Ok(())
    }

    pub fn delete_key_frame(&mut self, frame: i32) -> bool {
        self.keyframes.remove(&frame).is_some()
    }

    pub fn clear_key_frames(&mut self) {
        self.keyframes.clear();
    }

    pub fn num_key_frames(&self) -> usize {
        self.keyframes.len()
    }

    pub fn add_frame_event(&mut self, frame: i32, event: FrameEvent) -> Result<(), AnimationError> {
        self.frame_data.add_event(frame, event)
    }

    pub fn delete_frame_event(&mut self, frame: i32, id: &str) -> bool {
        self.frame_data.delete_event(frame, id)
    }

    pub fn event_count(&self, frame: i32) -> usize {
        self.frame_data.event_count(frame)
    }

    pub fn event_id(&self, frame: i32, index: usize) -> Option<&str> {
        self.frame_data.event_id(frame, index)
    }

    pub fn clear_frame_data(&mut self) {
        self.frame_data.clear();
    }

    /// Build an immutable animation. `channel` picks the variant, e.g.
    /// `AnimationChannel::Translation`.
    pub fn commit(
        &self,
        channel: impl FnOnce(KeyFrameTrack<T>) -> AnimationChannel,
    ) -> Result<Animation, AnimationError> {
        let track = KeyFrameTrack::from_key_frames(
            self.keyframes
                .iter()
                .map(|(&frame, &value)| KeyFrame::new(frame, value)),
        )?;
        Ok(Animation::with_frame_data(
            channel(track),
            self.frame_data.clone(),
        ))
    }

    /// Commit and swap the result into `shared`.
    pub fn commit_into(
        &self,
        shared: &SharedAnimation,
        channel: impl FnOnce(KeyFrameTrack<T>) -> AnimationChannel,
    ) -> Result<(), AnimationError> {
        let animation = self.commit(channel)?;
        shared.replace(animation);
        Ok(())
    }
}
