//! Keyframe tracks and bracketing lookup.

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::state::AnimationState;
use crate::value::{Interpolate, InterpolationMethod};

/// A value pinned to an integer frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyFrame<T> {
    pub frame: i32,
    pub value: T,
}

impl<T> KeyFrame<T> {
    #[inline]
    pub fn new(frame: i32, value: T) -> Self {
        Self { frame, value }
    }
}

/// Keyframes of one channel, sorted ascending by frame once committed.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyFrameTrack<T> {
    keyframes: Vec<KeyFrame<T>>,
    dirty: bool,
}

impl<T> Default for KeyFrameTrack<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
            dirty: false,
        }
    }
}

impl<T: Interpolate> KeyFrameTrack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a committed track. Later entries win on duplicate frames.
    pub fn from_key_frames(
        keyframes: impl IntoIterator<Item = KeyFrame<T>>,
    ) -> Result<Self, AnimationError> {
        let mut track = Self::new();
        for kf in keyframes {
            track.add_key_frame(kf.frame, kf.value)?;
        }
        track.commit();
        Ok(track)
    }

    /// Insert or replace the keyframe at `frame`. Call [`commit`](Self::commit) before lookups.
    pub fn add_key_frame(&mut self, frame: i32, value: T) -> Result<(), AnimationError> {
        if frame < 0 {
            return Err(AnimationError::NegativeFrame { frame });
        }
        match self.keyframes.iter_mut().find(|kf| kf.frame == frame) {
            Some(existing) => existing.value = value,
            None => self.keyframes.push(KeyFrame::new(frame, value)),
        }
        self.dirty = true;
        Ok(())
    }

    pub fn delete_key_frame(&mut self, frame: i32) -> bool {
        let before = self.keyframes.len();
        self.keyframes.retain(|kf| kf.frame != frame);
        self.keyframes.len() != before
    }

    /// Restore frame order after edits.
    pub fn commit(&mut self) {
        if self.dirty {
            self.keyframes.sort_by_key(|kf| kf.frame);
            self.dirty = false;
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn key_frame_at(&self, index: usize) -> Option<&KeyFrame<T>> {
        self.keyframes.get(index)
    }

    #[inline]
    pub fn num_key_frames(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    pub fn key_frames(&self) -> &[KeyFrame<T>] {
        &self.keyframes
    }

    /// Frame of the last keyframe, 0 for an empty track.
    #[inline]
    pub fn last_frame(&self) -> i32 {
        self.keyframes.last().map_or(0, |kf| kf.frame)
    }

    pub fn clear(&mut self) {
        self.keyframes.clear();
        self.dirty = false;
    }

    /// Find the keyframes bracketing `frame`, walking from the state's cursor.
    ///
    /// The cursor is updated in place so sequential playback stays O(1).
    /// When the state is reversed the pair is returned later-first.
    pub fn find_key_frames(
        &self,
        frame: i32,
        state: &mut AnimationState,
    ) -> Option<(&KeyFrame<T>, &KeyFrame<T>)> {
        if frame < 0 {
            log::warn!(
                "instance '{}': keyframe lookup at negative frame {frame}",
                state.anim_instance_name
            );
            return None;
        }
        let keys = &self.keyframes;
        match keys.len() {
            0 => return None,
            1 => {
                state.base_key_frame_index = 0;
                return Some((&keys[0], &keys[0]));
            }
            _ => {}
        }

        let last_interval = keys.len() - 2;
        let mut from = state.base_key_frame_index.min(last_interval);
        while from < last_interval && keys[from + 1].frame <= frame {
            from += 1;
        }
        while from > 0 && keys[from].frame > frame {
            from -= 1;
        }
        state.base_key_frame_index = from;

        let (a, b) = (&keys[from], &keys[from + 1]);
        if state.is_reversed {
            Some((b, a))
        } else {
            Some((a, b))
        }
    }

    /// Value of the track at `frame`, honoring the state's interpolation method.
    pub fn sample(&self, frame: i32, state: &mut AnimationState) -> Option<T> {
        let (from, to) = self.find_key_frames(frame, state)?;
        if T::ALWAYS_STEP || state.interpolation_method == InterpolationMethod::Step {
            let reached_to = if state.is_reversed {
                frame <= to.frame
            } else {
                frame >= to.frame
            };
            return Some(if reached_to { to.value } else { from.value });
        }
        let span = (to.frame - from.frame) as f32;
        let t = if span == 0.0 {
            0.0
        } else {
            ((frame - from.frame) as f32 / span).clamp(0.0, 1.0)
        };
        Some(T::interpolate(&from.value, &to.value, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(frames: &[i32]) -> KeyFrameTrack<f32> {
        KeyFrameTrack::from_key_frames(frames.iter().map(|&f| KeyFrame::new(f, f as f32))).unwrap()
    }

    #[test]
    fn add_replaces_and_commit_sorts() {
        let mut t = KeyFrameTrack::new();
        t.add_key_frame(10, 1.0).unwrap();
        t.add_key_frame(0, 0.0).unwrap();
        t.add_key_frame(10, 2.0).unwrap();
        assert!(t.is_dirty());
        t.commit();
        assert_eq!(t.num_key_frames(), 2);
        assert_eq!(t.key_frame_at(0).unwrap().frame, 0);
        assert_eq!(t.key_frame_at(1).unwrap().value, 2.0);
        assert_eq!(t.last_frame(), 10);
    }

    #[test]
    fn negative_keyframe_is_rejected() {
        let mut t = KeyFrameTrack::<f32>::new();
        assert_eq!(
            t.add_key_frame(-1, 0.0),
            Err(AnimationError::NegativeFrame { frame: -1 })
        );
    }

    #[test]
    fn cursor_walks_backwards() {
        let t = track(&[0, 10, 20, 30]);
        let mut state = AnimationState::default();
        state.base_key_frame_index = 2;
        let (a, b) = t.find_key_frames(5, &mut state).unwrap();
        assert_eq!((a.frame, b.frame), (0, 10));
        assert_eq!(state.base_key_frame_index, 0);
    }

    #[test]
    fn coincident_frames_do_not_divide_by_zero() {
        let t = track(&[4]);
        let mut state = AnimationState::default();
        assert_eq!(t.sample(9, &mut state), Some(4.0));
    }
}
