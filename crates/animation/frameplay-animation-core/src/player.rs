//! Player façade: playback controls for one loaded instance.

use std::sync::Arc;

use crate::animation::Animation;
use crate::ids::PlayerId;
use crate::instance::AnimationInstance;

/// Borrowed control surface returned by [`AnimationInstance::player`].
///
/// Seeks are deferred: they set a forced frame that the next tick applies,
/// even while paused.
pub struct AnimationPlayer<'a> {
    instance: &'a mut AnimationInstance,
    animation: Arc<Animation>,
}

impl<'a> AnimationPlayer<'a> {
    pub(crate) fn new(instance: &'a mut AnimationInstance, animation: Arc<Animation>) -> Self {
        Self {
            instance,
            animation,
        }
    }

    /// Identity targets use to route capability queries.
    pub fn id(&self) -> Option<PlayerId> {
        self.instance.state.player
    }

    /// Take over from the controller at full weight and run.
    pub fn play(&mut self) {
        let state = &mut self.instance.state;
        state.ignore_controller = true;
        state.weight = 1.0;
        state.is_stopped = false;
        state.is_paused = false;
    }

    pub fn pause(&mut self, pause: bool) {
        self.instance.state.is_paused = pause;
    }

    /// Halt and rewind to frame 0.
    pub fn stop(&mut self) {
        let state = &mut self.instance.state;
        state.is_stopped = true;
        state.time = 0.0;
        state.forced_frame = -1;
        state.clear_events(true);
        self.instance.current_frame = 0;
    }

    pub fn reverse(&mut self, reverse: bool) {
        self.instance.state.is_reversed = reverse;
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        self.instance.state.playback_speed = speed;
    }

    pub fn jump_to_first_frame(&mut self) {
        self.jump_to_frame(0);
    }

    pub fn jump_to_last_frame(&mut self) {
        self.jump_to_frame(self.animation.last_frame());
    }

    /// Seek to `frame` on the next tick. Out-of-range frames are clamped.
    pub fn jump_to_frame(&mut self, frame: i32) {
        let last_frame = self.animation.last_frame();
        if !(0..=last_frame).contains(&frame) {
            log::warn!(
                "instance '{}': seek to frame {frame} outside [0, {last_frame}]",
                self.instance.name()
            );
        }
        self.instance.state.forced_frame = frame.clamp(0, last_frame);
    }

    pub fn duration_in_frames(&self) -> f32 {
        self.animation.duration_in_frames()
    }

    pub fn last_frame(&self) -> i32 {
        self.animation.last_frame()
    }

    /// Frame reached by the last tick.
    pub fn playing_frame(&self) -> i32 {
        self.instance.current_frame
    }

    pub fn is_paused(&self) -> bool {
        self.instance.state.is_paused
    }

    pub fn is_stopped(&self) -> bool {
        self.instance.state.is_stopped
    }

    pub fn is_reversed(&self) -> bool {
        self.instance.state.is_reversed
    }

    pub fn playback_speed(&self) -> f32 {
        self.instance.state.playback_speed
    }
}
