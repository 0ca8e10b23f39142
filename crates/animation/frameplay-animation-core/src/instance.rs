//! Animation instances: per-target playback of one shared animation.
//!
//! Each tick an instance advances its clock according to its [`PlayMode`],
//! derives the integer frame, refreshes the active frame events when the
//! frame changes, resolves its weight, applies the animation and finally
//! broadcasts the active events. Paused and stopped instances stay silent.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::animation::{Animation, SharedAnimation};
use crate::asset::AnimationAssetRef;
use crate::config::Config;
use crate::error::AnimationError;
use crate::events::{
    EventSink, FrameEventData, FrameEventType, ANIMATION_EVENT_TRACK_FINISHED,
    ANIMATION_EVENT_TRACK_STARTED,
};
use crate::ids::PlayerId;
use crate::player::AnimationPlayer;
use crate::state::AnimationState;
use crate::target::AnimationTarget;
use crate::value::{BlendMethod, InterpolationMethod};

/// What happens when playback runs past either end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Clamp at the end.
    #[default]
    Once,
    /// Wrap to the other end.
    Looping,
    /// Flip direction.
    PingPong,
}

impl PlayMode {
    pub fn name(&self) -> &'static str {
        match self {
            PlayMode::Once => "once",
            PlayMode::Looping => "looping",
            PlayMode::PingPong => "pingpong",
        }
    }
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "once" => Ok(PlayMode::Once),
            "looping" | "loop" => Ok(PlayMode::Looping),
            "pingpong" | "ping-pong" | "ping_pong" => Ok(PlayMode::PingPong),
            other => Err(format!("unknown play mode '{other}'")),
        }
    }
}

/// Initial settings for an instance created from host data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceCreationData {
    pub play_mode: PlayMode,
    pub blend_method: BlendMethod,
    pub weight: f32,
    /// Start stopped; `play()` begins playback.
    pub is_stopped: bool,
}

impl Default for InstanceCreationData {
    fn default() -> Self {
        Self {
            play_mode: PlayMode::Once,
            blend_method: BlendMethod::Mix,
            weight: 1.0,
            is_stopped: false,
        }
    }
}

/// Per-tick inputs a controller hands to each instance.
#[derive(Clone, Copy, Debug)]
pub struct TickContext<'a> {
    pub config: &'a Config,
    /// Weight the controller assigns this instance.
    pub controller_weight: f32,
}

pub struct AnimationInstance {
    name: String,
    pub(crate) state: AnimationState,
    play_mode: PlayMode,
    animation: Option<SharedAnimation>,
    asset: Option<AnimationAssetRef>,
    /// Last integer frame, -1 before the first advance.
    pub(crate) current_frame: i32,
    start_stopped: bool,
}

impl fmt::Debug for AnimationInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationInstance")
            .field("name", &self.name)
            .field("play_mode", &self.play_mode)
            .field("current_frame", &self.current_frame)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl AnimationInstance {
    /// Instance over an already resident animation; ready to play.
    pub fn new(name: impl Into<String>, animation: SharedAnimation) -> Self {
        let mut instance = Self::unloaded(name.into(), None);
        instance.animation = Some(animation);
        instance.initialize_playback();
        instance
    }

    /// Instance resolved later by [`load`](Self::load).
    pub fn from_asset(name: impl Into<String>, asset: AnimationAssetRef) -> Self {
        Self::unloaded(name.into(), Some(asset))
    }

    /// Apply host creation data. Takes effect on the next load for unloaded instances.
    pub fn with_creation_data(mut self, data: &InstanceCreationData) -> Self {
        self.play_mode = data.play_mode;
        self.state.blend_method = data.blend_method;
        self.state.weight = data.weight;
        self.start_stopped = data.is_stopped;
        if self.is_loaded() {
            self.state.is_stopped = data.is_stopped;
        }
        self
    }

    /// Copy sharing the same animation under a new name and player identity.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        let mut copy = Self {
            name: name.into(),
            state: self.state.clone(),
            play_mode: self.play_mode,
            animation: self.animation.clone(),
            asset: self.asset.clone(),
            current_frame: self.current_frame,
            start_stopped: self.start_stopped,
        };
        copy.state.anim_instance_name = copy.name.clone();
        if copy.is_loaded() {
            copy.state.player = Some(PlayerId::next());
        }
        copy
    }

    fn unloaded(name: String, asset: Option<AnimationAssetRef>) -> Self {
        Self {
            state: AnimationState::for_instance(name.as_str()),
            name,
            play_mode: PlayMode::Once,
            animation: None,
            asset,
            current_frame: -1,
            start_stopped: false,
        }
    }

    fn initialize_playback(&mut self) {
        self.state.time = 0.0;
        self.state.forced_frame = 0;
        self.state.is_paused = false;
        self.state.is_stopped = self.start_stopped;
        self.state.player = Some(PlayerId::next());
        self.current_frame = -1;
    }

    /// Resolve the asset reference. No-op when already loaded; an asset
    /// without animation data leaves the instance unloaded with a warning.
    pub async fn load(&mut self) -> Result<(), AnimationError> {
        if self.is_loaded() {
            return Ok(());
        }
        let Some(asset) = self.asset.clone() else {
            log::warn!("instance '{}' has no animation asset to load", self.name);
            return Ok(());
        };
        let loaded = asset.resolve().await?;
        match loaded.animation {
            Some(animation) => {
                self.animation = Some(animation);
                self.state.interpolation_method = loaded.interpolation_method;
                self.initialize_playback();
                log::debug!("instance '{}' loaded from '{}'", self.name, asset.name());
            }
            None => {
                log::warn!(
                    "asset '{}' for instance '{}' has no animation",
                    asset.name(),
                    self.name
                );
            }
        }
        Ok(())
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance, weigh, apply, then broadcast active events.
    pub fn update(
        &mut self,
        ctx: &TickContext<'_>,
        dt: f32,
        target: &mut dyn AnimationTarget,
        events: &mut dyn EventSink,
    ) {
        let Some(animation) = self.animation() else {
            return;
        };
        let advanced = self.advance(&animation, ctx.config, dt);

        if !self.state.ignore_controller {
            self.state.weight = ctx.controller_weight;
        }
        let is_playing = self.state.weight > ctx.config.negligible_weight;
        if is_playing && self.state.blend_in_time > 0.0 && self.state.blend_out_time > 0.0 {
            self.update_blend_in_out(&animation, ctx.config.frame_rate);
        }
        if is_playing && self.current_frame >= 0 {
            animation.apply(self.current_frame, &mut self.state, target);
        }

        if advanced {
            self.fire_events(target, events);
        }
    }

    /// Move the clock and frame forward. Returns false while frozen.
    fn advance(&mut self, animation: &Animation, config: &Config, dt: f32) -> bool {
        let state = &mut self.state;
        if (state.forced_frame == -1 && state.is_paused) || state.is_stopped {
            return false;
        }

        let frame_rate = animation.frame_rate(config.frame_rate);
        let duration = animation.duration_in_frames() / frame_rate;
        let dt = dt * state.playback_speed;

        if !state.is_reversed {
            state.time += dt;
            if state.time > duration {
                match self.play_mode {
                    PlayMode::Looping if duration > 0.0 => {
                        state.time -= (state.time / duration).floor() * duration;
                    }
                    PlayMode::PingPong => state.is_reversed = true,
                    _ => state.time = duration,
                }
            }
        } else {
            state.time -= dt;
            if state.time < 0.0 {
                match self.play_mode {
                    PlayMode::Looping => state.time = duration,
                    PlayMode::PingPong => state.is_reversed = false,
                    PlayMode::Once => state.time = 0.0,
                }
            }
        }

        if state.forced_frame >= 0 {
            state.time = state.forced_frame as f32 / frame_rate + config.forced_frame_epsilon;
            state.forced_frame = -1;
        }
        state.time = state.time.clamp(0.0, duration.max(0.0));

        let last_frame = animation.last_frame();
        let frame = ((state.time * frame_rate).floor() as i32).clamp(0, last_frame);
        if frame != self.current_frame {
            self.current_frame = frame;
            self.refresh_events(animation, frame);
        }
        true
    }

    /// Recompute the active event table for a newly reached frame.
    fn refresh_events(&mut self, animation: &Animation, frame: i32) {
        let state = &mut self.state;
        state.clear_events(false);
        // overflow is logged by add_event; playback carries on without the event
        if frame == 0 {
            state.clear_events(true);
            let _ = state.add_event(ANIMATION_EVENT_TRACK_STARTED, false);
        }
        // single-frame tracks end where they start
        if frame == animation.last_frame() {
            state.clear_events(true);
            let _ = state.add_event(ANIMATION_EVENT_TRACK_FINISHED, false);
        }

        for event in animation.frame_data().events_at(frame) {
            if !event.direction.matches(state.is_reversed) {
                continue;
            }
            match event.event_type {
                FrameEventType::Stop => {
                    state.remove_event(&event.id);
                }
                FrameEventType::Start => {
                    let _ = state.add_event(&event.id, true);
                }
                FrameEventType::OneTime => {
                    let _ = state.add_event(&event.id, false);
                }
            }
        }
    }

    fn update_blend_in_out(&mut self, animation: &Animation, frame_rate: f32) {
        let state = &mut self.state;
        let duration = animation.duration_seconds(frame_rate);
        let (elapsed, remaining) = if state.is_reversed {
            (duration - state.time, state.time)
        } else {
            (state.time, duration - state.time)
        };
        let blend_in = (elapsed / state.blend_in_time).clamp(0.0, 1.0);
        let blend_out = (remaining / state.blend_out_time).clamp(0.0, 1.0);
        state.blend_in_out_weight = blend_in.min(blend_out);
    }

    fn fire_events(&self, target: &dyn AnimationTarget, sink: &mut dyn EventSink) {
        let Some(owner) = target.owner() else {
            return;
        };
        for event in self.state.active_events() {
            sink.post(
                owner,
                FrameEventData {
                    track_name: self.name.clone(),
                    event_id: event.id.clone(),
                },
            );
        }
    }

    /// Rewind to the start of the current direction and resume.
    pub fn restart(&mut self, frame_rate: f32) {
        let duration = self
            .animation()
            .map_or(0.0, |a| a.duration_seconds(frame_rate));
        self.state.time = if self.state.is_reversed { duration } else { 0.0 };
        self.state.forced_frame = -1;
        self.state.is_stopped = false;
        self.state.is_paused = false;
        self.current_frame = -1;
    }

    /// Control surface for this instance; `None` until loaded.
    pub fn player(&mut self) -> Option<AnimationPlayer<'_>> {
        let animation = self.animation()?;
        Some(AnimationPlayer::new(self, animation))
    }

    /// Current animation snapshot.
    pub fn animation(&self) -> Option<Arc<Animation>> {
        self.animation.as_ref().map(SharedAnimation::snapshot)
    }

    pub fn shared_animation(&self) -> Option<&SharedAnimation> {
        self.animation.as_ref()
    }

    pub fn asset_ref(&self) -> Option<&AnimationAssetRef> {
        self.asset.as_ref()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Direct state access, e.g. to remove a pinned event.
    #[inline]
    pub fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    #[inline]
    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    #[inline]
    pub fn current_time(&self) -> f32 {
        self.state.time
    }

    /// Loaded, running, and not parked at the end of its direction of travel.
    pub fn is_playing(&self) -> bool {
        let Some(animation) = self.animation() else {
            return false;
        };
        if self.state.is_stopped || self.state.is_paused {
            return false;
        }
        match self.play_mode {
            PlayMode::Looping | PlayMode::PingPong => true,
            PlayMode::Once if self.state.is_reversed => self.current_frame != 0,
            PlayMode::Once => self.current_frame < animation.last_frame(),
        }
    }

    #[inline]
    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.play_mode = mode;
    }

    #[inline]
    pub fn is_reversed(&self) -> bool {
        self.state.is_reversed
    }

    pub fn set_is_reversed(&mut self, reversed: bool) {
        self.state.is_reversed = reversed;
    }

    #[inline]
    pub fn weight(&self) -> f32 {
        self.state.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.state.weight = weight.clamp(0.0, 1.0);
    }

    #[inline]
    pub fn blend_method(&self) -> BlendMethod {
        self.state.blend_method
    }

    pub fn set_blend_method(&mut self, method: BlendMethod) {
        self.state.blend_method = method;
    }

    #[inline]
    pub fn interpolation_method(&self) -> InterpolationMethod {
        self.state.interpolation_method
    }

    pub fn set_interpolation_method(&mut self, method: InterpolationMethod) {
        self.state.interpolation_method = method;
    }

    #[inline]
    pub fn ignores_controller(&self) -> bool {
        self.state.ignore_controller
    }

    pub fn set_ignore_controller(&mut self, ignore: bool) {
        self.state.ignore_controller = ignore;
    }

    /// Ramp durations in seconds; both must be positive to take effect.
    pub fn set_blend_in_out_times(&mut self, blend_in: f32, blend_out: f32) {
        self.state.blend_in_time = blend_in.max(0.0);
        self.state.blend_out_time = blend_out.max(0.0);
        if self.state.blend_in_time <= 0.0 || self.state.blend_out_time <= 0.0 {
            self.state.blend_in_out_weight = 1.0;
        }
    }
}
