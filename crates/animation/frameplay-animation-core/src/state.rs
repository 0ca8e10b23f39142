//! Per-instance playback state handed to an animation's `apply`.

use crate::error::AnimationError;
use crate::events::MAX_EVENTS_PER_FRAME;
use crate::ids::PlayerId;
use crate::value::{BlendMethod, InterpolationMethod};

/// One slot of the active event table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameEventInfo {
    pub id: String,
    pub is_active: bool,
    /// Pinned events survive frame changes until stopped or the track finishes.
    pub is_pinned: bool,
}

/// Playback state of a single animation instance.
#[derive(Clone, Debug)]
pub struct AnimationState {
    pub time: f32,
    pub playback_speed: f32,
    /// Frame to jump to on the next advance, -1 when none.
    pub forced_frame: i32,
    /// Cursor into the keyframe track where the next lookup starts.
    pub base_key_frame_index: usize,
    pub player: Option<PlayerId>,
    pub anim_instance_name: String,
    pub weight: f32,
    pub blend_in_out_weight: f32,
    pub blend_in_time: f32,
    pub blend_out_time: f32,
    pub interpolation_method: InterpolationMethod,
    pub blend_method: BlendMethod,
    pub is_reversed: bool,
    pub ignore_controller: bool,
    pub is_paused: bool,
    pub is_stopped: bool,
    events: [FrameEventInfo; MAX_EVENTS_PER_FRAME],
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            time: 0.0,
            playback_speed: 1.0,
            forced_frame: -1,
            base_key_frame_index: 0,
            player: None,
            anim_instance_name: String::new(),
            weight: 1.0,
            blend_in_out_weight: 1.0,
            blend_in_time: 0.0,
            blend_out_time: 0.0,
            interpolation_method: InterpolationMethod::default(),
            blend_method: BlendMethod::default(),
            is_reversed: false,
            ignore_controller: false,
            is_paused: false,
            is_stopped: false,
            events: std::array::from_fn(|_| FrameEventInfo::default()),
        }
    }
}

impl AnimationState {
    /// Default state labelled with the owning instance's name.
    pub fn for_instance(name: impl Into<String>) -> Self {
        Self {
            anim_instance_name: name.into(),
            ..Self::default()
        }
    }

    /// Weight actually used when applying: `weight * blend_in_out_weight`.
    #[inline]
    pub fn full_weight(&self) -> f32 {
        self.weight * self.blend_in_out_weight
    }

    /// Activate `id`. An already active event only has its pin flag raised.
    pub fn add_event(&mut self, id: &str, is_pinned: bool) -> Result<(), AnimationError> {
        if let Some(slot) = self.events.iter_mut().find(|e| e.is_active && e.id == id) {
            slot.is_pinned |= is_pinned;
            return Ok(());
        }
        match self.events.iter_mut().find(|e| !e.is_active) {
            Some(slot) => {
                slot.id.clear();
                slot.id.push_str(id);
                slot.is_active = true;
                slot.is_pinned = is_pinned;
                Ok(())
            }
            None => {
                log::error!(
                    "instance '{}': no free event slot for '{id}'",
                    self.anim_instance_name
                );
                Err(AnimationError::EventSlotsExhausted {
                    event_id: id.to_string(),
                    capacity: MAX_EVENTS_PER_FRAME,
                })
            }
        }
    }

    /// Deactivate `id`. Returns whether it was active.
    pub fn remove_event(&mut self, id: &str) -> bool {
        match self.events.iter_mut().find(|e| e.is_active && e.id == id) {
            Some(slot) => {
                slot.is_active = false;
                slot.is_pinned = false;
                true
            }
            None => false,
        }
    }

    /// Deactivate unpinned events, or every event when `include_pinned`.
    pub fn clear_events(&mut self, include_pinned: bool) {
        for slot in &mut self.events {
            if include_pinned || !slot.is_pinned {
                slot.is_active = false;
                slot.is_pinned = false;
            }
        }
    }

    pub fn active_events(&self) -> impl Iterator<Item = &FrameEventInfo> {
        self.events.iter().filter(|e| e.is_active)
    }

    pub fn is_event_active(&self, id: &str) -> bool {
        self.active_events().any(|e| e.id == id)
    }
}
