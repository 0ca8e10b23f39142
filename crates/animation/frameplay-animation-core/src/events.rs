//! Frame events: authored per-frame markers, the per-tick broadcast record,
//! and a queueing dispatcher hosts can hand to controllers as the sink.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::ids::OwnerId;

/// Stream name frame events are broadcast on.
pub const ANIMATION_TRACK_PLAYBACK_STREAM: &str = "animation.track_playback";
/// Raised when playback lands on frame 0.
pub const ANIMATION_EVENT_TRACK_STARTED: &str = "animation.track_started";
/// Raised when playback lands on the last frame.
pub const ANIMATION_EVENT_TRACK_FINISHED: &str = "animation.track_finished";
/// Capacity of the per-instance active event table.
pub const MAX_EVENTS_PER_FRAME: usize = 16;

/// Lifetime of an authored event once playback reaches its frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameEventType {
    /// Active until the frame changes.
    #[default]
    OneTime,
    /// Stays active (pinned) until a matching `Stop` or the last frame.
    Start,
    /// Deactivates the matching `Start` event.
    Stop,
}

/// Playback direction an authored event responds to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayDirection {
    Forward,
    Backward,
    #[default]
    Any,
}

impl PlayDirection {
    #[inline]
    pub fn matches(&self, is_reversed: bool) -> bool {
        match self {
            PlayDirection::Any => true,
            PlayDirection::Forward => !is_reversed,
            PlayDirection::Backward => is_reversed,
        }
    }
}

/// An event authored on a frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEvent {
    pub id: String,
    #[serde(rename = "type", default)]
    pub event_type: FrameEventType,
    #[serde(default)]
    pub direction: PlayDirection,
}

impl FrameEvent {
    pub fn new(id: impl Into<String>, event_type: FrameEventType, direction: PlayDirection) -> Self {
        Self {
            id: id.into(),
            event_type,
            direction,
        }
    }

    /// One-shot event that fires in both directions.
    pub fn one_time(id: impl Into<String>) -> Self {
        Self::new(id, FrameEventType::OneTime, PlayDirection::Any)
    }
}

/// All events authored on one frame. Only frames with at least one event are stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub frame: i32,
    pub events: Vec<FrameEvent>,
}

/// Authored events of an animation, sorted by frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameData {
    frames: Vec<Frame>,
}

impl FrameData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `event` to `frame`, replacing an event with the same id.
    pub fn add_event(&mut self, frame: i32, event: FrameEvent) -> Result<(), AnimationError> {
        if frame < 0 {
            return Err(AnimationError::NegativeFrame { frame });
        }
        let index = match self.frames.binary_search_by_key(&frame, |f| f.frame) {
            Ok(index) => index,
            Err(index) => {
                self.frames.insert(
                    index,
                    Frame {
                        frame,
                        events: Vec::new(),
                    },
                );
                index
            }
        };
        let events = &mut self.frames[index].events;
        if let Some(existing) = events.iter_mut().find(|e| e.id == event.id) {
            *existing = event;
            return Ok(());
        }
        if events.len() >= MAX_EVENTS_PER_FRAME {
            return Err(AnimationError::EventSlotsExhausted {
                event_id: event.id,
                capacity: MAX_EVENTS_PER_FRAME,
            });
        }
        events.push(event);
        Ok(())
    }

    /// Remove the event `id` from `frame`; empty frames are dropped.
    pub fn delete_event(&mut self, frame: i32, id: &str) -> bool {
        let Ok(index) = self.frames.binary_search_by_key(&frame, |f| f.frame) else {
            return false;
        };
        let events = &mut self.frames[index].events;
        let before = events.len();
        events.retain(|e| e.id != id);
        let removed = events.len() != before;
        if events.is_empty() {
            self.frames.remove(index);
        }
        removed
    }

    pub fn events_at(&self, frame: i32) -> &[FrameEvent] {
        match self.frames.binary_search_by_key(&frame, |f| f.frame) {
            Ok(index) => &self.frames[index].events,
            Err(_) => &[],
        }
    }

    pub fn event_count(&self, frame: i32) -> usize {
        self.events_at(frame).len()
    }

    pub fn event_id(&self, frame: i32, index: usize) -> Option<&str> {
        self.events_at(frame).get(index).map(|e| e.id.as_str())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Sort, merge duplicate frames and drop empty ones after bulk loading.
    pub fn normalize(&mut self) {
        let mut frames = std::mem::take(&mut self.frames);
        frames.sort_by_key(|f| f.frame);
        for frame in frames {
            match self.frames.last_mut() {
                Some(last) if last.frame == frame.frame => last.events.extend(frame.events),
                _ => self.frames.push(frame),
            }
        }
        self.frames.retain(|f| !f.events.is_empty());
    }
}

/// Broadcast record for an active event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEventData {
    /// Instance name of the track that raised the event.
    pub track_name: String,
    pub event_id: String,
}

/// Receiver of frame event broadcasts, passed into each controller update.
pub trait EventSink {
    fn post(&mut self, owner: OwnerId, event: FrameEventData);
}

/// Discards everything.
impl EventSink for () {
    fn post(&mut self, _owner: OwnerId, _event: FrameEventData) {}
}

impl EventSink for Vec<(OwnerId, FrameEventData)> {
    fn post(&mut self, owner: OwnerId, event: FrameEventData) {
        self.push((owner, event));
    }
}

/// Event listener trait for handling broadcast frame events
pub trait EventListener: Send + Sync {
    /// Handle a frame event posted by `owner`
    fn on_event(&mut self, owner: OwnerId, event: &FrameEventData);

    /// Restrict delivery to a single owner. Default: every owner.
    fn owner_filter(&self) -> Option<OwnerId> {
        None
    }

    /// Check if this listener wants events from `owner`
    fn is_interested_in(&self, owner: OwnerId) -> bool {
        self.owner_filter().map_or(true, |filter| filter == owner)
    }
}

/// Queues posted events and hands them to listeners on `process_queue`.
pub struct EventDispatcher {
    listeners: Vec<Box<dyn EventListener>>,
    event_queue: Vec<(OwnerId, FrameEventData)>,
    max_queue_size: usize,
    enabled: bool,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            event_queue: Vec::new(),
            max_queue_size: 1024,
            enabled: true,
        }
    }

    pub fn add_listener(&mut self, listener: Box<dyn EventListener>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Deliver all queued events to interested listeners and clear the queue.
    pub fn process_queue(&mut self) {
        let events = std::mem::take(&mut self.event_queue);
        for (owner, event) in events {
            for listener in &mut self.listeners {
                if listener.is_interested_in(owner) {
                    listener.on_event(owner, &event);
                }
            }
        }
    }

    pub fn queue_len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn clear_queue(&mut self) {
        self.event_queue.clear();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear_queue();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_max_queue_size(&mut self, size: usize) {
        self.max_queue_size = size;
        self.event_queue.truncate(size);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventDispatcher {
    fn post(&mut self, owner: OwnerId, event: FrameEventData) {
        if !self.enabled {
            return;
        }
        if self.event_queue.len() < self.max_queue_size {
            self.event_queue.push((owner, event));
        } else {
            log::warn!(
                "frame event queue full ({}), dropping '{}' from '{}'",
                self.max_queue_size,
                event.event_id,
                event.track_name
            );
        }
    }
}

/// Logs every event at debug level.
#[derive(Default)]
pub struct LoggingEventListener {
    owner: Option<OwnerId>,
}

impl LoggingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_owner(owner: OwnerId) -> Self {
        Self { owner: Some(owner) }
    }
}

impl EventListener for LoggingEventListener {
    fn on_event(&mut self, owner: OwnerId, event: &FrameEventData) {
        log::debug!(
            "[{}] owner {:?}: {} on '{}'",
            ANIMATION_TRACK_PLAYBACK_STREAM,
            owner,
            event.event_id,
            event.track_name
        );
    }

    fn owner_filter(&self) -> Option<OwnerId> {
        self.owner
    }
}

/// Shared, inspectable log of received events.
pub type EventLog = Arc<Mutex<Vec<FrameEventData>>>;

/// Collects events into an [`EventLog`] the caller keeps a handle to.
pub struct CollectingEventListener {
    owner: Option<OwnerId>,
    events: EventLog,
}

impl CollectingEventListener {
    pub fn new(owner: Option<OwnerId>) -> (Self, EventLog) {
        let events = EventLog::default();
        (
            Self {
                owner,
                events: Arc::clone(&events),
            },
            events,
        )
    }
}

impl EventListener for CollectingEventListener {
    fn on_event(&mut self, _owner: OwnerId, event: &FrameEventData) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(_) => log::error!("event log poisoned, dropping '{}'", event.event_id),
        }
    }

    fn owner_filter(&self) -> Option<OwnerId> {
        self.owner
    }
}
