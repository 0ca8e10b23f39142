//! Identifiers and simple allocators for core entities.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Controller-local handle for an animation instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct InstId(pub u32);

/// Identity of a player façade. Targets use it to route capability queries
/// to a per-player override.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Identity of the object that owns a target; frame events are posted on its behalf.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

static NEXT_PLAYER: AtomicU32 = AtomicU32::new(1);

impl PlayerId {
    /// Allocate a process-unique player id. Players are created by async
    /// loads that do not share an allocator, so this one is global.
    pub fn next() -> Self {
        PlayerId(NEXT_PLAYER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Monotonic allocator for InstId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_inst: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_inst(&mut self) -> InstId {
        let id = InstId(self.next_inst);
        self.next_inst = self.next_inst.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
