//! Animation controllers: own the instances driving one target and resolve
//! how much each contributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AnimationError;
use crate::events::EventSink;
use crate::ids::{IdAllocator, InstId};
use crate::instance::{AnimationInstance, TickContext};
use crate::mixer::SkeletalMixer;
use crate::target::AnimationTarget;

/// Weighting strategy of a controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Desired weights are normalized so they sum to one.
    #[default]
    Direct,
    /// Absolute weights; skeletal poses are composed by the mixer.
    Blend,
}

impl ControllerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerKind::Direct => "direct",
            ControllerKind::Blend => "blend",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControllerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(ControllerKind::Direct),
            "blend" => Ok(ControllerKind::Blend),
            other => Err(format!("unknown controller type '{other}'")),
        }
    }
}

#[derive(Debug)]
struct ControllerEntry {
    id: InstId,
    instance: AnimationInstance,
    /// Caller-requested weight; only Direct controllers distinguish it from `weight`.
    desired_weight: f32,
    weight: f32,
}

#[derive(Debug)]
pub struct AnimationController {
    config: Config,
    kind: ControllerKind,
    entries: Vec<ControllerEntry>,
    ids: IdAllocator,
    mixer: SkeletalMixer,
    frame: u64,
    frame_time: f32,
}

impl AnimationController {
    pub fn new(kind: ControllerKind, config: Config) -> Self {
        let mixer = SkeletalMixer::with_threshold(config.blend_threshold);
        Self {
            config,
            kind,
            entries: Vec::new(),
            ids: IdAllocator::new(),
            mixer,
            frame: 0,
            frame_time: 0.0,
        }
    }

    pub fn direct() -> Self {
        Self::new(ControllerKind::Direct, Config::default())
    }

    pub fn blend() -> Self {
        Self::new(ControllerKind::Blend, Config::default())
    }

    /// Create by type name (`"direct"` or `"blend"`).
    pub fn from_type_name(name: &str, config: Config) -> Option<Self> {
        match name.parse::<ControllerKind>() {
            Ok(kind) => Some(Self::new(kind, config)),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }

    #[inline]
    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn frame_rate(&self) -> f32 {
        self.config.frame_rate
    }

    /// Logical frames elapsed since creation at the configured frame rate.
    #[inline]
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Resolve every instance's asset, in insertion order.
    pub async fn load(&mut self) -> Result<(), AnimationError> {
        for entry in &mut self.entries {
            entry.instance.load().await?;
        }
        Ok(())
    }

    /// Register an instance. Its current weight becomes the requested weight.
    pub fn add_animation(&mut self, instance: AnimationInstance) -> InstId {
        let id = self.ids.alloc_inst();
        let weight = instance.weight();
        log::debug!(
            "{} controller: added '{}' as {id:?} with weight {weight}",
            self.kind,
            instance.name()
        );
        self.entries.push(ControllerEntry {
            id,
            instance,
            desired_weight: weight,
            weight,
        });
        self.resolve_weights();
        id
    }

    pub fn remove_animation(&mut self, id: InstId) -> Option<AnimationInstance> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        let entry = self.entries.remove(index);
        self.resolve_weights();
        Some(entry.instance)
    }

    /// Request a weight. Direct controllers renormalize; Blend stores it as is.
    pub fn set_weight(&mut self, id: InstId, weight: f32) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        match self.kind {
            ControllerKind::Direct => entry.desired_weight = weight.max(0.0),
            ControllerKind::Blend => {
                entry.desired_weight = weight.clamp(0.0, 1.0);
                entry.weight = entry.desired_weight;
            }
        }
        self.resolve_weights();
        true
    }

    /// Resolved weight of `id`, 0 for unknown ids.
    pub fn weight(&self, id: InstId) -> f32 {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map_or(0.0, |e| e.weight)
    }

    pub fn animation_instances_count(&self) -> usize {
        self.entries.len()
    }

    pub fn animation_instance_at(&self, index: usize) -> Option<&AnimationInstance> {
        self.entries.get(index).map(|e| &e.instance)
    }

    pub fn animation_instance_at_mut(&mut self, index: usize) -> Option<&mut AnimationInstance> {
        self.entries.get_mut(index).map(|e| &mut e.instance)
    }

    pub fn anim_instance(&self, id: InstId) -> Option<&AnimationInstance> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.instance)
    }

    pub fn anim_instance_mut(&mut self, id: InstId) -> Option<&mut AnimationInstance> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.instance)
    }

    /// Id of the first instance named `name`.
    pub fn find_instance(&self, name: &str) -> Option<InstId> {
        self.entries
            .iter()
            .find(|e| e.instance.name() == name)
            .map(|e| e.id)
    }

    pub fn instance_ids(&self) -> impl Iterator<Item = InstId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    fn resolve_weights(&mut self) {
        if self.kind != ControllerKind::Direct {
            return;
        }
        let total: f32 = self.entries.iter().map(|e| e.desired_weight).sum();
        if total <= self.config.negligible_weight {
            for entry in &mut self.entries {
                entry.weight = 0.0;
            }
        } else {
            for entry in &mut self.entries {
                entry.weight = entry.desired_weight / total;
            }
        }
    }

    /// Tick every instance in insertion order, then mix skeletal poses for
    /// blend controllers.
    pub fn update(
        &mut self,
        dt: f32,
        target: &mut dyn AnimationTarget,
        events: &mut dyn EventSink,
    ) {
        let dt = if dt.is_finite() {
            dt
        } else {
            log::warn!("ignoring non-finite time step {dt}");
            0.0
        };
        self.frame_time += dt;
        let frame_duration = self.config.frame_duration();
        if self.frame_time >= frame_duration {
            let elapsed = (self.frame_time / frame_duration).floor();
            self.frame = self.frame.saturating_add(elapsed as u64);
            self.frame_time -= elapsed * frame_duration;
        }

        self.resolve_weights();
        for entry in &mut self.entries {
            let ctx = TickContext {
                config: &self.config,
                controller_weight: entry.weight,
            };
            entry.instance.update(&ctx, dt, target, events);
        }

        if self.kind == ControllerKind::Blend {
            if let Some(skeleton) = target.skeleton_target(None) {
                self.mixer.blend_animations(skeleton);
                self.mixer.compute_final_transforms(skeleton);
            }
        }
        log::trace!(
            "{} controller frame {}: {} instances",
            self.kind,
            self.frame,
            self.entries.len()
        );
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::direct()
    }
}
