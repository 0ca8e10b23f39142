//! Animation component: hosts a controller for one scene object.
//!
//! Each update starts from the object's root transform, lets the controller's
//! animations accumulate into a frame transform, and writes back only the
//! parts that were animated this tick. Capability queries from a specific
//! player can be routed to a custom target bound to that player.

use std::any::Any;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::asset::AnimationAssetRef;
use crate::config::Config;
use crate::controller::{AnimationController, ControllerKind};
use crate::error::AnimationError;
use crate::events::EventSink;
use crate::ids::{InstId, OwnerId, PlayerId};
use crate::instance::{AnimationInstance, InstanceCreationData};
use crate::target::{
    AnimationTarget, Capability, CapabilityKind, SkewAnimatable, TransformAnimatable,
};
use crate::value::Transform;

/// Host description of one animation track on a component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackCreationInfo {
    pub name: String,
    #[serde(flatten)]
    pub creation: InstanceCreationData,
}

/// Target usable as a per-player override; downcastable for inspection.
pub trait CustomTarget: AnimationTarget + Send {
    fn as_any(&self) -> &dyn Any;
}

impl<T: AnimationTarget + Send + 'static> CustomTarget for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct CustomTargetEntry {
    /// `None` serves every player for capabilities the object lacks.
    player: Option<PlayerId>,
    target: Box<dyn CustomTarget>,
}

#[derive(Clone, Copy, Debug, Default)]
struct PendingChanges {
    transform: bool,
    translation: bool,
    rotation: bool,
    scale: bool,
    skew: bool,
}

/// Object-side state the controller animates.
pub struct ComponentTarget {
    owner: OwnerId,
    root: Transform,
    object: Transform,
    frame: Transform,
    skew: Vec2,
    frame_skew: Vec2,
    pending: PendingChanges,
    custom_targets: Vec<CustomTargetEntry>,
}

impl ComponentTarget {
    fn new(owner: OwnerId, root: Transform) -> Self {
        Self {
            owner,
            root,
            object: root,
            frame: root,
            skew: Vec2::ZERO,
            frame_skew: Vec2::ZERO,
            pending: PendingChanges::default(),
            custom_targets: Vec::new(),
        }
    }

    fn begin_frame(&mut self) {
        self.frame = self.root;
        self.frame_skew = Vec2::ZERO;
        self.pending = PendingChanges::default();
    }

    fn apply_pending(&mut self) {
        let pending = self.pending;
        if pending.transform {
            self.object = self.frame;
        } else {
            if pending.translation {
                self.object.translation = self.frame.translation;
            }
            if pending.rotation {
                self.object.rotation = self.frame.rotation;
            }
            if pending.scale {
                self.object.scale = self.frame.scale;
            }
        }
        if pending.skew {
            self.skew = self.frame_skew;
        }
        self.pending = PendingChanges::default();
    }
}

impl TransformAnimatable for ComponentTarget {
    fn animate_transform(&mut self, transform: Transform) {
        self.frame = self.frame * transform;
        self.pending.transform = true;
    }

    fn animate_translation(&mut self, translation: Vec3) {
        self.frame.translation += translation;
        self.pending.translation = true;
    }

    fn animate_rotation(&mut self, rotation: Quat) {
        self.frame.rotation = (self.frame.rotation * rotation).normalize();
        self.pending.rotation = true;
    }

    fn animate_scale(&mut self, scale: Vec3) {
        self.frame.scale *= scale;
        self.pending.scale = true;
    }
}

impl SkewAnimatable for ComponentTarget {
    fn animate_skew(&mut self, skew: Vec2) {
        self.frame_skew += skew;
        self.pending.skew = true;
    }
}

impl AnimationTarget for ComponentTarget {
    fn capability(
        &mut self,
        kind: CapabilityKind,
        player: Option<PlayerId>,
    ) -> Option<Capability<'_>> {
        let bound = player.and_then(|p| {
            self.custom_targets.iter_mut().position(|c| {
                c.player == Some(p) && c.target.capability(kind, player).is_some()
            })
        });
        if let Some(index) = bound {
            return self.custom_targets[index].target.capability(kind, player);
        }

        match kind {
            CapabilityKind::Transform => return Some(Capability::Transform(self)),
            CapabilityKind::Skew => return Some(Capability::Skew(self)),
            CapabilityKind::Scalar | CapabilityKind::Skeleton => {}
        }

        let fallback = self
            .custom_targets
            .iter_mut()
            .position(|c| c.player.is_none() && c.target.capability(kind, player).is_some())?;
        self.custom_targets[fallback].target.capability(kind, player)
    }

    fn owner(&self) -> Option<OwnerId> {
        Some(self.owner)
    }
}

/// Controller host for a scene object.
pub struct AnimationComponent {
    controller: Option<AnimationController>,
    default_controller: ControllerKind,
    config: Config,
    target: ComponentTarget,
}

impl AnimationComponent {
    pub fn new(owner: OwnerId) -> Self {
        Self::with_root_transform(owner, Transform::IDENTITY)
    }

    pub fn with_root_transform(owner: OwnerId, root: Transform) -> Self {
        Self {
            controller: None,
            default_controller: ControllerKind::Direct,
            config: Config::default(),
            target: ComponentTarget::new(owner, root),
        }
    }

    /// Controller type created on first use when none was set.
    pub fn with_default_controller(mut self, kind: ControllerKind) -> Self {
        self.default_controller = kind;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn owner(&self) -> OwnerId {
        self.target.owner
    }

    /// Current object transform.
    pub fn transform(&self) -> Transform {
        self.target.object
    }

    pub fn skew(&self) -> Vec2 {
        self.target.skew
    }

    pub fn root_transform(&self) -> Transform {
        self.target.root
    }

    pub fn set_root_transform(&mut self, root: Transform) {
        self.target.root = root;
        self.target.object = root;
    }

    pub fn set_controller(&mut self, controller: AnimationController) {
        self.controller = Some(controller);
    }

    /// Use a controller by type name; unknown names keep the current one.
    pub fn set_controller_type(&mut self, name: &str) -> bool {
        match AnimationController::from_type_name(name, self.config.clone()) {
            Some(controller) => {
                self.controller = Some(controller);
                true
            }
            None => false,
        }
    }

    pub fn controller(&self) -> Option<&AnimationController> {
        self.controller.as_ref()
    }

    /// Controller, created with the default type when missing.
    pub fn controller_mut(&mut self) -> &mut AnimationController {
        let kind = self.default_controller;
        let config = &self.config;
        self.controller.get_or_insert_with(|| {
            log::debug!("creating default {kind} controller");
            AnimationController::new(kind, config.clone())
        })
    }

    pub fn add_animation(&mut self, instance: AnimationInstance) -> InstId {
        self.controller_mut().add_animation(instance)
    }

    /// Create an instance for a host-described track.
    pub fn add_track(&mut self, info: &TrackCreationInfo, asset: AnimationAssetRef) -> InstId {
        let instance =
            AnimationInstance::from_asset(info.name.clone(), asset).with_creation_data(&info.creation);
        self.add_animation(instance)
    }

    pub fn add_custom_target(&mut self, player: Option<PlayerId>, target: Box<dyn CustomTarget>) {
        self.target
            .custom_targets
            .push(CustomTargetEntry { player, target });
    }

    /// Custom target at `index`, if it is a `T`.
    pub fn custom_target<T: 'static>(&self, index: usize) -> Option<&T> {
        self.target
            .custom_targets
            .get(index)
            .and_then(|c| c.target.as_any().downcast_ref::<T>())
    }

    pub async fn load(&mut self) -> Result<(), AnimationError> {
        match self.controller.as_mut() {
            Some(controller) => controller.load().await,
            None => Ok(()),
        }
    }

    /// Tick the controller and write animated parts back to the object.
    pub fn update(&mut self, dt: f32, events: &mut dyn EventSink) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        self.target.begin_frame();
        controller.update(dt, &mut self.target, events);
        self.target.apply_pending();
    }
}
