//! Capabilities an animated object exposes to animations.
//!
//! Animations never know the concrete target type; they ask the target for a
//! capability by [`CapabilityKind`] and silently skip when it is missing.

use glam::{Quat, Vec2, Vec3};

use crate::ids::{OwnerId, PlayerId};
use crate::skeleton::SkeletonAnimatable;
use crate::value::Transform;

/// Receives translation, rotation, scale or whole-transform updates.
pub trait TransformAnimatable {
    fn animate_transform(&mut self, transform: Transform);
    fn animate_translation(&mut self, translation: Vec3);
    fn animate_rotation(&mut self, rotation: Quat);
    fn animate_scale(&mut self, scale: Vec3);
}

pub trait SkewAnimatable {
    fn animate_skew(&mut self, skew: Vec2);
}

/// Receives plain bool/integer/float channel values.
pub trait ScalarAnimatable {
    fn animate_bool(&mut self, value: bool);
    fn animate_integer(&mut self, value: i32);
    fn animate_float(&mut self, value: f32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Transform,
    Skew,
    Scalar,
    Skeleton,
}

/// A borrowed capability returned by [`AnimationTarget::capability`].
pub enum Capability<'a> {
    Transform(&'a mut dyn TransformAnimatable),
    Skew(&'a mut dyn SkewAnimatable),
    Scalar(&'a mut dyn ScalarAnimatable),
    Skeleton(&'a mut dyn SkeletonAnimatable),
}

impl Capability<'_> {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::Transform(_) => CapabilityKind::Transform,
            Capability::Skew(_) => CapabilityKind::Skew,
            Capability::Scalar(_) => CapabilityKind::Scalar,
            Capability::Skeleton(_) => CapabilityKind::Skeleton,
        }
    }
}

/// An object animations can drive.
pub trait AnimationTarget {
    /// Look up a capability. `player` identifies the façade driving the
    /// request so targets can route it to a per-player override.
    fn capability(
        &mut self,
        kind: CapabilityKind,
        player: Option<PlayerId>,
    ) -> Option<Capability<'_>>;

    /// Owner frame events are posted for. Targets without one do not emit events.
    fn owner(&self) -> Option<OwnerId> {
        None
    }

    fn transform_target(&mut self, player: Option<PlayerId>) -> Option<&mut dyn TransformAnimatable> {
        match self.capability(CapabilityKind::Transform, player)? {
            Capability::Transform(target) => Some(target),
            _ => None,
        }
    }

    fn skew_target(&mut self, player: Option<PlayerId>) -> Option<&mut dyn SkewAnimatable> {
        match self.capability(CapabilityKind::Skew, player)? {
            Capability::Skew(target) => Some(target),
            _ => None,
        }
    }

    fn scalar_target(&mut self, player: Option<PlayerId>) -> Option<&mut dyn ScalarAnimatable> {
        match self.capability(CapabilityKind::Scalar, player)? {
            Capability::Scalar(target) => Some(target),
            _ => None,
        }
    }

    fn skeleton_target(&mut self, player: Option<PlayerId>) -> Option<&mut dyn SkeletonAnimatable> {
        match self.capability(CapabilityKind::Skeleton, player)? {
            Capability::Skeleton(target) => Some(target),
            _ => None,
        }
    }
}

/// Scalar channel values last pushed to a [`ScalarAnimatable`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScalarValues {
    pub boolean: Option<bool>,
    pub integer: Option<i32>,
    pub float: Option<f32>,
}

impl ScalarAnimatable for ScalarValues {
    fn animate_bool(&mut self, value: bool) {
        self.boolean = Some(value);
    }

    fn animate_integer(&mut self, value: i32) {
        self.integer = Some(value);
    }

    fn animate_float(&mut self, value: f32) {
        self.float = Some(value);
    }
}

/// Target exposing only scalar channels, usable as a custom per-player target.
impl AnimationTarget for ScalarValues {
    fn capability(
        &mut self,
        kind: CapabilityKind,
        _player: Option<PlayerId>,
    ) -> Option<Capability<'_>> {
        match kind {
            CapabilityKind::Scalar => Some(Capability::Scalar(self)),
            _ => None,
        }
    }
}
