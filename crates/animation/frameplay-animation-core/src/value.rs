//! Animated value types and interpolation.
//!
//! Every channel type implements [`Interpolate`]; keyframe tracks are generic
//! over it. Vector math is `glam`.

use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Translation, rotation and scale. Used for object transforms and joint poses.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Transform a point from this transform's local space into its parent space.
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Parent-then-child composition (`parent * child`).
impl Mul for Transform {
    type Output = Transform;

    fn mul(self, child: Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }
}

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Values a keyframe track can hold.
pub trait Interpolate: Copy + fmt::Debug {
    /// Channels that cannot be blended between keys (bool) always step.
    const ALWAYS_STEP: bool = false;

    /// Blend between two keyframe values, `t` in `[0, 1]`.
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self;
}

impl Interpolate for bool {
    const ALWAYS_STEP: bool = true;

    #[inline]
    fn interpolate(from: &Self, _to: &Self, _t: f32) -> Self {
        *from
    }
}

impl Interpolate for i32 {
    #[inline]
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        lerp_f32(*from as f32, *to as f32, t).round() as i32
    }
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        lerp_f32(*from, *to, t)
    }
}

impl Interpolate for Vec2 {
    #[inline]
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        from.lerp(*to, t)
    }
}

impl Interpolate for Vec3 {
    #[inline]
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        from.lerp(*to, t)
    }
}

impl Interpolate for Quat {
    #[inline]
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        from.slerp(*to, t)
    }
}

impl Interpolate for Transform {
    fn interpolate(from: &Self, to: &Self, t: f32) -> Self {
        Transform {
            translation: from.translation.lerp(to.translation, t),
            rotation: from.rotation.slerp(to.rotation, t),
            scale: from.scale.lerp(to.scale, t),
        }
    }
}

/// How a value is picked between two keyframes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    Step,
    #[default]
    Linear,
}

/// How a skeletal layer composes with the layers under it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMethod {
    /// Weighted override, normalized against the other override layers.
    #[default]
    Mix,
    /// Applied on top of the mixed pose, scaled by weight.
    Additive,
}

impl BlendMethod {
    pub fn name(&self) -> &'static str {
        match self {
            BlendMethod::Mix => "mix",
            BlendMethod::Additive => "additive",
        }
    }
}

impl FromStr for BlendMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mix" | "override" => Ok(BlendMethod::Mix),
            "additive" => Ok(BlendMethod::Additive),
            other => Err(format!("unknown blend method '{other}'")),
        }
    }
}
