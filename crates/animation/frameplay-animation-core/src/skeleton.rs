//! Skeleton hierarchy, per-instance sampled poses and the skeleton capability.

use glam::{Mat4, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::animation::skeletal::SamplingContext;
use crate::error::AnimationError;
use crate::ids::{OwnerId, PlayerId};
use crate::mixer::SkeletalMixer;
use crate::target::{AnimationTarget, Capability, CapabilityKind};
use crate::value::{BlendMethod, Transform};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub name: String,
    /// Index of the parent joint, `None` for roots.
    pub parent: Option<usize>,
    #[serde(default)]
    pub rest_pose: Transform,
}

/// Joints ordered so every parent precedes its children.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Joint>", into = "Vec<Joint>")]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    pub fn new(joints: Vec<Joint>) -> Result<Self, AnimationError> {
        for (index, joint) in joints.iter().enumerate() {
            if let Some(parent) = joint.parent {
                if parent >= index {
                    return Err(AnimationError::InvalidSkeleton {
                        reason: format!(
                            "joint '{}' ({index}) does not follow its parent {parent}",
                            joint.name
                        ),
                    });
                }
            }
        }
        Ok(Self { joints })
    }

    #[inline]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    pub fn rest_poses(&self) -> impl Iterator<Item = &Transform> {
        self.joints.iter().map(|j| &j.rest_pose)
    }
}

impl TryFrom<Vec<Joint>> for Skeleton {
    type Error = AnimationError;

    fn try_from(joints: Vec<Joint>) -> Result<Self, Self::Error> {
        Skeleton::new(joints)
    }
}

impl From<Skeleton> for Vec<Joint> {
    fn from(skeleton: Skeleton) -> Self {
        skeleton.joints
    }
}

/// Pose sampled by one animation instance this tick.
#[derive(Clone, Debug, Default)]
pub struct SkeletalTrack {
    pub locals: Vec<Transform>,
    pub weight: f32,
    pub blend_method: BlendMethod,
    pub context: SamplingContext,
    /// Set by the sampling instance, cleared by the mixer once consumed.
    pub active: bool,
}

/// Scratch poses written by instances and read by the mixer.
#[derive(Clone, Debug, Default)]
pub struct SkeletalRuntimeData {
    /// Keyed by animation instance name, in first-sampled order.
    pub tracks: IndexMap<String, SkeletalTrack>,
    /// Blended local pose.
    pub locals: Vec<Transform>,
}

impl SkeletalRuntimeData {
    pub fn track_mut(&mut self, name: &str) -> &mut SkeletalTrack {
        self.tracks.entry(name.to_string()).or_default()
    }
}

/// Borrowed view over a skeleton and its mutable pose buffers.
pub struct SkeletonParts<'a> {
    pub skeleton: &'a Skeleton,
    pub runtime: &'a mut SkeletalRuntimeData,
    pub model_matrices: &'a mut Vec<Mat4>,
}

/// Capability for skeletal animations and the mixer.
pub trait SkeletonAnimatable {
    fn skeleton_parts(&mut self) -> SkeletonParts<'_>;
}

/// A skeleton with its runtime pose, usable directly as a blend controller target.
#[derive(Clone, Debug, Default)]
pub struct SkeletonComponent {
    skeleton: Skeleton,
    runtime: SkeletalRuntimeData,
    model_matrices: Vec<Mat4>,
    owner: Option<OwnerId>,
}

impl SkeletonComponent {
    pub fn new(skeleton: Skeleton) -> Self {
        let rest: Vec<Transform> = skeleton.rest_poses().copied().collect();
        let mut component = Self {
            model_matrices: vec![Mat4::IDENTITY; skeleton.num_joints()],
            skeleton,
            runtime: SkeletalRuntimeData {
                locals: rest,
                ..Default::default()
            },
            owner: None,
        };
        SkeletalMixer::new().compute_final_transforms(&mut component);
        component
    }

    pub fn with_owner(mut self, owner: OwnerId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn runtime(&self) -> &SkeletalRuntimeData {
        &self.runtime
    }

    pub fn local_pose(&self) -> &[Transform] {
        &self.runtime.locals
    }

    pub fn model_matrices(&self) -> &[Mat4] {
        &self.model_matrices
    }

    /// Model-space position of a named bone.
    pub fn bone_model_position(&self, name: &str) -> Option<Vec3> {
        let index = self.skeleton.joint_index(name)?;
        self.model_matrices
            .get(index)
            .map(|m| m.w_axis.truncate())
    }
}

impl SkeletonAnimatable for SkeletonComponent {
    fn skeleton_parts(&mut self) -> SkeletonParts<'_> {
        SkeletonParts {
            skeleton: &self.skeleton,
            runtime: &mut self.runtime,
            model_matrices: &mut self.model_matrices,
        }
    }
}

impl AnimationTarget for SkeletonComponent {
    fn capability(
        &mut self,
        kind: CapabilityKind,
        _player: Option<PlayerId>,
    ) -> Option<Capability<'_>> {
        match kind {
            CapabilityKind::Skeleton => Some(Capability::Skeleton(self)),
            _ => None,
        }
    }

    fn owner(&self) -> Option<OwnerId> {
        self.owner
    }
}
