//! Skeletal pose mixer.
//!
//! Override (mix) layers are averaged by weight; when their total weight is
//! below the threshold the rest pose fills the remainder. Additive layers are
//! then applied on top, each scaled by its own weight. Finally local poses are
//! concatenated parent-first into model-space matrices.

use glam::{Mat4, Quat, Vec3};

use crate::config::DEFAULT_BLEND_THRESHOLD;
use crate::skeleton::SkeletonAnimatable;
use crate::value::{BlendMethod, Transform};

#[derive(Clone, Copy, Debug)]
struct PoseAccumulator {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl PoseAccumulator {
    const ZERO: PoseAccumulator = PoseAccumulator {
        translation: Vec3::ZERO,
        rotation: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
        scale: Vec3::ZERO,
    };

    #[inline]
    fn add(&mut self, pose: &Transform, weight: f32) {
        self.translation += pose.translation * weight;
        self.scale += pose.scale * weight;
        // keep every contribution in the accumulated hemisphere
        let rotation = if self.rotation.dot(pose.rotation) < 0.0 {
            -pose.rotation
        } else {
            pose.rotation
        };
        self.rotation = self.rotation + rotation * weight;
    }

    #[inline]
    fn finish(self, weight_sum: f32) -> Transform {
        let inv = weight_sum.recip();
        let rotation = if self.rotation.length_squared() > 0.0 {
            self.rotation.normalize()
        } else {
            Quat::IDENTITY
        };
        Transform {
            translation: self.translation * inv,
            rotation,
            scale: self.scale * inv,
        }
    }
}

/// Blends the sampled poses of a skeleton target.
#[derive(Clone, Debug)]
pub struct SkeletalMixer {
    threshold: f32,
}

impl Default for SkeletalMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkeletalMixer {
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_BLEND_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }

    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Compose every pose sampled this tick into the skeleton's local pose.
    pub fn blend_animations(&self, target: &mut dyn SkeletonAnimatable) {
        let parts = target.skeleton_parts();
        let skeleton = parts.skeleton;
        let runtime = parts.runtime;
        let joint_count = skeleton.num_joints();

        let mut accum = vec![PoseAccumulator::ZERO; joint_count];
        let mut weight_sum = 0.0;
        for track in runtime
            .tracks
            .values()
            .filter(|t| t.active && t.blend_method == BlendMethod::Mix && t.weight > 0.0)
        {
            for (acc, pose) in accum.iter_mut().zip(&track.locals) {
                acc.add(pose, track.weight);
            }
            weight_sum += track.weight;
        }

        if weight_sum < self.threshold {
            let rest_weight = self.threshold - weight_sum;
            for (acc, rest) in accum.iter_mut().zip(skeleton.rest_poses()) {
                acc.add(rest, rest_weight);
            }
            weight_sum = self.threshold;
        }

        runtime.locals.clear();
        if weight_sum > 0.0 {
            runtime
                .locals
                .extend(accum.into_iter().map(|acc| acc.finish(weight_sum)));
        } else {
            runtime.locals.extend(skeleton.rest_poses().copied());
        }

        for track in runtime
            .tracks
            .values()
            .filter(|t| t.active && t.blend_method == BlendMethod::Additive && t.weight > 0.0)
        {
            let weight = track.weight;
            for (local, delta) in runtime.locals.iter_mut().zip(&track.locals) {
                local.translation += delta.translation * weight;
                local.rotation = (local.rotation * Quat::IDENTITY.lerp(delta.rotation, weight)).normalize();
                local.scale *= Vec3::ONE.lerp(delta.scale, weight);
            }
        }

        for track in runtime.tracks.values_mut() {
            track.active = false;
        }
    }

    /// Convert the local pose into model-space matrices, parents first.
    pub fn compute_final_transforms(&self, target: &mut dyn SkeletonAnimatable) {
        let parts = target.skeleton_parts();
        let joints = parts.skeleton.joints();
        let models = parts.model_matrices;
        models.resize(joints.len(), Mat4::IDENTITY);

        for (index, joint) in joints.iter().enumerate() {
            let local = parts
                .runtime
                .locals
                .get(index)
                .unwrap_or(&joint.rest_pose)
                .to_matrix();
            models[index] = match joint.parent {
                Some(parent) => models[parent] * local,
                None => local,
            };
        }
    }
}
