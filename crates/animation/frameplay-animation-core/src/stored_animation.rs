//! JSON persistence for animations.
//!
//! Values are written as plain objects (`{x,y,z}`, `{x,y,z,w}`,
//! `{translation,rotation,scale}`) and converted into the typed channel named
//! by `kind`. Parsing validates frames and restores ordering, so a parsed
//! animation is always committed.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::{Animation, AnimationChannel, JointTrack, SkeletalClip, TimedKey};
use crate::error::AnimationError;
use crate::events::FrameData;
use crate::keyframe::KeyFrameTrack;
use crate::skeleton::Skeleton;
use crate::value::{InterpolationMethod, Transform};

/// Result of parsing a stored animation.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedAnimation {
    pub name: String,
    pub animation: Animation,
    pub interpolation_method: InterpolationMethod,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredKind {
    Bool,
    Integer,
    Float,
    Skew,
    Translation,
    Rotation,
    Scale,
    Transform,
    Skeletal,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAnimation {
    #[serde(default)]
    name: String,
    kind: StoredKind,
    #[serde(default)]
    interpolation: InterpolationMethod,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    keyframes: Vec<StoredKeyFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    joints: Vec<StoredJointTrack>,
    #[serde(default)]
    events: FrameData,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredKeyFrame {
    frame: i32,
    value: RawValue,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredJointTrack {
    #[serde(default)]
    translations: Vec<StoredTimedKey<RawVec3>>,
    #[serde(default)]
    rotations: Vec<StoredTimedKey<RawQuat>>,
    #[serde(default)]
    scales: Vec<StoredTimedKey<RawVec3>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTimedKey<V> {
    time: f32,
    value: V,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RawVec2 {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RawVec3 {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RawQuat {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct RawTransform {
    translation: RawVec3,
    rotation: RawQuat,
    scale: RawVec3,
}

/// Untagged value shapes; order matters, wider objects first.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Boolean(bool),
    Number(f64),
    Transform(RawTransform),
    Quat(RawQuat),
    Vector3(RawVec3),
    Vector2(RawVec2),
}

impl From<RawVec3> for Vec3 {
    fn from(v: RawVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for RawVec3 {
    fn from(v: Vec3) -> Self {
        RawVec3 {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<RawQuat> for Quat {
    fn from(q: RawQuat) -> Self {
        Quat::from_xyzw(q.x, q.y, q.z, q.w).normalize()
    }
}

impl From<Quat> for RawQuat {
    fn from(q: Quat) -> Self {
        RawQuat {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<RawTransform> for Transform {
    fn from(t: RawTransform) -> Self {
        Transform {
            translation: t.translation.into(),
            rotation: t.rotation.into(),
            scale: t.scale.into(),
        }
    }
}

impl From<Transform> for RawTransform {
    fn from(t: Transform) -> Self {
        RawTransform {
            translation: t.translation.into(),
            rotation: t.rotation.into(),
            scale: t.scale.into(),
        }
    }
}

/// Parse a stored animation and validate it.
pub fn parse_animation_json(s: &str) -> Result<ParsedAnimation, AnimationError> {
    let stored: StoredAnimation = serde_json::from_str(s)?;
    let kind = stored.kind;

    let channel = match kind {
        StoredKind::Bool => AnimationChannel::Bool(build_track(&stored.keyframes, kind, |v| match v {
            RawValue::Boolean(b) => Some(*b),
            _ => None,
        })?),
        StoredKind::Integer => {
            AnimationChannel::Integer(build_track(&stored.keyframes, kind, |v| match v {
                RawValue::Number(n) => Some(n.round() as i32),
                _ => None,
            })?)
        }
        StoredKind::Float => AnimationChannel::Float(build_track(&stored.keyframes, kind, |v| match v {
            RawValue::Number(n) => Some(*n as f32),
            _ => None,
        })?),
        StoredKind::Skew => AnimationChannel::Skew(build_track(&stored.keyframes, kind, |v| match v {
            RawValue::Vector2(v) => Some(Vec2::new(v.x, v.y)),
            _ => None,
        })?),
        StoredKind::Translation => {
            AnimationChannel::Translation(build_track(&stored.keyframes, kind, as_vec3)?)
        }
        StoredKind::Scale => AnimationChannel::Scale(build_track(&stored.keyframes, kind, as_vec3)?),
        StoredKind::Rotation => {
            AnimationChannel::Rotation(build_track(&stored.keyframes, kind, |v| match v {
                RawValue::Quat(q) => Some(Quat::from(*q)),
                _ => None,
            })?)
        }
        StoredKind::Transform => {
            AnimationChannel::Transform(build_track(&stored.keyframes, kind, |v| match v {
                RawValue::Transform(t) => Some(Transform::from(*t)),
                _ => None,
            })?)
        }
        StoredKind::Skeletal => {
            let duration = stored.duration.ok_or_else(|| AnimationError::InvalidKeyFrame {
                reason: "skeletal animation is missing 'duration'".to_string(),
            })?;
            let tracks = stored.joints.into_iter().map(into_joint_track).collect();
            AnimationChannel::Skeletal(SkeletalClip::new(stored.name.clone(), duration, tracks)?)
        }
    };

    let mut events = stored.events;
    if let Some(frame) = events.frames().iter().map(|f| f.frame).find(|&f| f < 0) {
        return Err(AnimationError::NegativeFrame { frame });
    }
    events.normalize();

    Ok(ParsedAnimation {
        name: stored.name,
        animation: Animation::with_frame_data(channel, events),
        interpolation_method: stored.interpolation,
    })
}

/// Serialize an animation into the stored JSON shape.
pub fn animation_to_json(
    name: &str,
    animation: &Animation,
    interpolation_method: InterpolationMethod,
) -> Result<String, AnimationError> {
    let mut stored = StoredAnimation {
        name: name.to_string(),
        kind: StoredKind::Float,
        interpolation: interpolation_method,
        keyframes: Vec::new(),
        duration: None,
        joints: Vec::new(),
        events: animation.frame_data().clone(),
    };

    match animation.channel() {
        AnimationChannel::Bool(t) => {
            stored.kind = StoredKind::Bool;
            stored.keyframes = stored_keys(t, |v| RawValue::Boolean(*v));
        }
        AnimationChannel::Integer(t) => {
            stored.kind = StoredKind::Integer;
            stored.keyframes = stored_keys(t, |v| RawValue::Number(f64::from(*v)));
        }
        AnimationChannel::Float(t) => {
            stored.kind = StoredKind::Float;
            stored.keyframes = stored_keys(t, |v| RawValue::Number(f64::from(*v)));
        }
        AnimationChannel::Skew(t) => {
            stored.kind = StoredKind::Skew;
            stored.keyframes = stored_keys(t, |v| RawValue::Vector2(RawVec2 { x: v.x, y: v.y }));
        }
        AnimationChannel::Translation(t) => {
            stored.kind = StoredKind::Translation;
            stored.keyframes = stored_keys(t, |v| RawValue::Vector3((*v).into()));
        }
        AnimationChannel::Scale(t) => {
            stored.kind = StoredKind::Scale;
            stored.keyframes = stored_keys(t, |v| RawValue::Vector3((*v).into()));
        }
        AnimationChannel::Rotation(t) => {
            stored.kind = StoredKind::Rotation;
            stored.keyframes = stored_keys(t, |v| RawValue::Quat((*v).into()));
        }
        AnimationChannel::Transform(t) => {
            stored.kind = StoredKind::Transform;
            stored.keyframes = stored_keys(t, |v| RawValue::Transform((*v).into()));
        }
        AnimationChannel::Skeletal(_) => {
            return Err(AnimationError::Serialization {
                reason: "skeletal clips are authored externally and not exported".to_string(),
            });
        }
    }

    Ok(serde_json::to_string_pretty(&stored)?)
}

/// Parse a skeleton: an array of `{ name, parent, rest_pose }` joints.
pub fn parse_skeleton_json(s: &str) -> Result<Skeleton, AnimationError> {
    #[derive(Deserialize)]
    struct StoredJoint {
        name: String,
        #[serde(default)]
        parent: Option<usize>,
        #[serde(default)]
        rest_pose: Option<RawTransform>,
    }

    let stored: Vec<StoredJoint> = serde_json::from_str(s)?;
    let joints = stored
        .into_iter()
        .map(|j| crate::skeleton::Joint {
            name: j.name,
            parent: j.parent,
            rest_pose: j.rest_pose.map(Transform::from).unwrap_or_default(),
        })
        .collect();
    Skeleton::new(joints)
}

fn as_vec3(v: &RawValue) -> Option<Vec3> {
    match v {
        RawValue::Vector3(v) => Some(Vec3::from(*v)),
        _ => None,
    }
}

fn build_track<T: crate::value::Interpolate>(
    keys: &[StoredKeyFrame],
    kind: StoredKind,
    convert: impl Fn(&RawValue) -> Option<T>,
) -> Result<KeyFrameTrack<T>, AnimationError> {
    let mut track = KeyFrameTrack::new();
    for key in keys {
        let value = convert(&key.value).ok_or_else(|| AnimationError::InvalidKeyFrame {
            reason: format!("frame {}: value does not match kind {kind:?}", key.frame),
        })?;
        track.add_key_frame(key.frame, value)?;
    }
    track.commit();
    Ok(track)
}

fn stored_keys<T: crate::value::Interpolate>(
    track: &KeyFrameTrack<T>,
    convert: impl Fn(&T) -> RawValue,
) -> Vec<StoredKeyFrame> {
    track
        .key_frames()
        .iter()
        .map(|kf| StoredKeyFrame {
            frame: kf.frame,
            value: convert(&kf.value),
        })
        .collect()
}

fn into_joint_track(stored: StoredJointTrack) -> JointTrack {
    fn keys<R, T>(raw: Vec<StoredTimedKey<R>>) -> Vec<TimedKey<T>>
    where
        T: From<R>,
    {
        raw.into_iter()
            .map(|k| TimedKey {
                time: k.time,
                value: T::from(k.value),
            })
            .collect()
    }

    JointTrack {
        translations: keys(stored.translations),
        rotations: keys(stored.rotations),
        scales: keys(stored.scales),
    }
}
