use frameplay_animation_core::{
    target::{ScalarValues, TransformAnimatable},
    Animation, AnimationAssetRef, AnimationChannel, AnimationComponent, AnimationInstance,
    AnimationTarget, BlendMethod, Capability, CapabilityKind, ControllerKind, JsonAnimationAsset,
    KeyFrame, KeyFrameTrack, OwnerId, PlayMode, PlayerId, SharedAnimation, TrackCreationInfo,
    Transform,
};
use frameplay_animation_core::value::Interpolate;
use frameplay_test_fixtures::animations;
use glam::{Quat, Vec2, Vec3};

const DT: f32 = 1.0 / 60.0;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn approx_vec3(a: Vec3, b: Vec3, eps: f32) {
    assert!((a - b).length() <= eps, "left={a:?} right={b:?} eps={eps}");
}

fn constant<T: Interpolate>(value: T, wrap: fn(KeyFrameTrack<T>) -> AnimationChannel) -> SharedAnimation {
    let track = KeyFrameTrack::from_key_frames([KeyFrame::new(0, value), KeyFrame::new(10, value)])
        .unwrap();
    SharedAnimation::new(Animation::new(wrap(track)))
}

/// Records translations routed to it instead of the object.
#[derive(Default)]
struct TranslationProbe {
    translation: Option<Vec3>,
}

impl TransformAnimatable for TranslationProbe {
    fn animate_transform(&mut self, _transform: Transform) {}

    fn animate_translation(&mut self, translation: Vec3) {
        self.translation = Some(translation);
    }

    fn animate_rotation(&mut self, _rotation: Quat) {}

    fn animate_scale(&mut self, _scale: Vec3) {}
}

impl AnimationTarget for TranslationProbe {
    fn capability(
        &mut self,
        kind: CapabilityKind,
        _player: Option<PlayerId>,
    ) -> Option<Capability<'_>> {
        match kind {
            CapabilityKind::Transform => Some(Capability::Transform(self)),
            _ => None,
        }
    }
}

/// it should route scalar channels to the custom target bound to the player
#[test]
fn player_bound_scalar_target() {
    let mut component = AnimationComponent::new(OwnerId(1));
    let mut instance = AnimationInstance::new("glow", constant(0.75_f32, AnimationChannel::Float));
    let player = instance.player().unwrap().id();
    component.add_animation(instance);
    component.add_custom_target(player, Box::new(ScalarValues::default()));
    component.add_custom_target(Some(PlayerId::next()), Box::new(ScalarValues::default()));

    component.update(DT, &mut ());
    assert_eq!(
        component.custom_target::<ScalarValues>(0).unwrap().float,
        Some(0.75)
    );
    assert_eq!(component.custom_target::<ScalarValues>(1).unwrap().float, None);
    assert!(component.custom_target::<TranslationProbe>(0).is_none());
}

/// it should fall back to an unbound custom target for capabilities the object lacks
#[test]
fn unbound_scalar_fallback() {
    let mut component = AnimationComponent::new(OwnerId(1));
    component.add_animation(AnimationInstance::new(
        "visible",
        constant(true, AnimationChannel::Bool),
    ));
    component.add_custom_target(None, Box::new(ScalarValues::default()));
    component.update(DT, &mut ());
    assert_eq!(
        component.custom_target::<ScalarValues>(0).unwrap().boolean,
        Some(true)
    );
}

/// it should prefer a player-bound transform target over the object itself
#[test]
fn player_bound_transform_leaves_object_alone() {
    let mut component = AnimationComponent::new(OwnerId(1));
    let mut instance = AnimationInstance::new(
        "slide",
        constant(Vec3::new(3.0, 0.0, 0.0), AnimationChannel::Translation),
    );
    let player = instance.player().unwrap().id();
    component.add_animation(instance);
    component.add_custom_target(player, Box::new(TranslationProbe::default()));

    component.update(DT, &mut ());
    assert_eq!(component.transform(), Transform::IDENTITY);
    assert_eq!(
        component
            .custom_target::<TranslationProbe>(0)
            .unwrap()
            .translation,
        Some(Vec3::new(3.0, 0.0, 0.0))
    );
}

/// it should add animated translation on top of the root transform
#[test]
fn translation_is_relative_to_root() {
    let root = Transform {
        translation: Vec3::new(10.0, 0.0, 0.0),
        rotation: Quat::from_rotation_y(0.3),
        scale: Vec3::ONE,
    };
    let mut component = AnimationComponent::with_root_transform(OwnerId(1), root);
    component.add_animation(AnimationInstance::new(
        "nudge",
        constant(Vec3::X, AnimationChannel::Translation),
    ));
    for _ in 0..3 {
        component.update(DT, &mut ());
    }
    let transform = component.transform();
    approx_vec3(transform.translation, Vec3::new(11.0, 0.0, 0.0), 1e-5);
    assert_eq!(transform.rotation, root.rotation);
}

/// it should drive rotation, scale and skew channels
#[test]
fn rotation_scale_and_skew_channels() {
    let mut component = AnimationComponent::new(OwnerId(1));
    let controller = component.controller_mut();
    let quarter = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let spin = controller.add_animation(AnimationInstance::new(
        "spin",
        constant(quarter, AnimationChannel::Rotation),
    ));
    let grow = controller.add_animation(AnimationInstance::new(
        "grow",
        constant(Vec3::splat(2.0), AnimationChannel::Scale),
    ));
    let shear = controller.add_animation(AnimationInstance::new(
        "shear",
        constant(Vec2::new(0.5, 0.0), AnimationChannel::Skew),
    ));
    for id in [spin, grow, shear] {
        controller
            .anim_instance_mut(id)
            .and_then(|i| i.player())
            .unwrap()
            .play();
    }

    component.update(DT, &mut ());
    let transform = component.transform();
    approx(transform.rotation.angle_between(quarter), 0.0, 1e-4);
    approx_vec3(transform.scale, Vec3::splat(2.0), 1e-5);
    approx_vec3(transform.translation, Vec3::ZERO, 1e-6);
    assert!((component.skew() - Vec2::new(0.5, 0.0)).length() < 1e-6);
}

/// it should replace the whole object transform from a transform channel
#[test]
fn transform_channel_composes_with_root() {
    let root = Transform::from_translation(Vec3::new(0.0, 5.0, 0.0));
    let mut component = AnimationComponent::with_root_transform(OwnerId(1), root);
    let pose = Transform {
        translation: Vec3::new(1.0, 0.0, 0.0),
        rotation: Quat::IDENTITY,
        scale: Vec3::splat(3.0),
    };
    component.add_animation(AnimationInstance::new(
        "pose",
        constant(pose, AnimationChannel::Transform),
    ));
    component.update(DT, &mut ());
    let transform = component.transform();
    approx_vec3(transform.translation, Vec3::new(1.0, 5.0, 0.0), 1e-5);
    approx_vec3(transform.scale, Vec3::splat(3.0), 1e-5);
}

/// it should swap controllers by type name and ignore unknown names
#[test]
fn controller_type_by_name() {
    let mut component = AnimationComponent::new(OwnerId(1)).with_default_controller(ControllerKind::Blend);
    assert!(component.controller().is_none());
    assert_eq!(component.controller_mut().kind(), ControllerKind::Blend);

    assert!(component.set_controller_type("direct"));
    assert_eq!(component.controller().unwrap().kind(), ControllerKind::Direct);
    assert!(!component.set_controller_type("spline"));
    assert_eq!(component.controller().unwrap().kind(), ControllerKind::Direct);

    // no controller, no work
    let mut idle = AnimationComponent::new(OwnerId(2));
    idle.update(DT, &mut ());
    assert!(idle.controller().is_none());
}

/// it should create tracks from host descriptions and honor their creation data
#[test]
fn tracks_from_creation_info() {
    let info: TrackCreationInfo = serde_json::from_str(
        r#"{ "name": "slide", "play_mode": "looping", "blend_method": "additive", "is_stopped": true }"#,
    )
    .unwrap();
    assert_eq!(info.creation.weight, 1.0);

    let mut component = AnimationComponent::new(OwnerId(7));
    let id = component.add_track(
        &info,
        AnimationAssetRef::new(JsonAnimationAsset::new(
            "slide-x",
            animations::json("slide-x").unwrap(),
        )),
    );
    futures::executor::block_on(component.load()).unwrap();
    for _ in 0..5 {
        component.update(DT, &mut ());
    }

    let instance = component.controller().unwrap().anim_instance(id).unwrap();
    assert!(instance.is_loaded());
    assert_eq!(instance.play_mode(), PlayMode::Looping);
    assert_eq!(instance.blend_method(), BlendMethod::Additive);
    assert!(instance.state().is_stopped);
    assert!(!instance.is_playing());
    assert_eq!(instance.current_frame(), -1);
    approx(component.transform().translation.x, 0.0, 1e-6);
}
