use frameplay_animation_core::{
    animation_to_json, parse_animation_json, parse_skeleton_json, AnimationAssetRef,
    AnimationChannel, AnimationController, AnimationError, AnimationInstance, FrameEventType,
    InterpolationMethod, JsonAnimationAsset, PlayDirection, ResidentAnimationAsset,
};
use frameplay_test_fixtures::{animations, skeletons};
use futures::executor::block_on;

/// it should parse every fixture animation
#[test]
fn all_fixture_animations_parse() {
    let mut keys = animations::keys();
    keys.sort();
    assert!(!keys.is_empty());
    for key in keys {
        let json = animations::json(&key).unwrap();
        let parsed = parse_animation_json(&json)
            .unwrap_or_else(|err| panic!("fixture '{key}' failed to parse: {err}"));
        assert_eq!(parsed.name, key);
        assert!(parsed.animation.duration_in_frames() > 0.0);
    }
}

/// it should resolve fixtures through the manifest
#[test]
fn fixture_manifest_lookups() {
    assert!(animations::path("slide-x").unwrap().is_file());
    assert!(animations::path("missing").is_err());
    assert_eq!(skeletons::keys(), vec!["arm".to_string()]);
    assert!(skeletons::path("arm").unwrap().is_file());

    let raw: serde_json::Value = animations::load("blink").unwrap();
    assert_eq!(raw["kind"], "bool");
}

/// it should restore keyframes, interpolation and authored events
#[test]
fn slide_x_contents() {
    let parsed = parse_animation_json(&animations::json("slide-x").unwrap()).unwrap();
    assert_eq!(parsed.interpolation_method, InterpolationMethod::Linear);
    let animation = parsed.animation;
    assert_eq!(animation.last_frame(), 400);

    let AnimationChannel::Translation(track) = animation.channel() else {
        panic!("slide-x should be a translation channel");
    };
    assert_eq!(track.num_key_frames(), 2);
    assert_eq!(track.key_frame_at(1).unwrap().value.x, 400.0);

    let frames = animation.frame_data();
    let footstep = &frames.events_at(100)[0];
    assert_eq!(footstep.id, "footstep");
    assert_eq!(footstep.direction, PlayDirection::Forward);
    assert_eq!(frames.events_at(200)[0].event_type, FrameEventType::Start);
    assert_eq!(frames.events_at(300)[0].event_type, FrameEventType::Stop);
}

/// it should load skeletal clips with their duration in frames
#[test]
fn skeletal_fixture_contents() {
    let parsed = parse_animation_json(&animations::json("arm-wave").unwrap()).unwrap();
    let AnimationChannel::Skeletal(clip) = parsed.animation.channel() else {
        panic!("arm-wave should be skeletal");
    };
    assert_eq!(clip.num_tracks(), 3);
    assert_eq!(clip.duration(), 1.0);
    assert_eq!(parsed.animation.duration_in_frames(), 60.0);
    assert_eq!(parsed.animation.frame_data().event_id(30, 0), Some("wave-peak"));
}

/// it should round-trip keyframe animations through JSON
#[test]
fn keyframe_animations_round_trip() {
    for key in ["slide-x", "blink"] {
        let parsed = parse_animation_json(&animations::json(key).unwrap()).unwrap();
        let json =
            animation_to_json(&parsed.name, &parsed.animation, parsed.interpolation_method).unwrap();
        let reparsed = parse_animation_json(&json).unwrap();
        assert_eq!(reparsed, parsed, "{key} changed across a round trip");
    }
}

/// it should refuse to export skeletal clips
#[test]
fn skeletal_export_is_an_error() {
    let parsed = parse_animation_json(&animations::json("arm-wave").unwrap()).unwrap();
    let err = animation_to_json("arm-wave", &parsed.animation, InterpolationMethod::Linear)
        .unwrap_err();
    assert!(matches!(err, AnimationError::Serialization { .. }));
}

/// it should reject malformed documents
#[test]
fn malformed_documents_are_rejected() {
    assert!(matches!(
        parse_animation_json("{ not json"),
        Err(AnimationError::Serialization { .. })
    ));
    let negative = r#"{ "kind": "float", "keyframes": [ { "frame": -1, "value": 0.0 } ] }"#;
    assert_eq!(
        parse_animation_json(negative).unwrap_err(),
        AnimationError::NegativeFrame { frame: -1 }
    );
}

/// it should parse a skeleton and reject joints listed before their parents
#[test]
fn skeleton_parsing() {
    let skeleton = parse_skeleton_json(&skeletons::json("arm").unwrap()).unwrap();
    assert_eq!(skeleton.num_joints(), 3);
    assert_eq!(skeleton.joint_index("wrist"), Some(2));
    assert_eq!(skeleton.joints()[2].parent, Some(1));

    let bad = r#"[ { "name": "a", "parent": 1 }, { "name": "b", "parent": null } ]"#;
    assert!(matches!(
        parse_skeleton_json(bad),
        Err(AnimationError::InvalidSkeleton { .. })
    ));
}

/// it should resolve JSON assets when a controller loads
#[test]
fn controller_loads_json_assets() {
    let mut controller = AnimationController::direct();
    let slide = controller.add_animation(AnimationInstance::from_asset(
        "slide",
        AnimationAssetRef::new(JsonAnimationAsset::new(
            "slide-x",
            animations::json("slide-x").unwrap(),
        )),
    ));
    let blink = controller.add_animation(AnimationInstance::from_asset(
        "blink",
        AnimationAssetRef::new(JsonAnimationAsset::new(
            "blink",
            animations::json("blink").unwrap(),
        )),
    ));
    assert!(!controller.anim_instance(slide).unwrap().is_loaded());

    block_on(controller.load()).unwrap();
    let slide = controller.anim_instance(slide).unwrap();
    assert!(slide.is_loaded());
    assert_eq!(slide.interpolation_method(), InterpolationMethod::Linear);
    assert_eq!(slide.animation().unwrap().last_frame(), 400);
    assert!(controller.anim_instance(blink).unwrap().is_loaded());
}

/// it should surface parse failures as asset load errors
#[test]
fn bad_json_asset_fails_to_load() {
    let mut instance = AnimationInstance::from_asset(
        "broken",
        AnimationAssetRef::new(JsonAnimationAsset::new("broken", "{ \"kind\": 3 }")),
    );
    let err = block_on(instance.load()).unwrap_err();
    match err {
        AnimationError::AssetLoad { asset, .. } => assert_eq!(asset, "broken"),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!instance.is_loaded());
}

/// it should leave an instance unloaded when its asset holds no animation
#[test]
fn empty_asset_leaves_instance_unloaded() {
    let mut instance = AnimationInstance::from_asset(
        "ghost",
        AnimationAssetRef::new(ResidentAnimationAsset::new(
            "ghost",
            None,
            InterpolationMethod::Step,
        )),
    );
    block_on(instance.load()).unwrap();
    assert!(!instance.is_loaded());
    assert!(instance.player().is_none());
    assert_eq!(instance.asset_ref().unwrap().name(), "ghost");
}
