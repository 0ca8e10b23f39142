use frameplay_animation_core::{
    events::CollectingEventListener, AnimationChannel, AnimationComponent, AnimationEditor,
    AnimationInstance, EventDispatcher, EventSink, InstId, OwnerId, PlayMode, SharedAnimation,
    ANIMATION_EVENT_TRACK_FINISHED, ANIMATION_EVENT_TRACK_STARTED,
};
use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn translation_animation(last_frame: i32) -> SharedAnimation {
    let mut editor = AnimationEditor::new();
    editor.add_key_frame(0, Vec3::ZERO).unwrap();
    editor
        .add_key_frame(last_frame, Vec3::new(last_frame as f32, 0.0, 0.0))
        .unwrap();
    SharedAnimation::new(editor.commit(AnimationChannel::Translation).unwrap())
}

/// Tick until the controller has advanced `frames` logical frames.
fn skip_frames(component: &mut AnimationComponent, frames: u64, events: &mut dyn EventSink) {
    let start = component.controller_mut().current_frame();
    let mut ticks = 0;
    while component.controller_mut().current_frame() < start + frames {
        component.update(DT, events);
        ticks += 1;
        assert!(ticks <= frames * 2 + 4, "controller frame counter stalled");
    }
}

fn playing_frame(component: &mut AnimationComponent, id: InstId) -> i32 {
    component
        .controller_mut()
        .anim_instance_mut(id)
        .and_then(|i| i.player().map(|p| p.playing_frame()))
        .expect("loaded instance")
}

/// it should drive a translation through play, pause, stop and seeks
#[test]
fn translation_playback_scenario() {
    let mut component = AnimationComponent::new(OwnerId(1));
    let id = component.add_animation(AnimationInstance::new("slide", translation_animation(400)));
    let mut events = ();

    // activation tick lands on frame 0
    component.update(DT, &mut events);
    assert_eq!(playing_frame(&mut component, id), 0);
    approx(component.transform().translation.x, 0.0, 1e-4);

    skip_frames(&mut component, 10, &mut events);
    let frame = playing_frame(&mut component, id);
    assert!(frame > 0);
    approx(component.transform().translation.x, frame as f32, 1e-3);

    // pause freezes playback
    component
        .controller_mut()
        .anim_instance_mut(id)
        .and_then(|i| i.player())
        .unwrap()
        .pause(true);
    let paused_at = playing_frame(&mut component, id);
    skip_frames(&mut component, 10, &mut events);
    assert_eq!(playing_frame(&mut component, id), paused_at);
    approx(component.transform().translation.x, paused_at as f32, 1e-3);

    // stop rewinds to 0 and stays there
    component
        .controller_mut()
        .anim_instance_mut(id)
        .and_then(|i| i.player())
        .unwrap()
        .stop();
    skip_frames(&mut component, 5, &mut events);
    assert_eq!(playing_frame(&mut component, id), 0);
    approx(component.transform().translation.x, 0.0, 1e-4);

    // play and seek
    {
        let instance = component.controller_mut().anim_instance_mut(id).unwrap();
        let mut player = instance.player().unwrap();
        player.play();
        player.jump_to_frame(250);
    }
    skip_frames(&mut component, 1, &mut events);
    assert_eq!(playing_frame(&mut component, id), 250);
    approx(component.transform().translation.x, 250.0, 1e-3);

    component
        .controller_mut()
        .anim_instance_mut(id)
        .and_then(|i| i.player())
        .unwrap()
        .jump_to_last_frame();
    skip_frames(&mut component, 1, &mut events);
    assert_eq!(playing_frame(&mut component, id), 400);
    approx(component.transform().translation.x, 400.0, 1e-3);
}

/// it should report track started and finished on a short looping animation
#[test]
fn looping_track_reports_start_and_finish() {
    let owner = OwnerId(42);
    let mut component = AnimationComponent::new(owner);
    let mut instance = AnimationInstance::new("loop", translation_animation(10));
    instance.set_play_mode(PlayMode::Looping);
    component.add_animation(instance);

    let mut dispatcher = EventDispatcher::new();
    let (listener, log) = CollectingEventListener::new(Some(owner));
    dispatcher.add_listener(Box::new(listener));

    skip_frames(&mut component, 3 * 10, &mut dispatcher);
    dispatcher.process_queue();

    let log = log.lock().unwrap();
    let started = log
        .iter()
        .filter(|e| e.event_id == ANIMATION_EVENT_TRACK_STARTED)
        .count();
    let finished = log
        .iter()
        .filter(|e| e.event_id == ANIMATION_EVENT_TRACK_FINISHED)
        .count();
    assert!(started > 0, "no track-started events");
    assert!(finished > 0, "no track-finished events");
    assert!(log.iter().all(|e| e.track_name == "loop"));
}

/// it should stay silent while paused and resume broadcasting on play
#[test]
fn paused_instance_posts_no_events() {
    let mut component = AnimationComponent::new(OwnerId(3));
    let id = component.add_animation(AnimationInstance::new("slide", translation_animation(20)));

    let mut sink: Vec<(OwnerId, frameplay_animation_core::FrameEventData)> = Vec::new();
    component.update(DT, &mut sink);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].1.event_id, ANIMATION_EVENT_TRACK_STARTED);

    component
        .controller_mut()
        .anim_instance_mut(id)
        .and_then(|i| i.player())
        .unwrap()
        .pause(true);
    for _ in 0..5 {
        component.update(DT, &mut sink);
    }
    assert_eq!(sink.len(), 1, "paused instance posted {:?}", &sink[1..]);

    component
        .controller_mut()
        .anim_instance_mut(id)
        .and_then(|i| i.player())
        .unwrap()
        .pause(false);
    for _ in 0..3 {
        component.update(DT, &mut sink);
    }
    assert_eq!(playing_frame(&mut component, id), 3);
    assert!(sink.iter().all(|(owner, _)| *owner == OwnerId(3)));
}

/// it should report a single-key track as finished
#[test]
fn single_key_track_reports_finish() {
    let mut editor = AnimationEditor::new();
    editor.add_key_frame(0, Vec3::X).unwrap();
    let still = SharedAnimation::new(editor.commit(AnimationChannel::Translation).unwrap());

    let mut component = AnimationComponent::new(OwnerId(4));
    component.add_animation(AnimationInstance::new("still", still));
    let mut sink: Vec<(OwnerId, frameplay_animation_core::FrameEventData)> = Vec::new();
    for _ in 0..10 {
        component.update(DT, &mut sink);
    }
    assert!(!sink.is_empty());
    assert!(sink
        .iter()
        .all(|(_, e)| e.event_id == ANIMATION_EVENT_TRACK_FINISHED));
}

/// it should not create a player before the instance is loaded
#[test]
fn player_requires_loaded_instance() {
    use frameplay_animation_core::{AnimationAssetRef, ResidentAnimationAsset};

    let asset = AnimationAssetRef::new(ResidentAnimationAsset::from_animation(
        "slide",
        translation_animation(5).snapshot().as_ref().clone(),
    ));
    let mut instance = AnimationInstance::from_asset("slide", asset);
    assert!(instance.player().is_none());
    assert!(!instance.is_playing());

    futures::executor::block_on(instance.load()).unwrap();
    let player = instance.player().expect("player after load");
    assert!(player.id().is_some());
    assert_eq!(player.last_frame(), 5);
    assert_eq!(player.duration_in_frames(), 6.0);
}
