use std::time::Duration;

use approx::assert_relative_eq;
use token_animator::{
    AnimationLibrary, Animator, AnimatorError, Config, EntityId, PlayOptions, Point,
};
use token_animator_test_fixtures::{animations, libraries, RecordingSink};
use tokio::time::sleep;

fn tavern() -> AnimationLibrary {
    libraries::load("tavern").expect("tavern library fixture")
}

#[test]
fn every_animation_fixture_parses() {
    for key in animations::keys() {
        let anim = animations::load(&key).unwrap_or_else(|e| panic!("{key}: {e}"));
        assert!(anim.validate().is_ok(), "{key} should validate");
    }
    for key in libraries::keys() {
        libraries::load(&key).unwrap_or_else(|e| panic!("{key}: {e}"));
    }
}

#[test]
fn tavern_folders_trim_names() {
    let lib = tavern();
    let folders = lib.folders();
    assert_eq!(folders["guards"].len(), 2);
    assert_eq!(folders["staff"].len(), 1);
    assert_eq!(folders[""].len(), 1);
}

#[tokio::test(start_paused = true)]
async fn play_by_name_uses_stored_speed() {
    let sink = RecordingSink::new();
    let animator = Animator::new(Config::default(), sink.clone());
    let lib = tavern();
    let barkeep = EntityId::from("barkeep");

    animator
        .play_by_name(&lib, &barkeep, "serve", PlayOptions::default())
        .await
        .unwrap();

    let updates = sink.updates_for(&barkeep);
    // 200 px at 12.5 px per step.
    assert_eq!(updates.len(), 16);
    let last = updates.last().unwrap().to;
    assert_relative_eq!(last.x, 300.0);
    assert_relative_eq!(last.y, 100.0);
    // Speed 2: 12.5 / 200 s = 62.5 ms, clamped to the 24 ms ceiling.
    assert_eq!(updates[0].mv.duration, Duration::from_millis(24));
}

#[tokio::test(start_paused = true)]
async fn play_by_name_unknown_installs_nothing() {
    let sink = RecordingSink::new();
    let animator = Animator::new(Config::default(), sink.clone());
    let lib = tavern();
    let barkeep = EntityId::from("barkeep");

    let err = animator
        .play_by_name(&lib, &barkeep, "dance", PlayOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AnimatorError::AnimationNotFound {
            entity: barkeep.clone(),
            name: "dance".into()
        }
    );
    assert!(!animator.is_playing(&barkeep));
    assert_eq!(sink.count_for(&barkeep), 0);
}

#[tokio::test(start_paused = true)]
async fn folder_controls_touch_only_members() {
    let sink = RecordingSink::new();
    let animator = Animator::new(Config::default(), sink.clone());
    let lib = tavern();
    let guard_1 = EntityId::from("guard-1");
    let guard_2 = EntityId::from("guard-2");
    let barkeep = EntityId::from("barkeep");

    let handles = animator.play_folder(&lib, "guards");
    assert_eq!(handles.len(), 2);
    sleep(Duration::from_millis(100)).await;
    assert!(animator.is_playing(&guard_1));
    assert!(animator.is_playing(&guard_2));
    assert!(!animator.is_playing(&barkeep));

    animator.pause_folder(&lib, " guards");
    assert!(animator.is_paused(&guard_1) && animator.is_paused(&guard_2));
    let frozen = sink.updates().len();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.updates().len(), frozen);

    animator.resume_folder(&lib, "guards");
    sleep(Duration::from_millis(50)).await;
    assert!(sink.updates().len() > frozen);

    animator.stop_folder(&lib, "guards").await;
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(sink.position(&guard_1), Some(Point::new(0.0, 0.0)));
    assert_eq!(sink.position(&guard_2), Some(Point::new(0.0, 500.0)));
    assert!(animator.playing_entities().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_everything() {
    let sink = RecordingSink::new();
    let animator = Animator::new(Config::default(), sink.clone());
    let lib = tavern();
    let handles = animator.play_folder(&lib, "guards");
    sleep(Duration::from_millis(50)).await;

    animator.shutdown().await;
    for handle in handles {
        handle.await.unwrap();
    }
    assert!(animator.playing_entities().is_empty());
}
