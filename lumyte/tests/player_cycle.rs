//! Full-cycle behavior of the frame engine against the default movie.

use lumyte::timeline::functions::default_movie;
use lumyte::{Brightness, Movie, Player, SignGeometry, TimelineRegistry};

fn default_player() -> Player {
    let movie = default_movie().unwrap();
    Player::new(TimelineRegistry::builtin(), &movie).unwrap()
}

#[test]
fn hello_world_wraps_exactly_once_in_960_plays() {
    let mut player = default_player();
    assert_eq!(player.fps(), 240);
    assert_eq!(player.frame_count(), 960, "4 s at 240 fps");

    let mut wraps = 0;
    for i in 0..960 {
        let played = player.play().unwrap();
        if played.wrapped {
            wraps += 1;
            assert_eq!(i, 959, "the wrap lands on the final frame");
        }
    }

    assert_eq!(wraps, 1);
    assert_eq!(player.cycle(), 1);
}

#[test]
fn frames_are_sign_sized_bgra() {
    let mut player = default_player();
    player.play().unwrap();

    let geometry = SignGeometry::canonical();
    assert_eq!(player.image_data().len(), geometry.frame_len());
    // Alpha plane is opaque everywhere.
    assert!(player.image_data().iter().skip(3).step_by(4).all(|&a| a == 0xff));
}

#[test]
fn mid_cycle_frames_are_not_blank() {
    let mut player = default_player();
    // Advance into the hold phase of the default movie.
    for _ in 0..480 {
        player.play().unwrap();
    }
    let lit = player
        .image_data()
        .chunks_exact(4)
        .filter(|px| px[0] != 0 || px[1] != 0 || px[2] != 0)
        .count();
    assert!(lit > 0, "the title should be visible mid-cycle");
}

#[test]
fn reload_restores_pristine_playback() {
    let mut player = default_player();

    // Capture a frame in the middle of the fade-in, where tween state is
    // far from both keyframe endpoints.
    for _ in 0..120 {
        player.play().unwrap();
    }
    let fresh = player.image_data().to_vec();

    // Churn the tween state deeper into the cycle, then reload.
    for _ in 0..300 {
        player.play().unwrap();
    }
    player.reload().unwrap();
    assert_eq!(player.cycle(), 0);

    for _ in 0..120 {
        player.play().unwrap();
    }
    assert_eq!(
        player.image_data(),
        &fresh[..],
        "compilation must start from an untouched movie description"
    );
}

#[test]
fn load_failure_keeps_the_current_movie() {
    let mut player = default_player();
    player.play().unwrap();

    let broken = Movie::from_json(
        r#"{
            "sign": { "width": 320, "height": 64 },
            "screenplay": [ { "timeline": "no_such_function" } ]
        }"#,
    )
    .unwrap();

    assert!(player.load(&broken).is_err());

    // The old movie still plays to the end of its cycle.
    let mut wrapped = false;
    for _ in 0..960 {
        wrapped |= player.play().unwrap().wrapped;
    }
    assert!(wrapped);
}

#[test]
fn brightness_dims_rendered_pixels() {
    let mut player = default_player();
    for _ in 0..480 {
        player.play().unwrap();
    }
    let bright: u64 = player.image_data().iter().map(|&b| u64::from(b)).sum();

    let mut dim_player = default_player();
    dim_player.set_brightness(Brightness::clamped(20));
    for _ in 0..480 {
        dim_player.play().unwrap();
    }
    let dim: u64 = dim_player.image_data().iter().map(|&b| u64::from(b)).sum();

    assert!(dim < bright, "lower brightness must darken the raster");
}

#[test]
fn empty_movie_wraps_once_per_play_and_stays_blank() {
    let movie = Movie::from_json(
        r#"{
            "sign": { "width": 320, "height": 64 },
            "screenplay": []
        }"#,
    )
    .unwrap();
    let mut player = Player::new(TimelineRegistry::builtin(), &movie).unwrap();
    assert_eq!(player.frame_count(), 1, "an empty timeline floors at one frame");

    // Nothing is ever active, so each play walks the capped retry loop,
    // reports exactly one wrap, and advances the cycle by exactly one.
    for expected_cycle in 1..=3 {
        let played = player.play().unwrap();
        assert!(played.wrapped);
        assert_eq!(player.cycle(), expected_cycle);
    }

    assert!(
        player
            .image_data()
            .chunks_exact(4)
            .all(|px| px[0] == 0 && px[1] == 0 && px[2] == 0),
        "a never-active movie renders black"
    );
}

#[test]
fn cycles_rotate_the_title_color() {
    let mut player = default_player();

    for _ in 0..480 {
        player.play().unwrap();
    }
    let cycle0 = player.image_data().to_vec();

    for _ in 0..960 {
        player.play().unwrap();
    }
    assert_eq!(player.cycle(), 1);
    let cycle1 = player.image_data().to_vec();

    assert_ne!(cycle0, cycle1, "per-cycle compilation should shift the palette");
}
