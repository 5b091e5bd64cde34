//! Head motion → poses → controller, live and orbit modes.

#[path = "helpers/mod.rs"]
mod helpers;

use approx::assert_abs_diff_eq;
use glam::DVec3;
use helpers::running_harness;
use helpers::tolerances::POSE_EPSILON;
use marble::prelude::*;
use marble::{ListenerOrientation, MotionPublisher};

fn connected_source(h: &mut helpers::Harness) -> (ChannelMotionSource, MotionPublisher) {
    let (mut source, publisher) = ChannelMotionSource::new();
    h.controller.attach_motion(source.subscribe().unwrap());
    source.start().unwrap();
    publisher.set_connected(true);
    (source, publisher)
}

fn tilt(t: f64, roll: f64, pitch: f64, yaw: f64) -> MotionSample {
    MotionSample::from_attitude(t, roll, pitch, Some(yaw))
}

// =============================================================================
// Live mode
// =============================================================================

#[test]
fn test_sample_moves_beacon_and_listener() {
    let mut h = running_harness();
    let (_source, publisher) = connected_source(&mut h);

    // Pitch forward puts the beacon in front.
    assert!(publisher.publish(tilt(0.0, 0.0, 0.4, 0.3)));
    assert_eq!(h.controller.pump_motion(), 1);
    assert!(h.controller.is_sensor_connected());

    let beacon = h.controller.source_position(VoiceKind::Beacon).unwrap();
    assert_abs_diff_eq!(beacon.z, -1.8, epsilon = POSE_EPSILON);
    assert_abs_diff_eq!(beacon.x, 0.0, epsilon = POSE_EPSILON);

    let listener = h.controller.listener().unwrap();
    assert_abs_diff_eq!(listener.yaw, 0.3, epsilon = POSE_EPSILON);
    assert_eq!(listener.pitch, 0.0);
    assert_eq!(listener.roll, 0.0);
}

#[test]
fn test_beacon_stays_on_radius() {
    let mut h = running_harness();
    let (_source, publisher) = connected_source(&mut h);

    for (i, (roll, pitch)) in [(0.3, 0.1), (-0.8, 0.2), (0.05, -0.6), (1.2, 1.1)]
        .into_iter()
        .enumerate()
    {
        publisher.publish(tilt(i as f64 * 0.02, roll, pitch, 0.0));
        h.controller.pump_motion();
        let beacon = h.controller.source_position(VoiceKind::Beacon).unwrap();
        assert_abs_diff_eq!(beacon.length(), 1.8, epsilon = POSE_EPSILON);
        assert_eq!(beacon.y, 0.0);
    }
}

#[test]
fn test_backlog_applies_latest_only() {
    let mut h = running_harness();
    let (_source, publisher) = connected_source(&mut h);

    for i in 0..10 {
        publisher.publish(tilt(i as f64 * 0.01, 0.0, 0.4, i as f64 * 0.1));
    }
    assert_eq!(h.controller.pump_motion(), 1);
    let listener = h.controller.listener().unwrap();
    assert_abs_diff_eq!(listener.yaw, 0.9, epsilon = POSE_EPSILON);
}

#[test]
fn test_non_finite_sample_holds_pose() {
    let mut h = running_harness();
    let (_source, publisher) = connected_source(&mut h);

    publisher.publish(tilt(0.0, 0.5, 0.0, 0.2));
    h.controller.pump_motion();
    let held = h.controller.source_position(VoiceKind::Beacon).unwrap();
    let energy = h.controller.movement_energy();

    publisher.publish(tilt(0.1, f64::NAN, 0.0, f64::INFINITY));
    assert_eq!(h.controller.pump_motion(), 0);
    assert_eq!(
        h.controller.source_position(VoiceKind::Beacon).unwrap(),
        held
    );
    assert!(h.controller.listener().unwrap().is_finite());
    assert_eq!(h.controller.movement_energy(), energy);

    publisher.publish(tilt(0.2, -0.5, 0.0, 0.0));
    assert_eq!(h.controller.pump_motion(), 1);
    assert_ne!(
        h.controller.source_position(VoiceKind::Beacon).unwrap(),
        held
    );
}

#[test]
fn test_disconnect_freezes_pose() {
    let mut h = running_harness();
    let (_source, publisher) = connected_source(&mut h);

    publisher.publish(tilt(0.0, 0.5, 0.0, 0.2));
    h.controller.pump_motion();
    let frozen = h.controller.source_position(VoiceKind::Beacon).unwrap();

    publisher.set_connected(false);
    assert!(!publisher.publish(tilt(0.1, -0.5, 0.0, 1.0)));
    assert_eq!(h.controller.pump_motion(), 0);
    assert!(!h.controller.is_sensor_connected());
    assert_eq!(
        h.controller.source_position(VoiceKind::Beacon).unwrap(),
        frozen
    );

    publisher.set_connected(true);
    publisher.publish(tilt(0.2, -0.5, 0.0, 1.0));
    assert_eq!(h.controller.pump_motion(), 1);
    assert_ne!(
        h.controller.source_position(VoiceKind::Beacon).unwrap(),
        frozen
    );
}

#[test]
fn test_pump_without_subscription() {
    let mut h = running_harness();
    assert_eq!(h.controller.pump_motion(), 0);
}

#[test]
fn test_movement_energy_tracks_rotation() {
    let mut h = running_harness();
    let (_source, publisher) = connected_source(&mut h);
    assert_eq!(h.controller.movement_energy().value(), 0.0);

    let sample = tilt(0.0, 0.0, 0.0, 0.0).with_rotation_rate(DVec3::new(0.0, 3.0, 0.0));
    publisher.publish(sample);
    h.controller.pump_motion();
    assert_abs_diff_eq!(h.controller.movement_energy().value(), 0.5, epsilon = 1e-9);
}

// =============================================================================
// Orbit mode
// =============================================================================

#[test]
fn test_orbit_circles_at_radius() {
    let mut h = running_harness();
    h.controller.set_drive_mode(DriveMode::Orbit);

    let mut last = None;
    for _ in 0..50 {
        let update = h.controller.tick(0.05).unwrap();
        let beacon = h.controller.source_position(VoiceKind::Beacon).unwrap();
        assert_eq!(beacon, update.source.position);
        assert_abs_diff_eq!(beacon.length(), 1.8, epsilon = POSE_EPSILON);
        assert_ne!(Some(beacon), last);
        last = Some(beacon);
    }
    let listener = h.controller.listener().unwrap();
    assert_eq!(listener, ListenerOrientation::default());
}

#[test]
fn test_orbit_uses_mapping_radius() {
    let mut config = ControllerConfig::default();
    config.mapping.radius = 0.75;
    let mut h = helpers::harness_with(config);
    h.controller.start().unwrap();
    h.controller.set_drive_mode(DriveMode::Orbit);

    for _ in 0..10 {
        let update = h.controller.tick(0.1).unwrap();
        assert_abs_diff_eq!(
            update.source.position.length(),
            0.75,
            epsilon = POSE_EPSILON
        );
    }
}

#[test]
fn test_orbit_ignores_sensor() {
    let mut h = running_harness();
    let (_source, publisher) = connected_source(&mut h);
    h.controller.set_drive_mode(DriveMode::Orbit);

    publisher.publish(tilt(0.0, 0.5, 0.5, 0.5));
    assert_eq!(h.controller.pump_motion(), 0);
    assert!(h.controller.is_sensor_connected());
}

#[test]
fn test_tick_is_noop_in_live_mode() {
    let mut h = running_harness();
    assert_eq!(h.controller.drive_mode(), DriveMode::Live);
    assert!(h.controller.tick(0.1).is_none());
}

#[test]
fn test_orbit_rpm_is_validated() {
    let mut h = running_harness();
    assert!(h.controller.set_orbit_rpm(12.0).is_ok());
    assert!(h.controller.set_orbit_rpm(-1.0).is_err());
}
