//! Tests for per-tick shooter components (camera, crosshair, movement, trace).

#[cfg(test)]
mod tests {
    use super::super::components::*;
    use crate::config::ShooterTuning;
    use bevy::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_shooter_with_weapon_starts_idle() {
        let weapon = Entity::from_raw(7);
        let shooter = Shooter::with_weapon(weapon);

        assert_eq!(shooter.equipped_weapon, Some(weapon));
        assert_eq!(shooter.combat_state, CombatState::Unoccupied);
        assert!(shooter.pending_effects().is_empty());
        assert!(!shooter.aiming);
    }

    #[test]
    fn test_camera_zoom_converges() {
        let mut zoom = CameraZoom::default();
        assert_eq!(zoom.current_fov, 90.0);

        for _ in 0..120 {
            zoom.tick(DT, true);
        }
        assert!((zoom.current_fov - 35.0).abs() < 0.01);

        // Первый тик обратно — плавный, не скачок
        let fov = zoom.tick(DT, false);
        assert!(fov > 35.0 && fov < 90.0);
    }

    #[test]
    fn test_crosshair_baseline() {
        let mut crosshair = Crosshair::default();
        let spread = crosshair.update(DT, 0.0, false, false, false);
        assert_eq!(spread, 0.5);
    }

    #[test]
    fn test_crosshair_velocity_maps_linearly() {
        let mut crosshair = Crosshair::default();
        crosshair.update(DT, 300.0, false, false, false);
        assert!((crosshair.velocity_factor - 0.5).abs() < 1e-5);

        crosshair.update(DT, 1200.0, false, false, false);
        assert_eq!(crosshair.velocity_factor, 1.0);
    }

    #[test]
    fn test_crosshair_factors_converge() {
        let mut crosshair = Crosshair::default();
        for _ in 0..600 {
            crosshair.update(DT, 0.0, true, true, true);
        }

        assert!((crosshair.in_air_factor - 2.25).abs() < 0.01);
        assert!((crosshair.aim_factor - 0.6).abs() < 0.01);
        assert!((crosshair.shooting_factor - 0.3).abs() < 0.01);
        let expected = 0.5 + 2.25 - 0.6 + 0.3;
        assert!((crosshair.spread_multiplier - expected).abs() < 0.02);
    }

    #[test]
    fn test_crouch_toggle_blocked_in_air() {
        let mut movement = ShooterMovement::default();
        movement.airborne = true;
        movement.toggle_crouch();
        assert!(!movement.crouching);
        assert_eq!(movement.max_walk_speed, 650.0);

        movement.airborne = false;
        movement.toggle_crouch();
        assert!(movement.crouching);
        assert_eq!(movement.max_walk_speed, 300.0);
        assert_eq!(movement.ground_friction, 100.0);
    }

    #[test]
    fn test_jump_from_crouch_restores_standing_movement() {
        let mut movement = ShooterMovement::default();
        movement.toggle_crouch();
        assert_eq!(movement.ground_friction, 100.0);

        assert_eq!(movement.jump(), JumpOutcome::StoodUp);
        assert!(!movement.crouching);
        assert_eq!(movement.max_walk_speed, 650.0);
        assert_eq!(movement.ground_friction, 2.0);

        assert_eq!(movement.jump(), JumpOutcome::Jump);
    }

    #[test]
    fn test_stop_aiming_keeps_crouch_speed() {
        let mut movement = ShooterMovement::default();
        movement.toggle_crouch();
        movement.on_take_aim();
        movement.on_stop_aiming();
        assert_eq!(movement.max_walk_speed, 300.0);
    }

    #[test]
    fn test_capsule_interp_reports_mesh_offset() {
        let tuning = ShooterTuning::default();
        let mut movement = ShooterMovement::from_tuning(&tuning);
        movement.toggle_crouch();

        let offset = movement.interp_capsule(DT);
        // Капсула уменьшается → mesh поднимается на ту же величину
        assert!(offset > 0.0);
        assert!((movement.capsule_half_height + offset - 88.0).abs() < 1e-4);

        for _ in 0..300 {
            movement.interp_capsule(DT);
        }
        assert!((movement.capsule_half_height - 44.0).abs() < 0.01);
    }

    #[test]
    fn test_horizontal_speed_ignores_vertical() {
        let mut movement = ShooterMovement::default();
        movement.velocity = Vec3::new(3.0, 100.0, 4.0);
        assert_eq!(movement.horizontal_speed(), 5.0);
    }

    #[test]
    fn test_item_trace_overlap_count() {
        let mut trace = ItemTrace::default();
        let a = Entity::from_raw(1);
        let b = Entity::from_raw(2);

        assert!(trace.begin_overlap(a));
        assert!(!trace.begin_overlap(a));
        assert!(trace.begin_overlap(b));
        assert_eq!(trace.overlapped_item_count(), 2);
        assert!(trace.should_trace);

        assert!(trace.end_overlap(a));
        assert!(!trace.end_overlap(a));
        assert!(trace.should_trace);
        assert!(trace.end_overlap(b));
        assert!(!trace.should_trace);

        // Счётчик не уходит ниже нуля
        trace.increment_overlapped_item_count(-3);
        assert_eq!(trace.overlapped_item_count(), 0);
    }

    #[test]
    fn test_view_forward_is_neg_z() {
        let view = ShooterView {
            location: Vec3::new(0.0, 100.0, 0.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        };

        assert!((view.forward() - Vec3::NEG_X).length() < 1e-5);
        assert!((view.yaw() - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        let end = view.crosshair_trace_end();
        assert!((end.x + CROSSHAIR_TRACE_LENGTH).abs() < 1.0);
    }
}
