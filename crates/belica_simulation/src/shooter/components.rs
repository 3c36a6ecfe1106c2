//! Shooter components: combat state, камера, crosshair, движение, item trace

use bevy::prelude::*;

use super::events::CombatEffect;
use crate::config::ShooterTuning;
use crate::services::{interp_to, map_range_clamped, SequenceTracker, Timers};

/// Дальность trace под прицелом
pub const CROSSHAIR_TRACE_LENGTH: f32 = 50_000.0;

/// Второй trace (от дула) продлевается за точку прицела на 25%
pub const MUZZLE_TRACE_EXTENSION: f32 = 1.25;

/// Combat state персонажа
///
/// Все действия (fire/reload/equip) стартуют только из Unoccupied,
/// возврат в Unoccupied — по истечении timer или по notify от анимации.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum CombatState {
    #[default]
    Unoccupied,
    FireTimerInProgress,
    Reloading,
    Equipping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterTimer {
    /// Fire rate timer → AutoFireReset
    AutoFire,
    /// Окно crosshair shooting factor
    CrosshairShoot,
}

/// Игровой персонаж: combat state machine + кнопки + effect outbox
#[derive(Component, Debug, Clone, Default)]
pub struct Shooter {
    pub combat_state: CombatState,
    pub aiming: bool,
    pub aim_button_pressed: bool,
    pub fire_button_pressed: bool,
    /// Только что выстрелил (crosshair shooting factor)
    pub firing_bullet: bool,
    pub equipped_weapon: Option<Entity>,
    pub timers: Timers<ShooterTimer>,
    /// Текущая reload/equip sequence
    pub sequence: SequenceTracker,
    effects: Vec<CombatEffect>,
}

impl Shooter {
    /// Персонаж с оружием в руках (effect outbox пустой)
    pub fn with_weapon(weapon: Entity) -> Self {
        Self {
            equipped_weapon: Some(weapon),
            ..Self::default()
        }
    }

    pub fn push_effect(&mut self, effect: CombatEffect) {
        self.effects.push(effect);
    }

    pub fn pending_effects(&self) -> &[CombatEffect] {
        &self.effects
    }

    pub fn drain_effects(&mut self) -> Vec<CombatEffect> {
        std::mem::take(&mut self.effects)
    }
}

/// Камера персонажа (host пишет каждый кадр)
///
/// Bevy convention: forward = -Z, up = +Y.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ShooterView {
    pub location: Vec3,
    pub rotation: Quat,
}

impl Default for ShooterView {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl ShooterView {
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn yaw(&self) -> f32 {
        let (yaw, _, _) = self.rotation.to_euler(EulerRot::YXZ);
        yaw
    }

    /// Конец trace из центра экрана
    pub fn crosshair_trace_end(&self) -> Vec3 {
        self.location + self.forward() * CROSSHAIR_TRACE_LENGTH
    }
}

/// FOV камеры: плавно к zoomed/default
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct CameraZoom {
    pub current_fov: f32,
    pub default_fov: f32,
    pub zoomed_fov: f32,
    pub interp_speed: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self::from_tuning(&ShooterTuning::default())
    }
}

impl CameraZoom {
    pub fn from_tuning(tuning: &ShooterTuning) -> Self {
        Self {
            current_fov: tuning.camera_default_fov,
            default_fov: tuning.camera_default_fov,
            zoomed_fov: tuning.camera_zoomed_fov,
            interp_speed: tuning.zoom_interp_speed,
        }
    }

    pub fn tick(&mut self, delta_time: f32, aiming: bool) -> f32 {
        let target = if aiming {
            self.zoomed_fov
        } else {
            self.default_fov
        };
        self.current_fov = interp_to(self.current_fov, target, delta_time, self.interp_speed);
        self.current_fov
    }
}

/// Crosshair spread
///
/// spread = 0.5 + velocity + in_air − aim + shooting
///
/// velocity считается напрямую от скорости, остальные факторы плавно
/// сходятся к своим целям каждый тик.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub velocity_factor: f32,
    pub in_air_factor: f32,
    pub aim_factor: f32,
    pub shooting_factor: f32,
    pub spread_multiplier: f32,
}

impl Default for Crosshair {
    fn default() -> Self {
        Self {
            velocity_factor: 0.0,
            in_air_factor: 0.0,
            aim_factor: 0.0,
            shooting_factor: 0.0,
            spread_multiplier: 0.5,
        }
    }
}

impl Crosshair {
    pub fn update(
        &mut self,
        delta_time: f32,
        horizontal_speed: f32,
        airborne: bool,
        aiming: bool,
        firing_bullet: bool,
    ) -> f32 {
        self.velocity_factor = map_range_clamped((0.0, 600.0), (0.0, 1.0), horizontal_speed);

        self.in_air_factor = if airborne {
            interp_to(self.in_air_factor, 2.25, delta_time, 2.25)
        } else {
            interp_to(self.in_air_factor, 0.0, delta_time, 30.0)
        };

        let aim_target = if aiming { 0.6 } else { 0.0 };
        self.aim_factor = interp_to(self.aim_factor, aim_target, delta_time, 30.0);

        let shooting_target = if firing_bullet { 0.3 } else { 0.0 };
        self.shooting_factor = interp_to(self.shooting_factor, shooting_target, delta_time, 60.0);

        self.spread_multiplier = 0.5 + self.velocity_factor + self.in_air_factor - self.aim_factor
            + self.shooting_factor;
        self.spread_multiplier
    }
}

/// Движение персонажа
///
/// Host пишет velocity/airborne, читает max_walk_speed, ground_friction,
/// capsule_half_height и mesh_offset (сдвиг mesh за тик при смене высоты капсулы).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ShooterMovement {
    pub velocity: Vec3,
    pub airborne: bool,
    pub crouching: bool,
    pub max_walk_speed: f32,
    pub ground_friction: f32,
    pub capsule_half_height: f32,
    pub mesh_offset: f32,
    base_speed: f32,
    crouch_speed: f32,
    base_friction: f32,
    crouch_friction: f32,
    standing_half_height: f32,
    crouching_half_height: f32,
    capsule_interp_speed: f32,
}

impl Default for ShooterMovement {
    fn default() -> Self {
        Self::from_tuning(&ShooterTuning::default())
    }
}

/// Итог нажатия jump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// Был crouch — только встали
    StoodUp,
    Jump,
}

impl ShooterMovement {
    pub fn from_tuning(tuning: &ShooterTuning) -> Self {
        Self {
            velocity: Vec3::ZERO,
            airborne: false,
            crouching: false,
            max_walk_speed: tuning.base_movement_speed,
            ground_friction: tuning.base_ground_friction,
            capsule_half_height: tuning.standing_capsule_half_height,
            mesh_offset: 0.0,
            base_speed: tuning.base_movement_speed,
            crouch_speed: tuning.crouch_movement_speed,
            base_friction: tuning.base_ground_friction,
            crouch_friction: tuning.crouching_ground_friction,
            standing_half_height: tuning.standing_capsule_half_height,
            crouching_half_height: tuning.crouching_capsule_half_height,
            capsule_interp_speed: tuning.capsule_interp_speed,
        }
    }

    pub fn horizontal_speed(&self) -> f32 {
        Vec2::new(self.velocity.x, self.velocity.z).length()
    }

    /// Crouch toggle (в воздухе не переключается)
    pub fn toggle_crouch(&mut self) {
        if !self.airborne {
            self.crouching = !self.crouching;
        }

        if self.crouching {
            self.max_walk_speed = self.crouch_speed;
            self.ground_friction = self.crouch_friction;
        } else {
            self.max_walk_speed = self.base_speed;
            self.ground_friction = self.base_friction;
        }
    }

    /// Из crouch — только встать (speed и friction стоячие), иначе прыжок
    pub fn jump(&mut self) -> JumpOutcome {
        if self.crouching {
            self.crouching = false;
            self.max_walk_speed = self.base_speed;
            self.ground_friction = self.base_friction;
            JumpOutcome::StoodUp
        } else {
            JumpOutcome::Jump
        }
    }

    pub fn on_take_aim(&mut self) {
        self.max_walk_speed = self.crouch_speed;
    }

    pub fn on_stop_aiming(&mut self) {
        if !self.crouching {
            self.max_walk_speed = self.base_speed;
        }
    }

    /// Плавная смена высоты капсулы. Возвращает сдвиг mesh за тик.
    pub fn interp_capsule(&mut self, delta_time: f32) -> f32 {
        let target = if self.crouching {
            self.crouching_half_height
        } else {
            self.standing_half_height
        };

        let next = interp_to(
            self.capsule_half_height,
            target,
            delta_time,
            self.capsule_interp_speed,
        );
        let delta = next - self.capsule_half_height;

        self.capsule_half_height = next;
        self.mesh_offset = -delta;
        self.mesh_offset
    }
}

/// Trace items под прицелом (активен пока рядом есть items)
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ItemTrace {
    overlapped_item_count: u32,
    overlapping: Vec<Entity>,
    pub should_trace: bool,
    pub traced_item: Option<Entity>,
    pub traced_item_last_frame: Option<Entity>,
}

impl ItemTrace {
    pub fn overlapped_item_count(&self) -> u32 {
        self.overlapped_item_count
    }

    /// Счётчик клампится к 0; trace включён пока счётчик > 0
    pub fn increment_overlapped_item_count(&mut self, amount: i32) {
        let next = self.overlapped_item_count as i64 + amount as i64;
        if next <= 0 {
            self.overlapped_item_count = 0;
            self.should_trace = false;
        } else {
            self.overlapped_item_count = next as u32;
            self.should_trace = true;
        }
    }

    /// Item вошёл в overlap. false если уже был учтён.
    pub fn begin_overlap(&mut self, item: Entity) -> bool {
        if self.overlapping.contains(&item) {
            return false;
        }
        self.overlapping.push(item);
        self.increment_overlapped_item_count(1);
        true
    }

    /// Item вышел из overlap. false если не был учтён.
    pub fn end_overlap(&mut self, item: Entity) -> bool {
        let Some(index) = self.overlapping.iter().position(|e| *e == item) else {
            return false;
        };
        self.overlapping.swap_remove(index);
        self.increment_overlapped_item_count(-1);
        true
    }

    /// Сбросить трассированный item (после pickup/swap)
    pub fn clear(&mut self) {
        self.traced_item = None;
        self.traced_item_last_frame = None;
    }
}
