//! CombatConfig: все tuning-параметры симуляции
//!
//! Defaults совпадают с геймплейными значениями. TOML документ может
//! переопределить любую часть (`#[serde(default)]` на каждом уровне).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::weapon::{WeaponTable, WeaponType};

/// Ошибки загрузки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse combat config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid combat config: {field} {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Персонаж: камера, движение, crosshair, стартовые запасы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterTuning {
    pub max_health: f32,
    pub camera_default_fov: f32,
    pub camera_zoomed_fov: f32,
    pub zoom_interp_speed: f32,
    pub base_movement_speed: f32,
    pub crouch_movement_speed: f32,
    pub standing_capsule_half_height: f32,
    pub crouching_capsule_half_height: f32,
    pub base_ground_friction: f32,
    pub crouching_ground_friction: f32,
    pub capsule_interp_speed: f32,
    /// Fire timer для оружия без собственного rate
    pub automatic_fire_rate: f32,
    /// Окно "только что выстрелил" для crosshair spread
    pub crosshair_shoot_duration: f32,
    pub starting_9mm_ammo: u32,
    pub starting_ar_ammo: u32,
    /// Anchor interp: расстояние вперёд от камеры и подъём над ней
    pub camera_interp_distance: f32,
    pub camera_interp_elevation: f32,
    pub inventory_capacity: usize,
    pub default_weapon: WeaponType,
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            camera_default_fov: 90.0,
            camera_zoomed_fov: 35.0,
            zoom_interp_speed: 20.0,
            base_movement_speed: 650.0,
            crouch_movement_speed: 300.0,
            standing_capsule_half_height: 88.0,
            crouching_capsule_half_height: 44.0,
            base_ground_friction: 2.0,
            crouching_ground_friction: 100.0,
            capsule_interp_speed: 20.0,
            automatic_fire_rate: 0.1,
            crosshair_shoot_duration: 0.05,
            starting_9mm_ammo: 85,
            starting_ar_ammo: 120,
            camera_interp_distance: 250.0,
            camera_interp_elevation: 65.0,
            inventory_capacity: 6,
            default_weapon: WeaponType::SubmachineGun,
        }
    }
}

/// Items: interp, pulse, throw, pistol slide, health pickup, explosives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTuning {
    pub interp_duration: f32,
    pub pulse_period: f32,
    pub glow_amount: f32,
    pub fresnel_exponent: f32,
    pub fresnel_reflect_fraction: f32,
    pub throw_weapon_time: f32,
    pub throw_impulse: f32,
    pub slide_displacement_time: f32,
    pub max_slide_displacement: f32,
    pub health_pickup_amount: f32,
    /// Урон взрыва каждому в overlap sphere
    pub explosive_damage: f32,
}

impl Default for ItemTuning {
    fn default() -> Self {
        Self {
            interp_duration: 0.7,
            pulse_period: 5.0,
            glow_amount: 150.0,
            fresnel_exponent: 3.0,
            fresnel_reflect_fraction: 4.0,
            throw_weapon_time: 0.7,
            throw_impulse: 20_000.0,
            slide_displacement_time: 0.1,
            max_slide_displacement: 4.0,
            health_pickup_amount: 20.0,
            explosive_damage: 100.0,
        }
    }
}

/// Враги: здоровье, урон, stun, тайминги
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub max_health: f32,
    pub base_damage: f32,
    /// Вероятность stun на каждое попадание [0, 1]
    pub stun_chance: f32,
    pub hit_react_time_min: f32,
    pub hit_react_time_max: f32,
    pub attack_wait_time: f32,
    /// Задержка despawn после окончания death анимации
    pub death_time: f32,
    pub health_bar_display_time: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            base_damage: 20.0,
            stun_chance: 0.5,
            hit_react_time_min: 0.5,
            hit_react_time_max: 0.75,
            attack_wait_time: 1.0,
            death_time: 4.0,
            health_bar_display_time: 4.0,
        }
    }
}

/// Конфигурация боя (resource)
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub shooter: ShooterTuning,
    pub weapons: WeaponTable,
    pub items: ItemTuning,
    pub enemy: EnemyConfig,
}

impl CombatConfig {
    /// Частичный TOML поверх defaults + валидация
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = toml::from_str(source)?;
        config.validate()?;

        crate::logger::log_info("Combat config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shooter.inventory_capacity == 0 {
            return Err(ConfigError::invalid("shooter.inventory_capacity", "must be > 0"));
        }

        for (weapon_type, profile) in self.weapons.iter() {
            if profile.magazine_capacity == 0 {
                return Err(ConfigError::invalid(
                    format!("weapons.{:?}.magazine_capacity", weapon_type),
                    "must be > 0",
                ));
            }
            if profile.magazine_ammo > profile.magazine_capacity {
                return Err(ConfigError::invalid(
                    format!("weapons.{:?}.magazine_ammo", weapon_type),
                    format!(
                        "{} exceeds magazine capacity {}",
                        profile.magazine_ammo, profile.magazine_capacity
                    ),
                ));
            }
            if profile.auto_fire_rate <= 0.0 {
                return Err(ConfigError::invalid(
                    format!("weapons.{:?}.auto_fire_rate", weapon_type),
                    "must be > 0",
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.enemy.stun_chance) {
            return Err(ConfigError::invalid("enemy.stun_chance", "must be within [0, 1]"));
        }

        if self.enemy.hit_react_time_min > self.enemy.hit_react_time_max {
            return Err(ConfigError::invalid(
                "enemy.hit_react_time_min",
                "must not exceed hit_react_time_max",
            ));
        }

        Ok(())
    }
}
