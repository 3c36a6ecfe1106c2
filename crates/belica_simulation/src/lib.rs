//! BELICA Simulation Core
//!
//! ECS-симуляция боя third-person shooter на Bevy 0.16 (strategic layer)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = combat state machine, items, inventory, ammo, враги
//! - Host engine = рендер, анимация, физика, UI, звук
//!
//! Host → ECS: input/notify/overlap события + `CombatServices` (ray queries, curves).
//! ECS → host: `CombatEffectEvent` и typed события (вместо engine delegates).

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ammo;
pub mod config;
pub mod damage;
pub mod enemy;
pub mod explosives;
pub mod inventory;
pub mod items;
pub mod logger;
pub mod pickups;
pub mod services;
pub mod shooter;
pub mod weapon;

// Re-export основных типов
pub use ammo::{AmmoInventory, AmmoType};
pub use config::{CombatConfig, ConfigError, EnemyConfig, ItemTuning, ShooterTuning};
pub use damage::{Damageable, DamageDealt, Dead, DespawnAfter, EntityDied, Health};
pub use enemy::{spawn_enemy, Enemy, EnemyPlugin, EnemyState};
pub use explosives::{spawn_explosive, Explosive, ExplosiveOverlap};
pub use inventory::{InterpLocations, InventorySlots};
pub use items::{spawn_ammo, Item, ItemKind, ItemRarity, ItemState, ItemsPlugin};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use pickups::{spawn_health_pickup, HealthPickup, HealthPickupOverlap};
pub use services::{CombatServices, CurveSampler, HitZone, RayHit, RayQuery};
pub use shooter::{spawn_shooter, CombatState, Shooter, ShooterAction, ShooterPlugin};
pub use weapon::{spawn_weapon, Weapon, WeaponType};

/// Шаг симуляции headless (60 Hz)
pub const SIMULATION_STEP: f64 = 1.0 / 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Порядок кадра фиксирован одной цепочкой: input → timers →
/// camera/crosshair → item trace → capsule → items → weapons →
/// shooter effects → враги → взрывчатка → pickups → enemy effects.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перезаписываем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.init_resource::<CombatConfig>()
            .init_resource::<CombatServices>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<HealthPickupOverlap>()
            .add_event::<ExplosiveOverlap>()
            .add_plugins((ShooterPlugin, ItemsPlugin, EnemyPlugin))
            .add_systems(
                Update,
                (
                    // Host input + timers
                    (
                        shooter::process_shooter_input,
                        shooter::process_shooter_notify,
                        shooter::tick_shooter_timers,
                    )
                        .chain(),
                    // Per-frame interpolation (camera → crosshair → trace → capsule)
                    (
                        shooter::update_camera_zoom,
                        shooter::update_crosshair_spread,
                        shooter::trace_for_items,
                        shooter::interp_capsule_half_height,
                    )
                        .chain(),
                    // Item lifecycle
                    (
                        items::handle_item_overlaps,
                        items::handle_ammo_collect,
                        items::start_item_interp,
                        items::interp_items,
                        items::release_removed_items,
                        items::update_item_pulse,
                    )
                        .chain(),
                    shooter::deliver_items,
                    weapon::tick_weapons,
                    items::report_item_state_changes,
                    // BulletHit должен уйти до enemy систем
                    shooter::flush_shooter_effects,
                    (
                        enemy::handle_enemy_overlaps,
                        enemy::apply_bullet_hits,
                        enemy::process_enemy_notify,
                        enemy::tick_enemies,
                        enemy::apply_enemy_weapon_hits,
                    )
                        .chain(),
                    (
                        explosives::handle_explosive_overlaps,
                        explosives::detonate_explosives,
                    )
                        .chain(),
                    pickups::apply_health_pickups,
                    damage::despawn_after_timeout,
                    enemy::flush_enemy_effects,
                )
                    .chain(),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время идёт фиксированным шагом `SIMULATION_STEP` на каждый `update()`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            SIMULATION_STEP,
        )));

    app
}
