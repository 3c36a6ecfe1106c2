//! Enemy combat controller (melee враги)

use bevy::prelude::*;

use crate::config::CombatConfig;
use crate::damage::Health;

pub mod components;
pub mod events;
pub mod systems;


pub use components::{
    Enemy, EnemyHit, EnemyState, EnemyTimer, HitOutcome, ATTACK_SECTIONS, DEATH_SECTION,
    HIT_REACT_SECTION,
};
pub use events::{
    EnemyNotify, EnemyNotifyKind, EnemyOverlap, EnemyWeaponOverlap, EnemyZone, WeaponSide,
};
pub use systems::*;

/// Enemy plugin: события врагов (системы в `SimulationPlugin`)
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemyOverlap>()
            .add_event::<EnemyNotify>()
            .add_event::<EnemyWeaponOverlap>();
    }
}

pub fn spawn_enemy(commands: &mut Commands, config: &CombatConfig, transform: Transform) -> Entity {
    let entity = commands
        .spawn((
            Enemy::from_config(&config.enemy),
            Health::new(config.enemy.max_health),
            transform,
        ))
        .id();

    crate::logger::log(&format!("Spawned enemy {:?} at {:?}", entity, transform.translation));
    entity
}
