//! Shooter (CombatStateMachine персонажа)
//!
//! Состав:
//! - components: `Shooter`, `CombatState`, камера, crosshair, движение, item trace
//! - actions: `ShooterCtx` — fire/reload/equip/aim/pickup логика
//! - systems: input/notify/timers + per-tick interpolation + effect flush
//! - events: host ↔ ECS
//!
//! Порядок систем задаёт `SimulationPlugin`.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::ammo::AmmoInventory;
use crate::config::CombatConfig;
use crate::damage::Health;
use crate::inventory::{InterpLocations, InventorySlots};
use crate::items::{ItemRarity, ItemState};
use crate::weapon::weapon_components;

pub mod actions;
pub mod components;
pub mod events;
pub mod systems;

#[cfg(test)]
mod actions_tests;
#[cfg(test)]
mod components_tests;

pub use actions::ShooterCtx;
pub use components::{
    CameraZoom, CombatState, Crosshair, ItemTrace, JumpOutcome, Shooter, ShooterMovement,
    ShooterTimer, ShooterView, CROSSHAIR_TRACE_LENGTH, MUZZLE_TRACE_EXTENSION,
};
pub use events::{
    BulletHit, CombatEffect, CombatEffectEvent, EquippedSlotChanged, SequenceId, ShooterAction,
    ShooterInput, ShooterNotify, ShooterNotifyKind, SlotHighlightChanged, SoundCue,
    TraceHighlightChanged, WeaponThrown,
};
pub use systems::*;

/// Shooter plugin: события персонажа
///
/// Системы регистрирует `SimulationPlugin` (единый порядок кадра).
pub struct ShooterPlugin;

impl Plugin for ShooterPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ShooterInput>()
            .add_event::<ShooterNotify>()
            .add_event::<CombatEffectEvent>()
            .add_event::<BulletHit>()
            .add_event::<TraceHighlightChanged>()
            .add_event::<SlotHighlightChanged>()
            .add_event::<EquippedSlotChanged>()
            .add_event::<WeaponThrown>();
    }
}

/// Spawn персонажа с default оружием в слоте 0 (экипировано)
pub fn spawn_shooter(
    commands: &mut Commands,
    config: &CombatConfig,
    transform: Transform,
) -> Entity {
    let tuning = &config.shooter;
    let shooter_entity = commands.spawn_empty().id();
    let weapon_entity = commands.spawn_empty().id();

    let (mut item, weapon) = weapon_components(config, tuning.default_weapon, ItemRarity::Common);
    item.set_state(ItemState::Equipped);
    item.owner = Some(shooter_entity);

    // Слот и slot_index синхронизирует InventorySlots::add
    let mut staged = HashMap::from([(weapon_entity, (item, weapon, transform))]);
    let mut slots = InventorySlots::new(tuning.inventory_capacity);
    let slot = slots.add(weapon_entity, &mut staged).unwrap_or(0);

    let mut shooter = Shooter::with_weapon(weapon_entity);
    shooter.push_effect(CombatEffect::AttachWeapon {
        weapon: weapon_entity,
    });
    shooter.push_effect(CombatEffect::EquippedSlotChanged {
        previous: None,
        current: slot,
    });

    if let Some((item, weapon, weapon_transform)) = staged.remove(&weapon_entity) {
        commands
            .entity(weapon_entity)
            .insert((item, weapon, weapon_transform));
    }

    commands.entity(shooter_entity).insert((
        shooter,
        AmmoInventory::from_tuning(tuning),
        slots,
        InterpLocations::from_tuning(tuning),
        ShooterMovement::from_tuning(tuning),
        ItemTrace::default(),
        ShooterView {
            location: transform.translation,
            rotation: transform.rotation,
        },
        CameraZoom::from_tuning(tuning),
        Crosshair::default(),
        Health::new(tuning.max_health),
        transform,
    ));

    crate::logger::log_info(&format!(
        "Spawned shooter {:?} with {:?} in slot {}",
        shooter_entity, tuning.default_weapon, slot
    ));
    shooter_entity
}
