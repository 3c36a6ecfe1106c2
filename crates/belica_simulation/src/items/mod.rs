//! ItemLifecycle: pickup → interp → equip, общий для оружия и патронов
//!
//! State machine item:
//! ```text
//! Pickup ──pickup──▶ EquipInterping ──interp done──▶ PickedUp (ammo, удаляется)
//!   ▲                                            └──▶ PickedUp / Equipped (weapon)
//!   └──── throw timer ──── Falling ◀──── drop/swap ────┘
//! ```

use bevy::prelude::*;

use crate::ammo::AmmoType;
use crate::config::CombatConfig;

pub mod components;
pub mod events;
pub mod interp;
pub mod pulse;
pub mod systems;


pub use components::{Item, ItemKind, ItemPresentation, ItemRarity, ItemState};
pub use events::{
    AmmoCollectOverlap, DeliveredItem, ItemDelivered, ItemOverlap, ItemStateChanged, OverlapPhase,
    PickupRequested,
};
pub use interp::{InterpPose, ItemInterp};
pub use pulse::{PulseParams, PulseState};
pub use systems::*;

/// Items plugin: события lifecycle (системы в `SimulationPlugin`)
pub struct ItemsPlugin;

impl Plugin for ItemsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ItemOverlap>()
            .add_event::<AmmoCollectOverlap>()
            .add_event::<PickupRequested>()
            .add_event::<ItemDelivered>()
            .add_event::<ItemStateChanged>();
    }
}

/// Spawn коробки патронов в мире
pub fn spawn_ammo(
    commands: &mut Commands,
    config: &CombatConfig,
    ammo_type: AmmoType,
    count: u32,
    transform: Transform,
) -> Entity {
    let item = Item::ammo(ammo_type, count).with_pulse(PulseState::from_tuning(&config.items));
    commands.spawn((item, transform)).id()
}
