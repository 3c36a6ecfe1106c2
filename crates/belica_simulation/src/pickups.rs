//! Health pickup: лечит игрока при overlap и исчезает

use bevy::prelude::*;
use std::collections::HashSet;

use crate::config::CombatConfig;
use crate::damage::Health;
use crate::shooter::{CombatEffect, CombatEffectEvent, Shooter, SoundCue};

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HealthPickup {
    pub amount: f32,
}

/// Host: collision sphere аптечки пересеклась с кем-то
#[derive(Event, Debug, Clone)]
pub struct HealthPickupOverlap {
    pub pickup: Entity,
    pub other: Entity,
}

pub fn spawn_health_pickup(
    commands: &mut Commands,
    config: &CombatConfig,
    transform: Transform,
) -> Entity {
    commands
        .spawn((
            HealthPickup {
                amount: config.items.health_pickup_amount,
            },
            transform,
        ))
        .id()
}

/// Система: лечение (клампится к max health), звук, despawn
///
/// Одна аптечка срабатывает максимум один раз, даже если за кадр
/// пришло несколько overlaps.
pub fn apply_health_pickups(
    mut commands: Commands,
    mut overlaps: EventReader<HealthPickupOverlap>,
    pickups: Query<&HealthPickup>,
    mut shooters: Query<&mut Health, With<Shooter>>,
    mut effects: EventWriter<CombatEffectEvent>,
) {
    let mut consumed = HashSet::new();

    for overlap in overlaps.read() {
        if consumed.contains(&overlap.pickup) {
            continue;
        }
        let Ok(pickup) = pickups.get(overlap.pickup) else {
            continue;
        };
        let Ok(mut health) = shooters.get_mut(overlap.other) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        health.heal(pickup.amount);
        consumed.insert(overlap.pickup);

        effects.write(CombatEffectEvent {
            source: overlap.pickup,
            effect: CombatEffect::PlaySound(SoundCue::HealthPickup),
        });
        commands.entity(overlap.pickup).despawn();

        crate::logger::log_info(&format!(
            "Shooter {:?} healed to {:.0}/{:.0}",
            overlap.other, health.current, health.max
        ));
    }
}
