//! Weapon systems (throw/falling, slide, upright).

use bevy::prelude::*;

use super::{upright_rotation, Weapon};
use crate::items::{Item, ItemState};
use crate::services::CombatServices;

/// System: weapon timers + presentation
///
/// - Throw timer истёк → Falling → Pickup (снова можно подобрать, pulse перезапущен)
/// - Pistol slide displacement по curve
/// - Пока оружие летит — только yaw rotation
pub fn tick_weapons(
    mut weapons: Query<(Entity, &mut Item, &mut Weapon, &mut Transform)>,
    services: Res<CombatServices>,
    time: Res<Time>,
) {
    let delta_time = time.delta_secs();

    for (entity, mut item, mut weapon, mut transform) in weapons.iter_mut() {
        let outcome = weapon.tick(delta_time, services.curves.as_ref());

        if item.state() != ItemState::Falling {
            continue;
        }

        if weapon.falling {
            transform.rotation = upright_rotation(transform.rotation);
        }

        if outcome.landed {
            item.set_state(ItemState::Pickup);
            crate::logger::log(&format!("Weapon {:?} landed, pickup enabled", entity));
        }
    }
}
