//! Item systems: overlaps → trace candidates, pickup → interp → delivery

use bevy::prelude::*;

use super::components::{Item, ItemKind, ItemState};
use super::events::{
    AmmoCollectOverlap, DeliveredItem, ItemDelivered, ItemOverlap, ItemStateChanged, OverlapPhase,
    PickupRequested,
};
use super::interp::ItemInterp;
use crate::config::CombatConfig;
use crate::inventory::InterpLocations;
use crate::services::CombatServices;
use crate::shooter::{CombatEffect, ItemTrace, Shooter, ShooterView, SoundCue};

/// Система: overlap sphere item ↔ персонаж
///
/// Кандидатом на trace становится только item в Pickup state.
pub fn handle_item_overlaps(
    mut overlaps: EventReader<ItemOverlap>,
    items: Query<&Item>,
    mut shooters: Query<&mut ItemTrace>,
) {
    for overlap in overlaps.read() {
        let Ok(mut trace) = shooters.get_mut(overlap.other) else {
            continue;
        };

        match overlap.phase {
            OverlapPhase::Begin => {
                let Ok(item) = items.get(overlap.item) else {
                    continue;
                };
                if item.state() == ItemState::Pickup {
                    trace.begin_overlap(overlap.item);
                }
            }
            OverlapPhase::End => {
                trace.end_overlap(overlap.item);
                if trace.traced_item == Some(overlap.item) && !trace.should_trace {
                    trace.traced_item = None;
                }
            }
        }
    }
}

/// Система: персонаж прошёл через коробку патронов → auto pickup
pub fn handle_ammo_collect(
    mut overlaps: EventReader<AmmoCollectOverlap>,
    items: Query<&Item>,
    shooters: Query<(), With<Shooter>>,
    mut pickups: EventWriter<PickupRequested>,
) {
    for overlap in overlaps.read() {
        if !shooters.contains(overlap.other) {
            continue;
        }
        let Ok(item) = items.get(overlap.item) else {
            continue;
        };

        if matches!(item.kind, ItemKind::Ammo(_)) && item.state() == ItemState::Pickup {
            pickups.write(PickupRequested {
                shooter: overlap.other,
                item: overlap.item,
            });
        }
    }
}

/// Система: старт interp (Pickup → EquipInterping)
///
/// Anchor резервируется до старта; если item уже летит — резерв снимается.
pub fn start_item_interp(
    mut requests: EventReader<PickupRequested>,
    mut items: Query<(&mut Item, &Transform), Without<Shooter>>,
    mut shooters: Query<(&mut Shooter, &ShooterView, &mut InterpLocations)>,
    config: Res<CombatConfig>,
) {
    for request in requests.read() {
        let Ok((mut item, transform)) = items.get_mut(request.item) else {
            continue;
        };
        let Ok((mut shooter, view, mut locations)) = shooters.get_mut(request.shooter) else {
            continue;
        };
        if item.state() != ItemState::Pickup || item.is_interping() {
            continue;
        }

        let anchor_index = locations.reserve(request.item, item.kind);
        let interp = ItemInterp::new(
            request.shooter,
            anchor_index,
            transform,
            view.yaw(),
            config.items.interp_duration,
        );

        if !item.start_interp(interp) {
            locations.release(request.item);
            continue;
        }

        shooter.push_effect(CombatEffect::PlaySound(SoundCue::ItemPickup {
            item: request.item,
        }));

        crate::logger::log_info(&format!(
            "Shooter {:?} picking up {} ({:?}) → anchor {}",
            request.shooter, item.name, request.item, anchor_index
        ));
    }
}

/// Система: шаг interp всех летящих items
///
/// Anchor пересчитывается каждый тик (камера двигается).
/// По окончании anchor освобождается и персонажу уходит `ItemDelivered`.
pub fn interp_items(
    mut items: Query<(Entity, &mut Item, &mut Transform), Without<Shooter>>,
    mut shooters: Query<(&ShooterView, &mut InterpLocations)>,
    services: Res<CombatServices>,
    time: Res<Time>,
    mut delivered: EventWriter<ItemDelivered>,
) {
    let delta_time = time.delta_secs();

    for (entity, mut item, mut transform) in items.iter_mut() {
        let Some(interp) = item.interp.as_mut() else {
            continue;
        };
        let owner = interp.shooter;

        let Ok((view, mut locations)) = shooters.get_mut(owner) else {
            // Персонаж исчез — item снова лежит в мире
            item.abort_interp();
            crate::logger::log(&format!("Interp of {:?} aborted: shooter gone", entity));
            continue;
        };

        let anchor = locations.anchor_world(interp.anchor_index, view);
        let pose = interp.advance(delta_time, anchor, view.yaw(), services.curves.as_ref());

        transform.translation = pose.location;
        transform.rotation = Quat::from_rotation_y(pose.yaw);
        transform.scale = Vec3::splat(pose.scale);

        if !pose.finished {
            continue;
        }

        item.finish_interp();
        locations.release(entity);

        let payload = match item.kind {
            ItemKind::Weapon => DeliveredItem::Weapon,
            ItemKind::Ammo(ammo_type) => DeliveredItem::Ammo {
                ammo_type,
                count: item.count,
            },
        };
        delivered.write(ItemDelivered {
            item: entity,
            shooter: owner,
            payload,
        });
    }
}

/// Система: item удалён (в том числе посреди interp) → освободить anchor и trace
pub fn release_removed_items(
    mut removed: RemovedComponents<Item>,
    mut shooters: Query<(&mut InterpLocations, &mut ItemTrace)>,
) {
    for entity in removed.read() {
        for (mut locations, mut trace) in shooters.iter_mut() {
            locations.release(entity);
            trace.end_overlap(entity);
            if trace.traced_item == Some(entity) {
                trace.traced_item = None;
            }
        }
    }
}

/// Система: glow pulse (Pickup / EquipInterping)
pub fn update_item_pulse(
    mut items: Query<&mut Item>,
    services: Res<CombatServices>,
    time: Res<Time>,
) {
    let delta_time = time.delta_secs();

    for mut item in items.iter_mut() {
        let state = item.state();
        if !matches!(state, ItemState::Pickup | ItemState::EquipInterping) {
            continue;
        }

        let progress = item.interp.as_ref().map(ItemInterp::progress);
        item.pulse
            .tick(delta_time, state, progress, services.curves.as_ref());
    }
}

/// Система: state change → host (visibility / physics / collision)
pub fn report_item_state_changes(
    mut items: Query<(Entity, &mut Item)>,
    mut changes: EventWriter<ItemStateChanged>,
) {
    for (entity, mut item) in items.iter_mut() {
        let Some(state) = item.bypass_change_detection().take_state_change() else {
            continue;
        };

        changes.write(ItemStateChanged {
            item: entity,
            state,
            presentation: state.presentation(),
        });
    }
}
