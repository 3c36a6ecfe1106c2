//! Shooter systems: input/notify → ShooterCtx, timers, per-tick interpolation,
//! item trace, delivery, effect flush.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::actions::ShooterCtx;
use super::components::{CameraZoom, Crosshair, ItemTrace, Shooter, ShooterMovement, ShooterView};
use super::events::{
    BulletHit, CombatEffect, CombatEffectEvent, EquippedSlotChanged, ShooterInput, ShooterNotify,
    SlotHighlightChanged, TraceHighlightChanged, WeaponThrown,
};
use crate::ammo::AmmoInventory;
use crate::config::CombatConfig;
use crate::inventory::InventorySlots;
use crate::items::{DeliveredItem, Item, ItemDelivered, PickupRequested};
use crate::services::{CombatServices, ServiceContext};
use crate::weapon::{WeaponQueryData, WeaponStore};
use crate::DeterministicRng;

/// Компоненты персонажа, которые нужны combat state machine
pub type ShooterQueryData = (
    &'static mut Shooter,
    &'static mut AmmoInventory,
    &'static mut InventorySlots,
    &'static mut ShooterMovement,
    &'static mut ItemTrace,
    &'static ShooterView,
);

type ShooterItem<'a> = (
    Mut<'a, Shooter>,
    Mut<'a, AmmoInventory>,
    Mut<'a, InventorySlots>,
    Mut<'a, ShooterMovement>,
    Mut<'a, ItemTrace>,
    &'a ShooterView,
);

fn shooter_ctx<'a, W: WeaponStore>(
    entity: Entity,
    (shooter, ammo, slots, movement, trace, view): ShooterItem<'a>,
    weapons: &'a mut W,
    services: ServiceContext<'a>,
    rng: &'a mut ChaCha8Rng,
    config: &'a CombatConfig,
) -> ShooterCtx<'a, W> {
    ShooterCtx {
        entity,
        shooter: shooter.into_inner(),
        ammo: ammo.into_inner(),
        slots: slots.into_inner(),
        movement: movement.into_inner(),
        trace: trace.into_inner(),
        view,
        weapons,
        services,
        rng,
        config,
    }
}

/// Система: кнопки игрока
///
/// EquipPressed с item под прицелом → PickupRequested (interp стартует в items).
pub fn process_shooter_input(
    mut inputs: EventReader<ShooterInput>,
    mut shooters: Query<ShooterQueryData>,
    mut weapons: Query<WeaponQueryData, Without<Shooter>>,
    services: Res<CombatServices>,
    mut rng: ResMut<DeterministicRng>,
    config: Res<CombatConfig>,
    mut pickups: EventWriter<PickupRequested>,
) {
    for input in inputs.read() {
        let Ok(components) = shooters.get_mut(input.shooter) else {
            continue;
        };

        let mut ctx = shooter_ctx(
            input.shooter,
            components,
            &mut weapons,
            services.context(),
            &mut rng.rng,
            &config,
        );

        if let Some(item) = ctx.apply(input.action) {
            pickups.write(PickupRequested {
                shooter: input.shooter,
                item,
            });
        }
    }
}

/// Система: animation notifies (FinishReloading/FinishEquipping/clip)
pub fn process_shooter_notify(
    mut notifies: EventReader<ShooterNotify>,
    mut shooters: Query<ShooterQueryData>,
    mut weapons: Query<WeaponQueryData, Without<Shooter>>,
    services: Res<CombatServices>,
    mut rng: ResMut<DeterministicRng>,
    config: Res<CombatConfig>,
) {
    for notify in notifies.read() {
        let Ok(components) = shooters.get_mut(notify.shooter) else {
            continue;
        };

        shooter_ctx(
            notify.shooter,
            components,
            &mut weapons,
            services.context(),
            &mut rng.rng,
            &config,
        )
        .notify(notify.kind);
    }
}

/// Система: fire rate / crosshair timers
pub fn tick_shooter_timers(
    mut shooters: Query<(Entity, ShooterQueryData)>,
    mut weapons: Query<WeaponQueryData, Without<Shooter>>,
    services: Res<CombatServices>,
    mut rng: ResMut<DeterministicRng>,
    config: Res<CombatConfig>,
    time: Res<Time>,
) {
    let delta_time = time.delta_secs();

    for (entity, components) in shooters.iter_mut() {
        let mut ctx = shooter_ctx(
            entity,
            components,
            &mut weapons,
            services.context(),
            &mut rng.rng,
            &config,
        );

        for handle in ctx.shooter.timers.tick(delta_time) {
            ctx.on_timer(handle);
        }
    }
}

/// Система: FOV к zoomed/default
pub fn update_camera_zoom(mut shooters: Query<(&Shooter, &mut CameraZoom)>, time: Res<Time>) {
    let delta_time = time.delta_secs();
    for (shooter, mut zoom) in shooters.iter_mut() {
        zoom.tick(delta_time, shooter.aiming);
    }
}

/// Система: crosshair spread
pub fn update_crosshair_spread(
    mut shooters: Query<(&Shooter, &ShooterMovement, &mut Crosshair)>,
    time: Res<Time>,
) {
    let delta_time = time.delta_secs();
    for (shooter, movement, mut crosshair) in shooters.iter_mut() {
        crosshair.update(
            delta_time,
            movement.horizontal_speed(),
            movement.airborne,
            shooter.aiming,
            shooter.firing_bullet,
        );
    }
}

/// Система: trace из центра экрана по items рядом
///
/// Работает только пока `overlapped_item_count > 0`.
/// Items в полёте (EquipInterping) не трассируются.
pub fn trace_for_items(
    mut shooters: Query<(Entity, &ShooterView, &mut ItemTrace, &mut InventorySlots)>,
    items: Query<&Item>,
    services: Res<CombatServices>,
    mut trace_events: EventWriter<TraceHighlightChanged>,
    mut slot_events: EventWriter<SlotHighlightChanged>,
) {
    for (shooter, view, mut trace, mut slots) in shooters.iter_mut() {
        if !trace.should_trace {
            if let Some(last) = trace.traced_item_last_frame.take() {
                trace_events.write(TraceHighlightChanged {
                    shooter,
                    item: last,
                    highlighted: false,
                    inventory_full: slots.is_full(),
                });
            }
            trace.traced_item = None;
            if let Some(slot) = slots.unhighlight() {
                slot_events.write(SlotHighlightChanged {
                    shooter,
                    slot,
                    highlighted: false,
                });
            }
            continue;
        }

        let hit = services
            .rays
            .query(view.location, view.crosshair_trace_end());

        let traced = hit.entity.and_then(|entity| {
            let item = items.get(entity).ok()?;
            item.presentation()
                .trace_collision
                .then_some((entity, item.is_weapon()))
        });

        match traced {
            Some((_, true)) => {
                if let Some(slot) = slots.highlight_empty_slot() {
                    slot_events.write(SlotHighlightChanged {
                        shooter,
                        slot,
                        highlighted: true,
                    });
                }
            }
            _ => {
                if let Some(slot) = slots.unhighlight() {
                    slot_events.write(SlotHighlightChanged {
                        shooter,
                        slot,
                        highlighted: false,
                    });
                }
            }
        }

        let traced_item = traced.map(|(entity, _)| entity);
        if traced_item != trace.traced_item_last_frame {
            if let Some(last) = trace.traced_item_last_frame {
                trace_events.write(TraceHighlightChanged {
                    shooter,
                    item: last,
                    highlighted: false,
                    inventory_full: slots.is_full(),
                });
            }
            if let Some(item) = traced_item {
                trace_events.write(TraceHighlightChanged {
                    shooter,
                    item,
                    highlighted: true,
                    inventory_full: slots.is_full(),
                });
            }
        }

        trace.traced_item = traced_item;
        trace.traced_item_last_frame = traced_item;
    }
}

/// Система: высота капсулы (crouch), после trace
pub fn interp_capsule_half_height(mut shooters: Query<&mut ShooterMovement>, time: Res<Time>) {
    let delta_time = time.delta_secs();
    for mut movement in shooters.iter_mut() {
        movement.interp_capsule(delta_time);
    }
}

/// Система: item долетел → в инвентарь / reserve
///
/// Коробка патронов после доставки удаляется из мира.
pub fn deliver_items(
    mut commands: Commands,
    mut deliveries: EventReader<ItemDelivered>,
    mut shooters: Query<ShooterQueryData>,
    mut weapons: Query<WeaponQueryData, Without<Shooter>>,
    services: Res<CombatServices>,
    mut rng: ResMut<DeterministicRng>,
    config: Res<CombatConfig>,
) {
    for delivery in deliveries.read() {
        if let DeliveredItem::Ammo { .. } = delivery.payload {
            commands.entity(delivery.item).despawn();
        }

        let Ok(components) = shooters.get_mut(delivery.shooter) else {
            continue;
        };

        shooter_ctx(
            delivery.shooter,
            components,
            &mut weapons,
            services.context(),
            &mut rng.rng,
            &config,
        )
        .deliver(delivery.item, delivery.payload);
    }
}

/// Система: effect outbox → события для host
///
/// Должна идти до enemy систем (они читают BulletHit).
pub fn flush_shooter_effects(
    mut shooters: Query<(Entity, &mut Shooter)>,
    mut effects: EventWriter<CombatEffectEvent>,
    mut bullet_hits: EventWriter<BulletHit>,
    mut slot_changes: EventWriter<EquippedSlotChanged>,
    mut throws: EventWriter<WeaponThrown>,
) {
    for (source, mut shooter) in shooters.iter_mut() {
        if shooter.pending_effects().is_empty() {
            continue;
        }

        for effect in shooter.drain_effects() {
            match &effect {
                CombatEffect::BulletHit(hit) => {
                    bullet_hits.write(*hit);
                }
                CombatEffect::EquippedSlotChanged { previous, current } => {
                    slot_changes.write(EquippedSlotChanged {
                        shooter: source,
                        previous: *previous,
                        current: *current,
                    });
                }
                CombatEffect::WeaponThrown { weapon, impulse } => {
                    throws.write(WeaponThrown {
                        shooter: source,
                        weapon: *weapon,
                        impulse: *impulse,
                    });
                }
                _ => {}
            }

            effects.write(CombatEffectEvent { source, effect });
        }
    }
}
