//! Headless симуляция BELICA
//!
//! Scripted encounter: игрок с SMG против одного врага, коробка патронов,
//! пистолет на полу и аптечка. Host (анимации) эмулируется системой,
//! которая мгновенно завершает каждую запрошенную sequence.

use belica_simulation::enemy::{EnemyNotify, EnemyNotifyKind, EnemyOverlap, EnemyZone};
use belica_simulation::items::{AmmoCollectOverlap, ItemOverlap, OverlapPhase};
use belica_simulation::services::FixedRayQuery;
use belica_simulation::shooter::{
    CombatEffect, CombatEffectEvent, SequenceId, ShooterInput, ShooterNotify, ShooterNotifyKind,
};
use belica_simulation::*;
use bevy::prelude::*;

const TICKS: u32 = 900;

/// Host: sequence закончилась сразу после старта
fn instant_animations(
    mut effects: EventReader<CombatEffectEvent>,
    mut shooter_notify: EventWriter<ShooterNotify>,
    mut enemy_notify: EventWriter<EnemyNotify>,
    enemies: Query<(), With<Enemy>>,
) {
    for event in effects.read() {
        let CombatEffect::PlaySequence {
            sequence, ticket, ..
        } = &event.effect
        else {
            continue;
        };

        match (sequence, ticket) {
            (SequenceId::Reload, Some(ticket)) => {
                shooter_notify.write(ShooterNotify {
                    shooter: event.source,
                    kind: ShooterNotifyKind::FinishReloading(*ticket),
                });
            }
            (SequenceId::Equip, Some(ticket)) => {
                shooter_notify.write(ShooterNotify {
                    shooter: event.source,
                    kind: ShooterNotifyKind::FinishEquipping(*ticket),
                });
            }
            (SequenceId::HitReact, _) if enemies.contains(event.source) => {
                enemy_notify.write(EnemyNotify {
                    enemy: event.source,
                    kind: EnemyNotifyKind::FinishStun,
                });
            }
            (SequenceId::Attack, _) if enemies.contains(event.source) => {
                enemy_notify.write(EnemyNotify {
                    enemy: event.source,
                    kind: EnemyNotifyKind::FinishAttack,
                });
            }
            (SequenceId::Death, _) if enemies.contains(event.source) => {
                enemy_notify.write(EnemyNotify {
                    enemy: event.source,
                    kind: EnemyNotifyKind::FinishDeath,
                });
            }
            _ => {}
        }
    }
}

fn main() {
    let seed = 42;
    println!("Starting BELICA headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin).add_systems(
        Update,
        instant_animations.after(enemy::flush_enemy_effects),
    );

    let config = app.world().resource::<CombatConfig>().clone();
    let (player, enemy, ammo_box, pistol, medkit) = {
        let mut commands = app.world_mut().commands();
        let player = spawn_shooter(&mut commands, &config, Transform::default());
        let enemy = spawn_enemy(
            &mut commands,
            &config,
            Transform::from_xyz(0.0, 0.0, -800.0),
        );
        let ammo_box = spawn_ammo(
            &mut commands,
            &config,
            AmmoType::NineMm,
            30,
            Transform::from_xyz(50.0, 0.0, -100.0),
        );
        let pistol = spawn_weapon(
            &mut commands,
            &config,
            WeaponType::Pistol,
            ItemRarity::Rare,
            Transform::from_xyz(-50.0, 0.0, -100.0),
        );
        let medkit = spawn_health_pickup(&mut commands, &config, Transform::default());
        (player, enemy, ammo_box, pistol, medkit)
    };
    app.world_mut().flush();

    // Враг прямо по курсу: каждая пуля — headshot
    app.insert_resource(CombatServices::with_rays(FixedRayQuery(
        RayHit::blocked_at(Vec3::new(0.0, 80.0, -800.0), Some(enemy)).with_zone(HitZone::Head),
    )));

    for tick in 0..TICKS {
        let world = app.world_mut();
        match tick {
            10 => {
                world.send_event(EnemyOverlap {
                    enemy,
                    other: player,
                    zone: EnemyZone::Aggro,
                    phase: OverlapPhase::Begin,
                });
            }
            20 => {
                world.send_event(ShooterInput {
                    shooter: player,
                    action: ShooterAction::FirePressed,
                });
            }
            200 => {
                world.send_event(ShooterInput {
                    shooter: player,
                    action: ShooterAction::FireReleased,
                });
                world.send_event(AmmoCollectOverlap {
                    item: ammo_box,
                    other: player,
                });
                world.send_event(HealthPickupOverlap {
                    pickup: medkit,
                    other: player,
                });
            }
            300 => {
                // Прицел на пистолет на полу
                world.insert_resource(CombatServices::with_rays(FixedRayQuery(
                    RayHit::blocked_at(Vec3::new(-50.0, 0.0, -100.0), Some(pistol)),
                )));
                world.send_event(ItemOverlap {
                    item: pistol,
                    other: player,
                    phase: OverlapPhase::Begin,
                });
                world.send_event(ShooterInput {
                    shooter: player,
                    action: ShooterAction::ReloadPressed,
                });
            }
            310 => {
                world.send_event(ShooterInput {
                    shooter: player,
                    action: ShooterAction::EquipPressed,
                });
            }
            400 => {
                world.send_event(ShooterInput {
                    shooter: player,
                    action: ShooterAction::SelectSlot(1),
                });
            }
            _ => {}
        }

        app.update();

        if tick % 100 == 0 {
            let world = app.world_mut();
            let reserve = world
                .get::<AmmoInventory>(player)
                .map_or(0, |ammo| ammo.reserve(AmmoType::NineMm));
            let state = world.get::<Shooter>(player).map(|s| s.combat_state);
            let enemy_health = world.get::<Health>(enemy).map(|h| h.current);
            let weapon = world
                .get::<Shooter>(player)
                .and_then(|s| s.equipped_weapon)
                .and_then(|weapon| world.get::<Weapon>(weapon))
                .map(|weapon| weapon.weapon_type);
            println!(
                "Tick {}: shooter {:?} with {:?}, 9mm reserve {}, enemy health {:?}",
                tick, state, weapon, reserve, enemy_health
            );
        }
    }

    println!("Simulation complete!");
}
