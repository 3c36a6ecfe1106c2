//! Enemy systems: overlaps, bullet hits, notifies, tick, melee hits, effect flush

use bevy::prelude::*;

use super::components::{Enemy, EnemyHit};
use super::events::{EnemyNotify, EnemyNotifyKind, EnemyOverlap, EnemyWeaponOverlap, EnemyZone};
use crate::damage::{Damageable, DamageDealt, Dead, DespawnAfter, EntityDied, Health};
use crate::items::OverlapPhase;
use crate::services::HitZone;
use crate::shooter::{BulletHit, CombatEffectEvent, Shooter};
use crate::DeterministicRng;

/// Система: aggro sphere / combat range sphere
pub fn handle_enemy_overlaps(
    mut overlaps: EventReader<EnemyOverlap>,
    mut enemies: Query<&mut Enemy>,
    shooters: Query<(), With<Shooter>>,
) {
    for overlap in overlaps.read() {
        if !shooters.contains(overlap.other) {
            continue;
        }
        let Ok(mut enemy) = enemies.get_mut(overlap.enemy) else {
            continue;
        };

        match (overlap.zone, overlap.phase) {
            (EnemyZone::Aggro, OverlapPhase::Begin) => enemy.on_aggro(overlap.other),
            (EnemyZone::Aggro, OverlapPhase::End) => {}
            (EnemyZone::CombatRange, phase) => {
                enemy.set_in_attack_range(phase == OverlapPhase::Begin)
            }
        }
    }
}

/// Система: пули игрока по врагам
///
/// Head-shot урон уже выбран стрелком по `HitZone`.
pub fn apply_bullet_hits(
    mut hits: EventReader<BulletHit>,
    mut enemies: Query<(&mut Enemy, &mut Health)>,
    mut rng: ResMut<DeterministicRng>,
    mut damage_events: EventWriter<DamageDealt>,
    mut death_events: EventWriter<EntityDied>,
) {
    for hit in hits.read() {
        let Ok((mut enemy, mut health)) = enemies.get_mut(hit.target) else {
            continue;
        };

        let Some(outcome) = enemy.take_hit(
            EnemyHit {
                damage: hit.damage,
                zone: hit.zone,
                location: hit.location,
                instigator: Some(hit.shooter),
            },
            &mut health,
            &mut rng.rng,
        ) else {
            continue;
        };

        damage_events.write(DamageDealt {
            attacker: hit.shooter,
            target: hit.target,
            damage: outcome.damage,
            zone: hit.zone,
            target_died: outcome.died,
        });

        if outcome.died {
            death_events.write(EntityDied {
                entity: hit.target,
                killer: Some(hit.shooter),
            });
            crate::logger::log_info(&format!(
                "Enemy {:?} killed by {:?}{}",
                hit.target,
                hit.shooter,
                if hit.zone == HitZone::Head { " (headshot)" } else { "" }
            ));
        }
    }
}

/// Система: animation notifies врага
///
/// FinishDeath → `Dead` + `DespawnAfter(death_time)`.
pub fn process_enemy_notify(
    mut commands: Commands,
    mut notifies: EventReader<EnemyNotify>,
    mut enemies: Query<&mut Enemy>,
    time: Res<Time>,
) {
    for notify in notifies.read() {
        let Ok(mut enemy) = enemies.get_mut(notify.enemy) else {
            continue;
        };

        match notify.kind {
            EnemyNotifyKind::FinishAttack => {
                enemy.finish_attack();
            }
            EnemyNotifyKind::FinishStun => {
                enemy.finish_stun();
            }
            EnemyNotifyKind::ActivateWeapon(side) => {
                enemy.activate_weapon(side);
            }
            EnemyNotifyKind::DeactivateWeapon(side) => enemy.deactivate_weapon(side),
            EnemyNotifyKind::FinishDeath => {
                if enemy.finish_death() {
                    let despawn_time = time.elapsed_secs() + enemy.death_time();
                    commands
                        .entity(notify.enemy)
                        .insert((Dead, DespawnAfter { despawn_time }));
                }
            }
        }
    }
}

/// Система: enemy timers + атака
pub fn tick_enemies(
    mut enemies: Query<&mut Enemy>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
) {
    let delta_time = time.delta_secs();
    for mut enemy in enemies.iter_mut() {
        enemy.tick(delta_time, &mut rng.rng);
    }
}

/// Система: melee swing задел игрока
pub fn apply_enemy_weapon_hits(
    mut overlaps: EventReader<EnemyWeaponOverlap>,
    mut enemies: Query<&mut Enemy>,
    mut victims: Query<&mut Health, (With<Shooter>, Without<Enemy>)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut death_events: EventWriter<EntityDied>,
) {
    for overlap in overlaps.read() {
        let Ok(mut enemy) = enemies.get_mut(overlap.enemy) else {
            continue;
        };
        let Ok(mut health) = victims.get_mut(overlap.victim) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }
        let Some(damage) = enemy.weapon_hit(overlap.side) else {
            continue;
        };

        let remaining = health.take_damage(damage, Some(overlap.enemy));
        let died = remaining <= 0.0;

        damage_events.write(DamageDealt {
            attacker: overlap.enemy,
            target: overlap.victim,
            damage,
            zone: HitZone::Body,
            target_died: died,
        });

        if died {
            death_events.write(EntityDied {
                entity: overlap.victim,
                killer: Some(overlap.enemy),
            });
            crate::logger::log_info(&format!(
                "Shooter {:?} killed by enemy {:?}",
                overlap.victim, overlap.enemy
            ));
        }
    }
}

/// Система: enemy effect outbox → host
pub fn flush_enemy_effects(
    mut enemies: Query<(Entity, &mut Enemy)>,
    mut effects: EventWriter<CombatEffectEvent>,
) {
    for (source, mut enemy) in enemies.iter_mut() {
        if enemy.pending_effects().is_empty() {
            continue;
        }
        for effect in enemy.drain_effects() {
            effects.write(CombatEffectEvent { source, effect });
        }
    }
}
