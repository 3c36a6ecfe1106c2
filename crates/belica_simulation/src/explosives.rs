//! Взрывчатка: пуля → взрыв → урон всем в overlap sphere → despawn
//!
//! Host сообщает, кто сейчас внутри overlap sphere (`ExplosiveOverlap`).
//! Враги получают урон через `Enemy::take_damage` (dying враг игнорирует),
//! остальные `Health` — напрямую через `Damageable`.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::config::CombatConfig;
use crate::damage::{Damageable, DamageDealt, EntityDied, Health};
use crate::enemy::Enemy;
use crate::items::OverlapPhase;
use crate::services::HitZone;
use crate::shooter::{BulletHit, CombatEffect, CombatEffectEvent, SoundCue};

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Explosive {
    pub damage: f32,
    /// Кто внутри overlap sphere (порядок входа)
    overlapping: Vec<Entity>,
}

impl Explosive {
    pub fn new(damage: f32) -> Self {
        Self {
            damage,
            overlapping: Vec::new(),
        }
    }

    pub fn overlapping(&self) -> &[Entity] {
        &self.overlapping
    }

    pub fn begin_overlap(&mut self, other: Entity) {
        if !self.overlapping.contains(&other) {
            self.overlapping.push(other);
        }
    }

    pub fn end_overlap(&mut self, other: Entity) {
        self.overlapping.retain(|entity| *entity != other);
    }
}

/// Host: overlap sphere взрывчатки пересеклась с кем-то
#[derive(Event, Debug, Clone)]
pub struct ExplosiveOverlap {
    pub explosive: Entity,
    pub other: Entity,
    pub phase: OverlapPhase,
}

pub fn spawn_explosive(
    commands: &mut Commands,
    config: &CombatConfig,
    transform: Transform,
) -> Entity {
    commands
        .spawn((Explosive::new(config.items.explosive_damage), transform))
        .id()
}

/// Система: overlap sphere
pub fn handle_explosive_overlaps(
    mut overlaps: EventReader<ExplosiveOverlap>,
    mut explosives: Query<&mut Explosive>,
) {
    for overlap in overlaps.read() {
        let Ok(mut explosive) = explosives.get_mut(overlap.explosive) else {
            continue;
        };
        match overlap.phase {
            OverlapPhase::Begin => explosive.begin_overlap(overlap.other),
            OverlapPhase::End => explosive.end_overlap(overlap.other),
        }
    }
}

/// Система: пуля попала во взрывчатку
///
/// Одна взрывчатка взрывается максимум один раз, даже если за кадр
/// пришло несколько попаданий.
pub fn detonate_explosives(
    mut commands: Commands,
    mut hits: EventReader<BulletHit>,
    explosives: Query<(&Explosive, &Transform)>,
    mut targets: Query<(&mut Health, Option<&mut Enemy>), Without<Explosive>>,
    mut effects: EventWriter<CombatEffectEvent>,
    mut damage_events: EventWriter<DamageDealt>,
    mut death_events: EventWriter<EntityDied>,
) {
    let mut detonated = HashSet::new();

    for hit in hits.read() {
        if detonated.contains(&hit.target) {
            continue;
        }
        let Ok((explosive, transform)) = explosives.get(hit.target) else {
            continue;
        };
        detonated.insert(hit.target);

        effects.write(CombatEffectEvent {
            source: hit.target,
            effect: CombatEffect::PlaySound(SoundCue::BulletImpact),
        });
        effects.write(CombatEffectEvent {
            source: hit.target,
            effect: CombatEffect::Explosion {
                location: transform.translation,
            },
        });

        for &victim in explosive.overlapping() {
            let Ok((mut health, enemy)) = targets.get_mut(victim) else {
                continue;
            };
            if !health.is_alive() {
                continue;
            }

            let died = match enemy {
                Some(mut enemy) => {
                    match enemy.take_damage(explosive.damage, Some(hit.shooter), &mut health) {
                        Some(outcome) => outcome.died,
                        None => continue,
                    }
                }
                None => health.take_damage(explosive.damage, Some(hit.shooter)) <= 0.0,
            };

            damage_events.write(DamageDealt {
                attacker: hit.shooter,
                target: victim,
                damage: explosive.damage,
                zone: HitZone::Body,
                target_died: died,
            });
            if died {
                death_events.write(EntityDied {
                    entity: victim,
                    killer: Some(hit.shooter),
                });
            }
        }

        commands.entity(hit.target).despawn();
        crate::logger::log_info(&format!(
            "Explosive {:?} detonated by {:?} ({} caught in blast)",
            hit.target,
            hit.shooter,
            explosive.overlapping().len()
        ));
    }
}
