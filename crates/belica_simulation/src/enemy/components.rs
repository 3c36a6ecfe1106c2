//! EnemyCombatController: aggro → attack range → attack, stun, death
//!
//! ```text
//! Patrolling ──aggro──▶ Aggro ◀──range──▶ InAttackRange ──attack──▶ Attacking
//!                         ▲                                            │
//!                         └──────── FinishAttack / FinishStun ◀── Stunned
//! any ──health 0──▶ Dying (damage игнорируется, despawn после FinishDeath)
//! ```

use bevy::prelude::*;
use rand::Rng;

use super::events::WeaponSide;
use crate::config::EnemyConfig;
use crate::damage::{Damageable, Health};
use crate::services::{HitZone, Timers};
use crate::shooter::{CombatEffect, SequenceId, SoundCue};

pub const HIT_REACT_SECTION: &str = "HitReactFront";
pub const DEATH_SECTION: &str = "DeathA";

/// Четыре варианта атаки (выбор псевдослучайный)
pub const ATTACK_SECTIONS: [&str; 4] = ["AttackLFast", "AttackRFast", "AttackL", "AttackR"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum EnemyState {
    #[default]
    Patrolling,
    Aggro,
    InAttackRange,
    Attacking,
    Stunned,
    Dying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyTimer {
    /// Cooldown между hit reacts
    HitReact,
    /// Пауза между атаками
    AttackWait,
    HealthBar,
}

/// Попадание пули по врагу
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyHit {
    pub damage: f32,
    pub zone: HitZone,
    pub location: Vec3,
    pub instigator: Option<Entity>,
}

/// Итог попадания (для DamageDealt / EntityDied)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: f32,
    pub stunned: bool,
    pub died: bool,
}

/// Враг (melee)
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    state: EnemyState,
    pub target: Option<Entity>,
    pub in_attack_range: bool,
    pub can_attack: bool,
    pub can_hit_react: bool,
    pub left_weapon_active: bool,
    pub right_weapon_active: bool,
    pub health_bar_visible: bool,
    pub timers: Timers<EnemyTimer>,
    config: EnemyConfig,
    death_finished: bool,
    effects: Vec<CombatEffect>,
}

impl Default for Enemy {
    fn default() -> Self {
        Self::from_config(&EnemyConfig::default())
    }
}

impl Enemy {
    pub fn from_config(config: &EnemyConfig) -> Self {
        Self {
            state: EnemyState::Patrolling,
            target: None,
            in_attack_range: false,
            can_attack: true,
            can_hit_react: true,
            left_weapon_active: false,
            right_weapon_active: false,
            health_bar_visible: false,
            timers: Timers::default(),
            config: config.clone(),
            death_finished: false,
            effects: Vec::new(),
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn is_dying(&self) -> bool {
        self.state == EnemyState::Dying
    }

    pub fn drain_effects(&mut self) -> Vec<CombatEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn pending_effects(&self) -> &[CombatEffect] {
        &self.effects
    }

    /// Свободный state (не атакует, не оглушён, жив)
    fn settled_state(&self) -> EnemyState {
        if self.in_attack_range {
            EnemyState::InAttackRange
        } else if self.target.is_some() {
            EnemyState::Aggro
        } else {
            EnemyState::Patrolling
        }
    }

    fn is_busy(&self) -> bool {
        matches!(
            self.state,
            EnemyState::Attacking | EnemyState::Stunned | EnemyState::Dying
        )
    }

    /// Игрок вошёл в aggro sphere
    pub fn on_aggro(&mut self, target: Entity) {
        if self.is_dying() {
            return;
        }

        self.target = Some(target);
        if !self.is_busy() {
            self.state = self.settled_state();
        }
    }

    pub fn set_in_attack_range(&mut self, in_range: bool) {
        if self.is_dying() {
            return;
        }

        self.in_attack_range = in_range;
        if !self.is_busy() {
            self.state = self.settled_state();
        }
    }

    /// Пуля попала. Dying враг урон не получает (None).
    pub fn take_hit(
        &mut self,
        hit: EnemyHit,
        health: &mut Health,
        rng: &mut impl Rng,
    ) -> Option<HitOutcome> {
        if self.is_dying() {
            return None;
        }

        self.effects
            .push(CombatEffect::PlaySound(SoundCue::BulletImpact));
        self.effects.push(CombatEffect::ImpactParticles {
            location: hit.location,
        });

        let mut outcome = self.take_damage(hit.damage, hit.instigator, health)?;
        if outcome.died {
            return Some(outcome);
        }

        outcome.stunned =
            self.can_hit_react && rng.gen_range(0.0f32..1.0) < self.config.stun_chance;
        if outcome.stunned {
            self.stun(rng);
        }
        Some(outcome)
    }

    /// Урон без hit react (взрывы): health bar, aggro, смерть
    pub fn take_damage(
        &mut self,
        amount: f32,
        instigator: Option<Entity>,
        health: &mut Health,
    ) -> Option<HitOutcome> {
        if self.is_dying() {
            return None;
        }

        self.show_health_bar();

        // Стрелявший становится целью
        if let Some(instigator) = instigator {
            self.on_aggro(instigator);
        }

        let remaining = health.take_damage(amount, instigator);
        let died = remaining <= 0.0;
        if died {
            self.die();
        }

        Some(HitOutcome {
            damage: amount,
            stunned: false,
            died,
        })
    }

    fn stun(&mut self, rng: &mut impl Rng) {
        // Прерванная атака тоже уходит в attack wait (FinishAttack уже не придёт в Attacking)
        if self.state == EnemyState::Attacking {
            self.timers
                .schedule(EnemyTimer::AttackWait, self.config.attack_wait_time);
        }
        self.disable_weapons();
        self.state = EnemyState::Stunned;
        self.can_hit_react = false;

        let min = self.config.hit_react_time_min;
        let max = self.config.hit_react_time_max.max(min);
        let cooldown = if max > min {
            rng.gen_range(min..=max)
        } else {
            min
        };
        self.timers.schedule(EnemyTimer::HitReact, cooldown);

        self.effects.push(CombatEffect::PlaySequence {
            sequence: SequenceId::HitReact,
            section: HIT_REACT_SECTION.to_string(),
            ticket: None,
        });
        crate::logger::log(&format!("Enemy stunned (hit react cooldown {:.2}s)", cooldown));
    }

    pub fn finish_stun(&mut self) -> bool {
        if self.state != EnemyState::Stunned {
            return false;
        }
        self.state = self.settled_state();
        true
    }

    /// Атака: только из InAttackRange и после attack wait
    pub fn try_attack(&mut self, rng: &mut impl Rng) -> Option<&'static str> {
        if self.state != EnemyState::InAttackRange || !self.can_attack {
            return None;
        }

        let section = ATTACK_SECTIONS[rng.gen_range(0..ATTACK_SECTIONS.len())];
        self.state = EnemyState::Attacking;
        self.can_attack = false;
        self.effects.push(CombatEffect::PlaySequence {
            sequence: SequenceId::Attack,
            section: section.to_string(),
            ticket: None,
        });
        Some(section)
    }

    pub fn finish_attack(&mut self) -> bool {
        if self.state != EnemyState::Attacking {
            return false;
        }

        self.disable_weapons();
        self.state = self.settled_state();
        self.timers
            .schedule(EnemyTimer::AttackWait, self.config.attack_wait_time);
        true
    }

    /// Collision volume включается только внутри attack sequence
    pub fn activate_weapon(&mut self, side: WeaponSide) -> bool {
        if self.state != EnemyState::Attacking {
            return false;
        }
        *self.weapon_flag(side) = true;
        true
    }

    pub fn deactivate_weapon(&mut self, side: WeaponSide) {
        *self.weapon_flag(side) = false;
    }

    pub fn weapon_active(&self, side: WeaponSide) -> bool {
        match side {
            WeaponSide::Left => self.left_weapon_active,
            WeaponSide::Right => self.right_weapon_active,
        }
    }

    fn weapon_flag(&mut self, side: WeaponSide) -> &mut bool {
        match side {
            WeaponSide::Left => &mut self.left_weapon_active,
            WeaponSide::Right => &mut self.right_weapon_active,
        }
    }

    fn disable_weapons(&mut self) {
        self.left_weapon_active = false;
        self.right_weapon_active = false;
    }

    /// Swing задел жертву: урон если volume этой руки активен
    pub fn weapon_hit(&mut self, side: WeaponSide) -> Option<f32> {
        if self.is_dying() || !self.weapon_active(side) {
            return None;
        }

        self.effects
            .push(CombatEffect::PlaySound(SoundCue::MeleeImpact));
        Some(self.config.base_damage)
    }

    pub fn die(&mut self) {
        if self.is_dying() {
            return;
        }

        self.state = EnemyState::Dying;
        self.disable_weapons();
        self.timers.cancel(EnemyTimer::HitReact);
        self.timers.cancel(EnemyTimer::AttackWait);
        self.hide_health_bar();

        self.effects.push(CombatEffect::PlaySequence {
            sequence: SequenceId::Death,
            section: DEATH_SECTION.to_string(),
            ticket: None,
        });
        crate::logger::log_info("Enemy dying");
    }

    /// Death sequence закончилась. true ровно один раз — пора планировать despawn.
    pub fn finish_death(&mut self) -> bool {
        if !self.is_dying() || self.death_finished {
            return false;
        }
        self.death_finished = true;
        true
    }

    pub fn death_time(&self) -> f32 {
        self.config.death_time
    }

    fn show_health_bar(&mut self) {
        if !self.health_bar_visible {
            self.health_bar_visible = true;
            self.effects.push(CombatEffect::HealthBar { visible: true });
        }
        self.timers
            .schedule(EnemyTimer::HealthBar, self.config.health_bar_display_time);
    }

    fn hide_health_bar(&mut self) {
        self.timers.cancel(EnemyTimer::HealthBar);
        if self.health_bar_visible {
            self.health_bar_visible = false;
            self.effects.push(CombatEffect::HealthBar { visible: false });
        }
    }

    /// Timers + атака при первой возможности
    pub fn tick(&mut self, delta_time: f32, rng: &mut impl Rng) {
        for handle in self.timers.tick(delta_time) {
            if !self.timers.is_current(handle) {
                continue;
            }
            match handle.key {
                EnemyTimer::HitReact => self.can_hit_react = true,
                EnemyTimer::AttackWait => self.can_attack = true,
                EnemyTimer::HealthBar => self.hide_health_bar(),
            }
        }

        if !self.is_dying() {
            self.try_attack(rng);
        }
    }
}
