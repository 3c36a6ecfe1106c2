//! Health, damage ingress и смерть
//!
//! Общие для shooter и enemy:
//! - `Health` + `Damageable` (takeDamage(amount, instigator) → новое здоровье)
//! - `DamageDealt` / `EntityDied` события для UI, звуков, эффектов
//! - `Dead` + `DespawnAfter` — отложенная уборка трупов

use bevy::prelude::*;

use crate::services::HitZone;

/// Здоровье
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn percent(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }
}

/// Damage ingress (снаружи: пули, melee swings)
pub trait Damageable {
    /// Применить урон, вернуть новое здоровье
    fn take_damage(&mut self, amount: f32, instigator: Option<Entity>) -> f32;
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: f32, _instigator: Option<Entity>) -> f32 {
        self.current = (self.current - amount.max(0.0)).max(0.0);
        self.current
    }
}

/// Событие: урон нанесен
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: f32,
    pub zone: HitZone,
    pub target_died: bool,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв
#[derive(Component, Debug)]
pub struct Dead;

/// Компонент-маркер: деспавн entity после указанного времени
#[derive(Component, Debug)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта)
    pub despawn_time: f32,
}

/// Система: деспавн entities с истёкшим DespawnAfter timeout
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            crate::logger::log(&format!("Despawning entity {:?} (timeout)", entity));
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let mut health = Health::new(100.0);
        assert_eq!(health.take_damage(30.0, None), 70.0);
        assert_eq!(health.take_damage(500.0, None), 0.0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_heal_clamps_to_max() {
        let mut health = Health::new(100.0);
        health.take_damage(10.0, None);
        health.heal(20.0);
        assert_eq!(health.current, 100.0);
        assert_eq!(health.percent(), 1.0);
    }

    #[test]
    fn test_negative_amounts_ignored() {
        let mut health = Health::new(50.0);
        assert_eq!(health.take_damage(-10.0, None), 50.0);
        health.take_damage(20.0, None);
        health.heal(-5.0);
        assert_eq!(health.current, 30.0);
    }
}
