//! Enemy events (host overlaps и animation notifies)

use bevy::prelude::*;

use crate::items::OverlapPhase;

/// Какая сфера врага сработала
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyZone {
    /// Обнаружение игрока
    Aggro,
    /// Дистанция атаки
    CombatRange,
}

#[derive(Event, Debug, Clone)]
pub struct EnemyOverlap {
    pub enemy: Entity,
    pub other: Entity,
    pub zone: EnemyZone,
    pub phase: OverlapPhase,
}

/// Левая / правая рука (collision volume оружия)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponSide {
    Left,
    Right,
}

/// Notify от animation sequence врага
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyNotifyKind {
    FinishAttack,
    FinishStun,
    ActivateWeapon(WeaponSide),
    DeactivateWeapon(WeaponSide),
    FinishDeath,
}

#[derive(Event, Debug, Clone)]
pub struct EnemyNotify {
    pub enemy: Entity,
    pub kind: EnemyNotifyKind,
}

/// Host: collision volume оружия врага задел кого-то
#[derive(Event, Debug, Clone)]
pub struct EnemyWeaponOverlap {
    pub enemy: Entity,
    pub side: WeaponSide,
    pub victim: Entity,
}
