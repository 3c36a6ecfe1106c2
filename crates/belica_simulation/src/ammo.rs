//! AmmoInventory: reserve ammo, которую персонаж носит вне магазина
//!
//! Reserve никогда не уходит ниже 0 (u32 + saturating arithmetic).
//! Неизвестный тип ammo → reserve 0, без ошибки.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ShooterTuning;
use crate::weapon::Weapon;

/// Тип патронов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmmoType {
    NineMm,
    AssaultRifle,
}

impl AmmoType {
    pub const ALL: [AmmoType; 2] = [AmmoType::NineMm, AmmoType::AssaultRifle];

    pub fn as_str(&self) -> &'static str {
        match self {
            AmmoType::NineMm => "9mm",
            AmmoType::AssaultRifle => "AR",
        }
    }
}

/// Reserve ammo per type (компонент на shooter entity)
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct AmmoInventory {
    reserves: HashMap<AmmoType, u32>,
}

impl AmmoInventory {
    pub fn new(starting: impl IntoIterator<Item = (AmmoType, u32)>) -> Self {
        let mut inventory = Self::default();
        inventory.initialize(starting);
        inventory
    }

    /// Стартовые запасы из tuning (9mm + AR)
    pub fn from_tuning(tuning: &ShooterTuning) -> Self {
        Self::new([
            (AmmoType::NineMm, tuning.starting_9mm_ammo),
            (AmmoType::AssaultRifle, tuning.starting_ar_ammo),
        ])
    }

    /// Перезаписать запасы (вызывается один раз при spawn персонажа)
    pub fn initialize(&mut self, starting: impl IntoIterator<Item = (AmmoType, u32)>) {
        self.reserves = starting.into_iter().collect();
    }

    pub fn add(&mut self, ammo_type: AmmoType, amount: u32) {
        let reserve = self.reserves.entry(ammo_type).or_insert(0);
        *reserve = reserve.saturating_add(amount);
    }

    /// Забрать до `amount` патронов. Возвращает сколько реально забрали.
    pub fn take(&mut self, ammo_type: AmmoType, amount: u32) -> u32 {
        let Some(reserve) = self.reserves.get_mut(&ammo_type) else {
            return 0;
        };

        let taken = amount.min(*reserve);
        *reserve -= taken;
        taken
    }

    pub fn has(&self, ammo_type: AmmoType) -> bool {
        self.reserve(ammo_type) > 0
    }

    pub fn reserve(&self, ammo_type: AmmoType) -> u32 {
        self.reserves.get(&ammo_type).copied().unwrap_or(0)
    }

    /// Reserve для типа патронов оружия (0 если тип не отслеживается)
    pub fn reserve_for(&self, weapon: &Weapon) -> u32 {
        self.reserve(weapon.ammo_type)
    }

    pub fn is_tracked(&self, ammo_type: AmmoType) -> bool {
        self.reserves.contains_key(&ammo_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::weapon::WeaponType;
    use proptest::prelude::*;

    #[test]
    fn test_starting_reserves() {
        let ammo = AmmoInventory::from_tuning(&ShooterTuning::default());
        assert_eq!(ammo.reserve(AmmoType::NineMm), 85);
        assert_eq!(ammo.reserve(AmmoType::AssaultRifle), 120);
        assert!(ammo.has(AmmoType::NineMm));
    }

    #[test]
    fn test_untracked_type_is_empty() {
        let mut ammo = AmmoInventory::new([(AmmoType::NineMm, 10)]);
        assert!(!ammo.is_tracked(AmmoType::AssaultRifle));
        assert_eq!(ammo.reserve(AmmoType::AssaultRifle), 0);
        assert!(!ammo.has(AmmoType::AssaultRifle));
        assert_eq!(ammo.take(AmmoType::AssaultRifle, 5), 0);
    }

    #[test]
    fn test_reserve_for_weapon_ammo_type() {
        let config = CombatConfig::default();
        let smg = Weapon::from_profile(
            WeaponType::SubmachineGun,
            config.weapons.profile(WeaponType::SubmachineGun),
        );
        let rifle = Weapon::from_profile(
            WeaponType::AssaultRifle,
            config.weapons.profile(WeaponType::AssaultRifle),
        );

        let ammo = AmmoInventory::new([(AmmoType::NineMm, 42)]);
        assert_eq!(ammo.reserve_for(&smg), 42);
        // AR патроны не отслеживаются
        assert_eq!(ammo.reserve_for(&rifle), 0);
    }

    #[test]
    fn test_take_clamps_at_zero() {
        let mut ammo = AmmoInventory::new([(AmmoType::NineMm, 15)]);
        assert_eq!(ammo.take(AmmoType::NineMm, 20), 15);
        assert_eq!(ammo.reserve(AmmoType::NineMm), 0);
        assert!(!ammo.has(AmmoType::NineMm));
    }

    proptest! {
        #[test]
        fn prop_add_then_take_round_trips(start in 0u32..10_000, amount in 0u32..10_000) {
            let mut ammo = AmmoInventory::new([(AmmoType::AssaultRifle, start)]);
            ammo.add(AmmoType::AssaultRifle, amount);
            prop_assert_eq!(ammo.take(AmmoType::AssaultRifle, amount), amount);
            prop_assert_eq!(ammo.reserve(AmmoType::AssaultRifle), start);
        }

        #[test]
        fn prop_reserve_never_underflows(ops in proptest::collection::vec((any::<bool>(), 0u32..200), 0..64)) {
            let mut ammo = AmmoInventory::new([(AmmoType::NineMm, 50)]);
            let mut expected: u64 = 50;
            for (is_add, amount) in ops {
                if is_add {
                    ammo.add(AmmoType::NineMm, amount);
                    expected += amount as u64;
                } else {
                    let taken = ammo.take(AmmoType::NineMm, amount);
                    prop_assert!(taken as u64 <= expected);
                    expected -= taken as u64;
                }
                prop_assert_eq!(ammo.reserve(AmmoType::NineMm) as u64, expected);
            }
        }
    }
}
