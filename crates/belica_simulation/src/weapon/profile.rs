//! Weapon profiles (строки data table per WeaponType)

use serde::{Deserialize, Serialize};

use crate::ammo::AmmoType;
use super::WeaponType;

/// Параметры одного типа оружия
///
/// Строка в TOML задаётся целиком (как строка data table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub ammo_type: AmmoType,
    /// Патроны в магазине при spawn
    pub magazine_ammo: u32,
    pub magazine_capacity: u32,
    /// Section reload sequence (у каждого оружия своя анимация)
    pub reload_section: String,
    /// Кость магазина (host двигает её во время reload)
    pub clip_bone: String,
    /// Длительность fire timer (сек)
    pub auto_fire_rate: f32,
    pub automatic: bool,
    pub damage: f32,
    pub headshot_damage: f32,
    /// Смещение дула относительно transform оружия
    pub muzzle_offset: [f32; 3],
}

impl WeaponProfile {
    pub fn submachine_gun() -> Self {
        Self {
            ammo_type: AmmoType::NineMm,
            magazine_ammo: 30,
            magazine_capacity: 30,
            reload_section: "Reload SMG".to_string(),
            clip_bone: "smg_clip".to_string(),
            auto_fire_rate: 0.1,
            automatic: true,
            damage: 20.0,
            headshot_damage: 40.0,
            muzzle_offset: [0.0, 8.0, -45.0],
        }
    }

    pub fn assault_rifle() -> Self {
        Self {
            ammo_type: AmmoType::AssaultRifle,
            magazine_ammo: 30,
            magazine_capacity: 30,
            reload_section: "Reload AR".to_string(),
            clip_bone: "ar_clip".to_string(),
            auto_fire_rate: 0.12,
            automatic: true,
            damage: 25.0,
            headshot_damage: 50.0,
            muzzle_offset: [0.0, 9.0, -62.0],
        }
    }

    pub fn pistol() -> Self {
        Self {
            ammo_type: AmmoType::NineMm,
            magazine_ammo: 12,
            magazine_capacity: 12,
            reload_section: "Reload Pistol".to_string(),
            clip_bone: "pistol_clip".to_string(),
            auto_fire_rate: 0.2,
            automatic: false,
            damage: 30.0,
            headshot_damage: 60.0,
            muzzle_offset: [0.0, 6.0, -22.0],
        }
    }
}

/// Таблица профилей (по одной строке на WeaponType)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTable {
    pub submachine_gun: WeaponProfile,
    pub assault_rifle: WeaponProfile,
    pub pistol: WeaponProfile,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            submachine_gun: WeaponProfile::submachine_gun(),
            assault_rifle: WeaponProfile::assault_rifle(),
            pistol: WeaponProfile::pistol(),
        }
    }
}

impl WeaponTable {
    pub fn profile(&self, weapon_type: WeaponType) -> &WeaponProfile {
        match weapon_type {
            WeaponType::SubmachineGun => &self.submachine_gun,
            WeaponType::AssaultRifle => &self.assault_rifle,
            WeaponType::Pistol => &self.pistol,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeaponType, &WeaponProfile)> {
        WeaponType::ALL.into_iter().map(|t| (t, self.profile(t)))
    }
}
