//! WeaponEntity: магазин, throw/falling, pistol slide
//!
//! Weapon живёт на той же entity что и `Item` (ItemKind::Weapon).
//! Инвариант: 0 ≤ ammo ≤ magazine_capacity после любой операции.

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ammo::AmmoType;
use crate::config::CombatConfig;
use crate::items::{Item, ItemRarity, PulseState};
use crate::services::{CurveId, CurveSampler, Timers};

pub mod profile;
pub mod systems;


pub use profile::{WeaponProfile, WeaponTable};
pub use systems::tick_weapons;

/// Тип оружия
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    SubmachineGun,
    AssaultRifle,
    Pistol,
}

impl WeaponType {
    pub const ALL: [WeaponType; 3] = [
        WeaponType::SubmachineGun,
        WeaponType::AssaultRifle,
        WeaponType::Pistol,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            WeaponType::SubmachineGun => "Submachine Gun",
            WeaponType::AssaultRifle => "Assault Rifle",
            WeaponType::Pistol => "Pistol",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponTimer {
    /// Полёт после броска
    Throw,
    /// Pistol slide после выстрела
    Slide,
}

/// Итог одного тика оружия
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeaponTickOutcome {
    /// Throw timer истёк — оружие снова можно подобрать
    pub landed: bool,
}

/// Оружие (магазин + presentation state)
#[derive(Component, Debug, Clone)]
pub struct Weapon {
    pub weapon_type: WeaponType,
    pub ammo_type: AmmoType,
    ammo: u32,
    magazine_capacity: u32,
    pub automatic: bool,
    pub auto_fire_rate: f32,
    pub reload_section: String,
    pub clip_bone: String,
    pub damage: f32,
    pub headshot_damage: f32,
    pub muzzle_offset: Vec3,

    /// Позиция в InventorySlots (None = не в инвентаре)
    pub slot_index: Option<usize>,
    /// Летит после броска (не держится персонажем)
    pub falling: bool,
    /// Host держит магазин в руке (GrabClip..ReleaseClip)
    pub moving_clip: bool,
    pub moving_slide: bool,
    pub slide_displacement: f32,
    slide_duration: f32,
    max_slide_displacement: f32,

    pub timers: Timers<WeaponTimer>,
}

impl Weapon {
    pub fn from_profile(weapon_type: WeaponType, profile: &WeaponProfile) -> Self {
        Self {
            weapon_type,
            ammo_type: profile.ammo_type,
            ammo: profile.magazine_ammo.min(profile.magazine_capacity),
            magazine_capacity: profile.magazine_capacity,
            automatic: profile.automatic,
            auto_fire_rate: profile.auto_fire_rate,
            reload_section: profile.reload_section.clone(),
            clip_bone: profile.clip_bone.clone(),
            damage: profile.damage,
            headshot_damage: profile.headshot_damage,
            muzzle_offset: Vec3::from_array(profile.muzzle_offset),
            slot_index: None,
            falling: false,
            moving_clip: false,
            moving_slide: false,
            slide_displacement: 0.0,
            slide_duration: 0.1,
            max_slide_displacement: 4.0,
            timers: Timers::default(),
        }
    }

    /// Builder: задать ammo в магазине (клампится к capacity)
    pub fn with_ammo(mut self, ammo: u32) -> Self {
        self.ammo = ammo.min(self.magazine_capacity);
        self
    }

    pub fn with_slide(mut self, duration: f32, max_displacement: f32) -> Self {
        self.slide_duration = duration;
        self.max_slide_displacement = max_displacement;
        self
    }

    pub fn ammo(&self) -> u32 {
        self.ammo
    }

    pub fn magazine_capacity(&self) -> u32 {
        self.magazine_capacity
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo > 0
    }

    pub fn clip_is_full(&self) -> bool {
        self.ammo >= self.magazine_capacity
    }

    pub fn empty_space(&self) -> u32 {
        self.magazine_capacity.saturating_sub(self.ammo)
    }

    /// ammo = max(ammo - 1, 0)
    pub fn decrement_ammo(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
    }

    /// Зарядить `amount` патронов
    ///
    /// Caller гарантирует ammo + amount ≤ capacity (debug assert).
    /// В release лишнее отбрасывается.
    pub fn reload(&mut self, amount: u32) {
        debug_assert!(
            self.ammo + amount <= self.magazine_capacity,
            "attempted to reload more than magazine capacity ({} + {} > {})",
            self.ammo,
            amount,
            self.magazine_capacity
        );
        self.ammo = (self.ammo + amount).min(self.magazine_capacity);
    }

    /// Начать полёт после броска
    pub fn start_falling(&mut self, duration: f32) {
        self.falling = true;
        self.moving_clip = false;
        self.timers.schedule(WeaponTimer::Throw, duration);
    }

    pub fn start_slide(&mut self) {
        self.moving_slide = true;
        self.timers.schedule(WeaponTimer::Slide, self.slide_duration);
    }

    /// Timers + slide displacement
    pub fn tick(&mut self, delta_time: f32, curves: &dyn CurveSampler) -> WeaponTickOutcome {
        let mut outcome = WeaponTickOutcome::default();

        for handle in self.timers.tick(delta_time) {
            match handle.key {
                WeaponTimer::Throw => {
                    self.falling = false;
                    outcome.landed = true;
                }
                WeaponTimer::Slide => {
                    self.moving_slide = false;
                    self.slide_displacement = 0.0;
                }
            }
        }

        if self.moving_slide {
            let elapsed = self.timers.elapsed(WeaponTimer::Slide).unwrap_or(0.0);
            let t = if self.slide_duration > 0.0 {
                elapsed / self.slide_duration
            } else {
                1.0
            };
            self.slide_displacement =
                curves.sample(CurveId::SlideDisplacement, t) * self.max_slide_displacement;
        }

        outcome
    }

    /// Точка дула в мире
    pub fn muzzle_location(&self, transform: &Transform) -> Vec3 {
        transform.transform_point(self.muzzle_offset)
    }
}

/// Импульс броска: right vector, повёрнутый на -20° вокруг forward,
/// затем на случайные 28..32° вокруг up
pub fn throw_impulse(mesh_rotation: Quat, strength: f32, rng: &mut impl Rng) -> Vec3 {
    let forward = mesh_rotation * Vec3::NEG_Z;
    let right = mesh_rotation * Vec3::X;

    let tilted = Quat::from_axis_angle(forward, (-20.0f32).to_radians()) * right;
    let spin = rng.gen_range(28.0f32..32.0);
    let direction = Quat::from_axis_angle(Vec3::Y, spin.to_radians()) * tilted;

    direction * strength
}

/// Только yaw (оружие не кувыркается в полёте)
pub fn upright_rotation(rotation: Quat) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

/// Mutable view на weapon entity (Item + Weapon + Transform)
pub struct WeaponMut<'a> {
    pub item: &'a mut Item,
    pub weapon: &'a mut Weapon,
    pub transform: &'a mut Transform,
}

/// Доступ к оружию по Entity
///
/// В ECS это Query, в unit тестах — HashMap.
pub trait WeaponStore {
    fn weapon_mut(&mut self, entity: Entity) -> Option<WeaponMut<'_>>;
}

pub type WeaponQueryData = (&'static mut Item, &'static mut Weapon, &'static mut Transform);

impl<F: QueryFilter> WeaponStore for Query<'_, '_, WeaponQueryData, F> {
    fn weapon_mut(&mut self, entity: Entity) -> Option<WeaponMut<'_>> {
        let (item, weapon, transform) = self.get_mut(entity).ok()?;
        Some(WeaponMut {
            item: item.into_inner(),
            weapon: weapon.into_inner(),
            transform: transform.into_inner(),
        })
    }
}

impl WeaponStore for HashMap<Entity, (Item, Weapon, Transform)> {
    fn weapon_mut(&mut self, entity: Entity) -> Option<WeaponMut<'_>> {
        let (item, weapon, transform) = self.get_mut(&entity)?;
        Some(WeaponMut {
            item,
            weapon,
            transform,
        })
    }
}

/// Item + Weapon для нового оружия (profile + item tuning из config)
pub fn weapon_components(
    config: &CombatConfig,
    weapon_type: WeaponType,
    rarity: ItemRarity,
) -> (Item, Weapon) {
    let tuning = &config.items;
    let item = Item::weapon(weapon_type.display_name(), rarity)
        .with_pulse(PulseState::from_tuning(tuning));
    let weapon = Weapon::from_profile(weapon_type, config.weapons.profile(weapon_type))
        .with_slide(tuning.slide_displacement_time, tuning.max_slide_displacement);
    (item, weapon)
}

/// Spawn оружия в мире (Pickup state)
pub fn spawn_weapon(
    commands: &mut Commands,
    config: &CombatConfig,
    weapon_type: WeaponType,
    rarity: ItemRarity,
    transform: Transform,
) -> Entity {
    let (item, weapon) = weapon_components(config, weapon_type, rarity);
    let entity = commands.spawn((item, weapon, transform)).id();

    crate::logger::log(&format!(
        "Spawned {} ({:?}) at {:?}",
        weapon_type.display_name(),
        entity,
        transform.translation
    ));
    entity
}
