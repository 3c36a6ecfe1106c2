//! Item events (host → ECS overlaps, внутренние pickup/delivery, ECS → host state)

use bevy::prelude::*;

use super::components::{ItemPresentation, ItemState};
use crate::ammo::AmmoType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPhase {
    Begin,
    End,
}

/// Host: overlap sphere item пересеклась с кем-то
#[derive(Event, Debug, Clone)]
pub struct ItemOverlap {
    pub item: Entity,
    pub other: Entity,
    pub phase: OverlapPhase,
}

/// Host: персонаж прошёл через collect sphere коробки патронов
#[derive(Event, Debug, Clone)]
pub struct AmmoCollectOverlap {
    pub item: Entity,
    pub other: Entity,
}

/// Запрос на подбор (pickup button или auto-collect)
#[derive(Event, Debug, Clone)]
pub struct PickupRequested {
    pub shooter: Entity,
    pub item: Entity,
}

/// Что именно доставлено персонажу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveredItem {
    Weapon,
    Ammo { ammo_type: AmmoType, count: u32 },
}

/// Interp закончен, item у персонажа
#[derive(Event, Debug, Clone)]
pub struct ItemDelivered {
    pub item: Entity,
    pub shooter: Entity,
    pub payload: DeliveredItem,
}

/// ECS → host: state item изменился (visibility, physics, collision)
#[derive(Event, Debug, Clone)]
pub struct ItemStateChanged {
    pub item: Entity,
    pub state: ItemState,
    pub presentation: ItemPresentation,
}
