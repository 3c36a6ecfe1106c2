//! Item components: lifecycle state, rarity, kind

use bevy::prelude::*;

use super::interp::ItemInterp;
use super::pulse::PulseState;
use crate::ammo::AmmoType;

/// Редкость item (определяет количество звёзд в pickup widget)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ItemRarity {
    Damaged,
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl ItemRarity {
    /// 1 (Damaged) .. 5 (Legendary)
    pub fn stars(&self) -> u8 {
        match self {
            ItemRarity::Damaged => 1,
            ItemRarity::Common => 2,
            ItemRarity::Uncommon => 3,
            ItemRarity::Rare => 4,
            ItemRarity::Legendary => 5,
        }
    }

    /// Маска звёзд для UI (первые `stars()` активны)
    pub fn active_stars(&self) -> [bool; 5] {
        let stars = self.stars() as usize;
        std::array::from_fn(|i| i < stars)
    }
}

/// Вид item (закрытый набор вместо иерархии классов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum ItemKind {
    /// Детали — в `Weapon` компоненте на той же entity
    Weapon,
    Ammo(AmmoType),
}

/// Состояние жизненного цикла item
///
/// ```text
/// Pickup → EquipInterping → PickedUp / Equipped → Falling → Pickup
///                         ↘ (ammo) consumed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ItemState {
    /// Лежит в мире, можно подобрать
    #[default]
    Pickup,
    /// Летит к anchor перед камерой
    EquipInterping,
    /// В инвентаре, не в руках
    PickedUp,
    /// В руках
    Equipped,
    /// Выброшено, летит (physics на стороне host)
    Falling,
}

/// Как host должен показывать item в данном state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPresentation {
    pub visible: bool,
    /// Physics + gravity (только в полёте после броска)
    pub simulate_physics: bool,
    /// Overlap sphere (detection персонажем рядом)
    pub overlap_sphere: bool,
    /// Collision box блокирует visibility trace (item можно навести прицелом)
    pub trace_collision: bool,
}

impl ItemState {
    pub fn presentation(&self) -> ItemPresentation {
        match self {
            ItemState::Pickup => ItemPresentation {
                visible: true,
                simulate_physics: false,
                overlap_sphere: true,
                trace_collision: true,
            },
            ItemState::Equipped => ItemPresentation {
                visible: true,
                simulate_physics: false,
                overlap_sphere: false,
                trace_collision: false,
            },
            ItemState::Falling => ItemPresentation {
                visible: true,
                simulate_physics: true,
                overlap_sphere: false,
                trace_collision: false,
            },
            ItemState::EquipInterping => ItemPresentation {
                visible: true,
                simulate_physics: false,
                overlap_sphere: false,
                trace_collision: false,
            },
            ItemState::PickedUp => ItemPresentation {
                visible: false,
                simulate_physics: false,
                overlap_sphere: false,
                trace_collision: false,
            },
        }
    }
}

/// Item в мире (оружие или патроны)
///
/// Инвариант: ровно один state; меняется только через `set_state`.
#[derive(Component, Debug, Clone)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    pub rarity: ItemRarity,
    /// Количество (патроны в коробке; для оружия 1)
    pub count: u32,
    state: ItemState,
    /// Персонаж, который подбирает/держит item (weak — item принадлежит миру)
    pub owner: Option<Entity>,
    pub interp: Option<ItemInterp>,
    pub pulse: PulseState,
    state_dirty: bool,
}

impl Item {
    pub fn weapon(name: impl Into<String>, rarity: ItemRarity) -> Self {
        Self::new(name, ItemKind::Weapon, rarity, 1)
    }

    pub fn ammo(ammo_type: AmmoType, count: u32) -> Self {
        Self::new(
            format!("{} Ammo", ammo_type.as_str()),
            ItemKind::Ammo(ammo_type),
            ItemRarity::Common,
            count,
        )
    }

    fn new(name: impl Into<String>, kind: ItemKind, rarity: ItemRarity, count: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            rarity,
            count,
            state: ItemState::Pickup,
            owner: None,
            interp: None,
            pulse: PulseState::default(),
            state_dirty: true,
        }
    }

    pub fn with_pulse(mut self, pulse: PulseState) -> Self {
        self.pulse = pulse;
        self
    }

    pub fn with_state(mut self, state: ItemState) -> Self {
        self.set_state(state);
        self
    }

    pub fn state(&self) -> ItemState {
        self.state
    }

    pub fn is_weapon(&self) -> bool {
        self.kind == ItemKind::Weapon
    }

    /// Единственный путь смены state
    ///
    /// Вход в Pickup перезапускает pulse.
    pub fn set_state(&mut self, state: ItemState) {
        if self.state == state {
            return;
        }

        self.state = state;
        self.state_dirty = true;

        match state {
            ItemState::Pickup => {
                self.owner = None;
                self.pulse.restart();
            }
            ItemState::Falling => self.owner = None,
            _ => {}
        }
    }

    /// State изменился с прошлого вызова (для report в host)
    pub fn take_state_change(&mut self) -> Option<ItemState> {
        if self.state_dirty {
            self.state_dirty = false;
            Some(self.state)
        } else {
            None
        }
    }

    pub fn is_interping(&self) -> bool {
        self.interp.is_some()
    }

    /// Pickup → EquipInterping
    ///
    /// Повторный вызов (уже летит) или не-Pickup state → false, ничего не меняется.
    pub fn start_interp(&mut self, interp: ItemInterp) -> bool {
        if self.state != ItemState::Pickup || self.interp.is_some() {
            return false;
        }

        self.owner = Some(interp.shooter);
        self.interp = Some(interp);
        self.set_state(ItemState::EquipInterping);
        true
    }

    /// Interp закончен — item ждёт решения персонажа
    pub fn finish_interp(&mut self) -> Option<ItemInterp> {
        let interp = self.interp.take()?;
        if let ItemKind::Ammo(_) = self.kind {
            self.set_state(ItemState::PickedUp);
        }
        Some(interp)
    }

    /// Interp прерван (персонаж исчез) — item снова лежит в мире
    pub fn abort_interp(&mut self) -> Option<ItemInterp> {
        let interp = self.interp.take()?;
        self.set_state(ItemState::Pickup);
        Some(interp)
    }

    pub fn presentation(&self) -> ItemPresentation {
        self.state.presentation()
    }
}
