//! InventorySlots + interp-location allocator
//!
//! Инвариант слотов: для каждого занятого слота i оружие в нём имеет
//! `slot_index == Some(i)`. Все мутации слотов синхронизируют обе стороны.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::ShooterTuning;
use crate::items::ItemKind;
use crate::shooter::ShooterView;
use crate::weapon::WeaponStore;

/// Слоты оружия персонажа (фиксированная ёмкость)
#[derive(Component, Debug, Clone)]
pub struct InventorySlots {
    slots: Vec<Option<Entity>>,
    capacity: usize,
    highlighted: Option<usize>,
}

impl Default for InventorySlots {
    fn default() -> Self {
        Self::new(6)
    }
}

impl InventorySlots {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            highlighted: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Сколько слотов открыто (занятые + дырки после drop)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn get(&self, index: usize) -> Option<Entity> {
        self.slots.get(index).copied().flatten()
    }

    /// Занятые слоты (index, weapon)
    pub fn iter(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|weapon| (index, weapon)))
    }

    pub fn slot_of(&self, weapon: Entity) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(weapon))
    }

    /// Первый пустой слот, иначе следующий индекс если есть место, иначе None (полный)
    pub fn find_empty_slot(&self) -> Option<usize> {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            return Some(index);
        }

        (self.slots.len() < self.capacity).then_some(self.slots.len())
    }

    pub fn is_full(&self) -> bool {
        self.find_empty_slot().is_none()
    }

    /// Положить оружие в первый свободный слот
    pub fn add(&mut self, weapon: Entity, store: &mut impl WeaponStore) -> Option<usize> {
        if let Some(existing) = self.slot_of(weapon) {
            return Some(existing);
        }

        let index = self.find_empty_slot()?;
        if index == self.slots.len() {
            self.slots.push(Some(weapon));
        } else {
            self.slots[index] = Some(weapon);
        }

        if let Some(entry) = store.weapon_mut(weapon) {
            entry.weapon.slot_index = Some(index);
        }
        Some(index)
    }

    /// Заменить оружие в слоте. Возвращает старое (его slot_index сброшен).
    pub fn swap(
        &mut self,
        index: usize,
        new_weapon: Entity,
        store: &mut impl WeaponStore,
    ) -> Option<Entity> {
        if index >= self.slots.len() {
            return None;
        }

        // Оружие не может занимать два слота
        if let Some(previous) = self.slot_of(new_weapon) {
            if previous != index {
                self.slots[previous] = None;
            }
        }

        let old = self.slots[index].replace(new_weapon);
        if let Some(old) = old.filter(|old| *old != new_weapon) {
            if let Some(entry) = store.weapon_mut(old) {
                entry.weapon.slot_index = None;
            }
        }

        if let Some(entry) = store.weapon_mut(new_weapon) {
            entry.weapon.slot_index = Some(index);
        }

        old.filter(|old| *old != new_weapon)
    }

    /// Освободить слот
    pub fn remove(&mut self, index: usize, store: &mut impl WeaponStore) -> Option<Entity> {
        let weapon = self.slots.get_mut(index)?.take()?;
        if let Some(entry) = store.weapon_mut(weapon) {
            entry.weapon.slot_index = None;
        }
        Some(weapon)
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Подсветить слот, куда ляжет подбираемое оружие
    ///
    /// Возвращает слот только если подсветка изменилась.
    pub fn highlight_empty_slot(&mut self) -> Option<usize> {
        if self.highlighted.is_some() {
            return None;
        }

        let slot = self.find_empty_slot()?;
        self.highlighted = Some(slot);
        Some(slot)
    }

    pub fn unhighlight(&mut self) -> Option<usize> {
        self.highlighted.take()
    }
}

/// Anchor перед камерой + сколько items сейчас к нему летят
#[derive(Debug, Clone, PartialEq)]
pub struct InterpLocation {
    /// Смещение в пространстве камеры
    pub offset: Vec3,
    pub item_count: u32,
}

/// Anchors для interp: [0] — оружие, [1..] — патроны
///
/// Патроны раскидываются по anchor с минимальным количеством летящих items,
/// чтобы несколько подобранных подряд коробок не слипались в одну точку.
#[derive(Component, Debug, Clone)]
pub struct InterpLocations {
    anchors: Vec<InterpLocation>,
    elevation: f32,
    in_flight: HashMap<Entity, usize>,
}

impl Default for InterpLocations {
    fn default() -> Self {
        Self::from_tuning(&ShooterTuning::default())
    }
}

impl InterpLocations {
    pub const WEAPON_ANCHOR: usize = 0;

    pub fn from_tuning(tuning: &ShooterTuning) -> Self {
        let distance = tuning.camera_interp_distance;
        let mut offsets = vec![Vec3::new(0.0, 0.0, -distance)];

        // Патроны веером чуть ниже и ближе оружейного anchor
        let count = tuning.inventory_capacity;
        for i in 0..count {
            let lateral = (i as f32 - (count as f32 - 1.0) / 2.0) * 60.0;
            offsets.push(Vec3::new(lateral, -50.0, -distance * 0.8));
        }

        Self::with_offsets(offsets, tuning.camera_interp_elevation)
    }

    pub fn with_offsets(offsets: Vec<Vec3>, elevation: f32) -> Self {
        Self {
            anchors: offsets
                .into_iter()
                .map(|offset| InterpLocation {
                    offset,
                    item_count: 0,
                })
                .collect(),
            elevation,
            in_flight: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn item_count(&self, index: usize) -> u32 {
        self.anchors.get(index).map_or(0, |anchor| anchor.item_count)
    }

    /// Сдвинуть счётчик anchor (клампится к 0)
    pub fn increment(&mut self, index: usize, amount: i32) {
        if let Some(anchor) = self.anchors.get_mut(index) {
            anchor.item_count = anchor.item_count.saturating_add_signed(amount);
        }
    }

    /// Anchor для патронов: минимальный счётчик среди [1..], при равенстве — меньший индекс
    pub fn allocate(&self) -> usize {
        self.anchors
            .iter()
            .enumerate()
            .skip(1)
            .min_by_key(|(index, anchor)| (anchor.item_count, *index))
            .map_or(Self::WEAPON_ANCHOR, |(index, _)| index)
    }

    /// Закрепить anchor за item (повторный вызов возвращает тот же anchor)
    pub fn reserve(&mut self, item: Entity, kind: ItemKind) -> usize {
        if let Some(index) = self.in_flight.get(&item) {
            return *index;
        }

        let index = match kind {
            ItemKind::Weapon => Self::WEAPON_ANCHOR,
            ItemKind::Ammo(_) => self.allocate(),
        };
        self.increment(index, 1);
        self.in_flight.insert(item, index);
        index
    }

    /// Освободить anchor item (idempotent)
    pub fn release(&mut self, item: Entity) -> bool {
        let Some(index) = self.in_flight.remove(&item) else {
            return false;
        };
        self.increment(index, -1);
        true
    }

    /// Мировая позиция anchor для текущей камеры
    pub fn anchor_world(&self, index: usize, view: &ShooterView) -> Vec3 {
        let offset = self
            .anchors
            .get(index)
            .or_else(|| self.anchors.first())
            .map_or(Vec3::ZERO, |anchor| anchor.offset);

        view.location + view.rotation * offset + Vec3::Y * self.elevation
    }
}
