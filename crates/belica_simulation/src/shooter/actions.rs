//! Combat state machine персонажа
//!
//! `ShooterCtx` — borrowed view на компоненты одного shooter + доступ к оружию
//! и host capabilities. Все gating проверки — молчаливые preconditions:
//! нарушение = no-op (false / None), без ошибок.
//!
//! ```text
//! Unoccupied ──fire──▶ FireTimerInProgress ──AutoFire timer──▶ Unoccupied
//!     │ ──reload──▶ Reloading ──FinishReloading(ticket)──▶ Unoccupied
//!     │ ──select slot──▶ Equipping ──FinishEquipping(ticket)──▶ Unoccupied
//! ```

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::components::{
    CombatState, ItemTrace, JumpOutcome, Shooter, ShooterMovement, ShooterTimer, ShooterView,
    MUZZLE_TRACE_EXTENSION,
};
use super::events::{
    BulletHit, CombatEffect, SequenceId, ShooterAction, ShooterNotifyKind, SoundCue,
};
use crate::ammo::{AmmoInventory, AmmoType};
use crate::config::CombatConfig;
use crate::inventory::InventorySlots;
use crate::items::{DeliveredItem, ItemState};
use crate::services::{HitZone, SequenceTicket, ServiceContext, TimerHandle};
use crate::weapon::{throw_impulse, upright_rotation, Weapon, WeaponStore, WeaponType};

pub const FIRE_SECTION: &str = "StartFire";
pub const EQUIP_SECTION: &str = "Equip";

pub struct ShooterCtx<'a, W: WeaponStore> {
    pub entity: Entity,
    pub shooter: &'a mut Shooter,
    pub ammo: &'a mut AmmoInventory,
    pub slots: &'a mut InventorySlots,
    pub movement: &'a mut ShooterMovement,
    pub trace: &'a mut ItemTrace,
    pub view: &'a ShooterView,
    pub weapons: &'a mut W,
    pub services: ServiceContext<'a>,
    pub rng: &'a mut ChaCha8Rng,
    pub config: &'a CombatConfig,
}

impl<W: WeaponStore> ShooterCtx<'_, W> {
    /// Кнопка игрока. Возвращает item, который надо начать подбирать.
    pub fn apply(&mut self, action: ShooterAction) -> Option<Entity> {
        match action {
            ShooterAction::FirePressed => {
                self.shooter.fire_button_pressed = true;
                self.fire_weapon();
            }
            ShooterAction::FireReleased => self.shooter.fire_button_pressed = false,
            ShooterAction::AimPressed => self.aim_button_pressed(),
            ShooterAction::AimReleased => self.aim_button_released(),
            ShooterAction::ReloadPressed => {
                self.reload_weapon();
            }
            ShooterAction::EquipPressed => return self.equip_button_pressed(),
            ShooterAction::SelectSlot(index) => {
                self.select_slot(index);
            }
            ShooterAction::CrouchPressed => self.movement.toggle_crouch(),
            ShooterAction::JumpPressed => self.jump(),
        }
        None
    }

    /// Notify от animation sequence
    pub fn notify(&mut self, kind: ShooterNotifyKind) {
        match kind {
            ShooterNotifyKind::FinishReloading(ticket) => {
                self.finish_reloading(ticket);
            }
            ShooterNotifyKind::FinishEquipping(ticket) => {
                self.finish_equipping(ticket);
            }
            ShooterNotifyKind::GrabClip => self.set_moving_clip(true),
            ShooterNotifyKind::ReleaseClip => self.set_moving_clip(false),
        }
    }

    /// Истёкший timer. Stale handle (timer перезапущен в этом же тике) игнорируется.
    pub fn on_timer(&mut self, handle: TimerHandle<ShooterTimer>) {
        if !self.shooter.timers.is_current(handle) {
            return;
        }

        match handle.key {
            ShooterTimer::AutoFire => self.auto_fire_reset(),
            ShooterTimer::CrosshairShoot => self.shooter.firing_bullet = false,
        }
    }

    pub fn equipped_slot(&self) -> Option<usize> {
        self.shooter
            .equipped_weapon
            .and_then(|weapon| self.slots.slot_of(weapon))
    }

    fn equipped<R>(&mut self, read: impl FnOnce(&Weapon) -> R) -> Option<R> {
        let weapon = self.shooter.equipped_weapon?;
        let entry = self.weapons.weapon_mut(weapon)?;
        Some(read(entry.weapon))
    }

    pub fn weapon_has_ammo(&mut self) -> bool {
        self.equipped(Weapon::has_ammo).unwrap_or(false)
    }

    pub fn carrying_ammo(&mut self) -> bool {
        match self.equipped(|weapon| weapon.ammo_type) {
            Some(ammo_type) => self.ammo.has(ammo_type),
            None => false,
        }
    }

    // ========================================================================
    // Fire
    // ========================================================================

    /// Выстрел: только из Unoccupied и с патронами в магазине
    pub fn fire_weapon(&mut self) -> bool {
        let Some(weapon_entity) = self.shooter.equipped_weapon else {
            return false;
        };
        if self.shooter.combat_state != CombatState::Unoccupied {
            return false;
        }
        let Some(entry) = self.weapons.weapon_mut(weapon_entity) else {
            return false;
        };
        if !entry.weapon.has_ammo() {
            return false;
        }

        let muzzle = entry.weapon.muzzle_location(entry.transform);
        let damage = (entry.weapon.damage, entry.weapon.headshot_damage);
        let fire_rate = if entry.weapon.auto_fire_rate > 0.0 {
            entry.weapon.auto_fire_rate
        } else {
            self.config.shooter.automatic_fire_rate
        };

        entry.weapon.decrement_ammo();
        if entry.weapon.weapon_type == WeaponType::Pistol {
            entry.weapon.start_slide();
        }
        let remaining = entry.weapon.ammo();

        self.shooter
            .push_effect(CombatEffect::PlaySound(SoundCue::WeaponFire {
                weapon: weapon_entity,
            }));
        self.send_bullet(weapon_entity, muzzle, damage);
        self.shooter.push_effect(CombatEffect::PlaySequence {
            sequence: SequenceId::HipFire,
            section: FIRE_SECTION.to_string(),
            ticket: None,
        });

        self.shooter.combat_state = CombatState::FireTimerInProgress;
        self.shooter.timers.schedule(ShooterTimer::AutoFire, fire_rate);

        self.shooter.firing_bullet = true;
        self.shooter.timers.schedule(
            ShooterTimer::CrosshairShoot,
            self.config.shooter.crosshair_shoot_duration,
        );

        crate::logger::log(&format!(
            "Shooter {:?} fired {:?} ({} left)",
            self.entity, weapon_entity, remaining
        ));
        true
    }

    /// Two-pass trace: камера определяет точку прицела, дуло — реальный путь пули
    fn send_bullet(&mut self, weapon: Entity, muzzle: Vec3, (damage, headshot_damage): (f32, f32)) {
        self.shooter
            .push_effect(CombatEffect::MuzzleFlash { weapon });

        let crosshair_hit = self
            .services
            .rays
            .query(self.view.location, self.view.crosshair_trace_end());
        let aim_point = crosshair_hit.location;

        let muzzle_end = muzzle + (aim_point - muzzle) * MUZZLE_TRACE_EXTENSION;
        let hit = self.services.rays.query(muzzle, muzzle_end);
        if !hit.blocked {
            return;
        }

        self.shooter.push_effect(CombatEffect::BeamTrail {
            start: muzzle,
            end: hit.location,
        });

        match hit.entity {
            Some(target) => {
                let damage = match hit.zone {
                    HitZone::Head => headshot_damage,
                    HitZone::Body => damage,
                };
                self.shooter.push_effect(CombatEffect::BulletHit(BulletHit {
                    shooter: self.entity,
                    weapon,
                    target,
                    location: hit.location,
                    zone: hit.zone,
                    damage,
                }));
            }
            None => self.shooter.push_effect(CombatEffect::ImpactParticles {
                location: hit.location,
            }),
        }
    }

    /// Fire timer истёк: Unoccupied, затем auto re-fire или auto reload
    pub fn auto_fire_reset(&mut self) {
        if self.shooter.combat_state != CombatState::FireTimerInProgress {
            return;
        }
        self.shooter.combat_state = CombatState::Unoccupied;

        let Some((has_ammo, automatic)) = self.equipped(|w| (w.has_ammo(), w.automatic)) else {
            return;
        };

        if has_ammo {
            if self.shooter.fire_button_pressed && automatic {
                self.fire_weapon();
            }
        } else {
            self.reload_weapon();
        }
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Reload: Unoccupied + есть reserve + магазин не полон.
    /// Патроны переходят в магазин только в `finish_reloading`.
    pub fn reload_weapon(&mut self) -> bool {
        if self.shooter.combat_state != CombatState::Unoccupied {
            return false;
        }
        let Some(weapon_entity) = self.shooter.equipped_weapon else {
            return false;
        };
        let Some(entry) = self.weapons.weapon_mut(weapon_entity) else {
            return false;
        };
        if self.ammo.reserve_for(entry.weapon) == 0 || entry.weapon.clip_is_full() {
            return false;
        }
        let section = entry.weapon.reload_section.clone();

        if self.shooter.aiming {
            self.stop_aiming();
        }
        self.shooter.combat_state = CombatState::Reloading;

        let ticket = self.shooter.sequence.begin();
        self.shooter.push_effect(CombatEffect::PlaySequence {
            sequence: SequenceId::Reload,
            section,
            ticket: Some(ticket),
        });

        crate::logger::log_info(&format!(
            "Shooter {:?} reloading {:?}",
            self.entity, weapon_entity
        ));
        true
    }

    /// Reload sequence закончилась: перенести min(пустое место, reserve)
    pub fn finish_reloading(&mut self, ticket: SequenceTicket) -> bool {
        if self.shooter.combat_state != CombatState::Reloading {
            return false;
        }
        if !self.shooter.sequence.complete(ticket) {
            return false;
        }

        self.shooter.combat_state = CombatState::Unoccupied;
        if self.shooter.aim_button_pressed {
            self.take_aim();
        }

        let Some(weapon_entity) = self.shooter.equipped_weapon else {
            return true;
        };
        let Some(entry) = self.weapons.weapon_mut(weapon_entity) else {
            return true;
        };

        let ammo_type = entry.weapon.ammo_type;
        let transfer = entry.weapon.empty_space().min(self.ammo.reserve_for(entry.weapon));
        entry.weapon.reload(transfer);
        self.ammo.take(ammo_type, transfer);

        crate::logger::log_info(&format!(
            "Shooter {:?} reloaded {} rounds ({} in reserve)",
            self.entity,
            transfer,
            self.ammo.reserve(ammo_type)
        ));
        true
    }

    fn set_moving_clip(&mut self, moving: bool) {
        let Some(weapon_entity) = self.shooter.equipped_weapon else {
            return;
        };
        if let Some(entry) = self.weapons.weapon_mut(weapon_entity) {
            entry.weapon.moving_clip = moving;
        }
    }

    // ========================================================================
    // Aim / movement
    // ========================================================================

    pub fn aim_button_pressed(&mut self) {
        self.shooter.aim_button_pressed = true;
        if !matches!(
            self.shooter.combat_state,
            CombatState::Reloading | CombatState::Equipping
        ) {
            self.take_aim();
        }
    }

    pub fn aim_button_released(&mut self) {
        self.shooter.aim_button_pressed = false;
        self.stop_aiming();
    }

    fn take_aim(&mut self) {
        self.shooter.aiming = true;
        self.movement.on_take_aim();
    }

    fn stop_aiming(&mut self) {
        self.shooter.aiming = false;
        self.movement.on_stop_aiming();
    }

    fn jump(&mut self) {
        if self.movement.jump() == JumpOutcome::Jump {
            self.shooter.push_effect(CombatEffect::Jump);
        }
    }

    // ========================================================================
    // Equip / inventory
    // ========================================================================

    /// Pickup button: item под прицелом (только из Unoccupied)
    pub fn equip_button_pressed(&mut self) -> Option<Entity> {
        if self.shooter.combat_state != CombatState::Unoccupied {
            return None;
        }
        self.trace.traced_item.take()
    }

    /// Переключение слота: Unoccupied, слот занят и не текущий
    pub fn select_slot(&mut self, index: usize) -> bool {
        if self.shooter.combat_state != CombatState::Unoccupied {
            return false;
        }
        if index >= self.slots.capacity() {
            return false;
        }
        let Some(new_weapon) = self.slots.get(index) else {
            return false;
        };
        if self.equipped_slot() == Some(index) {
            return false;
        }

        if self.shooter.aiming {
            self.stop_aiming();
        }

        let old_weapon = self.shooter.equipped_weapon;
        self.equip_weapon(new_weapon, false);

        if let Some(old) = old_weapon.filter(|old| *old != new_weapon) {
            if let Some(entry) = self.weapons.weapon_mut(old) {
                entry.item.set_state(ItemState::PickedUp);
            }
            self.shooter
                .push_effect(CombatEffect::DetachWeapon { weapon: old });
        }

        self.shooter.combat_state = CombatState::Equipping;
        let ticket = self.shooter.sequence.begin();
        self.shooter.push_effect(CombatEffect::PlaySequence {
            sequence: SequenceId::Equip,
            section: EQUIP_SECTION.to_string(),
            ticket: Some(ticket),
        });
        self.shooter
            .push_effect(CombatEffect::PlaySound(SoundCue::ItemEquip { item: new_weapon }));

        crate::logger::log_info(&format!(
            "Shooter {:?} equipping slot {} ({:?})",
            self.entity, index, new_weapon
        ));
        true
    }

    pub fn finish_equipping(&mut self, ticket: SequenceTicket) -> bool {
        if self.shooter.combat_state != CombatState::Equipping {
            return false;
        }
        if !self.shooter.sequence.complete(ticket) {
            return false;
        }

        self.shooter.combat_state = CombatState::Unoccupied;
        if self.shooter.aim_button_pressed {
            self.take_aim();
        }
        true
    }

    /// Взять оружие в руки (attach + Equipped)
    ///
    /// `swapping`: слот тот же, UI не уведомляется о смене слота.
    pub fn equip_weapon(&mut self, weapon: Entity, swapping: bool) {
        let previous_slot = self.equipped_slot();
        let Some(entry) = self.weapons.weapon_mut(weapon) else {
            return;
        };

        entry.item.set_state(ItemState::Equipped);
        entry.item.owner = Some(self.entity);
        let current_slot = entry.weapon.slot_index;

        self.shooter.equipped_weapon = Some(weapon);
        self.shooter
            .push_effect(CombatEffect::AttachWeapon { weapon });

        if let Some(current) = current_slot {
            if !swapping {
                self.shooter.push_effect(CombatEffect::EquippedSlotChanged {
                    previous: previous_slot,
                    current,
                });
            }
        }
    }

    /// Выбросить экипированное оружие (Falling + импульс)
    pub fn drop_weapon(&mut self) -> Option<Entity> {
        let weapon = self.shooter.equipped_weapon.take()?;

        if let Some(slot) = self.slots.slot_of(weapon) {
            self.slots.remove(slot, &mut *self.weapons);
        }

        let strength = self.config.items.throw_impulse;
        let fall_time = self.config.items.throw_weapon_time;
        let Some(entry) = self.weapons.weapon_mut(weapon) else {
            return Some(weapon);
        };

        entry.item.set_state(ItemState::Falling);
        entry.transform.rotation = upright_rotation(entry.transform.rotation);
        let impulse = throw_impulse(entry.transform.rotation, strength, &mut *self.rng);
        entry.weapon.start_falling(fall_time);

        self.shooter
            .push_effect(CombatEffect::DetachWeapon { weapon });
        self.shooter
            .push_effect(CombatEffect::WeaponThrown { weapon, impulse });

        crate::logger::log_info(&format!("Shooter {:?} dropped {:?}", self.entity, weapon));
        Some(weapon)
    }

    /// Новое оружие встаёт в слот экипированного, старое выбрасывается
    pub fn swap_weapon(&mut self, new_weapon: Entity) {
        if let Some(slot) = self.equipped_slot() {
            self.slots.swap(slot, new_weapon, &mut *self.weapons);
        }

        self.drop_weapon();
        self.equip_weapon(new_weapon, true);
        self.trace.clear();
    }

    /// Item долетел до персонажа
    pub fn deliver(&mut self, item: Entity, payload: DeliveredItem) {
        self.shooter
            .push_effect(CombatEffect::PlaySound(SoundCue::ItemEquip { item }));

        match payload {
            DeliveredItem::Weapon => self.receive_weapon(item),
            DeliveredItem::Ammo { ammo_type, count } => self.receive_ammo(ammo_type, count),
        }
    }

    /// Есть свободный слот → в инвентарь (PickedUp), иначе swap с экипированным
    pub fn receive_weapon(&mut self, weapon: Entity) {
        if self.slots.find_empty_slot().is_none() {
            crate::logger::log_info(&format!(
                "Shooter {:?} inventory full, swapping for {:?}",
                self.entity, weapon
            ));
            self.swap_weapon(weapon);
            return;
        }

        let slot = self.slots.add(weapon, &mut *self.weapons);

        if self.shooter.equipped_weapon.is_none() {
            self.equip_weapon(weapon, false);
        } else if let Some(entry) = self.weapons.weapon_mut(weapon) {
            entry.item.set_state(ItemState::PickedUp);
            entry.item.owner = Some(self.entity);
        }

        crate::logger::log_info(&format!(
            "Shooter {:?} picked up {:?} into slot {:?}",
            self.entity, weapon, slot
        ));
    }

    /// Патроны в reserve; пустое оружие того же типа перезаряжается сразу
    pub fn receive_ammo(&mut self, ammo_type: AmmoType, count: u32) {
        self.ammo.add(ammo_type, count);

        let empty_matching = self
            .equipped(|weapon| weapon.ammo_type == ammo_type && !weapon.has_ammo())
            .unwrap_or(false);
        if empty_matching {
            self.reload_weapon();
        }

        crate::logger::log_info(&format!(
            "Shooter {:?} collected {} {} ammo",
            self.entity,
            count,
            ammo_type.as_str()
        ));
    }
}
