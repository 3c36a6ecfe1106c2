//! Tests for the combat state machine (ShooterCtx).

#[cfg(test)]
mod tests {
    use super::super::actions::*;
    use super::super::components::*;
    use super::super::events::*;
    use crate::ammo::{AmmoInventory, AmmoType};
    use crate::config::CombatConfig;
    use crate::inventory::InventorySlots;
    use crate::items::{DeliveredItem, Item, ItemRarity, ItemState};
    use crate::services::{
        CombatServices, FixedRayQuery, HitZone, RayHit, SequenceTicket,
    };
    use crate::weapon::{weapon_components, Weapon, WeaponType};
    use bevy::prelude::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    type Store = HashMap<Entity, (Item, Weapon, Transform)>;

    /// Персонаж вне ECS: компоненты + HashMap вместо Query
    struct Rig {
        entity: Entity,
        shooter: Shooter,
        ammo: AmmoInventory,
        slots: InventorySlots,
        movement: ShooterMovement,
        trace: ItemTrace,
        view: ShooterView,
        weapons: Store,
        services: CombatServices,
        rng: ChaCha8Rng,
        config: CombatConfig,
        next_id: u32,
    }

    impl Rig {
        /// SMG в слоте 0, экипирован
        fn new() -> Self {
            let config = CombatConfig::default();
            let mut rig = Self {
                entity: Entity::from_raw(1),
                shooter: Shooter::default(),
                ammo: AmmoInventory::from_tuning(&config.shooter),
                slots: InventorySlots::new(config.shooter.inventory_capacity),
                movement: ShooterMovement::from_tuning(&config.shooter),
                trace: ItemTrace::default(),
                view: ShooterView::default(),
                weapons: Store::new(),
                services: CombatServices::default(),
                rng: ChaCha8Rng::seed_from_u64(42),
                config,
                next_id: 100,
            };

            let smg = rig.spawn_weapon(WeaponType::SubmachineGun);
            rig.ctx().receive_weapon(smg);
            rig.shooter.drain_effects();
            rig
        }

        fn ctx(&mut self) -> ShooterCtx<'_, Store> {
            ShooterCtx {
                entity: self.entity,
                shooter: &mut self.shooter,
                ammo: &mut self.ammo,
                slots: &mut self.slots,
                movement: &mut self.movement,
                trace: &mut self.trace,
                view: &self.view,
                weapons: &mut self.weapons,
                services: self.services.context(),
                rng: &mut self.rng,
                config: &self.config,
            }
        }

        fn spawn_weapon(&mut self, weapon_type: WeaponType) -> Entity {
            let entity = Entity::from_raw(self.next_id);
            self.next_id += 1;
            let (item, weapon) = weapon_components(&self.config, weapon_type, ItemRarity::Common);
            self.weapons
                .insert(entity, (item, weapon, Transform::default()));
            entity
        }

        fn equipped(&self) -> Entity {
            self.shooter.equipped_weapon.expect("weapon equipped")
        }

        fn weapon(&self, entity: Entity) -> &Weapon {
            &self.weapons[&entity].1
        }

        fn item(&self, entity: Entity) -> &Item {
            &self.weapons[&entity].0
        }

        fn set_magazine(&mut self, entity: Entity, ammo: u32) {
            let entry = self.weapons.get_mut(&entity).expect("weapon in store");
            entry.1 = entry.1.clone().with_ammo(ammo);
        }

        fn tick(&mut self, delta_time: f32) {
            for handle in self.shooter.timers.tick(delta_time) {
                self.ctx().on_timer(handle);
            }
        }

        fn ticket(&self) -> SequenceTicket {
            self.shooter.sequence.current().expect("sequence in flight")
        }

        fn effects(&mut self) -> Vec<CombatEffect> {
            self.shooter.drain_effects()
        }
    }

    fn count_shots(effects: &[CombatEffect]) -> u32 {
        effects
            .iter()
            .filter(|effect| matches!(effect, CombatEffect::PlaySound(SoundCue::WeaponFire { .. })))
            .count() as u32
    }

    // ========================================================================
    // Fire
    // ========================================================================

    #[test]
    fn test_fire_decrements_and_starts_timer() {
        let mut rig = Rig::new();
        let smg = rig.equipped();

        assert!(rig.ctx().fire_weapon());
        assert_eq!(rig.weapon(smg).ammo(), 29);
        assert_eq!(rig.shooter.combat_state, CombatState::FireTimerInProgress);
        assert!(rig.shooter.firing_bullet);
        assert!(rig.shooter.timers.is_active(ShooterTimer::AutoFire));

        // Промах по пустому миру: ни beam, ни частиц
        let effects = rig.effects();
        assert_eq!(
            effects,
            vec![
                CombatEffect::PlaySound(SoundCue::WeaponFire { weapon: smg }),
                CombatEffect::MuzzleFlash { weapon: smg },
                CombatEffect::PlaySequence {
                    sequence: SequenceId::HipFire,
                    section: FIRE_SECTION.to_string(),
                    ticket: None,
                },
            ]
        );
    }

    #[test]
    fn test_fire_rejected_outside_unoccupied() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.ctx().fire_weapon();
        rig.effects();

        assert!(!rig.ctx().fire_weapon());
        assert_eq!(rig.weapon(smg).ammo(), 29);
        assert!(rig.effects().is_empty());
    }

    #[test]
    fn test_fire_without_ammo_or_weapon_is_noop() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.set_magazine(smg, 0);

        assert!(!rig.ctx().fire_weapon());
        assert_eq!(rig.shooter.combat_state, CombatState::Unoccupied);
        assert!(rig.effects().is_empty());

        rig.shooter.equipped_weapon = None;
        assert!(!rig.ctx().fire_weapon());
        assert!(rig.effects().is_empty());
    }

    #[test]
    fn test_automatic_refires_while_held() {
        let mut rig = Rig::new();
        let smg = rig.equipped();

        rig.ctx().apply(ShooterAction::FirePressed);
        rig.tick(0.11);

        // Re-fire в том же тике: crosshair window перезапущен, старый handle stale
        assert_eq!(rig.weapon(smg).ammo(), 28);
        assert_eq!(rig.shooter.combat_state, CombatState::FireTimerInProgress);
        assert!(rig.shooter.firing_bullet);

        rig.ctx().apply(ShooterAction::FireReleased);
        rig.tick(0.11);
        assert_eq!(rig.weapon(smg).ammo(), 28);
        assert_eq!(rig.shooter.combat_state, CombatState::Unoccupied);
        assert!(!rig.shooter.firing_bullet);
    }

    #[test]
    fn test_pistol_does_not_refire() {
        let mut rig = Rig::new();
        let pistol = rig.spawn_weapon(WeaponType::Pistol);
        rig.ctx().equip_weapon(pistol, false);

        rig.ctx().apply(ShooterAction::FirePressed);
        assert!(rig.weapon(pistol).moving_slide);
        rig.tick(0.25);

        assert_eq!(rig.weapon(pistol).ammo(), 11);
        assert_eq!(rig.shooter.combat_state, CombatState::Unoccupied);
    }

    #[test]
    fn test_empty_magazine_auto_reloads() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.set_magazine(smg, 1);

        rig.ctx().fire_weapon();
        rig.effects();
        rig.tick(0.11);

        assert_eq!(rig.shooter.combat_state, CombatState::Reloading);
        let effects = rig.effects();
        assert!(effects.contains(&CombatEffect::PlaySequence {
            sequence: SequenceId::Reload,
            section: "Reload SMG".to_string(),
            ticket: Some(rig.ticket()),
        }));
    }

    #[test]
    fn test_bullet_hit_uses_zone_damage() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        let target = Entity::from_raw(7);
        let location = Vec3::new(0.0, 0.0, -500.0);
        rig.services = CombatServices::with_rays(FixedRayQuery(
            RayHit::blocked_at(location, Some(target)).with_zone(HitZone::Head),
        ));

        rig.ctx().fire_weapon();
        let effects = rig.effects();

        assert!(effects
            .iter()
            .any(|effect| matches!(effect, CombatEffect::BeamTrail { end, .. } if *end == location)));
        assert!(effects.contains(&CombatEffect::BulletHit(BulletHit {
            shooter: rig.entity,
            weapon: smg,
            target,
            location,
            zone: HitZone::Head,
            damage: 40.0,
        })));
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, CombatEffect::ImpactParticles { .. })));
    }

    #[test]
    fn test_static_geometry_spawns_impact_particles() {
        let mut rig = Rig::new();
        let location = Vec3::new(10.0, 0.0, -300.0);
        rig.services =
            CombatServices::with_rays(FixedRayQuery(RayHit::blocked_at(location, None)));

        rig.ctx().fire_weapon();
        let effects = rig.effects();

        assert!(effects.contains(&CombatEffect::ImpactParticles { location }));
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, CombatEffect::BulletHit(_))));
    }

    // ========================================================================
    // Reload
    // ========================================================================

    #[test]
    fn test_reload_transfers_partial_reserve() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.set_magazine(smg, 10);
        rig.ammo = AmmoInventory::new([(AmmoType::NineMm, 15)]);

        assert!(rig.ctx().reload_weapon());
        // Патроны переходят только по окончании sequence
        assert_eq!(rig.weapon(smg).ammo(), 10);

        let ticket = rig.ticket();
        assert!(rig.ctx().finish_reloading(ticket));
        assert_eq!(rig.weapon(smg).ammo(), 25);
        assert_eq!(rig.ammo.reserve(AmmoType::NineMm), 0);
        assert_eq!(rig.shooter.combat_state, CombatState::Unoccupied);
    }

    #[test]
    fn test_reload_fills_magazine_from_large_reserve() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.set_magazine(smg, 5);
        rig.ammo = AmmoInventory::new([(AmmoType::NineMm, 100)]);

        rig.ctx().reload_weapon();
        let ticket = rig.ticket();
        rig.ctx().finish_reloading(ticket);

        assert_eq!(rig.weapon(smg).ammo(), 30);
        assert_eq!(rig.ammo.reserve(AmmoType::NineMm), 75);
    }

    #[test]
    fn test_reload_preconditions() {
        let mut rig = Rig::new();
        let smg = rig.equipped();

        // Полный магазин
        assert!(!rig.ctx().reload_weapon());

        // Нет reserve
        rig.set_magazine(smg, 3);
        rig.ammo = AmmoInventory::new([(AmmoType::NineMm, 0)]);
        assert!(!rig.ctx().reload_weapon());

        // Не Unoccupied
        rig.ammo.add(AmmoType::NineMm, 30);
        rig.ctx().fire_weapon();
        assert!(!rig.ctx().reload_weapon());
        assert_eq!(rig.shooter.combat_state, CombatState::FireTimerInProgress);
    }

    #[test]
    fn test_stale_reload_ticket_ignored() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.set_magazine(smg, 0);

        rig.ctx().reload_weapon();
        let ticket = rig.ticket();

        assert!(!rig.ctx().finish_reloading(SequenceTicket(ticket.0 + 7)));
        assert_eq!(rig.shooter.combat_state, CombatState::Reloading);
        assert_eq!(rig.weapon(smg).ammo(), 0);

        rig.ctx().notify(ShooterNotifyKind::FinishReloading(ticket));
        assert_eq!(rig.weapon(smg).ammo(), 30);

        // Повторный notify — no-op
        assert!(!rig.ctx().finish_reloading(ticket));
    }

    #[test]
    fn test_reload_cancels_aim_and_restores_if_held() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.set_magazine(smg, 0);

        rig.ctx().apply(ShooterAction::AimPressed);
        assert!(rig.shooter.aiming);

        rig.ctx().apply(ShooterAction::ReloadPressed);
        assert!(!rig.shooter.aiming);

        // Aim подавлен во время reload
        rig.ctx().apply(ShooterAction::AimPressed);
        assert!(!rig.shooter.aiming);

        let ticket = rig.ticket();
        rig.ctx().finish_reloading(ticket);
        assert!(rig.shooter.aiming);
    }

    #[test]
    fn test_clip_notifies_toggle_moving_clip() {
        let mut rig = Rig::new();
        let smg = rig.equipped();

        rig.ctx().notify(ShooterNotifyKind::GrabClip);
        assert!(rig.weapon(smg).moving_clip);
        rig.ctx().notify(ShooterNotifyKind::ReleaseClip);
        assert!(!rig.weapon(smg).moving_clip);
    }

    // ========================================================================
    // Aim / movement
    // ========================================================================

    #[test]
    fn test_aim_slows_movement() {
        let mut rig = Rig::new();
        rig.ctx().apply(ShooterAction::AimPressed);
        assert_eq!(rig.movement.max_walk_speed, 300.0);

        rig.ctx().apply(ShooterAction::AimReleased);
        assert!(!rig.shooter.aiming);
        assert_eq!(rig.movement.max_walk_speed, 650.0);
    }

    #[test]
    fn test_jump_from_crouch_only_stands_up() {
        let mut rig = Rig::new();
        rig.ctx().apply(ShooterAction::CrouchPressed);
        assert!(rig.movement.crouching);

        rig.ctx().apply(ShooterAction::JumpPressed);
        assert!(!rig.movement.crouching);
        assert!(rig.effects().is_empty());

        rig.ctx().apply(ShooterAction::JumpPressed);
        assert_eq!(rig.effects(), vec![CombatEffect::Jump]);
    }

    // ========================================================================
    // Equip / inventory
    // ========================================================================

    #[test]
    fn test_select_slot_equips_with_sequence() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        let rifle = rig.spawn_weapon(WeaponType::AssaultRifle);
        rig.ctx().receive_weapon(rifle);
        assert_eq!(rig.item(rifle).state(), ItemState::PickedUp);
        assert_eq!(rig.weapon(rifle).slot_index, Some(1));
        rig.effects();

        assert!(rig.ctx().select_slot(1));
        assert_eq!(rig.shooter.combat_state, CombatState::Equipping);
        assert_eq!(rig.equipped(), rifle);
        assert_eq!(rig.item(rifle).state(), ItemState::Equipped);
        assert_eq!(rig.item(smg).state(), ItemState::PickedUp);

        let effects = rig.effects();
        assert!(effects.contains(&CombatEffect::EquippedSlotChanged {
            previous: Some(0),
            current: 1,
        }));
        assert!(effects.contains(&CombatEffect::PlaySound(SoundCue::ItemEquip { item: rifle })));

        // Во время Equipping другие действия отклоняются
        assert!(!rig.ctx().select_slot(0));
        assert!(!rig.ctx().fire_weapon());

        let ticket = rig.ticket();
        rig.ctx().notify(ShooterNotifyKind::FinishEquipping(ticket));
        assert_eq!(rig.shooter.combat_state, CombatState::Unoccupied);
    }

    #[test]
    fn test_select_slot_preconditions() {
        let mut rig = Rig::new();

        // Текущий слот, пустой слот, за пределами ёмкости
        assert!(!rig.ctx().select_slot(0));
        assert!(!rig.ctx().select_slot(3));
        assert!(!rig.ctx().select_slot(6));
        assert_eq!(rig.shooter.combat_state, CombatState::Unoccupied);
        assert!(rig.effects().is_empty());
    }

    #[test]
    fn test_full_inventory_swaps_with_equipped() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        for _ in 1..6 {
            let pistol = rig.spawn_weapon(WeaponType::Pistol);
            rig.ctx().receive_weapon(pistol);
        }
        assert!(rig.slots.is_full());
        rig.effects();

        let rifle = rig.spawn_weapon(WeaponType::AssaultRifle);
        rig.ctx().deliver(rifle, DeliveredItem::Weapon);

        assert_eq!(rig.equipped(), rifle);
        assert_eq!(rig.slots.get(0), Some(rifle));
        assert_eq!(rig.weapon(rifle).slot_index, Some(0));
        assert_eq!(rig.item(rifle).state(), ItemState::Equipped);

        assert_eq!(rig.item(smg).state(), ItemState::Falling);
        assert_eq!(rig.weapon(smg).slot_index, None);
        assert!(rig.weapon(smg).falling);
        assert_eq!(rig.item(smg).owner, None);

        let effects = rig.effects();
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, CombatEffect::WeaponThrown { weapon, .. } if *weapon == smg)));
        // Swap: слот тот же, UI не уведомляется
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, CombatEffect::EquippedSlotChanged { .. })));
    }

    #[test]
    fn test_drop_weapon_throws_upright() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.weapons.get_mut(&smg).expect("smg").2.rotation =
            Quat::from_euler(EulerRot::YXZ, 0.7, 0.4, 0.2);

        assert_eq!(rig.ctx().drop_weapon(), Some(smg));
        assert_eq!(rig.shooter.equipped_weapon, None);
        assert_eq!(rig.slots.get(0), None);

        let (_, weapon, transform) = &rig.weapons[&smg];
        let (_, pitch, roll) = transform.rotation.to_euler(EulerRot::YXZ);
        assert!(pitch.abs() < 1e-4 && roll.abs() < 1e-4);
        assert!(weapon.falling);

        let impulse = rig
            .effects()
            .into_iter()
            .find_map(|effect| match effect {
                CombatEffect::WeaponThrown { impulse, .. } => Some(impulse),
                _ => None,
            })
            .expect("weapon thrown");
        assert!((impulse.length() - 20_000.0).abs() < 1.0);
    }

    #[test]
    fn test_pickup_button_returns_traced_item() {
        let mut rig = Rig::new();
        let item = Entity::from_raw(55);
        rig.trace.traced_item = Some(item);

        rig.ctx().fire_weapon();
        assert_eq!(rig.ctx().apply(ShooterAction::EquipPressed), None);

        rig.shooter.combat_state = CombatState::Unoccupied;
        assert_eq!(rig.ctx().apply(ShooterAction::EquipPressed), Some(item));
        assert_eq!(rig.trace.traced_item, None);
    }

    #[test]
    fn test_ammo_delivery_reloads_empty_weapon() {
        let mut rig = Rig::new();
        let smg = rig.equipped();
        rig.set_magazine(smg, 0);
        rig.ammo = AmmoInventory::new([(AmmoType::NineMm, 0), (AmmoType::AssaultRifle, 0)]);

        // Другой тип — только reserve
        rig.ctx().deliver(Entity::from_raw(60), DeliveredItem::Ammo {
            ammo_type: AmmoType::AssaultRifle,
            count: 30,
        });
        assert_eq!(rig.shooter.combat_state, CombatState::Unoccupied);
        assert_eq!(rig.ammo.reserve(AmmoType::AssaultRifle), 30);

        rig.ctx().deliver(Entity::from_raw(61), DeliveredItem::Ammo {
            ammo_type: AmmoType::NineMm,
            count: 20,
        });
        assert_eq!(rig.shooter.combat_state, CombatState::Reloading);

        let ticket = rig.ticket();
        rig.ctx().finish_reloading(ticket);
        assert_eq!(rig.weapon(smg).ammo(), 20);
        assert_eq!(rig.ammo.reserve(AmmoType::NineMm), 0);
    }

    // ========================================================================
    // Property: closed state cycle + ammo conservation
    // ========================================================================

    #[derive(Debug, Clone)]
    enum Step {
        Input(ShooterAction),
        Tick(f32),
        FinishReload,
        FinishEquip,
        Ammo(u32),
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Input(ShooterAction::FirePressed)),
            Just(Step::Input(ShooterAction::FireReleased)),
            Just(Step::Input(ShooterAction::ReloadPressed)),
            Just(Step::Input(ShooterAction::AimPressed)),
            Just(Step::Input(ShooterAction::AimReleased)),
            (0usize..8).prop_map(|slot| Step::Input(ShooterAction::SelectSlot(slot))),
            (0.01f32..0.3).prop_map(Step::Tick),
            Just(Step::FinishReload),
            Just(Step::FinishEquip),
            (1u32..40).prop_map(Step::Ammo),
        ]
    }

    proptest! {
        #[test]
        fn prop_combat_state_cycle(steps in prop::collection::vec(step_strategy(), 1..80)) {
            let mut rig = Rig::new();
            let pistol = rig.spawn_weapon(WeaponType::Pistol);
            rig.ctx().receive_weapon(pistol);
            let smg = rig.equipped();

            let nine_mm_total = |rig: &Rig| {
                rig.weapon(smg).ammo() + rig.weapon(pistol).ammo()
                    + rig.ammo.reserve(AmmoType::NineMm)
            };
            let mut expected_total = nine_mm_total(&rig);

            for step in steps {
                let before = rig.shooter.combat_state;

                match step {
                    Step::Input(action) => {
                        rig.ctx().apply(action);
                        let after = rig.shooter.combat_state;
                        // Из не-Unoccupied действие игрока не может сменить state
                        if before != CombatState::Unoccupied {
                            prop_assert_eq!(after, before);
                        }
                    }
                    Step::Tick(dt) => rig.tick(dt),
                    Step::FinishReload => {
                        if let Some(ticket) = rig.shooter.sequence.current() {
                            rig.ctx().notify(ShooterNotifyKind::FinishReloading(ticket));
                        }
                    }
                    Step::FinishEquip => {
                        if let Some(ticket) = rig.shooter.sequence.current() {
                            rig.ctx().notify(ShooterNotifyKind::FinishEquipping(ticket));
                        }
                    }
                    Step::Ammo(count) => {
                        rig.ctx().receive_ammo(AmmoType::NineMm, count);
                        expected_total += count;
                    }
                }

                expected_total -= count_shots(&rig.effects());
                prop_assert_eq!(nine_mm_total(&rig), expected_total);

                for weapon in [smg, pistol] {
                    prop_assert!(rig.weapon(weapon).ammo() <= rig.weapon(weapon).magazine_capacity());
                }
                for (index, weapon) in rig.slots.iter() {
                    prop_assert_eq!(rig.weapon(weapon).slot_index, Some(index));
                }
            }
        }
    }
}
