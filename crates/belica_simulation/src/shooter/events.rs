//! Shooter events
//!
//! Host → ECS: `ShooterInput` (кнопки), `ShooterNotify` (animation notifies).
//! ECS → host: `CombatEffectEvent` (звук, анимация, частицы) и typed
//! observer events вместо engine delegates.

use bevy::prelude::*;

use crate::services::{HitZone, SequenceTicket};

/// Действие игрока
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterAction {
    FirePressed,
    FireReleased,
    AimPressed,
    AimReleased,
    ReloadPressed,
    /// Подобрать item под прицелом
    EquipPressed,
    /// Переключиться на слот инвентаря
    SelectSlot(usize),
    CrouchPressed,
    JumpPressed,
}

#[derive(Event, Debug, Clone)]
pub struct ShooterInput {
    pub shooter: Entity,
    pub action: ShooterAction,
}

/// Notify от animation sequence (host)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterNotifyKind {
    FinishReloading(SequenceTicket),
    FinishEquipping(SequenceTicket),
    GrabClip,
    ReleaseClip,
}

#[derive(Event, Debug, Clone)]
pub struct ShooterNotify {
    pub shooter: Entity,
    pub kind: ShooterNotifyKind,
}

/// Animation sequences, которые симуляция просит проиграть
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceId {
    HipFire,
    Reload,
    Equip,
    HitReact,
    Attack,
    Death,
}

/// Звуки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    WeaponFire { weapon: Entity },
    ItemPickup { item: Entity },
    ItemEquip { item: Entity },
    BulletImpact,
    MeleeImpact,
    HealthPickup,
}

/// Эффект для host (презентация, без обратной связи в логику)
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEffect {
    PlaySound(SoundCue),
    PlaySequence {
        sequence: SequenceId,
        section: String,
        /// Host вернёт ticket в notify по окончании
        ticket: Option<SequenceTicket>,
    },
    MuzzleFlash {
        weapon: Entity,
    },
    BeamTrail {
        start: Vec3,
        end: Vec3,
    },
    ImpactParticles {
        location: Vec3,
    },
    BloodParticles {
        location: Vec3,
    },
    /// Взрыв (particles + физика обломков на стороне host)
    Explosion {
        location: Vec3,
    },
    Jump,
    AttachWeapon {
        weapon: Entity,
    },
    DetachWeapon {
        weapon: Entity,
    },
    HealthBar {
        visible: bool,
    },
    BulletHit(BulletHit),
    EquippedSlotChanged {
        previous: Option<usize>,
        current: usize,
    },
    WeaponThrown {
        weapon: Entity,
        impulse: Vec3,
    },
}

/// Effect с источником (shooter / enemy / pickup)
#[derive(Event, Debug, Clone)]
pub struct CombatEffectEvent {
    pub source: Entity,
    pub effect: CombatEffect,
}

/// Пуля попала в entity (static geometry → только ImpactParticles)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BulletHit {
    pub shooter: Entity,
    pub weapon: Entity,
    pub target: Entity,
    pub location: Vec3,
    pub zone: HitZone,
    pub damage: f32,
}

/// Item под прицелом сменился (pickup widget + outline)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct TraceHighlightChanged {
    pub shooter: Entity,
    pub item: Entity,
    pub highlighted: bool,
    pub inventory_full: bool,
}

/// Подсветка слота, куда ляжет подбираемое оружие
#[derive(Event, Debug, Clone, PartialEq)]
pub struct SlotHighlightChanged {
    pub shooter: Entity,
    pub slot: usize,
    pub highlighted: bool,
}

/// Экипированный слот сменился (previous = None при первом equip)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct EquippedSlotChanged {
    pub shooter: Entity,
    pub previous: Option<usize>,
    pub current: usize,
}

/// Оружие выброшено (host применяет импульс к physics body)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct WeaponThrown {
    pub shooter: Entity,
    pub weapon: Entity,
    pub impulse: Vec3,
}
