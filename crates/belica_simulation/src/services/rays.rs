//! Ray/line query capability (host physics)

use bevy::prelude::*;

/// Какая часть цели получила попадание
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum HitZone {
    #[default]
    Body,
    Head,
}

/// Результат line trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Точка попадания (или конец луча если ничего не заблокировало)
    pub location: Vec3,
    pub blocked: bool,
    /// Entity которую задел луч (None = static geometry или промах)
    pub entity: Option<Entity>,
    pub zone: HitZone,
}

impl RayHit {
    pub fn miss(end: Vec3) -> Self {
        Self {
            location: end,
            blocked: false,
            entity: None,
            zone: HitZone::Body,
        }
    }

    pub fn blocked_at(location: Vec3, entity: Option<Entity>) -> Self {
        Self {
            location,
            blocked: true,
            entity,
            zone: HitZone::Body,
        }
    }

    pub fn with_zone(mut self, zone: HitZone) -> Self {
        self.zone = zone;
        self
    }
}

/// Host line trace (visibility channel)
pub trait RayQuery: Send + Sync {
    fn query(&self, start: Vec3, end: Vec3) -> RayHit;
}

/// Пустой мир: луч никогда ничего не задевает
pub struct NoHitRayQuery;

impl RayQuery for NoHitRayQuery {
    fn query(&self, _start: Vec3, end: Vec3) -> RayHit {
        RayHit::miss(end)
    }
}

/// Scripted мир: любой луч попадает в одну и ту же точку
///
/// Для headless сценариев и тестов (цель стоит на линии огня).
pub struct FixedRayQuery(pub RayHit);

impl RayQuery for FixedRayQuery {
    fn query(&self, _start: Vec3, _end: Vec3) -> RayHit {
        self.0
    }
}
