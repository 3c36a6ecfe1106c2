//! Item interp: полёт item от точки в мире к anchor перед камерой

use bevy::prelude::*;

use crate::services::{CurveId, CurveSampler};

/// Активный interp (живёт в `Item::interp`)
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInterp {
    pub shooter: Entity,
    /// Индекс в `InterpLocations` персонажа
    pub anchor_index: usize,
    pub start_location: Vec3,
    /// Yaw item относительно камеры на старте (item не крутится вместе с ней)
    pub initial_yaw_offset: f32,
    pub elapsed: f32,
    pub duration: f32,
}

/// Поза item на текущем тике
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpPose {
    pub location: Vec3,
    pub yaw: f32,
    pub scale: f32,
    pub finished: bool,
}

impl ItemInterp {
    pub fn new(
        shooter: Entity,
        anchor_index: usize,
        start: &Transform,
        camera_yaw: f32,
        duration: f32,
    ) -> Self {
        let (item_yaw, _, _) = start.rotation.to_euler(EulerRot::YXZ);
        Self {
            shooter,
            anchor_index,
            start_location: start.translation,
            initial_yaw_offset: item_yaw - camera_yaw,
            elapsed: 0.0,
            duration,
        }
    }

    /// Нормализованное время [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Шаг interp
    ///
    /// Target (anchor) пересчитывается каждый тик: он привязан к камере и двигается.
    /// Height и planar blend — отдельные кривые, scale — третья.
    pub fn advance(
        &mut self,
        delta_time: f32,
        anchor: Vec3,
        camera_yaw: f32,
        curves: &dyn CurveSampler,
    ) -> InterpPose {
        self.elapsed += delta_time;
        let t = self.progress();
        let finished = t >= 1.0;

        let height = curves.sample(CurveId::ItemHeight, t);
        let planar = curves.sample(CurveId::ItemPlanar, t);

        let start = self.start_location;
        let location = Vec3::new(
            start.x + (anchor.x - start.x) * planar,
            start.y + (anchor.y - start.y) * height,
            start.z + (anchor.z - start.z) * planar,
        );

        let scale = if finished {
            1.0
        } else {
            curves.sample(CurveId::ItemScale, t)
        };

        InterpPose {
            location,
            yaw: camera_yaw + self.initial_yaw_offset,
            scale,
            finished,
        }
    }
}
