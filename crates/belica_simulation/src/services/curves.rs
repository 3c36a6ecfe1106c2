//! Curve evaluation capability
//!
//! В оригинальном host curves — ассеты, редактируемые дизайнером.
//! Здесь: trait + аналитические defaults (`BuiltinCurves`).
//! Время всегда нормализовано: t ∈ [0, 1].

use bevy::prelude::*;
use std::f32::consts::PI;

/// Идентификатор кривой
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum CurveId {
    /// Вертикальный blend item → anchor (с дугой вверх)
    ItemHeight,
    /// Горизонтальный blend item → anchor
    ItemPlanar,
    /// Uniform scale во время interp
    ItemScale,
    /// Pistol slide (0 → 1 → 0)
    SlideDisplacement,
    /// Glow pulse пока item лежит в мире
    Pulse,
    /// Glow pulse во время interp
    InterpPulse,
}

pub trait CurveSampler: Send + Sync {
    fn sample(&self, curve: CurveId, t: f32) -> f32;

    /// Vector curves (pulse: glow amount, fresnel exponent, reflect fraction)
    fn sample_vec(&self, curve: CurveId, t: f32) -> Vec3 {
        Vec3::splat(self.sample(curve, t))
    }
}

pub struct BuiltinCurves;

impl CurveSampler for BuiltinCurves {
    fn sample(&self, curve: CurveId, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match curve {
            // 0 → 1 с overshoot посередине (item "подпрыгивает" к камере)
            CurveId::ItemHeight => t + 0.6 * (PI * t).sin(),
            CurveId::ItemPlanar => ease_out_cubic(t),
            CurveId::ItemScale => 1.0 - 0.8 * t,
            CurveId::SlideDisplacement => {
                if t < 0.5 {
                    t * 2.0
                } else {
                    (1.0 - t) * 2.0
                }
            }
            CurveId::Pulse => 0.5 - 0.5 * (2.0 * PI * t).cos(),
            CurveId::InterpPulse => (PI * t).sin(),
        }
    }

    fn sample_vec(&self, curve: CurveId, t: f32) -> Vec3 {
        let w = self.sample(curve, t);
        match curve {
            CurveId::Pulse | CurveId::InterpPulse => Vec3::new(w, 1.0 + w, 1.0 - 0.5 * w),
            _ => Vec3::splat(w),
        }
    }
}

/// Ease-out cubic: быстрый старт, плавный финиш
///
/// Formula: (t-1)³ + 1
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t - 1.0;
    t * t * t + 1.0
}
