//! Host capabilities (ray queries, curves, timers, animation sequences)
//!
//! # Architecture
//!
//! Симуляция не зовёт engine singletons. Всё, что нужно от host engine,
//! приходит через:
//! - `CombatServices` resource (`RayQuery` + `CurveSampler`, boxed trait objects)
//! - `ServiceContext` — borrowed view на эти capabilities для чистой логики
//! - `Timers<K>` — per-owner timer service с generation counter
//! - `SequenceTracker` — ticket для animation sequence (notify callbacks)

use bevy::prelude::*;

pub mod curves;
pub mod rays;
pub mod timers;


pub use curves::{ease_out_cubic, BuiltinCurves, CurveId, CurveSampler};
pub use rays::{FixedRayQuery, HitZone, NoHitRayQuery, RayHit, RayQuery};
pub use timers::{SequenceTicket, SequenceTracker, TimerHandle, Timers};

/// Capabilities host engine (installed once, replaced в тестах)
#[derive(Resource)]
pub struct CombatServices {
    pub rays: Box<dyn RayQuery>,
    pub curves: Box<dyn CurveSampler>,
}

impl Default for CombatServices {
    fn default() -> Self {
        Self {
            rays: Box::new(NoHitRayQuery),
            curves: Box::new(BuiltinCurves),
        }
    }
}

impl CombatServices {
    pub fn with_rays(rays: impl RayQuery + 'static) -> Self {
        Self {
            rays: Box::new(rays),
            ..Default::default()
        }
    }

    pub fn context(&self) -> ServiceContext<'_> {
        ServiceContext {
            rays: self.rays.as_ref(),
            curves: self.curves.as_ref(),
        }
    }
}

/// Borrowed bundle of host capabilities passed into core components
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub rays: &'a dyn RayQuery,
    pub curves: &'a dyn CurveSampler,
}

/// Frame-rate aware approach toward `target` (FInterpTo semantics)
///
/// - speed <= 0 → сразу target
/// - шаг = distance × clamp(dt × speed, 0, 1)
pub fn interp_to(current: f32, target: f32, delta_time: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }

    let distance = target - current;
    if distance * distance < 1.0e-8 {
        return target;
    }

    current + distance * (delta_time * speed).clamp(0.0, 1.0)
}

/// Linear remap `value` from `input` range to `output` range, clamped to output
pub fn map_range_clamped(input: (f32, f32), output: (f32, f32), value: f32) -> f32 {
    let span = input.1 - input.0;
    if span.abs() <= f32::EPSILON {
        return output.0;
    }

    let alpha = ((value - input.0) / span).clamp(0.0, 1.0);
    output.0 + (output.1 - output.0) * alpha
}
