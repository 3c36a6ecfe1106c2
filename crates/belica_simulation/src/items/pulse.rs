//! Glow pulse (косметика, ортогонально lifecycle state)

use bevy::prelude::*;

use super::components::ItemState;
use crate::config::ItemTuning;
use crate::services::{CurveId, CurveSampler};

/// Material параметры, которые host передаёт в glow material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseParams {
    pub glow_amount: f32,
    pub fresnel_exponent: f32,
    pub fresnel_reflect_fraction: f32,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            glow_amount: 150.0,
            fresnel_exponent: 3.0,
            fresnel_reflect_fraction: 4.0,
        }
    }
}

impl PulseParams {
    fn scaled(&self, factors: Vec3) -> Self {
        Self {
            glow_amount: self.glow_amount * factors.x,
            fresnel_exponent: self.fresnel_exponent * factors.y,
            fresnel_reflect_fraction: self.fresnel_reflect_fraction * factors.z,
        }
    }
}

/// Повторяющийся pulse timer (период `period`, рестарт при каждом входе в Pickup)
#[derive(Debug, Clone, PartialEq)]
pub struct PulseState {
    elapsed: f32,
    period: f32,
    base: PulseParams,
    pub current: PulseParams,
}

impl Default for PulseState {
    fn default() -> Self {
        Self::new(5.0, PulseParams::default())
    }
}

impl PulseState {
    pub fn new(period: f32, base: PulseParams) -> Self {
        Self {
            elapsed: 0.0,
            period,
            base,
            current: base,
        }
    }

    pub fn from_tuning(tuning: &ItemTuning) -> Self {
        Self::new(
            tuning.pulse_period,
            PulseParams {
                glow_amount: tuning.glow_amount,
                fresnel_exponent: tuning.fresnel_exponent,
                fresnel_reflect_fraction: tuning.fresnel_reflect_fraction,
            },
        )
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Pickup: pulse curve по циклическому таймеру.
    /// EquipInterping: interp pulse curve по прогрессу interp.
    pub fn tick(
        &mut self,
        delta_time: f32,
        state: ItemState,
        interp_progress: Option<f32>,
        curves: &dyn CurveSampler,
    ) {
        match state {
            ItemState::Pickup => {
                self.elapsed += delta_time;
                if self.period > 0.0 && self.elapsed >= self.period {
                    self.elapsed %= self.period;
                }
                let t = if self.period > 0.0 {
                    self.elapsed / self.period
                } else {
                    0.0
                };
                self.current = self.base.scaled(curves.sample_vec(CurveId::Pulse, t));
            }
            ItemState::EquipInterping => {
                if let Some(t) = interp_progress {
                    self.current = self.base.scaled(curves.sample_vec(CurveId::InterpPulse, t));
                }
            }
            _ => {}
        }
    }
}
