//! Frame-rate value interpolator
//!
//! Holds a target and, once per frame, moves a current value toward it.
//! Time is measured in seconds of frame time, not samples.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Below this distance the current value snaps to the target
const SNAP_DISTANCE: f32 = 1e-5;

/// Interpolation algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    /// No smoothing: the target is returned as-is
    #[default]
    Direct,
    /// Exponential approach to the target
    Exponential,
    /// Critically damped spring
    DampedSpring,
}

/// Smoothing settings of a mapper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Algorithm (default: direct)
    #[serde(default)]
    pub kind: InterpolationKind,

    /// Response speed, 1/s (default: 10)
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 { 10.0 }

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            kind: InterpolationKind::Direct,
            speed: default_speed(),
        }
    }
}

impl SmoothingConfig {
    /// Exponential smoothing at the given speed
    pub fn exponential(speed: f32) -> Self {
        Self {
            kind: InterpolationKind::Exponential,
            speed,
        }
    }

    /// Critically damped spring at the given speed
    pub fn damped_spring(speed: f32) -> Self {
        Self {
            kind: InterpolationKind::DampedSpring,
            speed,
        }
    }

    /// Whether values are smoothed at all
    pub fn is_enabled(&self) -> bool {
        self.kind != InterpolationKind::Direct
    }

    /// Reject speeds the interpolator cannot step with
    pub fn validate(&self) -> Result<()> {
        if self.is_enabled() && !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ConfigError::UnsupportedSpeed(self.speed));
        }
        Ok(())
    }
}

/// Smoothed value
#[derive(Debug, Clone)]
pub struct Interpolator {
    config: SmoothingConfig,
    current: f32,
    target: f32,
    velocity: f32,
}

impl Interpolator {
    /// Create an interpolator resting at `initial`
    pub fn new(initial: f32, config: SmoothingConfig) -> Self {
        Self {
            config,
            current: initial,
            target: initial,
            velocity: 0.0,
        }
    }

    /// Set the value to move toward
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Get the current value without stepping
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Get the smoothing settings
    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Advance by `dt` seconds and return the new current value
    pub fn step(&mut self, dt: f32) -> f32 {
        let dt = dt.max(0.0);

        match self.config.kind {
            InterpolationKind::Direct => {
                self.current = self.target;
                self.velocity = 0.0;
            }
            InterpolationKind::Exponential => {
                let decay = (-self.config.speed * dt).exp();
                self.current = self.target + (self.current - self.target) * decay;
            }
            InterpolationKind::DampedSpring => {
                // Implicit integration keeps the spring stable at low frame rates
                let omega = self.config.speed;
                let n1 = self.velocity - (self.current - self.target) * (omega * omega * dt);
                let n2 = 1.0 + omega * dt;
                self.velocity = n1 / (n2 * n2);
                self.current += self.velocity * dt;
            }
        }

        if (self.current - self.target).abs() <= SNAP_DISTANCE {
            self.current = self.target;
            self.velocity = 0.0;
        }

        self.current
    }
}
