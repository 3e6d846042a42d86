//! Response curves
//!
//! Monotonic functions from [0, 1] to [0, 1] applied to normalized
//! hardware values before they are remapped to output bounds.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Largest exponential factor whose `exp(factor)` stays finite in f32
pub const MAX_EXPONENTIAL_FACTOR: f32 = 80.0;

/// Response-shaping curve
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseCurve {
    /// Identity
    #[default]
    Linear,
    /// `t^exponent`; above 1 gives fine control at the bottom of the range
    Power { exponent: f32 },
    /// `(exp(k*t) - 1) / (exp(k) - 1)`, steeper as `factor` grows
    Exponential { factor: f32 },
    /// Piecewise-linear curve through sampled `[x, y]` points
    Points { points: Vec<[f32; 2]> },
}

impl ResponseCurve {
    /// Evaluate the curve. Input is clamped to [0, 1] first.
    pub fn evaluate(&self, input: f32) -> f32 {
        let t = if input.is_nan() { 0.0 } else { input.clamp(0.0, 1.0) };

        match self {
            ResponseCurve::Linear => t,
            ResponseCurve::Power { exponent } => t.powf(*exponent),
            // exp_m1 keeps tiny factors from cancelling to 0/0
            ResponseCurve::Exponential { factor } => (factor * t).exp_m1() / factor.exp_m1(),
            ResponseCurve::Points { points } => sample(points, t),
        }
    }

    /// Check the curve is evaluable and monotonic over [0, 1]
    pub fn validate(&self) -> Result<()> {
        match self {
            ResponseCurve::Linear => Ok(()),
            ResponseCurve::Power { exponent } => check_parameter(*exponent),
            ResponseCurve::Exponential { factor } => {
                check_parameter(*factor)?;
                if *factor > MAX_EXPONENTIAL_FACTOR {
                    return Err(ConfigError::CurveFactorTooLarge(*factor));
                }
                Ok(())
            }
            ResponseCurve::Points { points } => check_points(points),
        }
    }
}

fn check_parameter(value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::CurveParameter(value))
    }
}

fn check_points(points: &[[f32; 2]]) -> Result<()> {
    if points.len() < 2 {
        return Err(ConfigError::CurveTooFewPoints(points.len()));
    }

    for (i, [x, y]) in points.iter().enumerate() {
        if !x.is_finite() || !y.is_finite() || !(0.0..=1.0).contains(y) {
            return Err(ConfigError::CurveOutOfRange(i));
        }
    }

    let first = points[0][0];
    let last = points[points.len() - 1][0];
    if first != 0.0 || last != 1.0 {
        return Err(ConfigError::CurveEndpoints);
    }

    for (i, pair) in points.windows(2).enumerate() {
        if pair[1][0] <= pair[0][0] {
            return Err(ConfigError::CurveNotIncreasing(i + 1));
        }
        if pair[1][1] < pair[0][1] {
            return Err(ConfigError::CurveNotMonotonic(i + 1));
        }
    }

    Ok(())
}

/// Linear interpolation between the two points surrounding `t`
fn sample(points: &[[f32; 2]], t: f32) -> f32 {
    // Index of the first point with x > t
    let upper = points.partition_point(|p| p[0] <= t);

    if upper == 0 {
        return points.first().map(|p| p[1]).unwrap_or(t);
    }
    if upper >= points.len() {
        return points.last().map(|p| p[1]).unwrap_or(t);
    }

    let [x0, y0] = points[upper - 1];
    let [x1, y1] = points[upper];
    let span = x1 - x0;
    if span <= f32::EPSILON {
        y1
    } else {
        y0 + (y1 - y0) * (t - x0) / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_linear_is_identity() {
        let curve = ResponseCurve::Linear;
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(0.25), 0.25);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_input_is_clamped() {
        let curve = ResponseCurve::Linear;
        assert_eq!(curve.evaluate(-0.5), 0.0);
        assert_eq!(curve.evaluate(1.5), 1.0);
        assert_eq!(curve.evaluate(f32::NAN), 0.0);
    }

    #[test]
    fn test_power_curve() {
        let curve = ResponseCurve::Power { exponent: 2.0 };
        assert_abs_diff_eq!(curve.evaluate(0.5), 0.25);
        assert_abs_diff_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_exponential_endpoints() {
        let curve = ResponseCurve::Exponential { factor: 4.0 };
        assert_abs_diff_eq!(curve.evaluate(0.0), 0.0);
        assert_abs_diff_eq!(curve.evaluate(1.0), 1.0, epsilon = 1e-6);
        // Sags below the diagonal
        assert!(curve.evaluate(0.5) < 0.5);
    }

    #[test]
    fn test_points_interpolate() {
        let curve = ResponseCurve::Points {
            points: vec![[0.0, 0.0], [0.5, 0.8], [1.0, 1.0]],
        };
        assert!(curve.validate().is_ok());
        assert_abs_diff_eq!(curve.evaluate(0.25), 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(curve.evaluate(0.5), 0.8, epsilon = 1e-6);
        assert_abs_diff_eq!(curve.evaluate(0.75), 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_step_curve() {
        let curve = ResponseCurve::Points {
            points: vec![[0.0, 0.0], [0.5, 0.0], [0.51, 1.0], [1.0, 1.0]],
        };
        assert!(curve.validate().is_ok());
        assert_eq!(curve.evaluate(0.4), 0.0);
        assert_eq!(curve.evaluate(0.9), 1.0);
    }

    #[test]
    fn test_non_monotonic_rejected() {
        let curve = ResponseCurve::Points {
            points: vec![[0.0, 0.0], [0.5, 0.9], [1.0, 0.2]],
        };
        assert_eq!(curve.validate(), Err(ConfigError::CurveNotMonotonic(2)));
    }

    #[test]
    fn test_bad_points_rejected() {
        let single = ResponseCurve::Points { points: vec![[0.0, 0.0]] };
        assert_eq!(single.validate(), Err(ConfigError::CurveTooFewPoints(1)));

        let short = ResponseCurve::Points {
            points: vec![[0.0, 0.0], [0.8, 1.0]],
        };
        assert_eq!(short.validate(), Err(ConfigError::CurveEndpoints));

        let repeated = ResponseCurve::Points {
            points: vec![[0.0, 0.0], [0.5, 0.5], [0.5, 0.6], [1.0, 1.0]],
        };
        assert_eq!(repeated.validate(), Err(ConfigError::CurveNotIncreasing(2)));

        let overshoot = ResponseCurve::Points {
            points: vec![[0.0, 0.0], [1.0, 1.2]],
        };
        assert_eq!(overshoot.validate(), Err(ConfigError::CurveOutOfRange(1)));
    }

    #[test]
    fn test_bad_parameters_rejected() {
        assert!(ResponseCurve::Power { exponent: 0.0 }.validate().is_err());
        assert!(ResponseCurve::Exponential { factor: f32::NAN }.validate().is_err());
    }

    #[test]
    fn test_extreme_exponential_factor() {
        let flat = ResponseCurve::Exponential { factor: 1e-8 };
        assert!(flat.validate().is_ok());
        for t in [0.0, 0.3, 0.7, 1.0] {
            let y = flat.evaluate(t);
            assert!(y.is_finite());
            assert_abs_diff_eq!(y, t, epsilon = 1e-4);
        }

        let steep = ResponseCurve::Exponential {
            factor: MAX_EXPONENTIAL_FACTOR,
        };
        assert!(steep.validate().is_ok());
        assert!(steep.evaluate(0.5).is_finite());
        assert_abs_diff_eq!(steep.evaluate(1.0), 1.0, epsilon = 1e-5);

        let overflow = ResponseCurve::Exponential { factor: 100.0 };
        assert_eq!(
            overflow.validate(),
            Err(ConfigError::CurveFactorTooLarge(100.0))
        );
    }

    #[test]
    fn test_curve_yaml() {
        let curve: ResponseCurve = serde_yaml::from_str("type: power\nexponent: 3.0").unwrap();
        assert_eq!(curve, ResponseCurve::Power { exponent: 3.0 });

        let curve: ResponseCurve =
            serde_yaml::from_str("type: points\npoints: [[0.0, 0.0], [1.0, 1.0]]").unwrap();
        assert!(curve.validate().is_ok());
    }
}
