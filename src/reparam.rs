use crate::Scalar;
use serde::{Deserialize, Serialize};

const EPSILON: Scalar = Scalar::EPSILON * 10.0;
const NEWTON_RAPHSON_ITERATIONS: usize = 7;

/// Remapping of the evaluation parameter applied before geometric evaluation.
///
/// `Bezier` is a 1D cubic easing curve through `(0, 0)` and `(1, 1)` with
/// control points `(x1, y1)` and `(x2, y2)`, solved x-for-parameter. Input is
/// clamped to `<0; 1>` and monotonicity of the control values is the caller's
/// responsibility. `Identity` passes the parameter through unchanged.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reparam {
    #[default]
    Identity,
    Bezier {
        x1: Scalar,
        y1: Scalar,
        x2: Scalar,
        y2: Scalar,
    },
}

impl Reparam {
    pub fn bezier(x1: Scalar, y1: Scalar, x2: Scalar, y2: Scalar) -> Self {
        Self::Bezier { x1, y1, x2, y2 }
    }

    pub fn ease_in() -> Self {
        Self::bezier(0.55, 0.085, 0.68, 0.53)
    }

    pub fn ease_out() -> Self {
        Self::bezier(0.25, 0.46, 0.45, 0.94)
    }

    pub fn ease_in_out() -> Self {
        Self::bezier(0.455, 0.03, 0.515, 0.955)
    }

    /// Remaps `factor` through this curve.
    pub fn apply(&self, factor: Scalar) -> Scalar {
        match *self {
            Self::Identity => factor,
            Self::Bezier { x1, y1, x2, y2 } => {
                let factor = factor.clamp(0.0, 1.0);
                let time = find_time_for_component(factor, x1, x2);
                sample_component(time, y1, y2)
            }
        }
    }
}

fn sample_component(time: Scalar, a: Scalar, b: Scalar) -> Scalar {
    let inverse = 1.0 - time;
    3.0 * inverse * inverse * time * a + 3.0 * inverse * time * time * b + time * time * time
}

fn sample_component_derivative(time: Scalar, a: Scalar, b: Scalar) -> Scalar {
    let inverse = 1.0 - time;
    3.0 * inverse * inverse * a + 6.0 * inverse * time * (b - a) + 3.0 * time * time * (1.0 - b)
}

/// Newton-Raphson solve of curve time for given component value.
fn find_time_for_component(value: Scalar, a: Scalar, b: Scalar) -> Scalar {
    let mut guess = value;
    for _ in 0..NEWTON_RAPHSON_ITERATIONS {
        let difference = sample_component(guess, a, b) - value;
        if difference.abs() < EPSILON {
            break;
        }
        let derivative = sample_component_derivative(guess, a, b);
        if derivative.abs() < EPSILON {
            break;
        }
        let time = (guess - difference / derivative).clamp(0.0, 1.0);
        if (guess - time).abs() < EPSILON {
            break;
        }
        guess = time;
    }
    guess
}
