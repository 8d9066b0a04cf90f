pub mod chain;
mod edit;
pub mod reparam;
pub mod segment;
pub mod utils;
pub mod vector;

pub mod prelude {
    pub use crate::{Scalar, chain::*, reparam::*, segment::*, utils::*, vector::*};
}

/// Scalar number type.
///
/// By default it is 32-bit float but you can change it to 64-bit float with `scalar64` feature.
#[cfg(not(feature = "scalar64"))]
pub type Scalar = f32;
#[cfg(feature = "scalar64")]
pub type Scalar = f64;
