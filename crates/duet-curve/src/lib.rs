//! Continuous pricing curve for duet.
//!
//! Prices trades against the canonical `LiquidityState`:
//!
//! ```text
//! delta(q) = clamp(lambda * q + tanh(q / eta), -cap, cap)
//! mid(q)   = reference_price * (1 + delta(q))
//! ask      = mid((q0 + q1) / 2) * (1 + spread(tier))
//! bid      = mid((q0 + q1) / 2) * (1 - spread(tier))
//! ```

pub mod config;
pub mod error;
pub mod pricing;
pub mod spread;

pub use config::{CurveConfig, CurveSettings};
pub use error::{CurveError, CurveResult};
pub use pricing::{PricingCurve, Quote};
pub use spread::{effective_spread, spread_multiplier};
