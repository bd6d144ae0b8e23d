//! Core types for the duet liquidity engine.
//!
//! This crate provides the primitives every other crate builds on:
//! - `Wad`: signed 256-bit fixed-point number scaled by 10^18
//! - `mul_wad`, `div_wad`, `tanh_wad`: deterministic fixed-point math
//! - `Venue`, `TradeSide`: decision and trade enums

pub mod error;
pub mod types;
pub mod wad;

pub use error::{CoreError, CoreResult};
pub use types::{TradeSide, UnixSeconds, Venue};
pub use wad::{abs, clamp, div_wad, mul_wad, tanh_wad, Wad, WAD_DECIMALS, WAD_RAW};
