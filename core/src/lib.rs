//! Slew-model core for VLBI antenna analysis.
//!
//! The modules reconstruct scan timing records from field-system control
//! logs, merge planned pointing from azel schedule tables, and fit per-axis
//! rate/offset models with iterative outlier rejection.

pub mod catalog;
pub mod fit;
pub mod logparse;
pub mod prelude;
pub mod records;
pub mod schedule;

pub use prelude::{Axis, SettlingAxis, SlewError, SlewResult, Wrap};
