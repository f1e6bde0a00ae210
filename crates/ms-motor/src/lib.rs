//! Motor and load characteristics for start-up studies.
//!
//! Provides:
//! - Operating-point grid with piecewise-linear lookup
//! - Load-torque profiles (tabulated, centrifugal, constant)
//! - DOL / soft-start current limiting and the shared voltage transform
//! - I²t thermal-capacity model
//! - Kloss-model characteristic synthesis from datasheet setpoints

pub mod error;
pub mod grid;
pub mod kloss;
pub mod load;
pub mod nameplate;
pub mod start;
pub mod thermal;

pub use error::{GridError, MotorError, MotorResult};
pub use grid::{Breakpoint, CharacteristicTable, Column, OperatingGrid};
pub use kloss::{KlossCurve, STANDARD_BREAKPOINTS};
pub use load::{LoadProfile, LoadShape};
pub use nameplate::MotorNameplate;
pub use start::{AppliedPoint, SoftStartRamp, StartMethod, apply, voltage_ratio};
pub use thermal::ThermalModel;
