//! Load-torque profiles.

use crate::error::MotorResult;
use crate::grid::CharacteristicTable;
use ms_core::ensure_non_negative;
use serde::{Deserialize, Serialize};

/// Shape of the load-torque curve against speed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LoadShape {
    /// Use the grid's load column as tabulated.
    GridDirect,
    /// `breakaway + (rated - breakaway) * (speed/100)^2` (fans, centrifugal pumps)
    Centrifugal { breakaway_pct: f64, rated_pct: f64 },
    /// Flat at the rated value (conveyors, hoists)
    Constant { rated_pct: f64 },
}

/// Load-torque source plus an overall scale factor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadProfile {
    pub shape: LoadShape,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self {
            shape: LoadShape::GridDirect,
            scale: 1.0,
        }
    }
}

impl LoadProfile {
    pub fn grid_direct() -> Self {
        Self::default()
    }

    pub fn centrifugal(breakaway_pct: f64, rated_pct: f64) -> Self {
        Self {
            shape: LoadShape::Centrifugal {
                breakaway_pct,
                rated_pct,
            },
            scale: 1.0,
        }
    }

    pub fn constant(rated_pct: f64) -> Self {
        Self {
            shape: LoadShape::Constant { rated_pct },
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn validate(&self) -> MotorResult<()> {
        ensure_non_negative(self.scale, "load scale factor")?;
        match self.shape {
            LoadShape::GridDirect => {}
            LoadShape::Centrifugal {
                breakaway_pct,
                rated_pct,
            } => {
                ensure_non_negative(breakaway_pct, "breakaway torque")?;
                ensure_non_negative(rated_pct, "rated load torque")?;
            }
            LoadShape::Constant { rated_pct } => {
                ensure_non_negative(rated_pct, "constant load torque")?;
            }
        }
        Ok(())
    }

    /// Unscaled shape value, without a table. `None` for [`LoadShape::GridDirect`].
    pub fn shape_torque(&self, speed_pct: f64) -> Option<f64> {
        match self.shape {
            LoadShape::GridDirect => None,
            LoadShape::Centrifugal {
                breakaway_pct,
                rated_pct,
            } => {
                let x = speed_pct.clamp(0.0, 100.0) / 100.0;
                Some(breakaway_pct + (rated_pct - breakaway_pct) * x * x)
            }
            LoadShape::Constant { rated_pct } => Some(rated_pct),
        }
    }

    /// Load torque (% FLT) at `speed_pct`.
    pub fn torque_at(&self, table: &CharacteristicTable, speed_pct: f64) -> f64 {
        let base = self
            .shape_torque(speed_pct)
            .unwrap_or_else(|| table.load_torque(speed_pct));
        base * self.scale
    }
}
