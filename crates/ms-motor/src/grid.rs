//! Operating-point grid and piecewise-linear characteristic lookup.
//!
//! Motor torque, motor current and load torque are supplied as sparse
//! datasheet points against speed. Between breakpoints the characteristic is
//! reconstructed linearly:
//!
//! ```text
//! y(s) = y0 + (s - x0) * (y1 - y0) / (x1 - x0),   x0 <= s < x1
//! ```
//!
//! Outside the grid the first/last value is held. Lookups are exact at
//! breakpoints.

use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One datasheet point. All values are percentages (speed of rated speed,
/// torque of full-load torque, current of full-load current).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub speed_pct: f64,
    pub motor_torque_pct: f64,
    pub motor_current_pct: f64,
    pub load_torque_pct: f64,
}

impl Breakpoint {
    pub fn new(
        speed_pct: f64,
        motor_torque_pct: f64,
        motor_current_pct: f64,
        load_torque_pct: f64,
    ) -> Self {
        Self {
            speed_pct,
            motor_torque_pct,
            motor_current_pct,
            load_torque_pct,
        }
    }

    fn value(&self, column: Column) -> f64 {
        match column {
            Column::MotorTorque => self.motor_torque_pct,
            Column::MotorCurrent => self.motor_current_pct,
            Column::LoadTorque => self.load_torque_pct,
        }
    }
}

/// Value column of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    MotorTorque,
    MotorCurrent,
    LoadTorque,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::MotorTorque, Column::MotorCurrent, Column::LoadTorque];
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Column::MotorTorque => "motor torque",
            Column::MotorCurrent => "motor current",
            Column::LoadTorque => "load torque",
        };
        f.write_str(name)
    }
}

/// Validated, ordered set of breakpoints spanning 0-100% speed.
#[derive(Clone, Debug, PartialEq)]
pub struct OperatingGrid {
    points: Vec<Breakpoint>,
}

impl OperatingGrid {
    /// Validate and wrap a breakpoint list.
    ///
    /// # Errors
    /// Fewer than 2 points, speeds not strictly increasing, first/last speed
    /// not at 0/100, negative or non-finite values.
    pub fn new(points: Vec<Breakpoint>) -> Result<Self, GridError> {
        if points.len() < 2 {
            return Err(GridError::TooFewPoints {
                count: points.len(),
            });
        }

        for (index, p) in points.iter().enumerate() {
            let values = [
                p.speed_pct,
                p.motor_torque_pct,
                p.motor_current_pct,
                p.load_torque_pct,
            ];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(GridError::NonFinite { index });
            }
            for column in Column::ALL {
                let value = p.value(column);
                if value < 0.0 {
                    return Err(GridError::Negative {
                        column,
                        index,
                        value,
                    });
                }
            }
            if index > 0 {
                let prev = points[index - 1].speed_pct;
                if p.speed_pct <= prev {
                    return Err(GridError::NonMonotonic {
                        index,
                        prev,
                        speed: p.speed_pct,
                    });
                }
            }
        }

        let first = points[0].speed_pct;
        if first != 0.0 {
            return Err(GridError::NotAnchored {
                which: "first",
                speed: first,
            });
        }
        let last = points[points.len() - 1].speed_pct;
        if last != 100.0 {
            return Err(GridError::NotAnchored {
                which: "last",
                speed: last,
            });
        }

        Ok(Self { points })
    }

    /// Build from order-aligned column arrays, the layout used by case files.
    pub fn from_columns(
        speed_pct: &[f64],
        motor_torque_pct: &[f64],
        motor_current_pct: &[f64],
        load_torque_pct: &[f64],
    ) -> Result<Self, GridError> {
        let expected = speed_pct.len();
        for (column, values) in [
            (Column::MotorTorque, motor_torque_pct),
            (Column::MotorCurrent, motor_current_pct),
            (Column::LoadTorque, load_torque_pct),
        ] {
            if values.len() != expected {
                return Err(GridError::LengthMismatch {
                    column,
                    expected,
                    got: values.len(),
                });
            }
        }

        let points = (0..expected)
            .map(|i| {
                Breakpoint::new(
                    speed_pct[i],
                    motor_torque_pct[i],
                    motor_current_pct[i],
                    load_torque_pct[i],
                )
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[Breakpoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Read-only characteristic lookup over an [`OperatingGrid`].
#[derive(Clone, Debug)]
pub struct CharacteristicTable {
    grid: OperatingGrid,
}

impl CharacteristicTable {
    pub fn new(grid: OperatingGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &OperatingGrid {
        &self.grid
    }

    /// Interpolated value of `column` at `speed_pct`.
    pub fn interpolate(&self, speed_pct: f64, column: Column) -> f64 {
        let points = self.grid.points();
        let first = &points[0];
        let last = &points[points.len() - 1];

        // NaN falls through to the first value.
        if !(speed_pct > first.speed_pct) {
            return first.value(column);
        }
        if speed_pct >= last.speed_pct {
            return last.value(column);
        }

        // First breakpoint strictly above the query; 1 <= upper < len here.
        let upper = points.partition_point(|p| p.speed_pct <= speed_pct);
        let p0 = &points[upper - 1];
        let p1 = &points[upper];

        let (x0, y0) = (p0.speed_pct, p0.value(column));
        let (x1, y1) = (p1.speed_pct, p1.value(column));
        y0 + (speed_pct - x0) * (y1 - y0) / (x1 - x0)
    }

    pub fn motor_torque(&self, speed_pct: f64) -> f64 {
        self.interpolate(speed_pct, Column::MotorTorque)
    }

    pub fn motor_current(&self, speed_pct: f64) -> f64 {
        self.interpolate(speed_pct, Column::MotorCurrent)
    }

    pub fn load_torque(&self, speed_pct: f64) -> f64 {
        self.interpolate(speed_pct, Column::LoadTorque)
    }

    /// Largest tabulated motor current. Piecewise-linear, so also the
    /// largest interpolated value.
    pub fn max_current(&self) -> f64 {
        self.grid
            .points()
            .iter()
            .map(|p| p.motor_current_pct)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A typical 4-pole cage motor on a fan, in percent.
    pub fn fan_grid() -> OperatingGrid {
        OperatingGrid::from_columns(
            &[0.0, 10.0, 20.0, 40.0, 60.0, 80.0, 90.0, 95.0, 100.0],
            &[180.0, 170.0, 160.0, 150.0, 170.0, 240.0, 250.0, 200.0, 100.0],
            &[600.0, 590.0, 580.0, 560.0, 520.0, 450.0, 380.0, 280.0, 100.0],
            &[10.0, 10.0, 12.0, 20.0, 40.0, 66.0, 82.0, 91.0, 100.0],
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::fan_grid;
    use super::*;
    use ms_core::{Tolerances, nearly_equal};

    #[test]
    fn exact_at_breakpoints() {
        let grid = fan_grid();
        let table = CharacteristicTable::new(grid.clone());
        for p in grid.points() {
            assert_eq!(table.motor_torque(p.speed_pct), p.motor_torque_pct);
            assert_eq!(table.motor_current(p.speed_pct), p.motor_current_pct);
            assert_eq!(table.load_torque(p.speed_pct), p.load_torque_pct);
        }
    }

    #[test]
    fn clamps_outside_range() {
        let table = CharacteristicTable::new(fan_grid());
        for column in Column::ALL {
            assert_eq!(table.interpolate(-5.0, column), table.interpolate(0.0, column));
            assert_eq!(
                table.interpolate(150.0, column),
                table.interpolate(100.0, column)
            );
        }
        assert_eq!(table.motor_torque(f64::NAN), 180.0);
    }

    #[test]
    fn linear_between_points() {
        let table = CharacteristicTable::new(fan_grid());
        let tol = Tolerances::default();
        // Midway between (20, 160) and (40, 150)
        assert!(nearly_equal(table.motor_torque(30.0), 155.0, tol));
        // Quarter way between (90, 380) and (95, 280)
        assert!(nearly_equal(table.motor_current(91.25), 355.0, tol));
    }

    #[test]
    fn max_current_is_locked_rotor_value() {
        let table = CharacteristicTable::new(fan_grid());
        assert_eq!(table.max_current(), 600.0);
    }

    #[test]
    fn rejects_single_point() {
        let err = OperatingGrid::new(vec![Breakpoint::new(0.0, 100.0, 100.0, 0.0)]).unwrap_err();
        assert_eq!(err, GridError::TooFewPoints { count: 1 });
    }

    #[test]
    fn rejects_non_monotonic_speed() {
        let err = OperatingGrid::from_columns(
            &[0.0, 50.0, 50.0, 100.0],
            &[100.0; 4],
            &[100.0; 4],
            &[0.0; 4],
        )
        .unwrap_err();
        assert!(matches!(err, GridError::NonMonotonic { index: 2, .. }));
    }

    #[test]
    fn rejects_negative_current() {
        let err = OperatingGrid::from_columns(
            &[0.0, 100.0],
            &[150.0, 100.0],
            &[600.0, -1.0],
            &[0.0, 100.0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GridError::Negative {
                column: Column::MotorCurrent,
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unanchored_grid() {
        let err = OperatingGrid::from_columns(
            &[0.0, 90.0],
            &[150.0, 100.0],
            &[600.0, 100.0],
            &[0.0, 100.0],
        )
        .unwrap_err();
        assert!(matches!(err, GridError::NotAnchored { which: "last", .. }));
    }

    #[test]
    fn rejects_column_length_mismatch() {
        let err = OperatingGrid::from_columns(
            &[0.0, 100.0],
            &[150.0, 100.0],
            &[600.0],
            &[0.0, 100.0],
        )
        .unwrap_err();
        assert!(matches!(err, GridError::LengthMismatch { got: 1, .. }));
    }
}

#[cfg(test)]
mod proptests {
    use super::test_support::fan_grid;
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn interpolant_stays_within_bracket(s in 0.0_f64..100.0) {
            let table = CharacteristicTable::new(fan_grid());
            let points = table.grid().points();
            let upper = points.partition_point(|p| p.speed_pct <= s);
            let lo = &points[upper - 1];
            let hi = &points[upper.min(points.len() - 1)];
            for column in Column::ALL {
                let y = table.interpolate(s, column);
                let (a, b) = (lo.value(column), hi.value(column));
                prop_assert!(y >= a.min(b) - 1e-9 && y <= a.max(b) + 1e-9);
            }
        }

        #[test]
        fn exact_at_arbitrary_breakpoints(
            inner in prop::collection::btree_set(1u32..999, 0..8),
            values in prop::collection::vec(0.0_f64..800.0, 30),
        ) {
            let mut speeds = vec![0.0];
            speeds.extend(inner.iter().map(|v| *v as f64 / 10.0));
            speeds.push(100.0);
            let n = speeds.len();
            let grid = OperatingGrid::from_columns(
                &speeds,
                &values[0..n],
                &values[10..10 + n],
                &values[20..20 + n],
            ).unwrap();
            let table = CharacteristicTable::new(grid.clone());
            for p in grid.points() {
                prop_assert_eq!(table.motor_torque(p.speed_pct), p.motor_torque_pct);
                prop_assert_eq!(table.motor_current(p.speed_pct), p.motor_current_pct);
                prop_assert_eq!(table.load_torque(p.speed_pct), p.load_torque_pct);
            }
        }
    }
}
