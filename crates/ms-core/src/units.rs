// ms-core/src/units.rs

use uom::si::f64::{
    AngularVelocity as UomAngularVelocity, MomentOfInertia as UomMomentOfInertia,
    Power as UomPower, Torque as UomTorque,
};

// Public canonical unit types (SI, f64)
pub type AngularVelocity = UomAngularVelocity;
pub type Inertia = UomMomentOfInertia;
pub type Power = UomPower;
pub type Torque = UomTorque;

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn rpm(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::revolution_per_minute;
    AngularVelocity::new::<revolution_per_minute>(v)
}

#[inline]
pub fn rad_per_s(v: f64) -> AngularVelocity {
    use uom::si::angular_velocity::radian_per_second;
    AngularVelocity::new::<radian_per_second>(v)
}

#[inline]
pub fn nm(v: f64) -> Torque {
    use uom::si::torque::newton_meter;
    Torque::new::<newton_meter>(v)
}

#[inline]
pub fn kgm2(v: f64) -> Inertia {
    use uom::si::moment_of_inertia::kilogram_square_meter;
    Inertia::new::<kilogram_square_meter>(v)
}

/// Convert a shaft speed change in rad/s to rpm.
#[inline]
pub fn rad_s_to_rpm(v: f64) -> f64 {
    use uom::si::angular_velocity::revolution_per_minute;
    rad_per_s(v).get::<revolution_per_minute>()
}

pub mod constants {
    use super::*;

    /// Nameplate convention: T[N·m] = 9550 · P[kW] / n[rpm].
    pub const NM_PER_KW_PER_RPM: f64 = 9550.0;

    /// Locked-rotor current basis for stall-time ratings (% of FLC).
    pub const LOCKED_ROTOR_REFERENCE_PCT: f64 = 600.0;

    /// Rated shaft torque from nameplate power and speed.
    #[inline]
    pub fn rated_torque(power: Power, speed: AngularVelocity) -> Torque {
        use uom::si::angular_velocity::revolution_per_minute;
        use uom::si::power::kilowatt;
        nm(NM_PER_KW_PER_RPM * power.get::<kilowatt>() / speed.get::<revolution_per_minute>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Tolerances, nearly_equal};
    use uom::si::torque::newton_meter;

    #[test]
    fn constructors_smoke() {
        let _p = kw(75.0);
        let _n = rpm(1480.0);
        let _w = rad_per_s(155.0);
        let _t = nm(484.0);
        let _j = kgm2(2.5);
    }

    #[test]
    fn rpm_conversion_matches_two_pi() {
        let one_rad_s = rad_s_to_rpm(1.0);
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        };
        assert!(nearly_equal(one_rad_s, 60.0 / (2.0 * std::f64::consts::PI), tol));
    }

    #[test]
    fn rated_torque_uses_nameplate_convention() {
        let t = constants::rated_torque(kw(75.0), rpm(1480.0));
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        };
        assert!(nearly_equal(
            t.get::<newton_meter>(),
            9550.0 * 75.0 / 1480.0,
            tol
        ));
    }
}
