//! Working unit systems and load intensity conversion.

use serde::{Deserialize, Serialize};
use uom::si::f64::{Force, Length, Pressure};
use uom::si::force::{kilonewton, newton, pound_force};
use uom::si::length::{centimeter, foot, inch, meter, millimeter};

/// Length unit understood by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Inch.
    Inch,
    /// Foot.
    Foot,
    /// Centimetre.
    Centimeter,
    /// Metre.
    Meter,
    /// Millimetre.
    Millimeter,
}

impl LengthUnit {
    /// Keyword used in command files.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            LengthUnit::Inch => "INCHES",
            LengthUnit::Foot => "FEET",
            LengthUnit::Centimeter => "CM",
            LengthUnit::Meter => "METER",
            LengthUnit::Millimeter => "MMS",
        }
    }

    /// One unit of this length.
    #[must_use]
    pub fn quantity(self) -> Length {
        match self {
            LengthUnit::Inch => Length::new::<inch>(1.0),
            LengthUnit::Foot => Length::new::<foot>(1.0),
            LengthUnit::Centimeter => Length::new::<centimeter>(1.0),
            LengthUnit::Meter => Length::new::<meter>(1.0),
            LengthUnit::Millimeter => Length::new::<millimeter>(1.0),
        }
    }
}

/// Force unit understood by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceUnit {
    /// Kilopound (1000 lbf).
    Kip,
    /// Pound-force.
    Pound,
    /// Newton.
    Newton,
    /// Kilonewton.
    Kilonewton,
}

impl ForceUnit {
    /// Keyword used in command files.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            ForceUnit::Kip => "KIP",
            ForceUnit::Pound => "POUND",
            ForceUnit::Newton => "NEWTON",
            ForceUnit::Kilonewton => "KN",
        }
    }

    /// One unit of this force.
    #[must_use]
    pub fn quantity(self) -> Force {
        match self {
            ForceUnit::Kip => Force::new::<pound_force>(1_000.0),
            ForceUnit::Pound => Force::new::<pound_force>(1.0),
            ForceUnit::Newton => Force::new::<newton>(1.0),
            ForceUnit::Kilonewton => Force::new::<kilonewton>(1.0),
        }
    }
}

/// Pair of length and force units that all host input is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSystem {
    /// Unit of coordinates and distances.
    pub length: LengthUnit,
    /// Unit of forces.
    pub force: ForceUnit,
}

impl UnitSystem {
    /// Feet and kips.
    pub const FOOT_KIP: UnitSystem = UnitSystem::new(LengthUnit::Foot, ForceUnit::Kip);
    /// Feet and pounds, the unit system of slab loads entered in psf.
    pub const FOOT_POUND: UnitSystem = UnitSystem::new(LengthUnit::Foot, ForceUnit::Pound);
    /// Metres and kilonewtons.
    pub const METER_KILONEWTON: UnitSystem =
        UnitSystem::new(LengthUnit::Meter, ForceUnit::Kilonewton);

    /// Combine a length and a force unit.
    #[must_use]
    pub const fn new(length: LengthUnit, force: ForceUnit) -> Self {
        Self { length, force }
    }

    /// One force unit per square length unit.
    #[must_use]
    pub fn area_load_unit(self) -> Pressure {
        let length = self.length.quantity();
        self.force.quantity() / (length * length)
    }

    /// Convert an area load (force per area) from this system into `target`.
    ///
    /// # Examples
    /// ```
    /// use framegen::UnitSystem;
    ///
    /// let ksf = UnitSystem::FOOT_POUND.convert_area_load(80.0, UnitSystem::FOOT_KIP);
    /// assert!((ksf - 0.08).abs() < 1.0e-12);
    /// ```
    #[must_use]
    pub fn convert_area_load(self, value: f64, target: UnitSystem) -> f64 {
        value * (self.area_load_unit() / target.area_load_unit()).value
    }

    /// Convert a length from this system into `target`.
    #[must_use]
    pub fn convert_length(self, value: f64, target: UnitSystem) -> f64 {
        value * (self.length.quantity() / target.length.quantity()).value
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem::FOOT_KIP
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.length.keyword(), self.force.keyword())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn psf_converts_to_ksf() {
        let ksf = UnitSystem::FOOT_POUND.convert_area_load(80.0, UnitSystem::FOOT_KIP);
        assert_relative_eq!(ksf, 0.08, epsilon = 1.0e-12);
    }

    #[test]
    fn identical_systems_leave_values_alone() {
        let system = UnitSystem::default();
        assert_relative_eq!(system.convert_area_load(3.5, system), 3.5);
        assert_relative_eq!(system.convert_length(12.0, system), 12.0);
    }

    #[test]
    fn feet_convert_to_metres() {
        let metres = UnitSystem::FOOT_KIP.convert_length(10.0, UnitSystem::METER_KILONEWTON);
        assert_relative_eq!(metres, 3.048, epsilon = 1.0e-12);
    }

    #[test]
    fn command_file_keywords() {
        assert_eq!(UnitSystem::FOOT_KIP.to_string(), "FEET KIP");
        assert_eq!(UnitSystem::METER_KILONEWTON.to_string(), "METER KN");
    }
}
