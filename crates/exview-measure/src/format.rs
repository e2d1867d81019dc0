//! Length formatting
//!
//! In automatic mode the unit switches with hysteresis: millimeters become
//! meters only above 1200 mm and meters fall back to millimeters only below
//! 800 mm. A reading that hovers around one meter keeps whichever unit it
//! already had.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{MeasureError, MeasureResult};

/// Switch from millimeters to meters above this many millimeters
pub const UPPER_THRESHOLD_MM: f64 = 1200.0;
/// Switch from meters to millimeters below this many millimeters
pub const LOWER_THRESHOLD_MM: f64 = 800.0;

/// Prefix for readings taken from an inexact snap
pub const APPROXIMATE_MARKER: &str = "≈ ";

/// Display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    #[default]
    Millimeters,
    Meters,
}

impl LengthUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Meters => "m",
        }
    }

    /// Convert meters into this unit
    pub fn convert(self, meters: f64) -> f64 {
        match self {
            LengthUnit::Millimeters => meters * 1000.0,
            LengthUnit::Meters => meters,
        }
    }

    /// Decimal places for a value already expressed in this unit
    pub fn decimals(self, value: f64) -> usize {
        let magnitude = value.abs();
        match self {
            LengthUnit::Millimeters => {
                if magnitude < 1.0 {
                    3
                } else if magnitude < 10.0 {
                    2
                } else if magnitude < 100.0 {
                    1
                } else {
                    0
                }
            }
            LengthUnit::Meters => {
                if magnitude < 1.0 {
                    3
                } else {
                    2
                }
            }
        }
    }
}

/// How the formatter picks its unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    /// Hysteresis between millimeters and meters
    #[default]
    Auto,
    Millimeters,
    Meters,
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitMode::Auto => "auto",
            UnitMode::Millimeters => "mm",
            UnitMode::Meters => "m",
        })
    }
}

impl FromStr for UnitMode {
    type Err = MeasureError;

    fn from_str(s: &str) -> MeasureResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(UnitMode::Auto),
            "mm" | "millimeter" | "millimeters" => Ok(UnitMode::Millimeters),
            "m" | "meter" | "meters" => Ok(UnitMode::Meters),
            _ => Err(MeasureError::UnknownUnit(s.to_string())),
        }
    }
}

/// What the two picked points describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    /// Straight distance
    #[default]
    Linear,
    /// Points on opposite sides of a circle
    Diameter,
    /// Points on opposite sides of a circle, displayed as half the span
    Radius,
}

impl MeasurementKind {
    /// Prefix placed in front of the number
    pub fn symbol(self) -> &'static str {
        match self {
            MeasurementKind::Linear => "",
            MeasurementKind::Diameter => "Ø",
            MeasurementKind::Radius => "R",
        }
    }

    /// Length to display for a picked span
    pub fn displayed_length(self, span: f64) -> f64 {
        match self {
            MeasurementKind::Radius => span * 0.5,
            MeasurementKind::Linear | MeasurementKind::Diameter => span,
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MeasurementKind::Linear => "linear",
            MeasurementKind::Diameter => "diameter",
            MeasurementKind::Radius => "radius",
        })
    }
}

impl FromStr for MeasurementKind {
    type Err = MeasureError;

    fn from_str(s: &str) -> MeasureResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(MeasurementKind::Linear),
            "diameter" => Ok(MeasurementKind::Diameter),
            "radius" => Ok(MeasurementKind::Radius),
            _ => Err(MeasureError::UnknownKind(s.to_string())),
        }
    }
}

/// A formatted reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedLength {
    /// Value in `unit`
    pub value: f64,
    pub unit: LengthUnit,
    pub decimals: usize,
    pub text: String,
}

impl fmt::Display for FormattedLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Stateful length formatter; remembers the last unit for hysteresis
#[derive(Debug, Clone, Default)]
pub struct MeasurementFormatter {
    mode: UnitMode,
    current: LengthUnit,
}

impl MeasurementFormatter {
    pub fn new(mode: UnitMode) -> Self {
        Self::starting_at(mode, LengthUnit::Millimeters)
    }

    /// Formatter that continues from a previously displayed unit
    pub fn starting_at(mode: UnitMode, current: LengthUnit) -> Self {
        let current = match mode {
            UnitMode::Auto => current,
            UnitMode::Millimeters => LengthUnit::Millimeters,
            UnitMode::Meters => LengthUnit::Meters,
        };
        Self { mode, current }
    }

    pub fn mode(&self) -> UnitMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: UnitMode) {
        *self = Self::starting_at(mode, self.current);
    }

    /// Unit of the last reading
    pub fn current_unit(&self) -> LengthUnit {
        self.current
    }

    /// Back to millimeters
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }

    /// Unit for `meters`, updating the hysteresis state
    pub fn select_unit(&mut self, meters: f64) -> LengthUnit {
        let mm = meters.abs() * 1000.0;
        self.current = match (self.mode, self.current) {
            (UnitMode::Millimeters, _) => LengthUnit::Millimeters,
            (UnitMode::Meters, _) => LengthUnit::Meters,
            (UnitMode::Auto, LengthUnit::Millimeters) if mm > UPPER_THRESHOLD_MM => LengthUnit::Meters,
            (UnitMode::Auto, LengthUnit::Meters) if mm < LOWER_THRESHOLD_MM => LengthUnit::Millimeters,
            (UnitMode::Auto, unit) => unit,
        };
        self.current
    }

    /// Format a physical length in meters
    pub fn format(&mut self, meters: f64, kind: MeasurementKind, approximate: bool) -> FormattedLength {
        let meters = if meters.is_finite() { kind.displayed_length(meters) } else { 0.0 };
        let unit = self.select_unit(meters);
        let value = unit.convert(meters);
        // Rounding can carry into the next decade; pick precision for the
        // number that is actually printed
        let decimals = unit.decimals(value);
        let decimals = unit.decimals(round_to(value, decimals));

        let marker = if approximate { APPROXIMATE_MARKER } else { "" };
        let text = format!("{}{}{:.*} {}", marker, kind.symbol(), decimals, value, unit.symbol());

        FormattedLength {
            value,
            unit,
            decimals,
            text,
        }
    }

    /// Format an exact linear length
    pub fn format_length(&mut self, meters: f64) -> String {
        self.format(meters, MeasurementKind::Linear, false).text
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hysteresis_sequence() {
        let mut formatter = MeasurementFormatter::default();
        assert_eq!(formatter.format_length(0.999), "999 mm");
        assert_eq!(formatter.format_length(1.21), "1.21 m");
        assert_eq!(formatter.format_length(0.999), "0.999 m");
        assert_eq!(formatter.format_length(0.79), "790 mm");
    }

    #[test]
    fn test_no_switch_inside_band() {
        let mut formatter = MeasurementFormatter::default();
        assert_eq!(formatter.select_unit(1.0), LengthUnit::Millimeters);
        assert_eq!(formatter.select_unit(1.2), LengthUnit::Millimeters);
        assert_eq!(formatter.select_unit(1.201), LengthUnit::Meters);
        assert_eq!(formatter.select_unit(0.801), LengthUnit::Meters);
        assert_eq!(formatter.select_unit(0.8), LengthUnit::Meters);
        assert_eq!(formatter.select_unit(0.799), LengthUnit::Millimeters);
    }

    #[test]
    fn test_precision_by_magnitude() {
        let mut formatter = MeasurementFormatter::default();
        assert_eq!(formatter.format_length(0.0005), "0.500 mm");
        assert_eq!(formatter.format_length(0.0025), "2.50 mm");
        assert_eq!(formatter.format_length(0.0425), "42.5 mm");
        assert_eq!(formatter.format_length(0.425), "425 mm");

        let mut meters = MeasurementFormatter::new(UnitMode::Meters);
        assert_eq!(meters.format_length(0.25), "0.250 m");
        assert_eq!(meters.format_length(12.346), "12.35 m");
    }

    #[test]
    fn test_precision_follows_rounded_value() {
        let mut formatter = MeasurementFormatter::default();
        assert_eq!(formatter.format_length(0.09996), "100 mm");
        assert_eq!(formatter.format_length(0.0099996), "10.0 mm");
        assert_eq!(formatter.format_length(0.00099996), "1.00 mm");
        assert_eq!(formatter.format_length(0.0999), "99.9 mm");

        let mut meters = MeasurementFormatter::new(UnitMode::Meters);
        assert_eq!(meters.format_length(0.99996), "1.00 m");
        assert_eq!(meters.format_length(0.9994), "0.999 m");
    }

    #[test]
    fn test_fixed_modes_ignore_thresholds() {
        let mut mm = MeasurementFormatter::new(UnitMode::Millimeters);
        assert_eq!(mm.format_length(5.0), "5000 mm");
        let mut m = MeasurementFormatter::new(UnitMode::Meters);
        assert_eq!(m.format_length(0.01), "0.010 m");
    }

    #[test]
    fn test_prefixes() {
        let mut formatter = MeasurementFormatter::default();
        let text = formatter.format(0.025, MeasurementKind::Diameter, true).text;
        assert_eq!(text, "≈ Ø25.0 mm");
        let text = formatter.format(0.025, MeasurementKind::Radius, false).text;
        assert_eq!(text, "R12.5 mm");
    }

    #[test]
    fn test_set_mode_back_to_auto_keeps_unit() {
        let mut formatter = MeasurementFormatter::new(UnitMode::Meters);
        formatter.set_mode(UnitMode::Auto);
        assert_eq!(formatter.current_unit(), LengthUnit::Meters);
        assert_eq!(formatter.format_length(1.0), "1.00 m");
    }

    #[test]
    fn test_parse_modes_and_kinds() {
        assert_eq!("MM".parse(), Ok(UnitMode::Millimeters));
        assert_eq!("meters".parse(), Ok(UnitMode::Meters));
        assert!(matches!("inch".parse::<UnitMode>(), Err(MeasureError::UnknownUnit(_))));
        assert_eq!("Radius".parse(), Ok(MeasurementKind::Radius));
        assert!(matches!("arc".parse::<MeasurementKind>(), Err(MeasureError::UnknownKind(_))));
    }
}
