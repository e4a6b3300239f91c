//! Run settings shared by every workflow.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::RunError;
use crate::host::AnalysisPrint;
use crate::sections;
use crate::units::UnitSystem;

/// Environment variable overriding [`Settings::material`].
pub const MATERIAL_VAR: &str = "FRAMEGEN_MATERIAL";
/// Environment variable overriding [`Settings::section_table`].
pub const SECTION_TABLE_VAR: &str = "FRAMEGEN_SECTION_TABLE";
/// Environment variable overriding [`Settings::analysis_print`] with a numeric code.
pub const ANALYSIS_PRINT_VAR: &str = "FRAMEGEN_ANALYSIS_PRINT";

/// Host-side choices that are not part of a parameter form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Working units of coordinates and loads.
    pub units: UnitSystem,
    /// Material assigned to every member.
    pub material: String,
    /// Section table code passed with every designation.
    pub section_table: u32,
    /// Output requested from the analysis.
    pub analysis_print: AnalysisPrint,
    /// Half height of the elevation band that picks up each floor load.
    pub floor_band: f64,
    /// Self-weight multiplier; negative acts downwards.
    pub self_weight_factor: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            units: UnitSystem::FOOT_KIP,
            material: "STEEL".to_string(),
            section_table: sections::AMERICAN,
            analysis_print: AnalysisPrint::None,
            floor_band: 0.1,
            self_weight_factor: -1.0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Settings`] when the text is not valid settings JSON.
    ///
    /// # Examples
    /// ```
    /// use framegen::Settings;
    ///
    /// let settings = Settings::from_json(r#"{ "material": "CONCRETE" }"#).expect("valid json");
    /// assert_eq!(settings.material, "CONCRETE");
    /// assert_eq!(settings.section_table, 1);
    /// ```
    pub fn from_json(text: &str) -> Result<Self, RunError> {
        serde_json::from_str(text).map_err(|error| RunError::Settings(error.to_string()))
    }

    /// Read settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Settings`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let text = fs::read_to_string(path)
            .map_err(|error| RunError::Settings(format!("{}: {error}", path.display())))?;
        Self::from_json(&text)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Settings`] when an override is not a valid value.
    pub fn with_env_overrides(self) -> Result<Self, RunError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides looked up by variable name.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Settings`] when an override is not a valid value.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RunError> {
        if let Some(material) = lookup(MATERIAL_VAR) {
            self.material = material.trim().to_uppercase();
        }
        if let Some(table) = lookup(SECTION_TABLE_VAR) {
            self.section_table = table
                .trim()
                .parse()
                .map_err(|_| RunError::Settings(format!("{SECTION_TABLE_VAR}={table:?}")))?;
        }
        if let Some(print) = lookup(ANALYSIS_PRINT_VAR) {
            self.analysis_print = print
                .trim()
                .parse()
                .ok()
                .and_then(AnalysisPrint::from_code)
                .ok_or_else(|| RunError::Settings(format!("{ANALYSIS_PRINT_VAR}={print:?}")))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{ForceUnit, LengthUnit};

    #[test]
    fn defaults_follow_the_feet_kip_steel_setup() {
        let settings = Settings::default();
        assert_eq!(settings.units, UnitSystem::FOOT_KIP);
        assert_eq!(settings.material, "STEEL");
        assert_eq!(settings.analysis_print, AnalysisPrint::None);
    }

    #[test]
    fn json_overrides_units() {
        let settings = Settings::from_json(
            r#"{ "units": { "length": "meter", "force": "kilonewton" }, "floor_band": 0.05 }"#,
        )
        .expect("valid settings");
        assert_eq!(
            settings.units,
            UnitSystem::new(LengthUnit::Meter, ForceUnit::Kilonewton)
        );
        assert!((settings.floor_band - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_json_is_a_settings_error() {
        let error = Settings::from_json("{ units: }").expect_err("invalid json");
        assert!(matches!(error, RunError::Settings(_)));
    }

    #[test]
    fn environment_overrides_apply() {
        let settings = Settings::default()
            .with_overrides(|name| match name {
                MATERIAL_VAR => Some(" aluminum ".to_string()),
                ANALYSIS_PRINT_VAR => Some("2".to_string()),
                _ => None,
            })
            .expect("valid overrides");
        assert_eq!(settings.material, "ALUMINUM");
        assert_eq!(settings.analysis_print, AnalysisPrint::StaticsCheck);

        let error = Settings::default()
            .with_overrides(|name| (name == SECTION_TABLE_VAR).then(|| "usa".to_string()))
            .expect_err("not a number");
        assert!(error.to_string().contains(SECTION_TABLE_VAR));
    }
}
