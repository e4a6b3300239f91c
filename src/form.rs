//! Parameter forms: raw text fields in, typed specifications out.
//!
//! Every numeric field is kept as entered so that malformed input is reported
//! with the field label and the offending text before any host call is made.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::FormError;
use crate::geometry::GlobalAxis;
use crate::grid::GridParameters;
use crate::host::LoadCaseId;
use crate::portal::PortalParameters;
use crate::sections;

/// Input fields of the multistory building generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingForm {
    /// Number of Floors.
    #[serde(deserialize_with = "text_field")]
    pub floors: String,
    /// Floor Height (ft).
    #[serde(deserialize_with = "text_field")]
    pub floor_height: String,
    /// Grid X Bays.
    #[serde(deserialize_with = "text_field")]
    pub grid_x: String,
    /// Grid Y Bays.
    #[serde(deserialize_with = "text_field")]
    pub grid_y: String,
    /// Spacing X (ft).
    #[serde(deserialize_with = "text_field")]
    pub spacing_x: String,
    /// Spacing Y (ft).
    #[serde(deserialize_with = "text_field")]
    pub spacing_y: String,
    /// Slab Load (psf).
    #[serde(deserialize_with = "text_field")]
    pub slab_load: String,
    /// Beam Section.
    pub beam_section: String,
    /// Column Section.
    pub column_section: String,
}

impl Default for BuildingForm {
    fn default() -> Self {
        Self {
            floors: "5".to_string(),
            floor_height: "12".to_string(),
            grid_x: "4".to_string(),
            grid_y: "3".to_string(),
            spacing_x: "20".to_string(),
            spacing_y: "25".to_string(),
            slab_load: "80".to_string(),
            beam_section: sections::BEAM_CHOICES[1].to_string(),
            column_section: sections::COLUMN_CHOICES[1].to_string(),
        }
    }
}

/// Parsed multistory building request.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingSpec {
    /// Grid dimensions in feet.
    pub grid: GridParameters,
    /// Slab load in pounds per square foot, applied downwards on every floor.
    pub slab_load_psf: f64,
    /// Section designation of the floor beams.
    pub beam_section: String,
    /// Section designation of the columns.
    pub column_section: String,
}

impl BuildingForm {
    /// Parse every field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] naming the first field that does not parse.
    pub fn parse(&self) -> Result<BuildingSpec, FormError> {
        Ok(BuildingSpec {
            grid: GridParameters {
                floors: parse_count("Number of Floors", &self.floors)?,
                floor_height: parse_number("Floor Height", &self.floor_height)?,
                bays_x: parse_count("Grid X Bays", &self.grid_x)?,
                bays_y: parse_count("Grid Y Bays", &self.grid_y)?,
                spacing_x: parse_number("Spacing X", &self.spacing_x)?,
                spacing_y: parse_number("Spacing Y", &self.spacing_y)?,
            },
            slab_load_psf: parse_number("Slab Load", &self.slab_load)?,
            beam_section: parse_section("Beam Section", &self.beam_section)?,
            column_section: parse_section("Column Section", &self.column_section)?,
        })
    }
}

/// Input fields of the portal-frame warehouse generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseForm {
    /// Span (ft).
    #[serde(deserialize_with = "text_field")]
    pub span: String,
    /// Eave Height (ft).
    #[serde(deserialize_with = "text_field")]
    pub eave_height: String,
    /// Roof Rise (ft).
    #[serde(deserialize_with = "text_field")]
    pub roof_rise: String,
    /// Bay Spacing (ft).
    #[serde(deserialize_with = "text_field")]
    pub bay_spacing: String,
    /// Number of Bays.
    #[serde(deserialize_with = "text_field")]
    pub bays: String,
    /// Column Section.
    pub column_section: String,
    /// Rafter Section.
    pub rafter_section: String,
}

impl Default for WarehouseForm {
    fn default() -> Self {
        Self {
            span: "60".to_string(),
            eave_height: "20".to_string(),
            roof_rise: "5".to_string(),
            bay_spacing: "20".to_string(),
            bays: "4".to_string(),
            column_section: "W14X90".to_string(),
            rafter_section: "W18X35".to_string(),
        }
    }
}

/// Parsed warehouse request.
#[derive(Clone, Debug, PartialEq)]
pub struct WarehouseSpec {
    /// Frame dimensions in feet.
    pub portal: PortalParameters,
    /// Section designation of the columns.
    pub column_section: String,
    /// Section designation of the rafters and longitudinal ties.
    pub rafter_section: String,
}

impl WarehouseForm {
    /// Parse every field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] naming the first field that does not parse.
    pub fn parse(&self) -> Result<WarehouseSpec, FormError> {
        Ok(WarehouseSpec {
            portal: PortalParameters {
                span: parse_number("Span", &self.span)?,
                eave_height: parse_number("Eave Height", &self.eave_height)?,
                roof_rise: parse_number("Roof Rise", &self.roof_rise)?,
                bay_spacing: parse_number("Bay Spacing", &self.bay_spacing)?,
                bays: parse_count("Number of Bays", &self.bays)?,
            },
            column_section: parse_section("Column Section", &self.column_section)?,
            rafter_section: parse_section("Rafter Section", &self.rafter_section)?,
        })
    }
}

/// Input fields of the batch uniform-load script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformLoadForm {
    /// Load Case Number.
    #[serde(deserialize_with = "text_field")]
    pub case_number: String,
    /// Load Case Title.
    pub case_title: String,
    /// Line load in model units, negative downwards.
    #[serde(deserialize_with = "text_field")]
    pub intensity: String,
    /// Global direction of the load and of gravity.
    pub axis: GlobalAxis,
}

impl Default for UniformLoadForm {
    fn default() -> Self {
        Self {
            case_number: "1".to_string(),
            case_title: "DL + 10kN/m".to_string(),
            intensity: "-10".to_string(),
            axis: GlobalAxis::Y,
        }
    }
}

/// Parsed uniform-load request.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformLoadSpec {
    /// Case receiving the loads; reused when it already exists.
    pub case: LoadCaseId,
    /// Title used when the case has to be created.
    pub title: String,
    /// Force per unit length in the model's units.
    pub intensity: f64,
    /// Direction of the load and of self-weight.
    pub axis: GlobalAxis,
}

impl UniformLoadForm {
    /// Parse every field.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] naming the first field that does not parse.
    pub fn parse(&self) -> Result<UniformLoadSpec, FormError> {
        let number = self.case_number.trim();
        let case = number
            .parse::<u32>()
            .ok()
            .filter(|number| *number > 0)
            .ok_or_else(|| FormError::InvalidNumber {
                field: "Load Case Number",
                value: self.case_number.clone(),
                expected: "positive whole number",
            })?;
        Ok(UniformLoadSpec {
            case: LoadCaseId(case),
            title: self.case_title.trim().to_string(),
            intensity: parse_number("Load Intensity", &self.intensity)?,
            axis: self.axis,
        })
    }
}

/// Parse a whole, non-negative count.
fn parse_count(field: &'static str, text: &str) -> Result<usize, FormError> {
    text.trim()
        .parse()
        .map_err(|_| FormError::InvalidNumber {
            field,
            value: text.to_string(),
            expected: "whole number",
        })
}

/// Parse a finite decimal number.
fn parse_number(field: &'static str, text: &str) -> Result<f64, FormError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FormError::InvalidNumber {
            field,
            value: text.to_string(),
            expected: "number",
        })
}

/// Canonicalise a section designation.
fn parse_section(field: &'static str, text: &str) -> Result<String, FormError> {
    let designation = sections::normalize(text);
    if designation.is_empty() {
        return Err(FormError::MissingSection(field));
    }
    Ok(designation)
}

/// Accept a JSON string or number for a text field.
fn text_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected text or a number, found {other}"
        ))),
    }
}
