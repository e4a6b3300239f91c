//! Standard wide-flange sections available from the American steel table.

use serde::Serialize;

/// Table code of the American steel section table.
pub const AMERICAN: u32 = 1;

/// Catalog entry for one rolled section.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Section {
    /// Designation as listed in the table, e.g. `W14X90`.
    pub designation: &'static str,
    /// Nominal weight in pounds per foot.
    pub weight: f64,
}

/// Shorthand for building the table below.
const fn w(designation: &'static str, weight: f64) -> Section {
    Section {
        designation,
        weight,
    }
}

/// Sections known to the catalog.
pub static CATALOG: [Section; 12] = [
    w("W8X31", 31.0),
    w("W10X49", 49.0),
    w("W12X26", 26.0),
    w("W12X65", 65.0),
    w("W14X90", 90.0),
    w("W14X120", 120.0),
    w("W16X26", 26.0),
    w("W16X100", 100.0),
    w("W18X35", 35.0),
    w("W21X44", 44.0),
    w("W24X55", 55.0),
    w("W27X84", 84.0),
];

/// Beam sections offered by the building form.
pub const BEAM_CHOICES: [&str; 4] = ["W16X26", "W18X35", "W21X44", "W24X55"];

/// Column sections offered by the building form.
pub const COLUMN_CHOICES: [&str; 4] = ["W12X65", "W14X90", "W14X120", "W16X100"];

/// Canonical spelling of a designation: trimmed, upper case, no inner spaces.
///
/// # Examples
/// ```
/// use framegen::sections::normalize;
///
/// assert_eq!(normalize(" w14x90 "), "W14X90");
/// ```
#[must_use]
pub fn normalize(designation: &str) -> String {
    designation
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Look up a designation in the table identified by `country`.
#[must_use]
pub fn lookup(country: u32, designation: &str) -> Option<&'static Section> {
    if country != AMERICAN {
        return None;
    }
    let wanted = normalize(designation);
    CATALOG.iter().find(|section| section.designation == wanted)
}
