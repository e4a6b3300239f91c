//! Boundary to the external structural-analysis application.
//!
//! The host owns the analysed model. This crate only feeds it nodes, members,
//! properties, supports and loads, then asks it to save and analyse. Every call
//! reports success or a [`HostError`]; the caller never retries.

use serde::{Deserialize, Serialize};

use crate::errors::HostError;
use crate::geometry::{GlobalAxis, Point};
use crate::topology::{MemberId, NodeId, Topology};
use crate::units::UnitSystem;

/// Handle of a section property created by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u32);

/// Handle of a support definition created by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportId(pub u32);

/// Number of a primary load case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadCaseId(pub u32);

impl std::fmt::Display for LoadCaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uniformly distributed force along members.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UniformForce {
    /// Global direction of the force.
    pub axis: GlobalAxis,
    /// Force per unit length; negative acts against the axis.
    pub intensity: f64,
    /// Distance from the start node where the load begins.
    pub start: f64,
    /// Distance from the start node where the load ends; `0` loads the full length.
    pub end: f64,
}

/// Area load spread onto the members framing a level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorLoad {
    /// Global direction of the pressure; also the axis the elevation band is measured on.
    pub axis: GlobalAxis,
    /// Force per unit area; negative acts against the axis.
    pub intensity: f64,
    /// Lower bound of the elevation band.
    pub min: f64,
    /// Upper bound of the elevation band.
    pub max: f64,
}

/// Output requested from the analysis engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisPrint {
    /// No extra output.
    #[default]
    None,
    /// Echo the load data.
    LoadData,
    /// Print the statics check.
    StaticsCheck,
    /// Print the statics check per load.
    StaticsLoad,
    /// Print mode shapes.
    ModeShapes,
    /// Load data and statics check.
    Both,
    /// Everything.
    All,
}

impl AnalysisPrint {
    /// Numeric flag passed to the host's analysis call.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            AnalysisPrint::None => 0,
            AnalysisPrint::LoadData => 1,
            AnalysisPrint::StaticsCheck => 2,
            AnalysisPrint::StaticsLoad => 3,
            AnalysisPrint::ModeShapes => 4,
            AnalysisPrint::Both => 5,
            AnalysisPrint::All => 6,
        }
    }

    /// Inverse of [`AnalysisPrint::code`].
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => AnalysisPrint::None,
            1 => AnalysisPrint::LoadData,
            2 => AnalysisPrint::StaticsCheck,
            3 => AnalysisPrint::StaticsLoad,
            4 => AnalysisPrint::ModeShapes,
            5 => AnalysisPrint::Both,
            6 => AnalysisPrint::All,
            _ => return None,
        })
    }
}

/// Operations a structural-analysis application exposes to scripts.
///
/// Implementations must refuse every call except [`AnalysisHost::connect`] until a
/// connection has been established.
pub trait AnalysisHost {
    /// Attach to a running host instance.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotConnected`] when no instance is available.
    fn connect(&mut self) -> Result<(), HostError>;

    /// Set the unit system all later input is expressed in.
    ///
    /// # Errors
    ///
    /// Fails when the host is not connected.
    fn set_units(&mut self, units: UnitSystem) -> Result<(), HostError>;

    /// Create a node.
    ///
    /// # Errors
    ///
    /// Fails when the id is taken.
    fn create_node(&mut self, id: NodeId, position: Point) -> Result<(), HostError>;

    /// Create a member between two existing nodes.
    ///
    /// # Errors
    ///
    /// Fails when the id is taken, an endpoint is unknown or the member has no length.
    fn create_member(&mut self, id: MemberId, start: NodeId, end: NodeId)
        -> Result<(), HostError>;

    /// Identifiers of every member in the model.
    ///
    /// # Errors
    ///
    /// Fails when the host is not connected.
    fn member_list(&self) -> Result<Vec<MemberId>, HostError>;

    /// Create a section property from a standard table.
    ///
    /// # Errors
    ///
    /// Fails when the designation is not in the table.
    fn create_table_property(
        &mut self,
        country: u32,
        designation: &str,
    ) -> Result<PropertyId, HostError>;

    /// Assign a section property to members.
    ///
    /// # Errors
    ///
    /// Fails on unknown members or properties.
    fn assign_property(&mut self, members: &[MemberId], property: PropertyId)
        -> Result<(), HostError>;

    /// Assign a named material to members.
    ///
    /// # Errors
    ///
    /// Fails on unknown members.
    fn assign_material(&mut self, material: &str, members: &[MemberId]) -> Result<(), HostError>;

    /// Create a fully fixed support definition.
    ///
    /// # Errors
    ///
    /// Fails when the host is not connected.
    fn create_fixed_support(&mut self) -> Result<SupportId, HostError>;

    /// Attach a support definition to nodes.
    ///
    /// # Errors
    ///
    /// Fails on unknown nodes or supports.
    fn assign_support(&mut self, nodes: &[NodeId], support: SupportId) -> Result<(), HostError>;

    /// Numbers of the primary load cases that already exist.
    ///
    /// # Errors
    ///
    /// Fails when the host is not connected.
    fn primary_load_cases(&self) -> Result<Vec<LoadCaseId>, HostError>;

    /// Create a primary load case. Without an explicit number the host picks the next free one.
    ///
    /// # Errors
    ///
    /// Fails when the requested number is taken.
    fn create_primary_load_case(
        &mut self,
        number: Option<LoadCaseId>,
        title: &str,
    ) -> Result<LoadCaseId, HostError>;

    /// Make a load case the target of subsequent self-weight and floor loads.
    ///
    /// # Errors
    ///
    /// Fails on unknown load cases.
    fn set_active_load_case(&mut self, case: LoadCaseId) -> Result<(), HostError>;

    /// Add self-weight to the active case.
    ///
    /// # Errors
    ///
    /// Fails when no case is active.
    fn add_self_weight(&mut self, axis: GlobalAxis, factor: f64) -> Result<(), HostError>;

    /// Add a uniformly distributed force to members in `case`.
    ///
    /// # Errors
    ///
    /// Fails on unknown members or load cases.
    fn add_member_uniform_force(
        &mut self,
        members: &[MemberId],
        load: UniformForce,
        case: LoadCaseId,
    ) -> Result<(), HostError>;

    /// Add a floor load to the active case.
    ///
    /// # Errors
    ///
    /// Fails when no case is active.
    fn add_floor_load(&mut self, load: FloorLoad) -> Result<(), HostError>;

    /// Persist the model.
    ///
    /// # Errors
    ///
    /// Fails when the model cannot be written.
    fn save(&mut self) -> Result<(), HostError>;

    /// Run the analysis.
    ///
    /// # Errors
    ///
    /// Fails when the model cannot be analysed.
    fn analyze(&mut self, print: AnalysisPrint) -> Result<(), HostError>;

    /// Create every node, then every member, of a generated topology.
    ///
    /// # Errors
    ///
    /// Stops at the first rejected call.
    fn create_topology(&mut self, topology: &Topology) -> Result<(), HostError> {
        for (id, position) in topology.nodes() {
            self.create_node(id, position)?;
        }
        for member in topology.members() {
            self.create_member(member.id, member.start, member.end)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_print_codes_roundtrip() {
        for code in 0..7 {
            let print = AnalysisPrint::from_code(code).expect("known code");
            assert_eq!(print.code(), code);
        }
        assert_eq!(AnalysisPrint::from_code(7), None);
    }
}
