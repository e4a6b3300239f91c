//! In-memory analysis host that records and validates every call.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::errors::HostError;
use crate::geometry::{GlobalAxis, Point};
use crate::host::{
    AnalysisHost, AnalysisPrint, FloorLoad, LoadCaseId, PropertyId, SupportId, UniformForce,
};
use crate::sections;
use crate::topology::{MemberId, NodeId};
use crate::units::UnitSystem;

/// Members shorter than this are treated as zero length.
const LENGTH_TOLERANCE: f64 = 1.0e-9;

/// Two node identifiers joined by a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Incidence {
    /// First endpoint.
    pub start: NodeId,
    /// Second endpoint.
    pub end: NodeId,
}

/// Section property created from a standard table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableProperty {
    /// Handle returned to the caller.
    pub id: PropertyId,
    /// Table the section was taken from.
    pub country: u32,
    /// Canonical designation.
    pub designation: String,
}

/// A load recorded in a load case.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Load {
    /// Self-weight scaled by `factor` along `axis`.
    SelfWeight {
        /// Direction of gravity.
        axis: GlobalAxis,
        /// Multiplier on the computed self-weight.
        factor: f64,
    },
    /// Uniform force on a list of members.
    MemberUniform {
        /// Loaded members.
        members: Vec<MemberId>,
        /// Load definition.
        load: UniformForce,
    },
    /// Floor load over an elevation band.
    Floor(FloorLoad),
}

/// Primary load case with its loads in the order they were added.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadCase {
    /// Case number.
    pub number: LoadCaseId,
    /// Case title.
    pub title: String,
    /// Recorded loads.
    pub loads: Vec<Load>,
}

/// Analysis host that keeps the model in memory.
///
/// The host enforces the same rules as a live application: calls fail until
/// [`AnalysisHost::connect`] succeeds, identifiers must be unique, members need two
/// distinct existing endpoints and designations must exist in the section table.
/// It is used for dry runs and as the backing store of
/// [`ScriptHost`](crate::ScriptHost).
#[derive(Debug, Default, Serialize)]
pub struct ModelHost {
    /// Whether a host instance is reachable at all.
    #[serde(skip)]
    offline: bool,
    /// Whether `connect` has succeeded.
    #[serde(skip)]
    connected: bool,
    /// Where `save` writes a JSON snapshot, if anywhere.
    #[serde(skip)]
    snapshot_path: Option<PathBuf>,
    /// Working units.
    units: Option<UnitSystem>,
    /// Node coordinates by id.
    nodes: BTreeMap<NodeId, Point>,
    /// Member endpoints by id.
    members: BTreeMap<MemberId, Incidence>,
    /// Created section properties.
    properties: Vec<TableProperty>,
    /// Property assigned to each member.
    member_properties: BTreeMap<MemberId, PropertyId>,
    /// Material assigned to each member.
    materials: BTreeMap<MemberId, String>,
    /// Created support definitions.
    support_definitions: Vec<SupportId>,
    /// Support assigned to each node.
    supports: BTreeMap<NodeId, SupportId>,
    /// Primary load cases in creation order.
    load_cases: Vec<LoadCase>,
    /// Case receiving self-weight and floor loads.
    active_case: Option<LoadCaseId>,
    /// Number of successful saves.
    saves: usize,
    /// Print options of every analysis run.
    analyses: Vec<AnalysisPrint>,
}

impl ModelHost {
    /// Create a host that accepts a connection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host that refuses to connect, as if the application were closed.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Write a JSON snapshot of the model to `path` on every save.
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Working units, once set.
    #[must_use]
    pub fn units(&self) -> Option<UnitSystem> {
        self.units
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.nodes.iter().map(|(id, point)| (*id, *point))
    }

    /// Members in identifier order.
    pub fn members(&self) -> impl Iterator<Item = (MemberId, Incidence)> + '_ {
        self.members.iter().map(|(id, incidence)| (*id, *incidence))
    }

    /// Position of a node.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.nodes.get(&node).copied()
    }

    /// Created section properties.
    #[must_use]
    pub fn properties(&self) -> &[TableProperty] {
        &self.properties
    }

    /// Members carrying `property`, in identifier order.
    #[must_use]
    pub fn members_with_property(&self, property: PropertyId) -> Vec<MemberId> {
        self.member_properties
            .iter()
            .filter(|(_, assigned)| **assigned == property)
            .map(|(member, _)| *member)
            .collect()
    }

    /// Designation of the section assigned to a member.
    #[must_use]
    pub fn section_of(&self, member: MemberId) -> Option<&str> {
        let property = self.member_properties.get(&member)?;
        self.properties
            .iter()
            .find(|candidate| candidate.id == *property)
            .map(|property| property.designation.as_str())
    }

    /// Material assigned to a member.
    #[must_use]
    pub fn material_of(&self, member: MemberId) -> Option<&str> {
        self.materials.get(&member).map(String::as_str)
    }

    /// Members grouped by material, each group in identifier order.
    #[must_use]
    pub fn members_by_material(&self) -> BTreeMap<&str, Vec<MemberId>> {
        let mut groups: BTreeMap<&str, Vec<MemberId>> = BTreeMap::new();
        for (member, material) in &self.materials {
            groups.entry(material.as_str()).or_default().push(*member);
        }
        groups
    }

    /// Nodes carrying a support, in identifier order.
    #[must_use]
    pub fn supported_nodes(&self) -> Vec<NodeId> {
        self.supports.keys().copied().collect()
    }

    /// Primary load cases in creation order.
    #[must_use]
    pub fn load_cases(&self) -> &[LoadCase] {
        &self.load_cases
    }

    /// Case currently receiving loads.
    #[must_use]
    pub fn active_load_case(&self) -> Option<LoadCaseId> {
        self.active_case
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Print options of every analysis run, in order.
    #[must_use]
    pub fn analyses(&self) -> &[AnalysisPrint] {
        &self.analyses
    }

    /// Fail unless `connect` has succeeded.
    fn ensure_connected(&self) -> Result<(), HostError> {
        if self.connected {
            Ok(())
        } else {
            Err(HostError::NotConnected)
        }
    }

    /// Fail unless every member exists and the list is not empty.
    fn ensure_members(&self, members: &[MemberId], call: &'static str) -> Result<(), HostError> {
        if members.is_empty() {
            return Err(HostError::EmptySelection(call));
        }
        match members.iter().find(|member| !self.members.contains_key(member)) {
            Some(missing) => Err(HostError::UnknownMember(*missing)),
            None => Ok(()),
        }
    }

    /// The active load case, mutably.
    fn active_case_mut(&mut self) -> Result<&mut LoadCase, HostError> {
        let active = self.active_case.ok_or(HostError::NoActiveLoadCase)?;
        self.case_mut(active)
    }

    /// A load case by number, mutably.
    fn case_mut(&mut self, number: LoadCaseId) -> Result<&mut LoadCase, HostError> {
        self.load_cases
            .iter_mut()
            .find(|case| case.number == number)
            .ok_or(HostError::UnknownLoadCase(number.0))
    }
}

impl AnalysisHost for ModelHost {
    fn connect(&mut self) -> Result<(), HostError> {
        if self.offline {
            return Err(HostError::NotConnected);
        }
        self.connected = true;
        log::debug!("model host connected");
        Ok(())
    }

    fn set_units(&mut self, units: UnitSystem) -> Result<(), HostError> {
        self.ensure_connected()?;
        self.units = Some(units);
        Ok(())
    }

    fn create_node(&mut self, id: NodeId, position: Point) -> Result<(), HostError> {
        self.ensure_connected()?;
        if self.nodes.contains_key(&id) {
            return Err(HostError::DuplicateNode(id));
        }
        self.nodes.insert(id, position);
        Ok(())
    }

    fn create_member(&mut self, id: MemberId, start: NodeId, end: NodeId) -> Result<(), HostError> {
        self.ensure_connected()?;
        if self.members.contains_key(&id) {
            return Err(HostError::DuplicateMember(id));
        }
        let a = self.position(start).ok_or(HostError::UnknownNode(start))?;
        let b = self.position(end).ok_or(HostError::UnknownNode(end))?;
        if start == end || a.distance_to(b) < LENGTH_TOLERANCE {
            return Err(HostError::DegenerateMember {
                member: id,
                start,
                end,
            });
        }
        self.members.insert(id, Incidence { start, end });
        Ok(())
    }

    fn member_list(&self) -> Result<Vec<MemberId>, HostError> {
        self.ensure_connected()?;
        Ok(self.members.keys().copied().collect())
    }

    fn create_table_property(
        &mut self,
        country: u32,
        designation: &str,
    ) -> Result<PropertyId, HostError> {
        self.ensure_connected()?;
        let section =
            sections::lookup(country, designation).ok_or_else(|| HostError::UnknownSection {
                country,
                designation: designation.to_string(),
            })?;
        let id = PropertyId(u32::try_from(self.properties.len()).unwrap_or(u32::MAX - 1) + 1);
        self.properties.push(TableProperty {
            id,
            country,
            designation: section.designation.to_string(),
        });
        Ok(id)
    }

    fn assign_property(
        &mut self,
        members: &[MemberId],
        property: PropertyId,
    ) -> Result<(), HostError> {
        self.ensure_connected()?;
        if !self.properties.iter().any(|candidate| candidate.id == property) {
            return Err(HostError::UnknownProperty(property.0));
        }
        self.ensure_members(members, "assign_property")?;
        for member in members {
            self.member_properties.insert(*member, property);
        }
        Ok(())
    }

    fn assign_material(&mut self, material: &str, members: &[MemberId]) -> Result<(), HostError> {
        self.ensure_connected()?;
        self.ensure_members(members, "assign_material")?;
        for member in members {
            self.materials.insert(*member, material.to_string());
        }
        Ok(())
    }

    fn create_fixed_support(&mut self) -> Result<SupportId, HostError> {
        self.ensure_connected()?;
        let id = SupportId(
            u32::try_from(self.support_definitions.len()).unwrap_or(u32::MAX - 1) + 1,
        );
        self.support_definitions.push(id);
        Ok(id)
    }

    fn assign_support(&mut self, nodes: &[NodeId], support: SupportId) -> Result<(), HostError> {
        self.ensure_connected()?;
        if !self.support_definitions.contains(&support) {
            return Err(HostError::UnknownSupport(support.0));
        }
        if nodes.is_empty() {
            return Err(HostError::EmptySelection("assign_support"));
        }
        if let Some(missing) = nodes.iter().find(|node| !self.nodes.contains_key(node)) {
            return Err(HostError::UnknownNode(*missing));
        }
        for node in nodes {
            self.supports.insert(*node, support);
        }
        Ok(())
    }

    fn primary_load_cases(&self) -> Result<Vec<LoadCaseId>, HostError> {
        self.ensure_connected()?;
        Ok(self.load_cases.iter().map(|case| case.number).collect())
    }

    fn create_primary_load_case(
        &mut self,
        number: Option<LoadCaseId>,
        title: &str,
    ) -> Result<LoadCaseId, HostError> {
        self.ensure_connected()?;
        let number = match number {
            Some(number) if self.load_cases.iter().any(|case| case.number == number) => {
                return Err(HostError::DuplicateLoadCase(number.0));
            }
            Some(number) => number,
            None => LoadCaseId(
                self.load_cases
                    .iter()
                    .map(|case| case.number.0)
                    .max()
                    .unwrap_or(0)
                    + 1,
            ),
        };
        self.load_cases.push(LoadCase {
            number,
            title: title.to_string(),
            loads: Vec::new(),
        });
        Ok(number)
    }

    fn set_active_load_case(&mut self, case: LoadCaseId) -> Result<(), HostError> {
        self.ensure_connected()?;
        self.case_mut(case)?;
        self.active_case = Some(case);
        Ok(())
    }

    fn add_self_weight(&mut self, axis: GlobalAxis, factor: f64) -> Result<(), HostError> {
        self.ensure_connected()?;
        self.active_case_mut()?
            .loads
            .push(Load::SelfWeight { axis, factor });
        Ok(())
    }

    fn add_member_uniform_force(
        &mut self,
        members: &[MemberId],
        load: UniformForce,
        case: LoadCaseId,
    ) -> Result<(), HostError> {
        self.ensure_connected()?;
        self.ensure_members(members, "add_member_uniform_force")?;
        self.case_mut(case)?.loads.push(Load::MemberUniform {
            members: members.to_vec(),
            load,
        });
        Ok(())
    }

    fn add_floor_load(&mut self, load: FloorLoad) -> Result<(), HostError> {
        self.ensure_connected()?;
        self.active_case_mut()?.loads.push(Load::Floor(load));
        Ok(())
    }

    fn save(&mut self) -> Result<(), HostError> {
        self.ensure_connected()?;
        if let Some(path) = &self.snapshot_path {
            let json = serde_json::to_string_pretty(&*self)?;
            fs::write(path, json)?;
            log::info!("model snapshot written to {}", path.display());
        }
        self.saves += 1;
        Ok(())
    }

    fn analyze(&mut self, print: AnalysisPrint) -> Result<(), HostError> {
        self.ensure_connected()?;
        if self.members.is_empty() {
            return Err(HostError::EmptyModel);
        }
        if self.supports.is_empty() {
            return Err(HostError::NoSupports);
        }
        self.analyses.push(print);
        Ok(())
    }
}
