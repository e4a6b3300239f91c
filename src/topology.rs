//! Node and member storage with sequential identifier allocation.

use std::fmt;
use std::ops::RangeInclusive;

use petgraph::algo::connected_components;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::errors::TopologyError;
use crate::geometry::Point;

/// Identifier of a node. Identifiers start at 1 and follow creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

/// Identifier of a member. Identifiers start at 1 and follow creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(u32);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            /// Wrap a raw host identifier.
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Raw host identifier.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_impls!(NodeId);
id_impls!(MemberId);

/// Structural role of a member, used to pick its section property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Vertical member between two levels.
    Column,
    /// Horizontal floor beam running along global X.
    BeamX,
    /// Horizontal floor beam running along global Y.
    BeamY,
    /// Sloped roof member between an eave and the ridge.
    Rafter,
    /// Tie running between adjacent portal frames.
    Longitudinal,
}

impl MemberRole {
    /// Every role in allocation order.
    pub const ALL: [MemberRole; 5] = [
        MemberRole::Column,
        MemberRole::BeamX,
        MemberRole::BeamY,
        MemberRole::Rafter,
        MemberRole::Longitudinal,
    ];

    /// Section property bucket the role belongs to.
    #[must_use]
    pub const fn group(self) -> SectionGroup {
        match self {
            MemberRole::Column => SectionGroup::Column,
            MemberRole::BeamX | MemberRole::BeamY => SectionGroup::Beam,
            MemberRole::Rafter | MemberRole::Longitudinal => SectionGroup::Rafter,
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberRole::Column => "column",
            MemberRole::BeamX => "beam-x",
            MemberRole::BeamY => "beam-y",
            MemberRole::Rafter => "rafter",
            MemberRole::Longitudinal => "longitudinal",
        };
        f.write_str(name)
    }
}

/// Group of roles that share one section property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionGroup {
    /// Columns.
    Column,
    /// Floor beams in both directions.
    Beam,
    /// Rafters and the longitudinal ties of a portal frame.
    Rafter,
}

/// A node stored in the topology graph.
#[derive(Clone, Copy, Debug)]
struct Node {
    /// Host identifier.
    id: NodeId,
    /// Coordinates in the working length unit.
    position: Point,
}

/// A member stored in the topology graph.
#[derive(Clone, Copy, Debug)]
struct Member {
    /// Host identifier.
    id: MemberId,
    /// Structural role.
    role: MemberRole,
}

/// Flat view of one member, as handed to a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Member identifier.
    pub id: MemberId,
    /// First endpoint.
    pub start: NodeId,
    /// Second endpoint.
    pub end: NodeId,
    /// Structural role.
    pub role: MemberRole,
}

/// Generated frame: nodes with coordinates and role-tagged members.
///
/// The topology doubles as the generation context. It hands out node and member
/// identifiers sequentially from 1, so identifiers never have gaps and a member
/// can only reference nodes that already exist.
#[derive(Clone, Debug, Default)]
pub struct Topology {
    /// Nodes are graph vertices and members are edges; index `n` holds id `n + 1`.
    graph: Graph<Node, Member>,
}

impl Topology {
    /// Create an empty topology.
    ///
    /// # Examples
    /// ```
    /// use framegen::Topology;
    ///
    /// let topology = Topology::new();
    /// assert_eq!(topology.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Identifier the next node will receive.
    #[must_use]
    pub fn next_node_id(&self) -> NodeId {
        NodeId(id_from_index(self.graph.node_count()))
    }

    /// Identifier the next member will receive.
    #[must_use]
    pub fn next_member_id(&self) -> MemberId {
        MemberId(id_from_index(self.graph.edge_count()))
    }

    /// Add a node and return its identifier.
    ///
    /// # Examples
    /// ```
    /// use framegen::{point, Topology};
    ///
    /// let mut topology = Topology::new();
    /// let node = topology.add_node(point(0.0, 0.0, 0.0));
    /// assert_eq!(node.get(), 1);
    /// ```
    pub fn add_node(&mut self, position: Point) -> NodeId {
        let id = self.next_node_id();
        self.graph.add_node(Node { id, position });
        log::trace!("node {id} at ({}, {}, {})", position.x, position.y, position.z);
        id
    }

    /// Connect two existing nodes with a new member.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::UnknownNode`] when either endpoint has not been created
    /// and [`TopologyError::SelfLoop`] when both endpoints are the same node.
    pub fn add_member(
        &mut self,
        start: NodeId,
        end: NodeId,
        role: MemberRole,
    ) -> Result<MemberId, TopologyError> {
        let id = self.next_member_id();
        let a = self
            .node_index(start)
            .ok_or(TopologyError::UnknownNode { member: id, node: start })?;
        let b = self
            .node_index(end)
            .ok_or(TopologyError::UnknownNode { member: id, node: end })?;
        if a == b {
            return Err(TopologyError::SelfLoop { member: id, node: start });
        }
        self.graph.add_edge(a, b, Member { id, role });
        log::trace!("member {id} ({role}) {start} -> {end}");
        Ok(id)
    }

    /// Position of a node.
    #[must_use]
    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.node_index(node).map(|index| self.graph[index].position)
    }

    /// Endpoints of a member.
    #[must_use]
    pub fn endpoints(&self, member: MemberId) -> Option<(NodeId, NodeId)> {
        let (a, b) = self.graph.edge_endpoints(self.edge_index(member)?)?;
        Some((self.graph[a].id, self.graph[b].id))
    }

    /// Role of a member.
    #[must_use]
    pub fn role(&self, member: MemberId) -> Option<MemberRole> {
        self.edge_index(member).map(|index| self.graph[index].role)
    }

    /// Length of a member in the working length unit.
    #[must_use]
    pub fn member_length(&self, member: MemberId) -> Option<f64> {
        let (start, end) = self.endpoints(member)?;
        Some(self.position(start)?.distance_to(self.position(end)?))
    }

    /// Nodes in identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.graph
            .node_weights()
            .map(|node| (node.id, node.position))
    }

    /// Members in identifier order.
    pub fn members(&self) -> impl Iterator<Item = MemberRecord> + '_ {
        self.graph.edge_indices().filter_map(move |edge| {
            let (a, b) = self.graph.edge_endpoints(edge)?;
            let member = self.graph[edge];
            Some(MemberRecord {
                id: member.id,
                start: self.graph[a].id,
                end: self.graph[b].id,
                role: member.role,
            })
        })
    }

    /// Identifiers of every member.
    #[must_use]
    pub fn member_ids(&self) -> Vec<MemberId> {
        self.graph.edge_weights().map(|member| member.id).collect()
    }

    /// Identifiers of the members with `role`, in identifier order.
    #[must_use]
    pub fn members_with_role(&self, role: MemberRole) -> Vec<MemberId> {
        self.graph
            .edge_weights()
            .filter(|member| member.role == role)
            .map(|member| member.id)
            .collect()
    }

    /// Identifiers of the members whose role falls in `group`, in identifier order.
    #[must_use]
    pub fn members_in_group(&self, group: SectionGroup) -> Vec<MemberId> {
        self.graph
            .edge_weights()
            .filter(|member| member.role.group() == group)
            .map(|member| member.id)
            .collect()
    }

    /// Identifier range spanned by the members with `role`.
    ///
    /// Returns `None` when the topology has no member with that role. The range is
    /// only meaningful for bulk assignment when [`Topology::is_contiguous`] holds.
    #[must_use]
    pub fn role_range(&self, role: MemberRole) -> Option<RangeInclusive<MemberId>> {
        let members = self.members_with_role(role);
        Some(*members.first()?..=*members.last()?)
    }

    /// Whether the members with `role` occupy a gap-free identifier range.
    #[must_use]
    pub fn is_contiguous(&self, role: MemberRole) -> bool {
        self.members_with_role(role)
            .windows(2)
            .all(|pair| pair[1].0 == pair[0].0 + 1)
    }

    /// Number of disconnected pieces in the frame. A single frame reports 1.
    #[must_use]
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Map a node identifier to its graph index.
    fn node_index(&self, node: NodeId) -> Option<NodeIndex> {
        let index = NodeIndex::new(index_from_id(node.0)?);
        self.graph.node_weight(index).map(|_| index)
    }

    /// Map a member identifier to its graph index.
    fn edge_index(&self, member: MemberId) -> Option<EdgeIndex> {
        let index = EdgeIndex::new(index_from_id(member.0)?);
        self.graph.edge_weight(index).map(|_| index)
    }
}

/// Whether `count` elements can be numbered from 1 without running out of identifiers.
pub(crate) fn fits_id_range(count: usize) -> bool {
    u32::try_from(count).is_ok()
}

/// Graph index for a 1-based identifier.
fn index_from_id(id: u32) -> Option<usize> {
    usize::try_from(id.checked_sub(1)?).ok()
}

/// 1-based identifier for the element stored after `count` others.
fn id_from_index(count: usize) -> u32 {
    u32::try_from(count).map_or(u32::MAX, |count| count.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::point;

    #[test]
    fn identifiers_start_at_one_and_follow_creation_order() {
        let mut topology = Topology::new();
        let a = topology.add_node(point(0.0, 0.0, 0.0));
        let b = topology.add_node(point(3.0, 4.0, 0.0));
        let member = topology
            .add_member(a, b, MemberRole::Column)
            .expect("both endpoints exist");

        assert_eq!((a.get(), b.get(), member.get()), (1, 2, 1));
        assert_eq!(topology.next_node_id(), NodeId::new(3));
        assert_eq!(topology.next_member_id(), MemberId::new(2));
        assert_eq!(topology.endpoints(member), Some((a, b)));
        assert_relative_eq!(topology.member_length(member).expect("member exists"), 5.0);
    }

    #[test]
    fn forward_references_are_rejected() {
        let mut topology = Topology::new();
        let a = topology.add_node(point(0.0, 0.0, 0.0));
        let missing = NodeId::new(2);

        let error = topology
            .add_member(a, missing, MemberRole::BeamX)
            .expect_err("node 2 does not exist yet");
        assert_eq!(
            error,
            TopologyError::UnknownNode {
                member: MemberId::new(1),
                node: missing
            }
        );

        let zero = topology
            .add_member(NodeId::new(0), a, MemberRole::BeamX)
            .expect_err("node 0 is never allocated");
        assert!(matches!(zero, TopologyError::UnknownNode { .. }));
        assert_eq!(topology.member_count(), 0);
    }

    #[test]
    fn self_loops_are_rejected() {
        let mut topology = Topology::new();
        let a = topology.add_node(point(0.0, 0.0, 0.0));
        let error = topology
            .add_member(a, a, MemberRole::Rafter)
            .expect_err("self loop rejected");
        assert!(matches!(error, TopologyError::SelfLoop { .. }));
    }

    #[test]
    fn role_ranges_and_groups() {
        let mut topology = Topology::new();
        let nodes: Vec<_> = (0..4)
            .map(|i| topology.add_node(point(f64::from(i), 0.0, 0.0)))
            .collect();
        topology
            .add_member(nodes[0], nodes[1], MemberRole::Column)
            .expect("valid");
        topology
            .add_member(nodes[1], nodes[2], MemberRole::BeamX)
            .expect("valid");
        topology
            .add_member(nodes[2], nodes[3], MemberRole::Column)
            .expect("valid");

        assert_eq!(
            topology.role_range(MemberRole::Column),
            Some(MemberId::new(1)..=MemberId::new(3))
        );
        assert!(!topology.is_contiguous(MemberRole::Column));
        assert!(topology.is_contiguous(MemberRole::BeamX));
        assert_eq!(topology.role_range(MemberRole::Rafter), None);
        assert_eq!(
            topology.members_in_group(SectionGroup::Beam),
            vec![MemberId::new(2)]
        );
        assert_eq!(topology.component_count(), 1);
    }

    #[test]
    fn isolated_nodes_count_as_components() {
        let mut topology = Topology::new();
        topology.add_node(point(0.0, 0.0, 0.0));
        topology.add_node(point(1.0, 0.0, 0.0));
        assert_eq!(topology.component_count(), 2);
    }
}
