//! Pitched-roof portal frames repeated along a warehouse.

use serde::{Deserialize, Serialize};

use crate::errors::TopologyError;
use crate::geometry::{point, GlobalAxis};
use crate::topology::{fits_id_range, MemberRole, NodeId, Topology};
use crate::units::UnitSystem;

/// Dimensions of a portal-frame warehouse.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalParameters {
    /// Clear span between the two columns of a frame.
    pub span: f64,
    /// Height of the eaves above the base.
    pub eave_height: f64,
    /// Rise of the ridge above the eaves.
    pub roof_rise: f64,
    /// Distance between adjacent frames.
    pub bay_spacing: f64,
    /// Number of bays; the warehouse has one more frame than bays.
    pub bays: usize,
}

impl Default for PortalParameters {
    fn default() -> Self {
        Self {
            span: 60.0,
            eave_height: 20.0,
            roof_rise: 5.0,
            bay_spacing: 20.0,
            bays: 4,
        }
    }
}

impl PortalParameters {
    /// Node and member totals, or `None` when they do not fit in `usize`.
    #[must_use]
    pub fn totals(&self) -> Option<(usize, usize)> {
        let frames = self.bays.checked_add(1)?;
        let nodes = frames.checked_mul(5)?;
        let members = frames
            .checked_mul(4)?
            .checked_add(self.bays.checked_mul(3)?)?;
        Some((nodes, members))
    }

    /// Re-express the lengths, given in `from`, in the `to` unit system.
    #[must_use]
    pub fn in_units(self, from: UnitSystem, to: UnitSystem) -> Self {
        Self {
            span: from.convert_length(self.span, to),
            eave_height: from.convert_length(self.eave_height, to),
            roof_rise: from.convert_length(self.roof_rise, to),
            bay_spacing: from.convert_length(self.bay_spacing, to),
            ..self
        }
    }
}

/// The five nodes of one transverse frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Base of the left column.
    pub left_base: NodeId,
    /// Base of the right column.
    pub right_base: NodeId,
    /// Top of the left column.
    pub left_eave: NodeId,
    /// Top of the right column.
    pub right_eave: NodeId,
    /// Apex where the rafters meet.
    pub ridge: NodeId,
}

/// A generated warehouse.
#[derive(Clone, Debug)]
pub struct PortalFrame {
    /// Nodes and members.
    pub topology: Topology,
    /// Transverse frames ordered along the building.
    pub frames: Vec<Frame>,
}

impl PortalFrame {
    /// Gravity axis of the warehouse. Frames stand in the XY plane.
    pub const VERTICAL: GlobalAxis = GlobalAxis::Y;

    /// Column bases of every frame, left then right.
    #[must_use]
    pub fn base_nodes(&self) -> Vec<NodeId> {
        self.frames
            .iter()
            .flat_map(|frame| [frame.left_base, frame.right_base])
            .collect()
    }
}

/// Generate the nodes and members of a portal-frame warehouse.
///
/// Each frame gets its five nodes at longitudinal offset `bay * bay_spacing`
/// along Z. Members are created in three passes: the columns of every frame,
/// then the rafter pairs of every frame, then the eave and ridge ties between
/// neighbouring frames. Each role therefore owns one contiguous identifier range.
///
/// # Errors
///
/// Returns [`TopologyError::TooLarge`] before creating anything when the bay
/// count needs more identifiers than exist. Any other [`TopologyError`] means a
/// member could not be wired, which indicates an internal inconsistency.
///
/// # Examples
/// ```
/// use framegen::{generate_portal, PortalParameters};
///
/// let warehouse = generate_portal(&PortalParameters::default()).expect("valid warehouse");
/// assert_eq!(warehouse.topology.node_count(), 25);
/// assert_eq!(warehouse.topology.member_count(), 32);
/// ```
pub fn generate_portal(parameters: &PortalParameters) -> Result<PortalFrame, TopologyError> {
    let PortalParameters {
        span,
        eave_height,
        roof_rise,
        bay_spacing,
        bays,
    } = *parameters;
    match parameters.totals() {
        Some((nodes, members)) if fits_id_range(nodes) && fits_id_range(members) => {}
        _ => return Err(TopologyError::TooLarge),
    }

    let mut topology = Topology::new();
    let frames: Vec<Frame> = (0..=bays)
        .map(|bay| {
            let z = bay as f64 * bay_spacing;
            Frame {
                left_base: topology.add_node(point(0.0, 0.0, z)),
                right_base: topology.add_node(point(span, 0.0, z)),
                left_eave: topology.add_node(point(0.0, eave_height, z)),
                right_eave: topology.add_node(point(span, eave_height, z)),
                ridge: topology.add_node(point(span / 2.0, eave_height + roof_rise, z)),
            }
        })
        .collect();

    for frame in &frames {
        topology.add_member(frame.left_base, frame.left_eave, MemberRole::Column)?;
        topology.add_member(frame.right_base, frame.right_eave, MemberRole::Column)?;
    }

    for frame in &frames {
        topology.add_member(frame.left_eave, frame.ridge, MemberRole::Rafter)?;
        topology.add_member(frame.ridge, frame.right_eave, MemberRole::Rafter)?;
    }

    for pair in frames.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        topology.add_member(current.left_eave, next.left_eave, MemberRole::Longitudinal)?;
        topology.add_member(current.right_eave, next.right_eave, MemberRole::Longitudinal)?;
        topology.add_member(current.ridge, next.ridge, MemberRole::Longitudinal)?;
    }

    log::debug!(
        "portal {bays} bays: {} frames, {} nodes, {} members",
        frames.len(),
        topology.node_count(),
        topology.member_count()
    );

    Ok(PortalFrame { topology, frames })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::topology::MemberId;

    fn warehouse(bays: usize) -> PortalFrame {
        generate_portal(&PortalParameters {
            bays,
            ..PortalParameters::default()
        })
        .expect("portal generation succeeds")
    }

    #[test]
    fn default_warehouse_matches_the_reference_counts() {
        let warehouse = warehouse(4);
        let topology = &warehouse.topology;
        assert_eq!(topology.node_count(), 25);
        let frame_members = topology.members_with_role(MemberRole::Column).len()
            + topology.members_with_role(MemberRole::Rafter).len();
        assert_eq!(frame_members, 20);
        assert_eq!(topology.members_with_role(MemberRole::Longitudinal).len(), 12);
        assert_eq!(topology.member_count(), 32);
    }

    #[test]
    fn oversized_warehouses_are_refused_before_generation() {
        for bays in [usize::MAX, 1 << 31] {
            let result = generate_portal(&PortalParameters {
                bays,
                ..PortalParameters::default()
            });
            assert!(matches!(result, Err(TopologyError::TooLarge)), "{bays} accepted");
        }
    }

    #[test]
    fn counts_scale_with_bays() {
        for bays in 0..6 {
            let warehouse = warehouse(bays);
            let topology = &warehouse.topology;
            assert_eq!(topology.node_count(), 5 * (bays + 1));
            assert_eq!(
                topology.members_with_role(MemberRole::Column).len()
                    + topology.members_with_role(MemberRole::Rafter).len(),
                4 * (bays + 1)
            );
            assert_eq!(
                topology.members_with_role(MemberRole::Longitudinal).len(),
                3 * bays
            );
        }
    }

    #[test]
    fn columns_precede_rafters_and_ties() {
        let warehouse = warehouse(4);
        let topology = &warehouse.topology;
        assert_eq!(
            topology.role_range(MemberRole::Column),
            Some(MemberId::new(1)..=MemberId::new(10))
        );
        assert_eq!(
            topology.role_range(MemberRole::Rafter),
            Some(MemberId::new(11)..=MemberId::new(20))
        );
        assert_eq!(
            topology.role_range(MemberRole::Longitudinal),
            Some(MemberId::new(21)..=MemberId::new(32))
        );
        for role in [MemberRole::Column, MemberRole::Rafter, MemberRole::Longitudinal] {
            assert!(topology.is_contiguous(role));
        }
    }

    #[test]
    fn frame_nodes_sit_at_the_expected_coordinates() {
        let warehouse = warehouse(2);
        let topology = &warehouse.topology;
        let last = warehouse.frames[2];
        assert_eq!(last.left_base, NodeId::new(11));
        assert_eq!(topology.position(last.left_base), Some(point(0.0, 0.0, 40.0)));
        assert_eq!(topology.position(last.right_eave), Some(point(60.0, 20.0, 40.0)));
        assert_eq!(topology.position(last.ridge), Some(point(30.0, 25.0, 40.0)));

        let rafter = topology
            .members_with_role(MemberRole::Rafter)
            .first()
            .copied()
            .expect("rafters exist");
        assert_relative_eq!(
            topology.member_length(rafter).expect("rafter exists"),
            (30.0_f64 * 30.0 + 5.0 * 5.0).sqrt()
        );
    }

    #[test]
    fn base_nodes_alternate_left_and_right() {
        let warehouse = warehouse(1);
        let ids: Vec<u32> = warehouse.base_nodes().iter().map(|node| node.get()).collect();
        assert_eq!(ids, vec![1, 2, 6, 7]);
    }

    #[test]
    fn single_frame_has_no_ties() {
        let warehouse = warehouse(0);
        assert_eq!(warehouse.frames.len(), 1);
        assert_eq!(warehouse.topology.member_count(), 4);
        assert_eq!(warehouse.topology.role_range(MemberRole::Longitudinal), None);
        assert_eq!(warehouse.topology.component_count(), 1);
    }
}
