//! Multistory grid frames: a rectangular column grid with floor beams.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::TopologyError;
use crate::geometry::{point, GlobalAxis};
use crate::topology::{fits_id_range, MemberRole, NodeId, Topology};
use crate::units::UnitSystem;

/// Dimensions of a multistory grid frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridParameters {
    /// Number of storeys above the base.
    pub floors: usize,
    /// Storey height.
    pub floor_height: f64,
    /// Number of bays along global X.
    pub bays_x: usize,
    /// Number of bays along global Y.
    pub bays_y: usize,
    /// Bay width along global X.
    pub spacing_x: f64,
    /// Bay width along global Y.
    pub spacing_y: f64,
}

impl Default for GridParameters {
    fn default() -> Self {
        Self {
            floors: 5,
            floor_height: 12.0,
            bays_x: 4,
            bays_y: 3,
            spacing_x: 20.0,
            spacing_y: 25.0,
        }
    }
}

impl GridParameters {
    /// Node and member totals, or `None` when they do not fit in `usize`.
    #[must_use]
    pub fn totals(&self) -> Option<(usize, usize)> {
        let xs = self.bays_x.checked_add(1)?;
        let ys = self.bays_y.checked_add(1)?;
        let per_level = xs.checked_mul(ys)?;
        let nodes = per_level.checked_mul(self.floors.checked_add(1)?)?;
        let beams = self
            .bays_x
            .checked_mul(ys)?
            .checked_add(self.bays_y.checked_mul(xs)?)?;
        let members = per_level.checked_add(beams)?.checked_mul(self.floors)?;
        Some((nodes, members))
    }

    /// Re-express the lengths, given in `from`, in the `to` unit system.
    #[must_use]
    pub fn in_units(self, from: UnitSystem, to: UnitSystem) -> Self {
        Self {
            floor_height: from.convert_length(self.floor_height, to),
            spacing_x: from.convert_length(self.spacing_x, to),
            spacing_y: from.convert_length(self.spacing_y, to),
            ..self
        }
    }
}

/// A generated multistory frame.
#[derive(Clone, Debug)]
pub struct GridFrame {
    /// Nodes and members.
    pub topology: Topology,
    /// Nodes at floor 0, in generation order.
    pub base_nodes: Vec<NodeId>,
    /// Elevation of every suspended floor, from floor 1 upwards.
    pub floor_elevations: Vec<f64>,
}

impl GridFrame {
    /// Gravity axis of the frame. Floors stack along global Z.
    pub const VERTICAL: GlobalAxis = GlobalAxis::Z;
}

/// Lookup from grid cell `(i, j, floor)` to the node created there.
struct Lattice {
    /// Cell to node map, filled while nodes are created.
    cells: HashMap<(usize, usize, usize), NodeId>,
}

impl Lattice {
    /// Node at a cell. A cell that was never filled maps to id 0, which no
    /// topology allocates, so the member that asks for it is rejected.
    fn at(&self, i: usize, j: usize, floor: usize) -> NodeId {
        self.cells
            .get(&(i, j, floor))
            .copied()
            .unwrap_or(NodeId::new(0))
    }
}

/// Generate the node lattice and members of a multistory grid frame.
///
/// Nodes are created floor by floor, then X index, then Y index. Members are
/// created as all columns, then all X beams, then all Y beams, so each role holds
/// a contiguous identifier range and the two beam roles together form one range.
///
/// # Errors
///
/// Returns [`TopologyError::TooLarge`] before creating anything when the frame
/// would need more node or member identifiers than exist. Any other
/// [`TopologyError`] means a member referenced a cell that was not created,
/// which only happens if the generation loops disagree with each other.
///
/// # Examples
/// ```
/// use framegen::{generate_grid, GridParameters};
///
/// let frame = generate_grid(&GridParameters::default()).expect("valid grid");
/// assert_eq!(frame.topology.node_count(), 6 * 5 * 4);
/// ```
pub fn generate_grid(parameters: &GridParameters) -> Result<GridFrame, TopologyError> {
    let GridParameters {
        floors,
        floor_height,
        bays_x,
        bays_y,
        spacing_x,
        spacing_y,
    } = *parameters;
    match parameters.totals() {
        Some((nodes, members)) if fits_id_range(nodes) && fits_id_range(members) => {}
        _ => return Err(TopologyError::TooLarge),
    }

    let mut topology = Topology::new();
    let mut lattice = Lattice {
        cells: HashMap::new(),
    };
    let mut base_nodes = Vec::with_capacity((bays_x + 1) * (bays_y + 1));

    for floor in 0..=floors {
        let z = floor as f64 * floor_height;
        for i in 0..=bays_x {
            for j in 0..=bays_y {
                let node = topology.add_node(point(i as f64 * spacing_x, j as f64 * spacing_y, z));
                lattice.cells.insert((i, j, floor), node);
                if floor == 0 {
                    base_nodes.push(node);
                }
            }
        }
    }

    for floor in 0..floors {
        for i in 0..=bays_x {
            for j in 0..=bays_y {
                topology.add_member(
                    lattice.at(i, j, floor),
                    lattice.at(i, j, floor + 1),
                    MemberRole::Column,
                )?;
            }
        }
    }

    for floor in 1..=floors {
        for j in 0..=bays_y {
            for i in 0..bays_x {
                topology.add_member(
                    lattice.at(i, j, floor),
                    lattice.at(i + 1, j, floor),
                    MemberRole::BeamX,
                )?;
            }
        }
    }

    for floor in 1..=floors {
        for i in 0..=bays_x {
            for j in 0..bays_y {
                topology.add_member(
                    lattice.at(i, j, floor),
                    lattice.at(i, j + 1, floor),
                    MemberRole::BeamY,
                )?;
            }
        }
    }

    log::debug!(
        "grid {floors} floors, {bays_x}x{bays_y} bays: {} nodes, {} members",
        topology.node_count(),
        topology.member_count()
    );

    Ok(GridFrame {
        topology,
        base_nodes,
        floor_elevations: (1..=floors).map(|floor| floor as f64 * floor_height).collect(),
    })
}
