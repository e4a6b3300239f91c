//! Plain-text summaries printed after a run.

use crate::topology::{MemberRole, SectionGroup};
use crate::workflow::{RunSummary, StructureKind, UniformLoadSummary};
use std::fmt::Write;

/// Render the confirmation shown after a generation run.
///
/// The text repeats the inputs that shaped the model so the user can compare it
/// against what the host displays.
#[must_use]
pub fn render_summary(summary: &RunSummary) -> String {
    let mut output = String::from("Model generated successfully\n");

    match summary.kind {
        StructureKind::Building {
            floors,
            bays_x,
            bays_y,
        } => {
            writeln!(&mut output, "Floors: {floors}").expect("writing to string cannot fail");
            writeln!(&mut output, "Grid: {bays_x} x {bays_y} bays")
                .expect("writing to string cannot fail");
        }
        StructureKind::Warehouse { bays } => {
            writeln!(&mut output, "Bays: {bays} ({} frames)", bays + 1)
                .expect("writing to string cannot fail");
        }
    }

    let topology = &summary.topology;
    writeln!(
        &mut output,
        "Nodes: {}, total members: {}",
        topology.node_count(),
        topology.member_count()
    )
    .expect("writing to string cannot fail");

    // Per-role breakdown, skipping roles this structure does not have.
    for role in MemberRole::ALL {
        if let Some(range) = topology.role_range(role) {
            writeln!(
                &mut output,
                "  {role}: {} (members {} to {})",
                topology.members_with_role(role).len(),
                range.start(),
                range.end()
            )
            .expect("writing to string cannot fail");
        }
    }

    for (group, designation) in &summary.sections {
        let label = match group {
            SectionGroup::Column => "Columns",
            SectionGroup::Beam => "Beams",
            SectionGroup::Rafter => "Rafters",
        };
        writeln!(&mut output, "{label}: {designation}").expect("writing to string cannot fail");
    }

    writeln!(
        &mut output,
        "Load case {}: self-weight{}",
        summary.load_case,
        if summary.floor_loads > 0 {
            format!(" + {} floor loads", summary.floor_loads)
        } else {
            String::new()
        }
    )
    .expect("writing to string cannot fail");

    if let Some(weight) = summary.steel_weight {
        writeln!(&mut output, "Steel weight: {weight:.1} kip")
            .expect("writing to string cannot fail");
    }
    writeln!(&mut output, "Units: {}", summary.units).expect("writing to string cannot fail");

    output
}

/// Render the confirmation shown after a batch uniform load.
#[must_use]
pub fn render_uniform_load(summary: &UniformLoadSummary) -> String {
    format!(
        "Applied {} UDL to {} members in load case {}{}\n",
        summary.intensity,
        summary.members,
        summary.case,
        if summary.created { " (created)" } else { "" }
    )
}
