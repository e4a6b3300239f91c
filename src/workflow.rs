//! End-to-end model generation against an [`AnalysisHost`].
//!
//! A run parses its form, generates the topology, then issues host calls in a
//! fixed order: units, geometry, sections, material, supports, loads, save and
//! analysis. The first failure ends the run.
//!
//! Form lengths are in feet and slab loads in psf; both are converted into the
//! working units of [`Settings::units`] before they reach the host.

use serde::Serialize;

use crate::errors::{HostResultExt, RunError};
use crate::form::{BuildingForm, UniformLoadForm, WarehouseForm};
use crate::geometry::GlobalAxis;
use crate::grid::{generate_grid, GridFrame};
use crate::host::{AnalysisHost, FloorLoad, LoadCaseId, UniformForce};
use crate::portal::{generate_portal, PortalFrame};
use crate::sections;
use crate::settings::Settings;
use crate::topology::{NodeId, SectionGroup, Topology};
use crate::units::UnitSystem;

/// Title of the load case created for a multistory building.
pub const BUILDING_LOAD_CASE: &str = "DEAD + LIVE LOAD";
/// Title of the load case created for a warehouse.
pub const WAREHOUSE_LOAD_CASE: &str = "DEAD LOAD";

/// What kind of structure a run produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructureKind {
    /// Multistory grid frame.
    Building {
        /// Suspended floors.
        floors: usize,
        /// Bays along X.
        bays_x: usize,
        /// Bays along Y.
        bays_y: usize,
    },
    /// Portal-frame warehouse.
    Warehouse {
        /// Bays between frames.
        bays: usize,
    },
}

/// Outcome of a successful generation run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Structure generated.
    pub kind: StructureKind,
    /// Topology sent to the host.
    pub topology: Topology,
    /// Section designation assigned to each group, in assignment order.
    pub sections: Vec<(SectionGroup, String)>,
    /// Load case holding the gravity loads.
    pub load_case: LoadCaseId,
    /// Number of floor loads added.
    pub floor_loads: usize,
    /// Working units of the model.
    pub units: UnitSystem,
    /// Total steel weight in kips, when every section is in the catalog.
    pub steel_weight: Option<f64>,
}

/// Outcome of [`apply_uniform_load`].
#[derive(Clone, Debug, PartialEq)]
pub struct UniformLoadSummary {
    /// Case the load went into.
    pub case: LoadCaseId,
    /// Whether the case had to be created.
    pub created: bool,
    /// Number of members loaded.
    pub members: usize,
    /// Force per unit length applied.
    pub intensity: f64,
}

/// Sections, supports and gravity of a generated structure, ready for the host.
struct Assembly<'a> {
    /// Generated geometry.
    topology: &'a Topology,
    /// Nodes receiving fixed supports.
    supports: &'a [NodeId],
    /// Designation per section group.
    sections: Vec<(SectionGroup, String)>,
    /// Gravity direction.
    vertical: GlobalAxis,
    /// Title of the gravity case.
    title: &'a str,
}

/// Generate a multistory building and load it with self-weight and floor loads.
///
/// # Errors
///
/// Returns [`RunError::Form`] before any host call when a field is malformed,
/// and [`RunError::Host`] naming the step that the host rejected.
pub fn generate_building<H: AnalysisHost>(
    host: &mut H,
    form: &BuildingForm,
    settings: &Settings,
) -> Result<RunSummary, RunError> {
    let spec = form.parse()?;
    log::info!(
        "generating {}-floor building on a {}x{} grid",
        spec.grid.floors,
        spec.grid.bays_x,
        spec.grid.bays_y
    );
    let GridFrame {
        topology,
        base_nodes,
        floor_elevations,
    } = generate_grid(&spec.grid.in_units(UnitSystem::FOOT_KIP, settings.units))?;

    let assembly = Assembly {
        topology: &topology,
        supports: &base_nodes,
        sections: vec![
            (SectionGroup::Column, spec.column_section),
            (SectionGroup::Beam, spec.beam_section),
        ],
        vertical: GridFrame::VERTICAL,
        title: BUILDING_LOAD_CASE,
    };
    let load_case = assemble(host, &assembly, settings)?;

    let pressure = -UnitSystem::FOOT_POUND.convert_area_load(spec.slab_load_psf, settings.units);
    for elevation in &floor_elevations {
        host.add_floor_load(FloorLoad {
            axis: GridFrame::VERTICAL,
            intensity: pressure,
            min: elevation - settings.floor_band,
            max: elevation + settings.floor_band,
        })
        .during("add floor load")?;
    }
    log::debug!("added {} floor loads of {pressure}", floor_elevations.len());

    finish(host, settings)?;
    let weight = steel_weight(&topology, &assembly.sections, settings);
    let sections = assembly.sections;
    Ok(RunSummary {
        kind: StructureKind::Building {
            floors: spec.grid.floors,
            bays_x: spec.grid.bays_x,
            bays_y: spec.grid.bays_y,
        },
        steel_weight: weight,
        sections,
        topology,
        load_case,
        floor_loads: floor_elevations.len(),
        units: settings.units,
    })
}

/// Generate a portal-frame warehouse and load it with self-weight.
///
/// # Errors
///
/// Returns [`RunError::Form`] before any host call when a field is malformed,
/// and [`RunError::Host`] naming the step that the host rejected.
pub fn generate_warehouse<H: AnalysisHost>(
    host: &mut H,
    form: &WarehouseForm,
    settings: &Settings,
) -> Result<RunSummary, RunError> {
    let spec = form.parse()?;
    log::info!(
        "generating {}-bay warehouse with a {} span",
        spec.portal.bays,
        spec.portal.span
    );
    let warehouse =
        generate_portal(&spec.portal.in_units(UnitSystem::FOOT_KIP, settings.units))?;
    let supports = warehouse.base_nodes();

    let assembly = Assembly {
        topology: &warehouse.topology,
        supports: &supports,
        sections: vec![
            (SectionGroup::Column, spec.column_section),
            (SectionGroup::Rafter, spec.rafter_section),
        ],
        vertical: PortalFrame::VERTICAL,
        title: WAREHOUSE_LOAD_CASE,
    };
    let load_case = assemble(host, &assembly, settings)?;
    finish(host, settings)?;
    let weight = steel_weight(&warehouse.topology, &assembly.sections, settings);
    let sections = assembly.sections;

    Ok(RunSummary {
        kind: StructureKind::Warehouse {
            bays: spec.portal.bays,
        },
        steel_weight: weight,
        sections,
        topology: warehouse.topology,
        load_case,
        floor_loads: 0,
        units: settings.units,
    })
}

/// Add a uniform line load to every member of the host's current model.
///
/// The target case is reused when it already exists and created otherwise. It
/// also receives self-weight along the load axis.
///
/// # Errors
///
/// Returns [`RunError::NoMembers`] when the model is empty, and
/// [`RunError::Host`] for any rejected call.
pub fn apply_uniform_load<H: AnalysisHost>(
    host: &mut H,
    form: &UniformLoadForm,
    settings: &Settings,
) -> Result<UniformLoadSummary, RunError> {
    let spec = form.parse()?;
    host.connect().during("connect")?;

    let existing = host.primary_load_cases().during("list load cases")?;
    let created = !existing.contains(&spec.case);
    if created {
        host.create_primary_load_case(Some(spec.case), &spec.title)
            .during("create load case")?;
        log::info!("created load case {} ({})", spec.case, spec.title);
    } else {
        log::info!("reusing load case {}", spec.case);
    }
    host.set_active_load_case(spec.case)
        .during("activate load case")?;
    host.add_self_weight(spec.axis, settings.self_weight_factor)
        .during("add self-weight")?;

    let members = host.member_list().during("list members")?;
    if members.is_empty() {
        return Err(RunError::NoMembers);
    }
    host.add_member_uniform_force(
        &members,
        UniformForce {
            axis: spec.axis,
            intensity: spec.intensity,
            start: 0.0,
            end: 0.0,
        },
        spec.case,
    )
    .during("add member load")?;
    log::info!(
        "applied {} to {} members in case {}",
        spec.intensity,
        members.len(),
        spec.case
    );

    Ok(UniformLoadSummary {
        case: spec.case,
        created,
        members: members.len(),
        intensity: spec.intensity,
    })
}

/// Send geometry, sections, material, supports and self-weight to the host.
fn assemble<H: AnalysisHost>(
    host: &mut H,
    assembly: &Assembly<'_>,
    settings: &Settings,
) -> Result<LoadCaseId, RunError> {
    host.connect().during("connect")?;
    host.set_units(settings.units).during("set units")?;
    host.create_topology(assembly.topology)
        .during("create geometry")?;
    log::info!(
        "created {} nodes and {} members",
        assembly.topology.node_count(),
        assembly.topology.member_count()
    );

    for (group, designation) in &assembly.sections {
        let property = host
            .create_table_property(settings.section_table, designation)
            .during("create section property")?;
        let members = assembly.topology.members_in_group(*group);
        if !members.is_empty() {
            host.assign_property(&members, property)
                .during("assign section property")?;
        }
        log::debug!("{group:?} members use {designation}");
    }

    let members = assembly.topology.member_ids();
    if !members.is_empty() {
        host.assign_material(&settings.material, &members)
            .during("assign material")?;
    }

    let support = host.create_fixed_support().during("create support")?;
    if !assembly.supports.is_empty() {
        host.assign_support(assembly.supports, support)
            .during("assign support")?;
    }

    let case = host
        .create_primary_load_case(None, assembly.title)
        .during("create load case")?;
    host.set_active_load_case(case)
        .during("activate load case")?;
    host.add_self_weight(assembly.vertical, settings.self_weight_factor)
        .during("add self-weight")?;
    Ok(case)
}

/// Save the model, then analyse it.
fn finish<H: AnalysisHost>(host: &mut H, settings: &Settings) -> Result<(), RunError> {
    host.save().during("save model")?;
    host.analyze(settings.analysis_print)
        .during("run analysis")?;
    log::info!("model saved and analysed");
    Ok(())
}

/// Total member weight in kips, or `None` if a section is not in the catalog.
fn steel_weight(
    topology: &Topology,
    groups: &[(SectionGroup, String)],
    settings: &Settings,
) -> Option<f64> {
    let mut total = 0.0;
    for (group, designation) in groups {
        let section = sections::lookup(settings.section_table, designation)?;
        let length: f64 = topology
            .members_in_group(*group)
            .into_iter()
            .filter_map(|member| topology.member_length(member))
            .sum();
        let feet = settings.units.convert_length(length, UnitSystem::FOOT_KIP);
        total += feet * section.weight / 1000.0;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FormError, HostError};
    use crate::model::ModelHost;
    use approx::assert_relative_eq;

    #[test]
    fn malformed_form_makes_no_host_call() {
        let mut host = ModelHost::offline();
        let form = WarehouseForm {
            span: "wide".to_string(),
            ..WarehouseForm::default()
        };
        let error = generate_warehouse(&mut host, &form, &Settings::default())
            .expect_err("malformed span");
        assert!(matches!(
            error,
            RunError::Form(FormError::InvalidNumber { field: "Span", .. })
        ));
    }

    #[test]
    fn offline_host_stops_at_connect() {
        let mut host = ModelHost::offline();
        let error = generate_building(&mut host, &BuildingForm::default(), &Settings::default())
            .expect_err("no host");
        assert!(matches!(
            error,
            RunError::Host {
                operation: "connect",
                source: HostError::NotConnected
            }
        ));
        assert_eq!(host.node_count(), 0);
    }

    #[test]
    fn warehouse_steel_weight_sums_catalog_weights() {
        let mut host = ModelHost::new();
        let summary = generate_warehouse(&mut host, &WarehouseForm::default(), &Settings::default())
            .expect("default warehouse");

        // Columns: 10 x 20 ft of W14X90. Rafters and ties: 10 rafters of
        // 30.41 ft plus 12 ties of 20 ft, all W18X35.
        let rafter = (30.0_f64.powi(2) + 5.0_f64.powi(2)).sqrt();
        let expected = 200.0 * 90.0 / 1000.0 + (10.0 * rafter + 240.0) * 35.0 / 1000.0;
        assert_relative_eq!(
            summary.steel_weight.expect("catalog sections"),
            expected,
            max_relative = 1e-9
        );
    }

    #[test]
    fn unknown_section_is_rejected_by_the_host() {
        let mut host = ModelHost::new();
        let form = WarehouseForm {
            column_section: "W99X999".to_string(),
            ..WarehouseForm::default()
        };
        let error =
            generate_warehouse(&mut host, &form, &Settings::default()).expect_err("not in table");
        assert!(matches!(
            error,
            RunError::Host {
                operation: "create section property",
                source: HostError::UnknownSection { .. }
            }
        ));
        assert_eq!(host.member_count(), 32);
        assert!(host.properties().is_empty());
    }
}
