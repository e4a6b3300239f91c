#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use framegen::model::Load;
use framegen::{
    generate_building, BuildingForm, FormError, GlobalAxis, HostError, MemberId, ModelHost,
    NodeId, RunError, Settings, TopologyError, UnitSystem,
};

fn run_default() -> (ModelHost, framegen::RunSummary) {
    let mut host = ModelHost::new();
    let summary = generate_building(&mut host, &BuildingForm::default(), &Settings::default())
        .expect("default building generates");
    (host, summary)
}

#[test]
fn default_building_reaches_the_host_in_full() {
    let (host, summary) = run_default();

    // 5 floors on a 4 x 3 grid: 6 levels of 20 nodes, 100 columns and
    // 31 beams on each of the 5 suspended floors.
    assert_eq!(host.node_count(), 120);
    assert_eq!(host.member_count(), 255);
    assert_eq!(summary.topology.member_count(), 255);
    assert_eq!(summary.floor_loads, 5);
    assert_eq!(host.save_count(), 1);
    assert_eq!(host.analyses().len(), 1);
}

#[test]
fn supports_sit_on_the_base_nodes() {
    let (host, _) = run_default();

    let expected: Vec<NodeId> = (1..=20).map(NodeId::new).collect();
    assert_eq!(host.supported_nodes(), expected);
    for node in host.supported_nodes() {
        let position = host.position(node).expect("supported node exists");
        assert!(position.z.abs() < f64::EPSILON);
    }
}

#[test]
fn every_member_has_a_section_and_material() {
    let (host, _) = run_default();

    for (member, _) in host.members() {
        let expected = if member.get() <= 100 { "W14X90" } else { "W18X35" };
        assert_eq!(host.section_of(member), Some(expected), "member {member}");
        assert_eq!(host.material_of(member), Some("STEEL"));
    }
}

#[test]
fn gravity_case_holds_self_weight_and_one_floor_load_per_floor() {
    let (host, summary) = run_default();

    let cases = host.load_cases();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].number, summary.load_case);
    assert_eq!(cases[0].title, "DEAD + LIVE LOAD");
    assert_eq!(
        cases[0].loads[0],
        Load::SelfWeight {
            axis: GlobalAxis::Z,
            factor: -1.0
        }
    );

    let floors: Vec<_> = cases[0]
        .loads
        .iter()
        .filter_map(|load| match load {
            Load::Floor(floor) => Some(*floor),
            _ => None,
        })
        .collect();
    assert_eq!(floors.len(), 5);
    for (level, floor) in floors.iter().enumerate() {
        let elevation = 12.0 * (level + 1) as f64;
        assert_eq!(floor.axis, GlobalAxis::Z);
        assert_relative_eq!(floor.intensity, -0.08, max_relative = 1e-12);
        assert_relative_eq!(floor.min, elevation - 0.1, max_relative = 1e-12);
        assert_relative_eq!(floor.max, elevation + 0.1, max_relative = 1e-12);
    }
}

#[test]
fn metric_run_converts_lengths_and_slab_load() {
    let mut host = ModelHost::new();
    let settings = Settings {
        units: UnitSystem::METER_KILONEWTON,
        ..Settings::default()
    };
    let summary = generate_building(&mut host, &BuildingForm::default(), &settings)
        .expect("metric building generates");
    assert_eq!(host.units(), Some(UnitSystem::METER_KILONEWTON));

    // 12 ft storeys and 20 ft x 25 ft bays, in metres.
    let top = host.position(NodeId::new(120)).expect("last node exists");
    assert_relative_eq!(top.x, 4.0 * 6.096, max_relative = 1e-12);
    assert_relative_eq!(top.y, 3.0 * 7.62, max_relative = 1e-12);
    assert_relative_eq!(top.z, 5.0 * 3.6576, max_relative = 1e-12);

    let floor = host.load_cases()[0]
        .loads
        .iter()
        .find_map(|load| match load {
            Load::Floor(floor) => Some(*floor),
            _ => None,
        })
        .expect("floor load present");
    // 80 psf in kN/m², banded around the first floor at 3.6576 m.
    assert_relative_eq!(floor.intensity, -3.830_420_7, max_relative = 1e-6);
    assert_relative_eq!(floor.min, 3.6576 - 0.1, max_relative = 1e-12);

    // The same frame weighs the same in either unit system.
    let (_, imperial) = run_default();
    assert_relative_eq!(
        summary.steel_weight.expect("catalog sections"),
        imperial.steel_weight.expect("catalog sections"),
        max_relative = 1e-9
    );
}

#[test]
fn oversized_grid_is_refused_before_the_host_is_touched() {
    let mut host = ModelHost::new();
    let form = BuildingForm {
        floors: "0".to_string(),
        grid_x: usize::MAX.to_string(),
        grid_y: "0".to_string(),
        ..BuildingForm::default()
    };
    let error = generate_building(&mut host, &form, &Settings::default())
        .expect_err("too many nodes");

    assert!(matches!(error, RunError::Topology(TopologyError::TooLarge)));
    assert_eq!(host.node_count(), 0);
    assert!(host.units().is_none());
}

#[test]
fn zero_floor_building_saves_but_cannot_be_analysed() {
    let mut host = ModelHost::new();
    let form = BuildingForm {
        floors: "0".to_string(),
        ..BuildingForm::default()
    };
    let error = generate_building(&mut host, &form, &Settings::default())
        .expect_err("no members to analyse");

    assert!(matches!(
        error,
        RunError::Host {
            operation: "run analysis",
            source: HostError::EmptyModel
        }
    ));
    assert_eq!(host.node_count(), 20);
    assert_eq!(host.member_count(), 0);
    assert_eq!(host.supported_nodes().len(), 20);
    assert_eq!(host.properties().len(), 2);
    assert_eq!(host.save_count(), 1);
    assert!(host.analyses().is_empty());
}

#[test]
fn offline_host_gets_no_geometry() {
    let mut host = ModelHost::offline();
    let error = generate_building(&mut host, &BuildingForm::default(), &Settings::default())
        .expect_err("host is closed");

    assert!(matches!(
        error,
        RunError::Host {
            source: HostError::NotConnected,
            ..
        }
    ));
    assert_eq!(host.node_count(), 0);
}

#[test]
fn zero_spacing_is_rejected_by_the_host() {
    let mut host = ModelHost::new();
    let form = BuildingForm {
        spacing_x: "0".to_string(),
        ..BuildingForm::default()
    };
    let error = generate_building(&mut host, &form, &Settings::default())
        .expect_err("coincident nodes");

    match error {
        RunError::Host {
            operation,
            source: HostError::DegenerateMember { member, .. },
        } => {
            assert_eq!(operation, "create geometry");
            assert_eq!(member, MemberId::new(101));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Columns went through before the first X beam was refused.
    assert_eq!(host.member_count(), 100);
    assert!(host.load_cases().is_empty());
}

#[test]
fn malformed_field_fails_before_the_host_is_touched() {
    let mut host = ModelHost::new();
    let form = BuildingForm {
        floors: "five".to_string(),
        ..BuildingForm::default()
    };
    let error = generate_building(&mut host, &form, &Settings::default())
        .expect_err("not a number");

    assert!(matches!(
        error,
        RunError::Form(FormError::InvalidNumber {
            field: "Number of Floors",
            ..
        })
    ));
    assert_eq!(error.to_string(), "Number of Floors: \"five\" is not a valid whole number");
    assert_eq!(host.node_count(), 0);
}
