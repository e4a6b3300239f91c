//! Analysis host that renders the model as a STAAD command file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::HostError;
use crate::geometry::{GlobalAxis, Point};
use crate::host::{
    AnalysisHost, AnalysisPrint, FloorLoad, LoadCaseId, PropertyId, SupportId, UniformForce,
};
use crate::model::{Load, ModelHost};
use crate::sections;
use crate::topology::{MemberId, NodeId};
use crate::units::UnitSystem;

/// Longest list line before a `-` continuation is emitted.
const LINE_WIDTH: usize = 72;

/// Host that validates calls like [`ModelHost`] and renders them as an input deck.
///
/// With an output path, the deck is written on every save and rewritten after each
/// analysis, so the file always reflects the calls made so far.
#[derive(Debug, Default)]
pub struct ScriptHost {
    /// Validated model state.
    model: ModelHost,
    /// Destination of the command file.
    output: Option<PathBuf>,
}

impl ScriptHost {
    /// Create a script host that only keeps the deck in memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render on top of an existing model host, keeping its snapshot settings.
    #[must_use]
    pub fn wrap(model: ModelHost) -> Self {
        Self {
            model,
            output: None,
        }
    }

    /// Write the deck to `path` on save and after analysis.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Recorded model.
    #[must_use]
    pub fn model(&self) -> &ModelHost {
        &self.model
    }

    /// Render the command file for the calls made so far.
    #[must_use]
    pub fn render(&self) -> String {
        Deck(&self.model).to_string()
    }

    /// Write the deck to the configured output, if any.
    fn flush(&self) -> Result<(), HostError> {
        if let Some(path) = &self.output {
            write_deck(path, &self.render())?;
        }
        Ok(())
    }
}

/// Write `deck` to `path`.
fn write_deck(path: &Path, deck: &str) -> Result<(), HostError> {
    fs::write(path, deck)?;
    log::info!("command file written to {}", path.display());
    Ok(())
}

impl AnalysisHost for ScriptHost {
    fn connect(&mut self) -> Result<(), HostError> {
        self.model.connect()
    }

    fn set_units(&mut self, units: UnitSystem) -> Result<(), HostError> {
        self.model.set_units(units)
    }

    fn create_node(&mut self, id: NodeId, position: Point) -> Result<(), HostError> {
        self.model.create_node(id, position)
    }

    fn create_member(&mut self, id: MemberId, start: NodeId, end: NodeId) -> Result<(), HostError> {
        self.model.create_member(id, start, end)
    }

    fn member_list(&self) -> Result<Vec<MemberId>, HostError> {
        self.model.member_list()
    }

    fn create_table_property(
        &mut self,
        country: u32,
        designation: &str,
    ) -> Result<PropertyId, HostError> {
        self.model.create_table_property(country, designation)
    }

    fn assign_property(
        &mut self,
        members: &[MemberId],
        property: PropertyId,
    ) -> Result<(), HostError> {
        self.model.assign_property(members, property)
    }

    fn assign_material(&mut self, material: &str, members: &[MemberId]) -> Result<(), HostError> {
        self.model.assign_material(material, members)
    }

    fn create_fixed_support(&mut self) -> Result<SupportId, HostError> {
        self.model.create_fixed_support()
    }

    fn assign_support(&mut self, nodes: &[NodeId], support: SupportId) -> Result<(), HostError> {
        self.model.assign_support(nodes, support)
    }

    fn primary_load_cases(&self) -> Result<Vec<LoadCaseId>, HostError> {
        self.model.primary_load_cases()
    }

    fn create_primary_load_case(
        &mut self,
        number: Option<LoadCaseId>,
        title: &str,
    ) -> Result<LoadCaseId, HostError> {
        self.model.create_primary_load_case(number, title)
    }

    fn set_active_load_case(&mut self, case: LoadCaseId) -> Result<(), HostError> {
        self.model.set_active_load_case(case)
    }

    fn add_self_weight(&mut self, axis: GlobalAxis, factor: f64) -> Result<(), HostError> {
        self.model.add_self_weight(axis, factor)
    }

    fn add_member_uniform_force(
        &mut self,
        members: &[MemberId],
        load: UniformForce,
        case: LoadCaseId,
    ) -> Result<(), HostError> {
        self.model.add_member_uniform_force(members, load, case)
    }

    fn add_floor_load(&mut self, load: FloorLoad) -> Result<(), HostError> {
        self.model.add_floor_load(load)
    }

    fn save(&mut self) -> Result<(), HostError> {
        self.model.save()?;
        self.flush()
    }

    fn analyze(&mut self, print: AnalysisPrint) -> Result<(), HostError> {
        self.model.analyze(print)?;
        self.flush()
    }
}

/// Display adapter producing the command file of a model.
struct Deck<'a>(&'a ModelHost);

impl fmt::Display for Deck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.0;
        writeln!(f, "STAAD SPACE")?;
        writeln!(f, "INPUT WIDTH 79")?;
        if gravity_along_z(model) {
            writeln!(f, "SET Z UP")?;
        }
        if let Some(units) = model.units() {
            writeln!(f, "UNIT {units}")?;
        }

        writeln!(f, "JOINT COORDINATES")?;
        for (id, p) in model.nodes() {
            writeln!(f, "{id} {} {} {};", p.x, p.y, p.z)?;
        }

        writeln!(f, "MEMBER INCIDENCES")?;
        for (id, incidence) in model.members() {
            writeln!(f, "{id} {} {};", incidence.start, incidence.end)?;
        }

        write_properties(f, model)?;

        let materials = model.members_by_material();
        if !materials.is_empty() {
            writeln!(f, "CONSTANTS")?;
            for (material, members) in materials {
                write_list(f, &format!("MATERIAL {material} MEMB "), ids(&members), "")?;
            }
        }

        let supported = model.supported_nodes();
        if !supported.is_empty() {
            writeln!(f, "SUPPORTS")?;
            write_list(f, "", supported.iter().map(|node| node.get()), " FIXED")?;
        }

        for case in model.load_cases() {
            writeln!(f, "LOAD {} LOADTYPE None TITLE {}", case.number, case.title)?;
            for load in &case.loads {
                write_load(f, load)?;
            }
        }

        for print in model.analyses() {
            writeln!(f, "PERFORM ANALYSIS{}", print_suffix(*print))?;
        }
        writeln!(f, "FINISH")
    }
}

/// Emit one `MEMBER PROPERTY` block per section table.
fn write_properties(f: &mut fmt::Formatter<'_>, model: &ModelHost) -> fmt::Result {
    let mut countries: Vec<u32> = model.properties().iter().map(|p| p.country).collect();
    countries.sort_unstable();
    countries.dedup();
    for country in countries {
        let table = if country == sections::AMERICAN {
            "AMERICAN".to_string()
        } else {
            format!("{country}")
        };
        writeln!(f, "MEMBER PROPERTY {table}")?;
        for property in model.properties().iter().filter(|p| p.country == country) {
            let members = model.members_with_property(property.id);
            if members.is_empty() {
                continue;
            }
            let suffix = format!(" TABLE ST {}", property.designation);
            write_list(f, "", ids(&members), &suffix)?;
        }
    }
    Ok(())
}

/// Emit the commands for one load.
fn write_load(f: &mut fmt::Formatter<'_>, load: &Load) -> fmt::Result {
    match load {
        Load::SelfWeight { axis, factor } => writeln!(f, "SELFWEIGHT {axis} {factor}"),
        Load::MemberUniform { members, load } => {
            writeln!(f, "MEMBER LOAD")?;
            let mut suffix = format!(" UNI G{} {}", load.axis, load.intensity);
            if load.start != 0.0 || load.end != 0.0 {
                suffix.push_str(&format!(" {} {}", load.start, load.end));
            }
            write_list(f, "", ids(members), &suffix)
        }
        Load::Floor(floor) => {
            writeln!(f, "FLOOR LOAD")?;
            writeln!(
                f,
                "{axis}RANGE {} {} FLOAD {} G{axis}",
                floor.min,
                floor.max,
                floor.intensity,
                axis = floor.axis
            )
        }
    }
}

/// Keyword appended to `PERFORM ANALYSIS`.
fn print_suffix(print: AnalysisPrint) -> &'static str {
    match print {
        AnalysisPrint::None => "",
        AnalysisPrint::LoadData => " PRINT LOAD DATA",
        AnalysisPrint::StaticsCheck => " PRINT STATICS CHECK",
        AnalysisPrint::StaticsLoad => " PRINT STATICS LOAD",
        AnalysisPrint::ModeShapes => " PRINT MODE SHAPES",
        AnalysisPrint::Both => " PRINT BOTH",
        AnalysisPrint::All => " PRINT ALL",
    }
}

/// Whether any gravity load acts along Z, which needs the Z-up convention.
fn gravity_along_z(model: &ModelHost) -> bool {
    model.load_cases().iter().flat_map(|case| &case.loads).any(|load| match load {
        Load::SelfWeight { axis, .. } => *axis == GlobalAxis::Z,
        Load::Floor(floor) => floor.axis == GlobalAxis::Z,
        Load::MemberUniform { .. } => false,
    })
}

/// Raw numbers of member ids.
fn ids(members: &[MemberId]) -> impl Iterator<Item = u32> + '_ {
    members.iter().map(|member| member.get())
}

/// Collapse sorted ids into `a TO b` runs.
fn compress(ids: impl IntoIterator<Item = u32>) -> Vec<String> {
    let mut runs: Vec<(u32, u32)> = Vec::new();
    for id in ids {
        match runs.last_mut() {
            Some((_, end)) if id == *end + 1 => *end = id,
            _ => runs.push((id, id)),
        }
    }
    runs.into_iter()
        .flat_map(|(start, end)| match end - start {
            0 => vec![start.to_string()],
            1 => vec![start.to_string(), end.to_string()],
            _ => vec![format!("{start} TO {end}")],
        })
        .collect()
}

/// Write `prefix`, the compressed list and `suffix`, wrapping long lines with `-`.
fn write_list(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    ids: impl IntoIterator<Item = u32>,
    suffix: &str,
) -> fmt::Result {
    let mut line = prefix.to_string();
    let mut first = true;
    for token in compress(ids) {
        if !first && line.len() + token.len() + 1 > LINE_WIDTH {
            writeln!(f, "{line} -")?;
            line.clear();
            first = true;
        }
        if !first {
            line.push(' ');
        }
        line.push_str(&token);
        first = false;
    }
    writeln!(f, "{line}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    #[test]
    fn runs_are_collapsed() {
        assert_eq!(
            compress([1, 2, 3, 4, 7, 9, 10, 12]),
            vec!["1 TO 4", "7", "9", "10", "12"]
        );
        assert!(compress(Vec::new()).is_empty());
    }

    #[test]
    fn deck_lists_geometry_properties_and_loads() {
        let mut host = ScriptHost::new();
        host.connect().expect("script host connects");
        host.set_units(UnitSystem::FOOT_KIP).expect("units set");
        host.create_node(NodeId::new(1), point(0.0, 0.0, 0.0))
            .expect("node 1");
        host.create_node(NodeId::new(2), point(0.0, 20.0, 0.0))
            .expect("node 2");
        host.create_member(MemberId::new(1), NodeId::new(1), NodeId::new(2))
            .expect("member 1");
        let property = host
            .create_table_property(sections::AMERICAN, "W14X90")
            .expect("section listed");
        host.assign_property(&[MemberId::new(1)], property)
            .expect("property assigned");
        host.assign_material("STEEL", &[MemberId::new(1)])
            .expect("material assigned");
        let support = host.create_fixed_support().expect("support created");
        host.assign_support(&[NodeId::new(1)], support)
            .expect("support assigned");
        let case = host
            .create_primary_load_case(None, "DEAD LOAD")
            .expect("case created");
        host.set_active_load_case(case).expect("case active");
        host.add_self_weight(GlobalAxis::Y, -1.0)
            .expect("self weight");
        host.analyze(AnalysisPrint::None).expect("analysis");

        let deck = host.render();
        let expected = "\
STAAD SPACE
INPUT WIDTH 79
UNIT FEET KIP
JOINT COORDINATES
1 0 0 0;
2 0 20 0;
MEMBER INCIDENCES
1 1 2;
MEMBER PROPERTY AMERICAN
1 TABLE ST W14X90
CONSTANTS
MATERIAL STEEL MEMB 1
SUPPORTS
1 FIXED
LOAD 1 LOADTYPE None TITLE DEAD LOAD
SELFWEIGHT Y -1
PERFORM ANALYSIS
FINISH
";
        assert_eq!(deck, expected);
    }

    #[test]
    fn floor_loads_switch_to_z_up() {
        let mut host = ScriptHost::new();
        host.connect().expect("script host connects");
        let case = host
            .create_primary_load_case(None, "DEAD + LIVE LOAD")
            .expect("case created");
        host.set_active_load_case(case).expect("case active");
        host.add_floor_load(FloorLoad {
            axis: GlobalAxis::Z,
            intensity: -0.08,
            min: 11.9,
            max: 12.1,
        })
        .expect("floor load");

        let deck = host.render();
        assert!(deck.contains("SET Z UP\n"));
        assert!(deck.contains("FLOOR LOAD\nZRANGE 11.9 12.1 FLOAD -0.08 GZ\n"));
    }

    #[test]
    fn long_lists_wrap_with_continuations() {
        struct List;
        impl fmt::Display for List {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write_list(f, "", (1..=80).step_by(2), " FIXED")
            }
        }
        let text = List.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines[..lines.len() - 1].iter().all(|line| line.ends_with(" -")));
        assert!(lines.iter().all(|line| line.len() <= LINE_WIDTH + 8));
        assert!(text.ends_with("79 FIXED\n"));
    }
}
