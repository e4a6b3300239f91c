#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod errors;
pub mod form;
pub mod geometry;
pub mod grid;
pub mod host;
pub mod model;
pub mod portal;
pub mod report;
pub mod script;
pub mod sections;
pub mod settings;
pub mod topology;
pub mod units;
pub mod workflow;

pub use errors::{FormError, HostError, RunError, TopologyError};
pub use form::{
    BuildingForm, BuildingSpec, UniformLoadForm, UniformLoadSpec, WarehouseForm, WarehouseSpec,
};
pub use geometry::{point, GlobalAxis, Point};
pub use grid::{generate_grid, GridFrame, GridParameters};
pub use host::{AnalysisHost, AnalysisPrint, FloorLoad, LoadCaseId, UniformForce};
pub use model::ModelHost;
pub use portal::{generate_portal, PortalFrame, PortalParameters};
pub use report::{render_summary, render_uniform_load};
pub use script::ScriptHost;
pub use settings::Settings;
pub use topology::{MemberId, MemberRole, NodeId, SectionGroup, Topology};
pub use units::UnitSystem;
pub use workflow::{
    apply_uniform_load, generate_building, generate_warehouse, RunSummary, StructureKind,
    UniformLoadSummary,
};
