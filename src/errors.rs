//! Error types produced while generating frames or driving an analysis host.

use thiserror::Error;

use crate::topology::{MemberId, NodeId};

/// Error returned when a member cannot be added to a [`Topology`](crate::Topology).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// Returned when a member references a node that has not been created yet.
    #[error("member {member} references node {node}, which has not been created")]
    UnknownNode {
        /// Identifier the member would have received.
        member: MemberId,
        /// The missing endpoint.
        node: NodeId,
    },
    /// Returned when both endpoints of a member are the same node.
    #[error("member {member} connects node {node} to itself")]
    SelfLoop {
        /// Identifier the member would have received.
        member: MemberId,
        /// The repeated endpoint.
        node: NodeId,
    },
    /// Returned when a frame needs more nodes or members than identifiers can number.
    #[error("frame needs more than {} nodes or members", u32::MAX)]
    TooLarge,
}

/// Error returned by an [`AnalysisHost`](crate::AnalysisHost) call.
///
/// The variants mirror the failures a live analysis application reports so the
/// in-memory host and a real connection surface the same diagnostics.
#[derive(Debug, Error)]
pub enum HostError {
    /// Returned when no host instance is available or `connect` was never called.
    #[error("analysis host is not open")]
    NotConnected,
    /// Returned when a node id is already taken.
    #[error("node {0} already exists")]
    DuplicateNode(NodeId),
    /// Returned when a member id is already taken.
    #[error("member {0} already exists")]
    DuplicateMember(MemberId),
    /// Returned when a call references a node the host does not know.
    #[error("node {0} does not exist in the model")]
    UnknownNode(NodeId),
    /// Returned when a call references a member the host does not know.
    #[error("member {0} does not exist in the model")]
    UnknownMember(MemberId),
    /// Returned when a member would span zero distance.
    #[error("member {member} between nodes {start} and {end} has zero length")]
    DegenerateMember {
        /// Identifier of the rejected member.
        member: MemberId,
        /// First endpoint.
        start: NodeId,
        /// Second endpoint.
        end: NodeId,
    },
    /// Returned when a section designation is not in the requested table.
    #[error("section {designation:?} is not in table {country}")]
    UnknownSection {
        /// Table (country) code that was searched.
        country: u32,
        /// Designation as supplied by the caller.
        designation: String,
    },
    /// Returned when a property handle was never created.
    #[error("property {0} does not exist")]
    UnknownProperty(u32),
    /// Returned when a support handle was never created.
    #[error("support {0} does not exist")]
    UnknownSupport(u32),
    /// Returned when a load case number was never created.
    #[error("load case {0} does not exist")]
    UnknownLoadCase(u32),
    /// Returned when a load case number is already taken.
    #[error("load case {0} already exists")]
    DuplicateLoadCase(u32),
    /// Returned when a load is added before any case was activated.
    #[error("no load case is active")]
    NoActiveLoadCase,
    /// Returned when a load or assignment is given an empty target list.
    #[error("{0} was called with an empty list")]
    EmptySelection(&'static str),
    /// Returned when analysis is requested on a model without supports.
    #[error("model has no supports and cannot be analysed")]
    NoSupports,
    /// Returned when analysis is requested on a model without members.
    #[error("model has no members")]
    EmptyModel,
    /// Returned when writing a saved model fails.
    #[error("could not write model: {0}")]
    Io(#[from] std::io::Error),
    /// Returned when serialising a model snapshot fails.
    #[error("could not serialise model: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error returned when a parameter form cannot be turned into a specification.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// Returned when a numeric field does not hold a finite number of the expected kind.
    #[error("{field}: {value:?} is not a valid {expected}")]
    InvalidNumber {
        /// Label of the offending field.
        field: &'static str,
        /// Text entered in the field.
        value: String,
        /// Kind of number the field expects.
        expected: &'static str,
    },
    /// Returned when a section field is left blank.
    #[error("{0} requires a section designation")]
    MissingSection(&'static str),
}

/// Error returned by a generation run.
///
/// This is the single failure boundary of the workflow: whichever step fails,
/// the run stops and the error is reported as-is.
#[derive(Debug, Error)]
pub enum RunError {
    /// Returned when the input form is malformed. No host call has been made.
    #[error(transparent)]
    Form(#[from] FormError),
    /// Returned when generation produces an inconsistent topology.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// Returned when a host call fails.
    #[error("{operation} failed: {source}")]
    Host {
        /// Name of the host operation that failed.
        operation: &'static str,
        /// Error reported by the host.
        #[source]
        source: HostError,
    },
    /// Returned when the host has no members to load.
    #[error("no members found in model")]
    NoMembers,
    /// Returned when settings cannot be read.
    #[error("invalid settings: {0}")]
    Settings(String),
}

/// Attach the host operation name to a [`HostError`].
pub(crate) trait HostResultExt<T> {
    /// Convert the error into [`RunError::Host`] tagged with `operation`.
    fn during(self, operation: &'static str) -> Result<T, RunError>;
}

impl<T> HostResultExt<T> for Result<T, HostError> {
    fn during(self, operation: &'static str) -> Result<T, RunError> {
        self.map_err(|source| {
            log::warn!("{operation} rejected: {source}");
            RunError::Host { operation, source }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_errors_carry_the_operation_name() {
        let result: Result<(), HostError> = Err(HostError::NotConnected);
        let error = result.during("connect").expect_err("error preserved");
        assert_eq!(error.to_string(), "connect failed: analysis host is not open");
    }

    #[test]
    fn form_errors_quote_the_entered_text() {
        let error = FormError::InvalidNumber {
            field: "Number of Floors",
            value: "five".to_string(),
            expected: "whole number",
        };
        assert_eq!(
            error.to_string(),
            "Number of Floors: \"five\" is not a valid whole number"
        );
    }
}
