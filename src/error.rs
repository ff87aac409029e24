use std::fmt;

use thiserror::Error;

use crate::chart::{LinkId, NodeId};
use crate::routing::RouteError;

pub type Result<T, E = FlowError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown link {0:?}")]
    UnknownLink(LinkId),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("invalid chart document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Recoverable input problem. The offending call is skipped or defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    UnknownSource { source: String, target: String },
    UnknownTarget { source: String, target: String },
    /// Direction lacks the `-` separator.
    MalformedDirection { direction: String },
    UnknownSide { direction: String, side: String },
    DuplicateNode { name: String },
    /// A scripted move referenced a node that does not exist.
    UnknownMoveTarget { name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnknownSource { source, target } => {
                write!(f, "edge {source} -> {target}: source node '{source}' not found")
            }
            Warning::UnknownTarget { source, target } => {
                write!(f, "edge {source} -> {target}: target node '{target}' not found")
            }
            Warning::MalformedDirection { direction } => write!(
                f,
                "direction '{direction}' must look like 'exit-entry'; using right-left"
            ),
            Warning::UnknownSide { direction, side } => write!(
                f,
                "direction '{direction}' names unknown side '{side}'; using right-left"
            ),
            Warning::DuplicateNode { name } => {
                write!(f, "node '{name}' already exists; ignoring the new definition")
            }
            Warning::UnknownMoveTarget { name } => {
                write!(f, "cannot move node '{name}': not found")
            }
        }
    }
}
