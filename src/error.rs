use thiserror::Error;
use trackmodel::{Id, ModelError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("there are no axle counting heads in the topology, run export_topology() first")]
    MissingAxleCountingHeads,

    #[error("main signal {signal} supports none of hp1, hp2, ks1, ks2")]
    UnsupportedMainAspect { signal: Id },

    #[error("node {node} referenced by {referenced_by} does not exist")]
    MissingNode { node: Id, referenced_by: Id },

    #[error("no edge joins nodes {a} and {b}")]
    MissingEdge { a: Id, b: Id },

    #[error("start node {node} has no neighbour to start the traversal from")]
    StartNodeWithoutNeighbour { node: Id },

    #[error("point {node} reaches one neighbour on both branches but not through two edges")]
    ParallelEdgesMissing { node: Id },

    #[error("{element} is not connected to the start of the topology")]
    Disconnected { element: Id },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
