//! Orientation and placement export of railway track topologies for the
//! interlocking UI.

pub mod adjacency;
pub mod config;
pub mod edge_orientation;
pub mod error;
pub mod exporter;
pub mod file;
pub mod generate;
pub mod orientation;
pub mod placement;
pub mod routes;
pub mod simplify;
pub mod topology;

pub use config::{ExportConfig, SectionsKey, TieBreak};
pub use error::{ExportError, Result};
pub use exporter::Exporter;
pub use generate::{TopologyGenerator, VacancySectionGenerator};
pub use orientation::{Direction, Orientation, OrientationState, Orientations};
pub use placement::{EdgePlacement, Placement, PointPlacement};
pub use routes::{RouteExport, RouteState};
pub use topology::{AxleCountingHead, TopologyExport};
