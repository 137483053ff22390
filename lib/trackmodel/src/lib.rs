pub mod document;
pub mod model;
pub mod signal;
pub mod topo;

pub use model::{Edge, Id, IdRef, ModelError, Node, Route, Side, Slot, VacancySection};
pub use signal::{AdditionalSignal, Signal, SignalDirection, SignalFunction, SignalKind, SignalState};
pub use topo::Topology;
