use indexmap::IndexMap;
use log::*;

use trackmodel::{Id, Topology};

use crate::config::ExportConfig;
use crate::edge_orientation::EdgeOrientations;
use crate::error::{ExportError, Result};
use crate::generate::{TopologyGenerator, VacancySectionGenerator};
use crate::orientation::Orientations;
use crate::placement::Placement;
use crate::routes::{self, RouteExport};
use crate::simplify::simplify;
use crate::topology::{self, AxleCountingHead, TopologyExport};

/// Owns one topology and everything derived from it for the interlocking UI.
///
/// Orientations are computed once, when the exporter is built. Axle counting
/// heads are created by [`Exporter::export_topology`], and placement export
/// depends on them when they are enabled.
pub struct Exporter {
    topology: Topology,
    config: ExportConfig,
    orientations: Orientations,
    edge_orientations: EdgeOrientations,
    axle_counting_heads: Option<IndexMap<Id, AxleCountingHead>>,
}

impl Exporter {
    pub fn new(topology: Topology, config: ExportConfig) -> Result<Exporter> {
        Exporter::with_generators(topology, config, Vec::new())
    }

    /// Runs simplification (when configured), the built-in vacancy section
    /// generator (when configured) and then `generators` in order, before
    /// orienting the result.
    pub fn with_generators(
        mut topology: Topology,
        config: ExportConfig,
        mut generators: Vec<Box<dyn TopologyGenerator>>,
    ) -> Result<Exporter> {
        if config.simplify {
            simplify(&mut topology)?;
        }
        if config.generate_vacancy_sections {
            generators.insert(0, Box::new(VacancySectionGenerator));
        }
        for generator in generators.iter_mut() {
            info!("Running generator: {}", generator.name());
            generator.generate(&mut topology)?;
        }

        let orientations = Orientations::propagate(&topology, config.start_node_tie_break)?;
        let edge_orientations = EdgeOrientations::propagate(&topology, config.start_node_tie_break)?;

        Ok(Exporter {
            topology,
            config,
            orientations,
            edge_orientations,
            axle_counting_heads: None,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn orientations(&self) -> &Orientations {
        &self.orientations
    }

    pub fn export_topology(&mut self) -> Result<TopologyExport> {
        let heads = topology::axle_counting_heads(&self.topology, &self.config)?;
        let export = topology::export_topology(&self.topology, &heads, &self.config)?;
        self.axle_counting_heads = Some(heads);
        Ok(export)
    }

    pub fn export_placement(&self) -> Result<Placement> {
        let heads = match (&self.axle_counting_heads, self.config.axle_counting_heads) {
            (Some(heads), true) => Some(heads),
            (None, true) => return Err(ExportError::MissingAxleCountingHeads),
            (_, false) => None,
        };
        Placement::resolve(&self.topology, &self.orientations, &self.edge_orientations, heads)
    }

    pub fn export_routes(&self) -> Result<Vec<RouteExport>> {
        routes::export_routes(&self.topology)
    }
}
