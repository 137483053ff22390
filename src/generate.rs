use log::*;

use trackmodel::{Topology, VacancySection};

use crate::error::Result;

/// Derives additional elements (routes, vacancy sections, ...) and attaches
/// them to the topology before it is exported.
pub trait TopologyGenerator {
    fn name(&self) -> &str;
    fn generate(&mut self, topology: &mut Topology) -> Result<()>;
}

/// Gives every edge that has no vacancy section a section of its own.
#[derive(Debug, Default)]
pub struct VacancySectionGenerator;

impl TopologyGenerator for VacancySectionGenerator {
    fn name(&self) -> &str {
        "vacancy sections"
    }

    fn generate(&mut self, topology: &mut Topology) -> Result<()> {
        let mut created = Vec::new();
        for edge in topology.edges.values_mut() {
            if edge.vacancy_section.is_some() {
                continue;
            }
            let id = format!("{}-tvs", edge.id);
            edge.vacancy_section = Some(id.clone());
            created.push(id);
        }
        debug!("Created {} vacancy sections", created.len());
        for id in created {
            if !topology.vacancy_sections.contains_key(&id) {
                topology.add_vacancy_section(VacancySection { id, name: None })?;
            }
        }
        Ok(())
    }
}
