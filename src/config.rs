use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "interlocking-exporter";

/// How to choose between several nodes with the same, minimal number of
/// incident edges when picking the start of a traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    LowestId,
    /// The node that first appears on an edge, in edge order.
    FirstEncountered,
}

/// Key the route map is exported under.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub enum SectionsKey {
    #[serde(rename = "routes")]
    Routes,
    #[serde(rename = "drivewaySections")]
    DrivewaySections,
}

impl SectionsKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionsKey::Routes => "routes",
            SectionsKey::DrivewaySections => "drivewaySections",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub start_node_tie_break: TieBreak,
    pub simplify: bool,
    pub generate_vacancy_sections: bool,
    pub axle_counting_heads: bool,
    pub axle_counting_head_positions: [f64; 2],
    pub vacancy_section_name: String,
    pub signal_rasta_id: u64,
    pub sections_key: SectionsKey,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            start_node_tie_break: TieBreak::LowestId,
            simplify: false,
            generate_vacancy_sections: true,
            axle_counting_heads: true,
            axle_counting_head_positions: [0.1, 0.9],
            vacancy_section_name: "DE_AC01".to_string(),
            signal_rasta_id: 1234567890,
            sections_key: SectionsKey::Routes,
        }
    }
}

impl ExportConfig {
    pub fn from_toml(data: &str) -> Result<ExportConfig, toml::de::Error> {
        toml::from_str(data)
    }
}
