use chrono::Duration;
use std::collections::BTreeSet;
use crate::constants::{DEFAULT_CUT_TOLERANCE, DEFAULT_TLS_ID};

/// Output document flavour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// SUMO additional file with `tlLogic` elements
    #[default]
    Sumo,
    /// The synthesized programs as JSON
    Json,
}

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Traffic light id in the SUMO network; the parent node id is appended to it
    pub tls_id: String,
    /// Cut points closer than this are merged
    pub cut_tolerance: Duration,
    /// Connection indices that show minor green (`g`) instead of `G`
    pub minor_indices: BTreeSet<usize>,
    /// Parent nodes (`AbschaltTeilknoten`) whose signal groups are skipped
    pub ignored_nodes: Vec<String>,
    pub format: OutputFormat,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            tls_id: DEFAULT_TLS_ID.to_string(),
            cut_tolerance: DEFAULT_CUT_TOLERANCE,
            minor_indices: BTreeSet::new(),
            ignored_nodes: Vec::new(),
            format: OutputFormat::Sumo,
        }
    }
}

impl ConvertOptions {
    /// `id` of the `tlLogic` for a parent node
    #[must_use]
    pub fn tls_id_for(&self, node: Option<&str>) -> String {
        format!("{}{}", self.tls_id, node.unwrap_or_default())
    }
}
