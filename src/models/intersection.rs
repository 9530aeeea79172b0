use crate::constants::DEFAULT_NODE_LABEL;
use crate::models::SignalGroup;
use std::collections::BTreeMap;

/// `node/program` name of an intersection, used in log and error messages
#[must_use]
pub fn intersection_label(node: Option<&str>, program_id: &str) -> String {
    format!("{}/{program_id}", node.unwrap_or(DEFAULT_NODE_LABEL))
}

/// Signal groups sharing one control point, as scheduled by one signal program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intersection {
    /// `AbschaltTeilknoten` of the groups, `None` for the default node
    pub node: Option<String>,
    /// `BezeichnungKurz` of the signal program the timings come from
    pub program_id: String,
    pub groups: Vec<SignalGroup>,
}

impl Intersection {
    /// Name used in log and error messages
    #[must_use]
    pub fn label(&self) -> String {
        intersection_label(self.node.as_deref(), &self.program_id)
    }

    /// Number of SUMO connections controlled, i.e. highest index + 1
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.indices.iter())
            .max()
            .map_or(0, |&max| max + 1)
    }

    /// Groups driving each connection index, ordered by index
    #[must_use]
    pub fn groups_by_index(&self) -> BTreeMap<usize, Vec<String>> {
        let mut by_index: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for group in &self.groups {
            for &index in &group.indices {
                by_index.entry(index).or_default().push(group.id.clone());
            }
        }
        by_index
    }
}
