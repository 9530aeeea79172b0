use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use crate::error::ConvertError;

/// One row of an index table: `group,indices`
#[derive(Debug, Deserialize)]
struct IndexTableRow {
    group: String,
    indices: String,
}

/// Connection indices per signal group, kept outside the OCIT document
///
/// The table is a CSV file with the header `group,indices`; the indices
/// column uses the same `;`-separated format as a `Bemerkung`:
///
/// ```text
/// group,indices
/// K1,0;1
/// K2,2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    entries: HashMap<String, String>,
}

impl IndexTable {
    /// Read an index table from CSV
    ///
    /// # Errors
    /// Returns `IndexTable` if the CSV is malformed, lacks the expected
    /// columns, or lists a group twice
    pub fn from_reader(reader: impl Read) -> Result<Self, ConvertError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for (line, record) in csv_reader.deserialize::<IndexTableRow>().enumerate() {
            let row = record.map_err(|e| ConvertError::IndexTable(format!("row {}: {e}", line + 1)))?;
            if entries.insert(row.group.clone(), row.indices).is_some() {
                return Err(ConvertError::IndexTable(format!(
                    "signal group '{}' is listed more than once",
                    row.group
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Raw annotation text for a signal group, if the table lists it
    #[must_use]
    pub fn get(&self, group: &str) -> Option<&str> {
        self.entries.get(group).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
