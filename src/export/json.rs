use serde::Serialize;
use std::collections::BTreeMap;
use crate::error::ConvertError;
use crate::models::TlLogic;
use crate::time::format_seconds;
use super::check_state_widths;

#[derive(Debug, Serialize)]
struct JsonPhase<'a> {
    duration: String,
    state: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonTlLogic<'a> {
    id: &'a str,
    program_id: &'a str,
    cycle_length: String,
    connection_count: usize,
    signal_groups: &'a BTreeMap<usize, Vec<String>>,
    phases: Vec<JsonPhase<'a>>,
}

impl<'a> From<&'a TlLogic> for JsonTlLogic<'a> {
    fn from(logic: &'a TlLogic) -> Self {
        Self {
            id: &logic.id,
            program_id: &logic.program_id,
            cycle_length: format_seconds(logic.cycle_length()),
            connection_count: logic.connection_count,
            signal_groups: &logic.index_groups,
            phases: logic
                .phases
                .iter()
                .map(|phase| JsonPhase {
                    duration: format_seconds(phase.duration),
                    state: &phase.state,
                })
                .collect(),
        }
    }
}

/// Render traffic light programs as pretty-printed JSON
///
/// # Errors
/// `InternalConsistency` if a state string does not match the connection
/// count of its program, `Output` if serialization fails
pub fn write_json(logics: &[TlLogic]) -> Result<String, ConvertError> {
    for logic in logics {
        check_state_widths(logic)?;
    }
    let documents: Vec<JsonTlLogic<'_>> = logics.iter().map(JsonTlLogic::from).collect();
    let mut json = serde_json::to_string_pretty(&documents)
        .map_err(|e| ConvertError::Output(format!("JSON serialization failed: {e}")))?;
    json.push('\n');
    Ok(json)
}
