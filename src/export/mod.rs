pub mod json;
pub mod sumo;

pub use json::write_json;
pub use sumo::write_additional;

use crate::error::ConvertError;
use crate::models::TlLogic;

/// Every state string must have exactly one character per connection
fn check_state_widths(logic: &TlLogic) -> Result<(), ConvertError> {
    for (position, phase) in logic.phases.iter().enumerate() {
        let width = phase.state.chars().count();
        if width != logic.connection_count {
            return Err(ConvertError::InternalConsistency {
                intersection: logic.id.clone(),
                detail: format!(
                    "phase {position} of program '{}' has {width} states for {} connections",
                    logic.program_id, logic.connection_count
                ),
            });
        }
    }
    Ok(())
}
