use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use crate::error::ConvertError;
use crate::models::TlLogic;
use crate::time::format_seconds;
use super::check_state_widths;

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ConvertError> {
    writer
        .write_event(event)
        .map_err(|e| ConvertError::Output(e.to_string()))
}

/// Comment listing the signal groups behind each connection index
fn index_comment(logic: &TlLogic) -> String {
    let mut comment = String::from(" sumo index to signal groups\n");
    for (index, groups) in &logic.index_groups {
        comment.push_str(&format!("    {index:>3}: {}\n", groups.join(" ")));
    }
    comment.push_str("    ");
    // "--" is not allowed inside an XML comment
    while comment.contains("--") {
        comment = comment.replace("--", "- -");
    }
    comment
}

fn write_tl_logic(writer: &mut Writer<Vec<u8>>, logic: &TlLogic) -> Result<(), ConvertError> {
    check_state_widths(logic)?;

    write(writer, Event::Comment(BytesText::from_escaped(index_comment(logic))))?;

    let start = BytesStart::new("tlLogic").with_attributes([
        ("id", logic.id.as_str()),
        ("type", "static"),
        ("programID", logic.program_id.as_str()),
        ("offset", "0"),
    ]);
    write(writer, Event::Start(start))?;

    for phase in &logic.phases {
        let duration = format_seconds(phase.duration);
        let element = BytesStart::new("phase").with_attributes([
            ("duration", duration.as_str()),
            ("state", phase.state.as_str()),
        ]);
        write(writer, Event::Empty(element))?;
    }

    write(writer, Event::End(BytesEnd::new("tlLogic")))
}

/// Render traffic light programs as a SUMO additional file
///
/// # Errors
/// `InternalConsistency` if a state string does not match the connection
/// count of its program, `Output` if serialization fails
pub fn write_additional(logics: &[TlLogic]) -> Result<String, ConvertError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(&mut writer, Event::Start(BytesStart::new("additional")))?;
    for logic in logics {
        write_tl_logic(&mut writer, logic)?;
    }
    write(&mut writer, Event::End(BytesEnd::new("additional")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| ConvertError::Output(e.to_string()))
}
