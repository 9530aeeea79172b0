use serde::Deserialize;
use quick_xml::events::Event;
use quick_xml::Reader;
use indexmap::IndexMap;
use chrono::Duration;
use std::collections::HashSet;
use crate::error::ConvertError;
use crate::models::{StateProgram, TimedState};
use crate::time::{format_seconds, parse_seconds};

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitSignalGroupList {
    #[serde(rename = "Signalgruppe", default)]
    pub groups: Vec<OcitSignalGroup>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitSignalGroup {
    #[serde(rename = "BezeichnungKurz")]
    pub short_id: String,
    #[serde(rename = "AbschaltTeilknoten", default)]
    pub partial_node: Option<String>,
    #[serde(rename = "Bemerkungen", default)]
    pub comments: Option<OcitComments>,
    /// Red-yellow shown before the group turns green
    #[serde(rename = "AnwurfUebergang", default)]
    pub switch_on: Option<OcitTransition>,
    /// Yellow shown after the group leaves green
    #[serde(rename = "AbwurfUebergang", default)]
    pub switch_off: Option<OcitTransition>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitTransition {
    #[serde(rename = "Uebergangselement", default)]
    pub elements: Vec<OcitTransitionElement>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitTransitionElement {
    /// Seconds
    #[serde(rename = "Zeitdauer")]
    pub duration: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitComments {
    #[serde(rename = "Bemerkung", default)]
    pub entries: Vec<OcitText>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitText {
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitProgramList {
    #[serde(rename = "Signalprogramm", default)]
    pub programs: Vec<OcitProgram>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitProgram {
    #[serde(rename = "BezeichnungKurz")]
    pub short_id: String,
    #[serde(rename = "SPKopfzeile")]
    pub head: OcitProgramHead,
    #[serde(rename = "SPZeile", default)]
    pub rows: Vec<OcitProgramRow>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitProgramHead {
    /// Cycle time (Umlaufzeit) in seconds
    #[serde(rename = "TU")]
    pub cycle_time: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitProgramRow {
    #[serde(rename = "Signalgruppe")]
    pub group: String,
    #[serde(rename = "Schaltzeit", default)]
    pub switches: Vec<OcitSwitch>,
    #[serde(rename = "DauerSignalbild", default)]
    pub permanent_state: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct OcitSwitch {
    #[serde(rename = "Schaltzeitpunkt")]
    pub time: String,
    #[serde(rename = "Signalbild")]
    pub state: String,
}

/// The parts of an OCIT document the converter reads
#[derive(Debug, PartialEq)]
pub struct OcitDocument {
    pub signal_groups: OcitSignalGroupList,
    pub programs: OcitProgramList,
}

/// A signal group as read from the document, before its annotation is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalGroupRecord {
    pub id: String,
    /// Raw text of the first `Bemerkung`, if any
    pub annotation: Option<String>,
    pub program: StateProgram,
}

/// All signal groups of one parent node, timed by one signal program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersectionRecord {
    pub node: Option<String>,
    pub program_id: String,
    pub groups: Vec<SignalGroupRecord>,
}

fn malformed(message: impl Into<String>) -> ConvertError {
    ConvertError::MalformedInput(message.into())
}

/// Locate the first element with the given local name anywhere in the document
/// and return its complete markup (start tag through end tag)
fn find_element<'a>(xml: &'a str, local_name: &str) -> Result<Option<&'a str>, ConvertError> {
    let mut reader = Reader::from_str(xml);
    let position = |reader: &Reader<&[u8]>| {
        usize::try_from(reader.buffer_position())
            .map_err(|_| malformed("document too large"))
    };

    loop {
        let start = position(&reader)?;
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == local_name.as_bytes() => {
                reader.read_to_end(e.name()).map_err(|err| {
                    malformed(format!("unterminated <{local_name}>: {err}"))
                })?;
                let end = position(&reader)?;
                return Ok(Some(&xml[start..end]));
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == local_name.as_bytes() => {
                let end = position(&reader)?;
                return Ok(Some(&xml[start..end]));
            }
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(err) => {
                return Err(malformed(format!(
                    "XML error at byte {}: {err}",
                    reader.error_position()
                )))
            }
        }
    }
}

/// Parse the signal group and signal program lists out of an OCIT document
///
/// # Errors
/// Returns `MalformedInput` if the XML is invalid or either list is missing
/// or cannot be deserialized
pub fn parse_ocit(xml_content: &str) -> Result<OcitDocument, ConvertError> {
    let groups_xml = find_element(xml_content, "SignalgruppeListe")?
        .ok_or_else(|| malformed("document has no SignalgruppeListe"))?;
    let programs_xml = find_element(xml_content, "SignalprogrammListe")?
        .ok_or_else(|| malformed("document has no SignalprogrammListe"))?;

    let signal_groups: OcitSignalGroupList = quick_xml::de::from_str(groups_xml)
        .map_err(|e| malformed(format!("invalid SignalgruppeListe: {e}")))?;
    let programs: OcitProgramList = quick_xml::de::from_str(programs_xml)
        .map_err(|e| malformed(format!("invalid SignalprogrammListe: {e}")))?;

    Ok(OcitDocument {
        signal_groups,
        programs,
    })
}

/// Convert one `SPZeile` into a state program covering `cycle_time`
///
/// Switch times mark the instant a group changes to the given state. The
/// program is cyclic, so the time before the first switch shows the state
/// of the last switch.
fn row_to_program(
    row: &OcitProgramRow,
    cycle_time: Duration,
    program_id: &str,
) -> Result<StateProgram, ConvertError> {
    if row.switches.is_empty() {
        let Some(state) = &row.permanent_state else {
            return Err(malformed(format!(
                "signal group '{}' has no state/duration entries in program '{program_id}'",
                row.group
            )));
        };
        return Ok(StateProgram::new(vec![TimedState::new(state.trim(), cycle_time)]));
    }

    let mut switches = Vec::with_capacity(row.switches.len());
    for switch in &row.switches {
        let time = parse_seconds(&switch.time).map_err(|e| {
            malformed(format!(
                "signal group '{}' in program '{program_id}': {e}",
                row.group
            ))
        })?;
        if time >= cycle_time {
            return Err(malformed(format!(
                "signal group '{}' switches at {}s, outside the {}s cycle of program '{program_id}'",
                row.group,
                format_seconds(time),
                format_seconds(cycle_time)
            )));
        }
        switches.push((time, switch.state.trim()));
    }
    switches.sort_by_key(|&(time, _)| time);

    if let Some(pair) = switches.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(malformed(format!(
            "signal group '{}' switches twice at {}s in program '{program_id}'",
            row.group,
            format_seconds(pair[0].0)
        )));
    }

    let mut entries = Vec::with_capacity(switches.len() + 1);
    let (first_time, _) = switches[0];
    let (_, last_state) = switches[switches.len() - 1];
    if first_time > Duration::zero() {
        entries.push(TimedState::new(last_state, first_time));
    }
    for (i, &(time, state)) in switches.iter().enumerate() {
        let end = switches.get(i + 1).map_or(cycle_time, |&(next, _)| next);
        entries.push(TimedState::new(state, end - time));
    }

    Ok(StateProgram::new(entries))
}

/// Duration of the first element of a transition, zero when absent
fn transition_duration(
    transition: Option<&OcitTransition>,
    group_id: &str,
) -> Result<Duration, ConvertError> {
    let Some(element) = transition.and_then(|t| t.elements.first()) else {
        return Ok(Duration::zero());
    };
    parse_seconds(&element.duration)
        .map_err(|e| malformed(format!("signal group '{group_id}' has an invalid transition time: {e}")))
}

fn annotation_of(group: &OcitSignalGroup) -> Option<String> {
    group
        .comments
        .as_ref()
        .and_then(|c| c.entries.first())
        .map(|entry| entry.text.trim().to_string())
}

/// Build one intersection record per (signal program, parent node)
///
/// The `AnwurfUebergang`/`AbwurfUebergang` times of a group are inserted
/// into its programs as red-yellow before and yellow after green.
/// Programs keep document order; within a program, nodes appear in the
/// order their first signal group is declared. Groups of nodes listed in
/// `ignored_nodes` are left out.
///
/// # Errors
/// Returns `MalformedInput` for duplicate group ids, rows naming unknown or
/// repeated groups, groups without a row, invalid cycle times, and rows
/// without any timing
pub fn read_intersections(
    document: &OcitDocument,
    ignored_nodes: &[String],
) -> Result<Vec<IntersectionRecord>, ConvertError> {
    let mut known_ids = HashSet::new();
    for group in &document.signal_groups.groups {
        if !known_ids.insert(group.short_id.trim()) {
            return Err(malformed(format!(
                "signal group '{}' is declared twice",
                group.short_id.trim()
            )));
        }
    }

    let active_groups: Vec<&OcitSignalGroup> = document
        .signal_groups
        .groups
        .iter()
        .filter(|g| {
            let node = g.partial_node.as_deref().map(str::trim);
            !node.is_some_and(|n| ignored_nodes.iter().any(|ignored| ignored == n))
        })
        .collect();

    for ignored in ignored_nodes {
        log::warn!("Skipping signal groups of node {ignored}");
    }

    let mut intersections = Vec::new();
    for program in &document.programs.programs {
        let program_id = program.short_id.trim();
        let cycle_time = parse_seconds(&program.head.cycle_time)
            .map_err(|e| malformed(format!("program '{program_id}' has an invalid cycle time: {e}")))?;
        if cycle_time <= Duration::zero() {
            return Err(malformed(format!("program '{program_id}' declares a cycle time of zero")));
        }

        let mut rows: IndexMap<&str, &OcitProgramRow> = IndexMap::new();
        for row in &program.rows {
            let group_id = row.group.trim();
            if !known_ids.contains(group_id) {
                return Err(malformed(format!(
                    "program '{program_id}' references unknown signal group '{group_id}'"
                )));
            }
            if rows.insert(group_id, row).is_some() {
                return Err(malformed(format!(
                    "program '{program_id}' has more than one row for signal group '{group_id}'"
                )));
            }
        }

        let mut by_node: IndexMap<Option<String>, Vec<SignalGroupRecord>> = IndexMap::new();
        for group in &active_groups {
            let id = group.short_id.trim();
            let red_yellow = transition_duration(group.switch_on.as_ref(), id)?;
            let yellow = transition_duration(group.switch_off.as_ref(), id)?;
            let row = rows.get(id).ok_or_else(|| {
                malformed(format!(
                    "signal group '{id}' has no state/duration entries in program '{program_id}'"
                ))
            })?;
            let record = SignalGroupRecord {
                id: id.to_string(),
                annotation: annotation_of(group),
                program: row_to_program(row, cycle_time, program_id)?
                    .with_transitions(red_yellow, yellow),
            };
            let node = group.partial_node.as_deref().map(|n| n.trim().to_string());
            by_node.entry(node).or_default().push(record);
        }

        intersections.extend(by_node.into_iter().map(|(node, groups)| IntersectionRecord {
            node,
            program_id: program_id.to_string(),
            groups,
        }));
    }

    Ok(intersections)
}
