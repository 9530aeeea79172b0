use rayon::prelude::*;
use crate::config::{ConvertOptions, OutputFormat};
use crate::error::ConvertError;
use crate::export::{write_additional, write_json};
use crate::import::{parse_ocit, read_intersections, resolve_intersection, IndexTable, IntersectionRecord};
use crate::models::TlLogic;
use crate::synthesis::synthesize;

fn build_logic(
    record: IntersectionRecord,
    options: &ConvertOptions,
    table: Option<&IndexTable>,
) -> Result<TlLogic, ConvertError> {
    let intersection = resolve_intersection(record, table)?;
    let phases = synthesize(&intersection, options)?;
    Ok(TlLogic {
        id: options.tls_id_for(intersection.node.as_deref()),
        program_id: intersection.program_id.clone(),
        connection_count: intersection.connection_count(),
        phases,
        index_groups: intersection.groups_by_index(),
    })
}

/// Read an OCIT document and synthesize one traffic light program per
/// (signal program, intersection)
///
/// Intersections are resolved and synthesized in parallel; results, and the
/// first error, keep document order.
///
/// # Errors
/// The first `ConvertError` raised by any stage
pub fn build_logics(
    xml: &str,
    options: &ConvertOptions,
    table: Option<&IndexTable>,
) -> Result<Vec<TlLogic>, ConvertError> {
    let document = parse_ocit(xml)?;
    let records = read_intersections(&document, &options.ignored_nodes)?;
    if records.is_empty() {
        log::warn!("No signal program schedules any signal group, output stays empty");
    }
    let group_count: usize = records.iter().map(|r| r.groups.len()).sum();

    let results: Vec<Result<TlLogic, ConvertError>> = records
        .into_par_iter()
        .map(|record| build_logic(record, options, table))
        .collect();
    let logics = results.into_iter().collect::<Result<Vec<_>, _>>()?;

    log::info!(
        "Converted {group_count} signal groups into {} traffic light programs",
        logics.len()
    );
    Ok(logics)
}

/// Convert an OCIT document into the configured output format
///
/// Nothing is returned unless every intersection converts cleanly.
///
/// # Errors
/// The first `ConvertError` raised by any stage
pub fn convert(
    xml: &str,
    options: &ConvertOptions,
    table: Option<&IndexTable>,
) -> Result<String, ConvertError> {
    let logics = build_logics(xml, options, table)?;
    match options.format {
        OutputFormat::Sumo => write_additional(&logics),
        OutputFormat::Json => write_json(&logics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeSet;
    use std::fs;
    use crate::models::MergedPhase;

    fn fixture(name: &str) -> String {
        fs::read_to_string(format!("test-data/{name}")).expect("Failed to read test fixture")
    }

    fn states(logic: &TlLogic) -> Vec<(i64, &str)> {
        logic
            .phases
            .iter()
            .map(|p| (p.duration.num_milliseconds(), p.state.as_str()))
            .collect()
    }

    fn assert_well_formed(logic: &TlLogic, cycle: Duration) {
        let total = logic.phases.iter().fold(Duration::zero(), |acc, p| acc + p.duration);
        assert_eq!(total, cycle, "{} keeps the cycle length", logic.id);
        for pair in logic.phases.windows(2) {
            assert_ne!(pair[0].state, pair[1].state, "{} has adjacent equal phases", logic.id);
        }
        for phase in &logic.phases {
            assert_eq!(phase.state.len(), logic.connection_count);
            assert!(phase.duration > Duration::zero());
        }
    }

    #[test]
    fn test_minimal_document() {
        let xml = convert(&fixture("minimal.xml"), &ConvertOptions::default(), None)
            .expect("Failed to convert minimal document");

        assert!(xml.contains(r#"<tlLogic id="TLS_ID" type="static" programID="P1" offset="0">"#));
        assert!(xml.contains(r#"<phase duration="30" state="rG"/>"#));
        assert!(xml.contains(r#"<phase duration="30" state="Gr"/>"#));
        assert_eq!(xml.matches("<phase ").count(), 2);
        assert!(xml.find(r#"state="rG""#) < xml.find(r#"state="Gr""#));
    }

    #[test]
    fn test_two_nodes_two_programs() {
        let logics = build_logics(&fixture("two_nodes.xml"), &ConvertOptions::default(), None)
            .expect("Failed to convert two node document");

        let ids: Vec<(&str, &str)> = logics
            .iter()
            .map(|l| (l.id.as_str(), l.program_id.as_str()))
            .collect();
        assert_eq!(
            ids,
            vec![("TLS_ID1", "P1"), ("TLS_ID2", "P1"), ("TLS_ID1", "P2"), ("TLS_ID2", "P2")]
        );

        assert_eq!(
            states(&logics[0]),
            vec![
                (25_000, "GGrr"),
                (3_000, "yyrr"),
                (2_000, "rrrr"),
                (1_000, "rrur"),
                (1_000, "rrGr"),
                (18_000, "rrGG"),
                (5_000, "rrGr"),
                (3_000, "rryr"),
                (1_000, "rrrr"),
                (1_000, "uurr"),
            ]
        );
        assert_eq!(
            states(&logics[1]),
            vec![(5_000, "ro"), (35_000, "Go"), (3_000, "yo"), (17_000, "ro")]
        );
        assert_eq!(
            states(&logics[3]),
            vec![(10_500, "rO"), (49_500, "GO"), (3_000, "yO"), (27_000, "rO")]
        );

        assert_well_formed(&logics[0], Duration::seconds(60));
        assert_well_formed(&logics[1], Duration::seconds(60));
        assert_well_formed(&logics[2], Duration::seconds(90));
        assert_well_formed(&logics[3], Duration::seconds(90));

        assert_eq!(logics[0].index_groups[&1], vec!["K1".to_string()]);
        assert_eq!(logics[0].index_groups[&3], vec!["F1".to_string()]);
    }

    #[test]
    fn test_fractional_durations_in_output() {
        let xml = convert(&fixture("two_nodes.xml"), &ConvertOptions::default(), None)
            .expect("Failed to convert two node document");
        assert!(xml.contains(r#"<phase duration="10.5" state="rO"/>"#));
        assert!(xml.contains(r#"<phase duration="49.5" state="GO"/>"#));
        assert_eq!(xml.matches("<tlLogic ").count(), 4);
    }

    #[test]
    fn test_output_is_deterministic() {
        let document = fixture("two_nodes.xml");
        let options = ConvertOptions::default();
        let first = convert(&document, &options, None).expect("first run");
        let second = convert(&document, &options, None).expect("second run");
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_annotation_names_group() {
        let document = fixture("minimal.xml").replace("<Bemerkung>1</Bemerkung>", "<Bemerkung></Bemerkung>");
        let result = convert(&document, &ConvertOptions::default(), None);
        match result {
            Err(ConvertError::MissingAnnotation { group, .. }) => assert_eq!(group, "B"),
            other => panic!("expected MissingAnnotation, got {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_annotations() {
        let document = fixture("minimal.xml")
            .replace("<Bemerkung>0</Bemerkung>", "<Bemerkung>0;2</Bemerkung>")
            .replace("<Bemerkung>1</Bemerkung>", "<Bemerkung>1;2</Bemerkung>");
        let result = convert(&document, &ConvertOptions::default(), None);
        match result {
            Err(ConvertError::AnnotationConflict { index, first_group, second_group, .. }) => {
                assert_eq!(index, 2);
                assert_eq!(first_group, "A");
                assert_eq!(second_group, "B");
            }
            other => panic!("expected AnnotationConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_index_gap() {
        let document = fixture("minimal.xml").replace("<Bemerkung>1</Bemerkung>", "<Bemerkung>2</Bemerkung>");
        let result = convert(&document, &ConvertOptions::default(), None);
        assert_eq!(
            result,
            Err(ConvertError::IncompleteCoverage {
                intersection: "default/P1".to_string(),
                missing: vec![1],
            })
        );
    }

    #[test]
    fn test_unknown_state_symbol() {
        let document = fixture("minimal.xml").replacen("<Signalbild>gruen</Signalbild>", "<Signalbild>blau</Signalbild>", 1);
        let result = convert(&document, &ConvertOptions::default(), None);
        match result {
            Err(ConvertError::UnknownStateSymbol { intersection, group, symbol }) => {
                assert_eq!(intersection, "default/P1");
                assert_eq!(group, "A");
                assert_eq!(symbol, "blau");
            }
            other => panic!("expected UnknownStateSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_first_error_in_document_order() {
        let document = fixture("two_nodes.xml")
            .replace("<Signalbild>gelbblk</Signalbild>", "<Signalbild>lila</Signalbild>")
            .replace("<DauerSignalbild>gelbblk</DauerSignalbild>", "<DauerSignalbild>lila</DauerSignalbild>")
            .replace("<Signalbild>dunkel</Signalbild>", "<Signalbild>grau</Signalbild>");
        for _ in 0..5 {
            let result = build_logics(&document, &ConvertOptions::default(), None);
            assert_eq!(
                result,
                Err(ConvertError::UnknownStateSymbol {
                    intersection: "2/P1".to_string(),
                    group: "K4".to_string(),
                    symbol: "lila".to_string(),
                })
            );
        }
    }

    #[test]
    fn test_earlier_synthesis_error_wins_over_later_annotation_error() {
        let document = fixture("two_nodes.xml")
            .replace("<Signalbild>rotgelb</Signalbild>", "<Signalbild>lila</Signalbild>")
            .replace("<Bemerkung>0</Bemerkung>", "<Bemerkung>x</Bemerkung>");
        let result = build_logics(&document, &ConvertOptions::default(), None);
        assert_eq!(
            result,
            Err(ConvertError::UnknownStateSymbol {
                intersection: "1/P1".to_string(),
                group: "K2".to_string(),
                symbol: "lila".to_string(),
            })
        );
    }

    #[test]
    fn test_transition_times_add_yellow_and_red_yellow() {
        let document = fixture("minimal.xml").replace(
            "<BezeichnungKurz>A</BezeichnungKurz>",
            "<BezeichnungKurz>A</BezeichnungKurz>
        <AnwurfUebergang><Uebergangselement><Zeitdauer>1</Zeitdauer></Uebergangselement></AnwurfUebergang>
        <AbwurfUebergang><Uebergangselement><Zeitdauer>3</Zeitdauer></Uebergangselement></AbwurfUebergang>",
        );
        let logics = build_logics(&document, &ConvertOptions::default(), None).expect("Failed to convert");
        assert_eq!(
            states(&logics[0]),
            vec![(3_000, "yG"), (26_000, "rG"), (1_000, "uG"), (30_000, "Gr")]
        );
        assert_well_formed(&logics[0], Duration::seconds(60));
    }

    #[test]
    fn test_index_table_overrides_annotations() {
        let table = IndexTable::from_reader(fs::File::open("test-data/swapped_indices.csv").expect("Failed to open index table"))
            .expect("Failed to read index table");
        let logics = build_logics(&fixture("minimal.xml"), &ConvertOptions::default(), Some(&table))
            .expect("Failed to convert with index table");
        assert_eq!(
            logics[0].phases,
            vec![
                MergedPhase::new(Duration::seconds(30), "Gr"),
                MergedPhase::new(Duration::seconds(30), "rG"),
            ]
        );
    }

    #[test]
    fn test_minor_indices() {
        let options = ConvertOptions {
            minor_indices: BTreeSet::from([1]),
            ..ConvertOptions::default()
        };
        let xml = convert(&fixture("minimal.xml"), &options, None).expect("Failed to convert");
        assert!(xml.contains(r#"state="rg""#));
        assert!(xml.contains(r#"state="Gr""#));
    }

    #[test]
    fn test_ignored_nodes() {
        let options = ConvertOptions {
            ignored_nodes: vec!["2".to_string()],
            ..ConvertOptions::default()
        };
        let logics = build_logics(&fixture("two_nodes.xml"), &options, None).expect("Failed to convert");
        assert_eq!(logics.len(), 2);
        assert!(logics.iter().all(|l| l.id == "TLS_ID1"));
    }

    #[test]
    fn test_json_format() {
        let options = ConvertOptions {
            format: OutputFormat::Json,
            ..ConvertOptions::default()
        };
        let json = convert(&fixture("minimal.xml"), &options, None).expect("Failed to convert");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
        assert_eq!(value[0]["program_id"], "P1");
        assert_eq!(value[0]["phases"][0]["state"], "rG");
    }

    #[test]
    fn test_malformed_xml() {
        let result = convert("<OCIT-C><Versorgung>", &ConvertOptions::default(), None);
        assert!(matches!(result, Err(ConvertError::MalformedInput(_))));
    }
}
