//! Connection index annotations.
//!
//! Each signal group names the SUMO connection indices it drives as a
//! `;`-separated list, either in its `Bemerkung` or in an index table.

use std::collections::BTreeMap;
use crate::constants::INDEX_SEPARATOR;
use crate::error::ConvertError;
use crate::import::index_table::IndexTable;
use crate::import::ocit::IntersectionRecord;
use crate::models::{intersection_label, Intersection, SignalGroup};

/// Parse an annotation like `0;3;4` into connection indices
///
/// Order is preserved; an index repeated within the same list is kept once.
///
/// # Errors
/// `MissingAnnotation` for empty text, `AnnotationFormat` for tokens that are
/// not non-negative integers
pub fn parse_annotation(
    text: &str,
    group: &str,
    intersection: &str,
) -> Result<Vec<usize>, ConvertError> {
    if text.trim().is_empty() {
        return Err(ConvertError::MissingAnnotation {
            intersection: intersection.to_string(),
            group: group.to_string(),
        });
    }

    let mut indices = Vec::new();
    for token in text.split(INDEX_SEPARATOR).map(str::trim) {
        let format_error = |reason: &str| ConvertError::AnnotationFormat {
            intersection: intersection.to_string(),
            group: group.to_string(),
            token: token.to_string(),
            reason: reason.to_string(),
        };
        if token.is_empty() {
            return Err(format_error("empty entry"));
        }
        if let Some(digits) = token.strip_prefix('-') {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(format_error("connection indices cannot be negative"));
            }
        }
        if !token.chars().all(|c| c.is_ascii_digit()) {
            return Err(format_error("not an integer"));
        }
        let index: usize = token
            .parse()
            .map_err(|_| format_error("index out of range"))?;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    Ok(indices)
}

/// Resolve the annotations of every group of one intersection
///
/// Annotations from `table` take precedence over the document's
/// `Bemerkung`. Checks that no index is claimed by two groups and that the
/// indices form the gapless range `0..=max`.
///
/// # Errors
/// `MissingAnnotation`, `AnnotationFormat`, `AnnotationConflict` or
/// `IncompleteCoverage`
pub fn resolve_intersection(
    record: IntersectionRecord,
    table: Option<&IndexTable>,
) -> Result<Intersection, ConvertError> {
    let label = intersection_label(record.node.as_deref(), &record.program_id);

    let mut owners: BTreeMap<usize, String> = BTreeMap::new();
    let mut groups = Vec::with_capacity(record.groups.len());
    for group in record.groups {
        let text = table
            .and_then(|t| t.get(&group.id))
            .or(group.annotation.as_deref())
            .unwrap_or_default();
        let indices = parse_annotation(text, &group.id, &label)?;

        for &index in &indices {
            if let Some(owner) = owners.get(&index) {
                return Err(ConvertError::AnnotationConflict {
                    intersection: label,
                    index,
                    first_group: owner.clone(),
                    second_group: group.id,
                });
            }
            owners.insert(index, group.id.clone());
        }

        groups.push(SignalGroup {
            id: group.id,
            program: group.program,
            indices,
        });
    }

    let missing = missing_indices(owners.keys().copied());
    if !missing.is_empty() {
        return Err(ConvertError::IncompleteCoverage {
            intersection: label,
            missing,
        });
    }

    log::debug!("Intersection {label}: {} signal groups, {} connections", groups.len(), owners.len());

    Ok(Intersection {
        node: record.node,
        program_id: record.program_id,
        groups,
    })
}

/// Indices below the maximum that are not present in the ascending sequence
fn missing_indices(sorted: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut missing = Vec::new();
    let mut expected = 0;
    for index in sorted {
        missing.extend(expected..index);
        expected = index + 1;
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ocit::SignalGroupRecord;
    use crate::models::StateProgram;

    fn record(groups: &[(&str, Option<&str>)]) -> IntersectionRecord {
        IntersectionRecord {
            node: Some("1".to_string()),
            program_id: "P1".to_string(),
            groups: groups
                .iter()
                .map(|&(id, annotation)| SignalGroupRecord {
                    id: id.to_string(),
                    annotation: annotation.map(ToString::to_string),
                    program: StateProgram::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_parse_annotation_keeps_order() {
        assert_eq!(parse_annotation("3;0; 2", "K1", "1"), Ok(vec![3, 0, 2]));
    }

    #[test]
    fn test_parse_annotation_collapses_repeats() {
        assert_eq!(parse_annotation("1;1;0", "K1", "1"), Ok(vec![1, 0]));
    }

    #[test]
    fn test_parse_annotation_empty_is_missing() {
        assert_eq!(
            parse_annotation("  ", "K1", "1"),
            Err(ConvertError::MissingAnnotation {
                intersection: "1".to_string(),
                group: "K1".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_annotation_rejects_negative() {
        let result = parse_annotation("0;-1", "K1", "1");
        assert!(matches!(
            result,
            Err(ConvertError::AnnotationFormat { ref intersection, ref token, ref reason, .. })
                if intersection == "1" && token == "-1" && reason.contains("negative")
        ));
    }

    #[test]
    fn test_parse_annotation_rejects_non_integer() {
        for text in ["a", "1.5", "0,1", "0;;1", "+1"] {
            assert!(
                matches!(parse_annotation(text, "K1", "1"), Err(ConvertError::AnnotationFormat { .. })),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_assigns_indices() {
        let intersection = resolve_intersection(record(&[("K1", Some("1")), ("K2", Some("0;2"))]), None)
            .expect("valid annotations");
        assert_eq!(intersection.groups[0].indices, vec![1]);
        assert_eq!(intersection.groups[1].indices, vec![0, 2]);
        assert_eq!(intersection.connection_count(), 3);
    }

    #[test]
    fn test_resolve_missing_annotation_names_group() {
        let result = resolve_intersection(record(&[("K1", Some("0")), ("K2", None)]), None);
        assert!(matches!(result, Err(ConvertError::MissingAnnotation { group, .. }) if group == "K2"));

        let result = resolve_intersection(record(&[("K1", Some("0")), ("K2", Some(""))]), None);
        assert!(matches!(result, Err(ConvertError::MissingAnnotation { group, .. }) if group == "K2"));
    }

    #[test]
    fn test_resolve_conflict_names_index_and_both_groups() {
        let result = resolve_intersection(
            record(&[("K1", Some("0;2")), ("K2", Some("1")), ("K3", Some("2"))]),
            None,
        );
        assert_eq!(
            result,
            Err(ConvertError::AnnotationConflict {
                intersection: "1/P1".to_string(),
                index: 2,
                first_group: "K1".to_string(),
                second_group: "K3".to_string(),
            })
        );
    }

    #[test]
    fn test_resolve_gap_names_missing_index() {
        let result = resolve_intersection(record(&[("K1", Some("0")), ("K2", Some("2"))]), None);
        assert_eq!(
            result,
            Err(ConvertError::IncompleteCoverage {
                intersection: "1/P1".to_string(),
                missing: vec![1],
            })
        );
    }

    #[test]
    fn test_resolve_prefers_index_table() {
        let table = IndexTable::from_reader("group,indices\nK2,0\nK1,1\n".as_bytes())
            .expect("valid table");
        let intersection = resolve_intersection(record(&[("K1", Some("0")), ("K2", None)]), Some(&table))
            .expect("table supplies both groups");
        assert_eq!(intersection.groups[0].indices, vec![1]);
        assert_eq!(intersection.groups[1].indices, vec![0]);
    }

    #[test]
    fn test_missing_indices() {
        assert_eq!(missing_indices([0, 1, 2].into_iter()), Vec::<usize>::new());
        assert_eq!(missing_indices([1, 4].into_iter()), vec![0, 2, 3]);
    }
}
