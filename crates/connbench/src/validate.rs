//! Checks on extracted attributes
//!
//! Every check returns [`HarnessError::Validation`] on the first mismatch.
//! Callers abort the run on failure.

use crate::error::{HarnessError, HarnessResult};
use connbench_kernel::{Attribute, ConnectionAttributes};

fn column_len(attrs: &ConnectionAttributes, attr: Attribute) -> HarnessResult<usize> {
    attrs
        .get(attr)
        .map(|c| c.len())
        .ok_or_else(|| HarnessError::validation("missing", format!("attribute '{}' was not extracted", attr.name())))
}

/// All `required` columns are present and equally long; returns that length
pub fn check_lengths(attrs: &ConnectionAttributes, required: &[Attribute]) -> HarnessResult<usize> {
    let Some((&first, rest)) = required.split_first() else {
        return Ok(0);
    };
    let expected = column_len(attrs, first)?;
    for &attr in rest {
        let len = column_len(attrs, attr)?;
        if len != expected {
            return Err(HarnessError::validation(
                "length",
                format!("{} has {} values but {} has {}", attr.name(), len, first.name(), expected),
            ));
        }
    }
    Ok(expected)
}

/// Exactly `expected` edges were returned for `attr`
pub fn check_edge_count(attrs: &ConnectionAttributes, attr: Attribute, expected: usize) -> HarnessResult<()> {
    let len = column_len(attrs, attr)?;
    if len != expected {
        return Err(HarnessError::validation(
            "edge count",
            format!("expected {} edges, got {}", expected, len),
        ));
    }
    Ok(())
}

/// `source[i] + offset == target[i]` for every edge
pub fn check_offset(attrs: &ConnectionAttributes, offset: u64) -> HarnessResult<()> {
    check_lengths(attrs, &[Attribute::Source, Attribute::Target])?;
    let (sources, targets) = match (attrs.sources(), attrs.targets()) {
        (Some(s), Some(t)) => (s, t),
        _ => return Err(HarnessError::validation("offset", "source/target are not id columns")),
    };
    for (i, (&s, &t)) in sources.iter().zip(targets).enumerate() {
        if s + offset != t {
            return Err(HarnessError::validation(
                "offset",
                format!("edge {}: source {} + {} != target {}", i, s, offset, t),
            ));
        }
    }
    Ok(())
}

/// `weight[i] == expected(i)` for every edge
pub fn check_weights(attrs: &ConnectionAttributes, expected: impl Fn(usize) -> f64) -> HarnessResult<()> {
    let weights = attrs
        .weights()
        .ok_or_else(|| HarnessError::validation("weight", "weight was not extracted"))?;
    for (i, &w) in weights.iter().enumerate() {
        let want = expected(i);
        if w != want {
            return Err(HarnessError::validation(
                "weight",
                format!("edge {}: weight {} != expected {}", i, w, want),
            ));
        }
    }
    Ok(())
}

/// Two extractions returned the same columns and values
pub fn check_identical(reference: &ConnectionAttributes, candidate: &ConnectionAttributes) -> HarnessResult<()> {
    for (attr, column) in reference.iter() {
        match candidate.get(attr) {
            Some(other) if other == column => {}
            Some(_) => {
                return Err(HarnessError::validation(
                    "strategy identity",
                    format!("{} differs between extraction strategies", attr.name()),
                ))
            }
            None => {
                return Err(HarnessError::validation(
                    "strategy identity",
                    format!("{} missing from second extraction", attr.name()),
                ))
            }
        }
    }
    if reference.len() != candidate.len() {
        return Err(HarnessError::validation(
            "strategy identity",
            format!("{} columns vs {}", reference.len(), candidate.len()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use connbench_kernel::AttributeColumn;

    fn attrs(sources: Vec<u64>, targets: Vec<u64>, weights: Vec<f64>) -> ConnectionAttributes {
        [
            (Attribute::Source, AttributeColumn::Ids(sources)),
            (Attribute::Target, AttributeColumn::Ids(targets)),
            (Attribute::Weight, AttributeColumn::Floats(weights)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_offset_pattern() {
        let good = attrs(vec![1, 2, 3], vec![101, 102, 103], vec![0.0, 0.1, 0.2]);
        assert!(check_offset(&good, 100).is_ok());
        assert!(check_offset(&good, 99).is_err());
        assert_eq!(
            check_lengths(&good, &[Attribute::Source, Attribute::Target, Attribute::Weight]).unwrap(),
            3
        );
    }

    #[test]
    fn test_length_mismatch() {
        let bad = attrs(vec![1, 2], vec![101], vec![0.0, 0.1]);
        let err = check_lengths(&bad, &[Attribute::Source, Attribute::Target]).unwrap_err();
        assert!(matches!(err, HarnessError::Validation { check: "length", .. }));
        assert!(check_offset(&bad, 100).is_err());
    }

    #[test]
    fn test_weight_pattern() {
        let good = attrs(vec![1, 2, 3], vec![101, 102, 103], vec![0.0, 0.1, 0.2]);
        assert!(check_weights(&good, |i| i as f64 / 10.0).is_ok());
        assert!(check_weights(&good, |i| i as f64).is_err());
    }

    #[test]
    fn test_missing_column() {
        let only_sources: ConnectionAttributes =
            [(Attribute::Source, AttributeColumn::Ids(vec![1]))].into_iter().collect();
        assert!(check_edge_count(&only_sources, Attribute::Source, 1).is_ok());
        assert!(check_edge_count(&only_sources, Attribute::Target, 1).is_err());
        assert!(check_weights(&only_sources, |_| 0.0).is_err());
    }

    #[test]
    fn test_identical() {
        let a = attrs(vec![1], vec![2], vec![0.5]);
        let b = attrs(vec![1], vec![2], vec![0.5]);
        let c = attrs(vec![1], vec![3], vec![0.5]);
        assert!(check_identical(&a, &b).is_ok());
        assert!(check_identical(&a, &c).is_err());
    }
}
