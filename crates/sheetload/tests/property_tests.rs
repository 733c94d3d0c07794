//! Property-based tests for column mapping and batch validity.
//!
//! Property-based tests verify:
//! 1. **Mapping laws**: ordered specs map the i-th name to cell i
//! 2. **Stickiness**: the first recorded invalid row never changes
//! 3. **Idempotence**: repeated validity checks agree
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p sheetload --test property_tests
//! PROPTEST_CASES=10000 cargo test -p sheetload --test property_tests
//! ```

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::Value;

use sheetload::{ColumnMap, FieldRule, HeaderSpec, Row, RowCollection, RowSchema};

// =============================================================================
// Test Strategies
// =============================================================================

/// Distinct field names.
fn field_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z][a-z0-9_]{0,8}", 1..8)
        .prop_map(|set| set.into_iter().collect())
}

/// Cell values, a share of them blank.
fn cell() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just(String::new()),
        3 => "[a-z]{1,6}",
    ]
}

fn schema() -> Arc<RowSchema> {
    Arc::new(
        RowSchema::new(
            "props",
            &HeaderSpec::ordered(["key", "value"]),
            vec![FieldRule::required("key")],
        )
        .unwrap(),
    )
}

// =============================================================================
// Column mapping
// =============================================================================

proptest! {
    #[test]
    fn ordered_spec_maps_position(
        names in field_names(),
        cells in prop::collection::vec("[a-z0-9]{0,5}", 0..10),
    ) {
        let map = ColumnMap::new(&HeaderSpec::ordered(names.clone())).unwrap();
        let decoded = map.decode(&cells);

        prop_assert_eq!(decoded.len(), names.len());
        for (i, name) in names.iter().enumerate() {
            prop_assert_eq!(map.index(name), Some(i));
            prop_assert_eq!(decoded[name.as_str()].as_deref(), cells.get(i).map(String::as_str));
        }
    }

    #[test]
    fn indexed_spec_reads_declared_cell(
        names in field_names(),
        cells in prop::collection::vec("[a-z0-9]{1,5}", 0..12),
        offset in 0usize..4,
    ) {
        let pairs: Vec<(String, usize)> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i * 2 + offset))
            .collect();
        let map = ColumnMap::new(&HeaderSpec::indexed(pairs.clone())).unwrap();
        let decoded = map.decode(&cells);

        for (name, index) in &pairs {
            prop_assert_eq!(decoded[name.as_str()].as_deref(), cells.get(*index).map(String::as_str));
        }
    }

    #[test]
    fn scalar_column_values_are_rejected(value in prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z,]{0,12}".prop_map(Value::from),
        Just(Value::Null),
    ]) {
        let err = HeaderSpec::from_value(&value).unwrap_err();
        prop_assert!(err.is_config());
    }
}

// =============================================================================
// Batch validity
// =============================================================================

proptest! {
    #[test]
    fn first_invalid_row_is_sticky(
        keys in prop::collection::vec(cell(), 0..20),
        later in prop::collection::vec(cell(), 0..5),
    ) {
        let schema = schema();
        let mut rows = RowCollection::new();
        for (i, key) in keys.iter().enumerate() {
            rows.append(Row::from_cells(&schema, i + 2, &[key.as_str(), "v"]));
        }

        let expected = keys.iter().position(|k| k.is_empty());
        prop_assert_eq!(rows.is_valid(), expected.is_none());
        prop_assert_eq!(rows.invalid_index(), expected);

        for key in &later {
            rows.append(Row::from_cells(&schema, rows.len() + 2, &[key.as_str(), "v"]));
        }
        let _ = rows.check_unique("value");

        if let Some(first) = expected {
            prop_assert_eq!(rows.invalid_index(), Some(first));
            prop_assert!(!rows.is_valid());
        }
    }

    #[test]
    fn validity_is_idempotent(keys in prop::collection::vec(cell(), 0..20)) {
        let schema = schema();
        let mut rows = RowCollection::new();
        for (i, key) in keys.iter().enumerate() {
            rows.append(Row::from_cells(&schema, i + 2, &[key.as_str(), "v"]));
        }

        let first = rows.is_valid();
        let index = rows.invalid_index();
        prop_assert_eq!(rows.is_valid(), first);
        prop_assert_eq!(rows.invalid_index(), index);
        prop_assert_eq!(rows.full_messages(), rows.full_messages());
    }

    #[test]
    fn unique_check_flags_first_repeat(keys in prop::collection::vec("[a-c]", 0..10)) {
        let schema = schema();
        let mut rows = RowCollection::new();
        for (i, key) in keys.iter().enumerate() {
            rows.append(Row::from_cells(&schema, i + 2, &[key.as_str(), "v"]));
        }

        let expected = keys
            .iter()
            .enumerate()
            .position(|(i, k)| keys[..i].contains(k));
        prop_assert_eq!(rows.check_unique("key"), expected);
        prop_assert_eq!(rows.is_valid(), expected.is_none());
    }
}
