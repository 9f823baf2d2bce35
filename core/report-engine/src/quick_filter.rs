//! FILENAME: core/report-engine/src/quick_filter.rs
//! Quick-Filter Mutator - click a cell value to filter by it.
//!
//! Holds at most one item per field. An existing item is updated in place;
//! `isAnyOf` accumulates values into a list instead of replacing them.

use chrono::Utc;
use serde_json::Value;

use crate::definition::{FilterItem, FilterModel, FilterOperator};

/// Applies a quick filter, stamping new items with the current time.
pub fn apply_quick_filter(
    model: &FilterModel,
    field: &str,
    operator: FilterOperator,
    value: Value,
) -> FilterModel {
    apply_quick_filter_at(model, field, operator, value, Utc::now().timestamp_millis())
}

/// Same as [`apply_quick_filter`] with an explicit clock in epoch millis.
pub fn apply_quick_filter_at(
    model: &FilterModel,
    field: &str,
    operator: FilterOperator,
    value: Value,
    now_ms: i64,
) -> FilterModel {
    let mut next = model.clone();

    if let Some(item) = next.items.iter_mut().find(|item| item.field == field) {
        item.value = if operator.is_multi_value() {
            merge_values(std::mem::take(&mut item.value), value)
        } else {
            value
        };
        item.operator = operator;
        return next;
    }

    let value = if operator.is_multi_value() {
        merge_values(Value::Null, value)
    } else {
        value
    };
    let id = next_filter_id(&next, now_ms);
    next.items.push(FilterItem::new(field, operator, value, id));
    next
}

/// Drops the item for `field`. Other items keep their positions.
pub fn remove_quick_filter(model: &FilterModel, field: &str) -> FilterModel {
    let mut next = model.clone();
    next.items.retain(|item| item.field != field);
    next
}

/// A time-based id strictly greater than every id already in the model.
/// When the largest id is `u64::MAX` no greater id exists; the lowest
/// unused id from `now_ms` upwards (wrapping) is returned instead.
pub fn next_filter_id(model: &FilterModel, now_ms: i64) -> u64 {
    let now = u64::try_from(now_ms).unwrap_or(0);
    match model.items.iter().map(|item| item.id).max() {
        Some(max) if max >= now => max
            .checked_add(1)
            .unwrap_or_else(|| lowest_unused_id(model, now)),
        _ => now,
    }
}

fn lowest_unused_id(model: &FilterModel, from: u64) -> u64 {
    let mut id = from;
    while model.items.iter().any(|item| item.id == id) {
        id = id.wrapping_add(1);
    }
    id
}

/// Merges `incoming` (a scalar or a list) into `existing` without duplicates.
fn merge_values(existing: Value, incoming: Value) -> Value {
    let mut values = match existing {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    };

    let incoming = match incoming {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    };

    for value in incoming {
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Value::Array(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_first_click_adds_single_item() {
        let model = apply_quick_filter_at(&FilterModel::default(), "status", FilterOperator::Is, json!(1), NOW);
        assert_eq!(model.items.len(), 1);
        let item = &model.items[0];
        assert_eq!(item.field, "status");
        assert_eq!(item.operator, FilterOperator::Is);
        assert_eq!(item.value, json!(1));
        assert_eq!(item.id, NOW as u64);
    }

    #[test]
    fn test_second_click_replaces_value() {
        let model = apply_quick_filter_at(&FilterModel::default(), "status", FilterOperator::Is, json!(1), NOW);
        let model = apply_quick_filter_at(&model, "status", FilterOperator::Is, json!(2), NOW + 5);
        assert_eq!(model.items.len(), 1);
        assert_eq!(model.items[0].value, json!(2));
        assert_eq!(model.items[0].id, NOW as u64);
    }

    #[test]
    fn test_replace_keeps_positions() {
        let model = FilterModel::new(vec![
            FilterItem::new("country", FilterOperator::Equals, json!("SE"), 1),
            FilterItem::new("status", FilterOperator::Is, json!(1), 2),
            FilterItem::new("name", FilterOperator::StartsWith, json!("A"), 3),
        ]);
        let next = apply_quick_filter_at(&model, "status", FilterOperator::Not, json!(3), NOW);

        let fields: Vec<&str> = next.items.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["country", "status", "name"]);
        assert_eq!(next.items[1].operator, FilterOperator::Not);
        assert_eq!(next.items[0], model.items[0]);
        assert_eq!(next.items[2], model.items[2]);
    }

    #[test]
    fn test_is_any_of_merges_without_duplicates() {
        let model = apply_quick_filter_at(&FilterModel::default(), "genres", FilterOperator::IsAnyOf, json!("pop"), NOW);
        assert_eq!(model.items[0].value, json!(["pop"]));

        let model = apply_quick_filter_at(&model, "genres", FilterOperator::IsAnyOf, json!("rock"), NOW);
        let model = apply_quick_filter_at(&model, "genres", FilterOperator::IsAnyOf, json!(["pop", "jazz"]), NOW);
        assert_eq!(model.items.len(), 1);
        assert_eq!(model.items[0].value, json!(["pop", "rock", "jazz"]));
    }

    #[test]
    fn test_is_any_of_absorbs_scalar_value() {
        let model = FilterModel::new(vec![FilterItem::new("status", FilterOperator::Is, json!(1), 9)]);
        let next = apply_quick_filter_at(&model, "status", FilterOperator::IsAnyOf, json!(2), NOW);
        assert_eq!(next.items[0].operator, FilterOperator::IsAnyOf);
        assert_eq!(next.items[0].value, json!([1, 2]));
    }

    #[test]
    fn test_new_ids_are_strictly_increasing() {
        let model = FilterModel::new(vec![FilterItem::new("status", FilterOperator::Is, json!(1), NOW as u64 + 10)]);
        let next = apply_quick_filter_at(&model, "country", FilterOperator::Equals, json!("SE"), NOW);
        assert_eq!(next.items[1].id, NOW as u64 + 11);
        assert_eq!(next_filter_id(&FilterModel::default(), -1), 0);
    }

    #[test]
    fn test_max_id_does_not_overflow() {
        let model = FilterModel::new(vec![FilterItem::new("status", FilterOperator::Is, json!(1), u64::MAX)]);
        let next = apply_quick_filter_at(&model, "country", FilterOperator::Equals, json!("SE"), NOW);
        assert_eq!(next.items.len(), 2);
        assert_eq!(next.items[1].id, NOW as u64);

        let crowded = FilterModel::new(vec![
            FilterItem::new("status", FilterOperator::Is, json!(1), u64::MAX),
            FilterItem::new("tags", FilterOperator::Is, json!("a"), NOW as u64),
        ]);
        assert_eq!(next_filter_id(&crowded, NOW), NOW as u64 + 1);
    }

    #[test]
    fn test_remove_quick_filter() {
        let model = FilterModel::new(vec![
            FilterItem::new("country", FilterOperator::Equals, json!("SE"), 1),
            FilterItem::new("status", FilterOperator::Is, json!(1), 2),
        ]);
        let next = remove_quick_filter(&model, "country");
        assert_eq!(next.items.len(), 1);
        assert!(next.item_for("country").is_none());
        assert_eq!(remove_quick_filter(&next, "missing"), next);
    }

    #[test]
    fn test_source_model_untouched() {
        let model = FilterModel::default();
        let _ = apply_quick_filter(&model, "status", FilterOperator::Is, json!(1));
        assert!(model.is_empty());
    }
}
