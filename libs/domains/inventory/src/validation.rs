//! Input validation for inventory payloads.
//!
//! Payloads arrive as raw JSON objects so that every problem can be reported
//! at once: a structural pass checks names, nulls and types field by field,
//! then the typed values go through `validator` rules for lengths, ranges and
//! formats. Violations from both passes are returned together, ordered the way
//! the fields are declared on the item.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors};

use crate::error::FieldViolation;
use crate::models::{Category, CreateInventoryItem, UpdateInventoryItem};

static ITEM_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

static BARCODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{8,13}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Integer,
    Decimal,
    Date,
    Category,
}

struct FieldSpec {
    /// Wire name
    name: &'static str,
    /// Struct field name reported by `validator`
    rust_name: &'static str,
    kind: Kind,
    required: bool,
}

const fn field(name: &'static str, rust_name: &'static str, kind: Kind, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        rust_name,
        kind,
        required,
    }
}

const FIELDS: &[FieldSpec] = &[
    field("itemId", "item_id", Kind::Text, true),
    field("category", "category", Kind::Category, true),
    field("subCategory", "sub_category", Kind::Text, true),
    field("brand", "brand", Kind::Text, true),
    field("model", "model", Kind::Text, true),
    field("description", "description", Kind::Text, false),
    field("quantity", "quantity", Kind::Integer, true),
    field("unitPrice", "unit_price", Kind::Decimal, true),
    field("productionDate", "production_date", Kind::Date, false),
    field("expiryDate", "expiry_date", Kind::Date, false),
    field("supplier", "supplier", Kind::Text, false),
    field("storageLocation", "storage_location", Kind::Text, false),
    field("reorderLevel", "reorder_level", Kind::Integer, false),
    field("barcode", "barcode", Kind::Text, false),
    field("notes", "notes", Kind::Text, false),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// Typed view of a structurally valid payload
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct FieldValues {
    #[validate(regex(
        path = *ITEM_ID_PATTERN,
        message = "may only contain letters, digits, hyphens and underscores"
    ))]
    item_id: Option<String>,
    category: Option<Category>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    sub_category: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    brand: Option<String>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    model: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    description: Option<String>,
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    quantity: Option<i64>,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    unit_price: Option<f64>,
    production_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    supplier: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    storage_location: Option<String>,
    #[validate(range(min = 0, message = "must be a non-negative integer"))]
    reorder_level: Option<i64>,
    #[validate(regex(path = *BARCODE_PATTERN, message = "must be 8 to 13 digits"))]
    barcode: Option<String>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    notes: Option<String>,
}

/// Result of the structural pass
struct Checked {
    values: FieldValues,
    /// Optional fields the client explicitly set to `null`
    cleared: HashSet<&'static str>,
}

/// Validate a create payload: all required fields must be present.
pub fn validate_create(
    payload: &Map<String, Value>,
) -> Result<CreateInventoryItem, Vec<FieldViolation>> {
    let Checked { values, .. } = check(payload, Mode::Create)?;

    let missing = |name: &str| {
        vec![FieldViolation::new(
            name,
            Value::Null,
            format!("{} is required", name),
        )]
    };

    Ok(CreateInventoryItem {
        item_id: values.item_id.ok_or_else(|| missing("itemId"))?,
        category: values.category.ok_or_else(|| missing("category"))?,
        sub_category: values.sub_category.ok_or_else(|| missing("subCategory"))?,
        brand: values.brand.ok_or_else(|| missing("brand"))?,
        model: values.model.ok_or_else(|| missing("model"))?,
        description: values.description,
        quantity: values.quantity.ok_or_else(|| missing("quantity"))?,
        unit_price: values.unit_price.ok_or_else(|| missing("unitPrice"))?,
        production_date: values.production_date,
        expiry_date: values.expiry_date,
        supplier: values.supplier,
        storage_location: values.storage_location,
        reorder_level: values.reorder_level,
        barcode: values.barcode,
        notes: values.notes,
    })
}

/// Validate a partial update: only fields present are checked.
///
/// `null` on an optional field clears it; `null` on a required field is
/// rejected. Date ordering is only checked here when both dates are in the
/// payload; the caller re-checks against the merged record.
pub fn validate_update(
    payload: &Map<String, Value>,
) -> Result<UpdateInventoryItem, Vec<FieldViolation>> {
    if payload.is_empty() {
        return Err(vec![FieldViolation::new(
            "body",
            Value::Object(Map::new()),
            "update payload must contain at least one field",
        )]);
    }

    let Checked { values, cleared } = check(payload, Mode::Update)?;

    Ok(UpdateInventoryItem {
        item_id: values.item_id,
        category: values.category,
        sub_category: values.sub_category,
        brand: values.brand,
        model: values.model,
        description: optional(values.description, &cleared, "description"),
        quantity: values.quantity,
        unit_price: values.unit_price,
        production_date: optional(values.production_date, &cleared, "productionDate"),
        expiry_date: optional(values.expiry_date, &cleared, "expiryDate"),
        supplier: optional(values.supplier, &cleared, "supplier"),
        storage_location: optional(values.storage_location, &cleared, "storageLocation"),
        reorder_level: optional(values.reorder_level, &cleared, "reorderLevel"),
        barcode: optional(values.barcode, &cleared, "barcode"),
        notes: optional(values.notes, &cleared, "notes"),
    })
}

fn optional<T>(value: Option<T>, cleared: &HashSet<&str>, name: &str) -> Option<Option<T>> {
    if cleared.contains(name) {
        Some(None)
    } else {
        value.map(Some)
    }
}

/// Validate the body of a quantity update: exactly `{ "quantity": <integer> }`.
///
/// Negative values pass; the repository rejects them as an invalid argument.
pub fn validate_quantity(payload: &Map<String, Value>) -> Result<i64, Vec<FieldViolation>> {
    let mut violations: Vec<FieldViolation> = payload
        .iter()
        .filter(|(name, _)| name.as_str() != "quantity")
        .map(|(name, value)| {
            FieldViolation::new(name, value.clone(), format!("{} is not allowed", name))
        })
        .collect();

    let quantity = match payload.get("quantity") {
        None => {
            violations.push(FieldViolation::new(
                "quantity",
                Value::Null,
                "quantity is required",
            ));
            None
        }
        Some(value) => match value.as_i64() {
            Some(quantity) => Some(quantity),
            None => {
                violations.push(FieldViolation::new(
                    "quantity",
                    value.clone(),
                    "quantity must be an integer",
                ));
                None
            }
        },
    };

    match quantity {
        Some(quantity) if violations.is_empty() => Ok(quantity),
        _ => Err(violations),
    }
}

/// `expiryDate` must be strictly after `productionDate`; passes when either is absent.
pub fn check_date_order(
    production_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
) -> Result<(), FieldViolation> {
    match (production_date, expiry_date) {
        (Some(production), Some(expiry)) if expiry <= production => Err(FieldViolation::new(
            "expiryDate",
            Value::String(expiry.to_string()),
            "expiryDate must be after productionDate",
        )),
        _ => Ok(()),
    }
}

fn check(payload: &Map<String, Value>, mode: Mode) -> Result<Checked, Vec<FieldViolation>> {
    let mut violations = Vec::new();
    let mut sanitized = Map::new();
    let mut cleared = HashSet::new();

    for (name, value) in payload {
        let Some(field) = FIELDS.iter().find(|field| field.name == name) else {
            violations.push(FieldViolation::new(
                name,
                value.clone(),
                format!("{} is not allowed", name),
            ));
            continue;
        };

        if value.is_null() {
            if field.required {
                violations.push(FieldViolation::new(
                    field.name,
                    Value::Null,
                    format!("{} cannot be null", field.name),
                ));
            } else if mode == Mode::Update {
                cleared.insert(field.name);
            }
            continue;
        }

        match normalize(field, value) {
            Ok(normalized) => {
                sanitized.insert(field.name.to_string(), normalized);
            }
            Err(reason) => violations.push(FieldViolation::new(field.name, value.clone(), reason)),
        }
    }

    if mode == Mode::Create {
        for field in FIELDS.iter().filter(|field| field.required) {
            if !payload.contains_key(field.name) {
                violations.push(FieldViolation::new(
                    field.name,
                    Value::Null,
                    format!("{} is required", field.name),
                ));
            }
        }
    }

    let values: FieldValues = match serde_json::from_value(Value::Object(sanitized)) {
        Ok(values) => values,
        Err(e) => {
            violations.push(FieldViolation::new(
                "body",
                Value::Object(payload.clone()),
                format!("payload could not be read: {}", e),
            ));
            return Err(ordered(violations));
        }
    };

    if let Err(errors) = values.validate() {
        collect_rule_violations(&errors, payload, &mut violations);
    }

    let dates_clean = !violations
        .iter()
        .any(|v| v.field == "productionDate" || v.field == "expiryDate");
    if dates_clean {
        if let Err(violation) = check_date_order(values.production_date, values.expiry_date) {
            violations.push(violation);
        }
    }

    if violations.is_empty() {
        Ok(Checked { values, cleared })
    } else {
        Err(ordered(violations))
    }
}

/// Coerce one non-null raw value into the shape `FieldValues` expects
fn normalize(field: &FieldSpec, value: &Value) -> Result<Value, String> {
    match field.kind {
        Kind::Text => {
            let text = value
                .as_str()
                .ok_or_else(|| format!("{} must be a string", field.name))?
                .trim();
            if field.required && text.is_empty() {
                return Err(format!("{} cannot be empty", field.name));
            }
            Ok(Value::String(text.to_string()))
        }
        Kind::Integer => value
            .as_i64()
            .map(Value::from)
            .ok_or_else(|| format!("{} must be an integer", field.name)),
        Kind::Decimal => value
            .as_f64()
            .map(Value::from)
            .ok_or_else(|| format!("{} must be a number", field.name)),
        Kind::Date => value
            .as_str()
            .and_then(parse_date)
            .map(|date| Value::String(date.to_string()))
            .ok_or_else(|| format!("{} must be a valid date (YYYY-MM-DD)", field.name)),
        Kind::Category => value
            .as_str()
            .and_then(|s| Category::from_str(s).ok())
            .map(|category| Value::String(category.to_string()))
            .ok_or_else(|| format!("category must be one of: {}", Category::valid_values())),
    }
}

/// Accepts a calendar date or a full RFC 3339 timestamp.
///
/// Years are limited to 0000-9999 so stored dates keep their four-digit
/// `YYYY-MM-DD` form and compare correctly as strings.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .filter(|date| (0..=9999).contains(&date.year()))
}

fn collect_rule_violations(
    errors: &ValidationErrors,
    payload: &Map<String, Value>,
    violations: &mut Vec<FieldViolation>,
) {
    for (rust_name, field_errors) in errors.field_errors() {
        let Some(field) = FIELDS.iter().find(|field| field.rust_name == rust_name) else {
            continue;
        };
        if violations.iter().any(|v| v.field == field.name) {
            continue;
        }
        let Some(error) = field_errors.first() else {
            continue;
        };

        let message = error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("is invalid ({})", error.code));

        violations.push(FieldViolation::new(
            field.name,
            payload.get(field.name).cloned().unwrap_or(Value::Null),
            format!("{} {}", field.name, message),
        ));
    }
}

fn ordered(mut violations: Vec<FieldViolation>) -> Vec<FieldViolation> {
    let position = |name: &str| {
        FIELDS
            .iter()
            .position(|field| field.name == name)
            .unwrap_or(FIELDS.len())
    };
    violations.sort_by_key(|v| position(&v.field));
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn valid_payload() -> Map<String, Value> {
        object(json!({
            "itemId": "IMP-001",
            "category": "Implant & Abutment Components",
            "subCategory": "Abutments",
            "brand": "Nobel Biocare",
            "model": "Multi-unit",
            "quantity": 10,
            "unitPrice": 150
        }))
    }

    fn fields(violations: &[FieldViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_create_accepts_minimal_payload() {
        let item = validate_create(&valid_payload()).unwrap();
        assert_eq!(item.item_id, "IMP-001");
        assert_eq!(item.category, Category::ImplantAbutmentComponents);
        assert_eq!(item.quantity, 10);
        assert_eq!(item.unit_price, 150.0);
        assert_eq!(item.expiry_date, None);
    }

    #[test]
    fn test_create_trims_and_normalizes() {
        let mut payload = valid_payload();
        payload.insert("brand".into(), json!("  Straumann  "));
        payload.insert("expiryDate".into(), json!("2027-01-31T10:00:00Z"));
        payload.insert("barcode".into(), json!("12345678"));

        let item = validate_create(&payload).unwrap();
        assert_eq!(item.brand, "Straumann");
        assert_eq!(item.expiry_date, NaiveDate::from_ymd_opt(2027, 1, 31));
        assert_eq!(item.barcode.as_deref(), Some("12345678"));
    }

    #[test]
    fn test_create_reports_every_missing_required_field() {
        let violations = validate_create(&Map::new()).unwrap_err();
        assert_eq!(
            fields(&violations),
            vec![
                "itemId",
                "category",
                "subCategory",
                "brand",
                "model",
                "quantity",
                "unitPrice"
            ]
        );
        assert_eq!(violations[0].reason, "itemId is required");
        assert_eq!(violations[0].value, Value::Null);
    }

    #[test]
    fn test_each_missing_required_field_is_rejected() {
        for name in [
            "itemId",
            "category",
            "subCategory",
            "brand",
            "model",
            "quantity",
            "unitPrice",
        ] {
            let mut payload = valid_payload();
            payload.remove(name);
            let violations = validate_create(&payload).unwrap_err();
            assert_eq!(fields(&violations), vec![name], "missing {}", name);
        }
    }

    #[test]
    fn test_collects_all_violations_together() {
        let mut payload = valid_payload();
        payload.insert("itemId".into(), json!("IMP 001!"));
        payload.insert("quantity".into(), json!(-3));
        payload.insert("barcode".into(), json!("12ab"));
        payload.insert("color".into(), json!("blue"));

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(fields(&violations), vec!["itemId", "quantity", "barcode", "color"]);
        assert_eq!(
            violations[0].reason,
            "itemId may only contain letters, digits, hyphens and underscores"
        );
        assert_eq!(violations[0].value, json!("IMP 001!"));
        assert_eq!(violations[1].reason, "quantity must be a non-negative integer");
        assert_eq!(violations[2].reason, "barcode must be 8 to 13 digits");
        assert_eq!(violations[3].reason, "color is not allowed");
    }

    #[test]
    fn test_category_error_lists_valid_values() {
        let mut payload = valid_payload();
        payload.insert("category".into(), json!("IMPLANT"));

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(fields(&violations), vec!["category"]);
        assert!(violations[0].reason.starts_with("category must be one of: "));
        assert!(violations[0].reason.contains("Office & Miscellaneous Supplies"));
    }

    #[test]
    fn test_type_mismatches() {
        let mut payload = valid_payload();
        payload.insert("quantity".into(), json!("ten"));
        payload.insert("unitPrice".into(), json!(true));
        payload.insert("model".into(), json!(42));
        payload.insert("productionDate".into(), json!("2026-02-30"));

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(
            fields(&violations),
            vec!["model", "quantity", "unitPrice", "productionDate"]
        );
        assert_eq!(violations[0].reason, "model must be a string");
        assert_eq!(violations[1].reason, "quantity must be an integer");
        assert_eq!(violations[2].reason, "unitPrice must be a number");
        assert_eq!(
            violations[3].reason,
            "productionDate must be a valid date (YYYY-MM-DD)"
        );
    }

    #[test]
    fn test_length_ceilings() {
        let mut payload = valid_payload();
        payload.insert("brand".into(), json!("x".repeat(101)));
        payload.insert("description".into(), json!("x".repeat(501)));
        payload.insert("notes".into(), json!("x".repeat(1000)));

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(fields(&violations), vec!["brand", "description"]);
        assert_eq!(violations[1].reason, "description must be at most 500 characters");
    }

    #[test]
    fn test_long_item_id_is_accepted() {
        let mut payload = valid_payload();
        let item_id = format!("IMP-{}", "9".repeat(80));
        payload.insert("itemId".into(), json!(item_id));

        let item = validate_create(&payload).unwrap();
        assert_eq!(item.item_id, item_id);
    }

    #[test]
    fn test_dates_beyond_year_9999_are_rejected() {
        let mut payload = valid_payload();
        payload.insert("expiryDate".into(), json!("10000-01-01"));
        payload.insert("productionDate".into(), json!("+10240-07-09"));

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(fields(&violations), vec!["productionDate", "expiryDate"]);
        assert_eq!(
            violations[1].reason,
            "expiryDate must be a valid date (YYYY-MM-DD)"
        );
    }

    #[test]
    fn test_blank_required_text_is_rejected() {
        let mut payload = valid_payload();
        payload.insert("subCategory".into(), json!("   "));

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(violations[0].reason, "subCategory cannot be empty");
    }

    #[test]
    fn test_date_order_rejected_when_not_after() {
        for expiry in ["2026-01-01", "2025-12-31"] {
            let mut payload = valid_payload();
            payload.insert("productionDate".into(), json!("2026-01-01"));
            payload.insert("expiryDate".into(), json!(expiry));

            let violations = validate_create(&payload).unwrap_err();
            assert_eq!(fields(&violations), vec!["expiryDate"]);
            assert_eq!(violations[0].reason, "expiryDate must be after productionDate");
        }
    }

    #[test]
    fn test_date_order_skipped_when_one_side_absent() {
        let mut payload = valid_payload();
        payload.insert("expiryDate".into(), json!("2020-01-01"));
        assert!(validate_create(&payload).is_ok());

        let mut payload = valid_payload();
        payload.insert("productionDate".into(), json!("2030-01-01"));
        assert!(validate_create(&payload).is_ok());

        assert!(check_date_order(None, None).is_ok());
    }

    #[test]
    fn test_create_rejects_null_required_and_ignores_null_optional() {
        let mut payload = valid_payload();
        payload.insert("notes".into(), Value::Null);
        assert_eq!(validate_create(&payload).unwrap().notes, None);

        payload.insert("brand".into(), Value::Null);
        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(violations[0].reason, "brand cannot be null");
    }

    #[test]
    fn test_server_fields_are_not_allowed() {
        let mut payload = valid_payload();
        payload.insert("id".into(), json!("0191c3a6-0000-7000-8000-000000000000"));
        payload.insert("createdAt".into(), json!("2026-01-01T00:00:00Z"));

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| v.reason.ends_with("is not allowed")));
    }

    #[test]
    fn test_update_only_checks_present_fields() {
        let update = validate_update(&object(json!({ "quantity": 4 }))).unwrap();
        assert_eq!(update.quantity, Some(4));
        assert_eq!(update.item_id, None);
        assert_eq!(update.notes, None);
    }

    #[test]
    fn test_update_null_clears_optional_field() {
        let update =
            validate_update(&object(json!({ "reorderLevel": null, "notes": "shelf B" }))).unwrap();
        assert_eq!(update.reorder_level, Some(None));
        assert_eq!(update.notes, Some(Some("shelf B".to_string())));

        let violations = validate_update(&object(json!({ "unitPrice": null }))).unwrap_err();
        assert_eq!(violations[0].reason, "unitPrice cannot be null");
    }

    #[test]
    fn test_update_rejects_empty_payload() {
        let violations = validate_update(&Map::new()).unwrap_err();
        assert_eq!(fields(&violations), vec!["body"]);
    }

    #[test]
    fn test_update_applies_same_rules() {
        let violations = validate_update(&object(json!({
            "category": "Toothbrushes",
            "unitPrice": -1.5,
            "size": "M"
        })))
        .unwrap_err();
        assert_eq!(fields(&violations), vec!["category", "unitPrice", "size"]);
        assert_eq!(violations[1].reason, "unitPrice must be a non-negative number");
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(&object(json!({ "quantity": 7 }))).unwrap(), 7);
        assert_eq!(validate_quantity(&object(json!({ "quantity": -1 }))).unwrap(), -1);

        let violations = validate_quantity(&Map::new()).unwrap_err();
        assert_eq!(violations[0].reason, "quantity is required");

        let violations =
            validate_quantity(&object(json!({ "quantity": 1.5, "brand": "x" }))).unwrap_err();
        assert_eq!(fields(&violations), vec!["brand", "quantity"]);
    }
}
