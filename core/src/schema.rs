//! Record shapes and the structural validator.
//!
//! A [`Schema`] is an ordered list of named fields. Each field carries a
//! description that is forwarded to the model to steer its output; the
//! validator itself only looks at names and kinds.

use serde_json::{json, Map, Value};

use crate::error::{SchemaMismatchError, ValidationError, Violation};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    List(Box<FieldKind>),
    Record(Schema),
}

impl FieldKind {
    pub fn list_of(item: FieldKind) -> Self {
        FieldKind::List(Box::new(item))
    }

    fn expected(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Number => "number",
            FieldKind::List(_) => "list",
            FieldKind::Record(_) => "record",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

impl Field {
    pub fn new(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
        }
    }

    pub fn text(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::Text, description)
    }

    pub fn text_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldKind::list_of(FieldKind::Text), description)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

/// Input text fields are free text the user must fill in; model output
/// strings only need to be strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Input,
    Output,
}

type Fault = (String, Violation);

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// JSON-Schema rendering handed to the backend as the output contract.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = kind_to_json_schema(&field.kind);
            if let Value::Object(obj) = &mut prop {
                obj.insert("description".into(), Value::String(field.description.into()));
            }
            properties.insert(field.name.into(), prop);
        }
        let required: Vec<&str> = self.field_names().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    fn check_record(&self, value: &Value, path: &str, mode: Mode) -> Result<(), Fault> {
        let obj = value.as_object().ok_or_else(|| {
            (
                display_path(path),
                Violation::WrongType {
                    expected: "record",
                    found: type_name(value),
                },
            )
        })?;

        for field in &self.fields {
            let field_path = join_field(path, field.name);
            match obj.get(field.name) {
                None | Some(Value::Null) => return Err((field_path, Violation::Missing)),
                Some(v) => check_value(&field.kind, v, &field_path, mode)?,
            }
        }
        // Unknown keys are left alone.
        Ok(())
    }
}

fn kind_to_json_schema(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Text => json!({ "type": "string" }),
        FieldKind::Number => json!({ "type": "number" }),
        FieldKind::List(item) => json!({ "type": "array", "items": kind_to_json_schema(item) }),
        FieldKind::Record(schema) => schema.to_json_schema(),
    }
}

fn check_value(kind: &FieldKind, value: &Value, path: &str, mode: Mode) -> Result<(), Fault> {
    let wrong_type = || {
        (
            path.to_string(),
            Violation::WrongType {
                expected: kind.expected(),
                found: type_name(value),
            },
        )
    };

    match kind {
        FieldKind::Text => {
            let s = value.as_str().ok_or_else(wrong_type)?;
            if mode == Mode::Input && s.trim().is_empty() {
                return Err((path.to_string(), Violation::Blank));
            }
            Ok(())
        }
        FieldKind::Number => {
            let n = value.as_f64().ok_or_else(wrong_type)?;
            if !n.is_finite() {
                return Err((path.to_string(), Violation::NonFinite));
            }
            Ok(())
        }
        FieldKind::List(item) => {
            let items = value.as_array().ok_or_else(wrong_type)?;
            for (i, v) in items.iter().enumerate() {
                check_value(item, v, &format!("{}[{}]", path, i), mode)?;
            }
            Ok(())
        }
        FieldKind::Record(schema) => schema.check_record(value, path, mode),
    }
}

fn join_field(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "record",
    }
}

/// Checks a candidate input record. Required text must be non-blank;
/// opaque JSON-bearing fields are only checked as text.
pub fn validate_input(schema: &Schema, candidate: &Value) -> Result<Map<String, Value>, ValidationError> {
    schema
        .check_record(candidate, "", Mode::Input)
        .map_err(|(path, violation)| ValidationError { path, violation })?;
    Ok(candidate.as_object().cloned().unwrap_or_default())
}

/// Checks a model payload against the declared output shape, recursively.
pub fn validate_output(
    schema: &Schema,
    candidate: &Value,
) -> Result<Map<String, Value>, SchemaMismatchError> {
    schema
        .check_record(candidate, "", Mode::Output)
        .map_err(|(path, violation)| SchemaMismatchError { path, violation })?;
    Ok(candidate.as_object().cloned().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share_schema() -> Schema {
        Schema::new(vec![
            Field::text("marketSummary", "summary"),
            Field::new(
                "marketShare",
                FieldKind::list_of(FieldKind::Record(Schema::new(vec![
                    Field::text("company", "company"),
                    Field::new("share", FieldKind::Number, "share"),
                ]))),
                "shares",
            ),
            Field::text_list("keyTrends", "trends"),
        ])
    }

    fn share_payload() -> Value {
        json!({
            "marketSummary": "Premium pet food keeps growing.",
            "marketShare": [
                { "company": "A", "share": 40 },
                { "company": "B", "share": 30 }
            ],
            "keyTrends": ["humanization"]
        })
    }

    #[test]
    fn accepts_well_formed_market_share() {
        let record = validate_output(&share_schema(), &share_payload()).unwrap();
        assert_eq!(Value::Object(record), share_payload());
    }

    #[test]
    fn missing_nested_field_is_a_mismatch() {
        let mut payload = share_payload();
        payload["marketShare"][1]
            .as_object_mut()
            .unwrap()
            .remove("share");

        let err = validate_output(&share_schema(), &payload).unwrap_err();
        assert_eq!(err.path, "marketShare[1].share");
        assert_eq!(err.violation, Violation::Missing);
    }

    #[test]
    fn string_where_list_required_is_a_mismatch() {
        let mut payload = share_payload();
        payload["keyTrends"] = json!("humanization");

        let err = validate_output(&share_schema(), &payload).unwrap_err();
        assert_eq!(err.path, "keyTrends");
        assert_eq!(
            err.violation,
            Violation::WrongType {
                expected: "list",
                found: "string"
            }
        );
    }

    #[test]
    fn extra_output_fields_are_ignored() {
        let mut payload = share_payload();
        payload["confidence"] = json!("high");
        assert!(validate_output(&share_schema(), &payload).is_ok());
    }

    #[test]
    fn output_validation_is_idempotent() {
        let first = validate_output(&share_schema(), &share_payload()).unwrap();
        let second = validate_output(&share_schema(), &Value::Object(first.clone())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn blank_and_whitespace_input_are_rejected() {
        let schema = Schema::new(vec![Field::text("topic", "topic")]);

        for candidate in [json!({ "topic": "" }), json!({ "topic": "  \t\n" })] {
            let err = validate_input(&schema, &candidate).unwrap_err();
            assert_eq!(err.path, "topic");
            assert_eq!(err.violation, Violation::Blank);
        }
    }

    #[test]
    fn wrong_primitive_kind_in_input_is_rejected() {
        let schema = Schema::new(vec![
            Field::text("timePeriod", "period"),
            Field::text("salesData", "json"),
        ]);

        let err = validate_input(&schema, &json!({ "timePeriod": 5, "salesData": "[]" })).unwrap_err();
        assert_eq!(err.path, "timePeriod");
        assert_eq!(
            err.violation,
            Violation::WrongType {
                expected: "string",
                found: "number"
            }
        );

        let err = validate_input(&schema, &json!({ "timePeriod": "Q2", "salesData": [] })).unwrap_err();
        assert_eq!(err.path, "salesData");
        assert_eq!(
            err.violation,
            Violation::WrongType {
                expected: "string",
                found: "list"
            }
        );
    }

    #[test]
    fn number_input_accepts_any_finite_value() {
        let schema = Schema::new(vec![Field::new("budget", FieldKind::Number, "budget")]);

        for candidate in [json!({ "budget": 0 }), json!({ "budget": -12.5 }), json!({ "budget": 1e300 })] {
            assert_eq!(
                Value::Object(validate_input(&schema, &candidate).unwrap()),
                candidate
            );
        }

        let err = validate_input(&schema, &json!({ "budget": "20000" })).unwrap_err();
        assert_eq!(
            err.violation,
            Violation::WrongType {
                expected: "number",
                found: "string"
            }
        );
    }

    #[test]
    fn nested_record_is_checked_recursively() {
        let schema = Schema::new(vec![
            Field::text("campaignSummary", "summary"),
            Field::new(
                "keyMetrics",
                FieldKind::Record(Schema::new(vec![
                    Field::text("roi", "roi"),
                    Field::text("cpa", "cpa"),
                    Field::text("spendVsBudget", "spend"),
                ])),
                "metrics",
            ),
        ]);

        let err = validate_output(
            &schema,
            &json!({
                "campaignSummary": "Email led",
                "keyMetrics": { "roi": "614%", "spendVsBudget": "95%" }
            }),
        )
        .unwrap_err();
        assert_eq!(err.path, "keyMetrics.cpa");
        assert_eq!(err.violation, Violation::Missing);

        let err = validate_output(
            &schema,
            &json!({ "campaignSummary": "Email led", "keyMetrics": ["614%"] }),
        )
        .unwrap_err();
        assert_eq!(err.path, "keyMetrics");
        assert_eq!(
            err.violation,
            Violation::WrongType {
                expected: "record",
                found: "list"
            }
        );
    }

    #[test]
    fn null_input_counts_as_missing() {
        let schema = Schema::new(vec![Field::text("topic", "topic")]);
        let err = validate_input(&schema, &json!({ "topic": null })).unwrap_err();
        assert_eq!(err.violation, Violation::Missing);
    }

    #[test]
    fn non_object_input_is_rejected_at_root() {
        let schema = Schema::new(vec![Field::text("topic", "topic")]);
        let err = validate_input(&schema, &json!(["topic"])).unwrap_err();
        assert_eq!(err.path, "$");
    }

    #[test]
    fn malformed_json_text_is_still_valid_input() {
        let schema = Schema::new(vec![
            Field::text("campaignName", "name"),
            Field::text("costData", "json"),
        ]);
        let candidate = json!({ "campaignName": "Summer", "costData": "{ budget: 20000,," });
        let record = validate_input(&schema, &candidate).unwrap();
        assert_eq!(Value::Object(record), candidate);
    }

    #[test]
    fn json_schema_lists_every_field_as_required() {
        let rendered = share_schema().to_json_schema();
        assert_eq!(rendered["required"], json!(["marketSummary", "marketShare", "keyTrends"]));
        assert_eq!(rendered["properties"]["marketShare"]["type"], "array");
        assert_eq!(
            rendered["properties"]["marketShare"]["items"]["properties"]["share"]["type"],
            "number"
        );
        assert_eq!(rendered["properties"]["keyTrends"]["description"], "trends");
    }
}
