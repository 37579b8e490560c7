// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::fields::{Control, ControlContext, Descriptor, ExtractFn, Schema};
use crate::forms::{LayoutRow, pair_layout};
use crate::i18n::Translate;
use crate::path::{Draft, FieldPath, value_text};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

pub const INVALID_PATTERN_KEY: &str = "InvalidRegex";

/// Anything the filter engine can read an entity out of.
pub trait Entity {
    fn entity(&self) -> &Value;
}

impl Entity for Value {
    fn entity(&self) -> &Value {
        self
    }
}

/// A list keeps rows whose value is one of the members; a scalar is a
/// case-insensitive pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    OneOf(Vec<Value>),
    Pattern(String),
}

impl FilterValue {
    /// Maps a raw control value: arrays become membership tests, anything
    /// else is matched as text.
    pub fn from_control(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::OneOf(items),
            other => Self::Pattern(value_text(Some(&other))),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::OneOf(items) => Value::Array(items.clone()),
            Self::Pattern(pattern) => Value::String(pattern.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterValues {
    values: BTreeMap<FieldPath, FilterValue>,
}

impl FilterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: FieldPath, value: FilterValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &FieldPath) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FilterValue)> {
        self.values.iter()
    }

    pub fn as_draft(&self) -> Draft {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_value()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    InvalidPattern { key: FieldPath, message: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { key, message } => {
                write!(f, "filter {key} is not a valid regex: {message}")
            }
        }
    }
}

impl std::error::Error for FilterError {}

enum Getter<'s> {
    Path(&'s FieldPath),
    Extract(&'s ExtractFn),
}

impl Getter<'_> {
    fn read(&self, entity: &Value) -> Option<Value> {
        match self {
            Self::Path(path) => path.get(entity).cloned(),
            Self::Extract(extract) => extract(entity),
        }
    }
}

enum Predicate<'s> {
    Matches { getter: Getter<'s>, pattern: Regex },
    OneOf { getter: Getter<'s>, accepted: &'s [Value] },
}

impl Predicate<'_> {
    fn test(&self, entity: &Value) -> bool {
        match self {
            Self::Matches { getter, pattern } => {
                pattern.is_match(&value_text(getter.read(entity).as_ref()))
            }
            Self::OneOf { getter, accepted } => getter
                .read(entity)
                .is_some_and(|value| accepted.contains(&value)),
        }
    }
}

fn getter_for<'s>(key: &'s FieldPath, descriptor: Option<&'s Descriptor>) -> Getter<'s> {
    match descriptor.and_then(|d| d.filter_value.as_ref()) {
        Some(extract) => Getter::Extract(extract),
        None => Getter::Path(key),
    }
}

fn compile<'s>(
    values: &'s FilterValues,
    schema: &'s Schema,
) -> Result<Vec<Predicate<'s>>, FilterError> {
    let mut predicates = Vec::new();
    for (key, value) in values.iter() {
        let getter = getter_for(key, schema.for_filter_key(key));
        match value {
            FilterValue::OneOf(accepted) if accepted.is_empty() => {}
            FilterValue::OneOf(accepted) => predicates.push(Predicate::OneOf {
                getter,
                accepted: accepted.as_slice(),
            }),
            FilterValue::Pattern(pattern) => {
                let pattern = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|error| FilterError::InvalidPattern {
                        key: key.clone(),
                        message: error.to_string(),
                    })?;
                predicates.push(Predicate::Matches { getter, pattern });
            }
        }
    }
    Ok(predicates)
}

#[derive(Debug)]
pub struct FilterOutcome<'a, T> {
    pub rows: Vec<&'a T>,
    pub valid: bool,
    pub error: Option<FilterError>,
}

/// Keeps rows passing every active predicate. An invalid pattern makes the
/// whole pass non-restrictive and reports `valid = false`.
pub fn apply_filters<'a, T: Entity>(
    items: &'a [T],
    values: &FilterValues,
    schema: &Schema,
) -> FilterOutcome<'a, T> {
    match compile(values, schema) {
        Ok(predicates) => FilterOutcome {
            rows: items
                .iter()
                .filter(|item| predicates.iter().all(|p| p.test(item.entity())))
                .collect(),
            valid: true,
            error: None,
        },
        Err(error) => {
            tracing::debug!(%error, "filter pass left unrestricted");
            FilterOutcome {
                rows: items.iter().collect(),
                valid: false,
                error: Some(error),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterPanel {
    pub rows: Vec<LayoutRow<Control>>,
    pub error: Option<String>,
}

fn filter_control(descriptor: &Descriptor, values: &Draft, error: bool) -> Control {
    let name = descriptor.filter_key();
    let value = values.get(name);
    if let Some(custom) = descriptor.filter.custom() {
        return custom(&ControlContext {
            name,
            value,
            values,
            error,
        });
    }
    if descriptor.options.is_empty() {
        Control::Input {
            name: name.clone(),
            label: descriptor.label.clone(),
            input: descriptor.input,
            value: value.cloned().unwrap_or_else(|| Value::String(String::new())),
            required: false,
            error,
        }
    } else {
        Control::Select {
            name: name.clone(),
            label: descriptor.label.clone(),
            options: descriptor.options.clone(),
            value: value.cloned().unwrap_or_else(|| Value::Array(Vec::new())),
            multiple: true,
            required: false,
            error,
        }
    }
}

pub fn filter_panel(
    schema: &Schema,
    values: &FilterValues,
    valid: bool,
    translate: &dyn Translate,
) -> FilterPanel {
    let draft = values.as_draft();
    let rows = pair_layout(
        schema
            .filterable()
            .map(|d| (d.is_group, filter_control(d, &draft, !valid))),
    );
    FilterPanel {
        rows,
        error: (!valid).then(|| translate.translate(INVALID_PATTERN_KEY)),
    }
}

#[cfg(test)]
mod tests {
    use super::{FilterValue, FilterValues, apply_filters, filter_panel};
    use crate::fields::{Choice, Control, FieldSpec, Schema};
    use crate::forms::LayoutRow;
    use crate::i18n::Catalog;
    use crate::path::FieldPath;
    use anyhow::Result;
    use serde_json::{Value, json};

    fn jails() -> Vec<Value> {
        (0..10)
            .map(|index| {
                json!({
                    "name": format!("Jail{index}"),
                    "location": {
                        "world": {
                            "uuid": if index < 5 { "w-nether" } else { "w-end" },
                            "name": if index < 5 { "Nether" } else { "End" },
                        },
                    },
                    "even": index % 2 == 0,
                })
            })
            .collect()
    }

    fn schema() -> Result<Schema> {
        Ok(Schema::builder()
            .field("name", FieldSpec::new().label("Name").filter())
            .field(
                "world",
                FieldSpec::new()
                    .label("World")
                    .filter()
                    .filter_name("location.world.uuid")
                    .options(vec![
                        Choice::new("w-nether", "Nether"),
                        Choice::new("w-end", "End"),
                    ]),
            )
            .build()?)
    }

    fn key(raw: &str) -> Result<FieldPath> {
        Ok(FieldPath::parse(raw)?)
    }

    #[test]
    fn empty_filter_returns_everything() -> Result<()> {
        let items = jails();
        let outcome = apply_filters(&items, &FilterValues::new(), &schema()?);
        assert!(outcome.valid);
        assert_eq!(outcome.rows.len(), items.len());
        assert!(outcome.rows.iter().zip(&items).all(|(a, b)| *a == b));
        Ok(())
    }

    #[test]
    fn empty_membership_list_never_restricts() -> Result<()> {
        let items = jails();
        let mut values = FilterValues::new();
        values.set(key("location.world.uuid")?, FilterValue::OneOf(Vec::new()));
        let outcome = apply_filters(&items, &values, &schema()?);
        assert!(outcome.valid);
        assert_eq!(outcome.rows.len(), 10);
        Ok(())
    }

    #[test]
    fn membership_uses_filter_name_path() -> Result<()> {
        let items = jails();
        let mut values = FilterValues::new();
        values.set(
            key("location.world.uuid")?,
            FilterValue::OneOf(vec![json!("w-end")]),
        );
        let outcome = apply_filters(&items, &values, &schema()?);
        let names: Vec<_> = outcome.rows.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(
            names,
            vec![
                json!("Jail5"),
                json!("Jail6"),
                json!("Jail7"),
                json!("Jail8"),
                json!("Jail9")
            ]
        );
        Ok(())
    }

    #[test]
    fn pattern_is_case_insensitive() -> Result<()> {
        let items = jails();
        let mut values = FilterValues::new();
        values.set(key("name")?, FilterValue::Pattern("^JAIL[12]$".to_owned()));
        let outcome = apply_filters(&items, &values, &schema()?);
        assert_eq!(outcome.rows.len(), 2);
        Ok(())
    }

    #[test]
    fn disjoint_filters_combine_with_and() -> Result<()> {
        let items = jails();
        let mut values = FilterValues::new();
        values.set(
            key("location.world.uuid")?,
            FilterValue::OneOf(vec![json!("w-nether")]),
        );
        values.set(key("name")?, FilterValue::Pattern("[5-9]$".to_owned()));
        let outcome = apply_filters(&items, &values, &schema()?);
        assert!(outcome.valid);
        assert!(outcome.rows.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_pattern_fails_open() -> Result<()> {
        let items = jails();
        let mut values = FilterValues::new();
        values.set(
            key("location.world.uuid")?,
            FilterValue::OneOf(vec![json!("w-end")]),
        );
        values.set(key("name")?, FilterValue::Pattern("Jail(".to_owned()));
        let outcome = apply_filters(&items, &values, &schema()?);
        assert!(!outcome.valid);
        assert_eq!(outcome.rows.len(), 10);
        let message = outcome.error.expect("invalid pattern error").to_string();
        assert!(message.contains("name"), "unexpected message: {message}");
        Ok(())
    }

    #[test]
    fn extractor_overrides_path_lookup() -> Result<()> {
        let schema = Schema::builder()
            .field(
                "parity",
                FieldSpec::new().filter().filter_value(|entity| {
                    let even = entity["even"].as_bool()?;
                    Some(json!(if even { "even" } else { "odd" }))
                }),
            )
            .build()?;
        let items = jails();
        let mut values = FilterValues::new();
        values.set(key("parity")?, FilterValue::OneOf(vec![json!("odd")]));
        let outcome = apply_filters(&items, &values, &schema);
        assert_eq!(outcome.rows.len(), 5);
        Ok(())
    }

    #[test]
    fn unknown_key_falls_back_to_path_lookup() -> Result<()> {
        let items = jails();
        let mut values = FilterValues::new();
        values.set(
            key("location.world.name")?,
            FilterValue::Pattern("nether".to_owned()),
        );
        let outcome = apply_filters(&items, &values, &schema()?);
        assert_eq!(outcome.rows.len(), 5);
        Ok(())
    }

    #[test]
    fn missing_value_is_matched_as_empty_text() -> Result<()> {
        let items = vec![json!({"name": "a"}), json!({})];
        let mut values = FilterValues::new();
        values.set(key("name")?, FilterValue::Pattern("^$".to_owned()));
        let outcome = apply_filters(&items, &values, &schema()?);
        assert_eq!(outcome.rows, vec![&items[1]]);
        Ok(())
    }

    #[test]
    fn control_values_map_to_filter_branches() {
        assert_eq!(
            FilterValue::from_control(json!(["w-end"])),
            FilterValue::OneOf(vec![json!("w-end")])
        );
        assert_eq!(
            FilterValue::from_control(json!("jail")),
            FilterValue::Pattern("jail".to_owned())
        );
        assert_eq!(
            FilterValue::from_control(json!(3)),
            FilterValue::Pattern("3".to_owned())
        );
    }

    #[test]
    fn panel_pairs_controls_and_flags_errors() -> Result<()> {
        let schema = schema()?;
        let catalog = Catalog::default();
        let panel = filter_panel(&schema, &FilterValues::new(), false, &catalog);
        assert_eq!(panel.error.as_deref(), Some("Search term must be a valid regex"));
        assert_eq!(panel.rows.len(), 1);
        let LayoutRow::Pair(first, Some(second)) = &panel.rows[0] else {
            panic!("expected a full pair, got {:?}", panel.rows[0]);
        };
        assert!(matches!(first, Control::Input { error: true, .. }));
        let Control::Select {
            name,
            value,
            multiple,
            ..
        } = second
        else {
            panic!("expected select, got {second:?}");
        };
        assert_eq!(name.dotted(), "location.world.uuid");
        assert_eq!(value, &json!([]));
        assert!(*multiple);
        Ok(())
    }

    #[test]
    fn panel_is_clean_when_valid() -> Result<()> {
        let panel = filter_panel(&schema()?, &FilterValues::new(), true, &Catalog::default());
        assert_eq!(panel.error, None);
        Ok(())
    }
}
