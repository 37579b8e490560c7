// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    Empty,
    EmptySegment,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("field path is empty"),
            Self::EmptySegment => f.write_str("field path has an empty segment"),
        }
    }
}

impl std::error::Error for PathError {}

/// A dotted attribute path (`location.world.uuid`) parsed once into its
/// segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = trimmed
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment)
                } else {
                    Ok(segment.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// The conventional `id` attribute.
    pub fn id() -> Self {
        Self {
            segments: vec!["id".to_owned()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }

    /// Missing intermediate keys, non-object parents and out-of-range array
    /// indexes all read as absent.
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Writes `leaf` at this path, replacing any non-object value met on the
    /// way with an object.
    pub fn set(&self, target: &mut Value, leaf: Value) {
        let mut current = target;
        for (index, segment) in self.segments.iter().enumerate() {
            if !current.is_object() {
                *current = Value::Object(Map::new());
            }
            let Some(map) = current.as_object_mut() else {
                return;
            };
            if index + 1 == self.segments.len() {
                map.insert(segment.clone(), leaf);
                return;
            }
            current = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
        }
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.dotted()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Text used wherever a value is shown or matched as a string. Absent and
/// null values are empty.
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// True for absent, null, empty string and empty array values.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Flat staging area keyed by dotted path, used by both the create form and
/// the inline row editor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    values: BTreeMap<FieldPath, Value>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: FieldPath, value: Value) {
        self.values.insert(path, value);
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.values.get(path)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &Value)> {
        self.values.iter()
    }

    /// Expands dotted keys into a nested object:
    /// `location.position.x = 5` becomes `{"location":{"position":{"x":5}}}`.
    pub fn expand(&self) -> Value {
        let mut out = Value::Object(Map::new());
        for (path, value) in &self.values {
            path.set(&mut out, value.clone());
        }
        out
    }
}

impl FromIterator<(FieldPath, Value)> for Draft {
    fn from_iter<I: IntoIterator<Item = (FieldPath, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
