// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

macro_rules! text_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

text_id!(EntityKey);
text_id!(EntityType);

impl EntityKey {
    /// Canonical key for an id value: strings are taken verbatim, everything
    /// else uses its JSON text so `1` and `"1"` stay distinct only by type.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self(text.clone())),
            other => Some(Self(other.to_string())),
        }
    }
}

impl EntityType {
    /// Permission path segments, `jail` or `nucleus/jail` style names split on `/`.
    pub fn segments(&self) -> Vec<String> {
        self.0
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityKey, EntityType};
    use serde_json::json;

    #[test]
    fn key_from_string_and_number() {
        assert_eq!(
            EntityKey::from_value(&json!("alcatraz")),
            Some(EntityKey::new("alcatraz"))
        );
        assert_eq!(EntityKey::from_value(&json!(7)), Some(EntityKey::new("7")));
        assert_eq!(EntityKey::from_value(&json!(null)), None);
    }

    #[test]
    fn entity_type_segments_skip_empty_parts() {
        let entity = EntityType::new("nucleus//jail");
        assert_eq!(entity.segments(), vec!["nucleus", "jail"]);
    }
}
