// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ids::EntityType;

pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    List,
    Create,
    Change,
    Delete,
}

impl Action {
    pub const ALL: [Self; 4] = [Self::List, Self::Create, Self::Change, Self::Delete];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Change => "change",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource path checked for `action` on `entity_type`.
pub fn resource_path(entity_type: &EntityType, action: Action) -> Vec<String> {
    let mut path = entity_type.segments();
    path.push(action.as_str().to_owned());
    path
}

pub trait PermissionCheck {
    fn check(&self, path: &[String]) -> bool;
}

/// Nested grants keyed by path segment. A `true` leaf grants its whole
/// subtree; a `"*": true` entry grants everything below the node holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionTree {
    Leaf(bool),
    Node(BTreeMap<String, PermissionTree>),
}

impl Default for PermissionTree {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl PermissionTree {
    pub fn allow_all() -> Self {
        Self::Leaf(true)
    }

    pub fn deny_all() -> Self {
        Self::Leaf(false)
    }

    /// Grants (or revokes) exactly `path`, creating nodes on the way.
    pub fn set<S: AsRef<str>>(&mut self, path: &[S], granted: bool) {
        let Some((first, rest)) = path.split_first() else {
            *self = Self::Leaf(granted);
            return;
        };
        if !matches!(self, Self::Node(_)) {
            *self = Self::Node(BTreeMap::new());
        }
        if let Self::Node(children) = self {
            children
                .entry(first.as_ref().to_owned())
                .or_insert_with(Self::deny_all)
                .set(rest, granted);
        }
    }

    pub fn with<S: AsRef<str>>(mut self, path: &[S], granted: bool) -> Self {
        self.set(path, granted);
        self
    }

    fn wildcard(children: &BTreeMap<String, PermissionTree>) -> bool {
        matches!(children.get(WILDCARD), Some(Self::Leaf(true)))
    }
}

impl PermissionCheck for PermissionTree {
    fn check(&self, path: &[String]) -> bool {
        let mut node = self;
        for segment in path {
            match node {
                Self::Leaf(granted) => return *granted,
                Self::Node(children) => {
                    if Self::wildcard(children) {
                        return true;
                    }
                    match children.get(segment) {
                        Some(child) => node = child,
                        None => return false,
                    }
                }
            }
        }
        match node {
            Self::Leaf(granted) => *granted,
            Self::Node(children) => Self::wildcard(children),
        }
    }
}

impl<F> PermissionCheck for F
where
    F: Fn(&[String]) -> bool,
{
    fn check(&self, path: &[String]) -> bool {
        self(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, PermissionCheck, PermissionTree, resource_path};
    use crate::ids::EntityType;
    use anyhow::Result;

    fn jail_path(action: Action) -> Vec<String> {
        resource_path(&EntityType::new("jail/jail"), action)
    }

    #[test]
    fn resource_path_appends_action() {
        assert_eq!(jail_path(Action::Change), ["jail", "jail", "change"]);
    }

    #[test]
    fn default_tree_grants_everything() {
        let tree = PermissionTree::default();
        for action in Action::ALL {
            assert!(tree.check(&jail_path(action)));
        }
    }

    #[test]
    fn true_leaf_grants_subtree() {
        let tree = PermissionTree::deny_all().with(&["jail"], true);
        assert!(tree.check(&jail_path(Action::Delete)));
        assert!(!tree.check(&resource_path(&EntityType::new("player"), Action::List)));
    }

    #[test]
    fn wildcard_grants_below_its_node() {
        let tree = PermissionTree::deny_all()
            .with(&["jail", "jail", "list"], true)
            .with(&["jail", "*"], true);
        assert!(tree.check(&jail_path(Action::Change)));
        assert!(!tree.check(&["player".to_owned(), "list".to_owned()]));
    }

    #[test]
    fn missing_branch_is_denied() {
        let tree = PermissionTree::deny_all().with(&["jail", "jail", "list"], true);
        assert!(tree.check(&jail_path(Action::List)));
        assert!(!tree.check(&jail_path(Action::Change)));
        assert!(!tree.check(&["jail".to_owned()]));
    }

    #[test]
    fn explicit_false_revokes() {
        let tree = PermissionTree::deny_all()
            .with(&["jail", "jail", "list"], true)
            .with(&["jail", "jail", "change"], false);
        assert!(!tree.check(&jail_path(Action::Change)));
    }

    #[test]
    fn deserializes_nested_grants() -> Result<()> {
        let tree: PermissionTree =
            serde_json::from_str(r#"{"jail": {"jail": {"list": true, "create": true}}}"#)?;
        assert!(tree.check(&jail_path(Action::Create)));
        assert!(!tree.check(&jail_path(Action::Delete)));

        let everything: PermissionTree = serde_json::from_str(r#"{"*": true}"#)?;
        assert!(everything.check(&jail_path(Action::Delete)));
        Ok(())
    }

    #[test]
    fn closures_check() {
        let only_lists = |path: &[String]| path.last().is_some_and(|a| a == "list");
        assert!(only_lists.check(&jail_path(Action::List)));
        assert!(!only_lists.check(&jail_path(Action::Delete)));
    }
}
