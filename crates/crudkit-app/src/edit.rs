// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::fields::Schema;
use crate::ids::EntityKey;
use crate::path::{Draft, FieldPath};

/// Decides whether two entity values are the same row. Rows are replaced by
/// fresher copies on every refresh, so this never relies on reference
/// identity.
pub trait RowIdentity: Send + Sync {
    fn key(&self, entity: &Value) -> Option<EntityKey>;

    fn same(&self, left: &Value, right: &Value) -> bool {
        match (self.key(left), self.key(right)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

/// Identity read from one attribute path, `id` by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByPath(pub FieldPath);

impl ByPath {
    pub fn new(path: FieldPath) -> Self {
        Self(path)
    }
}

impl Default for ByPath {
    fn default() -> Self {
        Self(FieldPath::id())
    }
}

impl RowIdentity for ByPath {
    fn key(&self, entity: &Value) -> Option<EntityKey> {
        self.0.get(entity).and_then(EntityKey::from_value)
    }
}

/// Identity from a key extractor plus an optional custom equality.
pub struct IdentityFn<K, E = fn(&Value, &Value) -> bool> {
    key: K,
    equals: Option<E>,
}

impl<K> IdentityFn<K>
where
    K: Fn(&Value) -> Option<EntityKey> + Send + Sync,
{
    pub fn new(key: K) -> Self {
        Self { key, equals: None }
    }
}

impl<K, E> IdentityFn<K, E>
where
    K: Fn(&Value) -> Option<EntityKey> + Send + Sync,
    E: Fn(&Value, &Value) -> bool + Send + Sync,
{
    pub fn with_equals(key: K, equals: E) -> Self {
        Self {
            key,
            equals: Some(equals),
        }
    }
}

impl<K, E> RowIdentity for IdentityFn<K, E>
where
    K: Fn(&Value) -> Option<EntityKey> + Send + Sync,
    E: Fn(&Value, &Value) -> bool + Send + Sync,
{
    fn key(&self, entity: &Value) -> Option<EntityKey> {
        (self.key)(entity)
    }

    fn same(&self, left: &Value, right: &Value) -> bool {
        match &self.equals {
            Some(equals) => equals(left, right),
            None => match (self.key(left), self.key(right)) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditState {
    Idle,
    Editing { target: Value, draft: Draft },
}

#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Save { target: Value, draft: Draft },
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub key: EntityKey,
    pub draft: Draft,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Nothing was outstanding for the key.
    Unknown,
    Done,
    Failed,
    /// A failed save re-opened the row with the draft that was sent.
    Reopened,
}

/// Single-row inline editor plus the set of rows with a save or delete in
/// flight.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEditor {
    state: EditState,
    pending: BTreeMap<EntityKey, Pending>,
}

impl Default for RowEditor {
    fn default() -> Self {
        Self {
            state: EditState::Idle,
            pending: BTreeMap::new(),
        }
    }
}

impl RowEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            EditState::Idle => None,
            EditState::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn target(&self) -> Option<&Value> {
        match &self.state {
            EditState::Idle => None,
            EditState::Editing { target, .. } => Some(target),
        }
    }

    pub fn is_editing(&self, entity: &Value, identity: &dyn RowIdentity) -> bool {
        self.target()
            .is_some_and(|target| identity.same(target, entity))
    }

    pub fn is_updating(&self, key: &EntityKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Opens `entity` for editing, replacing any other edit. The draft starts
    /// from the entity's current values for every editable field.
    pub fn start_edit(
        &mut self,
        entity: &Value,
        schema: &Schema,
        identity: &dyn RowIdentity,
    ) -> Result<EntityKey> {
        let key = identity
            .key(entity)
            .ok_or_else(|| anyhow!("row has no id -- it cannot be edited"))?;
        let draft = schema
            .editable()
            .filter_map(|d| d.name.get(entity).map(|value| (d.name.clone(), value.clone())))
            .collect();
        self.state = EditState::Editing {
            target: entity.clone(),
            draft,
        };
        Ok(key)
    }

    pub fn update_draft(&mut self, path: FieldPath, value: Value) -> Result<()> {
        match &mut self.state {
            EditState::Idle => bail!("no row is being edited"),
            EditState::Editing { draft, .. } => {
                draft.set(path, value);
                Ok(())
            }
        }
    }

    /// Swaps the edit target for a fresher copy from `rows`, keeping the
    /// draft. Returns true when the target is gone from `rows` and the edit
    /// was dropped.
    pub fn rebase<'a, I>(&mut self, rows: I, identity: &dyn RowIdentity) -> bool
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let EditState::Editing { target, .. } = &mut self.state else {
            return false;
        };
        match rows.into_iter().find(|row| identity.same(target, row)) {
            Some(fresh) => {
                *target = fresh.clone();
                false
            }
            None => {
                self.state = EditState::Idle;
                true
            }
        }
    }

    /// Closes the edit and records the save as in flight.
    pub fn save(&mut self, identity: &dyn RowIdentity) -> Result<SaveRequest> {
        let EditState::Editing { target, draft } =
            std::mem::replace(&mut self.state, EditState::Idle)
        else {
            bail!("no row is being edited");
        };
        let Some(key) = identity.key(&target) else {
            bail!("row has no id -- it cannot be saved");
        };
        if self.pending.contains_key(&key) {
            self.state = EditState::Editing { target, draft };
            bail!("row {key} is already updating");
        }
        self.pending.insert(
            key.clone(),
            Pending::Save {
                target,
                draft: draft.clone(),
            },
        );
        Ok(SaveRequest { key, draft })
    }

    pub fn cancel(&mut self) -> bool {
        let was_editing = matches!(self.state, EditState::Editing { .. });
        self.state = EditState::Idle;
        was_editing
    }

    /// Records a delete of `entity` as in flight. An edit of the same row is
    /// closed.
    pub fn begin_delete(
        &mut self,
        entity: &Value,
        identity: &dyn RowIdentity,
    ) -> Result<EntityKey> {
        let key = identity
            .key(entity)
            .ok_or_else(|| anyhow!("row has no id -- it cannot be deleted"))?;
        if self.pending.contains_key(&key) {
            bail!("row {key} is already updating");
        }
        if self.is_editing(entity, identity) {
            self.state = EditState::Idle;
        }
        self.pending.insert(key.clone(), Pending::Delete);
        Ok(key)
    }

    /// Clears the in-flight marker for `key`. A failed save re-opens the row
    /// with its draft when no other edit has started since.
    pub fn settle(&mut self, key: &EntityKey, outcome: &Result<(), String>) -> Settlement {
        let Some(pending) = self.pending.remove(key) else {
            return Settlement::Unknown;
        };
        match (pending, outcome) {
            (_, Ok(())) => Settlement::Done,
            (Pending::Save { target, draft }, Err(_))
                if matches!(self.state, EditState::Idle) =>
            {
                self.state = EditState::Editing { target, draft };
                Settlement::Reopened
            }
            (_, Err(_)) => Settlement::Failed,
        }
    }
}
