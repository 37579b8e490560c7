// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use serde_json::Value;
use std::sync::mpsc::{Receiver, Sender};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::edit::{ByPath, RowEditor, RowIdentity, Settlement};
use crate::fields::{RowContext, Schema};
use crate::filter::{FilterOutcome, FilterPanel, FilterValue, FilterValues, apply_filters, filter_panel};
use crate::forms::{CreateForm, CreateFormView, create_form_view, validate};
use crate::i18n::{Catalog, Translate};
use crate::ids::{EntityKey, EntityType};
use crate::pagination::{DEFAULT_PAGE_SIZE, clamp_page, page_count};
use crate::path::{Draft, FieldPath};
use crate::permissions::{Action, PermissionCheck, PermissionTree, resource_path};
use crate::refresh::{REFRESH_PERIOD, RefreshTimer};
use crate::table::{ActionFn, TableInput, TableView, render_table};

/// Remote operations the container issues. Every call returns as soon as the
/// request is on its way; results come back as `CrudSignal`s.
pub trait CrudBackend {
    fn request_list(&mut self, entity_type: &EntityType, force: bool) -> Result<()>;

    fn request_create(
        &mut self,
        entity_type: &EntityType,
        identity: &dyn RowIdentity,
        payload: Value,
    ) -> Result<()>;

    fn request_change(
        &mut self,
        entity_type: &EntityType,
        identity: &dyn RowIdentity,
        key: &EntityKey,
        patch: Value,
    ) -> Result<()>;

    fn request_delete(
        &mut self,
        entity_type: &EntityType,
        identity: &dyn RowIdentity,
        key: &EntityKey,
    ) -> Result<()>;

    fn request_details(&mut self, entity_type: &EntityType, key: &EntityKey) -> Result<()> {
        let _ = key;
        bail!("{entity_type} has no details view")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Change,
    Delete,
}

impl Operation {
    fn failure_key(self) -> &'static str {
        match self {
            Self::Create => "CreateFailed",
            Self::Change => "ChangeFailed",
            Self::Delete => "DeleteFailed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrudSignal {
    ListLoaded {
        entity_type: EntityType,
        entities: Vec<Value>,
        at: OffsetDateTime,
    },
    ListFailed {
        entity_type: EntityType,
        message: String,
    },
    Settled {
        operation: Operation,
        key: Option<EntityKey>,
        outcome: Result<(), String>,
    },
    RefreshTick,
}

pub type CreateHandler = Box<dyn FnMut(&Value) -> Result<()> + Send>;
pub type RowHandler = Box<dyn FnMut(&Value, &RowContext<'_>) -> Result<()> + Send>;
pub type SaveHandler = Box<dyn FnMut(&Value, &Draft, &RowContext<'_>) -> Result<()> + Send>;
pub type CustomHandler = Box<dyn FnMut(&str, &Value, &RowContext<'_>) -> Result<()> + Send>;

/// Caller handlers that replace the default remote calls.
#[derive(Default)]
pub struct Overrides {
    pub on_create: Option<CreateHandler>,
    pub on_edit: Option<RowHandler>,
    pub on_save: Option<SaveHandler>,
    pub on_delete: Option<RowHandler>,
    pub on_custom: Option<CustomHandler>,
}

pub struct ContainerOptions {
    pub entity_type: EntityType,
    pub schema: Schema,
    pub identity: Box<dyn RowIdentity>,
    pub page_size: usize,
    pub can_edit: bool,
    pub can_delete: bool,
    pub details: bool,
    /// No fetch on mount and no periodic refresh; lists arrive only as
    /// signals from the caller.
    pub static_list: bool,
    pub create_button: Option<String>,
    pub actions: Option<ActionFn>,
    pub overrides: Overrides,
    pub permissions: Box<dyn PermissionCheck + Send>,
    pub translate: Box<dyn Translate + Send>,
}

impl ContainerOptions {
    pub fn new(entity_type: EntityType, schema: Schema) -> Self {
        Self {
            entity_type,
            schema,
            identity: Box::new(ByPath::default()),
            page_size: DEFAULT_PAGE_SIZE,
            can_edit: true,
            can_delete: true,
            details: false,
            static_list: false,
            create_button: None,
            actions: None,
            overrides: Overrides::default(),
            permissions: Box::new(PermissionTree::allow_all()),
            translate: Box::new(Catalog::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContainerCommand {
    Mount,
    Unmount,
    Refresh,
    SetPage(i64),
    NextPage,
    PrevPage,
    SetFilter(FieldPath, Value),
    ClearFilters,
    CreateChange(FieldPath, Value),
    SubmitCreate,
    StartEdit(EntityKey),
    EditChange(FieldPath, Value),
    Save,
    CancelEdit,
    Delete(EntityKey),
    Details(EntityKey),
    Custom { name: String, key: EntityKey },
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContainerEvent {
    Mounted,
    Unmounted,
    ListRequested,
    ListReplaced { count: usize },
    PageChanged(usize),
    FilterChanged { valid: bool },
    CreateDraftChanged,
    CreateRequested,
    Created,
    EditStarted(EntityKey),
    EditDraftChanged,
    EditCancelled,
    SaveRequested(EntityKey),
    Saved(EntityKey),
    DeleteRequested(EntityKey),
    Deleted(EntityKey),
    RolledBack(EntityKey),
    DetailsRequested(EntityKey),
    CustomInvoked { name: String, key: EntityKey },
    StatusUpdated(String),
    StatusCleared,
}

/// Revision of everything the rendered output depends on. Equal stamps
/// render identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RenderStamp(u64);

/// Owns the list, filter values, page and both drafts for one entity type,
/// and is the only writer of any of them.
pub struct CrudContainer<B> {
    options: ContainerOptions,
    backend: B,
    signals: Sender<CrudSignal>,
    inbox: Receiver<CrudSignal>,
    timer: Option<RefreshTimer>,
    mounted: bool,
    list: Vec<Value>,
    last_refreshed: Option<OffsetDateTime>,
    filters: FilterValues,
    page: usize,
    editor: RowEditor,
    create: CreateForm,
    status: Option<String>,
    stamp: RenderStamp,
}

impl<B: CrudBackend> CrudContainer<B> {
    pub fn new(
        options: ContainerOptions,
        backend: B,
        signals: Sender<CrudSignal>,
        inbox: Receiver<CrudSignal>,
    ) -> Self {
        Self {
            options,
            backend,
            signals,
            inbox,
            timer: None,
            mounted: false,
            list: Vec::new(),
            last_refreshed: None,
            filters: FilterValues::new(),
            page: 0,
            editor: RowEditor::new(),
            create: CreateForm::new(),
            status: None,
            stamp: RenderStamp::default(),
        }
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.options.entity_type
    }

    pub fn schema(&self) -> &Schema {
        &self.options.schema
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_refreshing(&self) -> bool {
        self.timer.as_ref().is_some_and(RefreshTimer::is_running)
    }

    pub fn list(&self) -> &[Value] {
        &self.list
    }

    pub fn last_refreshed(&self) -> Option<OffsetDateTime> {
        self.last_refreshed
    }

    pub fn filters(&self) -> &FilterValues {
        &self.filters
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn editor(&self) -> &RowEditor {
        &self.editor
    }

    pub fn create_form(&self) -> &CreateForm {
        &self.create
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn render_stamp(&self) -> RenderStamp {
        self.stamp
    }

    pub fn translate(&self, key: &str) -> String {
        self.options.translate.translate(key)
    }

    fn permitted(&self, action: Action) -> bool {
        self.options
            .permissions
            .check(&resource_path(&self.options.entity_type, action))
    }

    pub fn can_list(&self) -> bool {
        self.permitted(Action::List)
    }

    pub fn can_create(&self) -> bool {
        self.permitted(Action::Create) && self.options.schema.creatable().next().is_some()
    }

    pub fn can_edit(&self) -> bool {
        self.options.can_edit && self.permitted(Action::Change)
    }

    pub fn can_delete(&self) -> bool {
        self.options.can_delete && self.permitted(Action::Delete)
    }

    pub fn filtered(&self) -> FilterOutcome<'_, Value> {
        apply_filters(&self.list, &self.filters, &self.options.schema)
    }

    pub fn table_view(&self) -> TableView {
        let outcome = self.filtered();
        let input = TableInput {
            schema: &self.options.schema,
            rows: &outcome.rows,
            page: i64::try_from(self.page).unwrap_or(i64::MAX),
            page_size: self.options.page_size,
            can_edit: self.can_edit(),
            can_delete: self.can_delete(),
            details: self.options.details,
            editor: &self.editor,
            identity: self.options.identity.as_ref(),
            actions: self.options.actions.as_ref(),
        };
        render_table(&input, self.options.translate.as_ref())
    }

    /// `None` when no field is filterable.
    pub fn filter_panel(&self) -> Option<FilterPanel> {
        self.options.schema.filterable().next()?;
        let valid = self.filtered().valid;
        Some(filter_panel(
            &self.options.schema,
            &self.filters,
            valid,
            self.options.translate.as_ref(),
        ))
    }

    /// `None` unless creating is permitted and some field is creatable.
    pub fn create_form_view(&self) -> Option<CreateFormView> {
        if !self.can_create() {
            return None;
        }
        Some(create_form_view(
            &self.options.schema,
            &self.create,
            self.options.create_button.as_deref(),
            self.options.translate.as_ref(),
        ))
    }

    pub fn find(&self, key: &EntityKey) -> Option<&Value> {
        let identity = self.options.identity.as_ref();
        self.list
            .iter()
            .find(|entity| identity.key(entity).as_ref() == Some(key))
    }

    /// Row flags handed to override handlers; the draft travels separately.
    fn handler_context(&self, entity: &Value) -> RowContext<'static> {
        let identity = self.options.identity.as_ref();
        RowContext {
            editing: self.editor.is_editing(entity, identity),
            updating: identity
                .key(entity)
                .is_some_and(|key| self.editor.is_updating(&key)),
            can_edit: self.can_edit(),
            can_delete: self.can_delete(),
            draft: None,
        }
    }

    fn touch(&mut self) {
        self.stamp.0 = self.stamp.0.wrapping_add(1);
    }

    fn set_status(&mut self, message: impl Into<String>) -> ContainerEvent {
        let message = message.into();
        self.status = Some(message.clone());
        self.touch();
        ContainerEvent::StatusUpdated(message)
    }

    fn failure(&mut self, key: &str, error: &anyhow::Error) -> ContainerEvent {
        let message = format!("{}: {error:#}", self.translate(key));
        warn!(entity_type = %self.options.entity_type, %message, "request failed");
        self.set_status(message)
    }

    fn page_count(&self) -> usize {
        page_count(self.filtered().rows.len(), self.options.page_size)
    }

    fn reclamp_page(&mut self) -> Option<ContainerEvent> {
        let clamped = clamp_page(i64::try_from(self.page).unwrap_or(i64::MAX), self.page_count());
        if clamped == self.page {
            return None;
        }
        self.page = clamped;
        Some(ContainerEvent::PageChanged(clamped))
    }

    pub fn dispatch(&mut self, command: ContainerCommand) -> Vec<ContainerEvent> {
        let result = match command {
            ContainerCommand::Mount => Ok(self.mount()),
            ContainerCommand::Unmount => Ok(self.unmount()),
            ContainerCommand::Refresh => self.request_list(true),
            ContainerCommand::SetPage(requested) => Ok(self.set_page(requested)),
            ContainerCommand::NextPage => {
                Ok(self.set_page(i64::try_from(self.page).unwrap_or(i64::MAX).saturating_add(1)))
            }
            ContainerCommand::PrevPage => {
                Ok(self.set_page(i64::try_from(self.page).unwrap_or(0).saturating_sub(1)))
            }
            ContainerCommand::SetFilter(key, value) => Ok(self.set_filter(key, value)),
            ContainerCommand::ClearFilters => {
                self.filters.clear();
                self.touch();
                let mut events = vec![ContainerEvent::FilterChanged { valid: true }];
                events.extend(self.reclamp_page());
                Ok(events)
            }
            ContainerCommand::CreateChange(path, value) => {
                self.create.handle_change(path, value);
                self.touch();
                Ok(vec![ContainerEvent::CreateDraftChanged])
            }
            ContainerCommand::SubmitCreate => self.submit_create(),
            ContainerCommand::StartEdit(key) => self.start_edit(&key),
            ContainerCommand::EditChange(path, value) => self
                .editor
                .update_draft(path, value)
                .map(|()| {
                    self.touch();
                    vec![ContainerEvent::EditDraftChanged]
                }),
            ContainerCommand::Save => self.save(),
            ContainerCommand::CancelEdit => {
                if self.editor.cancel() {
                    self.touch();
                    Ok(vec![ContainerEvent::EditCancelled])
                } else {
                    Ok(Vec::new())
                }
            }
            ContainerCommand::Delete(key) => self.delete(&key),
            ContainerCommand::Details(key) => self.details(&key),
            ContainerCommand::Custom { name, key } => self.custom(name, &key),
            ContainerCommand::ClearStatus => {
                self.status = None;
                self.touch();
                Ok(vec![ContainerEvent::StatusCleared])
            }
        };
        result.unwrap_or_else(|error| {
            debug!(%error, "command rejected");
            vec![self.set_status(format!("{error:#}"))]
        })
    }

    /// Drains pending signals. Signals arriving after unmount are dropped.
    pub fn pump(&mut self) -> Vec<ContainerEvent> {
        let mut events = Vec::new();
        while let Ok(signal) = self.inbox.try_recv() {
            events.extend(self.handle_signal(signal));
        }
        events
    }

    pub fn handle_signal(&mut self, signal: CrudSignal) -> Vec<ContainerEvent> {
        if !self.mounted {
            debug!(?signal, "signal after unmount ignored");
            return Vec::new();
        }
        match signal {
            CrudSignal::RefreshTick => {
                debug!(entity_type = %self.options.entity_type, "refresh tick");
                self.request_list(true)
                    .unwrap_or_else(|error| vec![self.failure("ListFailed", &error)])
            }
            CrudSignal::ListLoaded {
                entity_type,
                entities,
                at,
            } if entity_type == self.options.entity_type => self.replace_list(entities, at),
            CrudSignal::ListFailed {
                entity_type,
                message,
            } if entity_type == self.options.entity_type => {
                vec![self.failure("ListFailed", &anyhow!(message))]
            }
            CrudSignal::ListLoaded { entity_type, .. }
            | CrudSignal::ListFailed { entity_type, .. } => {
                debug!(%entity_type, "signal for another entity type ignored");
                Vec::new()
            }
            CrudSignal::Settled {
                operation,
                key,
                outcome,
            } => self.settle(operation, key, outcome),
        }
    }

    fn mount(&mut self) -> Vec<ContainerEvent> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        info!(
            entity_type = %self.options.entity_type,
            static_list = self.options.static_list,
            "container mounted"
        );
        let mut events = vec![ContainerEvent::Mounted];
        if self.options.static_list {
            return events;
        }
        match self.request_list(false) {
            Ok(requested) => events.extend(requested),
            Err(error) => events.push(self.failure("ListFailed", &error)),
        }
        self.timer = Some(RefreshTimer::start(REFRESH_PERIOD, self.signals.clone()));
        events
    }

    fn unmount(&mut self) -> Vec<ContainerEvent> {
        if !self.mounted {
            return Vec::new();
        }
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
        self.mounted = false;
        info!(entity_type = %self.options.entity_type, "container unmounted");
        vec![ContainerEvent::Unmounted]
    }

    fn request_list(&mut self, force: bool) -> Result<Vec<ContainerEvent>> {
        if !self.can_list() {
            bail!("listing {} is not permitted", self.options.entity_type);
        }
        self.backend
            .request_list(&self.options.entity_type, force)?;
        debug!(entity_type = %self.options.entity_type, force, "list requested");
        Ok(vec![ContainerEvent::ListRequested])
    }

    fn replace_list(&mut self, entities: Vec<Value>, at: OffsetDateTime) -> Vec<ContainerEvent> {
        let count = entities.len();
        self.list = entities;
        self.last_refreshed = Some(at);
        let dropped = self
            .editor
            .rebase(self.list.iter(), self.options.identity.as_ref());
        self.touch();
        debug!(entity_type = %self.options.entity_type, count, "list replaced");
        let mut events = vec![ContainerEvent::ListReplaced { count }];
        if dropped {
            debug!(entity_type = %self.options.entity_type, "edited row left the list");
            events.push(ContainerEvent::EditCancelled);
        }
        events.extend(self.reclamp_page());
        events
    }

    fn set_page(&mut self, requested: i64) -> Vec<ContainerEvent> {
        let page = clamp_page(requested, self.page_count());
        if page == self.page {
            return Vec::new();
        }
        self.page = page;
        self.touch();
        vec![ContainerEvent::PageChanged(page)]
    }

    fn set_filter(&mut self, key: FieldPath, value: Value) -> Vec<ContainerEvent> {
        self.filters.set(key, FilterValue::from_control(value));
        self.touch();
        let outcome = self.filtered();
        let valid = outcome.valid;
        if let Some(error) = outcome.error {
            debug!(%error, "invalid filter");
        }
        let mut events = vec![ContainerEvent::FilterChanged { valid }];
        events.extend(self.reclamp_page());
        events
    }

    fn submit_create(&mut self) -> Result<Vec<ContainerEvent>> {
        if !self.can_create() {
            bail!("creating {} is not permitted", self.options.entity_type);
        }
        if self.create.is_busy() {
            bail!("a create request is already outstanding -- wait for it to finish");
        }
        validate(self.create.draft(), &self.options.schema)?;
        let payload = self.create.submit();

        if let Some(on_create) = self.options.overrides.on_create.as_mut() {
            on_create(&payload)?;
            self.create.reset();
            self.touch();
            return Ok(vec![ContainerEvent::Created]);
        }

        self.create.set_busy(true);
        self.touch();
        if let Err(error) = self.backend.request_create(
            &self.options.entity_type,
            self.options.identity.as_ref(),
            payload,
        ) {
            self.create.set_busy(false);
            return Ok(vec![self.failure("CreateFailed", &error)]);
        }
        info!(entity_type = %self.options.entity_type, "create requested");
        Ok(vec![ContainerEvent::CreateRequested])
    }

    fn entity(&self, key: &EntityKey) -> Result<Value> {
        self.find(key)
            .cloned()
            .ok_or_else(|| anyhow!("no {} row with id {key}", self.options.entity_type))
    }

    fn start_edit(&mut self, key: &EntityKey) -> Result<Vec<ContainerEvent>> {
        if !self.can_edit() {
            bail!("changing {} is not permitted", self.options.entity_type);
        }
        let entity = self.entity(key)?;
        let context = self.handler_context(&entity);
        if context.updating {
            bail!("row {key} is updating -- wait for it to finish");
        }
        if let Some(on_edit) = self.options.overrides.on_edit.as_mut() {
            on_edit(&entity, &context)?;
            return Ok(vec![ContainerEvent::EditStarted(key.clone())]);
        }
        let started = self.editor.start_edit(
            &entity,
            &self.options.schema,
            self.options.identity.as_ref(),
        )?;
        self.touch();
        Ok(vec![ContainerEvent::EditStarted(started)])
    }

    fn save(&mut self) -> Result<Vec<ContainerEvent>> {
        let target = self
            .editor
            .target()
            .cloned()
            .ok_or_else(|| anyhow!("no row is being edited"))?;

        let context = self.handler_context(&target);
        if let Some(on_save) = self.options.overrides.on_save.as_mut() {
            let draft = self.editor.draft().cloned().unwrap_or_default();
            on_save(&target, &draft, &context)?;
            self.editor.cancel();
            self.touch();
            let key = self
                .options
                .identity
                .key(&target)
                .ok_or_else(|| anyhow!("row has no id -- it cannot be saved"))?;
            return Ok(vec![ContainerEvent::Saved(key)]);
        }

        let request = self.editor.save(self.options.identity.as_ref())?;
        self.touch();
        let patch = request.draft.expand();
        if let Err(error) = self.backend.request_change(
            &self.options.entity_type,
            self.options.identity.as_ref(),
            &request.key,
            patch,
        ) {
            return Ok(self.settle(
                Operation::Change,
                Some(request.key),
                Err(format!("{error:#}")),
            ));
        }
        info!(entity_type = %self.options.entity_type, key = %request.key, "change requested");
        Ok(vec![ContainerEvent::SaveRequested(request.key)])
    }

    fn delete(&mut self, key: &EntityKey) -> Result<Vec<ContainerEvent>> {
        if !self.can_delete() {
            bail!("deleting {} is not permitted", self.options.entity_type);
        }
        let entity = self.entity(key)?;
        let context = self.handler_context(&entity);
        if let Some(on_delete) = self.options.overrides.on_delete.as_mut() {
            if context.updating {
                bail!("row {key} is updating -- wait for it to finish");
            }
            on_delete(&entity, &context)?;
            return Ok(vec![ContainerEvent::Deleted(key.clone())]);
        }

        let key = self
            .editor
            .begin_delete(&entity, self.options.identity.as_ref())?;
        self.touch();
        if let Err(error) = self.backend.request_delete(
            &self.options.entity_type,
            self.options.identity.as_ref(),
            &key,
        ) {
            self.editor.settle(&key, &Err(format!("{error:#}")));
            return Ok(vec![self.failure("DeleteFailed", &error)]);
        }
        info!(entity_type = %self.options.entity_type, %key, "delete requested");
        Ok(vec![ContainerEvent::DeleteRequested(key)])
    }

    fn details(&mut self, key: &EntityKey) -> Result<Vec<ContainerEvent>> {
        if !self.options.details {
            bail!("details are not enabled for {}", self.options.entity_type);
        }
        self.entity(key)?;
        self.backend.request_details(&self.options.entity_type, key)?;
        Ok(vec![ContainerEvent::DetailsRequested(key.clone())])
    }

    fn custom(&mut self, name: String, key: &EntityKey) -> Result<Vec<ContainerEvent>> {
        let entity = self.entity(key)?;
        let context = self.handler_context(&entity);
        if context.updating {
            bail!("row {key} is updating -- wait for it to finish");
        }
        let Some(on_custom) = self.options.overrides.on_custom.as_mut() else {
            bail!("no handler for action {name}");
        };
        on_custom(&name, &entity, &context)?;
        Ok(vec![ContainerEvent::CustomInvoked {
            name,
            key: key.clone(),
        }])
    }

    fn settle(
        &mut self,
        operation: Operation,
        key: Option<EntityKey>,
        outcome: Result<(), String>,
    ) -> Vec<ContainerEvent> {
        self.touch();
        if operation == Operation::Create {
            return match outcome {
                Ok(()) => {
                    self.create.reset();
                    info!(entity_type = %self.options.entity_type, "create settled");
                    vec![ContainerEvent::Created]
                }
                Err(message) => {
                    self.create.set_busy(false);
                    vec![self.failure(operation.failure_key(), &anyhow!(message))]
                }
            };
        }

        let Some(key) = key else {
            warn!(?operation, "settlement without a key ignored");
            return Vec::new();
        };
        let settlement = self.editor.settle(&key, &outcome);
        match (settlement, outcome) {
            (Settlement::Unknown, _) => {
                debug!(%key, ?operation, "settlement for an idle row ignored");
                Vec::new()
            }
            (_, Ok(())) => {
                info!(%key, ?operation, "request settled");
                match operation {
                    Operation::Delete => vec![ContainerEvent::Deleted(key)],
                    _ => vec![ContainerEvent::Saved(key)],
                }
            }
            (Settlement::Reopened, Err(message)) => {
                warn!(%key, "change failed, draft restored");
                vec![
                    ContainerEvent::RolledBack(key),
                    self.failure(operation.failure_key(), &anyhow!(message)),
                ]
            }
            (_, Err(message)) => vec![self.failure(operation.failure_key(), &anyhow!(message))],
        }
    }
}

impl<B> Drop for CrudContainer<B> {
    fn drop(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }
}
