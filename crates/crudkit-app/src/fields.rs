// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::path::{Draft, FieldPath, PathError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub type ViewFn = Arc<dyn Fn(&Value, &RowContext<'_>) -> Cell + Send + Sync>;
pub type ControlFn = Arc<dyn Fn(&ControlContext<'_>) -> Control + Send + Sync>;
pub type ExtractFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Info,
    Error,
}

/// Something a list cell can show.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Badge { text: String, tone: Tone },
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    pub fn display(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Text(text) | Self::Badge { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    #[default]
    Text,
    Number,
}

impl InputKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: Value,
    pub text: String,
}

impl Choice {
    pub fn new(value: impl Into<Value>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// Form/filter/edit input as a value, independent of how it is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Input {
        name: FieldPath,
        label: Option<String>,
        input: InputKind,
        value: Value,
        required: bool,
        error: bool,
    },
    Select {
        name: FieldPath,
        label: Option<String>,
        options: Vec<Choice>,
        value: Value,
        multiple: bool,
        required: bool,
        error: bool,
    },
    Group {
        label: Option<String>,
        controls: Vec<Control>,
    },
}

/// State handed to custom create/edit/filter control functions.
#[derive(Debug, Clone, Copy)]
pub struct ControlContext<'a> {
    pub name: &'a FieldPath,
    pub value: Option<&'a Value>,
    pub values: &'a Draft,
    pub error: bool,
}

/// Per-row state handed to custom view and action functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowContext<'a> {
    pub editing: bool,
    pub updating: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub draft: Option<&'a Draft>,
}

#[derive(Clone)]
pub enum ViewSpec {
    Hidden,
    Shown,
    Static(String),
    Render(ViewFn),
}

impl ViewSpec {
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

impl fmt::Debug for ViewSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => f.write_str("Hidden"),
            Self::Shown => f.write_str("Shown"),
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Render(_) => f.write_str("Render(<fn>)"),
        }
    }
}

/// `create`, `edit` and `filter` are each off, on with the default control,
/// or on with a caller-supplied control.
#[derive(Clone)]
pub enum Capability<F> {
    Off,
    On,
    Custom(F),
}

impl<F> Capability<F> {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    pub fn custom(&self) -> Option<&F> {
        match self {
            Self::Custom(f) => Some(f),
            Self::Off | Self::On => None,
        }
    }
}

impl<F> Default for Capability<F> {
    fn default() -> Self {
        Self::Off
    }
}

impl<F> fmt::Debug for Capability<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("Off"),
            Self::On => f.write_str("On"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    Label,
    View,
    Spec,
}

/// Canonical field descriptor, resolved once per schema.
#[derive(Clone)]
pub struct Descriptor {
    pub name: FieldPath,
    pub label: Option<String>,
    pub view: ViewSpec,
    pub create: Capability<ControlFn>,
    pub edit: Capability<ControlFn>,
    pub filter: Capability<ControlFn>,
    pub filter_name: Option<FieldPath>,
    pub filter_value: Option<ExtractFn>,
    pub create_name: Option<FieldPath>,
    pub options: Vec<Choice>,
    pub required: bool,
    pub is_group: bool,
    pub wide: bool,
    pub input: InputKind,
    pub origin: FieldOrigin,
}

impl Descriptor {
    fn defaults(name: FieldPath, origin: FieldOrigin) -> Self {
        Self {
            name,
            label: None,
            view: ViewSpec::Shown,
            create: Capability::Off,
            edit: Capability::Off,
            filter: Capability::Off,
            filter_name: None,
            filter_value: None,
            create_name: None,
            options: Vec::new(),
            required: false,
            is_group: false,
            wide: false,
            input: InputKind::Text,
            origin,
        }
    }

    pub fn filter_key(&self) -> &FieldPath {
        self.filter_name.as_ref().unwrap_or(&self.name)
    }

    pub fn create_key(&self) -> &FieldPath {
        self.create_name.as_ref().unwrap_or(&self.name)
    }

    /// The label, or the field name in angle brackets when there is none.
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("<{}>", self.name.dotted()))
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("view", &self.view)
            .field("create", &self.create)
            .field("edit", &self.edit)
            .field("filter", &self.filter)
            .field("filter_name", &self.filter_name)
            .field("create_name", &self.create_name)
            .field("required", &self.required)
            .field("is_group", &self.is_group)
            .field("wide", &self.wide)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Full object form of a field. Unset properties keep the defaults.
#[derive(Clone, Default)]
pub struct FieldSpec {
    label: Option<String>,
    view: Option<ViewSpec>,
    create: Capability<ControlFn>,
    edit: Capability<ControlFn>,
    filter: Capability<ControlFn>,
    filter_name: Option<String>,
    filter_value: Option<ExtractFn>,
    create_name: Option<String>,
    options: Vec<Choice>,
    required: bool,
    is_group: bool,
    wide: bool,
    input: InputKind,
}

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.view = Some(ViewSpec::Hidden);
        self
    }

    pub fn static_view(mut self, text: impl Into<String>) -> Self {
        self.view = Some(ViewSpec::Static(text.into()));
        self
    }

    pub fn view<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value, &RowContext<'_>) -> Cell + Send + Sync + 'static,
    {
        self.view = Some(ViewSpec::Render(Arc::new(render)));
        self
    }

    pub fn create(mut self) -> Self {
        self.create = Capability::On;
        self
    }

    pub fn create_with<F>(mut self, control: F) -> Self
    where
        F: Fn(&ControlContext<'_>) -> Control + Send + Sync + 'static,
    {
        self.create = Capability::Custom(Arc::new(control));
        self
    }

    pub fn edit(mut self) -> Self {
        self.edit = Capability::On;
        self
    }

    pub fn edit_with<F>(mut self, control: F) -> Self
    where
        F: Fn(&ControlContext<'_>) -> Control + Send + Sync + 'static,
    {
        self.edit = Capability::Custom(Arc::new(control));
        self
    }

    pub fn filter(mut self) -> Self {
        self.filter = Capability::On;
        self
    }

    pub fn filter_with<F>(mut self, control: F) -> Self
    where
        F: Fn(&ControlContext<'_>) -> Control + Send + Sync + 'static,
    {
        self.filter = Capability::Custom(Arc::new(control));
        self
    }

    pub fn filter_name(mut self, path: impl Into<String>) -> Self {
        self.filter_name = Some(path.into());
        self
    }

    pub fn filter_value<F>(mut self, extract: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.filter_value = Some(Arc::new(extract));
        self
    }

    pub fn create_name(mut self, path: impl Into<String>) -> Self {
        self.create_name = Some(path.into());
        self
    }

    pub fn options(mut self, options: Vec<Choice>) -> Self {
        self.options = options;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn group(mut self) -> Self {
        self.is_group = true;
        self
    }

    pub fn wide(mut self) -> Self {
        self.wide = true;
        self
    }

    pub fn number(mut self) -> Self {
        self.input = InputKind::Number;
        self
    }
}

/// The three accepted shapes of a field declaration.
#[derive(Clone)]
pub enum RawField {
    Label(String),
    View(ViewFn),
    Spec(FieldSpec),
}

impl From<&str> for RawField {
    fn from(label: &str) -> Self {
        Self::Label(label.to_owned())
    }
}

impl From<String> for RawField {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

impl From<FieldSpec> for RawField {
    fn from(spec: FieldSpec) -> Self {
        Self::Spec(spec)
    }
}

fn parse_optional(raw: Option<String>) -> Result<Option<FieldPath>, PathError> {
    raw.map(|raw| FieldPath::parse(&raw)).transpose()
}

/// Resolves one declaration into its descriptor.
pub fn normalize_field(name: &str, raw: RawField) -> Result<Descriptor, PathError> {
    let name = FieldPath::parse(name)?;
    let descriptor = match raw {
        RawField::Label(label) => Descriptor {
            label: Some(label),
            ..Descriptor::defaults(name, FieldOrigin::Label)
        },
        RawField::View(render) => Descriptor {
            view: ViewSpec::Render(render),
            ..Descriptor::defaults(name, FieldOrigin::View)
        },
        RawField::Spec(spec) => Descriptor {
            label: spec.label,
            view: spec.view.unwrap_or(ViewSpec::Shown),
            create: spec.create,
            edit: spec.edit,
            filter: spec.filter,
            filter_name: parse_optional(spec.filter_name)?,
            filter_value: spec.filter_value,
            create_name: parse_optional(spec.create_name)?,
            options: spec.options,
            required: spec.required,
            is_group: spec.is_group,
            wide: spec.wide,
            input: spec.input,
            ..Descriptor::defaults(name, FieldOrigin::Spec)
        },
    };
    Ok(descriptor)
}

/// Ordered, name-unique set of descriptors for one entity type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Descriptor>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// A later declaration with an already-used name replaces the earlier one
    /// in place, so declaration order survives and names stay unique.
    pub fn normalize<I, K>(raw: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = (K, RawField)>,
        K: AsRef<str>,
    {
        let mut fields: Vec<Descriptor> = Vec::new();
        for (name, field) in raw {
            let descriptor = normalize_field(name.as_ref(), field)?;
            match fields.iter_mut().find(|d| d.name == descriptor.name) {
                Some(existing) => *existing = descriptor,
                None => fields.push(descriptor),
            }
        }
        Ok(Self { fields })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &FieldPath) -> Option<&Descriptor> {
        self.fields.iter().find(|d| &d.name == name)
    }

    pub fn visible(&self) -> impl Iterator<Item = &Descriptor> {
        self.fields.iter().filter(|d| d.view.is_visible())
    }

    pub fn creatable(&self) -> impl Iterator<Item = &Descriptor> {
        self.fields.iter().filter(|d| d.create.is_enabled())
    }

    pub fn editable(&self) -> impl Iterator<Item = &Descriptor> {
        self.fields.iter().filter(|d| d.edit.is_enabled())
    }

    pub fn filterable(&self) -> impl Iterator<Item = &Descriptor> {
        self.fields.iter().filter(|d| d.filter.is_enabled())
    }

    /// Filterable descriptor whose `filter_name` is `key`, else the
    /// filterable descriptor named `key`.
    pub fn for_filter_key(&self, key: &FieldPath) -> Option<&Descriptor> {
        self.filterable()
            .find(|d| d.filter_name.as_ref() == Some(key))
            .or_else(|| self.filterable().find(|d| &d.name == key))
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    raw: Vec<(String, RawField)>,
}

impl SchemaBuilder {
    pub fn label(mut self, name: &str, label: impl Into<String>) -> Self {
        self.raw.push((name.to_owned(), RawField::Label(label.into())));
        self
    }

    pub fn view<F>(mut self, name: &str, render: F) -> Self
    where
        F: Fn(&Value, &RowContext<'_>) -> Cell + Send + Sync + 'static,
    {
        self.raw
            .push((name.to_owned(), RawField::View(Arc::new(render))));
        self
    }

    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        self.raw.push((name.to_owned(), RawField::Spec(spec)));
        self
    }

    pub fn build(self) -> Result<Schema, PathError> {
        Schema::normalize(self.raw)
    }
}
