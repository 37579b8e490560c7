// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use serde_json::Value;

use crate::fields::{Control, ControlContext, Descriptor, FieldOrigin, Schema};
use crate::i18n::Translate;
use crate::path::{Draft, FieldPath, is_blank};

/// One visual row of a form or filter panel.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutRow<T> {
    Single(T),
    Pair(T, Option<T>),
}

/// Walks items in order: grouped items take a row of their own, the rest
/// fill two-wide rows, and an odd trailing item sits alone.
pub fn pair_layout<T, I>(items: I) -> Vec<LayoutRow<T>>
where
    I: IntoIterator<Item = (bool, T)>,
{
    let mut rows: Vec<LayoutRow<T>> = Vec::new();
    for (is_group, item) in items {
        if is_group {
            rows.push(LayoutRow::Single(item));
            continue;
        }
        match rows.last_mut() {
            Some(LayoutRow::Pair(_, second @ None)) => *second = Some(item),
            _ => rows.push(LayoutRow::Pair(item, None)),
        }
    }
    rows
}

fn requires_value(descriptor: &Descriptor) -> bool {
    descriptor.required
        && descriptor.origin != FieldOrigin::Label
        && descriptor.create.custom().is_none()
}

/// Required create fields whose target path is still blank in `draft`.
pub fn missing_required<'s>(draft: &Draft, schema: &'s Schema) -> Vec<&'s Descriptor> {
    schema
        .creatable()
        .filter(|d| requires_value(d) && is_blank(draft.get(d.create_key())))
        .collect()
}

pub fn can_submit(draft: &Draft, schema: &Schema) -> bool {
    missing_required(draft, schema).is_empty()
}

pub fn validate(draft: &Draft, schema: &Schema) -> Result<()> {
    if let Some(missing) = missing_required(draft, schema).first() {
        bail!(
            "{} is required -- enter a value and retry",
            missing.display_label()
        );
    }
    Ok(())
}

/// Stages values for an entity under construction. Submitting leaves the
/// draft in place; the caller resets it once the remote create succeeded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateForm {
    draft: Draft,
    busy: bool,
}

impl CreateForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn handle_change(&mut self, path: FieldPath, value: Value) {
        self.draft.set(path, value);
    }

    pub fn can_submit(&self, schema: &Schema) -> bool {
        can_submit(&self.draft, schema)
    }

    pub fn submit(&self) -> Value {
        self.draft.expand()
    }

    pub fn reset(&mut self) {
        self.draft.clear();
        self.busy = false;
    }
}

fn create_control(descriptor: &Descriptor, draft: &Draft) -> Control {
    let name = descriptor.create_key();
    let value = draft.get(name);
    if let Some(custom) = descriptor.create.custom() {
        return custom(&ControlContext {
            name,
            value,
            values: draft,
            error: false,
        });
    }
    if descriptor.options.is_empty() {
        Control::Input {
            name: name.clone(),
            label: descriptor.label.clone(),
            input: descriptor.input,
            value: value.cloned().unwrap_or_else(|| Value::String(String::new())),
            required: descriptor.required,
            error: false,
        }
    } else {
        Control::Select {
            name: name.clone(),
            label: descriptor.label.clone(),
            options: descriptor.options.clone(),
            value: value.cloned().unwrap_or(Value::Null),
            multiple: false,
            required: descriptor.required,
            error: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFormView {
    pub rows: Vec<LayoutRow<Control>>,
    pub button: String,
    pub submit_enabled: bool,
    pub busy: bool,
}

pub fn create_form_view(
    schema: &Schema,
    form: &CreateForm,
    button: Option<&str>,
    translate: &dyn Translate,
) -> CreateFormView {
    let rows = pair_layout(
        schema
            .creatable()
            .map(|d| (d.is_group, create_control(d, form.draft()))),
    );
    CreateFormView {
        rows,
        button: button.map_or_else(|| translate.translate("Create"), str::to_owned),
        submit_enabled: form.can_submit(schema) && !form.is_busy(),
        busy: form.is_busy(),
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateForm, LayoutRow, can_submit, create_form_view, pair_layout, validate};
    use crate::fields::{Control, FieldSpec, RawField, Schema};
    use crate::i18n::Catalog;
    use crate::path::{Draft, FieldPath};
    use anyhow::Result;
    use serde_json::{Value, json};

    fn path(raw: &str) -> Result<FieldPath> {
        Ok(FieldPath::parse(raw)?)
    }

    fn jail_schema() -> Result<Schema> {
        Ok(Schema::builder()
            .field("name", FieldSpec::new().label("Name").required().create())
            .field(
                "world",
                FieldSpec::new()
                    .label("World")
                    .create()
                    .create_name("location.world"),
            )
            .build()?)
    }

    #[test]
    fn pairing_keeps_groups_alone() {
        let rows = pair_layout([(false, 1), (false, 2), (true, 3), (false, 4), (false, 5), (false, 6)]);
        assert_eq!(
            rows,
            vec![
                LayoutRow::Pair(1, Some(2)),
                LayoutRow::Single(3),
                LayoutRow::Pair(4, Some(5)),
                LayoutRow::Pair(6, None),
            ]
        );
    }

    #[test]
    fn pairing_never_fills_a_group_row() {
        let rows = pair_layout([(false, 1), (true, 2), (false, 3)]);
        assert_eq!(
            rows,
            vec![
                LayoutRow::Pair(1, None),
                LayoutRow::Single(2),
                LayoutRow::Pair(3, None),
            ]
        );
    }

    #[test]
    fn required_field_gates_submission() -> Result<()> {
        let schema = jail_schema()?;
        let mut form = CreateForm::new();
        assert!(!form.can_submit(&schema));

        form.handle_change(path("name")?, json!(""));
        assert!(!form.can_submit(&schema));

        form.handle_change(path("name")?, json!("Jail1"));
        assert!(form.can_submit(&schema));
        Ok(())
    }

    #[test]
    fn required_check_uses_create_name() -> Result<()> {
        let schema = Schema::builder()
            .field(
                "world",
                FieldSpec::new()
                    .create()
                    .required()
                    .create_name("location.world"),
            )
            .build()?;
        let mut draft = Draft::new();
        draft.set(path("world")?, json!("nether"));
        assert!(!can_submit(&draft, &schema));
        draft.set(path("location.world")?, json!("nether"));
        assert!(can_submit(&draft, &schema));
        Ok(())
    }

    #[test]
    fn custom_create_controls_are_not_required() -> Result<()> {
        let schema = Schema::builder()
            .field(
                "position",
                FieldSpec::new().required().create_with(|ctx| Control::Group {
                    label: Some("Position".to_owned()),
                    controls: vec![Control::Input {
                        name: ctx.name.clone(),
                        label: None,
                        input: crate::fields::InputKind::Number,
                        value: ctx.value.cloned().unwrap_or(Value::Null),
                        required: false,
                        error: false,
                    }],
                }),
            )
            .build()?;
        assert!(can_submit(&Draft::new(), &schema));
        Ok(())
    }

    #[test]
    fn label_shorthand_always_satisfies_required() -> Result<()> {
        let schema = Schema::normalize([("name", RawField::from("Name"))])?;
        assert!(can_submit(&Draft::new(), &schema));
        Ok(())
    }

    #[test]
    fn submit_expands_without_clearing() -> Result<()> {
        let schema = jail_schema()?;
        let mut form = CreateForm::new();
        form.handle_change(path("name")?, json!("Jail1"));
        form.handle_change(path("location.world")?, json!("nether"));
        assert!(form.can_submit(&schema));
        assert_eq!(
            form.submit(),
            json!({"name": "Jail1", "location": {"world": "nether"}})
        );
        assert_eq!(form.draft().len(), 2);

        form.reset();
        assert!(form.draft().is_empty());
        Ok(())
    }

    #[test]
    fn validate_names_the_missing_field() -> Result<()> {
        let error = validate(&Draft::new(), &jail_schema()?).expect_err("name is missing");
        assert!(error.to_string().contains("Name is required"));
        Ok(())
    }

    #[test]
    fn view_disables_button_until_submittable_or_while_busy() -> Result<()> {
        let schema = jail_schema()?;
        let catalog = Catalog::default();
        let mut form = CreateForm::new();

        let view = create_form_view(&schema, &form, None, &catalog);
        assert!(!view.submit_enabled);
        assert_eq!(view.button, "Create");
        assert_eq!(view.rows.len(), 1);
        let LayoutRow::Pair(Control::Input { required, .. }, Some(Control::Input { name, .. })) =
            &view.rows[0]
        else {
            panic!("unexpected layout {:?}", view.rows);
        };
        assert!(*required);
        assert_eq!(name.dotted(), "location.world");

        form.handle_change(path("name")?, json!("Jail1"));
        assert!(create_form_view(&schema, &form, Some("Add"), &catalog).submit_enabled);

        form.set_busy(true);
        let busy = create_form_view(&schema, &form, Some("Add"), &catalog);
        assert!(!busy.submit_enabled);
        assert!(busy.busy);
        assert_eq!(busy.button, "Add");
        Ok(())
    }
}
