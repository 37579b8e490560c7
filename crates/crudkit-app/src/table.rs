// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;
use std::sync::Arc;

use crate::edit::{RowEditor, RowIdentity};
use crate::fields::{Cell, Control, ControlContext, Descriptor, RowContext, Schema, ViewSpec};
use crate::i18n::Translate;
use crate::ids::EntityKey;
use crate::pagination::{PagerControl, paginate, pager_controls};
use crate::path::{Draft, value_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Details,
    Edit,
    Save,
    Cancel,
    Delete,
    Custom(String),
}

impl RowAction {
    /// Catalog key of the button caption; custom actions carry their own.
    pub fn key(&self) -> &str {
        match self {
            Self::Details => "Details",
            Self::Edit => "Edit",
            Self::Save => "Save",
            Self::Cancel => "Cancel",
            Self::Delete => "Delete",
            Self::Custom(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub action: RowAction,
    pub label: String,
    pub enabled: bool,
}

impl ActionButton {
    pub fn custom(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action: RowAction::Custom(name.into()),
            label: label.into(),
            enabled: true,
        }
    }
}

/// Caller-supplied extra buttons for a row.
pub type ActionFn = Arc<dyn Fn(&Value, &RowContext<'_>) -> Vec<ActionButton> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub wide: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableCell {
    View(Cell),
    Editor(Control),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub key: Option<EntityKey>,
    pub cells: Vec<TableCell>,
    pub actions: Vec<ActionButton>,
    pub editing: bool,
    pub updating: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<TableRow>,
    pub page: usize,
    pub page_count: usize,
    pub pager: Vec<PagerControl>,
    pub empty_text: Option<String>,
}

pub struct TableInput<'a> {
    pub schema: &'a Schema,
    /// Rows left after filtering, in list order.
    pub rows: &'a [&'a Value],
    pub page: i64,
    pub page_size: usize,
    pub can_edit: bool,
    pub can_delete: bool,
    pub details: bool,
    pub editor: &'a RowEditor,
    pub identity: &'a dyn RowIdentity,
    pub actions: Option<&'a ActionFn>,
}

impl TableInput<'_> {
    fn has_action_column(&self) -> bool {
        self.can_edit || self.can_delete || self.details || self.actions.is_some()
    }
}

fn view_cell(descriptor: &Descriptor, entity: &Value, context: &RowContext<'_>) -> Cell {
    match &descriptor.view {
        ViewSpec::Hidden => Cell::Empty,
        ViewSpec::Shown => Cell::text(value_text(descriptor.name.get(entity))),
        ViewSpec::Static(text) => Cell::text(text.clone()),
        ViewSpec::Render(render) => render(entity, context),
    }
}

fn edit_control(descriptor: &Descriptor, draft: &Draft) -> Control {
    let name = &descriptor.name;
    let value = draft.get(name);
    if let Some(custom) = descriptor.edit.custom() {
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
            label: None,
            input: descriptor.input,
            value: value.cloned().unwrap_or_else(|| Value::String(String::new())),
            required: descriptor.required,
            error: false,
        }
    } else {
        Control::Select {
            name: name.clone(),
            label: None,
            options: descriptor.options.clone(),
            value: value.cloned().unwrap_or(Value::Null),
            multiple: false,
            required: descriptor.required,
            error: false,
        }
    }
}

fn row_actions(
    input: &TableInput<'_>,
    entity: &Value,
    context: &RowContext<'_>,
    translate: &dyn Translate,
) -> Vec<ActionButton> {
    let mut actions = Vec::new();
    if input.details {
        actions.push(RowAction::Details);
    }
    if context.editing {
        actions.extend([RowAction::Save, RowAction::Cancel]);
    } else if context.can_edit {
        actions.push(RowAction::Edit);
    }
    if context.can_delete {
        actions.push(RowAction::Delete);
    }
    let mut buttons: Vec<ActionButton> = actions
        .into_iter()
        .map(|action| ActionButton {
            label: translate.translate(action.key()),
            action,
            enabled: true,
        })
        .collect();
    if let Some(custom) = input.actions {
        buttons.extend(custom(entity, context));
    }
    if context.updating {
        for button in &mut buttons {
            button.enabled = false;
        }
    }
    buttons
}

/// Builds the table for the current page. Cells of the row being edited
/// turn into editors for every editable column.
pub fn render_table(input: &TableInput<'_>, translate: &dyn Translate) -> TableView {
    let visible: Vec<&Descriptor> = input.schema.visible().collect();
    let mut headers: Vec<HeaderCell> = visible
        .iter()
        .map(|d| HeaderCell {
            label: d.display_label(),
            wide: d.wide,
        })
        .collect();
    if input.has_action_column() {
        headers.push(HeaderCell {
            label: translate.translate("Actions"),
            wide: false,
        });
    }

    let page = paginate(input.rows, input.page, input.page_size);
    let rows = page
        .items
        .iter()
        .map(|&entity| {
            let key = input.identity.key(entity);
            let editing = input.editor.is_editing(entity, input.identity);
            let updating = key.as_ref().is_some_and(|k| input.editor.is_updating(k));
            let draft = if editing { input.editor.draft() } else { None };
            let context = RowContext {
                editing,
                updating,
                can_edit: input.can_edit,
                can_delete: input.can_delete,
                draft,
            };
            let cells = visible
                .iter()
                .map(|d| match draft {
                    Some(draft) if d.edit.is_enabled() => TableCell::Editor(edit_control(d, draft)),
                    _ => TableCell::View(view_cell(d, entity, &context)),
                })
                .collect();
            let actions = if input.has_action_column() {
                row_actions(input, entity, &context, translate)
            } else {
                Vec::new()
            };
            TableRow {
                key,
                cells,
                actions,
                editing,
                updating,
            }
        })
        .collect::<Vec<_>>();

    TableView {
        empty_text: rows
            .is_empty()
            .then(|| translate.translate("NoResults")),
        headers,
        rows,
        page: page.page,
        page_count: page.page_count,
        pager: pager_controls(page.page, page.page_count),
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionButton, ActionFn, RowAction, TableCell, TableInput, render_table};
    use crate::edit::{ByPath, RowEditor};
    use crate::fields::{Cell, Control, FieldSpec, RowContext, Schema, Tone};
    use crate::i18n::Catalog;
    use crate::pagination::PagerControl;
    use anyhow::Result;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn schema() -> Result<Schema> {
        Ok(Schema::builder()
            .label("name", "Name")
            .field("reason", FieldSpec::new().label("Reason").edit().wide())
            .field("secret", FieldSpec::new().hidden())
            .field("kind", FieldSpec::new().label("Kind").static_view("jail"))
            .view("location.world", |entity: &Value, ctx: &RowContext<'_>| {
                if ctx.updating {
                    Cell::Badge {
                        text: "busy".to_owned(),
                        tone: Tone::Info,
                    }
                } else {
                    Cell::text(entity["location"]["world"].as_str().unwrap_or_default())
                }
            })
            .build()?)
    }

    fn jails(count: i64) -> Vec<Value> {
        (1..=count)
            .map(|id| {
                json!({
                    "id": id,
                    "name": format!("Jail{id}"),
                    "reason": "griefing",
                    "location": {"world": "nether"},
                })
            })
            .collect()
    }

    fn input<'a>(
        schema: &'a Schema,
        rows: &'a [&'a Value],
        editor: &'a RowEditor,
        identity: &'a ByPath,
    ) -> TableInput<'a> {
        TableInput {
            schema,
            rows,
            page: 0,
            page_size: 20,
            can_edit: true,
            can_delete: true,
            details: false,
            editor,
            identity,
            actions: None,
        }
    }

    fn action_kinds(buttons: &[ActionButton]) -> Vec<RowAction> {
        buttons.iter().map(|b| b.action.clone()).collect()
    }

    #[test]
    fn headers_follow_visible_fields_plus_actions() -> Result<()> {
        let schema = schema()?;
        let editor = RowEditor::new();
        let identity = ByPath::default();
        let view = render_table(&input(&schema, &[], &editor, &identity), &Catalog::default());
        let labels: Vec<&str> = view.headers.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["Name", "Reason", "Kind", "<location.world>", "Actions"]);
        assert!(view.headers[1].wide);
        assert_eq!(view.empty_text.as_deref(), Some("nothing to show"));
        Ok(())
    }

    #[test]
    fn no_actions_column_without_permissions() -> Result<()> {
        let schema = schema()?;
        let editor = RowEditor::new();
        let identity = ByPath::default();
        let data = jails(1);
        let rows: Vec<&Value> = data.iter().collect();
        let mut table = input(&schema, &rows, &editor, &identity);
        table.can_edit = false;
        table.can_delete = false;
        let view = render_table(&table, &Catalog::default());
        assert_eq!(view.headers.len(), 4);
        assert!(view.rows[0].actions.is_empty());
        Ok(())
    }

    #[test]
    fn cells_use_path_text_static_text_and_render_functions() -> Result<()> {
        let schema = schema()?;
        let editor = RowEditor::new();
        let identity = ByPath::default();
        let data = vec![json!({"id": 1, "name": "Jail1", "location": {"world": "nether"}})];
        let rows: Vec<&Value> = data.iter().collect();
        let view = render_table(&input(&schema, &rows, &editor, &identity), &Catalog::default());
        assert_eq!(
            view.rows[0].cells,
            vec![
                TableCell::View(Cell::text("Jail1")),
                TableCell::View(Cell::Empty),
                TableCell::View(Cell::text("jail")),
                TableCell::View(Cell::text("nether")),
            ]
        );
        assert_eq!(
            action_kinds(&view.rows[0].actions),
            [RowAction::Edit, RowAction::Delete]
        );
        Ok(())
    }

    #[test]
    fn edit_target_renders_editors_and_save_cancel() -> Result<()> {
        let schema = schema()?;
        let identity = ByPath::default();
        let data = jails(2);
        let mut editor = RowEditor::new();
        editor.start_edit(&data[1], &schema, &identity)?;
        let rows: Vec<&Value> = data.iter().collect();
        let view = render_table(&input(&schema, &rows, &editor, &identity), &Catalog::default());

        assert!(!view.rows[0].editing);
        assert!(matches!(view.rows[0].cells[1], TableCell::View(_)));

        let target = &view.rows[1];
        assert!(target.editing);
        assert!(matches!(target.cells[0], TableCell::View(_)));
        let TableCell::Editor(Control::Input { value, .. }) = &target.cells[1] else {
            panic!("reason should be editable: {:?}", target.cells[1]);
        };
        assert_eq!(value, &json!("griefing"));
        assert_eq!(
            action_kinds(&target.actions),
            [RowAction::Save, RowAction::Cancel, RowAction::Delete]
        );
        Ok(())
    }

    #[test]
    fn change_denied_hides_edit_button() -> Result<()> {
        let schema = schema()?;
        let editor = RowEditor::new();
        let identity = ByPath::default();
        let data = jails(1);
        let rows: Vec<&Value> = data.iter().collect();
        let mut table = input(&schema, &rows, &editor, &identity);
        table.can_edit = false;
        let view = render_table(&table, &Catalog::default());
        assert_eq!(action_kinds(&view.rows[0].actions), [RowAction::Delete]);
        Ok(())
    }

    #[test]
    fn updating_rows_disable_every_button() -> Result<()> {
        let schema = schema()?;
        let identity = ByPath::default();
        let data = jails(2);
        let mut editor = RowEditor::new();
        editor.begin_delete(&data[0], &identity)?;
        let rows: Vec<&Value> = data.iter().collect();
        let extra: ActionFn = Arc::new(|_: &Value, _: &RowContext<'_>| {
            vec![ActionButton::custom("release", "Release")]
        });
        let mut table = input(&schema, &rows, &editor, &identity);
        table.details = true;
        table.actions = Some(&extra);
        let view = render_table(&table, &Catalog::default());

        let busy = &view.rows[0];
        assert!(busy.updating);
        assert_eq!(busy.cells[3], TableCell::View(Cell::Badge {
            text: "busy".to_owned(),
            tone: Tone::Info,
        }));
        assert!(busy.actions.iter().all(|b| !b.enabled));
        assert_eq!(
            action_kinds(&busy.actions),
            [
                RowAction::Details,
                RowAction::Edit,
                RowAction::Delete,
                RowAction::Custom("release".to_owned()),
            ]
        );
        assert!(view.rows[1].actions.iter().all(|b| b.enabled));
        Ok(())
    }

    #[test]
    fn window_and_pager_follow_page() -> Result<()> {
        let schema = schema()?;
        let editor = RowEditor::new();
        let identity = ByPath::default();
        let data = jails(45);
        let rows: Vec<&Value> = data.iter().collect();
        let mut table = input(&schema, &rows, &editor, &identity);
        table.page = 7;
        let view = render_table(&table, &Catalog::default());
        assert_eq!(view.page, 2);
        assert_eq!(view.page_count, 3);
        assert_eq!(view.rows.len(), 5);
        assert_eq!(view.rows[0].key.as_ref().map(|k| k.as_str()), Some("41"));
        assert!(view.pager.contains(&PagerControl::Page {
            index: 2,
            current: true
        }));
        assert!(view.empty_text.is_none());
        Ok(())
    }

    #[test]
    fn captions_are_translated() -> Result<()> {
        let schema = schema()?;
        let editor = RowEditor::new();
        let identity = ByPath::default();
        let data = jails(1);
        let rows: Vec<&Value> = data.iter().collect();
        let mut catalog = Catalog::default();
        catalog.insert("Edit", "Bearbeiten");
        catalog.insert("Actions", "Aktionen");
        let view = render_table(&input(&schema, &rows, &editor, &identity), &catalog);
        assert_eq!(view.headers.last().map(|h| h.label.as_str()), Some("Aktionen"));
        assert_eq!(view.rows[0].actions[0].label, "Bearbeiten");
        Ok(())
    }
}
