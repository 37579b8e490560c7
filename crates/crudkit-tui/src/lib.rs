// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use crudkit_app::{
    ActionButton, Choice, ContainerCommand, ContainerEvent, Control, CreateFormView, CrudBackend,
    CrudContainer, EntityKey, FieldPath, FilterPanel, InputKind, LayoutRow, PagerControl,
    RenderStamp, TableCell, TableView, Tone, value_text,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use serde_json::{Number, Value};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const POLL_INTERVAL: Duration = Duration::from_millis(120);
const FOCUS_MARK: &str = "▸";
const GAP_MARK: &str = "…";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Table,
    Row,
    Create,
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Default)]
struct ViewData {
    focus: Focus,
    selected_row: usize,
    field_index: usize,
    option_cursor: usize,
    status_token: u64,
    drawn: Option<RenderStamp>,
    dirty: bool,
}

pub fn run_app<B: CrudBackend>(container: &mut CrudContainer<B>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let result = Terminal::new(backend)
        .context("create terminal")
        .and_then(|mut terminal| event_loop(&mut terminal, container));

    container.dispatch(ContainerCommand::Unmount);
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<B: CrudBackend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    container: &mut CrudContainer<B>,
) -> Result<()> {
    let mut view_data = ViewData {
        dirty: true,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    let mounted = container.dispatch(ContainerCommand::Mount);
    note_events(&mut view_data, &internal_tx, &mounted);

    loop {
        process_internal_events(container, &mut view_data, &internal_rx);
        let pumped = container.pump();
        note_events(&mut view_data, &internal_tx, &pumped);

        let stamp = container.render_stamp();
        if view_data.dirty || view_data.drawn != Some(stamp) {
            clamp_selection(container, &mut view_data);
            terminal
                .draw(|frame| render(frame, container, &view_data))
                .context("draw frame")?;
            view_data.drawn = Some(stamp);
            view_data.dirty = false;
        }

        if !event::poll(POLL_INTERVAL).context("poll event")? {
            continue;
        }
        match event::read().context("read event")? {
            Event::Key(key) => {
                view_data.dirty = true;
                if handle_key_event(container, &mut view_data, &internal_tx, key) {
                    return Ok(());
                }
            }
            Event::Resize(_, _) => view_data.dirty = true,
            _ => {}
        }
    }
}

fn process_internal_events<B: CrudBackend>(
    container: &mut CrudContainer<B>,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                container.dispatch(ContainerCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn note_events(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>, events: &[ContainerEvent]) {
    for event in events {
        match event {
            ContainerEvent::StatusUpdated(message) => {
                debug!(%message, "status");
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(internal_tx, view_data.status_token);
            }
            ContainerEvent::PageChanged(_) | ContainerEvent::FilterChanged { .. } => {
                view_data.selected_row = 0;
            }
            ContainerEvent::Created => {
                view_data.field_index = 0;
            }
            _ => {}
        }
    }
}

fn dispatch<B: CrudBackend>(
    container: &mut CrudContainer<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: ContainerCommand,
) -> Vec<ContainerEvent> {
    let events = container.dispatch(command);
    note_events(view_data, internal_tx, &events);
    events
}

fn clamp_selection<B: CrudBackend>(container: &CrudContainer<B>, view_data: &mut ViewData) {
    let rows = container.table_view().rows.len();
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
}

fn selected_key<B: CrudBackend>(
    container: &CrudContainer<B>,
    view_data: &ViewData,
) -> Option<EntityKey> {
    container
        .table_view()
        .rows
        .get(view_data.selected_row)
        .and_then(|row| row.key.clone())
}

/// Leaf controls a focus area cycles through, groups flattened in order.
fn focus_controls<B: CrudBackend>(container: &CrudContainer<B>, focus: Focus) -> Vec<Control> {
    let mut leaves = Vec::new();
    match focus {
        Focus::Table => {}
        Focus::Row => {
            for row in container.table_view().rows.iter().filter(|row| row.editing) {
                for cell in &row.cells {
                    if let TableCell::Editor(control) = cell {
                        flatten(control, &mut leaves);
                    }
                }
            }
        }
        Focus::Create => {
            if let Some(form) = container.create_form_view() {
                for row in &form.rows {
                    for control in layout_items(row) {
                        flatten(control, &mut leaves);
                    }
                }
            }
        }
        Focus::Filter => {
            if let Some(panel) = container.filter_panel() {
                for row in &panel.rows {
                    for control in layout_items(row) {
                        flatten(control, &mut leaves);
                    }
                }
            }
        }
    }
    leaves
}

fn layout_items<T>(row: &LayoutRow<T>) -> Vec<&T> {
    match row {
        LayoutRow::Single(item) => vec![item],
        LayoutRow::Pair(first, second) => std::iter::once(first).chain(second.as_ref()).collect(),
    }
}

fn flatten(control: &Control, leaves: &mut Vec<Control>) {
    match control {
        Control::Group { controls, .. } => {
            for child in controls {
                flatten(child, leaves);
            }
        }
        leaf => leaves.push(leaf.clone()),
    }
}

fn change_command(focus: Focus, name: FieldPath, value: Value) -> Option<ContainerCommand> {
    match focus {
        Focus::Table => None,
        Focus::Row => Some(ContainerCommand::EditChange(name, value)),
        Focus::Create => Some(ContainerCommand::CreateChange(name, value)),
        Focus::Filter => Some(ContainerCommand::SetFilter(name, value)),
    }
}

/// Typed text for an input; numeric inputs store a number once the text
/// parses as one.
fn typed_value(input: InputKind, text: String) -> Value {
    if input == InputKind::Number {
        if let Ok(whole) = text.parse::<i64>() {
            return Value::Number(whole.into());
        }
        if let Some(number) = text.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(text)
}

fn cycle_choice(options: &[Choice], current: &Value, delta: isize) -> Value {
    if options.is_empty() {
        return Value::Null;
    }
    let len = options.len() as isize;
    let next = match options.iter().position(|choice| &choice.value == current) {
        Some(index) => (index as isize + delta).rem_euclid(len),
        None if delta < 0 => len - 1,
        None => 0,
    };
    options[next as usize].value.clone()
}

fn toggle_choice(current: &Value, choice: &Value) -> Value {
    let mut selected = current.as_array().cloned().unwrap_or_default();
    match selected.iter().position(|value| value == choice) {
        Some(index) => {
            selected.remove(index);
        }
        None => selected.push(choice.clone()),
    }
    Value::Array(selected)
}

/// Key handling while a form or the edited row has focus. Returns the value
/// change to dispatch, if any.
fn edit_focused_control(
    control: &Control,
    option_cursor: &mut usize,
    key: KeyEvent,
) -> Option<(FieldPath, Value)> {
    match control {
        Control::Input {
            name, input, value, ..
        } => {
            let mut text = value_text(Some(value));
            match key.code {
                KeyCode::Char(c) => text.push(c),
                KeyCode::Backspace => {
                    text.pop()?;
                }
                _ => return None,
            }
            Some((name.clone(), typed_value(*input, text)))
        }
        Control::Select {
            name,
            options,
            value,
            multiple: false,
            ..
        } => match key.code {
            KeyCode::Right | KeyCode::Char(' ') => {
                Some((name.clone(), cycle_choice(options, value, 1)))
            }
            KeyCode::Left => Some((name.clone(), cycle_choice(options, value, -1))),
            KeyCode::Backspace => Some((name.clone(), Value::Null)),
            _ => None,
        },
        Control::Select {
            name,
            options,
            value,
            multiple: true,
            ..
        } => match key.code {
            KeyCode::Right => {
                *option_cursor = (*option_cursor + 1).min(options.len().saturating_sub(1));
                None
            }
            KeyCode::Left => {
                *option_cursor = option_cursor.saturating_sub(1);
                None
            }
            KeyCode::Char(' ') => options
                .get(*option_cursor)
                .map(|choice| (name.clone(), toggle_choice(value, &choice.value))),
            KeyCode::Backspace => Some((name.clone(), Value::Array(Vec::new()))),
            _ => None,
        },
        Control::Group { .. } => None,
    }
}

fn handle_key_event<B: CrudBackend>(
    container: &mut CrudContainer<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let control_held = key.modifiers.contains(KeyModifiers::CONTROL);
    if control_held && key.code == KeyCode::Char('q') {
        return true;
    }
    if control_held && key.code == KeyCode::Char('s') {
        dispatch(container, view_data, internal_tx, ContainerCommand::SubmitCreate);
        return false;
    }

    match view_data.focus {
        Focus::Table => handle_table_key(container, view_data, internal_tx, key),
        focus => {
            handle_form_key(container, view_data, internal_tx, focus, key);
            false
        }
    }
}

fn handle_table_key<B: CrudBackend>(
    container: &mut CrudContainer<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let rows = container.table_view().rows.len();
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.selected_row = (view_data.selected_row + 1).min(rows.saturating_sub(1));
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.selected_row = view_data.selected_row.saturating_sub(1);
        }
        KeyCode::Char('n') | KeyCode::PageDown => {
            dispatch(container, view_data, internal_tx, ContainerCommand::NextPage);
        }
        KeyCode::Char('p') | KeyCode::PageUp => {
            dispatch(container, view_data, internal_tx, ContainerCommand::PrevPage);
        }
        KeyCode::Char('r') => {
            dispatch(container, view_data, internal_tx, ContainerCommand::Refresh);
        }
        KeyCode::Char('e') => {
            if let Some(key) = selected_key(container, view_data) {
                let events =
                    dispatch(container, view_data, internal_tx, ContainerCommand::StartEdit(key));
                if events
                    .iter()
                    .any(|event| matches!(event, ContainerEvent::EditStarted(_)))
                    && container.editor().draft().is_some()
                {
                    enter_focus(view_data, Focus::Row);
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some(key) = selected_key(container, view_data) {
                dispatch(container, view_data, internal_tx, ContainerCommand::Delete(key));
            }
        }
        KeyCode::Char('i') => {
            if let Some(key) = selected_key(container, view_data) {
                dispatch(container, view_data, internal_tx, ContainerCommand::Details(key));
            }
        }
        KeyCode::Char('c') => {
            if container.create_form_view().is_some() {
                enter_focus(view_data, Focus::Create);
            }
        }
        KeyCode::Char('/') => {
            if container.filter_panel().is_some() {
                enter_focus(view_data, Focus::Filter);
            }
        }
        KeyCode::Char('x') => {
            dispatch(container, view_data, internal_tx, ContainerCommand::ClearFilters);
        }
        KeyCode::Enter if container.editor().draft().is_some() => {
            enter_focus(view_data, Focus::Row);
        }
        _ => {}
    }
    false
}

fn enter_focus(view_data: &mut ViewData, focus: Focus) {
    view_data.focus = focus;
    view_data.field_index = 0;
    view_data.option_cursor = 0;
}

fn handle_form_key<B: CrudBackend>(
    container: &mut CrudContainer<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    focus: Focus,
    key: KeyEvent,
) {
    let controls = focus_controls(container, focus);
    match key.code {
        KeyCode::Esc => {
            if focus == Focus::Row {
                dispatch(container, view_data, internal_tx, ContainerCommand::CancelEdit);
            }
            enter_focus(view_data, Focus::Table);
        }
        KeyCode::Enter => match focus {
            Focus::Row => {
                dispatch(container, view_data, internal_tx, ContainerCommand::Save);
                enter_focus(view_data, Focus::Table);
            }
            Focus::Create => {
                dispatch(container, view_data, internal_tx, ContainerCommand::SubmitCreate);
            }
            _ => enter_focus(view_data, Focus::Table),
        },
        KeyCode::Tab | KeyCode::BackTab if !controls.is_empty() => {
            let len = controls.len();
            view_data.field_index = if key.code == KeyCode::Tab {
                (view_data.field_index + 1) % len
            } else {
                (view_data.field_index + len - 1) % len
            };
            view_data.option_cursor = 0;
        }
        _ => {
            let Some(control) = controls.get(view_data.field_index) else {
                return;
            };
            if let Some((name, value)) =
                edit_focused_control(control, &mut view_data.option_cursor, key)
                && let Some(command) = change_command(focus, name, value)
            {
                dispatch(container, view_data, internal_tx, command);
            }
        }
    }
}

fn render<B: CrudBackend>(
    frame: &mut ratatui::Frame<'_>,
    container: &CrudContainer<B>,
    view_data: &ViewData,
) {
    let create = container.create_form_view();
    let filter = container.filter_panel();
    let top_height = [
        create.as_ref().map_or(0, |form| form.rows.len() + 1),
        filter
            .as_ref()
            .map_or(0, |panel| panel.rows.len() + usize::from(panel.error.is_some())),
    ]
    .into_iter()
    .max()
    .unwrap_or(0);
    let top_height = if top_height == 0 {
        0
    } else {
        u16::try_from(top_height + 2).unwrap_or(u16::MAX)
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top_height),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_forms(frame, layout[0], container, view_data, create.as_ref(), filter.as_ref());
    render_table(frame, layout[1], container, view_data);

    let status = Paragraph::new(status_text(container, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[2]);
}

fn render_forms<B: CrudBackend>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    container: &CrudContainer<B>,
    view_data: &ViewData,
    create: Option<&CreateFormView>,
    filter: Option<&FilterPanel>,
) {
    if area.height == 0 {
        return;
    }
    let areas: Vec<Rect> = match (create, filter) {
        (Some(_), Some(_)) => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
            .to_vec(),
        _ => vec![area],
    };
    let mut slots = areas.into_iter();

    if let Some(form) = create
        && let Some(slot) = slots.next()
    {
        let focused = (view_data.focus == Focus::Create).then_some(view_data.field_index);
        let border = focus_style(view_data.focus == Focus::Create);
        let widget = Paragraph::new(create_form_text(form, focused)).block(
            Block::default()
                .title(container.translate("Create"))
                .borders(Borders::ALL)
                .border_style(border),
        );
        frame.render_widget(widget, slot);
    }
    if let Some(panel) = filter
        && let Some(slot) = slots.next()
    {
        let focused = (view_data.focus == Focus::Filter).then_some(view_data.field_index);
        let border = focus_style(view_data.focus == Focus::Filter);
        let widget = Paragraph::new(filter_panel_text(panel, focused)).block(
            Block::default()
                .title(container.translate("Filter"))
                .borders(Borders::ALL)
                .border_style(border),
        );
        frame.render_widget(widget, slot);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Neutral => Style::default(),
        Tone::Info => Style::default().fg(Color::Blue),
        Tone::Error => Style::default().fg(Color::Red),
    }
}

fn render_table<B: CrudBackend>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    container: &CrudContainer<B>,
    view_data: &ViewData,
) {
    let view = container.table_view();
    let title = table_title(container.entity_type().as_str(), &view);
    let block = Block::default().title(title).borders(Borders::ALL).border_style(focus_style(
        matches!(view_data.focus, Focus::Table | Focus::Row),
    ));

    if let Some(empty) = &view.empty_text {
        frame.render_widget(Paragraph::new(empty.clone()).block(block), area);
        return;
    }

    let widths: Vec<Constraint> = view
        .headers
        .iter()
        .map(|header| {
            if header.wide {
                Constraint::Min(24)
            } else {
                Constraint::Min(10)
            }
        })
        .collect();
    let header = Row::new(view.headers.iter().map(|header| {
        Cell::from(header.label.clone()).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let editing_focus = (view_data.focus == Focus::Row).then_some(view_data.field_index);
    let rows = view.rows.iter().enumerate().map(|(index, row)| {
        let mut leaf = 0;
        let mut cells: Vec<Cell<'_>> = row
            .cells
            .iter()
            .map(|cell| {
                let (text, style) = match cell {
                    TableCell::View(crudkit_app::Cell::Badge { text, tone }) => {
                        (text.clone(), tone_style(*tone))
                    }
                    TableCell::View(view) => (view.display().to_owned(), Style::default()),
                    TableCell::Editor(control) => {
                        let focused = editing_focus.and_then(|field| field.checked_sub(leaf));
                        leaf += leaf_count(control);
                        (control_text(control, focused), Style::default().fg(Color::Cyan))
                    }
                };
                Cell::from(text).style(style)
            })
            .collect();
        if !row.actions.is_empty() {
            cells.push(Cell::from(actions_text(&row.actions)));
        }
        let mut style = Style::default();
        if row.updating {
            style = style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC);
        }
        if index == view_data.selected_row {
            style = style.bg(Color::DarkGray);
        }
        Row::new(cells).style(style)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn leaf_count(control: &Control) -> usize {
    match control {
        Control::Group { controls, .. } => controls.iter().map(leaf_count).sum(),
        _ => 1,
    }
}

fn display_value(value: &Value, options: &[Choice]) -> String {
    let choice_text = |value: &Value| {
        options
            .iter()
            .find(|choice| &choice.value == value)
            .map_or_else(|| value_text(Some(value)), |choice| choice.text.clone())
    };
    match value {
        Value::Array(items) => items.iter().map(choice_text).collect::<Vec<_>>().join(", "),
        other => choice_text(other),
    }
}

/// One control as text; `focused` is the index of the focused leaf relative
/// to this control's first leaf.
fn control_text(control: &Control, focused: Option<usize>) -> String {
    match control {
        Control::Input {
            label,
            value,
            required,
            error,
            ..
        }
        | Control::Select {
            label,
            value,
            required,
            error,
            ..
        } => {
            let options: &[Choice] = match control {
                Control::Select { options, .. } => options,
                _ => &[],
            };
            let mut text = String::new();
            if focused == Some(0) {
                text.push_str(FOCUS_MARK);
            }
            if let Some(label) = label {
                text.push_str(label);
                if *required {
                    text.push('*');
                }
                text.push_str(": ");
            }
            let bracket = if matches!(control, Control::Select { multiple: true, .. }) {
                ('{', '}')
            } else if matches!(control, Control::Select { .. }) {
                ('<', '>')
            } else {
                ('[', ']')
            };
            text.push(bracket.0);
            text.push_str(&display_value(value, options));
            text.push(bracket.1);
            if *error {
                text.push('!');
            }
            text
        }
        Control::Group { label, controls } => {
            let mut parts = Vec::new();
            if let Some(label) = label {
                parts.push(format!("{label}:"));
            }
            let mut offset = 0;
            for child in controls {
                let relative = focused.and_then(|index| index.checked_sub(offset));
                parts.push(control_text(child, relative));
                offset += leaf_count(child);
            }
            parts.join(" ")
        }
    }
}

fn layout_text(rows: &[LayoutRow<Control>], focused: Option<usize>) -> Vec<String> {
    let mut offset = 0;
    rows.iter()
        .map(|row| {
            layout_items(row)
                .into_iter()
                .map(|control| {
                    let relative = focused.and_then(|index| index.checked_sub(offset));
                    offset += leaf_count(control);
                    control_text(control, relative)
                })
                .collect::<Vec<_>>()
                .join("   ")
        })
        .collect()
}

fn create_form_text(form: &CreateFormView, focused: Option<usize>) -> String {
    let mut lines = layout_text(&form.rows, focused);
    let button = if form.busy {
        format!("( {} … )", form.button)
    } else if form.submit_enabled {
        format!("[ {} ]", form.button)
    } else {
        format!("( {} )", form.button)
    };
    lines.push(button);
    lines.join("\n")
}

fn filter_panel_text(panel: &FilterPanel, focused: Option<usize>) -> String {
    let mut lines = layout_text(&panel.rows, focused);
    if let Some(error) = &panel.error {
        lines.push(format!("! {error}"));
    }
    lines.join("\n")
}

fn actions_text(actions: &[ActionButton]) -> String {
    actions
        .iter()
        .map(|button| {
            if button.enabled {
                button.label.clone()
            } else {
                format!("({})", button.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn pager_text(pager: &[PagerControl]) -> String {
    pager
        .iter()
        .map(|control| match control {
            PagerControl::First => "«".to_owned(),
            PagerControl::Gap => GAP_MARK.to_owned(),
            PagerControl::Page { index, current: true } => format!("[{}]", index + 1),
            PagerControl::Page { index, .. } => (index + 1).to_string(),
            PagerControl::Last(index) => format!("» {}", index + 1),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn table_title(entity_type: &str, view: &TableView) -> String {
    let pager = pager_text(&view.pager);
    if pager.is_empty() {
        entity_type.to_owned()
    } else {
        format!("{entity_type} {pager}")
    }
}

fn refreshed_text(at: Option<OffsetDateTime>) -> String {
    let format = format_description!("[hour]:[minute]:[second]");
    at.and_then(|at| at.format(&format).ok())
        .map_or_else(|| "never".to_owned(), |time| format!("refreshed {time}"))
}

fn status_text<B: CrudBackend>(container: &CrudContainer<B>, view_data: &ViewData) -> String {
    let mode = match view_data.focus {
        Focus::Table => "LIST",
        Focus::Row => "EDIT",
        Focus::Create => "CREATE",
        Focus::Filter => "FILTER",
    };
    let keys = match view_data.focus {
        Focus::Table => "j/k n/p | e edit d delete | c create / filter x clear | r refresh | q",
        Focus::Row => "tab field | enter save esc cancel",
        Focus::Create => "tab field | enter/ctrl+s create esc back",
        Focus::Filter => "tab field | space toggle esc back",
    };
    let refreshed = refreshed_text(container.last_refreshed());
    match container.status() {
        Some(status) => format!("{mode} | {status} | {refreshed} | {keys}"),
        None => format!("{mode} | {refreshed} | {keys}"),
    }
}
