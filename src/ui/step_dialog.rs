//! Step configuration dialog.
//!
//! A view over [`OpenModal`]: edits happen in local widgets and are written
//! back to the session only when the user saves.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;
use super::form_field::FormField;
use crate::editor::OpenModal;
use crate::types::{FieldSpec, FormFieldType, StepId};

/// What the dialog asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    AddFieldRow,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowPart {
    Label,
    Type,
    Choices,
    Required,
}

const ROW_PARTS: [RowPart; 4] = [
    RowPart::Label,
    RowPart::Type,
    RowPart::Choices,
    RowPart::Required,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Row(usize, RowPart),
    AddField,
    Save,
    Cancel,
}

struct InputField {
    name: &'static str,
    label: &'static str,
    required: bool,
    widget: FormField,
}

/// Widgets for one form field row
struct FieldRow {
    label: FormField,
    field_type: FormField,
    choices: FormField,
    required: FormField,
}

impl FieldRow {
    fn from_spec(spec: &FieldSpec) -> Self {
        let options = FormFieldType::all()
            .iter()
            .map(|t| (t.key().to_string(), t.display_name().to_string()))
            .collect();
        Self {
            label: FormField::text(&spec.label, "Field label"),
            field_type: FormField::select(options, spec.field_type.key()),
            choices: FormField::text(&spec.choices, "Choices (comma separated)"),
            required: FormField::toggle(spec.required),
        }
    }

    fn part_mut(&mut self, part: RowPart) -> &mut FormField {
        match part {
            RowPart::Label => &mut self.label,
            RowPart::Type => &mut self.field_type,
            RowPart::Choices => &mut self.choices,
            RowPart::Required => &mut self.required,
        }
    }

    fn to_spec(&self) -> FieldSpec {
        FieldSpec {
            label: self.label.value(),
            field_type: FormFieldType::from(self.field_type.value()),
            required: self.required.is_on(),
            choices: self.choices.value(),
        }
    }
}

pub struct StepDialog {
    step_id: StepId,
    title: String,
    fields: Vec<InputField>,
    rows: Vec<FieldRow>,
    has_field_rows: bool,
    focus: usize,
    error: Option<String>,
}

impl StepDialog {
    pub fn from_modal(modal: &OpenModal) -> Self {
        let fields = modal
            .fields
            .iter()
            .map(|field| InputField {
                name: field.schema.name,
                label: field.schema.label,
                required: field.schema.required,
                widget: FormField::for_modal_field(field),
            })
            .collect();

        Self {
            step_id: modal.step_id.clone(),
            title: modal.title(),
            fields,
            rows: modal.rows.iter().map(FieldRow::from_spec).collect(),
            has_field_rows: modal.has_field_rows(),
            focus: 0,
            error: None,
        }
    }

    pub fn step_id(&self) -> &StepId {
        &self.step_id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Values of the schema fields, by field name
    pub fn values(&self) -> Vec<(&'static str, String)> {
        self.fields
            .iter()
            .map(|f| (f.name, f.widget.value()))
            .collect()
    }

    /// Form field rows in display order
    pub fn rows(&self) -> Vec<FieldSpec> {
        self.rows.iter().map(FieldRow::to_spec).collect()
    }

    /// Append a blank row and move focus to its label
    pub fn push_row(&mut self) {
        self.rows.push(FieldRow::from_spec(&FieldSpec::default()));
        let index = self.rows.len() - 1;
        if let Some(pos) = self
            .targets()
            .iter()
            .position(|t| *t == FocusTarget::Row(index, RowPart::Label))
        {
            self.focus = pos;
        }
    }

    fn targets(&self) -> Vec<FocusTarget> {
        let mut targets: Vec<FocusTarget> =
            (0..self.fields.len()).map(FocusTarget::Field).collect();
        for index in 0..self.rows.len() {
            targets.extend(ROW_PARTS.iter().map(|part| FocusTarget::Row(index, *part)));
        }
        if self.has_field_rows {
            targets.push(FocusTarget::AddField);
        }
        targets.push(FocusTarget::Save);
        targets.push(FocusTarget::Cancel);
        targets
    }

    fn focused(&self) -> FocusTarget {
        let targets = self.targets();
        targets
            .get(self.focus)
            .copied()
            .unwrap_or(FocusTarget::Save)
    }

    fn focused_widget_mut(&mut self) -> Option<&mut FormField> {
        match self.focused() {
            FocusTarget::Field(i) => self.fields.get_mut(i).map(|f| &mut f.widget),
            FocusTarget::Row(i, part) => self.rows.get_mut(i).map(|r| r.part_mut(part)),
            FocusTarget::AddField | FocusTarget::Save | FocusTarget::Cancel => None,
        }
    }

    fn focused_is_text_area(&self) -> bool {
        matches!(
            self.focused(),
            FocusTarget::Field(i) if matches!(self.fields[i].widget, FormField::TextArea { .. })
        )
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<DialogAction> {
        let count = self.targets().len();
        match key {
            KeyCode::Esc => return Some(DialogAction::Cancel),
            KeyCode::Tab => self.focus = (self.focus + 1) % count,
            KeyCode::BackTab => self.focus = self.focus.checked_sub(1).unwrap_or(count - 1),
            KeyCode::Enter => match self.focused() {
                FocusTarget::AddField => return Some(DialogAction::AddFieldRow),
                FocusTarget::Cancel => return Some(DialogAction::Cancel),
                FocusTarget::Save => return Some(DialogAction::Submit),
                _ if self.focused_is_text_area() => {
                    if let Some(widget) = self.focused_widget_mut() {
                        widget.handle_key(key);
                    }
                }
                _ => return Some(DialogAction::Submit),
            },
            _ => {
                if let Some(widget) = self.focused_widget_mut() {
                    widget.handle_key(key);
                }
            }
        }
        None
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let focused = self.focused();

        let mut constraints: Vec<Constraint> = self
            .fields
            .iter()
            .map(|f| Constraint::Length(f.widget.render_height() + 2))
            .collect();
        if self.has_field_rows {
            constraints.push(Constraint::Length(1)); // rows heading
            constraints.extend(self.rows.iter().map(|_| Constraint::Length(1)));
        }
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(1)); // error
        constraints.push(Constraint::Length(1)); // buttons
        constraints.push(Constraint::Length(1)); // help

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(constraints)
            .split(inner);

        let mut slot = 0;
        for (index, field) in self.fields.iter_mut().enumerate() {
            let is_focused = focused == FocusTarget::Field(index);
            render_labelled(frame, chunks[slot], field, is_focused);
            slot += 1;
        }

        if self.has_field_rows {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "Fields (label / type / choices / required)",
                    Style::default().fg(Color::Gray),
                )),
                chunks[slot],
            );
            slot += 1;
            for (index, row) in self.rows.iter_mut().enumerate() {
                render_row(frame, chunks[slot], row, index, focused);
                slot += 1;
            }
        }
        slot += 1;

        if let Some(error) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    error.as_str(),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                chunks[slot],
            );
        }
        slot += 1;

        let mut buttons = Vec::new();
        if self.has_field_rows {
            buttons.push(button("Add field", focused == FocusTarget::AddField));
            buttons.push(Span::raw("  "));
        }
        buttons.push(button("Save", focused == FocusTarget::Save));
        buttons.push(Span::raw("  "));
        buttons.push(button("Cancel", focused == FocusTarget::Cancel));
        frame.render_widget(
            Paragraph::new(Line::from(buttons)).alignment(Alignment::Center),
            chunks[slot],
        );
        slot += 1;

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" next  "),
            Span::styled("Shift+Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" prev  "),
            Span::styled("Enter", Style::default().fg(Color::Yellow)),
            Span::raw(" save  "),
            Span::styled("Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" cancel"),
        ]);
        frame.render_widget(
            Paragraph::new(help).alignment(Alignment::Center),
            chunks[slot],
        );
    }
}

fn render_labelled(frame: &mut Frame, area: Rect, field: &mut InputField, focused: bool) {
    let marker = if field.required { "*" } else { "" };
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(format!("{}{}", field.label, marker), label_style)),
        Rect { height: 1, ..area },
    );

    let input_area = Rect {
        y: area.y + 1,
        height: field.widget.render_height().min(area.height.saturating_sub(1)),
        ..area
    };
    field.widget.render(frame, input_area, focused);
}

fn render_row(frame: &mut Frame, area: Rect, row: &mut FieldRow, index: usize, focused: FocusTarget) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Length(4),
        ])
        .spacing(1)
        .split(area);

    for (cell, part) in cells.iter().zip(ROW_PARTS) {
        let is_focused = focused == FocusTarget::Row(index, part);
        row.part_mut(part).render(frame, *cell, is_focused);
    }
}

fn button(label: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("[ {} ]", label), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{ConfigStore, ModalController};
    use crate::types::{ConfigEntry, FormConfig, StepType};

    fn dialog_for(step_type: StepType, store: &ConfigStore) -> StepDialog {
        let mut controller = ModalController::new();
        let modal = controller.open(StepId::from("temp-1"), step_type, store);
        StepDialog::from_modal(modal)
    }

    fn type_text(dialog: &mut StepDialog, text: &str) {
        for c in text.chars() {
            dialog.handle_key(KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let mut dialog = dialog_for(StepType::Email, &ConfigStore::new());
        type_text(&mut dialog, "Welcome");
        dialog.handle_key(KeyCode::Tab);
        type_text(&mut dialog, "Hi");

        assert_eq!(
            dialog.values(),
            vec![("subject", "Welcome".to_string()), ("body", "Hi".to_string())]
        );
    }

    #[test]
    fn test_enter_in_body_adds_newline() {
        let mut dialog = dialog_for(StepType::Email, &ConfigStore::new());
        dialog.handle_key(KeyCode::Tab);
        type_text(&mut dialog, "a");
        assert_eq!(dialog.handle_key(KeyCode::Enter), None);
        type_text(&mut dialog, "b");
        assert_eq!(dialog.values()[1].1, "a\nb");
    }

    #[test]
    fn test_enter_in_single_line_submits() {
        let mut dialog = dialog_for(StepType::Webhook, &ConfigStore::new());
        assert_eq!(dialog.handle_key(KeyCode::Enter), Some(DialogAction::Submit));
        assert_eq!(dialog.handle_key(KeyCode::Esc), Some(DialogAction::Cancel));
    }

    #[test]
    fn test_buttons_via_focus() {
        // timer: delay, Save, Cancel
        let mut dialog = dialog_for(StepType::Timer, &ConfigStore::new());
        dialog.handle_key(KeyCode::BackTab);
        assert_eq!(dialog.handle_key(KeyCode::Enter), Some(DialogAction::Cancel));
        dialog.handle_key(KeyCode::BackTab);
        assert_eq!(dialog.handle_key(KeyCode::Enter), Some(DialogAction::Submit));
    }

    #[test]
    fn test_add_field_button_only_on_form() {
        let mut form = dialog_for(StepType::Form, &ConfigStore::new());
        // title, Add field, Save, Cancel
        form.handle_key(KeyCode::Tab);
        assert_eq!(
            form.handle_key(KeyCode::Enter),
            Some(DialogAction::AddFieldRow)
        );

        let mut approval = dialog_for(StepType::Approval, &ConfigStore::new());
        approval.handle_key(KeyCode::Tab);
        assert_eq!(
            approval.handle_key(KeyCode::Enter),
            Some(DialogAction::Submit)
        );
    }

    #[test]
    fn test_rows_are_edited_in_place() {
        let mut dialog = dialog_for(StepType::Form, &ConfigStore::new());
        dialog.push_row();
        type_text(&mut dialog, "Amount");
        dialog.handle_key(KeyCode::Tab);
        dialog.handle_key(KeyCode::Right); // Text -> Textarea
        dialog.handle_key(KeyCode::Tab);
        dialog.handle_key(KeyCode::Tab);
        dialog.handle_key(KeyCode::Char(' '));

        let rows = dialog.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Amount");
        assert_eq!(rows[0].field_type, FormFieldType::Textarea);
        assert!(rows[0].required);
    }

    #[test]
    fn test_loads_stored_rows() {
        let mut store = ConfigStore::new();
        store.set(
            StepId::from("temp-1"),
            ConfigEntry::Form(FormConfig {
                title: "Trip".to_string(),
                fields: vec![FieldSpec {
                    label: "Destination".to_string(),
                    ..FieldSpec::default()
                }],
            }),
        );
        let dialog = dialog_for(StepType::Form, &store);
        assert_eq!(dialog.values(), vec![("title", "Trip".to_string())]);
        assert_eq!(dialog.rows()[0].label, "Destination");
        assert_eq!(dialog.rows()[0].field_type, FormFieldType::Text);
    }
}
