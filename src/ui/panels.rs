use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::types::{StepId, StepType};

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// Glyph shown next to a step type
pub fn glyph_for(step_type: StepType) -> &'static str {
    match step_type {
        StepType::Form => "▤",
        StepType::Email => "✉",
        StepType::Timer => "◷",
        StepType::Approval => "✔",
        StepType::Condition => "◇",
        StepType::Webhook => "⇄",
    }
}

fn color_for(step_type: StepType) -> Color {
    match step_type {
        StepType::Form => Color::Blue,
        StepType::Email => Color::Yellow,
        StepType::Timer => Color::Magenta,
        StepType::Approval => Color::Green,
        StepType::Condition => Color::Cyan,
        StepType::Webhook => Color::Red,
    }
}

/// The list of step types a user can drop onto the canvas
pub struct PalettePanel {
    pub state: ListState,
}

impl Default for PalettePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PalettePanel {
    pub fn new() -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        Self { state }
    }

    pub fn selected(&self) -> Option<StepType> {
        self.state
            .selected()
            .and_then(|i| StepType::all().get(i).copied())
    }

    pub fn select_next(&mut self) {
        let last = StepType::all().len() - 1;
        let next = self.state.selected().map_or(0, |i| (i + 1).min(last));
        self.state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let prev = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(prev));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let items: Vec<ListItem> = StepType::all()
            .iter()
            .map(|t| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{} ", glyph_for(*t)),
                        Style::default().fg(color_for(*t)),
                    ),
                    Span::raw(t.display_name()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Steps")
                    .borders(Borders::ALL)
                    .border_style(border_style(focused)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

/// One canvas line, precomputed by the app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasRow {
    pub id: StepId,
    pub step_type: StepType,
    pub label: String,
    pub configured: bool,
    /// Recently saved from the dialog
    pub highlighted: bool,
    /// Currently picked up for reordering
    pub grabbed: bool,
}

/// The ordered steps of the workflow
#[derive(Default)]
pub struct CanvasPanel {
    pub state: ListState,
}

impl CanvasPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the selection inside a list of `len` rows
    pub fn clamp(&mut self, len: usize) {
        match (self.state.selected(), len) {
            (_, 0) => self.state.select(None),
            (None, _) => self.state.select(Some(0)),
            (Some(i), _) if i >= len => self.state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let next = self.state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let prev = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(prev));
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool, rows: &[CanvasRow]) {
        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut label_style = Style::default().add_modifier(Modifier::BOLD);
                if row.highlighted {
                    label_style = label_style.fg(Color::Black).bg(Color::Green);
                } else if row.grabbed {
                    label_style = label_style.fg(Color::Yellow);
                }

                let status = if row.configured {
                    Span::styled(" ✓ configured", Style::default().fg(Color::Green))
                } else {
                    Span::styled(" not configured", Style::default().fg(Color::DarkGray))
                };

                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::Gray)),
                    Span::styled(
                        format!("{} ", glyph_for(row.step_type)),
                        Style::default().fg(color_for(row.step_type)),
                    ),
                    Span::styled(row.label.as_str(), label_style),
                    status,
                    Span::styled(
                        format!("  [{}]", row.id),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let title = if rows.iter().any(|r| r.grabbed) {
            format!("Workflow ({}) - moving", rows.len())
        } else {
            format!("Workflow ({})", rows.len())
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style(focused));

        if rows.is_empty() {
            let hint = ListItem::new(Span::styled(
                "Select a step type and press Enter to add it here",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(List::new(vec![hint]).block(block), area);
            return;
        }

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}
