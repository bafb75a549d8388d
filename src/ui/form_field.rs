//! Input widgets used by the step configuration dialog

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_textarea::TextArea;

use crate::editor::{FieldKind, ModalField};

/// A single editable input
pub enum FormField {
    /// Single-line text input
    TextInput {
        value: String,
        /// Cursor position in characters
        cursor_pos: usize,
        placeholder: String,
        /// Only accept ASCII digits
        digits_only: bool,
    },
    /// Multi-line text input using tui-textarea
    TextArea {
        textarea: Box<TextArea<'static>>,
        placeholder: String,
    },
    /// One of a fixed list of options, cycled in place
    Select {
        /// (key, display name)
        options: Vec<(String, String)>,
        selected: usize,
    },
    /// Boolean toggle
    Toggle { value: bool },
}

impl FormField {
    pub fn text(value: &str, placeholder: &str) -> Self {
        FormField::TextInput {
            cursor_pos: value.chars().count(),
            value: value.to_string(),
            placeholder: placeholder.to_string(),
            digits_only: false,
        }
    }

    pub fn digits(value: &str, placeholder: &str) -> Self {
        FormField::TextInput {
            cursor_pos: value.chars().count(),
            value: value.to_string(),
            placeholder: placeholder.to_string(),
            digits_only: true,
        }
    }

    pub fn text_area(value: &str, placeholder: &str) -> Self {
        let mut textarea = TextArea::default();
        textarea.insert_str(value);
        FormField::TextArea {
            textarea: Box::new(textarea),
            placeholder: placeholder.to_string(),
        }
    }

    /// Select over `options`, starting on the one whose key is `current`
    pub fn select(options: Vec<(String, String)>, current: &str) -> Self {
        let selected = options
            .iter()
            .position(|(key, _)| key == current)
            .unwrap_or(0);
        FormField::Select { options, selected }
    }

    pub fn toggle(value: bool) -> Self {
        FormField::Toggle { value }
    }

    /// Widget for a schema-bound dialog field
    pub fn for_modal_field(field: &ModalField) -> Self {
        let placeholder = field.schema.placeholder.unwrap_or_default();
        match field.schema.kind {
            FieldKind::MultilineText => Self::text_area(&field.value, placeholder),
            FieldKind::PositiveInteger => Self::digits(&field.value, placeholder),
            FieldKind::Text | FieldKind::Email | FieldKind::Url => {
                Self::text(&field.value, placeholder)
            }
        }
    }

    /// Current value as a string; selects yield the option key
    pub fn value(&self) -> String {
        match self {
            FormField::TextInput { value, .. } => value.clone(),
            FormField::TextArea { textarea, .. } => textarea.lines().join("\n"),
            FormField::Select { options, selected } => options
                .get(*selected)
                .map(|(key, _)| key.clone())
                .unwrap_or_default(),
            FormField::Toggle { value } => value.to_string(),
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, FormField::Toggle { value: true })
    }

    /// Handle a key, returns true if the key was consumed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                digits_only,
                ..
            } => match key {
                KeyCode::Char(c) => {
                    if !*digits_only || c.is_ascii_digit() {
                        let at = byte_offset(value, *cursor_pos);
                        value.insert(at, c);
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Backspace => {
                    if *cursor_pos > 0 {
                        *cursor_pos -= 1;
                        let at = byte_offset(value, *cursor_pos);
                        value.remove(at);
                    }
                    true
                }
                KeyCode::Delete => {
                    if *cursor_pos < value.chars().count() {
                        let at = byte_offset(value, *cursor_pos);
                        value.remove(at);
                    }
                    true
                }
                KeyCode::Left => {
                    *cursor_pos = cursor_pos.saturating_sub(1);
                    true
                }
                KeyCode::Right => {
                    if *cursor_pos < value.chars().count() {
                        *cursor_pos += 1;
                    }
                    true
                }
                KeyCode::Home => {
                    *cursor_pos = 0;
                    true
                }
                KeyCode::End => {
                    *cursor_pos = value.chars().count();
                    true
                }
                _ => false,
            },
            FormField::TextArea { textarea, .. } => {
                textarea.input(KeyEvent::new(key, KeyModifiers::NONE));
                true
            }
            FormField::Select { options, selected } => match key {
                KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                    *selected = selected
                        .checked_sub(1)
                        .unwrap_or(options.len().saturating_sub(1));
                    true
                }
                KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                    if !options.is_empty() {
                        *selected = (*selected + 1) % options.len();
                    }
                    true
                }
                _ => false,
            },
            FormField::Toggle { value } => match key {
                KeyCode::Char(' ') => {
                    *value = !*value;
                    true
                }
                KeyCode::Left | KeyCode::Char('n') => {
                    *value = false;
                    true
                }
                KeyCode::Right | KeyCode::Char('y') => {
                    *value = true;
                    true
                }
                _ => false,
            },
        }
    }

    /// Rows this field takes when rendered
    pub fn render_height(&self) -> u16 {
        match self {
            FormField::TextArea { .. } => 5,
            FormField::TextInput { .. } | FormField::Select { .. } | FormField::Toggle { .. } => 1,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let text_style = Style::default().fg(if focused { Color::White } else { Color::Gray });

        match self {
            FormField::TextInput {
                value,
                cursor_pos,
                placeholder,
                ..
            } => {
                let content = if value.is_empty() && !focused {
                    Line::from(Span::styled(
                        placeholder.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else if focused {
                    let mut text = value.clone();
                    text.insert(byte_offset(value, *cursor_pos), '|');
                    Line::from(text)
                } else {
                    Line::from(value.as_str())
                };
                frame.render_widget(Paragraph::new(content).style(text_style), area);
            }
            FormField::TextArea {
                textarea,
                placeholder,
            } => {
                let border_color = if focused { Color::Cyan } else { Color::Gray };
                textarea.set_cursor_line_style(Style::default());
                textarea.set_cursor_style(if focused {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                });
                textarea.set_block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(border_color)),
                );
                textarea.set_placeholder_text(placeholder.clone());
                textarea.set_placeholder_style(Style::default().fg(Color::DarkGray));

                frame.render_widget(&**textarea, area);
            }
            FormField::Select { options, selected } => {
                let name = options
                    .get(*selected)
                    .map(|(_, name)| name.as_str())
                    .unwrap_or_default();
                let arrow_style = Style::default().fg(if focused {
                    Color::Cyan
                } else {
                    Color::DarkGray
                });
                let line = Line::from(vec![
                    Span::styled("◀ ", arrow_style),
                    Span::styled(name, text_style.add_modifier(Modifier::BOLD)),
                    Span::styled(" ▶", arrow_style),
                ]);
                frame.render_widget(Paragraph::new(line), area);
            }
            FormField::Toggle { value } => {
                let (mark, color) = if *value {
                    ("[x]", Color::Green)
                } else {
                    ("[ ]", Color::DarkGray)
                };
                let mut style = Style::default().fg(color);
                if focused {
                    style = style.add_modifier(Modifier::BOLD);
                }
                frame.render_widget(Paragraph::new(Span::styled(mark, style)), area);
            }
        }
    }
}

/// Byte index of the `chars`-th character, or the end of the string
fn byte_offset(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map_or(s.len(), |(i, _)| i)
}
