pub mod form_field;
pub mod notification;
pub mod panels;
pub mod step_dialog;
pub mod terminal_guard;

pub use notification::{NotificationLevel, Notifier};
pub use panels::{CanvasPanel, CanvasRow, PalettePanel};
pub use step_dialog::{DialogAction, StepDialog};
pub use terminal_guard::{install_panic_hook, TerminalGuard};

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Helper to create a centered rect
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
