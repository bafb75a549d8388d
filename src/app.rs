use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{spawn_save, SavePayload, SaveReport, WorkflowBackend};
use crate::config::Config;
use crate::editor::{renumber, Command, DragTransfer, EditorSession, Outcome};
use crate::types::{StepId, StepView};
use crate::ui::{
    CanvasPanel, CanvasRow, DialogAction, NotificationLevel, Notifier, PalettePanel, StepDialog,
    TerminalGuard,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Palette,
    Canvas,
}

/// Side effects requested by a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Save(SavePayload),
    Quit,
}

/// A step picked up on the canvas, with the order it would be dropped in
#[derive(Debug, Clone)]
struct Grab {
    id: StepId,
    order: Vec<StepId>,
    original_index: usize,
}

#[derive(Debug, Clone)]
struct Highlight {
    id: StepId,
    until: Instant,
}

pub struct App {
    config: Config,
    session: EditorSession,
    backend: Arc<dyn WorkflowBackend>,
    focus: Focus,
    palette: PalettePanel,
    canvas: CanvasPanel,
    grab: Option<Grab>,
    dialog: Option<StepDialog>,
    notifier: Notifier,
    highlight: Option<Highlight>,
    saves_in_flight: usize,
    save_tx: UnboundedSender<SaveReport>,
    save_rx: UnboundedReceiver<SaveReport>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, session: EditorSession, backend: Arc<dyn WorkflowBackend>) -> Self {
        let (save_tx, save_rx) = mpsc::unbounded_channel();
        let mut canvas = CanvasPanel::new();
        canvas.clamp(session.steps().len());

        Self {
            notifier: Notifier::new(Duration::from_millis(config.ui.notification_ms)),
            config,
            session,
            backend,
            focus: Focus::Palette,
            palette: PalettePanel::new(),
            canvas,
            grab: None,
            dialog: None,
            highlight: None,
            saves_in_flight: 0,
            save_tx,
            save_rx,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn dialog(&self) -> Option<&StepDialog> {
        self.dialog.as_ref()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn saves_in_flight(&self) -> usize {
        self.saves_in_flight
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.notifier.show(message, level);
    }

    pub async fn run(&mut self) -> Result<()> {
        let (_guard, mut terminal) = TerminalGuard::enter()?;
        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        tracing::info!(
            session = %self.session.id(),
            url = %self.backend.endpoint(),
            "Editor started"
        );

        while !self.should_quit {
            terminal.draw(|f| self.render(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = self.handle_key(key) {
                            self.perform(action);
                        }
                    }
                }
            }

            self.poll_saves();
            self.tick(Instant::now());
        }

        if self.saves_in_flight > 0 {
            tracing::warn!(
                pending = self.saves_in_flight,
                "Quitting with saves still in flight"
            );
        }
        Ok(())
    }

    fn perform(&mut self, action: AppAction) {
        match action {
            AppAction::Save(payload) => self.start_save(payload),
            AppAction::Quit => self.should_quit = true,
        }
    }

    /// Send a snapshot in the background; the outcome arrives via [`Self::poll_saves`]
    pub fn start_save(&mut self, payload: SavePayload) {
        tracing::info!(
            steps = payload.steps.len(),
            configs = payload.configs.len(),
            "Saving workflow"
        );
        self.saves_in_flight += 1;
        spawn_save(self.backend.clone(), payload, self.save_tx.clone());
    }

    /// Drain finished saves
    pub fn poll_saves(&mut self) {
        while let Ok(report) = self.save_rx.try_recv() {
            self.apply_save_report(&report);
        }
    }

    pub fn apply_save_report(&mut self, report: &SaveReport) {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);
        let level = if report.result.is_ok() {
            NotificationLevel::Success
        } else {
            NotificationLevel::Error
        };
        self.notifier.show(report.notification(), level);
    }

    /// Expire the notification and the saved-step highlight
    pub fn tick(&mut self, now: Instant) {
        self.notifier.tick(now);
        if self.highlight.as_ref().is_some_and(|h| now >= h.until) {
            self.highlight = None;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(AppAction::Quit);
        }

        if self.dialog.is_some() {
            self.handle_dialog_key(key.code);
            return None;
        }

        if self.grab.is_some() {
            self.handle_grab_key(key.code);
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Char('s') => return Some(AppAction::Save(self.session.save_payload())),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Palette => Focus::Canvas,
                    Focus::Canvas => Focus::Palette,
                };
            }
            _ => match self.focus {
                Focus::Palette => self.handle_palette_key(key.code),
                Focus::Canvas => self.handle_canvas_key(key.code),
            },
        }
        None
    }

    fn handle_palette_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.palette.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.palette.select_next(),
            KeyCode::Enter => {
                if let Some(step_type) = self.palette.selected() {
                    self.drop_on_canvas(&DragTransfer::from_palette(step_type));
                }
            }
            _ => {}
        }
    }

    /// End of a drag over the canvas
    pub fn drop_on_canvas(&mut self, transfer: &DragTransfer) {
        match self.session.apply(Command::Drop(transfer.clone())) {
            Ok(Outcome::Inserted(view)) => {
                tracing::debug!(step_id = %view.id, step_type = %view.step_type, "Step added");
                self.canvas.state.select(Some(view.order));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Drop failed"),
        }
    }

    fn selected_step(&self) -> Option<StepId> {
        let index = self.canvas.state.selected()?;
        self.session.steps().list().get(index).map(|v| v.id.clone())
    }

    fn handle_canvas_key(&mut self, key: KeyCode) {
        let len = self.session.steps().len();
        match key {
            KeyCode::Up | KeyCode::Char('k') => self.canvas.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.canvas.select_next(len),
            KeyCode::Enter => {
                if let Some(id) = self.selected_step() {
                    self.open_dialog(id);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_step() {
                    if let Err(e) = self.session.apply(Command::Remove(id)) {
                        tracing::warn!(error = %e, "Remove failed");
                    }
                    self.canvas.clamp(self.session.steps().len());
                }
            }
            KeyCode::Char('m') => {
                if let (Some(id), Some(index)) = (self.selected_step(), self.canvas.state.selected())
                {
                    self.grab = Some(Grab {
                        id,
                        order: self.session.steps().ids(),
                        original_index: index,
                    });
                }
            }
            _ => {}
        }
    }

    fn handle_grab_key(&mut self, key: KeyCode) {
        let Some(grab) = self.grab.as_mut() else {
            return;
        };
        let Some(pos) = grab.order.iter().position(|id| *id == grab.id) else {
            self.grab = None;
            return;
        };

        match key {
            KeyCode::Up | KeyCode::Char('k') if pos > 0 => {
                grab.order.swap(pos, pos - 1);
                self.canvas.state.select(Some(pos - 1));
            }
            KeyCode::Down | KeyCode::Char('j') if pos + 1 < grab.order.len() => {
                grab.order.swap(pos, pos + 1);
                self.canvas.state.select(Some(pos + 1));
            }
            KeyCode::Enter | KeyCode::Char('m') => {
                let order = std::mem::take(&mut grab.order);
                self.grab = None;
                if let Err(e) = self.session.apply(Command::Reorder(order)) {
                    tracing::warn!(error = %e, "Reorder rejected");
                    self.notifier
                        .show(format!("❌ {}", e), NotificationLevel::Error);
                }
            }
            KeyCode::Esc => {
                let index = grab.original_index;
                self.grab = None;
                self.canvas.state.select(Some(index));
            }
            _ => {}
        }
    }

    fn open_dialog(&mut self, id: StepId) {
        if let Err(e) = self.session.apply(Command::OpenModal(id)) {
            tracing::warn!(error = %e, "Could not open step configuration");
            return;
        }
        self.dialog = self.session.modal().current().map(StepDialog::from_modal);
    }

    fn handle_dialog_key(&mut self, key: KeyCode) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        match dialog.handle_key(key) {
            Some(DialogAction::AddFieldRow) => {
                if let Ok(Outcome::FieldRowAdded(_)) = self.session.apply(Command::AddFieldRow) {
                    dialog.push_row();
                }
            }
            Some(DialogAction::Cancel) => {
                let _ = self.session.apply(Command::CancelModal);
                self.dialog = None;
            }
            Some(DialogAction::Submit) => self.submit_dialog(),
            None => {}
        }
    }

    /// Write the dialog's values into the open modal and submit it
    fn submit_dialog(&mut self) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };

        for (name, value) in dialog.values() {
            let command = Command::SetField {
                name: name.to_string(),
                value,
            };
            if let Err(e) = self.session.apply(command) {
                dialog.set_error(Some(e.to_string()));
                return;
            }
        }
        if let Some(modal) = self.session.modal_mut().current_mut() {
            for (index, spec) in dialog.rows().into_iter().enumerate() {
                if let Some(row) = modal.row_mut(index) {
                    *row = spec;
                }
            }
        }

        match self.session.apply(Command::SubmitModal) {
            Ok(Outcome::ConfigSaved(id)) => {
                tracing::debug!(step_id = %id, "Step configuration saved");
                self.highlight = Some(Highlight {
                    id,
                    until: Instant::now() + Duration::from_millis(self.config.ui.highlight_ms),
                });
                self.dialog = None;
            }
            Ok(_) => self.dialog = None,
            Err(e) => dialog.set_error(Some(e.to_string())),
        }
    }

    /// Rows for the canvas; while moving a step, labels follow the proposed order
    pub fn canvas_rows(&self) -> Vec<CanvasRow> {
        let views: Vec<StepView> = match &self.grab {
            Some(grab) => grab
                .order
                .iter()
                .enumerate()
                .filter_map(|(order, id)| {
                    self.session.steps().get(id).map(|record| StepView {
                        id: id.clone(),
                        step_type: record.step_type,
                        order,
                    })
                })
                .collect(),
            None => self.session.steps().list(),
        };
        let labels = renumber::labels_for(&views);

        views
            .into_iter()
            .zip(labels)
            .map(|(view, (_, label))| CanvasRow {
                configured: self.session.configs().contains(&view.id),
                highlighted: self.highlight.as_ref().is_some_and(|h| h.id == view.id),
                grabbed: self.grab.as_ref().is_some_and(|g| g.id == view.id),
                id: view.id,
                step_type: view.step_type,
                label,
            })
            .collect()
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(26), Constraint::Min(20)])
            .split(chunks[1]);

        self.palette
            .render(frame, body[0], self.focus == Focus::Palette);
        let rows = self.canvas_rows();
        self.canvas
            .render(frame, body[1], self.focus == Focus::Canvas, &rows);

        let hint = self.key_hints();
        self.notifier.render(frame, chunks[2], hint);

        if let Some(dialog) = self.dialog.as_mut() {
            dialog.render(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                " Workflow Builder ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(self.backend.endpoint(), Style::default().fg(Color::Gray)),
        ];
        if self.saves_in_flight > 0 {
            spans.push(Span::styled(
                "  saving...",
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn key_hints(&self) -> Line<'static> {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let mut spans = Vec::new();
        if self.grab.is_some() {
            spans.extend([
                key("↑/↓"),
                Span::raw(" move  "),
                key("Enter"),
                Span::raw(" drop  "),
                key("Esc"),
                Span::raw(" cancel"),
            ]);
            return Line::from(spans);
        }
        match self.focus {
            Focus::Palette => spans.extend([key("Enter"), Span::raw(" add step  ")]),
            Focus::Canvas => spans.extend([
                key("Enter"),
                Span::raw(" configure  "),
                key("m"),
                Span::raw(" move  "),
                key("d"),
                Span::raw(" delete  "),
            ]),
        }
        spans.extend([
            key("Tab"),
            Span::raw(" switch  "),
            key("s"),
            Span::raw(" save  "),
            key("q"),
            Span::raw(" quit"),
        ]);
        Line::from(spans)
    }
}
