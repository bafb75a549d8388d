//! Transient status-bar notification

use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl NotificationLevel {
    fn color(self) -> Color {
        match self {
            NotificationLevel::Info => Color::Cyan,
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Error => Color::Red,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    expires_at: Instant,
}

/// Holds at most one notification; a new one replaces the old
#[derive(Debug)]
pub struct Notifier {
    ttl: Duration,
    current: Option<Notification>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn show(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.show_at(message, level, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, level: NotificationLevel, now: Instant) {
        let message = message.into();
        tracing::debug!(message = %message, ?level, "Notification");
        self.current = Some(Notification {
            message,
            level,
            expires_at: now + self.ttl,
        });
    }

    /// Drop the notification once its time is up
    pub fn tick(&mut self, now: Instant) {
        if self
            .current
            .as_ref()
            .is_some_and(|n| now >= n.expires_at)
        {
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Render into a one-line area; falls back to `hint` when nothing is showing
    pub fn render(&self, frame: &mut Frame, area: Rect, hint: Line<'_>) {
        let line = match &self.current {
            Some(n) => Line::from(Span::styled(
                n.message.as_str(),
                Style::default()
                    .fg(n.level.color())
                    .add_modifier(Modifier::BOLD),
            )),
            None => hint,
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}
