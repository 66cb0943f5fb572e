//! Status bar holding the latest notification and a short history

use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::notify::Notifier;
use crate::tui::ui::Styles;

#[derive(Debug, Clone, PartialEq)]
pub enum StatusType {
    Info,
    Success,
    Error,
    Loading,
}

/// Status message with type and content
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub status_type: StatusType,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl StatusMessage {
    pub fn new(message: String, status_type: StatusType) -> Self {
        Self {
            message,
            status_type,
            timestamp: chrono::Local::now(),
        }
    }
}

pub struct StatusDisplay {
    pub current_message: Option<StatusMessage>,
    pub message_history: Vec<StatusMessage>,
    pub max_history: usize,
    pub auto_clear_timeout: Option<std::time::Duration>,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self {
            current_message: None,
            message_history: Vec::new(),
            max_history: 100,
            auto_clear_timeout: None,
        }
    }
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_clear(mut self, timeout: std::time::Duration) -> Self {
        self.auto_clear_timeout = Some(timeout);
        self
    }

    /// Set current status message
    pub fn set_message(&mut self, message: StatusMessage) {
        self.archive_current();
        self.current_message = Some(message);
    }

    pub fn set_info(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Info));
    }

    pub fn set_loading(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Loading));
    }

    pub fn clear(&mut self) {
        self.archive_current();
    }

    fn archive_current(&mut self) {
        if let Some(current) = self.current_message.take() {
            self.message_history.push(current);
            if self.message_history.len() > self.max_history {
                self.message_history.remove(0);
            }
        }
    }

    pub fn get_current(&self) -> Option<&StatusMessage> {
        self.current_message.as_ref()
    }

    pub fn get_history(&self) -> &[StatusMessage] {
        &self.message_history
    }

    /// Drop the current message once it outlived the timeout
    pub fn tick(&mut self) {
        let expired = match (self.auto_clear_timeout, &self.current_message) {
            (Some(timeout), Some(message)) => {
                let elapsed = chrono::Local::now().signed_duration_since(message.timestamp);
                elapsed.to_std().unwrap_or_default() > timeout
            }
            _ => false,
        };
        if expired {
            self.clear();
        }
    }

    /// Render the status bar; `fallback` is shown when there is no message
    pub fn render(&self, f: &mut Frame, area: Rect, fallback: &str) {
        let (content, style) = match &self.current_message {
            Some(message) => (
                Self::format_message(message),
                match message.status_type {
                    StatusType::Info => Styles::info(),
                    StatusType::Success => Styles::success(),
                    StatusType::Error => Styles::error(),
                    StatusType::Loading => Styles::warning(),
                },
            ),
            None => (fallback.to_string(), Styles::inactive()),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::inactive_border());

        f.render_widget(Paragraph::new(content).style(style).block(block), area);
    }

    fn format_message(message: &StatusMessage) -> String {
        let prefix = match message.status_type {
            StatusType::Info => "ℹ",
            StatusType::Success => "✓",
            StatusType::Error => "✗",
            StatusType::Loading => "⟳",
        };
        format!("{} [{}] {}", prefix, message.timestamp.format("%H:%M:%S"), message.message)
    }
}

impl Notifier for StatusDisplay {
    fn success(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Success));
    }

    fn error(&mut self, message: String) {
        self.set_message(StatusMessage::new(message, StatusType::Error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_rotate_into_history() {
        let mut status = StatusDisplay::new();
        status.success("Saved".to_string());
        status.error("Failed".to_string());

        assert_eq!(status.get_current().map(|m| &m.status_type), Some(&StatusType::Error));
        assert_eq!(status.get_history().len(), 1);
        assert_eq!(status.get_history()[0].message, "Saved");
    }

    #[test]
    fn test_history_is_bounded() {
        let mut status = StatusDisplay { max_history: 2, ..StatusDisplay::new() };
        for i in 0..5 {
            status.set_info(format!("message {}", i));
        }
        assert_eq!(status.get_history().len(), 2);
        assert_eq!(status.get_history()[1].message, "message 3");
    }

    #[test]
    fn test_tick_clears_expired_message() {
        let mut status = StatusDisplay::new().with_auto_clear(std::time::Duration::from_secs(0));
        status.set_message(StatusMessage {
            message: "old".to_string(),
            status_type: StatusType::Info,
            timestamp: chrono::Local::now() - chrono::Duration::seconds(5),
        });
        status.tick();
        assert!(status.get_current().is_none());
    }
}
