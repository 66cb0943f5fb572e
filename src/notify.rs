//! Fire-and-forget user notifications

/// Sink for transient success/error messages
pub trait Notifier {
    fn success(&mut self, message: String);
    fn error(&mut self, message: String);
}

/// Notifier that forwards to the log, used by the CLI commands
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&mut self, message: String) {
        tracing::info!("{}", message);
    }

    fn error(&mut self, message: String) {
        tracing::error!("{}", message);
    }
}
