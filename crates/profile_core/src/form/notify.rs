//! Notification sink used after user-initiated saves.

use log::{info, warn};

/// User-facing notification channel (toasts, status bars, ...).
pub trait Notifier {
    fn success(&self, title: &str, detail: &str);
    fn error(&self, title: &str, detail: &str);
}

/// Notifier that writes to the log. Used by headless callers such as the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, title: &str, detail: &str) {
        info!("event=notify module=form status=ok title={title:?} detail={detail:?}");
    }

    fn error(&self, title: &str, detail: &str) {
        warn!("event=notify module=form status=error title={title:?} detail={detail:?}");
    }
}
