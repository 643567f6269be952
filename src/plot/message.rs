use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Importance of a plot message bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

/// A user-visible message overlaid on the plot. Failures surface as these
/// bubbles, never as crashes or silently blank plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotMessage {
    pub severity: Severity,
    pub text: String,
}

/// Timestamped message list with display-layer auto-hide.
///
/// Auto-hide is the only timeout in the system; it never cancels any
/// in-flight computation.
#[derive(Debug)]
pub struct MessageLog {
    entries: Vec<(PlotMessage, Instant)>,
    auto_hide: Duration,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            auto_hide: Duration::from_secs(5),
        }
    }
}

impl MessageLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_auto_hide(auto_hide: Duration) -> Self {
        Self {
            entries: Vec::new(),
            auto_hide,
        }
    }

    pub fn post(&mut self, severity: Severity, text: impl Into<String>) {
        self.entries.push((
            PlotMessage {
                severity,
                text: text.into(),
            },
            Instant::now(),
        ));
    }

    /// Messages still inside their display window.
    #[must_use]
    pub fn active(&self) -> Vec<&PlotMessage> {
        self.active_at(Instant::now())
    }

    #[must_use]
    pub fn active_at(&self, now: Instant) -> Vec<&PlotMessage> {
        self.entries
            .iter()
            .filter(|(_, posted)| now.duration_since(*posted) < self.auto_hide)
            .map(|(message, _)| message)
            .collect()
    }

    /// Every message posted since the last clear, regardless of age.
    #[must_use]
    pub fn all(&self) -> Vec<&PlotMessage> {
        self.entries.iter().map(|(message, _)| message).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_expire_after_auto_hide_window() {
        let mut log = MessageLog::with_auto_hide(Duration::from_secs(3));
        log.post(Severity::Info, "loaded");

        let posted = Instant::now();
        assert_eq!(log.active_at(posted).len(), 1);
        assert_eq!(log.active_at(posted + Duration::from_secs(4)).len(), 0);
        // Expired messages remain in the full list until cleared.
        assert_eq!(log.all().len(), 1);
    }
}
