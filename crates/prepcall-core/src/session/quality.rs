//! Connection-quality signal.

use serde::{Deserialize, Serialize};

/// Coarse connection-quality signal derived from engine events.
///
/// Advisory only: it is a displayed value and never influences state
/// machine transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionQuality {
    /// Default at rest.
    #[default]
    Excellent,
    /// A connection attempt is in progress.
    Good,
    /// The engine reported an error or rejected a connection.
    Poor,
}

/// Tracks the connection-quality signal across a session's lifetime.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMonitor {
    quality: ConnectionQuality,
}

impl ConnectionMonitor {
    /// Creates a monitor at rest (`Excellent`).
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection attempt started.
    pub fn on_connecting(&mut self) {
        self.quality = ConnectionQuality::Good;
    }

    /// The engine reported an error.
    pub fn on_engine_error(&mut self) {
        self.quality = ConnectionQuality::Poor;
    }

    /// The current signal.
    pub fn quality(&self) -> ConnectionQuality {
        self.quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_excellent() {
        assert_eq!(ConnectionMonitor::new().quality(), ConnectionQuality::Excellent);
    }

    #[test]
    fn test_degrades_on_engine_error() {
        let mut monitor = ConnectionMonitor::new();
        monitor.on_connecting();
        assert_eq!(monitor.quality(), ConnectionQuality::Good);

        monitor.on_engine_error();
        assert_eq!(monitor.quality(), ConnectionQuality::Poor);
    }
}
