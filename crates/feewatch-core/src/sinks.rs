//! Host capability seams.
//!
//! The sync engine renders through these narrow traits instead of
//! talking to any platform API directly. A frontend supplies whatever
//! surface it has -- a browser toolbar badge, a tray icon, a terminal.

use crate::error::SinkError;

/// Badge overlay on the host surface.
pub trait BadgeSink: Send {
    /// Render short text (four glyphs at most) over the given hex colors.
    fn set_badge(&mut self, text: &str, background: &str, foreground: &str)
        -> Result<(), SinkError>;

    /// Remove any badge currently shown.
    fn clear_badge(&mut self) -> Result<(), SinkError>;
}

/// System notification surface.
///
/// A sink shows at most one notification per id; creating an existing id
/// replaces it.
pub trait NotificationSink: Send {
    fn notify(&mut self, id: &str, title: &str, message: &str) -> Result<(), SinkError>;

    fn clear(&mut self, id: &str) -> Result<(), SinkError>;
}
