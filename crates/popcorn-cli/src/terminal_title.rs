use popcorn_core::TitleSurface;
use std::io::{self, Write};

/// Sets the terminal window title with the OSC 0 escape sequence
pub struct TerminalTitle {
    default: String,
}

impl TerminalTitle {
    pub fn new(default: String) -> Self {
        let title = Self { default };
        title.write(&title.default);
        title
    }

    fn write(&self, title: &str) {
        let mut stderr = io::stderr();
        // Best effort
        let _ = write!(stderr, "\x1b]0;{}\x07", title.replace(['\x1b', '\x07'], ""));
        let _ = stderr.flush();
    }
}

impl TitleSurface for TerminalTitle {
    fn set(&self, title: &str) {
        self.write(title);
    }

    fn reset(&self) {
        self.write(&self.default);
    }
}
