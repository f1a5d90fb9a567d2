use std::sync::{Arc, Mutex};

pub const DEFAULT_TITLE: &str = "usePopcorn";

/// A process-wide title string the detail view writes to while it is open
pub trait TitleSurface: Send + Sync {
    fn set(&self, title: &str);
    /// Restore the surface's default title
    fn reset(&self);
}

pub fn movie_title(title: &str) -> String {
    format!("Movie | {}", title)
}

/// In-memory title surface
pub struct DocumentTitle {
    default: String,
    current: Mutex<String>,
}

impl DocumentTitle {
    pub fn new(default: impl Into<String>) -> Self {
        let default = default.into();
        Self {
            current: Mutex::new(default.clone()),
            default,
        }
    }

    pub fn current(&self) -> String {
        self.current.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Default for DocumentTitle {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl TitleSurface for DocumentTitle {
    fn set(&self, title: &str) {
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = title.to_string();
    }

    fn reset(&self) {
        let default = self.default.clone();
        *self.current.lock().unwrap_or_else(|p| p.into_inner()) = default;
    }
}

/// Holds a title on the surface; dropping the guard resets it.
pub struct TitleGuard {
    surface: Arc<dyn TitleSurface>,
}

impl TitleGuard {
    pub fn acquire(surface: Arc<dyn TitleSurface>, title: &str) -> Self {
        surface.set(title);
        Self { surface }
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        self.surface.reset();
    }
}
