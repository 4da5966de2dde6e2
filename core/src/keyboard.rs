//! Keyboard shortcuts understood by the panel.

/// A key press as reported by the host. `key` uses DOM-style names
/// (`"n"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl/Cmd + N: open an empty create form.
    NewStudent,
    /// Escape: close every open modal.
    CloseAll,
}

impl Shortcut {
    pub fn from_key(press: &KeyPress) -> Option<Shortcut> {
        if (press.ctrl || press.meta) && press.key == "n" {
            return Some(Shortcut::NewStudent);
        }
        if press.key == "Escape" {
            return Some(Shortcut::CloseAll);
        }
        None
    }
}
