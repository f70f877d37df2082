use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl AlertKind {
    fn label(&self) -> ColoredString {
        match self {
            AlertKind::Success => " SUCCESS ".black().on_green(),
            AlertKind::Error => " ERROR ".white().on_red(),
            AlertKind::Warning => " WARNING ".black().on_yellow(),
            AlertKind::Info => " INFO ".white().on_blue(),
        }
    }
}

/// Dismissible one-line notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: AlertKind,
    #[serde(skip, default = "visible")]
    visible: bool,
}

fn visible() -> bool {
    true
}

impl Alert {
    pub fn new(message: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            message: message.into(),
            kind,
            visible: true,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, AlertKind::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, AlertKind::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, AlertKind::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, AlertKind::Error)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    /// `None` once dismissed.
    pub fn render(&self) -> Option<String> {
        if !self.visible {
            return None;
        }
        Some(format!("{} {}", self.kind.label(), self.message))
    }
}
