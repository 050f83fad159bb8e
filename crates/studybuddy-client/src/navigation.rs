//! Sidebar navigation: which panel is active.

use std::fmt;
use std::str::FromStr;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Panel {
    #[default]
    Dashboard,
    UploadSyllabus,
    Topics,
    Quiz,
    Results,
}

impl Panel {
    /// Sidebar order
    pub const ALL: [Panel; 5] = [
        Panel::Dashboard,
        Panel::UploadSyllabus,
        Panel::Topics,
        Panel::Quiz,
        Panel::Results,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Panel::Dashboard => "Dashboard",
            Panel::UploadSyllabus => "Upload Syllabus",
            Panel::Topics => "Topics",
            Panel::Quiz => "Quiz",
            Panel::Results => "Results",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            Panel::Dashboard => "dashboard",
            Panel::UploadSyllabus => "upload-syllabus",
            Panel::Topics => "topics",
            Panel::Quiz => "quiz",
            Panel::Results => "results",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown panel: {0}")]
pub struct UnknownPanel(pub String);

impl FromStr for Panel {
    type Err = UnknownPanel;

    /// Accepts the label or its slug, case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Panel::ALL
            .into_iter()
            .find(|panel| {
                panel.label().eq_ignore_ascii_case(wanted) || panel.slug().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownPanel(s.to_string()))
    }
}

/// Process-wide active panel, observable by any number of views
pub struct NavigationStore {
    tx: watch::Sender<Panel>,
}

impl Default for NavigationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Panel::default());
        Self { tx }
    }

    pub fn active(&self) -> Panel {
        *self.tx.borrow()
    }

    /// Make `panel` active; returns false when it already was
    pub fn select(&self, panel: Panel) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == panel {
                return false;
            }
            *current = panel;
            true
        });
        if changed {
            tracing::debug!(panel = %panel, "Panel selected");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<Panel> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_dashboard() {
        let store = NavigationStore::new();
        assert_eq!(store.active(), Panel::Dashboard);
    }

    #[test]
    fn test_select_notifies_observers_once() {
        let store = NavigationStore::new();
        let mut rx = store.subscribe();

        assert!(store.select(Panel::UploadSyllabus));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Panel::UploadSyllabus);

        assert!(!store.select(Panel::UploadSyllabus));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.active(), Panel::UploadSyllabus);
    }

    #[test]
    fn test_parse_labels_and_slugs() {
        assert_eq!("Upload Syllabus".parse::<Panel>().unwrap(), Panel::UploadSyllabus);
        assert_eq!("quiz".parse::<Panel>().unwrap(), Panel::Quiz);
        assert_eq!("upload-syllabus".parse::<Panel>().unwrap(), Panel::UploadSyllabus);
        assert!("settings".parse::<Panel>().is_err());
    }
}
