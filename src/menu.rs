//! Toolkit-neutral menu bar description. A front-end walks this to build its
//! widgets and routes each entry's `id` through the [`ActionTable`](crate::ActionTable).

use sonogram_core::decode::file_filter_pattern;
use sonogram_core::Colormap;

use crate::action::{colormap_id, LOAD_ID, QUIT_ID, SAVE_ID};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Entry { id: String, label: String },
    Separator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    pub title: &'static str,
    pub items: Vec<MenuItem>,
}

fn entry(id: impl Into<String>, label: impl Into<String>) -> MenuItem {
    MenuItem::Entry {
        id: id.into(),
        label: label.into(),
    }
}

pub fn file_menu() -> Menu {
    Menu {
        title: "File",
        items: vec![
            entry(LOAD_ID, "Load Audio File"),
            entry(SAVE_ID, "Save Spectrogram"),
            MenuItem::Separator,
            entry(QUIT_ID, "Quit"),
        ],
    }
}

/// One entry per catalog colormap, labelled with its name verbatim.
pub fn colormap_menu() -> Menu {
    Menu {
        title: "Colormap",
        items: Colormap::catalog()
            .into_iter()
            .map(|c| entry(colormap_id(c), c.to_string()))
            .collect(),
    }
}

pub fn menu_bar() -> Vec<Menu> {
    vec![file_menu(), colormap_menu()]
}

/// Open-dialog filter: label and glob pattern.
pub fn audio_file_filter() -> (&'static str, String) {
    ("Audio Files", file_filter_pattern())
}

/// Extension a save dialog should default to.
pub const SAVE_EXTENSION: &str = ".png";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionTable;

    #[test]
    fn every_entry_has_a_handler() {
        let table = ActionTable::standard();
        for menu in menu_bar() {
            for item in &menu.items {
                if let MenuItem::Entry { id, .. } = item {
                    assert!(table.contains(id), "{} has no handler for {id}", menu.title);
                }
            }
        }
    }

    #[test]
    fn file_menu_layout() {
        let items = file_menu().items;
        assert_eq!(items.len(), 4);
        assert_eq!(items[2], MenuItem::Separator);
        assert!(matches!(&items[3], MenuItem::Entry { label, .. } if label == "Quit"));
    }

    #[test]
    fn dialogs_offer_audio_and_png() {
        let (label, pattern) = audio_file_filter();
        assert_eq!(label, "Audio Files");
        assert!(pattern.starts_with("*.wav *.mp3 *.flac"), "{pattern}");
        assert_eq!(SAVE_EXTENSION, ".png");
    }

    #[test]
    fn colormap_labels_match_catalog() {
        let labels: Vec<String> = colormap_menu()
            .items
            .into_iter()
            .filter_map(|item| match item {
                MenuItem::Entry { label, .. } => Some(label),
                MenuItem::Separator => None,
            })
            .collect();
        assert_eq!(labels, Colormap::names());
    }
}
