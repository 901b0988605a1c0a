//! Per-symbol override patches
//!
//! Some GIR members clash structurally with a member of the same name
//! inherited through another branch. Patches keyed by the member's fully
//! qualified name either replace the whole declaration (one line, usually a
//! comment) or only its body text (`[comment, body]`).

use indexmap::IndexMap;
use log::warn;

/// Patch applied to one function-like member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patch<'a> {
    /// Emit this line instead of the declaration
    Replace(&'a str),
    /// Keep the member in place but use this signature text
    Body(&'a str),
}

#[derive(Debug, Clone)]
pub struct OverrideTable {
    patches: IndexMap<String, Vec<String>>,
}

const DEFAULT_PATCHES: &[(&str, &[&str])] = &[
    (
        "Atk.Object.get_description",
        &[
            "/* return type clashes with Atk.Action.get_description */",
            "get_description(): string | null",
        ],
    ),
    (
        "Atk.Object.get_name",
        &[
            "/* return type clashes with Atk.Action.get_name */",
            "get_name(): string | null",
        ],
    ),
    (
        "Atk.Object.set_description",
        &[
            "/* return type clashes with Atk.Action.set_description */",
            "set_description(description: string): boolean | null",
        ],
    ),
    (
        "Gtk.Container.child_notify",
        &["/* child_notify clashes with Gtk.Widget.child_notify */"],
    ),
    (
        "Gtk.MenuItem.activate",
        &["/* activate clashes with Gtk.Widget.activate */"],
    ),
    (
        "Gtk.TextView.get_window",
        &["/* get_window clashes with Gtk.Widget.get_window */"],
    ),
    (
        "WebKit.WebView.get_settings",
        &["/* get_settings clashes with Gtk.Widget.get_settings */"],
    ),
];

impl Default for OverrideTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl OverrideTable {
    pub fn empty() -> Self {
        Self {
            patches: IndexMap::new(),
        }
    }

    /// Table holding the known clash patches
    pub fn with_defaults() -> Self {
        let patches = DEFAULT_PATCHES
            .iter()
            .map(|(name, lines)| {
                (
                    (*name).to_owned(),
                    lines.iter().map(|line| (*line).to_owned()).collect(),
                )
            })
            .collect();
        Self { patches }
    }

    /// Add or replace patches; entries that are not one or two lines long are ignored
    pub fn extend(&mut self, patches: &IndexMap<String, Vec<String>>) {
        for (name, lines) in patches {
            if matches!(lines.len(), 1 | 2) {
                self.patches.insert(name.clone(), lines.clone());
            } else {
                warn!(
                    "Ignoring patch for '{name}': expected one or two lines, got {}",
                    lines.len()
                );
            }
        }
    }

    pub fn get(&self, full_name: &str) -> Option<Patch<'_>> {
        match self.patches.get(full_name)?.as_slice() {
            [line] => Some(Patch::Replace(line)),
            [_, body] => Some(Patch::Body(body)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patches() {
        let table = OverrideTable::with_defaults();
        assert_eq!(
            table.get("Gtk.MenuItem.activate"),
            Some(Patch::Replace("/* activate clashes with Gtk.Widget.activate */"))
        );
        assert_eq!(
            table.get("Atk.Object.get_name"),
            Some(Patch::Body("get_name(): string | null"))
        );
        assert_eq!(table.get("Gtk.Widget.activate"), None);
    }

    #[test]
    fn test_extend() {
        let mut table = OverrideTable::empty();
        let mut extra = IndexMap::new();
        extra.insert("A.B.c".to_owned(), vec!["/* gone */".to_owned()]);
        extra.insert("A.B.d".to_owned(), Vec::new());
        table.extend(&extra);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("A.B.c"), Some(Patch::Replace("/* gone */")));
        assert_eq!(table.get("A.B.d"), None);
    }
}
