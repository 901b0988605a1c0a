//! Small string and filesystem helpers shared across the pipeline

use std::path::{Path, PathBuf};

/// `GUPnP-DLNA-1.0` -> (`GUPnP-DLNA`, `1.0`)
///
/// Only the last dash separates the version, module names may contain dashes.
pub fn split_module_name(package_name: &str) -> (&str, &str) {
    package_name
        .rsplit_once('-')
        .unwrap_or((package_name, ""))
}

pub fn is_first_char_numeric(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Join words separated by whitespace, `-`, `_` or `.`, capitalising every
/// word after the first. The first word is left untouched.
fn camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c.is_whitespace() || matches!(c, '-' | '_' | '.') {
            upper_next = true;
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

fn with_first_char(name: &str, upper: bool) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `get_default-value` -> `getDefaultValue`
pub fn lower_camel_case(name: &str) -> String {
    with_first_char(&camel_case(name), false)
}

/// `gtk-source` -> `GtkSource`
pub fn upper_camel_case(name: &str) -> String {
    with_first_char(&camel_case(name), true)
}

/// First directory containing `filename`
pub fn find_file_in_dirs(dirs: &[PathBuf], filename: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(filename))
        .find(|path| path.is_file())
}

/// `{stem}` of every `{stem}.gir` file directly inside `dir`, unsorted
pub fn gir_stems(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "gir"))
        .filter_map(|path| path.file_stem()?.to_str().map(str::to_owned))
        .collect()
}
