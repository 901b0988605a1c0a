//! Locating and loading GIR modules
//!
//! Requested modules are loaded first, then every transitive dependency they
//! pull in, round after round, until no new module is discovered. A package
//! without a GIR file is reported once and left out; a file that cannot be
//! parsed is reported as malformed and left out as well.

use std::{fmt::Write as _, hash::BuildHasherDefault, path::PathBuf};

use anyhow::{Context, Result};
use cow_utils::CowUtils;
use globset::{Glob, GlobSet, GlobSetBuilder};
use indexmap::IndexMap;
use log::{debug, info};
use rustc_hash::{FxHashSet, FxHasher};

use crate::{
    diagnostics::{DiagnosticKind, Diagnostics},
    gir::NodeIdGen,
    module::GirModule,
    module_graph::{DependencyGraph, FxIndexSet},
    naming::Transformation,
    util::{find_file_in_dirs, gir_stems},
};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// How a module ended up being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveType {
    /// Requested on the command line or in the config
    ByHand,
    /// Pulled in as a dependency of another module
    Dependence,
}

#[derive(Debug)]
pub struct LoadedModule {
    pub module: GirModule,
    pub resolve_type: ResolveType,
}

/// Loaded versions of one module name, e.g. `Gtk-3.0` and `Gtk-4.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGroup {
    /// Lower-cased module name
    pub name: String,
    pub package_names: Vec<String>,
    /// How the first version of the group was loaded
    pub resolve_type: ResolveType,
    pub has_conflict: bool,
}

#[derive(Debug, Default)]
pub struct LoadResult {
    pub loaded: Vec<LoadedModule>,
    /// Packages without a usable GIR file, in discovery order
    pub failed: FxIndexSet<String>,
    pub graph: DependencyGraph,
}

impl LoadResult {
    pub fn contains(&self, package_name: &str) -> bool {
        self.loaded
            .iter()
            .any(|loaded| loaded.module.package_name == package_name)
    }

    /// Loaded modules grouped by lower-cased name, first-seen order
    pub fn groups(&self) -> Vec<ModuleGroup> {
        let mut groups: FxIndexMap<String, ModuleGroup> = FxIndexMap::default();
        for loaded in &self.loaded {
            let name = loaded.module.name.cow_to_lowercase().into_owned();
            let group = groups.entry(name.clone()).or_insert_with(|| ModuleGroup {
                name,
                package_names: Vec::new(),
                resolve_type: loaded.resolve_type,
                has_conflict: false,
            });
            group.package_names.push(loaded.module.package_name.clone());
            group.has_conflict = group.package_names.len() > 1;
        }
        groups.into_values().collect()
    }

    /// Human readable summary printed by `girdts list`
    pub fn listing(&self) -> String {
        let groups = self.groups();
        if groups.is_empty() {
            return "No modules found\n".to_owned();
        }

        let mut out = String::from("Selected Modules:\n");
        let list = |out: &mut String, resolve_type: ResolveType| {
            for group in groups.iter().filter(|group| group.resolve_type == resolve_type) {
                for package_name in &group.package_names {
                    let _ = writeln!(out, "- {package_name}");
                }
            }
        };
        list(&mut out, ResolveType::ByHand);

        if groups
            .iter()
            .any(|group| group.resolve_type == ResolveType::Dependence)
        {
            out.push_str("\nDependencies:\n");
            list(&mut out, ResolveType::Dependence);
        }

        let conflicts: Vec<&ModuleGroup> = groups.iter().filter(|group| group.has_conflict).collect();
        if !conflicts.is_empty() {
            out.push_str("\nConflicts:\n");
            for group in conflicts {
                let _ = writeln!(out, "- {}", group.name);
                for package_name in &group.package_names {
                    let _ = writeln!(out, "  - {package_name}");
                }
            }
        }

        if !self.failed.is_empty() {
            out.push_str("\nDependencies not found:\n");
            for package_name in &self.failed {
                let _ = writeln!(out, "- {package_name}");
            }
        }
        out
    }

    pub fn into_modules(self) -> Vec<GirModule> {
        self.loaded.into_iter().map(|loaded| loaded.module).collect()
    }
}

#[derive(Debug)]
pub struct ModuleLoader<'a> {
    gir_directories: &'a [PathBuf],
    transformation: Transformation,
    diagnostics: &'a Diagnostics,
    ids: NodeIdGen,
}

impl<'a> ModuleLoader<'a> {
    pub fn new(gir_directories: &'a [PathBuf], diagnostics: &'a Diagnostics) -> Self {
        Self {
            gir_directories,
            transformation: Transformation::new(diagnostics.environment()),
            diagnostics,
            ids: NodeIdGen::new(),
        }
    }

    /// Package names matching any of `patterns`, minus `ignore`, sorted
    pub fn find_modules(&self, patterns: &[String], ignore: &[String]) -> Result<Vec<String>> {
        let glob_set = build_glob_set(patterns)?;
        let mut found = FxIndexSet::default();
        for dir in self.gir_directories {
            for stem in gir_stems(dir) {
                if ignore.contains(&stem) {
                    continue;
                }
                if glob_set.is_match(&stem) {
                    found.insert(stem);
                }
            }
        }
        let mut found: Vec<String> = found.into_iter().collect();
        found.sort();
        Ok(found)
    }

    /// Load `requested` and the closure of their dependencies
    pub fn load(&mut self, requested: &[String]) -> LoadResult {
        let mut result = LoadResult::default();
        let mut attempted = FxHashSet::default();
        let mut queue: Vec<String> = requested.to_vec();
        let mut resolve_type = ResolveType::ByHand;

        loop {
            let mut found_new = false;
            for package_name in queue.drain(..) {
                if result.contains(&package_name) || !attempted.insert(package_name.clone()) {
                    continue;
                }
                match self.load_module(&package_name) {
                    Ok(Some(module)) => {
                        result
                            .graph
                            .add_module(&module.package_name, &module.dependencies);
                        result.loaded.push(LoadedModule {
                            module,
                            resolve_type,
                        });
                        found_new = true;
                    }
                    Ok(None) => {
                        if result.failed.insert(package_name.clone()) {
                            self.diagnostics.report(
                                DiagnosticKind::MissingModule,
                                &package_name,
                                format!(
                                    "No gir file found for '{package_name}', this module will be ignored"
                                ),
                            );
                        }
                    }
                    Err(err) => {
                        result.failed.insert(package_name.clone());
                        self.diagnostics.report(
                            DiagnosticKind::MalformedModule,
                            &package_name,
                            format!("{err:#}"),
                        );
                    }
                }
            }

            if !found_new {
                break;
            }

            for loaded in &mut result.loaded {
                loaded.module.transitive_dependencies = result
                    .graph
                    .transitive_dependencies(&loaded.module.package_name);
            }

            let mut next = FxIndexSet::default();
            for loaded in &result.loaded {
                for dependency in &loaded.module.transitive_dependencies {
                    if !attempted.contains(dependency) && !result.contains(dependency) {
                        next.insert(dependency.clone());
                    }
                }
            }
            queue.extend(next);
            resolve_type = ResolveType::Dependence;
        }

        result.graph.report_cycles();
        result
    }

    /// `Ok(None)` when no GIR file exists for `package_name`
    fn load_module(&mut self, package_name: &str) -> Result<Option<GirModule>> {
        let Some(path) = find_file_in_dirs(self.gir_directories, &format!("{package_name}.gir"))
        else {
            return Ok(None);
        };
        info!("Parsing {}...", path.display());
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let module = GirModule::parse(&source, &path, &mut self.ids, &self.transformation)?;

        if module.package_name != package_name {
            debug!(
                "{} declares {}, expected {package_name}",
                path.display(),
                module.package_name
            );
        }
        Ok(Some(module))
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("Invalid module pattern '{pattern}'"))?;
        builder.add(glob);
    }
    builder
        .build()
        .context("Failed to build the module pattern set")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::Environment, testing::repository};

    fn write_gir(dir: &Path, namespace: &str, version: &str, includes: &[&str]) {
        let source = repository(namespace, version, includes, "");
        std::fs::write(dir.join(format!("{namespace}-{version}.gir")), source).expect("write gir");
    }

    fn names(loaded: &[LoadedModule]) -> Vec<(&str, ResolveType)> {
        loaded
            .iter()
            .map(|loaded| (loaded.module.package_name.as_str(), loaded.resolve_type))
            .collect()
    }

    #[test]
    fn test_find_modules_with_wildcards() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_gir(dir.path(), "Gtk", "3.0", &[]);
        write_gir(dir.path(), "Gtk", "4.0", &[]);
        write_gir(dir.path(), "Gdk", "3.0", &[]);
        std::fs::write(dir.path().join("README"), "").expect("write");

        let dirs = vec![dir.path().to_path_buf()];
        let diagnostics = Diagnostics::new(Environment::Gjs);
        let loader = ModuleLoader::new(&dirs, &diagnostics);

        assert_eq!(
            loader.find_modules(&["Gtk*".to_owned()], &[]).expect("patterns"),
            vec!["Gtk-3.0", "Gtk-4.0"]
        );
        assert_eq!(
            loader
                .find_modules(&["*".to_owned()], &["Gtk-4.0".to_owned()])
                .expect("patterns"),
            vec!["Gdk-3.0", "Gtk-3.0"]
        );
        assert_eq!(
            loader
                .find_modules(&["G?k-3.0".to_owned(), "Gtk-4.*".to_owned()], &[])
                .expect("patterns"),
            vec!["Gdk-3.0", "Gtk-3.0", "Gtk-4.0"]
        );
        assert!(
            loader
                .find_modules(&["Gtk".to_owned()], &[])
                .expect("patterns")
                .is_empty()
        );
    }

    #[test]
    fn test_invalid_module_pattern() {
        let dirs = Vec::new();
        let diagnostics = Diagnostics::new(Environment::Gjs);
        let loader = ModuleLoader::new(&dirs, &diagnostics);

        let err = loader
            .find_modules(&["Gtk-[3.0".to_owned()], &[])
            .expect_err("unclosed class");
        assert_eq!(err.to_string(), "Invalid module pattern 'Gtk-[3.0'");
    }

    #[test]
    fn test_dependency_closure_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_gir(dir.path(), "Gtk", "3.0", &["Gdk-3.0", "GObject-2.0"]);
        write_gir(dir.path(), "Gdk", "3.0", &["GObject-2.0"]);
        write_gir(dir.path(), "GObject", "2.0", &["GLib-2.0"]);
        write_gir(dir.path(), "GLib", "2.0", &[]);

        let dirs = vec![dir.path().to_path_buf()];
        let diagnostics = Diagnostics::new(Environment::Gjs);
        let result = ModuleLoader::new(&dirs, &diagnostics).load(&["Gtk-3.0".to_owned()]);

        assert_eq!(
            names(&result.loaded),
            vec![
                ("Gtk-3.0", ResolveType::ByHand),
                ("GObject-2.0", ResolveType::Dependence),
                ("Gdk-3.0", ResolveType::Dependence),
                ("GLib-2.0", ResolveType::Dependence),
            ]
        );
        assert_eq!(
            result.loaded[0].module.transitive_dependencies,
            vec!["GObject-2.0", "GLib-2.0", "Gdk-3.0"]
        );
        assert!(result.failed.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_module_reported_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_gir(dir.path(), "A", "1.0", &["C-1.0"]);
        write_gir(dir.path(), "B", "1.0", &["C-1.0"]);

        let dirs = vec![dir.path().to_path_buf()];
        let diagnostics = Diagnostics::new(Environment::Node);
        let result = ModuleLoader::new(&dirs, &diagnostics)
            .load(&["A-1.0".to_owned(), "B-1.0".to_owned(), "C-1.0".to_owned()]);

        assert_eq!(result.loaded.len(), 2);
        assert_eq!(result.failed.iter().collect::<Vec<_>>(), vec!["C-1.0"]);
        assert_eq!(diagnostics.count(DiagnosticKind::MissingModule), 1);
        // still part of the closure so the emitter can flag it
        assert_eq!(result.loaded[0].module.transitive_dependencies, vec!["C-1.0"]);
    }

    #[test]
    fn test_malformed_module_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_gir(dir.path(), "Good", "1.0", &["Bad-1.0"]);
        std::fs::write(dir.path().join("Bad-1.0.gir"), "<repository/>").expect("write");

        let dirs = vec![dir.path().to_path_buf()];
        let diagnostics = Diagnostics::new(Environment::Gjs);
        let result = ModuleLoader::new(&dirs, &diagnostics).load(&["Good-1.0".to_owned()]);

        assert_eq!(names(&result.loaded), vec![("Good-1.0", ResolveType::ByHand)]);
        assert!(result.failed.contains("Bad-1.0"));
        assert_eq!(diagnostics.count(DiagnosticKind::MalformedModule), 1);
    }

    #[test]
    fn test_version_conflicts_are_grouped() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_gir(dir.path(), "Gtk", "3.0", &[]);
        write_gir(dir.path(), "Gtk", "4.0", &[]);
        write_gir(dir.path(), "Pango", "1.0", &[]);

        let dirs = vec![dir.path().to_path_buf()];
        let diagnostics = Diagnostics::new(Environment::Gjs);
        let mut loader = ModuleLoader::new(&dirs, &diagnostics);
        let requested = loader
            .find_modules(&["*".to_owned()], &[])
            .expect("patterns");
        let groups = loader.load(&requested).groups();

        assert_eq!(
            groups,
            vec![
                ModuleGroup {
                    name: "gtk".to_owned(),
                    package_names: vec!["Gtk-3.0".to_owned(), "Gtk-4.0".to_owned()],
                    resolve_type: ResolveType::ByHand,
                    has_conflict: true,
                },
                ModuleGroup {
                    name: "pango".to_owned(),
                    package_names: vec!["Pango-1.0".to_owned()],
                    resolve_type: ResolveType::ByHand,
                    has_conflict: false,
                },
            ]
        );
    }

    #[test]
    fn test_listing() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_gir(dir.path(), "Gtk", "3.0", &["GLib-2.0", "Atk-1.0"]);
        write_gir(dir.path(), "Gtk", "4.0", &["GLib-2.0"]);
        write_gir(dir.path(), "GLib", "2.0", &[]);

        let dirs = vec![dir.path().to_path_buf()];
        let diagnostics = Diagnostics::new(Environment::Gjs);
        let result = ModuleLoader::new(&dirs, &diagnostics)
            .load(&["Gtk-3.0".to_owned(), "Gtk-4.0".to_owned()]);

        insta::assert_snapshot!(result.listing(), @r"
        Selected Modules:
        - Gtk-3.0
        - Gtk-4.0

        Dependencies:
        - GLib-2.0

        Conflicts:
        - gtk
          - Gtk-3.0
          - Gtk-4.0

        Dependencies not found:
        - Atk-1.0
        ");
    }
}
