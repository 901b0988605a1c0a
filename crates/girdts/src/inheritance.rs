//! Ancestor and interface walks over the universe
//!
//! Parent pointers are resolved lazily through the symbol table. Every walk
//! is bounded: a parent that points straight back at the entity that
//! introduced it stops the walk with a [`DiagnosticKind::CyclicInheritance`]
//! warning, and longer cycles are cut at [`MAX_INHERITANCE_DEPTH`].

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use log::debug;
use rustc_hash::{FxHashSet, FxHasher};

use crate::{
    diagnostics::{DiagnosticKind, Diagnostics},
    universe::{ClassRef, Universe},
};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Longest ancestor or interface chain followed before giving up
pub const MAX_INHERITANCE_DEPTH: usize = 100;

/// Canonical root of every reference counted object class
pub const ROOT_OBJECT: &str = "GObject.Object";

/// Parent name treated as [`ROOT_OBJECT`] when it does not resolve otherwise
const ROOT_OBJECT_SHORT: &str = "Object";

#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceOptions {
    /// Also follow prerequisites that are plain classes
    pub recurse_into_classes: bool,
    /// Visit every interface at most once per call
    pub dedupe: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct InheritanceWalker<'a> {
    universe: &'a Universe,
    diagnostics: &'a Diagnostics,
}

impl<'a> InheritanceWalker<'a> {
    pub fn new(universe: &'a Universe, diagnostics: &'a Diagnostics) -> Self {
        Self {
            universe,
            diagnostics,
        }
    }

    pub fn universe(&self) -> &'a Universe {
        self.universe
    }

    /// Resolve the declared parent of `class`
    pub fn parent(&self, class: &ClassRef<'a>) -> Option<ClassRef<'a>> {
        let raw = class.class.parent.as_deref()?;
        let qualified = class.module.qualify(raw);

        self.universe.lookup_class(&qualified).or_else(|| {
            if raw == ROOT_OBJECT_SHORT {
                self.universe.lookup_class(ROOT_OBJECT)
            } else {
                debug!("Parent '{qualified}' of '{}' is not loaded", class.full_name);
                None
            }
        })
    }

    /// `class` followed by its resolved ancestors, nearest first
    pub fn ancestry(&self, class: &ClassRef<'a>) -> Vec<ClassRef<'a>> {
        let mut chain = vec![class.clone()];

        loop {
            let Some(current) = chain.last() else {
                break;
            };
            let Some(parent) = self.parent(current) else {
                break;
            };

            if parent == *current {
                self.report_cycle(class, current);
                break;
            }
            if chain.len() > MAX_INHERITANCE_DEPTH {
                self.diagnostics.report(
                    DiagnosticKind::RecursionLimit,
                    &class.module.package_name,
                    format!(
                        "Inheritance chain of '{}' is deeper than {MAX_INHERITANCE_DEPTH}, truncated",
                        class.full_name
                    ),
                );
                break;
            }

            let returns = parent
                .qualified_parent()
                .is_some_and(|grandparent| grandparent == current.full_name);
            if returns {
                self.report_cycle(class, current);
                chain.push(parent);
                break;
            }
            chain.push(parent);
        }

        chain
    }

    fn report_cycle(&self, start: &ClassRef<'a>, at: &ClassRef<'a>) {
        self.diagnostics.report(
            DiagnosticKind::CyclicInheritance,
            &start.module.package_name,
            format!(
                "Cyclic inheritance at '{}' while walking '{}'",
                at.full_name, start.full_name
            ),
        );
    }

    /// Whether the ancestor chain reaches [`ROOT_OBJECT`]
    pub fn is_derived_from_root(ancestry: &[ClassRef<'_>]) -> bool {
        ancestry.iter().any(|class| class.full_name == ROOT_OBJECT)
    }

    /// Interfaces implemented by `class`, followed through their own
    /// `implements` and prerequisites, in discovery order
    pub fn interfaces(&self, class: &ClassRef<'a>, options: InterfaceOptions) -> Vec<ClassRef<'a>> {
        let mut seen = FxHashSet::default();
        seen.insert(class.full_name.clone());
        let mut found = Vec::new();
        self.collect_interfaces(class, options, &mut seen, &mut found, 0);
        found
    }

    fn collect_interfaces(
        &self,
        class: &ClassRef<'a>,
        options: InterfaceOptions,
        seen: &mut FxHashSet<String>,
        found: &mut Vec<ClassRef<'a>>,
        depth: usize,
    ) {
        if depth > MAX_INHERITANCE_DEPTH {
            self.diagnostics.report(
                DiagnosticKind::RecursionLimit,
                &class.module.package_name,
                format!(
                    "Interface chain of '{}' is deeper than {MAX_INHERITANCE_DEPTH}, truncated",
                    class.full_name
                ),
            );
            return;
        }

        let implemented = class
            .class
            .implements
            .iter()
            .map(|name| (name, false))
            .chain(class.class.prerequisites.iter().map(|name| (name, true)));

        for (name, is_prerequisite) in implemented {
            let qualified = class.module.qualify(name);
            if options.dedupe && seen.contains(&qualified) {
                continue;
            }
            let Some(interface) = self.universe.lookup_class(&qualified) else {
                debug!("Interface '{qualified}' of '{}' is not loaded", class.full_name);
                continue;
            };
            if is_prerequisite && !interface.class.is_interface() && !options.recurse_into_classes {
                continue;
            }

            seen.insert(qualified);
            found.push(interface.clone());
            self.collect_interfaces(&interface, options, seen, found, depth + 1);
        }
    }
}

/// `class -> [parent, interfaces..., ancestors of parent...]` for every class
#[derive(Debug, Default)]
pub struct InheritanceTable {
    entries: FxIndexMap<String, Vec<String>>,
}

impl InheritanceTable {
    /// Collect parents and implemented interfaces of every registered class
    pub fn build(universe: &Universe) -> Self {
        let mut entries: FxIndexMap<String, Vec<String>> = FxIndexMap::default();

        for module in universe.modules() {
            for class in &module.namespace.classes {
                let full_name = module.qualify(&class.name);
                if !universe.symbols().contains(&full_name) {
                    continue;
                }
                if let Some(parent) = &class.parent {
                    entries
                        .entry(full_name.clone())
                        .or_default()
                        .push(module.qualify(parent));
                }
                if !class.implements.is_empty() {
                    entries
                        .entry(full_name)
                        .or_default()
                        .extend(class.implements.iter().map(|name| module.qualify(name)));
                }
            }
        }

        let mut table = Self { entries };
        table.finalise();
        table
    }

    /// Append the ancestors reached by repeatedly following each first entry
    fn finalise(&mut self) {
        for index in 0..self.entries.len() {
            let Some((class, parents)) = self.entries.get_index(index) else {
                continue;
            };
            let mut visited: FxHashSet<&str> = FxHashSet::from_iter([class.as_str()]);
            let mut ancestors = Vec::new();
            let mut current = parents.first();

            while let Some(next) = current
                .and_then(|name| self.entries.get(name))
                .and_then(|parents| parents.first())
            {
                if !visited.insert(next.as_str()) || ancestors.len() >= MAX_INHERITANCE_DEPTH {
                    break;
                }
                ancestors.push(next.clone());
                current = Some(next);
            }

            self.entries[index].extend(ancestors);
        }
    }

    pub fn get(&self, class: &str) -> Option<&[String]> {
        self.entries.get(class).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(class, ancestors)| (class.as_str(), ancestors.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
