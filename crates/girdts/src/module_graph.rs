//! Module dependency graph
//!
//! Nodes are package names (`Gtk-3.0`), edges point from a module to each of
//! its `<include>`s. Packages that were referenced but never loaded stay in
//! the graph as leaves so that they still show up in dependency closures.

use std::hash::BuildHasherDefault;

use indexmap::{IndexMap, IndexSet};
use log::debug;
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};
use rustc_hash::FxHasher;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    nodes: FxIndexMap<String, NodeIndex>,
    /// Direct dependencies of every loaded package, in include order
    dependencies: FxIndexMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, package_name: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(package_name) {
            return index;
        }
        let index = self.graph.add_node(package_name.to_owned());
        self.nodes.insert(package_name.to_owned(), index);
        index
    }

    /// Register a loaded package and its direct dependencies
    pub fn add_module(&mut self, package_name: &str, dependencies: &[String]) {
        let from = self.node(package_name);
        for dependency in dependencies {
            let to = self.node(dependency);
            self.graph.update_edge(from, to, ());
        }
        self.dependencies
            .insert(package_name.to_owned(), dependencies.to_vec());
    }

    pub fn contains(&self, package_name: &str) -> bool {
        self.dependencies.contains_key(package_name)
    }

    pub fn dependencies(&self, package_name: &str) -> Option<&[String]> {
        self.dependencies.get(package_name).map(Vec::as_slice)
    }

    /// Depth-first closure over direct dependencies, skipping visited packages
    pub fn traverse_dependencies(&self, package_name: &str, visited: &mut FxIndexSet<String>) {
        let Some(dependencies) = self.dependencies.get(package_name) else {
            return;
        };
        for dependency in dependencies {
            if visited.insert(dependency.clone()) {
                self.traverse_dependencies(dependency, visited);
            }
        }
    }

    /// Transitive dependencies of `package_name`, in discovery order
    pub fn transitive_dependencies(&self, package_name: &str) -> Vec<String> {
        let mut visited = FxIndexSet::default();
        self.traverse_dependencies(package_name, &mut visited);
        visited.into_iter().collect()
    }

    /// Groups of packages that include each other
    pub fn include_cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&node| self.graph.contains_edge(node, node))
            })
            .map(|component| {
                let mut names: Vec<String> = component
                    .into_iter()
                    .map(|node| self.graph[node].clone())
                    .collect();
                names.sort();
                names
            })
            .collect()
    }

    /// Log include cycles; they are legal and only of interest when debugging
    pub fn report_cycles(&self) {
        for cycle in self.include_cycles() {
            debug!("Include cycle: {}", cycle.join(" -> "));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn deps(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn test_transitive_closure() {
        let mut graph = DependencyGraph::new();
        graph.add_module("Gtk-3.0", &deps(&["Gdk-3.0", "GObject-2.0"]));
        graph.add_module("Gdk-3.0", &deps(&["cairo-1.0", "GObject-2.0"]));
        graph.add_module("GObject-2.0", &deps(&["GLib-2.0"]));
        graph.add_module("GLib-2.0", &[]);

        assert_eq!(
            graph.transitive_dependencies("Gtk-3.0"),
            vec!["Gdk-3.0", "cairo-1.0", "GObject-2.0", "GLib-2.0"]
        );
        assert!(graph.contains("Gdk-3.0"));
        assert!(!graph.contains("cairo-1.0"));
        assert_eq!(graph.transitive_dependencies("cairo-1.0"), Vec::<String>::new());
    }

    #[test]
    fn test_cycles_terminate() {
        let mut graph = DependencyGraph::new();
        graph.add_module("A-1.0", &deps(&["B-1.0"]));
        graph.add_module("B-1.0", &deps(&["A-1.0"]));
        graph.add_module("C-1.0", &deps(&["C-1.0"]));

        assert_eq!(graph.transitive_dependencies("A-1.0"), vec!["B-1.0", "A-1.0"]);
        assert_eq!(
            graph.include_cycles(),
            vec![deps(&["A-1.0", "B-1.0"]), deps(&["C-1.0"])]
        );
    }
}
