//! girdts: TypeScript declarations for GObject Introspection modules
//!
//! The pipeline runs leaf-first: GIR files are located and parsed by the
//! [`loader`], every parsed module is folded into one immutable
//! [`universe::Universe`] (global symbol table plus node side-table), and the
//! [`generator`] flattens each module's entities into declaration lines that
//! are finally assembled into files by the [`emitter`].

pub mod config;
pub mod diagnostics;
pub mod emitter;
pub mod exporter;
pub mod flatten;
pub mod generator;
pub mod gir;
pub mod inheritance;
pub mod loader;
pub mod members;
pub mod module;
pub mod module_graph;
pub mod naming;
pub mod overloads;
pub mod overrides;
pub mod symbol_table;
pub mod templates;
pub mod type_map;
pub mod type_resolver;
pub mod universe;
pub mod util;

#[cfg(test)]
mod testing;
