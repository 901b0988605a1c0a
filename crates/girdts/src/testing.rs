//! Fixtures shared by unit tests

use std::path::Path;

use crate::{
    config::Environment, diagnostics::Diagnostics, gir::NodeIdGen, module::GirModule,
    naming::Transformation, universe::Universe,
};

/// Parse every source as one module, in order, and build the universe
pub(crate) fn universe(environment: Environment, sources: &[&str]) -> (Universe, Diagnostics) {
    let mut ids = NodeIdGen::new();
    let transformation = Transformation::new(environment);
    let modules = sources
        .iter()
        .map(|source| {
            GirModule::parse(source, Path::new("test.gir"), &mut ids, &transformation)
                .expect("valid GIR fixture")
        })
        .collect();
    let diagnostics = Diagnostics::new(environment);
    let universe = Universe::build(modules, &diagnostics);
    (universe, diagnostics)
}

/// `<repository>` wrapper declaring the `c` and `glib` prefixes
pub(crate) fn repository(namespace: &str, version: &str, includes: &[&str], body: &str) -> String {
    let includes: String = includes
        .iter()
        .map(|include| {
            let (name, version) = include.rsplit_once('-').unwrap_or((include, "1.0"));
            format!("  <include name=\"{name}\" version=\"{version}\"/>\n")
        })
        .collect();
    format!(
        "<repository xmlns:c=\"http://www.gtk.org/introspection/c/1.0\" xmlns:glib=\"http://www.gtk.org/introspection/glib/1.0\">\n{includes}  <namespace name=\"{namespace}\" version=\"{version}\">\n{body}\n  </namespace>\n</repository>"
    )
}
