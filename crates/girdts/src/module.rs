//! One loaded GIR module

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::{
    gir::{Namespace, NodeIdGen, Repository, parse_gir},
    naming::Transformation,
};

/// A parsed GIR file, identified by `{name}-{version}`
#[derive(Debug, Clone)]
pub struct GirModule {
    /// Namespace name, e.g. `Gtk`
    pub name: String,
    /// E.g. `3.0`
    pub version: String,
    /// E.g. `Gtk-3.0`
    pub package_name: String,
    /// Namespace name as used in import lines
    pub import_name: String,
    /// Direct dependencies from `<include>`, later includes first
    pub dependencies: Vec<String>,
    /// Full dependency closure, filled in once every module is known
    pub transitive_dependencies: Vec<String>,
    pub namespace: Namespace,
    pub path: PathBuf,
}

impl GirModule {
    pub fn from_repository(
        repository: Repository,
        path: impl Into<PathBuf>,
        transformation: &Transformation,
    ) -> Self {
        let dependencies = repository
            .includes
            .iter()
            .rev()
            .map(|include| include.package_name())
            .collect();

        let namespace = repository.namespace;
        let package_name = format!("{}-{}", namespace.name, namespace.version);

        Self {
            name: namespace.name.clone(),
            version: namespace.version.clone(),
            import_name: transformation.module_namespace_name(&package_name),
            package_name,
            dependencies,
            transitive_dependencies: Vec::new(),
            namespace,
            path: path.into(),
        }
    }

    /// Parse GIR source text into a module
    pub fn parse(
        source: &str,
        path: &Path,
        ids: &mut NodeIdGen,
        transformation: &Transformation,
    ) -> Result<Self> {
        let raw = parse_gir(source, ids)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let repository = Repository::from_raw(&raw)
            .with_context(|| format!("Malformed GIR file {}", path.display()))?;
        Ok(Self::from_repository(repository, path, transformation))
    }

    /// Strip this module's namespace prefix from a qualified name
    pub fn local_name<'a>(&self, full_name: &'a str) -> &'a str {
        full_name
            .strip_prefix(self.name.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(full_name)
    }

    /// Qualify a possibly unqualified reference with this module's name
    pub fn qualify(&self, name: &str) -> String {
        if name.contains('.') {
            name.to_owned()
        } else {
            format!("{}.{}", self.name, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::Environment;

    const GIR: &str = r#"<repository>
  <include name="GLib" version="2.0"/>
  <include name="GObject" version="2.0"/>
  <namespace name="Zoo" version="1.0"/>
</repository>"#;

    #[test]
    fn test_module_identity_and_dependency_order() {
        let mut ids = NodeIdGen::new();
        let module = GirModule::parse(
            GIR,
            Path::new("Zoo-1.0.gir"),
            &mut ids,
            &Transformation::new(Environment::Gjs),
        )
        .expect("valid module");

        assert_eq!(module.package_name, "Zoo-1.0");
        assert_eq!(module.dependencies, vec!["GObject-2.0", "GLib-2.0"]);
        assert!(module.transitive_dependencies.is_empty());
    }

    #[test]
    fn test_qualify_and_local_name() {
        let mut ids = NodeIdGen::new();
        let module = GirModule::parse(
            GIR,
            Path::new("Zoo-1.0.gir"),
            &mut ids,
            &Transformation::new(Environment::Gjs),
        )
        .expect("valid module");

        assert_eq!(module.qualify("Animal"), "Zoo.Animal");
        assert_eq!(module.qualify("GObject.Object"), "GObject.Object");
        assert_eq!(module.local_name("Zoo.Animal"), "Animal");
        assert_eq!(module.local_name("Zookeeper.Animal"), "Zookeeper.Animal");
    }
}
