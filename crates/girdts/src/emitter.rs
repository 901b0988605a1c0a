//! Declaration file assembly
//!
//! Wraps the namespace body produced by the exporter with the file header:
//! doc comment, environment import and one import per dependency. Whether a
//! dependency exists is decided by probing the GIR directories; nothing is
//! loaded from here.

use crate::{
    config::{BuildType, GenerateConfig},
    diagnostics::{DiagnosticKind, Diagnostics},
    exporter::ModuleExporter,
    module::GirModule,
    overrides::OverrideTable,
    symbol_table::ModuleId,
    templates,
    universe::Universe,
    util::{find_file_in_dirs, split_module_name},
};

const GOBJECT_PACKAGE: &str = "GObject-2.0";

/// Includes missing from some upstream GIR files, `(package, dependency)`
const MISSING_INCLUDES: &[(&str, &str)] = &[
    ("UnityExtras-7.0", "Unity-7.0"),
    ("UnityExtras-6.0", "Unity-6.0"),
    ("GTop-2.0", "GLib-2.0"),
];

#[derive(Debug, Clone, Copy)]
pub struct DeclarationEmitter<'a> {
    config: &'a GenerateConfig,
    universe: &'a Universe,
    diagnostics: &'a Diagnostics,
    overrides: &'a OverrideTable,
}

impl<'a> DeclarationEmitter<'a> {
    pub fn new(
        config: &'a GenerateConfig,
        universe: &'a Universe,
        diagnostics: &'a Diagnostics,
        overrides: &'a OverrideTable,
    ) -> Self {
        Self {
            config,
            universe,
            diagnostics,
            overrides,
        }
    }

    /// Dependencies to import: the transitive closure plus the always-needed extras
    pub fn dependencies(module: &GirModule) -> Vec<String> {
        let mut deps = module.transitive_dependencies.clone();
        let mut require = |dependency: &str| {
            if !deps.iter().any(|dep| dep == dependency) {
                deps.push(dependency.to_owned());
            }
        };

        if module.package_name != GOBJECT_PACKAGE {
            require(GOBJECT_PACKAGE);
        }
        for (package, dependency) in MISSING_INCLUDES {
            if module.package_name == *package {
                require(dependency);
            }
        }
        deps
    }

    /// Complete `.d.ts` text of one module
    pub fn declaration(&self, module_id: ModuleId) -> String {
        let module = self.universe.module(module_id);
        let build_type = self.config.build_type;

        let mut out = templates::doc_comment(&module.package_name);
        out.push(String::new());
        out.push(templates::environment_import(
            self.config.environment,
            build_type,
        ));

        for dep in Self::dependencies(module) {
            if dep == module.package_name {
                continue;
            }
            let filename = format!("{dep}.gir");
            if find_file_in_dirs(&self.config.gir_directories, &filename).is_some() {
                let (name, _) = split_module_name(&dep);
                out.push(templates::dependency_import(name, &dep, false, build_type));
            } else {
                out.push(format!("// WARN: Dependency not found: '{dep}'"));
                self.diagnostics.report(
                    DiagnosticKind::MissingDependency,
                    &module.package_name,
                    format!("Dependency gir file not found: '{filename}'"),
                );
            }
        }

        if build_type == BuildType::Types {
            out.push(String::new());
            out.push(format!("declare namespace {} {{", module.name));
        }
        out.push(String::new());

        out.extend(
            ModuleExporter::new(self.universe, module_id, self.diagnostics, self.overrides).export(),
        );

        if build_type == BuildType::Types {
            out.push("}".to_owned());
        }
        out.join("\n")
    }

    /// Loader module written next to the declaration of a lib build
    pub fn module_js(&self, module_id: ModuleId) -> String {
        let module = self.universe.module(module_id);
        templates::module_js(
            self.config.environment,
            &module.name,
            &module.version,
            &module.import_name,
        )
    }
}
