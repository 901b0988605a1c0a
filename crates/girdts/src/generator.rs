//! One generation pass for one target environment
//!
//! Takes the loaded modules, builds the universe once, renders every
//! declaration file and finally the support files shared by all modules.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, error, info};

use crate::{
    config::{BuildType, Environment, GenerateConfig},
    diagnostics::Diagnostics,
    emitter::DeclarationEmitter,
    inheritance::InheritanceTable,
    module::GirModule,
    overrides::OverrideTable,
    templates,
    universe::Universe,
};

/// Rendered file, path relative to the environment directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

#[derive(Debug)]
pub struct Generator<'a> {
    config: &'a GenerateConfig,
    overrides: OverrideTable,
}

impl<'a> Generator<'a> {
    /// Default clash patches extended by the configured ones
    pub fn new(config: &'a GenerateConfig) -> Self {
        let mut overrides = OverrideTable::with_defaults();
        overrides.extend(&config.patches);
        Self { config, overrides }
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Render every file of this pass
    ///
    /// Support files (`index.d.ts`, `Gjs.d.ts`, `cast.ts`) are only produced
    /// when writing to an output directory.
    pub fn generate(&self, modules: Vec<GirModule>, diagnostics: &Diagnostics) -> Vec<GeneratedFile> {
        let environment = self.config.environment;
        let build_type = self.config.build_type;
        info!("Start to generate .d.ts files for '{environment}' as '{build_type}'.");
        if modules.is_empty() {
            error!("Need to specify modules!");
            return Vec::new();
        }

        info!("Files parsed, loading types...");
        let universe = Universe::build(modules, diagnostics);
        let emitter = DeclarationEmitter::new(self.config, &universe, diagnostics, &self.overrides);

        info!("Types loaded, generating .d.ts...");
        let mut files = Vec::new();
        for module_id in universe.module_ids() {
            let package_name = &universe.module(module_id).package_name;
            debug!(" - {package_name} ...");
            files.push(GeneratedFile::new(
                format!("{package_name}.d.ts"),
                emitter.declaration(module_id),
            ));
            if build_type == BuildType::Lib {
                files.push(GeneratedFile::new(
                    format!("{package_name}.js"),
                    emitter.module_js(module_id),
                ));
            }
        }

        if self.config.outdir.is_some() {
            files.extend(self.support_files(&universe));
        }
        files
    }

    fn support_files(&self, universe: &Universe) -> Vec<GeneratedFile> {
        let environment = self.config.environment;
        let modules: Vec<(String, String)> = universe
            .modules()
            .iter()
            .map(|module| (module.import_name.clone(), module.package_name.clone()))
            .collect();

        let mut files = vec![GeneratedFile::new(
            "index.d.ts",
            templates::index_dts(environment, self.config.build_type, &modules),
        )];
        if environment == Environment::Gjs {
            files.push(GeneratedFile::new("Gjs.d.ts", templates::GJS_DTS.to_owned()));
            let table = InheritanceTable::build(universe);
            files.push(GeneratedFile::new("cast.ts", templates::cast_ts(table.iter())));
        }
        files
    }

    /// Write the files below the environment directory, or print them
    pub fn write(&self, files: &[GeneratedFile]) -> Result<()> {
        match self.config.environment_dir() {
            Some(dir) => write_files(&dir, files),
            None => {
                let mut stdout = std::io::stdout().lock();
                for file in files {
                    writeln!(stdout, "{}", file.contents).context("Failed to write to stdout")?;
                }
                Ok(())
            }
        }
    }
}

fn write_files(dir: &Path, files: &[GeneratedFile]) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    for file in files {
        let path = dir.join(&file.path);
        std::fs::write(&path, &file.contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    info!("Wrote {} files to {}", files.len(), dir.display());
    Ok(())
}
