use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use girdts::{
    config::{BuildType, Config, ConfigOverrides, Environment},
    diagnostics::Diagnostics,
    generator::Generator,
    loader::{LoadResult, ModuleLoader},
};

#[derive(Debug, Parser)]
#[command(
    name = "girdts",
    version,
    about = "Generate TypeScript declarations for GObject Introspection modules"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate .d.ts files for the given modules and their dependencies
    Generate(GenerateArgs),
    /// List the available GIR modules
    List(CommonArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Module names or wildcards, e.g. `Gtk-3.0` or `Gtk*`
    modules: Vec<String>,

    /// Directories searched for GIR files
    #[arg(short = 'g', long = "gir-directories")]
    gir_directories: Vec<PathBuf>,

    /// Modules excluded from the wildcard search
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Explicit config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Target environments
    #[arg(short, long, value_enum)]
    environments: Vec<Environment>,

    /// Shape of the declarations, defaults to `lib` for gjs and `types` for node
    #[arg(short, long, value_enum)]
    build_type: Option<BuildType>,

    /// Output directory
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Print the declarations instead of writing files
    #[arg(short, long)]
    print: bool,

    /// Keep every version of a conflicting module without warning
    #[arg(long)]
    ignore_conflicts: bool,
}

impl CommonArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            gir_directories: self.gir_directories.clone(),
            modules: self.modules.clone(),
            ignore: self.ignore.clone(),
            verbose: self.verbose,
            ..ConfigOverrides::default()
        }
    }
}

fn load_config(common: &CommonArgs, overrides: ConfigOverrides) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let mut config = Config::load(common.config.as_deref(), &cwd)?;
    config.apply(overrides);
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_modules(config: &Config, diagnostics: &Diagnostics) -> Result<LoadResult> {
    let mut loader = ModuleLoader::new(&config.gir_directories, diagnostics);
    let requested = loader.find_modules(&config.modules, &config.ignore)?;
    Ok(loader.load(&requested))
}

fn generate(args: GenerateArgs) -> Result<()> {
    let overrides = ConfigOverrides {
        environments: args.environments.clone(),
        build_type: args.build_type,
        outdir: args.outdir.clone(),
        print: args.print,
        ignore_conflicts: args.ignore_conflicts,
        ..args.common.overrides()
    };
    let config = load_config(&args.common, overrides)?;
    init_logging(config.verbose);

    for &environment in &config.environments {
        let generate_config = config.generate_config(environment);
        let diagnostics = Diagnostics::new(environment);

        let result = load_modules(&config, &diagnostics)?;
        if !config.ignore_conflicts {
            for group in result.groups().iter().filter(|group| group.has_conflict) {
                warn!(
                    "[{environment}] Multiple versions of '{}' found, all are kept: {}",
                    group.name,
                    group.package_names.join(", ")
                );
            }
        }

        let generator = Generator::new(&generate_config);
        let files = generator.generate(result.into_modules(), &diagnostics);
        if files.is_empty() {
            return Ok(());
        }
        generator.write(&files)?;
        info!(
            "[{environment}] Done, {} files, {} diagnostics",
            files.len(),
            diagnostics.entries().len()
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn list(args: CommonArgs) -> Result<()> {
    let config = load_config(&args, args.overrides())?;
    init_logging(config.verbose);

    let environment = config.environments.first().copied().unwrap_or(Environment::Gjs);
    let diagnostics = Diagnostics::new(environment);
    let result = load_modules(&config, &diagnostics)?;
    println!("\n{}", result.listing());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate(args),
        Command::List(args) => list(args),
    }
}
