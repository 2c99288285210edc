//! CLI entry point for the import indexer.
//!
//! Opens the project that contains the given path, builds its index from disk and
//! answers one query: resolution, specifier choice, importers, unused modules,
//! package candidates, or the edit for a new import.

use anyhow::{Context, Result, anyhow};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use importer::config::CONFIG_DIR;
use importer::edit::{ImportRequest, plan_import};
use importer::indexing::{SourceSymbolImport, Workspace, importer_key};
use importer::project_resolver::{ImportPreference, ManifestReader};
use importer::providers::{DiskFileSystem, JsonManifestReader, TsConfigProvider};
use importer::specifier::shorten;
use importer::{Project, Settings};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Files that mark a project root.
const ROOT_MARKERS: &[&str] = &["tsconfig.json", "jsconfig.json", "package.json"];

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Import statement indexer
#[derive(Parser)]
#[command(
    name = "importer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Index, resolve and insert JavaScript/TypeScript imports",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show detailed loading information
    #[arg(long, global = true)]
    info: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the .importer directory with default configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,

    /// Build the index of a project and print summary counts
    Index {
        /// Project root (defaults to the current directory)
        root: Option<PathBuf>,
    },

    /// Resolve a specifier as written in FILE
    Resolve {
        #[arg(long)]
        from: PathBuf,
        specifier: String,
    },

    /// Preferred specifier for importing TARGET into FILE
    Specifier {
        #[arg(long)]
        from: PathBuf,
        target: PathBuf,
        /// Override the configured preference
        #[arg(long)]
        preference: Option<ImportPreference>,
    },

    /// Files importing FILE
    Importers { file: PathBuf },

    /// Modules nothing imports
    Unused {
        /// Project root (defaults to the current directory)
        root: Option<PathBuf>,
    },

    /// Files a specifier may refer to, including package entry points
    Candidates {
        #[arg(long)]
        from: PathBuf,
        specifier: String,
    },

    /// Print the edit that adds an import to FILE, as JSON
    Add {
        #[arg(long)]
        file: PathBuf,
        /// Universal specifier: a package name or a project file
        #[arg(long)]
        module: String,
        /// Import this named symbol instead of the whole module
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        alias: Option<String>,
    },
}

#[derive(Serialize)]
struct ImporterEntry {
    file: String,
    location: String,
}

fn init_logging(settings: &Settings, info: bool) {
    let level = if info || settings.debug {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_from(path)
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        })),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).with_context(|| format!("cannot access {}", path.display()))
}

/// Nearest ancestor of `file` holding a project marker, else the current directory.
fn project_root_for(file: &Path) -> Result<PathBuf> {
    let marked = file
        .ancestors()
        .skip(1)
        .find(|dir| ROOT_MARKERS.iter().any(|marker| dir.join(marker).is_file()));
    match marked {
        Some(dir) => Ok(dir.to_path_buf()),
        None => absolute(Path::new(".")),
    }
}

fn default_root(root: &Option<PathBuf>, settings: &Settings) -> Result<PathBuf> {
    match root.as_ref().or(settings.workspace_root.as_ref()) {
        Some(root) => absolute(root),
        None => absolute(Path::new(".")),
    }
}

async fn open(settings: &Settings, root: &Path) -> Result<Workspace> {
    let fs = Arc::new(DiskFileSystem::new(settings.indexing.clone()));
    let manifests: Arc<dyn ManifestReader> = Arc::new(JsonManifestReader::new(fs.clone()));
    let mut workspace = Workspace::new(settings, Arc::new(TsConfigProvider::new()), fs, manifests);
    let summary = workspace
        .open_project(root)
        .await
        .with_context(|| format!("opening project {}", root.display()))?;
    tracing::info!(
        "indexed {} files ({} failed) in {}",
        summary.scanned,
        summary.failed,
        root.display()
    );
    Ok(workspace)
}

fn project<'w>(workspace: &'w Workspace, root: &Path) -> Result<&'w Project> {
    workspace
        .project(root)
        .ok_or_else(|| anyhow!("project {} is not open", root.display()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    init_logging(&settings, cli.info);

    match &cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(*force).map_err(|e| anyhow!("{e}"))?;
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
        }

        Commands::Config => {
            println!("Current Configuration ({CONFIG_DIR}/settings.toml):");
            println!("{}", "=".repeat(50));
            println!("{}", toml::to_string_pretty(&settings)?);
        }

        Commands::Index { root } => {
            let root = default_root(root, &settings)?;
            let workspace = open(&settings, &root).await?;
            print_json(&project(&workspace, &root)?.index().stats())?;
        }

        Commands::Resolve { from, specifier } => {
            let from = absolute(from)?;
            let root = project_root_for(&from)?;
            let workspace = open(&settings, &root).await?;
            print_json(&project(&workspace, &root)?.resolve(&from, specifier))?;
        }

        Commands::Specifier {
            from,
            target,
            preference,
        } => {
            let from = absolute(from)?;
            let target = absolute(target)?;
            let root = project_root_for(&from)?;
            let workspace = open(&settings, &root).await?;
            let key = shorten(&importer_key(&target));
            let preference = preference.unwrap_or(settings.resolution.preference);
            println!(
                "{}",
                project(&workspace, &root)?.best_specifier(&from, &key, preference)
            );
        }

        Commands::Importers { file } => {
            let file = absolute(file)?;
            let root = project_root_for(&file)?;
            let workspace = open(&settings, &root).await?;
            let key = shorten(&importer_key(&file));
            let importers: Vec<ImporterEntry> = project(&workspace, &root)?
                .index()
                .importers_of(&key)
                .into_iter()
                .map(|(file, location)| ImporterEntry {
                    file,
                    location: location.to_string(),
                })
                .collect();
            print_json(&importers)?;
        }

        Commands::Unused { root } => {
            let root = default_root(root, &settings)?;
            let workspace = open(&settings, &root).await?;
            let index = project(&workspace, &root)?.index();
            println!("Source modules:");
            for module in index.unused_source_modules() {
                println!("  {}", module.path.display());
            }
            println!("Node modules:");
            for module in index.unused_node_modules() {
                println!("  {}", module.specifier);
            }
        }

        Commands::Candidates { from, specifier } => {
            let from = absolute(from)?;
            let root = project_root_for(&from)?;
            let workspace = open(&settings, &root).await?;
            for file in project(&workspace, &root)?.locate(&from, specifier) {
                println!("{}", file.display());
            }
        }

        Commands::Add {
            file,
            module,
            symbol,
            alias,
        } => {
            let file = absolute(file)?;
            let root = project_root_for(&file)?;
            let workspace = open(&settings, &root).await?;
            let project = project(&workspace, &root)?;

            // A path on disk names a project file; anything else is a package
            let target = match std::fs::canonicalize(module) {
                Ok(path) => shorten(&importer_key(&path)),
                Err(_) => module.clone(),
            };
            let request = match symbol {
                Some(name) => ImportRequest::SymbolPattern(SourceSymbolImport::new(
                    target,
                    name.clone(),
                    alias.clone(),
                )),
                None => ImportRequest::Module {
                    target,
                    alias: alias.clone(),
                },
            };
            let document = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let edit = plan_import(
                project,
                &file,
                &document,
                &request,
                settings.resolution.preference,
                &settings.style.import_style(),
            );
            print_json(&edit)?;
        }
    }

    Ok(())
}
