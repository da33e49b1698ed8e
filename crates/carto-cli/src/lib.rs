//! Cartograph command line
//!
//! ```text
//! cartograph discover --schema <file> --tree <snapshot> [options]
//! cartograph check-schema --schema <file>
//! ```
//!
//! `discover` exits with 1 when discovery itself fails and with 2 for
//! usage, configuration or input file problems.

#![warn(unreachable_pub)]

mod store;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use parking_lot::Mutex;

use carto_discover::{
    ArchivingHandler, DiscoverConfig, DiscoverError, Discoverer, HandlerRegistry, ModelNode, OfflineTree,
};
use carto_path::Location;
use carto_schema::SchemaSet;
use carto_version::AccessMode;

pub use store::{DirectoryStore, DEFAULT_FILES_DIR};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Failure of a command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Bad arguments, configuration or input files
    #[error(transparent)]
    Setup(#[from] anyhow::Error),

    /// Discovery pass failed
    #[error(transparent)]
    Discovery(#[from] DiscoverError),
}

impl CliError {
    /// Process exit code
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Discovery(_) => 1,
            Self::Setup(_) => 2,
        }
    }
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML document
    Yaml,
    /// Pretty-printed JSON
    Json,
}

impl Format {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Format implied by an output file name; YAML unless it ends in `.json`
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Render a document
    ///
    /// # Errors
    /// If the document cannot be serialized.
    pub fn render(self, document: &ModelNode) -> anyhow::Result<String> {
        let text = match self {
            Self::Yaml => serde_yaml::to_string(document)?,
            Self::Json => {
                let mut text = serde_json::to_string_pretty(document)?;
                text.push('\n');
                text
            }
        };
        Ok(text)
    }
}

/// Command line definition
#[must_use]
pub fn command() -> Command {
    Command::new("cartograph")
        .version(VERSION)
        .about("Discover a management tree into a model document")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write log events as JSON lines"),
        )
        .subcommand(
            Command::new("discover")
                .about("Walk a tree snapshot and write the model document")
                .arg(schema_arg())
                .arg(
                    Arg::new("tree")
                        .long("tree")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Tree snapshot (YAML, or JSON with a .json extension)"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("product-version")
                        .long("product-version")
                        .help("Product version to discover against"),
                )
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_parser(["offline", "online"])
                        .help("Access mode the snapshot was taken in"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the document here instead of stdout"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_parser(["yaml", "json"])
                        .help("Document format [default: from output extension, else yaml]"),
                )
                .arg(
                    Arg::new("archive-dir")
                        .long("archive-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory side artifacts are copied into"),
                )
                .arg(
                    Arg::new("archive-attribute")
                        .long("archive-attribute")
                        .action(ArgAction::Append)
                        .help("Model attribute whose file value is archived (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("check-schema")
                .about("Load and validate a schema file")
                .arg(schema_arg()),
        )
}

fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Schema file (YAML or JSON)")
}

/// Install the tracing subscriber; `RUST_LOG` overrides the `info` default
pub fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Run the selected subcommand
///
/// # Errors
/// [`CliError::Discovery`] if the pass fails, [`CliError::Setup`] for
/// everything else.
pub fn run(matches: &ArgMatches) -> Result<(), CliError> {
    match matches.subcommand() {
        Some(("discover", args)) => run_discover(args),
        Some(("check-schema", args)) => {
            let summary = check_schema(required_path(args, "schema")?)?;
            println!("{summary}");
            Ok(())
        }
        Some((other, _)) => Err(anyhow::anyhow!("unknown command '{other}'").into()),
        None => Err(anyhow::anyhow!("no command given").into()),
    }
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a Path> {
    args.get_one::<PathBuf>(name)
        .map(PathBuf::as_path)
        .with_context(|| format!("--{name} is required"))
}

/// Load a schema file and describe it
///
/// # Errors
/// If the schema cannot be read or is invalid.
pub fn check_schema(path: &Path) -> anyhow::Result<String> {
    let schema = SchemaSet::from_path(path).with_context(|| format!("invalid schema {}", path.display()))?;
    Ok(format!(
        "{}: {} top-level folders, {} folders in total",
        path.display(),
        schema.folders().len(),
        schema.folder_count()
    ))
}

/// Settings of one `discover` invocation
#[derive(Debug, Clone)]
pub struct DiscoverRequest {
    /// Schema file
    pub schema: PathBuf,
    /// Tree snapshot file
    pub tree: PathBuf,
    /// Configuration with command line overrides applied
    pub config: DiscoverConfig,
    /// Archive directory, if side artifacts are collected
    pub archive_dir: Option<PathBuf>,
    /// Output file; stdout when unset
    pub output: Option<PathBuf>,
    /// Document format
    pub format: Format,
}

impl DiscoverRequest {
    /// Build from parsed `discover` arguments
    ///
    /// # Errors
    /// If the configuration file cannot be loaded.
    pub fn from_args(args: &ArgMatches) -> anyhow::Result<Self> {
        let mut config = match args.get_one::<PathBuf>("config") {
            Some(path) => DiscoverConfig::from_path(path)?,
            None => DiscoverConfig::new(),
        };
        if let Some(version) = args.get_one::<String>("product-version") {
            config = config.with_product_version(version.clone());
        }
        if let Some(mode) = args.get_one::<String>("mode") {
            let mode: AccessMode = mode.parse()?;
            config = config.with_mode(mode);
        }
        if let Some(names) = args.get_many::<String>("archive-attribute") {
            for name in names {
                config = config.with_archive_attribute(name.clone());
            }
        }

        let output = args.get_one::<PathBuf>("output").cloned();
        let format = match args.get_one::<String>("format").and_then(|f| Format::parse(f)) {
            Some(format) => format,
            None => output.as_deref().map_or(Format::Yaml, Format::for_path),
        };

        Ok(Self {
            schema: required_path(args, "schema")?.to_path_buf(),
            tree: required_path(args, "tree")?.to_path_buf(),
            config,
            archive_dir: args.get_one::<PathBuf>("archive-dir").cloned(),
            output,
            format,
        })
    }

    fn handlers(&self) -> anyhow::Result<(HandlerRegistry, Option<Arc<Mutex<DirectoryStore>>>)> {
        let mut registry = HandlerRegistry::new();
        if self.config.archive_attributes.is_empty() {
            return Ok((registry, None));
        }
        let Some(dir) = &self.archive_dir else {
            bail!("archive attributes are configured but no --archive-dir was given");
        };

        let store = Arc::new(Mutex::new(DirectoryStore::new(dir)));
        let mut handler = ArchivingHandler::new(Arc::clone(&store));
        if let Some(home) = &self.config.domain_home {
            handler = handler.with_domain_home(home);
        }
        for root in &self.config.excluded_roots {
            handler = handler.with_excluded_root(root);
        }
        for name in &self.config.archive_attributes {
            registry.register(name.clone(), handler.clone());
        }
        Ok((registry, Some(store)))
    }

    /// Discover the snapshot into a document
    ///
    /// # Errors
    /// [`CliError::Setup`] if an input cannot be loaded,
    /// [`CliError::Discovery`] if the pass fails.
    pub fn discover(&self) -> Result<ModelNode, CliError> {
        let target = self.config.target().context("invalid discovery target")?;
        let schema = SchemaSet::from_path(&self.schema)
            .with_context(|| format!("invalid schema {}", self.schema.display()))?;
        let source = OfflineTree::from_path(&self.tree)
            .with_context(|| format!("invalid tree snapshot {}", self.tree.display()))?;
        let (handlers, store) = self.handlers()?;

        let mut discoverer = Discoverer::new(&schema, source, target)
            .with_coercer(self.config.coercer())
            .with_handlers(handlers);
        let document = discoverer.discover(&Location::new())?;

        if let Some(store) = store {
            tracing::info!("archived {} files", store.lock().stored().len());
        }
        Ok(document)
    }

    /// Write a rendered document to the output file or stdout
    ///
    /// # Errors
    /// If rendering or writing fails.
    pub fn write(&self, document: &ModelNode) -> anyhow::Result<()> {
        let text = self.format.render(document)?;
        match &self.output {
            Some(path) => {
                std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!("wrote model to {}", path.display());
            }
            None => print!("{text}"),
        }
        Ok(())
    }
}

fn run_discover(args: &ArgMatches) -> Result<(), CliError> {
    let request = DiscoverRequest::from_args(args)?;
    let document = request.discover()?;
    request.write(&document)?;
    Ok(())
}
