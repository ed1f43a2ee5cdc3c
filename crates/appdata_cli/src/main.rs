mod fixtures;
mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use appdata_core::config::{self, AppDataConfig};
use appdata_core::{
    ApplicationReader, ApplicationRecord, DataSourceRegistry, LoadState, resolve_activation,
};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use tracing::info;

use crate::fixtures::{FileMetadataSource, fixture_loaders};
use crate::output::Output;

#[derive(Parser)]
#[command(name = "appdata-cli")]
#[command(about = "Inspect data source activation and loading for applications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered data sources
    Sources,
    /// Show which data sources are active for an application record
    Resolve {
        /// Path to an application record (JSON)
        record: PathBuf,
    },
    /// Load an application from a fixture directory
    Load {
        /// Application name
        name: String,

        /// Directory holding `<name>.json` and `<name>/<key>.json` payloads
        #[arg(long, short = 'f')]
        fixtures: PathBuf,

        /// Print loaded payloads
        #[arg(long)]
        show_data: bool,
    },
    /// List applications in a fixture directory
    Apps {
        #[arg(long, short = 'f')]
        fixtures: PathBuf,
    },
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{
        EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("appdata_core=debug,appdata_cli=debug,info")
        } else {
            EnvFilter::new("appdata_core=info,appdata_cli=info,warn")
        }
    });

    let terminal_layer = fmt::layer()
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(terminal_layer.with_filter(env_filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .build(),
        )
    }))?;
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = if let Some(config_path) = &cli.config {
        info!("Loading config from: {}", config_path.display());
        config::load_config(config_path).await?
    } else {
        config::load_config_from_standard_locations().await?
    };

    let registry = Arc::new(DataSourceRegistry::new());
    config.apply(&registry)?;

    let output = Output::new();
    match cli.command {
        Commands::Sources => list_sources(&registry, &config),
        Commands::Resolve { record } => resolve(&registry, &record, &output).await?,
        Commands::Load {
            name,
            fixtures,
            show_data,
        } => load(registry, &name, &fixtures, show_data, &output).await?,
        Commands::Apps { fixtures } => list_apps(registry, &fixtures, &output).await?,
    }

    Ok(())
}

fn list_sources(registry: &DataSourceRegistry, config: &AppDataConfig) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Key", "Label", "Visible", "Optional", "Opt-in", "Lazy", "Requires",
    ]);

    for descriptor in registry.list_data_sources() {
        let requires = descriptor
            .required_data_sources
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            descriptor.key.to_string(),
            descriptor.label().to_string(),
            descriptor.visible.to_string(),
            descriptor.optional.to_string(),
            descriptor.opt_in.to_string(),
            descriptor.lazy.to_string(),
            requires,
        ]);
    }

    println!("{table}");
    if !config.register_defaults {
        println!("{}", "built-in data sources not registered".dimmed());
    }
}

async fn resolve(registry: &DataSourceRegistry, path: &Path, output: &Output) -> Result<()> {
    let content = tokio::fs::read_to_string(path).await.into_diagnostic()?;
    let record: ApplicationRecord = serde_json::from_str(&content).into_diagnostic()?;
    let config = record.data_source_config()?;
    let activation = resolve_activation(&registry.list_data_sources(), config.as_ref());

    output.section(&format!("Data sources for {}", record.name));
    if config.is_none() {
        output.kv("dataSources", &"not configured".dimmed().to_string());
    }
    for (key, disabled) in activation.iter() {
        output.kv(key, &Output::status_flag(disabled));
    }
    Ok(())
}

async fn load(
    registry: Arc<DataSourceRegistry>,
    name: &str,
    fixtures: &Path,
    show_data: bool,
    output: &Output,
) -> Result<()> {
    let loaders = fixture_loaders(fixtures, &registry.keys());
    let reader = ApplicationReader::builder()
        .registry(registry)
        .metadata(Arc::new(FileMetadataSource::new(fixtures)))
        .loaders(loaders)
        .build()?;

    let application = reader.get_application(name).await?;

    output.section(&format!("Application {}", application.name().bright_cyan()));
    for source in application.data_sources() {
        let status = match source.state() {
            LoadState::Loaded => "loaded".green().to_string(),
            LoadState::Failed => "failed".red().to_string(),
            LoadState::Loading => "loading".yellow().to_string(),
            LoadState::Idle if source.disabled() => Output::status_flag(true),
            LoadState::Idle => "not loaded".dimmed().to_string(),
        };
        output.kv(source.key(), &status);
        if let Some(error) = source.error() {
            output.kv("  error", error);
        }
        if show_data && source.loaded() {
            let pretty = serde_json::to_string_pretty(source.data()).into_diagnostic()?;
            println!("{pretty}");
        }
    }

    let failed = application
        .data_sources()
        .iter()
        .filter(|ds| ds.state() == LoadState::Failed)
        .count();
    if failed == 0 {
        output.success("all active data sources loaded");
    } else {
        output.warning(&format!("{failed} data source(s) failed to load"));
    }
    Ok(())
}

async fn list_apps(registry: Arc<DataSourceRegistry>, fixtures: &Path, output: &Output) -> Result<()> {
    let reader = ApplicationReader::builder()
        .registry(registry)
        .metadata(Arc::new(FileMetadataSource::new(fixtures)))
        .build()?;

    let apps = reader.list_applications().await?;
    if apps.is_empty() {
        output.error(&format!("no applications found in {}", fixtures.display()));
        return Ok(());
    }
    for app in apps {
        let status = match DataSourcesStatus::of(&app) {
            DataSourcesStatus::Configured => "dataSources configured".to_string(),
            DataSourcesStatus::Defaults => "defaults".dimmed().to_string(),
            DataSourcesStatus::Invalid(reason) => {
                format!("{} ({reason})", "invalid dataSources".red())
            }
        };
        output.kv(&app.name, &status);
    }
    Ok(())
}

/// How an application's `dataSources` attribute will be treated
#[derive(Debug, PartialEq)]
enum DataSourcesStatus {
    Configured,
    Defaults,
    Invalid(String),
}

impl DataSourcesStatus {
    fn of(record: &ApplicationRecord) -> Self {
        match record.data_source_config() {
            Ok(Some(_)) => Self::Configured,
            Ok(None) => Self::Defaults,
            Err(e) => Self::Invalid(e.to_string()),
        }
    }
}
