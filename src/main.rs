//! PlantDoc CLI
//!
//! Entry point for classifying leaf photos, inspecting catalogs, creating
//! model bundles and running the HTTP server.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use plantdoc::backend::{backend_name, default_device, DefaultBackend};
use plantdoc::catalog::{ContentCatalog, LabelCatalog, Locale};
use plantdoc::config::AppConfig;
use plantdoc::model::{create_untrained, ModelBundle, PlantClassifierConfig};
use plantdoc::model::{DEFAULT_BASE_FILTERS, DEFAULT_SEED};
use plantdoc::pipeline::{Diagnoser, Outcome};
use plantdoc::utils::logging::{init_logging, LogConfig, LogLevel};
use plantdoc::utils::{format_confidence_bar, format_latency};

/// PlantDoc: plant disease detection from leaf photos
///
/// Classifies a leaf image into one of the model's disease classes and shows
/// the matching description and treatment in English, Hindi or Marathi.
#[derive(Parser, Debug)]
#[command(name = "plantdoc")]
#[command(author = "Warre Snaet")]
#[command(version)]
#[command(about = "Plant disease detection from leaf photos with Burn", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true, env = "PLANTDOC_CONFIG")]
    config: Option<PathBuf>,

    /// Model bundle directory (overrides the config file)
    #[arg(long, global = true, env = "PLANTDOC_BUNDLE_DIR")]
    bundle_dir: Option<PathBuf>,

    /// Content JSON (overrides the built-in content)
    #[arg(long, global = true, env = "PLANTDOC_CONTENT")]
    content: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, env = "PLANTDOC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a single leaf image
    Classify {
        /// Path to the input image
        #[arg(short, long)]
        image: PathBuf,

        /// Display language (en, hi, mr)
        #[arg(short, long, env = "PLANTDOC_LOCALE")]
        locale: Option<String>,

        /// Print the diagnosis as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List the model's labels and their content coverage
    Labels,

    /// List supported locales
    Locales,

    /// Write a bundle with untrained weights (for wiring and demos)
    InitBundle {
        /// Output bundle directory
        #[arg(short, long)]
        output: PathBuf,

        /// Model name recorded in the manifest
        #[arg(long, default_value = "plant_disease")]
        name: String,

        /// JSON label list (defaults to the built-in labels)
        #[arg(long)]
        labels: Option<PathBuf>,

        /// Random seed for weight initialization
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Filters in the first convolution block
        #[arg(long, default_value_t = DEFAULT_BASE_FILTERS)]
        base_filters: usize,
    },

    /// Run the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, env = "PLANTDOC_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PLANTDOC_PORT")]
        port: Option<u16>,

        /// Per-request inference timeout in milliseconds
        #[arg(long, env = "PLANTDOC_INFERENCE_TIMEOUT_MS")]
        timeout_ms: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = &cli.bundle_dir {
        config.model.bundle_dir = dir.clone();
    }
    if let Some(path) = &cli.content {
        config.content.path = Some(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = LogLevel::parse(level);
    }

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else if matches!(cli.command, Commands::Serve { .. }) {
        LogConfig::production().with_level(config.logging.level)
    } else {
        LogConfig::cli().with_level(config.logging.level)
    };

    let _ = init_logging(&log_config);

    match cli.command {
        Commands::Classify {
            image,
            locale,
            json,
        } => {
            if !json {
                print_banner();
            }
            let locale = match locale {
                Some(code) => code.parse()?,
                None => config.locale.default,
            };
            cmd_classify(&config, &image, locale, json)?;
        }

        Commands::Labels => {
            print_banner();
            cmd_labels(&config)?;
        }

        Commands::Locales => {
            print_banner();
            cmd_locales(&config)?;
        }

        Commands::InitBundle {
            output,
            name,
            labels,
            seed,
            base_filters,
        } => {
            print_banner();
            cmd_init_bundle(&output, &name, labels.as_deref(), seed, base_filters)?;
        }

        Commands::Serve {
            host,
            port,
            timeout_ms,
        } => {
            print_banner();
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if timeout_ms.is_some() {
                config.server.inference_timeout_ms = timeout_ms;
            }
            config.validate()?;
            cmd_serve(&config)?;
        }
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        r#"
 ╔══════════════════════════════════════════════════════════╗
 ║   🌿 PlantDoc                                            ║
 ║   Plant Disease Detection with Burn + Rust               ║
 ╚══════════════════════════════════════════════════════════╝
  "#
        .green()
    );
}

fn load_content(config: &AppConfig) -> Result<ContentCatalog> {
    let content = match &config.content.path {
        Some(path) => ContentCatalog::from_file(path)?,
        None => ContentCatalog::builtin()?,
    };
    Ok(content)
}

fn cmd_classify(config: &AppConfig, image: &Path, locale: Locale, json: bool) -> Result<()> {
    let diagnoser = Diagnoser::from_config(config).context("failed to load the model")?;
    let diagnosis = diagnoser
        .classify_file(image, locale)
        .with_context(|| format!("failed to classify {}", image.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        return Ok(());
    }

    println!("{} {}", "Image:".cyan(), image.display());
    println!("{} {}", "Language:".cyan(), locale);
    println!();

    match &diagnosis.outcome {
        Outcome::Uncertain => {
            print!("{}", diagnosis.render(diagnoser.ui(locale)).yellow());
        }
        Outcome::Confident {
            confidence_percent, ..
        } => {
            print!("{}", diagnosis.render(diagnoser.ui(locale)));
            println!();
            println!("  {}", format_confidence_bar(*confidence_percent, 30).green());
        }
    }

    println!();
    println!(
        "{} {}",
        "Inference time:".cyan(),
        format_latency(diagnosis.inference_time_ms)
    );
    Ok(())
}

fn cmd_labels(config: &AppConfig) -> Result<()> {
    let bundle = ModelBundle::open(&config.model.bundle_dir)?;
    let content = load_content(config)?;
    let manifest = bundle.manifest();

    println!(
        "{} {} v{} ({} classes)",
        "Model:".cyan(),
        manifest.name,
        manifest.version,
        manifest.num_classes
    );
    println!();

    for (index, label) in bundle.labels().iter().enumerate() {
        let locales: Vec<&str> = Locale::ALL
            .into_iter()
            .filter(|&locale| {
                plantdoc::ContentResolver::new(&content)
                    .resolve(label, locale)
                    .record()
                    .is_some()
            })
            .map(|locale| locale.code())
            .collect();

        let status = if locales.is_empty() {
            "no content".red().to_string()
        } else {
            locales.join(",").green().to_string()
        };
        let name = if label.is_healthy() {
            label.to_string().green()
        } else {
            label.to_string().normal()
        };

        println!("  {:>2}. {:<45} {}", index, name, status);
    }

    let orphans = content.orphan_labels(bundle.labels());
    if !orphans.is_empty() {
        println!();
        println!("{}", "Content for labels the model cannot predict:".yellow());
        for label in orphans {
            println!("  - {}", label);
        }
    }
    Ok(())
}

fn cmd_locales(config: &AppConfig) -> Result<()> {
    let content = load_content(config)?;

    for (locale, records) in content.coverage() {
        let marker = if locale == config.locale.default {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            " {} {}  {:<10} {} disease records",
            marker,
            locale.code().bold(),
            locale.native_name(),
            records
        );
    }
    Ok(())
}

fn cmd_init_bundle(
    output: &Path,
    name: &str,
    labels: Option<&Path>,
    seed: u64,
    base_filters: usize,
) -> Result<()> {
    let labels = match labels {
        Some(path) => LabelCatalog::from_file(path)?,
        None => LabelCatalog::builtin()?,
    };

    info!("Backend: {}", backend_name());
    let config = PlantClassifierConfig::new().with_base_filters(base_filters);
    let bundle = create_untrained::<DefaultBackend>(
        output,
        name,
        &labels,
        config,
        seed,
        &default_device(),
    )?;

    println!(
        "{} Wrote untrained bundle '{}' ({} classes) to {}",
        "✔".green(),
        bundle.manifest().name,
        bundle.labels().len(),
        bundle.dir().display()
    );
    println!(
        "{}",
        "  Weights are random; predictions are meaningless until trained weights replace model.mpk."
            .yellow()
    );
    Ok(())
}

fn cmd_serve(config: &AppConfig) -> Result<()> {
    // Load eagerly so a broken bundle never starts accepting requests
    let diagnoser = Diagnoser::from_config(config).context("failed to load the model")?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(plantdoc::server::run(config, diagnoser))?;
    Ok(())
}
