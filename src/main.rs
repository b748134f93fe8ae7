use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sessionlog_analytics::{pipeline, ReportGenerator};
use sessionlog_core::config::AnalyticsConfig;
use sessionlog_ingest::LineParser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "sessionlog",
    about = "Sessionization and engagement analytics for ELB access logs",
    version,
    author
)]
struct Cli {
    /// Path to config file (default: ~/.config/sessionlog/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a log file and print the engagement report
    Analyze {
        /// Access-log file to process
        log_file: PathBuf,

        /// Override the inactivity gap (minutes) that separates sessions
        #[arg(long)]
        gap_minutes: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Rows shown in the ranked report sections
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show one client's sessions
    Client {
        /// Access-log file to process
        log_file: PathBuf,

        /// Client IP to drill into
        client_ip: String,

        /// Override the inactivity gap (minutes) that separates sessions
        #[arg(long)]
        gap_minutes: Option<f64>,
    },

    /// Show or manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize default configuration file
    Init,
    /// Open config file path
    Path,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "sessionlog=info,warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load config.
    let mut config = match &cli.config {
        Some(path) => AnalyticsConfig::load_from(path)?,
        None => AnalyticsConfig::load()?,
    };

    match cli.command {
        Commands::Analyze {
            log_file,
            gap_minutes,
            format,
            top,
        } => {
            if let Some(gap) = gap_minutes {
                config.session.inactivity_gap_minutes = gap;
            }
            if let Some(top) = top {
                config.report.top_clients = top;
                config.report.top_urls = top;
            }

            let outcome = analyze(&log_file, &config)?;
            match format {
                OutputFormat::Text => {
                    print!("{}", ReportGenerator::text_summary(&outcome, &config.report));
                }
                OutputFormat::Markdown => {
                    print!(
                        "{}",
                        ReportGenerator::markdown_report(&outcome, &config.report)
                    );
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
            }
        }
        Commands::Client {
            log_file,
            client_ip,
            gap_minutes,
        } => {
            if let Some(gap) = gap_minutes {
                config.session.inactivity_gap_minutes = gap;
            }

            let outcome = analyze(&log_file, &config)?;
            print!("{}", ReportGenerator::client_report(&outcome, &client_ip));
        }
        Commands::Config { action } => {
            handle_config_command(action, &config)?;
        }
    }

    Ok(())
}

/// Parse the log file and run the full analytics pipeline over it.
fn analyze(
    log_file: &std::path::Path,
    config: &AnalyticsConfig,
) -> Result<sessionlog_analytics::AnalyticsOutcome> {
    let parser = LineParser::new();
    let parsed = parser.parse_file(log_file)?;

    tracing::info!(
        records = parsed.records.len(),
        skipped_lines = parsed.skipped.len(),
        "parsed {}",
        log_file.display()
    );

    let options = pipeline::PipelineOptions::from(config);
    Ok(pipeline::run(&parsed.records, &options))
}

fn handle_config_command(action: Option<ConfigAction>, config: &AnalyticsConfig) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let toml_str = toml::to_string_pretty(config)?;
            println!("{}", toml_str);
        }
        Some(ConfigAction::Init) => {
            let path = AnalyticsConfig::default_path();
            if path.exists() {
                println!("Config already exists at: {}", path.display());
            } else {
                config.save()?;
                println!("Created default config at: {}", path.display());
            }
        }
        Some(ConfigAction::Path) => {
            println!("{}", AnalyticsConfig::default_path().display());
        }
    }
    Ok(())
}
