use beer_charts::core::ConfigProvider;
use beer_charts::utils::error::ErrorSeverity;
use beer_charts::utils::{logger, validation::Validate};
use beer_charts::{ChartEngine, ChartJob, ChartPipeline, LocalStorage, TomlConfig};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-charts")]
#[command(about = "Build every chart described in a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "charts.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Only build the chart with this name
    #[arg(long)]
    only: Option<String>,

    /// Show what would be fetched and written without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based chart builder");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mut jobs = config.jobs();
    if let Some(only) = &args.only {
        jobs.retain(|job| job.chart_name() == only);
        if jobs.is_empty() {
            eprintln!("❌ No enabled chart named '{}' in {}", only, args.config);
            std::process::exit(1);
        }
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &jobs, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No requests will be made");
        perform_dry_run(&jobs);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let mut worst: Option<ErrorSeverity> = None;
    let total = jobs.len();

    for job in jobs {
        let name = job.chart_name().to_string();
        tracing::info!("📊 Building chart '{}' ({})", name, job.chart_kind());

        let storage = LocalStorage::new(job.output_path().to_string());
        let result = match ChartPipeline::new(storage, job) {
            Ok(pipeline) => {
                ChartEngine::new_with_monitoring(pipeline, monitor_enabled)
                    .run()
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(output_path) => {
                println!("✅ {} -> {}", name, output_path);
            }
            Err(e) => {
                tracing::error!(
                    "❌ Chart '{}' failed: {} (Category: {:?}, Severity: {:?})",
                    name,
                    e,
                    e.category(),
                    e.severity()
                );
                eprintln!("❌ {}: {}", name, e.user_friendly_message());
                eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
                worst = worst.max(Some(e.severity()));
            }
        }
    }

    match worst {
        Some(severity) => {
            tracing::warn!("⚠️ Finished {} charts with failures", total);
            let exit_code = severity.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
        None => tracing::info!("✅ All {} charts built successfully", total),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, jobs: &[ChartJob], args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Project: {} {}",
        config.project.name,
        config.project.version.as_deref().unwrap_or("")
    );
    if let Some(description) = &config.project.description {
        println!("  Description: {}", description);
    }
    println!("  API Base: {}", config.base_url());
    println!("  Output: {}", config.output_path());
    println!("  Charts: {}", jobs.len());
    println!("  Compression: {}", config.compression_enabled());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(jobs: &[ChartJob]) {
    println!("🔍 Dry Run Analysis:");

    for job in jobs {
        println!();
        println!("📊 {} ({})", job.chart_name(), job.chart_kind());

        let pipeline = match ChartPipeline::new(LocalStorage::new(job.output_path()), job.clone())
        {
            Ok(pipeline) => pipeline,
            Err(e) => {
                println!("  ❌ {}", e);
                continue;
            }
        };

        match pipeline.endpoint() {
            Ok(Some(url)) => println!("  Endpoint: {}", url),
            Ok(None) => println!("  Endpoint: none (static data)"),
            Err(e) => println!("  Endpoint: ❌ {}", e),
        }

        let limit = job
            .series_limit()
            .or_else(|| job.chart_kind().default_limit());
        match limit {
            Some(limit) => println!(
                "  Limit: {} points ({:?} when fewer records)",
                limit,
                job.bounds_policy()
            ),
            None => println!("  Limit: all records"),
        }

        let options = job.fetch_options();
        println!(
            "  Timeout: {:?}, Retries: {}, Headers: {}",
            options.timeout,
            options.retry_attempts,
            options.headers.len()
        );

        let extensions: Vec<&str> = job.output_formats().iter().map(|f| f.extension()).collect();
        if job.compress() {
            println!(
                "  Output: {}.zip ({} + manifest.json)",
                job.chart_name(),
                extensions.join(", ")
            );
        } else {
            println!("  Output: {}.{{{}}}", job.chart_name(), extensions.join(","));
        }
    }

    println!();
    println!("✅ Dry run analysis complete.");
}
