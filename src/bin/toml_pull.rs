use chrono::Utc;
use clap::Parser;
use pull_orbits::core::pipeline::parse_bodies;
use pull_orbits::core::ConfigProvider;
use pull_orbits::domain::model::TimeWindow;
use pull_orbits::utils::{logger, validation::Validate};
use pull_orbits::{EtlEngine, HorizonsClient, LocalStorage, OrbitPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-pull")]
#[command(about = "Orbit puller with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "pull-orbits.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines instead of the compact format
    #[arg(long)]
    json_logs: bool,

    /// Dry run - show the queries that would be sent without contacting the service
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based orbit puller");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    let source = HorizonsClient::from_config(&config)?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No queries will be sent");
        perform_dry_run(&config, &source)?;
        return Ok(());
    }

    let storage = LocalStorage::new(".");
    let pipeline = OrbitPipeline::new(storage, config, source);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Orbit pull completed, output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Orbit pull failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Service: {}", config.api_endpoint());
    if let Some(timeout) = config.timeout() {
        println!("  Timeout: {}s", timeout.as_secs());
    }
    println!("  Center: {}", config.center());
    println!("  Reference plane: {}", config.ref_plane());
    println!("  Steps per revolution: {}", config.step_count());
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(
    config: &TomlConfig,
    source: &HorizonsClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = std::fs::read(config.input_path())?;
    let bodies = parse_bodies(&data)?;

    println!("🔍 Dry Run Analysis:");
    println!("  Bodies in input table: {}", bodies.len());
    println!();

    // 週期要等查到半長軸才知道，這裡用一年的視窗示意
    let start = Utc::now();
    let window = TimeWindow::for_period(start, 1.0, config.step_count())?;

    for body in &bodies {
        println!("📡 {} ({})", body.name, body.obj_id);
        let jd = pull_orbits::core::sampler::julian_date(start);
        for (key, value) in source.elements_query(&body.obj_id, jd) {
            println!("    elements {}={}", key, value);
        }
        for (key, value) in source.vectors_query(&body.obj_id, &window) {
            println!("    vectors  {}={}", key, value);
        }
    }

    println!();
    println!("  Requests would go to: {}", source.endpoint());
    println!("✅ Dry run analysis complete. STOP_TIME is shown for a one-year period.");

    Ok(())
}
