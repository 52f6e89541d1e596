use clap::{Args, Parser, Subcommand};

mod commands;
mod context;

use commands::{DetectArgs, ExportArgs, ScanArgs};
use context::Overrides;

#[derive(Parser)]
#[command(name = "kiosk-anomaly")]
#[command(about = "Flags anomalous purchase days per kiosk and product", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    /// Purchase log CSV (overrides data.path)
    #[arg(short, long, global = true)]
    data: Option<String>,

    /// Seasonal period in days (overrides analysis.period)
    #[arg(long, global = true)]
    period: Option<usize>,

    /// Standard deviations below mean residual (overrides analysis.threshold)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Use a centered trend window instead of a trailing one
    #[arg(long, global = true)]
    two_sided: bool,

    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print anomalous dates for one kiosk or product
    Detect(DetectArgs),
    /// Summarize every kiosk and product
    Scan(ScanArgs),
    /// Write one entity's decomposition and anomaly flags to CSV
    Export(ExportArgs),
    /// Prompt for kiosks and products until EOF or `quit`
    Interactive,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    match &cli.global.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let overrides = Overrides {
        data: cli.global.data,
        period: cli.global.period,
        threshold: cli.global.threshold,
        two_sided: cli.global.two_sided,
    };
    let config = context::load_config(&cli.global.config, &overrides)?;
    let pipeline = context::build_pipeline(&config)?;
    let threshold = config.analysis.threshold;

    match cli.command {
        Commands::Detect(args) => commands::run_detect(&pipeline, threshold, &args)?,
        Commands::Scan(args) => commands::run_scan(&pipeline, threshold, &args)?,
        Commands::Export(args) => commands::run_export(&pipeline, threshold, &args)?,
        Commands::Interactive => {
            let stdin = std::io::stdin();
            commands::run_interactive(&pipeline, threshold, stdin.lock(), std::io::stdout())?;
        }
    }

    Ok(())
}
