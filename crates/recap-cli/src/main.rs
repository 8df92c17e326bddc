//! `recap` — year-in-review video generator.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use recap_media::check_ffmpeg;
use recap_pipeline::{
    add_soundtrack, regenerate_months, run_assign, run_full, run_render, Checkpoint, RecapConfig,
};

#[derive(Parser)]
#[command(
    name = "recap",
    about = "Build a year-in-review video from a folder of photos and videos",
    version
)]
struct Cli {
    /// Folder with the source photos and videos
    #[arg(long, global = true, env = "RECAP_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Working folder for state, clips and output videos
    #[arg(long, global = true, env = "RECAP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Target calendar year
    #[arg(long, global = true, env = "RECAP_YEAR")]
    year: Option<i32>,

    /// Log format: text or json
    #[arg(long, global = true, env = "LOG_FORMAT", default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full pipeline: scan, assign, render, final video
    Run,
    /// Scan and assignment only, with coverage reports
    Assign,
    /// Render only (requires an existing assignment store)
    Render,
    /// Re-render specific months and the final video
    Regenerate {
        /// Month numbers to regenerate (1-12)
        #[arg(required = true)]
        months: Vec<u32>,
        /// Skip picking up files not yet in the assignment store
        #[arg(long)]
        no_rescan: bool,
    },
    /// Mux a per-month soundtrack onto the final video
    AddAudio,
}

fn init_tracing(log_format: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recap=info,warn"));

    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_format);

    let mut config = RecapConfig::from_env().with_dirs(
        cli.input_dir.as_deref(),
        cli.output_dir.as_deref(),
    );
    if let Some(year) = cli.year {
        config.target_year = year;
    }

    check_ffmpeg().context("ffmpeg is required on PATH")?;

    let mut checkpoint = Checkpoint::load(config.checkpoint_path());

    // On Ctrl-C the checkpoint already reflects every completed month, so a
    // plain exit is enough for the next run to resume.
    tokio::spawn(async {
        tokio::signal::ctrl_c().await.ok();
        info!("Interrupted; run again to resume from the last completed month");
        std::process::exit(130);
    });

    let result = match cli.command {
        Command::Run => run_full(&config, &mut checkpoint).await.map(Some),
        Command::Assign => run_assign(&config, &mut checkpoint).await.map(|_| None),
        Command::Render => run_render(&config, &mut checkpoint).await.map(Some),
        Command::Regenerate { months, no_rescan } => {
            regenerate_months(&config, &mut checkpoint, &months, !no_rescan)
                .await
                .map(Some)
        }
        Command::AddAudio => add_soundtrack(&config).await.map(Some),
    };

    match result {
        Ok(Some(path)) => {
            info!("Done: {}", path.display());
        }
        Ok(None) => {
            info!("Done");
        }
        Err(e) => {
            // Best-effort flush so the next run resumes at the last boundary
            checkpoint.save();
            error!("{}", e);
            return Err(e.into());
        }
    }
    Ok(())
}
