use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt2md::cli::{Cli, Commands};
use yt2md::config::Config;
use yt2md::pipeline::{MarkdownPipeline, PipelineOptions, Status};
use yt2md::{model, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "yt2md=debug"
    } else {
        "yt2md=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Fetch {
            url,
            output_dir,
            prefix,
            audio_dir,
            languages,
            jobs,
            keep_audio,
            no_audio_fallback,
            model,
        } => {
            // Check for required external dependencies (non-fatal; the
            // transcript path works without them)
            let missing_deps = utils::check_dependencies().await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            // Command-line flags override the config file
            let mut config = config;
            if let Some(dir) = output_dir {
                config.app.output_dir = dir;
            }
            if let Some(prefix) = prefix {
                config.app.file_prefix = prefix;
            }
            if let Some(dir) = audio_dir {
                config.app.audio_dir = Some(dir);
            }
            if !languages.is_empty() {
                config.transcript.languages = languages;
            }
            if let Some(jobs) = jobs {
                config.app.max_concurrent_jobs = jobs.max(1);
            }
            if keep_audio {
                config.app.keep_audio = true;
            }

            let pipeline = MarkdownPipeline::new(
                config,
                PipelineOptions {
                    no_audio_fallback,
                    model_override: model,
                    quiet: cli.quiet,
                },
            )?;

            tracing::info!("Starting transcript fetch for URL: {}", url);
            let started = std::time::Instant::now();

            let outcomes = pipeline.run(&url).await?;

            let mut written = 0usize;
            let mut empty = 0usize;
            let mut failed = 0usize;

            for outcome in &outcomes {
                match &outcome.status {
                    Status::Written { path, source } => {
                        written += 1;
                        println!("{} -> {} ({})", outcome.entry.title, path.display(), source);
                    }
                    Status::Empty { path } => {
                        empty += 1;
                        println!("{} -> {} (no content)", outcome.entry.title, path.display());
                    }
                    Status::Failed { reason } => {
                        failed += 1;
                        eprintln!("{}: FAILED - {}", outcome.entry.title, reason);
                    }
                }
            }

            println!(
                "Processed {} video(s) in {} ({} written, {} empty, {} failed)",
                outcomes.len(),
                utils::format_duration(started.elapsed().as_secs_f64()),
                written,
                empty,
                failed
            );

            if failed == outcomes.len() {
                anyhow::bail!("all {} video(s) failed", outcomes.len());
            }
        }
        Commands::Model { download, list } => {
            if let Some(name) = &download {
                let path = model::download_model(name, cli.quiet).await?;
                println!("Model saved to: {}", path.display());
            }
            // Listing is the default when no flag is given
            if list || download.is_none() {
                model::list_models()?;
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}
