use anyhow::{Context, Result};
use clap::Parser;
use neuroracer_lib::app::{App, RunOptions, ShutdownManager};
use neuroracer_lib::model::metrics::init_logging;
use neuroracer_lib::model::{AppConfig, TrackSurface};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Evolve neural race-car drivers", long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Track image; pixels in the boundary colour are walls
    #[arg(short, long)]
    track: PathBuf,

    /// Number of generations to run (overrides the config)
    #[arg(short, long)]
    generations: Option<usize>,

    /// RNG seed for the population (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Write one JSON report per generation to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Evaluate vehicles on a single thread
    #[arg(long)]
    sequential: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(generations) = self.generations {
            config.evolution.generations = generations;
        }
        if let Some(seed) = self.seed {
            config.evolution.seed = Some(seed);
        }
        if self.sequential {
            config.generation.parallel = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let track = TrackSurface::load(&args.track, config.track.boundary_color)
        .with_context(|| format!("Cannot start without a track ({})", args.track.display()))?;

    let mut app = App::new(
        config,
        track,
        RunOptions {
            report_path: args.report.clone(),
        },
    )?;

    let shutdown = ShutdownManager::new(app.signals());
    let _ctrl_c = shutdown.spawn_ctrl_c();
    shutdown.spawn_stdin_watcher()?;
    println!("Running. Type `q` + Enter to quit, `r` + Enter to end the current generation.");

    let summary = tokio::task::spawn_blocking(move || app.run())
        .await
        .context("Evolution task panicked")??;

    match summary.best_fitness {
        Some(fitness) => println!(
            "Finished {} generations. Best fitness {:.2}{}.",
            summary.generations,
            fitness,
            summary
                .best_lap_seconds
                .map(|s| format!(", best lap {s:.2}s"))
                .unwrap_or_default()
        ),
        None => println!("Finished without evaluating any generation."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_is_required() {
        assert!(Args::try_parse_from(["neuroracer"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "neuroracer",
            "--track",
            "maps/oval.png",
            "-g",
            "7",
            "--seed",
            "42",
            "--sequential",
        ]);
        assert_eq!(args.config, PathBuf::from("config.toml"));
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.evolution.generations, 7);
        assert_eq!(config.evolution.seed, Some(42));
        assert!(!config.generation.parallel);
    }
}
