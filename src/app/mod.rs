//! Evolution run loop: evaluate, report, evolve, repeat.

pub mod shutdown;

pub use shutdown::{Command, ShutdownManager};

use crate::evolution::{Brain, Population, CONTROL_OUTPUTS};
use crate::model::{AppConfig, Evaluator, GenerationReport, GenerationSignals, TerminationReason, TrackSurface};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Command-line level settings that are not part of the simulation config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// JSON Lines file receiving one [`GenerationReport`] per generation.
    pub report_path: Option<PathBuf>,
}

/// What a finished run achieved.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub generations: u64,
    pub best_fitness: Option<f64>,
    /// Fastest lap over the whole run, in seconds.
    pub best_lap_seconds: Option<f64>,
    pub quit: bool,
}

pub struct App {
    evaluator: Evaluator,
    population: Population,
    generations: usize,
    report: Option<BufWriter<File>>,
    champion: Option<(Brain, f64)>,
    best_lap_seconds: Option<f64>,
}

impl App {
    pub fn new(config: AppConfig, track: TrackSurface, options: RunOptions) -> Result<Self> {
        let population = Population::new(&config.evolution, config.radar.angles.len(), CONTROL_OUTPUTS);
        let generations = config.evolution.generations;
        let evaluator = Evaluator::new(config, track).context("Failed to set up evaluator")?;

        let report = match options.report_path {
            Some(path) => {
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create report file {}", path.display()))?;
                Some(BufWriter::new(file))
            }
            None => None,
        };

        Ok(Self {
            evaluator,
            population,
            generations,
            report,
            champion: None,
            best_lap_seconds: None,
        })
    }

    /// Handle for requesting quit or reset from another thread.
    #[must_use]
    pub fn signals(&self) -> GenerationSignals {
        self.evaluator.signals().clone()
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Best genome seen so far and its fitness.
    #[must_use]
    pub fn champion(&self) -> Option<(&Brain, f64)> {
        self.champion.as_ref().map(|(brain, score)| (brain, *score))
    }

    /// Evaluates the current population once, then breeds the next one
    /// unless the run is quitting.
    pub fn run_generation(&mut self) -> Result<GenerationReport> {
        let (brains, fitness) = self.population.evaluation_slots();
        let report = self.evaluator.evaluate(brains, fitness)?;

        if let Some(writer) = self.report.as_mut() {
            serde_json::to_writer(&mut *writer, &report).context("Failed to serialize report")?;
            writeln!(writer).context("Failed to write report")?;
        }

        if let Some((brain, score)) = self.population.best() {
            if self.champion.as_ref().map_or(true, |(_, best)| score > *best) {
                self.champion = Some((brain.clone(), score));
            }
        }
        if let Some(best) = report.best_lap {
            if self.best_lap_seconds.map_or(true, |s| best.lap.seconds < s) {
                self.best_lap_seconds = Some(best.lap.seconds);
            }
        }

        // A generation that never ticked has no fitness to select on.
        if report.reason != TerminationReason::Quit && report.ticks > 0 {
            self.population.evolve();
        }
        Ok(report)
    }

    /// Runs up to the configured number of generations or until quit.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut quit = false;
        for _ in 0..self.generations {
            let report = self.run_generation()?;
            if report.reason == TerminationReason::Quit {
                quit = true;
                break;
            }
        }
        if let Some(writer) = self.report.as_mut() {
            writer.flush().context("Failed to flush report")?;
        }

        let summary = RunSummary {
            generations: self.evaluator.generations_run(),
            best_fitness: self.champion.as_ref().map(|(_, score)| *score),
            best_lap_seconds: self.best_lap_seconds,
            quit,
        };
        tracing::info!(
            generations = summary.generations,
            best_fitness = summary.best_fitness,
            best_lap_s = summary.best_lap_seconds,
            quit,
            "Run finished"
        );
        Ok(summary)
    }
}
