//! Evaluation loop for one batch of controllers.
//!
//! A [`Generation`] owns one [`VehicleState`] per controller and advances
//! all of them tick by tick against a shared read-only [`TrackSurface`].
//! Each tick runs in two phases:
//!
//! 1. **Advance** (parallel when enabled): every live vehicle senses, asks its
//!    controller for outputs, steps its dynamics and lap timer, and writes the
//!    resulting reward into its own slot.
//! 2. **Apply** (sequential, index order): rewards are added to the fitness
//!    accumulators and completed laps are offered to the generation context.
//!
//! Termination predicates and external quit/reset requests are only checked
//! at tick boundaries, so no vehicle ever sees another one mid-update.

use crate::config::AppConfig;
use crate::controller::{drive, Controller, FitnessAccumulator};
use crate::error::{Result, SimError};
use crate::fitness::{finite_or_zero, FitnessPolicy};
use crate::lap::LapTimer;
use crate::metrics::Metrics;
use crate::radar;
use crate::track::TrackSurface;
use crate::vehicle;
use neuroracer_data::{
    ControlTargets, KillReason, LapRecord, VehicleState, VehicleSummary,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Quit and reset requests shared with an outside watcher.
///
/// Clones share the same flags. Both requests are idempotent; the quit flag
/// stays set once raised, the reset flag is consumed by the first generation
/// that observes it.
#[derive(Debug, Clone, Default)]
pub struct GenerationSignals {
    quit: Arc<AtomicBool>,
    reset: Arc<AtomicBool>,
}

impl GenerationSignals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_quit(&self) {
        if !self.quit.swap(true, Ordering::SeqCst) {
            tracing::info!("Quit requested");
        }
    }

    pub fn request_reset(&self) {
        if !self.reset.swap(true, Ordering::SeqCst) {
            tracing::info!("Generation reset requested");
        }
    }

    #[must_use]
    pub fn is_quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_reset_pending(&self) -> bool {
        self.reset.load(Ordering::SeqCst)
    }

    /// Returns and clears a pending reset request.
    pub fn take_reset(&self) -> bool {
        self.reset.swap(false, Ordering::SeqCst)
    }
}

/// Why a generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    TickBudget,
    WallClock,
    AllInactive,
    Quit,
    Reset,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationReason::TickBudget => "tick budget",
            TerminationReason::WallClock => "wall clock",
            TerminationReason::AllInactive => "all inactive",
            TerminationReason::Quit => "quit",
            TerminationReason::Reset => "reset",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationPhase {
    Initializing,
    Running,
    Terminated(TerminationReason),
}

/// Fastest lap of the generation and who drove it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestLap {
    pub vehicle: usize,
    pub lap: LapRecord,
}

/// State scoped to one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationContext {
    best_lap: Option<BestLap>,
}

impl GenerationContext {
    /// Records `lap` if it beats the current best. Returns `true` on improvement.
    pub fn offer_lap(&mut self, vehicle: usize, lap: LapRecord) -> bool {
        let improved = self.best_lap.map_or(true, |best| lap.ticks < best.lap.ticks);
        if improved {
            self.best_lap = Some(BestLap { vehicle, lap });
        }
        improved
    }

    #[must_use]
    pub fn best_lap(&self) -> Option<BestLap> {
        self.best_lap
    }
}

/// Outcome of one generation, suitable for logging or writing as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: u64,
    pub reason: TerminationReason,
    pub ticks: u64,
    pub elapsed_ms: u64,
    /// Final fitness per controller, in population order.
    pub fitness: Vec<f64>,
    pub vehicles: Vec<VehicleSummary>,
    pub best_lap: Option<BestLap>,
    /// Vehicle indices by distance travelled, farthest first; ties keep index order.
    pub leaderboard: Vec<usize>,
}

impl GenerationReport {
    #[must_use]
    pub fn best_fitness(&self) -> Option<f64> {
        self.fitness.iter().copied().reduce(f64::max)
    }

    #[must_use]
    pub fn mean_fitness(&self) -> f64 {
        if self.fitness.is_empty() {
            return 0.0;
        }
        self.fitness.iter().sum::<f64>() / self.fitness.len() as f64
    }

    #[must_use]
    pub fn survivors(&self) -> usize {
        self.vehicles.iter().filter(|v| v.alive).count()
    }

    pub fn kills(&self) -> impl Iterator<Item = KillReason> + '_ {
        self.vehicles.iter().filter_map(|v| v.killed_by)
    }
}

/// Orders vehicle indices by distance travelled, descending, ties by index.
#[must_use]
pub fn leaderboard(vehicles: &[VehicleSummary]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..vehicles.len()).collect();
    order.sort_by(|&a, &b| {
        vehicles[b]
            .distance_travelled
            .total_cmp(&vehicles[a].distance_travelled)
            .then(a.cmp(&b))
    });
    order
}

#[derive(Debug, Clone)]
struct VehicleRun {
    state: VehicleState,
    inputs: Vec<f64>,
    reward: f64,
    lap: Option<LapRecord>,
    killed: Option<KillReason>,
}

/// Read-only view handed to every vehicle during the advance phase.
struct TickContext<'a> {
    track: &'a TrackSurface,
    config: &'a AppConfig,
    policy: &'a FitnessPolicy,
    timer: &'a LapTimer,
    tick: u64,
}

impl TickContext<'_> {
    fn advance<C: Controller + ?Sized>(&self, run: &mut VehicleRun, controller: &mut C) {
        run.reward = 0.0;
        run.lap = None;
        run.killed = None;
        if !run.state.alive {
            return;
        }

        let timing = &self.config.generation;
        let targets = if self.tick <= timing.launch_ticks {
            ControlTargets::launch()
        } else {
            let reading = radar::scan(
                self.track,
                &run.state.position,
                run.state.heading,
                &self.config.radar,
            );
            reading.write_inputs(&mut run.inputs);
            drive(controller, &run.inputs, timing.output_range, timing.steer_dead_zone)
        };

        let outcome = vehicle::step(
            &mut run.state,
            targets,
            self.track,
            &self.config.vehicle,
            &self.config.kill_rules,
            self.tick,
        );

        let mut reward = self.policy.tick_reward(&run.state);
        if run.state.alive {
            if let Some(lap) = self.timer.update(&mut run.state.lap, &run.state.position, self.tick) {
                reward += self.policy.lap_bonus(&lap);
                run.lap = Some(lap);
            }
        }
        if let Some(reason) = outcome.killed {
            reward += self.policy.kill_penalty(reason);
            run.killed = Some(reason);
        }
        run.reward = finite_or_zero(reward);
    }
}

#[cfg(feature = "parallel")]
fn advance_all<C: Controller + Send>(ctx: &TickContext<'_>, runs: &mut [VehicleRun], controllers: &mut [C]) {
    if ctx.config.generation.parallel {
        runs.par_iter_mut()
            .zip(controllers.par_iter_mut())
            .for_each(|(run, controller)| ctx.advance(run, controller));
    } else {
        advance_sequential(ctx, runs, controllers);
    }
}

#[cfg(not(feature = "parallel"))]
fn advance_all<C: Controller + Send>(ctx: &TickContext<'_>, runs: &mut [VehicleRun], controllers: &mut [C]) {
    advance_sequential(ctx, runs, controllers);
}

fn advance_sequential<C: Controller>(ctx: &TickContext<'_>, runs: &mut [VehicleRun], controllers: &mut [C]) {
    for (run, controller) in runs.iter_mut().zip(controllers.iter_mut()) {
        ctx.advance(run, controller);
    }
}

/// One generation, driven tick by tick.
///
/// [`Evaluator::evaluate`] is the usual entry point; driving a generation by
/// hand is useful when something needs to look at vehicle states between
/// ticks.
pub struct Generation<'e> {
    index: u64,
    config: &'e AppConfig,
    track: &'e TrackSurface,
    signals: &'e GenerationSignals,
    policy: FitnessPolicy,
    timer: LapTimer,
    runs: Vec<VehicleRun>,
    context: GenerationContext,
    phase: GenerationPhase,
    tick: u64,
    started: Instant,
}

impl<'e> Generation<'e> {
    /// Spawns `population` vehicles at the track's start pose.
    #[must_use]
    pub fn new(
        index: u64,
        config: &'e AppConfig,
        track: &'e TrackSurface,
        signals: &'e GenerationSignals,
        population: usize,
    ) -> Self {
        let pose = track.start_pose(&config.track);
        let timer = LapTimer::new(
            pose.position,
            pose.lap_radius,
            config.track.min_lap_ticks,
            config.generation.tick_rate,
        );
        let inputs = config.radar.angles.len();
        let runs = (0..population)
            .map(|_| VehicleRun {
                state: vehicle::spawn(pose.position, pose.heading, &config.vehicle),
                inputs: Vec::with_capacity(inputs),
                reward: 0.0,
                lap: None,
                killed: None,
            })
            .collect();

        Self {
            index,
            config,
            track,
            signals,
            policy: FitnessPolicy::new(config.fitness.clone()),
            timer,
            runs,
            context: GenerationContext::default(),
            phase: GenerationPhase::Initializing,
            tick: 0,
            started: Instant::now(),
        }
    }

    fn check_population(&self, accumulators: usize) -> Result<()> {
        if accumulators != self.runs.len() {
            return Err(SimError::PopulationMismatch {
                controllers: self.runs.len(),
                accumulators,
            });
        }
        Ok(())
    }

    /// Zeroes every fitness accumulator and moves to `Running`.
    pub fn start<F: FitnessAccumulator>(&mut self, fitness: &mut [F]) -> Result<()> {
        self.check_population(fitness.len())?;
        for slot in fitness.iter_mut() {
            slot.reset();
        }
        if self.signals.take_reset() {
            // Raised after the previous generation had already ended.
            tracing::debug!(generation = self.index, "Discarding stale reset request");
        }
        self.context = GenerationContext::default();
        self.started = Instant::now();
        self.phase = GenerationPhase::Running;
        tracing::debug!(
            generation = self.index,
            population = self.runs.len(),
            "Generation started"
        );
        Ok(())
    }

    fn termination(&self) -> Option<TerminationReason> {
        if self.signals.is_quit_requested() {
            return Some(TerminationReason::Quit);
        }
        if self.signals.take_reset() {
            return Some(TerminationReason::Reset);
        }
        if self.runs.iter().all(|r| !r.state.alive) {
            return Some(TerminationReason::AllInactive);
        }
        if self.tick >= self.config.generation.tick_budget {
            return Some(TerminationReason::TickBudget);
        }
        if let Some(ms) = self.config.generation.wall_clock_budget_ms {
            if self.started.elapsed() >= Duration::from_millis(ms) {
                return Some(TerminationReason::WallClock);
            }
        }
        None
    }

    fn terminate(&mut self, reason: TerminationReason) {
        self.phase = GenerationPhase::Terminated(reason);
        tracing::debug!(
            generation = self.index,
            tick = self.tick,
            reason = %reason,
            "Generation terminated"
        );
    }

    /// Runs one tick, or terminates if a predicate holds at this boundary.
    ///
    /// Calling `tick` on a terminated generation is a no-op.
    pub fn tick<C, F>(&mut self, controllers: &mut [C], fitness: &mut [F]) -> Result<GenerationPhase>
    where
        C: Controller + Send,
        F: FitnessAccumulator,
    {
        match self.phase {
            GenerationPhase::Initializing => {
                return Err(SimError::config("generation ticked before start"));
            }
            GenerationPhase::Terminated(_) => return Ok(self.phase),
            GenerationPhase::Running => {}
        }
        if controllers.len() != self.runs.len() {
            return Err(SimError::PopulationMismatch {
                controllers: controllers.len(),
                accumulators: self.runs.len(),
            });
        }
        self.check_population(fitness.len())?;

        if let Some(reason) = self.termination() {
            self.terminate(reason);
            return Ok(self.phase);
        }

        self.tick += 1;
        let ctx = TickContext {
            track: self.track,
            config: self.config,
            policy: &self.policy,
            timer: &self.timer,
            tick: self.tick,
        };
        advance_all(&ctx, &mut self.runs, controllers);

        for (index, (run, slot)) in self.runs.iter().zip(fitness.iter_mut()).enumerate() {
            slot.add(run.reward);
            if let Some(lap) = run.lap {
                if self.context.offer_lap(index, lap) {
                    tracing::debug!(vehicle = index, ticks = lap.ticks, seconds = lap.seconds, "New best lap");
                }
            }
            if let Some(reason) = run.killed {
                tracing::debug!(vehicle = index, tick = self.tick, reason = ?reason, "Vehicle killed");
            }
        }

        Ok(self.phase)
    }

    #[must_use]
    pub fn phase(&self) -> GenerationPhase {
        self.phase
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    /// Vehicle states as of the last tick boundary.
    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleState> + '_ {
        self.runs.iter().map(|r| &r.state)
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.runs.iter().filter(|r| r.state.alive).count()
    }

    /// Builds the report. A generation that is still running counts as quit.
    pub fn finish<F: FitnessAccumulator>(mut self, fitness: &[F]) -> GenerationReport {
        let reason = match self.phase {
            GenerationPhase::Terminated(reason) => reason,
            _ => {
                self.terminate(TerminationReason::Quit);
                TerminationReason::Quit
            }
        };
        let scores: Vec<f64> = fitness.iter().map(|f| f.get()).collect();
        let vehicles: Vec<VehicleSummary> = self
            .runs
            .iter()
            .enumerate()
            .map(|(i, run)| VehicleSummary::from_state(i, &run.state, scores.get(i).copied().unwrap_or(0.0)))
            .collect();
        let leaderboard = leaderboard(&vehicles);
        GenerationReport {
            generation: self.index,
            reason,
            ticks: self.tick,
            elapsed_ms: u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX),
            fitness: scores,
            vehicles,
            best_lap: self.context.best_lap(),
            leaderboard,
        }
    }
}

/// Runs whole generations against one track.
pub struct Evaluator {
    config: AppConfig,
    track: Arc<TrackSurface>,
    signals: GenerationSignals,
    metrics: Arc<Metrics>,
    generations: u64,
}

impl Evaluator {
    /// Validates the configuration and prepares an evaluator for `track`.
    pub fn new(config: AppConfig, track: TrackSurface) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SimError::config(format!("{e:#}")))?;
        tracing::info!(
            fingerprint = %config.fingerprint(),
            width = track.width(),
            height = track.height(),
            "Evaluator ready"
        );
        Ok(Self {
            config,
            track: Arc::new(track),
            signals: GenerationSignals::new(),
            metrics: Arc::new(Metrics::new()),
            generations: 0,
        })
    }

    /// Replaces the shared signal pair, e.g. with one already handed to a watcher.
    #[must_use]
    pub fn with_signals(mut self, signals: GenerationSignals) -> Self {
        self.signals = signals;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn track(&self) -> Arc<TrackSurface> {
        Arc::clone(&self.track)
    }

    /// Swaps the map. Spawn positions are re-derived at the next generation.
    pub fn set_track(&mut self, track: TrackSurface) {
        tracing::info!(width = track.width(), height = track.height(), "Track swapped");
        self.track = Arc::new(track);
    }

    #[must_use]
    pub fn signals(&self) -> &GenerationSignals {
        &self.signals
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    #[must_use]
    pub fn generations_run(&self) -> u64 {
        self.generations
    }

    /// Evaluates one batch: `controllers[i]` drives vehicle `i` and its
    /// reward goes to `fitness[i]`, which is zeroed first.
    pub fn evaluate<C, F>(&mut self, controllers: &mut [C], fitness: &mut [F]) -> Result<GenerationReport>
    where
        C: Controller + Send,
        F: FitnessAccumulator,
    {
        if controllers.len() != fitness.len() {
            return Err(SimError::PopulationMismatch {
                controllers: controllers.len(),
                accumulators: fitness.len(),
            });
        }

        let report = {
            let mut generation = Generation::new(
                self.generations,
                &self.config,
                &self.track,
                &self.signals,
                controllers.len(),
            );
            generation.start(fitness)?;
            while let GenerationPhase::Running = generation.tick(controllers, fitness)? {}
            generation.finish(fitness)
        };

        self.generations += 1;
        self.metrics.record_generation(&report);
        Ok(report)
    }
}
