use clap::Parser;
use neuroracer_lib::model::{GenerationReport, KillReason, TerminationReason};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarize a generation report file", long_about = None)]
struct Args {
    /// JSON Lines file written by `neuroracer --report`
    #[arg(short, long, default_value = "logs/generations.jsonl")]
    input: String,

    /// Optional markdown output
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
struct Analysis {
    generations: usize,
    best_fitness: Option<(u64, f64)>,
    best_lap: Option<(u64, f64)>,
    total_laps: usize,
    kills: BTreeMap<String, usize>,
    reasons: BTreeMap<String, usize>,
}

fn analyze(reports: &[GenerationReport]) -> Analysis {
    let mut analysis = Analysis {
        generations: reports.len(),
        ..Default::default()
    };
    for report in reports {
        if let Some(best) = report.best_fitness() {
            if analysis.best_fitness.map_or(true, |(_, b)| best > b) {
                analysis.best_fitness = Some((report.generation, best));
            }
        }
        if let Some(lap) = report.best_lap {
            if analysis.best_lap.map_or(true, |(_, s)| lap.lap.seconds < s) {
                analysis.best_lap = Some((report.generation, lap.lap.seconds));
            }
        }
        analysis.total_laps += report.vehicles.iter().map(|v| v.laps_completed).sum::<usize>();
        for reason in report.kills() {
            *analysis.kills.entry(kill_name(reason).to_string()).or_default() += 1;
        }
        *analysis.reasons.entry(report.reason.to_string()).or_default() += 1;
    }
    analysis
}

fn kill_name(reason: KillReason) -> &'static str {
    match reason {
        KillReason::Collision => "collision",
        KillReason::Stuck => "stuck",
        KillReason::Stalled => "stalled",
        KillReason::Spinning => "spinning",
        KillReason::NonFinite => "non-finite",
    }
}

fn render(analysis: &Analysis) -> String {
    let mut out = String::from("# Neuroracer Run Report\n\n");
    out.push_str(&format!("- Generations: {}\n", analysis.generations));
    if let Some((generation, fitness)) = analysis.best_fitness {
        out.push_str(&format!("- Best fitness: {fitness:.2} (generation {generation})\n"));
    }
    match analysis.best_lap {
        Some((generation, seconds)) => {
            out.push_str(&format!("- Best lap: {seconds:.2}s (generation {generation})\n"));
        }
        None => out.push_str("- Best lap: none\n"),
    }
    out.push_str(&format!("- Laps completed: {}\n", analysis.total_laps));
    out.push_str("\n## Kills\n\n");
    for (name, count) in &analysis.kills {
        out.push_str(&format!("- {name}: {count}\n"));
    }
    out.push_str("\n## Generation endings\n\n");
    for (name, count) in &analysis.reasons {
        out.push_str(&format!("- {name}: {count}\n"));
    }
    out
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let file = File::open(&args.input)?;
    let mut reports = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<GenerationReport>(&line) {
            Ok(report) => reports.push(report),
            Err(e) => eprintln!("Skipping malformed line: {e}"),
        }
    }

    let analysis = analyze(&reports);
    let text = render(&analysis);
    print!("{text}");
    if let Some(path) = args.output {
        std::fs::write(&path, &text)?;
        println!("\nReport written to {path}");
    }
    if analysis.reasons.contains_key(&TerminationReason::Quit.to_string()) {
        println!("Note: the run was stopped early.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroracer_lib::model::generation::BestLap;
    use neuroracer_lib::model::{LapRecord, Position, VehicleState, VehicleSummary};

    fn report(generation: u64, fitness: Vec<f64>, lap_seconds: Option<f64>) -> GenerationReport {
        let mut crashed = VehicleState::new(Position::default(), 0.0, 10.0);
        crashed.kill(KillReason::Collision, 40);
        let vehicles = fitness
            .iter()
            .enumerate()
            .map(|(i, f)| VehicleSummary::from_state(i, &crashed, *f))
            .collect();
        GenerationReport {
            generation,
            reason: TerminationReason::AllInactive,
            ticks: 40,
            elapsed_ms: 1,
            leaderboard: (0..fitness.len()).collect(),
            fitness,
            vehicles,
            best_lap: lap_seconds.map(|seconds| BestLap {
                vehicle: 0,
                lap: LapRecord {
                    ticks: (seconds * 60.0) as u64,
                    seconds,
                    completed_at: 0,
                },
            }),
        }
    }

    #[test]
    fn test_analyze_picks_bests() {
        let reports = vec![
            report(0, vec![1.0, 3.0], None),
            report(1, vec![8.0, 2.0], Some(12.0)),
            report(2, vec![5.0], Some(9.5)),
        ];
        let analysis = analyze(&reports);
        assert_eq!(analysis.generations, 3);
        assert_eq!(analysis.best_fitness, Some((1, 8.0)));
        assert_eq!(analysis.best_lap, Some((2, 9.5)));
        assert_eq!(analysis.kills.get("collision"), Some(&5));
        assert_eq!(analysis.reasons.get("all inactive"), Some(&3));
    }

    #[test]
    fn test_render_mentions_missing_lap() {
        let text = render(&analyze(&[report(0, vec![1.0], None)]));
        assert!(text.contains("Best lap: none"));
    }

    #[test]
    fn test_args_default_input() {
        let args = Args::parse_from(["analyze"]);
        assert_eq!(args.input, "logs/generations.jsonl");
        assert!(args.output.is_none());
    }
}
