mod common;

use common::{ring_track, run_generation, ConfigBuilder, ScriptedDriver};
use image::{Rgba, RgbaImage};
use neuroracer_lib::app::{App, RunOptions};
use neuroracer_lib::model::{AppConfig, TrackSurface};

fn mixed_field() -> Vec<ScriptedDriver> {
    vec![
        ScriptedDriver::Centering { gain: 3.0 },
        ScriptedDriver::Idler { gain: 3.0 },
        ScriptedDriver::Braker,
        ScriptedDriver::Centering { gain: 1.5 },
        ScriptedDriver::FullThrottle,
    ]
}

#[test]
fn test_repeat_runs_are_identical() {
    let config = ConfigBuilder::ring().build();
    let a = run_generation(config.clone(), ring_track(), &mut mixed_field());
    let b = run_generation(config, ring_track(), &mut mixed_field());

    assert_eq!(a.fitness, b.fitness);
    assert_eq!(a.vehicles, b.vehicles);
    assert_eq!(a.best_lap, b.best_lap);
    assert_eq!(a.ticks, b.ticks);
}

#[test]
fn test_parallel_matches_sequential() {
    let parallel = run_generation(ConfigBuilder::ring().build(), ring_track(), &mut mixed_field());
    let sequential = run_generation(
        ConfigBuilder::ring().sequential().build(),
        ring_track(),
        &mut mixed_field(),
    );

    assert_eq!(parallel.fitness, sequential.fitness);
    assert_eq!(parallel.vehicles, sequential.vehicles);
    assert_eq!(parallel.leaderboard, sequential.leaderboard);
}

fn seeded_config() -> AppConfig {
    ConfigBuilder::ring()
        .ticks(300)
        .with_config(|c| {
            c.evolution.population_size = 6;
            c.evolution.generations = 2;
            c.evolution.seed = Some(1234);
        })
        .build()
}

#[test]
fn test_seeded_evolution_is_reproducible() {
    let run = || {
        let mut app = App::new(seeded_config(), ring_track(), RunOptions::default()).expect("app");
        let reports: Vec<_> = (0..2)
            .map(|_| app.run_generation().expect("generation"))
            .collect();
        (reports, app.population().members().to_vec())
    };
    let (reports_a, members_a) = run();
    let (reports_b, members_b) = run();

    for (a, b) in reports_a.iter().zip(&reports_b) {
        assert_eq!(a.fitness, b.fitness);
        assert_eq!(a.vehicles, b.vehicles);
    }
    assert_eq!(members_a, members_b);
    assert_eq!(reports_a[1].generation, 1);
}

#[test]
fn test_track_image_round_trip() {
    let path = std::env::temp_dir().join(format!("neuroracer-ring-{}.png", std::process::id()));
    let mut image = RgbaImage::from_pixel(800, 800, Rgba([255, 255, 255, 255]));
    let reference = ring_track();
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if reference.is_drivable(f64::from(x), f64::from(y)) {
            *pixel = Rgba([40, 40, 40, 255]);
        }
    }
    image.save(&path).expect("write png");

    let config = AppConfig::default();
    let loaded = TrackSurface::load(&path, config.track.boundary_color).expect("load png");
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, reference);
}

#[test]
fn test_missing_track_is_an_error() {
    let path = std::env::temp_dir().join("neuroracer-definitely-missing.png");
    assert!(TrackSurface::load(&path, [255, 255, 255, 255]).is_err());
}
