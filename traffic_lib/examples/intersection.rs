/// Vehicles queueing at a randomly cycling traffic light
extern crate traffic_lib;

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::EnvFilter;

use traffic_lib::{CycleConfig, CycleConfigBuilder, Phase, PhaseController};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of vehicles approaching the intersection
    #[arg(short, long, default_value_t = 4)]
    vehicles: usize,
    /// How many times each vehicle passes the light
    #[arg(short, long, default_value_t = 2)]
    rounds: usize,
    /// Shortest phase duration in milliseconds
    #[arg(long, default_value_t = 4000)]
    min_ms: u64,
    /// Longest phase duration in milliseconds
    #[arg(long, default_value_t = 6000)]
    max_ms: u64,
    /// Cycle configuration as JSON, overrides --min-ms and --max-ms
    #[arg(long)]
    config: Option<String>,
}

fn report(vehicle: usize, phase: Phase, message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if phase.is_green() {
        Color::Green
    } else {
        Color::Red
    };
    let now = Local::now().format("%H:%M:%S%.3f");
    stdout
        .set_color(ColorSpec::new().set_fg(Some(color)))
        .unwrap();
    write!(&mut stdout, "[{}] vehicle {:>2}", now, vehicle).unwrap();
    stdout.reset().unwrap();
    writeln!(&mut stdout, " {}", message).unwrap();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config: CycleConfig = match &args.config {
        Some(json) => CycleConfig::from_json(json)?,
        None => CycleConfigBuilder::new()
            .cycle_range(
                Duration::from_millis(args.min_ms),
                Duration::from_millis(args.max_ms),
            )
            .build()?,
    };

    let light = Arc::new(PhaseController::with_config(config));
    light.simulate()?;
    let (min, max) = light.config().cycle_range();
    println!(
        "traffic light {} is {}, cycling every {:?} to {:?}",
        light.id(),
        light.get_current_phase(),
        min,
        max
    );

    let mut handles = Vec::new();
    for vehicle in 0..args.vehicles {
        let light = light.clone();
        let rounds = args.rounds;
        handles.push(thread::spawn(move || -> traffic_lib::Result<()> {
            for round in 1..=rounds {
                report(vehicle, Phase::Red, &format!("is waiting (round {})", round));
                light.wait_for_green()?;
                report(vehicle, Phase::Green, "crosses the intersection");
                thread::sleep(Duration::from_millis(100));
            }
            Ok(())
        }));
    }
    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => eprintln!("a vehicle thread panicked"),
        }
    }
    light.stop();
    Ok(())
}
