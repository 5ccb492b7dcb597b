//! gesture_drone — entry point.
//!
//! ```text
//! gesture_drone [--baseline] [--replay <file>] [--headless] [--save-config]
//! ```
//!
//! `RUST_LOG` controls logging (default `info`).

use std::path::PathBuf;
use std::time::Duration;

use gesture_drone::app::{run, run_headless};
use gesture_drone::config::Config;
use gesture_drone::error::AppError;
use gesture_drone::gesture::ReplaySource;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = real_main() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), AppError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let flag = |name: &str| args.iter().any(|a| a == name);
    let replay = args
        .iter()
        .position(|a| a == "--replay")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    let mut cfg = Config::load_or_default()?;
    if flag("--baseline") {
        cfg = cfg.baseline();
    }

    if flag("--save-config") {
        let path = cfg.save()?;
        println!("  Config written to {}", path.display());
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Drone — hand-controlled map drone           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Variant: {}   step {}m   home {}", cfg.turn_profile().name(), cfg.speed_m, cfg.home());

    if flag("--headless") {
        let Some(path) = replay else {
            return Err(AppError::Usage("--headless needs --replay <file>".into()));
        };
        // no pacing: headless time is virtual
        let source = ReplaySource::new(&path, Duration::ZERO);
        let ctl = run_headless(&cfg, Box::new(source))?;
        println!("  Final: {}", ctl.state());
        return Ok(());
    }

    match &replay {
        Some(path) => println!("  Camera: replaying {}", path.display()),
        None       => println!("  Camera: keyboard simulation"),
    }
    println!("  Opening map window…  press ENTER in the window to start the camera.");
    println!();

    run(cfg, replay)
}
