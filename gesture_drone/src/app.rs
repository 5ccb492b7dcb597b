//! Top-level run loop.
//!
//! Nothing happens until the camera is started from the window.  Starting
//! is one-shot: a failure is shown, logged and ends the run, and a success
//! leaves the control disabled with "camera on".  After that each window
//! frame drains the recognizer channel, acts on the most recent frame (or
//! just lets motion tasks advance) and redraws.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use hand_gesture::{Handedness, Recognition};
use tracing::{error, info};

use crate::config::Config;
use crate::controller::{Action, Controller};
use crate::error::AppError;
use crate::gesture::{start_frame_source, FrameSource, ReplaySource, SimHandSource};
use crate::view::LogView;
use crate::visualizer::{Hud, MapView};

// ════════════════════════════════════════════════════════════════════════════
// Windowed run
// ════════════════════════════════════════════════════════════════════════════

/// Open the map window and run until it is closed.
///
/// With `replay` set, the camera plays back that recording instead of
/// reading the keyboard.
pub fn run(cfg: Config, replay: Option<PathBuf>) -> Result<(), AppError> {
    // ── frame source (not started yet) ───────────────────────────────────
    let (source, sim_tx): (Box<dyn FrameSource>, _) = match replay {
        Some(path) => (Box::new(ReplaySource::new(&path, cfg.replay_frame())), None),
        None => {
            let (tx, rx) = mpsc::channel();
            (Box::new(SimHandSource { rx, handedness: Handedness::Right }), Some(tx))
        }
    };
    let mut pending = Some(source);
    let mut frames: Option<Receiver<Recognition>> = None;

    // ── map + controller ─────────────────────────────────────────────────
    let map = MapView::new(&cfg, sim_tx)?;
    let mut ctl = Controller::new(&cfg, map);
    let mut status = String::from("press ENTER to start the camera");
    let started = Instant::now();

    info!("{} variant, {}m steps, home {}", cfg.turn_profile().name(), cfg.speed_m, cfg.home());

    // ── main loop ────────────────────────────────────────────────────────
    while ctl.view().is_open() {
        // 1. Window input
        let input = ctl.view_mut().poll_input();
        if input.quit { break; }

        // 2. Camera control
        if input.start_camera {
            if let Some(source) = pending.take() {
                match start_frame_source(source) {
                    Ok(rx) => {
                        info!("camera on");
                        ctl.view_mut().set_camera_on();
                        frames = Some(rx);
                        status = "camera on".to_string();
                    }
                    Err(e) => {
                        error!("camera start failed: {}", e);
                        ctl.view_mut().alert(&e.to_string());
                        return Err(e.into());
                    }
                }
            }
        }

        // 3. Drain recognitions, keep the newest
        let now = started.elapsed();
        let mut latest = None;
        let mut finished = false;
        if let Some(rx) = &frames {
            loop {
                match rx.try_recv() {
                    Ok(rec)                         => latest = Some(rec),
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => { finished = true; break; }
                }
            }
        }
        if finished {
            info!("frame source finished");
            frames = None;
        }

        // 4. Act
        match latest {
            Some(rec) => {
                let action = ctl.process_frame(&rec, now);
                if action != Action::Ignored {
                    status = action.describe();
                }
            }
            None => { ctl.advance(now); }
        }

        // 5. Render
        let hud = Hud {
            status:  status.clone(),
            enabled: ctl.mode().enabled,
            motion:  ctl.motion(),
        };
        ctl.view_mut().render(&hud);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Headless run
// ════════════════════════════════════════════════════════════════════════════

/// Drive the controller from `source` with no window.
///
/// Time is virtual: every frame advances the clock by `replay_frame_ms`.
/// When the source runs dry, a return-home still in flight is flown to the
/// end at the configured tick.  Returns the controller so the caller can
/// inspect where the drone ended up.
pub fn run_headless(cfg: &Config, source: Box<dyn FrameSource>) -> Result<Controller<LogView>, AppError> {
    let rx = start_frame_source(source).map_err(|e| {
        error!("camera start failed: {}", e);
        e
    })?;
    info!("camera on");

    let mut ctl = Controller::new(cfg, LogView::default());
    let frame = cfg.replay_frame();
    let mut now = Duration::ZERO;
    let mut count = 0usize;

    for rec in rx {
        now += frame;
        count += 1;
        let action = ctl.process_frame(&rec, now);
        if action != Action::Ignored {
            info!("{:>8.3}s  {}", now.as_secs_f64(), action.describe());
        }
    }

    while ctl.return_home_active() {
        now += cfg.tick();
        ctl.advance(now);
    }

    info!("{} frames, {} redraws, drone at {}", count, ctl.view().redraws, ctl.state());
    Ok(ctl)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
