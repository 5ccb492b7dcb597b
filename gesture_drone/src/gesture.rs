//! Where recognizer frames come from.
//!
//! The public interface is a stream of [`Recognition`]s delivered over a
//! `mpsc` channel, one per camera frame.  Consumers don't need to know
//! whether frames came from the keyboard simulator or a recorded session.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use hand_gesture::{GestureCandidate, HandPose, HandResult, Handedness, MediaPipeResult, Recognition};
use tracing::info;

use crate::error::SourceError;

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver recognizer frames over a channel.
pub trait FrameSource: Send + 'static {
    /// One-shot setup: acquire the camera and load the model.
    fn start(&mut self) -> Result<(), SourceError>;

    /// Emit frames until done or until the receiver hangs up.
    fn run(self: Box<Self>, tx: Sender<Recognition>);
}

/// Start `source` and run it on its own thread, returning the receiving end.
///
/// A failed start is returned as-is; nothing is spawned and there is no
/// retry.
pub fn start_frame_source(mut source: Box<dyn FrameSource>) -> Result<Receiver<Recognition>, SourceError> {
    source.start()?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || source.run(tx));
    Ok(rx)
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — keyboard simulation
// ════════════════════════════════════════════════════════════════════════════

/// A hand pose held on the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    ThumbUp,
    ThumbDown,
    ILoveYou,
    Victory,
    PointingUp,
    OpenPalm,
    ClosedFist,
    Shaka,
}

impl SimPose {
    /// The category the pretrained recognizer reports for this pose.
    /// Shaka has none: it is only visible in the landmarks.
    pub fn category(self) -> Option<&'static str> {
        match self {
            SimPose::ThumbUp    => Some("Thumb_Up"),
            SimPose::ThumbDown  => Some("Thumb_Down"),
            SimPose::ILoveYou   => Some("ILoveYou"),
            SimPose::Victory    => Some("Victory"),
            SimPose::PointingUp => Some("Pointing_Up"),
            SimPose::OpenPalm   => Some("Open_Palm"),
            SimPose::ClosedFist => Some("Closed_Fist"),
            SimPose::Shaka      => None,
        }
    }

    fn hand(self) -> HandPose {
        let fist = HandPose::FIST;
        match self {
            SimPose::ThumbUp    => HandPose { thumb: true, ..fist },
            SimPose::ThumbDown  => fist,
            SimPose::ILoveYou   => HandPose { thumb: true, index: true, pinky: true, ..fist },
            SimPose::Victory    => HandPose { index: true, middle: true, ..fist },
            SimPose::PointingUp => HandPose { index: true, ..fist },
            SimPose::OpenPalm   => HandPose::OPEN,
            SimPose::ClosedFist => fist,
            SimPose::Shaka      => HandPose::SHAKA,
        }
    }

    /// What the recognizer would report for this pose.
    pub fn recognition(self, handedness: Handedness) -> Recognition {
        Recognition {
            hands: vec![HandResult {
                frame:    self.hand().frame(handedness),
                gestures: self.category().map(|c| GestureCandidate::new(c, 0.9)).into_iter().collect(),
            }],
        }
    }
}

/// Raw input from the simulation window.
#[derive(Clone, Copy, Debug)]
pub enum SimInput {
    /// The pose held this frame (`None` = no hand in view).
    Pose(Option<SimPose>),
    Quit,
}

/// Frame source driven by [`SimInput`] events from the map window.
pub struct SimHandSource {
    pub rx:         Receiver<SimInput>,
    pub handedness: Handedness,
}

impl FrameSource for SimHandSource {
    fn start(&mut self) -> Result<(), SourceError> {
        info!("simulated camera ready ({:?} hand)", self.handedness);
        Ok(())
    }

    fn run(self: Box<Self>, tx: Sender<Recognition>) {
        for input in self.rx {
            let frame = match input {
                SimInput::Pose(Some(pose)) => pose.recognition(self.handedness),
                SimInput::Pose(None)       => Recognition::empty(),
                SimInput::Quit             => return,
            };
            if tx.send(frame).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource — recorded recognizer output
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a recorded session: one raw recognizer JSON object per line.
pub struct ReplaySource {
    path:     PathBuf,
    interval: Duration,
    frames:   Vec<Recognition>,
}

impl ReplaySource {
    pub fn new(path: &Path, interval: Duration) -> Self {
        ReplaySource { path: path.to_path_buf(), interval, frames: Vec::new() }
    }

    pub fn frames(&self) -> &[Recognition] {
        &self.frames
    }
}

impl FrameSource for ReplaySource {
    fn start(&mut self) -> Result<(), SourceError> {
        let path = self.path.display().to_string();
        let raw = fs::read_to_string(&self.path)
            .map_err(|source| SourceError::Replay { path: path.clone(), source })?;

        self.frames = raw
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<MediaPipeResult>(line)
                    .map(Recognition::from)
                    .map_err(|source| SourceError::Recording { path: path.clone(), line: i + 1, source })
            })
            .collect::<Result<_, _>>()?;

        // the recording stands in for the recognizer: no frames, no model
        if self.frames.is_empty() {
            return Err(SourceError::Model(format!("{} holds no recognizer frames", path)));
        }
        info!("replaying {} frames from {}", self.frames.len(), path);
        Ok(())
    }

    fn run(self: Box<Self>, tx: Sender<Recognition>) {
        for frame in self.frames {
            if tx.send(frame).is_err() { return; }
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
