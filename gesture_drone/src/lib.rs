//! # gesture_drone
//!
//! Hand-gesture controller for a simulated drone on a map.  Each camera
//! frame is classified into one command label, a small state machine turns
//! labels into great-circle moves, and the map follows the drone.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Source | Action |
//! |---|---|---|
//! | Thumb_Up | recognizer | Step forward (cooldown) |
//! | Thumb_Down | recognizer | Step backward (cooldown) |
//! | ILoveYou | recognizer | Turn left (cooldown) |
//! | Victory | recognizer | Turn right (cooldown) |
//! | Pointing_Up | recognizer | Auto-forward while held |
//! | Open_Palm | recognizer | Controls on |
//! | Closed_Fist | recognizer | Controls off, stop auto-forward |
//! | Shaka (thumb + pinky out) | landmarks | Fly home, works even when off |
//!
//! Turns are 5° in the refined variant and 10° in the baseline, which also
//! leaves out the landmark gestures.
//!
//! ## Simulation keyboard shortcuts
//!
//! | Key | Pose |
//! |---|---|
//! | `Enter` | Start the camera (once) |
//! | `W` / hold | Thumb_Up |
//! | `S` / hold | Thumb_Down |
//! | `A` / hold | ILoveYou |
//! | `D` / hold | Victory |
//! | `F` / hold | Pointing_Up |
//! | `O` | Open_Palm |
//! | `C` | Closed_Fist |
//! | `H` | Shaka |
//! | `Q` / `Escape` | Quit |

pub mod config;
pub mod error;
pub mod scheduler;
pub mod view;
pub mod controller;
pub mod gesture;
pub mod visualizer;
pub mod app;
