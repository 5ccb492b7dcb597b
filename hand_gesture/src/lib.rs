//! # hand_gesture
//!
//! Turns one frame of hand-recognizer output into a [`GestureLabel`].
//!
//! ## Gesture → label mapping
//!
//! | Recognizer category | Label |
//! |---|---|
//! | `Thumb_Up` | Forward |
//! | `Thumb_Down` | Backward |
//! | `ILoveYou` | TurnLeft |
//! | `Victory` | TurnRight |
//! | `Pointing_Up` | ContinuousForward |
//! | `Open_Palm` | Enable |
//! | `Closed_Fist` | Disable |
//! | *Shaka* (thumb + pinky out, landmark geometry) | ReturnHome |
//!
//! The Shaka pose is not something the pretrained recognizer knows; it is
//! detected from the raw landmarks and, when it matches, wins over whatever
//! the recognizer said for that frame.

pub mod landmarks;
pub mod pose;
pub mod classifier;

pub use landmarks::{
    GestureCandidate, GestureFrame, HandResult, Handedness, Landmark, MediaPipeResult, Recognition,
};
pub use pose::HandPose;
pub use classifier::{finger_up, is_shaka, thumb_up, Classifier, GestureLabel};
