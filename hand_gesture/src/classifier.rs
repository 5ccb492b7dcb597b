//! Gesture classification: custom landmark predicates first, then the
//! recognizer's own top category.

use std::fmt;

use crate::landmarks::{
    GestureFrame, Handedness, Landmark, Recognition, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT,
    MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_IP, THUMB_TIP,
};

/// With handedness unknown, the thumb tip must sit at least this far
/// sideways from its joint (normalised units) to count as extended.
pub const THUMB_SIDEWAYS_MIN: f32 = 0.02;

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

/// A discrete drone command read from one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureLabel {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    ContinuousForward,
    Enable,
    Disable,
    ReturnHome,
    /// Nothing recognised (or something we have no command for).
    None,
}

impl GestureLabel {
    /// Map a recognizer category name.  Unknown names map to `None`.
    pub fn from_category(name: &str) -> Self {
        match name {
            "Thumb_Up"    => GestureLabel::Forward,
            "Thumb_Down"  => GestureLabel::Backward,
            "ILoveYou"    => GestureLabel::TurnLeft,
            "Victory"     => GestureLabel::TurnRight,
            "Pointing_Up" => GestureLabel::ContinuousForward,
            "Open_Palm"   => GestureLabel::Enable,
            "Closed_Fist" => GestureLabel::Disable,
            "Shaka"       => GestureLabel::ReturnHome,
            _             => GestureLabel::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GestureLabel::Forward           => "forward",
            GestureLabel::Backward          => "backward",
            GestureLabel::TurnLeft          => "turn-left",
            GestureLabel::TurnRight         => "turn-right",
            GestureLabel::ContinuousForward => "continuous-forward",
            GestureLabel::Enable            => "enable",
            GestureLabel::Disable           => "disable",
            GestureLabel::ReturnHome        => "return-home",
            GestureLabel::None              => "none",
        }
    }

    /// Forward, Backward, TurnLeft, TurnRight: the cooldown-gated ones.
    pub fn is_discrete(self) -> bool {
        matches!(
            self,
            GestureLabel::Forward | GestureLabel::Backward | GestureLabel::TurnLeft | GestureLabel::TurnRight
        )
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Point-geometry predicates
// ════════════════════════════════════════════════════════════════════════════

/// A non-thumb finger is up when its tip is above (smaller `y`) its PIP
/// joint.  Missing points count as "not up".
pub fn finger_up(landmarks: &[Landmark], tip: usize, pip: usize) -> bool {
    match (landmarks.get(tip), landmarks.get(pip)) {
        (Some(t), Some(p)) => t.y < p.y,
        _ => false,
    }
}

/// The thumb is up when it sticks out sideways, away from the palm.
///
/// Which side is "away" depends on the hand; without a handedness verdict
/// any sideways offset beyond [`THUMB_SIDEWAYS_MIN`] will do.
pub fn thumb_up(landmarks: &[Landmark], handedness: Handedness) -> bool {
    let (Some(tip), Some(ip)) = (landmarks.get(THUMB_TIP), landmarks.get(THUMB_IP)) else {
        return false;
    };
    match handedness {
        Handedness::Right   => tip.x < ip.x,
        Handedness::Left    => tip.x > ip.x,
        Handedness::Unknown => (tip.x - ip.x).abs() > THUMB_SIDEWAYS_MIN,
    }
}

/// "Shaka": thumb and pinky out, index/middle/ring curled.
pub fn is_shaka(frame: &GestureFrame) -> bool {
    let lm = frame.landmarks.as_slice();
    if lm.len() < LANDMARK_COUNT {
        return false;
    }
    thumb_up(lm, frame.handedness)
        && finger_up(lm, PINKY_TIP, PINKY_PIP)
        && !finger_up(lm, INDEX_TIP, INDEX_PIP)
        && !finger_up(lm, MIDDLE_TIP, MIDDLE_PIP)
        && !finger_up(lm, RING_TIP, RING_PIP)
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

/// Picks one label per frame from the first detected hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classifier {
    /// Evaluate the landmark predicates (Shaka) before the recognizer.
    pub custom_gestures: bool,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier { custom_gestures: true }
    }
}

impl Classifier {
    pub fn new(custom_gestures: bool) -> Self {
        Classifier { custom_gestures }
    }

    pub fn classify(&self, recognition: &Recognition) -> GestureLabel {
        let Some(hand) = recognition.hands.first() else {
            return GestureLabel::None;
        };

        if self.custom_gestures && is_shaka(&hand.frame) {
            return GestureLabel::ReturnHome;
        }

        hand.gestures
            .first()
            .map(|top| GestureLabel::from_category(&top.category_name))
            .unwrap_or(GestureLabel::None)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
