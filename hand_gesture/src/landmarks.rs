//! Hand landmarks and the per-frame recognizer output that carries them.
//!
//! Coordinates are normalised to the image: `x` grows to the right, `y`
//! grows *downward*, so a raised fingertip has a smaller `y` than its joint.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices — 21-point hand model
// ════════════════════════════════════════════════════════════════════════════

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Number of points in a complete hand.
pub const LANDMARK_COUNT: usize = 21;

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One normalised hand keypoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist; unused by the geometry predicates.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: 0.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    /// Parse the recognizer's handedness category ("Right", "Left", …).
    /// Matching is a case-insensitive substring test; "right" wins if both
    /// appear.
    pub fn from_category(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        if upper.contains("RIGHT") {
            Handedness::Right
        } else if upper.contains("LEFT") {
            Handedness::Left
        } else {
            Handedness::Unknown
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureFrame / HandResult / Recognition
// ════════════════════════════════════════════════════════════════════════════

/// Landmarks of one detected hand, as consumed by the geometry predicates.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureFrame {
    pub landmarks:  Vec<Landmark>,
    #[serde(default)]
    pub handedness: Handedness,
}

/// One ranked guess from the pretrained recognizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureCandidate {
    pub category_name: String,
    #[serde(default)]
    pub score:         f32,
}

impl GestureCandidate {
    pub fn new(category_name: &str, score: f32) -> Self {
        GestureCandidate { category_name: category_name.to_string(), score }
    }
}

/// Everything the recognizer reports for one hand.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandResult {
    pub frame:    GestureFrame,
    /// Best first.
    #[serde(default)]
    pub gestures: Vec<GestureCandidate>,
}

/// Recognizer output for one video frame.  Empty when no hand is visible.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub hands: Vec<HandResult>,
}

impl Recognition {
    /// No hand in view.
    pub fn empty() -> Self {
        Recognition::default()
    }

    /// A hand the recognizer classified as `category`, with no landmarks.
    pub fn category(category: &str) -> Self {
        Recognition {
            hands: vec![HandResult {
                frame:    GestureFrame::default(),
                gestures: vec![GestureCandidate::new(category, 1.0)],
            }],
        }
    }

    /// A hand seen only as landmarks, with no recognizer verdict.
    pub fn landmarks_only(frame: GestureFrame) -> Self {
        Recognition { hands: vec![HandResult { frame, gestures: Vec::new() }] }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MediaPipeResult — raw recognizer JSON
// ════════════════════════════════════════════════════════════════════════════

/// The recognizer's own result layout: parallel per-hand arrays.
///
/// This is what a browser gets from `JSON.stringify(recognizeForVideo(..))`,
/// so recorded sessions can be fed straight into [`Recognition`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MediaPipeResult {
    #[serde(default)]
    pub gestures:      Vec<Vec<GestureCandidate>>,
    #[serde(default)]
    pub landmarks:     Vec<Vec<Landmark>>,
    #[serde(default)]
    pub handedness:    Vec<Vec<GestureCandidate>>,
    /// Older name for `handedness`; recorders often write both.
    #[serde(default)]
    pub handednesses:  Vec<Vec<GestureCandidate>>,
}

impl From<MediaPipeResult> for Recognition {
    fn from(raw: MediaPipeResult) -> Self {
        let count = raw.landmarks.len().max(raw.gestures.len());
        let mut landmarks = raw.landmarks.into_iter();
        let mut gestures  = raw.gestures.into_iter();
        let handedness = if raw.handedness.is_empty() { raw.handednesses } else { raw.handedness };
        let mut handed    = handedness.into_iter();

        let hands = (0..count)
            .map(|_| {
                let handedness = handed
                    .next()
                    .and_then(|cats| cats.into_iter().next())
                    .map(|c| Handedness::from_category(&c.category_name))
                    .unwrap_or_default();
                HandResult {
                    frame: GestureFrame {
                        landmarks: landmarks.next().unwrap_or_default(),
                        handedness,
                    },
                    gestures: gestures.next().unwrap_or_default(),
                }
            })
            .collect();

        Recognition { hands }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
