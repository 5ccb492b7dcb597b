//! Synthetic hand poses.
//!
//! Builds plausible 21-point landmark sets from a list of which fingers are
//! raised.  The keyboard simulator uses these to stand in for a camera.

use crate::landmarks::{GestureFrame, Handedness, Landmark, LANDMARK_COUNT};

/// Which digits are extended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HandPose {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl HandPose {
    pub const SHAKA: HandPose = HandPose { thumb: true,  index: false, middle: false, ring: false, pinky: true  };
    pub const FIST:  HandPose = HandPose { thumb: false, index: false, middle: false, ring: false, pinky: false };
    pub const OPEN:  HandPose = HandPose { thumb: true,  index: true,  middle: true,  ring: true,  pinky: true  };

    /// Landmarks for this pose.
    ///
    /// Drawn as a right hand (thumb sticking out toward smaller `x`); a left
    /// hand is the mirror image.  `Unknown` uses the right-hand layout.
    pub fn landmarks(&self, handedness: Handedness) -> Vec<Landmark> {
        let mut pts = vec![Landmark::default(); LANDMARK_COUNT];

        pts[0] = Landmark::new(0.50, 0.80);

        // thumb: CMC, MCP, IP, TIP
        pts[1] = Landmark::new(0.45, 0.75);
        pts[2] = Landmark::new(0.40, 0.70);
        pts[3] = Landmark::new(0.35, 0.66);
        pts[4] = if self.thumb {
            Landmark::new(0.28, 0.64)
        } else {
            Landmark::new(0.36, 0.67)
        };

        // fingers: MCP, PIP, DIP, TIP
        let fingers = [(5, 0.45, self.index), (9, 0.50, self.middle), (13, 0.55, self.ring), (17, 0.60, self.pinky)];
        for (base, x, up) in fingers {
            pts[base]     = Landmark::new(x, 0.60);
            pts[base + 1] = Landmark::new(x, 0.52);
            if up {
                pts[base + 2] = Landmark::new(x, 0.45);
                pts[base + 3] = Landmark::new(x, 0.38);
            } else {
                pts[base + 2] = Landmark::new(x, 0.58);
                pts[base + 3] = Landmark::new(x, 0.62);
            }
        }

        if handedness == Handedness::Left {
            for p in &mut pts { p.x = 1.0 - p.x; }
        }
        pts
    }

    pub fn frame(&self, handedness: Handedness) -> GestureFrame {
        GestureFrame { landmarks: self.landmarks(handedness), handedness }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{INDEX_PIP, INDEX_TIP, THUMB_IP, THUMB_TIP};

    #[test]
    fn full_hand() {
        assert_eq!(HandPose::OPEN.landmarks(Handedness::Right).len(), LANDMARK_COUNT);
    }

    #[test]
    fn raised_tip_is_above_joint() {
        let up   = HandPose::OPEN.landmarks(Handedness::Right);
        let down = HandPose::FIST.landmarks(Handedness::Right);
        assert!(up[INDEX_TIP].y   < up[INDEX_PIP].y);
        assert!(down[INDEX_TIP].y > down[INDEX_PIP].y);
    }

    #[test]
    fn left_hand_is_mirrored() {
        let r = HandPose::SHAKA.landmarks(Handedness::Right);
        let l = HandPose::SHAKA.landmarks(Handedness::Left);
        assert!(r[THUMB_TIP].x < r[THUMB_IP].x);
        assert!(l[THUMB_TIP].x > l[THUMB_IP].x);
        assert_eq!(r[INDEX_TIP].y, l[INDEX_TIP].y);
    }
}
