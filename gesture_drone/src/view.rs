//! The seam between drone state and whatever draws it.
//!
//! The controller only ever hands out `(position, heading)`; turning that
//! into pixels, including the rotated marker icon, happens behind
//! [`DroneView`].

use std::path::Path;

use drone_kinematics::DroneState;
use tracing::{trace, warn};

// ════════════════════════════════════════════════════════════════════════════
// DroneView
// ════════════════════════════════════════════════════════════════════════════

/// Receives the drone state after every change.
pub trait DroneView {
    fn redraw(&mut self, state: &DroneState);
}

impl<V: DroneView + ?Sized> DroneView for Box<V> {
    fn redraw(&mut self, state: &DroneState) {
        (**self).redraw(state);
    }
}

/// Draws nothing.
#[derive(Debug, Default)]
pub struct NullView;

impl DroneView for NullView {
    fn redraw(&mut self, _state: &DroneState) {}
}

/// Headless view: remembers the last state and logs every redraw.
#[derive(Debug, Default)]
pub struct LogView {
    pub redraws: usize,
    pub last:    Option<DroneState>,
}

impl DroneView for LogView {
    fn redraw(&mut self, state: &DroneState) {
        self.redraws += 1;
        self.last = Some(*state);
        trace!(lat = state.position.lat, lng = state.position.lng, heading = state.heading, "redraw");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DroneIcon
// ════════════════════════════════════════════════════════════════════════════

/// Marker edge length in pixels.
pub const ICON_SIZE: usize = 56;

const ARROW_FILL:   u32 = 0xFFCC0000;
const ARROW_STROKE: u32 = 0xFFFF6666;

/// A square ARGB bitmap; alpha 0 is transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub size:   usize,
    pub pixels: Vec<u32>,
}

impl Sprite {
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.size + x]
    }

    pub fn is_opaque(&self, x: usize, y: usize) -> bool {
        self.pixel(x, y) >> 24 != 0
    }
}

#[derive(Clone, Debug)]
enum IconSource {
    /// The asset, already scaled to fit `ICON_SIZE` and centred.
    Image(Sprite),
    /// Closed arrow drawn on the fly.
    Arrow,
}

/// The drone marker, rotated to the heading on demand.
#[derive(Clone, Debug)]
pub struct DroneIcon {
    source: IconSource,
}

impl DroneIcon {
    /// Load the marker image; fall back to the arrow if it can't be read.
    pub fn load(path: &Path) -> Self {
        match image::open(path) {
            Ok(img) => {
                let fitted = img
                    .resize(ICON_SIZE as u32, ICON_SIZE as u32, image::imageops::FilterType::Triangle)
                    .to_rgba8();
                let (w, h) = (fitted.width() as usize, fitted.height() as usize);
                let ox = (ICON_SIZE - w.min(ICON_SIZE)) / 2;
                let oy = (ICON_SIZE - h.min(ICON_SIZE)) / 2;

                let mut pixels = vec![0u32; ICON_SIZE * ICON_SIZE];
                for (x, y, px) in fitted.enumerate_pixels() {
                    let [r, g, b, a] = px.0;
                    let (x, y) = (x as usize + ox, y as usize + oy);
                    if x < ICON_SIZE && y < ICON_SIZE {
                        pixels[y * ICON_SIZE + x] =
                            (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32;
                    }
                }
                DroneIcon { source: IconSource::Image(Sprite { size: ICON_SIZE, pixels }) }
            }
            Err(e) => {
                warn!("drone icon {} unavailable ({}), using arrow", path.display(), e);
                DroneIcon::arrow()
            }
        }
    }

    pub fn arrow() -> Self {
        DroneIcon { source: IconSource::Arrow }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, IconSource::Arrow)
    }

    /// The marker turned `angle_deg` clockwise about its centre.
    pub fn rotated(&self, angle_deg: f64) -> Sprite {
        let (sin, cos) = angle_deg.to_radians().sin_cos();
        let c = (ICON_SIZE as f64 - 1.0) / 2.0;
        let mut pixels = vec![0u32; ICON_SIZE * ICON_SIZE];

        for y in 0..ICON_SIZE {
            for x in 0..ICON_SIZE {
                // inverse rotation: where did this pixel come from?
                let (u, v) = (x as f64 - c, y as f64 - c);
                let sx = u * cos + v * sin;
                let sy = -u * sin + v * cos;

                pixels[y * ICON_SIZE + x] = match &self.source {
                    IconSource::Image(src) => {
                        let (ix, iy) = ((sx + c).round(), (sy + c).round());
                        if ix >= 0.0 && iy >= 0.0 && (ix as usize) < ICON_SIZE && (iy as usize) < ICON_SIZE {
                            src.pixel(ix as usize, iy as usize)
                        } else {
                            0
                        }
                    }
                    IconSource::Arrow => arrow_pixel(sx, sy),
                };
            }
        }
        Sprite { size: ICON_SIZE, pixels }
    }
}

// ── arrow glyph ───────────────────────────────────────────────────────────

/// Pointing up (north) in unrotated icon space, centred on the origin.
const ARROW: [(f64, f64); 4] = [(0.0, -22.0), (14.0, 16.0), (0.0, 7.0), (-14.0, 16.0)];

fn arrow_pixel(x: f64, y: f64) -> u32 {
    if !inside_polygon(&ARROW, x, y) {
        return 0;
    }
    let edge = (0..ARROW.len())
        .map(|i| segment_distance(ARROW[i], ARROW[(i + 1) % ARROW.len()], x, y))
        .fold(f64::INFINITY, f64::min);
    if edge < 1.5 { ARROW_STROKE } else { ARROW_FILL }
}

fn inside_polygon(poly: &[(f64, f64)], x: f64, y: f64) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (xi, yi) = poly[i];
        let (xj, yj) = poly[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn segment_distance(a: (f64, f64), b: (f64, f64), x: f64, y: f64) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 { (((x - a.0) * dx + (y - a.1) * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
    let (px, py) = (a.0 + t * dx, a.1 + t * dy);
    ((x - px).powi(2) + (y - py).powi(2)).sqrt()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
