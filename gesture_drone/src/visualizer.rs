//! Software-rendered map using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  graticule (anchored at home)                            │
//! │                                                          │
//! │        ◆ HOME          · · · · trail                     │
//! │                                ▲  drone, always centred  │
//! │                                                          │
//! ├──────────────────────────────────────────────────────────┤
//! │  [ENTER: START CAMERA]  CONTROLS ON   return-home        │
//! │  LAT 33.205975  LNG 35.568292  HDG 5  HOME 140M          │
//! │  last action                                             │
//! │  key legend                                              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The view pans to keep the drone centred, so every redraw is effectively
//! a pan-to plus a marker update.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use std::time::Duration;

use drone_kinematics::{compute_distance, wrap_longitude, DroneState, LatLng, EARTH_RADIUS_M};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::config::Config;
use crate::error::AppError;
use crate::gesture::{SimInput, SimPose};
use crate::scheduler::MotionKind;
use crate::view::{DroneIcon, DroneView, Sprite};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 640;
const STATUS_H:      usize = 92;
const MAP_H:         usize = WIN_H - STATUS_H;
const CENTER_X:      usize = WIN_W / 2;
const CENTER_Y:      usize = MAP_H / 2;
const TRAIL_LEN:     usize = 4096;
/// Grid lines are never drawn closer than this.
const MIN_GRID_PX:   f64   = 48.0;

const MAP_BG:        u32 = 0xFF1E2A22;
const GRID_MINOR:    u32 = 0xFF2A3A2F;
const GRID_MAJOR:    u32 = 0xFF3D5444;
const TRAIL_COLOR:   u32 = 0xFF7FD1FF;
const HOME_COLOR:    u32 = 0xFFFFD700;  // gold
const STATUS_BG:     u32 = 0xFF0F1A14;
const TEXT_COLOR:    u32 = 0xFFE0E0E0;
const DIM_TEXT:      u32 = 0xFF7A8A80;
const BUTTON_BG:     u32 = 0xFF0F3460;
const BUTTON_OFF:    u32 = 0xFF2A2A2A;
const ON_COLOR:      u32 = 0xFF5BD75B;
const OFF_COLOR:     u32 = 0xFFE05555;
const ALERT_BG:      u32 = 0xFF3A0F14;

/// Held key → simulated hand pose.  Earlier entries win when several are held.
const POSE_KEYS: [(Key, SimPose); 8] = [
    (Key::H, SimPose::Shaka),
    (Key::C, SimPose::ClosedFist),
    (Key::O, SimPose::OpenPalm),
    (Key::F, SimPose::PointingUp),
    (Key::W, SimPose::ThumbUp),
    (Key::S, SimPose::ThumbDown),
    (Key::A, SimPose::ILoveYou),
    (Key::D, SimPose::Victory),
];

const LEGEND: &str =
    "W FWD  S BACK  A LEFT  D RIGHT  F AUTO  O ON  C OFF  H HOME   ENTER CAMERA  Q QUIT";

// ════════════════════════════════════════════════════════════════════════════
// Projection
// ════════════════════════════════════════════════════════════════════════════

/// Local east/north offset of `p` from `origin`, in meters.
///
/// Equirectangular about `origin`; good enough for the few kilometres the
/// map ever shows around the drone.
pub fn offset_meters(origin: LatLng, p: LatLng) -> (f64, f64) {
    let east  = wrap_longitude(p.lng - origin.lng).to_radians() * EARTH_RADIUS_M * origin.lat.to_radians().cos();
    let north = (p.lat - origin.lat).to_radians() * EARTH_RADIUS_M;
    (east, north)
}

/// Graticule spacing in meters: the smallest power of ten that keeps lines
/// at least `MIN_GRID_PX` apart.
pub fn grid_spacing(meters_per_pixel: f64) -> f64 {
    let mut spacing = 10.0;
    while spacing / meters_per_pixel < MIN_GRID_PX {
        spacing *= 10.0;
    }
    spacing
}

// ════════════════════════════════════════════════════════════════════════════
// MapView
// ════════════════════════════════════════════════════════════════════════════

/// What the status bar shows besides the drone itself.
#[derive(Clone, Debug, Default)]
pub struct Hud {
    pub status:  String,
    pub enabled: bool,
    pub motion:  Option<MotionKind>,
}

/// Input gathered from one `poll_input` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowInput {
    pub quit:         bool,
    pub start_camera: bool,
}

pub struct MapView {
    window:           Window,
    buf:              Vec<u32>,
    /// Where held poses go once the camera is on; `None` when frames come
    /// from elsewhere.
    sim_tx:           Option<Sender<SimInput>>,
    camera_on:        bool,

    icon:             DroneIcon,
    sprite:           Sprite,
    sprite_heading:   f64,

    home:             LatLng,
    meters_per_pixel: f64,
    state:            Option<DroneState>,
    trail:            VecDeque<LatLng>,
}

impl MapView {
    pub fn new(cfg: &Config, sim_tx: Option<Sender<SimInput>>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Gesture Drone",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        let icon = DroneIcon::load(&cfg.icon_path);
        let sprite = icon.rotated(0.0);

        Ok(MapView {
            window,
            buf: vec![MAP_BG; WIN_W * WIN_H],
            sim_tx,
            camera_on: false,
            icon,
            sprite,
            sprite_heading: 0.0,
            home: cfg.home(),
            meters_per_pixel: cfg.meters_per_pixel,
            state: None,
            trail: VecDeque::with_capacity(TRAIL_LEN),
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Once on, the camera control stays disabled.
    pub fn set_camera_on(&mut self) { self.camera_on = true; }

    pub fn camera_on(&self) -> bool { self.camera_on }

    /// Read the keyboard.  While the camera is on, the held pose (or no
    /// pose) is sent as this frame's hand.
    pub fn poll_input(&mut self) -> WindowInput {
        let mut input = WindowInput::default();

        if !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_pressed(Key::Q, KeyRepeat::No)
        {
            if let Some(tx) = &self.sim_tx {
                let _ = tx.send(SimInput::Quit);
            }
            input.quit = true;
            return input;
        }

        if !self.camera_on {
            input.start_camera = self.window.is_key_pressed(Key::Enter, KeyRepeat::No);
            return input;
        }

        if let Some(tx) = &self.sim_tx {
            let pose = POSE_KEYS
                .iter()
                .find(|(key, _)| self.window.is_key_down(*key))
                .map(|&(_, pose)| pose);
            let _ = tx.send(SimInput::Pose(pose));
        }
        input
    }

    pub fn render(&mut self, hud: &Hud) {
        self.buf.fill(MAP_BG);

        if let Some(state) = self.state {
            let (e0, n0) = offset_meters(self.home, state.position);
            self.draw_graticule(e0, n0);
            self.draw_trail(state.position);
            self.draw_home(e0, n0);
            self.blit_sprite(CENTER_X, CENTER_Y);
        }

        self.draw_status(hud);
        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    /// Show `message` over the map and wait for ENTER or the window to close.
    pub fn alert(&mut self, message: &str) {
        let (w, h) = (WIN_W * 2 / 3, 150);
        let (x, y) = ((WIN_W - w) / 2, (MAP_H - h) / 2);
        self.fill_rect(x, y, w, h, ALERT_BG);
        self.draw_border(x, y, w, h, OFF_COLOR);
        self.draw_label("ERROR", x + 16, y + 14, 3, OFF_COLOR);

        let max_chars = (w - 32) / 8;
        let mut line_y = y + 44;
        for line in wrap(message, max_chars).iter().take(6) {
            self.draw_label(line, x + 16, line_y, 2, TEXT_COLOR);
            line_y += 14;
        }
        self.draw_label("PRESS ENTER", x + 16, y + h - 20, 2, DIM_TEXT);

        while self.window.is_open()
            && !self.window.is_key_pressed(Key::Enter, KeyRepeat::No)
            && !self.window.is_key_down(Key::Escape)
        {
            self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
        }
    }

    // ── map layers ────────────────────────────────────────────────────────

    /// Screen position of a point `(east, north)` meters from home, with the
    /// drone at `(e0, n0)` in the centre.
    fn to_screen(&self, east: f64, north: f64, e0: f64, n0: f64) -> (f64, f64) {
        (
            CENTER_X as f64 + (east - e0) / self.meters_per_pixel,
            CENTER_Y as f64 - (north - n0) / self.meters_per_pixel,
        )
    }

    fn draw_graticule(&mut self, e0: f64, n0: f64) {
        let mpp = self.meters_per_pixel;
        let spacing = grid_spacing(mpp);
        let half_w = CENTER_X as f64 * mpp;
        let half_h = CENTER_Y as f64 * mpp;

        let first = ((e0 - half_w) / spacing).floor() as i64;
        let last  = ((e0 + half_w) / spacing).ceil() as i64;
        for k in first..=last {
            let (x, _) = self.to_screen(k as f64 * spacing, n0, e0, n0);
            if x >= 0.0 && (x as usize) < WIN_W {
                let color = if k % 10 == 0 { GRID_MAJOR } else { GRID_MINOR };
                for y in 0..MAP_H { self.set_pixel(x as usize, y, color); }
            }
        }

        let first = ((n0 - half_h) / spacing).floor() as i64;
        let last  = ((n0 + half_h) / spacing).ceil() as i64;
        for k in first..=last {
            let (_, y) = self.to_screen(e0, k as f64 * spacing, e0, n0);
            if y >= 0.0 && (y as usize) < MAP_H {
                let color = if k % 10 == 0 { GRID_MAJOR } else { GRID_MINOR };
                for x in 0..WIN_W { self.set_pixel(x, y as usize, color); }
            }
        }

        let scale = format!("GRID {}M", spacing);
        self.draw_label(&scale, 8, 8, 2, DIM_TEXT);
    }

    fn draw_trail(&mut self, center: LatLng) {
        let len = self.trail.len();
        let points: Vec<(f64, f64)> = self
            .trail
            .iter()
            .map(|&p| offset_meters(center, p))
            .collect();
        for (i, (east, north)) in points.into_iter().enumerate() {
            let (x, y) = self.to_screen(east, north, 0.0, 0.0);
            if x < 0.0 || y < 0.0 || x as usize >= WIN_W || y as usize >= MAP_H { continue; }
            // older points fade into the map
            let age = 1.0 - (i + 1) as f32 / len as f32;
            let color = blend(TRAIL_COLOR, MAP_BG, age * 0.8);
            let (x, y) = (x as usize, y as usize);
            self.fill_rect(x.saturating_sub(1), y.saturating_sub(1), 3, 3, color);
        }
    }

    fn draw_home(&mut self, e0: f64, n0: f64) {
        let (x, y) = self.to_screen(0.0, 0.0, e0, n0);
        if x < 0.0 || y < 0.0 || x as usize >= WIN_W || y as usize >= MAP_H { return; }
        let (x, y) = (x as usize, y as usize);
        for r in 4..=7 { self.draw_diamond(x, y, r, HOME_COLOR); }
        self.draw_label("HOME", x + 10, y.saturating_sub(4), 2, HOME_COLOR);
    }

    fn blit_sprite(&mut self, cx: usize, cy: usize) {
        let half = self.sprite.size / 2;
        for sy in 0..self.sprite.size {
            for sx in 0..self.sprite.size {
                let px = self.sprite.pixel(sx, sy);
                let alpha = px >> 24;
                if alpha == 0 { continue; }
                let (x, y) = ((cx + sx).wrapping_sub(half), (cy + sy).wrapping_sub(half));
                if x >= WIN_W || y >= MAP_H { continue; }
                let dst = self.buf[y * WIN_W + x];
                self.buf[y * WIN_W + x] = blend(dst, px | 0xFF000000, alpha as f32 / 255.0);
            }
        }
    }

    // ── status bar ────────────────────────────────────────────────────────

    fn draw_status(&mut self, hud: &Hud) {
        let top = MAP_H;
        self.fill_rect(0, top, WIN_W, STATUS_H, STATUS_BG);

        // camera control
        let (label, bg, fg) = if self.camera_on {
            ("CAMERA ON", BUTTON_OFF, DIM_TEXT)
        } else {
            ("ENTER: START CAMERA", BUTTON_BG, TEXT_COLOR)
        };
        let bw = label.len() * 8 + 16;
        self.fill_rect(8, top + 6, bw, 20, bg);
        self.draw_label(label, 16, top + 11, 2, fg);

        let mut x = bw + 24;
        let (mode, color) = if hud.enabled { ("CONTROLS ON", ON_COLOR) } else { ("CONTROLS OFF", OFF_COLOR) };
        self.draw_label(mode, x, top + 11, 2, color);
        x += mode.len() * 8 + 24;
        if let Some(kind) = hud.motion {
            self.draw_label(kind.name(), x, top + 11, 2, HOME_COLOR);
        }

        if let Some(s) = self.state {
            let line = format!(
                "LAT {:.6}  LNG {:.6}  HDG {:.0}  HOME {:.0}M",
                s.position.lat, s.position.lng, s.heading, compute_distance(s.position, self.home),
            );
            self.draw_label(&line, 8, top + 34, 2, TEXT_COLOR);
        }

        self.draw_label(&hud.status, 8, top + 54, 2, TEXT_COLOR);
        self.draw_label(LEGEND, 8, top + 78, 1, DIM_TEXT);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x+w).min(WIN_W) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y+h).min(WIN_H) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn draw_diamond(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        for dy in 0..=r as isize {
            let dx = r as isize - dy;
            for &(sx, sy) in &[
                (cx as isize + dx, cy as isize + dy),
                (cx as isize - dx, cy as isize + dy),
                (cx as isize + dx, cy as isize - dy),
                (cx as isize - dx, cy as isize - dy),
            ] {
                if sx >= 0 && sy >= 0 {
                    self.set_pixel(sx as usize, sy as usize, color);
                }
            }
        }
    }

    /// 3×5 bitmap font, each dot drawn as a `scale`×`scale` block.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

impl DroneView for MapView {
    fn redraw(&mut self, state: &DroneState) {
        if state.heading != self.sprite_heading {
            self.sprite = self.icon.rotated(state.heading);
            self.sprite_heading = state.heading;
        }
        if self.trail.back() != Some(&state.position) {
            if self.trail.len() == TRAIL_LEN { self.trail.pop_front(); }
            self.trail.push_back(state.position);
        }
        self.state = Some(*state);
    }
}

/// Greedy word wrap to at most `width` characters per line.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() { line.push(' '); }
        line.push_str(word);
    }
    if !line.is_empty() { lines.push(line); }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
