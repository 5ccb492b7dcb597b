//! # drone_kinematics
//!
//! Position, heading and speed of a simulated drone flying over a spherical
//! earth, plus the stepped "fly home" routine.
//!
//! All geometry matches the spherical helpers of common web-map widgets
//! (earth radius 6 378 137 m), so a drone driven here lands on the same
//! coordinates a map marker would.
//!
//! ## Quick start
//!
//! ```rust
//! use drone_kinematics::{Drone, HomeStep, TurnProfile, HOME};
//!
//! let mut drone = Drone::new(HOME, 70.0, TurnProfile::Refined);
//! drone.turn_right();
//! drone.move_forward(1.0);
//! assert!(drone.distance_to_home() > 69.0);
//!
//! while drone.home_step() != HomeStep::Arrived {}
//! assert_eq!(drone.state().position, HOME);
//! ```

use std::fmt;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Mean earth radius used by the map widget's spherical geometry (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Default home / start coordinate.
pub const HOME: LatLng = LatLng { lat: 33.205975, lng: 35.568292 };

/// Default forward step, in meters per tick.
pub const DEFAULT_SPEED_M: f64 = 70.0;

/// Never snap home from farther than this, however slow the drone is.
const MIN_SNAP_M: f64 = 2.0;

// ════════════════════════════════════════════════════════════════════════════
// LatLng
// ════════════════════════════════════════════════════════════════════════════

/// A geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Spherical geometry
// ════════════════════════════════════════════════════════════════════════════

/// Normalise a heading into `[0, 360)`.
pub fn wrap_heading(deg: f64) -> f64 {
    let h = deg.rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360.0
    if h >= 360.0 { 0.0 } else { h }
}

/// Normalise a longitude into `[-180, 180)`.
pub fn wrap_longitude(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Great-circle destination reached by travelling `distance_m` from `from`
/// along the initial bearing `heading_deg` (0 = north, clockwise).
///
/// A negative distance travels the other way along the same great circle.
pub fn compute_offset(from: LatLng, distance_m: f64, heading_deg: f64) -> LatLng {
    let d       = distance_m / EARTH_RADIUS_M;
    let heading = heading_deg.to_radians();
    let lat1    = from.lat.to_radians();
    let lng1    = from.lng.to_radians();

    let (sin_d, cos_d)       = d.sin_cos();
    let (sin_lat1, cos_lat1) = lat1.sin_cos();

    let sin_lat2 = cos_d * sin_lat1 + sin_d * cos_lat1 * heading.cos();
    let d_lng    = (sin_d * cos_lat1 * heading.sin()).atan2(cos_d - sin_lat1 * sin_lat2);

    LatLng {
        lat: sin_lat2.clamp(-1.0, 1.0).asin().to_degrees(),
        lng: wrap_longitude((lng1 + d_lng).to_degrees()),
    }
}

/// Haversine distance between two coordinates, in meters.
pub fn compute_distance(a: LatLng, b: LatLng) -> f64 {
    let lat1  = a.lat.to_radians();
    let lat2  = b.lat.to_radians();
    let d_lat = lat2 - lat1;
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
          + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin() * EARTH_RADIUS_M
}

/// Initial bearing from `from` to `to`, in degrees within `[-180, 180)`.
pub fn compute_heading(from: LatLng, to: LatLng) -> f64 {
    let lat1  = from.lat.to_radians();
    let lat2  = to.lat.to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    wrap_longitude(y.atan2(x).to_degrees())
}

// ════════════════════════════════════════════════════════════════════════════
// TurnProfile
// ════════════════════════════════════════════════════════════════════════════

/// How far a single turn command rotates the drone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TurnProfile {
    /// Fine 5° steps.
    #[default]
    Refined,
    /// Coarse 10° steps.
    Baseline,
}

impl TurnProfile {
    pub fn step_degrees(self) -> f64 {
        match self {
            TurnProfile::Refined  => 5.0,
            TurnProfile::Baseline => 10.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TurnProfile::Refined  => "refined",
            TurnProfile::Baseline => "baseline",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DroneState
// ════════════════════════════════════════════════════════════════════════════

/// Everything the map needs to draw the drone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DroneState {
    pub position: LatLng,
    /// Degrees clockwise from north, always in `[0, 360)`.
    pub heading:  f64,
    /// Length of one forward step, in meters.
    pub speed:    f64,
}

impl fmt::Display for DroneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pos={}  heading={:.1}°  speed={:.0}m", self.position, self.heading, self.speed)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HomeStep
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one return-home tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HomeStep {
    /// The drone was within the snap threshold and now sits exactly on home.
    Arrived,
    /// The drone turned toward home and advanced; `distance_before` is the
    /// distance measured before the step.
    Advanced { distance_before: f64 },
}

// ════════════════════════════════════════════════════════════════════════════
// Drone
// ════════════════════════════════════════════════════════════════════════════

/// The simulated drone.  Its state only changes through the methods below.
#[derive(Clone, Debug)]
pub struct Drone {
    state:   DroneState,
    home:    LatLng,
    profile: TurnProfile,
}

impl Drone {
    /// A drone parked on `home`, facing north.
    pub fn new(home: LatLng, speed: f64, profile: TurnProfile) -> Self {
        Drone {
            state: DroneState { position: home, heading: 0.0, speed },
            home,
            profile,
        }
    }

    pub fn state(&self)   -> &DroneState  { &self.state }
    pub fn home(&self)    -> LatLng       { self.home }
    pub fn profile(&self) -> TurnProfile  { self.profile }

    /// Displace the drone `speed * mult` meters along its heading.
    /// Negative `mult` flies backward; there are no bounds.
    pub fn move_forward(&mut self, mult: f64) {
        let meters = self.state.speed * mult;
        self.state.position = compute_offset(self.state.position, meters, self.state.heading);
    }

    pub fn move_backward(&mut self) {
        self.move_forward(-1.0);
    }

    pub fn turn_left(&mut self) {
        self.state.heading = wrap_heading(self.state.heading - self.profile.step_degrees());
    }

    pub fn turn_right(&mut self) {
        self.state.heading = wrap_heading(self.state.heading + self.profile.step_degrees());
    }

    pub fn distance_to_home(&self) -> f64 {
        compute_distance(self.state.position, self.home)
    }

    /// Closer than this, a home step snaps straight onto home.
    pub fn snap_threshold(&self) -> f64 {
        (self.state.speed * 0.5).max(MIN_SNAP_M)
    }

    /// One tick of the return-home routine.
    ///
    /// Inside the snap threshold the drone lands exactly on home facing
    /// north.  Otherwise it turns toward home and advances one step, cut
    /// short on the final approach so it never overshoots.
    pub fn home_step(&mut self) -> HomeStep {
        let distance = self.distance_to_home();
        // a NaN position never gets closer; land it instead of looping
        if !distance.is_finite() || distance < self.snap_threshold() {
            self.state.position = self.home;
            self.state.heading  = 0.0;
            return HomeStep::Arrived;
        }

        self.state.heading = wrap_heading(compute_heading(self.state.position, self.home));
        let mult = if self.state.speed > 0.0 { (distance / self.state.speed).min(1.0) } else { 1.0 };
        self.move_forward(mult);
        HomeStep::Advanced { distance_before: distance }
    }

    /// Teleport back to home facing north.
    pub fn reset(&mut self) {
        self.state.position = self.home;
        self.state.heading  = 0.0;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    // ── geometry ─────────────────────────────────────────────────────────
    #[test]
    fn offset_north_moves_latitude_only() {
        let p = compute_offset(LatLng::new(0.0, 10.0), 1000.0, 0.0);
        let expected = (1000.0 / EARTH_RADIUS_M).to_degrees();
        assert!((p.lat - expected).abs() < 1e-9);
        assert!((p.lng - 10.0).abs() < 1e-9);
    }

    #[test]
    fn offset_distance_matches_haversine() {
        for heading in [0.0, 45.0, 133.0, 270.0, 359.0] {
            let p = compute_offset(HOME, 2500.0, heading);
            let d = compute_distance(HOME, p);
            assert!((d - 2500.0).abs() < 1e-6, "heading {}: {}", heading, d);
        }
    }

    #[test]
    fn heading_east_on_equator() {
        let h = compute_heading(LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0));
        assert!((h - 90.0).abs() < 1e-9);
        let w = compute_heading(LatLng::new(0.0, 1.0), LatLng::new(0.0, 0.0));
        assert!((w + 90.0).abs() < 1e-9);
    }

    #[test]
    fn offset_wraps_antimeridian() {
        let p = compute_offset(LatLng::new(0.0, 179.9999), 1000.0, 90.0);
        assert!(p.lng < -179.0);
    }

    #[test]
    fn wrap_heading_range() {
        assert_eq!(wrap_heading(-5.0), 355.0);
        assert_eq!(wrap_heading(360.0), 0.0);
        assert_eq!(wrap_heading(725.0), 5.0);
        assert!(wrap_heading(-1e-18) < 360.0);
    }

    // ── turns ────────────────────────────────────────────────────────────
    #[test]
    fn turn_left_from_north_wraps() {
        let mut d = Drone::new(HOME, 70.0, TurnProfile::Refined);
        d.turn_left();
        assert_eq!(d.state().heading, 355.0);

        let mut b = Drone::new(HOME, 70.0, TurnProfile::Baseline);
        b.turn_left();
        assert_eq!(b.state().heading, 350.0);
    }

    #[test]
    fn turn_left_then_right_is_identity() {
        for profile in [TurnProfile::Refined, TurnProfile::Baseline] {
            let mut h = 0.0;
            while h < 360.0 {
                let mut d = Drone::new(HOME, 70.0, profile);
                d.state.heading = h;
                d.turn_left();
                d.turn_right();
                assert!(angle_diff(d.state().heading, h) < 1e-9, "{:?} h={}", profile, h);

                d.turn_right();
                d.turn_left();
                assert!(angle_diff(d.state().heading, h) < 1e-9);
                h += 7.3;
            }
        }
    }

    // ── forward / backward ───────────────────────────────────────────────
    #[test]
    fn forward_then_back_returns_to_start() {
        let starts = [HOME, LatLng::new(0.0, 0.0), LatLng::new(-45.0, 120.0), LatLng::new(70.0, -20.0)];
        for start in starts {
            for heading in [0.0, 30.0, 90.0, 200.0, 315.0] {
                let mut d = Drone::new(start, 70.0, TurnProfile::Refined);
                d.state.heading = heading;
                d.move_forward(1.0);
                d.move_forward(-1.0);
                let err = compute_distance(d.state().position, start);
                assert!(err < 0.01, "start {} heading {}: off by {}m", start, heading, err);
            }
        }
    }

    #[test]
    fn backward_is_negative_forward() {
        let mut a = Drone::new(HOME, 70.0, TurnProfile::Refined);
        let mut b = a.clone();
        a.move_backward();
        b.move_forward(-1.0);
        assert_eq!(a.state().position, b.state().position);
        assert!((a.distance_to_home() - 70.0).abs() < 1e-6);
    }

    // ── return home ──────────────────────────────────────────────────────
    #[test]
    fn snap_threshold_has_floor() {
        assert_eq!(Drone::new(HOME, 70.0, TurnProfile::Refined).snap_threshold(), 35.0);
        assert_eq!(Drone::new(HOME, 1.0, TurnProfile::Refined).snap_threshold(), 2.0);
    }

    #[test]
    fn home_steps_decrease_distance_then_snap() {
        let mut d = Drone::new(HOME, 70.0, TurnProfile::Refined);
        d.state.heading = 123.0;
        d.move_forward(15.0);
        d.turn_left();

        let mut last = d.distance_to_home();
        assert!(last > d.snap_threshold());

        let mut ticks = 0;
        loop {
            ticks += 1;
            assert!(ticks < 100, "never arrived");
            match d.home_step() {
                HomeStep::Advanced { distance_before } => {
                    assert!((distance_before - last).abs() < 1e-6);
                    let now = d.distance_to_home();
                    assert!(now < last, "distance grew: {} -> {}", last, now);
                    last = now;
                }
                HomeStep::Arrived => break,
            }
        }

        assert_eq!(d.state().position, HOME);
        assert_eq!(d.state().heading, 0.0);
    }

    #[test]
    fn home_step_final_approach_does_not_overshoot() {
        let mut d = Drone::new(HOME, 70.0, TurnProfile::Refined);
        d.state.heading = 90.0;
        d.move_forward(0.6); // 42 m: beyond the snap radius, inside one step
        match d.home_step() {
            HomeStep::Advanced { .. } => assert!(d.distance_to_home() < 1e-3),
            HomeStep::Arrived => panic!("should have advanced first"),
        }
        assert_eq!(d.home_step(), HomeStep::Arrived);
    }

    #[test]
    fn home_step_at_home_arrives_immediately() {
        let mut d = Drone::new(HOME, 70.0, TurnProfile::Refined);
        d.turn_right();
        assert_eq!(d.home_step(), HomeStep::Arrived);
        assert_eq!(d.state().heading, 0.0);
    }

    #[test]
    fn home_step_recovers_from_non_finite_position() {
        for mult in [f64::NAN, f64::INFINITY] {
            let mut d = Drone::new(HOME, 70.0, TurnProfile::Refined);
            d.move_forward(mult);
            assert_eq!(d.home_step(), HomeStep::Arrived);
            assert_eq!(d.state().position, HOME);
            assert_eq!(d.state().heading, 0.0);
        }
    }

    #[test]
    fn reset_returns_home_facing_north() {
        let mut d = Drone::new(HOME, 70.0, TurnProfile::Baseline);
        d.turn_right();
        d.move_forward(3.0);
        d.reset();
        assert_eq!(d.state().position, HOME);
        assert_eq!(d.state().heading, 0.0);
    }
}
