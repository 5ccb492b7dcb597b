//! Gesture-to-command state machine.
//!
//! `Controller` owns the drone, the control mode and the motion scheduler,
//! and turns one [`GestureLabel`] per frame into kinematics calls.  It has
//! no clock and no window: the run loop feeds it recognitions and the
//! elapsed session time, which keeps every rule here testable.
//!
//! Rules, checked in order for each label:
//!
//! 1. **Enable** switches control on.  Nothing else happens that frame.
//! 2. **Disable** switches control off and stops continuous-forward.
//! 3. **ReturnHome** starts the fly-home task unless it is already running.
//! 4. While disabled nothing else has any effect.
//! 5. **ContinuousForward** starts the auto-forward task.  Any other label
//!    reaching this point stops it again.
//! 6. **Forward / Backward / TurnLeft / TurnRight** run once, but only if the
//!    cooldown since the previous one has passed.

use std::time::Duration;

use drone_kinematics::{Drone, DroneState, HomeStep};
use hand_gesture::{Classifier, GestureLabel, Recognition};
use tracing::{debug, info};

use crate::config::Config;
use crate::scheduler::{MotionKind, MotionScheduler};
use crate::view::DroneView;

// ════════════════════════════════════════════════════════════════════════════
// ControlMode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlMode {
    pub enabled:     bool,
    /// When the last discrete command (or return-home) ran.
    pub last_action: Option<Duration>,
}

impl Default for ControlMode {
    fn default() -> Self {
        ControlMode { enabled: true, last_action: None }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Action — what a label did
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Enabled,
    Disabled,
    ReturnHomeStarted,
    /// Return-home was already flying; the label changed nothing.
    ReturnHomeActive,
    ContinuousForwardStarted,
    ContinuousForwardHeld,
    Executed(GestureLabel),
    /// Dropped by the cooldown.
    CooledDown(GestureLabel),
    /// Control is off, or the label carries no command.
    Ignored,
}

impl Action {
    pub fn describe(&self) -> String {
        match self {
            Action::Enabled                  => "controls ON".to_string(),
            Action::Disabled                 => "controls OFF".to_string(),
            Action::ReturnHomeStarted        => "returning home".to_string(),
            Action::ReturnHomeActive         => "returning home".to_string(),
            Action::ContinuousForwardStarted => "auto forward".to_string(),
            Action::ContinuousForwardHeld    => "auto forward".to_string(),
            Action::Executed(label)          => label.name().to_string(),
            Action::CooledDown(label)        => format!("{} (cooldown)", label.name()),
            Action::Ignored                  => String::new(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Controller
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Controller<V: DroneView> {
    drone:      Drone,
    classifier: Classifier,
    mode:       ControlMode,
    motion:     MotionScheduler,
    cooldown:   Duration,
    view:       V,
}

impl<V: DroneView> Controller<V> {
    pub fn new(cfg: &Config, view: V) -> Self {
        let mut ctl = Controller {
            drone:      Drone::new(cfg.home(), cfg.speed_m, cfg.turn_profile()),
            classifier: Classifier::new(cfg.custom_gestures),
            mode:       ControlMode::default(),
            motion:     MotionScheduler::new(cfg.tick()),
            cooldown:   cfg.cooldown(),
            view,
        };
        ctl.redraw();
        ctl
    }

    // ── per frame ─────────────────────────────────────────────────────────

    /// Classify one recognizer frame, act on it, then run any motion steps
    /// that have come due.
    pub fn process_frame(&mut self, recognition: &Recognition, now: Duration) -> Action {
        let label = self.classifier.classify(recognition);
        if label != GestureLabel::None {
            debug!("gesture: {}", label);
        }
        let action = self.handle_label(label, now);
        self.advance(now);
        action
    }

    /// Apply one label.
    pub fn handle_label(&mut self, label: GestureLabel, now: Duration) -> Action {
        match label {
            GestureLabel::Enable => {
                if !self.mode.enabled { info!("controls enabled"); }
                self.mode.enabled = true;
                return Action::Enabled;
            }
            GestureLabel::Disable => {
                if self.mode.enabled { info!("controls disabled"); }
                self.mode.enabled = false;
                self.motion.cancel_kind(MotionKind::ContinuousForward);
                return Action::Disabled;
            }
            GestureLabel::ReturnHome => {
                if self.motion.is_active(MotionKind::ReturnHome) {
                    return Action::ReturnHomeActive;
                }
                if let Some(prev) = self.motion.start(MotionKind::ReturnHome, now) {
                    info!("{} cancelled by return-home", prev.name());
                }
                info!("returning home from {:.0}m", self.drone.distance_to_home());
                self.mode.last_action = Some(now);
                return Action::ReturnHomeStarted;
            }
            _ => {}
        }

        if !self.mode.enabled {
            return Action::Ignored;
        }

        if label == GestureLabel::ContinuousForward {
            if self.motion.is_active(MotionKind::ContinuousForward) {
                return Action::ContinuousForwardHeld;
            }
            if let Some(prev) = self.motion.start(MotionKind::ContinuousForward, now) {
                info!("{} cancelled by continuous-forward", prev.name());
            }
            return Action::ContinuousForwardStarted;
        }
        if self.motion.cancel_kind(MotionKind::ContinuousForward) {
            debug!("continuous-forward released");
        }

        let command: fn(&mut Drone) = match label {
            GestureLabel::Forward   => |d: &mut Drone| d.move_forward(1.0),
            GestureLabel::Backward  => |d: &mut Drone| d.move_backward(),
            GestureLabel::TurnLeft  => |d: &mut Drone| d.turn_left(),
            GestureLabel::TurnRight => |d: &mut Drone| d.turn_right(),
            _ => return Action::Ignored,
        };

        if let Some(last) = self.mode.last_action {
            if now.saturating_sub(last) < self.cooldown {
                return Action::CooledDown(label);
            }
        }

        command(&mut self.drone);
        self.mode.last_action = Some(now);
        self.redraw();
        Action::Executed(label)
    }

    /// Run every motion step due at `now`.  Returns how many ran.
    pub fn advance(&mut self, now: Duration) -> usize {
        let mut steps = 0;
        while let Some(kind) = self.motion.due(now) {
            match kind {
                MotionKind::ContinuousForward => self.drone.move_forward(1.0),
                MotionKind::ReturnHome => {
                    if self.drone.home_step() == HomeStep::Arrived {
                        self.motion.cancel_kind(MotionKind::ReturnHome);
                        info!("home");
                    }
                }
            }
            self.redraw();
            steps += 1;
        }
        steps
    }

    fn redraw(&mut self) {
        self.view.redraw(self.drone.state());
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn drone(&self)      -> &Drone             { &self.drone }
    pub fn state(&self)      -> &DroneState        { self.drone.state() }
    pub fn mode(&self)       -> ControlMode        { self.mode }
    pub fn motion(&self)     -> Option<MotionKind> { self.motion.active() }
    pub fn view(&self)       -> &V                 { &self.view }
    pub fn view_mut(&mut self) -> &mut V           { &mut self.view }

    pub fn continuous_forward_active(&self) -> bool {
        self.motion.is_active(MotionKind::ContinuousForward)
    }

    pub fn return_home_active(&self) -> bool {
        self.motion.is_active(MotionKind::ReturnHome)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use drone_kinematics::{compute_distance, HOME};
    use hand_gesture::{Handedness, HandPose};

    use crate::view::{LogView, NullView};

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn make() -> Controller<LogView> {
        Controller::new(&Config::default(), LogView::default())
    }

    // ── enable / disable ─────────────────────────────────────────────────
    #[test]
    fn starts_enabled_and_draws_once() {
        let c = make();
        assert!(c.mode().enabled);
        assert_eq!(c.view().redraws, 1);
    }

    #[test]
    fn disabled_ignores_movement() {
        let mut c = make();
        assert_eq!(c.handle_label(GestureLabel::Disable, ms(0)), Action::Disabled);
        assert_eq!(c.handle_label(GestureLabel::Forward, ms(1000)), Action::Ignored);
        assert_eq!(c.handle_label(GestureLabel::ContinuousForward, ms(2000)), Action::Ignored);
        assert_eq!(c.state().position, HOME);
        assert!(!c.continuous_forward_active());
    }

    #[test]
    fn enable_does_not_move() {
        let mut c = make();
        c.handle_label(GestureLabel::Disable, ms(0));
        assert_eq!(c.handle_label(GestureLabel::Enable, ms(10)), Action::Enabled);
        assert!(c.mode().enabled);
        assert_eq!(c.view().redraws, 1);
        assert_eq!(c.handle_label(GestureLabel::Forward, ms(20)), Action::Executed(GestureLabel::Forward));
    }

    #[test]
    fn disable_stops_continuous_forward() {
        let mut c = make();
        c.handle_label(GestureLabel::ContinuousForward, ms(0));
        assert!(c.continuous_forward_active());
        c.handle_label(GestureLabel::Disable, ms(50));
        assert!(!c.continuous_forward_active());
        assert_eq!(c.advance(ms(1000)), 0);
    }

    // ── cooldown ─────────────────────────────────────────────────────────
    #[test]
    fn forwards_inside_cooldown_move_once() {
        let mut c = make();
        assert_eq!(c.handle_label(GestureLabel::Forward, ms(1000)), Action::Executed(GestureLabel::Forward));
        assert_eq!(c.handle_label(GestureLabel::Forward, ms(1399)), Action::CooledDown(GestureLabel::Forward));
        assert_eq!(c.view().redraws, 2);
        assert!((compute_distance(c.state().position, HOME) - 70.0).abs() < 1e-6);
    }

    #[test]
    fn forwards_outside_cooldown_move_twice() {
        let mut c = make();
        c.handle_label(GestureLabel::Forward, ms(1000));
        assert_eq!(c.handle_label(GestureLabel::Forward, ms(1400)), Action::Executed(GestureLabel::Forward));
        assert_eq!(c.view().redraws, 3);
        assert!((compute_distance(c.state().position, HOME) - 140.0).abs() < 1e-6);
    }

    #[test]
    fn cooldown_is_shared_by_discrete_commands() {
        let mut c = make();
        c.handle_label(GestureLabel::TurnRight, ms(0));
        assert_eq!(c.handle_label(GestureLabel::TurnLeft, ms(100)), Action::CooledDown(GestureLabel::TurnLeft));
        assert_eq!(c.state().heading, 5.0);
        c.handle_label(GestureLabel::TurnLeft, ms(500));
        assert_eq!(c.state().heading, 0.0);
    }

    #[test]
    fn first_command_is_never_cooled_down() {
        let mut c = make();
        assert_eq!(c.handle_label(GestureLabel::Backward, ms(0)), Action::Executed(GestureLabel::Backward));
    }

    #[test]
    fn baseline_turns_ten_degrees() {
        let mut c = Controller::new(&Config::default().baseline(), LogView::default());
        c.handle_label(GestureLabel::TurnLeft, ms(0));
        assert_eq!(c.state().heading, 350.0);
    }

    // ── continuous forward ───────────────────────────────────────────────
    #[test]
    fn continuous_forward_steps_until_released() {
        let mut c = make();
        assert_eq!(c.handle_label(GestureLabel::ContinuousForward, ms(0)), Action::ContinuousForwardStarted);
        assert_eq!(c.handle_label(GestureLabel::ContinuousForward, ms(60)), Action::ContinuousForwardHeld);
        assert_eq!(c.advance(ms(360)), 3);
        let travelled = compute_distance(c.state().position, HOME);
        assert!((travelled - 210.0).abs() < 1e-6);

        // label gone → stops where it is, no snap
        c.handle_label(GestureLabel::None, ms(400));
        assert!(!c.continuous_forward_active());
        assert_eq!(c.advance(ms(2000)), 0);
        assert!((compute_distance(c.state().position, HOME) - travelled).abs() < 1e-9);
    }

    #[test]
    fn other_gesture_releases_continuous_forward() {
        let mut c = make();
        c.handle_label(GestureLabel::ContinuousForward, ms(0));
        assert_eq!(c.handle_label(GestureLabel::TurnRight, ms(100)), Action::Executed(GestureLabel::TurnRight));
        assert!(!c.continuous_forward_active());
    }

    #[test]
    fn continuous_forward_does_not_touch_cooldown() {
        let mut c = make();
        c.handle_label(GestureLabel::Forward, ms(0));
        c.handle_label(GestureLabel::ContinuousForward, ms(100));
        // still inside the Forward cooldown
        assert_eq!(c.handle_label(GestureLabel::Forward, ms(200)), Action::CooledDown(GestureLabel::Forward));
        assert!(!c.continuous_forward_active());
    }

    // ── return home ──────────────────────────────────────────────────────
    #[test]
    fn return_home_flies_back_and_stops() {
        let mut c = make();
        c.handle_label(GestureLabel::TurnRight, ms(0));
        c.handle_label(GestureLabel::ContinuousForward, ms(10));
        for i in 1..=10 { c.advance(ms(10 + 120 * i)); }
        assert!(c.drone().distance_to_home() > 600.0);

        let mut now = ms(2000);
        assert_eq!(c.handle_label(GestureLabel::ReturnHome, now), Action::ReturnHomeStarted);
        assert!(!c.continuous_forward_active());

        let mut last = c.drone().distance_to_home();
        for _ in 0..50 {
            now += ms(120);
            c.advance(now);
            if !c.return_home_active() { break; }
            let d = c.drone().distance_to_home();
            assert!(d < last);
            last = d;
        }
        assert!(!c.return_home_active());
        assert_eq!(c.state().position, HOME);
        assert_eq!(c.state().heading, 0.0);
    }

    #[test]
    fn return_home_is_not_restarted() {
        let mut c = make();
        c.handle_label(GestureLabel::Forward, ms(0));
        c.handle_label(GestureLabel::ReturnHome, ms(500));
        let due = c.motion.task().unwrap().next_due();
        assert_eq!(c.handle_label(GestureLabel::ReturnHome, ms(560)), Action::ReturnHomeActive);
        assert_eq!(c.motion.task().unwrap().next_due(), due);
    }

    #[test]
    fn return_home_works_while_disabled() {
        let mut c = make();
        c.handle_label(GestureLabel::Backward, ms(0));
        c.handle_label(GestureLabel::Disable, ms(10));
        assert_eq!(c.handle_label(GestureLabel::ReturnHome, ms(20)), Action::ReturnHomeStarted);
        assert_eq!(c.advance(ms(260)), 2);
        assert_eq!(c.state().position, HOME);
    }

    #[test]
    fn disable_does_not_stop_return_home() {
        let mut c = make();
        for t in [0, 500, 1000] { c.handle_label(GestureLabel::Forward, ms(t)); }
        c.handle_label(GestureLabel::ReturnHome, ms(1500));
        c.advance(ms(1620));
        let before = c.drone().distance_to_home();
        assert!((before - 140.0).abs() < 0.01, "{}", before);

        assert_eq!(c.handle_label(GestureLabel::Disable, ms(1700)), Action::Disabled);
        assert!(c.return_home_active());
        assert!(!c.mode().enabled);

        c.advance(ms(1740));
        assert!(c.drone().distance_to_home() < before);
        for t in (1860..=2400).step_by(120) { c.advance(ms(t)); }
        assert!(!c.return_home_active());
        assert_eq!(c.state().position, HOME);
    }

    #[test]
    fn stalled_loop_does_not_replay_missed_steps() {
        let mut c = make();
        c.handle_label(GestureLabel::ContinuousForward, ms(0));
        assert_eq!(c.advance(ms(5000)), 1);
        assert!((c.drone().distance_to_home() - 70.0).abs() < 1e-6);
    }

    #[test]
    fn return_home_starts_cooldown() {
        let mut c = make();
        c.handle_label(GestureLabel::ReturnHome, ms(1000));
        assert_eq!(c.handle_label(GestureLabel::Forward, ms(1100)), Action::CooledDown(GestureLabel::Forward));
    }

    #[test]
    fn continuous_forward_replaces_return_home() {
        let mut c = make();
        c.handle_label(GestureLabel::Forward, ms(0));
        c.handle_label(GestureLabel::ReturnHome, ms(500));
        c.handle_label(GestureLabel::ContinuousForward, ms(510));
        assert!(c.continuous_forward_active());
        assert!(!c.return_home_active());
    }

    // ── whole frames ─────────────────────────────────────────────────────
    #[test]
    fn process_frame_classifies_and_acts() {
        let mut c = make();
        let a = c.process_frame(&Recognition::category("Thumb_Up"), ms(0));
        assert_eq!(a, Action::Executed(GestureLabel::Forward));

        let shaka = Recognition::landmarks_only(HandPose::SHAKA.frame(Handedness::Right));
        assert_eq!(c.process_frame(&shaka, ms(100)), Action::ReturnHomeStarted);
        c.process_frame(&Recognition::empty(), ms(500));
        assert_eq!(c.state().position, HOME);
    }

    #[test]
    fn empty_frame_releases_continuous_forward() {
        let mut c = make();
        c.process_frame(&Recognition::category("Pointing_Up"), ms(0));
        c.process_frame(&Recognition::category("Pointing_Up"), ms(130));
        let moved = c.drone().distance_to_home();
        assert!((moved - 70.0).abs() < 1e-6);
        assert_eq!(c.process_frame(&Recognition::empty(), ms(200)), Action::Ignored);
        assert!(!c.continuous_forward_active());
    }

    #[test]
    fn unknown_category_is_silent() {
        let mut c = make();
        assert_eq!(c.process_frame(&Recognition::category("Spock"), ms(0)), Action::Ignored);
        assert_eq!(c.view().redraws, 1);
    }

    #[test]
    fn runs_behind_a_boxed_null_view() {
        let view: Box<dyn DroneView> = Box::new(NullView);
        let mut c = Controller::new(&Config::default(), view);
        assert_eq!(c.handle_label(GestureLabel::TurnRight, ms(0)), Action::Executed(GestureLabel::TurnRight));
        assert_eq!(c.state().heading, 5.0);
    }
}
