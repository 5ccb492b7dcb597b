//! Flies a square, then returns home one tick at a time.

use drone_kinematics::{Drone, HomeStep, TurnProfile, HOME};

fn main() {
    println!("\n=== Drone Kinematics Demo ===\n");

    // ── 1. A square, 3 steps per side ─────────────────────────────────────
    println!("1. Square, 3 × 70m per side (refined, 18 turns = 90°)");
    let mut drone = Drone::new(HOME, 70.0, TurnProfile::Refined);
    for side in 0..4 {
        for _ in 0..3 { drone.move_forward(1.0); }
        for _ in 0..18 { drone.turn_right(); }
        println!("   side {}: {}", side + 1, drone.state());
    }
    println!("   closed loop error: {:.3}m\n", drone.distance_to_home());

    // ── 2. Wander off, then fly home ──────────────────────────────────────
    println!("2. Out 1 km at 40°, then return home");
    let mut drone = Drone::new(HOME, 70.0, TurnProfile::Baseline);
    for _ in 0..4 { drone.turn_right(); }
    drone.move_forward(1000.0 / 70.0);
    println!("   start: {}  ({:.1}m from home)", drone.state(), drone.distance_to_home());

    let mut tick = 0;
    loop {
        tick += 1;
        match drone.home_step() {
            HomeStep::Advanced { distance_before } =>
                println!("   tick {:>2}: {:>7.1}m → {:>7.1}m  heading {:.1}°",
                         tick, distance_before, drone.distance_to_home(), drone.state().heading),
            HomeStep::Arrived => {
                println!("   tick {:>2}: snapped home  {}", tick, drone.state());
                break;
            }
        }
    }
    println!();
}
