//! Interactive drone menu: fly the drone by hand and watch the coordinates.

use drone_kinematics::{Drone, HomeStep, TurnProfile, DEFAULT_SPEED_M, HOME};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Drone Kinematics Explorer                   ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let profile = pick_profile();
    let speed: f64 = read_line(&format!("  Step length in meters (default {}): ", DEFAULT_SPEED_M))
        .trim().parse().unwrap_or(DEFAULT_SPEED_M);
    let speed = if speed > 0.0 { speed } else { DEFAULT_SPEED_M };

    let mut drone = Drone::new(HOME, speed, profile);
    println!("\n  ✓  {}\n", drone.state());

    loop {
        print_ops_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "w" => {
                let n = read_line("  Multiplier (default 1): ")
                    .trim().parse::<f64>().ok()
                    .filter(|n| n.is_finite())
                    .unwrap_or(1.0);
                drone.move_forward(n);
            }
            "s" => drone.move_backward(),
            "a" => drone.turn_left(),
            "d" => drone.turn_right(),
            "h" => match drone.home_step() {
                HomeStep::Arrived => println!("  Home."),
                HomeStep::Advanced { distance_before } =>
                    println!("  Stepped home from {:.1}m away.", distance_before),
            },
            "f" => {
                let mut ticks = 0usize;
                while let HomeStep::Advanced { .. } = drone.home_step() {
                    ticks += 1;
                }
                println!("  Landed home after {} steps.", ticks + 1);
            }
            "r" => drone.reset(),
            "q" | "quit" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => {
                println!("  ⚠  Unknown command.\n");
                continue;
            }
        }
        println!("  {}  home in {:.1}m\n", drone.state(), drone.distance_to_home());
    }
}

fn print_ops_menu() {
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  w. Forward ×N      a. Turn left     h. One home step   │");
    println!("  │  s. Backward        d. Turn right    f. Fly all the way │");
    println!("  │  r. Reset to home                    q. Quit            │");
    println!("  └─────────────────────────────────────────────────────────┘");
}

fn pick_profile() -> TurnProfile {
    println!("  Turn step:  1. 5° (refined)  2. 10° (baseline)");
    match read_line("  Choice (default 1): ").trim() {
        "2" => TurnProfile::Baseline,
        _   => TurnProfile::Refined,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
