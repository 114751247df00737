//! Text dashboard.
//!
//! Draws a top-down view of the car with the surrounding traffic, lights,
//! turn signals and lane warnings. No terminal control codes are emitted;
//! callers decide whether to clear the screen between frames.

use alset_core::{DisplaySnapshot, Headlight, LaneWarning};
use alset_env::Gear;

const ROAD: &str = "|                    |";
const MARGIN: &str = "                          ";

fn gear_label(gear: Gear) -> &'static str {
    match gear {
        Gear::Park => "[P]ark",
        Gear::Reverse => "[R]everse",
        Gear::Neutral => "[N]eutral",
        Gear::Drive => "[D]rive",
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn road_line(out: &mut String, left: &str, body: &str, right: &str) {
    let text = format!("{:>width$}{}{}", left, body, right, width = MARGIN.len());
    line(out, &text);
}

/// Renders one snapshot as a multi-line string.
pub fn dashboard(snapshot: &DisplaySnapshot) -> String {
    let mut out = String::new();

    line(&mut out, &format!("{}      {} mph", MARGIN, snapshot.speed));
    line(&mut out, &format!("{}      {}", MARGIN, gear_label(snapshot.gear)));
    line(&mut out, "");

    let ahead = if snapshot.cars_in_front { "|      CAR HERE      |" } else { ROAD };
    road_line(&mut out, "", ahead, "");

    match snapshot.lane_warning {
        LaneWarning::Left => road_line(&mut out, "LANE WARNING ", ROAD, ""),
        LaneWarning::Right => road_line(&mut out, "", ROAD, " LANE WARNING"),
        LaneWarning::None => road_line(&mut out, "", ROAD, ""),
    }

    let high = snapshot.headlights == Headlight::High;
    road_line(&mut out, "", if high { "|     \\   / \\   /    |" } else { ROAD }, "");
    let lit = snapshot.headlights.is_on();
    road_line(&mut out, "", if lit { "|      \\ /   \\ /     |" } else { ROAD }, "");

    road_line(&mut out, "", "|      --------      |", "");
    road_line(&mut out, "", "|    (|        |)    |", "");

    let signal = if snapshot.left_turn {
        "| <-- |        |     |"
    } else if snapshot.right_turn {
        "|     |        | --> |"
    } else {
        "|     |        |     |"
    };
    road_line(&mut out, "", signal, "");

    for word in ["CAR ", "HERE "] {
        let left = if snapshot.cars_left { word } else { "" };
        let right = if snapshot.cars_right { word.trim_end() } else { "" };
        let right = if right.is_empty() { String::new() } else { format!(" {}", right) };
        road_line(&mut out, left, "|     |        |     |", &right);
    }

    road_line(&mut out, "", "|    (|        |)    |", "");
    road_line(&mut out, "", "|      --------      |", "");
    road_line(&mut out, "", ROAD, "");

    let behind = if snapshot.cars_behind { "|      CAR HERE      |" } else { ROAD };
    road_line(&mut out, "", behind, "");
    road_line(&mut out, "", ROAD, "");

    let lane = format!("lane {}/{}", snapshot.lane, snapshot.lane_count);
    road_line(&mut out, "", &format!("|{:^20}|", lane), "");
    line(&mut out, "");

    let mut status = Vec::new();
    if snapshot.cruise_control {
        status.push("Cruise Control Active");
    }
    if snapshot.wipers {
        status.push("Wipers on");
    }
    if !status.is_empty() {
        line(&mut out, &format!("{}{}", MARGIN, status.join("  ")));
    }

    if snapshot.rear_camera {
        let view = if snapshot.cars_behind { "|      CAR HERE      |" } else { ROAD };
        line(&mut out, &format!("{} --------------------", MARGIN));
        line(&mut out, &format!("{}|  Rear View Camera  |", MARGIN));
        line(&mut out, &format!("{}{}", MARGIN, view));
        line(&mut out, &format!("{} --------------------", MARGIN));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alset_core::{ControlLoop, VehicleState};

    #[test]
    fn test_default_dashboard() {
        let text = dashboard(&ControlLoop::default().snapshot());

        assert!(text.contains("60 mph"));
        assert!(text.contains("[D]rive"));
        assert!(text.contains("lane 2/4"));
        assert!(text.contains("Cruise Control Active"));
        assert!(!text.contains("CAR HERE"));
        assert!(!text.contains("Rear View Camera"));
    }

    #[test]
    fn test_warning_and_traffic() {
        let mut state = VehicleState::default();
        state.perception.distance_front = 30.0;
        state.perception.object_left = true;
        state.blocked_lane_change = Some(alset_env::Side::Left);

        let text = dashboard(&DisplaySnapshot::project(&state));

        assert!(text.contains("LANE WARNING |"));
        assert!(text.contains("CAR |"));
        assert_eq!(text.matches("CAR HERE").count(), 1);
    }

    #[test]
    fn test_rear_camera_view() {
        let mut state = VehicleState::default();
        state.actuation.gear = Gear::Reverse;
        state.motion.velocity = -5.0;
        state.perception.distance_behind = 10.0;

        let text = dashboard(&DisplaySnapshot::project(&state));

        assert!(text.contains("[R]everse"));
        assert!(text.contains("Rear View Camera"));
        // Behind the car and on the camera
        assert_eq!(text.matches("CAR HERE").count(), 2);
    }
}
