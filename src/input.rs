//! Keyboard intent mapping
//!
//! Arrow keys and WASD queue a direction; space toggles pause.

use crate::sim::{Direction, TickInput};

/// Translate a `KeyboardEvent.key` value into an input intent
pub fn map_key(key: &str) -> Option<TickInput> {
    let direction = match key {
        "ArrowUp" | "w" | "W" => Direction::Up,
        "ArrowDown" | "s" | "S" => Direction::Down,
        "ArrowLeft" | "a" | "A" => Direction::Left,
        "ArrowRight" | "d" | "D" => Direction::Right,
        " " | "Spacebar" => {
            return Some(TickInput {
                direction: None,
                pause: true,
            });
        }
        _ => return None,
    };

    Some(TickInput {
        direction: Some(direction),
        pause: false,
    })
}
