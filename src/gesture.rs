//! Gesture Interpreter: turns a vertical drag on the panel handle into a
//! discrete swipe intent. Drags shorter than the threshold fall through to
//! the underlying scroll.

use serde::{Deserialize, Serialize};

use crate::SWIPE_THRESHOLD_PX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Up,
    Down,
}

#[must_use]
pub fn interpret_vertical_drag(start_y: f64, end_y: f64) -> Option<SwipeDirection> {
    if !start_y.is_finite() || !end_y.is_finite() {
        return None;
    }
    let distance = start_y - end_y;
    if distance > SWIPE_THRESHOLD_PX {
        Some(SwipeDirection::Up)
    } else if distance < -SWIPE_THRESHOLD_PX {
        Some(SwipeDirection::Down)
    } else {
        None
    }
}
