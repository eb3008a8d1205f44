use serde::{Deserialize, Serialize};
use std::fmt;

use super::overview::EventTime;

/// Позиция курсора в координатах сцены
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Сдвинулся ли курсор относительно предыдущей позиции
    pub fn moved_from(&self, other: &PointerPosition) -> bool {
        self.x != other.x || self.y != other.y
    }
}

impl fmt::Display for PointerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Событие движения курсора
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    pub position: PointerPosition,
    pub event_time: EventTime,
    pub received_at: std::time::Instant,
}

impl MotionEvent {
    pub fn new(position: PointerPosition, event_time: EventTime) -> Self {
        Self {
            position,
            event_time,
            received_at: std::time::Instant::now(),
        }
    }
}

impl fmt::Display for MotionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "motion {} [{}] ({}ms ago)",
            self.position,
            self.event_time,
            self.received_at.elapsed().as_millis()
        )
    }
}
