use serde::{Deserialize, Serialize};
use std::fmt;

/// Фаза жизненного цикла обзора окон
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverviewPhase {
    /// Обзор полностью показан, отслеживание курсора активно
    Shown,
    /// Обзор начал закрываться - момент принятия решения об активации
    Hiding,
    /// Обзор полностью скрыт
    Hidden,
}

impl OverviewPhase {
    /// Декодировать фазу из проводного представления (сигнал SceneProbe)
    pub fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(OverviewPhase::Shown),
            1 => Some(OverviewPhase::Hiding),
            2 => Some(OverviewPhase::Hidden),
            _ => None,
        }
    }
}

impl fmt::Display for OverviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverviewPhase::Shown => "shown",
            OverviewPhase::Hiding => "hiding",
            OverviewPhase::Hidden => "hidden",
        };
        write!(f, "{}", name)
    }
}

/// Серверная метка времени события (в духе X11/Clutter, миллисекунды)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTime(pub u32);

impl EventTime {
    #[allow(dead_code)]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

/// Событие жизненного цикла обзора
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewEvent {
    pub phase: OverviewPhase,
    pub event_time: EventTime,
    pub received_at: std::time::Instant,
}

impl OverviewEvent {
    pub fn new(phase: OverviewPhase, event_time: EventTime) -> Self {
        Self {
            phase,
            event_time,
            received_at: std::time::Instant::now(),
        }
    }

    #[allow(dead_code)]
    pub fn shown(event_time: EventTime) -> Self {
        Self::new(OverviewPhase::Shown, event_time)
    }

    #[allow(dead_code)]
    pub fn hiding(event_time: EventTime) -> Self {
        Self::new(OverviewPhase::Hiding, event_time)
    }

    #[allow(dead_code)]
    pub fn hidden(event_time: EventTime) -> Self {
        Self::new(OverviewPhase::Hidden, event_time)
    }
}

impl fmt::Display for OverviewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "overview {} [{}] ({}ms ago)",
            self.phase,
            self.event_time,
            self.received_at.elapsed().as_millis()
        )
    }
}
