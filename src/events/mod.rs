pub mod overview;
pub mod pointer;

pub use overview::{EventTime, OverviewEvent, OverviewPhase};
pub use pointer::{MotionEvent, PointerPosition};
