//! HoverTracker service: responsibility and boundaries
//!
//! This module is responsible ONLY for the hover-selection state machine:
//! remembering which window sits under the pointer while the overview is
//! visible, and deciding at the hiding edge whether that window gets
//! activated. It MUST NOT know how signals are produced or how the scene
//! is queried; both arrive through `SignalHub` and the injected
//! `ShellHost`. Resolution priority lives in `scene::resolve`, not here.

mod tracker;

pub use tracker::HoverTracker;
