//! Scene module: responsibility and boundaries
//!
//! This module owns the host-agnostic view of the shell's scene graph:
//! opaque window handles, the polymorphic actor abstraction with its four
//! window-extraction capabilities, and the resolution walk that turns a
//! hit actor into a window. It also ships an in-memory stage tree used by
//! the emulated shell backend and by core tests. It MUST NOT talk to any
//! live host: hit-testing against a real compositor belongs to the shell
//! backends in `services::shell`.

pub mod actor;
pub mod resolve;
pub mod tree;

pub use actor::{ActorRef, DelegateRef, PickMode, SceneActor, Window, WindowDelegate};
pub use resolve::resolve_window;
pub use tree::{Rect, StageActor, StageDelegate, StageTree};
