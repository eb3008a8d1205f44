//! Shell service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for bridging a host
//! shell: querying ambient state (pointer, scene, focus), issuing activation
//! requests, and pumping overview/motion signals into the hub. It MUST NOT
//! decide which window gets activated or when; that decision belongs
//! exclusively to `services::hover_tracker`.

mod dbus;
mod emulated;
mod r#trait;

pub use self::r#trait::{create_shell, ShellEventSource, ShellHost};
