use crate::config::Config;
use crate::error::{HoverError, Result};
use crate::events::{EventTime, PointerPosition};
use crate::scene::{ActorRef, PickMode, Window};
use crate::services::SignalHub;
use std::sync::Arc;
use tracing::info;

/// ShellHost: ambient host state behind an explicit seam.
///
/// Everything the tracker asks of a live shell goes through this trait, so
/// the tracker is constructible and testable without one. Every query is
/// fallible; callers degrade failures to "no window here" rather than
/// propagating them.
#[async_trait::async_trait]
pub trait ShellHost: Send + Sync {
    /// Текущая позиция курсора в координатах сцены
    async fn pointer_position(&self) -> Result<PointerPosition>;

    /// Hit-тест сцены: верхний актор в точке или ничего
    async fn actor_at(&self, pos: PointerPosition, mode: PickMode) -> Result<Option<ActorRef>>;

    /// Окно, которое хост считает сфокусированным
    async fn focused_window(&self) -> Result<Option<Window>>;

    /// Текущая серверная метка времени событий
    async fn current_event_time(&self) -> EventTime;

    /// Поднять и сфокусировать окно
    async fn activate(&self, window: &Window, time: EventTime) -> Result<()>;
}

/// Trait for shell event sources that can run in different modes
#[async_trait::async_trait]
pub trait ShellEventSource {
    /// Pump host signals into the hub until shutdown
    async fn run(self: Box<Self>) -> Result<()>;
}

/// Factory function to create the shell backend pair based on the dry_run flag
pub async fn create_shell(
    config: Arc<Config>,
    hub: Arc<SignalHub>,
    dry_run: bool,
) -> Result<(Arc<dyn ShellHost>, Box<dyn ShellEventSource + Send>)> {
    if dry_run {
        info!("Режим сухого запуска - используем эмулированную оболочку");
        return Ok(super::emulated::EmulatedShell::create(config, hub));
    }

    match config.shell.mode.as_str() {
        "emulated" => Ok(super::emulated::EmulatedShell::create(config, hub)),
        "dbus" => super::dbus::DbusShell::connect(config, hub).await,
        other => Err(HoverError::Internal(format!(
            "Неизвестный режим оболочки: {}",
            other
        ))),
    }
}
