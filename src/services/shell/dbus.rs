use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::{HoverError, Result};
use crate::events::{EventTime, MotionEvent, OverviewEvent, OverviewPhase, PointerPosition};
use crate::hover_error;
use crate::scene::{ActorRef, DelegateRef, PickMode, SceneActor, Window, WindowDelegate};
use crate::scene::actor::ActorId;
use crate::services::SignalHub;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;
use tokio::time::{interval, sleep, Duration};
use tracing::{info, warn};
use zbus::zvariant::Type;
use zbus::{proxy, Connection};

use super::r#trait::{ShellEventSource, ShellHost};

/// Окно в проводном представлении SceneProbe; id 0 означает отсутствие
type WireWindow = (u64, String);

fn wire_window(raw: &WireWindow) -> Option<Window> {
    let (id, title) = raw;
    if *id == 0 {
        None
    } else {
        Some(Window::new(*id, title.clone()))
    }
}

/// Запись актора в цепочке предков, материализованной одним вызовом probe.
/// Каждая проба разрешения передаётся отдельным полем, чтобы приоритетный
/// порядок оставался на нашей стороне.
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
pub struct ActorRecord {
    pub id: u64,
    pub name: String,
    pub window_field: WireWindow,
    pub window_accessor: WireWindow,
    pub source_window_field: WireWindow,
    pub source_window_accessor: WireWindow,
    pub delegate_window_field: WireWindow,
    pub delegate_window_accessor: WireWindow,
}

#[proxy(
    interface = "org.gnome.Shell.Extensions.SceneProbe",
    default_service = "org.gnome.Shell",
    default_path = "/org/gnome/Shell/Extensions/SceneProbe"
)]
trait SceneProbe {
    async fn pointer_position(&self) -> zbus::Result<(f64, f64)>;

    /// Цепочка предков от задетого актора к корню; пустой список - промах
    async fn pick_chain_at(
        &self,
        x: f64,
        y: f64,
        reactive_only: bool,
    ) -> zbus::Result<Vec<ActorRecord>>;

    async fn focused_window(&self) -> zbus::Result<WireWindow>;

    async fn current_event_time(&self) -> zbus::Result<u32>;

    async fn activate_window(&self, window: u64, event_time: u32) -> zbus::Result<()>;

    #[zbus(signal)]
    fn overview_state(&self, phase: u8, event_time: u32) -> zbus::Result<()>;
}

type ActorChain = Arc<SmallVec<[ActorRecord; 8]>>;

/// Актор поверх материализованной цепочки; parent - следующая запись
struct ChainActor {
    chain: ActorChain,
    index: usize,
}

impl ChainActor {
    fn record(&self) -> &ActorRecord {
        &self.chain[self.index]
    }
}

impl SceneActor for ChainActor {
    fn id(&self) -> ActorId {
        ActorId(self.record().id)
    }

    fn parent(&self) -> Option<ActorRef> {
        if self.index + 1 < self.chain.len() {
            Some(Arc::new(ChainActor {
                chain: self.chain.clone(),
                index: self.index + 1,
            }))
        } else {
            None
        }
    }

    fn window_field(&self) -> Option<Window> {
        wire_window(&self.record().window_field)
    }

    fn window_accessor(&self) -> Option<Window> {
        wire_window(&self.record().window_accessor)
    }

    fn clone_source(&self) -> Option<ActorRef> {
        let record = self.record();
        let field = wire_window(&record.source_window_field);
        let accessor = wire_window(&record.source_window_accessor);
        if field.is_none() && accessor.is_none() {
            return None;
        }
        Some(Arc::new(SourceActor {
            id: record.id,
            window_field: field,
            window_accessor: accessor,
        }))
    }

    fn delegate(&self) -> Option<DelegateRef> {
        let record = self.record();
        let field = wire_window(&record.delegate_window_field);
        let accessor = wire_window(&record.delegate_window_accessor);
        if field.is_none() && accessor.is_none() {
            return None;
        }
        Some(Arc::new(ChainDelegate {
            window_field: field,
            window_accessor: accessor,
        }))
    }
}

/// Актор-источник копии; через провод приходят только его окна
struct SourceActor {
    id: u64,
    window_field: Option<Window>,
    window_accessor: Option<Window>,
}

impl SceneActor for SourceActor {
    fn id(&self) -> ActorId {
        ActorId(self.id)
    }

    fn parent(&self) -> Option<ActorRef> {
        None
    }

    fn window_field(&self) -> Option<Window> {
        self.window_field.clone()
    }

    fn window_accessor(&self) -> Option<Window> {
        self.window_accessor.clone()
    }

    fn clone_source(&self) -> Option<ActorRef> {
        None
    }

    fn delegate(&self) -> Option<DelegateRef> {
        None
    }
}

struct ChainDelegate {
    window_field: Option<Window>,
    window_accessor: Option<Window>,
}

impl WindowDelegate for ChainDelegate {
    fn window_field(&self) -> Option<Window> {
        self.window_field.clone()
    }

    fn window_accessor(&self) -> Option<Window> {
        self.window_accessor.clone()
    }
}

/// Оболочка за SceneProbe на сессионной шине
pub struct DbusShell {
    proxy: SceneProbeProxy<'static>,
}

impl DbusShell {
    pub async fn connect(
        config: Arc<Config>,
        hub: Arc<SignalHub>,
    ) -> Result<(Arc<dyn ShellHost>, Box<dyn ShellEventSource + Send>)> {
        info!(
            "Подключение к SceneProbe: {} {}",
            config.shell.bus_name, config.shell.object_path
        );

        let connection = Connection::session().await.map_err(HoverError::DBus)?;

        let proxy = SceneProbeProxy::builder(&connection)
            .destination(config.shell.bus_name.clone())?
            .path(config.shell.object_path.clone())?
            .build()
            .await?;

        let shell = Arc::new(DbusShell { proxy });
        let pump = Box::new(DbusPump {
            shell: shell.clone(),
            config,
            hub,
        });

        Ok((shell, pump))
    }
}

#[async_trait::async_trait]
impl ShellHost for DbusShell {
    async fn pointer_position(&self) -> Result<PointerPosition> {
        let (x, y) = self.proxy.pointer_position().await?;
        Ok(PointerPosition::new(x, y))
    }

    async fn actor_at(&self, pos: PointerPosition, mode: PickMode) -> Result<Option<ActorRef>> {
        let reactive_only = matches!(mode, PickMode::Reactive);
        let records = self
            .proxy
            .pick_chain_at(pos.x, pos.y, reactive_only)
            .await?;

        if records.is_empty() {
            return Ok(None);
        }

        debug_if_enabled!(
            "Hit-тест вернул цепочку из {} акторов, верхний: {}",
            records.len(),
            records[0].name
        );

        let chain: ActorChain = Arc::new(SmallVec::from_vec(records));
        Ok(Some(Arc::new(ChainActor { chain, index: 0 })))
    }

    async fn focused_window(&self) -> Result<Option<Window>> {
        let raw = self.proxy.focused_window().await?;
        Ok(wire_window(&raw))
    }

    async fn current_event_time(&self) -> EventTime {
        match self.proxy.current_event_time().await {
            Ok(raw) => EventTime::new(raw),
            Err(e) => {
                debug_if_enabled!("Метка времени недоступна: {}", e);
                EventTime::default()
            }
        }
    }

    async fn activate(&self, window: &Window, time: EventTime) -> Result<()> {
        self.proxy
            .activate_window(window.id().value(), time.value())
            .await?;
        info!("Запрошена активация окна {} [{}]", window, time);
        Ok(())
    }
}

/// Источник событий: сигналы обзора + опрос позиции курсора
struct DbusPump {
    shell: Arc<DbusShell>,
    config: Arc<Config>,
    hub: Arc<SignalHub>,
}

#[async_trait::async_trait]
impl ShellEventSource for DbusPump {
    async fn run(self: Box<Self>) -> Result<()> {
        let mut states = self.shell.proxy.receive_overview_state().await?;
        let mut poll = interval(Duration::from_millis(
            self.config.shell.pointer_poll_interval_ms,
        ));

        info!(
            "Источник событий D-Bus запущен, опрос курсора каждые {}мс",
            self.config.shell.pointer_poll_interval_ms
        );

        let mut visible = false;
        let mut last_pos: Option<PointerPosition> = None;

        loop {
            tokio::select! {
                maybe_signal = states.next() => {
                    let Some(signal) = maybe_signal else {
                        return Err(hover_error!(channel, "Поток сигналов обзора завершился"));
                    };

                    let args = match signal.args() {
                        Ok(args) => args,
                        Err(e) => {
                            warn!("Не удалось разобрать сигнал обзора: {}", e);
                            continue;
                        }
                    };

                    let Some(phase) = OverviewPhase::from_wire(args.phase) else {
                        warn!("Неизвестная фаза обзора: {}", args.phase);
                        continue;
                    };

                    visible = matches!(phase, OverviewPhase::Shown);
                    if visible {
                        last_pos = None;
                    }

                    debug_if_enabled!("Сигнал обзора: {}", phase);
                    self.hub
                        .publish(&OverviewEvent::new(phase, EventTime::new(args.event_time)));
                }
                _ = poll.tick(), if visible => {
                    match self.shell.proxy.pointer_position().await {
                        Ok((x, y)) => {
                            let pos = PointerPosition::new(x, y);
                            if last_pos.map_or(true, |prev| pos.moved_from(&prev)) {
                                last_pos = Some(pos);
                                let time = self.shell.current_event_time().await;
                                self.hub.publish(&MotionEvent::new(pos, time));
                            }
                        }
                        Err(e) => {
                            warn!("Опрос позиции курсора не удался: {}", e);
                            sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::resolve_window;

    fn none_window() -> WireWindow {
        (0, String::new())
    }

    fn record(id: u64) -> ActorRecord {
        ActorRecord {
            id,
            name: format!("actor-{}", id),
            window_field: none_window(),
            window_accessor: none_window(),
            source_window_field: none_window(),
            source_window_accessor: none_window(),
            delegate_window_field: none_window(),
            delegate_window_accessor: none_window(),
        }
    }

    fn chain_actor(records: Vec<ActorRecord>) -> ActorRef {
        Arc::new(ChainActor {
            chain: Arc::new(SmallVec::from_vec(records)),
            index: 0,
        })
    }

    #[test]
    fn test_wire_window_zero_is_absent() {
        assert_eq!(wire_window(&(0, "ignored".to_string())), None);
        assert_eq!(
            wire_window(&(5, "Terminal".to_string())),
            Some(Window::new(5, "Terminal"))
        );
    }

    #[test]
    fn test_chain_walks_to_ancestor_delegate() {
        // Задетый актор пуст, окно у делегата второго предка
        let mut grandparent = record(3);
        grandparent.delegate_window_accessor = (9, "Chat".to_string());

        let actor = chain_actor(vec![record(1), record(2), grandparent]);
        assert_eq!(resolve_window(actor), Some(Window::new(9, "Chat")));
    }

    #[test]
    fn test_chain_source_resolves_before_delegate() {
        let mut hit = record(1);
        hit.source_window_field = (4, "Editor".to_string());
        hit.delegate_window_field = (5, "Wrong".to_string());

        let actor = chain_actor(vec![hit]);
        assert_eq!(resolve_window(actor), Some(Window::new(4, "Editor")));
    }

    #[test]
    fn test_empty_capabilities_resolve_nothing() {
        let actor = chain_actor(vec![record(1), record(2)]);
        assert_eq!(resolve_window(actor), None);
    }
}
