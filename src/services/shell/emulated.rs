use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{EventTime, MotionEvent, OverviewEvent, PointerPosition};
use crate::scene::{ActorRef, PickMode, Rect, StageActor, StageDelegate, StageTree, Window};
use crate::services::SignalHub;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::time::{interval, sleep, Duration};
use tracing::info;

use super::r#trait::{ShellEventSource, ShellHost};

/// Маршрут курсора по эмулированному обзору: терминал, промежуток между
/// плитками (окно не находится - липкая семантика), браузер, редактор,
/// и финальная остановка над браузером
static GLIDE_PATH: Lazy<Vec<PointerPosition>> = Lazy::new(|| {
    vec![
        PointerPosition::new(250.0, 450.0),
        PointerPosition::new(420.0, 450.0),
        PointerPosition::new(580.0, 450.0),
        PointerPosition::new(850.0, 430.0),
        PointerPosition::new(1400.0, 440.0),
        PointerPosition::new(1550.0, 500.0),
        PointerPosition::new(860.0, 460.0),
    ]
});

fn emulated_windows() -> Vec<Window> {
    vec![
        Window::new(1, "Terminal - emulated"),
        Window::new(2, "Browser - emulated"),
        Window::new(3, "Editor - emulated"),
    ]
}

/// Построить сцену обзора: три превью окон, каждое хранит окно одним из
/// способов, которые умеет разрешение (копия, делегат, прямое поле)
fn build_overview_stage(windows: &[Window]) -> StageTree {
    let tree = StageTree::new(1920.0, 1080.0);

    // Превью терминала - визуальная копия актора окна
    let window_actor = StageActor::new("window-actor")
        .with_window_accessor(windows[0].clone())
        .attach(tree.root());
    StageActor::new("workspace-clone")
        .with_bounds(Rect::new(100.0, 300.0, 400.0, 300.0))
        .with_source(window_actor)
        .attach(tree.root());

    // Превью браузера - составной виджет: окно знает только делегат,
    // курсор при этом задевает вложенную подпись
    let browser_tile = StageActor::new("window-preview")
        .with_bounds(Rect::new(700.0, 300.0, 400.0, 300.0))
        .with_delegate(StageDelegate::with_accessor(windows[1].clone()))
        .attach(tree.root());
    StageActor::new("title-label")
        .with_bounds(Rect::new(750.0, 320.0, 300.0, 40.0))
        .attach(browser_tile);

    // Превью редактора - окно прямо в акторе
    StageActor::new("window-tile")
        .with_bounds(Rect::new(1300.0, 300.0, 400.0, 300.0))
        .with_window_field(windows[2].clone())
        .attach(tree.root());

    tree
}

struct EmulatedState {
    tree: StageTree,
    pointer: RwLock<PointerPosition>,
    focused: RwLock<Option<Window>>,
    clock: AtomicU32,
}

impl EmulatedState {
    fn next_time(&self) -> EventTime {
        EventTime::new(self.clock.fetch_add(1, Ordering::Relaxed))
    }
}

/// Эмулированная оболочка: собственная сцена и скриптованные циклы обзора
pub struct EmulatedShell {
    state: Arc<EmulatedState>,
}

impl EmulatedShell {
    pub fn create(
        config: Arc<Config>,
        hub: Arc<SignalHub>,
    ) -> (Arc<dyn ShellHost>, Box<dyn ShellEventSource + Send>) {
        let windows = emulated_windows();
        let state = Arc::new(EmulatedState {
            tree: build_overview_stage(&windows),
            pointer: RwLock::new(PointerPosition::default()),
            focused: RwLock::new(Some(windows[0].clone())),
            clock: AtomicU32::new(1000),
        });

        let shell = Arc::new(EmulatedShell {
            state: state.clone(),
        });
        let pump = Box::new(EmulatedPump { state, config, hub });

        (shell, pump)
    }
}

#[async_trait::async_trait]
impl ShellHost for EmulatedShell {
    async fn pointer_position(&self) -> Result<PointerPosition> {
        Ok(*self.state.pointer.read())
    }

    async fn actor_at(&self, pos: PointerPosition, mode: PickMode) -> Result<Option<ActorRef>> {
        Ok(self.state.tree.actor_at(pos, mode))
    }

    async fn focused_window(&self) -> Result<Option<Window>> {
        Ok(self.state.focused.read().clone())
    }

    async fn current_event_time(&self) -> EventTime {
        self.state.next_time()
    }

    async fn activate(&self, window: &Window, time: EventTime) -> Result<()> {
        info!("[EMULATED] Активация окна {} [{}]", window, time);
        *self.state.focused.write() = Some(window.clone());
        Ok(())
    }
}

/// Источник событий эмулированной оболочки
struct EmulatedPump {
    state: Arc<EmulatedState>,
    config: Arc<Config>,
    hub: Arc<SignalHub>,
}

impl EmulatedPump {
    async fn run_overview_cycle(&self) {
        let glide = Duration::from_millis(self.config.emulation.glide_interval_ms);

        self.hub
            .publish(&OverviewEvent::shown(self.state.next_time()));

        for waypoint in GLIDE_PATH.iter() {
            *self.state.pointer.write() = *waypoint;
            debug_if_enabled!("Эмуляция: курсор в {}", waypoint);
            self.hub
                .publish(&MotionEvent::new(*waypoint, self.state.next_time()));
            sleep(glide).await;
        }

        self.hub
            .publish(&OverviewEvent::hiding(self.state.next_time()));

        // Пауза на "анимацию закрытия" перед полным скрытием
        sleep(glide).await;
        self.hub
            .publish(&OverviewEvent::hidden(self.state.next_time()));
    }
}

#[async_trait::async_trait]
impl ShellEventSource for EmulatedPump {
    async fn run(self: Box<Self>) -> Result<()> {
        info!(
            "Эмулированная оболочка запущена: цикл обзора каждые {}мс",
            self.config.emulation.cycle_interval_ms
        );

        let mut cycle = interval(Duration::from_millis(
            self.config.emulation.cycle_interval_ms,
        ));

        loop {
            cycle.tick().await;
            self.run_overview_cycle().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::resolve_window;

    #[test]
    fn test_overview_stage_resolves_each_tile() {
        let windows = emulated_windows();
        let tree = build_overview_stage(&windows);

        // Копия -> терминал
        let hit = tree
            .actor_at(PointerPosition::new(250.0, 450.0), PickMode::All)
            .unwrap();
        assert_eq!(resolve_window(hit), Some(windows[0].clone()));

        // Подпись внутри виджета с делегатом -> браузер
        let hit = tree
            .actor_at(PointerPosition::new(800.0, 340.0), PickMode::All)
            .unwrap();
        assert_eq!(resolve_window(hit), Some(windows[1].clone()));

        // Прямое поле -> редактор
        let hit = tree
            .actor_at(PointerPosition::new(1400.0, 440.0), PickMode::All)
            .unwrap();
        assert_eq!(resolve_window(hit), Some(windows[2].clone()));

        // Промежуток между плитками - окна нет
        let hit = tree
            .actor_at(PointerPosition::new(580.0, 450.0), PickMode::All)
            .unwrap();
        assert_eq!(resolve_window(hit), None);
    }

    #[tokio::test]
    async fn test_emulated_activate_moves_focus() {
        let config = Arc::new(Config::default());
        let hub = SignalHub::new();
        let (shell, _pump) = EmulatedShell::create(config, hub);

        let windows = emulated_windows();
        assert_eq!(
            shell.focused_window().await.unwrap(),
            Some(windows[0].clone())
        );

        let time = shell.current_event_time().await;
        shell.activate(&windows[2], time).await.unwrap();
        assert_eq!(
            shell.focused_window().await.unwrap(),
            Some(windows[2].clone())
        );
    }
}
