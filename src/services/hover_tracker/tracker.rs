use crate::debug_if_enabled;
use crate::events::{MotionEvent, OverviewEvent, OverviewPhase};
use crate::scene::{resolve_window, PickMode, Window};
use crate::services::shell::ShellHost;
use crate::services::signal_hub::{SignalHub, Subscription};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Доменное состояние трекера
#[derive(Debug, Default)]
struct TrackerState {
    /// true между shown и hiding
    overview_visible: bool,
    /// Последнее окно, найденное под курсором за текущий сеанс обзора
    hovered: Option<Window>,
}

/// Отложенная активация. Слот освобождается перед каждым новым решением и
/// при остановке; зафиксированное поведение активирует только синхронно,
/// на краю hiding, и слот никогда не заполняется.
#[allow(dead_code)]
pub(crate) struct DeferredActivation {
    handle: JoinHandle<()>,
}

impl DeferredActivation {
    fn cancel(self) {
        self.handle.abort();
    }
}

enum TrackerMsg {
    Overview(OverviewEvent),
    Motion(MotionEvent),
}

/// Подключение к хабу, живёт от start() до stop()
struct Wiring {
    hub: Arc<SignalHub>,
    tx: mpsc::UnboundedSender<TrackerMsg>,
}

/// Трекер наведения: активирует последнее окно под курсором при закрытии
/// обзора окон
pub struct HoverTracker {
    weak_self: Weak<HoverTracker>,
    host: Arc<dyn ShellHost>,
    started: AtomicBool,
    state: RwLock<TrackerState>,
    lifecycle_subs: Mutex<Vec<Subscription>>,
    motion_sub: Mutex<Option<Subscription>>,
    pending_activation: Mutex<Option<DeferredActivation>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    wiring: Mutex<Option<Wiring>>,
}

impl HoverTracker {
    pub fn new(host: Arc<dyn ShellHost>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            weak_self: weak.clone(),
            host,
            started: AtomicBool::new(false),
            state: RwLock::new(TrackerState::default()),
            lifecycle_subs: Mutex::new(Vec::new()),
            motion_sub: Mutex::new(None),
            pending_activation: Mutex::new(None),
            worker: Mutex::new(None),
            wiring: Mutex::new(None),
        })
    }

    /// Подписаться на сигналы жизненного цикла обзора и начать обработку.
    /// Повторный вызов без stop() игнорируется.
    pub fn start(&self, hub: &Arc<SignalHub>) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("HoverTracker уже запущен - повторный start игнорируется");
            return;
        }

        info!("Запуск HoverTracker");
        *self.state.write() = TrackerState::default();

        let (tx, rx) = mpsc::unbounded_channel();

        // weak_self живёт с момента new_cyclic, upgrade здесь не может не удаться
        if let Some(tracker) = self.weak_self.upgrade() {
            *self.worker.lock() = Some(tokio::spawn(async move {
                tracker.run_loop(rx).await;
            }));
        }

        // Хаб должен быть доступен обработчикам до первой подписки
        *self.wiring.lock() = Some(Wiring {
            hub: hub.clone(),
            tx: tx.clone(),
        });

        // Три отдельных подписки, по одной на каждый сигнал жизненного цикла
        let mut subs = Vec::with_capacity(3);
        for phase in [
            OverviewPhase::Shown,
            OverviewPhase::Hiding,
            OverviewPhase::Hidden,
        ] {
            let tx = tx.clone();
            subs.push(hub.subscribe(move |event: &OverviewEvent| {
                if event.phase == phase {
                    let _ = tx.send(TrackerMsg::Overview(event.clone()));
                }
            }));
        }
        *self.lifecycle_subs.lock() = subs;
    }

    /// Освободить все подписки и таймеры, очистить состояние.
    /// Безопасен при любом числе вызовов и без предшествующего start().
    pub fn stop(&self) {
        if self.started.swap(false, Ordering::SeqCst) {
            info!("Остановка HoverTracker");
        }

        // Каждый ресурс освобождается независимо; отсутствие ресурса - no-op
        self.lifecycle_subs.lock().clear();
        *self.motion_sub.lock() = None;

        if let Some(pending) = self.pending_activation.lock().take() {
            pending.cancel();
        }

        if let Some(worker) = self.worker.lock().take() {
            worker.abort();
        }

        *self.wiring.lock() = None;
        *self.state.write() = TrackerState::default();
    }

    /// Единственный потребитель очереди: события обрабатываются строго по
    /// одному, в порядке публикации
    async fn run_loop(&self, mut rx: mpsc::UnboundedReceiver<TrackerMsg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                TrackerMsg::Overview(event) => match event.phase {
                    OverviewPhase::Shown => self.on_shown(),
                    OverviewPhase::Hiding => self.on_hiding().await,
                    OverviewPhase::Hidden => self.on_hidden(),
                },
                TrackerMsg::Motion(_) => self.on_motion().await,
            }
        }
    }

    fn on_shown(&self) {
        {
            let mut state = self.state.write();
            state.overview_visible = true;
            // Новая эпоха: окно прошлого сеанса обзора не должно активироваться
            state.hovered = None;
        }
        debug_if_enabled!("Обзор показан - отслеживание курсора активно");

        // Единственная подписка на движение на все циклы show/hide
        let mut motion = self.motion_sub.lock();
        if motion.is_none() {
            if let Some(wiring) = self.wiring.lock().as_ref() {
                let tx = wiring.tx.clone();
                *motion = Some(wiring.hub.subscribe(move |event: &MotionEvent| {
                    let _ = tx.send(TrackerMsg::Motion(event.clone()));
                }));
            }
        }
    }

    async fn on_motion(&self) {
        if !self.state.read().overview_visible {
            // Обзор скрыт: событие просто проходит дальше
            return;
        }

        // Неудача разрешения оставляет прежнее окно (липкая семантика)
        if let Some(window) = self.resolve_hovered().await {
            let mut state = self.state.write();
            if state.hovered.as_ref() != Some(&window) {
                debug_if_enabled!("Курсор над окном {}", window);
            }
            state.hovered = Some(window);
        }
    }

    async fn on_hiding(&self) {
        let hovered = {
            let mut state = self.state.write();
            state.overview_visible = false;
            state.hovered.clone()
        };

        let Some(window) = hovered else {
            debug_if_enabled!("Обзор закрывается, окна под курсором не было");
            return;
        };

        // Устаревший отложенный вызов не должен сработать после нового решения
        if let Some(pending) = self.pending_activation.lock().take() {
            pending.cancel();
        }

        let focused = match self.host.focused_window().await {
            Ok(focused) => focused,
            Err(e) => {
                debug_if_enabled!("Сфокусированное окно неизвестно: {}", e);
                None
            }
        };

        if focused.as_ref() == Some(&window) {
            debug_if_enabled!("Окно {} уже в фокусе - активация не нужна", window);
            return;
        }

        // Активация до конца анимации закрытия, чтобы она целилась в
        // выбранное окно
        let time = self.host.current_event_time().await;
        match self.host.activate(&window, time).await {
            Ok(()) => info!("Активировано последнее окно под курсором: {}", window),
            Err(e) => warn!("Не удалось активировать окно {}: {}", window, e),
        }
    }

    fn on_hidden(&self) {
        self.state.write().hovered = None;
        debug_if_enabled!("Обзор скрыт - состояние отслеживания очищено");
    }

    /// Окно под курсором: запрос позиции, hit-тест всех акторов, подъём по
    /// предкам. Любой сбой хоста понижается до "окна нет".
    async fn resolve_hovered(&self) -> Option<Window> {
        let pos = match self.host.pointer_position().await {
            Ok(pos) => pos,
            Err(e) => {
                debug_if_enabled!("Позиция курсора недоступна: {}", e);
                return None;
            }
        };

        let actor = match self.host.actor_at(pos, PickMode::All).await {
            Ok(Some(actor)) => actor,
            Ok(None) => return None,
            Err(e) => {
                debug_if_enabled!("Hit-тест в {} не удался: {}", pos, e);
                return None;
            }
        };

        resolve_window(actor)
    }
}

impl Drop for HoverTracker {
    fn drop(&mut self) {
        debug_if_enabled!("HoverTracker завершает работу");
    }
}
