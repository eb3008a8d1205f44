use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::events::PointerPosition;

use super::actor::{ActorId, ActorRef, DelegateRef, PickMode, SceneActor, Window, WindowDelegate};

static NEXT_ACTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Прямоугольник актора в координатах сцены
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, pos: &PointerPosition) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width
            && pos.y < self.y + self.height
    }
}

/// Делегат с окном для узлов StageTree
pub struct StageDelegate {
    window_field: Option<Window>,
    window_accessor: Option<Window>,
}

impl StageDelegate {
    pub fn with_field(window: Window) -> DelegateRef {
        Arc::new(Self {
            window_field: Some(window),
            window_accessor: None,
        })
    }

    pub fn with_accessor(window: Window) -> DelegateRef {
        Arc::new(Self {
            window_field: None,
            window_accessor: Some(window),
        })
    }
}

impl WindowDelegate for StageDelegate {
    fn window_field(&self) -> Option<Window> {
        self.window_field.clone()
    }

    fn window_accessor(&self) -> Option<Window> {
        self.window_accessor.clone()
    }
}

/// Узел встроенного дерева сцены
///
/// Используется эмулированным бэкендом и тестами ядра. Строится в стиле
/// builder: сначала `new` + `with_*`, затем `attach` к родителю.
pub struct StageActor {
    id: ActorId,
    name: String,
    bounds: Rect,
    reactive: bool,
    window_field: Option<Window>,
    window_accessor: Option<Window>,
    source: Option<ActorRef>,
    delegate: Option<DelegateRef>,
    parent: Weak<StageActor>,
    children: RwLock<Vec<Arc<StageActor>>>,
}

impl StageActor {
    pub fn new(name: &str) -> Self {
        Self {
            id: ActorId(NEXT_ACTOR_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            // Нулевой размер: актор без явных границ не участвует в hit-тесте
            bounds: Rect::new(0.0, 0.0, 0.0, 0.0),
            reactive: false,
            window_field: None,
            window_accessor: None,
            source: None,
            delegate: None,
            parent: Weak::new(),
            children: RwLock::new(Vec::new()),
        }
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_reactive(mut self, reactive: bool) -> Self {
        self.reactive = reactive;
        self
    }

    pub fn with_window_field(mut self, window: Window) -> Self {
        self.window_field = Some(window);
        self
    }

    pub fn with_window_accessor(mut self, window: Window) -> Self {
        self.window_accessor = Some(window);
        self
    }

    pub fn with_source(mut self, source: ActorRef) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_delegate(mut self, delegate: DelegateRef) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Прикрепить актор к родителю, получив узел дерева
    pub fn attach(mut self, parent: Arc<StageActor>) -> Arc<StageActor> {
        self.parent = Arc::downgrade(&parent);
        let node = Arc::new(self);
        parent.children.write().push(node.clone());
        node
    }

    #[allow(dead_code)]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SceneActor for StageActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn parent(&self) -> Option<ActorRef> {
        self.parent.upgrade().map(|actor| actor as ActorRef)
    }

    fn window_field(&self) -> Option<Window> {
        self.window_field.clone()
    }

    fn window_accessor(&self) -> Option<Window> {
        self.window_accessor.clone()
    }

    fn clone_source(&self) -> Option<ActorRef> {
        self.source.clone()
    }

    fn delegate(&self) -> Option<DelegateRef> {
        self.delegate.clone()
    }
}

/// Встроенное дерево сцены с hit-тестом
pub struct StageTree {
    root: Arc<StageActor>,
}

impl StageTree {
    pub fn new(width: f64, height: f64) -> Self {
        let root = Arc::new(
            StageActor::new("stage").with_bounds(Rect::new(0.0, 0.0, width, height)),
        );
        Self { root }
    }

    pub fn root(&self) -> Arc<StageActor> {
        self.root.clone()
    }

    /// Верхний актор в заданной точке
    ///
    /// Дети перекрывают родителя; позже прикреплённый ребёнок рисуется
    /// поверх и побеждает. Ребёнок за пределами границ родителя отсекается.
    pub fn actor_at(&self, pos: PointerPosition, mode: PickMode) -> Option<ActorRef> {
        Self::pick(&self.root, pos, mode)
    }

    fn pick(actor: &Arc<StageActor>, pos: PointerPosition, mode: PickMode) -> Option<ActorRef> {
        if !actor.bounds.contains(&pos) {
            return None;
        }

        let children = actor.children.read();
        for child in children.iter().rev() {
            if let Some(hit) = Self::pick(child, pos, mode) {
                return Some(hit);
            }
        }

        match mode {
            PickMode::All => Some(actor.clone() as ActorRef),
            PickMode::Reactive if actor.reactive => Some(actor.clone() as ActorRef),
            PickMode::Reactive => None,
        }
    }
}
