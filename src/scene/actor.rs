use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Идентификатор окна хоста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl WindowId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Невладеющая ссылка на окно хоста
///
/// Хэндл не удерживает окно живым - это обратная ссылка, которой
/// пользуются ровно один раз, в момент активации. Равенство определяется
/// только идентификатором: заголовок носит диагностический характер.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Window {
    id: WindowId,
    title: String,
}

impl Window {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: WindowId::new(id),
            title: title.into(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl PartialEq for Window {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Window {}

impl std::hash::Hash for Window {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.title.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "\"{}\" ({})", self.title, self.id)
        }
    }
}

/// Идентификатор актора сцены
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor:{}", self.0)
    }
}

/// Режим hit-теста сцены
///
/// Для поиска окна под курсором всегда используется `All`: превью окон в
/// обзоре не обязаны быть интерактивными акторами.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMode {
    /// Учитывать все отрисованные акторы
    All,
    /// Учитывать только интерактивные акторы
    Reactive,
}

pub type ActorRef = Arc<dyn SceneActor + Send + Sync>;
pub type DelegateRef = Arc<dyn WindowDelegate + Send + Sync>;

/// SceneActor: polymorphic view of a host scene-graph node.
///
/// Responsibilities (strict):
/// - Expose the ancestor link (`parent`) for upward traversal.
/// - Expose the four window-extraction capabilities as independent probes,
///   each returning `None` when the node lacks that capability.
/// - Do NOT perform any resolution ordering here; the priority chain lives
///   exclusively in `scene::resolve`.
pub trait SceneActor {
    fn id(&self) -> ActorId;

    /// Родитель актора в дереве сцены
    fn parent(&self) -> Option<ActorRef>;

    /// Окно, хранящееся прямо в акторе
    fn window_field(&self) -> Option<Window>;

    /// Окно, доступное через метод-аксессор актора
    fn window_accessor(&self) -> Option<Window>;

    /// Актор-источник, если этот актор - визуальная копия (clone)
    fn clone_source(&self) -> Option<ActorRef>;

    /// Прикреплённый объект-делегат
    fn delegate(&self) -> Option<DelegateRef>;
}

/// WindowDelegate: auxiliary logic object paired with a visual actor.
///
/// Composite widgets in the host toolkit keep richer state on a delegate
/// object; the delegate gets the same two window probes as the actor.
pub trait WindowDelegate {
    fn window_field(&self) -> Option<Window>;

    fn window_accessor(&self) -> Option<Window>;
}
