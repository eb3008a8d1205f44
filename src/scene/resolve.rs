use super::actor::{ActorRef, Window};

/// Найти окно, представленное актором под курсором.
///
/// Подъём от задетого актора к корню; на каждом предке пробы применяются
/// в фиксированном порядке приоритета:
///   1. окно прямо в акторе;
///   2. окно через аксессор актора;
///   3. те же две пробы на акторе-источнике, если актор - копия;
///   4. те же две пробы на делегате.
/// Первый успех на пути к корню определяет результат. Исчерпанная цепочка
/// предков - штатный случай "здесь нет окна", не ошибка.
pub fn resolve_window(hit: ActorRef) -> Option<Window> {
    let mut cursor = Some(hit);

    while let Some(actor) = cursor {
        if let Some(window) = window_of(&actor) {
            return Some(window);
        }
        cursor = actor.parent();
    }

    None
}

/// Пробы одного актора в порядке приоритета
fn window_of(actor: &ActorRef) -> Option<Window> {
    actor
        .window_field()
        .or_else(|| actor.window_accessor())
        .or_else(|| {
            actor
                .clone_source()
                .and_then(|source| source.window_field().or_else(|| source.window_accessor()))
        })
        .or_else(|| {
            actor
                .delegate()
                .and_then(|delegate| delegate.window_field().or_else(|| delegate.window_accessor()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::tree::{Rect, StageActor, StageDelegate, StageTree};

    fn tile_rect() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn test_direct_window_on_hit_actor() {
        let tree = StageTree::new(200.0, 200.0);
        let tile = StageActor::new("tile")
            .with_bounds(tile_rect())
            .with_window_field(Window::new(1, "Terminal"))
            .attach(tree.root());

        let resolved = resolve_window(tile);
        assert_eq!(resolved, Some(Window::new(1, "Terminal")));
    }

    #[test]
    fn test_accessor_window() {
        let tree = StageTree::new(200.0, 200.0);
        let tile = StageActor::new("tile")
            .with_bounds(tile_rect())
            .with_window_accessor(Window::new(2, "Browser"))
            .attach(tree.root());

        assert_eq!(resolve_window(tile), Some(Window::new(2, "Browser")));
    }

    #[test]
    fn test_clone_source_window() {
        let tree = StageTree::new(200.0, 200.0);
        let original = StageActor::new("window-actor")
            .with_bounds(Rect::new(150.0, 150.0, 40.0, 40.0))
            .with_window_field(Window::new(3, "Editor"))
            .attach(tree.root());
        let clone = StageActor::new("preview-clone")
            .with_bounds(tile_rect())
            .with_source(original)
            .attach(tree.root());

        assert_eq!(resolve_window(clone), Some(Window::new(3, "Editor")));
    }

    #[test]
    fn test_delegate_window() {
        let tree = StageTree::new(200.0, 200.0);
        let tile = StageActor::new("preview-widget")
            .with_bounds(tile_rect())
            .with_delegate(StageDelegate::with_field(Window::new(4, "Player")))
            .attach(tree.root());

        assert_eq!(resolve_window(tile), Some(Window::new(4, "Player")));
    }

    #[test]
    fn test_delegate_two_ancestors_up() {
        // Подъём не должен останавливаться на первом акторе: окно держит
        // делегат прапредка задетого актора
        let tree = StageTree::new(200.0, 200.0);
        let widget = StageActor::new("preview-widget")
            .with_bounds(tile_rect())
            .with_delegate(StageDelegate::with_accessor(Window::new(5, "Chat")))
            .attach(tree.root());
        let frame = StageActor::new("frame")
            .with_bounds(tile_rect())
            .attach(widget);
        let label = StageActor::new("title-label")
            .with_bounds(Rect::new(10.0, 10.0, 50.0, 12.0))
            .attach(frame);

        assert_eq!(resolve_window(label), Some(Window::new(5, "Chat")));
    }

    #[test]
    fn test_priority_direct_field_over_delegate() {
        let tree = StageTree::new(200.0, 200.0);
        let tile = StageActor::new("tile")
            .with_bounds(tile_rect())
            .with_window_field(Window::new(6, "Direct"))
            .with_delegate(StageDelegate::with_field(Window::new(7, "Delegated")))
            .attach(tree.root());

        assert_eq!(resolve_window(tile), Some(Window::new(6, "Direct")));
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        // Побеждает первый предок с окном по пути к корню, а не корневой
        let tree = StageTree::new(200.0, 200.0);
        let outer = StageActor::new("workspace")
            .with_bounds(tile_rect())
            .with_window_field(Window::new(8, "Outer"))
            .attach(tree.root());
        let inner = StageActor::new("tile")
            .with_bounds(tile_rect())
            .with_window_accessor(Window::new(9, "Inner"))
            .attach(outer);
        let leaf = StageActor::new("icon")
            .with_bounds(Rect::new(5.0, 5.0, 10.0, 10.0))
            .attach(inner);

        assert_eq!(resolve_window(leaf), Some(Window::new(9, "Inner")));
    }

    #[test]
    fn test_exhausted_chain_resolves_nothing() {
        let tree = StageTree::new(200.0, 200.0);
        let bare = StageActor::new("background")
            .with_bounds(tile_rect())
            .attach(tree.root());

        assert_eq!(resolve_window(bare), None);
    }
}
