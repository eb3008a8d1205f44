use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type BoxedHandler = Box<dyn Fn(&dyn Any) + Send + Sync>;

/// SignalHub: in-process signal wiring between shell backends and services.
///
/// Responsibilities (strict):
/// - Typed publish/subscribe keyed by the event's TypeId.
/// - Dispatch is synchronous on the publisher's task; event order seen by
///   handlers is exactly the publish order of that task.
/// - `subscribe` returns an owned `Subscription`; dropping it releases the
///   handler exactly once. No other release path exists.
///
/// Handlers must stay cheap and must not subscribe or cancel on the hub
/// from inside dispatch: the handler list is borrowed for the whole
/// publish call.
pub struct SignalHub {
    weak_self: Weak<SignalHub>,
    handlers: DashMap<TypeId, Vec<(u64, BoxedHandler)>>,
    next_token: AtomicU64,
}

impl SignalHub {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            weak_self: weak.clone(),
            handlers: DashMap::new(),
            next_token: AtomicU64::new(1),
        })
    }

    /// Подписаться на события типа `E`; хэндл владеет подпиской
    pub fn subscribe<E: Any + Send + Sync>(
        &self,
        handler: impl Fn(&E) + Send + Sync + 'static,
    ) -> Subscription {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let type_id = TypeId::of::<E>();

        self.handlers.entry(type_id).or_default().push((
            token,
            Box::new(move |any| {
                if let Some(event) = any.downcast_ref::<E>() {
                    handler(event);
                }
            }),
        ));

        Subscription {
            hub: self.weak_self.clone(),
            type_id,
            token,
        }
    }

    /// Разослать событие всем подписчикам синхронно
    pub fn publish<E: Any + Send + Sync>(&self, event: &E) {
        if let Some(list) = self.handlers.get(&TypeId::of::<E>()) {
            for (_, handler) in list.iter() {
                handler(event);
            }
        }
    }

    /// Число активных подписок на тип `E`
    pub fn handler_count<E: Any>(&self) -> usize {
        self.handlers
            .get(&TypeId::of::<E>())
            .map(|list| list.len())
            .unwrap_or(0)
    }

    fn release(&self, type_id: TypeId, token: u64) {
        if let Some(mut list) = self.handlers.get_mut(&type_id) {
            list.retain(|(t, _)| *t != token);
        }
    }
}

/// Владеющий хэндл подписки; освобождение ровно один раз при Drop
pub struct Subscription {
    hub: Weak<SignalHub>,
    type_id: TypeId,
    token: u64,
}

impl Subscription {
    /// Явная отмена; эквивалентна Drop
    #[allow(dead_code)]
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Хаб мог уже умереть при остановке процесса - тогда нечего освобождать
        if let Some(hub) = self.hub.upgrade() {
            hub.release(self.type_id, self.token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct Ping(u32);

    #[derive(Clone)]
    struct Pong;

    #[test]
    fn test_publish_reaches_subscriber() {
        let hub = SignalHub::new();
        let count = Arc::new(AtomicUsize::new(0));

        let _sub = {
            let count = count.clone();
            hub.subscribe(move |event: &Ping| {
                if event.0 == 7 {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        hub.publish(&Ping(7));
        hub.publish(&Ping(8));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_typed_dispatch_does_not_cross_types() {
        let hub = SignalHub::new();
        let count = Arc::new(AtomicUsize::new(0));

        let _sub = {
            let count = count.clone();
            hub.subscribe(move |_: &Ping| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        hub.publish(&Pong);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let hub = SignalHub::new();
        let count = Arc::new(AtomicUsize::new(0));

        let sub = {
            let count = count.clone();
            hub.subscribe(move |_: &Ping| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(hub.handler_count::<Ping>(), 1);

        drop(sub);
        assert_eq!(hub.handler_count::<Ping>(), 0);

        hub.publish(&Ping(1));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_releases_only_its_own_handler() {
        let hub = SignalHub::new();
        let count = Arc::new(AtomicUsize::new(0));

        let first = {
            let count = count.clone();
            hub.subscribe(move |_: &Ping| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        let _second = {
            let count = count.clone();
            hub.subscribe(move |_: &Ping| {
                count.fetch_add(10, Ordering::SeqCst);
            })
        };

        first.cancel();
        hub.publish(&Ping(0));

        assert_eq!(hub.handler_count::<Ping>(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_subscription_outliving_hub_is_safe() {
        let hub = SignalHub::new();
        let sub = hub.subscribe(|_: &Ping| {});
        drop(hub);
        // Drop хэндла после смерти хаба не должен паниковать
        drop(sub);
    }
}
