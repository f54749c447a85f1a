//! Event Bus - synchronous, prioritized dispatch of lifecycle steps
//!
//! Handlers are registered per [`Step`] with an integer priority. Publishing a
//! step runs its handlers on the calling thread, highest priority first, and
//! stops at the first failure.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::error::{HandlerError, PublishError};
use super::step::Step;
use crate::executor::StepContext;

/// Priority for handlers that do not ask for one
///
/// Sits above the built-in lifecycle handlers so user and pipeline level
/// handlers see a step first.
pub const DEFAULT_PRIORITY: i32 = 10;

/// A unit of provisioning logic bound to a step
pub type Handler = Box<dyn Fn(&mut dyn StepContext) -> Result<(), HandlerError> + Send + Sync>;

struct Registration {
    name: String,
    priority: i32,
    handler: Handler,
}

/// Process-local register of step handlers
///
/// `subscribe` needs `&mut self` and `publish` only `&self`, so the handler
/// table cannot change while a step is being dispatched.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<Step, Vec<Registration>>,
}

impl EventBus {
    /// Create an empty event bus
    pub fn new() -> Self {
        debug!("EventBus::new: creating event bus");
        Self::default()
    }

    /// Register a handler for a step
    ///
    /// Higher priorities run first. Handlers sharing a priority run in the
    /// order they were registered.
    pub fn subscribe<F>(&mut self, step: Step, name: impl Into<String>, priority: i32, handler: F)
    where
        F: Fn(&mut dyn StepContext) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(%step, %name, priority, "EventBus::subscribe: called");

        let registrations = self.handlers.entry(step).or_default();
        // First slot holding a strictly lower priority keeps equal priorities in arrival order
        let position = registrations.partition_point(|r| r.priority >= priority);
        registrations.insert(
            position,
            Registration {
                name,
                priority,
                handler: Box::new(handler),
            },
        );
    }

    /// Dispatch a step to every handler registered for it
    ///
    /// A step without handlers is a no-op. If a handler fails, the remaining
    /// handlers for this step are skipped and the failure is returned.
    pub fn publish(&self, step: Step, ctx: &mut dyn StepContext) -> Result<(), PublishError> {
        let Some(registrations) = self.handlers.get(&step) else {
            debug!(%step, "EventBus::publish: no handlers");
            return Ok(());
        };

        debug!(%step, count = registrations.len(), "EventBus::publish: dispatching");
        for registration in registrations {
            debug!(%step, handler = %registration.name, priority = registration.priority, "EventBus::publish: invoking");
            if let Err(source) = (registration.handler)(ctx) {
                warn!(%step, handler = %registration.name, error = %source, "EventBus::publish: handler failed");
                return Err(PublishError {
                    step,
                    handler: registration.name.clone(),
                    source,
                });
            }
        }

        Ok(())
    }

    /// Number of handlers registered for a step
    pub fn handler_count(&self, step: Step) -> usize {
        self.handlers.get(&step).map_or(0, Vec::len)
    }

    /// Handler names and priorities for a step, in dispatch order
    pub fn handler_names(&self, step: Step) -> Vec<(&str, i32)> {
        self.handlers
            .get(&step)
            .map(|regs| regs.iter().map(|r| (r.name.as_str(), r.priority)).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DispatchError;
    use crate::executor::{ActionError, RecordingContext};
    use proptest::prelude::*;

    fn marker(tag: &'static str) -> impl Fn(&mut dyn StepContext) -> Result<(), HandlerError> + Send + Sync {
        move |ctx| {
            ctx.line(tag);
            Ok(())
        }
    }

    #[test]
    fn test_publish_without_handlers_is_noop() {
        let bus = EventBus::new();
        let mut ctx = RecordingContext::new();

        for step in Step::ALL {
            assert!(bus.publish(step, &mut ctx).is_ok());
        }
        assert!(ctx.calls().is_empty());
        assert!(ctx.lines().is_empty());
    }

    #[test]
    fn test_priority_order() {
        let mut bus = EventBus::new();
        bus.subscribe(Step::ExtraStuff, "low", 1, marker("low"));
        bus.subscribe(Step::ExtraStuff, "high", 20, marker("high"));
        bus.subscribe(Step::ExtraStuff, "mid", 5, marker("mid"));

        let mut ctx = RecordingContext::new();
        bus.publish(Step::ExtraStuff, &mut ctx).unwrap();

        assert_eq!(ctx.lines(), ["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut bus = EventBus::new();
        bus.subscribe(Step::Installed, "a", DEFAULT_PRIORITY, marker("a"));
        bus.subscribe(Step::Installed, "b", DEFAULT_PRIORITY, marker("b"));
        bus.subscribe(Step::Installed, "c", DEFAULT_PRIORITY, marker("c"));

        let mut ctx = RecordingContext::new();
        bus.publish(Step::Installed, &mut ctx).unwrap();

        assert_eq!(ctx.lines(), ["a", "b", "c"]);
    }

    #[test]
    fn test_failure_stops_dispatch() {
        let mut bus = EventBus::new();
        bus.subscribe(Step::RunSeeding, "first", 10, marker("first"));
        bus.subscribe(Step::RunSeeding, "broken", 5, |_ctx| Err(DispatchError::new("broken handler").into()));
        bus.subscribe(Step::RunSeeding, "never", 1, marker("never"));

        let mut ctx = RecordingContext::new();
        let err = bus.publish(Step::RunSeeding, &mut ctx).unwrap_err();

        assert_eq!(err.step, Step::RunSeeding);
        assert_eq!(err.handler, "broken");
        assert_eq!(ctx.lines(), ["first"]);
    }

    #[test]
    fn test_action_failure_propagates_unchanged() {
        let mut bus = EventBus::new();
        bus.subscribe(Step::RunMigrations, "migrate", 5, |ctx| {
            ctx.call("migrate", &Default::default())?;
            Ok(())
        });

        let mut ctx = RecordingContext::new().failing_on("migrate");
        let err = bus.publish(Step::RunMigrations, &mut ctx).unwrap_err();

        match err.action_error() {
            Some(ActionError::Failed { action, .. }) => assert_eq!(action, "migrate"),
            other => panic!("Expected action failure, got {:?}", other),
        }
    }

    #[test]
    fn test_handler_introspection() {
        let mut bus = EventBus::new();
        assert_eq!(bus.handler_count(Step::CacheConfig), 0);

        bus.subscribe(Step::CacheConfig, "builtin", 5, marker("x"));
        bus.subscribe(Step::CacheConfig, "user", DEFAULT_PRIORITY, marker("y"));

        assert_eq!(bus.handler_count(Step::CacheConfig), 2);
        assert_eq!(bus.handler_names(Step::CacheConfig), vec![("user", 10), ("builtin", 5)]);
    }

    proptest! {
        #[test]
        fn prop_dispatch_order_is_stable_by_priority(priorities in prop::collection::vec(-5i32..5, 0..24)) {
            let mut bus = EventBus::new();
            for (index, priority) in priorities.iter().enumerate() {
                let tag = format!("{}", index);
                bus.subscribe(Step::ExtraStuff, tag.clone(), *priority, move |ctx| {
                    ctx.line(&tag);
                    Ok(())
                });
            }

            let mut ctx = RecordingContext::new();
            bus.publish(Step::ExtraStuff, &mut ctx).unwrap();

            let mut expected: Vec<(usize, i32)> = priorities.iter().copied().enumerate().collect();
            expected.sort_by(|a, b| b.1.cmp(&a.1));
            let expected: Vec<String> = expected.iter().map(|(i, _)| i.to_string()).collect();

            prop_assert_eq!(ctx.lines(), expected.as_slice());
        }
    }
}
