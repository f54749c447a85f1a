//! Config-defined hooks: extra actions bound to lifecycle steps

use std::collections::BTreeMap;

use tracing::debug;

use super::ConfigurationError;
use crate::config::HookConfig;
use crate::events::{DEFAULT_PRIORITY, EventBus, Step};

/// Subscribe every configured hook to the bus
///
/// Every step name and action is resolved before anything is registered, so
/// a bad hook leaves the bus untouched. `actions` is the configured action
/// table. Returns the number of hooks registered.
pub fn register_hooks(
    bus: &mut EventBus,
    hooks: &[HookConfig],
    actions: &BTreeMap<String, String>,
) -> Result<usize, ConfigurationError> {
    debug!(count = hooks.len(), "register_hooks: called");

    let resolved = hooks
        .iter()
        .enumerate()
        .map(|(index, hook)| resolve(index, hook, actions).map(|step| (index, step, hook)))
        .collect::<Result<Vec<_>, _>>()?;

    for (index, step, hook) in resolved {
        let name = format!("hook.{}.{}", index, hook.action);
        let priority = hook.priority.unwrap_or(DEFAULT_PRIORITY);
        let action = hook.action.clone();
        let flags = hook.flags.clone();
        debug!(%step, %name, priority, "register_hooks: subscribing hook");

        bus.subscribe(step, name, priority, move |ctx| Ok(ctx.call(&action, &flags)?));
    }

    Ok(hooks.len())
}

fn resolve(index: usize, hook: &HookConfig, actions: &BTreeMap<String, String>) -> Result<Step, ConfigurationError> {
    let step = hook.step.parse::<Step>().map_err(|_| ConfigurationError::UnknownStep {
        index,
        step: hook.step.clone(),
    })?;

    if !actions.contains_key(&hook.action) {
        return Err(ConfigurationError::UnknownAction {
            index,
            action: hook.action.clone(),
        });
    }
    Ok(step)
}
