//! Command dispatch: the only route through which the workspace mutates.
//!
//! Commands are named (`"pane.split"`, `"tab.close"`, ...), carry JSON
//! parameter maps, and return structured results instead of raising. The
//! dispatcher owns the registry and the observer bus: a command that
//! reports success has its change published exactly once; a command that
//! fails (or panics, or corrupts an invariant) is rolled back and publishes
//! nothing.

pub mod builtin;

use crate::capability::CapabilityRegistry;
use crate::ids::{PaneId, TabId};
use crate::observer::{ObserverBus, StateChange};
use crate::workspace::WorkspaceModel;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Outcome classification of a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command ran and (possibly) mutated the model.
    Success,
    /// The command could not run; `reason` says why.
    Failure,
    /// A precondition wasn't met — nothing to do, not an error.
    NotApplicable,
}

/// Structured result of a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    /// Outcome classification.
    pub status: CommandStatus,
    /// Optional result payload (e.g. the id of a created pane).
    pub payload: Option<Value>,
    /// Human-readable reason for `Failure`/`NotApplicable`.
    pub reason: Option<String>,
    change: Option<StateChange>,
    publish: bool,
}

impl CommandResult {
    /// A success with no payload.
    pub fn success() -> Self {
        Self {
            status: CommandStatus::Success,
            payload: None,
            reason: None,
            change: None,
            publish: true,
        }
    }

    /// A success carrying a result payload.
    pub fn success_with(payload: Value) -> Self {
        Self {
            payload: Some(payload),
            ..Self::success()
        }
    }

    /// Attach a change descriptor for the observer bus. Without one, a
    /// successful command publishes a full-resync descriptor.
    pub fn with_change(mut self, change: StateChange) -> Self {
        self.change = Some(change);
        self
    }

    /// Mark this success as read-only: nothing is published. Only for
    /// commands that provably do not mutate the model.
    pub fn quiet(mut self) -> Self {
        self.publish = false;
        self
    }

    /// A failure with a descriptive reason.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure,
            payload: None,
            reason: Some(reason.into()),
            change: None,
            publish: false,
        }
    }

    /// A bare not-applicable result.
    pub fn not_applicable() -> Self {
        Self {
            status: CommandStatus::NotApplicable,
            payload: None,
            reason: None,
            change: None,
            publish: false,
        }
    }

    /// Not-applicable with a reason the UI can surface.
    pub fn not_applicable_because(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Self::not_applicable()
        }
    }
}

/// Per-dispatch execution context handed to handlers and guards.
///
/// Constructed fresh for every dispatch; never persisted.
pub struct CommandContext<'a> {
    /// The workspace model, mutable.
    pub model: &'a mut WorkspaceModel,
    /// The capability registry (queried, never owned).
    pub capabilities: &'a CapabilityRegistry,
    /// Merged parameter map: registration defaults overlaid by caller
    /// parameters.
    pub params: Map<String, Value>,
}

impl CommandContext<'_> {
    /// Id of the active tab, if any.
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.model.active_tab_id()
    }

    /// Id of the active pane of the active tab, if any.
    pub fn active_pane_id(&self) -> Option<PaneId> {
        self.model.active_pane_id()
    }

    /// A string parameter.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.as_str()
    }

    /// An unsigned integer parameter.
    pub fn param_u64(&self, key: &str) -> Option<u64> {
        self.params.get(key)?.as_u64()
    }

    /// A signed integer parameter.
    pub fn param_i64(&self, key: &str) -> Option<i64> {
        self.params.get(key)?.as_i64()
    }

    /// A float parameter.
    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key)?.as_f64()
    }

    /// The pane named by `key`, falling back to the active pane.
    pub fn pane_arg(&self, key: &str) -> Option<PaneId> {
        match self.param_u64(key) {
            Some(raw) => Some(PaneId::from_raw(raw)),
            None => self.active_pane_id(),
        }
    }

    /// The tab named by `key`, falling back to the active tab.
    pub fn tab_arg(&self, key: &str) -> Option<TabId> {
        match self.param_u64(key) {
            Some(raw) => Some(TabId::from_raw(raw)),
            None => self.active_tab_id(),
        }
    }
}

/// Handler invoked when a command dispatches.
pub type CommandHandler = Box<dyn Fn(&mut CommandContext) -> CommandResult>;

/// Guard predicate over ambient state, checked before the handler runs.
pub type CommandGuard = Box<dyn Fn(&CommandContext) -> bool>;

/// A registered command: stable name, handler, optional guard, default
/// parameter bindings, and an optional (opaque) shortcut string.
pub struct CommandSpec {
    name: String,
    handler: CommandHandler,
    guard: Option<CommandGuard>,
    defaults: Map<String, Value>,
    shortcut: Option<String>,
}

impl CommandSpec {
    /// Create a command registration.
    pub fn new(
        name: impl Into<String>,
        handler: impl Fn(&mut CommandContext) -> CommandResult + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            handler: Box::new(handler),
            guard: None,
            defaults: Map::new(),
            shortcut: None,
        }
    }

    /// Attach a guard predicate; a false guard maps to `NotApplicable`
    /// without invoking the handler.
    pub fn with_guard(mut self, guard: impl Fn(&CommandContext) -> bool + 'static) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    /// Bind a default parameter value, used when the caller omits the key.
    pub fn with_default(mut self, key: &str, value: Value) -> Self {
        self.defaults.insert(key.to_string(), value);
        self
    }

    /// Attach a shortcut string. Opaque to the engine; input routing is an
    /// external concern.
    pub fn with_shortcut(mut self, shortcut: &str) -> Self {
        self.shortcut = Some(shortcut.to_string());
        self
    }

    /// The command's stable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound shortcut, if any.
    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }
}

/// Registry of commands keyed by name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, CommandSpec>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any previous registration with the
    /// same name.
    pub fn register(&mut self, spec: CommandSpec) {
        if self.commands.contains_key(spec.name()) {
            log::warn!("Replacing existing command registration '{}'", spec.name());
        } else {
            log::debug!("Registered command '{}'", spec.name());
        }
        self.commands.insert(spec.name().to_string(), spec);
    }

    /// Look up a command by name.
    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Whether a command is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }
}

/// The command dispatcher: resolves names, evaluates guards, runs handlers
/// atomically, and publishes committed changes on the observer bus.
pub struct Dispatcher {
    registry: CommandRegistry,
    bus: ObserverBus,
}

impl Dispatcher {
    /// Create a dispatcher with an empty registry.
    pub fn new() -> Self {
        Self {
            registry: CommandRegistry::new(),
            bus: ObserverBus::new(),
        }
    }

    /// Create a dispatcher pre-loaded with the built-in command set.
    pub fn with_builtins() -> Self {
        let mut dispatcher = Self::new();
        builtin::register_builtins(&mut dispatcher.registry);
        dispatcher
    }

    /// The command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The command registry, mutable (for registering custom commands).
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// The observer bus (subscribe/unsubscribe between dispatches).
    pub fn bus_mut(&mut self) -> &mut ObserverBus {
        &mut self.bus
    }

    /// Dispatch a command by name.
    ///
    /// `params` must be a JSON object (or `Null` for none). The model is
    /// snapshotted before the handler runs and restored on any non-success
    /// outcome — including handler panics and post-mutation invariant
    /// violations — so partial state is never observable.
    pub fn dispatch(
        &mut self,
        model: &mut WorkspaceModel,
        capabilities: &CapabilityRegistry,
        name: &str,
        params: Value,
    ) -> CommandResult {
        let Dispatcher { registry, bus } = self;

        let Some(spec) = registry.get(name) else {
            log::warn!("Unknown command '{name}'");
            return CommandResult::failure(format!("unknown command '{name}'"));
        };

        let caller_params = match params {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return CommandResult::failure(format!(
                    "parameters for '{name}' must be a JSON object, got {other}"
                ));
            }
        };

        let mut merged = spec.defaults.clone();
        for (key, value) in caller_params {
            merged.insert(key, value);
        }

        let mut ctx = CommandContext {
            model,
            capabilities,
            params: merged,
        };

        if let Some(guard) = &spec.guard
            && !guard(&ctx)
        {
            log::debug!("Guard rejected command '{name}'");
            return CommandResult::not_applicable();
        }

        let snapshot = ctx.model.clone();

        let outcome = catch_unwind(AssertUnwindSafe(|| (spec.handler)(&mut ctx)));
        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                *ctx.model = snapshot;
                let message = panic_message(panic.as_ref());
                log::error!("Command '{name}' panicked: {message}");
                return CommandResult::failure(format!("command '{name}' panicked: {message}"));
            }
        };

        match result.status {
            CommandStatus::Success => {
                if let Err(violation) = ctx.model.validate() {
                    *ctx.model = snapshot;
                    log::error!("Command '{name}' violated a model invariant: {violation}");
                    return CommandResult::failure(format!(
                        "invariant violation after '{name}': {violation}"
                    ));
                }
                if result.publish {
                    let change = result
                        .change
                        .clone()
                        .unwrap_or_else(StateChange::full_resync);
                    bus.publish(&change);
                }
                result
            }
            CommandStatus::Failure | CommandStatus::NotApplicable => {
                // Handlers validate before mutating, but roll back anyway
                // so a misbehaving custom handler cannot commit partially.
                *ctx.model = snapshot;
                if let Some(reason) = &result.reason {
                    log::debug!("Command '{name}' did not run: {reason}");
                }
                result
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
