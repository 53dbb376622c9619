//! The built-in command set.
//!
//! Names are namespaced by category — `tab.*`, `pane.*`, `navigation.*`,
//! `workspace.*` — though the dispatcher itself treats them as opaque
//! strings. Handlers validate their parameters, mutate the model through
//! its public operations, and attach a change descriptor for the observer
//! bus.
//!
//! Stale-id policy: ids are never reused, so a pane/tab id that is absent
//! but was allocated earlier refers to something already closed — those
//! commands report `NotApplicable` (repeat-safe). An id that was never
//! allocated is a caller bug and reports `Failure`.

use super::{CommandContext, CommandRegistry, CommandResult, CommandSpec};
use crate::ids::{IdKind, PaneId, TabId};
use crate::observer::StateChange;
use crate::pane::{NavigationDirection, PaneError, SplitOrientation};
use serde_json::json;

/// Register every built-in command.
pub fn register_builtins(registry: &mut CommandRegistry) {
    // ── tab ──────────────────────────────────────────────────────────────
    registry.register(
        CommandSpec::new("tab.new", cmd_tab_new)
            .with_default("title", json!("untitled"))
            .with_shortcut("CmdOrCtrl+T"),
    );
    registry.register(
        CommandSpec::new("tab.close", cmd_tab_close)
            .with_guard(has_active_tab)
            .with_shortcut("CmdOrCtrl+W"),
    );
    registry.register(CommandSpec::new("tab.rename", cmd_tab_rename).with_guard(has_active_tab));
    registry.register(CommandSpec::new("tab.select", cmd_tab_select));
    registry.register(
        CommandSpec::new("tab.next", cmd_tab_next)
            .with_guard(has_active_tab)
            .with_shortcut("Ctrl+Tab"),
    );
    registry.register(
        CommandSpec::new("tab.previous", cmd_tab_previous)
            .with_guard(has_active_tab)
            .with_shortcut("Ctrl+Shift+Tab"),
    );
    registry.register(CommandSpec::new("tab.move", cmd_tab_move).with_guard(has_active_tab));

    // ── pane ─────────────────────────────────────────────────────────────
    registry.register(
        CommandSpec::new("pane.split", cmd_pane_split)
            .with_guard(has_active_tab)
            .with_default("orientation", json!("vertical"))
            .with_shortcut("CmdOrCtrl+Shift+D"),
    );
    registry.register(
        CommandSpec::new("pane.close", cmd_pane_close)
            .with_guard(has_active_tab)
            .with_shortcut("CmdOrCtrl+Shift+W"),
    );
    registry.register(CommandSpec::new("pane.focus", cmd_pane_focus));
    registry.register(
        CommandSpec::new("pane.maximize", cmd_pane_maximize)
            .with_guard(has_active_tab)
            .with_shortcut("CmdOrCtrl+Shift+Enter"),
    );
    registry.register(
        CommandSpec::new("pane.restore", cmd_pane_restore).with_guard(has_active_tab),
    );
    registry.register(
        CommandSpec::new("pane.even_sizes", cmd_pane_even_sizes).with_guard(has_active_tab),
    );
    registry.register(
        CommandSpec::new("pane.extract_to_tab", cmd_pane_extract).with_guard(has_active_tab),
    );
    registry.register(
        CommandSpec::new("pane.resize", cmd_pane_resize)
            .with_guard(has_active_tab)
            .with_default("delta", json!(0.05)),
    );

    // ── navigation ───────────────────────────────────────────────────────
    registry.register(
        CommandSpec::new("navigation.left", |ctx: &mut CommandContext| {
            navigate(ctx, NavigationDirection::Left)
        })
        .with_guard(has_active_tab)
        .with_shortcut("CmdOrCtrl+Alt+Left"),
    );
    registry.register(
        CommandSpec::new("navigation.right", |ctx: &mut CommandContext| {
            navigate(ctx, NavigationDirection::Right)
        })
        .with_guard(has_active_tab)
        .with_shortcut("CmdOrCtrl+Alt+Right"),
    );
    registry.register(
        CommandSpec::new("navigation.up", |ctx: &mut CommandContext| {
            navigate(ctx, NavigationDirection::Up)
        })
        .with_guard(has_active_tab)
        .with_shortcut("CmdOrCtrl+Alt+Up"),
    );
    registry.register(
        CommandSpec::new("navigation.down", |ctx: &mut CommandContext| {
            navigate(ctx, NavigationDirection::Down)
        })
        .with_guard(has_active_tab)
        .with_shortcut("CmdOrCtrl+Alt+Down"),
    );

    // ── workspace ────────────────────────────────────────────────────────
    registry.register(CommandSpec::new("workspace.snapshot", cmd_workspace_snapshot));
    registry.register(CommandSpec::new(
        "workspace.refresh_capabilities",
        cmd_workspace_refresh_capabilities,
    ));
}

// ── Guards and shared helpers ────────────────────────────────────────────

fn has_active_tab(ctx: &CommandContext) -> bool {
    ctx.model.active_tab_id().is_some()
}

/// Resolve an absent pane id per the stale-id policy. Only an id that was
/// once allocated as a pane is stale; anything else (including a tab or
/// split raw) never named a pane.
fn stale_or_unknown_pane(ctx: &CommandContext, id: PaneId) -> CommandResult {
    if ctx.model.was_allocated_as(IdKind::Pane, id.raw()) {
        CommandResult::not_applicable_because(format!("pane {id} no longer exists"))
    } else {
        CommandResult::failure(format!("pane {id} not found"))
    }
}

/// Resolve an absent tab id per the stale-id policy.
fn stale_or_unknown_tab(ctx: &CommandContext, id: TabId) -> CommandResult {
    if ctx.model.was_allocated_as(IdKind::Tab, id.raw()) {
        CommandResult::not_applicable_because(format!("tab {id} no longer exists"))
    } else {
        CommandResult::failure(format!("tab {id} not found"))
    }
}

/// Structural-change descriptor scoped to the pane's owning tab.
fn pane_change(ctx: &CommandContext, pane: PaneId) -> StateChange {
    match ctx.model.find_tab_of_pane(pane) {
        Some(tab) => StateChange::structural(tab).with_pane(pane),
        None => StateChange::full_resync(),
    }
}

fn parse_orientation(ctx: &CommandContext) -> Result<SplitOrientation, CommandResult> {
    match ctx.param_str("orientation") {
        None => Err(CommandResult::failure("missing 'orientation' parameter")),
        Some(s) => SplitOrientation::parse(s).ok_or_else(|| {
            CommandResult::failure(format!(
                "invalid orientation '{s}' (expected 'horizontal' or 'vertical')"
            ))
        }),
    }
}

// ── tab ──────────────────────────────────────────────────────────────────

fn cmd_tab_new(ctx: &mut CommandContext) -> CommandResult {
    let title = ctx.param_str("title").unwrap_or("untitled").to_string();
    let tab_id = ctx.model.new_tab(title, ctx.capabilities);
    CommandResult::success_with(json!({ "tab_id": tab_id.raw() }))
        .with_change(StateChange::structural(tab_id))
}

fn cmd_tab_close(ctx: &mut CommandContext) -> CommandResult {
    let Some(tab_id) = ctx.tab_arg("tab_id") else {
        return CommandResult::not_applicable_because("no active tab");
    };
    match ctx.model.close_tab(tab_id) {
        Some(_) => CommandResult::success().with_change(StateChange::structural(tab_id)),
        None => stale_or_unknown_tab(ctx, tab_id),
    }
}

fn cmd_tab_rename(ctx: &mut CommandContext) -> CommandResult {
    let Some(title) = ctx.param_str("title").map(str::to_string) else {
        return CommandResult::failure("missing 'title' parameter");
    };
    let Some(tab_id) = ctx.tab_arg("tab_id") else {
        return CommandResult::not_applicable_because("no active tab");
    };
    if ctx.model.rename_tab(tab_id, title) {
        CommandResult::success().with_change(StateChange::structural(tab_id))
    } else {
        stale_or_unknown_tab(ctx, tab_id)
    }
}

fn cmd_tab_select(ctx: &mut CommandContext) -> CommandResult {
    let Some(raw) = ctx.param_u64("tab_id") else {
        return CommandResult::failure("missing 'tab_id' parameter");
    };
    let tab_id = TabId::from_raw(raw);
    if ctx.model.switch_to(tab_id) {
        CommandResult::success().with_change(StateChange::focus(Some(tab_id), None))
    } else {
        stale_or_unknown_tab(ctx, tab_id)
    }
}

fn cmd_tab_next(ctx: &mut CommandContext) -> CommandResult {
    match ctx.model.next_tab() {
        Some(tab_id) => CommandResult::success_with(json!({ "tab_id": tab_id.raw() }))
            .with_change(StateChange::focus(Some(tab_id), None)),
        None => CommandResult::not_applicable_because("no tabs"),
    }
}

fn cmd_tab_previous(ctx: &mut CommandContext) -> CommandResult {
    match ctx.model.prev_tab() {
        Some(tab_id) => CommandResult::success_with(json!({ "tab_id": tab_id.raw() }))
            .with_change(StateChange::focus(Some(tab_id), None)),
        None => CommandResult::not_applicable_because("no tabs"),
    }
}

fn cmd_tab_move(ctx: &mut CommandContext) -> CommandResult {
    let Some(delta) = ctx.param_i64("delta") else {
        return CommandResult::failure("missing 'delta' parameter");
    };
    let Some(tab_id) = ctx.tab_arg("tab_id") else {
        return CommandResult::not_applicable_because("no active tab");
    };
    if ctx.model.move_tab(tab_id, delta) {
        CommandResult::success().with_change(StateChange::structural(tab_id))
    } else {
        stale_or_unknown_tab(ctx, tab_id)
    }
}

// ── pane ─────────────────────────────────────────────────────────────────

fn cmd_pane_split(ctx: &mut CommandContext) -> CommandResult {
    let orientation = match parse_orientation(ctx) {
        Ok(o) => o,
        Err(result) => return result,
    };
    let Some(pane_id) = ctx.pane_arg("pane_id") else {
        return CommandResult::not_applicable_because("no active pane");
    };
    match ctx.model.split_pane(pane_id, orientation, ctx.capabilities) {
        Ok(new_id) => {
            let change = pane_change(ctx, new_id);
            CommandResult::success_with(json!({ "pane_id": new_id.raw() })).with_change(change)
        }
        Err(PaneError::NotFound(id)) => stale_or_unknown_pane(ctx, id),
        Err(err) => CommandResult::failure(err.to_string()),
    }
}

fn cmd_pane_close(ctx: &mut CommandContext) -> CommandResult {
    let Some(pane_id) = ctx.pane_arg("pane_id") else {
        return CommandResult::not_applicable_because("no active pane");
    };
    // Resolve the owning tab before the pane disappears.
    let change = pane_change(ctx, pane_id);
    match ctx.model.close_pane(pane_id) {
        Ok(_) => CommandResult::success().with_change(change),
        Err(PaneError::LastPane) => CommandResult::not_applicable_because(
            "last pane in its tab; close the tab instead",
        ),
        Err(PaneError::NotFound(id)) => stale_or_unknown_pane(ctx, id),
    }
}

fn cmd_pane_focus(ctx: &mut CommandContext) -> CommandResult {
    let Some(raw) = ctx.param_u64("pane_id") else {
        return CommandResult::failure("missing 'pane_id' parameter");
    };
    let pane_id = PaneId::from_raw(raw);
    match ctx.model.focus_pane(pane_id) {
        Ok(()) => {
            let tab = ctx.model.active_tab_id();
            CommandResult::success().with_change(StateChange::focus(tab, Some(pane_id)))
        }
        Err(PaneError::NotFound(id)) => stale_or_unknown_pane(ctx, id),
        Err(err) => CommandResult::failure(err.to_string()),
    }
}

fn cmd_pane_maximize(ctx: &mut CommandContext) -> CommandResult {
    let Some(pane_id) = ctx.pane_arg("pane_id") else {
        return CommandResult::not_applicable_because("no active pane");
    };
    match ctx.model.maximize_pane(pane_id) {
        // Re-maximizing the zoomed pane is a successful no-op.
        Ok(_) => {
            let change = pane_change(ctx, pane_id);
            CommandResult::success().with_change(change)
        }
        Err(PaneError::NotFound(id)) => stale_or_unknown_pane(ctx, id),
        Err(err) => CommandResult::failure(err.to_string()),
    }
}

fn cmd_pane_restore(ctx: &mut CommandContext) -> CommandResult {
    let tab = ctx.model.active_tab_id();
    if ctx.model.restore_zoom() {
        let change = match tab {
            Some(tab) => StateChange::structural(tab),
            None => StateChange::full_resync(),
        };
        CommandResult::success().with_change(change)
    } else {
        CommandResult::not_applicable_because("no pane is maximized")
    }
}

fn cmd_pane_even_sizes(ctx: &mut CommandContext) -> CommandResult {
    let Some(tab_id) = ctx.tab_arg("tab_id") else {
        return CommandResult::not_applicable_because("no active tab");
    };
    if ctx.model.even_sizes(tab_id) {
        CommandResult::success().with_change(StateChange::structural(tab_id))
    } else {
        stale_or_unknown_tab(ctx, tab_id)
    }
}

fn cmd_pane_extract(ctx: &mut CommandContext) -> CommandResult {
    let Some(pane_id) = ctx.pane_arg("pane_id") else {
        return CommandResult::not_applicable_because("no active pane");
    };
    match ctx.model.extract_to_new_tab(pane_id) {
        Ok(Some(tab_id)) => CommandResult::success_with(json!({ "tab_id": tab_id.raw() }))
            .with_change(StateChange::structural(tab_id).with_pane(pane_id)),
        Ok(None) => {
            CommandResult::not_applicable_because("pane is already the only pane in its tab")
        }
        Err(PaneError::NotFound(id)) => stale_or_unknown_pane(ctx, id),
        Err(err) => CommandResult::failure(err.to_string()),
    }
}

fn cmd_pane_resize(ctx: &mut CommandContext) -> CommandResult {
    let orientation = match parse_orientation(ctx) {
        Ok(o) => o,
        Err(result) => return result,
    };
    let delta = ctx.param_f64("delta").unwrap_or(0.05) as f32;
    let Some(pane_id) = ctx.pane_arg("pane_id") else {
        return CommandResult::not_applicable_because("no active pane");
    };
    match ctx.model.resize_pane(pane_id, orientation, delta) {
        Ok(true) => {
            let change = pane_change(ctx, pane_id);
            CommandResult::success().with_change(change)
        }
        Ok(false) => CommandResult::not_applicable_because(format!(
            "pane {pane_id} has no enclosing {} split",
            orientation.as_str()
        )),
        Err(PaneError::NotFound(id)) => stale_or_unknown_pane(ctx, id),
        Err(err) => CommandResult::failure(err.to_string()),
    }
}

// ── navigation ───────────────────────────────────────────────────────────

fn navigate(ctx: &mut CommandContext, direction: NavigationDirection) -> CommandResult {
    match ctx.model.navigate(direction) {
        Some(pane_id) => {
            let tab = ctx.model.active_tab_id();
            CommandResult::success_with(json!({ "pane_id": pane_id.raw() }))
                .with_change(StateChange::focus(tab, Some(pane_id)))
        }
        None => CommandResult::not_applicable_because("no pane in that direction"),
    }
}

// ── workspace ────────────────────────────────────────────────────────────

fn cmd_workspace_snapshot(ctx: &mut CommandContext) -> CommandResult {
    let state = crate::session::capture(ctx.model);
    match serde_json::to_value(&state) {
        Ok(payload) => CommandResult::success_with(payload).quiet(),
        Err(err) => CommandResult::failure(format!("failed to serialize workspace: {err}")),
    }
}

fn cmd_workspace_refresh_capabilities(ctx: &mut CommandContext) -> CommandResult {
    ctx.model.refresh_capabilities(ctx.capabilities);
    CommandResult::success().with_change(StateChange::full_resync())
}
