//! The interaction state machine gating which mutations are currently allowed.

use thiserror::Error;

use crate::models::{Neuron, RelativeType};
use crate::sync::{Forest, NeuronCommands, NotificationSink, SlotId};

/// Context-menu commands driving the state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextMenuCommand {
    NotSet,
    #[default]
    New,
    Edit,
    Delete,
    AddRelative,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("no neuron is currently selected")]
    InvalidSelection,
}

/// Which deactivation request a confirmed delete issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Neuron { id: String, version: String },
    Terminal { id: String, version: String },
}

impl DeleteTarget {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Neuron { .. } => "Neuron removed",
            Self::Terminal { .. } => "Terminal removed",
        }
    }
}

/// Current selection, active command, and the derived UI-gating flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionState {
    command: ContextMenuCommand,
    selected: Option<SlotId>,
    edit: Option<Neuron>,
    controls_enabled: bool,
    confirm_visible: bool,
    menu_visible: bool,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionState {
    pub fn new() -> Self {
        Self {
            command: ContextMenuCommand::New,
            selected: None,
            edit: None,
            controls_enabled: true,
            confirm_visible: false,
            menu_visible: false,
        }
    }

    pub fn command(&self) -> ContextMenuCommand {
        self.command
    }

    pub fn selected(&self) -> Option<SlotId> {
        self.selected
    }

    pub fn edit_target(&self) -> Option<&Neuron> {
        self.edit.as_ref()
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn confirm_visible(&self) -> bool {
        self.confirm_visible
    }

    pub fn menu_visible(&self) -> bool {
        self.menu_visible
    }

    pub fn select(&mut self, slot: SlotId) {
        self.selected = Some(slot);
    }

    pub fn request_menu(&mut self) {
        self.menu_visible = true;
    }

    pub fn close_menu(&mut self) {
        self.menu_visible = false;
    }

    pub fn dismiss_confirm(&mut self) {
        self.confirm_visible = false;
    }

    /// Apply a command-changed event.
    ///
    /// Setting the already-active command is ignored: transitions fire on
    /// edges, not levels. `Edit`/`AddRelative` with nothing selected is a
    /// contract violation reported as [`StateError::InvalidSelection`], with
    /// no state change.
    pub fn set_command(
        &mut self,
        command: ContextMenuCommand,
        forest: &Forest,
    ) -> Result<(), StateError> {
        if self.command == command {
            return Ok(());
        }
        match command {
            ContextMenuCommand::New => {
                self.selected = None;
                self.edit = None;
                self.controls_enabled = true;
            }
            ContextMenuCommand::Delete => {
                self.confirm_visible = true;
            }
            ContextMenuCommand::Edit | ContextMenuCommand::AddRelative => {
                let slot = self.selected.ok_or(StateError::InvalidSelection)?;
                self.edit = Some(forest.node(slot).neuron.clone());
                self.controls_enabled = false;
            }
            ContextMenuCommand::NotSet => {}
        }
        self.command = command;
        Ok(())
    }

    /// Two-step reset: force `NotSet` then `New` so a listener bound to the
    /// entered-New edge fires even when the prior state was already new-like.
    pub fn reinitialize(&mut self, forest: &Forest) {
        // neither transition can fail
        let _ = self.set_command(ContextMenuCommand::NotSet, forest);
        let _ = self.set_command(ContextMenuCommand::New, forest);
    }

    /// Resolve which deactivation request the current selection maps to: a
    /// root neuron routes to node deactivation, a relation routes to terminal
    /// deactivation with the terminal's own id/version.
    pub fn delete_target(&self, forest: &Forest) -> Result<DeleteTarget, StateError> {
        let slot = self.selected.ok_or(StateError::InvalidSelection)?;
        let neuron = &forest.node(slot).neuron;
        let target = match (neuron.relative_type, neuron.terminal.as_ref()) {
            (RelativeType::NotSet, _) | (_, None) => DeleteTarget::Neuron {
                id: neuron.id.clone(),
                version: neuron.version.clone(),
            },
            (_, Some(terminal)) => DeleteTarget::Terminal {
                id: terminal.id.clone(),
                version: terminal.version.clone(),
            },
        };
        Ok(target)
    }
}

/// Carry out a confirmed delete for the current selection.
///
/// On success the outcome is reported and the state machine is reinitialized;
/// on failure the error is reported and the selection is left untouched so the
/// user may retry. Either way the confirm prompt is dismissed.
pub async fn confirm_delete<C, N>(
    state: &mut InteractionState,
    forest: &Forest,
    commands: &C,
    notifications: &N,
    avatar_url: &str,
) -> Result<(), StateError>
where
    C: NeuronCommands,
    N: NotificationSink,
{
    let target = state.delete_target(forest)?;
    state.dismiss_confirm();

    let result = match &target {
        DeleteTarget::Neuron { id, version } => {
            commands.deactivate_neuron(avatar_url, id, version).await
        }
        DeleteTarget::Terminal { id, version } => {
            commands.deactivate_terminal(avatar_url, id, version).await
        }
    };
    match result {
        Ok(()) => {
            state.reinitialize(forest);
            notifications.report_success(&format!("{} successfully.", target.description()));
        }
        Err(err) => {
            notifications.report_error(&err.to_string());
        }
    }
    Ok(())
}
