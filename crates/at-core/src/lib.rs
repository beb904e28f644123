//! Core types for the controller
//!
//! This crate provides the fundamental types used throughout the automation
//! engine: I/O variables, conditions, condition groups, actions, action
//! groups, rules, the rule sequence, and device settings.
//!
//! Every collection is fixed-capacity; the capacities below are the only
//! sizes the rest of the workspace allocates.

mod device;
mod logic;
mod variable;
mod wire;

pub use device::DeviceSettings;
pub use logic::{
    Action, ActionGroup, ActionTarget, Condition, ConditionGroup, ConditionSource, Rule,
    RuleSequence,
};
pub use variable::{truncate_label, IoVariable, VariableKey};
pub use wire::{ActionType, CombineLogic, Comparison, DataType, OperationMode, WireEnum, WireError};

/// Number of digital input points
pub const MAX_DIGITAL_IN: usize = 6;

/// Number of digital output points
pub const MAX_DIGITAL_OUT: usize = 4;

/// Number of analog input points
pub const MAX_ANALOG_IN: usize = 4;

/// Number of software (internal) points
pub const MAX_SOFTIO: usize = 20;

/// Number of timers
pub const MAX_TIMERS: usize = 10;

/// Total size of the variable registry
pub const MAX_VARIABLES: usize =
    MAX_DIGITAL_IN + MAX_DIGITAL_OUT + MAX_ANALOG_IN + MAX_SOFTIO + MAX_TIMERS;

/// Number of condition slots
pub const MAX_CONDITIONS: usize = 50;

/// Number of condition group slots
pub const MAX_CONDITION_GROUPS: usize = 20;

/// Number of action slots
pub const MAX_ACTIONS: usize = 50;

/// Number of action group slots
pub const MAX_ACTION_GROUPS: usize = 20;

/// Number of rule slots, and the length of the rule sequence
pub const MAX_RULES: usize = 20;

/// Member slots in a condition group
pub const MAX_CONDITIONS_PER_GROUP: usize = 10;

/// Member slots in an action group
pub const MAX_ACTIONS_PER_GROUP: usize = 10;

/// Longest label (variable name, SSID, password, device name) in bytes
///
/// Matches the 30-byte NUL-terminated buffers of the controller firmware.
pub const MAX_LABEL_LEN: usize = 29;
