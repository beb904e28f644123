//! Automation Engine
//!
//! This crate runs the controller's declarative rules against the
//! [`AutomationStore`](at_store::AutomationStore).
//!
//! # Architecture
//!
//! ```text
//! RULE = CONDITION SOURCE → ACTION TARGET
//! ```
//!
//! - **Conditions**: Comparisons against one variable, optionally folded
//!   into AND/OR groups
//! - **Actions**: Mutations of one variable, optionally run as ordered groups
//! - **Rules**: Bind one source to one target, run in rule-sequence order
//!
//! # Key Types
//!
//! - [`ConditionEvaluator`] - Read-only condition and group evaluation
//! - [`ActionExecutor`] - Applies actions and action groups
//! - [`RuleEngine`] - Runs one tick over the rule sequence
//! - [`IoReconciler`] - Syncs variables with pins and timers around a tick

pub mod engine;
pub mod eval;
pub mod exec;
pub mod io;

pub use engine::{RuleEngine, TickReport};
pub use eval::ConditionEvaluator;
pub use exec::ActionExecutor;
pub use io::{
    scale_analog, Clock, IoBackend, IoReconciler, ManualClock, SimulatedIo, SystemClock,
    ANALOG_FULL_SCALE,
};
