//! Lendguard Actions - per-action validation
//!
//! Composes reserve valuation, obligation health and the outflow limiter
//! into the numbers a user sees before submitting an action:
//! - the maximum amount they may deposit, borrow, withdraw or repay
//! - whether the submit button is disabled, and why
//! - non-blocking looping warnings

pub mod action;
pub mod ceiling;
pub mod config;
pub mod context;
pub mod error;
pub mod validate;
pub mod warning;

pub use action::Action;
pub use ceiling::{ceilings, Ceiling, CeilingValue, Reason};
pub use config::ActionConfig;
pub use context::ActionContext;
pub use error::ActionError;
pub use validate::{get_max_value, get_submit_button_state, SubmitButtonState};
pub use warning::get_submit_warning_messages;
