//! API module.

pub mod health;
pub mod predict;
