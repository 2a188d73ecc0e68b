//! Request and view-model types.
//!
//! - [`forms`]: the save form as submitted, and its validator table
//! - [`views`]: what the service hands back for rendering

pub mod forms;
pub mod views;
