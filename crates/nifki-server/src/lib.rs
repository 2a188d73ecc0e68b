//! HTTP front end for the Nifki game wiki.
//!
//! Serves the page list, the editor, the save pipeline and the player. All
//! page logic lives in [`service::PageService`]; handlers only translate
//! between HTTP and the service, and [`render`] turns view models into HTML.

pub mod config;
pub mod csrf;
pub mod error;
pub mod handlers;
pub mod locks;
pub mod render;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
pub mod wrap;
