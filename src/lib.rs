//! Backend for a turn-based life simulation game.
//!
//! Orchestrates a conversational text model and an asynchronous
//! image-generation service: routes receive game state, build prompts from
//! templates, parse model replies into structured fields, and cache
//! generated images on disk keyed by prompt hash.

pub mod chat;
pub mod error;
pub mod game;
pub mod imagegen;
pub mod models;
pub mod prompts;
pub mod quiz;
pub mod server;
pub mod stages;

pub use error::{Error, Result};
