//! The Atom Publishing Protocol surface: service documents (what a server
//! offers) and the blocking protocol client (POST to publish, PUT to
//! update, DELETE to remove).

mod client;
mod service;

pub use service::{Categories, Collection, Service, Workspace};
