// XML API client modules
//
// Hand-written client for the PAN-OS / Panorama XML API (`/api/`).
// Covers key generation, operational commands, candidate-config edits and
// commits, all wrapped in the `<response status="...">` envelope.

pub mod auth;
pub mod client;
pub mod commit;
pub mod config;
pub mod models;
pub mod op;
pub mod xpath;

pub use client::{XapiClient, XapiResponse};
