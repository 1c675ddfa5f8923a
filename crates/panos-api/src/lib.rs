// panos-api: Async Rust client for the PAN-OS and Panorama XML API

pub mod error;
pub mod transport;
pub mod xapi;
pub mod xml;

pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use xapi::models::{
    CommitAllRequest, DeviceEntry, DeviceGroupEntry, Job, JobDevice, JobState, SystemInfo,
    TemplateStackEntry,
};
pub use xapi::{XapiClient, XapiResponse};
