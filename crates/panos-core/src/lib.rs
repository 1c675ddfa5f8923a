// panos-core: Domain layer between panos-api and consumers (CLI).

pub mod commit;
pub mod config;
pub mod devices;
pub mod error;
pub mod model;
pub mod onboard;
pub mod report;
pub mod session;
pub mod xapi;

// ── Primary re-exports ──────────────────────────────────────────────
pub use commit::{CommitRequest, commit};
pub use config::{AuthCredentials, ConnectionConfig, TlsVerification};
pub use devices::{list_device_details, list_devices};
pub use error::CoreError;
pub use onboard::{Convergence, OnboardAction, OnboardRequest, onboard};
pub use report::{Failure, Report};
pub use session::{FirewallSession, PanoramaSession, Target};
pub use xapi::{XapiSession, connect};

pub use model::{
    CommitAllRequest, CommitOutcome, CommitResult, CommitSummary, DesiredState, DeviceGroup,
    DevicePush, ManagedFirewall, Serial, TemplateStack,
};
