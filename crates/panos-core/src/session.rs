// ── Authenticated sessions ──
//
// The adapters program against these traits rather than the XML API
// client, so a firewall and a Panorama expose only what they can do.
// `XapiSession` implements both; tests substitute mockall mocks.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::{CommitAllRequest, CommitResult, DeviceGroup, ManagedFirewall, Serial, TemplateStack};

/// A standalone firewall: it can only commit its own configuration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FirewallSession: Send + Sync {
    /// Commit the candidate configuration and wait for the job.
    ///
    /// Returns `None` when there was nothing to commit.
    async fn commit(&self) -> Result<Option<CommitResult>, CoreError>;
}

/// A Panorama manager.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PanoramaSession: Send + Sync {
    /// Commit Panorama's own candidate configuration and wait for the job.
    async fn commit(&self) -> Result<Option<CommitResult>, CoreError>;

    /// Push a device group to its firewalls and wait for the job.
    async fn commit_all(
        &self,
        request: &CommitAllRequest,
    ) -> Result<Option<CommitResult>, CoreError>;

    /// Fetch the current list of managed firewalls, in Panorama's order.
    async fn refresh_devices(&self, only_connected: bool)
    -> Result<Vec<ManagedFirewall>, CoreError>;

    // ── Inventory ──
    async fn is_registered(&self, serial: &Serial) -> Result<bool, CoreError>;
    async fn register_firewall(&self, serial: &Serial) -> Result<(), CoreError>;
    async fn unregister_firewall(&self, serial: &Serial) -> Result<(), CoreError>;

    // ── Device groups ──
    async fn device_group(&self, name: &str) -> Result<Option<DeviceGroup>, CoreError>;
    async fn add_to_device_group(&self, group: &str, serial: &Serial) -> Result<(), CoreError>;
    async fn remove_from_device_group(&self, group: &str, serial: &Serial)
    -> Result<(), CoreError>;

    // ── Template stacks ──
    async fn template_stack(&self, name: &str) -> Result<Option<TemplateStack>, CoreError>;
    async fn add_to_template_stack(&self, stack: &str, serial: &Serial) -> Result<(), CoreError>;
    async fn remove_from_template_stack(
        &self,
        stack: &str,
        serial: &Serial,
    ) -> Result<(), CoreError>;
}

/// A connected device, classified once at connect time.
pub enum Target {
    Standalone(Box<dyn FirewallSession>),
    Manager(Box<dyn PanoramaSession>),
}

impl Target {
    /// `"firewall"` or `"panorama"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standalone(_) => "firewall",
            Self::Manager(_) => "panorama",
        }
    }

    /// The Panorama session, or `UnsupportedTarget` for a firewall.
    pub fn manager(&self, operation: &str) -> Result<&dyn PanoramaSession, CoreError> {
        match self {
            Self::Manager(session) => Ok(session.as_ref()),
            Self::Standalone(_) => Err(CoreError::UnsupportedTarget {
                operation: operation.to_owned(),
            }),
        }
    }

    /// Commit the connected device's own configuration.
    pub async fn commit_local(&self) -> Result<Option<CommitResult>, CoreError> {
        match self {
            Self::Standalone(fw) => fw.commit().await,
            Self::Manager(pano) => pano.commit().await,
        }
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Target").field(&self.kind()).finish()
    }
}
