// ── XML-API-backed session ──
//
// Opens an authenticated `XapiClient`, classifies the device from
// `show system info`, and implements both session traits on top of the
// client's op/config/commit calls.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use panos_api::transport::{TlsMode, TransportConfig};
use panos_api::XapiClient;

use crate::config::{AuthCredentials, ConnectionConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    CommitAllRequest, CommitResult, DeviceGroup, ManagedFirewall, Serial, TemplateStack,
};
use crate::session::{FirewallSession, PanoramaSession, Target};

/// A session over the PAN-OS XML API.
pub struct XapiSession {
    client: XapiClient,
    poll_interval: Duration,
    job_timeout: Option<Duration>,
}

impl XapiSession {
    /// Wait for a commit job. A push also waits for every firewall result.
    async fn run_job(
        &self,
        job: Option<u64>,
        push: bool,
    ) -> Result<Option<CommitResult>, CoreError> {
        let Some(id) = job else {
            return Ok(None);
        };
        let job = if push {
            self.client
                .wait_for_push(id, self.poll_interval, self.job_timeout)
                .await?
        } else {
            self.client
                .wait_for_job(id, self.poll_interval, self.job_timeout)
                .await?
        };
        debug!(job = id, result = ?job.result, "commit job finished");
        Ok(Some(CommitResult::from(job)))
    }
}

/// Connect, authenticate and classify the device.
pub async fn connect(config: &ConnectionConfig) -> Result<Target, CoreError> {
    let url = config.base_url()?;
    let client = XapiClient::new(url.clone(), &build_transport(config))?;

    match &config.auth {
        AuthCredentials::ApiKey(key) => client.set_api_key(key.clone()),
        AuthCredentials::Credentials { username, password } => {
            client
                .keygen(username, password)
                .await
                .map_err(|e| connect_error(e.into(), &url, config.timeout))?;
        }
    }

    let info = client
        .system_info()
        .await
        .map_err(|e| connect_error(e.into(), &url, config.timeout))?;
    let manager = info.is_panorama();
    info!(
        host = %url,
        hostname = info.hostname.as_deref().unwrap_or("-"),
        model = info.model.as_deref().unwrap_or("-"),
        manager,
        "connected"
    );

    let session = XapiSession {
        client,
        poll_interval: config.job_poll_interval,
        job_timeout: config.job_timeout,
    };
    Ok(if manager {
        Target::Manager(Box::new(session))
    } else {
        Target::Standalone(Box::new(session))
    })
}

fn build_transport(config: &ConnectionConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

/// Attach the host and configured timeout to early connection failures.
fn connect_error(err: CoreError, url: &url::Url, timeout: Duration) -> CoreError {
    match err {
        CoreError::RequestTimedOut { .. } => CoreError::Timeout {
            timeout_secs: timeout.as_secs(),
        },
        CoreError::ConnectionFailed { reason, .. } => CoreError::ConnectionFailed {
            url: url.to_string(),
            reason,
        },
        other => other,
    }
}

fn serials(raw: Vec<String>) -> Vec<Serial> {
    raw.iter().filter_map(|s| Serial::new(s).ok()).collect()
}

#[async_trait]
impl FirewallSession for XapiSession {
    async fn commit(&self) -> Result<Option<CommitResult>, CoreError> {
        let job = self.client.commit().await?;
        self.run_job(job, false).await
    }
}

#[async_trait]
impl PanoramaSession for XapiSession {
    async fn commit(&self) -> Result<Option<CommitResult>, CoreError> {
        let job = self.client.commit().await?;
        self.run_job(job, false).await
    }

    async fn commit_all(
        &self,
        request: &CommitAllRequest,
    ) -> Result<Option<CommitResult>, CoreError> {
        let push = panos_api::CommitAllRequest::from(request);
        let job = self.client.commit_all(&push).await?;
        self.run_job(job, true).await
    }

    async fn refresh_devices(
        &self,
        only_connected: bool,
    ) -> Result<Vec<ManagedFirewall>, CoreError> {
        let entries = self.client.show_devices(only_connected).await?;
        Ok(entries
            .into_iter()
            .filter_map(|e| {
                Some(ManagedFirewall {
                    serial: Serial::new(&e.serial).ok()?,
                    hostname: e.hostname,
                    ip_address: e.ip_address,
                    model: e.model,
                    sw_version: e.sw_version,
                    connected: e.connected,
                })
            })
            .collect())
    }

    async fn is_registered(&self, serial: &Serial) -> Result<bool, CoreError> {
        let known = self.client.managed_device_serials().await?;
        Ok(known.iter().any(|s| serial == s.as_str()))
    }

    async fn register_firewall(&self, serial: &Serial) -> Result<(), CoreError> {
        info!(%serial, "registering firewall");
        Ok(self.client.register_device(serial.as_str()).await?)
    }

    async fn unregister_firewall(&self, serial: &Serial) -> Result<(), CoreError> {
        info!(%serial, "removing firewall from inventory");
        Ok(self.client.unregister_device(serial.as_str()).await?)
    }

    async fn device_group(&self, name: &str) -> Result<Option<DeviceGroup>, CoreError> {
        let entry = self.client.device_group(name).await?;
        Ok(entry.map(|dg| DeviceGroup {
            name: dg.name,
            devices: serials(dg.devices),
        }))
    }

    async fn add_to_device_group(&self, group: &str, serial: &Serial) -> Result<(), CoreError> {
        info!(%serial, group, "adding firewall to device group");
        Ok(self
            .client
            .add_device_group_member(group, serial.as_str())
            .await?)
    }

    async fn remove_from_device_group(
        &self,
        group: &str,
        serial: &Serial,
    ) -> Result<(), CoreError> {
        info!(%serial, group, "removing firewall from device group");
        Ok(self
            .client
            .remove_device_group_member(group, serial.as_str())
            .await?)
    }

    async fn template_stack(&self, name: &str) -> Result<Option<TemplateStack>, CoreError> {
        let entry = self.client.template_stack(name).await?;
        Ok(entry.map(|ts| TemplateStack {
            name: ts.name,
            templates: ts.templates,
            devices: ts.devices.map(serials),
        }))
    }

    async fn add_to_template_stack(&self, stack: &str, serial: &Serial) -> Result<(), CoreError> {
        info!(%serial, stack, "adding firewall to template stack");
        Ok(self
            .client
            .add_template_stack_member(stack, serial.as_str())
            .await?)
    }

    async fn remove_from_template_stack(
        &self,
        stack: &str,
        serial: &Serial,
    ) -> Result<(), CoreError> {
        info!(%serial, stack, "removing firewall from template stack");
        Ok(self
            .client
            .remove_template_stack_member(stack, serial.as_str())
            .await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn connect_timeout_reports_configured_limit() {
        let url = url::Url::parse("https://pano.example/").unwrap();
        let err = connect_error(
            CoreError::RequestTimedOut {
                url: "https://pano.example/api/".into(),
            },
            &url,
            Duration::from_secs(30),
        );
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 30 }));
        assert_eq!(err.to_string(), "Timed out after 30s");
    }

    #[test]
    fn connect_refusal_names_the_host() {
        let url = url::Url::parse("https://pano.example/").unwrap();
        let err = connect_error(
            CoreError::ConnectionFailed {
                url: "<unknown>".into(),
                reason: "refused".into(),
            },
            &url,
            Duration::from_secs(30),
        );
        assert!(matches!(
            err,
            CoreError::ConnectionFailed { ref url, .. } if url == "https://pano.example/"
        ));
    }
}
