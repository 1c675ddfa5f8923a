// ── Device-listing adapter ──
//
// Lists the firewalls Panorama manages. Read-only: reports never change.

use tracing::debug;

use crate::error::CoreError;
use crate::model::{ManagedFirewall, Serial};
use crate::report::Report;
use crate::session::Target;

/// Serial numbers of managed firewalls, in Panorama's order.
pub async fn list_devices(
    target: &Target,
    only_connected: bool,
) -> Result<Report<Vec<Serial>>, CoreError> {
    let report = list_device_details(target, only_connected).await?;
    Ok(report.map(|devices| devices.into_iter().map(|d| d.serial).collect()))
}

/// Full records of managed firewalls, in Panorama's order.
pub async fn list_device_details(
    target: &Target,
    only_connected: bool,
) -> Result<Report<Vec<ManagedFirewall>>, CoreError> {
    let pano = target.manager("devices")?;
    let devices = pano.refresh_devices(only_connected).await?;
    debug!(count = devices.len(), only_connected, "listed managed firewalls");
    Ok(Report::unchanged(devices))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::session::{MockFirewallSession, MockPanoramaSession};
    use pretty_assertions::assert_eq;

    fn firewall(serial: &str, connected: bool) -> ManagedFirewall {
        ManagedFirewall {
            serial: Serial::new(serial).unwrap(),
            hostname: None,
            ip_address: None,
            model: Some("PA-440".into()),
            sw_version: None,
            connected,
        }
    }

    #[tokio::test]
    async fn firewall_target_is_rejected() {
        let mut fw = MockFirewallSession::new();
        fw.expect_commit().never();
        let target = Target::Standalone(Box::new(fw));

        let err = list_devices(&target, false).await.unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedTarget { .. }));
        assert!(err.to_string().contains("only supported on Panorama"));
    }

    #[tokio::test]
    async fn serials_in_manager_order() {
        let mut pano = MockPanoramaSession::new();
        pano.expect_refresh_devices()
            .withf(|only_connected| *only_connected)
            .times(1)
            .returning(|_| Ok(vec![firewall("003", true), firewall("001", true)]));
        let target = Target::Manager(Box::new(pano));

        let report = list_devices(&target, true).await.unwrap();
        assert!(!report.changed);
        let serials: Vec<_> = report.result.iter().map(Serial::as_str).collect();
        assert_eq!(serials, vec!["003", "001"]);
    }

    #[tokio::test]
    async fn details_keep_records() {
        let mut pano = MockPanoramaSession::new();
        pano.expect_refresh_devices()
            .returning(|_| Ok(vec![firewall("001", false)]));
        let target = Target::Manager(Box::new(pano));

        let report = list_device_details(&target, false).await.unwrap();
        assert_eq!(report.result, vec![firewall("001", false)]);
    }
}
