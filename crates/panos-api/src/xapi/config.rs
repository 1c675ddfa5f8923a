// XML API candidate-configuration endpoints
//
// `type=config` get/set/delete against the candidate configuration, plus
// typed helpers for the Panorama objects device onboarding touches:
// the managed-device inventory, device-group membership and template-stack
// membership. Changes only take effect after a commit.

use tracing::debug;

use crate::error::Error;
use crate::xapi::client::XapiClient;
use crate::xapi::models::{DeviceGroupEntry, TemplateStackEntry};
use crate::xapi::xpath;
use crate::xml::{self, Element};

/// PAN-OS response code for "object doesn't exist".
const CODE_OBJECT_NOT_PRESENT: u16 = 7;

impl XapiClient {
    // ── Generic ──────────────────────────────────────────────────────

    /// Fetch the candidate-config node at `xpath`.
    ///
    /// Returns `None` when the node does not exist.
    pub async fn get_config(&self, xpath: &str) -> Result<Option<Element>, Error> {
        debug!(xpath, "config get");
        let resp = match self
            .request(&[("type", "config"), ("action", "get"), ("xpath", xpath)])
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.api_code() == Some(CODE_OBJECT_NOT_PRESENT) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(resp
            .result()
            .and_then(|r| r.children().first())
            .cloned())
    }

    /// Merge `element` into the node at `xpath` (`action=set`).
    pub async fn set_config(&self, xpath: &str, element: &str) -> Result<(), Error> {
        debug!(xpath, element, "config set");
        self.request(&[
            ("type", "config"),
            ("action", "set"),
            ("xpath", xpath),
            ("element", element),
        ])
        .await?;
        Ok(())
    }

    /// Delete the node at `xpath`. Deleting a missing node succeeds.
    pub async fn delete_config(&self, xpath: &str) -> Result<(), Error> {
        debug!(xpath, "config delete");
        match self
            .request(&[("type", "config"), ("action", "delete"), ("xpath", xpath)])
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.api_code() == Some(CODE_OBJECT_NOT_PRESENT) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ── Managed-device inventory ─────────────────────────────────────

    /// Serials registered in Panorama's managed-device inventory.
    pub async fn managed_device_serials(&self) -> Result<Vec<String>, Error> {
        let devices = self.get_config(&xpath::managed_devices()).await?;
        Ok(devices
            .map(|d| {
                d.entries()
                    .filter_map(|e| e.attr("name"))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Add a firewall serial to the managed-device inventory.
    pub async fn register_device(&self, serial: &str) -> Result<(), Error> {
        self.set_config(&xpath::managed_devices(), &xml::entry(serial))
            .await
    }

    /// Remove a firewall serial from the managed-device inventory.
    pub async fn unregister_device(&self, serial: &str) -> Result<(), Error> {
        self.delete_config(&xpath::managed_device(serial)).await
    }

    // ── Device groups ────────────────────────────────────────────────

    /// Look up a device group by name.
    pub async fn device_group(&self, name: &str) -> Result<Option<DeviceGroupEntry>, Error> {
        let entry = self.get_config(&xpath::device_group(name)).await?;
        Ok(entry.as_ref().and_then(DeviceGroupEntry::from_entry))
    }

    pub async fn add_device_group_member(&self, group: &str, serial: &str) -> Result<(), Error> {
        let parent = format!("{}/devices", xpath::device_group(group));
        self.set_config(&parent, &xml::entry(serial)).await
    }

    pub async fn remove_device_group_member(&self, group: &str, serial: &str) -> Result<(), Error> {
        self.delete_config(&xpath::device_group_member(group, serial))
            .await
    }

    // ── Template stacks ──────────────────────────────────────────────

    /// Look up a template stack by name.
    pub async fn template_stack(&self, name: &str) -> Result<Option<TemplateStackEntry>, Error> {
        let entry = self.get_config(&xpath::template_stack(name)).await?;
        Ok(entry.as_ref().and_then(TemplateStackEntry::from_entry))
    }

    pub async fn add_template_stack_member(&self, stack: &str, serial: &str) -> Result<(), Error> {
        let parent = format!("{}/devices", xpath::template_stack(stack));
        self.set_config(&parent, &xml::entry(serial)).await
    }

    pub async fn remove_template_stack_member(
        &self,
        stack: &str,
        serial: &str,
    ) -> Result<(), Error> {
        self.delete_config(&xpath::template_stack_member(stack, serial))
            .await
    }
}
