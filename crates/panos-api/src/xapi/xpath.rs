// Configuration xpaths
//
// Panorama keeps managed devices, device groups and template stacks under
// fixed xpaths. Names are embedded in `[@name='...']` predicates, so any
// value containing a single quote switches to double-quote delimiters, and
// one containing both quote characters is spelled with `concat()`.

/// Panorama's own vsys-less device entry.
const LOCALHOST: &str = "/config/devices/entry[@name='localhost.localdomain']";

/// Quote a value for an xpath `[@name=...]` predicate.
pub fn quote(value: &str) -> String {
    match (value.contains('\''), value.contains('"')) {
        (false, _) => format!("'{value}'"),
        (true, false) => format!("\"{value}\""),
        (true, true) => {
            let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
            format!("concat({})", parts.join(", \"'\", "))
        }
    }
}

/// `/config/mgt-config/devices` (Panorama's managed-firewall inventory).
pub fn managed_devices() -> String {
    "/config/mgt-config/devices".to_owned()
}

/// A single managed firewall by serial.
pub fn managed_device(serial: &str) -> String {
    format!("{}/entry[@name={}]", managed_devices(), quote(serial))
}

/// A device group by name.
pub fn device_group(name: &str) -> String {
    format!("{LOCALHOST}/device-group/entry[@name={}]", quote(name))
}

/// A firewall's membership entry inside a device group.
pub fn device_group_member(group: &str, serial: &str) -> String {
    format!("{}/devices/entry[@name={}]", device_group(group), quote(serial))
}

/// A template stack by name.
pub fn template_stack(name: &str) -> String {
    format!("{LOCALHOST}/template-stack/entry[@name={}]", quote(name))
}

/// A firewall's membership entry inside a template stack.
pub fn template_stack_member(stack: &str, serial: &str) -> String {
    format!(
        "{}/devices/entry[@name={}]",
        template_stack(stack),
        quote(serial)
    )
}
