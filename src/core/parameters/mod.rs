//! Startup parameter loading
//!
//! Boards describe their configuration as a static table of overrides. The
//! table is applied on top of the registered defaults once at boot; a bad
//! entry is logged and skipped so one typo cannot keep the tracker offline.

use jtracker_core::parameters::{ParamValue, ParameterError, ParameterStore, TrackerParams};

/// One board-table override
pub type Override = (&'static str, ParamValue);

/// Host overrides baked in at build time (`TRACKER_HOST_IP`,
/// `TRACKER_HOST_PORT`). Unset or unparsable values are left out.
pub fn build_overrides() -> heapless::Vec<Override, 2> {
    host_overrides(env!("TRACKER_HOST_IP"), env!("TRACKER_HOST_PORT"))
}

fn host_overrides(ip: &str, port: &str) -> heapless::Vec<Override, 2> {
    let mut table = heapless::Vec::new();
    if let Some(ip) = parse_ipv4(ip) {
        let _ = table.push(("OUT_HOST_IP", ParamValue::Ipv4(ip)));
    }
    if let Ok(port) = port.parse::<u16>() {
        let _ = table.push(("OUT_HOST_PORT", ParamValue::Int(i32::from(port))));
    }
    table
}

/// Dotted-quad IPv4 address
pub fn parse_ipv4(text: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in octets.iter_mut() {
        *octet = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Register defaults, then apply `overrides` in order.
///
/// Returns how many overrides were rejected.
pub fn load_startup(
    store: &mut ParameterStore,
    overrides: &[Override],
) -> Result<usize, ParameterError> {
    TrackerParams::register_defaults(store)?;

    let mut rejected = 0;
    for (name, value) in overrides {
        if let Err(e) = store.set(name, value.clone()) {
            crate::log_warn!("parameter {} rejected: {}", name, e.as_str());
            rejected += 1;
        }
    }
    store.clear_dirty();
    Ok(rejected)
}
