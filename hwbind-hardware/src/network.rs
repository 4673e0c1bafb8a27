//! Network interface enumeration and filtering.
//!
//! Only interfaces that look like physical, active NICs contribute to a
//! fingerprint. Container bridges, loopback and interface aliases are
//! ignored so that starting a container or adding an alias does not change
//! the machine's identity.

use std::net::IpAddr;

/// One network interface as reported by the operating system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceRecord {
    /// Interface name (`eth0`, `Ethernet 2`, ...).
    pub name: String,
    /// Administratively up.
    pub is_up: bool,
    /// Loopback device.
    pub is_loopback: bool,
    /// Virtual sub-interface (alias) or adapter reported virtual by the OS.
    pub is_virtual: bool,
    /// Hardware address, if the interface has one.
    pub mac: Option<[u8; 6]>,
    /// Addresses bound to the interface.
    pub addresses: Vec<IpAddr>,
}

impl InterfaceRecord {
    /// Creates an empty, down record for `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Addresses and hardware addresses that identify the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkIdentity {
    /// Distinct qualifying addresses, lower-cased, in discovery order.
    pub ip_addresses: Vec<String>,
    /// Distinct MACs of interfaces that carried a qualifying address.
    pub mac_addresses: Vec<String>,
}

/// Returns true if the interface may contribute to the fingerprint.
#[must_use]
pub fn interface_qualifies(iface: &InterfaceRecord, excluded_prefixes: &[String]) -> bool {
    iface.is_up
        && !iface.is_loopback
        && !iface.is_virtual
        && !excluded_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && iface.name.starts_with(prefix.as_str()))
}

/// Returns true if the address identifies the host on a network.
#[must_use]
pub fn address_qualifies(addr: &IpAddr) -> bool {
    if addr.is_loopback() || addr.is_multicast() || addr.is_unspecified() {
        return false;
    }
    match addr {
        IpAddr::V4(v4) => !v4.is_link_local(),
        IpAddr::V6(v6) => !v6.is_unicast_link_local(),
    }
}

/// Formats a hardware address as `XX-XX-XX-XX-XX-XX`.
#[must_use]
pub fn format_mac(mac: &[u8; 6]) -> String {
    mac.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join("-")
}

/// Reduces raw interfaces to the host's network identity.
#[must_use]
pub fn summarize(interfaces: &[InterfaceRecord], excluded_prefixes: &[String]) -> NetworkIdentity {
    let mut identity = NetworkIdentity::default();

    for iface in interfaces
        .iter()
        .filter(|i| interface_qualifies(i, excluded_prefixes))
    {
        let mut carried_address = false;
        for addr in iface.addresses.iter().filter(|a| address_qualifies(a)) {
            carried_address = true;
            let text = addr.to_string().to_lowercase();
            if !identity.ip_addresses.contains(&text) {
                identity.ip_addresses.push(text);
            }
        }

        if !carried_address {
            continue;
        }
        if let Some(mac) = iface.mac.filter(|m| m.iter().any(|b| *b != 0)) {
            let text = format_mac(&mac);
            if !identity.mac_addresses.contains(&text) {
                identity.mac_addresses.push(text);
            }
        }
    }

    identity
}

/// Lists interfaces via `getifaddrs(3)`.
#[cfg(unix)]
pub(crate) fn unix_interfaces() -> Vec<InterfaceRecord> {
    use nix::ifaddrs::getifaddrs;
    use nix::net::if_::InterfaceFlags;

    let addrs = match getifaddrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            tracing::debug!("getifaddrs failed: {}", e);
            return Vec::new();
        }
    };

    let mut records: Vec<InterfaceRecord> = Vec::new();
    for ifaddr in addrs {
        let idx = match records.iter().position(|r| r.name == ifaddr.interface_name) {
            Some(idx) => idx,
            None => {
                records.push(InterfaceRecord::named(ifaddr.interface_name.clone()));
                records.len() - 1
            }
        };
        let record = &mut records[idx];
        record.is_up |= ifaddr.flags.contains(InterfaceFlags::IFF_UP);
        record.is_loopback |= ifaddr.flags.contains(InterfaceFlags::IFF_LOOPBACK);

        let Some(address) = ifaddr.address else {
            continue;
        };
        if let Some(v4) = address.as_sockaddr_in() {
            record.addresses.push(IpAddr::V4(v4.ip()));
        } else if let Some(v6) = address.as_sockaddr_in6() {
            record.addresses.push(IpAddr::V6(v6.ip()));
        } else if let Some(mac) = link_mac(&address) {
            record.mac = Some(mac);
        }
    }

    // Linux reports IPv4 aliases as separate names (`eth0:1`). They share the
    // parent's MAC, so give them the parent's hardware address for logging
    // but keep them out of the fingerprint.
    let parents: Vec<(String, Option<[u8; 6]>)> =
        records.iter().map(|r| (r.name.clone(), r.mac)).collect();
    for record in &mut records {
        if let Some((parent, _)) = record.name.split_once(':') {
            record.is_virtual = true;
            if record.mac.is_none() {
                record.mac = parents
                    .iter()
                    .find(|(name, _)| name == parent)
                    .and_then(|(_, mac)| *mac);
            }
        }
    }

    records
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn link_mac(address: &nix::sys::socket::SockaddrStorage) -> Option<[u8; 6]> {
    address.as_link_addr().and_then(|link| link.addr())
}

#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd",
        target_os = "dragonfly"
    ))
))]
fn link_mac(_address: &nix::sys::socket::SockaddrStorage) -> Option<[u8; 6]> {
    None
}

/// PowerShell one-liner printing `name|mac|virtual|address` per bound address
/// of every adapter that is up.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) const WINDOWS_ADAPTER_SCRIPT: &str = "Get-NetAdapter | Where-Object Status -eq 'Up' | \
ForEach-Object { $a = $_; Get-NetIPAddress -InterfaceIndex $a.ifIndex -ErrorAction SilentlyContinue | \
ForEach-Object { '{0}|{1}|{2}|{3}' -f $a.Name, $a.MacAddress, $a.Virtual, $_.IPAddress } }";

/// Parses the output of [`WINDOWS_ADAPTER_SCRIPT`].
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn parse_windows_adapters(output: &str) -> Vec<InterfaceRecord> {
    let mut records: Vec<InterfaceRecord> = Vec::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() != 4 {
            continue;
        }
        let (name, mac, is_virtual, address) = (parts[0], parts[1], parts[2], parts[3]);

        let idx = match records.iter().position(|r| r.name == name) {
            Some(idx) => idx,
            None => {
                let mut record = InterfaceRecord::named(name);
                record.is_up = true;
                record.is_virtual = is_virtual.eq_ignore_ascii_case("true");
                record.mac = parse_mac(mac);
                records.push(record);
                records.len() - 1
            }
        };

        // Scoped IPv6 addresses come back as `fe80::1%12`.
        let address = address.split('%').next().unwrap_or(address);
        if let Ok(ip) = address.parse::<IpAddr>() {
            records[idx].is_loopback |= ip.is_loopback();
            records[idx].addresses.push(ip);
        }
    }

    records
}

/// Parses `00-15-5D-01-02-03` or `00:15:5d:01:02:03`.
fn parse_mac(text: &str) -> Option<[u8; 6]> {
    let octets: Vec<u8> = text
        .split(['-', ':'])
        .map(|part| u8::from_str_radix(part, 16))
        .collect::<Result<_, _>>()
        .ok()?;
    octets.try_into().ok()
}
