//! Resolution of the tracked address list.

use crate::error::{Error, Result};
use crate::state::Address;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Legacy JSON address list.
#[derive(Debug, Deserialize)]
struct AddressFile {
    #[serde(default)]
    addresses: Vec<String>,
}

/// Read addresses from a JSON file shaped `{"addresses": [...]}`.
pub fn load_address_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    let file: AddressFile = serde_json::from_str(&content)?;
    Ok(file.addresses)
}

/// Merge address sources in priority order, dropping duplicates.
///
/// The first occurrence of an address wins its position. An empty result is
/// a configuration error since there would be nothing to poll.
pub fn resolve_addresses<I, S>(sources: I) -> Result<Vec<Address>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut addresses = Vec::new();

    for raw in sources {
        let address = Address::parse(raw)?;
        if seen.insert(address.clone()) {
            addresses.push(address);
        }
    }

    if addresses.is_empty() {
        return Err(Error::config(
            "no hotspot addresses given (pass them as arguments or set `addresses` in the config)",
        ));
    }
    Ok(addresses)
}
