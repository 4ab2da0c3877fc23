//! Tag filtering of listed vault items

use crate::models::RawRecord;

/// Identifiers of the items tagged with `tag`, in input order.
///
/// List output carries no section data, so callers fetch each returned
/// identifier again with [`crate::client::VaultCli::get_item`].
pub fn filter_by_tag(items: &[RawRecord], tag: &str) -> Vec<String> {
    items
        .iter()
        .filter(|item| item.has_tag(tag))
        .map(|item| item.uuid.clone())
        .collect()
}
