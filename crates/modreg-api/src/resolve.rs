//! Resolution engine over a [`CapabilityTable`].
//!
//! All queries share one shape: scan interfaces for the first whose identity
//! matches, then (for model queries) scan that interface's models the same
//! way. Matching ignores ASCII case. A miss at either level is `None`, an
//! empty list, or `false`; turning that into an error is the caller's job.

use crate::capability::{CapabilityTable, InterfaceEntry, ModelEntry};
use crate::instance::Instance;

/// Run `execute` on the first item satisfying `matches`.
///
/// Items after the first match are never inspected, and `execute` runs at
/// most once. Returns `None` when nothing matches.
pub fn scan<'a, T, R>(
    items: impl IntoIterator<Item = &'a T>,
    mut matches: impl FnMut(&T) -> bool,
    execute: impl FnOnce(&'a T) -> R,
) -> Option<R>
where
    T: 'a,
{
    items.into_iter().find(|item| matches(*item)).map(execute)
}

fn interface_matches(interface: &str) -> impl Fn(&InterfaceEntry) -> bool + '_ {
    move |entry| entry.interface().eq_ignore_ascii_case(interface)
}

fn model_matches(model: &str) -> impl Fn(&ModelEntry) -> bool + '_ {
    move |entry| entry.model().eq_ignore_ascii_case(model)
}

/// Construct `model` of `interface`, erased behind the interface type.
///
/// Only the matched model is constructed.
pub fn resolve(table: &CapabilityTable, interface: &str, model: &str) -> Option<Instance> {
    scan(table.entries(), interface_matches(interface), |entry| {
        scan(entry.models(), model_matches(model), ModelEntry::construct)
    })
    .flatten()
}

/// Whether the table lists `model` under `interface`.
pub fn exists(table: &CapabilityTable, interface: &str, model: &str) -> bool {
    scan(table.entries(), interface_matches(interface), |entry| {
        scan(entry.models(), model_matches(model), |_| ()).is_some()
    })
    .unwrap_or(false)
}

/// Model identities of `interface` in declaration order; empty if unknown.
pub fn list_model_ids(table: &CapabilityTable, interface: &str) -> Vec<String> {
    scan(table.entries(), interface_matches(interface), |entry| {
        entry.model_ids().map(str::to_string).collect()
    })
    .unwrap_or_default()
}

/// Every interface identity in the table, in declaration order.
pub fn list_interface_ids(table: &CapabilityTable) -> Vec<String> {
    table
        .entries()
        .iter()
        .map(|entry| entry.interface().to_string())
        .collect()
}
