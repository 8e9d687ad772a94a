// ── Grouping engine ──
//
// Partitions the OSC address table into groups keyed by the first path
// segment of each address (`/car/speed` → `car`). Addresses without a
// leading word segment land in the `Other` group. Group order is the order
// in which each group is first encountered in the table; members keep table
// order within their group.

use serde::Serialize;
use strum::Display;
use teledash_api::{OscAddressEntry, OscAddressTable};

use crate::error::CoreError;

/// Group key and label for addresses with no recognisable first segment.
pub const OTHER_GROUP: &str = "Other";

// ── Keys & labels ────────────────────────────────────────────────────

/// First path segment of an OSC address: a `/` followed by one or more
/// word characters (`[A-Za-z0-9_]`). `None` when the address does not
/// start that way.
pub fn group_key(address: &str) -> Option<&str> {
    let rest = address.strip_prefix('/')?;
    let end = rest
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(rest.len(), |(i, _)| i);
    if end == 0 { None } else { Some(&rest[..end]) }
}

/// Group key for an entry, falling back to [`OTHER_GROUP`].
pub fn entry_group_key(entry: &OscAddressEntry) -> &str {
    group_key(&entry.address).unwrap_or(OTHER_GROUP)
}

/// Display label: the key with its first letter upper-cased.
pub fn group_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Group types ──────────────────────────────────────────────────────

/// Aggregate enablement of a group's members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupState {
    /// Every member enabled.
    All,
    /// At least one, but not every, member enabled.
    Some,
    /// No member enabled.
    None,
}

/// Visual state of a parent checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TriState {
    Checked,
    Indeterminate,
    Unchecked,
}

impl From<GroupState> for TriState {
    fn from(state: GroupState) -> Self {
        match state {
            GroupState::All => Self::Checked,
            GroupState::Some => Self::Indeterminate,
            GroupState::None => Self::Unchecked,
        }
    }
}

/// One member of a group, referencing the table entry by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    pub key: String,
    pub address: String,
    pub enabled: bool,
    pub allow_zero: bool,
}

/// Entries sharing an address prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressGroup {
    pub key: String,
    pub label: String,
    pub members: Vec<GroupMember>,
}

impl AddressGroup {
    /// `true` when every member is enabled.
    pub fn all(&self) -> bool {
        self.members.iter().all(|m| m.enabled)
    }

    /// `true` when at least one member is enabled.
    pub fn some(&self) -> bool {
        self.members.iter().any(|m| m.enabled)
    }

    pub fn state(&self) -> GroupState {
        if self.all() {
            GroupState::All
        } else if self.some() {
            GroupState::Some
        } else {
            GroupState::None
        }
    }

    pub fn tri_state(&self) -> TriState {
        self.state().into()
    }

    pub fn enabled_count(&self) -> usize {
        self.members.iter().filter(|m| m.enabled).count()
    }
}

// ── Operations ───────────────────────────────────────────────────────

/// Partition `table` into groups. Every key lands in exactly one group.
pub fn group_by_prefix(table: &OscAddressTable) -> Vec<AddressGroup> {
    let mut groups: Vec<AddressGroup> = Vec::new();

    for (key, entry) in table.iter() {
        let group = entry_group_key(entry);
        let member = GroupMember {
            key: key.clone(),
            address: entry.address.clone(),
            enabled: entry.enabled,
            allow_zero: entry.allows_zero(),
        };

        if let Some(existing) = groups.iter_mut().find(|g| g.key == group) {
            existing.members.push(member);
        } else {
            groups.push(AddressGroup {
                key: group.to_owned(),
                label: group_label(group),
                members: vec![member],
            });
        }
    }

    groups
}

/// Set `enabled` on every member of `group` in one pass. Returns how many
/// entries belong to the group.
pub fn set_group_enabled(
    table: &mut OscAddressTable,
    group: &str,
    enabled: bool,
) -> Result<usize, CoreError> {
    let mut touched = 0;
    for entry in table.values_mut() {
        if entry_group_key(entry) == group {
            entry.enabled = enabled;
            touched += 1;
        }
    }

    if touched == 0 {
        return Err(CoreError::UnknownGroup {
            group: group.to_owned(),
        });
    }
    Ok(touched)
}
