//! Partition naming
//!
//! Maps human-supplied organization names to safe partition identifiers.
//! An organization's `partition_id` is the sanitized name; the physical
//! partition in the shared store carries the [`PARTITION_NAMESPACE`] tag in
//! front of it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace tag prepended to every physical tenant partition.
pub const PARTITION_NAMESPACE: &str = "org_";

/// Longest accepted partition identifier, in bytes.
pub const MAX_PARTITION_ID_LEN: usize = 64;

/// Sanitize a raw organization name into a partition identifier.
///
/// Trims surrounding whitespace, lowercases, and replaces every maximal run
/// of characters outside `[a-z0-9_-]` with a single `_`. Total and
/// idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
///
/// # Examples
///
/// ```
/// use tenant_org::sanitize;
///
/// assert_eq!(sanitize("  Acme Corp "), "acme_corp");
/// assert_eq!(sanitize("R&D / Labs"), "r_d_labs");
/// assert_eq!(sanitize(""), "");
/// ```
pub fn sanitize(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_run = false;

    for c in lowered.chars() {
        if is_partition_char(c) {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    out
}

fn is_partition_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

/// Rejection raised when a name cannot back a partition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid organization name {name:?}: {reason}")]
pub struct InvalidName {
    /// The name as supplied
    pub name: String,
    /// Why it was rejected
    pub reason: &'static str,
}

/// Validated partition identifier derived from an organization name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionId(String);

impl PartitionId {
    /// Derive the partition identifier for an organization name.
    ///
    /// Names whose sanitized form has no ASCII letter or digit (empty,
    /// whitespace-only, punctuation-only) are rejected, as are identifiers
    /// longer than [`MAX_PARTITION_ID_LEN`].
    ///
    /// # Examples
    ///
    /// ```
    /// use tenant_org::PartitionId;
    ///
    /// let id = PartitionId::from_name("Acme Corp").unwrap();
    /// assert_eq!(id.as_str(), "acme_corp");
    /// assert_eq!(id.physical_name(), "org_acme_corp");
    ///
    /// assert!(PartitionId::from_name("   ").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self, InvalidName> {
        let id = sanitize(name);

        if !id.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidName {
                name: name.to_string(),
                reason: "name must contain at least one letter or digit",
            });
        }
        if id.len() > MAX_PARTITION_ID_LEN {
            return Err(InvalidName {
                name: name.to_string(),
                reason: "name is too long for a partition identifier",
            });
        }

        Ok(Self(id))
    }

    /// The sanitized identifier stored on the organization record.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the physical partition in the shared store.
    pub fn physical_name(&self) -> String {
        format!("{}{}", PARTITION_NAMESPACE, self.0)
    }
}

impl std::fmt::Display for PartitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartitionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize("Acme Corp"), "acme_corp");
        assert_eq!(sanitize("Acme Co"), "acme_co");
        assert_eq!(sanitize("  padded\t"), "padded");
        assert_eq!(sanitize("already_safe-name9"), "already_safe-name9");
    }

    #[test]
    fn test_sanitize_collapses_runs() {
        assert_eq!(sanitize("a  &&  b"), "a_b");
        assert_eq!(sanitize("Müller GmbH"), "m_ller_gmbh");
        assert_eq!(sanitize("!!!"), "_");
        // An existing underscore next to a replaced run is kept.
        assert_eq!(sanitize("a_ b"), "a__b");
    }

    #[test]
    fn test_sanitize_is_total_on_degenerate_input() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize("\n\t"), "");
    }

    #[test]
    fn test_sanitize_idempotent() {
        let inputs = [
            "",
            "   ",
            "Acme Corp",
            "R&D / Labs",
            "x__y",
            "--Já vú--",
            "UPPER lower 123",
            "tabs\tand\nnewlines",
            "日本語の会社",
            "a_ b",
            "!!!",
        ];

        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_sanitize_idempotent_over_printable_ascii() {
        for a in 0x20u8..0x7f {
            for b in [b' ', b'A', b'_', b'#'] {
                let input = format!("{}x{}", a as char, b as char);
                let once = sanitize(&input);
                assert_eq!(sanitize(&once), once);
            }
        }
    }

    #[test]
    fn test_partition_id_from_name() {
        let id = PartitionId::from_name("Acme Corp").unwrap();
        assert_eq!(id.as_str(), "acme_corp");
        assert_eq!(id.to_string(), "acme_corp");
        assert_eq!(id.physical_name(), "org_acme_corp");
    }

    #[test]
    fn test_partition_id_rejects_degenerate_names() {
        for name in ["", "   ", "!!!", "___", "-", "日本"] {
            let err = PartitionId::from_name(name).unwrap_err();
            assert_eq!(err.name, name);
        }
    }

    #[test]
    fn test_partition_id_rejects_long_names() {
        let name = "a".repeat(MAX_PARTITION_ID_LEN + 1);
        assert!(PartitionId::from_name(&name).is_err());

        let name = "a".repeat(MAX_PARTITION_ID_LEN);
        assert!(PartitionId::from_name(&name).is_ok());
    }

    #[test]
    fn test_colliding_names_share_partition() {
        let a = PartitionId::from_name("Acme Corp").unwrap();
        let b = PartitionId::from_name("ACME corp").unwrap();
        assert_eq!(a, b);

        let c = PartitionId::from_name("acme   CORP!").unwrap();
        assert_eq!(c.as_str(), "acme_corp_");
        assert_ne!(a, c);
    }
}
