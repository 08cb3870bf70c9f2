//! The set of profile names that must never be removed.
//!
//! Protection has two layers. Membership covers the fixed defaults, the
//! caller's keep-list and the current interactive user. The pattern layer
//! covers any name containing `admin-`, without that name being a member.

use std::collections::BTreeMap;

/// Profiles protected on every host.
pub const DEFAULT_ESSENTIAL: &[&str] = &["Administrator", "Default", "Public", "sshd", "OIT Help Desk"];

/// Case-insensitive substring marking administrative accounts.
pub const ADMIN_PATTERN: &str = "admin-";

/// Which layer protected a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exemption {
    /// Named by the defaults, the keep-list, or the current user.
    Member,
    /// Name contains [`ADMIN_PATTERN`].
    AdminPattern,
}

impl Exemption {
    pub fn describe(self) -> &'static str {
        match self {
            Exemption::Member => "protected name",
            Exemption::AdminPattern => "admin- account",
        }
    }
}

/// Immutable per-run set of protected names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssentialSet {
    // lowercased key -> name as supplied
    members: BTreeMap<String, String>,
}

impl EssentialSet {
    /// Build the set from the caller's keep-list and the current user.
    ///
    /// Keep-list names are not checked against existing profiles, so names
    /// for accounts that do not exist yet can be protected ahead of time.
    pub fn build<S: AsRef<str>>(keep: &[S], current_user: &str) -> Self {
        let mut members = BTreeMap::new();
        let names = DEFAULT_ESSENTIAL
            .iter()
            .copied()
            .chain(keep.iter().map(AsRef::as_ref))
            .chain(std::iter::once(current_user));

        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            members
                .entry(name.to_lowercase())
                .or_insert_with(|| name.to_string());
        }

        Self { members }
    }

    /// Membership test only; does not apply the pattern rule.
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(&name.to_lowercase())
    }

    /// Membership first, pattern second.
    pub fn reason(&self, name: &str) -> Option<Exemption> {
        if self.contains(name) {
            Some(Exemption::Member)
        } else if matches_admin_pattern(name) {
            Some(Exemption::AdminPattern)
        } else {
            None
        }
    }

    pub fn is_essential(&self, name: &str) -> bool {
        self.reason(name).is_some()
    }

    /// Member names as supplied, ordered case-insensitively.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn matches_admin_pattern(name: &str) -> bool {
    name.to_ascii_lowercase().contains(ADMIN_PATTERN)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_KEEP: &[&str] = &[];

    #[test]
    fn defaults_always_present() {
        let set = EssentialSet::build(NO_KEEP, "");
        for name in DEFAULT_ESSENTIAL {
            assert_eq!(set.reason(name), Some(Exemption::Member), "{name}");
        }
        assert_eq!(set.len(), DEFAULT_ESSENTIAL.len());
    }

    #[test]
    fn current_user_and_keep_list_are_members() {
        let set = EssentialSet::build(&["kjs0011", "  future01  ", ""], "tmw0102");
        assert!(set.contains("kjs0011"));
        assert!(set.contains("future01"));
        assert!(set.contains("tmw0102"));
        assert!(!set.contains("anw0044"));
        assert!(!set.contains(""));
    }

    #[test]
    fn membership_ignores_case() {
        let set = EssentialSet::build(NO_KEEP, "");
        assert!(set.is_essential("administrator"));
        assert!(set.is_essential("PUBLIC"));
    }

    #[test]
    fn admin_pattern_is_case_insensitive_substring() {
        let set = EssentialSet::build(NO_KEEP, "");
        assert_eq!(set.reason("admin-yrt0002"), Some(Exemption::AdminPattern));
        assert_eq!(set.reason("ADMIN-yrt0002"), Some(Exemption::AdminPattern));
        assert_eq!(set.reason("svc-Admin-backup"), Some(Exemption::AdminPattern));
        assert_eq!(set.reason("admin"), None);
        assert_eq!(set.reason("adminyrt"), None);
    }

    #[test]
    fn membership_wins_over_pattern() {
        let set = EssentialSet::build(&["admin-keep"], "");
        assert_eq!(set.reason("admin-keep"), Some(Exemption::Member));
        assert!(!set.contains("admin-other"));
        assert_eq!(set.reason("admin-other"), Some(Exemption::AdminPattern));
    }

    #[test]
    fn duplicates_collapse() {
        let set = EssentialSet::build(&["Public", "public", "sshd"], "sshd");
        assert_eq!(set.len(), DEFAULT_ESSENTIAL.len());
        let members: Vec<_> = set.members().collect();
        assert!(members.contains(&"Public"));
    }
}
