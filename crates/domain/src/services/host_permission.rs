//! Host permission gate.
//!
//! Decides whether a signed-in user may create or edit dishes, events and
//! guest lists. The allow-list is injected from configuration; the bypass
//! flag exists for test environments and is refused by production config.

use std::collections::HashSet;

use shared::validation::normalize_email;

/// Allow-list policy for host mutations.
#[derive(Debug, Clone, Default)]
pub struct HostPermissionPolicy {
    allowed_emails: HashSet<String>,
    allow_all: bool,
}

impl HostPermissionPolicy {
    pub fn new<I, S>(allowed_emails: I, allow_all: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_emails: allowed_emails
                .into_iter()
                .map(|e| normalize_email(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            allow_all,
        }
    }

    /// Returns true if `email` may mutate dishes and events.
    pub fn can_mutate(&self, email: &str) -> bool {
        self.allow_all || self.allowed_emails.contains(&normalize_email(email))
    }

    pub fn is_bypassed(&self) -> bool {
        self.allow_all
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed_emails.len()
    }
}
