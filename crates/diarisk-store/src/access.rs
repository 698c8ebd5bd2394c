//! Email allow-list for reading the results log.
//!
//! This is NOT authentication. Addresses are compared as plain text, exactly
//! and case-sensitively; nothing is hashed, no session is created and the
//! submitted address is not verified to belong to the caller. It decides what
//! a cooperative user is shown, nothing more.

use std::collections::BTreeSet;

use crate::row::COL_EMAIL;
use crate::table::RecordTable;

pub const DEFAULT_LEADER_EMAIL: &str = "lider@dominio.com";
pub const DEFAULT_PROFESSIONAL_EMAILS: [&str; 3] =
    ["ana@centro1.com", "luis@centro2.com", "marta@centro3.com"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    leader_email: String,
    professional_emails: BTreeSet<String>,
}

/// What a submitted address may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Full log.
    Leader,
    /// Rows submitted with this address.
    Professional(String),
    Denied,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new(DEFAULT_LEADER_EMAIL, DEFAULT_PROFESSIONAL_EMAILS)
    }
}

impl AccessGate {
    pub fn new<I, S>(leader_email: impl Into<String>, professional_emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            leader_email: leader_email.into(),
            professional_emails: professional_emails.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_leader(&self, email: &str) -> bool {
        email == self.leader_email
    }

    pub fn is_authorized_professional(&self, email: &str) -> bool {
        self.professional_emails.contains(email)
    }

    /// Leader wins when an address is on both lists.
    pub fn resolve(&self, email: &str) -> AccessDecision {
        if self.is_leader(email) {
            AccessDecision::Leader
        } else if self.is_authorized_professional(email) {
            AccessDecision::Professional(email.to_string())
        } else {
            AccessDecision::Denied
        }
    }
}

impl AccessDecision {
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Denied)
    }

    /// The part of `table` this decision may see; `None` when denied.
    pub fn visible_rows(&self, table: &RecordTable) -> Option<RecordTable> {
        match self {
            AccessDecision::Leader => Some(table.clone()),
            AccessDecision::Professional(email) => Some(table.filter_eq(COL_EMAIL, email)),
            AccessDecision::Denied => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_allow_list() {
        let gate = AccessGate::default();
        assert!(gate.is_leader("lider@dominio.com"));
        assert!(!gate.is_leader("x@y.com"));
        assert!(gate.is_authorized_professional("ana@centro1.com"));
        assert!(!gate.is_authorized_professional("x@y.com"));
        assert!(!gate.is_authorized_professional("lider@dominio.com"));
    }

    #[test]
    fn comparison_is_exact() {
        let gate = AccessGate::default();
        assert!(!gate.is_leader("LIDER@dominio.com"));
        assert!(!gate.is_leader(" lider@dominio.com"));
        assert!(!gate.is_authorized_professional("ana@centro1.com "));
    }

    #[test]
    fn resolve_prefers_leader() {
        let gate = AccessGate::new("a@b.com", ["a@b.com", "c@d.com"]);
        assert_eq!(gate.resolve("a@b.com"), AccessDecision::Leader);
        assert_eq!(
            gate.resolve("c@d.com"),
            AccessDecision::Professional("c@d.com".to_string())
        );
        assert!(gate.resolve("e@f.com").is_denied());
    }

    #[test]
    fn visible_rows_follow_decision() {
        let mut table = RecordTable::with_headers(&[COL_EMAIL]);
        table.push_row(&[(COL_EMAIL, "ana@centro1.com".to_string())]);
        table.push_row(&[(COL_EMAIL, "otro@centro.com".to_string())]);

        assert_eq!(AccessDecision::Leader.visible_rows(&table).unwrap().len(), 2);
        let own = AccessDecision::Professional("ana@centro1.com".to_string())
            .visible_rows(&table)
            .unwrap();
        assert_eq!(own.len(), 1);
        assert!(AccessDecision::Denied.visible_rows(&table).is_none());
    }
}
