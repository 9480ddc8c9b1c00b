// ABOUTME: Per-domain certificate lifecycle states and their legal transitions.
// ABOUTME: Progress is monotonic apart from the synced -> renewal-due -> renewing -> issued-unsynced cycle.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CertificateState {
    Absent,
    Issuing,
    IssuedUnsynced,
    Synced,
    RenewalDue,
    Renewing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal certificate transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: CertificateState,
    pub to: CertificateState,
}

impl CertificateState {
    pub fn can_transition_to(self, to: CertificateState) -> bool {
        use CertificateState::*;
        matches!(
            (self, to),
            (Absent, Issuing)
                | (Issuing, IssuedUnsynced)
                // CA rejected the request
                | (Issuing, Absent)
                | (IssuedUnsynced, Synced)
                | (IssuedUnsynced, Renewing)
                // re-sync of unchanged material
                | (Synced, Synced)
                | (Synced, RenewalDue)
                | (RenewalDue, Renewing)
                | (Renewing, IssuedUnsynced)
                // renewal failed, still due
                | (Renewing, RenewalDue)
        )
    }

    pub fn transition(self, to: CertificateState) -> Result<CertificateState, InvalidTransition> {
        if self.can_transition_to(to) {
            tracing::debug!(from = %self, %to, "certificate state");
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }
}

impl fmt::Display for CertificateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CertificateState::Absent => "absent",
            CertificateState::Issuing => "issuing",
            CertificateState::IssuedUnsynced => "issued-unsynced",
            CertificateState::Synced => "synced",
            CertificateState::RenewalDue => "renewal-due",
            CertificateState::Renewing => "renewing",
        };
        write!(f, "{}", s)
    }
}
