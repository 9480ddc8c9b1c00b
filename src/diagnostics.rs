// ABOUTME: Diagnostics accumulator for non-fatal warnings during a command.
// ABOUTME: Collects warnings that shouldn't fail a deploy but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during a command.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during deployment.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// No registration contact configured; the CA gets `admin@<domain>`.
    pub fn contact_fallback(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ContactFallback,
            message: message.into(),
        }
    }

    /// Development certificates are self-signed.
    pub fn self_signed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SelfSigned,
            message: message.into(),
        }
    }

    /// No mode marker; the project has not been deployed yet.
    pub fn marker_missing(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MarkerMissing,
            message: message.into(),
        }
    }
}

/// Categories of non-fatal warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    ContactFallback,
    SelfSigned,
    MarkerMissing,
}
