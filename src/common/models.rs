use snafu::ensure;

use super::{Result, ValidationSnafu};

fn enabled_by_default() -> bool {
    true
}

/// A single domain to answer override.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RewriteRecord {
    pub domain: String,
    pub answer: String,
    // Older backends omit the flag; their rewrites are always active.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl RewriteRecord {
    pub fn new(domain: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            answer: answer.into(),
            enabled: true,
        }
    }

    pub fn identity(&self) -> RewriteIdentity {
        RewriteIdentity {
            domain: self.domain.clone(),
            answer: self.answer.clone(),
        }
    }

    pub fn matches(&self, identity: &RewriteIdentity) -> bool {
        self.domain == identity.domain && self.answer == identity.answer
    }

    /// Returns a copy with the enabled flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            enabled: !self.enabled,
            ..self.clone()
        }
    }

    /// Only emptiness is checked. Wildcards and answer formats are left to the backend.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.domain.trim().is_empty(),
            ValidationSnafu {
                field: "domain",
                message: "must not be empty",
            }
        );
        ensure!(
            !self.answer.trim().is_empty(),
            ValidationSnafu {
                field: "answer",
                message: "must not be empty",
            }
        );
        Ok(())
    }
}

/// The key the backend addresses rewrites by on update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RewriteIdentity {
    pub domain: String,
    pub answer: String,
}

impl RewriteIdentity {
    pub fn new(domain: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            answer: answer.into(),
        }
    }
}

impl std::fmt::Display for RewriteIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.domain, self.answer)
    }
}

impl From<&RewriteRecord> for RewriteIdentity {
    fn from(value: &RewriteRecord) -> Self {
        value.identity()
    }
}

/// Global switch for every rewrite on the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RewriteSettings {
    pub enabled: bool,
}

pub trait RewriteBackend {
    fn list(&mut self) -> super::Result<Vec<RewriteRecord>>;
    fn create(&mut self, record: &RewriteRecord) -> super::Result<RewriteRecord>;
    fn update(
        &mut self,
        target: &RewriteIdentity,
        record: &RewriteRecord,
    ) -> super::Result<RewriteRecord>;
    fn delete(&mut self, target: &RewriteIdentity) -> super::Result<()>;
    fn settings(&mut self) -> super::Result<RewriteSettings>;
    fn set_settings(&mut self, settings: RewriteSettings) -> super::Result<()>;
}
