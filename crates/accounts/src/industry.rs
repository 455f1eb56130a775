use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoploom_core::{DomainError, DomainResult, Entity, IndustryId};

/// A supported business type (retail, tailoring, ...).
///
/// Global reference data, not tenant-scoped: every business picks one at
/// registration, and `is_active` gates which industries are open for new
/// signups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Industry {
    id: IndustryId,
    name: String,
    description: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Industry {
    pub fn new(
        id: IndustryId,
        name: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("industry name cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            description: description.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether this industry is open for new business registrations.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn retire(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }
}

impl Entity for Industry {
    type Id = IndustryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_industry_is_active() {
        let industry =
            Industry::new(IndustryId::new(), "Retail", "Shops and stores", Utc::now()).unwrap();
        assert!(industry.is_active());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Industry::new(IndustryId::new(), "  ", "", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn retired_industry_is_inactive() {
        let mut industry = Industry::new(IndustryId::new(), "Education", "", Utc::now()).unwrap();
        industry.retire(Utc::now());
        assert!(!industry.is_active());
    }
}
