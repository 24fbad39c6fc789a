//! Lead data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, Table};

/// Backend table holding leads.
pub const LEADS: Table<Lead> = Table::new("leads");

/// Stable lead identifier assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(i64);

impl LeadId {
    /// Wrap a raw backend key.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw backend key.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for LeadId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Prospective customer record.
///
/// Text attributes are optional; `None` means the column holds `null`, never
/// an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Backend key.
    pub id: LeadId,
    /// Contact name.
    #[serde(default)]
    pub name: Option<String>,
    /// Company name.
    #[serde(default)]
    pub company: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// District within the city.
    #[serde(default)]
    pub district: Option<String>,
    /// Creation timestamp set by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last-modified timestamp stamped on every update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Build a lead with only an identifier set.
    pub fn new(id: impl Into<LeadId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            company: None,
            address: None,
            city: None,
            district: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Read one editable field.
    pub fn field(&self, field: LeadField) -> Option<&str> {
        match field {
            LeadField::Name => self.name.as_deref(),
            LeadField::Company => self.company.as_deref(),
            LeadField::Address => self.address.as_deref(),
            LeadField::City => self.city.as_deref(),
            LeadField::District => self.district.as_deref(),
        }
    }

    /// Builder-style setter used by fixtures and seeding.
    #[must_use]
    pub fn with(mut self, field: LeadField, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            LeadField::Name => self.name = value,
            LeadField::Company => self.company = value,
            LeadField::Address => self.address = value,
            LeadField::City => self.city = value,
            LeadField::District => self.district = value,
        }
        self
    }
}

impl Record for Lead {
    type Id = LeadId;

    fn id(&self) -> &LeadId {
        &self.id
    }
}

/// Operator-editable lead attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadField {
    /// Contact name.
    Name,
    /// Company name.
    Company,
    /// Street address.
    Address,
    /// City.
    City,
    /// District.
    District,
}

impl LeadField {
    /// Every editable field in form order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::Company,
        Self::Address,
        Self::City,
        Self::District,
    ];

    /// Maximum length in characters accepted by the edit form.
    pub const fn max_len(self) -> usize {
        match self {
            Self::Name | Self::Company => 100,
            Self::Address => 200,
            Self::City | Self::District => 50,
        }
    }

    /// Backend column name.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Company => "company",
            Self::Address => "address",
            Self::City => "city",
            Self::District => "district",
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Partial update applied to a lead.
///
/// Every editable column is always serialised, so `None` clears the stored
/// value with an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadPatch {
    /// Contact name.
    pub name: Option<String>,
    /// Company name.
    pub company: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// City.
    pub city: Option<String>,
    /// District.
    pub district: Option<String>,
    /// Last-modified timestamp attached at submission.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Serialisation coverage for lead payloads.

    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn deserialises_rows_with_missing_and_null_columns() {
        let lead: Lead = serde_json::from_value(json!({
            "id": 42,
            "name": null,
            "company": "Acme"
        }))
        .expect("row decodes");

        assert_eq!(lead.id, LeadId::new(42));
        assert!(lead.name.is_none());
        assert_eq!(lead.company.as_deref(), Some("Acme"));
        assert!(lead.city.is_none());
    }

    #[rstest]
    fn patch_serialises_absent_fields_as_null() {
        let updated_at = Utc
            .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp");
        let patch = LeadPatch {
            name: None,
            company: Some("Acme".to_owned()),
            address: None,
            city: None,
            district: None,
            updated_at,
        };

        let value = serde_json::to_value(&patch).expect("patch serialises");
        assert_eq!(value["name"], json!(null));
        assert_eq!(value["company"], json!("Acme"));
        assert!(value.get("district").is_some(), "district must be sent");
    }

    #[rstest]
    #[case(LeadField::Name, 100)]
    #[case(LeadField::Company, 100)]
    #[case(LeadField::Address, 200)]
    #[case(LeadField::City, 50)]
    #[case(LeadField::District, 50)]
    fn field_limits_match_form_bounds(#[case] field: LeadField, #[case] max: usize) {
        assert_eq!(field.max_len(), max);
    }
}
