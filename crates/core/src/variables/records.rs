//! Source records consumed by the variable resolver.
//!
//! These mirror the rows the hosted data store returns for a case. Every column other than
//! the record's identity is optional; an absent column resolves to
//! [`FieldValue::NotAvailable`](casedesk_types::FieldValue::NotAvailable).

use casedesk_ids::RecordId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_number: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub opened_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub closed_date: Option<NaiveDate>,
    /// Staff member managing the case.
    #[serde(default)]
    pub manager_id: Option<RecordId>,
    /// Staff member assigned as lead investigator.
    #[serde(default)]
    pub investigator_id: Option<RecordId>,
}

/// The client account that opened the case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub name: String,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The client's primary contact person for the case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// The primary subject of the investigation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A member of the organisation's staff (case manager or investigator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: RecordId,
    pub full_name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
}

/// Organisation profile used for the letterhead and `Org.*` placeholders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganisationProfile {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Object-storage URL of the uploaded logo, if any.
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl OrganisationProfile {
    /// `City, ST 12345`, skipping whichever parts are missing.
    pub fn city_line(&self) -> Option<String> {
        let city = non_blank(self.city.as_deref());
        let state_zip = [non_blank(self.state.as_deref()), non_blank(self.zip.as_deref())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        match (city, state_zip.is_empty()) {
            (Some(c), false) => Some(format!("{}, {}", c, state_zip)),
            (Some(c), true) => Some(c.to_owned()),
            (None, false) => Some(state_zip),
            (None, true) => None,
        }
    }
}

/// Billing totals for a case, in cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceTotals {
    #[serde(default)]
    pub total_budget_cents: i64,
    #[serde(default)]
    pub total_expenses_cents: i64,
    #[serde(default)]
    pub total_invoiced_cents: i64,
    #[serde(default)]
    pub total_paid_cents: i64,
}

impl FinanceTotals {
    /// Invoiced minus paid, or `None` if the difference does not fit in an `i64`.
    pub fn balance_due_cents(&self) -> Option<i64> {
        self.total_invoiced_cents.checked_sub(self.total_paid_cents)
    }
}

/// A progress update posted on a case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseUpdate {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub created_on: NaiveDate,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Joins optional name parts with a space, or `None` when every part is blank.
pub(crate) fn join_name(parts: &[Option<&str>]) -> Option<String> {
    let joined = parts
        .iter()
        .filter_map(|p| non_blank(*p))
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_line_combinations() {
        let mut profile = OrganisationProfile {
            name: "Acme Investigations".into(),
            city: Some("Austin".into()),
            state: Some("TX".into()),
            zip: Some("78701".into()),
            ..Default::default()
        };
        assert_eq!(profile.city_line().as_deref(), Some("Austin, TX 78701"));

        profile.zip = None;
        assert_eq!(profile.city_line().as_deref(), Some("Austin, TX"));

        profile.city = Some("  ".into());
        assert_eq!(profile.city_line().as_deref(), Some("TX"));

        profile.state = None;
        assert_eq!(profile.city_line(), None);
    }

    #[test]
    fn test_join_name_skips_blank_parts() {
        assert_eq!(
            join_name(&[Some("Ada"), None, Some(" Lovelace ")]).as_deref(),
            Some("Ada Lovelace")
        );
        assert_eq!(join_name(&[None, Some("")]), None);
    }

    #[test]
    fn test_balance_due() {
        let totals = FinanceTotals {
            total_invoiced_cents: 50_000,
            total_paid_cents: 20_000,
            ..Default::default()
        };
        assert_eq!(totals.balance_due_cents(), Some(30_000));
    }

    #[test]
    fn test_balance_due_overflow_is_none() {
        let totals = FinanceTotals {
            total_invoiced_cents: i64::MAX,
            total_paid_cents: -1,
            ..Default::default()
        };
        assert_eq!(totals.balance_due_cents(), None);

        let totals = FinanceTotals {
            total_invoiced_cents: i64::MIN,
            total_paid_cents: 1,
            ..Default::default()
        };
        assert_eq!(totals.balance_due_cents(), None);
    }

    #[test]
    fn test_case_record_deserialises_with_missing_columns() {
        let yaml = "case_number: CASE-2026-001\nopened_date: 2026-01-06\n";
        let record: CaseRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.case_number, "CASE-2026-001");
        assert_eq!(record.opened_date, NaiveDate::from_ymd_opt(2026, 1, 6));
        assert!(record.manager_id.is_none());
    }
}
