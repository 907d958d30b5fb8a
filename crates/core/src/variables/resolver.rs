//! Variable resolution for one case.
//!
//! The resolver reads every related record through a [`CaseDataSource`] and fills a
//! [`ResolvedVariables`]. A failed lookup is logged and treated as absent data; resolution as
//! a whole never fails.

use super::records::{join_name, non_blank, CaseRecord, OrganisationProfile, StaffRecord};
use super::source::CaseDataSource;
use super::{Namespace, NamespaceValues, ResolvedVariables};
use crate::constants::DEFAULT_RECENT_UPDATES;
use crate::dates::{format_cents, long_date, short_date, standard_date};
use crate::error::LetterResult;
use casedesk_ids::{CaseId, OrganisationId};
use casedesk_types::FieldValue;
use chrono::NaiveDate;

/// Everything gathered for one render: the placeholder dictionary and the organisation
/// profile the letterhead is drawn from.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub variables: ResolvedVariables,
    pub organisation: Option<OrganisationProfile>,
}

pub struct VariableResolver<'a, S: CaseDataSource + ?Sized> {
    source: &'a S,
    recent_updates_limit: usize,
}

impl<'a, S: CaseDataSource + ?Sized> VariableResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            recent_updates_limit: DEFAULT_RECENT_UPDATES,
        }
    }

    pub fn with_recent_updates_limit(mut self, limit: usize) -> Self {
        self.recent_updates_limit = limit;
        self
    }

    /// Builds the placeholder dictionary for a case.
    ///
    /// # Arguments
    ///
    /// * `case_id` - Case the letter is about.
    /// * `organisation_id` - Organisation sending the letter.
    /// * `today` - Date exposed through the `Date` namespace.
    pub fn resolve(
        &self,
        case_id: &CaseId,
        organisation_id: &OrganisationId,
        today: NaiveDate,
    ) -> ResolvedVariables {
        self.resolve_all(case_id, organisation_id, today).variables
    }

    /// Like [`resolve`](Self::resolve), also returning the organisation profile.
    pub fn resolve_all(
        &self,
        case_id: &CaseId,
        organisation_id: &OrganisationId,
        today: NaiveDate,
    ) -> Resolution {
        let mut vars = ResolvedVariables::new();

        let case = recover("case", case_id, self.source.case(case_id));
        if let Some(case) = &case {
            fill_case(vars.namespace_mut(Namespace::Case), case);

            if let Some(manager_id) = &case.manager_id {
                let manager = recover(
                    "manager",
                    case_id,
                    self.source.staff_member(organisation_id, manager_id),
                );
                if let Some(manager) = &manager {
                    fill_staff(vars.namespace_mut(Namespace::Manager), manager);
                }
            }

            if let Some(investigator_id) = &case.investigator_id {
                let investigator = recover(
                    "investigator",
                    case_id,
                    self.source.staff_member(organisation_id, investigator_id),
                );
                if let Some(investigator) = &investigator {
                    fill_staff(vars.namespace_mut(Namespace::Investigator), investigator);
                }
            }
        }

        if let Some(client) = recover("client", case_id, self.source.client(case_id)) {
            let ns = vars.namespace_mut(Namespace::Client);
            ns.set_text("name", Some(client.name.as_str()));
            ns.set_text("account_number", client.account_number.as_deref());
            ns.set_text("address", client.address.as_deref());
            ns.set_text("city", client.city.as_deref());
            ns.set_text("state", client.state.as_deref());
            ns.set_text("zip", client.zip.as_deref());
            ns.set_text("phone", client.phone.as_deref());
            ns.set_text("email", client.email.as_deref());
        }

        if let Some(contact) = recover("contact", case_id, self.source.primary_contact(case_id)) {
            let ns = vars.namespace_mut(Namespace::Contact);
            let name = join_name(&[contact.first_name.as_deref(), contact.last_name.as_deref()]);
            ns.set_text("name", name.as_deref());
            ns.set_text("first_name", contact.first_name.as_deref());
            ns.set_text("last_name", contact.last_name.as_deref());
            ns.set_text("title", contact.title.as_deref());
            ns.set_text("phone", contact.phone.as_deref());
            ns.set_text("email", contact.email.as_deref());
            ns.set_text("address", contact.address.as_deref());
        }

        if let Some(subject) = recover("subject", case_id, self.source.primary_subject(case_id)) {
            let ns = vars.namespace_mut(Namespace::Subject);
            let name = join_name(&[subject.first_name.as_deref(), subject.last_name.as_deref()]);
            ns.set_text("name", name.as_deref());
            ns.set_text("first_name", subject.first_name.as_deref());
            ns.set_text("last_name", subject.last_name.as_deref());
            set_date(ns, "date_of_birth", subject.date_of_birth);
            ns.set_text("address", subject.address.as_deref());
            ns.set_text("phone", subject.phone.as_deref());
            ns.set_text("email", subject.email.as_deref());
            ns.set_text("description", subject.description.as_deref());
        }

        let organisation = recover(
            "organisation profile",
            case_id,
            self.source.organisation_profile(organisation_id),
        );
        if let Some(org) = &organisation {
            let ns = vars.namespace_mut(Namespace::Org);
            ns.set_text("name", Some(org.name.as_str()));
            ns.set_text("address", org.address.as_deref());
            ns.set_text("city", org.city.as_deref());
            ns.set_text("state", org.state.as_deref());
            ns.set_text("zip", org.zip.as_deref());
            ns.set_text("phone", org.phone.as_deref());
            ns.set_text("email", org.email.as_deref());
            ns.set_text("website", org.website.as_deref());
            ns.set_text("logo_url", org.logo_url.as_deref());
        }

        if let Some(totals) = recover("finance", case_id, self.source.finance_totals(case_id)) {
            let ns = vars.namespace_mut(Namespace::Finance);
            ns.set(
                "total_budget",
                FieldValue::available(format_cents(totals.total_budget_cents)),
            );
            ns.set(
                "total_expenses",
                FieldValue::available(format_cents(totals.total_expenses_cents)),
            );
            ns.set(
                "total_invoiced",
                FieldValue::available(format_cents(totals.total_invoiced_cents)),
            );
            ns.set(
                "total_paid",
                FieldValue::available(format_cents(totals.total_paid_cents)),
            );
            let balance_due = totals.balance_due_cents();
            if balance_due.is_none() {
                tracing::warn!("finance totals for case {} overflow the balance due", case_id);
            }
            ns.set(
                "balance_due",
                FieldValue::from_option(balance_due.map(format_cents)),
            );
        }

        let updates = match self
            .source
            .recent_updates(case_id, self.recent_updates_limit)
        {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("updates lookup failed for case {}: {}", case_id, e);
                Vec::new()
            }
        };
        if let Some(latest) = updates.first() {
            let ns = vars.namespace_mut(Namespace::Updates);
            ns.set_text("latest_title", Some(latest.title.as_str()));
            set_date(ns, "latest_date", Some(latest.created_on));
            ns.set_text("latest_summary", latest.summary.as_deref());

            let summary = updates
                .iter()
                .take(self.recent_updates_limit)
                .map(|u| match non_blank(u.summary.as_deref()) {
                    Some(s) => format!("{}: {} - {}", standard_date(u.created_on), u.title, s),
                    None => format!("{}: {}", standard_date(u.created_on), u.title),
                })
                .collect::<Vec<_>>()
                .join("\n");
            ns.set_text("recent_summary", Some(summary.as_str()));
        }

        set_date(vars.namespace_mut(Namespace::Date), "today", Some(today));

        tracing::debug!(
            "resolved {} placeholder values for case {}",
            vars.available_count(),
            case_id
        );

        Resolution {
            variables: vars,
            organisation,
        }
    }
}

fn recover<T>(section: &str, case_id: &CaseId, result: LetterResult<Option<T>>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("{} lookup failed for case {}: {}", section, case_id, e);
            None
        }
    }
}

fn fill_case(ns: &mut NamespaceValues, case: &CaseRecord) {
    ns.set_text("case_number", Some(case.case_number.as_str()));
    ns.set_text("title", case.title.as_deref());
    ns.set_text("status", case.status.as_deref());
    ns.set_text("case_type", case.case_type.as_deref());
    ns.set_text("description", case.description.as_deref());
    ns.set_text("reference_number", case.reference_number.as_deref());
    set_date(ns, "opened_date", case.opened_date);
    set_date(ns, "due_date", case.due_date);
    set_date(ns, "closed_date", case.closed_date);
}

fn fill_staff(ns: &mut NamespaceValues, staff: &StaffRecord) {
    ns.set_text("name", Some(staff.full_name.as_str()));
    ns.set_text("title", staff.title.as_deref());
    ns.set_text("email", staff.email.as_deref());
    ns.set_text("phone", staff.phone.as_deref());
    if ns.namespace() == Namespace::Investigator {
        ns.set_text("license_number", staff.license_number.as_deref());
    }
}

/// Sets `field`, `field_long` and `field_short`, each from its own formatter.
fn set_date(ns: &mut NamespaceValues, field: &str, date: Option<NaiveDate>) {
    let Some(date) = date else {
        return;
    };
    ns.set(field, FieldValue::available(standard_date(date)));
    ns.set(&format!("{field}_long"), FieldValue::available(long_date(date)));
    ns.set(&format!("{field}_short"), FieldValue::available(short_date(date)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LetterError;
    use crate::variables::records::{
        AccountRecord, CaseUpdate, ContactRecord, FinanceTotals, SubjectRecord,
    };
    use casedesk_ids::RecordId;

    #[derive(Default)]
    struct FixtureSource {
        case: Option<CaseRecord>,
        client: Option<AccountRecord>,
        contact: Option<ContactRecord>,
        subject: Option<SubjectRecord>,
        staff: Vec<StaffRecord>,
        organisation: Option<OrganisationProfile>,
        finance: Option<FinanceTotals>,
        updates: Vec<CaseUpdate>,
        fail_client: bool,
        fail_organisation: bool,
        fail_updates: bool,
    }

    fn lookup_failure() -> LetterError {
        LetterError::DataSource("connection reset".into())
    }

    impl CaseDataSource for FixtureSource {
        fn case(&self, _: &CaseId) -> LetterResult<Option<CaseRecord>> {
            Ok(self.case.clone())
        }

        fn client(&self, _: &CaseId) -> LetterResult<Option<AccountRecord>> {
            if self.fail_client {
                return Err(lookup_failure());
            }
            Ok(self.client.clone())
        }

        fn primary_contact(&self, _: &CaseId) -> LetterResult<Option<ContactRecord>> {
            Ok(self.contact.clone())
        }

        fn primary_subject(&self, _: &CaseId) -> LetterResult<Option<SubjectRecord>> {
            Ok(self.subject.clone())
        }

        fn staff_member(
            &self,
            _: &OrganisationId,
            staff_id: &RecordId,
        ) -> LetterResult<Option<StaffRecord>> {
            Ok(self.staff.iter().find(|s| &s.id == staff_id).cloned())
        }

        fn organisation_profile(
            &self,
            _: &OrganisationId,
        ) -> LetterResult<Option<OrganisationProfile>> {
            if self.fail_organisation {
                return Err(lookup_failure());
            }
            Ok(self.organisation.clone())
        }

        fn finance_totals(&self, _: &CaseId) -> LetterResult<Option<FinanceTotals>> {
            Ok(self.finance)
        }

        fn recent_updates(&self, _: &CaseId, limit: usize) -> LetterResult<Vec<CaseUpdate>> {
            if self.fail_updates {
                return Err(lookup_failure());
            }
            Ok(self.updates.iter().take(limit).cloned().collect())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_fixture() -> FixtureSource {
        let manager_id = RecordId::new();
        let investigator_id = RecordId::new();
        FixtureSource {
            case: Some(CaseRecord {
                case_number: "CASE-2026-0042".into(),
                title: Some("Workers' compensation review".into()),
                status: Some("Open".into()),
                opened_date: Some(date(2026, 1, 6)),
                manager_id: Some(manager_id),
                investigator_id: Some(investigator_id),
                ..Default::default()
            }),
            client: Some(AccountRecord {
                name: "Globex Insurance".into(),
                city: Some("Springfield".into()),
                ..Default::default()
            }),
            contact: Some(ContactRecord {
                first_name: Some("Marge".into()),
                last_name: Some("Bouvier".into()),
                ..Default::default()
            }),
            subject: Some(SubjectRecord {
                first_name: Some("Homer".into()),
                last_name: Some("Simpson".into()),
                date_of_birth: Some(date(1956, 5, 12)),
                ..Default::default()
            }),
            staff: vec![
                StaffRecord {
                    id: manager_id,
                    full_name: "Lisa Park".into(),
                    title: Some("Case Manager".into()),
                    email: None,
                    phone: None,
                    license_number: Some("IGNORED".into()),
                },
                StaffRecord {
                    id: investigator_id,
                    full_name: "Sam Reyes".into(),
                    title: Some("Senior Investigator".into()),
                    email: Some("sam@acme.test".into()),
                    phone: None,
                    license_number: Some("PI-12345".into()),
                },
            ],
            organisation: Some(OrganisationProfile {
                name: "Acme Investigations".into(),
                logo_url: Some("https://cdn.acme.test/logo.png".into()),
                ..Default::default()
            }),
            finance: Some(FinanceTotals {
                total_budget_cents: 500_000,
                total_expenses_cents: 12_345,
                total_invoiced_cents: 250_000,
                total_paid_cents: 100_000,
            }),
            updates: vec![
                CaseUpdate {
                    title: "Surveillance completed".into(),
                    summary: Some("Two days of footage collected".into()),
                    created_on: date(2026, 2, 3),
                },
                CaseUpdate {
                    title: "Records requested".into(),
                    summary: None,
                    created_on: date(2026, 1, 20),
                },
            ],
            ..Default::default()
        }
    }

    fn value<'v>(vars: &'v ResolvedVariables, key: &str) -> Option<&'v str> {
        vars.get(key).unwrap().as_deref()
    }

    #[test]
    fn test_resolve_populates_every_section() {
        let source = full_fixture();
        let vars = VariableResolver::new(&source).resolve(
            &CaseId::new(),
            &OrganisationId::new(),
            date(2026, 3, 1),
        );

        assert_eq!(value(&vars, "Case.case_number"), Some("CASE-2026-0042"));
        assert_eq!(value(&vars, "Case.opened_date"), Some("Jan 6, 2026"));
        assert_eq!(value(&vars, "Case.opened_date_long"), Some("January 6, 2026"));
        assert_eq!(value(&vars, "Case.opened_date_short"), Some("01/06/2026"));
        assert_eq!(value(&vars, "Case.due_date"), None);
        assert_eq!(value(&vars, "Client.name"), Some("Globex Insurance"));
        assert_eq!(value(&vars, "Contact.name"), Some("Marge Bouvier"));
        assert_eq!(value(&vars, "Subject.date_of_birth_short"), Some("05/12/1956"));
        assert_eq!(value(&vars, "Manager.name"), Some("Lisa Park"));
        assert_eq!(value(&vars, "Investigator.license_number"), Some("PI-12345"));
        assert_eq!(value(&vars, "Org.name"), Some("Acme Investigations"));
        assert_eq!(value(&vars, "Finance.total_budget"), Some("$5,000.00"));
        assert_eq!(value(&vars, "Finance.balance_due"), Some("$1,500.00"));
        assert_eq!(value(&vars, "Updates.latest_title"), Some("Surveillance completed"));
        assert_eq!(value(&vars, "Date.today_long"), Some("March 1, 2026"));
        assert_eq!(
            value(&vars, "Updates.recent_summary"),
            Some(
                "Feb 3, 2026: Surveillance completed - Two days of footage collected\n\
                 Jan 20, 2026: Records requested"
            )
        );
    }

    #[test]
    fn test_resolve_overflowing_balance_is_not_available() {
        let source = FixtureSource {
            finance: Some(FinanceTotals {
                total_invoiced_cents: i64::MAX,
                total_paid_cents: -1,
                ..Default::default()
            }),
            ..Default::default()
        };
        let vars = VariableResolver::new(&source).resolve(
            &CaseId::new(),
            &OrganisationId::new(),
            date(2026, 1, 6),
        );

        assert_eq!(value(&vars, "Finance.balance_due"), None);
        assert_eq!(
            value(&vars, "Finance.total_invoiced"),
            Some("$92,233,720,368,547,758.07")
        );
    }

    #[test]
    fn test_resolve_marks_missing_records_not_available() {
        let source = FixtureSource::default();
        let vars = VariableResolver::new(&source).resolve(
            &CaseId::new(),
            &OrganisationId::new(),
            date(2026, 1, 6),
        );

        assert_eq!(vars.get("Case.case_number").unwrap(), &FieldValue::NotAvailable);
        assert_eq!(vars.get("Manager.name").unwrap(), &FieldValue::NotAvailable);
        // Only the Date namespace is populated.
        let flat = vars.flatten();
        assert_eq!(flat.len(), 3);
        assert!(flat.keys().all(|k| k.starts_with("Date.")));
    }

    #[test]
    fn test_resolve_recovers_from_failed_lookups() {
        let mut source = full_fixture();
        source.fail_client = true;
        source.fail_organisation = true;
        source.fail_updates = true;

        let resolution = VariableResolver::new(&source).resolve_all(
            &CaseId::new(),
            &OrganisationId::new(),
            date(2026, 1, 6),
        );
        let vars = &resolution.variables;

        assert!(resolution.organisation.is_none());
        assert_eq!(value(vars, "Client.name"), None);
        assert_eq!(value(vars, "Org.name"), None);
        assert_eq!(value(vars, "Updates.latest_title"), None);
        // Unaffected sections still resolve.
        assert_eq!(value(vars, "Case.case_number"), Some("CASE-2026-0042"));
        assert_eq!(value(vars, "Subject.name"), Some("Homer Simpson"));
    }

    #[test]
    fn test_manager_namespace_has_no_license_number() {
        let source = full_fixture();
        let vars = VariableResolver::new(&source).resolve(
            &CaseId::new(),
            &OrganisationId::new(),
            date(2026, 1, 6),
        );
        assert!(vars.get("Manager.license_number").is_err());
    }

    #[test]
    fn test_recent_updates_limit_is_applied() {
        let source = full_fixture();
        let vars = VariableResolver::new(&source)
            .with_recent_updates_limit(1)
            .resolve(&CaseId::new(), &OrganisationId::new(), date(2026, 1, 6));
        assert_eq!(
            value(&vars, "Updates.recent_summary"),
            Some("Feb 3, 2026: Surveillance completed - Two days of footage collected")
        );
    }
}
