//! Placeholder variables for letter templates.
//!
//! A template refers to data through `{{Namespace.field}}` tokens. Every namespace has a fixed
//! catalog of fields; a key outside the catalog is an error at parse time, so a misspelt
//! placeholder is reported instead of silently rendering nothing. Known fields whose data is
//! missing resolve to [`FieldValue::NotAvailable`].
//!
//! - [`records`]: the source rows the resolver reads.
//! - [`source`]: the [`CaseDataSource`] seam over the data store.
//! - [`resolver`]: gathers the rows for one case and fills a [`ResolvedVariables`].

pub mod records;
pub mod resolver;
pub mod source;

pub use records::{
    AccountRecord, CaseRecord, CaseUpdate, ContactRecord, FinanceTotals, OrganisationProfile,
    StaffRecord, SubjectRecord,
};
pub use resolver::{Resolution, VariableResolver};
pub use source::CaseDataSource;

use crate::error::{LetterError, LetterResult};
use casedesk_types::FieldValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A catalog entry: one field a namespace offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
}

const fn field(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec { name, description }
}

const CASE_FIELDS: &[FieldSpec] = &[
    field("case_number", "Case number"),
    field("title", "Case title"),
    field("status", "Current case status"),
    field("case_type", "Type of case"),
    field("description", "Case description"),
    field("reference_number", "Client reference number"),
    field("opened_date", "Date opened (Jan 6, 2026)"),
    field("opened_date_long", "Date opened (January 6, 2026)"),
    field("opened_date_short", "Date opened (01/06/2026)"),
    field("due_date", "Due date (Jan 6, 2026)"),
    field("due_date_long", "Due date (January 6, 2026)"),
    field("due_date_short", "Due date (01/06/2026)"),
    field("closed_date", "Date closed (Jan 6, 2026)"),
    field("closed_date_long", "Date closed (January 6, 2026)"),
    field("closed_date_short", "Date closed (01/06/2026)"),
];

const CLIENT_FIELDS: &[FieldSpec] = &[
    field("name", "Client account name"),
    field("account_number", "Client account number"),
    field("address", "Client street address"),
    field("city", "Client city"),
    field("state", "Client state"),
    field("zip", "Client postal code"),
    field("phone", "Client phone"),
    field("email", "Client email"),
];

const CONTACT_FIELDS: &[FieldSpec] = &[
    field("name", "Contact full name"),
    field("first_name", "Contact first name"),
    field("last_name", "Contact last name"),
    field("title", "Contact job title"),
    field("phone", "Contact phone"),
    field("email", "Contact email"),
    field("address", "Contact address"),
];

const SUBJECT_FIELDS: &[FieldSpec] = &[
    field("name", "Subject full name"),
    field("first_name", "Subject first name"),
    field("last_name", "Subject last name"),
    field("date_of_birth", "Subject date of birth (Jan 6, 2026)"),
    field("date_of_birth_long", "Subject date of birth (January 6, 2026)"),
    field("date_of_birth_short", "Subject date of birth (01/06/2026)"),
    field("address", "Subject address"),
    field("phone", "Subject phone"),
    field("email", "Subject email"),
    field("description", "Subject description"),
];

const MANAGER_FIELDS: &[FieldSpec] = &[
    field("name", "Case manager name"),
    field("title", "Case manager title"),
    field("email", "Case manager email"),
    field("phone", "Case manager phone"),
];

const INVESTIGATOR_FIELDS: &[FieldSpec] = &[
    field("name", "Lead investigator name"),
    field("title", "Lead investigator title"),
    field("email", "Lead investigator email"),
    field("phone", "Lead investigator phone"),
    field("license_number", "Lead investigator licence number"),
];

const ORG_FIELDS: &[FieldSpec] = &[
    field("name", "Organisation name"),
    field("address", "Organisation street address"),
    field("city", "Organisation city"),
    field("state", "Organisation state"),
    field("zip", "Organisation postal code"),
    field("phone", "Organisation phone"),
    field("email", "Organisation email"),
    field("website", "Organisation website"),
    field("logo_url", "Organisation logo URL"),
];

const FINANCE_FIELDS: &[FieldSpec] = &[
    field("total_budget", "Case budget"),
    field("total_expenses", "Total expenses"),
    field("total_invoiced", "Total invoiced"),
    field("total_paid", "Total paid"),
    field("balance_due", "Balance due (invoiced minus paid)"),
];

const UPDATES_FIELDS: &[FieldSpec] = &[
    field("latest_title", "Title of the most recent update"),
    field("latest_date", "Date of the most recent update (Jan 6, 2026)"),
    field("latest_date_long", "Date of the most recent update (January 6, 2026)"),
    field("latest_date_short", "Date of the most recent update (01/06/2026)"),
    field("latest_summary", "Summary of the most recent update"),
    field("recent_summary", "Recent updates, one per line, newest first"),
];

const DATE_FIELDS: &[FieldSpec] = &[
    field("today", "Letter date (Jan 6, 2026)"),
    field("today_long", "Letter date (January 6, 2026)"),
    field("today_short", "Letter date (01/06/2026)"),
];

/// A placeholder namespace, the part before the dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Case,
    Client,
    Contact,
    Subject,
    Manager,
    Investigator,
    Org,
    Finance,
    Updates,
    Date,
}

impl Namespace {
    pub const ALL: [Namespace; 10] = [
        Namespace::Case,
        Namespace::Client,
        Namespace::Contact,
        Namespace::Subject,
        Namespace::Manager,
        Namespace::Investigator,
        Namespace::Org,
        Namespace::Finance,
        Namespace::Updates,
        Namespace::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Case => "Case",
            Namespace::Client => "Client",
            Namespace::Contact => "Contact",
            Namespace::Subject => "Subject",
            Namespace::Manager => "Manager",
            Namespace::Investigator => "Investigator",
            Namespace::Org => "Org",
            Namespace::Finance => "Finance",
            Namespace::Updates => "Updates",
            Namespace::Date => "Date",
        }
    }

    /// Namespaces are matched exactly; `case.title` is not `Case.title`.
    pub fn parse(input: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.as_str() == input)
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Namespace::Case => CASE_FIELDS,
            Namespace::Client => CLIENT_FIELDS,
            Namespace::Contact => CONTACT_FIELDS,
            Namespace::Subject => SUBJECT_FIELDS,
            Namespace::Manager => MANAGER_FIELDS,
            Namespace::Investigator => INVESTIGATOR_FIELDS,
            Namespace::Org => ORG_FIELDS,
            Namespace::Finance => FINANCE_FIELDS,
            Namespace::Updates => UPDATES_FIELDS,
            Namespace::Date => DATE_FIELDS,
        }
    }

    fn field_name(&self, field: &str) -> Option<&'static str> {
        self.fields()
            .iter()
            .find(|spec| spec.name == field)
            .map(|spec| spec.name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `Namespace.field` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderKey {
    namespace: Namespace,
    field: &'static str,
}

impl PlaceholderKey {
    /// Parses and validates a key against the field catalog.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// - [`LetterError::MalformedPlaceholder`] if there is no single dot separating two
    ///   non-empty parts.
    /// - [`LetterError::UnknownNamespace`] / [`LetterError::UnknownField`] if the key is not in
    ///   the catalog.
    pub fn parse(input: &str) -> LetterResult<Self> {
        let trimmed = input.trim();
        let (ns, field) = trimmed
            .split_once('.')
            .filter(|(ns, field)| !ns.is_empty() && !field.is_empty() && !field.contains('.'))
            .ok_or_else(|| LetterError::MalformedPlaceholder(trimmed.to_owned()))?;

        let namespace =
            Namespace::parse(ns).ok_or_else(|| LetterError::UnknownNamespace(ns.to_owned()))?;
        let field = namespace
            .field_name(field)
            .ok_or_else(|| LetterError::UnknownField {
                namespace: ns.to_owned(),
                field: field.to_owned(),
            })?;

        Ok(Self { namespace, field })
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn field(&self) -> &'static str {
        self.field
    }
}

impl fmt::Display for PlaceholderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.field)
    }
}

/// The resolved fields of one namespace.
///
/// Always holds every catalog field; fields never set stay `NotAvailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceValues {
    namespace: Namespace,
    values: BTreeMap<&'static str, FieldValue>,
}

impl NamespaceValues {
    pub fn empty(namespace: Namespace) -> Self {
        let values = namespace
            .fields()
            .iter()
            .map(|spec| (spec.name, FieldValue::NotAvailable))
            .collect();
        Self { namespace, values }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Sets a catalog field. Names outside the catalog are a programming error and are dropped.
    pub(crate) fn set(&mut self, field: &str, value: FieldValue) {
        match self.namespace.field_name(field) {
            Some(name) => {
                self.values.insert(name, value);
            }
            None => {
                debug_assert!(false, "{}.{} is not in the catalog", self.namespace, field);
                tracing::error!(
                    "dropping value for uncatalogued field {}.{}",
                    self.namespace,
                    field
                );
            }
        }
    }

    pub(crate) fn set_text(&mut self, field: &str, value: Option<&str>) {
        self.set(field, FieldValue::from_option(value));
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn available_count(&self) -> usize {
        self.values.values().filter(|v| v.is_available()).count()
    }
}

/// The typed placeholder dictionary for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariables {
    namespaces: BTreeMap<Namespace, NamespaceValues>,
}

impl Default for ResolvedVariables {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolvedVariables {
    /// A dictionary in which every known field is `NotAvailable`.
    pub fn new() -> Self {
        let namespaces = Namespace::ALL
            .into_iter()
            .map(|ns| (ns, NamespaceValues::empty(ns)))
            .collect();
        Self { namespaces }
    }

    pub fn namespace(&self, namespace: Namespace) -> &NamespaceValues {
        // `new` populates every namespace and nothing removes one.
        &self.namespaces[&namespace]
    }

    pub(crate) fn namespace_mut(&mut self, namespace: Namespace) -> &mut NamespaceValues {
        self.namespaces
            .entry(namespace)
            .or_insert_with(|| NamespaceValues::empty(namespace))
    }

    pub fn lookup(&self, key: &PlaceholderKey) -> &FieldValue {
        self.namespace(key.namespace())
            .get(key.field())
            .unwrap_or(&FieldValue::NotAvailable)
    }

    /// Looks up a raw `Namespace.field` string.
    ///
    /// # Errors
    ///
    /// Returns the [`PlaceholderKey::parse`] error for malformed or unknown keys.
    pub fn get(&self, key: &str) -> LetterResult<&FieldValue> {
        let key = PlaceholderKey::parse(key)?;
        Ok(self.lookup(&key))
    }

    /// Flattens to the string-keyed dictionary, keeping available values only.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        self.namespaces
            .values()
            .flat_map(|ns| {
                ns.iter().filter_map(move |(field, value)| {
                    value
                        .as_deref()
                        .map(|v| (format!("{}.{}", ns.namespace(), field), v.to_owned()))
                })
            })
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.namespaces
            .values()
            .map(NamespaceValues::available_count)
            .sum()
    }
}

/// One entry of the editor-facing variable list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDescriptor {
    pub key: String,
    pub description: &'static str,
}

/// Every known placeholder key, in namespace then catalog order.
pub fn variable_catalog() -> Vec<VariableDescriptor> {
    Namespace::ALL
        .iter()
        .flat_map(|ns| {
            ns.fields().iter().map(move |spec| VariableDescriptor {
                key: format!("{}.{}", ns, spec.name),
                description: spec.description,
            })
        })
        .collect()
}
