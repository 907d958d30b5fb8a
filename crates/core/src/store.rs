//! File-backed case data store.
//!
//! Records are YAML files in sharded directories under the case data directory:
//!
//! ```text
//! <case_data_dir>/
//!   cases/<s1>/<s2>/<case_id>/
//!     case.yaml  client.yaml  contact.yaml  subject.yaml  finance.yaml  updates.yaml
//!   organisations/<s1>/<s2>/<organisation_id>/
//!     profile.yaml  staff.yaml
//! ```
//!
//! where `s1` and `s2` are the first two pairs of hex digits of the canonical id. A missing file
//! means the record does not exist; a file that cannot be read or parsed is an error.

use crate::config::CoreConfig;
use crate::constants::{
    CASE_FILENAME, CLIENT_FILENAME, CONTACT_FILENAME, FINANCE_FILENAME,
    ORGANISATION_PROFILE_FILENAME, STAFF_FILENAME, SUBJECT_FILENAME, UPDATES_FILENAME,
};
use crate::variables::{
    AccountRecord, CaseDataSource, CaseRecord, CaseUpdate, ContactRecord, FinanceTotals,
    OrganisationProfile, StaffRecord, SubjectRecord,
};
use crate::{LetterError, LetterResult};
use casedesk_ids::{CaseId, OrganisationId, RecordId};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// [`CaseDataSource`] over the on-disk YAML layout.
#[derive(Clone, Debug)]
pub struct FileCaseStore {
    cfg: Arc<CoreConfig>,
}

impl FileCaseStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Directory holding one case's records.
    pub fn case_dir(&self, case_id: &CaseId) -> PathBuf {
        case_id.sharded_dir(&self.cfg.cases_dir())
    }

    /// Directory holding one organisation's records.
    pub fn organisation_dir(&self, organisation_id: &OrganisationId) -> PathBuf {
        organisation_id.sharded_dir(&self.cfg.organisations_dir())
    }

    fn case_file<T: DeserializeOwned>(&self, case_id: &CaseId, file: &str) -> LetterResult<Option<T>> {
        read_yaml(&self.case_dir(case_id).join(file))
    }

    fn organisation_file<T: DeserializeOwned>(
        &self,
        organisation_id: &OrganisationId,
        file: &str,
    ) -> LetterResult<Option<T>> {
        read_yaml(&self.organisation_dir(organisation_id).join(file))
    }
}

impl CaseDataSource for FileCaseStore {
    fn case(&self, case_id: &CaseId) -> LetterResult<Option<CaseRecord>> {
        self.case_file(case_id, CASE_FILENAME)
    }

    fn client(&self, case_id: &CaseId) -> LetterResult<Option<AccountRecord>> {
        self.case_file(case_id, CLIENT_FILENAME)
    }

    fn primary_contact(&self, case_id: &CaseId) -> LetterResult<Option<ContactRecord>> {
        self.case_file(case_id, CONTACT_FILENAME)
    }

    fn primary_subject(&self, case_id: &CaseId) -> LetterResult<Option<SubjectRecord>> {
        self.case_file(case_id, SUBJECT_FILENAME)
    }

    fn staff_member(
        &self,
        organisation_id: &OrganisationId,
        staff_id: &RecordId,
    ) -> LetterResult<Option<StaffRecord>> {
        let staff: Vec<StaffRecord> = self
            .organisation_file(organisation_id, STAFF_FILENAME)?
            .unwrap_or_default();
        Ok(staff.into_iter().find(|member| &member.id == staff_id))
    }

    fn organisation_profile(
        &self,
        organisation_id: &OrganisationId,
    ) -> LetterResult<Option<OrganisationProfile>> {
        self.organisation_file(organisation_id, ORGANISATION_PROFILE_FILENAME)
    }

    fn finance_totals(&self, case_id: &CaseId) -> LetterResult<Option<FinanceTotals>> {
        self.case_file(case_id, FINANCE_FILENAME)
    }

    fn recent_updates(&self, case_id: &CaseId, limit: usize) -> LetterResult<Vec<CaseUpdate>> {
        let mut updates: Vec<CaseUpdate> = self
            .case_file(case_id, UPDATES_FILENAME)?
            .unwrap_or_default();
        // Stable sort keeps file order for updates posted on the same day.
        updates.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        updates.truncate(limit);
        Ok(updates)
    }
}

/// Reads and parses a YAML file, returning `Ok(None)` if it does not exist.
fn read_yaml<T: DeserializeOwned>(path: &Path) -> LetterResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LetterError::FileRead(e)),
    };

    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| LetterError::YamlDeserialization {
            path: path.to_path_buf(),
            source,
        })
}
