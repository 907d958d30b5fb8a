//! The data-access seam used by the variable resolver.

use super::records::{
    AccountRecord, CaseRecord, CaseUpdate, ContactRecord, FinanceTotals, OrganisationProfile,
    StaffRecord, SubjectRecord,
};
use crate::error::LetterResult;
use casedesk_ids::{CaseId, OrganisationId, RecordId};

/// Read access to the records a letter can draw on.
///
/// Each lookup is independent. `Ok(None)` means the record does not exist; `Err` means the
/// lookup itself failed. The resolver treats both as "no data for that section".
pub trait CaseDataSource: Send + Sync {
    fn case(&self, case_id: &CaseId) -> LetterResult<Option<CaseRecord>>;

    fn client(&self, case_id: &CaseId) -> LetterResult<Option<AccountRecord>>;

    fn primary_contact(&self, case_id: &CaseId) -> LetterResult<Option<ContactRecord>>;

    fn primary_subject(&self, case_id: &CaseId) -> LetterResult<Option<SubjectRecord>>;

    fn staff_member(
        &self,
        organisation_id: &OrganisationId,
        staff_id: &RecordId,
    ) -> LetterResult<Option<StaffRecord>>;

    fn organisation_profile(
        &self,
        organisation_id: &OrganisationId,
    ) -> LetterResult<Option<OrganisationProfile>>;

    fn finance_totals(&self, case_id: &CaseId) -> LetterResult<Option<FinanceTotals>>;

    /// The newest `limit` updates, newest first.
    fn recent_updates(&self, case_id: &CaseId, limit: usize) -> LetterResult<Vec<CaseUpdate>>;
}

impl<T: CaseDataSource + ?Sized> CaseDataSource for std::sync::Arc<T> {
    fn case(&self, case_id: &CaseId) -> LetterResult<Option<CaseRecord>> {
        (**self).case(case_id)
    }

    fn client(&self, case_id: &CaseId) -> LetterResult<Option<AccountRecord>> {
        (**self).client(case_id)
    }

    fn primary_contact(&self, case_id: &CaseId) -> LetterResult<Option<ContactRecord>> {
        (**self).primary_contact(case_id)
    }

    fn primary_subject(&self, case_id: &CaseId) -> LetterResult<Option<SubjectRecord>> {
        (**self).primary_subject(case_id)
    }

    fn staff_member(
        &self,
        organisation_id: &OrganisationId,
        staff_id: &RecordId,
    ) -> LetterResult<Option<StaffRecord>> {
        (**self).staff_member(organisation_id, staff_id)
    }

    fn organisation_profile(
        &self,
        organisation_id: &OrganisationId,
    ) -> LetterResult<Option<OrganisationProfile>> {
        (**self).organisation_profile(organisation_id)
    }

    fn finance_totals(&self, case_id: &CaseId) -> LetterResult<Option<FinanceTotals>> {
        (**self).finance_totals(case_id)
    }

    fn recent_updates(&self, case_id: &CaseId, limit: usize) -> LetterResult<Vec<CaseUpdate>> {
        (**self).recent_updates(case_id, limit)
    }
}
