// Re-export the proto module from the shared `api-shared` crate so callers
// can reference `api_grpc::pb`.
pub use api_shared::pb;

use api_shared::convert;
use api_shared::pb::casedesk_server::Casedesk;
use api_shared::pb::{
    FinaliseLetterRes, HealthRes, LetterReq, ListTemplatesRes, ListVariablesRes, PreviewLetterRes,
    StructureReport, ValidateBrandingReq, ValidateBrandingRes, ValidateLetterReq,
};
use api_shared::{ApiKeyGuard, HealthService};
use casedesk_core::{
    effective_header_display, usable_logo_url, validate_header_config,
    validate_letter_structure, validate_rendered_letter, variable_catalog, FileCaseStore,
    LetterError, LetterService,
};
use std::sync::Arc;
use tonic::{Request, Response, Status};

/// Builds the authentication interceptor for gRPC requests.
pub fn auth_interceptor(
    guard: ApiKeyGuard,
) -> impl FnMut(Request<()>) -> Result<Request<()>, Status> + Clone {
    move |req| guard.intercept(req)
}

/// Maps a core error to a gRPC status.
///
/// Caller mistakes carry their message; anything else is logged and reported as internal.
pub fn status_from_error(e: &LetterError) -> Status {
    match e {
        LetterError::InvalidInput(_)
        | LetterError::InvalidId(_)
        | LetterError::InvalidText(_)
        | LetterError::MalformedPlaceholder(_)
        | LetterError::UnknownNamespace(_)
        | LetterError::UnknownField { .. } => Status::invalid_argument(e.to_string()),
        LetterError::TemplateNotFound(_) => Status::not_found(e.to_string()),
        LetterError::NotFinalisable(_) => Status::failed_precondition(e.to_string()),
        _ => {
            tracing::error!("letter operation failed: {:?}", e);
            Status::internal("Internal error")
        }
    }
}

#[derive(Clone)]
pub struct CasedeskService {
    letters: Arc<LetterService<FileCaseStore>>,
}

impl CasedeskService {
    pub fn new(letters: Arc<LetterService<FileCaseStore>>) -> Self {
        Self { letters }
    }
}

#[tonic::async_trait]
impl Casedesk for CasedeskService {
    async fn health(&self, _req: Request<()>) -> Result<Response<HealthRes>, Status> {
        Ok(Response::new(HealthService::check_health()))
    }

    async fn list_variables(
        &self,
        _req: Request<()>,
    ) -> Result<Response<ListVariablesRes>, Status> {
        Ok(Response::new(convert::variables_to_pb(variable_catalog())))
    }

    async fn list_templates(
        &self,
        _req: Request<()>,
    ) -> Result<Response<ListTemplatesRes>, Status> {
        Ok(Response::new(convert::templates_to_pb(self.letters.templates())))
    }

    async fn preview_letter(
        &self,
        req: Request<LetterReq>,
    ) -> Result<Response<PreviewLetterRes>, Status> {
        let request = convert::letter_request_from_pb(req.into_inner())
            .map_err(|e| status_from_error(&e))?;
        let preview = self
            .letters
            .preview(&request)
            .map_err(|e| status_from_error(&e))?;
        Ok(Response::new(convert::preview_to_pb(&preview)))
    }

    async fn finalise_letter(
        &self,
        req: Request<LetterReq>,
    ) -> Result<Response<FinaliseLetterRes>, Status> {
        let request = convert::letter_request_from_pb(req.into_inner())
            .map_err(|e| status_from_error(&e))?;
        let payload = self
            .letters
            .finalise(&request)
            .map_err(|e| status_from_error(&e))?;
        Ok(Response::new(convert::export_to_pb(payload)))
    }

    async fn validate_letter(
        &self,
        req: Request<ValidateLetterReq>,
    ) -> Result<Response<StructureReport>, Status> {
        let req = req.into_inner();
        let report = if req.is_html {
            validate_rendered_letter(&req.text)
        } else {
            validate_letter_structure(&req.text)
        };
        Ok(Response::new(convert::structure_to_pb(&report)))
    }

    async fn validate_branding(
        &self,
        req: Request<ValidateBrandingReq>,
    ) -> Result<Response<ValidateBrandingRes>, Status> {
        let req = req.into_inner();
        let branding =
            convert::branding_from_pb(req.branding).map_err(|e| status_from_error(&e))?;
        let logo_url = usable_logo_url(Some(req.logo_url.as_str()));

        let validation = validate_header_config(&branding, logo_url.is_some());
        let display = effective_header_display(&branding, logo_url);
        Ok(Response::new(ValidateBrandingRes {
            validation: Some(convert::header_validation_to_pb(&validation)),
            display: Some(convert::header_display_to_pb(display)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casedesk_core::{CaseId, CoreConfig, OrganisationId, PageSize, TemplateLibrary};
    use tempfile::TempDir;
    use tonic::Code;

    fn service(temp: &TempDir) -> CasedeskService {
        let cfg = Arc::new(
            CoreConfig::new(
                temp.path().to_path_buf(),
                temp.path().join("templates"),
                PageSize::Letter,
                3,
            )
            .unwrap(),
        );
        let store = FileCaseStore::new(cfg.clone());
        CasedeskService::new(Arc::new(LetterService::new(
            cfg,
            store,
            TemplateLibrary::default(),
        )))
    }

    fn letter(body: &str) -> LetterReq {
        LetterReq {
            case_id: CaseId::new().to_string(),
            organisation_id: OrganisationId::new().to_string(),
            body: body.into(),
            letter_date: "2026-01-06".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_health() {
        let temp = TempDir::new().unwrap();
        let res = service(&temp).health(Request::new(())).await.unwrap();
        assert!(res.into_inner().ok);
    }

    #[tokio::test]
    async fn test_preview_reports_unavailable_placeholders() {
        let temp = TempDir::new().unwrap();
        let res = service(&temp)
            .preview_letter(Request::new(letter("Dear {{Contact.name}},")))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(res.unavailable_placeholders, vec!["Contact.name".to_owned()]);
        assert!(res.html.contains("{{Contact.name}}"));
        assert!(!res.structure.unwrap().is_valid);
    }

    #[tokio::test]
    async fn test_finalise_incomplete_letter_is_failed_precondition() {
        let temp = TempDir::new().unwrap();
        let status = service(&temp)
            .finalise_letter(Request::new(letter("Dear [insert name],")))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::FailedPrecondition);
        assert!(status.message().contains("[insert"));
    }

    #[tokio::test]
    async fn test_bad_identifier_is_invalid_argument() {
        let temp = TempDir::new().unwrap();
        let mut req = letter("Dear Marge,");
        req.case_id = "CASE-1".into();
        let status = service(&temp)
            .preview_letter(Request::new(req))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_validate_branding_logo_wins() {
        let temp = TempDir::new().unwrap();
        let res = service(&temp)
            .validate_branding(Request::new(ValidateBrandingReq {
                branding: Some(pb::BrandingConfig {
                    show_logo: Some(true),
                    show_org_name: Some(true),
                    ..Default::default()
                }),
                logo_url: "https://cdn.acme.test/logo.png".into(),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!(!res.validation.unwrap().is_valid);
        let display = res.display.unwrap();
        assert!(display.show_logo);
        assert!(!display.show_org_name);
    }

    #[tokio::test]
    async fn test_validate_letter_html() {
        let temp = TempDir::new().unwrap();
        let res = service(&temp)
            .validate_letter(Request::new(ValidateLetterReq {
                text: "<p>TBD</p>".into(),
                is_html: true,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(!res.is_valid);
        assert!(res.errors.iter().any(|e| e.contains("TBD")));
    }
}
