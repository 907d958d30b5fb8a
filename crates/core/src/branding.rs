//! Letter branding configuration.
//!
//! The branding configuration is the set of toggles controlling which optional letter elements
//! appear: logo or organisation name, address, contact line, date block, signature block and
//! confidentiality footer.
//!
//! The letterhead shows either the logo or the organisation name, never both. A request for
//! both is reported by [`validate_header_config`]; the renderer still resolves it
//! deterministically through [`effective_header_display`], where the logo wins whenever one
//! has been uploaded.

use crate::constants::DEFAULT_CONFIDENTIALITY_TEXT;
use crate::validation::validate_logo_url;
use crate::variables::records::non_blank;
use casedesk_types::LetterDateFormat;
use serde::{Deserialize, Serialize};

/// User-editable branding toggles.
///
/// Field names accept the camelCase spelling used by the web client as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    #[serde(alias = "showLogo")]
    pub show_logo: bool,
    #[serde(alias = "showOrgName")]
    pub show_org_name: bool,
    #[serde(alias = "showAddress")]
    pub show_address: bool,
    #[serde(alias = "showContactInfo")]
    pub show_contact_info: bool,
    #[serde(alias = "showDate")]
    pub show_date: bool,
    #[serde(alias = "dateFormat")]
    pub date_format: LetterDateFormat,
    #[serde(alias = "showSignature")]
    pub show_signature: bool,
    #[serde(alias = "signatureName")]
    pub signature_name: Option<String>,
    #[serde(alias = "signatureTitle")]
    pub signature_title: Option<String>,
    #[serde(alias = "showConfidentialityFooter")]
    pub show_confidentiality_footer: bool,
    #[serde(alias = "confidentialityText")]
    pub confidentiality_text: String,
}

/// Returns a fresh default branding configuration.
///
/// Every call builds a new value; callers may mutate their copy freely.
pub fn default_letter_branding_config() -> BrandingConfig {
    BrandingConfig {
        show_logo: true,
        show_org_name: false,
        show_address: true,
        show_contact_info: true,
        show_date: true,
        date_format: LetterDateFormat::Full,
        show_signature: true,
        signature_name: None,
        signature_title: None,
        show_confidentiality_footer: true,
        confidentiality_text: DEFAULT_CONFIDENTIALITY_TEXT.to_owned(),
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        default_letter_branding_config()
    }
}

/// Outcome of [`validate_header_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderValidation {
    pub is_valid: bool,
    pub warning: Option<String>,
}

/// What the letterhead will actually show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeaderDisplay {
    pub show_logo: bool,
    pub show_org_name: bool,
}

/// Checks the letterhead toggles.
///
/// - Invalid when both the logo and the organisation name are requested.
/// - Valid with a warning when a logo is requested but none has been uploaded.
pub fn validate_header_config(config: &BrandingConfig, has_logo: bool) -> HeaderValidation {
    if config.show_logo && config.show_org_name {
        return HeaderValidation {
            is_valid: false,
            warning: Some(
                "Logo and organization name cannot both be shown in the letterhead; \
                 choose one."
                    .into(),
            ),
        };
    }

    if config.show_logo && !has_logo {
        return HeaderValidation {
            is_valid: true,
            warning: Some(
                "No logo has been uploaded; the organization name will be shown instead.".into(),
            ),
        };
    }

    HeaderValidation {
        is_valid: true,
        warning: None,
    }
}

/// The logo URL the letterhead can actually draw, if any.
///
/// Blank URLs and URLs rejected by [`validate_logo_url`] count as no logo. Every caller that
/// asks "is there a logo?" goes through this, so validation endpoints and the renderer agree.
pub fn usable_logo_url(logo_url: Option<&str>) -> Option<&str> {
    let url = non_blank(logo_url)?;
    match validate_logo_url(url) {
        Ok(()) => Some(url),
        Err(e) => {
            tracing::warn!("ignoring logo URL: {}", e);
            None
        }
    }
}

/// Resolves the requested toggles against whether a usable logo exists.
///
/// - Logo present and requested: logo only, whatever `show_org_name` says.
/// - No logo: organisation name if either it or the missing logo was requested.
/// - Logo present but not requested: organisation name as requested.
pub fn effective_header_display(config: &BrandingConfig, logo_url: Option<&str>) -> HeaderDisplay {
    let has_logo = usable_logo_url(logo_url).is_some();

    if has_logo && config.show_logo {
        return HeaderDisplay {
            show_logo: true,
            show_org_name: false,
        };
    }

    if !has_logo {
        return HeaderDisplay {
            show_logo: false,
            show_org_name: config.show_org_name || config.show_logo,
        };
    }

    HeaderDisplay {
        show_logo: false,
        show_org_name: config.show_org_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGO: Option<&str> = Some("https://cdn.example.com/logo.png");

    fn config(show_logo: bool, show_org_name: bool) -> BrandingConfig {
        BrandingConfig {
            show_logo,
            show_org_name,
            ..default_letter_branding_config()
        }
    }

    #[test]
    fn test_default_config_is_fresh_per_call() {
        let mut first = default_letter_branding_config();
        first.show_date = false;
        first.confidentiality_text.clear();

        let second = default_letter_branding_config();
        assert!(second.show_date);
        assert_eq!(second.confidentiality_text, DEFAULT_CONFIDENTIALITY_TEXT);
        assert!(validate_header_config(&second, true).is_valid);
    }

    #[test]
    fn test_validate_rejects_logo_and_name_together() {
        for has_logo in [true, false] {
            let result = validate_header_config(&config(true, true), has_logo);
            assert!(!result.is_valid);
            assert!(result.warning.is_some());
        }
    }

    #[test]
    fn test_validate_warns_when_logo_missing() {
        let result = validate_header_config(&config(true, false), false);
        assert!(result.is_valid);
        assert!(result.warning.unwrap().contains("No logo"));
    }

    #[test]
    fn test_validate_accepts_name_only() {
        let result = validate_header_config(&config(false, true), false);
        assert_eq!(
            result,
            HeaderValidation {
                is_valid: true,
                warning: None
            }
        );
    }

    #[test]
    fn test_effective_display_logo_wins_when_present() {
        for show_org_name in [true, false] {
            let display = effective_header_display(&config(true, show_org_name), LOGO);
            assert_eq!(
                display,
                HeaderDisplay {
                    show_logo: true,
                    show_org_name: false
                }
            );
        }
    }

    #[test]
    fn test_usable_logo_url() {
        assert_eq!(
            usable_logo_url(Some("  https://cdn.example.com/logo.png ")),
            Some("https://cdn.example.com/logo.png")
        );
        for url in [None, Some(" "), Some("javascript:alert(1)"), Some("ftp://x/logo.png")] {
            assert_eq!(usable_logo_url(url), None);
        }
    }

    #[test]
    fn test_effective_display_treats_unsafe_logo_as_missing() {
        let display = effective_header_display(&config(true, false), Some("ftp://x/logo.png"));
        assert_eq!(
            display,
            HeaderDisplay {
                show_logo: false,
                show_org_name: true
            }
        );
    }

    #[test]
    fn test_effective_display_falls_back_to_name_without_logo() {
        for url in [None, Some(""), Some("   ")] {
            let display = effective_header_display(&config(false, true), url);
            assert_eq!(
                display,
                HeaderDisplay {
                    show_logo: false,
                    show_org_name: true
                }
            );
            // A requested but missing logo also falls back to the name.
            let display = effective_header_display(&config(true, false), url);
            assert!(!display.show_logo);
            assert!(display.show_org_name);
        }
    }

    #[test]
    fn test_effective_display_respects_disabled_logo() {
        let display = effective_header_display(&config(false, false), LOGO);
        assert_eq!(
            display,
            HeaderDisplay {
                show_logo: false,
                show_org_name: false
            }
        );
    }

    #[test]
    fn test_branding_accepts_camel_case_json() {
        let json = r#"{"showLogo": false, "showOrgName": true, "dateFormat": "short"}"#;
        let config: BrandingConfig = serde_json::from_str(json).unwrap();
        assert!(!config.show_logo);
        assert!(config.show_org_name);
        assert_eq!(config.date_format, LetterDateFormat::Short);
        // Unspecified fields take the defaults.
        assert!(config.show_signature);
    }
}
