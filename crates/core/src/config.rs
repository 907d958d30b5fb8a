//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{
    CASES_DIR_NAME, DEFAULT_CASE_DATA_DIR, DEFAULT_RECENT_UPDATES, MAX_RECENT_UPDATES,
    ORGANISATIONS_DIR_NAME, TEMPLATES_DIR_NAME,
};
use crate::layout::PageSize;
use crate::{LetterError, LetterResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    case_data_dir: PathBuf,
    template_dir: PathBuf,
    default_page_size: PageSize,
    recent_updates_limit: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `LetterError::InvalidInput` if `recent_updates_limit` is outside
    /// `1..=MAX_RECENT_UPDATES`.
    pub fn new(
        case_data_dir: PathBuf,
        template_dir: PathBuf,
        default_page_size: PageSize,
        recent_updates_limit: usize,
    ) -> LetterResult<Self> {
        if !(1..=MAX_RECENT_UPDATES).contains(&recent_updates_limit) {
            return Err(LetterError::InvalidInput(format!(
                "recent updates limit must be between 1 and {}",
                MAX_RECENT_UPDATES
            )));
        }

        Ok(Self {
            case_data_dir,
            template_dir,
            default_page_size,
            recent_updates_limit,
        })
    }

    pub fn case_data_dir(&self) -> &Path {
        &self.case_data_dir
    }

    pub fn cases_dir(&self) -> PathBuf {
        self.case_data_dir.join(CASES_DIR_NAME)
    }

    pub fn organisations_dir(&self) -> PathBuf {
        self.case_data_dir.join(ORGANISATIONS_DIR_NAME)
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn default_page_size(&self) -> PageSize {
        self.default_page_size
    }

    pub fn recent_updates_limit(&self) -> usize {
        self.recent_updates_limit
    }
}

pub const DATA_DIR_ENV: &str = "CASEDESK_DATA_DIR";
pub const TEMPLATE_DIR_ENV: &str = "CASEDESK_TEMPLATE_DIR";
pub const PAGE_SIZE_ENV: &str = "CASEDESK_PAGE_SIZE";
pub const RECENT_UPDATES_ENV: &str = "CASEDESK_RECENT_UPDATES";

/// Resolve a `CoreConfig` from the process environment.
///
/// Binaries call this once at startup; library code receives the resulting config instead.
///
/// # Errors
///
/// Returns `LetterError::InvalidInput` if any variable holds an unusable value.
pub fn core_config_from_env() -> LetterResult<CoreConfig> {
    let env_value = |name: &str| {
        std::env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let case_data_dir = env_value(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CASE_DATA_DIR));
    let template_dir =
        resolve_template_dir(env_value(TEMPLATE_DIR_ENV).map(PathBuf::from), &case_data_dir)?;
    let default_page_size = page_size_from_env_value(env_value(PAGE_SIZE_ENV))?;
    let recent_updates_limit = recent_updates_limit_from_env_value(env_value(RECENT_UPDATES_ENV))?;

    CoreConfig::new(
        case_data_dir,
        template_dir,
        default_page_size,
        recent_updates_limit,
    )
}

/// Resolve the template directory without reading environment variables.
///
/// An explicit override must be an existing directory. Otherwise templates live in `templates/`
/// under the case data directory; that directory need not exist yet.
///
/// # Errors
///
/// Returns `LetterError::InvalidInput` if the override is not a directory.
pub fn resolve_template_dir(
    override_dir: Option<PathBuf>,
    case_data_dir: &Path,
) -> LetterResult<PathBuf> {
    match override_dir {
        Some(dir) if dir.is_dir() => Ok(dir),
        Some(dir) => Err(LetterError::InvalidInput(format!(
            "CASEDESK_TEMPLATE_DIR override {} is not a directory",
            dir.display()
        ))),
        None => Ok(case_data_dir.join(TEMPLATES_DIR_NAME)),
    }
}

/// Parse the default page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns US letter.
pub fn page_size_from_env_value(value: Option<String>) -> LetterResult<PageSize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<PageSize>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Parse the recent-updates limit from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default.
pub fn recent_updates_limit_from_env_value(value: Option<String>) -> LetterResult<usize> {
    let Some(value) = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Ok(DEFAULT_RECENT_UPDATES);
    };

    let limit = value.parse::<usize>().map_err(|_| {
        LetterError::InvalidInput(format!(
            "CASEDESK_RECENT_UPDATES must be a whole number, got '{}'",
            value
        ))
    })?;
    if !(1..=MAX_RECENT_UPDATES).contains(&limit) {
        return Err(LetterError::InvalidInput(format!(
            "CASEDESK_RECENT_UPDATES must be between 1 and {}",
            MAX_RECENT_UPDATES
        )));
    }
    Ok(limit)
}
