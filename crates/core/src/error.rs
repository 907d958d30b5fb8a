use crate::structure::StructureReport;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LetterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] casedesk_ids::IdError),
    #[error("invalid text: {0}")]
    InvalidText(#[from] casedesk_types::TextError),
    #[error("failed to read directory: {0}")]
    DirRead(std::io::Error),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error(
        "failed to deserialize YAML (path: {path}): {source}",
        path = path.display()
    )]
    YamlDeserialization {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("data source lookup failed: {0}")]
    DataSource(String),

    #[error("malformed placeholder key '{0}' (expected Namespace.field)")]
    MalformedPlaceholder(String),
    #[error("unknown placeholder namespace '{0}'")]
    UnknownNamespace(String),
    #[error("unknown placeholder field '{namespace}.{field}'")]
    UnknownField { namespace: String, field: String },

    #[error("duplicate letter template name: {0}")]
    DuplicateTemplate(String),
    #[error("letter template not found: {0}")]
    TemplateNotFound(String),

    #[error("letter is not ready to finalise: {}", .0.errors.join("; "))]
    NotFinalisable(StructureReport),
}

pub type LetterResult<T> = std::result::Result<T, LetterError>;
