//! Build script for the `api-shared` crate.
//!
//! ## Purpose
//! Generates Rust protobuf types from `casedesk.proto` and emits a file-descriptor set.
//!
//! ## Intended use
//! The generated types are shared by both gRPC and REST APIs. The descriptor set is used for gRPC
//! reflection.

/// Branding fields also accepted under the web client's camelCase names.
const BRANDING_ALIASES: &[(&str, &str)] = &[
    ("show_logo", "showLogo"),
    ("show_org_name", "showOrgName"),
    ("show_address", "showAddress"),
    ("show_contact_info", "showContactInfo"),
    ("show_date", "showDate"),
    ("date_format", "dateFormat"),
    ("show_signature", "showSignature"),
    ("signature_name", "signatureName"),
    ("signature_title", "signatureTitle"),
    ("show_confidentiality_footer", "showConfidentialityFooter"),
    ("confidentiality_text", "confidentialityText"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let proto_file = std::path::Path::new(manifest_dir).join("casedesk.proto");
    let proto_include_root = std::path::Path::new(manifest_dir);

    println!("cargo:rerun-if-changed={}", proto_file.display());
    let mut builder = tonic_build::configure()
        .build_server(true)
        .build_client(false)
        .type_attribute(
            ".",
            "#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)] #[serde(default)]",
        );
    for (field, alias) in BRANDING_ALIASES {
        builder = builder.field_attribute(
            format!(".casedesk.v1.BrandingConfig.{field}"),
            format!("#[serde(alias = \"{alias}\")]"),
        );
    }
    builder
        .file_descriptor_set_path(
            std::path::Path::new(&std::env::var("OUT_DIR")?).join("proto_descriptor.bin"),
        )
        .compile_protos(std::slice::from_ref(&proto_file), &[proto_include_root])?;

    Ok(())
}
