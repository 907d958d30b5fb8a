use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use casedesk_core::{
    config::core_config_from_env, default_letter_branding_config, effective_header_display,
    usable_logo_url, validate_header_config, validate_letter_structure, validate_rendered_letter,
    variable_catalog, BrandingConfig, CaseId, LetterRequest, LetterService, OrganisationId,
    PageSettings, PageSize, StructureReport,
};

#[derive(Parser)]
#[command(name = "casedesk")]
#[command(about = "Casedesk letter engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every placeholder a letter may use
    Variables,
    /// List the letter templates in the template directory
    Templates,
    /// Print the placeholder values available for a case
    Resolve {
        /// Case ID (32 hex characters)
        case_id: String,
        /// Organisation ID (32 hex characters)
        organisation_id: String,
        /// Date used for date-relative values (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Render a letter to a standalone HTML document
    Render {
        /// Case ID (32 hex characters)
        case_id: String,
        /// Organisation ID (32 hex characters)
        organisation_id: String,
        /// File holding the letter body
        #[arg(long, conflicts_with = "template")]
        body: Option<PathBuf>,
        /// Name of a template to use instead of a body file
        #[arg(long)]
        template: Option<String>,
        /// YAML or JSON file with the branding configuration
        #[arg(long)]
        branding: Option<PathBuf>,
        /// Page size: letter, a4 or legal (default from CASEDESK_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<String>,
        /// Letter date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
        /// Refuse to write the document if the letter has structural errors
        #[arg(long)]
        finalise: bool,
        /// Output file (default stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check a letter for unfilled placeholders and missing parts
    Validate {
        /// Letter file
        file: PathBuf,
        /// Treat the file as rendered HTML
        #[arg(long)]
        html: bool,
    },
    /// Check which letterhead element a branding configuration produces
    Header {
        /// YAML or JSON file with the branding configuration (default branding if omitted)
        #[arg(long)]
        branding: Option<PathBuf>,
        /// Show the logo
        #[arg(long)]
        show_logo: Option<bool>,
        /// Show the organisation name
        #[arg(long)]
        show_org_name: Option<bool>,
        /// Uploaded logo URL, if any
        #[arg(long)]
        logo_url: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("casedesk=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Variables) => {
            for variable in variable_catalog() {
                println!("{{{{{}}}}}  {}", variable.key, variable.description);
            }
        }
        Some(Commands::Templates) => {
            let letters = open_service()?;
            let templates = letters.templates().list();
            if templates.is_empty() {
                println!(
                    "No templates found in {}.",
                    letters.config().template_dir().display()
                );
            }
            for template in templates {
                match (&template.category, &template.description) {
                    (Some(category), Some(description)) => {
                        println!("{} [{}]: {}", template.name, category, description)
                    }
                    (Some(category), None) => println!("{} [{}]", template.name, category),
                    (None, Some(description)) => println!("{}: {}", template.name, description),
                    (None, None) => println!("{}", template.name),
                }
            }
        }
        Some(Commands::Resolve {
            case_id,
            organisation_id,
            date,
        }) => {
            let letters = open_service()?;
            let case_id = CaseId::parse(&case_id)?;
            let organisation_id = OrganisationId::parse(&organisation_id)?;
            let today = parse_date(date.as_deref())?;
            let resolution = letters.resolve(&case_id, &organisation_id, today);
            println!(
                "{}",
                serde_json::to_string_pretty(&resolution.variables.flatten())?
            );
        }
        Some(Commands::Render {
            case_id,
            organisation_id,
            body,
            template,
            branding,
            page_size,
            date,
            finalise,
            out,
        }) => {
            let letters = open_service()?;
            let page = page_size
                .map(|size| size.parse::<PageSize>().map(PageSettings::with_page_size))
                .transpose()?;
            let request = LetterRequest {
                case_id: CaseId::parse(&case_id)?,
                organisation_id: OrganisationId::parse(&organisation_id)?,
                body: body.map(std::fs::read_to_string).transpose()?,
                template,
                branding: load_branding(branding.as_deref())?,
                page,
                letter_date: Some(parse_date(date.as_deref())?),
            };

            let preview = letters.preview(&request)?;
            for token in &preview.substitution.unavailable {
                eprintln!("No data for {{{{{}}}}}", token);
            }
            for token in &preview.substitution.unknown {
                eprintln!("Unknown placeholder {{{{{}}}}}", token);
            }
            if let Some(warning) = &preview.header.warning {
                eprintln!("Header: {}", warning);
            }
            print_report(&preview.structure);

            if finalise && !preview.structure.is_valid {
                eprintln!("Letter not written: fix the errors above first.");
                std::process::exit(1);
            }

            let document = preview.rendered.to_html_document();
            match out {
                Some(path) => {
                    std::fs::write(&path, document)?;
                    eprintln!(
                        "Wrote {} ({} page(s), {})",
                        path.display(),
                        preview.rendered.estimated_pages,
                        preview.rendered.fingerprint()
                    );
                }
                None => print!("{}", document),
            }
        }
        Some(Commands::Validate { file, html }) => {
            let text = std::fs::read_to_string(&file)?;
            let report = if html {
                validate_rendered_letter(&text)
            } else {
                validate_letter_structure(&text)
            };
            print_report(&report);
            if report.is_valid {
                println!("{} is ready to send.", file.display());
            } else {
                std::process::exit(1);
            }
        }
        Some(Commands::Header {
            branding,
            show_logo,
            show_org_name,
            logo_url,
        }) => {
            let mut config = load_branding(branding.as_deref())?;
            if let Some(show_logo) = show_logo {
                config.show_logo = show_logo;
            }
            if let Some(show_org_name) = show_org_name {
                config.show_org_name = show_org_name;
            }
            let logo_url = usable_logo_url(logo_url.as_deref());

            let validation = validate_header_config(&config, logo_url.is_some());
            let display = effective_header_display(&config, logo_url);
            if let Some(warning) = &validation.warning {
                println!("{}: {}", if validation.is_valid { "Warning" } else { "Error" }, warning);
            }
            println!(
                "Header shows: {}",
                match (display.show_logo, display.show_org_name) {
                    (true, _) => "logo",
                    (false, true) => "organisation name",
                    (false, false) => "nothing",
                }
            );
        }
        None => {
            println!("Use 'casedesk --help' for commands");
        }
    }

    Ok(())
}

fn open_service() -> Result<LetterService<casedesk_core::FileCaseStore>, Box<dyn std::error::Error>>
{
    let cfg = Arc::new(core_config_from_env()?);
    Ok(LetterService::open(cfg)?)
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate, chrono::ParseError> {
    match date {
        Some(date) => NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d"),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

/// Reads a branding file; JSON is valid YAML, so one parser covers both.
fn load_branding(path: Option<&Path>) -> Result<BrandingConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(serde_yaml::from_str(&std::fs::read_to_string(path)?)?),
        None => Ok(default_letter_branding_config()),
    }
}

fn print_report(report: &StructureReport) {
    for error in &report.errors {
        eprintln!("error: {}", error);
    }
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
}
