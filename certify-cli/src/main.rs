use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use certify_preview::{CertificateStatus, ConfigLoadError, PreviewConfig, Role, SessionStore};
use error_common::{ErrorContext, ErrorReporter};
use logger_redacted::{init_tracing, LoggerConfig};

mod commands;

use commands::CommandContext;

/// Certify portal command-line client
#[derive(Parser, Debug)]
#[command(name = "certify")]
#[command(about = "Preview, download and review certificates on a Certify portal")]
#[command(version)]
struct Args {
    /// Portal origin, overrides the configuration file and CERTIFY_SERVER_URL
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token of the signed-in user
    #[arg(long, env = "CERTIFY_TOKEN", hide_env_values = true)]
    token: String,

    /// Role namespace used for requests (STUDENT or STAFF)
    #[arg(long, default_value = "STUDENT")]
    role: Role,

    /// Configuration file path (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a certificate and write a self-contained viewer page
    View {
        id: String,
        /// Original file name, used as a type hint
        #[arg(long)]
        file_name: Option<String>,
        /// Declared MIME type
        #[arg(long)]
        mime: Option<String>,
        /// Viewer document path
        #[arg(short, long, default_value = "viewer.html")]
        out: PathBuf,
    },
    /// Save the original certificate file
    Download {
        id: String,
        /// Target path; defaults to the server-provided file name
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List certificates
    List {
        /// Only certificates with this status
        #[arg(long)]
        status: Option<CertificateStatus>,
        /// Search by student name
        #[arg(long)]
        student: Option<String>,
        /// Only the signed-in student's uploads
        #[arg(long)]
        mine: bool,
    },
    /// Upload a certificate file (student)
    Upload {
        file: PathBuf,
        /// Certificate title shown to reviewers
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        certificate_type: Option<String>,
        #[arg(long)]
        issuer: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Show dashboard counters for the selected role
    Stats,
    /// Mark a certificate as verified (staff)
    Verify {
        id: String,
        #[arg(long, default_value = "")]
        remarks: String,
    },
    /// Reject a certificate (staff)
    Reject {
        id: String,
        #[arg(long, default_value = "")]
        remarks: String,
    },
    /// Delete one of your certificates (student)
    Delete { id: String },
}

impl Command {
    fn certificate_id(&self) -> Option<&str> {
        match self {
            Command::View { id, .. }
            | Command::Download { id, .. }
            | Command::Verify { id, .. }
            | Command::Reject { id, .. }
            | Command::Delete { id } => Some(id.as_str()),
            Command::List { .. } | Command::Upload { .. } | Command::Stats => None,
        }
    }
}

/// Configuration file (if any), then `CERTIFY_*` variables, then `--base-url`
fn resolve_config<F>(args: &Args, lookup: F) -> Result<PreviewConfig, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match &args.config {
        Some(path) => PreviewConfig::from_yaml_file(path)?,
        None => PreviewConfig::default(),
    };

    let mut config = base.apply_overrides(lookup);
    if let Some(url) = &args.base_url {
        config.server_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let logger = LoggerConfig::default()
        .verbose(args.verbose)
        .with_json_output(args.json_logs);
    if let Err(e) = init_tracing(&logger) {
        eprintln!("{} {}", "warning:".yellow(), e);
    }

    let config = match resolve_config(&args, |key| std::env::var(key).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red(), e);
            std::process::exit(2);
        }
    };
    tracing::debug!(server_url = %config.server_url, role = %args.role, "Configuration resolved");

    let session = Arc::new(SessionStore::new());
    session.sign_in(args.token.clone(), args.role, None);

    let context = CommandContext {
        config,
        role: args.role,
        credentials: session.clone(),
    };

    let result = commands::run(&context, &args.command).await;
    session.sign_out();

    if let Err(error) = result {
        let mut error_context = ErrorContext::new()
            .with_role(args.role.as_str())
            .with_endpoint(context.config.server_url.clone());
        if let Some(id) = args.command.certificate_id() {
            error_context = error_context.with_certificate_id(id);
        }
        ErrorReporter::new("certify-cli").report(&error, &error_context);

        eprintln!("{} {} [{}]", "error:".bright_red(), error, error.code());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["certify", "--token", "tok"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_view_arguments() {
        let args = parse(&["--role", "staff", "view", "c1", "--file-name", "cert.pdf"]);
        assert_eq!(args.role, Role::Staff);
        match &args.command {
            Command::View { id, file_name, mime, out } => {
                assert_eq!(id, "c1");
                assert_eq!(file_name.as_deref(), Some("cert.pdf"));
                assert!(mime.is_none());
                assert_eq!(out, &PathBuf::from("viewer.html"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.command.certificate_id(), Some("c1"));
    }

    #[test]
    fn test_list_status_and_role_parsing() {
        let args = parse(&["list", "--status", "pending"]);
        assert_eq!(args.role, Role::Student);
        assert!(matches!(
            args.command,
            Command::List {
                status: Some(CertificateStatus::Pending),
                ..
            }
        ));
        assert!(Args::try_parse_from(["certify", "--token", "t", "--role", "admin", "list"]).is_err());
    }

    #[test]
    fn test_config_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url: http://file.test").unwrap();
        writeln!(file, "retry_cap: 5").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let env: HashMap<&str, &str> = HashMap::from([
            ("CERTIFY_SERVER_URL", "http://env.test"),
            ("CERTIFY_RETRY_CAP", "1"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let args = parse(&["--config", &path, "list"]);
        let config = resolve_config(&args, lookup).unwrap();
        assert_eq!(config.server_url, "http://env.test");
        assert_eq!(config.retry_cap, 1);

        let args = parse(&["--config", &path, "--base-url", "https://cli.test", "list"]);
        let config = resolve_config(&args, lookup).unwrap();
        assert_eq!(config.server_url, "https://cli.test");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let args = parse(&["--base-url", "not a url", "list"]);
        assert!(resolve_config(&args, |_| None).is_err());
    }

    #[test]
    fn test_upload_arguments() {
        let args = parse(&[
            "upload", "scans/aws.pdf", "--name", "AWS Cloud", "--type", "Professional", "--issuer", "Amazon",
        ]);
        match &args.command {
            Command::Upload {
                file,
                name,
                certificate_type,
                issuer,
                year,
                ..
            } => {
                assert_eq!(file, &PathBuf::from("scans/aws.pdf"));
                assert_eq!(name, "AWS Cloud");
                assert_eq!(certificate_type.as_deref(), Some("Professional"));
                assert_eq!(issuer.as_deref(), Some("Amazon"));
                assert!(year.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(args.command.certificate_id(), None);
        assert!(Args::try_parse_from(["certify", "--token", "t", "upload", "a.pdf"]).is_err());
    }

    #[test]
    fn test_stats_arguments() {
        let args = parse(&["--role", "STAFF", "stats"]);
        assert_eq!(args.role, Role::Staff);
        assert!(matches!(args.command, Command::Stats));
    }
}
