use anyhow::Context as _;
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use certify_preview::{
    guidance, Certificate, CertificateClient, CertificateMetadata, CertificateRef, CertificateStatus,
    CertificateUpload, CredentialProvider, DashboardStats, Embedding, LoadOutcome, PresenterError,
    PreviewConfig, PreviewFetcher, Role, ViewerPresenter,
};
use error_common::{CertifyError, Result};

use crate::Command;

pub struct CommandContext {
    pub config: PreviewConfig,
    pub role: Role,
    pub credentials: Arc<dyn CredentialProvider>,
}

impl CommandContext {
    fn client(&self) -> Result<CertificateClient> {
        Ok(CertificateClient::new(&self.config, self.credentials.clone())?)
    }
}

pub(crate) async fn run(context: &CommandContext, command: &Command) -> Result<()> {
    match command {
        Command::View {
            id,
            file_name,
            mime,
            out,
        } => {
            let mut certificate = CertificateRef::new(id.as_str(), context.role);
            certificate.file_name = file_name.clone();
            certificate.mime_type = mime.clone();
            view(context, certificate, out).await
        }
        Command::Download { id, out } => download(context, id, out.as_deref()).await,
        Command::List {
            status,
            student,
            mine,
        } => list(context, *status, student.as_deref(), *mine).await,
        Command::Upload {
            file,
            name,
            certificate_type,
            issuer,
            year,
            department,
        } => {
            let metadata = CertificateMetadata {
                certificate_type: certificate_type.clone(),
                issuing_organization: issuer.clone(),
                issue_year: year.clone(),
                department: department.clone(),
            };
            upload(context, file, name, metadata).await
        }
        Command::Stats => {
            let stats = context.client()?.analytics(context.role).await?;
            print_stats(context.role, &stats);
            Ok(())
        }
        Command::Verify { id, remarks } => {
            let certificate = context.client()?.verify(id, remarks).await?;
            print_review(&certificate);
            Ok(())
        }
        Command::Reject { id, remarks } => {
            let certificate = context.client()?.reject(id, remarks).await?;
            print_review(&certificate);
            Ok(())
        }
        Command::Delete { id } => {
            context.client()?.delete(id).await?;
            println!("{} Deleted certificate {}", "✓".bright_green(), id.bright_white());
            Ok(())
        }
    }
}

async fn view(context: &CommandContext, certificate: CertificateRef, out: &Path) -> Result<()> {
    let fetcher = PreviewFetcher::http(context.config.clone(), context.credentials.clone())?;
    let presenter = ViewerPresenter::new()
        .map_err(presenter_error)?
        .with_policy(context.config.classifier_policy())
        .with_embedding(Embedding::Inline);

    println!("⏳ Loading certificate {}...", certificate.id.bright_white());

    match fetcher.load(certificate.clone()).await {
        LoadOutcome::Ready(handle) => {
            let resource = fetcher
                .take_current()
                .ok_or_else(|| CertifyError::PayloadError("preview resource was released".to_string()))?;
            let title = certificate
                .file_name
                .clone()
                .unwrap_or_else(|| format!("Certificate {}", certificate.id));

            let mut window = presenter
                .open_window(resource, &certificate, &title)
                .map_err(presenter_error)?;
            write_file(out, window.document().as_bytes())?;
            window.close();

            println!(
                "{} {} {} ({} bytes) -> {}",
                "✓".bright_green(),
                handle.kind.icon(),
                handle.kind.label(),
                handle.size,
                out.display().to_string().bright_yellow()
            );
            Ok(())
        }
        LoadOutcome::Failed(failure) => {
            let placeholder = presenter
                .render_placeholder(&certificate, Some(&failure))
                .map_err(presenter_error)?;
            write_file(out, placeholder.as_bytes())?;

            println!(
                "{} {}",
                "✗".bright_red(),
                guidance(failure.role, Some(failure.kind())).yellow()
            );
            Err(failure.cause.into())
        }
        LoadOutcome::Superseded => Err(CertifyError::Other(anyhow::anyhow!(
            "preview of {} was superseded",
            certificate.id
        ))),
    }
}

async fn download(context: &CommandContext, id: &str, out: Option<&Path>) -> Result<()> {
    let fetcher = PreviewFetcher::http(context.config.clone(), context.credentials.clone())?;
    let file = fetcher.download(&CertificateRef::new(id, context.role)).await?;

    let target = match out {
        Some(path) => path.to_path_buf(),
        None => local_file_name(&file.file_name),
    };
    write_file(&target, &file.bytes)?;

    println!(
        "{} Saved {} ({} bytes) -> {}",
        "✓".bright_green(),
        file.file_name.bright_white(),
        file.bytes.len(),
        target.display().to_string().bright_yellow()
    );
    Ok(())
}

async fn upload(context: &CommandContext, path: &Path, name: &str, metadata: CertificateMetadata) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "certificate.bin".to_string());

    let mut upload = CertificateUpload::new(name, file_name, bytes).with_metadata(metadata);
    if let Some(content_type) = content_type_for(path) {
        upload = upload.with_content_type(content_type);
    }

    let certificate = context.client()?.upload(upload).await?;
    println!(
        "{} Uploaded {} as {} ({})",
        "✓".bright_green(),
        certificate.display_name().bright_white(),
        certificate.certificate_id.bright_yellow(),
        certificate.status.label()
    );
    Ok(())
}

async fn list(
    context: &CommandContext,
    status: Option<CertificateStatus>,
    student: Option<&str>,
    mine: bool,
) -> Result<()> {
    let client = context.client()?;
    let certificates = if mine {
        client.list_mine().await?
    } else if let Some(status) = status {
        client.by_status(context.role, status).await?
    } else if let Some(name) = student {
        client.search(context.role, name).await?
    } else {
        client.list(context.role).await?
    };

    if certificates.is_empty() {
        println!("{}", "No certificates found".dimmed());
        return Ok(());
    }

    for certificate in &certificates {
        println!("{}", format_row(certificate));
    }
    println!("{}", format!("{} certificate(s)", certificates.len()).dimmed());
    Ok(())
}

fn format_row(certificate: &Certificate) -> String {
    let status = match certificate.status {
        CertificateStatus::Verified => certificate.status.label().green(),
        CertificateStatus::Rejected => certificate.status.label().red(),
        CertificateStatus::Pending => certificate.status.label().yellow(),
    };
    let file = if certificate.has_file() {
        certificate.file_name.as_deref().unwrap_or("-")
    } else {
        "no file"
    };

    format!(
        "{:<26} {:<16} {:<32} {:<20} {}",
        certificate.certificate_id,
        status,
        certificate.display_name(),
        certificate.student_name.as_deref().unwrap_or("-"),
        file
    )
}

fn print_review(certificate: &Certificate) {
    println!(
        "{} {} is now {}",
        "✓".bright_green(),
        certificate.display_name().bright_white(),
        certificate.status.label().bright_cyan()
    );
    if let Some(remarks) = certificate.staff_remarks.as_deref().filter(|r| !r.is_empty()) {
        println!("  remarks: {}", remarks);
    }
}

fn print_stats(role: Role, stats: &DashboardStats) {
    println!("{}", format!("{} dashboard", role.as_str()).bright_cyan().bold());
    println!("  total     {}", stats.total);
    println!("  pending   {}", stats.pending.to_string().yellow());
    println!("  verified  {}", stats.verified.to_string().green());
    println!("  rejected  {}", stats.rejected.to_string().red());

    if !stats.recent.is_empty() {
        println!("{}", "Recent".dimmed());
        for certificate in &stats.recent {
            println!("{}", format_row(certificate));
        }
    }
}

/// MIME type sent with an upload, from the file extension
fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Server-provided names are reduced to their last component
fn local_file_name(name: &str) -> PathBuf {
    Path::new(name)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("certificate.bin"))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn presenter_error(error: PresenterError) -> CertifyError {
    CertifyError::PayloadError(error.to_string())
}
