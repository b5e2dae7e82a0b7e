//! Certificate records and preview references
//!
//! Field names follow the backend JSON (camelCase). Everything except the id
//! is optional on the wire because seeded sample records omit most fields.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Portal role; selects the API namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Staff,
}

impl Role {
    /// Path segment below `/api`
    pub fn segment(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Staff => "staff",
        }
    }

    /// `/api/student` or `/api/staff`
    pub fn api_base(&self) -> &'static str {
        match self {
            Role::Student => "/api/student",
            Role::Staff => "/api/staff",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Staff => "STAFF",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Role::Student),
            "STAFF" => Ok(Role::Staff),
            other => Err(format!("unknown role '{}', expected STUDENT or STAFF", other)),
        }
    }
}

/// Verification status of a certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificateStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Pending => "PENDING",
            CertificateStatus::Verified => "VERIFIED",
            CertificateStatus::Rejected => "REJECTED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CertificateStatus::Pending => "Pending Review",
            CertificateStatus::Verified => "Verified",
            CertificateStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(CertificateStatus::Pending),
            "VERIFIED" => Ok(CertificateStatus::Verified),
            "REJECTED" => Ok(CertificateStatus::Rejected),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Optional descriptive metadata entered at upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificateMetadata {
    pub certificate_type: Option<String>,
    pub issuing_organization: Option<String>,
    pub issue_year: Option<String>,
    pub department: Option<String>,
}

/// Certificate record as returned by the list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub certificate_id: String,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub certificate_name: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub upload_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: CertificateStatus,
    #[serde(default)]
    pub staff_remarks: Option<String>,
    #[serde(default)]
    pub verified_by: Option<String>,
    #[serde(default)]
    pub verified_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub metadata: Option<CertificateMetadata>,
}

impl Certificate {
    /// Reference used to preview this certificate as `role`
    pub fn preview_ref(&self, role: Role) -> CertificateRef {
        CertificateRef {
            id: self.certificate_id.clone(),
            mime_type: self.file_type.clone(),
            file_name: self.file_name.clone(),
            role,
        }
    }

    /// Sample records are seeded without a stored file
    pub fn has_file(&self) -> bool {
        self.file_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.certificate_name
            .as_deref()
            .or(self.file_name.as_deref())
            .unwrap_or(&self.certificate_id)
    }
}

/// Dashboard counters
///
/// The student and staff dashboards name their totals differently; both
/// shapes decode into the same record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    #[serde(alias = "totalUploaded", alias = "totalCertificates")]
    pub total: u64,
    #[serde(alias = "pendingReview")]
    pub pending: u64,
    pub verified: u64,
    pub rejected: u64,
    /// Most recent uploads first
    #[serde(alias = "recentUploads", alias = "recentActivity")]
    pub recent: Vec<Certificate>,
}

/// Immutable description of one preview request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateRef {
    pub id: String,
    /// Declared MIME type; may be absent or wrong
    pub mime_type: Option<String>,
    /// Original file name; fallback type hint
    pub file_name: Option<String>,
    pub role: Role,
}

impl CertificateRef {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            mime_type: None,
            file_name: None,
            role,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// True when both refs address the same certificate through the same namespace
    pub fn same_target(&self, other: &CertificateRef) -> bool {
        self.id == other.id && self.role == other.role
    }

    /// Path segments of `{base}/certificates/{id}/{action}`
    pub fn segments(&self, action: &str) -> Vec<String> {
        vec![
            "api".to_string(),
            self.role.segment().to_string(),
            "certificates".to_string(),
            self.id.clone(),
            action.to_string(),
        ]
    }

    pub fn view_path(&self) -> String {
        format!("{}/certificates/{}/view", self.role.api_base(), self.id)
    }

    pub fn download_path(&self) -> String {
        format!("{}/certificates/{}/download", self.role.api_base(), self.id)
    }
}
