//! License domain model and its choice enumerations.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default license term applied when no expiration is given at creation.
pub const LICENSE_TERM_DAYS: i64 = 90;

/// A package accessible to a client with a valid license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Package {
    SdkJs,
    SdkIos,
    SdkAndroid,
}

impl Package {
    /// Human-readable name used in rendered notification bodies.
    pub fn display_name(&self) -> &'static str {
        match self {
            Package::SdkJs => "JavaScript SDK",
            Package::SdkIos => "iOS SDK",
            Package::SdkAndroid => "Android SDK",
        }
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A license kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseKind {
    Production,
    Evaluation,
}

impl LicenseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseKind::Production => "production",
            LicenseKind::Evaluation => "evaluation",
        }
    }
}

impl std::fmt::Display for LicenseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client license allowing access to a package.
///
/// `expires_at` is always set; licenses created without an explicit
/// expiration get [`default_expiry`] applied at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: i64,
    pub client_id: i64,
    pub package: Package,
    pub kind: LicenseKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Expiration applied to licenses created without one.
pub fn default_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(LICENSE_TERM_DAYS)
}

/// Request payload for creating a license.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLicenseRequest {
    pub client_id: i64,
    pub package: Package,
    pub kind: LicenseKind,
    /// Optional; defaults to creation time plus the standard term.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response payload for license endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseResponse {
    pub id: i64,
    pub client_id: i64,
    pub package: Package,
    pub kind: LicenseKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<License> for LicenseResponse {
    fn from(license: License) -> Self {
        Self {
            id: license.id,
            client_id: license.client_id,
            package: license.package,
            kind: license.kind,
            created_at: license.created_at,
            expires_at: license.expires_at,
        }
    }
}
