//! License entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{License, LicenseKind, Package};
use sqlx::FromRow;

/// Database enum for package that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "package", rename_all = "snake_case")]
pub enum PackageDb {
    SdkJs,
    SdkIos,
    SdkAndroid,
}

impl From<PackageDb> for Package {
    fn from(db_package: PackageDb) -> Self {
        match db_package {
            PackageDb::SdkJs => Package::SdkJs,
            PackageDb::SdkIos => Package::SdkIos,
            PackageDb::SdkAndroid => Package::SdkAndroid,
        }
    }
}

impl From<Package> for PackageDb {
    fn from(package: Package) -> Self {
        match package {
            Package::SdkJs => PackageDb::SdkJs,
            Package::SdkIos => PackageDb::SdkIos,
            Package::SdkAndroid => PackageDb::SdkAndroid,
        }
    }
}

/// Database enum for license_kind that maps to the PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "license_kind", rename_all = "lowercase")]
pub enum LicenseKindDb {
    Production,
    Evaluation,
}

impl From<LicenseKindDb> for LicenseKind {
    fn from(db_kind: LicenseKindDb) -> Self {
        match db_kind {
            LicenseKindDb::Production => LicenseKind::Production,
            LicenseKindDb::Evaluation => LicenseKind::Evaluation,
        }
    }
}

impl From<LicenseKind> for LicenseKindDb {
    fn from(kind: LicenseKind) -> Self {
        match kind {
            LicenseKind::Production => LicenseKindDb::Production,
            LicenseKind::Evaluation => LicenseKindDb::Evaluation,
        }
    }
}

/// Database row mapping for the licenses table.
#[derive(Debug, Clone, FromRow)]
pub struct LicenseEntity {
    pub id: i64,
    pub client_id: i64,
    pub package: PackageDb,
    pub kind: LicenseKindDb,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<LicenseEntity> for License {
    fn from(entity: LicenseEntity) -> Self {
        Self {
            id: entity.id,
            client_id: entity.client_id,
            package: entity.package.into(),
            kind: entity.kind.into(),
            created_at: entity.created_at,
            expires_at: entity.expires_at,
        }
    }
}
