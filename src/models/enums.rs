//! Shared domain enums stored as text columns

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Implements sqlx text encoding for an enum exposing `as_str` and `FromStr<Err = String>`
macro_rules! impl_text_column {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = sqlx::Decode::<sqlx::Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <String as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str().to_string(), buf)
            }
        }
    };
}

pub(crate) use impl_text_column;

// ---------------------------------------------------------------------------
// MachineType
// ---------------------------------------------------------------------------

/// Equipment category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineType {
    #[default]
    Production,
    Testing,
    Packaging,
    Calibration,
    Other,
}

impl MachineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::Production => "PRODUCTION",
            MachineType::Testing => "TESTING",
            MachineType::Packaging => "PACKAGING",
            MachineType::Calibration => "CALIBRATION",
            MachineType::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MachineType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRODUCTION" => Ok(MachineType::Production),
            "TESTING" => Ok(MachineType::Testing),
            "PACKAGING" => Ok(MachineType::Packaging),
            "CALIBRATION" => Ok(MachineType::Calibration),
            "OTHER" => Ok(MachineType::Other),
            _ => Err(format!("Invalid machine type: {}", s)),
        }
    }
}

impl_text_column!(MachineType);

// ---------------------------------------------------------------------------
// ProcedureKind
// ---------------------------------------------------------------------------

/// Kind of scheduled upkeep performed on a machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    Calibration,
    Maintenance,
}

impl ProcedureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureKind::Calibration => "calibration",
            ProcedureKind::Maintenance => "maintenance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcedureKind::Calibration => "Calibration",
            ProcedureKind::Maintenance => "Maintenance",
        }
    }

    /// Column holding the last completion date for this procedure
    pub fn last_date_column(&self) -> &'static str {
        match self {
            ProcedureKind::Calibration => "last_calibration_date",
            ProcedureKind::Maintenance => "last_maintenance_date",
        }
    }
}

impl std::fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
