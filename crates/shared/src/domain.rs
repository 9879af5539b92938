use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ClienteId);
id_newtype!(PagoId);

pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort direction '{0}', expected 'asc' or 'desc'")]
pub struct ParseSortDirectionError(String);

impl FromStr for SortDirection {
    type Err = ParseSortDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(ParseSortDirectionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PagoSortKey {
    #[default]
    FechaTransaccion,
    Monto,
    TipoDeuda,
    ObservacionesDeuda,
    Observaciones,
}

impl PagoSortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FechaTransaccion => "fechaTransaccion",
            Self::Monto => "monto",
            Self::TipoDeuda => "tipoDeuda",
            Self::ObservacionesDeuda => "observacionesDeuda",
            Self::Observaciones => "observaciones",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown payment sort key '{0}'")]
pub struct ParsePagoSortKeyError(String);

impl FromStr for PagoSortKey {
    type Err = ParsePagoSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::FechaTransaccion,
            Self::Monto,
            Self::TipoDeuda,
            Self::ObservacionesDeuda,
            Self::Observaciones,
        ]
        .into_iter()
        .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| ParsePagoSortKeyError(s.to_string()))
    }
}
