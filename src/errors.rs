use crate::sites::Site;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekSearchError {
    AdapterNotFound { host: String },
    AnchorNotFound { site: Site, attempts: u32 },
    MissingSelection,
    MalformedExistingRange { param: &'static str, value: String },
    InvalidDate { value: String },
}

impl WeekSearchError {
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    pub fn malformed(param: &'static str, value: impl Into<String>) -> Self {
        Self::MalformedExistingRange {
            param,
            value: value.into(),
        }
    }

    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::MissingSelection)
    }
}

impl fmt::Display for WeekSearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdapterNotFound { host } => write!(f, "no site adapter for host '{host}'"),
            Self::AnchorNotFound { site, attempts } => {
                write!(f, "search bar for {site} not found after {attempts} attempts")
            }
            Self::MissingSelection => f.write_str("start and end dates must be selected"),
            Self::MalformedExistingRange { param, value } => {
                write!(f, "unreadable date range in '{param}': {value}")
            }
            Self::InvalidDate { value } => write!(f, "invalid date '{value}'"),
        }
    }
}

impl std::error::Error for WeekSearchError {}
