//! Agency industry classification.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The industry an agency sells into.
///
/// Unknown or missing values resolve to [`Industry::Healthcare`], the legacy
/// default, rather than being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Industry {
    #[serde(rename = "Home Health and Hospice")]
    HomeHealthAndHospice,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Finance")]
    Finance,
    #[serde(rename = "Handyman Services")]
    HandymanServices,
    #[default]
    #[serde(rename = "Healthcare")]
    Healthcare,
}

impl Industry {
    /// Every accepted industry, in display order.
    pub const ALL: [Self; 5] = [
        Self::HomeHealthAndHospice,
        Self::Insurance,
        Self::Finance,
        Self::HandymanServices,
        Self::Healthcare,
    ];

    /// The label stored in the database and sent to clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HomeHealthAndHospice => "Home Health and Hospice",
            Self::Insurance => "Insurance",
            Self::Finance => "Finance",
            Self::HandymanServices => "Handyman Services",
            Self::Healthcare => "Healthcare",
        }
    }

    /// Look up an industry by its exact label (case-sensitive).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|industry| industry.as_str() == label)
    }

    /// Resolve client input to an industry, falling back to the default.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(Self::from_label).unwrap_or_default()
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
