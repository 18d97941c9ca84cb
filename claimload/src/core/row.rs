//! Input rows and the checks applied before any remote call.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ITEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Q[1-9][0-9]*$").expect("item id pattern is valid"));

#[allow(clippy::expect_used)]
static PROPERTY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P[1-9][0-9]*$").expect("property id pattern is valid"));

/// Returns true if `value` is a well-formed item identifier (`Q42`).
#[must_use]
pub fn is_item_id(value: &str) -> bool {
    ITEM_ID.is_match(value)
}

/// Returns true if `value` is a well-formed property identifier (`P13591`).
#[must_use]
pub fn is_property_id(value: &str) -> bool {
    PROPERTY_ID.is_match(value)
}

/// How the external URI is turned into the string value of the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueFormat {
    /// Write the URI exactly as it appears in the input.
    #[default]
    FullUri,
    /// Write only the part after the first `data/` segment.
    DataPath,
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullUri => write!(f, "full-uri"),
            Self::DataPath => write!(f, "data-path"),
        }
    }
}

impl FromStr for ValueFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full-uri" | "full_uri" | "uri" => Ok(Self::FullUri),
            "data-path" | "data_path" | "path" => Ok(Self::DataPath),
            other => Err(format!(
                "unknown value format '{other}' (expected full-uri or data-path)"
            )),
        }
    }
}

impl ValueFormat {
    /// Derives the claim value for `uri`.
    ///
    /// Returns `None` when the URI cannot be expressed in this format.
    #[must_use]
    pub fn claim_value(self, uri: &str) -> Option<String> {
        match self {
            Self::FullUri => Some(uri.to_string()),
            Self::DataPath => {
                if let Some((_, rest)) = uri.split_once("data/") {
                    (!rest.is_empty()).then(|| rest.to_string())
                } else if uri.starts_with('/') {
                    None
                } else {
                    Some(uri.to_string())
                }
            }
        }
    }
}

/// One line of the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRow {
    /// Target item identifier.
    pub item_id: String,
    /// External URI to attach to the item.
    pub external_uri: String,
}

/// Reason a row was refused before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    /// The item identifier is not of the `Q<number>` form.
    InvalidItemId(String),
    /// The external URI column is empty.
    EmptyUri,
    /// The URI cannot be rendered in the configured value format.
    UnrepresentableUri {
        /// The offending URI.
        uri: String,
        /// The format that was requested.
        format: ValueFormat,
    },
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidItemId(id) => write!(f, "invalid item id '{id}'"),
            Self::EmptyUri => write!(f, "external uri is empty"),
            Self::UnrepresentableUri { uri, format } => {
                write!(f, "external uri '{uri}' cannot be written as {format}")
            }
        }
    }
}

impl UploadRow {
    /// Creates a new row, trimming surrounding whitespace.
    #[must_use]
    pub fn new(item_id: impl Into<String>, external_uri: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into().trim().to_string(),
            external_uri: external_uri.into().trim().to_string(),
        }
    }

    /// Validates the row and returns the value the claim should carry.
    pub fn claim_value(&self, format: ValueFormat) -> Result<String, RowRejection> {
        if !is_item_id(&self.item_id) {
            return Err(RowRejection::InvalidItemId(self.item_id.clone()));
        }
        if self.external_uri.is_empty() {
            return Err(RowRejection::EmptyUri);
        }
        format
            .claim_value(&self.external_uri)
            .ok_or_else(|| RowRejection::UnrepresentableUri {
                uri: self.external_uri.clone(),
                format,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_pattern() {
        assert!(is_item_id("Q100"));
        assert!(is_item_id("Q1"));
        assert!(!is_item_id("Q0"));
        assert!(!is_item_id("q100"));
        assert!(!is_item_id("P100"));
        assert!(!is_item_id("Q100 "));
        assert!(!is_item_id("QID"));
    }

    #[test]
    fn test_property_id_pattern() {
        assert!(is_property_id("P13591"));
        assert!(!is_property_id("Q13591"));
        assert!(!is_property_id("P"));
    }

    #[test]
    fn test_full_uri_is_verbatim() {
        let row = UploadRow::new("Q100", "https://lux.example/data/person/1");
        assert_eq!(
            row.claim_value(ValueFormat::FullUri).unwrap(),
            "https://lux.example/data/person/1"
        );
    }

    #[test]
    fn test_data_path_strips_prefix() {
        assert_eq!(
            ValueFormat::DataPath.claim_value("https://lux.yale.edu/data/person/abc-123"),
            Some("person/abc-123".to_string())
        );
        assert_eq!(
            ValueFormat::DataPath.claim_value("concept/xyz"),
            Some("concept/xyz".to_string())
        );
        assert_eq!(ValueFormat::DataPath.claim_value("/person/1"), None);
        assert_eq!(ValueFormat::DataPath.claim_value("https://lux.example/data/"), None);
    }

    #[test]
    fn test_row_trims_whitespace() {
        let row = UploadRow::new(" Q7 ", " https://lux.example/data/place/7\n");
        assert_eq!(row.item_id, "Q7");
        assert_eq!(row.external_uri, "https://lux.example/data/place/7");
    }

    #[test]
    fn test_rejections() {
        let bad_id = UploadRow::new("L42", "https://lux.example/data/x");
        assert_eq!(
            bad_id.claim_value(ValueFormat::FullUri),
            Err(RowRejection::InvalidItemId("L42".to_string()))
        );

        let empty = UploadRow::new("Q42", "   ");
        assert_eq!(empty.claim_value(ValueFormat::FullUri), Err(RowRejection::EmptyUri));

        let slash = UploadRow::new("Q42", "/person/1");
        let err = slash.claim_value(ValueFormat::DataPath).unwrap_err();
        assert_eq!(
            err.to_string(),
            "external uri '/person/1' cannot be written as data-path"
        );
    }

    #[test]
    fn test_value_format_parse() {
        assert_eq!("full-uri".parse::<ValueFormat>(), Ok(ValueFormat::FullUri));
        assert_eq!("DATA_PATH".parse::<ValueFormat>(), Ok(ValueFormat::DataPath));
        assert!("suffix".parse::<ValueFormat>().is_err());
    }

    #[test]
    fn test_value_format_serialize() {
        let json = serde_json::to_string(&ValueFormat::DataPath).unwrap();
        assert_eq!(json, r#""data-path""#);
    }
}
