//! Error types for remote calls, imports and form validation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status_code}): {message}")]
    Status {
        status_code: u16,
        message: String,
    },

    #[error("Failed to decode response from {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid API URL '{0}'")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Cannot read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Cannot read workbook: {0}")]
    Workbook(String),

    #[error("Workbook has no worksheet")]
    NoWorksheet,

    #[error("Unsupported file type '{0}', expected .csv, .xlsx, .xls or .ods")]
    UnsupportedFormat(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

/// Validation failures raised when a draft is submitted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Name is required")]
    MissingName,

    #[error("Email is required")]
    MissingEmail,

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("A custom VAT rate is required")]
    CustomVatRequired,

    #[error("Custom VAT rate '{0}' must be between 0 and 100 with at most one decimal")]
    InvalidCustomVat(String),

    #[error("{day}: '{value}' is not a valid time (HH:MM)")]
    InvalidTime { day: String, value: String },

    #[error("{0}: opening and closing times are required")]
    MissingHours(String),

    #[error("Country name and code are required")]
    IncompleteCountry,
}
