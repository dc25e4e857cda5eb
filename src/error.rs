//! Error types for the sodagrid pipeline
//!
//! This module defines custom error types used throughout the application.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,
}

/// Errors that can occur while interpreting time and date expressions
#[derive(Error, Debug)]
pub enum ParseError {
    /// A clock string that does not match "H:MM AM/PM"
    #[error("Invalid time expression: {0}")]
    InvalidTime(String),

    /// A day label carrying no parseable "Month Day" date
    #[error("Invalid date in day label: {0}")]
    InvalidDate(String),
}

/// Errors that can occur while rendering the schedule document
#[derive(Error, Debug)]
pub enum RenderError {
    /// A day label with no parseable date breaks the day ordering contract
    #[error("Day label has no parseable date: {0}")]
    DayLabel(String),

    /// Template registration error
    #[error("Invalid template: {0}")]
    Template(#[from] handlebars::TemplateError),

    /// Template rendering error
    #[error("Template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}
