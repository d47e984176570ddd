//! Error types for the invoice engine.
//!
//! Rendering itself cannot fail: wrapping always makes progress and a fresh
//! page always offers the full usable height. The failures that reach a
//! caller are I/O (writing files), malformed settings JSON, and date
//! parsing on input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Date string could not be parsed as M/D, M/D/YY, or M/D/YYYY.
    #[error("invalid date {0:?}: use M/D, M/D/YY, or M/D/YYYY")]
    BadDate(String),

    /// Settings value exists but cannot take the requested shape,
    /// e.g. setting `a.b.c` when `a.b` holds a number.
    #[error("cannot set {path}: {key} is not an object")]
    SettingsPath { path: String, key: String },

    /// Settings file could not be serialized or deserialized.
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
