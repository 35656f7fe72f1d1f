use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::locale::Locale;
use crate::errors::ErrorCode;

/// Language the built-in messages are written in
pub const BUILTIN_LOCALE: &str = "en";

const BUILTIN_MESSAGES: &[(&str, &str)] = &[
    (ErrorCode::CONCURRENCY_FAILURE, "The resource was modified concurrently, please retry"),
    (ErrorCode::NO_CONTENT, "No content"),
    (ErrorCode::VALIDATION, "Request validation failed"),
    (ErrorCode::BUSINESS, "The request violates a business rule"),
    (ErrorCode::NOT_FOUND, "Entity not found"),
    (ErrorCode::ACCESS_DENIED, "Access denied"),
    (ErrorCode::METHOD_NOT_SUPPORTED, "Request method not supported"),
    (ErrorCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    ("error.400", "Bad request"),
    ("error.401", "Unauthorized"),
    ("error.403", "Forbidden"),
    ("error.404", "Not found"),
    ("error.405", "Method not allowed"),
    ("error.409", "Conflict"),
    ("error.410", "Gone"),
    ("error.413", "Payload too large"),
    ("error.415", "Unsupported media type"),
    ("error.418", "I'm a teapot"),
    ("error.422", "Unprocessable entity"),
    ("error.429", "Too many requests"),
    ("error.500", "Internal server error"),
    ("error.501", "Not implemented"),
    ("error.502", "Bad gateway"),
    ("error.503", "Service unavailable"),
    ("error.504", "Gateway timeout"),
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no message for code '{code}' in locale '{locale}'")]
    MissingMessage { code: String, locale: Locale },

    #[error("failed to read message file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid message file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid locale in message file: {0}")]
    InvalidLocale(#[from] super::locale::InvalidLocale),
}

/// Resolves error codes to human-readable text
pub trait MessageCatalog: Send + Sync {
    fn lookup(&self, code: &str, locale: &Locale) -> Result<String, CatalogError>;
}

/// Message file layout: `{ "<locale>": { "<code>": "<text>" } }`
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct MessageFile(HashMap<String, HashMap<String, String>>);

/// In-memory per-locale message tables
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    default_locale: Locale,
    messages: HashMap<Locale, HashMap<String, String>>,
}

impl InMemoryCatalog {
    /// Empty catalog
    pub fn new(default_locale: Locale) -> Self {
        Self {
            default_locale,
            messages: HashMap::new(),
        }
    }

    /// Catalog pre-populated with the built-in English messages
    pub fn with_defaults(default_locale: Locale) -> Self {
        let mut catalog = Self::new(default_locale);
        let builtin = Locale::from_static(BUILTIN_LOCALE);
        for (code, text) in BUILTIN_MESSAGES {
            catalog.insert(builtin.clone(), *code, *text);
        }
        catalog
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    pub fn insert(&mut self, locale: Locale, code: impl Into<String>, text: impl Into<String>) {
        self.messages
            .entry(locale)
            .or_default()
            .insert(code.into(), text.into());
    }

    /// Merge messages from JSON text over the current tables
    pub fn merge_json(&mut self, json: &str) -> Result<usize, CatalogError> {
        let file: MessageFile = serde_json::from_str(json)?;
        let mut merged = 0;
        for (tag, entries) in file.0 {
            let locale: Locale = tag.parse()?;
            merged += entries.len();
            for (code, text) in entries {
                self.insert(locale.clone(), code, text);
            }
        }
        Ok(merged)
    }

    /// Merge messages from a JSON file over the current tables
    pub fn load_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let merged = self.merge_json(&json)?;
        info!("Loaded {} messages from {}", merged, path.display());
        Ok(merged)
    }

    fn find(&self, code: &str, locale: &Locale) -> Option<&String> {
        self.messages.get(locale).and_then(|table| table.get(code))
    }
}

impl MessageCatalog for InMemoryCatalog {
    fn lookup(&self, code: &str, locale: &Locale) -> Result<String, CatalogError> {
        let candidates = locale
            .fallback_chain()
            .into_iter()
            .chain(self.default_locale.fallback_chain())
            .chain(std::iter::once(Locale::from_static(BUILTIN_LOCALE)));

        for candidate in candidates {
            if let Some(text) = self.find(code, &candidate) {
                if &candidate != locale {
                    debug!(code, requested = %locale, resolved = %candidate, "Message resolved via fallback locale");
                }
                return Ok(text.clone());
            }
        }

        Err(CatalogError::MissingMessage {
            code: code.to_string(),
            locale: locale.clone(),
        })
    }
}
