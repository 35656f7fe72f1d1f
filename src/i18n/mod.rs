//! Locale handling and the message catalog used to render error messages

pub mod catalog;
pub mod locale;

pub use catalog::{CatalogError, InMemoryCatalog, MessageCatalog};
pub use locale::{InvalidLocale, Locale};
