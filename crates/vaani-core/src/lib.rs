pub mod config;
pub mod error;
pub mod languages;
pub mod types;

pub use config::VaaniConfig;
pub use error::{Result, VaaniError};
pub use languages::{language_info, provider_code, LanguageInfo, SUPPORTED_LANGUAGES};
pub use types::*;
