//! CLI subcommands.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;

/// Database URL from `RESMAN_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// Loads `.env` first if present.
pub(crate) fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("RESMAN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.trim().is_empty())
        .map(SecretString::from)
}
