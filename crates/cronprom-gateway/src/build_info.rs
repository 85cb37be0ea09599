//! Build metadata stamped into the binary at compile time.
//!
//! `CRONPROM_COMMIT` and `CRONPROM_BUILD_DATE` are read from the build
//! environment; local builds fall back to `HEAD` / `now`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub date: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("CRONPROM_COMMIT").unwrap_or("HEAD").to_string(),
            date: option_env!("CRONPROM_BUILD_DATE").unwrap_or("now").to_string(),
        }
    }

    /// `version (abcdef0) date`, commit shortened to 7 chars.
    pub fn version_string(&self) -> String {
        let short: String = self.commit.chars().take(7).collect();
        format!("{} ({}) {}", self.version, short, self.date)
    }
}
