//! Version information with embedded git metadata.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit SHA (short) at build time, or "unknown" if unavailable.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

/// Whether the working tree was dirty at build time.
pub fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

/// Long version string for `norn --version`: `{version} ({sha})` or `{version} ({sha}, dirty)`.
pub fn version_string() -> String {
    let sha = &GIT_SHA[..7.min(GIT_SHA.len())];
    if git_dirty() {
        format!("{PKG_VERSION} ({sha}, dirty)")
    } else {
        format!("{PKG_VERSION} ({sha})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_package_version() {
        assert!(version_string().starts_with(PKG_VERSION));
    }
}
