/// Build-time git commit SHA stamped by build.rs when available.
pub fn git_sha() -> Option<&'static str> {
    option_env!("REINDEX_BUILD_GIT_SHA")
}

/// Version string used in the startup banner, e.g. `0.1.0 (a1b2c3d)`.
pub fn version_label() -> String {
    match git_sha() {
        Some(sha) => format!("{} ({sha})", env!("CARGO_PKG_VERSION")),
        None => env!("CARGO_PKG_VERSION").to_string(),
    }
}
