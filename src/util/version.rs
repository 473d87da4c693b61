pub const APP_NAME: &str = "Freight Quote";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Nearest git tag at build time, set by `build.rs`.
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

/// `v1.0.0`, or the release tag when the build recorded one.
pub fn version_label() -> String {
    GIT_TAG.map_or_else(|| format!("v{APP_VERSION}"), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names_a_version() {
        let label = version_label();
        assert!(label.starts_with('v') || GIT_TAG.is_some());
        assert!(!label.is_empty());
    }
}
