use std::path::PathBuf;

/// Points the registry at a different `standards/` checkout.
pub const STANDARDS_ENV_VAR: &str = "CARDIO_STANDARDS_DIR";

/// `$CARDIO_STANDARDS_DIR` when set and non-empty, otherwise the
/// `standards/` directory at the workspace root.
pub fn standards_root() -> PathBuf {
    std::env::var_os(STANDARDS_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            [env!("CARGO_MANIFEST_DIR"), "..", "..", "standards"]
                .iter()
                .collect()
        })
}
