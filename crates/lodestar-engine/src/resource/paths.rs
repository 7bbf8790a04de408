use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable overriding the resource root.
pub const RESOURCE_ROOT_ENV: &str = "LODESTAR_RESOURCE_ROOT";

static BASE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Returns the process-wide resource root.
///
/// Resolved on first use and cached: `LODESTAR_RESOURCE_ROOT` when set,
/// otherwise the directory containing the running executable, otherwise the
/// working directory.
pub fn base_path() -> &'static Path {
    BASE_PATH.get_or_init(|| {
        let resolved = resolve_base_path();
        log::debug!("resource base path: {}", resolved.display());
        resolved
    })
}

fn resolve_base_path() -> PathBuf {
    if let Some(root) = std::env::var_os(RESOURCE_ROOT_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(root);
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Joins a resource-relative path onto `base`.
///
/// Leading separators on `relative` are ignored so the result always stays
/// under `base`.
pub fn join_resource(base: &Path, relative: &str) -> PathBuf {
    base.join(relative.trim_start_matches(['/', '\\']))
}

/// Per-user preferences directory for an organisation/product pair.
///
/// Returns `None` when the platform has no home directory to anchor it.
pub fn prefs_path(org: &str, product: &str) -> Option<PathBuf> {
    directories::ProjectDirs::from("", org, product).map(|dirs| dirs.preference_dir().to_path_buf())
}
