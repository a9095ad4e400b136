use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory.
///
/// - `Some(path)`: `~` / `~/...` is expanded against the platform home, relative paths are
///   made absolute against the current working directory.
/// - `None`: `<platform home>/<default_subdir>`.
///
/// Platform home is `%APPDATA%` on Windows and `$HOME` elsewhere.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_home()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("{var} is not set; cannot resolve home directory"))
}
