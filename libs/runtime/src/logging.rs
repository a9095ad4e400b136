use crate::config::{LoggingConfig, Section};
use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt};

const DEFAULT_KEY: &str = "default";

/// Parse a level string. `off`/`none` and empty strings disable output,
/// unknown values fall back to `info`.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" | "" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Build a per-target filter: every non-default section is an explicit target,
/// the `default` section covers everything else.
fn build_targets(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> LevelFilter) -> Targets {
    let default = cfg.get(DEFAULT_KEY).map_or(LevelFilter::OFF, &level_of);
    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_KEY)
        .fold(Targets::new().with_default(default), |t, (name, section)| {
            t.with_target(name.clone(), level_of(section))
        })
}

// -------- rotating file writers --------

type SharedRotate = Arc<Mutex<FileRotate<AppendTimestamp>>>;

#[derive(Clone)]
struct FileHandle(Option<SharedRotate>);

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(rot) => rot
                .lock()
                .map_err(|_| std::io::Error::other("log file lock poisoned"))?
                .write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(rot) => rot
                .lock()
                .map_err(|_| std::io::Error::other("log file lock poisoned"))?
                .flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to a log file by target prefix, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    by_prefix: Vec<(String, SharedRotate)>,
}

impl FileRouter {
    fn build(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        // Sections pointing at the same file share one writer.
        let mut opened: HashMap<PathBuf, SharedRotate> = HashMap::new();
        let mut router = FileRouter::default();

        for (name, section) in cfg {
            if section.file.trim().is_empty() {
                continue;
            }
            let path = resolve_log_path(&section.file, base_dir);
            let writer = match opened.get(&path) {
                Some(w) => w.clone(),
                None => match open_rotating(&path, section) {
                    Ok(w) => {
                        opened.insert(path.clone(), w.clone());
                        w
                    }
                    Err(e) => {
                        eprintln!(
                            "Failed to open log file '{}' for '{name}': {e}",
                            path.display()
                        );
                        continue;
                    }
                },
            };
            if name == DEFAULT_KEY {
                router.default = Some(writer);
            } else {
                router.by_prefix.push((name.clone(), writer));
            }
        }

        // Longest prefix wins.
        router
            .by_prefix
            .sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        router
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }

    fn resolve(&self, target: &str) -> Option<SharedRotate> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_prefix(target, prefix))
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = FileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        FileHandle(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        FileHandle(self.resolve(meta.target()))
    }
}

/// Relative paths are joined with `base_dir` (the server home directory).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(path: &Path, section: &Section) -> std::io::Result<SharedRotate> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let max_bytes = section.max_size_mb.unwrap_or(100) as usize * 1024 * 1024;
    let files = FileLimit::MaxFiles(section.max_backups.unwrap_or(3));
    let rot = FileRotate::new(
        path,
        AppendTimestamp::default(files),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Arc::new(Mutex::new(rot)))
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - console output is human readable, colored when stdout is a terminal
/// - file output is JSON, routed per subsystem
///
/// `base_dir` resolves relative log file paths (usually `server.home_dir`).
/// Calling this more than once is harmless: later calls are ignored.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

    // Bridge `log` → `tracing` before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = fmt()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let console = fmt::layer()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(build_targets(cfg, |s| parse_level(&s.console_level)));

    let router = FileRouter::build(cfg, base_dir);
    let file = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .with_current_span(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(build_targets(cfg, |s| {
                if s.file.trim().is_empty() {
                    LevelFilter::OFF
                } else {
                    parse_level(&s.file_level)
                }
            }))
    });

    let _ = Registry::default().with(console).with(file).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(console: &str, file: &str, file_level: &str) -> Section {
        Section {
            console_level: console.into(),
            file: file.into(),
            file_level: file_level.into(),
            max_backups: None,
            max_size_mb: None,
        }
    }

    #[test]
    fn level_parsing_is_lenient() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level(""), LevelFilter::OFF);
        assert_eq!(parse_level("loud"), LevelFilter::INFO);
    }

    #[test]
    fn prefix_matching_respects_module_boundaries() {
        assert!(matches_prefix("profiles", "profiles"));
        assert!(matches_prefix("profiles::domain::service", "profiles"));
        assert!(!matches_prefix("profiles_extra", "profiles"));
        assert!(!matches_prefix("assistant", "profiles"));
    }

    #[test]
    fn router_picks_subsystem_file_then_default() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "logs/all.log", "debug"));
        cfg.insert("assistant".into(), section("info", "logs/ai.log", "debug"));
        cfg.insert("profiles".into(), section("info", "", "debug"));

        let router = FileRouter::build(&cfg, tmp.path());
        assert!(!router.is_empty());
        assert_eq!(router.by_prefix.len(), 1);

        let ai = router.resolve("assistant::domain").unwrap();
        let fallback = router.resolve("profiles::domain").unwrap();
        assert!(!Arc::ptr_eq(&ai, &fallback));
        assert!(Arc::ptr_eq(&fallback, router.default.as_ref().unwrap()));
        assert!(tmp.path().join("logs").exists());
    }

    #[test]
    fn sections_sharing_a_file_share_a_writer() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert("default".into(), section("info", "logs/all.log", "debug"));
        cfg.insert("assistant".into(), section("info", "logs/all.log", "debug"));

        let router = FileRouter::build(&cfg, tmp.path());
        let ai = router.resolve("assistant").unwrap();
        assert!(Arc::ptr_eq(&ai, router.default.as_ref().unwrap()));
    }

    #[test]
    fn absolute_log_paths_are_kept() {
        let base = Path::new("/srv/folio");
        assert_eq!(
            resolve_log_path("logs/a.log", base),
            PathBuf::from("/srv/folio/logs/a.log")
        );
        assert_eq!(
            resolve_log_path("/var/log/a.log", base),
            PathBuf::from("/var/log/a.log")
        );
    }
}
