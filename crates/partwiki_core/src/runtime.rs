use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::WikiConfig;
use crate::filesystem::{display_path, normalize_pathbuf, validate_scoped_path};

pub const CONFIG_FILENAME: &str = ".partwiki.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Flag,
    Env,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "flag",
            Self::Env => "env",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ResolutionContext {
    pub cwd: PathBuf,
}

impl ResolutionContext {
    pub fn from_process() -> Result<Self> {
        let cwd = env::current_dir().context("failed to read current directory")?;
        Ok(Self { cwd })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub root_source: ValueSource,
    pub config_source: ValueSource,
}

impl ResolvedPaths {
    pub fn header_path(&self, config: &WikiConfig) -> PathBuf {
        self.root.join(&config.store.header)
    }

    pub fn footer_path(&self, config: &WikiConfig) -> PathBuf {
        self.root.join(&config.store.footer)
    }

    pub fn diagnostics(&self) -> String {
        format!(
            "root={} ({})\nconfig_path={} ({})",
            display_path(&self.root),
            self.root_source.as_str(),
            display_path(&self.config_path),
            self.config_source.as_str(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeStatus {
    pub root_exists: bool,
    pub config_exists: bool,
    pub header_exists: bool,
    pub footer_exists: bool,
    pub warnings: Vec<String>,
}

pub fn inspect_runtime(paths: &ResolvedPaths, config: &WikiConfig) -> RuntimeStatus {
    let root_exists = paths.root.is_dir();
    let config_exists = paths.config_path.exists();
    let header_exists = paths.header_path(config).is_file();
    let footer_exists = paths.footer_path(config).is_file();

    let mut warnings = Vec::new();
    if !root_exists {
        warnings.push("page root is missing; it will be created on the first write".to_string());
    }
    if !header_exists {
        warnings.push(format!(
            "{} is missing; pages are served without a header",
            config.store.header
        ));
    }
    if !footer_exists {
        warnings.push(format!(
            "{} is missing; pages are served without a footer",
            config.store.footer
        ));
    }
    for segment in [&config.store.header, &config.store.footer] {
        if let Err(err) = validate_scoped_path(&paths.root, Path::new(segment)) {
            warnings.push(format!("{segment} lies outside the page root: {err}"));
        }
    }

    RuntimeStatus {
        root_exists,
        config_exists,
        header_exists,
        footer_exists,
        warnings,
    }
}

pub fn resolve_paths(
    context: &ResolutionContext,
    overrides: &PathOverrides,
) -> Result<ResolvedPaths> {
    resolve_paths_with_lookup(context, overrides, |key| env::var(key).ok())
}

fn resolve_paths_with_lookup<F>(
    context: &ResolutionContext,
    overrides: &PathOverrides,
    lookup_env: F,
) -> Result<ResolvedPaths>
where
    F: Fn(&str) -> Option<String>,
{
    let (root, root_source) = if let Some(path) = overrides.root.as_deref() {
        (absolutize(path, &context.cwd), ValueSource::Flag)
    } else if let Some(value) = non_empty(lookup_env("PARTWIKI_ROOT")) {
        (
            absolutize(Path::new(value.trim()), &context.cwd),
            ValueSource::Env,
        )
    } else {
        (context.cwd.clone(), ValueSource::Default)
    };
    let root = normalize_pathbuf(&root);

    let (config_path, config_source) = if let Some(path) = overrides.config.as_deref() {
        (absolutize(path, &context.cwd), ValueSource::Flag)
    } else if let Some(value) = non_empty(lookup_env("PARTWIKI_CONFIG")) {
        (
            absolutize(Path::new(value.trim()), &root),
            ValueSource::Env,
        )
    } else {
        (root.join(CONFIG_FILENAME), ValueSource::Default)
    };

    Ok(ResolvedPaths {
        root,
        config_path,
        root_source,
        config_source,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
