//! Validated run configuration.
//!
//! A [`Request`] holds what the user typed; [`Config::resolve`] checks it and
//! derives everything the pipeline needs (archive URL, scope prefix, output
//! destination, filter).

use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use repotree_archive::FilterSpec;

const GITHUB_ARCHIVE: &str = "https://github.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid [user/repo] input, received {0:?}")]
    InvalidSlug(String),

    #[error("invalid branch, received {0:?}")]
    InvalidBranch(String),

    #[error("invalid output, cannot contain extension, received {0:?}")]
    OutputHasExtension(String),

    #[error("output path does not exist, received {:?}", path.display().to_string())]
    OutputMissing { path: PathBuf },

    #[error("output path is not a directory, received {:?}", path.display().to_string())]
    OutputNotDirectory { path: PathBuf },

    #[error("output path cannot be accessed, received {:?}: {source}", path.display().to_string())]
    OutputAccess { path: PathBuf, source: io::Error },

    #[error("failed to get user home directory")]
    HomeDirectory,
}

/// Raw user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub slug: String,
    pub branch: String,
    pub dir: Option<String>,
    pub output: Option<String>,
    pub stdout: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            slug: String::new(),
            branch: "main".to_string(),
            dir: None,
            output: None,
            stdout: false,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Write `<repo><timestamp>.json` into this directory.
    File(PathBuf),
    /// Hand the tree back to the caller for printing.
    Stdout,
}

impl OutputMode {
    pub fn is_stdout(&self) -> bool {
        matches!(self, OutputMode::Stdout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Repository name, used for the report file name.
    pub repo: String,
    /// Tarball location.
    pub url: String,
    /// Archive path prefix to extract; empty keeps every entry.
    pub scope: String,
    pub output: OutputMode,
    pub filter: FilterSpec,
}

impl Config {
    pub fn resolve(request: Request) -> Result<Self, ConfigError> {
        let (user, repo) = validate_slug(&request.slug)?;
        validate_branch(&request.branch)?;

        let url = archive_url(user, repo, &request.branch);
        let scope = scope_prefix(repo, &request.branch, request.dir.as_deref());

        let output = if request.stdout {
            OutputMode::Stdout
        } else {
            let raw = request.output.unwrap_or_default();
            let resolved = resolve_output(&raw)?;
            validate_output(&raw, &resolved)?;
            OutputMode::File(resolved)
        };

        Ok(Self {
            repo: repo.to_string(),
            url,
            scope,
            output,
            filter: FilterSpec::new(request.include, request.exclude),
        })
    }
}

fn validate_slug(slug: &str) -> Result<(&str, &str), ConfigError> {
    let parts: Vec<&str> = slug.split('/').collect();
    match parts.as_slice() {
        [user, repo] if !user.is_empty() && !repo.is_empty() => Ok((*user, *repo)),
        _ => Err(ConfigError::InvalidSlug(slug.to_string())),
    }
}

fn validate_branch(branch: &str) -> Result<(), ConfigError> {
    if branch.is_empty() {
        return Err(ConfigError::InvalidBranch(branch.to_string()));
    }
    Ok(())
}

fn archive_url(user: &str, repo: &str, branch: &str) -> String {
    format!("{GITHUB_ARCHIVE}/{user}/{repo}/archive/refs/heads/{branch}.tar.gz")
}

/// GitHub names the tarball root `<repo>-<branch>` with slashes in the
/// branch replaced by dashes.
fn scope_prefix(repo: &str, branch: &str, dir: Option<&str>) -> String {
    let mut scope = format!("{repo}-{}", branch.replace('/', "-"));
    if let Some(dir) = dir.map(|d| d.trim_matches('/')).filter(|d| !d.is_empty()) {
        scope.push('/');
        scope.push_str(dir);
    }
    scope
}

static ENV_VAR: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))").ok()
});

/// Replace `$VAR` and `${VAR}`; unset variables expand to nothing.
fn expand_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let Some(re) = ENV_VAR.as_ref() else {
        return input.to_string();
    };
    re.replace_all(input, |caps: &Captures<'_>| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .and_then(|name| lookup(name.as_str()))
            .unwrap_or_default()
    })
    .into_owned()
}

fn resolve_output(output: &str) -> Result<PathBuf, ConfigError> {
    resolve_output_with(output, |name| std::env::var(name).ok(), home::home_dir)
}

fn resolve_output_with(
    output: &str,
    lookup: impl Fn(&str) -> Option<String>,
    home: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if output.is_empty() {
        return Ok(PathBuf::from("."));
    }

    let expanded = expand_env_with(output, lookup);
    match expanded.strip_prefix("~/") {
        Some(rest) => Ok(home().ok_or(ConfigError::HomeDirectory)?.join(rest)),
        None if expanded == "~" => home().ok_or(ConfigError::HomeDirectory),
        None => Ok(PathBuf::from(expanded)),
    }
}

fn validate_output(raw: &str, resolved: &Path) -> Result<(), ConfigError> {
    if resolved.extension().is_some() {
        return Err(ConfigError::OutputHasExtension(raw.to_string()));
    }

    match std::fs::metadata(resolved) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ConfigError::OutputNotDirectory {
            path: resolved.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ConfigError::OutputMissing {
            path: resolved.to_path_buf(),
        }),
        Err(source) => Err(ConfigError::OutputAccess {
            path: resolved.to_path_buf(),
            source,
        }),
    }
}
