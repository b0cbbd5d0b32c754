//! Naming helpers for computing replacement facts
//!
//! Project renames derive several spellings from one name: the distribution name
//! (`My-Project`), the package name (`my_project`), the dotted title of each module and
//! the repository URL in every form a project file may carry it.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// `My-Project` → `my_project`
pub fn format_package_name(name: &str) -> String {
    name.to_lowercase().replace('-', "_")
}

/// `my-project` → `My-Project`
pub fn format_project_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Dotted module name of a Python file: `pkg/sub/mod.py` → `pkg.sub.mod`.
///
/// An `__init__.py` is titled after its package.
pub fn format_py_script_title(path: &str) -> String {
    let mut parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
    match parts.pop() {
        Some("__init__.py") | None => {}
        Some(file) => parts.push(file.split('.').next().unwrap_or(file)),
    }
    parts.join(".")
}

/// The spellings of a repository URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlFormat {
    /// `https://github.com/owner/repo`
    Https,
    /// `git+https://github.com/owner/repo.git`
    GitHttps,
    /// `git@github.com:owner/repo.git`
    Git,
    /// `ssh://git@github.com/owner/repo.git`
    Ssh,
}

impl UrlFormat {
    pub const ALL: [UrlFormat; 4] = [
        UrlFormat::Https,
        UrlFormat::GitHttps,
        UrlFormat::Git,
        UrlFormat::Ssh,
    ];
}

/// A hosted repository, independent of the URL spelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    pub host: String,
    /// `owner/repo`, without `.git`
    pub path: String,
}

static HTTPS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:git\+)?https?://(?:[^@/]+@)?(?P<host>[^/]+)/(?P<path>.+?)(?:\.git)?/?$")
        .expect("valid regex")
});

static SSH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ssh://(?:[^@/]+@)?(?P<host>[^/:]+)(?::\d+)?/(?P<path>.+?)(?:\.git)?/?$")
        .expect("valid regex")
});

static SCP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@/]+@(?P<host>[^:/]+):(?P<path>.+?)(?:\.git)?/?$").expect("valid regex")
});

impl GitUrl {
    /// Parse any of the [`UrlFormat`] spellings
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        [&*HTTPS_URL, &*SSH_URL, &*SCP_URL]
            .into_iter()
            .find_map(|pattern| pattern.captures(url))
            .map(|caps| GitUrl {
                host: caps["host"].to_string(),
                path: caps["path"].trim_start_matches('/').to_string(),
            })
            .filter(|url| !url.path.is_empty())
            .ok_or_else(|| Error::Url(url.to_string()))
    }

    pub fn render(&self, format: UrlFormat) -> String {
        match format {
            UrlFormat::Https => format!("https://{}/{}", self.host, self.path),
            UrlFormat::GitHttps => format!("git+https://{}/{}.git", self.host, self.path),
            UrlFormat::Git => format!("git@{}:{}.git", self.host, self.path),
            UrlFormat::Ssh => format!("ssh://git@{}/{}.git", self.host, self.path),
        }
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(UrlFormat::Https))
    }
}
