//! Path expansion applied before any filesystem operation.
//!
//! Every path-accepting operation in this crate first rewrites the path
//! string: a leading `~` becomes the invoking user's home directory, and
//! environment-variable references in both `$NAME` and `${NAME}` forms
//! are replaced with their values. References to unset variables are left
//! untouched. Expansion is pure string rewriting and never touches the
//! filesystem.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Matches `$NAME` and `${NAME}` environment-variable references.
/// Variable names are alphanumeric and underscore only.
static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z_][A-Za-z0-9_]*)\}|([A-Za-z_][A-Za-z0-9_]*))")
        .expect("environment reference pattern is valid")
});

/// Expand a leading `~` and environment-variable references in a path.
///
/// # Example
/// ```rust
/// use fileweave::expand_path;
/// use std::path::PathBuf;
///
/// std::env::set_var("FILEWEAVE_DOC_DIR", "/data");
/// assert_eq!(
///     expand_path("$FILEWEAVE_DOC_DIR/accounts.csv"),
///     PathBuf::from("/data/accounts.csv"),
/// );
/// std::env::remove_var("FILEWEAVE_DOC_DIR");
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(expand_str(path))
}

/// String form of [`expand_path`], for callers that need the rewritten
/// text rather than a path (glob patterns).
pub(crate) fn expand_str(path: &str) -> String {
    let tilded = expand_tilde(path);
    ENV_VAR
        .replace_all(&tilded, |caps: &regex::Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match std::env::var(name) {
                Ok(value) => {
                    trace!("expanded ${} to {}", name, value);
                    value
                }
                // Unset variables are left as written.
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Rewrite a leading `~` or `~/` to the home directory. `~user` forms
/// are not interpreted.
fn expand_tilde(path: &str) -> String {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home.to_string_lossy().into_owned();
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().into_owned();
        }
    }
    path.to_string()
}
