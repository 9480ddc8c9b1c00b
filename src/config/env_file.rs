// ABOUTME: Reading and updating KEY=VALUE environment files under env/.
// ABOUTME: Values are read from files only; the process environment is never consulted.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parse `KEY=VALUE` lines. Blank lines, comments and lines without `=` are skipped.
pub fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .collect()
}

/// Key in env/stack.env holding the certificate registration contact.
pub const CONTACT_KEY: &str = "LETSENCRYPT_EMAIL";

/// Registration contact from parsed env values. A blank value counts as unset.
pub fn contact_email(values: &HashMap<String, String>) -> Option<String> {
    values
        .get(CONTACT_KEY)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Load an env file. A missing file reads as empty.
pub fn load_env(path: &Path) -> Result<HashMap<String, String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_env(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(source) => Err(Error::ReadFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Set `key` to `value`, replacing an existing assignment in place or appending one.
///
/// Other lines, including comments, are preserved.
pub fn set_env_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(Error::ReadFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let prefix = format!("{}=", key);
    let mut replaced = false;
    let mut lines: Vec<String> = existing
        .lines()
        .map(|line| {
            if line.starts_with(&prefix) {
                replaced = true;
                format!("{}={}", key, value)
            } else {
                line.to_string()
            }
        })
        .collect();

    if !replaced {
        lines.push(format!("{}={}", key, value));
    }

    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content).map_err(|source| Error::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
