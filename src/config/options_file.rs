//! Reader for MySQL client option files (`--defaults-extra-file`).
//!
//! Format (subset understood here):
//! ```text
//! # comment
//! ; comment
//! [client]
//! user = monitor
//! password = "s3cret"
//! host=db1.internal
//! port=3307
//! socket=/var/run/mysqld/mysqld.sock
//! ```
//! Keys may use `-` or `_` interchangeably. `!include` directives are skipped.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ConnectionOverrides;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The options file could not be read.
    #[error("couldn't read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A recognized key carries a value of the wrong type.
    #[error("invalid {key} value {value:?} in {}", .path.display())]
    InvalidValue {
        path: PathBuf,
        key: String,
        value: String,
    },
}

/// Loads connection settings from an options file.
///
/// Reads the `[client]` group and, when `group_suffix` is given, the
/// `[client<suffix>]` group after it, so the suffixed group wins.
pub fn load_options_file(
    path: &Path,
    group_suffix: Option<&str>,
) -> Result<ConnectionOverrides, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut groups = vec!["client".to_string()];
    if let Some(suffix) = group_suffix.filter(|s| !s.is_empty()) {
        groups.push(format!("client{}", suffix));
    }

    let mut overrides = ConnectionOverrides::default();
    for (key, value) in parse_options(&content, &groups) {
        match key.as_str() {
            "user" => overrides.user = Some(value),
            "password" => overrides.password = Some(value),
            "host" => overrides.host = Some(value),
            "socket" => overrides.socket = Some(PathBuf::from(value)),
            "database" => overrides.database = Some(value),
            "port" => {
                let port = value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                    path: path.to_path_buf(),
                    key: key.clone(),
                    value: value.clone(),
                })?;
                overrides.port = Some(port);
            }
            _ => {}
        }
    }

    debug!(path = %path.display(), groups = ?groups, "options file loaded");
    Ok(overrides)
}

/// Extracts `key, value` pairs from the wanted groups, in file order.
///
/// Pairs are ordered by position in `groups` first, so settings from a later
/// group override earlier ones when applied in sequence. Bare keys without a
/// value are dropped.
fn parse_options(content: &str, groups: &[String]) -> Vec<(String, String)> {
    let mut per_group: Vec<Vec<(String, String)>> = vec![Vec::new(); groups.len()];
    let mut current: Option<usize> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if line.starts_with('!') {
            debug!(directive = line, "options file directive ignored");
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest.strip_suffix(']').unwrap_or(rest).trim();
            current = groups.iter().position(|g| g == name);
            continue;
        }

        let Some(group_idx) = current else {
            continue;
        };

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };

        let key = key.trim().replace('-', "_");
        per_group[group_idx].push((key, parse_value(value)));
    }

    per_group.into_iter().flatten().collect()
}

/// Unquotes a value or strips a trailing ` # comment` from an unquoted one.
fn parse_value(raw: &str) -> String {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|rest| rest.split_once(quote))
            .map(|(inner, _)| inner)
        {
            return inner.to_string();
        }
    }

    let unquoted = match raw.find(" #").or_else(|| raw.find("\t#")) {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    unquoted.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn groups(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_reads_only_wanted_groups() {
        let content = "\
[mysqld]
port=3310
[client]
user = monitor
port=3307
";
        let pairs = parse_options(content, &groups(&["client"]));
        assert_eq!(
            pairs,
            vec![
                ("user".to_string(), "monitor".to_string()),
                ("port".to_string(), "3307".to_string()),
            ]
        );
    }

    #[test]
    fn parse_skips_comments_and_directives() {
        let content = "\
# leading comment
; another comment
!includedir /etc/mysql/conf.d/
[client]
skip-ssl
password = 'p#ss word'
host = db1 # primary
";
        let pairs = parse_options(content, &groups(&["client"]));
        assert_eq!(
            pairs,
            vec![
                ("password".to_string(), "p#ss word".to_string()),
                ("host".to_string(), "db1".to_string()),
            ]
        );
    }

    #[test]
    fn parse_normalizes_dashes_in_keys() {
        let content = "[client]\ndefault-character-set=utf8mb4\n";
        let pairs = parse_options(content, &groups(&["client"]));
        assert_eq!(pairs[0].0, "default_character_set");
    }

    #[test]
    fn suffixed_group_comes_after_base_group() {
        let content = "\
[client_replica]
user=replica_monitor
[client]
user=monitor
";
        let pairs = parse_options(content, &groups(&["client", "client_replica"]));
        assert_eq!(pairs.last().unwrap().1, "replica_monitor");
    }

    #[test]
    fn load_options_file_builds_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[client]\nuser=monitor\npassword=\"secret\"\nport=3307\nsocket=/tmp/mysql.sock"
        )
        .unwrap();

        let overrides = load_options_file(file.path(), None).unwrap();
        assert_eq!(overrides.user.as_deref(), Some("monitor"));
        assert_eq!(overrides.password.as_deref(), Some("secret"));
        assert_eq!(overrides.port, Some(3307));
        assert_eq!(overrides.socket, Some(PathBuf::from("/tmp/mysql.sock")));
        assert_eq!(overrides.host, None);
    }

    #[test]
    fn load_options_file_applies_group_suffix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nuser=monitor\n[client_ro]\nuser=readonly").unwrap();

        let overrides = load_options_file(file.path(), Some("_ro")).unwrap();
        assert_eq!(overrides.user.as_deref(), Some("readonly"));
    }

    #[test]
    fn load_options_file_rejects_bad_port() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]\nport=mysql").unwrap();

        let err = load_options_file(file.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "port"));
    }

    #[test]
    fn load_options_file_missing_file() {
        let err = load_options_file(Path::new("/nonexistent/my.cnf"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().starts_with("couldn't read /nonexistent/my.cnf"));
    }
}
