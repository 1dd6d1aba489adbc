//! Line-oriented env file handling.
//!
//! Only lines beginning with `KEY=` for a recognized key are ever rewritten.
//! Everything else, including comments, blank lines and line terminators, is
//! carried through byte for byte.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Result of rewriting env file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    /// Keys whose lines were replaced, in first-occurrence order.
    pub updated: Vec<String>,
}

/// Split content into `(body, terminator)` pairs. The terminator is `"\n"`,
/// `"\r\n"`, or empty for a final line without one.
pub fn lines(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content.split_inclusive('\n').map(|line| {
        if let Some(body) = line.strip_suffix("\r\n") {
            (body, "\r\n")
        } else if let Some(body) = line.strip_suffix('\n') {
            (body, "\n")
        } else {
            (line, "")
        }
    })
}

/// Whether the line assigns `key` (`KEY=...`, no surrounding whitespace).
pub fn assigns(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.starts_with('='))
}

/// Whether a value can be written verbatim between double quotes on a
/// single line.
pub fn fits_quoted(value: &str) -> bool {
    !value.contains(['"', '\r', '\n'])
}

/// Format an assignment with the value written verbatim in double quotes.
/// Callers check [`fits_quoted`] first.
pub fn assignment(key: &str, value: &str) -> String {
    format!("{}=\"{}\"", key, value)
}

/// Replace every line assigning one of `values`' keys with its new value.
pub fn rewrite<K, V>(content: &str, values: &[(K, V)]) -> Rewrite
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut out = String::with_capacity(content.len());
    let mut updated: Vec<String> = Vec::new();

    for (body, terminator) in lines(content) {
        let hit = values
            .iter()
            .find(|(key, _)| assigns(body, key.as_ref()));
        match hit {
            Some((key, value)) => {
                out.push_str(&assignment(key.as_ref(), value.as_ref()));
                if !updated.iter().any(|k| k == key.as_ref()) {
                    updated.push(key.as_ref().to_string());
                }
            }
            None => out.push_str(body),
        }
        out.push_str(terminator);
    }

    Rewrite {
        content: out,
        updated,
    }
}

/// Whether any line assigns `key`.
pub fn has_key(content: &str, key: &str) -> bool {
    lines(content).any(|(body, _)| assigns(body, key))
}

/// Whether every line assigning `key` already holds exactly `value`.
pub fn is_current(content: &str, key: &str, value: &str) -> bool {
    let wanted = assignment(key, value);
    let mut seen = false;
    for (body, _) in lines(content) {
        if assigns(body, key) {
            if body != wanted {
                return false;
            }
            seen = true;
        }
    }
    seen
}

/// Read the env file. Non-UTF-8 content is an `InvalidData` error.
pub fn read(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

/// Replace the file's content via a temp file next to the real file,
/// keeping the original permissions. A symlinked path is written through,
/// leaving the link in place.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".envsync-")
        .tempfile_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;

    if let Ok(meta) = fs::metadata(&target) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }

    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lines_keep_terminators() {
        let parsed: Vec<_> = lines("A=1\r\nB=2\nC=3").collect();
        assert_eq!(parsed, vec![("A=1", "\r\n"), ("B=2", "\n"), ("C=3", "")]);
    }

    #[test]
    fn test_assigns_requires_exact_key() {
        assert!(assigns("OPENAI_API_KEY=old", "OPENAI_API_KEY"));
        assert!(assigns("OPENAI_API_KEY=", "OPENAI_API_KEY"));
        assert!(!assigns("OPENAI_API_KEY_OLD=x", "OPENAI_API_KEY"));
        assert!(!assigns("# OPENAI_API_KEY=x", "OPENAI_API_KEY"));
        assert!(!assigns(" OPENAI_API_KEY=x", "OPENAI_API_KEY"));
        assert!(!assigns("OPENAI_API_KEY", "OPENAI_API_KEY"));
    }

    #[test]
    fn test_assignment_is_verbatim() {
        assert_eq!(assignment("K", "sk-new"), r#"K="sk-new""#);
        assert_eq!(assignment("K", r"sk-a\b"), r#"K="sk-a\b""#);
        assert_eq!(assignment("K", "a'b$c"), r#"K="a'b$c""#);
    }

    #[test]
    fn test_fits_quoted() {
        assert!(fits_quoted(r"sk-a\b"));
        assert!(fits_quoted("with spaces and 'single' quotes"));
        assert!(!fits_quoted(r#"a"b"#));
        assert!(!fits_quoted("a\nb"));
        assert!(!fits_quoted("a\rb"));
    }

    #[test]
    fn test_rewrite_replaces_only_recognized_lines() {
        let content = "# api keys\nOPENAI_API_KEY=old\n\nFOO=bar\nANTHROPIC_API_KEY=keep\n";
        let result = rewrite(content, &[("OPENAI_API_KEY", "sk-new")]);
        assert_eq!(
            result.content,
            "# api keys\nOPENAI_API_KEY=\"sk-new\"\n\nFOO=bar\nANTHROPIC_API_KEY=keep\n"
        );
        assert_eq!(result.updated, vec!["OPENAI_API_KEY"]);
    }

    #[test]
    fn test_rewrite_duplicates_and_crlf() {
        let content = "K=1\r\nK=2\r\nX=3";
        let result = rewrite(content, &[("K", "v")]);
        assert_eq!(result.content, "K=\"v\"\r\nK=\"v\"\r\nX=3");
        assert_eq!(result.updated, vec!["K"]);
    }

    #[test]
    fn test_rewrite_without_matches_is_identity() {
        let content = "FOO=bar\nBAZ=\"qux\"\n";
        let result = rewrite(content, &[("OPENAI_API_KEY", "sk-new")]);
        assert_eq!(result.content, content);
        assert!(result.updated.is_empty());
    }

    #[test]
    fn test_is_current() {
        let content = "K=\"v\"\nX=1\n";
        assert!(is_current(content, "K", "v"));
        assert!(!is_current(content, "K", "w"));
        assert!(!is_current(content, "MISSING", "v"));
        assert!(!is_current("K=v\n", "K", "v"));
        assert!(is_current("K=\"a\\b\"\n", "K", r"a\b"));
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "OLD=1\n").unwrap();
        write_atomic(&path, b"NEW=2\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "NEW=2\n");
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "OLD=1\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        write_atomic(&path, b"NEW=2\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
