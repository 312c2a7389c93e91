//! Utility helpers — path resolution, time formatting, string trimming.

use std::path::PathBuf;

/// Get the PicoClaw data directory (e.g. `~/.picoclaw/`).
pub fn get_data_path() -> PathBuf {
    home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".picoclaw")
}

/// Get the default workspace path (e.g. `~/.picoclaw/workspace/`).
pub fn get_default_workspace_path() -> PathBuf {
    get_data_path().join("workspace")
}

/// Local timestamp used for memory entries: `YYYY-MM-DD HH:MM:SS`.
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Keep the last `max_chars` characters of `s`, prefixing `"...\n"` when
/// anything was cut. Unicode-safe.
pub fn tail_chars(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - max_chars).collect();
        format!("...\n{tail}")
    }
}

/// Cut `s` to at most `max_chars` characters, appending a marker when cut.
pub fn truncate_output(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}\n... (output truncated)")
    }
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("."));
    }
    match path.strip_prefix("~/") {
        Some(rest) => home_dir().unwrap_or_else(|| PathBuf::from(".")).join(rest),
        None => PathBuf::from(path),
    }
}

fn home_dir() -> Option<PathBuf> {
    dirs_next::home_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_short_string_untouched() {
        assert_eq!(tail_chars("hello", 10), "hello");
        assert_eq!(tail_chars("hello", 5), "hello");
    }

    #[test]
    fn test_tail_keeps_end_with_marker() {
        assert_eq!(tail_chars("abcdefghij", 4), "...\nghij");
    }

    #[test]
    fn test_tail_unicode() {
        assert_eq!(tail_chars("こんにちは世界", 2), "...\n世界");
    }

    #[test]
    fn test_truncate_output() {
        assert_eq!(truncate_output("short", 10), "short");
        assert_eq!(truncate_output("abcdef", 3), "abc\n... (output truncated)");
    }

    #[test]
    fn test_expand_home_tilde() {
        let expanded = expand_home("~/test/path");
        assert!(!expanded.starts_with("~"));
        assert!(expanded.to_str().unwrap().ends_with("test/path"));
    }

    #[test]
    fn test_expand_home_absolute() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_local_timestamp_format() {
        let ts = local_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(ts.chars().nth(10), Some(' '));
        chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%d %H:%M:%S").unwrap();
    }

    #[test]
    fn test_data_path_ends_with_picoclaw() {
        assert!(get_data_path().ends_with(".picoclaw"));
        assert!(get_default_workspace_path().ends_with(".picoclaw/workspace"));
    }
}
