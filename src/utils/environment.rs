use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Get the Claude directory path (~/.claude)
pub fn get_claude_dir() -> Result<PathBuf> {
    let home = env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".claude"))
}

/// Default root for session logs (~/.claude/projects)
///
/// Only the CLI falls back to this; library entry points always take an
/// explicit root.
pub fn default_log_root() -> Result<PathBuf> {
    Ok(get_claude_dir()?.join("projects"))
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    // Both cases live in one test so they never race on HOME.
    #[test]
    fn test_default_log_root_follows_home() {
        // Save original HOME value
        let original_home = env::var("HOME").ok();

        // SAFETY: Setting environment variables in tests is safe as long as:
        // 1. No other test in this crate mutates HOME
        // 2. We restore the original value afterwards
        unsafe {
            env::set_var("HOME", "/Users/testuser");
        }
        assert_eq!(get_claude_dir().unwrap(), PathBuf::from("/Users/testuser/.claude"));
        assert_eq!(default_log_root().unwrap(), PathBuf::from("/Users/testuser/.claude/projects"));

        unsafe {
            env::remove_var("HOME");
        }
        let err = default_log_root().unwrap_err();
        assert!(err.to_string().contains("HOME environment variable not set"));

        // Restore original HOME
        if let Some(home) = original_home {
            unsafe {
                env::set_var("HOME", home);
            }
        }
    }
}
