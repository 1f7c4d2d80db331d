use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};
use std::path::Path;

const DEFAULT_LOG_PATH: &str = "/tmp/promptline-debug.log";
const DEBUG_KEYS_ENV: &str = "PROMPTLINE_DEBUG_KEYS";
const LOG_PATH_ENV: &str = "PROMPTLINE_LOG_PATH";

pub fn key_trace_enabled() -> bool {
    std::env::var(DEBUG_KEYS_ENV)
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

pub fn emit_key_trace(key: &crate::dispatch::Key) {
    emit_log_message(&format!("PROMPTLINE DEBUG key={key:?}\n"));
}

pub fn emit_history_parse_error(path: &Path, parse_error: &serde_json::Error) {
    let message = format!(
        "PROMPTLINE ERROR history_parse_failed file={} error={parse_error}\n",
        path.display()
    );
    emit_log_message(&message);
}

pub fn emit_save_error(error: &anyhow::Error) {
    emit_log_message(&format!("PROMPTLINE ERROR history_save_failed error={error:#}\n"));
}

fn emit_log_message(message: &str) {
    if let Some(path) = resolve_log_path() {
        if append_log_file(&path, message).is_ok() {
            return;
        }
    }

    eprintln!("{message}");
}

// When stderr is the interactive terminal we are drawing on, diagnostics go
// to a file instead of corrupting the prompt line.
fn resolve_log_path() -> Option<String> {
    std::env::var(LOG_PATH_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            if std::io::stderr().is_terminal() {
                Some(DEFAULT_LOG_PATH.to_string())
            } else {
                None
            }
        })
}

fn append_log_file(path: &str, message: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(message.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_trace_enabled_accepts_true_variants() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::set_var(DEBUG_KEYS_ENV, "1");
        assert!(key_trace_enabled());
        std::env::set_var(DEBUG_KEYS_ENV, "TRUE");
        assert!(key_trace_enabled());
        std::env::set_var(DEBUG_KEYS_ENV, "0");
        assert!(!key_trace_enabled());
        std::env::remove_var(DEBUG_KEYS_ENV);
    }

    #[test]
    fn test_resolve_log_path_prefers_env_override() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::set_var(LOG_PATH_ENV, "/tmp/test-promptline.log");
        assert_eq!(
            resolve_log_path().as_deref(),
            Some("/tmp/test-promptline.log")
        );
        std::env::remove_var(LOG_PATH_ENV);
    }
}
