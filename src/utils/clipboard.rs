use std::error::Error;
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// None of the platform clipboard tools could be started.
    NoTool(String),
    /// The tool started but exited unsuccessfully.
    CommandFailed(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::NoTool(hint) => write!(f, "No clipboard command found ({})", hint),
            ClipboardError::CommandFailed(cmd) => write!(f, "Clipboard command `{}` failed", cmd),
        }
    }
}

impl Error for ClipboardError {}

/// Writes `text` to the system clipboard through the platform's CLI tool.
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    #[cfg(target_os = "macos")]
    {
        run_with_stdin("pbcopy", &[], text)
    }
    #[cfg(target_os = "windows")]
    {
        run_with_stdin("cmd", &["/C", "clip"], text)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let candidates: [(&str, &[&str]); 3] = [
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
        ];
        let mut last_failure = None;
        for (cmd, args) in candidates {
            match run_with_stdin(cmd, args, text) {
                Ok(()) => return Ok(()),
                Err(err @ ClipboardError::CommandFailed(_)) => last_failure = Some(err),
                Err(ClipboardError::NoTool(_)) => {}
            }
        }
        Err(last_failure.unwrap_or_else(|| {
            ClipboardError::NoTool("install wl-copy, xclip, or xsel".to_string())
        }))
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), ClipboardError> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| ClipboardError::NoTool(format!("`{}` not available", cmd)))?;

    // Stdin is dropped before waiting so the tool sees EOF.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input.as_bytes()).is_ok(),
        None => false,
    };
    if !written {
        let _ = child.kill();
    }

    match child.wait() {
        Ok(status) if written && status.success() => Ok(()),
        _ => Err(ClipboardError::CommandFailed(cmd.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_is_reported_as_no_tool() {
        let result = run_with_stdin("chait-definitely-missing-clipboard-tool", &[], "text");
        assert!(matches!(result, Err(ClipboardError::NoTool(_))));
    }

    #[cfg(unix)]
    #[test]
    fn tool_that_exits_early_is_reaped_and_reported() {
        // `true` exits without reading stdin; a large write hits a closed pipe.
        let big = "x".repeat(1 << 20);
        let result = run_with_stdin("true", &[], &big);
        assert_eq!(result, Err(ClipboardError::CommandFailed("true".to_string())));
    }

    #[cfg(unix)]
    #[test]
    fn tool_that_reads_stdin_succeeds() {
        assert_eq!(run_with_stdin("cat", &[], "copied"), Ok(()));
    }

    #[test]
    fn errors_render_the_command() {
        assert_eq!(
            ClipboardError::CommandFailed("xclip".into()).to_string(),
            "Clipboard command `xclip` failed"
        );
    }
}
