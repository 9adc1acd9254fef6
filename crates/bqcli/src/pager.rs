use std::env;
use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

use tracing::debug;

/// Rows kept free below paged output for the prompt.
const PROMPT_MARGIN: usize = 3;

/// Shows long output through `$PAGER` and echoes everything to a writer.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    enabled: bool,
}

impl Pager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Never pages; output only goes to the writer.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Page `text` if it is taller than the terminal, then write it to `out`
    /// regardless.
    pub fn display(&self, text: &str, out: &mut dyn Write) -> io::Result<()> {
        if self.should_page(text) {
            if let Err(e) = spawn_pager(text) {
                debug!(error = %e, "pager unavailable");
            }
        }
        writeln!(out, "{}", text)
    }

    fn should_page(&self, text: &str) -> bool {
        if !self.enabled || !io::stdout().is_terminal() {
            return false;
        }
        let height = terminal_size::terminal_size()
            .map(|(_, h)| h.0 as usize)
            .unwrap_or(24);
        exceeds_screen(text, height)
    }
}

fn exceeds_screen(text: &str, height: usize) -> bool {
    text.lines().count() > height.saturating_sub(PROMPT_MARGIN)
}

fn spawn_pager(text: &str) -> io::Result<()> {
    let pager = env::var("PAGER").unwrap_or_else(|_| "less -R".to_string());
    let mut parts = pager.split_whitespace();
    let program = parts.next().unwrap_or("less");

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .spawn()?;
    let written = match child.stdin.take() {
        Some(stdin) => feed(stdin, text),
        None => Ok(()),
    };
    // Reap the pager before reporting a failed write so it never outlives
    // the call and fights the line editor for the terminal.
    child.wait()?;
    written
}

/// Write `text` to the pager's stdin and close it. The user may quit the
/// pager before reading everything.
fn feed(mut stdin: impl Write, text: &str) -> io::Result<()> {
    match stdin.write_all(text.as_bytes()) {
        Err(e) if e.kind() != io::ErrorKind::BrokenPipe => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceeds_screen() {
        let text = (0..30).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        assert!(exceeds_screen(&text, 24));
        assert!(!exceeds_screen(&text, 40));
        assert!(!exceeds_screen("one line", 24));
    }

    struct FailingWriter(io::ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_feed_ignores_closed_pager() {
        assert!(feed(FailingWriter(io::ErrorKind::BrokenPipe), "rows").is_ok());
        let err = feed(FailingWriter(io::ErrorKind::PermissionDenied), "rows").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[cfg(unix)]
    #[test]
    fn test_pager_is_reaped() {
        std::env::set_var("PAGER", "true");
        // `true` exits without reading; the write may hit a closed pipe.
        assert!(spawn_pager(&"row\n".repeat(10_000)).is_ok());
    }

    #[test]
    fn test_disabled_pager_only_echoes() {
        let pager = Pager::disabled();
        assert!(!pager.enabled());

        let mut out = Vec::new();
        pager.display("+---+\n| a |\n+---+", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "+---+\n| a |\n+---+\n");
    }
}
