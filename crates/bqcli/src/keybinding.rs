//! Enter either submits the buffer or inserts a newline.

use rustyline::history::History;
use rustyline::{
    Cmd, ConditionalEventHandler, Editor, Event, EventContext, EventHandler, Helper, KeyCode,
    KeyEvent, Modifiers, RepeatCount,
};

/// Whether Enter should submit `buffer`: it is blank, ends with `;`, or is a
/// backslash meta-command.
pub fn should_submit(buffer: &str) -> bool {
    let text = buffer.trim();
    text.is_empty() || text.ends_with(';') || text.starts_with('\\')
}

pub struct SubmitHandler;

impl ConditionalEventHandler for SubmitHandler {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext,
    ) -> Option<Cmd> {
        if should_submit(ctx.line()) {
            // Runs the validator; an invalid buffer stays in the editor.
            Some(Cmd::AcceptOrInsertLine {
                accept_in_the_middle: true,
            })
        } else {
            Some(Cmd::Newline)
        }
    }
}

/// Bind Enter to [`SubmitHandler`].
pub fn bind_submit<H: Helper, I: History>(editor: &mut Editor<H, I>) {
    editor.bind_sequence(
        KeyEvent(KeyCode::Enter, Modifiers::NONE),
        EventHandler::Conditional(Box::new(SubmitHandler)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submits_terminated_statements() {
        assert!(should_submit("SELECT 1;"));
        assert!(should_submit("SELECT *\nFROM t\nWHERE x = 1;"));
        assert!(should_submit("  SELECT 1;  \n"));
    }

    #[test]
    fn test_submits_blank_and_meta() {
        assert!(should_submit(""));
        assert!(should_submit("   \n\t"));
        assert!(should_submit("\\d"));
        assert!(should_submit("  \\d sales.orders"));
    }

    #[test]
    fn test_inserts_newline_otherwise() {
        assert!(!should_submit("SELECT 1"));
        assert!(!should_submit("SELECT *\nFROM t"));
        assert!(!should_submit("SELECT ';' AS x"));
        assert!(!should_submit("-- \\d"));
    }
}
