//! Persistent line history: loaded at startup, appended on every submission.

use std::path::Path;

use rustyline::history::History;

/// Load `path` into `history` if the file exists.
pub fn load<H: History>(history: &mut H, path: &Path) -> rustyline::Result<()> {
    if path.exists() {
        history.load(path)?;
    }
    Ok(())
}

/// Add `entry` to the in-memory history and append it to `path` right away,
/// so entries survive a crash and accumulate across sessions.
pub fn record_entry<H: History>(history: &mut H, path: &Path, entry: &str) -> rustyline::Result<()> {
    history.add(entry)?;
    if path.exists() {
        history.append(path)
    } else {
        history.save(path)
    }
}
