use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config as EditorConfig, EditMode, Editor};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::helper::SqlHelper;
use crate::history;
use crate::keybinding;
use crate::metacmd::{self, MetaError};
use crate::render::render_rows;
use crate::service::{QueryOptions, ServiceError};
use crate::session::Session;
use crate::validator::DryRunValidator;

const PROMPT: &str = "> ";
const MAX_HISTORY: usize = 10_000;

/// Failure of one submitted buffer. Reported, then the loop continues.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Query(#[from] ServiceError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Route a submitted buffer: blank buffers are ignored, backslash buffers
/// go to the meta-command dispatcher, everything else runs as a query.
pub fn handle_buffer(session: &Session, text: &str, out: &mut dyn Write) -> Result<(), CommandError> {
    if text.trim().is_empty() {
        return Ok(());
    }

    if text.trim_start().starts_with('\\') {
        metacmd::dispatch(session, text, out)?;
    } else {
        run_query(session, text, out)?;
    }
    Ok(())
}

fn run_query(session: &Session, sql: &str, out: &mut dyn Write) -> Result<(), CommandError> {
    let cap = session.row_cap();
    let rows = session
        .service()
        .query(sql, &QueryOptions::capped(cap))?;
    debug!(total_rows = rows.total_rows, "query finished");

    let output = render_rows(&rows, cap);
    if !output.is_empty() {
        session.pager().display(&output, out)?;
    }
    Ok(())
}

fn report(err: &CommandError) {
    match err {
        // clap renders its own `error:` prefix and usage.
        CommandError::Meta(MetaError::Usage(e)) => eprint!("{}", e),
        other => eprintln!("Error: {}", other),
    }
}

pub struct Repl {
    editor: Editor<SqlHelper, DefaultHistory>,
    session: Session,
    history_path: PathBuf,
}

impl Repl {
    pub fn new(session: Session, config: &Config, color: bool) -> Result<Self> {
        let editor_config = EditorConfig::builder()
            .max_history_size(MAX_HISTORY)?
            .history_ignore_dups(true)?
            .edit_mode(EditMode::Emacs)
            .auto_add_history(false)
            .build();

        let mut editor: Editor<SqlHelper, DefaultHistory> = Editor::with_config(editor_config)?;
        let validator = DryRunValidator::new(session.service().clone());
        editor.set_helper(Some(SqlHelper::new(validator, color)));
        keybinding::bind_submit(&mut editor);

        let history_path = config.history_path();
        if let Err(e) = history::load(editor.history_mut(), &history_path) {
            warn!(path = %history_path.display(), error = %e, "failed to load history");
        }

        Ok(Self {
            editor,
            session,
            history_path,
        })
    }

    /// Read and handle buffers until end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(text) => {
                    if text.trim().is_empty() {
                        continue;
                    }

                    if let Err(e) =
                        history::record_entry(self.editor.history_mut(), &self.history_path, &text)
                    {
                        warn!(path = %self.history_path.display(), error = %e, "failed to record history");
                    }

                    let stdout = io::stdout();
                    let mut out = stdout.lock();
                    if let Err(e) = handle_buffer(&self.session, &text, &mut out) {
                        report(&e);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!("Bye");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
