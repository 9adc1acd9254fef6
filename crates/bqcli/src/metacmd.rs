//! Backslash meta-commands.
//!
//! ```text
//! \d                  list datasets
//! \d DATASET          list tables with their partitioning type
//! \d DATASET.TABLE    show the table id and its schema
//! \help               list commands
//! ```

use std::io::{self, Write};

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::debug;

use crate::render::render_schema;
use crate::service::ServiceError;
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(
    name = "\\",
    bin_name = "\\",
    no_binary_name = true,
    disable_version_flag = true
)]
struct MetaCli {
    #[command(subcommand)]
    command: MetaCommand,
}

#[derive(Subcommand, Debug)]
enum MetaCommand {
    /// Describe datasets, the tables of a dataset, or a table schema
    D {
        /// DATASET or DATASET.TABLE; lists datasets when omitted
        target: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum MetaError {
    /// Unknown command or bad arguments, with clap's usage text.
    #[error("{0}")]
    Usage(#[from] clap::Error),

    #[error("malformed target {0:?}: expected DATASET or DATASET.TABLE")]
    MalformedTarget(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What `\d` describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Dataset(String),
    Table { dataset: String, table: String },
}

impl Target {
    pub fn parse(arg: Option<&str>) -> Result<Self, MetaError> {
        let arg = match arg {
            None | Some("") => return Ok(Target::All),
            Some(arg) => arg,
        };

        let (dataset, table) = match arg.split_once('.') {
            None => (arg, ""),
            Some((_, table)) if table.contains('.') => {
                return Err(MetaError::MalformedTarget(arg.to_string()))
            }
            Some(parts) => parts,
        };

        // An empty part falls back to the broader listing.
        Ok(match (dataset.is_empty(), table.is_empty()) {
            (false, false) => Target::Table {
                dataset: dataset.to_string(),
                table: table.to_string(),
            },
            (false, true) => Target::Dataset(dataset.to_string()),
            (true, _) => Target::All,
        })
    }
}

/// Split a meta-command line into arguments: drop the leading `\` and split
/// on runs of whitespace.
pub fn split_args(line: &str) -> Vec<&str> {
    let body = line.trim_start();
    let body = body.strip_prefix('\\').unwrap_or(body);
    body.split_whitespace().collect()
}

/// Run a meta-command line, writing its output to `out`.
pub fn dispatch(session: &Session, line: &str, out: &mut dyn Write) -> Result<(), MetaError> {
    let args = split_args(line);
    debug!(?args, "meta-command");

    let cli = match MetaCli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(out, "{}", e)?;
            return Ok(());
        }
        Err(e) => return Err(MetaError::Usage(e)),
    };

    match cli.command {
        MetaCommand::D { target } => describe(session, Target::parse(target.as_deref())?, out),
    }
}

fn describe(session: &Session, target: Target, out: &mut dyn Write) -> Result<(), MetaError> {
    let service = session.service();

    match target {
        Target::All => {
            for dataset in service.list_datasets()? {
                writeln!(out, "{}", dataset)?;
            }
        }
        Target::Dataset(dataset) => {
            for table in service.list_tables(&dataset)? {
                writeln!(
                    out,
                    "{} {}",
                    table.table_id,
                    table.partitioning_type.as_deref().unwrap_or("None")
                )?;
            }
        }
        Target::Table { dataset, table } => {
            let detail = service.get_table(&dataset, &table)?;
            session.pager().display(&render_schema(&detail), out)?;
        }
    }

    Ok(())
}
