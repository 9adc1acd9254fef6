use std::sync::Arc;

use tracing::debug;

use crate::service::{QueryOptions, QueryService};

/// Why a buffer was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub message: String,
    /// Offset into the buffer the message refers to.
    pub position: usize,
}

/// Gates query submission on a remote dry run.
#[derive(Clone)]
pub struct DryRunValidator {
    service: Arc<dyn QueryService>,
}

impl DryRunValidator {
    pub fn new(service: Arc<dyn QueryService>) -> Self {
        Self { service }
    }

    /// Meta-commands and blank buffers pass unchecked. Anything else must
    /// survive a no-cache dry run.
    pub fn check(&self, text: &str) -> Result<(), ValidationFailure> {
        if text.trim().is_empty() || text.trim_start().starts_with('\\') {
            return Ok(());
        }

        match self.service.query(text, &QueryOptions::dry_run()) {
            Ok(_) => Ok(()),
            Err(err) => {
                debug!(error = %err, "dry run rejected buffer");
                Err(ValidationFailure {
                    message: err.first_message(),
                    position: 0,
                })
            }
        }
    }
}
