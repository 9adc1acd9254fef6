use std::sync::Arc;

use crate::pager::Pager;
use crate::render::DEFAULT_ROW_CAP;
use crate::service::QueryService;

/// Everything a submitted buffer needs: the service, how to display output
/// and how many rows to fetch.
#[derive(Clone)]
pub struct Session {
    service: Arc<dyn QueryService>,
    pager: Pager,
    row_cap: u32,
}

impl Session {
    pub fn new(service: Arc<dyn QueryService>, pager: Pager) -> Self {
        Self {
            service,
            pager,
            row_cap: DEFAULT_ROW_CAP,
        }
    }

    pub fn service(&self) -> &Arc<dyn QueryService> {
        &self.service
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn row_cap(&self) -> u32 {
        self.row_cap
    }
}
