use std::{fmt, sync::Arc};

use walk_config::Config;
use walk_core::WalkServices;

#[derive(Clone)]
pub struct AppState {
    pub services: WalkServices,
    pub config: Arc<Config>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(services: WalkServices, config: Arc<Config>) -> Self {
        Self { services, config }
    }

    pub fn services(&self) -> &WalkServices {
        &self.services
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
