use std::sync::Arc;

use super::{
    config::Config,
    users::{UserService, UserStore},
};

pub struct State {
    pub config: Config,
    pub users: UserService,
}

impl State {
    pub fn new(config: Config, store: Arc<dyn UserStore>) -> Arc<Self> {
        Arc::new(Self {
            config,
            users: UserService::new(store),
        })
    }
}
