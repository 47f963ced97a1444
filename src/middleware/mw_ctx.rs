use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::access::reply::ReplyAccess;
use crate::config::AppConfig;
use crate::database::client::Database;
use crate::services::retry::RetryConfig;

pub struct CtxState {
    pub db: Database,
    pub reply_max_depth: u8,
    pub reply_access: ReplyAccess,
    pub retry: RetryConfig,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtxState")
            .field("reply_max_depth", &self.reply_max_depth)
            .field("reply_access", &self.reply_access)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig) -> Arc<CtxState> {
    let ctx_state = CtxState {
        db,
        reply_max_depth: config.reply_max_depth,
        reply_access: ReplyAccess::new(config.reply_admin_role.clone()),
        retry: config.retry_config(),
    };
    Arc::new(ctx_state)
}
