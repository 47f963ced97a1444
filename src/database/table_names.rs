pub const POST_TABLE_NAME: &str = "post";
pub const REPLY_TABLE_NAME: &str = "reply";
pub const REPLY_COUNTER_TABLE_NAME: &str = "reply_counter";
