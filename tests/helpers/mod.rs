pub mod reply_helpers;
pub mod test_with_server;
