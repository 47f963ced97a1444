pub mod post;
pub mod reply;
