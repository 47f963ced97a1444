pub mod path_allocator;
pub mod reply_service;
pub mod retry;
pub mod thread_projector;
