pub mod allocator;
pub mod history;
