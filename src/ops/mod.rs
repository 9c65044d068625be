pub mod reorder;
pub mod task_store;
pub mod view;
