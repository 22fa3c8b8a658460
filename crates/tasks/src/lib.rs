//! Tasks domain module.

pub mod task;

pub use task::{MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, Task, TaskStatus};
