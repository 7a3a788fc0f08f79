//! Core of the task tracker: the persisted task collection and the
//! operations the CLI verbs map onto. The binary in `main.rs` owns argument
//! parsing and printing; everything else lives here.

pub mod store;
pub mod task;

pub use store::{Reply, TaskRepository};
pub use task::{Status, StatusFilter, Task};
