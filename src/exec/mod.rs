// src/exec/mod.rs

//! Task execution: the runnable capability and the executor backend seam.

pub mod backend;
pub mod runnable;

pub use backend::{ExecutorBackend, TokioExecutorBackend};
pub use runnable::{Runnable, ShellRunnable};
