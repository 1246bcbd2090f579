//! Fixed-interval cooperative scheduler and the loop that drives it.

mod loop_runner;
mod scheduler;
mod timer;

pub use loop_runner::{LoopRunner, TimerProvider};
pub use scheduler::Scheduler;
pub use timer::{now_ms, Timer};
