//! Boots timer providers into one scheduler and drives it.

use crate::core::signal::Interrupt;
use crate::sched::scheduler::Scheduler;

/// Something that contributes one or more periodic timers.
pub trait TimerProvider {
    fn register(&self, scheduler: &mut Scheduler);
}

pub struct LoopRunner {
    scheduler: Scheduler,
    providers: Vec<Box<dyn TimerProvider>>,
}

impl LoopRunner {
    pub fn new(providers: Vec<Box<dyn TimerProvider>>) -> LoopRunner {
        LoopRunner {
            scheduler: Scheduler::new(),
            providers,
        }
    }

    /// Register every provider's timers. Idempotent: providers are drained
    /// on the first call, so a second boot registers nothing.
    pub fn boot(&mut self) {
        for provider in std::mem::take(&mut self.providers) {
            provider.register(&mut self.scheduler);
        }
    }

    pub fn tick(&mut self) -> Result<(), Interrupt> {
        self.scheduler.tick()
    }

    pub fn sleep(&self, floor_ms: u64, ceil_ms: u64) {
        self.scheduler.sleep_until_next_due(floor_ms, ceil_ms);
    }

    pub fn timer_count(&self) -> usize {
        self.scheduler.timer_count()
    }
}
