//! The timer set: fire what is due, then sleep until the next deadline.

use std::thread;
use std::time::Duration;

use crate::core::signal::Interrupt;
use crate::sched::timer::{now_ms, Timer};

#[derive(Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler { timers: Vec::new() }
    }

    pub fn add_periodic(
        &mut self,
        interval_ms: u64,
        callback: Box<dyn FnMut(u64) -> Result<(), Interrupt>>,
    ) {
        self.timers.push(Timer::new(interval_ms, now_ms(), callback));
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Run every due timer once, in registration order. An `Err` from a
    /// callback stops the pass and propagates.
    pub fn tick(&mut self) -> Result<(), Interrupt> {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now: u64) -> Result<(), Interrupt> {
        for timer in &mut self.timers {
            timer.run_if_due(now)?;
        }
        Ok(())
    }

    /// Sleep until the earliest deadline, clamped to `[floor_ms, ceil_ms]`.
    /// The floor keeps a hot timer from turning this into a spin loop.
    pub fn sleep_until_next_due(&self, floor_ms: u64, ceil_ms: u64) {
        let now = now_ms();
        let earliest = self
            .timers
            .iter()
            .map(|timer| timer.next_due_in_ms(now))
            .min()
            .unwrap_or(ceil_ms);
        let wait = earliest.clamp(floor_ms, ceil_ms);
        thread::sleep(Duration::from_millis(wait));
    }
}

#[cfg(test)]
mod tests {
    use super::Scheduler;
    use crate::core::signal::Interrupt;
    use crate::sched::timer::Timer;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Register a timer at synthetic time 0 so tests stay deterministic.
    fn register(
        scheduler: &mut Scheduler,
        interval_ms: u64,
        callback: Box<dyn FnMut(u64) -> Result<(), Interrupt>>,
    ) {
        scheduler.timers.push(Timer::new(interval_ms, 0, callback));
    }

    #[test]
    fn due_timers_fire_in_registration_order() {
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = Scheduler::new();
        for name in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            register(
                &mut scheduler,
                10,
                Box::new(move |_| {
                    order.borrow_mut().push(name);
                    Ok(())
                }),
            );
        }
        scheduler.tick_at(10).unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn intervals_are_respected_independently() {
        let fast = Rc::new(RefCell::new(0u32));
        let slow = Rc::new(RefCell::new(0u32));
        let mut scheduler = Scheduler::new();
        let tally = Rc::clone(&fast);
        register(
            &mut scheduler,
            10,
            Box::new(move |_| {
                *tally.borrow_mut() += 1;
                Ok(())
            }),
        );
        let tally = Rc::clone(&slow);
        register(
            &mut scheduler,
            25,
            Box::new(move |_| {
                *tally.borrow_mut() += 1;
                Ok(())
            }),
        );
        for now in (0..=50).step_by(10) {
            scheduler.tick_at(now).unwrap();
        }
        assert_eq!(*fast.borrow(), 5);
        // Due at 25, fired at the 30ms pass, next due 55.
        assert_eq!(*slow.borrow(), 1);
    }

    #[test]
    fn callback_error_stops_the_pass() {
        let ran_second = Rc::new(RefCell::new(false));
        let mut scheduler = Scheduler::new();
        register(&mut scheduler, 10, Box::new(|_| Err(Interrupt::UserQuit)));
        let flag = Rc::clone(&ran_second);
        register(
            &mut scheduler,
            10,
            Box::new(move |_| {
                *flag.borrow_mut() = true;
                Ok(())
            }),
        );
        assert!(matches!(scheduler.tick_at(10), Err(Interrupt::UserQuit)));
        assert!(!*ran_second.borrow());
    }
}
