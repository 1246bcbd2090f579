//! Timer providers wiring the application into the scheduler.
//!
//! Three cadences: 16ms UI, 250ms question workers, 1000ms consumer. Each
//! provider holds the shared application handle and registers one periodic
//! callback that borrows it for the duration of the tick.

use std::cell::RefCell;
use std::rc::Rc;

use tick_tui::{Scheduler, Terminal, TimerProvider};

use crate::app::Application;

pub const UI_TICK_MS: u64 = 16;
pub const WORKER_POLL_MS: u64 = 250;
pub const CONSUMER_POLL_MS: u64 = 1000;

pub struct UiTimerProvider<T: Terminal> {
    app: Rc<RefCell<Application<T>>>,
}

impl<T: Terminal> UiTimerProvider<T> {
    pub fn new(app: Rc<RefCell<Application<T>>>) -> Self {
        UiTimerProvider { app }
    }
}

impl<T: Terminal + 'static> TimerProvider for UiTimerProvider<T> {
    fn register(&self, scheduler: &mut Scheduler) {
        let app = Rc::clone(&self.app);
        scheduler.add_periodic(UI_TICK_MS, Box::new(move |_| app.borrow_mut().ui_tick()));
    }
}

pub struct WorkerPollTimerProvider<T: Terminal> {
    app: Rc<RefCell<Application<T>>>,
}

impl<T: Terminal> WorkerPollTimerProvider<T> {
    pub fn new(app: Rc<RefCell<Application<T>>>) -> Self {
        WorkerPollTimerProvider { app }
    }
}

impl<T: Terminal + 'static> TimerProvider for WorkerPollTimerProvider<T> {
    fn register(&self, scheduler: &mut Scheduler) {
        let app = Rc::clone(&self.app);
        scheduler.add_periodic(
            WORKER_POLL_MS,
            Box::new(move |_| app.borrow_mut().worker_poll_tick()),
        );
    }
}

pub struct ConsumerPollTimerProvider<T: Terminal> {
    app: Rc<RefCell<Application<T>>>,
}

impl<T: Terminal> ConsumerPollTimerProvider<T> {
    pub fn new(app: Rc<RefCell<Application<T>>>) -> Self {
        ConsumerPollTimerProvider { app }
    }
}

impl<T: Terminal + 'static> TimerProvider for ConsumerPollTimerProvider<T> {
    fn register(&self, scheduler: &mut Scheduler) {
        let app = Rc::clone(&self.app);
        scheduler.add_periodic(
            CONSUMER_POLL_MS,
            Box::new(move |_| app.borrow_mut().consumer_poll_tick()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{ConsumerPollTimerProvider, UiTimerProvider, WorkerPollTimerProvider};
    use crate::app::Application;
    use crate::config::AppConfig;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tick_tui::logging::DebugLogger;
    use tick_tui::{HeadlessTerminal, LoopRunner, TimerProvider};

    #[test]
    fn all_three_cadences_register() {
        let config = AppConfig {
            answer_command: vec!["true".to_string()],
            consumer_command: vec!["true".to_string()],
            model: "m".to_string(),
            small_model: "s".to_string(),
            project_name: "p".to_string(),
            project_workdir: ".".to_string(),
        };
        let app = Rc::new(RefCell::new(Application::new(
            HeadlessTerminal::new(80, 24),
            config,
            Rc::new(DebugLogger::disabled()),
        )));

        let providers: Vec<Box<dyn TimerProvider>> = vec![
            Box::new(UiTimerProvider::new(Rc::clone(&app))),
            Box::new(WorkerPollTimerProvider::new(Rc::clone(&app))),
            Box::new(ConsumerPollTimerProvider::new(Rc::clone(&app))),
        ];
        let mut runner = LoopRunner::new(providers);
        runner.boot();
        assert_eq!(runner.timer_count(), 3);
        runner.tick().expect("first tick");
    }
}
