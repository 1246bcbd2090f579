use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use chat_client::providers::{
    ConsumerPollTimerProvider, UiTimerProvider, WorkerPollTimerProvider,
};
use chat_client::{AppConfig, Application};
use tick_tui::config::EnvConfig;
use tick_tui::logging::DebugLogger;
use tick_tui::{LoopRunner, ProcessTerminal, TimerProvider};

/// The tick loop sleeps until the earliest timer deadline, clamped to this
/// window so input latency never exceeds half a UI tick.
const SLEEP_FLOOR_MS: u64 = 1;
const SLEEP_CEIL_MS: u64 = 8;

fn main() -> io::Result<()> {
    let env = EnvConfig::from_env();
    let logger = Rc::new(DebugLogger::from_env(&env));
    let config = AppConfig::from_env();

    let terminal = ProcessTerminal::new();
    let mut app = Application::new(terminal, config, Rc::clone(&logger));
    app.start()?;

    let app = Rc::new(RefCell::new(app));
    let providers: Vec<Box<dyn TimerProvider>> = vec![
        Box::new(UiTimerProvider::new(Rc::clone(&app))),
        Box::new(WorkerPollTimerProvider::new(Rc::clone(&app))),
        Box::new(ConsumerPollTimerProvider::new(Rc::clone(&app))),
    ];
    let mut runner = LoopRunner::new(providers);
    runner.boot();

    let farewell = loop {
        match runner.tick() {
            Ok(()) => runner.sleep(SLEEP_FLOOR_MS, SLEEP_CEIL_MS),
            Err(interrupt) => break interrupt.to_string(),
        }
    };

    app.borrow_mut().stop()?;
    logger.log(&format!("exit: {farewell}"));
    println!("{farewell}");
    Ok(())
}
