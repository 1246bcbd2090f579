//! The application: screen layout, event routing and tick entry points.
//!
//! Three timers drive everything. The UI tick reads input, routes events
//! through the sections in screen order and redraws when dirty. The worker
//! and consumer ticks poll the agent's subprocesses. All three run on the
//! same thread, so no section ever sees a half-applied state.

use std::io;
use std::rc::Rc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use tick_tui::logging::DebugLogger;
use tick_tui::{
    draw_frame, parse_input_events, place_caret, Autocomplete, ContentItem, HelpLine, InputBox,
    InputEvent, Interrupt, IslandHost, IslandWidget, Key, Section, Signal, State, StatusBar,
    Terminal, WindowedContent,
};

use crate::agent::Agent;
use crate::commands::{CommandCtx, DispatchError, Dispatcher, Wizard, COMMANDS, HELP_TEXT};
use crate::config::AppConfig;
use crate::history::{InMemoryHistory, InMemoryProjects};

/// The viewport never shrinks below this many lines.
const MIN_CONTENT_HEIGHT: usize = 3;

const LOGO: &str = "▐ chat";
const TIPS: &str = "Ask anything, or type / for commands.";

/// The screen, top to bottom. Content takes whatever the fixed sections
/// below it leave over.
struct Layout {
    content: WindowedContent,
    autocomplete: Autocomplete,
    help: HelpLine,
    island: IslandHost,
    input: InputBox,
    status: StatusBar,
}

impl Layout {
    fn new() -> Layout {
        Layout {
            content: WindowedContent::new(),
            autocomplete: Autocomplete::new(COMMANDS),
            help: HelpLine::new(HELP_TEXT),
            island: IslandHost,
            input: InputBox::new(),
            status: StatusBar,
        }
    }

    /// Build the full frame plus the absolute 1-based caret cell.
    fn build_frame(
        &mut self,
        state: &mut State,
        columns: usize,
        rows: usize,
    ) -> (Vec<String>, (usize, usize)) {
        let autocomplete = self.autocomplete.build(state, columns);
        let help = self.help.build(state, columns);
        let island = self.island.build(state, columns);
        let input = self.input.build(state, columns);
        let status = self.status.build(state, columns);

        let fixed = autocomplete.len() + help.len() + island.len() + input.len() + status.len();
        let content_height = rows.saturating_sub(fixed).max(MIN_CONTENT_HEIGHT);
        state.content_viewport_height = content_height;

        let mut content = self.content.build(state, columns);
        while content.len() < content_height {
            content.push(String::new());
        }

        let input_offset = content_height + autocomplete.len() + help.len() + island.len();
        let (caret_row, caret_col) = self.input.caret_cell(state, columns);
        let caret = (input_offset + caret_row + 1, caret_col + 1);

        let mut frame = content;
        frame.extend(autocomplete);
        frame.extend(help);
        frame.extend(island);
        frame.extend(input);
        frame.extend(status);
        (frame, caret)
    }
}

pub struct Application<T: Terminal> {
    terminal: T,
    pub state: State,
    layout: Layout,
    dispatcher: Dispatcher,
    /// A pending multi-step command flow; the next submitted line feeds it.
    wizard: Option<Wizard>,
    pub agent: Agent,
    config: AppConfig,
    logger: Rc<DebugLogger>,
}

impl<T: Terminal> Application<T> {
    pub fn new(terminal: T, config: AppConfig, logger: Rc<DebugLogger>) -> Application<T> {
        let agent = Agent::new(
            &config,
            Box::new(InMemoryHistory::new()),
            Box::new(InMemoryProjects::new(
                &config.project_name,
                &config.project_workdir,
            )),
            Rc::clone(&logger),
        );

        let mut state = State::new();
        state.model = config.model.clone();
        state.small_model = config.small_model.clone();
        state.project_name = config.project_name.clone();
        state.project_workdir = config.project_workdir.clone();

        Application {
            terminal,
            state,
            layout: Layout::new(),
            dispatcher: Dispatcher::with_default_commands(),
            wizard: None,
            agent,
            config,
            logger,
        }
    }

    /// Enter raw mode, seed the greeting cards and start the consumer.
    pub fn start(&mut self) -> io::Result<()> {
        self.terminal.start()?;
        self.state.push_content_item(ContentItem::plain(LOGO), None);
        self.state.push_content_item(ContentItem::dim_text(TIPS), None);
        self.state.push_content_item(ContentItem::empty(), None);
        if let Err(signal) = self.agent.start_consumer() {
            self.state
                .set_island(IslandWidget::problem(signal.message()));
        }
        self.logger.log("application started");
        Ok(())
    }

    pub fn stop(&mut self) -> io::Result<()> {
        self.agent.shutdown();
        self.terminal.stop()
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    /// 16ms timer: input, routing, redraw.
    pub fn ui_tick(&mut self) -> Result<(), Interrupt> {
        let resized = self.terminal.poll_resize();
        if resized {
            self.state.require_redraw = true;
        }

        let data = self.terminal.read_available().unwrap_or_else(|err| {
            self.logger.log(&format!("terminal read failed: {err}"));
            String::new()
        });
        let events = parse_input_events(&data);
        for event in &events {
            self.handle_event(event)?;
        }

        if !events.is_empty() || self.state.require_redraw {
            self.draw();
        }
        Ok(())
    }

    /// 250ms timer: drain question workers.
    pub fn worker_poll_tick(&mut self) -> Result<(), Interrupt> {
        if let Err(signal) = self.agent.poll_workers(&mut self.state) {
            self.state
                .set_island(IslandWidget::problem(signal.message()));
        }
        Ok(())
    }

    /// 1000ms timer: keep the consumer alive.
    pub fn consumer_poll_tick(&mut self) -> Result<(), Interrupt> {
        if let Err(signal) = self.agent.poll_consumer(&mut self.state) {
            self.state
                .set_island(IslandWidget::problem(signal.message()));
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &InputEvent) -> Result<(), Interrupt> {
        // A problem overlay is dismissed by the next interaction, which is
        // still delivered normally.
        if self
            .state
            .island
            .as_ref()
            .is_some_and(IslandWidget::is_problem)
        {
            self.state.clear_island();
        }

        match event {
            InputEvent::Key(Key::Ctrl('c')) => return Err(Interrupt::UserQuit),
            InputEvent::Key(Key::Ctrl('d')) => return self.submit(),
            InputEvent::Key(Key::BackTab) => {
                self.state.mode = self.state.mode.next();
                self.state.require_redraw = true;
            }
            InputEvent::Resize { .. } => {
                self.state.require_redraw = true;
            }
            InputEvent::Key(Key::Escape) if self.wizard.is_some() => {
                self.wizard = None;
                self.state.clear_island();
                self.state.require_redraw = true;
            }
            _ => {
                let consumed_by_autocomplete = self.layout.autocomplete.handle(&mut self.state, event);
                if !consumed_by_autocomplete {
                    if !self.layout.content.handle(&mut self.state, event) {
                        self.layout.input.handle(&mut self.state, event);
                    }
                    if buffer_may_change(event) {
                        self.layout.autocomplete.recompute(&mut self.state);
                    }
                }
            }
        }
        Ok(())
    }

    /// Ctrl+D: command input goes to the dispatcher, anything else becomes
    /// a question for the agent.
    fn submit(&mut self) -> Result<(), Interrupt> {
        let text = self.state.input.trim().to_string();
        if text.is_empty() {
            return Ok(());
        }
        self.state.clear_input();
        self.layout.autocomplete.recompute(&mut self.state);

        // A pending wizard claims the line, even one starting with '/'
        // (a working directory answer can look like a command).
        if let Some(wizard) = self.wizard.as_mut() {
            let command = wizard.answer(&text);
            return self.run_command(&command);
        }

        if text.starts_with('/') {
            return self.run_command(&text);
        }

        self.state
            .push_content_item(ContentItem::user_card(&text), None);
        match self.agent.ask(&text, self.state.mode) {
            Ok(request_id) => {
                self.logger.log(&format!("submitted request {request_id}"));
                self.state
                    .set_island(IslandWidget::progress("Waiting for reply"));
            }
            Err(signal) => {
                self.state
                    .set_island(IslandWidget::problem(signal.message()));
            }
        }
        Ok(())
    }

    fn run_command(&mut self, input: &str) -> Result<(), Interrupt> {
        let mut ctx = CommandCtx {
            state: &mut self.state,
            history: self.agent.history.as_mut(),
            projects: self.agent.projects.as_mut(),
            active_chat: &mut self.agent.active_chat,
            answer_command: &self.config.answer_command,
            consumer_command: &self.config.consumer_command,
            clipboard_payload: None,
        };
        let result = self.dispatcher.dispatch(input, &mut ctx);
        let clipboard = ctx.clipboard_payload.take();

        match result {
            Ok(()) => {
                self.wizard = None;
                if let Some(payload) = clipboard {
                    self.write_clipboard(&payload);
                }
                Ok(())
            }
            Err(DispatchError::Signal(Signal::Problem(message))) => {
                self.wizard = None;
                self.state.set_island(IslandWidget::problem(&message));
                Ok(())
            }
            Err(DispatchError::Signal(Signal::Followup(prompt))) => {
                let wizard = match self.wizard.take() {
                    Some(mut wizard) => {
                        wizard.push_prompt(&prompt);
                        wizard
                    }
                    None => Wizard::begin(input, &prompt),
                };
                self.state.set_island(wizard.island());
                self.wizard = Some(wizard);
                Ok(())
            }
            Err(DispatchError::Signal(Signal::Complete(summary))) => {
                self.wizard = None;
                self.state.set_island(IslandWidget::summary("Done", &summary));
                Ok(())
            }
            Err(DispatchError::Interrupt(interrupt)) => Err(interrupt),
        }
    }

    /// OSC 52 clipboard write; handled by the terminal emulator, not us.
    fn write_clipboard(&mut self, payload: &str) {
        let encoded = BASE64.encode(payload.as_bytes());
        self.terminal.write(&format!("\x1b]52;c;{encoded}\x07"));
        self.terminal.flush();
    }

    fn draw(&mut self) {
        let columns = self.terminal.columns() as usize;
        let rows = self.terminal.rows() as usize;
        let (frame, (caret_row, caret_col)) =
            self.layout.build_frame(&mut self.state, columns, rows);
        self.terminal.write(&draw_frame(&frame));
        self.terminal.write(&place_caret(caret_row, caret_col));
        self.terminal.flush();
        self.state.require_redraw = false;
    }
}

/// Events that may edit the buffer and therefore refresh autocomplete.
fn buffer_may_change(event: &InputEvent) -> bool {
    matches!(
        event,
        InputEvent::Text(_)
            | InputEvent::Paste(_)
            | InputEvent::Key(Key::Enter)
            | InputEvent::Key(Key::Backspace)
            | InputEvent::Key(Key::Delete)
            | InputEvent::Key(Key::Ctrl('y'))
            | InputEvent::Key(Key::Escape)
    )
}

#[cfg(test)]
mod tests {
    use super::Application;
    use crate::config::AppConfig;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use tick_tui::logging::DebugLogger;
    use tick_tui::{HeadlessTerminal, Interrupt, Mode};

    fn test_config() -> AppConfig {
        AppConfig {
            answer_command: vec!["/bin/sh".to_string(), "-c".to_string(), "sleep 30".to_string()],
            consumer_command: vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "sleep 30".to_string(),
            ],
            model: "large".to_string(),
            small_model: "small".to_string(),
            project_name: "demo".to_string(),
            project_workdir: "/tmp/demo".to_string(),
        }
    }

    fn app() -> Application<HeadlessTerminal> {
        Application::new(
            HeadlessTerminal::new(80, 24),
            test_config(),
            Rc::new(DebugLogger::disabled()),
        )
    }

    #[test]
    fn typing_lands_in_the_input_buffer() {
        let mut app = app();
        app.terminal_mut().feed("hello");
        app.ui_tick().expect("tick");
        assert_eq!(app.state.input, "hello");
        // The tick drew a frame with the text inside the input box.
        assert!(app.terminal_mut().take_output().contains("hello"));
    }

    #[test]
    fn ctrl_c_raises_user_quit() {
        let mut app = app();
        app.terminal_mut().feed("\x03");
        assert_eq!(app.ui_tick(), Err(Interrupt::UserQuit));
    }

    #[test]
    fn shift_tab_cycles_the_mode() {
        let mut app = app();
        assert_eq!(app.state.mode, Mode::Chat);
        app.terminal_mut().feed("\x1b[Z");
        app.ui_tick().expect("tick");
        assert_eq!(app.state.mode, Mode::Plan);
    }

    #[test]
    fn slash_exit_raises_exit_requested() {
        let mut app = app();
        app.terminal_mut().feed("/exit");
        app.ui_tick().expect("tick");
        app.terminal_mut().feed("\x04");
        assert_eq!(app.ui_tick(), Err(Interrupt::ExitRequested));
    }

    #[test]
    fn submitting_a_question_pushes_a_user_card_and_progress_island() {
        let mut app = app();
        app.terminal_mut().feed("what is rust?");
        app.ui_tick().expect("tick");
        app.terminal_mut().feed("\x04");
        app.ui_tick().expect("tick");

        let last_card = app.state.content_items.last().expect("user card");
        assert_eq!(last_card.text, "what is rust?");
        assert!(app.state.island.is_some());
        assert!(app.state.input.is_empty());
        app.agent.shutdown();
    }

    #[test]
    fn empty_submit_is_ignored() {
        let mut app = app();
        let cards_before = app.state.content_items.len();
        app.terminal_mut().feed("\x04");
        app.ui_tick().expect("tick");
        assert_eq!(app.state.content_items.len(), cards_before);
    }

    #[test]
    fn slash_copy_emits_an_osc52_write() {
        let mut app = app();
        app.state
            .push_content_item(tick_tui::ContentItem::response_card("answer"), None);
        app.terminal_mut().feed("/copy");
        app.ui_tick().expect("tick");
        // Autocomplete is open after "/copy"; Ctrl+D submits regardless.
        app.terminal_mut().feed("\x04");
        app.ui_tick().expect("tick");
        let output = app.terminal_mut().take_output();
        assert!(output.contains("\x1b]52;c;"), "missing OSC 52 write");
    }

    #[test]
    fn problem_island_is_dismissed_by_the_next_key() {
        let mut app = app();
        app.state
            .set_island(tick_tui::IslandWidget::problem("boom"));
        app.terminal_mut().feed("x");
        app.ui_tick().expect("tick");
        assert!(app.state.island.is_none());
        assert_eq!(app.state.input, "x");
    }

    #[test]
    fn unknown_command_surfaces_a_problem_island() {
        let mut app = app();
        app.terminal_mut().feed("/nonsense");
        app.ui_tick().expect("tick");
        app.terminal_mut().feed("\x04");
        app.ui_tick().expect("tick");
        let island = app.state.island.clone().expect("island");
        assert!(island.is_problem());
    }

    #[test]
    fn project_wizard_collects_answers_across_submits() {
        let mut app = app();
        app.terminal_mut().feed("/project create\x04");
        app.ui_tick().expect("tick");
        match app.state.island.clone() {
            Some(tick_tui::IslandWidget::Steps { steps, .. }) => assert_eq!(steps.len(), 1),
            other => panic!("unexpected island: {other:?}"),
        }

        app.terminal_mut().feed("api\x04");
        app.ui_tick().expect("tick");
        match app.state.island.clone() {
            Some(tick_tui::IslandWidget::Steps { steps, .. }) => {
                assert_eq!(steps.len(), 2);
                assert!(steps[0].1, "answered step not marked done");
            }
            other => panic!("unexpected island: {other:?}"),
        }

        app.terminal_mut().feed("/srv/api\x04");
        app.ui_tick().expect("tick");
        match app.state.island.clone() {
            Some(tick_tui::IslandWidget::Summary { detail, .. }) => {
                assert!(detail.contains("created"))
            }
            other => panic!("unexpected island: {other:?}"),
        }
        assert_eq!(app.state.project_name, "api");
        assert_eq!(app.state.project_workdir, "/srv/api");
    }

    #[test]
    fn escape_cancels_a_pending_wizard() {
        let mut app = app();
        app.terminal_mut().feed("/project create\x04");
        app.ui_tick().expect("tick");
        assert!(app.state.island.is_some());

        app.terminal_mut().feed("\x1b");
        app.ui_tick().expect("tick");
        assert!(app.state.island.is_none());

        // The next submission dispatches normally instead of feeding the
        // cancelled wizard.
        app.terminal_mut().feed("/help\x04");
        app.ui_tick().expect("tick");
        let last_card = app.state.content_items.last().expect("help card");
        assert!(last_card.text.contains("/chat"));
    }

    #[test]
    fn frame_fills_the_terminal_height() {
        let mut app = app();
        app.state.require_redraw = true;
        let columns = 80;
        let rows = 24;
        let (frame, caret) = app
            .layout
            .build_frame(&mut app.state, columns, rows);
        assert_eq!(frame.len(), rows);
        // Caret sits inside the input box, above the status line.
        assert!(caret.0 < rows);
        assert!(caret.1 >= 3);
    }
}
