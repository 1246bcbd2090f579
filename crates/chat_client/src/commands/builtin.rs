//! The built-in slash commands.

use tick_tui::{ContentItem, IslandWidget, Signal};

use crate::commands::{CommandCtx, CommandHandler, DispatchError, COMMANDS, HELP_TEXT};
use tick_tui::Interrupt;

fn push_card(ctx: &mut CommandCtx, title: &str, body: &str) {
    let card = ContentItem::command_card(title, body);
    ctx.state.push_content_item(card, None);
}

fn parse_chat_number(argument: &str) -> Result<i64, DispatchError> {
    argument
        .trim()
        .parse::<i64>()
        .map_err(|_| Signal::problem(format!("'{argument}' is not a chat number")).into())
}

pub struct HelpCommand;

impl CommandHandler for HelpCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/help"
    }

    fn execute(&self, _input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        let mut body = String::new();
        for command in COMMANDS {
            body.push_str(&format!("{}  {}\n", command.name, command.description));
        }
        body.push('\n');
        body.push_str(HELP_TEXT);
        push_card(ctx, "Help", &body);
        Ok(())
    }
}

pub struct ClearCommand;

impl CommandHandler for ClearCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/clear"
    }

    fn execute(&self, _input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        ctx.state.content_items.clear();
        ctx.state.clear_island();
        ctx.state.require_redraw = true;
        Ok(())
    }
}

pub struct CompactCommand;

impl CommandHandler for CompactCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/compact"
    }

    fn execute(&self, _input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        let Some(chat_id) = *ctx.active_chat else {
            return Err(Signal::problem("No active chat to compact").into());
        };
        let freed = ctx.history.compact_chat(chat_id);
        push_card(
            ctx,
            "Compact",
            &format!("Context compacted, ~{freed} tokens freed"),
        );
        Ok(())
    }
}

/// Copies the most recent response card. The actual clipboard write happens
/// in the caller via OSC 52 so this stays terminal-agnostic.
pub struct CopyCommand;

impl CommandHandler for CopyCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/copy"
    }

    fn execute(&self, _input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        let payload = ctx
            .state
            .content_items
            .iter()
            .rev()
            .filter(|item| item.has_borders && item.title.is_none())
            .find_map(|item| item.original.clone())
            .filter(|text| !text.is_empty());
        let Some(payload) = payload else {
            return Err(Signal::problem("Nothing to copy yet").into());
        };
        let count = payload.chars().count();
        ctx.clipboard_payload = Some(payload);
        push_card(ctx, "Copy", &format!("Copied {count} characters"));
        Ok(())
    }
}

pub struct ExitCommand;

impl CommandHandler for ExitCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/exit"
    }

    fn execute(&self, _input: &str, _ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        Err(Interrupt::ExitRequested.into())
    }
}

pub struct ChatCommand;

impl ChatCommand {
    fn list(ctx: &mut CommandCtx) {
        let chats = ctx.history.list_chats();
        if chats.is_empty() {
            push_card(ctx, "Chats", "No saved chats");
            return;
        }
        let rows = chats
            .iter()
            .map(|chat| {
                (
                    format!("#{}", chat.id),
                    format!(
                        "{} ({} turns, ~{} tokens)",
                        chat.title, chat.turns, chat.total_tokens
                    ),
                )
            })
            .collect();
        ctx.state.set_island(IslandWidget::Table {
            title: "Chats".to_string(),
            rows,
        });
    }

    fn restore(ctx: &mut CommandCtx, argument: &str, full: bool) -> Result<(), DispatchError> {
        let chat_id = parse_chat_number(argument)?;
        let Some(transcript) = ctx.history.transcript(chat_id, full) else {
            return Err(Signal::problem(format!("No chat #{chat_id}")).into());
        };
        *ctx.active_chat = Some(chat_id);
        let title = if full { "Restored chat" } else { "Resumed chat" };
        push_card(ctx, title, transcript.trim_end());
        Ok(())
    }
}

impl CommandHandler for ChatCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/chat"
    }

    fn execute(&self, input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        let tail = input.strip_prefix("/chat").unwrap_or("").trim();
        let (action, argument) = match tail.split_once(' ') {
            Some((action, argument)) => (action, argument.trim()),
            None => (tail, ""),
        };

        match action {
            "" => Err(Signal::followup("Try /chat list").into()),
            "list" => {
                Self::list(ctx);
                Ok(())
            }
            "clear" => {
                ctx.history.clear();
                *ctx.active_chat = None;
                push_card(ctx, "Chats", "All chats forgotten");
                Ok(())
            }
            "delete" => {
                let chat_id = parse_chat_number(argument)?;
                if !ctx.history.delete_chat(chat_id) {
                    return Err(Signal::problem(format!("No chat #{chat_id}")).into());
                }
                if *ctx.active_chat == Some(chat_id) {
                    *ctx.active_chat = None;
                }
                push_card(ctx, "Chats", &format!("Deleted chat #{chat_id}"));
                Ok(())
            }
            "restore" => Self::restore(ctx, argument, false),
            "restore-full" => Self::restore(ctx, argument, true),
            other => Err(Signal::problem(format!("Unknown chat action '{other}'")).into()),
        }
    }
}

/// Project management. `change`, `create`, `edit` and `delete` walk the
/// user through their missing arguments with follow-up signals, so a bare
/// `/project create` becomes a step wizard instead of an error.
pub struct ProjectCommand;

impl ProjectCommand {
    fn list(ctx: &mut CommandCtx) {
        let current = ctx.projects.current();
        let rows = ctx
            .projects
            .list()
            .into_iter()
            .map(|project| {
                let marker = if project.name == current.name {
                    " (current)"
                } else {
                    ""
                };
                (project.name, format!("{}{marker}", project.workdir))
            })
            .collect();
        ctx.state.set_island(IslandWidget::Table {
            title: "Projects".to_string(),
            rows,
        });
    }

    /// Refresh the status bar fields from the selection.
    fn apply_current(ctx: &mut CommandCtx) {
        let project = ctx.projects.current();
        ctx.state.project_name = project.name;
        ctx.state.project_workdir = project.workdir;
        ctx.state.require_redraw = true;
    }
}

impl CommandHandler for ProjectCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/project"
    }

    fn execute(&self, input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        let tail = input.strip_prefix("/project").unwrap_or("").trim();
        let (action, args) = match tail.split_once(' ') {
            Some((action, rest)) => (action, rest.trim()),
            None => (tail, ""),
        };
        let mut words = args.split_whitespace();

        match action {
            "" => {
                let project = ctx.projects.current();
                push_card(
                    ctx,
                    "Project",
                    &format!("{}\n{}", project.name, project.workdir),
                );
                Ok(())
            }
            "list" => {
                Self::list(ctx);
                Ok(())
            }
            "change" => {
                let Some(name) = words.next() else {
                    return Err(Signal::followup("Which project? (see /project list)").into());
                };
                if !ctx.projects.select(name) {
                    return Err(Signal::problem(format!("No project named '{name}'")).into());
                }
                Self::apply_current(ctx);
                Err(Signal::complete(format!("Switched to project '{name}'")).into())
            }
            "create" => {
                let Some(name) = words.next() else {
                    return Err(Signal::followup("Name for the new project?").into());
                };
                let Some(workdir) = words.next() else {
                    return Err(
                        Signal::followup(format!("Working directory for '{name}'?")).into()
                    );
                };
                if !ctx.projects.create(name, workdir) {
                    return Err(
                        Signal::problem(format!("A project named '{name}' already exists")).into(),
                    );
                }
                ctx.projects.select(name);
                Self::apply_current(ctx);
                Err(Signal::complete(format!("Project '{name}' created at {workdir}")).into())
            }
            "edit" => {
                let Some(name) = words.next() else {
                    return Err(Signal::followup("Which project to edit?").into());
                };
                let Some(workdir) = words.next() else {
                    return Err(
                        Signal::followup(format!("New working directory for '{name}'?")).into()
                    );
                };
                if !ctx.projects.update(name, workdir) {
                    return Err(Signal::problem(format!("No project named '{name}'")).into());
                }
                Self::apply_current(ctx);
                Err(Signal::complete(format!("Project '{name}' now at {workdir}")).into())
            }
            "delete" => {
                let Some(name) = words.next() else {
                    return Err(Signal::followup("Which project to delete?").into());
                };
                if name == ctx.projects.current().name {
                    return Err(Signal::problem("Cannot delete the active project").into());
                }
                if !ctx.projects.delete(name) {
                    return Err(Signal::problem(format!("No project named '{name}'")).into());
                }
                Err(Signal::complete(format!("Project '{name}' deleted")).into())
            }
            other => Err(Signal::problem(format!("Unknown project action '{other}'")).into()),
        }
    }
}

pub struct ToolsCommand;

impl CommandHandler for ToolsCommand {
    fn supports(&self, base: &str) -> bool {
        base == "/tools"
    }

    fn execute(&self, _input: &str, ctx: &mut CommandCtx) -> Result<(), DispatchError> {
        let body = format!(
            "answer worker: {}\nconsumer: {}",
            ctx.answer_command.join(" "),
            ctx.consumer_command.join(" "),
        );
        push_card(ctx, "Tools", &body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::Fixture;
    use super::super::DispatchError;
    use crate::history::{HistoryService, ProjectService};
    use pretty_assertions::assert_eq;
    use tick_tui::{ContentItem, Interrupt, IslandWidget, Signal};

    fn table_rows(fixture: &Fixture) -> Vec<(String, String)> {
        match fixture.state.island.clone() {
            Some(IslandWidget::Table { rows, .. }) => rows,
            other => panic!("expected a table island, got {other:?}"),
        }
    }

    fn signal(result: Result<Option<String>, DispatchError>) -> Signal {
        match result.unwrap_err() {
            DispatchError::Signal(signal) => signal,
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn help_pushes_a_card_listing_commands() {
        let mut fixture = Fixture::new();
        fixture.dispatch("/help").expect("help");
        assert_eq!(fixture.state.content_items.len(), 1);
        assert!(fixture.state.content_items[0].text.contains("/chat"));
        assert!(fixture.state.content_items[0].text.contains("Ctrl+D"));
    }

    #[test]
    fn clear_wipes_the_scrollback() {
        let mut fixture = Fixture::new();
        fixture
            .state
            .push_content_item(ContentItem::plain("old"), None);
        fixture.dispatch("/clear").expect("clear");
        assert!(fixture.state.content_items.is_empty());
    }

    #[test]
    fn exit_raises_the_exit_interrupt() {
        let mut fixture = Fixture::new();
        match fixture.dispatch("/exit").unwrap_err() {
            DispatchError::Interrupt(Interrupt::ExitRequested) => {}
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn bare_chat_asks_for_a_followup() {
        let mut fixture = Fixture::new();
        match fixture.dispatch("/chat").unwrap_err() {
            DispatchError::Signal(signal) => {
                assert!(signal.message().contains("/chat list"))
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn chat_lifecycle_list_restore_delete() {
        let mut fixture = Fixture::new();
        let chat = fixture.history.create_chat("ownership");
        fixture.history.record_question(chat, "what is it?");

        fixture.dispatch("/chat list").expect("list");
        let rows = table_rows(&fixture);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, format!("#{chat}"));
        assert!(rows[0].1.contains("ownership"));

        fixture
            .dispatch(&format!("/chat restore {chat}"))
            .expect("restore");
        assert_eq!(fixture.active_chat, Some(chat));

        fixture
            .dispatch(&format!("/chat delete {chat}"))
            .expect("delete");
        assert_eq!(fixture.active_chat, None);
        assert!(fixture.history.list_chats().is_empty());
    }

    #[test]
    fn chat_delete_requires_a_number() {
        let mut fixture = Fixture::new();
        match fixture.dispatch("/chat delete soon").unwrap_err() {
            DispatchError::Signal(signal) => {
                assert!(signal.message().contains("not a chat number"))
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn compact_without_a_chat_is_a_problem() {
        let mut fixture = Fixture::new();
        assert!(fixture.dispatch("/compact").is_err());

        fixture.active_chat = Some(fixture.history.create_chat("t"));
        fixture.dispatch("/compact").expect("compact");
        assert!(fixture.state.content_items[0].text.contains("compacted"));
    }

    #[test]
    fn copy_returns_the_last_response_text() {
        let mut fixture = Fixture::new();
        assert!(fixture.dispatch("/copy").is_err());

        fixture
            .state
            .push_content_item(ContentItem::response_card("first answer"), None);
        fixture
            .state
            .push_content_item(ContentItem::user_card("question"), None);
        let payload = fixture.dispatch("/copy").expect("copy");
        assert_eq!(payload.as_deref(), Some("first answer"));
    }

    #[test]
    fn project_shows_current_details() {
        let mut fixture = Fixture::new();
        fixture.dispatch("/project").expect("project");
        assert!(fixture.state.content_items[0].text.contains("/tmp/demo"));
    }

    #[test]
    fn project_list_marks_the_current_selection() {
        let mut fixture = Fixture::new();
        fixture.projects.create("api", "/srv/api");
        fixture.dispatch("/project list").expect("list");
        let rows = table_rows(&fixture);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ("demo".to_string(), "/tmp/demo (current)".to_string()));
        assert_eq!(rows[1], ("api".to_string(), "/srv/api".to_string()));
    }

    #[test]
    fn project_create_asks_for_missing_arguments_then_completes() {
        let mut fixture = Fixture::new();

        match signal(fixture.dispatch("/project create")) {
            Signal::Followup(prompt) => assert!(prompt.contains("Name")),
            other => panic!("unexpected: {other:?}"),
        }
        match signal(fixture.dispatch("/project create api")) {
            Signal::Followup(prompt) => assert!(prompt.contains("'api'")),
            other => panic!("unexpected: {other:?}"),
        }
        match signal(fixture.dispatch("/project create api /srv/api")) {
            Signal::Complete(summary) => assert!(summary.contains("created")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(fixture.projects.current().name, "api");
        assert_eq!(fixture.state.project_name, "api");
        assert_eq!(fixture.state.project_workdir, "/srv/api");
    }

    #[test]
    fn project_change_rejects_unknown_names() {
        let mut fixture = Fixture::new();
        match signal(fixture.dispatch("/project change nope")) {
            Signal::Problem(message) => assert!(message.contains("nope")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(fixture.projects.current().name, "demo");
    }

    #[test]
    fn project_edit_moves_the_workdir() {
        let mut fixture = Fixture::new();
        match signal(fixture.dispatch("/project edit demo /opt/demo")) {
            Signal::Complete(summary) => assert!(summary.contains("/opt/demo")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(fixture.projects.current().workdir, "/opt/demo");
        assert_eq!(fixture.state.project_workdir, "/opt/demo");
    }

    #[test]
    fn the_active_project_refuses_deletion() {
        let mut fixture = Fixture::new();
        match signal(fixture.dispatch("/project delete demo")) {
            Signal::Problem(message) => assert!(message.contains("active")),
            other => panic!("unexpected: {other:?}"),
        }

        fixture.projects.create("api", "/srv/api");
        match signal(fixture.dispatch("/project delete api")) {
            Signal::Complete(summary) => assert!(summary.contains("deleted")),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(fixture.projects.list().len(), 1);
    }
}
