use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::spinner;
use console::style;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value;
use wrench::models::message::{Message, MessageContent, ToolRequest, ToolResponse};
use wrench::models::role::Role;

use super::{Input, Prompt, Theme};

const PROMPT: &str = "\x1b[1m\x1b[38;5;33mYou\x1b[0m: ";
const MAX_ARGUMENT_LENGTH: usize = 120;

pub struct RustylinePrompt {
    editor: DefaultEditor,
    spinner: Option<cliclack::ProgressBar>,
    theme: Theme,
    model: String,
}

impl RustylinePrompt {
    pub fn new<S: Into<String>>(model: S) -> Result<Self> {
        Ok(RustylinePrompt {
            editor: DefaultEditor::new()?,
            spinner: None,
            theme: Theme::Dark,
            model: model.into(),
        })
    }

    fn theme_name(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Light => {
                println!("Switching to Dark theme");
                Theme::Dark
            }
            Theme::Dark => {
                println!("Switching to Light theme");
                Theme::Light
            }
        };
    }
}

/// What a line typed at the prompt asks for
#[derive(Debug, PartialEq)]
enum Command {
    Exit,
    Help,
    ToggleTheme,
    Empty,
    Message(String),
}

fn interpret(line: &str) -> Command {
    let text = line.trim();
    if text.is_empty() {
        Command::Empty
    } else if text.eq_ignore_ascii_case("/exit") || text.eq_ignore_ascii_case("/quit") {
        Command::Exit
    } else if text.eq_ignore_ascii_case("/t") {
        Command::ToggleTheme
    } else if text.eq_ignore_ascii_case("/?") || text.eq_ignore_ascii_case("/help") {
        Command::Help
    } else {
        Command::Message(text.to_string())
    }
}

fn print_help() {
    println!("Commands:");
    println!("/exit | /quit - Exit the session");
    println!("/t - Toggle Light/Dark theme");
    println!("/? | /help - Display this help message");
    println!("Ctrl+D | Ctrl+C - Exit the session");
}

fn print_markdown(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();
    if let Err(e) = printed {
        tracing::debug!(error = %e, "markdown rendering failed");
        println!("{}", content);
    }
}

/// Single-line rendering of a tool call's arguments
fn format_arguments(arguments: &Value) -> String {
    let rendered = match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    if rendered.chars().count() > MAX_ARGUMENT_LENGTH {
        let truncated: String = rendered.chars().take(MAX_ARGUMENT_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}

fn print_tool_request(request: &ToolRequest) {
    println!(
        "{}",
        style(format!(
            "tool: {}({})",
            request.tool_call.name,
            format_arguments(&request.tool_call.arguments)
        ))
        .green()
    );
}

fn print_tool_response(response: &ToolResponse) {
    if response.is_error() {
        println!("{}", style(format!("error: {}", response.text())).red());
    }
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: Box<Message>) {
        let theme = self.theme_name();

        for message_content in &message.content {
            match message_content {
                MessageContent::Text(text) => {
                    if text.text.is_empty() {
                        continue;
                    }
                    if message.role == Role::Assistant {
                        println!("{}:", style(&self.model).cyan().bold());
                    }
                    print_markdown(&text.text, theme);
                }
                MessageContent::ToolRequest(tool_request) => print_tool_request(tool_request),
                MessageContent::ToolResponse(tool_response) => print_tool_response(tool_response),
            }
        }

        let _ = io::stdout().flush();
    }

    fn show_busy(&mut self) {
        let busy = spinner();
        busy.start("thinking...");
        self.spinner = Some(busy);
    }

    fn hide_busy(&mut self) {
        if let Some(busy) = self.spinner.take() {
            busy.stop("");
        }
    }

    fn get_input(&mut self) -> Result<Input> {
        let line = match self.editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(Input::exit()),
            Err(e) => {
                eprintln!("Input error: {}", e);
                return Ok(Input::exit());
            }
        };

        match interpret(&line) {
            Command::Exit => Ok(Input::exit()),
            Command::Empty => Ok(Input::ask_again()),
            Command::ToggleTheme => {
                self.toggle_theme();
                Ok(Input::ask_again())
            }
            Command::Help => {
                print_help();
                Ok(Input::ask_again())
            }
            Command::Message(text) => {
                let _ = self.editor.add_history_entry(text.as_str());
                Ok(Input::message(text))
            }
        }
    }

    fn close(&self) {
        // No cleanup required
    }
}
