use anyhow::Result;
use wrench::models::message::Message;

pub mod rustyline;

pub trait Prompt {
    fn render(&mut self, message: Box<Message>);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
    fn ready(&self) {
        println!("\n");
        println!("Chat with the agent (use '/exit' or ctrl-c to quit, '/help' for commands)");
        println!("\n");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for messages; control commands carry nothing
}

impl Input {
    pub fn message<S: Into<String>>(content: S) -> Self {
        Self {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }

    pub fn ask_again() -> Self {
        Self {
            input_type: InputType::AskAgain,
            content: None,
        }
    }

    pub fn exit() -> Self {
        Self {
            input_type: InputType::Exit,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}
