use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::calculator::CalculatorForm;
use crate::constants::WELCOME_TEXT;

pub type MessageId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Local::now(),
        }
    }

    /// `HH:MM`, as shown under each bubble.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// State of the chat window for one session.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    input: String,
    is_loading: bool,
    calculator: CalculatorForm,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A fresh session, opened by the assistant's welcome message.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::new(Sender::Assistant, WELCOME_TEXT)],
            input: String::new(),
            is_loading: false,
            calculator: CalculatorForm::default(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn calculator(&self) -> &CalculatorForm {
        &self.calculator
    }

    pub fn calculator_mut(&mut self) -> &mut CalculatorForm {
        &mut self.calculator
    }

    /// Adds the visitor's message and marks a reply as in flight. Ignored when
    /// `text` is blank or a reply is already loading.
    pub fn append_user_message(&mut self, text: &str) -> Option<MessageId> {
        if text.trim().is_empty() || self.is_loading {
            return None;
        }
        let message = Message::new(Sender::User, text);
        let id = message.id;
        self.messages.push(message);
        self.input.clear();
        self.is_loading = true;
        Some(id)
    }

    /// Adds the empty assistant message that fragments are streamed into.
    pub fn begin_assistant_reply(&mut self) -> MessageId {
        let message = Message::new(Sender::Assistant, "");
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Returns false if no message has this id.
    pub fn append_fragment(&mut self, id: MessageId, fragment: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text.push_str(fragment);
                true
            }
            None => false,
        }
    }

    pub fn finish_reply(&mut self) {
        self.is_loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_has_welcome() {
        let conversation = Conversation::new();
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].sender, Sender::Assistant);
        assert_eq!(conversation.messages()[0].text, WELCOME_TEXT);
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_append_user_message() {
        let mut conversation = Conversation::new();
        conversation.set_input("Про беседки");
        let id = conversation.append_user_message("Про беседки").unwrap();

        let message = conversation.message(id).unwrap();
        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.text, "Про беседки");
        assert!(conversation.is_loading());
        assert_eq!(conversation.input(), "");
    }

    #[test]
    fn test_blank_message_ignored() {
        let mut conversation = Conversation::new();
        assert!(conversation.append_user_message("").is_none());
        assert!(conversation.append_user_message("   \n\t").is_none());
        assert_eq!(conversation.messages().len(), 1);
        assert!(!conversation.is_loading());
    }

    #[test]
    fn test_message_ignored_while_loading() {
        let mut conversation = Conversation::new();
        conversation.append_user_message("first").unwrap();
        assert!(conversation.append_user_message("second").is_none());
        assert_eq!(conversation.messages().len(), 2);

        conversation.finish_reply();
        assert!(conversation.append_user_message("second").is_some());
    }

    #[test]
    fn test_fragments_accumulate() {
        let mut conversation = Conversation::new();
        let id = conversation.begin_assistant_reply();
        assert_eq!(conversation.message(id).unwrap().text, "");

        assert!(conversation.append_fragment(id, "При"));
        assert!(conversation.append_fragment(id, "вет"));
        assert_eq!(conversation.message(id).unwrap().text, "Привет");
    }

    #[test]
    fn test_fragment_for_unknown_id() {
        let mut conversation = Conversation::new();
        assert!(!conversation.append_fragment(Uuid::new_v4(), "lost"));
        assert_eq!(conversation.messages().len(), 1);
    }

    #[test]
    fn test_time_label_format() {
        let message = Message::new(Sender::User, "hi");
        let label = message.time_label();
        assert_eq!(label.len(), 5);
        assert_eq!(&label[2..3], ":");
    }
}
