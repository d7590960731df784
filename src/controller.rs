//! Drives one chat session: intercepts quick actions, runs a reply turn and
//! feeds its fragments into the conversation.

use futures::StreamExt;
use tracing::{debug, info, instrument, warn};

use crate::conversation::{Conversation, Message, MessageId};
use crate::error::CalculatorError;
use crate::quick_actions::{opens_calculator, outgoing_text};
use crate::reply::{ConversationHistory, ReplyProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or a reply was already in flight.
    Ignored,
    /// The cost-calculator label was sent; nothing was appended.
    CalculatorOpened,
    /// A full turn ran; the id is the assistant's message.
    Replied(MessageId),
}

pub struct ChatController {
    conversation: Conversation,
    history: ConversationHistory,
    provider: ReplyProvider,
}

impl ChatController {
    pub fn new(provider: ReplyProvider) -> Self {
        Self {
            conversation: Conversation::new(),
            history: ConversationHistory::new(),
            provider,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn reset_history(&mut self) {
        info!("Clearing conversation history");
        self.history.clear();
    }

    /// Runs one turn for `text`. `on_fragment` sees the assistant message
    /// after every fragment is applied.
    #[instrument(skip(self, on_fragment))]
    pub async fn send_message<F>(&mut self, text: &str, mut on_fragment: F) -> SendOutcome
    where
        F: FnMut(&Message),
    {
        if text.trim().is_empty() || self.conversation.is_loading() {
            debug!("Ignoring message");
            return SendOutcome::Ignored;
        }

        if opens_calculator(text) {
            info!("Opening cost calculator");
            self.conversation.calculator_mut().open();
            return SendOutcome::CalculatorOpened;
        }

        if self.conversation.append_user_message(text).is_none() {
            return SendOutcome::Ignored;
        }
        let reply_id = self.conversation.begin_assistant_reply();

        let outgoing = outgoing_text(text);
        let mut fragments = self.provider.stream_reply(&mut self.history, outgoing);
        let mut count = 0usize;
        while let Some(fragment) = fragments.next().await {
            count += 1;
            if !self.conversation.append_fragment(reply_id, &fragment) {
                warn!(%reply_id, "Reply message disappeared; dropping fragment");
                continue;
            }
            if let Some(message) = self.conversation.message(reply_id) {
                on_fragment(message);
            }
        }
        drop(fragments);

        self.conversation.finish_reply();
        debug!(fragments = count, "Reply finished");
        SendOutcome::Replied(reply_id)
    }

    /// Turns the calculator form into a chat message, closes the form and
    /// sends the message.
    pub async fn submit_calculation<F>(&mut self, on_fragment: F) -> Result<SendOutcome, CalculatorError>
    where
        F: FnMut(&Message),
    {
        let request = self.conversation.calculator().submit()?;
        self.conversation.calculator_mut().close();
        let prompt = request.to_prompt();
        info!(%prompt, "Submitting cost calculation");
        Ok(self.send_message(&prompt, on_fragment).await)
    }
}
