pub mod calculator;
pub mod constants;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod fallback;
pub mod gemini;
pub mod quick_actions;
pub mod reply;

pub use calculator::{BookingObject, CalcStep, CalculationRequest, CalculatorForm};
pub use controller::{ChatController, SendOutcome};
pub use conversation::{Conversation, Message, MessageId, Sender};
pub use error::{CalculatorError, ReplyError};
pub use reply::{ConversationHistory, HistoryEntry, ReplyConfig, ReplyProvider, ReplyStream, Role};
