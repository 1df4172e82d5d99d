//! Chat transcript for asking the backend questions about a paper.

use crate::{PaperId, RepoError};

pub const GREETING: &str = "Hello! How can I help you today?";
pub const EMPTY_REPLY: &str = "No reply from model.";
pub const FAILED_REPLY: &str = "Sorry, something went wrong while contacting the chatbot.";

/// Documents retrieved per question.
pub const DEFAULT_TOP_K: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub paper_id: Option<PaperId>,
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub waiting: bool,
}

impl ChatSession {
    pub fn new(paper_id: Option<PaperId>) -> Self {
        Self {
            paper_id,
            messages: vec![ChatMessage {
                sender: Sender::Bot,
                text: GREETING.to_string(),
            }],
            input: String::new(),
            waiting: false,
        }
    }

    /// Move the draft into the transcript and return the query to send.
    /// Blank input is ignored.
    pub fn send(&mut self) -> Option<String> {
        let query = self.input.trim().to_string();
        if query.is_empty() {
            return None;
        }
        self.input.clear();
        self.messages.push(ChatMessage {
            sender: Sender::User,
            text: query.clone(),
        });
        self.waiting = true;
        Some(query)
    }

    pub fn receive(&mut self, result: Result<String, RepoError>) {
        self.waiting = false;
        let text = match result {
            Ok(reply) if reply.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(paper_id = ?self.paper_id, error = %e, "chatbot request failed");
                FAILED_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage {
            sender: Sender::Bot,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorPayload;

    #[test]
    fn starts_with_greeting() {
        let s = ChatSession::new(Some(1));
        assert_eq!(s.messages.len(), 1);
        assert_eq!(s.messages[0].text, GREETING);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut s = ChatSession::new(None);
        s.input = "   ".into();
        assert_eq!(s.send(), None);
        assert_eq!(s.messages.len(), 1);
    }

    #[test]
    fn replies_and_fallbacks() {
        let mut s = ChatSession::new(Some(3));
        s.input = " what is this about? ".into();
        assert_eq!(s.send().as_deref(), Some("what is this about?"));
        assert!(s.waiting);
        s.receive(Ok(String::new()));
        assert_eq!(s.messages.last().unwrap().text, EMPTY_REPLY);
        assert!(!s.waiting);

        s.input = "again".into();
        s.send();
        s.receive(Err(RepoError::Server {
            status: 500,
            payload: ErrorPayload::Text(String::new()),
        }));
        assert_eq!(s.messages.last().unwrap().text, FAILED_REPLY);

        s.input = "once more".into();
        s.send();
        s.receive(Ok("It is about cats.".into()));
        let last = s.messages.last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(last.text, "It is about cats.");
    }
}
