use super::ChatApi;
use crate::models::{Message, Role};
use crate::Result;
use std::sync::Arc;

/// An ordered message history layered over a stateless completion API.
///
/// Sessions are cheap and are constructed fresh for each orchestration
/// call; they are scratch buffers, not long-lived memory.
pub struct ChatSession {
    api: Arc<dyn ChatApi>,
    messages: Vec<Message>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            messages: Vec::new(),
        }
    }

    pub fn with_system(api: Arc<dyn ChatApi>, system_text: impl Into<String>) -> Self {
        Self {
            api,
            messages: vec![Message::system(system_text)],
        }
    }

    /// Send one user message and return the assistant reply.
    ///
    /// Empty or whitespace-only input short-circuits to an empty reply
    /// without touching the API or the history. On API failure the user
    /// message stays in the history and the error propagates.
    pub async fn send(&mut self, user_text: &str, streaming: bool) -> Result<String> {
        if user_text.trim().is_empty() {
            return Ok(String::new());
        }

        self.messages.push(Message::user(user_text));

        let reply = if streaming {
            self.api.complete_stream(&self.messages).await?
        } else {
            self.api.complete(&self.messages).await?
        };

        if !reply.is_empty() {
            self.messages.push(Message::assistant(reply.clone()));
        }

        Ok(reply)
    }

    /// Reset the history, optionally preserving the system message at
    /// index 0 when one is present.
    pub fn clear(&mut self, keep_system: bool) {
        if keep_system {
            let system = self
                .messages
                .first()
                .filter(|m| m.role == Role::System)
                .cloned();
            self.messages = system.into_iter().collect();
        } else {
            self.messages.clear();
        }
    }

    /// Insert or overwrite the system message at index 0.
    pub fn set_system(&mut self, system_text: impl Into<String>) {
        match self.messages.first_mut() {
            Some(first) if first.role == Role::System => {
                first.content = system_text.into();
            }
            _ => self.messages.insert(0, Message::system(system_text)),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MockChatApi;

    fn session_with_mock() -> (ChatSession, Arc<MockChatApi>) {
        let api = Arc::new(MockChatApi::new().with_response("mock reply".to_string()));
        (ChatSession::new(api.clone()), api)
    }

    #[tokio::test]
    async fn test_send_appends_user_and_assistant_messages() {
        let (mut session, _api) = session_with_mock();

        let reply = session.send("hello", false).await.unwrap();
        assert_eq!(reply, "mock reply");

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "mock reply");
    }

    #[tokio::test]
    async fn test_send_empty_text_makes_no_api_call() {
        let (mut session, api) = session_with_mock();

        assert_eq!(session.send("", false).await.unwrap(), "");
        assert_eq!(session.send("   \n\t", false).await.unwrap(), "");
        assert_eq!(api.call_count(), 0);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_send_streaming_accumulates_reply() {
        let api = Arc::new(MockChatApi::new().with_response("streamed".to_string()));
        let mut session = ChatSession::new(api.clone());

        let reply = session.send("go", true).await.unwrap();
        assert_eq!(reply, "streamed");
        assert_eq!(api.call_count(), 1);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_keep_system_preserves_exactly_one_message() {
        let api = Arc::new(MockChatApi::new().with_response("ok".to_string()));
        let mut session = ChatSession::with_system(api, "you are a narrator");

        session.send("first", false).await.unwrap();
        session.send("second", false).await.unwrap();
        assert_eq!(session.history().len(), 5);

        session.clear(true);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, Role::System);
        assert_eq!(session.history()[0].content, "you are a narrator");
    }

    #[tokio::test]
    async fn test_clear_keep_system_without_system_yields_empty() {
        let (mut session, _api) = session_with_mock();
        session.send("hello", false).await.unwrap();

        session.clear(true);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_clear_drop_system_always_empties() {
        let api = Arc::new(MockChatApi::new().with_response("ok".to_string()));
        let mut session = ChatSession::with_system(api, "system");
        session.send("hello", false).await.unwrap();

        session.clear(false);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_set_system_overwrites_existing() {
        let api = Arc::new(MockChatApi::new());
        let mut session = ChatSession::with_system(api, "old");

        session.set_system("new");
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].content, "new");
    }

    #[test]
    fn test_set_system_inserts_at_front() {
        let (mut session, _api) = session_with_mock();
        session.set_system("inserted");

        assert_eq!(session.history()[0].role, Role::System);
        assert_eq!(session.history()[0].content, "inserted");
    }

    #[tokio::test]
    async fn test_api_error_propagates_and_keeps_user_message() {
        let api = Arc::new(MockChatApi::new().failing("upstream down"));
        let mut session = ChatSession::new(api);

        let err = session.send("hello", false).await.unwrap_err();
        assert!(err.to_string().contains("upstream down"));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, Role::User);
    }
}
