//! Conversation log and chat session core

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::llm::{ChatMessage, Completion};
use crate::persona::Persona;

/// Speaker role for a stored turn
///
/// There is deliberately no system variant: the system instruction exists
/// only at request-assembly time and is never stored in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used when rendering a transcript
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }

    fn wire_role(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Ordered, append-only history of one session
///
/// Seeded at creation with exactly one assistant greeting turn. Append is
/// the only mutation; there is no cap, no edits, and no truncation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLog {
    turns: Vec<Turn>,
}

impl ConversationLog {
    /// Create a log seeded with the greeting turn
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn {
                role: Role::Assistant,
                text: greeting.into(),
            }],
        }
    }

    fn append(&mut self, role: Role, text: String) {
        self.turns.push(Turn { role, text });
    }

    /// Ordered view of the history
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Get the number of turns in the log
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Project the log into wire messages, in insertion order
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| ChatMessage {
                role: turn.role.wire_role().to_string(),
                content: turn.text.clone(),
            })
            .collect()
    }

    /// Render every turn as a `"<Speaker>: <text>"` line
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for turn in &self.turns {
            out.push_str(turn.role.label());
            out.push_str(": ");
            out.push_str(&turn.text);
            out.push('\n');
        }
        out
    }
}

/// Result of a `submit` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The assistant's reply, already appended to the log
    Reply(String),
    /// Whitespace-only input; nothing was appended and nothing was sent
    IgnoredEmpty,
}

/// Result of a `summarize` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Summary text, for display only - never appended to the log
    Summary(String),
    /// Not yet a real exchange beyond the greeting; no request was made.
    /// Rendered as a warning by the front-ends, not an error.
    NotEnoughHistory,
}

/// One user's conversation: the log plus the two derive operations
pub struct ChatSession<C> {
    log: ConversationLog,
    persona: Persona,
    backend: C,
    chat_temperature: f32,
    summary_temperature: f32,
}

impl<C: Completion> ChatSession<C> {
    /// Create a session with a freshly seeded log
    pub fn new(
        backend: C,
        persona: Persona,
        chat_temperature: f32,
        summary_temperature: f32,
    ) -> Self {
        let log = ConversationLog::new(persona.greeting.clone());
        Self {
            log,
            persona,
            backend,
            chat_temperature,
            summary_temperature,
        }
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Send one user message and append the assistant's reply.
    ///
    /// The outbound request is the system instruction followed by the full
    /// history in insertion order, including the just-appended user turn.
    /// The whole history is resent every time; nothing is windowed or
    /// truncated, so the payload grows with conversation length.
    ///
    /// On failure the user turn stays in the log, no assistant turn is
    /// added, and the error propagates. No retry, no placeholder reply.
    pub async fn submit(&mut self, user_text: &str) -> Result<SubmitOutcome, ChatError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Ok(SubmitOutcome::IgnoredEmpty);
        }

        self.log.append(Role::User, user_text.to_string());

        let mut messages = vec![ChatMessage::system(self.persona.system_prompt.clone())];
        messages.extend(self.log.to_chat_messages());

        let reply = self
            .backend
            .complete(messages, self.chat_temperature)
            .await?;

        self.log.append(Role::Assistant, reply.clone());
        Ok(SubmitOutcome::Reply(reply))
    }

    /// Produce a summary of the conversation so far.
    ///
    /// Takes `&self`: this call never mutates the log, and the returned
    /// text is for display only. Uses the lower summary temperature.
    pub async fn summarize(&self) -> Result<SummaryOutcome, ChatError> {
        if self.log.len() < 2 {
            return Ok(SummaryOutcome::NotEnoughHistory);
        }

        let prompt = self.persona.render_summary_prompt(&self.log.transcript());
        let messages = vec![
            ChatMessage::system(self.persona.summary_system_prompt.clone()),
            ChatMessage::user(prompt),
        ];

        let summary = self
            .backend
            .complete(messages, self.summary_temperature)
            .await?;

        Ok(SummaryOutcome::Summary(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Completion backend that replays a script and records every request
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, ChatError>>>,
        calls: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, ChatError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(Vec<ChatMessage>, f32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Completion for ScriptedBackend {
        async fn complete(
            &self,
            messages: Vec<ChatMessage>,
            temperature: f32,
        ) -> Result<String, ChatError> {
            self.calls.lock().unwrap().push((messages, temperature));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ChatError::Api("script exhausted".to_string())))
        }
    }

    fn test_persona() -> Persona {
        Persona {
            greeting: "Hi there".to_string(),
            ..Persona::default()
        }
    }

    fn new_session(
        replies: Vec<Result<String, ChatError>>,
    ) -> (ChatSession<Arc<ScriptedBackend>>, Arc<ScriptedBackend>) {
        let backend = ScriptedBackend::new(replies);
        let session = ChatSession::new(Arc::clone(&backend), test_persona(), 0.4, 0.3);
        (session, backend)
    }

    #[test]
    fn test_log_seeded_with_greeting() {
        let log = ConversationLog::new("Hi there");
        assert_eq!(log.len(), 1);
        assert_eq!(log.turns()[0].role, Role::Assistant);
        assert_eq!(log.turns()[0].text, "Hi there");
    }

    #[test]
    fn test_transcript_labels() {
        let mut log = ConversationLog::new("Hi there");
        log.append(Role::User, "my head hurts".to_string());
        assert_eq!(log.transcript(), "Assistant: Hi there\nYou: my head hurts\n");
    }

    #[tokio::test]
    async fn test_submit_appends_pair_and_sends_full_history() {
        let (mut session, backend) = new_session(vec![Ok("How long has it hurt?".to_string())]);

        let outcome = session.submit("I have a headache").await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome::Reply("How long has it hurt?".to_string())
        );

        // Log is greeting + user + assistant
        let turns = session.log().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].text, "I have a headache");
        assert_eq!(turns[2].role, Role::Assistant);
        assert_eq!(turns[2].text, "How long has it hurt?");

        // Request is [system] + log in insertion order, at chat temperature
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let (messages, temperature) = &calls[0];
        assert_eq!(*temperature, 0.4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(
            messages[1],
            ChatMessage::assistant("Hi there"),
        );
        assert_eq!(messages[2], ChatMessage::user("I have a headache"));
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn test_submit_ignores_empty_input() {
        let (mut session, backend) = new_session(vec![]);

        assert_eq!(
            session.submit("   \n").await.unwrap(),
            SubmitOutcome::IgnoredEmpty
        );
        assert_eq!(session.log().len(), 1);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_user_turn() {
        let (mut session, backend) =
            new_session(vec![Err(ChatError::Api("connection reset".to_string()))]);

        let err = session.submit("I have a headache").await.unwrap_err();
        assert!(matches!(err, ChatError::Api(_)));

        // The user turn stays; no assistant turn was added
        let turns = session.log().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_log_grows_by_two_per_successful_submit() {
        let (mut session, backend) = new_session(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
            Ok("third".to_string()),
        ]);

        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            session.submit(text).await.unwrap();
            assert_eq!(session.log().len(), 1 + 2 * (i + 1));
        }

        // The last request carries the entire history, in order
        let calls = backend.calls();
        let (messages, _) = calls.last().unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                session.persona().system_prompt.as_str(),
                "Hi there",
                "one",
                "first",
                "two",
                "second",
                "three",
            ]
        );
    }

    #[tokio::test]
    async fn test_no_system_turn_is_ever_stored() {
        let (mut session, _backend) = new_session(vec![Ok("reply".to_string())]);
        session.submit("hello").await.unwrap();

        for message in session.log().to_chat_messages() {
            assert_ne!(message.role, "system");
        }
    }

    #[tokio::test]
    async fn test_summarize_on_fresh_session_warns_without_calling() {
        let (session, backend) = new_session(vec![]);

        assert_eq!(
            session.summarize().await.unwrap(),
            SummaryOutcome::NotEnoughHistory
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_sends_transcript_at_lower_temperature() {
        let (mut session, backend) = new_session(vec![
            Ok("Try resting your eyes.".to_string()),
            Ok("Patient reports headaches.".to_string()),
        ]);
        session.submit("my head hurts").await.unwrap();

        let outcome = session.summarize().await.unwrap();
        assert_eq!(
            outcome,
            SummaryOutcome::Summary("Patient reports headaches.".to_string())
        );

        let calls = backend.calls();
        let (messages, temperature) = &calls[1];
        assert_eq!(*temperature, 0.3);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.contains("You: my head hurts"));
        assert!(messages[1]
            .content
            .contains("Assistant: Try resting your eyes."));
    }

    #[tokio::test]
    async fn test_summarize_never_mutates_the_log() {
        let (mut session, _backend) = new_session(vec![
            Ok("reply".to_string()),
            Ok("summary one".to_string()),
            Err(ChatError::Api("timeout".to_string())),
            Ok("summary two".to_string()),
        ]);
        session.submit("hello").await.unwrap();

        let before: Vec<Turn> = session.log().turns().to_vec();

        session.summarize().await.unwrap();
        assert!(session.summarize().await.is_err());
        session.summarize().await.unwrap();

        assert_eq!(session.log().turns(), before.as_slice());
    }
}
