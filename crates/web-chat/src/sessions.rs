//! Session registry: an explicit session-keyed map of conversation sessions
//!
//! Each browser tab gets its own `ChatSession` under a server-minted id, so
//! no state is ever shared between sessions.

use std::collections::HashMap;

use common::{ChatSession, Completion, Persona};

/// In-memory registry of chat sessions. Sessions live until the process
/// exits; there is no persistence layer.
pub struct Sessions<C> {
    backend: C,
    persona: Persona,
    chat_temperature: f32,
    summary_temperature: f32,
    sessions: HashMap<String, ChatSession<C>>,
    counter: u64,
}

impl<C: Completion + Clone> Sessions<C> {
    pub fn new(
        backend: C,
        persona: Persona,
        chat_temperature: f32,
        summary_temperature: f32,
    ) -> Self {
        Self {
            backend,
            persona,
            chat_temperature,
            summary_temperature,
            sessions: HashMap::new(),
            counter: 0,
        }
    }

    /// Mint an id and seed a fresh session under it
    pub fn create(&mut self) -> (String, &ChatSession<C>) {
        self.counter += 1;
        let id = format!("session_{}_{}", now_secs(), self.counter);

        let session = ChatSession::new(
            self.backend.clone(),
            self.persona.clone(),
            self.chat_temperature,
            self.summary_temperature,
        );
        self.sessions.insert(id.clone(), session);

        let session = &self.sessions[&id];
        (id, session)
    }

    pub fn get(&self, id: &str) -> Option<&ChatSession<C>> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ChatSession<C>> {
        self.sessions.get_mut(id)
    }
}

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
