//! Persona configuration: the prompt text and page copy for one deployment
//!
//! Deployments differ only in wording and styling, never in behavior, so
//! everything a front-end displays or sends as instruction text lives in one
//! `Persona` value.

/// Prompt and copy bundle for one chat deployment
#[derive(Debug, Clone)]
pub struct Persona {
    /// Page/window title
    pub title: String,
    /// One-line description shown under the title
    pub tagline: String,
    /// Safety note shown alongside the chat
    pub disclaimer: String,
    /// The canned assistant turn every fresh conversation starts with
    pub greeting: String,
    /// System instruction prepended to every chat request, never displayed
    /// and never stored in the log
    pub system_prompt: String,
    /// System instruction for the summary request
    pub summary_system_prompt: String,
    /// The sections the summary request asks for, appended after the
    /// transcript
    pub summary_instructions: String,
}

impl Persona {
    /// The health-reflection deployment
    pub fn health_reflection() -> Self {
        Self {
            title: "Health Reflection Chat".to_string(),
            tagline: "A supportive space to reflect on your symptoms and concerns. \
                      This is NOT medical advice or a diagnosis tool."
                .to_string(),
            disclaimer: "This chat cannot diagnose or treat any condition. Always consult \
                         a doctor or mental health professional for medical decisions. If you \
                         have chest pain, difficulty breathing, feel you might hurt yourself \
                         or others, or any other emergency: call your local emergency number \
                         immediately."
                .to_string(),
            greeting: "Hi, I'm your health reflection buddy.\n\n\
                       I can't diagnose you, but I can help you describe what you're going \
                       through, ask clarifying questions, and help you prepare for a visit \
                       with a doctor.\n\n\
                       To start, can you tell me what's bothering you most right now?"
                .to_string(),
            system_prompt: "\
You are a supportive, non-judgmental health reflection assistant.\n\
\n\
Your goals:\n\
- Help the user describe their symptoms, feelings, and concerns in a structured way.\n\
- Ask gentle, clarifying questions (e.g., onset, duration, severity, triggers, medical history).\n\
- Help the user prepare questions and a summary they can share with a doctor or mental health professional.\n\
- Provide general, educational information (e.g., lifestyle habits, stress, sleep), but keep it high-level.\n\
\n\
Hard safety rules:\n\
- You are NOT a doctor, therapist, or emergency service.\n\
- You MUST NOT diagnose or name a specific condition as if you are sure.\n\
- Do NOT say that you can \"detect\" or \"confirm\" what is wrong.\n\
- Use language like \"this could have many causes\" and \"a healthcare professional would need to examine you.\"\n\
- Never tell the user they can skip or delay seeing a professional.\n\
- If the user's symptoms sound severe, sudden, getting worse, or life-threatening, urge them to seek urgent in-person help.\n\
- If they mention suicidal thoughts, self-harm, harming others, or psychosis, remind them to contact emergency services or a crisis hotline immediately.\n\
- Keep your answers calm, empathetic, and clear; avoid long walls of text.\n\
\n\
Style:\n\
- Warm, validating, and concise.\n\
- Ask one or two follow-up questions at a time.\n\
- Avoid medical jargon when possible."
                .to_string(),
            summary_system_prompt: "You summarize patient concerns for a doctor, without \
                                    diagnosing."
                .to_string(),
            summary_instructions: "\
Write a short summary with:\n\
- Main concerns/symptoms\n\
- Onset and duration (approximate if needed)\n\
- Any patterns, triggers, or important context mentioned\n\
- How it affects daily life\n\
- Key questions the patient might want to ask the doctor\n\
\n\
Do NOT make any diagnosis. Just summarize."
                .to_string(),
        }
    }

    /// Embed a rendered transcript into the summary request template
    pub fn render_summary_prompt(&self, transcript: &str) -> String {
        format!(
            "You are preparing a neutral, concise summary for a doctor based on this \
             conversation.\n\nConversation:\n{}\n{}",
            transcript, self.summary_instructions
        )
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::health_reflection()
    }
}
