//! Web Chat - browser front-end for Reflection Chat
//!
//! Responsibilities:
//! - Serves the self-contained chat page
//! - Keeps a session-keyed registry of conversation logs
//! - Exposes a JSON API for submitting messages and requesting summaries

mod config;
mod sessions;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use common::{LlmClient, Persona, SubmitOutcome, SummaryOutcome, Turn};
use config::WebChatConfig;
use sessions::Sessions;

#[derive(Clone)]
struct AppState {
    sessions: Arc<Mutex<Sessions<LlmClient>>>,
    /// Chat page with the persona copy already substituted in
    page: Arc<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = WebChatConfig::parse();

    info!("Web Chat starting");
    info!("  HTTP: {}:{}", config.http_host, config.http_port);
    info!("  LLM: {} at {}", config.openai_model, config.openai_base_url);
    info!(
        "  Temperatures: chat {}, summary {}",
        config.chat_temperature, config.summary_temperature
    );

    let persona = Persona::default();
    let client = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_base_url.clone(),
    );

    let state = AppState {
        sessions: Arc::new(Mutex::new(Sessions::new(
            client,
            persona.clone(),
            config.chat_temperature,
            config.summary_temperature,
        ))),
        page: Arc::new(render_page(&persona)),
    };

    let app = Router::new()
        .route("/", get(chat_page))
        .route("/health", get(health_check))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/messages", post(post_message))
        .route("/api/sessions/:id/summary", post(post_summary))
        .with_state(state);

    let listener =
        tokio::net::TcpListener::bind((config.http_host.as_str(), config.http_port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}

fn render_page(persona: &Persona) -> String {
    include_str!("../assets/chat.html")
        .replace("{{TITLE}}", &persona.title)
        .replace("{{TAGLINE}}", &persona.tagline)
        .replace("{{DISCLAIMER}}", &persona.disclaimer)
}

async fn chat_page(State(state): State<AppState>) -> Html<String> {
    Html(state.page.as_ref().clone())
}

async fn health_check() -> &'static str {
    "Web Chat OK"
}

#[derive(Debug, Serialize)]
struct SessionBody {
    session_id: String,
    turns: Vec<Turn>,
}

#[derive(Debug, Serialize)]
struct TurnsBody {
    turns: Vec<Turn>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    text: String,
}

#[derive(Debug, Serialize)]
struct ReplyBody {
    reply: String,
}

#[derive(Debug, Serialize)]
struct SummaryBody {
    summary: String,
}

#[derive(Debug, Serialize)]
struct WarningBody {
    warning: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn unknown_session(id: &str) -> Response {
    warn!("Request for unknown session {}", id);
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "unknown session".to_string(),
        }),
    )
        .into_response()
}

async fn create_session(State(state): State<AppState>) -> Json<SessionBody> {
    let mut sessions = state.sessions.lock().await;
    let (session_id, session) = sessions.create();

    info!("Created {}", session_id);
    Json(SessionBody {
        turns: session.log().turns().to_vec(),
        session_id,
    })
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let sessions = state.sessions.lock().await;
    match sessions.get(&id) {
        Some(session) => Json(TurnsBody {
            turns: session.log().turns().to_vec(),
        })
        .into_response(),
        None => unknown_session(&id),
    }
}

async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Response {
    let mut sessions = state.sessions.lock().await;
    let Some(session) = sessions.get_mut(&id) else {
        return unknown_session(&id);
    };

    match session.submit(&body.text).await {
        Ok(SubmitOutcome::Reply(reply)) => {
            info!("{}: replied ({} chars)", id, reply.len());
            Json(ReplyBody { reply }).into_response()
        }
        Ok(SubmitOutcome::IgnoredEmpty) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("{}: submit failed: {}", id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn post_summary(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let sessions = state.sessions.lock().await;
    let Some(session) = sessions.get(&id) else {
        return unknown_session(&id);
    };

    match session.summarize().await {
        Ok(SummaryOutcome::Summary(summary)) => {
            info!("{}: summary generated ({} chars)", id, summary.len());
            Json(SummaryBody { summary }).into_response()
        }
        Ok(SummaryOutcome::NotEnoughHistory) => Json(WarningBody {
            warning: "Chat a bit first so there is something to summarize.".to_string(),
        })
        .into_response(),
        Err(e) => {
            error!("{}: summary failed: {}", id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
