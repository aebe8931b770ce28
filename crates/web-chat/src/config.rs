//! Web front-end configuration

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "web-chat")]
#[command(about = "Reflection Chat - browser chat front-end")]
pub struct WebChatConfig {
    /// HTTP server host
    #[arg(long, env = "REFLECT_HTTP_HOST", default_value = "127.0.0.1")]
    pub http_host: String,

    /// HTTP server port
    #[arg(long, env = "REFLECT_HTTP_PORT", default_value = "3000")]
    pub http_port: u16,

    /// OpenAI API key
    #[arg(long, env = "REFLECT_OPENAI_API_KEY")]
    pub openai_api_key: String,

    /// Model name to use
    #[arg(long, env = "REFLECT_OPENAI_MODEL", default_value = "gpt-4.1-mini")]
    pub openai_model: String,

    /// API base URL (OpenAI or any compatible endpoint)
    #[arg(
        long = "openai-base-url",
        env = "REFLECT_OPENAI_BASE_URL",
        default_value = "https://api.openai.com/v1"
    )]
    pub openai_base_url: String,

    /// Sampling temperature for chat replies
    #[arg(long, env = "REFLECT_CHAT_TEMPERATURE", default_value = "0.4")]
    pub chat_temperature: f32,

    /// Sampling temperature for summaries
    #[arg(long, env = "REFLECT_SUMMARY_TEMPERATURE", default_value = "0.3")]
    pub summary_temperature: f32,
}
