use std::sync::OnceLock;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "chatstream")]
#[command(about = "stream a chat completion and print the answer as it arrives")]
pub struct Config {
    #[arg(help = "user message to send")]
    pub prompt: String,

    #[arg(
        long,
        default_value = "http://localhost:8000",
        help = "chat server base url"
    )]
    pub base_url: String,

    #[arg(long, default_value = "default", help = "model name sent with the request")]
    pub model: String,

    #[arg(long, help = "optional system message prepended to the conversation")]
    pub system: Option<String>,

    #[arg(
        long,
        default_value = "warn",
        help = "log level (off, error, warn, info, debug, trace)"
    )]
    pub log_level: String,

    #[arg(long, help = "print captured thinking blocks to stderr")]
    pub show_thinking: bool,

    #[arg(
        long,
        default_value = "262144",
        help = "initial buffer size in bytes for sse message assembly (capacity hint)"
    )]
    pub max_buffer_size: usize,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub max_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: 64 * 1024,
        }
    }
}

static RUNTIME_CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

pub fn init_runtime_config(config: RuntimeConfig) {
    RUNTIME_CONFIG.set(config).ok();
}

pub fn get_runtime_config() -> &'static RuntimeConfig {
    RUNTIME_CONFIG.get().unwrap_or_else(|| {
        static DEFAULT: OnceLock<RuntimeConfig> = OnceLock::new();
        DEFAULT.get_or_init(RuntimeConfig::default)
    })
}

pub fn validate_base_url(base_url: &str) -> Result<(), String> {
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(format!(
            "invalid base URL (must start with http:// or https://): {}",
            base_url
        ));
    }
    if let Err(e) = url::Url::parse(base_url) {
        return Err(format!("invalid base URL format: {}", e));
    }
    Ok(())
}

pub fn validate_config(config: &Config) -> Result<(), String> {
    validate_base_url(&config.base_url)?;
    if config.model.trim().is_empty() {
        return Err("model name must not be empty".to_string());
    }
    if config.prompt.trim().is_empty() {
        return Err("prompt must not be empty".to_string());
    }
    Ok(())
}
