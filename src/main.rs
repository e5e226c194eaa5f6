use std::io::Write;

use clap::Parser;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use chatstream::config::{self, Config, RuntimeConfig};
use chatstream::logging::{LogConfig, sanitize_log_message};
use chatstream::{ChatClient, ChatMessage, ChatRequest, Disclosure, StreamChunk, Transcript};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::parse();

    config::validate_config(&cfg)?;

    setup_logging(&cfg.log_level)?;

    let debug_enabled =
        cfg.log_level.eq_ignore_ascii_case("debug") || cfg.log_level.eq_ignore_ascii_case("trace");
    LogConfig::init(debug_enabled);

    config::init_runtime_config(RuntimeConfig {
        max_buffer_size: cfg.max_buffer_size,
    });

    log::debug!("chatstream {}", chatstream::VERSION);

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupted, cancelling stream");
            ctrl_c_token.cancel();
        }
    });

    let mut messages = Vec::new();
    if let Some(system) = &cfg.system {
        messages.push(ChatMessage::system(system.as_str()));
    }
    messages.push(ChatMessage::user(cfg.prompt.as_str()));

    let client = ChatClient::new(reqwest::Client::new(), &cfg.base_url);
    let mut chunks = client.stream_chat_with_cancel(ChatRequest::new(&cfg.model, messages), token);

    let mut transcript = Transcript::new();
    let mut disclosure = Disclosure::new();
    let mut stdout = std::io::stdout();

    while let Some(item) = chunks.next().await {
        let chunk = match item {
            Ok(chunk) => chunk,
            Err(err) => {
                writeln!(stdout)?;
                eprintln!("error: {}", err.message);
                std::process::exit(1);
            }
        };

        if let StreamChunk::Trace(trace) = &chunk {
            log::debug!(
                "trace: {} agent={} tool={}",
                sanitize_log_message(&trace.event),
                trace.agent.as_deref().unwrap_or("-"),
                trace.tool.as_deref().unwrap_or("-")
            );
        }

        if transcript.push(chunk)
            && let Some(fresh) = disclosure.advance(&transcript.parsed())
        {
            write!(stdout, "{}", fresh)?;
            stdout.flush()?;
        }
    }

    let parsed = transcript.parsed();
    if let Some(rest) = parsed.visible.strip_prefix(disclosure.shown()) {
        write!(stdout, "{}", rest)?;
    } else {
        // visible text diverged mid-stream; reprint it whole
        write!(stdout, "\n{}", parsed.visible)?;
    }
    writeln!(stdout)?;

    if cfg.show_thinking {
        for (index, block) in parsed.thinking.iter().enumerate() {
            eprintln!("--- thinking {} ---\n{}", index + 1, block);
        }
        if parsed.is_thinking {
            eprintln!("--- (thinking block was not closed) ---");
        }
    }

    if let Some(conversation_id) = transcript.conversation_id() {
        log::info!("conversation: {}", conversation_id);
    }

    Ok(())
}

fn setup_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = log_level
        .to_lowercase()
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Warn);

    fern::Dispatch::new()
        .format(|out, message, record| {
            let level_str = match record.level() {
                log::Level::Error => "\x1b[1;31merror:\x1b[0m",
                log::Level::Warn => "\x1b[1;33mwarn:\x1b[0m",
                log::Level::Info => "\x1b[1;32minfo:\x1b[0m",
                log::Level::Debug => "\x1b[1;34mdebug:\x1b[0m",
                log::Level::Trace => "\x1b[1;35mtrace:\x1b[0m",
            };
            out.finish(format_args!("{} {}", level_str, message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
