//! Chat relay rendering.
//!
//! Events become single `PRIVMSG` lines using mIRC formatting codes. Lines are
//! capped at `max_line_bytes` (the protocol allows 512 including CRLF) and
//! never split a UTF-8 sequence.

use async_trait::async_trait;
use tokio::sync::mpsc;

use meshrelay_core::dispatch::event::node_id;
use meshrelay_core::{Event, PacketHeader};

use crate::config::RelaySection;
use crate::ingest::EventSink;
use crate::sinks::SinkError;

pub const BOLD: &str = "\x02";
pub const RESET: &str = "\x0f";

pub const WHITE: &str = "00";
pub const GREEN: &str = "03";
pub const RED: &str = "04";
pub const PURPLE: &str = "06";
pub const ORANGE: &str = "07";
pub const YELLOW: &str = "08";
pub const CYAN: &str = "10";
pub const LIGHT_BLUE: &str = "12";
pub const GREY: &str = "14";

/// Wrap `msg` in a color code, resetting afterwards.
pub fn color(msg: &str, fg: &str, bg: Option<&str>) -> String {
    match bg {
        Some(bg) => format!("\x03{fg},{bg}{msg}{RESET}"),
        None => format!("\x03{fg}{msg}{RESET}"),
    }
}

pub fn bold(msg: &str) -> String {
    format!("{BOLD}{msg}{RESET}")
}

/// Longest prefix of `s` that fits in `max` bytes.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// Mesh text is untrusted; a stray CR/LF would start a new protocol command
// and NUL is not allowed anywhere in a line.
fn one_line(s: &str) -> String {
    s.chars()
        .filter(|&c| c != '\0')
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

fn route(h: &PacketHeader) -> String {
    let to = if h.is_broadcast() {
        "^all".to_string()
    } else {
        node_id(h.to)
    };
    format!("{} -> {}", color(&node_id(h.from), CYAN, None), color(&to, GREY, None))
}

fn coord(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.5}")).unwrap_or_else(|| "?".into())
}

/// Message body for an event, or `None` when the kind is not relayed.
pub fn render(event: &Event, include_diagnostics: bool) -> Option<String> {
    let body = match event {
        Event::TextMessage { header, text } => {
            format!("{} {}", route(header), one_line(text))
        }
        Event::Position { header, position } => {
            let mut s = format!(
                "{} {} {},{}",
                color("[pos]", GREEN, None),
                route(header),
                coord(position.latitude),
                coord(position.longitude)
            );
            if let Some(alt) = position.altitude {
                s.push_str(&format!(" {alt}m"));
            }
            s
        }
        Event::NodeInfo { header, node } => format!(
            "{} {} {} ({}) {}",
            color("[node]", PURPLE, None),
            route(header),
            bold(&one_line(&node.long_name)),
            one_line(&node.short_name),
            color(node.role, LIGHT_BLUE, None)
        ),
        Event::UnrecognizedPort {
            header,
            portnum,
            raw,
        } if include_diagnostics => format!(
            "{} {} {} bytes",
            color(&format!("[port {portnum}]"), YELLOW, None),
            route(header),
            raw.len()
        ),
        Event::MalformedPayload {
            header,
            stage,
            reason,
            ..
        } if include_diagnostics => {
            let tag = color(&format!("[malformed {}]", stage.as_str()), WHITE, Some(RED));
            match header {
                Some(h) => format!("{} {} {}", tag, route(h), one_line(reason)),
                None => format!("{} {}", tag, color(&one_line(reason), ORANGE, None)),
            }
        }
        _ => return None,
    };
    Some(body)
}

/// Full protocol line for `channel`, capped at `max_line_bytes`.
pub fn privmsg(channel: &str, body: &str, max_line_bytes: usize) -> String {
    let line = format!("PRIVMSG {channel} :{body}");
    truncate_utf8(&line, max_line_bytes).to_string()
}

/// Pushes rendered lines into a bounded queue drained by the chat client.
pub struct ChatRelaySink {
    tx: mpsc::Sender<String>,
    channel: String,
    max_line_bytes: usize,
    include_diagnostics: bool,
}

impl ChatRelaySink {
    pub fn new(cfg: &RelaySection) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(cfg.queue_depth.max(1));
        (
            Self {
                tx,
                channel: cfg.channel.clone(),
                max_line_bytes: cfg.max_line_bytes,
                include_diagnostics: cfg.include_diagnostics,
            },
            rx,
        )
    }
}

#[async_trait]
impl EventSink for ChatRelaySink {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn deliver(&self, event: &Event) -> Result<(), SinkError> {
        let Some(body) = render(event, self.include_diagnostics) else {
            return Ok(());
        };
        let line = privmsg(&self.channel, &body, self.max_line_bytes);
        self.tx.try_send(line).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SinkError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}
