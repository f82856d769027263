//! Ingest policy: topic filter matching and envelope size limit.
//!
//! Filters use pub/sub wildcard syntax: `+` matches exactly one level and a
//! trailing `#` matches the remaining levels (including none).

use meshrelay_core::error::{MeshRelayError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Level {
    Exact(String),
    /// `+`
    Single,
    /// `#` (only valid as the last level)
    Rest,
}

/// Compiled topic filter.
#[derive(Debug, Clone)]
pub struct TopicFilter {
    raw: String,
    levels: Vec<Level>,
}

impl TopicFilter {
    pub fn compile(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(MeshRelayError::BadConfig("topic filter must not be empty".into()));
        }
        let parts: Vec<&str> = raw.split('/').collect();
        let mut levels = Vec::with_capacity(parts.len());
        for (i, p) in parts.iter().enumerate() {
            let level = match *p {
                "+" => Level::Single,
                "#" if i + 1 == parts.len() => Level::Rest,
                "#" => {
                    return Err(MeshRelayError::BadConfig(format!(
                        "invalid topic filter: {raw} ('#' must be the last level)"
                    )))
                }
                s if s.contains('+') || s.contains('#') => {
                    return Err(MeshRelayError::BadConfig(format!(
                        "invalid topic filter: {raw} (wildcards must fill a whole level)"
                    )))
                }
                s => Level::Exact(s.to_string()),
            };
            levels.push(level);
        }
        Ok(Self {
            raw: raw.to_string(),
            levels,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, topic: &str) -> bool {
        let mut topic_levels = topic.split('/');
        for level in &self.levels {
            match level {
                Level::Rest => return true,
                Level::Single => {
                    if topic_levels.next().is_none() {
                        return false;
                    }
                }
                Level::Exact(want) => match topic_levels.next() {
                    Some(got) if got == want => {}
                    _ => return false,
                },
            }
        }
        topic_levels.next().is_none()
    }
}

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Pass,
    Drop { reason: &'static str },
}

/// Compiled ingest policy. Construct once at startup, then share via Arc.
#[derive(Debug, Clone)]
pub struct IngestPolicy {
    filter: TopicFilter,
    max_envelope_bytes: usize,
}

impl IngestPolicy {
    pub fn new(topic_filter: &str, max_envelope_bytes: usize) -> Result<Self> {
        Ok(Self {
            filter: TopicFilter::compile(topic_filter)?,
            max_envelope_bytes,
        })
    }

    pub fn topic_filter(&self) -> &TopicFilter {
        &self.filter
    }

    /// Cheap checks before any decode work.
    pub fn check(&self, topic: &str, bytes_len: usize) -> PolicyDecision {
        if bytes_len > self.max_envelope_bytes {
            return PolicyDecision::Drop {
                reason: "envelope_too_large",
            };
        }
        if bytes_len == 0 {
            return PolicyDecision::Drop { reason: "empty" };
        }
        if !self.filter.matches(topic) {
            return PolicyDecision::Drop {
                reason: "topic_filtered",
            };
        }
        PolicyDecision::Pass
    }
}
