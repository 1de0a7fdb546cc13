//! Per-request event buffer.
//!
//! Handlers and middleware add named events to one of three phases of the
//! client-side update lifecycle. At the end of the request the buffer is
//! committed once, either as one JSON header per phase (partial updates) or as
//! a single inert markup node (full-page loads).
//!
//! Events are unique per `(phase, name)`: adding the same name twice in one
//! phase replaces the payload.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::transport::{HX_TRIGGER, HX_TRIGGER_AFTER_SETTLE, HX_TRIGGER_AFTER_SWAP};

/// Id of the markup node carrying events on full-page loads.
pub const INITIAL_EVENTS_ID: &str = "initial-events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Immediate,
    AfterSwap,
    AfterSettle,
}

impl Phase {
    /// Commit order.
    pub const ALL: [Phase; 3] = [Phase::Immediate, Phase::AfterSwap, Phase::AfterSettle];

    pub fn header_name(self) -> HeaderName {
        HeaderName::from_static(match self {
            Phase::Immediate => HX_TRIGGER,
            Phase::AfterSwap => HX_TRIGGER_AFTER_SWAP,
            Phase::AfterSettle => HX_TRIGGER_AFTER_SETTLE,
        })
    }

    fn index(self) -> usize {
        match self {
            Phase::Immediate => 0,
            Phase::AfterSwap => 1,
            Phase::AfterSettle => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    phases: [Map<String, Value>; 3],
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event; a second add for the same name in the same phase wins.
    pub fn add(&mut self, phase: Phase, name: impl Into<String>, payload: impl Into<Value>) {
        self.phases[phase.index()].insert(name.into(), payload.into());
    }

    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(Map::is_empty)
    }

    pub fn phase_is_empty(&self, phase: Phase) -> bool {
        self.phases[phase.index()].is_empty()
    }

    pub fn events(&self, phase: Phase) -> Vec<Event> {
        self.phases[phase.index()]
            .iter()
            .map(|(name, payload)| Event {
                name: name.clone(),
                payload: payload.clone(),
            })
            .collect()
    }

    /// JSON object `{name: payload}` for one phase, or `None` when the phase is empty.
    ///
    /// Non-ASCII characters are escaped so the result is always a valid header value.
    pub fn commit(&self, phase: Phase) -> Option<String> {
        let events = &self.phases[phase.index()];
        if events.is_empty() {
            return None;
        }

        Some(ascii_json(&Value::Object(events.clone())))
    }

    /// Writes one trigger header per non-empty phase.
    pub fn write_headers(&self, headers: &mut HeaderMap) {
        for phase in Phase::ALL {
            let Some(json) = self.commit(phase) else {
                continue;
            };

            match HeaderValue::from_str(&json) {
                Ok(value) => {
                    headers.insert(phase.header_name(), value);
                }
                Err(e) => {
                    tracing::warn!(phase = ?phase, error = %e, "Dropping unencodable event header");
                }
            }
        }
    }

    /// Inert, self-removing markup node for full-page loads, or `None` when empty.
    ///
    /// The node holds every event as `[{name, payload}]` in phase order. The
    /// client script parses it on load and removes it from the document.
    pub fn commit_markup(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let ordered: Vec<Event> = Phase::ALL
            .into_iter()
            .flat_map(|phase| self.events(phase))
            .collect();
        let json = serde_json::to_value(&ordered).unwrap_or(Value::Array(Vec::new()));

        Some(format!(
            r#"<script type="application/json" id="{INITIAL_EVENTS_ID}">{}</script>"#,
            ascii_json(&json).replace("</", r"<\/")
        ))
    }
}

fn ascii_json(value: &Value) -> String {
    let raw = value.to_string();
    if raw.is_ascii() {
        return raw;
    }

    let mut out = String::with_capacity(raw.len() + 16);
    for ch in raw.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
