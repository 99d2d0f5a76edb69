//! Reply interpretation: one detectIntent response → zero or more history messages.
//!
//! Only the first declared response message is considered, and only the first
//! `richContent` group of its payload — the shape the agent console produces
//! for this client. Elements the interpreter cannot read are skipped with a
//! warning; a malformed payload yields no card instead of aborting the turn.

use crate::agent::DetectIntentResponse;
use crate::history::Message;
use serde_json::Value;

/// Most quick-reply chips a card carries; extra options are dropped.
pub const MAX_CHIPS: usize = 3;

/// Map one turn's response to history entries: an Agent message for the plain
/// text (when present), then a Card message derived from the rich payload
/// (when present).
pub fn interpret(response: &DetectIntentResponse) -> Vec<Message> {
    let mut out = Vec::new();
    let Some(first) = response.query_result.response_messages.first() else {
        log::warn!("reply: response carried no messages");
        return out;
    };

    if let Some(ref text) = first.text {
        match text.text.first() {
            Some(line) => out.push(Message::agent(line.clone())),
            None => log::warn!("reply: text message had no entries, skipping"),
        }
    }

    if let Some(ref payload) = first.payload {
        if let Some(card) = interpret_payload(payload) {
            out.push(card);
        }
    }

    out
}

/// Build the Card message from a rich payload. Returns None when the payload
/// has no readable `richContent` group.
fn interpret_payload(payload: &Value) -> Option<Message> {
    let group = payload
        .get("richContent")
        .and_then(|v| v.as_array())
        .and_then(|groups| groups.first())
        .and_then(|v| v.as_array());
    let Some(group) = group else {
        log::warn!("reply: payload without a richContent group, dropping card");
        return None;
    };

    let mut descriptions: Vec<String> = Vec::new();
    let mut actions: Vec<String> = Vec::new();
    let mut link = String::new();

    for element in group {
        // Elements without a type are ignored, same as the upstream console contract.
        let Some(kind) = element.get("type").and_then(|v| v.as_str()) else {
            continue;
        };
        match kind {
            "description" => {
                let line = element
                    .get("text")
                    .and_then(|v| v.as_array())
                    .and_then(|lines| lines.first())
                    .and_then(|v| v.as_str());
                match line {
                    Some(s) => descriptions.push(s.to_string()),
                    None => log::warn!("reply: description element without text, skipping"),
                }
            }
            "chips" => {
                let Some(options) = element.get("options").and_then(|v| v.as_array()) else {
                    log::warn!("reply: chips element without options, skipping");
                    continue;
                };
                for option in options {
                    match option.get("text").and_then(|v| v.as_str()) {
                        Some(s) if actions.len() < MAX_CHIPS => actions.push(s.to_string()),
                        Some(s) => log::warn!("reply: dropping chip past {}: {}", MAX_CHIPS, s),
                        None => log::warn!("reply: chip option without text, skipping"),
                    }
                }
            }
            "button" => {
                // Last button wins when the payload carries several.
                match element.get("link").and_then(|v| v.as_str()) {
                    Some(s) => link = s.to_string(),
                    None => log::warn!("reply: button element without link, skipping"),
                }
            }
            other => log::debug!("reply: ignoring rich element type {}", other),
        }
    }

    Some(Message::card(descriptions.join(" "), link, actions))
}
