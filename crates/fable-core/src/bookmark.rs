//! Player progress bookmarks.
//!
//! State travels as `state=<base64(JSON)>`, appended to a `#section` fragment:
//! `#cave?state=eyJyb3BlIjoxfQ==`.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{CoreError, CoreResult};
use crate::state::State;

const STATE_PREFIX: &str = "state=";

/// Encode a state as standard base64 of its JSON form.
pub fn encode_state(state: &State) -> CoreResult<String> {
    let json = serde_json::to_string(state)?;
    Ok(STANDARD.encode(json))
}

/// Encode a state as a `state=` query parameter.
pub fn state_query(state: &State) -> CoreResult<String> {
    Ok(format!("{STATE_PREFIX}{}", encode_state(state)?))
}

/// Decode a state payload, with or without the `state=` prefix.
///
/// Empty input decodes to an empty state.
pub fn decode_state(text: &str) -> CoreResult<State> {
    let text = text.trim();
    let payload = text.strip_prefix(STATE_PREFIX).unwrap_or(text);
    if payload.is_empty() {
        return Ok(State::new());
    }
    let bytes = STANDARD.decode(payload)?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

/// A section plus the state the player had when they reached it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    /// Section the player is on.
    pub section_id: String,
    /// Player state at that point.
    pub state: State,
}

impl Bookmark {
    /// Create a bookmark.
    pub fn new(section_id: impl Into<String>, state: State) -> Self {
        Self {
            section_id: section_id.into(),
            state,
        }
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = state_query(&self.state).map_err(|_| fmt::Error)?;
        write!(f, "#{}?{query}", self.section_id)
    }
}

impl FromStr for Bookmark {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rest = s.strip_prefix('#').unwrap_or(s);
        let (section_id, query) = match rest.split_once('?') {
            Some((id, query)) => (id, query),
            None => (rest, ""),
        };
        if section_id.is_empty() {
            return Err(CoreError::InvalidBookmark(s.to_string()));
        }
        Ok(Self {
            section_id: section_id.to_string(),
            state: decode_state(query)?,
        })
    }
}
