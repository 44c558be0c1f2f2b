//! Entry points external automation uses to drive the overlay, plus parsing
//! for the text forms those commands arrive in.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{LowerThirdError, Result};

/// Artist/song pair carried by `play` and `update`. Absent fields fall back
/// to the configured placeholders when the cycle starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<String>,
}

impl AnnouncementRequest {
    pub fn new(artist: impl Into<String>, song: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            song: Some(song.into()),
        }
    }

    pub fn artist_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.artist.as_deref().unwrap_or(fallback)
    }

    pub fn song_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.song.as_deref().unwrap_or(fallback)
    }

    /// Parses a template data payload.
    ///
    /// Accepts a JSON object, a JSON string that itself holds a JSON object
    /// (the form playout automation sends after encoding twice), or an empty
    /// payload. Strings are kept as given; `null` and missing fields become
    /// `None`, and numbers or booleans are rendered as text.
    pub fn from_template_data(data: &str) -> Result<Self> {
        let data = data.trim();
        if data.is_empty() {
            return Ok(Self::default());
        }

        match serde_json::from_str::<Value>(data)? {
            Value::Object(fields) => Ok(Self::from_fields(&fields)),
            Value::Null => Ok(Self::default()),
            Value::String(inner) => {
                let inner = inner.trim();
                if inner.is_empty() {
                    return Ok(Self::default());
                }
                match serde_json::from_str::<Value>(inner) {
                    Ok(Value::Object(fields)) => Ok(Self::from_fields(&fields)),
                    _ => Err(LowerThirdError::msg(format!(
                        "template data string does not contain a JSON object: {inner}"
                    ))),
                }
            }
            other => Err(LowerThirdError::msg(format!(
                "template data must be a JSON object, got {other}"
            ))),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            artist: fields.get("artist").and_then(text_value),
            song: fields.get("song").and_then(text_value),
        }
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Receiver of the three overlay commands. Commands may arrive at any time,
/// in any order, any number of times.
pub trait CommandTarget {
    /// Starts a full announce cycle, superseding any cycle in progress.
    fn play(&mut self, request: AnnouncementRequest);
    /// Same as [`CommandTarget::play`]: a full restart with the new text.
    fn update(&mut self, request: AnnouncementRequest);
    /// Cancels whatever is running and hides the overlay.
    fn stop(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Play(AnnouncementRequest),
    Update(AnnouncementRequest),
    Stop,
}

impl Command {
    pub fn dispatch<T: CommandTarget + ?Sized>(self, target: &mut T) {
        match self {
            Command::Play(request) => target.play(request),
            Command::Update(request) => target.update(request),
            Command::Stop => target.stop(),
        }
    }

    /// Parses one bridge line.
    ///
    /// Two forms are understood:
    /// - `play [data]`, `update [data]`, `stop` (verbs are case-insensitive)
    /// - `CG <channel> ADD <layer> <template> <play-on-load> [data]`,
    ///   `CG <channel> UPDATE <layer> [data]`, `CG <channel> STOP <layer>` and
    ///   `CG <channel> CLEAR`
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = split_token(line);

        if verb.eq_ignore_ascii_case("play") {
            Ok(Command::Play(AnnouncementRequest::from_template_data(rest)?))
        } else if verb.eq_ignore_ascii_case("update") {
            Ok(Command::Update(AnnouncementRequest::from_template_data(rest)?))
        } else if verb.eq_ignore_ascii_case("stop") {
            Ok(Command::Stop)
        } else if verb.eq_ignore_ascii_case("cg") {
            parse_cg(rest).ok_or_else(|| LowerThirdError::Command(line.to_string()))?
        } else {
            Err(LowerThirdError::Command(line.to_string()))
        }
    }
}

impl FromStr for Command {
    type Err = LowerThirdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_line(s)
    }
}

/// `None` means the line is not a CG command this overlay handles.
fn parse_cg(rest: &str) -> Option<Result<Command>> {
    let (_channel, rest) = split_token(rest);
    let (subcommand, rest) = split_token(rest);
    if subcommand.is_empty() {
        return None;
    }

    let command = match subcommand.to_ascii_uppercase().as_str() {
        "ADD" => {
            let (_layer, rest) = split_token(rest);
            let (_template, rest) = split_token(rest);
            let (_play_on_load, data) = split_token(rest);
            AnnouncementRequest::from_template_data(data).map(Command::Play)
        }
        "UPDATE" => {
            let (_layer, data) = split_token(rest);
            AnnouncementRequest::from_template_data(data).map(Command::Update)
        }
        "STOP" | "CLEAR" => Ok(Command::Stop),
        _ => return None,
    };
    Some(command)
}

/// Splits off the first token. A token starting with `"` runs to the next
/// unescaped quote.
fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    if input.is_empty() {
        return ("", "");
    }

    let end = if input.starts_with('"') {
        let mut escaped = false;
        input
            .char_indices()
            .skip(1)
            .find(|&(_, c)| {
                let closes = c == '"' && !escaped;
                escaped = c == '\\' && !escaped;
                closes
            })
            .map(|(index, _)| index + 1)
            .unwrap_or(input.len())
    } else {
        input.find(char::is_whitespace).unwrap_or(input.len())
    };

    (&input[..end], input[end..].trim_start())
}
