//! Host relay wire format
//!
//! Each frame is a 4-byte big-endian length followed by that many bytes of
//! UTF-8 text. The text is the whole message:
//! - `answer: <response>` the expected response to the clue now in play
//! - `rangin` a player has rung in
//! - `continue` the game is waiting for the host to move on
//! - `True` / `False` the host's verdict
//!
//! Anything else is free text shown to the other side.

use std::io::{self, Read, Write};

/// Largest frame either side will accept
pub const MAX_FRAME: usize = 64 * 1024;

const ANSWER_PREFIX: &str = "answer:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Expected response for the clue in play
    Answer(String),
    /// Somebody rang in; the host should listen
    RangIn,
    /// The game is waiting to continue
    Continue,
    /// Host verdict on the response
    Verdict(bool),
    /// Free text
    Text(String),
}

impl Message {
    pub fn to_text(&self) -> String {
        match self {
            Message::Answer(response) => format!("{} {}", ANSWER_PREFIX, response),
            Message::RangIn => "rangin".to_string(),
            Message::Continue => "continue".to_string(),
            Message::Verdict(true) => "True".to_string(),
            Message::Verdict(false) => "False".to_string(),
            Message::Text(text) => text.clone(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed {
            "rangin" => return Message::RangIn,
            "continue" => return Message::Continue,
            "True" => return Message::Verdict(true),
            "False" => return Message::Verdict(false),
            _ => {}
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with(ANSWER_PREFIX) {
            return Message::Answer(trimmed[ANSWER_PREFIX.len()..].trim().to_string());
        }
        Message::Text(trimmed.to_string())
    }

    /// Serialize to a length-prefixed frame
    pub fn to_bytes(&self) -> Vec<u8> {
        let text = self.to_text();
        let len = text.len() as u32;
        let mut bytes = Vec::with_capacity(4 + text.len());
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.extend_from_slice(text.as_bytes());
        bytes
    }

    /// Deserialize one frame, returning the message and bytes consumed
    pub fn from_bytes(bytes: &[u8]) -> io::Result<(Self, usize)> {
        if bytes.len() < 4 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "need 4 bytes for length"));
        }
        let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if len > MAX_FRAME {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "frame too large"));
        }
        if bytes.len() < 4 + len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "incomplete frame"));
        }
        let text = std::str::from_utf8(&bytes[4..4 + len])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok((Self::from_text(text), 4 + len))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())?;
        writer.flush()
    }

    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_FRAME {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "frame too large"));
        }

        let mut body = vec![0u8; len];
        reader.read_exact(&mut body)?;

        let text = std::str::from_utf8(&body).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Self::from_text(text))
    }
}
