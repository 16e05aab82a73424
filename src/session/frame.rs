// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Stream framing
//!
//! Inside the node a turn's output is a tagged `StreamFrame`, never a magic
//! string. The legacy wire protocol (bare token frames, an `"Error: ..."`
//! frame, and the `"END_STREAM"` sentinel) exists only in `into_text`, the
//! single place frames are encoded for the client.

/// Reserved sentinel frame marking the end of a turn's stream
pub const END_STREAM: &str = "END_STREAM";

/// One frame of a turn's output stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// A content token, forwarded in model emission order
    Token(String),
    /// In-band error notice; the connection stays open
    Error(String),
    /// End of stream for this turn
    End,
}

impl StreamFrame {
    /// Encode the frame as a wire text message
    pub fn into_text(self) -> String {
        match self {
            StreamFrame::Token(token) => token,
            StreamFrame::Error(message) => format!("Error: {}", message),
            StreamFrame::End => END_STREAM.to_string(),
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, StreamFrame::End)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_encodes_as_bare_text() {
        assert_eq!(StreamFrame::Token("Hel".to_string()).into_text(), "Hel");
    }

    #[test]
    fn test_error_encodes_with_prefix() {
        assert_eq!(
            StreamFrame::Error("upstream failed".to_string()).into_text(),
            "Error: upstream failed"
        );
    }

    #[test]
    fn test_end_encodes_as_sentinel() {
        assert_eq!(StreamFrame::End.into_text(), "END_STREAM");
        assert!(StreamFrame::End.is_end());
    }
}
