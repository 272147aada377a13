use thiserror::Error as ThisError;

/// Errors surfaced while decoding an RDB stream.
///
/// Every variant carries the byte offset at which decoding stopped. The
/// format has no self-delimiting recovery point, so all of these are fatal
/// to the session; records emitted before the failure stay delivered.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The stream violates the RDB grammar: bad magic, malformed version,
    /// unknown opcode or type code, or a field truncated mid-read.
    #[error("format error at byte {offset}: {message}")]
    Format { offset: u64, message: String },

    /// A declared length does not fit the actual payload, an embedded blob
    /// fails its own framing, or LZF decompression would overrun its bounds.
    #[error("corrupt data at byte {offset}: {message}")]
    CorruptData { offset: u64, message: String },

    /// The underlying byte source failed for reasons other than running dry.
    #[error("io error at byte {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn format(offset: u64, message: impl Into<String>) -> Error {
        Error::Format {
            offset,
            message: message.into(),
        }
    }

    pub fn corrupt(offset: u64, message: impl Into<String>) -> Error {
        Error::CorruptData {
            offset,
            message: message.into(),
        }
    }

    /// Byte offset at which the error occurred.
    pub fn offset(&self) -> u64 {
        match self {
            Error::Format { offset, .. }
            | Error::CorruptData { offset, .. }
            | Error::Io { offset, .. } => *offset,
        }
    }
}
