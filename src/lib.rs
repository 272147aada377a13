pub mod crc64;
pub mod decoder;
pub mod encodings;
pub mod error;
pub mod length;
pub mod lzf;
pub mod object;
pub mod opcode;
pub mod reader;
pub mod sink;
pub mod string;
pub mod value;

pub use decoder::Decoder;
pub use error::Error;
pub use sink::{ChecksumVerdict, MemorySink, Record, RecordSink};
pub use value::Value;

pub type Result<T> = std::result::Result<T, Error>;
