//! The decode session: header verification, the opcode dispatch loop, and
//! the trailing checksum verdict.

use std::io::Read;

use tracing::{debug, info};

use crate::length;
use crate::object;
use crate::opcode::{module, ObjectType, Opcode};
use crate::reader::RdbReader;
use crate::sink::{ChecksumVerdict, Record, RecordSink};
use crate::string;
use crate::{Error, Result};

const MAGIC: &[u8; 5] = b"REDIS";

/// Newest format version this decoder understands.
const MAX_VERSION: u32 = 11;

/// Versions from here on carry a trailing CRC-64.
const CHECKSUM_MIN_VERSION: u32 = 5;

/// A single-use decode session over one RDB stream.
///
/// The session is synchronous and forward-only: it pulls bytes from the
/// source exactly once, emits records to the sink in stream order, and is
/// consumed by [`decode`](Decoder::decode). Independent sessions share no
/// state and may run on separate threads.
pub struct Decoder<R> {
    reader: RdbReader<R>,
    version: u32,
    database_index: u64,
    pending: PendingHints,
}

/// Hints set by one control opcode and consumed by the next object frame.
/// Cleared after that frame, and by any control opcode that is not itself
/// a hint.
#[derive(Debug, Default)]
struct PendingHints {
    expire_at_ms: Option<u64>,
    idle_seconds: Option<u64>,
    access_frequency: Option<u8>,
}

impl PendingHints {
    fn clear(&mut self) {
        *self = PendingHints::default();
    }
}

impl<R: Read> Decoder<R> {
    pub fn new(src: R) -> Decoder<R> {
        Decoder {
            reader: RdbReader::new(src),
            version: 0,
            database_index: 0,
            pending: PendingHints::default(),
        }
    }

    /// Decode the whole stream, driving `sink` with records, auxiliary
    /// fields, and finally a checksum verdict.
    ///
    /// On error, everything already handed to the sink stays delivered;
    /// the error carries the offset at which decoding stopped.
    pub fn decode(mut self, sink: &mut impl RecordSink) -> Result<()> {
        self.read_header()?;
        info!(version = self.version, "decoding RDB stream");

        loop {
            let frame_offset = self.reader.offset();
            let type_byte = self.reader.read_u8()?;

            match Opcode::from_byte(type_byte) {
                Some(Opcode::Eof) => {
                    self.finish(sink)?;
                    break;
                }
                Some(op) => {
                    self.handle_opcode(op, sink)?;
                    if !op.is_hint() {
                        self.pending.clear();
                    }
                }
                None => self.read_record(type_byte, frame_offset, sink)?,
            }
        }

        info!(offset = self.reader.offset(), "finished RDB stream");
        Ok(())
    }

    fn read_header(&mut self) -> Result<()> {
        let magic = self.reader.read_bytes(MAGIC.len() as u64)?;
        if magic != MAGIC {
            return Err(Error::format(
                0,
                format!("bad magic {:?}", String::from_utf8_lossy(&magic)),
            ));
        }

        let digits = self.reader.read_bytes(4)?;
        let version = std::str::from_utf8(&digits)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                Error::format(
                    MAGIC.len() as u64,
                    format!("bad version {:?}", String::from_utf8_lossy(&digits)),
                )
            })?;

        if version > MAX_VERSION {
            return Err(Error::format(
                MAGIC.len() as u64,
                format!("unsupported version {version} (newest supported is {MAX_VERSION})"),
            ));
        }

        self.version = version;
        Ok(())
    }

    fn handle_opcode(&mut self, op: Opcode, sink: &mut impl RecordSink) -> Result<()> {
        match op {
            Opcode::SelectDb => {
                self.database_index = length::read_length(&mut self.reader)?;
                debug!(db = self.database_index, "select database");
            }
            Opcode::ResizeDb => {
                // Sizing hints only; nothing to act on.
                let keys = length::read_length(&mut self.reader)?;
                let expires = length::read_length(&mut self.reader)?;
                debug!(keys, expires, "resize hint");
            }
            Opcode::Aux => {
                let key = string::read_string(&mut self.reader)?;
                let value = string::read_string(&mut self.reader)?;
                debug!(
                    key = %String::from_utf8_lossy(&key),
                    value = %String::from_utf8_lossy(&value),
                    "auxiliary field"
                );
                sink.aux_field(key, value);
            }
            Opcode::ModuleAux => self.skip_module_aux()?,
            Opcode::ExpireTime => {
                let seconds = self.reader.read_u32_le()? as u64;
                self.pending.expire_at_ms = Some(seconds * 1000);
            }
            Opcode::ExpireTimeMs => {
                self.pending.expire_at_ms = Some(self.reader.read_u64_le()?);
            }
            Opcode::Idle => {
                self.pending.idle_seconds = Some(length::read_length(&mut self.reader)?);
            }
            Opcode::Freq => {
                self.pending.access_frequency = Some(self.reader.read_u8()?);
            }
            Opcode::Eof => unreachable!("EOF is handled by the main loop"),
        }
        Ok(())
    }

    /// Module auxiliary data cannot be interpreted without the module that
    /// wrote it, but its framing is self-describing enough to walk past.
    fn skip_module_aux(&mut self) -> Result<()> {
        let module_id = length::read_length(&mut self.reader)?;
        debug!(module_id, "module auxiliary block");

        loop {
            let opcode_offset = self.reader.offset();
            let opcode = length::read_length(&mut self.reader)?;
            match opcode {
                module::EOF => return Ok(()),
                module::SINT | module::UINT => {
                    let _ = length::read_length(&mut self.reader)?;
                }
                module::FLOAT => {
                    let _ = self.reader.read_f32_le()?;
                }
                module::DOUBLE => {
                    let _ = self.reader.read_f64_le()?;
                }
                module::STRING => {
                    let _ = string::read_string(&mut self.reader)?;
                }
                other => {
                    // Nothing after an unknown payload can be framed again.
                    return Err(Error::format(
                        opcode_offset,
                        format!("unknown module opcode {other}"),
                    ));
                }
            }
        }
    }

    fn read_record(
        &mut self,
        type_byte: u8,
        frame_offset: u64,
        sink: &mut impl RecordSink,
    ) -> Result<()> {
        let object_type = ObjectType::from_byte(type_byte).ok_or_else(|| {
            Error::format(frame_offset, format!("unknown object type code {type_byte}"))
        })?;

        let key = string::read_string(&mut self.reader)?;
        let value = object::read_object(&mut self.reader, object_type)?;

        sink.record(Record {
            database_index: self.database_index,
            key,
            value,
            expire_at_ms: self.pending.expire_at_ms,
            idle_seconds: self.pending.idle_seconds,
            access_frequency: self.pending.access_frequency,
        });
        self.pending.clear();
        Ok(())
    }

    fn finish(&mut self, sink: &mut impl RecordSink) -> Result<()> {
        if self.version < CHECKSUM_MIN_VERSION {
            sink.checksum(ChecksumVerdict::NotPresent);
            return Ok(());
        }

        let computed = self.reader.checksum();
        let stored = self.reader.read_trailer()?;

        let verdict = if stored == 0 {
            // A writer with checksums disabled stores eight zero bytes.
            ChecksumVerdict::NotPresent
        } else if stored == computed {
            ChecksumVerdict::Verified
        } else {
            ChecksumVerdict::Mismatched { stored, computed }
        };
        debug!(?verdict, "checksum");
        sink.checksum(verdict);
        Ok(())
    }
}
