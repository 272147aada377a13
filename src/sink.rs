use bytes::Bytes;

use crate::value::Value;

/// One decoded key with everything the stream attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub database_index: u64,
    pub key: Bytes,
    pub value: Value,
    /// Absolute expiry in milliseconds since the epoch, if one was pending.
    pub expire_at_ms: Option<u64>,
    /// LRU idle time hint, if one was pending.
    pub idle_seconds: Option<u64>,
    /// LFU access frequency hint, if one was pending.
    pub access_frequency: Option<u8>,
}

/// Outcome of the trailing checksum comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumVerdict {
    Verified,
    Mismatched { stored: u64, computed: u64 },
    /// Stream version predates checksums, or the writer had them disabled
    /// (eight zero bytes).
    NotPresent,
}

/// Receiver for everything a decode session produces.
///
/// A sink is driven by exactly one session at a time: records and auxiliary
/// fields arrive in stream order, then a single checksum verdict closes the
/// session. Records emitted before a failure stay delivered; the sink is
/// never asked to take anything back.
pub trait RecordSink {
    fn record(&mut self, record: Record);

    fn aux_field(&mut self, key: Bytes, value: Bytes);

    fn checksum(&mut self, verdict: ChecksumVerdict);
}

/// A sink that keeps everything in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<Record>,
    pub aux_fields: Vec<(Bytes, Bytes)>,
    pub verdict: Option<ChecksumVerdict>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }
}

impl RecordSink for MemorySink {
    fn record(&mut self, record: Record) {
        self.records.push(record);
    }

    fn aux_field(&mut self, key: Bytes, value: Bytes) {
        self.aux_fields.push((key, value));
    }

    fn checksum(&mut self, verdict: ChecksumVerdict) {
        self.verdict = Some(verdict);
    }
}
