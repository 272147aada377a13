//! CRC-64 with the "Jones" polynomial, the variant Redis appends to RDB
//! files. Reflected, initial value 0, no final xor.

use std::sync::LazyLock;

/// Jones polynomial in reflected (bit-reversed) form.
const POLY: u64 = 0x95AC9329AC4BC9B5;

static TABLE: LazyLock<[u64; 256]> = LazyLock::new(|| {
    let mut table = [0u64; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        let mut crc = i as u64;
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
        *slot = crc;
    }
    table
});

/// Fold `data` into a running checksum.
pub fn update(crc: u64, data: &[u8]) -> u64 {
    let mut crc = crc;
    for byte in data {
        let idx = ((crc ^ (*byte as u64)) & 0xFF) as usize;
        crc = TABLE[idx] ^ (crc >> 8);
    }
    crc
}
