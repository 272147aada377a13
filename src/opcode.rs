//! Type-byte dispatch tables. Every frame in the body of an RDB stream
//! starts with one byte that is either a reserved control opcode (247-255)
//! or an object type code; representing both as explicit enumerations keeps
//! unknown bytes a forced error path instead of a fall-through.

/// Reserved control opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Module auxiliary block.
    ModuleAux, // 247
    /// LRU idle-time hint for the next object.
    Idle, // 248
    /// LFU frequency hint for the next object.
    Freq, // 249
    /// Auxiliary key/value metadata field.
    Aux, // 250
    /// Hash-table resize hint for the current database.
    ResizeDb, // 251
    /// Millisecond-precision expiry for the next object.
    ExpireTimeMs, // 252
    /// Second-precision expiry for the next object.
    ExpireTime, // 253
    /// Select the database the following objects belong to.
    SelectDb, // 254
    /// End of the stream body.
    Eof, // 255
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            247 => Some(Opcode::ModuleAux),
            248 => Some(Opcode::Idle),
            249 => Some(Opcode::Freq),
            250 => Some(Opcode::Aux),
            251 => Some(Opcode::ResizeDb),
            252 => Some(Opcode::ExpireTimeMs),
            253 => Some(Opcode::ExpireTime),
            254 => Some(Opcode::SelectDb),
            255 => Some(Opcode::Eof),
            _ => None,
        }
    }

    /// A hint opcode sets pending per-key state; any other control opcode
    /// clears it.
    pub fn is_hint(&self) -> bool {
        matches!(
            self,
            Opcode::Idle | Opcode::Freq | Opcode::ExpireTime | Opcode::ExpireTimeMs
        )
    }
}

/// Opcodes inside a module auxiliary block.
pub mod module {
    pub const EOF: u64 = 0;
    pub const SINT: u64 = 1;
    pub const UINT: u64 = 2;
    pub const FLOAT: u64 = 3;
    pub const DOUBLE: u64 = 4;
    pub const STRING: u64 = 5;
}

/// Object type codes, covering the plain type families and the compact
/// encodings each of them may be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    String,            // 0
    List,              // 1
    Set,               // 2
    SortedSet,         // 3, textual scores
    Hash,              // 4
    SortedSet2,        // 5, binary double scores
    ListZiplist,       // 10
    SetIntset,         // 11
    SortedSetZiplist,  // 12
    HashZiplist,       // 13
    ListQuicklist,     // 14, quicklist of ziplist nodes
    HashListpack,      // 16
    SortedSetListpack, // 17
    ListQuicklist2,    // 18, quicklist of plain/listpack nodes
    SetListpack,       // 20
}

impl ObjectType {
    pub fn from_byte(byte: u8) -> Option<ObjectType> {
        match byte {
            0 => Some(ObjectType::String),
            1 => Some(ObjectType::List),
            2 => Some(ObjectType::Set),
            3 => Some(ObjectType::SortedSet),
            4 => Some(ObjectType::Hash),
            5 => Some(ObjectType::SortedSet2),
            10 => Some(ObjectType::ListZiplist),
            11 => Some(ObjectType::SetIntset),
            12 => Some(ObjectType::SortedSetZiplist),
            13 => Some(ObjectType::HashZiplist),
            14 => Some(ObjectType::ListQuicklist),
            16 => Some(ObjectType::HashListpack),
            17 => Some(ObjectType::SortedSetListpack),
            18 => Some(ObjectType::ListQuicklist2),
            20 => Some(ObjectType::SetListpack),
            _ => None,
        }
    }
}
