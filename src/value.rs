use bytes::Bytes;

/// A fully materialized decoded object.
///
/// The on-disk encoding never leaks: a ziplist-encoded hash and a plain
/// hash both decode to [`Value::Hash`]. Entry order is the order the
/// entries appear in the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(Bytes),
    List(Vec<Bytes>),
    Set(Vec<Bytes>),
    Hash(Vec<(Bytes, Bytes)>),
    SortedSet(Vec<(Bytes, f64)>),
}

impl Value {
    /// Number of logical elements (pairs count as one).
    pub fn len(&self) -> usize {
        match self {
            Value::String(_) => 1,
            Value::List(items) => items.len(),
            Value::Set(members) => members.len(),
            Value::Hash(fields) => fields.len(),
            Value::SortedSet(members) => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_counts_logical_elements() {
        assert_eq!(Value::String(Bytes::from("v")).len(), 1);
        assert_eq!(Value::List(vec![Bytes::from("a"), Bytes::from("b")]).len(), 2);
        assert_eq!(
            Value::Hash(vec![(Bytes::from("f"), Bytes::from("v"))]).len(),
            1
        );
        assert_eq!(
            Value::SortedSet(vec![(Bytes::from("m"), 1.0)]).len(),
            1
        );
    }

    #[test]
    fn emptiness() {
        assert!(Value::List(Vec::new()).is_empty());
        assert!(Value::Set(Vec::new()).is_empty());
        assert!(!Value::String(Bytes::new()).is_empty());
    }
}
