//! In-memory radix tree over keywords
//!
//! Children are kept in insertion order, which makes compilation
//! deterministic: the same article sequence always yields the same tree
//! and therefore the same file. The per-node value is set exactly once,
//! when the key is inserted.

use std::fmt;

use crate::base::Len;

/// A node of the radix tree. `key` is the fragment on the incoming edge;
/// the full key of a node is the concatenation of fragments from the root.
pub struct RadixNode<V> {
    /// Edge label (empty for the root)
    pub key: String,

    /// Some if an inserted key ends exactly here
    pub value: Option<V>,

    /// Child nodes, in insertion order
    pub children: Vec<RadixNode<V>>,
}

/// Raised when a key is inserted twice; the caller decides whether
/// this aborts anything (the compiler just skips the article)
#[derive(Debug, PartialEq, Eq)]
pub struct DuplicateKey(pub String);

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "duplicate key: {}", self.0)
    }
}

impl std::error::Error for DuplicateKey {}

impl<V> RadixNode<V> {
    fn new(key: &str, value: Option<V>) -> Self {
        Self {
            key: key.to_string(),
            value,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree (including this one)
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(RadixNode::node_count)
            .sum::<usize>()
    }

    fn insert(&mut self, key: &str, value: V) -> Result<(), DuplicateKey> {
        for child in self.children.iter_mut() {
            let common = common_prefix(&child.key, key);
            if common == 0 {
                continue;
            }

            if common == child.key.len() {
                if common == key.len() {
                    // The key ends exactly on this node
                    return match child.value {
                        Some(_) => Err(DuplicateKey(key.to_string())),
                        None => {
                            child.value = Some(value);
                            Ok(())
                        }
                    };
                }
                return child.insert(&key[common..], value);
            }

            // Partial match: split the edge at the common prefix
            let mut detached = RadixNode::new(&child.key[common..], None);
            detached.value = child.value.take();
            detached.children = std::mem::take(&mut child.children);
            child.key.truncate(common);

            if common == key.len() {
                // The new key ends at the split point
                child.value = Some(value);
                child.children.push(detached);
            } else {
                child.children.push(detached);
                child
                    .children
                    .push(RadixNode::new(&key[common..], Some(value)));
            }
            return Ok(());
        }

        // No child shares a prefix with the key
        self.children.push(RadixNode::new(key, Some(value)));
        Ok(())
    }

    fn get(&self, key: &str) -> Option<&V> {
        if key.is_empty() {
            return self.value.as_ref();
        }
        for child in self.children.iter() {
            let common = common_prefix(&child.key, key);
            if common == child.key.len() && common > 0 {
                return child.get(&key[common..]);
            }
        }
        None
    }
}

/// Length in bytes of the common prefix of two strings, cut at a
/// character boundary so fragments stay valid UTF-8
fn common_prefix(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

pub struct RadixTree<V> {
    root: RadixNode<V>,
    len: usize,
}

impl<V> RadixTree<V> {
    pub fn new() -> Self {
        Self {
            root: RadixNode::new("", None),
            len: 0,
        }
    }

    /// Inserts a key. Rejects duplicates, keeping the first value.
    pub fn insert(&mut self, key: &str, value: V) -> Result<(), DuplicateKey> {
        assert!(!key.is_empty(), "Keys cannot be empty");
        self.root.insert(key, value)?;
        self.len += 1;
        Ok(())
    }

    /// Exact-match lookup (mostly useful in tests; on-device lookup
    /// reads the serialized form instead)
    pub fn get(&self, key: &str) -> Option<&V> {
        if key.is_empty() {
            return None;
        }
        self.root.get(key)
    }

    pub fn root(&self) -> &RadixNode<V> {
        &self.root
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Len for RadixTree<V> {
    /// Number of keys in the tree
    fn len(&self) -> usize {
        self.len
    }
}
