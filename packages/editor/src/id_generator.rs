use crc32fast::Hasher;

/// Short hex key derived from an arbitrary session key using CRC32
pub fn session_seed(key: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential instance ids for one editing session.
///
/// Ids look like `btn-1a2b3c4d-7`: the node type's prefix, the session
/// seed and a counter. They are unique within a session only.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(session_key: &str) -> Self {
        Self::from_seed(session_seed(session_key))
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Next id for a node type with `prefix`
    pub fn next_id(&mut self, prefix: &str) -> String {
        self.count += 1;
        format!("{}-{}-{}", prefix, self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
