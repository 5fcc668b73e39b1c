use crc32fast::Hasher;
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default prefix for generated annotation uids
pub const DEFAULT_UID_PREFIX: &str = "mce-annotation";

/// Session seed: CRC32 of the current time and process id
fn session_seed() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut hasher = Hasher::new();
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&process::id().to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential uid generator for annotate calls within one session
#[derive(Debug, Clone)]
pub struct UidGenerator {
    prefix: String,
    seed: String, // Session id (CRC32)
    count: u32,   // Sequential counter
}

impl UidGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::from_seed(prefix, session_seed())
    }

    pub fn from_seed(prefix: impl Into<String>, seed: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next uid
    pub fn next_uid(&mut self) -> String {
        self.count += 1;
        format!("{}_{}{}", self.prefix, self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_UID_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_uids() {
        let mut gen = UidGenerator::from_seed("mce-annotation", "abc");

        assert_eq!(gen.next_uid(), "mce-annotation_abc1");
        assert_eq!(gen.next_uid(), "mce-annotation_abc2");
        assert_eq!(gen.seed(), "abc");
    }

    #[test]
    fn test_generated_seed_is_hex() {
        let gen = UidGenerator::default();
        assert!(!gen.seed().is_empty());
        assert!(gen.seed().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
