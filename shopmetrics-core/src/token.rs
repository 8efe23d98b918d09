//! Unique tokens for partition file names (`part-<token>.parquet`).

/// Source of file-name tokens. Every call must return a token that has not
/// been returned before in this process and is unlikely to have been
/// produced by any earlier run.
pub trait TokenGenerator {
    fn next_token(&mut self) -> String;
}

/// Production tokens: the first 16 hex digits of a random v4 UUID (64 bits).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokens;

impl TokenGenerator for UuidTokens {
    fn next_token(&mut self) -> String {
        let mut hex = uuid::Uuid::new_v4().simple().to_string();
        hex.truncate(16);
        hex
    }
}

/// Deterministic tokens for tests: `<prefix>00000000`, `<prefix>00000001`, ...
#[derive(Debug, Clone)]
pub struct SequentialTokens {
    prefix: String,
    next: u64,
}

impl SequentialTokens {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl TokenGenerator for SequentialTokens {
    fn next_token(&mut self) -> String {
        let token = format!("{}{:08}", self.prefix, self.next);
        self.next += 1;
        token
    }
}
