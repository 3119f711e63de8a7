//! Primary-key generation strategies.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigError, Result};
use crate::types::SqlType;
use crate::value::Value;

/// How a primary key gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// Assigned by the database; the column is left out of INSERT statements.
    #[default]
    Auto,
    /// Random v4 UUID.
    Uuid,
    /// 64-bit time-ordered id: milliseconds since [`SNOWFLAKE_EPOCH_MS`], node id
    /// and a per-millisecond sequence.
    Snowflake,
}

impl IdType {
    /// Parse a strategy name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" | "identity" => Some(IdType::Auto),
            "uuid" => Some(IdType::Uuid),
            "snowflake" => Some(IdType::Snowflake),
            _ => None,
        }
    }

    /// True if the value is produced by the database rather than by us.
    #[must_use]
    pub const fn is_host_assigned(&self) -> bool {
        matches!(self, IdType::Auto)
    }
}

/// 2021-01-01T00:00:00Z in Unix milliseconds.
pub const SNOWFLAKE_EPOCH_MS: u64 = 1_609_459_200_000;
/// Node id embedded in every generated id.
pub const SNOWFLAKE_NODE_ID: u64 = 1;

const SEQUENCE_BITS: u32 = 12;
const NODE_BITS: u32 = 10;
const MAX_SEQUENCE: u64 = (1 << SEQUENCE_BITS) - 1;

/// Lock-free snowflake id source.
///
/// The whole generator state is one word, `elapsed_ms << 12 | sequence`, advanced
/// with a CAS loop. Within a millisecond the sequence counts up to 4095; once it
/// is exhausted the generator waits for the clock to move on. If the clock steps
/// backwards, ids keep counting from the last millisecond handed out, so ids
/// from one generator are strictly increasing.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    node_id: u64,
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// A generator stamping `node_id` (masked to 10 bits) into its ids.
    #[must_use]
    pub const fn new(node_id: u64) -> Self {
        Self {
            node_id: node_id & ((1 << NODE_BITS) - 1),
            state: AtomicU64::new(0),
        }
    }

    /// Next id.
    pub fn next_id(&self) -> u64 {
        loop {
            let now = elapsed_ms();
            let prev = self.state.load(Ordering::Acquire);
            let prev_ms = prev >> SEQUENCE_BITS;
            let prev_seq = prev & MAX_SEQUENCE;

            let next = if now > prev_ms {
                now << SEQUENCE_BITS
            } else if prev_seq < MAX_SEQUENCE {
                prev + 1
            } else if now < prev_ms {
                (prev_ms + 1) << SEQUENCE_BITS
            } else {
                std::thread::yield_now();
                continue;
            };

            if self
                .state
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                let ms = next >> SEQUENCE_BITS;
                let seq = next & MAX_SEQUENCE;
                return (ms << (SEQUENCE_BITS + NODE_BITS)) | (self.node_id << SEQUENCE_BITS) | seq;
            }
        }
    }
}

fn elapsed_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);
    now.saturating_sub(SNOWFLAKE_EPOCH_MS)
}

/// Process-wide snowflake generator.
pub fn snowflake() -> &'static SnowflakeGenerator {
    static GENERATOR: OnceLock<SnowflakeGenerator> = OnceLock::new();
    GENERATOR.get_or_init(|| SnowflakeGenerator::new(SNOWFLAKE_NODE_ID))
}

/// Check that `strategy` can produce values for a field declared as `target`,
/// without generating anything.
pub fn check_id_target(strategy: IdType, target: SqlType) -> Result<()> {
    let supported = match strategy {
        IdType::Auto => return Err(ConfigError::AutoIdGeneration.into()),
        IdType::Uuid => matches!(target, SqlType::Varchar | SqlType::Text | SqlType::Uuid),
        IdType::Snowflake => matches!(target, SqlType::BigInt | SqlType::Varchar | SqlType::Text),
    };
    if supported {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedIdTarget { strategy, target }.into())
    }
}

/// Generate an id for `strategy`, rendered for a field declared as `target`.
///
/// UUIDs render as hyphenated text for character fields and as native UUIDs for
/// UUID fields. Snowflake ids render as `BIGINT` or as decimal text.
pub fn generate_id(strategy: IdType, target: SqlType) -> Result<Value> {
    let unsupported = || ConfigError::UnsupportedIdTarget { strategy, target };

    let value = match strategy {
        IdType::Auto => return Err(ConfigError::AutoIdGeneration.into()),
        IdType::Uuid => {
            let id = Uuid::new_v4();
            match target {
                SqlType::Varchar | SqlType::Text => Value::Text(id.hyphenated().to_string()),
                SqlType::Uuid => Value::Uuid(id),
                _ => return Err(unsupported().into()),
            }
        }
        IdType::Snowflake => {
            let id = snowflake().next_id();
            match target {
                SqlType::BigInt => Value::BigInt(id as i64),
                SqlType::Varchar | SqlType::Text => Value::Text(id.to_string()),
                _ => return Err(unsupported().into()),
            }
        }
    };
    tracing::trace!(?strategy, ?target, "Generated primary key");
    Ok(value)
}
