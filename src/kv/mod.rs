//! Ordered key-value layer for kvsql
//!
//! Rows live in a single ordered map. Every index of every table occupies a
//! contiguous key range, so an index scan is a range scan and a reverse
//! index scan is the same range walked backwards.
//!
//! # Invariants
//!
//! - Key ordering follows index column order and per-column direction
//! - A primary row's sentinel precedes its column entries
//! - Secondary entries are unique through the implicit primary key suffix

mod datum;
mod errors;
mod key;
mod rows;
mod store;

pub use datum::{Datum, KeyPart};
pub use errors::{KvError, KvResult};
pub use key::{Key, KvValue};
pub use rows::{decode_index_entry, decode_primary, index_key_parts, primary_key_parts, RowWriter};
pub use store::KvStore;
