//! Bencode encoding and decoding ([BEP-3]).
//!
//! KRPC messages are bencoded dictionaries. Four value types exist:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! Decoding is strict: integers with leading zeros or `-0`, non-string
//! dictionary keys, and trailing bytes after the top-level value are all
//! rejected with a [`BencodeError`] carrying the offending offset.
//!
//! ```
//! use rdht::bencode::{decode, encode, Value};
//!
//! let value = decode(b"d1:y1:qe").unwrap();
//! assert_eq!(value.get(b"y").and_then(Value::as_str), Some("q"));
//! assert_eq!(encode(&value), b"d1:y1:qe");
//! ```
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{decode, decode_bytes};
pub use encode::{encode, encode_into};
pub use error::BencodeError;
pub use value::{Dict, Value};
