use super::value::Value;
use bytes::{BufMut, BytesMut};

/// Encodes a value into one contiguous buffer.
///
/// Dictionary keys come out in sorted order because [`Value::Dict`] is a
/// `BTreeMap`. The whole message is produced before anything is returned, so
/// callers can hand it to a datagram socket in a single send.
///
/// # Examples
///
/// ```
/// use rdht::bencode::{encode, Value};
///
/// let list = Value::List(vec![Value::Integer(1), Value::string("two")]);
/// assert_eq!(encode(&list), b"li1e3:twoe");
///
/// let dict = Value::dict([("b", Value::Integer(2)), ("a", Value::Integer(1))]);
/// assert_eq!(encode(&dict), b"d1:ai1e1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(128);
    encode_into(value, &mut buf);
    buf.to_vec()
}

/// Appends the encoding of `value` to `buf`.
pub fn encode_into(value: &Value, buf: &mut BytesMut) {
    match value {
        Value::Integer(i) => {
            buf.put_u8(b'i');
            buf.put_slice(i.to_string().as_bytes());
            buf.put_u8(b'e');
        }
        Value::Bytes(b) => put_string(b, buf),
        Value::List(items) => {
            buf.put_u8(b'l');
            for item in items {
                encode_into(item, buf);
            }
            buf.put_u8(b'e');
        }
        Value::Dict(dict) => {
            buf.put_u8(b'd');
            for (key, val) in dict {
                put_string(key, buf);
                encode_into(val, buf);
            }
            buf.put_u8(b'e');
        }
    }
}

fn put_string(s: &[u8], buf: &mut BytesMut) {
    buf.put_slice(s.len().to_string().as_bytes());
    buf.put_u8(b':');
    buf.put_slice(s);
}
