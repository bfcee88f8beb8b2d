use super::error::BencodeError;
use super::value::{Dict, Value};
use bytes::Bytes;

const MAX_DEPTH: usize = 64;

/// Decodes a single bencode value that must span the whole input.
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    decode_bytes(Bytes::copy_from_slice(data))
}

/// Like [`decode`], but byte strings in the result share `data`'s buffer
/// instead of being copied out one by one.
pub fn decode_bytes(data: Bytes) -> Result<Value, BencodeError> {
    let mut decoder = Decoder { data, pos: 0 };
    let value = decoder.value(0)?;

    if decoder.pos != decoder.data.len() {
        return Err(BencodeError::TrailingData(decoder.pos));
    }

    Ok(value)
}

struct Decoder {
    data: Bytes,
    pos: usize,
}

impl Decoder {
    fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof(self.pos))
    }

    fn value(&mut self, depth: usize) -> Result<Value, BencodeError> {
        if depth > MAX_DEPTH {
            return Err(BencodeError::NestingTooDeep(MAX_DEPTH));
        }

        match self.peek()? {
            b'i' => self.integer(),
            b'l' => self.list(depth),
            b'd' => self.dict(depth),
            b'0'..=b'9' => self.string().map(Value::Bytes),
            byte => Err(BencodeError::UnexpectedByte {
                byte,
                pos: self.pos,
            }),
        }
    }

    /// Advances past the next `terminator` and returns the range before it.
    fn scan_to(&mut self, terminator: u8) -> Result<(usize, usize), BencodeError> {
        let from = self.pos;
        let offset = self.data[from..]
            .iter()
            .position(|&b| b == terminator)
            .ok_or(BencodeError::UnexpectedEof(self.data.len()))?;

        let to = from + offset;
        self.pos = to + 1;
        Ok((from, to))
    }

    fn integer(&mut self) -> Result<Value, BencodeError> {
        let start = self.pos;
        self.pos += 1;
        let (from, to) = self.scan_to(b'e')?;

        let invalid = |reason| BencodeError::InvalidInteger { pos: start, reason };

        let text = std::str::from_utf8(&self.data[from..to]).map_err(|_| invalid("not ascii"))?;
        let magnitude = text.strip_prefix('-').unwrap_or(text);

        if magnitude.is_empty() || !magnitude.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("no digits"));
        }
        if magnitude.len() > 1 && magnitude.starts_with('0') {
            return Err(invalid("leading zero"));
        }
        if text == "-0" {
            return Err(invalid("negative zero"));
        }

        text.parse()
            .map(Value::Integer)
            .map_err(|_| invalid("out of range"))
    }

    fn string(&mut self) -> Result<Bytes, BencodeError> {
        let start = self.pos;
        let (from, to) = self.scan_to(b':')?;

        let len: usize = std::str::from_utf8(&self.data[from..to])
            .ok()
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::InvalidStringLength(start))?;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(BencodeError::UnexpectedEof(self.data.len()))?;

        let bytes = self.data.slice(self.pos..end);
        self.pos = end;
        Ok(bytes)
    }

    fn list(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut items = Vec::new();

        while self.peek()? != b'e' {
            items.push(self.value(depth + 1)?);
        }

        self.pos += 1;
        Ok(Value::List(items))
    }

    fn dict(&mut self, depth: usize) -> Result<Value, BencodeError> {
        self.pos += 1;
        let mut dict = Dict::new();

        while self.peek()? != b'e' {
            if !self.peek()?.is_ascii_digit() {
                return Err(BencodeError::NonStringKey(self.pos));
            }

            let key = self.string()?;
            let value = self.value(depth + 1)?;
            dict.insert(key, value);
        }

        self.pos += 1;
        Ok(Value::Dict(dict))
    }
}
