//! RLP Encoding and Decoding
//!
//! Only what transaction signing needs: byte strings, integers and lists.
//! The decoder is strict. Non-canonical integers, truncated items and
//! trailing bytes are all rejected.

use crate::error::{SignerError, SignerResult};

// MARK: - Encoding

pub fn encode_u64(val: u64) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(&val.to_be_bytes()))
}

pub fn encode_u128(val: u128) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(&val.to_be_bytes()))
}

/// Encode a big-endian integer (e.g. a signature scalar) without leading zeros
pub fn encode_uint_bytes(be: &[u8]) -> Vec<u8> {
    encode_bytes(trim_leading_zeros(be))
}

pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        return data.to_vec();
    }

    let mut result = encode_header(0x80, data.len());
    result.extend_from_slice(data);
    result
}

/// Wrap already-encoded items in a list header
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = items.iter().map(Vec::len).sum();

    let mut result = encode_header(0xc0, payload_len);
    result.reserve(payload_len);
    for item in items {
        result.extend_from_slice(item);
    }
    result
}

fn encode_header(offset: u8, len: usize) -> Vec<u8> {
    if len < 56 {
        vec![offset + len as u8]
    } else {
        let len_bytes = encode_length(len);
        let mut header = vec![offset + 55 + len_bytes.len() as u8];
        header.extend_from_slice(&len_bytes);
        header
    }
}

fn encode_length(len: usize) -> Vec<u8> {
    trim_leading_zeros(&len.to_be_bytes()).to_vec()
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let leading_zeros = bytes.iter().take_while(|&&b| b == 0).count();
    &bytes[leading_zeros..]
}

// MARK: - Decoding

/// A decoded RLP item borrowing from the input buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem<'a> {
    Bytes(&'a [u8]),
    List(Vec<RlpItem<'a>>),
}

impl<'a> RlpItem<'a> {
    pub fn as_bytes(&self, field: &str) -> SignerResult<&'a [u8]> {
        match self {
            RlpItem::Bytes(b) => Ok(b),
            RlpItem::List(_) => Err(malformed(format!("{}: expected bytes, got list", field))),
        }
    }

    pub fn as_list(&self, field: &str) -> SignerResult<&[RlpItem<'a>]> {
        match self {
            RlpItem::List(items) => Ok(items),
            RlpItem::Bytes(_) => Err(malformed(format!("{}: expected list, got bytes", field))),
        }
    }

    pub fn as_u64(&self, field: &str) -> SignerResult<u64> {
        let bytes = self.as_uint(field, 8)?;
        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn as_u128(&self, field: &str) -> SignerResult<u128> {
        let bytes = self.as_uint(field, 16)?;
        let mut buf = [0u8; 16];
        buf[16 - bytes.len()..].copy_from_slice(bytes);
        Ok(u128::from_be_bytes(buf))
    }

    /// A 256-bit integer, left-padded to 32 bytes
    pub fn as_word(&self, field: &str) -> SignerResult<[u8; 32]> {
        let bytes = self.as_uint(field, 32)?;
        let mut buf = [0u8; 32];
        buf[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(buf)
    }

    fn as_uint(&self, field: &str, max_len: usize) -> SignerResult<&'a [u8]> {
        let bytes = self.as_bytes(field)?;
        if bytes.len() > max_len {
            return Err(malformed(format!("{}: integer wider than {} bytes", field, max_len)));
        }
        if bytes.first() == Some(&0) {
            return Err(malformed(format!("{}: integer has leading zero", field)));
        }
        Ok(bytes)
    }
}

/// Deepest list nesting the decoder accepts
pub const MAX_DEPTH: usize = 16;

/// Decode exactly one item spanning the whole input
pub fn decode(input: &[u8]) -> SignerResult<RlpItem<'_>> {
    let (item, rest) = decode_item(input, 0)?;
    if !rest.is_empty() {
        return Err(malformed(format!("{} trailing bytes", rest.len())));
    }
    Ok(item)
}

fn decode_item(input: &[u8], depth: usize) -> SignerResult<(RlpItem<'_>, &[u8])> {
    let prefix = *input
        .first()
        .ok_or_else(|| malformed("unexpected end of input".to_string()))?;

    match prefix {
        0x00..=0x7f => Ok((RlpItem::Bytes(&input[..1]), &input[1..])),
        0x80..=0xb7 => {
            let len = usize::from(prefix - 0x80);
            let (payload, rest) = split(&input[1..], len)?;
            if len == 1 && payload[0] < 0x80 {
                return Err(malformed("single byte below 0x80 must not be prefixed".to_string()));
            }
            Ok((RlpItem::Bytes(payload), rest))
        }
        0xb8..=0xbf => {
            let (len, body) = long_length(&input[1..], usize::from(prefix - 0xb7))?;
            let (payload, rest) = split(body, len)?;
            Ok((RlpItem::Bytes(payload), rest))
        }
        0xc0..=0xff if depth >= MAX_DEPTH => {
            Err(malformed(format!("nesting deeper than {} lists", MAX_DEPTH)))
        }
        0xc0..=0xf7 => {
            let len = usize::from(prefix - 0xc0);
            let (payload, rest) = split(&input[1..], len)?;
            Ok((RlpItem::List(decode_list_payload(payload, depth + 1)?), rest))
        }
        0xf8..=0xff => {
            let (len, body) = long_length(&input[1..], usize::from(prefix - 0xf7))?;
            let (payload, rest) = split(body, len)?;
            Ok((RlpItem::List(decode_list_payload(payload, depth + 1)?), rest))
        }
    }
}

fn decode_list_payload(mut payload: &[u8], depth: usize) -> SignerResult<Vec<RlpItem<'_>>> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, rest) = decode_item(payload, depth)?;
        items.push(item);
        payload = rest;
    }
    Ok(items)
}

fn long_length(input: &[u8], len_of_len: usize) -> SignerResult<(usize, &[u8])> {
    let (len_bytes, rest) = split(input, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(malformed("length has leading zero".to_string()));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(malformed("length does not fit in usize".to_string()));
    }

    let len = len_bytes
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
    if len < 56 {
        return Err(malformed("long form used for short payload".to_string()));
    }
    Ok((len, rest))
}

fn split(input: &[u8], len: usize) -> SignerResult<(&[u8], &[u8])> {
    if input.len() < len {
        return Err(malformed(format!(
            "item needs {} bytes, only {} left",
            len,
            input.len()
        )));
    }
    Ok(input.split_at(len))
}

fn malformed(reason: String) -> SignerError {
    SignerError::MalformedTransaction(reason)
}
