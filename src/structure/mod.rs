use std::io::Cursor;
use binrw::{BinResult, BinWrite, BinWriterExt};

pub mod anm;
pub mod anm_utils;
pub mod other;
pub mod page;

/// Serializes `value` big-endian into a fresh buffer.
pub fn to_be_bytes<T: BinWrite>(value: &T) -> BinResult<Vec<u8>>
where
    T::Args: Default,
{
    let mut cursor = Cursor::new(Vec::new());
    cursor.write_be(value)?;
    Ok(cursor.into_inner())
}
