//! Binary placement block (`obLT` chunk) embedded next to the sheet image.
//!
//! Layout, all fields packed:
//!
//! | offset | size | field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 4    | length, big endian (total minus 12)     |
//! | 4      | 4    | tag `obLT`                              |
//! | 8      | 4    | reserved, little endian, always 0       |
//! | 12     | 4    | version, little endian (2)              |
//! | 16     | 4    | record count, little endian             |
//! | 20     | 8*n  | records `x, y, w, h` as u16 LE, by id   |
//! | end-4  | 4    | CRC placeholder, left zero              |
//!
//! Frames that were not placed keep their record, with `x` and `y` set to
//! [`UNPLACED`].

use std::io::{Cursor, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, SheetPackError};
use crate::model::Sprite;

pub const TAG: [u8; 4] = *b"obLT";
pub const VERSION: u32 = 2;
pub const HEADER_SIZE: usize = 20;
pub const RECORD_SIZE: usize = 8;
pub const CRC_SIZE: usize = 4;
/// Bytes not counted by the length field (chunk length, tag, reserved).
pub const PREFIX_SIZE: usize = 12;
/// Coordinate marking a frame without a position.
pub const UNPLACED: u16 = 0xFFFF;

/// Total block size for `count` records.
pub fn encoded_len(count: usize) -> usize {
    HEADER_SIZE + RECORD_SIZE * count + CRC_SIZE
}

/// One decoded record. Its index in [`SheetMetadata::entries`] is the frame id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub position: Option<(u16, u16)>,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMetadata {
    pub version: u32,
    pub entries: Vec<MetadataEntry>,
}

impl SheetMetadata {
    /// Entries that carry a position, with their frame id.
    pub fn placed(&self) -> impl Iterator<Item = (usize, &MetadataEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.position.is_some())
    }
}

fn narrow(value: u32, what: &str, id: usize) -> Result<u16> {
    match u16::try_from(value) {
        Ok(v) if v != UNPLACED => Ok(v),
        _ => Err(SheetPackError::Encode(format!(
            "sprite {id}: {what} {value} does not fit in the record"
        ))),
    }
}

/// Serializes sprite placements, ordered by id.
///
/// Sprite ids must be exactly `0..sprites.len()`, in any order.
#[instrument(skip_all, fields(sprites = sprites.len()))]
pub fn encode_metadata(sprites: &[Sprite]) -> Result<Vec<u8>> {
    let mut order: Vec<usize> = (0..sprites.len()).collect();
    order.sort_by_key(|&i| sprites[i].id);

    let total = encoded_len(sprites.len());
    let count = u32::try_from(sprites.len())
        .map_err(|_| SheetPackError::Encode("too many sprites".into()))?;
    let length = u32::try_from(total - PREFIX_SIZE)
        .map_err(|_| SheetPackError::Encode("metadata block too large".into()))?;

    let mut buf = Vec::with_capacity(total);
    buf.write_u32::<BigEndian>(length)?;
    buf.extend_from_slice(&TAG);
    buf.write_u32::<LittleEndian>(0)?;
    buf.write_u32::<LittleEndian>(VERSION)?;
    buf.write_u32::<LittleEndian>(count)?;

    for (expected, &idx) in order.iter().enumerate() {
        let sprite = &sprites[idx];
        if sprite.id != expected {
            return Err(SheetPackError::Encode(format!(
                "sprite id {} out of sequence, expected {expected}",
                sprite.id
            )));
        }
        let (x, y) = match sprite.position {
            Some((x, y)) => (narrow(x, "x", sprite.id)?, narrow(y, "y", sprite.id)?),
            None => (UNPLACED, UNPLACED),
        };
        buf.write_u16::<LittleEndian>(x)?;
        buf.write_u16::<LittleEndian>(y)?;
        buf.write_u16::<LittleEndian>(narrow(sprite.width, "width", sprite.id)?)?;
        buf.write_u16::<LittleEndian>(narrow(sprite.height, "height", sprite.id)?)?;
    }
    buf.write_u32::<LittleEndian>(0)?;

    if buf.len() != total {
        return Err(SheetPackError::Encode(format!(
            "block is {} bytes, expected {total}",
            buf.len()
        )));
    }
    debug!(bytes = total, "encoded metadata");
    Ok(buf)
}

/// Parses a block written by [`encode_metadata`].
pub fn decode_metadata(bytes: &[u8]) -> Result<SheetMetadata> {
    if bytes.len() < encoded_len(0) {
        return Err(SheetPackError::Decode(format!(
            "block too short: {} bytes",
            bytes.len()
        )));
    }
    let mut cur = Cursor::new(bytes);
    let length = cur.read_u32::<BigEndian>()? as usize;
    let mut tag = [0u8; 4];
    cur.read_exact(&mut tag)?;
    if tag != TAG {
        return Err(SheetPackError::Decode(format!("unexpected tag {tag:?}")));
    }
    if length + PREFIX_SIZE != bytes.len() {
        return Err(SheetPackError::Decode(format!(
            "declared length {length} does not match block of {} bytes",
            bytes.len()
        )));
    }
    let _reserved = cur.read_u32::<LittleEndian>()?;
    let version = cur.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(SheetPackError::Decode(format!(
            "unsupported version {version}"
        )));
    }
    let count = cur.read_u32::<LittleEndian>()? as usize;
    if encoded_len(count) != bytes.len() {
        return Err(SheetPackError::Decode(format!(
            "{count} records do not match block of {} bytes",
            bytes.len()
        )));
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let x = cur.read_u16::<LittleEndian>()?;
        let y = cur.read_u16::<LittleEndian>()?;
        let width = cur.read_u16::<LittleEndian>()?;
        let height = cur.read_u16::<LittleEndian>()?;
        let position = if x == UNPLACED && y == UNPLACED {
            None
        } else {
            Some((x, y))
        };
        entries.push(MetadataEntry {
            position,
            width,
            height,
        });
    }
    Ok(SheetMetadata { version, entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(id: usize, pos: Option<(u32, u32)>, w: u32, h: u32) -> Sprite {
        Sprite {
            id,
            width: w,
            height: h,
            position: pos,
        }
    }

    #[test]
    fn header_layout() {
        let bytes = encode_metadata(&[sprite(0, Some((3, 5)), 16, 8)]).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[0..4], &[0, 0, 0, 20]);
        assert_eq!(&bytes[4..8], b"obLT");
        assert_eq!(&bytes[8..12], &[0, 0, 0, 0]);
        assert_eq!(&bytes[12..16], &[2, 0, 0, 0]);
        assert_eq!(&bytes[16..20], &[1, 0, 0, 0]);
        assert_eq!(&bytes[20..28], &[3, 0, 5, 0, 16, 0, 8, 0]);
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
    }

    #[test]
    fn records_follow_id_order() {
        let sprites = [
            sprite(2, Some((0, 0)), 4, 4),
            sprite(0, Some((4, 0)), 2, 2),
            sprite(1, None, 9, 9),
        ];
        let meta = decode_metadata(&encode_metadata(&sprites).unwrap()).unwrap();
        assert_eq!(meta.version, VERSION);
        assert_eq!(
            meta.entries,
            vec![
                MetadataEntry {
                    position: Some((4, 0)),
                    width: 2,
                    height: 2
                },
                MetadataEntry {
                    position: None,
                    width: 9,
                    height: 9
                },
                MetadataEntry {
                    position: Some((0, 0)),
                    width: 4,
                    height: 4
                },
            ]
        );
        assert_eq!(meta.placed().map(|(id, _)| id).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn rejects_gaps_in_ids() {
        let sprites = [sprite(0, Some((0, 0)), 1, 1), sprite(2, Some((1, 0)), 1, 1)];
        assert!(matches!(
            encode_metadata(&sprites),
            Err(SheetPackError::Encode(_))
        ));
    }

    #[test]
    fn rejects_coordinates_colliding_with_marker() {
        let sprites = [sprite(0, Some((0xFFFF, 0)), 1, 1)];
        assert!(encode_metadata(&sprites).is_err());
        let sprites = [sprite(0, Some((0, 0)), 70_000, 1)];
        assert!(encode_metadata(&sprites).is_err());
    }

    #[test]
    fn decode_rejects_damaged_blocks() {
        let good = encode_metadata(&[sprite(0, Some((1, 1)), 2, 2)]).unwrap();
        assert!(decode_metadata(&good[..10]).is_err());

        let mut bad_tag = good.clone();
        bad_tag[4] = b'X';
        assert!(decode_metadata(&bad_tag).is_err());

        let mut bad_version = good.clone();
        bad_version[12] = 3;
        assert!(decode_metadata(&bad_version).is_err());

        let mut bad_count = good.clone();
        bad_count[16] = 2;
        assert!(decode_metadata(&bad_count).is_err());

        let mut truncated = good.clone();
        truncated.pop();
        assert!(decode_metadata(&truncated).is_err());
    }

    #[test]
    fn empty_block() {
        let bytes = encode_metadata(&[]).unwrap();
        assert_eq!(bytes.len(), encoded_len(0));
        assert!(decode_metadata(&bytes).unwrap().entries.is_empty());
    }
}
