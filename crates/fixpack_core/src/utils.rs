use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

pub fn write_u16<W: Write>(w: &mut W, v: u16) -> io::Result<()> { w.write_u16::<LE>(v) }
pub fn write_i16<W: Write>(w: &mut W, v: i16) -> io::Result<()> { w.write_i16::<LE>(v) }
pub fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> { w.write_u32::<LE>(v) }
pub fn write_i32<W: Write>(w: &mut W, v: i32) -> io::Result<()> { w.write_i32::<LE>(v) }
pub fn read_u16<R: Read>(r: &mut R) -> io::Result<u16> { r.read_u16::<LE>() }
pub fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> { r.read_u32::<LE>() }

/// Little-endian u16 at `pos`, if the slice is long enough.
pub fn u16_at(buf: &[u8], pos: usize) -> Option<u16> {
    let b = buf.get(pos..pos.checked_add(2)?)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

pub fn u32_at(buf: &[u8], pos: usize) -> Option<u32> {
    let b = buf.get(pos..pos.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Bytes up to (not including) the first NUL at or after `pos`.
pub fn c_str_at(buf: &[u8], pos: usize) -> Option<&[u8]> {
    let tail = buf.get(pos..)?;
    let end = tail.iter().position(|&b| b == 0)?;
    Some(&tail[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn le_helpers_agree_with_byteorder() {
        let mut buf = Vec::new();
        write_u16(&mut buf, 0xBEEF).unwrap();
        write_u32(&mut buf, 0x0102_0304).unwrap();
        assert_eq!(buf, [0xEF, 0xBE, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(u16_at(&buf, 0), Some(0xBEEF));
        assert_eq!(u32_at(&buf, 2), Some(0x0102_0304));
        assert_eq!(u32_at(&buf, 3), None);
        let mut cur = &buf[..];
        assert_eq!(read_u16(&mut cur).unwrap(), 0xBEEF);
        assert_eq!(read_u32(&mut cur).unwrap(), 0x0102_0304);
    }

    #[test]
    fn c_str_stops_at_nul() {
        let buf = b"He\0Li\0";
        assert_eq!(c_str_at(buf, 0), Some(&b"He"[..]));
        assert_eq!(c_str_at(buf, 3), Some(&b"Li"[..]));
        assert_eq!(c_str_at(b"abc", 0), None);
    }
}
