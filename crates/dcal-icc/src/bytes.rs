//! Bounds-checked big-endian field access.

use byteorder::{BigEndian, ByteOrder};

use crate::{IccError, IccResult};

fn slice<'a>(data: &'a [u8], offset: usize, len: usize, what: &'static str) -> IccResult<&'a [u8]> {
    data.get(offset..offset + len).ok_or(IccError::Truncated {
        what,
        needed: offset + len,
        available: data.len(),
    })
}

pub(crate) fn u16_at(data: &[u8], offset: usize, what: &'static str) -> IccResult<u16> {
    slice(data, offset, 2, what).map(BigEndian::read_u16)
}

pub(crate) fn u32_at(data: &[u8], offset: usize, what: &'static str) -> IccResult<u32> {
    slice(data, offset, 4, what).map(BigEndian::read_u32)
}

/// Reads an ICC `s15Fixed16Number`.
pub(crate) fn s15f16_at(data: &[u8], offset: usize, what: &'static str) -> IccResult<f64> {
    slice(data, offset, 4, what).map(|b| f64::from(BigEndian::read_i32(b)) / 65536.0)
}

pub(crate) fn sig_at(data: &[u8], offset: usize, what: &'static str) -> IccResult<[u8; 4]> {
    let mut sig = [0u8; 4];
    sig.copy_from_slice(slice(data, offset, 4, what)?);
    Ok(sig)
}

pub(crate) fn bytes_at<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    what: &'static str,
) -> IccResult<&'a [u8]> {
    slice(data, offset, len, what)
}

pub(crate) fn push_u16(out: &mut Vec<u8>, v: u16) {
    let mut b = [0u8; 2];
    BigEndian::write_u16(&mut b, v);
    out.extend_from_slice(&b);
}

pub(crate) fn push_u32(out: &mut Vec<u8>, v: u32) {
    let mut b = [0u8; 4];
    BigEndian::write_u32(&mut b, v);
    out.extend_from_slice(&b);
}

pub(crate) fn push_s15f16(out: &mut Vec<u8>, v: f64) {
    let mut b = [0u8; 4];
    BigEndian::write_i32(&mut b, (v * 65536.0).round() as i32);
    out.extend_from_slice(&b);
}

pub(crate) fn put_u32(out: &mut [u8], offset: usize, v: u32) {
    BigEndian::write_u32(&mut out[offset..offset + 4], v);
}

/// Pads `out` with zeros to a multiple of four bytes.
pub(crate) fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point() {
        let mut out = Vec::new();
        push_s15f16(&mut out, 2.2);
        let back = s15f16_at(&out, 0, "test").unwrap();
        assert!((back - 2.2).abs() < 1.0 / 65536.0);
    }

    #[test]
    fn out_of_bounds() {
        let err = u32_at(&[0, 1, 2], 0, "header").unwrap_err();
        assert!(matches!(err, IccError::Truncated { needed: 4, available: 3, .. }));
    }
}
