//! Big-endian arithmetic on byte buffers.
//!
//! The hash and counter mechanisms treat their state buffers as unsigned
//! big-endian integers. Addition is carried from the last byte toward the
//! first and truncates modulo `2^(8 * dst.len())`.

/// `dst += src`, both interpreted as big-endian unsigned integers. The
/// shorter operand is right-aligned; bytes of `src` beyond the capacity
/// of `dst` are discarded by the modular truncation.
pub(crate) fn be_add(dst: &mut [u8], src: &[u8]) {
    let mut carry = 0u16;
    let mut src_iter = src.iter().rev();
    for byte in dst.iter_mut().rev() {
        let add = src_iter.next().copied().unwrap_or(0);
        let sum = *byte as u16 + add as u16 + carry;
        *byte = sum as u8;
        carry = sum >> 8;
    }
}

/// `dst += 1` modulo `2^(8 * dst.len())`.
pub(crate) fn be_incr(dst: &mut [u8]) {
    be_add(dst, &[1]);
}

/// `dst ^= src` byte-wise over the length of `dst`.
pub(crate) fn xor_into(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
