use std::fmt;

// deliberate subset of ice-char, etc that are "safe"
const CHARS: &[u8] = b"abcdefghijklmnopqrstuvxyzABCDEFGHIJKLMNOPQRSTUVXYZ0123456789";

/// Random string of `L` chars, usable as `ice-char` tokens in SDP.
pub struct Id<const L: usize>([u8; L]);

impl<const L: usize> Id<L> {
    pub fn random() -> Id<L> {
        let mut x = [0; L];
        for val in x.iter_mut() {
            *val = CHARS[fastrand::usize(..CHARS.len())];
        }
        Id(x)
    }
}

impl<const L: usize> fmt::Display for Id<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// New `sess-id` for an `o=` line.
///
/// RFC 8829 5.2.1: the id is a 64 bit random value with the top bit clear, we go
/// one further and clear two, to keep it within a signed 63 bit range.
pub fn session_id() -> u64 {
    fastrand::u64(..) >> 2
}
