//! Packed k-mers.
//!
//! A k-mer is stored in the low `2k` bits of a [`u64`], two bits per base, with the first base in the most significant position.
//! The encoding is `A = 0`, `C = 1`, `G = 2`, `T = 3`, so the complement of a base `b` is `3 - b`.
//! Edges of a de Bruijn graph are `(k + 1)`-mers ("rho-mers").

//-----------------------------------------------------------------------------

/// Largest supported `k + 1`, so that the universe of rho-mers fits in a [`usize`].
pub const MAX_RHO: usize = 31;

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Returns a mask covering the bits of a `k`-mer.
#[inline]
pub fn mask(k: usize) -> u64 {
    if k >= 32 { u64::MAX } else { (1u64 << (2 * k)) - 1 }
}

/// Returns the reverse complement of the `k`-mer `x`.
pub fn reverse_complement(x: u64, k: usize) -> u64 {
    let mut value = !x;
    let mut result = 0;
    for _ in 0..k {
        result = (result << 2) | (value & 3);
        value >>= 2;
    }
    result
}

/// Returns the lexicographically smaller of `x` and its reverse complement.
#[inline]
pub fn normalize(x: u64, k: usize) -> u64 {
    x.min(reverse_complement(x, k))
}

/// Returns the base at position `i` of the `k`-mer `x`.
#[inline]
pub fn base(x: u64, k: usize, i: usize) -> u8 {
    BASES[((x >> (2 * (k - 1 - i))) & 3) as usize]
}

/// Returns the string representation of the `k`-mer `x`.
pub fn to_string(x: u64, k: usize) -> String {
    let bytes: Vec<u8> = (0..k).map(|i| base(x, k, i)).collect();
    String::from_utf8(bytes).unwrap_or_default()
}

/// Encodes a single base, or returns [`None`] if the base is not in `acgtACGT`.
#[inline]
pub fn encode_base(base: u8) -> Option<u64> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Encodes the sequence as a k-mer with `k = sequence.len()`.
///
/// Returns [`None`] if the sequence is too long or contains characters outside `acgtACGT`.
pub fn from_bytes(sequence: &[u8]) -> Option<u64> {
    if sequence.len() > 32 {
        return None;
    }
    let mut result = 0;
    for b in sequence {
        result = (result << 2) | encode_base(*b)?;
    }
    Some(result)
}

/// Returns all `k`-mers of the sequence in order.
///
/// Characters outside `acgtACGT` split the sequence; k-mers spanning them are skipped.
pub fn kmers(sequence: &[u8], k: usize) -> Vec<u64> {
    let mut result = Vec::new();
    if k == 0 || k > 32 {
        return result;
    }
    let m = mask(k);
    let mut value = 0;
    let mut valid = 0;
    for b in sequence {
        match encode_base(*b) {
            Some(code) => {
                value = ((value << 2) | code) & m;
                valid += 1;
                if valid >= k {
                    result.push(value);
                }
            },
            None => {
                valid = 0;
                value = 0;
            },
        }
    }
    result
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_complement_involution() {
        let k = 7;
        for x in [0, 1, 0b10_01_11_00_01_10_11, mask(k)] {
            let rc = reverse_complement(x, k);
            assert!(rc <= mask(k), "Reverse complement of {} spills over k", x);
            assert_eq!(reverse_complement(rc, k), x, "Reverse complement is not an involution for {}", x);
        }
    }

    #[test]
    fn string_conversions() {
        let sequence = b"GATTACA";
        let x = from_bytes(sequence).unwrap();
        assert_eq!(to_string(x, sequence.len()), "GATTACA", "Wrong string for the encoded k-mer");
        assert_eq!(to_string(reverse_complement(x, 7), 7), "TGTAATC", "Wrong reverse complement");
        assert_eq!(from_bytes(b"GANTACA"), None, "Invalid characters should not be encoded");
    }

    #[test]
    fn kmers_skip_invalid_bases() {
        let found = kmers(b"ACGTNACG", 3);
        let expected: Vec<u64> = ["ACG", "CGT", "ACG"].iter().map(|s| from_bytes(s.as_bytes()).unwrap()).collect();
        assert_eq!(found, expected, "Wrong k-mers around an N");
    }

    #[test]
    fn normalized_kmers() {
        let k = 4;
        let x = from_bytes(b"TTTT").unwrap();
        assert_eq!(normalize(x, k), from_bytes(b"AAAA").unwrap(), "TTTT should normalize to AAAA");
        let palindrome = from_bytes(b"ACGT").unwrap();
        assert_eq!(normalize(palindrome, k), palindrome, "A palindrome is its own normal form");
    }
}

//-----------------------------------------------------------------------------
