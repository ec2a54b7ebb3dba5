#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Deterministic uniform random stream keyed by a seed.
///
/// Each draw hashes `(seed, counter)` with FNV-1a, so a seed always replays the same sequence.
#[derive(Clone, Debug)]
pub(crate) struct SeededRng {
    seed: u64,
    counter: u64,
}

impl SeededRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self { seed, counter: 0 }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        let mut h = Fnv1a64::new(self.seed ^ Fnv1a64::OFFSET_BASIS);
        h.write_u64(self.counter);
        self.counter = self.counter.wrapping_add(1);
        // FNV alone mixes the high bits poorly for consecutive counters.
        let mut z = h.finish();
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1)`.
    pub(crate) fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Convert straight-alpha RGBA8 to premultiplied RGBA8.
pub(crate) fn premultiply_px(px: [u8; 4]) -> [u8; 4] {
    let a = u16::from(px[3]);
    if a == 255 {
        return px;
    }
    if a == 0 {
        return [0, 0, 0, 0];
    }
    [
        mul_div255_u8(u16::from(px[0]), a),
        mul_div255_u8(u16::from(px[1]), a),
        mul_div255_u8(u16::from(px[2]), a),
        px[3],
    ]
}

/// Convert premultiplied RGBA8 back to straight alpha.
pub(crate) fn unpremultiply_px(px: [u8; 4]) -> [u8; 4] {
    let a = u32::from(px[3]);
    if a == 255 {
        return px;
    }
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
