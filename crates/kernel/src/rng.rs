/// Seedable xorshift128+ generator.
///
/// Every tile pipeline draws from one shared instance, so the generator is
/// always reseeded through [`Xorshift::seed`] right before it is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xorshift {
    hi: u64,
    lo: u64,
}

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
const MANTISSA_MASK: u64 = 0x00ff_ffff;
const INT_MASK: u64 = 0x0fff_ffff;

impl Default for Xorshift {
    fn default() -> Self {
        Self {
            hi: 326_264_246,
            lo: 235_632_513,
        }
    }
}

impl Xorshift {
    pub fn new(seed: u64) -> Self {
        let mut rng = Self::default();
        rng.seed(seed);
        rng
    }

    /// Reset the state from a single seed. Both words go through a splitmix64
    /// finalizer, which never maps the two distinct inputs to an all-zero state.
    pub fn seed(&mut self, seed: u64) {
        self.lo = splitmix64(seed.wrapping_add(GOLDEN_GAMMA));
        self.hi = splitmix64(seed.wrapping_add(GOLDEN_GAMMA).wrapping_add(GOLDEN_GAMMA));
    }

    /// Next 62-bit value. The two low bits of the xorshift+ sum are dropped.
    pub fn next_u64(&mut self) -> u64 {
        let mut t = self.lo;
        let s = self.hi;
        self.lo = s;
        t ^= t << 23;
        t ^= t >> 18;
        t ^= s ^ (s >> 5);
        self.hi = t;
        t.wrapping_add(s) >> 2
    }

    /// Uniform value in `[0, 1]`, both ends inclusive.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() & MANTISSA_MASK) as f32 / MANTISSA_MASK as f32
    }

    /// Same 24-bit draw as [`Xorshift::next_f32`], in double precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() & MANTISSA_MASK) as f64 / MANTISSA_MASK as f64
    }

    /// Integer in `[0, max - 1]`; 0 when `max <= 1`.
    ///
    /// Modulo of a 28-bit draw, so slightly biased towards low values. The
    /// bias is negligible for the small ranges the maze uses.
    pub fn next_int(&mut self, max: i32) -> i32 {
        if max <= 1 {
            return 0;
        }
        ((self.next_u64() & INT_MASK) % max as u64) as i32
    }

    /// Standard normal sample (Box–Muller).
    pub fn next_gaussian(&mut self) -> f32 {
        let u1 = (1.0 - self.next_f32()).max(f32::MIN_POSITIVE);
        let u2 = 1.0 - self.next_f32();
        (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
