//! Reciprocal and reciprocal-square-root estimate tables (FRECPE, FRSQRTE).
//!
//! Both tables are built once by `EstimateTables::build()` when the emitter
//! configuration is constructed and are read-only afterwards.

#[derive(Clone)]
pub struct EstimateTables {
    recip: [u8; 256],
    inv_sqrt: [u8; 512],
}

impl std::fmt::Debug for EstimateTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstimateTables").finish_non_exhaustive()
    }
}

impl Default for EstimateTables {
    fn default() -> Self {
        Self::build()
    }
}

impl EstimateTables {
    pub fn build() -> Self {
        let mut recip = [0u8; 256];
        for (index, entry) in recip.iter_mut().enumerate() {
            let a = ((index as u64 | 0x100) << 1) + 1;
            let b = 0x80000 / a;
            *entry = (((b + 1) >> 1) & 0xFF) as u8;
        }

        let mut inv_sqrt = [0u8; 512];
        for index in 128..512u64 {
            let a = if index < 256 { (index << 1) + 1 } else { (index | 1) << 1 };
            let mut b = 256u64;
            while a * (b + 1) * (b + 1) < (1 << 28) {
                b += 1;
            }
            inv_sqrt[index as usize] = (((b + 1) >> 1) & 0xFF) as u8;
        }

        Self { recip, inv_sqrt }
    }

    pub fn recip_estimate(&self, x: f64) -> f64 {
        let x_bits = x.to_bits();
        let x_sign = x_bits & 0x8000_0000_0000_0000;
        let mut x_exp = ((x_bits >> 52) & 0x7FF) as i64;
        let mut scaled = x_bits & ((1u64 << 52) - 1);

        if x_exp >= 2045 {
            if x_exp == 0x7FF && scaled != 0 {
                return f64::from_bits(x_bits | 0x0008_0000_0000_0000);
            }
            // infinity, or too large to have a normal reciprocal
            return f64::from_bits(x_sign);
        }

        if x_exp == 0 {
            if scaled == 0 {
                return f64::from_bits(x_sign | 0x7FF0_0000_0000_0000);
            }
            if scaled & (1u64 << 51) == 0 {
                x_exp = -1;
                scaled <<= 2;
            } else {
                scaled <<= 1;
            }
        }

        let index = ((scaled >> 44) & 0xFF) as usize;
        let mut result_exp = ((2045 - x_exp) as u64) & 0x7FF;
        let mut fraction = (self.recip[index] as u64) << 44;

        if result_exp == 0 {
            fraction >>= 1;
            fraction |= 1u64 << 51;
        } else if result_exp == 0x7FF {
            result_exp = 0;
            fraction >>= 2;
            fraction |= 1u64 << 50;
        }

        f64::from_bits(x_sign | (result_exp << 52) | fraction)
    }

    pub fn recip_estimate_f32(&self, x: f32) -> f32 {
        self.recip_estimate(x as f64) as f32
    }

    pub fn inv_sqrt_estimate(&self, x: f64) -> f64 {
        let x_bits = x.to_bits();
        let x_sign = x_bits & 0x8000_0000_0000_0000;
        let mut x_exp = ((x_bits >> 52) & 0x7FF) as i64;
        let mut scaled = x_bits & ((1u64 << 52) - 1);

        if x_exp == 0x7FF && scaled != 0 {
            return f64::from_bits(x_bits | 0x0008_0000_0000_0000);
        }

        if x_exp == 0 {
            if scaled == 0 {
                return f64::from_bits(x_sign | 0x7FF0_0000_0000_0000);
            }
            while scaled & (1u64 << 51) == 0 {
                scaled <<= 1;
                x_exp -= 1;
            }
            scaled <<= 1;
        }

        if x_sign != 0 {
            return f64::from_bits(0x7FF8_0000_0000_0000);
        }

        if x_exp == 0x7FF {
            return f64::from_bits(x_sign);
        }

        let index = if x_exp & 1 == 1 {
            ((scaled >> 45) & 0xFF) | 0x80
        } else {
            ((scaled >> 44) & 0xFF) | 0x100
        };

        let result_exp = (((3068 - x_exp) / 2) as u64) & 0x7FF;
        let fraction = (self.inv_sqrt[index as usize] as u64) << 44;

        f64::from_bits(x_sign | (result_exp << 52) | fraction)
    }

    pub fn inv_sqrt_estimate_f32(&self, x: f32) -> f32 {
        self.inv_sqrt_estimate(x as f64) as f32
    }
}
