use std::fmt;

use crate::flags::Nzcv;

/// AArch64 condition codes, as encoded in B.cond, CSEL, CCMP and FCSEL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cond {
    EQ = 0,
    NE = 1,
    CS = 2,
    CC = 3,
    MI = 4,
    PL = 5,
    VS = 6,
    VC = 7,
    HI = 8,
    LS = 9,
    GE = 10,
    LT = 11,
    GT = 12,
    LE = 13,
    AL = 14,
    NV = 15, // behaves like AL
}

impl Cond {
    pub const HS: Cond = Cond::CS;
    pub const LO: Cond = Cond::CC;

    pub const ALL: [Cond; 16] = [
        Cond::EQ, Cond::NE, Cond::CS, Cond::CC, Cond::MI, Cond::PL, Cond::VS, Cond::VC,
        Cond::HI, Cond::LS, Cond::GE, Cond::LT, Cond::GT, Cond::LE, Cond::AL, Cond::NV,
    ];

    /// Flip the low bit. AL and NV both stay "always".
    pub fn invert(self) -> Cond {
        Cond::from_u8(self as u8 ^ 1)
    }

    pub fn from_u8(val: u8) -> Cond {
        Cond::ALL[(val & 0xF) as usize]
    }

    /// ConditionHolds.
    pub fn passed(self, nzcv: Nzcv) -> bool {
        let base = match self as u8 >> 1 {
            0 => nzcv.z,
            1 => nzcv.c,
            2 => nzcv.n,
            3 => nzcv.v,
            4 => nzcv.c && !nzcv.z,
            5 => nzcv.n == nzcv.v,
            6 => nzcv.n == nzcv.v && !nzcv.z,
            _ => return true,
        };
        if self as u8 & 1 != 0 { !base } else { base }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cond::EQ => "eq",
            Cond::NE => "ne",
            Cond::CS => "cs",
            Cond::CC => "cc",
            Cond::MI => "mi",
            Cond::PL => "pl",
            Cond::VS => "vs",
            Cond::VC => "vc",
            Cond::HI => "hi",
            Cond::LS => "ls",
            Cond::GE => "ge",
            Cond::LT => "lt",
            Cond::GT => "gt",
            Cond::LE => "le",
            Cond::AL => "al",
            Cond::NV => "nv",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_signed_and_unsigned() {
        let eq = Nzcv::new(false, true, true, false);
        assert!(Cond::EQ.passed(eq));
        assert!(Cond::HS.passed(eq));
        assert!(!Cond::HI.passed(eq));
        assert!(Cond::LS.passed(eq));
        assert!(Cond::GE.passed(eq));
        assert!(!Cond::GT.passed(eq));
        assert!(Cond::LE.passed(eq));

        let lt = Nzcv::new(true, false, false, false);
        assert!(Cond::LT.passed(lt));
        assert!(Cond::LO.passed(lt));
        assert!(Cond::MI.passed(lt));
    }

    #[test]
    fn test_always_and_never() {
        for bits in 0u32..16 {
            let nzcv = Nzcv::from_bits(bits << 28);
            assert!(Cond::AL.passed(nzcv));
            assert!(Cond::NV.passed(nzcv));
        }
    }

    #[test]
    fn test_invert_is_complement() {
        for cond in Cond::ALL.iter().take(14) {
            for bits in 0u32..16 {
                let nzcv = Nzcv::from_bits(bits << 28);
                assert_ne!(cond.passed(nzcv), cond.invert().passed(nzcv), "{}", cond);
            }
        }
    }
}
