use std::sync::OnceLock;

use bitflags::bitflags;

bitflags! {
    /// Host SIMD features the accelerated backend may use.
    ///
    /// Each accelerated primitive names the features it needs; anything the
    /// host lacks falls back to the scalar per-lane sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HostCapabilities: u32 {
        const SSE2   = 1 << 0;
        const SSSE3  = 1 << 1;
        const SSE41  = 1 << 2;
        const SSE42  = 1 << 3;
        const AES    = 1 << 4;
        const SHA    = 1 << 5;
        const POPCNT = 1 << 6;
    }
}

static HOST_CAPABILITIES: OnceLock<HostCapabilities> = OnceLock::new();

impl HostCapabilities {
    /// Features of the machine we are running on, probed once.
    pub fn host() -> HostCapabilities {
        *HOST_CAPABILITIES.get_or_init(Self::detect)
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn detect() -> HostCapabilities {
        use raw_cpuid::CpuId;

        let cpuid = CpuId::new();
        let mut caps = HostCapabilities::empty();

        if let Some(feature_info) = cpuid.get_feature_info() {
            caps.set(HostCapabilities::SSE2, feature_info.has_sse2());
            caps.set(HostCapabilities::SSSE3, feature_info.has_ssse3());
            caps.set(HostCapabilities::SSE41, feature_info.has_sse41());
            caps.set(HostCapabilities::SSE42, feature_info.has_sse42());
            caps.set(HostCapabilities::AES, feature_info.has_aesni());
            caps.set(HostCapabilities::POPCNT, feature_info.has_popcnt());
        }

        if let Some(ext_features) = cpuid.get_extended_feature_info() {
            caps.set(HostCapabilities::SHA, ext_features.has_sha());
        }

        caps
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn detect() -> HostCapabilities {
        HostCapabilities::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_bitflags() {
        let caps = HostCapabilities::SSE2 | HostCapabilities::SSSE3;
        assert!(caps.contains(HostCapabilities::SSE2));
        assert!(!caps.contains(HostCapabilities::SSE41));
        assert!(HostCapabilities::all().contains(HostCapabilities::AES | HostCapabilities::SSE42));
    }

    #[test]
    fn test_host_detection_is_stable() {
        assert_eq!(HostCapabilities::host(), HostCapabilities::host());
    }

    #[test]
    fn test_from_bits_truncate() {
        let caps = HostCapabilities::from_bits_truncate(0b1_0000_0101);
        assert_eq!(caps, HostCapabilities::SSE2 | HostCapabilities::SSE41);
    }
}
