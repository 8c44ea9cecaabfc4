use std::sync::OnceLock;

use log::debug;

use crate::backend::{HostCapabilities, PackedBackend, ScalarBackend, VectorBackend};
use crate::flags::Nzcv;
use crate::soft::estimate::EstimateTables;
use crate::soft::fp::RoundingMode;

/// FPSR.QC, the cumulative saturation bit.
pub const FPSR_QC: u32 = 1 << 27;

/// Guest processor state the emitted code talks to at run time.
///
/// Register and flag storage is owned by the runtime; this trait covers the
/// control and system state plus the hooks for exceptions, call tracking and
/// the one memory write the core emits (DC ZVA).
pub trait ProcessorState: Send {
    fn fpcr(&self) -> u32;
    fn set_fpcr(&mut self, value: u32);
    fn fpsr(&self) -> u32;
    fn set_fpsr(&mut self, value: u32);

    /// Rounding mode selected by FPCR.RMode.
    fn rounding_mode(&self) -> RoundingMode {
        RoundingMode::from_fpcr(self.fpcr())
    }

    fn nzcv(&self) -> Nzcv;
    fn set_nzcv(&mut self, nzcv: Nzcv);

    /// Record that a saturating operation clamped (sets FPSR.QC).
    fn set_saturated(&mut self) {
        let fpsr = self.fpsr();
        self.set_fpsr(fpsr | FPSR_QC);
    }

    /// Called when SVC #imm is executed.
    fn on_supervisor_call(&mut self, address: u64, imm: u32);
    /// Called when BRK #imm is executed.
    fn on_breakpoint(&mut self, address: u64, imm: u32);
    /// Called for an undefined encoding; `opcode` is the raw instruction word.
    fn on_undefined(&mut self, address: u64, opcode: u32);
    /// False once a hook asked the guest thread to stop.
    fn is_running(&self) -> bool;

    fn enter_function(&mut self, _target: u64) {}
    fn exit_function(&mut self) {}
    fn clear_exclusive(&mut self) {}

    fn tpidr(&self) -> u64;
    fn set_tpidr(&mut self, value: u64);
    fn tpidrro(&self) -> u64;

    /// CNTPCT_EL0.
    fn counter(&self) -> u64;
    /// CNTFRQ_EL0.
    fn counter_frequency(&self) -> u64 {
        19_200_000
    }

    fn write_memory_64(&mut self, address: u64, value: u64);
}

/// Options controlling translation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationOptions {
    /// Emit enter/exit notifications around BL, BLR and RET.
    pub track_call_stack: bool,
    /// Allow the accelerated backend when the host supports it.
    pub accelerate: bool,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self { track_call_stack: false, accelerate: true }
    }
}

/// Everything emission depends on, built once and read-only afterwards.
pub struct EmitterConfig {
    capabilities: HostCapabilities,
    options: TranslationOptions,
    tables: EstimateTables,
    backend: Box<dyn VectorBackend>,
}

static GLOBAL_CONFIG: OnceLock<EmitterConfig> = OnceLock::new();

impl EmitterConfig {
    pub fn new(capabilities: HostCapabilities, options: TranslationOptions) -> Self {
        let backend: Box<dyn VectorBackend> = if options.accelerate && !capabilities.is_empty() {
            Box::new(PackedBackend::new(capabilities))
        } else {
            Box::new(ScalarBackend)
        };
        debug!("vector backend {} (capabilities {:?})", backend.name(), capabilities);
        Self {
            capabilities,
            options,
            tables: EstimateTables::build(),
            backend,
        }
    }

    /// Probe the host and accelerate where possible.
    pub fn detect() -> Self {
        Self::new(HostCapabilities::host(), TranslationOptions::default())
    }

    pub fn with_capabilities(capabilities: HostCapabilities) -> Self {
        Self::new(capabilities, TranslationOptions::default())
    }

    /// Per-lane fallbacks only.
    pub fn scalar() -> Self {
        Self::new(
            HostCapabilities::empty(),
            TranslationOptions { accelerate: false, ..TranslationOptions::default() },
        )
    }

    /// Process-wide detected configuration, initialised on first use.
    pub fn global() -> &'static EmitterConfig {
        GLOBAL_CONFIG.get_or_init(Self::detect)
    }

    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        if options.accelerate != self.options.accelerate {
            return Self::new(self.capabilities, options);
        }
        self.options = options;
        self
    }

    pub fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    pub fn options(&self) -> TranslationOptions {
        self.options
    }

    pub fn tables(&self) -> &EstimateTables {
        &self.tables
    }

    pub fn backend(&self) -> &dyn VectorBackend {
        self.backend.as_ref()
    }
}

impl std::fmt::Debug for EmitterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterConfig")
            .field("capabilities", &self.capabilities)
            .field("options", &self.options)
            .field("backend", &self.backend.name())
            .finish()
    }
}
