use std::collections::HashMap;

use crate::config::{ProcessorState, FPSR_QC};
use crate::flags::Nzcv;
use crate::vector::Vector128;

/// Plain-data guest CPU used by the interpreter and the tests.
///
/// Exception hooks are recorded rather than serviced. Setting
/// `stop_on_exception` makes every hook stop the guest thread, which is how
/// tests exercise the "return 0" path of SVC/BRK/UND.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuState {
    pub x: [u64; 31],
    pub sp: u64,
    pub v: [Vector128; 32],
    pub flags: Nzcv,
    pub fpcr: u32,
    pub fpsr: u32,
    pub tpidr: u64,
    pub tpidrro: u64,
    pub counter: u64,
    /// Sparse 64-bit aligned memory, written only by DC ZVA.
    pub memory: HashMap<u64, u64>,
    pub svc_calls: Vec<(u64, u32)>,
    pub breakpoints: Vec<(u64, u32)>,
    pub undefined: Vec<(u64, u32)>,
    pub running: bool,
    pub stop_on_exception: bool,
    pub call_stack: Vec<u64>,
    pub exclusive_clears: u32,
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuState {
    pub fn new() -> Self {
        Self {
            x: [0; 31],
            sp: 0,
            v: [Vector128::ZERO; 32],
            flags: Nzcv::default(),
            fpcr: 0,
            fpsr: 0,
            tpidr: 0,
            tpidrro: 0,
            counter: 0,
            memory: HashMap::new(),
            svc_calls: Vec::new(),
            breakpoints: Vec::new(),
            undefined: Vec::new(),
            running: true,
            stop_on_exception: false,
            call_stack: Vec::new(),
            exclusive_clears: 0,
        }
    }

    /// Register `reg`, with 31 read as SP.
    pub fn reg(&self, reg: u8) -> u64 {
        match reg {
            0..=30 => self.x[reg as usize],
            31 => self.sp,
            _ => panic!("Invalid general register {}", reg),
        }
    }

    pub fn set_reg(&mut self, reg: u8, value: u64) {
        match reg {
            0..=30 => self.x[reg as usize] = value,
            31 => self.sp = value,
            _ => panic!("Invalid general register {}", reg),
        }
    }

    /// Whether FPSR.QC is set.
    pub fn saturated(&self) -> bool {
        self.fpsr & FPSR_QC != 0
    }

    pub fn read_memory_64(&self, address: u64) -> u64 {
        self.memory.get(&address).copied().unwrap_or(0)
    }

    fn raise(&mut self) {
        if self.stop_on_exception {
            self.running = false;
        }
    }
}

impl ProcessorState for CpuState {
    fn fpcr(&self) -> u32 {
        self.fpcr
    }

    fn set_fpcr(&mut self, value: u32) {
        self.fpcr = value;
    }

    fn fpsr(&self) -> u32 {
        self.fpsr
    }

    fn set_fpsr(&mut self, value: u32) {
        self.fpsr = value;
    }

    fn nzcv(&self) -> Nzcv {
        self.flags
    }

    fn set_nzcv(&mut self, nzcv: Nzcv) {
        self.flags = nzcv;
    }

    fn on_supervisor_call(&mut self, address: u64, imm: u32) {
        self.svc_calls.push((address, imm));
        self.raise();
    }

    fn on_breakpoint(&mut self, address: u64, imm: u32) {
        self.breakpoints.push((address, imm));
        self.raise();
    }

    fn on_undefined(&mut self, address: u64, opcode: u32) {
        self.undefined.push((address, opcode));
        self.raise();
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn enter_function(&mut self, target: u64) {
        self.call_stack.push(target);
    }

    fn exit_function(&mut self) {
        self.call_stack.pop();
    }

    fn clear_exclusive(&mut self) {
        self.exclusive_clears += 1;
    }

    fn tpidr(&self) -> u64 {
        self.tpidr
    }

    fn set_tpidr(&mut self, value: u64) {
        self.tpidr = value;
    }

    fn tpidrro(&self) -> u64 {
        self.tpidrro
    }

    fn counter(&self) -> u64 {
        self.counter
    }

    fn write_memory_64(&mut self, address: u64, value: u64) {
        self.memory.insert(address, value);
    }
}
