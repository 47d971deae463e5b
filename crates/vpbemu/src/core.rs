//! Core emulator API for the Versatile/PB board.
//!
//! This module provides the main emulator interface used by the command
//! line runner and by tests that drive a firmware image directly.

use crate::cp15;
use crate::cpu_types::{Exception, RESET_CPSR};
use crate::image::Image;
use crate::memory;
use crate::mmio;
use crate::scheduler::{QuantumResult, Scheduler, SchedulerConfig};
use crate::stimulus::StimulusConfig;
use std::time::Instant;
use tracing::info;
use unicorn_engine::{
    RegisterARM, Unicorn,
    unicorn_const::{Arch, Mode},
};
use versatilepb_hw::specs;

/// Configuration for the emulator
#[derive(Debug, Clone, Default)]
pub struct EmulatorConfig {
    /// Where to place the image (board default if unset)
    pub load_address: Option<u32>,
    /// Where to start executing (load address if unset)
    pub entry: Option<u32>,
    /// Stop when PC reaches this address
    pub stop_pc: Option<u64>,
    /// Stop after this many cycles
    pub max_instructions: Option<usize>,
    /// Optional timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Stop once the output pin has toggled this many times
    pub expect_toggles: Option<u64>,
    /// Signals driven onto the GPIO pins
    pub stimulus: StimulusConfig,
}

/// Result of running the emulator
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// Reached a stop condition (PC match, max instructions, toggle count)
    StopCondition,
    /// The core is spinning on a branch to itself at this address
    Halted(u64),
    /// Timeout reached
    Timeout,
    /// Emulation error occurred
    Error(String),
}

/// Core emulator for the Versatile/PB
pub struct EmulatorCore {
    emu: Unicorn<'static, mmio::EmulatorState>,
    scheduler: Scheduler,

    // Configuration
    timeout_ms: Option<u64>,
    start_time: Instant,
}

impl EmulatorCore {
    /// Create a new emulator from a raw firmware image
    pub fn new(image_data: &[u8], config: EmulatorConfig) -> Result<Self, String> {
        let image = Image::new(image_data, config.load_address, config.entry)
            .map_err(|e| format!("Failed to place image: {}", e))?;

        info!("Load address: {:#X}", image.load_address);
        info!("Entry: {:#X}", image.entry);
        info!("Image size: {:#X}", image.data.len());

        info!("=== ARM926 Setup ===");
        let emu_state = mmio::EmulatorState::new(&config.stimulus);
        let mut emu = Unicorn::new_with_data(Arch::ARM, Mode::LITTLE_ENDIAN, emu_state)
            .map_err(|e| format!("Failed to initialize ARM926: {:?}", e))?;

        memory::setup_memory(&mut emu)?;
        memory::load_image(&mut emu, &image)?;

        emu.reg_write(RegisterARM::CPSR, RESET_CPSR as u64)
            .map_err(|e| format!("Failed to write CPSR: {:?}", e))?;

        // Count instructions and intercept CP15 accesses
        emu.add_code_hook(0, u64::MAX, |uc, addr, _size| {
            let cpu = &mut uc.get_data_mut().cpu;
            cpu.instructions += 1;
            cpu.last_insn = addr;
            let mut insn_bytes = [0u8; 4];
            if uc.mem_read(addr, &mut insn_bytes).is_ok() {
                let insn = u32::from_le_bytes(insn_bytes);
                cp15::handle_cp15_instruction(uc, addr, insn);
            }
        })
        .map_err(|e| format!("Failed to add CP15 hook: {:?}", e))?;

        // Synchronous exceptions end the quantum; the scheduler enters them
        emu.add_intr_hook(|uc, intno| {
            let cpu = &mut uc.get_data_mut().cpu;
            match Exception::from_interrupt(intno) {
                Some(kind) => cpu.exception = Some((kind, cpu.last_insn)),
                None => cpu.unknown_interrupt = Some(intno),
            }
            let _ = uc.emu_stop();
        })
        .map_err(|e| format!("Failed to add exception hook: {:?}", e))?;

        let scheduler_config = SchedulerConfig {
            stop_pc: config.stop_pc,
            max_instructions: config.max_instructions,
            expect_toggles: config.expect_toggles,
            ..Default::default()
        };
        let scheduler = Scheduler::new(scheduler_config, &config.stimulus, image.entry as u64);

        Ok(Self {
            emu,
            scheduler,
            timeout_ms: config.timeout_ms,
            start_time: Instant::now(),
        })
    }

    /// Run a single quantum of execution
    pub fn step(&mut self) -> QuantumResult {
        self.scheduler.run_quantum(&mut self.emu)
    }

    /// Check if the run should end, and why
    fn stop_reason(&self) -> Option<StopReason> {
        if let Some(pc) = self.scheduler.halted_at() {
            return Some(StopReason::Halted(pc));
        }

        if self.scheduler.check_stop_conditions(self.emu.get_data()) {
            return Some(StopReason::StopCondition);
        }

        if let Some(timeout_ms) = self.timeout_ms {
            let elapsed_ms = self.start_time.elapsed().as_millis() as u64;
            if elapsed_ms >= timeout_ms {
                info!("Timeout reached: {} ms", elapsed_ms);
                return Some(StopReason::Timeout);
            }
        }

        None
    }

    /// Check if any stop condition is met
    pub fn should_stop(&self) -> bool {
        self.stop_reason().is_some()
    }

    /// Run until a stop condition is reached
    pub fn run(&mut self) -> StopReason {
        loop {
            if let Some(reason) = self.stop_reason() {
                return reason;
            }

            match self.step() {
                QuantumResult::Continue => {}
                QuantumResult::Error(e) => return StopReason::Error(e),
            }
        }
    }

    /// Get the current PC
    pub fn pc(&self) -> u64 {
        self.scheduler.pc()
    }

    /// Check if the core has stopped (reached the stop PC)
    pub fn stopped(&self) -> bool {
        self.scheduler.stopped()
    }

    /// Get total instructions executed
    pub fn total_executed(&self) -> u64 {
        self.emu.get_data().cpu.instructions
    }

    /// Emulated time in timer ticks
    pub fn ticks(&self) -> u64 {
        self.emu.get_data().cpu.ticks
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Number of level changes seen on the output pin
    pub fn output_toggles(&self) -> u64 {
        self.emu.get_data().gpio.output_toggles
    }

    /// Number of IRQ exceptions taken
    pub fn irqs_taken(&self) -> u64 {
        self.scheduler.irqs_taken()
    }

    /// Number of exceptions other than IRQ taken
    pub fn exceptions_taken(&self) -> u64 {
        self.scheduler.exceptions_taken()
    }

    /// Everything the firmware wrote to UART 0
    pub fn serial_output(&self) -> String {
        self.emu.get_data().uart.output()
    }

    /// Read a register
    pub fn reg(&self, reg: RegisterARM) -> u64 {
        self.emu.reg_read(reg).unwrap_or(0)
    }

    /// Get a reference to the emulator (for peripheral state access)
    pub fn emu(&self) -> &Unicorn<'static, mmio::EmulatorState> {
        &self.emu
    }

    /// Read memory from the core's perspective
    pub fn mem_read(&self, addr: u64, size: usize) -> Result<Vec<u8>, String> {
        let mut buf = vec![0u8; size];
        self.emu
            .mem_read(addr, &mut buf)
            .map_err(|e| format!("Mem read error: {:?}", e))?;
        Ok(buf)
    }

    /// Print final emulator state
    pub fn print_final_state(&self) {
        info!("Total instructions executed: {}", self.total_executed());
        info!(
            "Emulated time: {} ticks ({:.3} ms)",
            self.ticks(),
            self.ticks() as f64 * 1000.0 / specs::timer::CLOCK_HZ as f64
        );
        info!("Elapsed time: {:.2?}", self.elapsed());
        info!(
            "IRQs taken: {}, other exceptions: {}, trigger edges: {}, output toggles: {}",
            self.irqs_taken(),
            self.exceptions_taken(),
            self.scheduler.trigger_edges(),
            self.output_toggles()
        );

        info!(
            "ARM926: pc={:#x} cpsr={:#x} r0={:#x} r1={:#x} r2={:#x} r3={:#x} sp={:#x} lr={:#x}",
            self.pc(),
            self.reg(RegisterARM::CPSR),
            self.reg(RegisterARM::R0),
            self.reg(RegisterARM::R1),
            self.reg(RegisterARM::R2),
            self.reg(RegisterARM::R3),
            self.reg(RegisterARM::SP),
            self.reg(RegisterARM::LR)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu_types::{CpuMode, psr};

    fn words(program: &[u32]) -> Vec<u8> {
        program.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn rejects_empty_image() {
        assert!(EmulatorCore::new(&[], EmulatorConfig::default()).is_err());
    }

    #[test]
    fn self_branch_is_reported_as_halt() {
        let image = words(&[
            0xE3A0_0001, // mov r0, #1
            0xEAFF_FFFE, // b .
        ]);
        let mut emu = EmulatorCore::new(&image, EmulatorConfig::default()).unwrap();

        assert_eq!(emu.run(), StopReason::Halted(0x1_0004));
        assert_eq!(emu.reg(RegisterARM::R0), 1);
    }

    #[test]
    fn stops_at_stop_pc() {
        let image = words(&[
            0xE3A0_0001, // mov r0, #1
            0xE3A0_0002, // mov r0, #2
            0xE3A0_0003, // mov r0, #3
            0xEAFF_FFFE, // b .
        ]);
        let config = EmulatorConfig {
            stop_pc: Some(0x1_0008),
            ..Default::default()
        };
        let mut emu = EmulatorCore::new(&image, config).unwrap();

        assert_eq!(emu.run(), StopReason::StopCondition);
        assert!(emu.stopped());
        assert_eq!(emu.pc(), 0x1_0008);
        assert_eq!(emu.reg(RegisterARM::R0), 2);
    }

    #[test]
    fn uart_writes_reach_serial_output() {
        let image = words(&[
            0xE59F_0008, // ldr r0, [pc, #8]
            0xE3A0_1041, // mov r1, #'A'
            0xE580_1000, // str r1, [r0]
            0xEAFF_FFFE, // b .
            0x101F_1000, // UART 0
        ]);
        let mut emu = EmulatorCore::new(&image, EmulatorConfig::default()).unwrap();

        assert_eq!(emu.run(), StopReason::Halted(0x1_000C));
        assert_eq!(emu.serial_output(), "A");
    }

    #[test]
    fn image_honours_load_address() {
        let image = words(&[0xEAFF_FFFE]);
        let config = EmulatorConfig {
            load_address: Some(0x8000),
            ..Default::default()
        };
        let mut emu = EmulatorCore::new(&image, config).unwrap();

        assert_eq!(emu.pc(), 0x8000);
        assert_eq!(emu.mem_read(0x8000, 4).unwrap(), image);
        assert_eq!(emu.run(), StopReason::Halted(0x8000));
    }

    #[test]
    fn trigger_edge_wakes_parked_core_into_irq_vector() {
        let mut program: Vec<u32> = vec![
            0xEA00_000E, // 0x00: b 0x40
            0xEAFF_FFFE, // 0x04: b .
            0xEAFF_FFFE, // 0x08: b .
            0xEAFF_FFFE, // 0x0C: b .
            0xEAFF_FFFE, // 0x10: b .
            0xEAFF_FFFE, // 0x14: b .
            0xE3A0_5055, // 0x18: mov r5, #0x55
            0xEAFF_FFFE, // 0x1C: b .
        ];
        program.resize(0x40 / 4, 0);
        program.extend_from_slice(&[
            0xE59F_0020, // 0x40: ldr r0, =GPIO 0
            0xE3A0_1002, // 0x44: mov r1, #(1 << 1)
            0xE580_140C, // 0x48: str r1, [r0, #0x40C] (rising edge)
            0xE580_1410, // 0x4C: str r1, [r0, #0x410] (enable)
            0xE59F_2014, // 0x50: ldr r2, =VIC
            0xE3A0_1040, // 0x54: mov r1, #(1 << 6)
            0xE582_1010, // 0x58: str r1, [r2, #0x10]
            0xE321_F013, // 0x5C: msr cpsr_c, #0x13 (IRQs unmasked)
            0xEE07_0F90, // 0x60: mcr p15, 0, r0, c7, c0, 4
            0xEAFF_FFFD, // 0x64: b 0x60
            0x101E_4000,
            0x1014_0000,
        ]);
        let config = EmulatorConfig {
            load_address: Some(0),
            stimulus: StimulusConfig {
                loopback: false,
                trigger_period: Some(4_000),
            },
            ..Default::default()
        };
        let mut emu = EmulatorCore::new(&words(&program), config).unwrap();

        assert_eq!(emu.run(), StopReason::Halted(0x1C));
        assert_eq!(emu.irqs_taken(), 1);
        assert_eq!(emu.reg(RegisterARM::R5), 0x55);
        // LR - 4 is the instruction after the wait
        assert_eq!(emu.reg(RegisterARM::LR), 0x68);

        let cpsr = emu.reg(RegisterARM::CPSR) as u32;
        assert_eq!(CpuMode::from_cpsr(cpsr), Some(CpuMode::Irq));
        assert_ne!(cpsr & psr::I, 0);
    }

    /// Vectors at 0 branching to stub handlers that tag r6 and spin:
    /// undefined at 0x20, SWI at 0x28, data abort at 0x30. `body` starts
    /// at 0x40.
    fn with_stub_vectors(body: &[u32]) -> Vec<u8> {
        let mut program: Vec<u32> = vec![
            0xEA00_000E, // 0x00: b 0x40
            0xEA00_0005, // 0x04: b 0x20
            0xEA00_0006, // 0x08: b 0x28
            0xEAFF_FFFE, // 0x0C: b .
            0xEA00_0006, // 0x10: b 0x30
            0xEAFF_FFFE, // 0x14: b .
            0xEAFF_FFFE, // 0x18: b .
            0xEAFF_FFFE, // 0x1C: b .
            0xE3A0_6011, // 0x20: mov r6, #0x11
            0xEAFF_FFFE, // 0x24: b .
            0xE3A0_6022, // 0x28: mov r6, #0x22
            0xEAFF_FFFE, // 0x2C: b .
            0xE3A0_6033, // 0x30: mov r6, #0x33
            0xEAFF_FFFE, // 0x34: b .
        ];
        program.resize(0x40 / 4, 0);
        program.extend_from_slice(body);
        words(&program)
    }

    fn boot_at_zero(image: &[u8]) -> EmulatorCore {
        let config = EmulatorConfig {
            load_address: Some(0),
            ..Default::default()
        };
        EmulatorCore::new(image, config).unwrap()
    }

    #[test]
    fn undefined_instruction_enters_undefined_vector() {
        let image = with_stub_vectors(&[
            0xE3A0_0001, // 0x40: mov r0, #1
            0xE7F0_00F0, // 0x44: udf #0
            0xEAFF_FFFE, // 0x48: b .
        ]);
        let mut emu = boot_at_zero(&image);

        assert_eq!(emu.run(), StopReason::Halted(0x24));
        assert_eq!(emu.reg(RegisterARM::R6), 0x11);
        assert_eq!(emu.reg(RegisterARM::LR), 0x48);
        assert_eq!(emu.exceptions_taken(), 1);
        let cpsr = emu.reg(RegisterARM::CPSR) as u32;
        assert_eq!(CpuMode::from_cpsr(cpsr), Some(CpuMode::Undefined));
        assert_ne!(cpsr & psr::I, 0);
    }

    #[test]
    fn svc_enters_swi_vector() {
        let image = with_stub_vectors(&[
            0xEF00_0000, // 0x40: svc #0
            0xEAFF_FFFE, // 0x44: b .
        ]);
        let mut emu = boot_at_zero(&image);

        assert_eq!(emu.run(), StopReason::Halted(0x2C));
        assert_eq!(emu.reg(RegisterARM::R6), 0x22);
        assert_eq!(emu.reg(RegisterARM::LR), 0x44);
        let cpsr = emu.reg(RegisterARM::CPSR) as u32;
        assert_eq!(CpuMode::from_cpsr(cpsr), Some(CpuMode::Supervisor));
    }

    #[test]
    fn unmapped_load_enters_data_abort_vector() {
        let image = with_stub_vectors(&[
            0xE3A0_1203, // 0x40: mov r1, #0x30000000
            0xE591_0000, // 0x44: ldr r0, [r1]
            0xEAFF_FFFE, // 0x48: b .
        ]);
        let mut emu = boot_at_zero(&image);

        assert_eq!(emu.run(), StopReason::Halted(0x34));
        assert_eq!(emu.reg(RegisterARM::R6), 0x33);
        assert_eq!(emu.reg(RegisterARM::LR), 0x4C);
        let cpsr = emu.reg(RegisterARM::CPSR) as u32;
        assert_eq!(CpuMode::from_cpsr(cpsr), Some(CpuMode::Abort));
    }
}
