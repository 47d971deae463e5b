//! CPU scheduling for the single ARM926 core.
//!
//! Execution proceeds in quanta. Between quanta the scheduler brings
//! external stimulus up to date, takes a pending FIQ or IRQ if the core
//! accepts one, and lets emulated time pass: one timer tick per executed
//! instruction, or idle ticks while the core is parked in
//! wait-for-interrupt. No step crosses a stimulus transition, so every
//! trigger edge is seen.
//!
//! Unicorn does not vector synchronous exceptions itself. Undefined
//! instructions, `svc` and memory faults end the quantum and are entered
//! here by hand, the same way as interrupts.

use crate::cpu_types::{Exception, psr};
use crate::mmio;
use crate::stimulus::{Stimulus, StimulusConfig};
use tracing::{debug, error, info, warn};
use unicorn_engine::unicorn_const::uc_error;
use unicorn_engine::{RegisterARM, Unicorn};
use versatilepb_hw::memory_map::vectors;

// ================================================================================================
// Emulation Timing Constants
// ================================================================================================

/// Instructions (or idle ticks) per quantum
pub const INSTRUCTIONS_PER_QUANTUM: usize = 1_000;

/// `b .`, the encoding of a branch to itself
pub const SELF_BRANCH: u32 = 0xEAFF_FFFE;

/// Result of running a single quantum
#[derive(Debug, Clone, PartialEq)]
pub enum QuantumResult {
    /// Quantum completed successfully, continue execution
    Continue,
    /// An error occurred during execution
    Error(String),
}

/// Configuration for the scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Instructions per quantum
    pub quantum: usize,
    /// Stop when PC reaches this address
    pub stop_pc: Option<u64>,
    /// Stop after this many cycles (instructions plus time spent parked)
    pub max_instructions: Option<usize>,
    /// Stop once the output pin has toggled this many times
    pub expect_toggles: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum: INSTRUCTIONS_PER_QUANTUM,
            stop_pc: None,
            max_instructions: None,
            expect_toggles: None,
        }
    }
}

/// Scheduler for the emulated core
pub struct Scheduler {
    config: SchedulerConfig,
    stimulus: Stimulus,
    pc: u64,
    stopped: bool,
    halted_at: Option<u64>,
    irqs_taken: u64,
    exceptions_taken: u64,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(config: SchedulerConfig, stimulus: &StimulusConfig, entry: u64) -> Self {
        Self {
            config,
            stimulus: Stimulus::new(stimulus),
            pc: entry,
            stopped: false,
            halted_at: None,
            irqs_taken: 0,
            exceptions_taken: 0,
        }
    }

    /// Check if the core reached the stop PC
    pub fn stopped(&self) -> bool {
        self.stopped
    }

    /// Address of the self-branch the core is stuck on, if any
    pub fn halted_at(&self) -> Option<u64> {
        self.halted_at
    }

    /// Get the current PC
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Number of IRQ exceptions taken
    pub fn irqs_taken(&self) -> u64 {
        self.irqs_taken
    }

    /// Number of exceptions other than IRQ taken
    pub fn exceptions_taken(&self) -> u64 {
        self.exceptions_taken
    }

    /// Number of trigger edges generated
    pub fn trigger_edges(&self) -> u64 {
        self.stimulus.edges
    }

    /// Check if any stop condition is met
    pub fn check_stop_conditions(&self, state: &mmio::EmulatorState) -> bool {
        if self.stopped || self.halted_at.is_some() {
            return true;
        }

        if let Some(expected) = self.config.expect_toggles
            && state.gpio.output_toggles >= expected
        {
            return true;
        }

        if let Some(max) = self.config.max_instructions
            && state.cpu.ticks >= max as u64
        {
            return true;
        }

        false
    }

    fn is_stop_pc(&self, pc: u64) -> bool {
        self.config.stop_pc == Some(pc)
    }

    /// Enter `kind` on behalf of the instruction at `insn`
    fn enter_exception(
        &mut self,
        emu: &mut Unicorn<'static, mmio::EmulatorState>,
        kind: Exception,
        insn: u64,
    ) -> Result<(), String> {
        let cpsr = emu
            .reg_read(RegisterARM::CPSR)
            .map_err(|e| format!("CPSR read: {:?}", e))? as u32;
        let vector = (vectors::BASE + kind.vector_offset()) as u64;
        debug!(
            "{:?}: insn={:#X} cpsr={:#X} -> {:#X}",
            kind, insn, cpsr, vector
        );

        // Mode switch first so SPSR and LR land in the exception's bank
        let entry = [
            (RegisterARM::CPSR, kind.entry_cpsr(cpsr) as u64),
            (RegisterARM::SPSR, cpsr as u64),
            (RegisterARM::LR, kind.link_address(insn)),
            (RegisterARM::PC, vector),
        ];
        for (reg, value) in entry {
            emu.reg_write(reg, value)
                .map_err(|e| format!("{:?} entry ({:?}): {:?}", kind, reg, e))?;
        }

        self.pc = vector;
        match kind {
            Exception::Irq => self.irqs_taken += 1,
            _ => self.exceptions_taken += 1,
        }
        emu.get_data_mut().cpu.waiting = false;
        Ok(())
    }

    /// Take an FIQ or IRQ if the controller asserts the line and the core
    /// has it unmasked. A masked interrupt still ends wait-for-interrupt.
    fn take_interrupt(
        &mut self,
        emu: &mut Unicorn<'static, mmio::EmulatorState>,
    ) -> Result<(), String> {
        let state = emu.get_data();
        let (fiq, irq) = (state.fiq_asserted(), state.irq_asserted());
        if !fiq && !irq {
            return Ok(());
        }

        let cpsr = emu
            .reg_read(RegisterARM::CPSR)
            .map_err(|e| format!("CPSR read: {:?}", e))? as u32;
        let kind = if fiq && cpsr & psr::F == 0 {
            Exception::Fiq
        } else if irq && cpsr & psr::I == 0 {
            Exception::Irq
        } else {
            emu.get_data_mut().cpu.waiting = false;
            return Ok(());
        };

        // The next instruction to execute is the one the handler returns to
        self.enter_exception(emu, kind, self.pc)
    }

    /// Detect a core spinning on a branch to itself outside wait-for-interrupt
    fn check_halt(&mut self, emu: &Unicorn<'static, mmio::EmulatorState>) {
        if emu.get_data().cpu.waiting {
            return;
        }

        let mut insn = [0u8; 4];
        if emu.mem_read(self.pc, &mut insn).is_ok() && u32::from_le_bytes(insn) == SELF_BRANCH {
            info!("Core halted at {:#X}", self.pc);
            self.halted_at = Some(self.pc);
        }
    }

    /// Ticks to run or idle before the stimulus needs another look
    fn next_step(&self, now: u64) -> u64 {
        let quantum = self.config.quantum.max(1) as u64;
        self.stimulus
            .ticks_to_next_transition(now)
            .map_or(quantum, |ticks| ticks.clamp(1, quantum))
    }

    /// Run a single quantum of execution
    pub fn run_quantum(&mut self, emu: &mut Unicorn<'static, mmio::EmulatorState>) -> QuantumResult {
        let _span = tracing::error_span!("ARM926").entered();

        let now = emu.get_data().cpu.ticks;
        self.stimulus.apply(now, &mut emu.get_data_mut().gpio);

        if let Err(e) = self.take_interrupt(emu) {
            error!("{}", e);
            return QuantumResult::Error(e);
        }

        let step = self.next_step(now);
        if emu.get_data().cpu.waiting {
            emu.get_data_mut().advance(step);
            return QuantumResult::Continue;
        }

        let before = emu.get_data().cpu.instructions;
        let stop = self.config.stop_pc.unwrap_or(u64::MAX);
        let result = emu.emu_start(self.pc, stop, 0, step as usize);

        let executed = emu.get_data().cpu.instructions - before;
        emu.get_data_mut().advance(executed);
        self.pc = emu.reg_read(RegisterARM::PC).unwrap_or(self.pc);

        let cpu = &mut emu.get_data_mut().cpu;
        let raised = cpu.exception.take();
        let last_insn = cpu.last_insn;
        if let Some(intno) = cpu.unknown_interrupt.take() {
            let msg = format!("unknown interrupt {} at pc={:#X}", intno, last_insn);
            error!("{}", msg);
            return QuantumResult::Error(msg);
        }

        let fault = match (raised, result) {
            (Some(raised), _) => Some(raised),
            (None, Ok(())) => None,
            // Hitting the stop address is not an error
            (None, Err(_)) if self.is_stop_pc(self.pc) => None,
            (None, Err(e)) => match fault_exception(&e) {
                // A failed fetch faults at the address fetched from
                Some(Exception::PrefetchAbort) => Some((Exception::PrefetchAbort, self.pc)),
                Some(kind) => Some((kind, last_insn)),
                None => {
                    error!("{:?} at pc={:#X}", e, self.pc);
                    return QuantumResult::Error(format!("{:?} at pc={:#X}", e, self.pc));
                }
            },
        };

        if let Some((kind, insn)) = fault {
            warn!("{:?} at {:#X}", kind, insn);
            if let Err(e) = self.enter_exception(emu, kind, insn) {
                error!("{}", e);
                return QuantumResult::Error(e);
            }
            return QuantumResult::Continue;
        }

        if self.is_stop_pc(self.pc) {
            self.stopped = true;
        } else {
            self.check_halt(emu);
        }

        QuantumResult::Continue
    }
}

/// Exception the core would have taken for an `emu_start` error, if any
pub fn fault_exception(err: &uc_error) -> Option<Exception> {
    match err {
        uc_error::FETCH_UNMAPPED | uc_error::FETCH_PROT => Some(Exception::PrefetchAbort),
        uc_error::READ_UNMAPPED
        | uc_error::WRITE_UNMAPPED
        | uc_error::READ_PROT
        | uc_error::WRITE_PROT => Some(Exception::DataAbort),
        uc_error::INSN_INVALID => Some(Exception::Undefined),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_faults_become_aborts() {
        assert_eq!(
            fault_exception(&uc_error::FETCH_UNMAPPED),
            Some(Exception::PrefetchAbort)
        );
        assert_eq!(
            fault_exception(&uc_error::READ_UNMAPPED),
            Some(Exception::DataAbort)
        );
        assert_eq!(
            fault_exception(&uc_error::WRITE_PROT),
            Some(Exception::DataAbort)
        );
        assert_eq!(
            fault_exception(&uc_error::INSN_INVALID),
            Some(Exception::Undefined)
        );
        assert_eq!(fault_exception(&uc_error::NOMEM), None);
    }

    #[test]
    fn steps_stop_at_stimulus_transitions() {
        let scheduler = Scheduler::new(
            SchedulerConfig::default(),
            &StimulusConfig {
                trigger_period: Some(INSTRUCTIONS_PER_QUANTUM as u64),
                ..Default::default()
            },
            0,
        );
        assert_eq!(scheduler.next_step(0), 500);
        assert_eq!(scheduler.next_step(900), 100);

        let free_running = Scheduler::new(SchedulerConfig::default(), &StimulusConfig::default(), 0);
        assert_eq!(free_running.next_step(0), INSTRUCTIONS_PER_QUANTUM as u64);
    }
}
