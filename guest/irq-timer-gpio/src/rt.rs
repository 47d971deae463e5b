//! Reset entry, IRQ trampoline and panic handler for the bare-metal image.

/// CPSR control byte: IRQ mode, IRQ and FIQ masked
pub const IRQ_MODE_MASKED: u32 = 0xD2;
/// CPSR control byte: supervisor mode, IRQ and FIQ masked
pub const SVC_MODE_MASKED: u32 = 0xD3;
/// CPSR I bit
pub const IRQ_MASK: u32 = 1 << 7;

// Symbols from linker script
#[cfg(all(target_arch = "arm", target_os = "none"))]
unsafe extern "C" {
    static mut __sbss: u32;
    static mut __ebss: u32;
    static mut __sdata: u32;
    static mut __edata: u32;
    static __sidata: u32;
    static _stack_start: u32;
    static _irq_stack_start: u32;
    static vectors_start: u32;
    static vectors_end: u32;
}

/// Reset entry point
///
/// 1. IRQ-mode stack
/// 2. Supervisor stack
/// 3. BSS zeroing
/// 4. Data section copy (if LMA != VMA)
/// 5. Vector table relocation to address 0
/// 6. IRQ unmask (FIQ stays masked)
/// 7. Call to the firmware's `main`
///
/// The binary defines `main` with signature `extern "C" fn() -> !`.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[unsafe(naked)]
#[unsafe(no_mangle)]
#[unsafe(link_section = ".text._start")]
pub extern "C" fn _start() -> ! {
    core::arch::naked_asm!(
        // 1. IRQ-mode stack
        "msr cpsr_c, #{irq_mode}",
        "ldr sp, =_irq_stack_start",
        // 2. Supervisor stack
        "msr cpsr_c, #{svc_mode}",
        "ldr sp, =_stack_start",
        // 3. Zero BSS section
        "ldr r0, =__sbss",
        "ldr r1, =__ebss",
        "mov r2, #0",
        "0:",
        "cmp r0, r1",
        "bge 1f",
        "str r2, [r0], #4",
        "b 0b",
        "1:",
        // 4. Copy .data section (if LMA != VMA)
        "ldr r0, =__sdata",
        "ldr r1, =__edata",
        "ldr r2, =__sidata",
        "cmp r0, r2",
        "beq 3f",
        "2:",
        "cmp r0, r1",
        "bge 3f",
        "ldr r3, [r2], #4",
        "str r3, [r0], #4",
        "b 2b",
        "3:",
        // 5. Exception vectors to address 0, before anything can raise one
        "ldr r0, =vectors_start",
        "ldr r1, =vectors_end",
        "bl relocate_vectors",
        // 6. Unmask IRQ
        "mrs r0, cpsr",
        "bic r0, r0, #{irq_mask}",
        "msr cpsr_c, r0",
        // 7. Call main
        "bl main",
        // 8. Loop forever if main returns (shouldn't happen)
        "b .",
        irq_mode = const IRQ_MODE_MASKED,
        svc_mode = const SVC_MODE_MASKED,
        irq_mask = const IRQ_MASK,
    )
}

/// IRQ vector target
///
/// Saves the caller-saved registers on the IRQ stack, runs the dispatch
/// core, and returns to the interrupted instruction restoring CPSR from
/// SPSR. Six words keep the stack 8-byte aligned for the call.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[unsafe(naked)]
#[unsafe(no_mangle)]
pub extern "C" fn irq_entry() {
    core::arch::naked_asm!(
        "sub lr, lr, #4",
        "stmfd sp!, {{r0-r3, r12, lr}}",
        "bl irq_dispatch",
        "ldmfd sp!, {{r0-r3, r12, pc}}^",
    )
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    crate::exceptions::unhandled_panic(&crate::board::BOARD, &info.message())
}
