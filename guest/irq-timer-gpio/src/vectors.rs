//! Exception vector table and its relocation to the fixed vector base.
//!
//! The table is linked with the rest of the image at 0x10000, but the core
//! fetches exception entries from address 0. Reset copies it down before
//! IRQs are unmasked; an exception taken before that jumps into whatever
//! RAM happens to hold.

use crate::regs::RegisterBus;
use core::ops::Range;

/// Copy the words in `src` to `dst`, lowest address first.
///
/// Copies `src.end - src.start` bytes, rounded up to whole words. The range
/// is trusted: a wrong `vectors_end` silently copies the wrong amount and
/// the first exception dispatches through garbage.
pub fn relocate<B: RegisterBus>(bus: &B, src: Range<usize>, dst: usize) {
    let mut from = src.start;
    let mut to = dst;
    while from < src.end {
        bus.write(to, bus.read(from));
        from += 4;
        to += 4;
    }
}

// Eight `ldr pc, [pc, #24]` entries followed by the eight handler addresses
// they load. The literals travel with the entries so the pc-relative loads
// still resolve once the block sits at address 0.
#[cfg(all(target_arch = "arm", target_os = "none"))]
core::arch::global_asm!(
    ".section .text.vectors, \"ax\"",
    ".arm",
    ".global vectors_start",
    ".global vectors_end",
    ".p2align 2",
    "vectors_start:",
    "    ldr pc, .Lreset_addr",
    "    ldr pc, .Lundefined_addr",
    "    ldr pc, .Lswi_addr",
    "    ldr pc, .Lprefetch_abort_addr",
    "    ldr pc, .Ldata_abort_addr",
    "    ldr pc, .Lreserved_addr",
    "    ldr pc, .Lirq_addr",
    "    ldr pc, .Lfiq_addr",
    ".Lreset_addr:          .word _start",
    ".Lundefined_addr:      .word undefined_entry",
    ".Lswi_addr:            .word swi_entry",
    ".Lprefetch_abort_addr: .word prefetch_abort_entry",
    ".Ldata_abort_addr:     .word data_abort_entry",
    ".Lreserved_addr:       .word _start",
    ".Lirq_addr:            .word irq_entry",
    ".Lfiq_addr:            .word fiq_entry",
    "vectors_end:",
);

/// Called from the reset entry with the linker's table bounds.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[unsafe(no_mangle)]
extern "C" fn relocate_vectors(start: usize, end: usize) {
    use versatilepb_hw::memory_map::vectors;
    relocate(&crate::regs::Volatile, start..end, vectors::BASE as usize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Access, SimBus};
    use versatilepb_hw::memory_map::vectors;

    const LINKED_AT: usize = 0x0001_0040;
    // 8 entries plus their 8 literals
    const TABLE_WORDS: usize = 2 * vectors::ENTRIES;

    fn linked_table(bus: &SimBus) -> Vec<u32> {
        let table: Vec<u32> = (0..TABLE_WORDS as u32)
            .map(|i| if i < 8 { 0xE59F_F018 } else { 0x0001_0000 + i * 0x40 })
            .collect();
        for (i, word) in table.iter().enumerate() {
            bus.poke(LINKED_AT + 4 * i, *word);
        }
        table
    }

    #[test]
    fn first_eight_words_land_at_the_vector_base() {
        let bus = SimBus::new();
        let table = linked_table(&bus);

        relocate(&bus, LINKED_AT..LINKED_AT + 4 * TABLE_WORDS, vectors::BASE as usize);

        for (i, word) in table.iter().take(vectors::ENTRIES).enumerate() {
            assert_eq!(bus.peek(vectors::BASE as usize + 4 * i), *word, "entry {i}");
        }
    }

    #[test]
    fn copies_exactly_the_range() {
        let bus = SimBus::new();
        let table = linked_table(&bus);
        bus.poke(4 * TABLE_WORDS, 0xDEAD_BEEF);

        relocate(&bus, LINKED_AT..LINKED_AT + 4 * TABLE_WORDS, 0);

        let copied: Vec<u32> = (0..TABLE_WORDS).map(|i| bus.peek(4 * i)).collect();
        assert_eq!(copied, table);
        assert_eq!(bus.peek(4 * TABLE_WORDS), 0xDEAD_BEEF);
    }

    #[test]
    fn copies_in_ascending_order() {
        let bus = SimBus::new();
        linked_table(&bus);

        relocate(&bus, LINKED_AT..LINKED_AT + 4 * TABLE_WORDS, 0);

        let destinations: Vec<usize> = bus
            .log()
            .into_iter()
            .filter_map(|a| match a {
                Access::Write(addr, _) => Some(addr),
                Access::Read(_) => None,
            })
            .collect();
        let expected: Vec<usize> = (0..TABLE_WORDS).map(|i| 4 * i).collect();
        assert_eq!(destinations, expected);
    }

    #[test]
    fn empty_range_copies_nothing() {
        let bus = SimBus::new();
        relocate(&bus, LINKED_AT..LINKED_AT, 0);
        assert!(bus.log().is_empty());
    }
}
