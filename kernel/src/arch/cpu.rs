// src/arch/cpu.rs
// CPU 命令ラッパ。unsafe は最小限。

pub fn halt_loop() -> ! {
    loop {
        unsafe {
            core::arch::asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }
}

pub fn disable_interrupts() {
    x86_64::instructions::interrupts::disable();
}

/// Bochs の magic breakpoint（magic_break: enabled=1 のときだけ止まる）。
/// 実機や QEMU ではただの nop と同じ。
#[cfg(feature = "bochs_breakpoint")]
pub fn bochs_magic_break() {
    unsafe {
        core::arch::asm!("xchg bx, bx", options(nomem, nostack, preserves_flags));
    }
}
