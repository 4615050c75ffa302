// kernel/src/arch/mod.rs
//
// アーキ依存部。unsafe をできるだけここに閉じ込める方針。
// - cpu: hlt_loop / 割り込み禁止 / デバッガ用ブレークポイント

pub mod cpu;

/// CPU を停止させるループ
pub fn halt_loop() -> ! {
    cpu::halt_loop()
}

/// 割り込みを禁止する（cmain は割り込み無しで走り切る前提）
pub fn disable_interrupts() {
    cpu::disable_interrupts();
}

/// デバッガに制御を渡すためのフック。
/// feature `bochs_breakpoint` が無ければ何もしない。
#[inline(always)]
pub fn debug_breakpoint() {
    #[cfg(feature = "bochs_breakpoint")]
    cpu::bochs_magic_break();
}
