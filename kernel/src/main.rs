// kernel/src/main.rs
//
// ブートローダ（bootloader 0.9）から呼ばれるイメージ本体。
// 中身はすべて lib 側。ここは入口と panic ハンドラだけ。

#![no_std]
#![no_main]

mod panic;

use bootloader::{entry_point, BootInfo};

entry_point!(kernel_main);

fn kernel_main(_boot_info: &'static BootInfo) -> ! {
    bootcon::kernel::cmain()
}
