// kernel/src/panic.rs
//
// no_std カーネル用 panic ハンドラ。
// - 挙動は「ログ（取れればロック経由、駄目なら緊急出力） → CPU 停止」に固定する。
// - Console は cmain のスタック上にあるので触らない。
// - 二重 panic は即停止。

use core::fmt::{self, Write};
use core::panic::PanicInfo;
use core::sync::atomic::{AtomicBool, Ordering};

use x86_64::instructions::port::Port;

use bootcon::{arch, logging};

static PANIC_IN_PROGRESS: AtomicBool = AtomicBool::new(false);

// ─────────────────────────────────────────────
// 緊急出力（ロック無し）
// - QEMU debugcon(0xE9) と COM1(0x3F8)
// ─────────────────────────────────────────────

struct EmergencyWriter;

impl EmergencyWriter {
    fn write_byte(b: u8) {
        unsafe {
            Port::<u8>::new(0xE9).write(b);

            let mut lsr = Port::<u8>::new(0x3FD);
            let mut data = Port::<u8>::new(0x3F8);
            for _ in 0..10_000 {
                if (lsr.read() & 0x20) != 0 {
                    break;
                }
            }
            data.write(b);
        }
    }
}

impl Write for EmergencyWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for b in s.bytes() {
            Self::write_byte(b);
        }
        Ok(())
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    arch::disable_interrupts();

    if PANIC_IN_PROGRESS.swap(true, Ordering::AcqRel) {
        let _ = EmergencyWriter.write_str("[PANIC] re-entered => halt\n");
        return arch::halt_loop();
    }

    let (line, col) = info
        .location()
        .map(|loc| (loc.line(), loc.column()))
        .unwrap_or((0, 0));

    let logged = logging::try_log(
        logging::Level::Error,
        format_args!("kernel panic at line={} col={}: {}", line, col, info.message()),
    );
    if !logged {
        let _ = writeln!(
            EmergencyWriter,
            "[PANIC] kernel panic at line={} col={}: {}",
            line,
            col,
            info.message()
        );
    }

    arch::halt_loop()
}
