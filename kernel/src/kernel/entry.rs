// kernel/src/kernel/entry.rs
//
// bootcon: kernel entry glue
//
// 役割:
// - ブートローダから制御を受け取り、コンソールを作って挨拶を出す
//
// やること:
// - 割り込み禁止、デバッガフック、ログ初期化
// - VgaBuffer を 1 個だけ作り、Console に所有させる
// - 最後は hlt ループ（呼び出し元へは戻らない）
//
// やらないこと:
// - 前提条件の検査（0xb8000 がマップ済みかどうかはブートローダの責務）

use crate::console::{Console, DisplayBackend, VgaBuffer};
use crate::{arch, logging};

pub const GREETING: &str = "Hello, world!\n";

/// 画面を消して挨拶を出す
pub fn greet<B: DisplayBackend>(console: &mut Console<B>) {
    console.clear();
    console.print(GREETING, &[]);
}

/// カーネルの C 相当エントリ。ブートローダから 1 回だけ呼ばれる。
pub fn cmain() -> ! {
    arch::disable_interrupts();
    arch::debug_breakpoint();

    logging::init();
    logging::info("cmain() entered");

    // ブートローダが 0xb8000 を identity map 済み。VgaBuffer はここで 1 個だけ作る。
    let vga = unsafe { VgaBuffer::new() };
    let mut console = Console::new(vga);
    greet(&mut console);

    if console.format_errors() != 0 {
        logging::error("greeting rendered format error markers");
        logging::info_kv("console.format_errors", console.format_errors());
    }

    let cursor = console.cursor();
    logging::info_kv("console.row", cursor.row as u64);
    logging::info_kv("console.col", cursor.col as u64);
    logging::info("cmain() done; halting");

    arch::halt_loop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{Attribute, Cursor, MemoryBuffer, ScreenChar, BUFFER_HEIGHT, BUFFER_WIDTH};

    #[test]
    fn greet_clears_and_prints_greeting() {
        let mut console = Console::new(MemoryBuffer::new());
        console.write_str("left over from firmware");
        greet(&mut console);

        let first_row: Vec<u8> = console
            .backend()
            .row(0)
            .iter()
            .map(|c| c.ascii_character)
            .collect();
        assert!(first_row.starts_with(b"Hello, world!"));
        assert!(first_row[13..].iter().all(|&b| b == b' '));

        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                assert_eq!(
                    console.backend().read_cell(row, col),
                    ScreenChar::blank(Attribute::DEFAULT)
                );
            }
        }
        assert_eq!(console.cursor(), Cursor { row: 1, col: 0 });
        assert_eq!(console.scrolls(), 0);
        assert_eq!(console.format_errors(), 0);
    }
}
