// kernel/src/console/backend.rs
//
// 役割:
// - Console がセルを読み書きするための狭い口（DisplayBackend）を定義する。
// やること:
// - VgaBuffer: 0xb8000 の MMIO を volatile で叩く実装（unsafe はここだけ）
// - MemoryBuffer: ただの配列。テストや画面のオフスクリーン描画に使う
// やらないこと:
// - カーソル移動・折り返し・スクロールの判断（それは Console の責務）

use volatile::Volatile;
use x86_64::instructions::port::Port;

use super::color::Attribute;

pub const BUFFER_HEIGHT: usize = 25;
pub const BUFFER_WIDTH: usize = 80;

/// VGA テキストバッファの物理アドレス（identity map 前提）
pub const VGA_BUFFER_ADDR: usize = 0xb8000;

const CRTC_INDEX_PORT: u16 = 0x3d4;
const CRTC_DATA_PORT: u16 = 0x3d5;
const CRTC_CURSOR_HIGH: u8 = 0x0e;
const CRTC_CURSOR_LOW: u8 = 0x0f;

/// ハードウェアと同じ 2 バイトのセル
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenChar {
    pub ascii_character: u8,
    pub attribute: Attribute,
}

impl ScreenChar {
    pub const fn blank(attribute: Attribute) -> ScreenChar {
        ScreenChar {
            ascii_character: b' ',
            attribute,
        }
    }
}

/// 表示デバイスへの唯一の依存点。
///
/// row/col は常に `BUFFER_HEIGHT` / `BUFFER_WIDTH` 未満で呼ばれる。
pub trait DisplayBackend {
    fn read_cell(&self, row: usize, col: usize) -> ScreenChar;

    fn write_cell(&mut self, row: usize, col: usize, cell: ScreenChar);

    /// 点滅カーソルの位置を合わせる（無ければ何もしない）
    fn set_hw_cursor(&mut self, row: usize, col: usize) {
        let _ = (row, col);
    }
}

#[repr(transparent)]
struct VgaFrame {
    chars: [[Volatile<ScreenChar>; BUFFER_WIDTH]; BUFFER_HEIGHT],
}

/// 実機の VGA テキストバッファ
pub struct VgaBuffer {
    frame: &'static mut VgaFrame,
}

impl VgaBuffer {
    /// 0xb8000 のテキストバッファを掴む。
    ///
    /// # Safety
    /// - 0xb8000 から 4000 バイトが書き込み可能にマップされていること
    /// - 同時に 2 個以上の VgaBuffer を作らないこと
    pub unsafe fn new() -> VgaBuffer {
        Self::at(VGA_BUFFER_ADDR)
    }

    /// # Safety
    /// `new` と同じ条件を `addr` について満たすこと。
    unsafe fn at(addr: usize) -> VgaBuffer {
        VgaBuffer {
            frame: &mut *(addr as *mut VgaFrame),
        }
    }
}

impl DisplayBackend for VgaBuffer {
    fn read_cell(&self, row: usize, col: usize) -> ScreenChar {
        self.frame.chars[row][col].read()
    }

    fn write_cell(&mut self, row: usize, col: usize, cell: ScreenChar) {
        self.frame.chars[row][col].write(cell);
    }

    fn set_hw_cursor(&mut self, row: usize, col: usize) {
        let pos = (row * BUFFER_WIDTH + col) as u16;
        let mut index = Port::<u8>::new(CRTC_INDEX_PORT);
        let mut data = Port::<u8>::new(CRTC_DATA_PORT);

        unsafe {
            index.write(CRTC_CURSOR_LOW);
            data.write((pos & 0xff) as u8);
            index.write(CRTC_CURSOR_HIGH);
            data.write((pos >> 8) as u8);
        }
    }
}

/// 配列で持つ表示面。初期値は全セル 0（NUL / 黒地に黒）。
pub struct MemoryBuffer {
    cells: [[ScreenChar; BUFFER_WIDTH]; BUFFER_HEIGHT],
    hw_cursor: Option<(usize, usize)>,
}

impl MemoryBuffer {
    pub const fn new() -> MemoryBuffer {
        MemoryBuffer {
            cells: [[ScreenChar {
                ascii_character: 0,
                attribute: Attribute::empty(),
            }; BUFFER_WIDTH]; BUFFER_HEIGHT],
            hw_cursor: None,
        }
    }

    /// 最後に設定されたハードウェアカーソル位置
    pub fn hw_cursor(&self) -> Option<(usize, usize)> {
        self.hw_cursor
    }

    pub fn row(&self, row: usize) -> &[ScreenChar; BUFFER_WIDTH] {
        &self.cells[row]
    }
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for MemoryBuffer {
    fn read_cell(&self, row: usize, col: usize) -> ScreenChar {
        self.cells[row][col]
    }

    fn write_cell(&mut self, row: usize, col: usize, cell: ScreenChar) {
        self.cells[row][col] = cell;
    }

    fn set_hw_cursor(&mut self, row: usize, col: usize) {
        self.hw_cursor = Some((row, col));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_char_matches_hardware_layout() {
        assert_eq!(core::mem::size_of::<ScreenChar>(), 2);
        assert_eq!(
            core::mem::size_of::<VgaFrame>(),
            BUFFER_WIDTH * BUFFER_HEIGHT * 2
        );
    }

    #[test]
    fn memory_buffer_starts_zeroed() {
        let buf = MemoryBuffer::new();
        assert_eq!(buf.read_cell(0, 0).ascii_character, 0);
        assert_eq!(buf.read_cell(BUFFER_HEIGHT - 1, BUFFER_WIDTH - 1).attribute.bits(), 0);
        assert_eq!(buf.hw_cursor(), None);
    }

    #[test]
    fn memory_buffer_stores_cells() {
        let mut buf = MemoryBuffer::new();
        let cell = ScreenChar {
            ascii_character: b'A',
            attribute: Attribute::DEFAULT,
        };
        buf.write_cell(3, 7, cell);
        buf.set_hw_cursor(3, 8);

        assert_eq!(buf.read_cell(3, 7), cell);
        assert_eq!(buf.row(3)[7], cell);
        assert_eq!(buf.hw_cursor(), Some((3, 8)));
    }
}
