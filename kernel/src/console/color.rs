// kernel/src/console/color.rs
//
// VGA テキストモードの属性バイト。
// - bit 0..=2: 前景 B/G/R
// - bit 3    : 前景 bright
// - bit 4..=6: 背景 B/G/R
// - bit 7    : blink（BIOS 設定によっては背景 bright）

use bitflags::bitflags;

/// 16 色パレット（前景/背景の 4bit 値）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0x0,
    Blue = 0x1,
    Green = 0x2,
    Cyan = 0x3,
    Red = 0x4,
    Magenta = 0x5,
    Brown = 0x6,
    LightGray = 0x7,
    DarkGray = 0x8,
    LightBlue = 0x9,
    LightGreen = 0xa,
    LightCyan = 0xb,
    LightRed = 0xc,
    Pink = 0xd,
    Yellow = 0xe,
    White = 0xf,
}

bitflags! {
    /// セル 1 個分の表示属性
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct Attribute: u8 {
        const FG_BLUE = 1 << 0;
        const FG_GREEN = 1 << 1;
        const FG_RED = 1 << 2;
        const FG_BRIGHT = 1 << 3;
        const BG_BLUE = 1 << 4;
        const BG_GREEN = 1 << 5;
        const BG_RED = 1 << 6;
        const BLINK = 1 << 7;
    }
}

impl Attribute {
    /// 通常出力（LightGray on Black = 0x07）
    pub const DEFAULT: Attribute = Attribute::new(Color::LightGray, Color::Black);

    /// 書式エラーのマーカー（LightRed on Black = 0x0c）
    pub const ERROR: Attribute = Attribute::new(Color::LightRed, Color::Black);

    pub const fn new(foreground: Color, background: Color) -> Attribute {
        Attribute::from_bits_retain((foreground as u8) | ((background as u8) << 4))
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute::DEFAULT
    }
}
