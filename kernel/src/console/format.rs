// kernel/src/console/format.rs
//
// printf 風の書式文字列を「ディレクティブ」の列に分解し、引数を文字列化する。
//
// 受け付ける変換は閉じた集合:
//   %d %i  符号付き 10 進
//   %u     符号無し 10 進
//   %x %X  16 進（小文字/大文字）
//   %o     8 進
//   %b     2 進
//   %c     1 文字
//   %s     文字列
//   %%     '%' そのもの
// フラグは '0'（ゼロ埋め）と幅（最大 MAX_WIDTH）のみ。
//
// それ以外は FormatError として返し、描画側がマーカーを出す。
// heap は使わない（数値は呼び出し側のスタックバッファに書く）。

use core::fmt;

/// 幅指定の上限
pub const MAX_WIDTH: usize = 64;

/// 数値 1 個を描くのに必要なバッファ長（u64 の 2 進 64 桁 + 符号）
pub const NUM_BUF_LEN: usize = 65;

/// print に渡す引数
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg<'a> {
    Int(i64),
    Uint(u64),
    Char(char),
    Str(&'a str),
}

impl From<i32> for Arg<'_> {
    fn from(v: i32) -> Self {
        Arg::Int(v as i64)
    }
}

impl From<i64> for Arg<'_> {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<u8> for Arg<'_> {
    fn from(v: u8) -> Self {
        Arg::Uint(v as u64)
    }
}

impl From<u32> for Arg<'_> {
    fn from(v: u32) -> Self {
        Arg::Uint(v as u64)
    }
}

impl From<u64> for Arg<'_> {
    fn from(v: u64) -> Self {
        Arg::Uint(v)
    }
}

impl From<usize> for Arg<'_> {
    fn from(v: usize) -> Self {
        Arg::Uint(v as u64)
    }
}

impl From<char> for Arg<'_> {
    fn from(v: char) -> Self {
        Arg::Char(v)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(v: &'a str) -> Self {
        Arg::Str(v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    Signed,
    Unsigned,
    HexLower,
    HexUpper,
    Octal,
    Binary,
    Char,
    Str,
}

impl Conversion {
    fn from_byte(b: u8) -> Option<Conversion> {
        match b {
            b'd' | b'i' => Some(Conversion::Signed),
            b'u' => Some(Conversion::Unsigned),
            b'x' => Some(Conversion::HexLower),
            b'X' => Some(Conversion::HexUpper),
            b'o' => Some(Conversion::Octal),
            b'b' => Some(Conversion::Binary),
            b'c' => Some(Conversion::Char),
            b's' => Some(Conversion::Str),
            _ => None,
        }
    }

    /// マーカー表示用の代表文字
    pub fn letter(self) -> char {
        match self {
            Conversion::Signed => 'd',
            Conversion::Unsigned => 'u',
            Conversion::HexLower => 'x',
            Conversion::HexUpper => 'X',
            Conversion::Octal => 'o',
            Conversion::Binary => 'b',
            Conversion::Char => 'c',
            Conversion::Str => 's',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spec {
    pub conversion: Conversion,
    pub width: usize,
    pub zero_pad: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatError {
    UnknownConversion(char),
    MissingArgument(Conversion),
    ArgumentMismatch(Conversion),
    TruncatedSpecifier,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownConversion(c) => write!(f, "<%{}?>", c),
            FormatError::MissingArgument(conv) => write!(f, "<%{}:noarg>", conv.letter()),
            FormatError::ArgumentMismatch(conv) => write!(f, "<%{}:type>", conv.letter()),
            FormatError::TruncatedSpecifier => write!(f, "<%:eos>"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    Literal(&'a str),
    Conversion(Spec),
    Invalid(FormatError),
}

/// 書式文字列を先頭から順に Directive へ分解するイテレータ
pub struct Directives<'a> {
    rest: &'a str,
}

pub fn parse(format: &str) -> Directives<'_> {
    Directives { rest: format }
}

impl<'a> Iterator for Directives<'a> {
    type Item = Directive<'a>;

    fn next(&mut self) -> Option<Directive<'a>> {
        let rest: &'a str = self.rest;
        if rest.is_empty() {
            return None;
        }

        let bytes = rest.as_bytes();
        if bytes[0] != b'%' {
            let end = rest.find('%').unwrap_or(rest.len());
            let (lit, tail) = rest.split_at(end);
            self.rest = tail;
            return Some(Directive::Literal(lit));
        }

        if bytes.get(1) == Some(&b'%') {
            self.rest = &rest[2..];
            return Some(Directive::Literal(&rest[1..2]));
        }

        // '%' [0] [width] conv
        let mut i = 1;
        let mut zero_pad = false;
        if bytes.get(i) == Some(&b'0') {
            zero_pad = true;
            i += 1;
        }
        let mut width = 0usize;
        while let Some(&d) = bytes.get(i) {
            if !d.is_ascii_digit() {
                break;
            }
            width = (width * 10 + (d - b'0') as usize).min(MAX_WIDTH);
            i += 1;
        }

        // ここまでは ASCII なので i は char 境界
        let tail = &rest[i..];
        let Some(c) = tail.chars().next() else {
            self.rest = "";
            return Some(Directive::Invalid(FormatError::TruncatedSpecifier));
        };
        self.rest = &tail[c.len_utf8()..];

        let conversion = if c.is_ascii() {
            Conversion::from_byte(c as u8)
        } else {
            None
        };
        Some(match conversion {
            Some(conversion) => Directive::Conversion(Spec {
                conversion,
                width,
                zero_pad,
            }),
            None => Directive::Invalid(FormatError::UnknownConversion(c)),
        })
    }
}

/// 1 個の引数を文字列化した結果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rendered<'a> {
    /// 数値（ASCII のみ、先頭に '-' が付き得る）
    Number(&'a str),
    Char(char),
    Text(&'a str),
}

impl Rendered<'_> {
    /// 表示上の文字数（幅計算用）
    pub fn char_count(&self) -> usize {
        match self {
            Rendered::Number(s) => s.len(),
            Rendered::Char(_) => 1,
            Rendered::Text(s) => s.chars().count(),
        }
    }
}

impl Spec {
    pub fn render<'a>(
        &self,
        arg: &Arg<'a>,
        buf: &'a mut [u8; NUM_BUF_LEN],
    ) -> Result<Rendered<'a>, FormatError> {
        let (radix, upper) = match self.conversion {
            Conversion::Signed | Conversion::Unsigned => (10, false),
            Conversion::HexLower => (16, false),
            Conversion::HexUpper => (16, true),
            Conversion::Octal => (8, false),
            Conversion::Binary => (2, false),
            Conversion::Char | Conversion::Str => (0, false),
        };

        match (self.conversion, *arg) {
            (Conversion::Char, Arg::Char(c)) => Ok(Rendered::Char(c)),
            (Conversion::Str, Arg::Str(s)) => Ok(Rendered::Text(s)),
            (Conversion::Char | Conversion::Str, _) => {
                Err(FormatError::ArgumentMismatch(self.conversion))
            }
            (Conversion::Signed, Arg::Int(v)) => {
                Ok(Rendered::Number(format_radix(v.unsigned_abs(), radix, upper, v < 0, buf)))
            }
            // 符号無し変換では負数を 2 の補数のビット列として扱う（C と同じ）
            (_, Arg::Int(v)) => Ok(Rendered::Number(format_radix(v as u64, radix, upper, false, buf))),
            (_, Arg::Uint(v)) => Ok(Rendered::Number(format_radix(v, radix, upper, false, buf))),
            (_, Arg::Char(_) | Arg::Str(_)) => Err(FormatError::ArgumentMismatch(self.conversion)),
        }
    }
}

/// buf の末尾から桁を詰めて、使った部分を返す
fn format_radix(
    mut value: u64,
    radix: u64,
    upper: bool,
    negative: bool,
    buf: &mut [u8; NUM_BUF_LEN],
) -> &str {
    let digits: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };

    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = digits[(value % radix) as usize];
        value /= radix;
        if value == 0 {
            break;
        }
    }
    if negative {
        i -= 1;
        buf[i] = b'-';
    }

    // 書いたのは ASCII だけなので失敗しない
    core::str::from_utf8(&buf[i..]).unwrap_or("")
}
