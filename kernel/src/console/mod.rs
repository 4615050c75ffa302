// kernel/src/console/mod.rs
//
// テキストコンソール。
//
// 役割:
// - 80x25 の表示面に文字を描き、カーソル (row, col) を一貫して保つ。
// やること:
// - clear / write_char / write_str / print（printf 風）
// - 行末での折り返し、最終行を越えたときのスクロール
// - 点滅カーソルを論理カーソルに追従させる
// やらないこと:
// - 表示面への生アクセス（DisplayBackend に閉じ込める）
// - グローバル状態（Console は cmain が所有し、&mut で渡す）
//
// 不変条件: 操作の合間は常に row < BUFFER_HEIGHT かつ col < BUFFER_WIDTH。

pub mod backend;
pub mod color;
pub mod format;

use core::fmt;

pub use backend::{DisplayBackend, MemoryBuffer, ScreenChar, VgaBuffer, BUFFER_HEIGHT, BUFFER_WIDTH};
pub use color::{Attribute, Color};
pub use format::{Arg, FormatError};

use format::{Directive, Rendered, Spec, NUM_BUF_LEN};

pub const TAB_WIDTH: usize = 8;

/// 表示できない文字の代わりに描く CP437 の '■'
const REPLACEMENT_GLYPH: u8 = 0xfe;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Cursor {
    pub const ORIGIN: Cursor = Cursor { row: 0, col: 0 };
}

pub struct Console<B: DisplayBackend> {
    backend: B,
    cursor: Cursor,
    attribute: Attribute,
    scrolls: u64,
    format_errors: u64,
}

impl<B: DisplayBackend> Console<B> {
    /// 表示面には触らない。画面を初期化したいなら clear() を呼ぶこと。
    pub fn new(backend: B) -> Self {
        Console {
            backend,
            cursor: Cursor::ORIGIN,
            attribute: Attribute::DEFAULT,
            scrolls: 0,
            format_errors: 0,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    pub fn set_attribute(&mut self, attribute: Attribute) {
        self.attribute = attribute;
    }

    /// 生成してからのスクロール回数
    pub fn scrolls(&self) -> u64 {
        self.scrolls
    }

    /// print が描いたマーカーの累計
    pub fn format_errors(&self) -> u64 {
        self.format_errors
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 全セルを既定属性の空白にし、カーソルを原点へ戻す
    pub fn clear(&mut self) {
        let blank = ScreenChar::blank(Attribute::DEFAULT);
        for row in 0..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                self.backend.write_cell(row, col, blank);
            }
        }
        self.cursor = Cursor::ORIGIN;
        self.sync_hw_cursor();
    }

    pub fn write_char(&mut self, c: char) {
        self.put_char(c);
        self.sync_hw_cursor();
    }

    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.put_char(c);
        }
        self.sync_hw_cursor();
    }

    /// printf 風の出力。
    ///
    /// 壊れたディレクティブはその場に赤字のマーカーを描いて先へ進む。
    /// 余った引数は無視する。
    pub fn print(&mut self, format: &str, args: &[Arg<'_>]) {
        let mut args = args.iter();
        for directive in format::parse(format) {
            match directive {
                Directive::Literal(s) => {
                    for c in s.chars() {
                        self.put_char(c);
                    }
                }
                Directive::Conversion(spec) => match args.next() {
                    Some(arg) => self.put_arg(&spec, arg),
                    None => self.put_marker(FormatError::MissingArgument(spec.conversion)),
                },
                Directive::Invalid(err) => self.put_marker(err),
            }
        }
        self.sync_hw_cursor();
    }

    fn put_arg(&mut self, spec: &Spec, arg: &Arg<'_>) {
        let mut buf = [0u8; NUM_BUF_LEN];
        let rendered = match spec.render(arg, &mut buf) {
            Ok(rendered) => rendered,
            Err(err) => return self.put_marker(err),
        };

        let pad = spec.width.saturating_sub(rendered.char_count());
        match rendered {
            Rendered::Number(digits) if spec.zero_pad => {
                // 符号はゼロ埋めより前に出す
                let digits = match digits.strip_prefix('-') {
                    Some(rest) => {
                        self.put_char('-');
                        rest
                    }
                    None => digits,
                };
                self.put_repeated('0', pad);
                self.put_str(digits);
            }
            Rendered::Number(s) | Rendered::Text(s) => {
                self.put_repeated(' ', pad);
                self.put_str(s);
            }
            Rendered::Char(c) => {
                self.put_repeated(' ', pad);
                self.put_char(c);
            }
        }
    }

    fn put_marker(&mut self, err: FormatError) {
        self.format_errors += 1;
        let saved = self.attribute;
        self.attribute = Attribute::ERROR;
        let _ = fmt::Write::write_fmt(&mut MarkerSink(self), format_args!("{}", err));
        self.attribute = saved;
    }

    fn put_str(&mut self, s: &str) {
        for c in s.chars() {
            self.put_char(c);
        }
    }

    fn put_repeated(&mut self, c: char, n: usize) {
        for _ in 0..n {
            self.put_char(c);
        }
    }

    fn put_char(&mut self, c: char) {
        match c {
            '\n' => self.new_line(),
            '\r' => self.cursor.col = 0,
            '\t' => loop {
                self.put_glyph(b' ');
                if self.cursor.col % TAB_WIDTH == 0 {
                    break;
                }
            },
            c => self.put_glyph(glyph_for(c)),
        }
    }

    fn put_glyph(&mut self, glyph: u8) {
        self.backend.write_cell(
            self.cursor.row,
            self.cursor.col,
            ScreenChar {
                ascii_character: glyph,
                attribute: self.attribute,
            },
        );
        self.cursor.col += 1;
        if self.cursor.col >= BUFFER_WIDTH {
            self.new_line();
        }
    }

    fn new_line(&mut self) {
        self.cursor.col = 0;
        if self.cursor.row + 1 < BUFFER_HEIGHT {
            self.cursor.row += 1;
        } else {
            self.scroll();
        }
    }

    fn scroll(&mut self) {
        for row in 1..BUFFER_HEIGHT {
            for col in 0..BUFFER_WIDTH {
                let cell = self.backend.read_cell(row, col);
                self.backend.write_cell(row - 1, col, cell);
            }
        }
        self.clear_row(BUFFER_HEIGHT - 1);
        self.scrolls += 1;
    }

    fn clear_row(&mut self, row: usize) {
        let blank = ScreenChar::blank(self.attribute);
        for col in 0..BUFFER_WIDTH {
            self.backend.write_cell(row, col, blank);
        }
    }

    fn sync_hw_cursor(&mut self) {
        self.backend.set_hw_cursor(self.cursor.row, self.cursor.col);
    }
}

impl<B: DisplayBackend> fmt::Write for Console<B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Console::write_str(self, s);
        Ok(())
    }
}

/// マーカー描画中はハードウェアカーソルを動かさない
struct MarkerSink<'c, B: DisplayBackend>(&'c mut Console<B>);

impl<B: DisplayBackend> fmt::Write for MarkerSink<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.put_str(s);
        Ok(())
    }
}

/// 印字可能 ASCII はそのまま、それ以外は代替グリフ
fn glyph_for(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        _ => REPLACEMENT_GLYPH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    fn console() -> Console<MemoryBuffer> {
        let mut con = Console::new(MemoryBuffer::new());
        con.clear();
        con
    }

    fn row_text(con: &Console<MemoryBuffer>, row: usize) -> String {
        con.backend()
            .row(row)
            .iter()
            .map(|c| c.ascii_character as char)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    fn is_blank(con: &Console<MemoryBuffer>, row: usize) -> bool {
        con.backend()
            .row(row)
            .iter()
            .all(|c| *c == ScreenChar::blank(Attribute::DEFAULT))
    }

    fn at(row: usize, col: usize) -> Cursor {
        Cursor { row, col }
    }

    #[test]
    fn clear_blanks_every_cell_and_homes_cursor() {
        let mut con = Console::new(MemoryBuffer::new());
        con.write_str("garbage\nmore garbage");
        con.clear();

        for row in 0..BUFFER_HEIGHT {
            assert!(is_blank(&con, row), "row {} not blank", row);
        }
        assert_eq!(con.cursor(), Cursor::ORIGIN);
        assert_eq!(con.backend().hw_cursor(), Some((0, 0)));
    }

    #[test]
    fn short_run_advances_column_only() {
        let mut con = console();
        con.write_char('\n');
        for n in 1..BUFFER_WIDTH {
            con.write_char('x');
            assert_eq!(con.cursor(), at(1, n));
        }
    }

    #[test]
    fn full_row_wraps_to_next_row() {
        let mut con = console();
        for _ in 0..BUFFER_WIDTH {
            con.write_char('a');
        }
        assert_eq!(con.cursor(), at(1, 0));
        assert_eq!(con.scrolls(), 0);
        assert_eq!(row_text(&con, 0), "a".repeat(BUFFER_WIDTH));

        con.write_char('b');
        assert_eq!(row_text(&con, 1), "b");
        assert_eq!(con.cursor(), at(1, 1));
    }

    #[test]
    fn full_last_row_scrolls() {
        let mut con = console();
        for _ in 0..BUFFER_HEIGHT - 1 {
            con.write_char('\n');
        }
        assert_eq!(con.cursor(), at(BUFFER_HEIGHT - 1, 0));

        for _ in 0..BUFFER_WIDTH {
            con.write_char('z');
        }
        assert_eq!(con.cursor(), at(BUFFER_HEIGHT - 1, 0));
        assert_eq!(con.scrolls(), 1);
        assert_eq!(row_text(&con, BUFFER_HEIGHT - 2), "z".repeat(BUFFER_WIDTH));
        assert!(is_blank(&con, BUFFER_HEIGHT - 1));
    }

    #[test]
    fn newline_moves_to_start_of_next_row() {
        let mut con = console();
        con.write_str("abc\n");
        assert_eq!(con.cursor(), at(1, 0));
        // 改行はグリフを書かない
        assert_eq!(row_text(&con, 0), "abc");
        assert!(is_blank(&con, 1));
    }

    #[test]
    fn one_scroll_per_newline_past_last_row() {
        let mut con = console();
        con.write_str("top line");
        con.write_char('\r');

        for n in 1..=BUFFER_HEIGHT * 2 {
            con.write_char('\n');
            let expected = n.saturating_sub(BUFFER_HEIGHT - 1) as u64;
            assert_eq!(con.scrolls(), expected, "after {} newlines", n);
        }

        assert_eq!(con.scrolls(), (BUFFER_HEIGHT + 1) as u64);
        assert_eq!(con.cursor(), at(BUFFER_HEIGHT - 1, 0));
        for row in 0..BUFFER_HEIGHT {
            assert!(is_blank(&con, row));
        }
    }

    #[test]
    fn scroll_moves_rows_up() {
        let mut con = console();
        for row in 0..BUFFER_HEIGHT {
            con.print("line %d\n", &[Arg::from(row)]);
        }
        assert_eq!(con.scrolls(), 1);
        assert_eq!(row_text(&con, 0), "line 1");
        assert_eq!(row_text(&con, BUFFER_HEIGHT - 2), "line 24");
        assert!(is_blank(&con, BUFFER_HEIGHT - 1));
    }

    #[test]
    fn print_decimal_writes_digits_in_order() {
        let mut con = console();
        con.print("%d", &[Arg::from(42)]);

        assert_eq!(con.cursor(), at(0, 2));
        assert_eq!(con.backend().read_cell(0, 0).ascii_character, b'4');
        assert_eq!(con.backend().read_cell(0, 1).ascii_character, b'2');
        assert_eq!(con.backend().read_cell(0, 1).attribute, Attribute::DEFAULT);
    }

    #[test]
    fn print_mixed_conversions() {
        let mut con = console();
        con.print(
            "%s at %08x: %c%c %u%% [%5d] [%-3]",
            &[
                Arg::from("vga"),
                Arg::from(0xb8000u32),
                Arg::from('o'),
                Arg::from('k'),
                Arg::from(100u32),
                Arg::from(-42),
            ],
        );
        assert_eq!(row_text(&con, 0), "vga at 000b8000: ok 100% [  -42] [<%-?>3]");
    }

    #[test]
    fn zero_padding_keeps_sign_in_front() {
        let mut con = console();
        con.print("%05d|%3s|%2c", &[Arg::from(-42), Arg::from("ab"), Arg::from('z')]);
        assert_eq!(row_text(&con, 0), "-0042| ab| z");
    }

    #[test]
    fn unknown_conversion_renders_error_marker() {
        let mut con = console();
        con.print("a%qb", &[]);

        assert_eq!(row_text(&con, 0), "a<%q?>b");
        assert_eq!(con.backend().read_cell(0, 0).attribute, Attribute::DEFAULT);
        for col in 1..6 {
            assert_eq!(con.backend().read_cell(0, col).attribute, Attribute::ERROR);
        }
        assert_eq!(con.backend().read_cell(0, 6).attribute, Attribute::DEFAULT);
        assert_eq!(con.attribute(), Attribute::DEFAULT);
    }

    #[test]
    fn missing_and_mismatched_arguments_render_markers() {
        let mut con = console();
        con.print("%d %s %d%", &[Arg::from(1), Arg::from(2)]);
        assert_eq!(row_text(&con, 0), "1 <%s:type> <%d:noarg><%:eos>");
    }

    #[test]
    fn surplus_arguments_are_ignored() {
        let mut con = console();
        con.print("%d", &[Arg::from(1), Arg::from(2)]);
        assert_eq!(row_text(&con, 0), "1");
    }

    #[test]
    fn clear_write_clear_round_trip() {
        let mut con = console();
        for _ in 0..7 {
            con.write_char('\n');
        }
        con.write_str("Hello");
        con.clear();

        for row in 0..BUFFER_HEIGHT {
            assert!(is_blank(&con, row));
        }
        assert_eq!(con.cursor(), Cursor::ORIGIN);
    }

    #[test]
    fn unprintable_chars_use_replacement_glyph() {
        let mut con = console();
        con.write_str("é\u{1}");
        assert_eq!(con.backend().read_cell(0, 0).ascii_character, REPLACEMENT_GLYPH);
        assert_eq!(con.backend().read_cell(0, 1).ascii_character, REPLACEMENT_GLYPH);
        assert_eq!(con.cursor(), at(0, 2));
    }

    #[test]
    fn tab_advances_to_next_stop() {
        let mut con = console();
        con.write_str("ab\tc");
        assert_eq!(con.cursor(), at(0, TAB_WIDTH + 1));
        assert_eq!(con.backend().read_cell(0, TAB_WIDTH).ascii_character, b'c');

        con.write_char('\t');
        assert_eq!(con.cursor(), at(0, TAB_WIDTH * 2));
    }

    #[test]
    fn tab_at_end_of_row_stops_at_wrap() {
        let mut con = console();
        for _ in 0..BUFFER_WIDTH - 3 {
            con.write_char('.');
        }
        con.write_char('\t');
        assert_eq!(con.cursor(), at(1, 0));
    }

    #[test]
    fn carriage_return_rewinds_column() {
        let mut con = console();
        con.write_str("abc\rX");
        assert_eq!(row_text(&con, 0), "Xbc");
        assert_eq!(con.cursor(), at(0, 1));
    }

    #[test]
    fn attribute_applies_to_following_writes() {
        let mut con = console();
        let green = Attribute::new(Color::Green, Color::Black);
        con.set_attribute(green);
        con.write_char('g');
        assert_eq!(con.backend().read_cell(0, 0).attribute, green);

        // clear は常に既定属性
        con.clear();
        assert!(is_blank(&con, 0));
        assert_eq!(con.attribute(), green);
    }

    #[test]
    fn scroll_fills_exposed_row_with_current_attribute() {
        let mut con = console();
        let white_on_blue = Attribute::new(Color::White, Color::Blue);
        for _ in 0..BUFFER_HEIGHT - 1 {
            con.write_char('\n');
        }
        con.set_attribute(white_on_blue);
        con.write_char('\n');

        assert_eq!(con.scrolls(), 1);
        for col in 0..BUFFER_WIDTH {
            assert_eq!(
                con.backend().read_cell(BUFFER_HEIGHT - 1, col),
                ScreenChar::blank(white_on_blue)
            );
        }
        // 上に送られた行は元の属性のまま
        assert!(is_blank(&con, BUFFER_HEIGHT - 2));

        con.clear();
        for row in 0..BUFFER_HEIGHT {
            assert!(is_blank(&con, row));
        }
    }

    #[test]
    fn format_errors_count_rendered_markers() {
        let mut con = console();
        con.print("%d ok", &[Arg::from(1)]);
        assert_eq!(con.format_errors(), 0);

        con.print("%q %d %s", &[Arg::from(1)]);
        assert_eq!(con.format_errors(), 2);
        // 書式エラーが無ければ増えない
        con.write_str("%q");
        assert_eq!(con.format_errors(), 2);
    }

    #[test]
    fn hw_cursor_follows_logical_cursor() {
        let mut con = console();
        con.write_str("hi\nthere");
        assert_eq!(con.backend().hw_cursor(), Some((1, 5)));
        con.print("%d", &[Arg::from(7)]);
        assert_eq!(con.backend().hw_cursor(), Some((1, 6)));
    }

    #[test]
    fn fmt_write_goes_through_console() {
        let mut con = console();
        write!(con, "{}-{:x}", 12, 255).unwrap();
        assert_eq!(row_text(&con, 0), "12-ff");
        assert_eq!(con.cursor(), at(0, 5));
    }
}
