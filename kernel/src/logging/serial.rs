// kernel/src/logging/serial.rs
//
// COM1 (0x3F8) への最小限のシリアル出力。
// - init(): 115200bps, 8N1 に初期化（二度目以降は何もしない）
// - write_str(): 文字列を送信（'\n' は "\r\n" に展開）
//
// 状態は spin::Mutex で守る。panic 経路はこのロックを使わない（panic.rs 参照）。

use core::fmt;
use spin::Mutex;
use x86_64::instructions::port::Port;

pub const COM1_BASE: u16 = 0x3F8;

const LSR_THR_EMPTY: u8 = 0x20;

pub struct SerialPort {
    base: u16,
    initialized: bool,
}

impl SerialPort {
    pub const fn new(base: u16) -> Self {
        SerialPort {
            base,
            initialized: false,
        }
    }

    fn init(&mut self) {
        if self.initialized {
            return;
        }

        let mut int_en = Port::<u8>::new(self.base + 1);
        let mut line_ctrl = Port::<u8>::new(self.base + 3);
        let mut div_low = Port::<u8>::new(self.base);
        let mut div_high = Port::<u8>::new(self.base + 1);
        let mut fifo_ctrl = Port::<u8>::new(self.base + 2);
        let mut modem_ctrl = Port::<u8>::new(self.base + 4);

        unsafe {
            int_en.write(0x00);

            // DLAB=1 で divisor 1 (115200bps)
            line_ctrl.write(0x80);
            div_low.write(0x01);
            div_high.write(0x00);

            line_ctrl.write(0x03);
            fifo_ctrl.write(0xC7);
            modem_ctrl.write(0x0B);
        }

        self.initialized = true;
    }

    fn write_byte(&mut self, byte: u8) {
        let mut line_status = Port::<u8>::new(self.base + 5);
        let mut data = Port::<u8>::new(self.base);

        unsafe {
            while (line_status.read() & LSR_THR_EMPTY) == 0 {}
            data.write(byte);
        }
    }
}

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.init();
        for b in s.bytes() {
            if b == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(b);
        }
        Ok(())
    }
}

static COM1: Mutex<SerialPort> = Mutex::new(SerialPort::new(COM1_BASE));

pub fn init() {
    COM1.lock().init();
}

pub fn write_fmt(args: fmt::Arguments<'_>) {
    use fmt::Write;
    let _ = COM1.lock().write_fmt(args);
}

pub fn try_write_fmt(args: fmt::Arguments<'_>) -> bool {
    use fmt::Write;
    match COM1.try_lock() {
        Some(mut port) => port.write_fmt(args).is_ok(),
        None => false,
    }
}
