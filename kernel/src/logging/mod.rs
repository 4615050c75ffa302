// kernel/src/logging/mod.rs
//
// 診断ログ。出力先は COM1 のみ。
// - コンソール（VGA）は cmain が所有しているので、ここからは触らない。
// - feature `no_serial_log` で丸ごと落とせる。

#[cfg(not(feature = "no_serial_log"))]
mod serial;

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

impl Level {
    pub const fn prefix(self) -> &'static str {
        match self {
            Level::Info => "[INFO] ",
            Level::Error => "[ERROR] ",
        }
    }
}

pub fn init() {
    #[cfg(not(feature = "no_serial_log"))]
    serial::init();
}

pub fn info(msg: &str) {
    log(Level::Info, format_args!("{}", msg));
}

pub fn error(msg: &str) {
    log(Level::Error, format_args!("{}", msg));
}

pub fn info_kv(key: &str, value: u64) {
    log(Level::Info, format_args!("{} = {}", key, value));
}

pub fn log(level: Level, args: fmt::Arguments<'_>) {
    #[cfg(not(feature = "no_serial_log"))]
    serial::write_fmt(format_args!("{}{}\n", level.prefix(), args));
    #[cfg(feature = "no_serial_log")]
    {
        let _ = (level, args);
    }
}

/// ロックが取れたときだけ書く（panic 経路用）。書けなければ false。
#[cfg(not(feature = "no_serial_log"))]
pub fn try_log(level: Level, args: fmt::Arguments<'_>) -> bool {
    serial::try_write_fmt(format_args!("{}{}\n", level.prefix(), args))
}

#[cfg(feature = "no_serial_log")]
pub fn try_log(level: Level, args: fmt::Arguments<'_>) -> bool {
    let _ = (level, args);
    false
}
