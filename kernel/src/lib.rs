// kernel/src/lib.rs
//
// bootcon: VGA テキストコンソールだけを持つ最小カーネル。
// - console: 表示面・カーソル・折り返し/スクロール・printf 風出力
// - kernel:  cmain（ブートローダから呼ばれる入口）
// - logging: COM1 への診断ログ
// - arch:    hlt / 割り込み / デバッガフック
//
// ホストで cargo test するときだけ std をリンクする。

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod console;
pub mod kernel;
pub mod logging;
