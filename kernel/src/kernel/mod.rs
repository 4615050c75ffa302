// kernel/src/kernel/mod.rs
//
// カーネル本体の入口。
// - entry: cmain（ブートローダから 1 回だけ呼ばれ、戻らない）
// - greet: 画面を消して挨拶を出す（表示面に依存しないのでテストできる）

pub mod entry;

pub use entry::{cmain, greet, GREETING};
