//! 互動式影片穩定化元件
//!
//! 由主選單呼叫：本機檔案、網址下載、工具檢查

mod main;

pub use main::VideoStabilizer;
