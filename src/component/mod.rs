//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod stabilizer;
pub mod video_request;
pub mod video_stabilizer;

pub use stabilizer::StabilizationPipeline;
pub use video_request::VideoRequestHandler;
pub use video_stabilizer::VideoStabilizer;
