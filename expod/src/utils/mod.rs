//! 工具模块 - 通用工具函数
//!
//! Currently only hosts the logging setup; the engine's error types live
//! next to the code that raises them.

pub mod logger;
