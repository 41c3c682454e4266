//! 服务层 - 协作方接口
//!
//! # 服务列表
//!
//! - [`StationCatalog`] - 出品工位目录（内存缓存，slug 解析）
//! - [`RefundService`] - 支付协作方退款接口（post-commit 调用）

pub mod refund;
pub mod station_catalog;

pub use refund::{RefundError, RefundService};
pub use station_catalog::StationCatalog;
