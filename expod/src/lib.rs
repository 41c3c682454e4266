//! Expod - order and item lifecycle coordination engine
//!
//! # 模块结构
//!
//! ```text
//! expod/src/
//! ├── orders/        # 订单事件溯源引擎 (commands, events, snapshots)
//! ├── services/      # 协作方接口 (station catalog, refunds)
//! └── utils/         # 工具函数 (logging)
//! ```
//!
//! The engine owns the order/item state machines; collaborators reach it
//! through [`OrdersManager::execute_command`] and the broadcast channel.

pub mod orders;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use orders::{OrderStorage, OrdersManager};
pub use services::{RefundService, StationCatalog};
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};
