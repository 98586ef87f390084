//! 案例库：Case 模型、存储接口、SQLite / 内存实现与后台重连

pub mod case;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod supervisor;
pub mod traits;

pub use case::Case;
pub use error::StoreError;
pub use memory::MemoryCaseStore;
pub use sqlite::SqliteCaseStore;
pub use supervisor::ReconnectSupervisor;
pub use traits::CaseStore;
