//! Detective - 日志诊断服务
//!
//! 模块划分：
//! - **analysis**: 入口校验与分析编排（诊断必须成功，持久化尽力而为）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 优雅关闭
//! - **llm**: 推理端点客户端（超时 / 重试 / 错误分类）与 Mock
//! - **observability**: tracing 初始化
//! - **store**: 案例模型、SQLite / 内存案例库、后台重连
//! - **web**: axum 路由与 HTTP 错误映射

pub mod analysis;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod store;
pub mod web;

pub use analysis::{AnalysisError, AnalysisResponse, Analyzer};
pub use store::{Case, CaseStore};
