//! # Rheto Scoring
//!
//! 把用户提交的文字（论证、创意列表、故事、概念图）交给大模型按评分细则打分，
//! 解析模型返回的 JSON，截断各项分数并计算综合分。
//! 记忆效率分和词汇论证分不调用模型，直接按公式计算。
//!
//! ## 架构设计
//!
//! ### ① 评分核心（Scoring）
//! - `scoring/` - 纯函数，不做任何 IO
//! - `extract_json` - 从模型输出中恢复 JSON 对象
//! - `Rubric` / `ScoreRecord` - 细则校验与分数截断
//! - `CompositeFormula` - 加权求和 / 得分占满分比例
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `TextGenerator` / `LlmService` - 文本生成能力（主模型 + 一次备用模型重试）
//! - `SessionHistories` - 按会话记住最近生成的话题
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次评分"/"一次话题生成"的完整流程
//! - `GradingFlow` - 提示词 → 模型 → 提取 → 校验 → 综合分
//! - `TopicFlow` - 避开最近话题生成新话题
//!
//! ### ④ 接口层（Api）
//! - `api/` - axum 路由，错误到 HTTP 状态码的映射
//! - `app` - 启动和运行服务
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod scoring;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use api::{create_router, AppState};
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, ScoringError};
pub use scoring::{compute_composite, extract_json, score, CompositeFormula, Rubric, ScoreRecord};
pub use services::{LlmService, TextGenerator};
pub use workflow::{GradeOutcome, GradingFlow, TopicFlow};
