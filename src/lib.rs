//! Daily Report 门户后端服务
//!
//! 基于 Actix Web 构建，为学生、导师、合作学校和管理员提供小组、作品、
//! 消息、学习资源和对象存储接口。
//!
//! # 架构
//! - `authz`: 访问决策（角色、资源、bucket 规则、会话上下文）
//! - `cache`: 缓存层（Moka/Redis）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证、角色过滤与限流中间件
//! - `models`: 数据模型定义
//! - `object_store`: bucket 对象存储
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `search`: 学习资源 AI 推荐
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod authz;
pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod object_store;
pub mod routes;
pub mod runtime;
pub mod search;
pub mod services;
pub mod storage;
pub mod utils;
