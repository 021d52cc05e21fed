//! # siri-core
//!
//! ## 定位与职责（Why）
//! - 作为 SIRI 实时公交信息协议的跨版本转换核心，负责在互不线缆兼容的
//!   模式修订（1.0 / 1.3）之间转换请求、订阅与投递的对象图，使上层
//!   客户端只需面对单一规范版本编程。
//! - 通过把“每种报文 × 每对版本”的翻译规则收敛为静态类型描述表 +
//!   按需解析的转换计划，为后续模式修订的接入提供统一扩展点。
//!
//! ## 架构嵌入（Where）
//! - `model` 模块定义动态对象图（标量 / 结构 / 序列）与各修订的静态
//!   类型描述表，是其余一切的数据基座；
//! - `versioning` 模块承载转换引擎：属性转换策略、计划解析与并发
//!   计划缓存；
//! - `factory` 模块把扁平的字符串配置物化为规范版本的请求报文图；
//! - `subscription` 模块提供订阅身份与响应关联的支撑逻辑；
//! - `error` 模块集中定义错误类型，统一向外暴露 `thiserror` 风格的
//!   诊断信息。
//!
//! ## 并发与观测（Trade-offs）
//! - 引擎以 `&self` 接口对任意多线程开放，内部唯一共享状态是
//!   `dashmap` 计划缓存，解析期间不持有分片锁；
//! - 协议层异常（未知订阅、错误条件、通道状态失败）经 `tracing`
//!   字段化告警上报，不在本层中断数据流。

/// 错误类型与诊断信息集中声明处。
///
/// - **意图说明 (Why)**：统一描述版本解析、计划解析与报文取值各阶段的
///   失败形态；
/// - **契约定位 (What)**：使用 `thiserror::Error` 派生，携带足以定位
///   静态表格缺陷的上下文（版本对、结构种类、属性名）。
pub mod error;

/// 客户端请求工厂：字符串配置 → 规范版本报文图。
///
/// - **意图说明 (Why)**：把连接参数与报文构建集中在一处，转换引擎只
///   消费产物；
/// - **契约定位 (What)**：产出的 `payload` 恒为规范版本，降级交由
///   [`versioning::VersionConverter`] 完成。
pub mod factory;

/// 动态对象图与静态类型描述表。
///
/// - **意图说明 (Why)**：用封闭枚举 + 静态表格取代运行时反射，使属性
///   对应关系在编译产物中即可审计；
/// - **契约定位 (What)**：`StructValue` 是版本标记的字段容器，
///   `schema::descriptor` 按 `(版本, 结构种类)` 给出属性描述。
pub mod model;

/// 订阅身份与请求/响应/投递的关联支撑。
pub mod subscription;

/// 模式修订枚举与版本标识解析。
pub mod version;

/// 跨版本转换引擎：策略、计划与并发缓存。
pub mod versioning;

pub use error::{Result, SiriError};
pub use factory::{SiriClientRequest, SiriRequestFactory};
pub use model::{ModuleKind, Scalar, ScalarKind, StructKind, StructValue, TypeTag, Value};
pub use subscription::SubscriptionId;
pub use version::SiriVersion;
pub use versioning::VersionConverter;
