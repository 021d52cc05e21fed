//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为跨版本转换引擎及其周边协作层（请求工厂、订阅关联）提供集中定义的错误域；
//! - 区分“计划构建缺陷”“协议字段缺失”“配置非法”等类别，方便运维与观测分流处理。
//!
//! ## 设计要求（What）
//! - 所有错误类型实现 `thiserror::Error` 以兼容 `std::error::Error` 生态；
//! - 保留细粒度枚举与上下文字段，支撑精确的告警与排障；
//! - 计划构建缺陷属于不可重试错误：同一键的纯函数重建必然复现同一失败。

use thiserror::Error;

use crate::{
    model::StructKind,
    version::SiriVersion,
};

/// SIRI 转换核心错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：聚合版本解析、映射计划构建、报文关联等关键路径的异常，
///   让调用方可以依据变体精确决定“拒绝消息”“记录告警”还是“视为部署缺陷”。
/// - **契约 (What)**：
///   - 所有变体均为 `Send + Sync + 'static`，可安全跨线程传播；
///   - [`PlanDefect`](Self::PlanDefect) 与 [`UnknownStructure`](Self::UnknownStructure)
///     表示模式演进或表格维护失误，属于不可恢复类别，禁止对同一类型对重试；
///   - [`MissingArgument`](Self::MissingArgument) 表示单条报文级别的可恢复失败，
///     不应影响缓存或其他类型对的转换。
/// - **设计权衡 (Trade-offs)**：上下文统一使用 `String`/`&'static str`，
///   牺牲少量堆分配换取日志可读性；属性名与参数名均来源于静态表格，天然 `'static`。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SiriError {
    /// 请求了受支持集合之外的模式版本号。
    ///
    /// - **意图 (Why)**：在任何计划构建之前拦截配置错误，避免半途失败；
    /// - **契约 (What)**：`version_id` 为调用方传入的原始版本串。
    #[error("unknown SIRI version id `{version_id}`")]
    UnknownVersion { version_id: String },

    /// 必填字段或参数缺失。
    ///
    /// - **意图 (Why)**：对应协议层的 `SubscriberRef`/`SubscriptionRef` 等关联字段，
    ///   以及请求工厂的 `Url` 等必填配置；携带字段名以便调用方决定丢弃或告警；
    /// - **风险 (Trade-offs)**：该错误是报文级别的，调用方不应将其升级为进程级故障。
    #[error("missing required argument `{name}`")]
    MissingArgument { name: &'static str },

    /// 参数存在但取值无法解析。
    ///
    /// 与 [`MissingArgument`](Self::MissingArgument) 区分：字段在场但格式非法，
    /// `reason` 说明期望的格式。
    #[error("invalid value for argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// 目标版本不包含该结构种类的描述符。
    ///
    /// - **意图 (Why)**：直接请求把某结构转换到一个从未定义它的版本
    ///   （例如 1.0 模式中不存在的 SituationExchange 家族）时立即报错；
    /// - **契约 (What)**：嵌套在父结构中的同类情形按属性名不匹配静默丢弃，不走此变体。
    #[error("structure {kind:?} is not defined for SIRI version {version}")]
    UnknownStructure {
        version: SiriVersion,
        kind: StructKind,
    },

    /// 映射计划构建缺陷：同名属性无法用任何策略调和。
    ///
    /// - **意图 (Why)**：模式生成或表格维护出错时必须在首次构建时大声失败，
    ///   而不是静默丢数据；
    /// - **契约 (What)**：`property` 指向冲突的属性名，`reason` 描述两侧形状；
    /// - **风险 (Trade-offs)**：同一类型对重试只会复现同一失败，调用方不应重试。
    #[error(
        "conversion plan defect for {source_kind:?} ({source_version} -> {target_version}) \
         on property `{property}`: {reason}"
    )]
    PlanDefect {
        source_version: SiriVersion,
        target_version: SiriVersion,
        source_kind: StructKind,
        property: &'static str,
        reason: String,
    },

    /// 运行期发现字段值与描述符声明的形状不一致。
    ///
    /// 描述符声明为序列的字段必须存放 `Value::List`，单值字段不得存放列表；
    /// 该错误意味着上游构图代码存在缺陷。
    #[error(
        "value for property `{property}` on {kind:?} does not match its declared shape \
         (expected {expected})"
    )]
    MalformedValue {
        kind: StructKind,
        property: &'static str,
        expected: &'static str,
    },
}

/// 错误域专用的 `Result` 别名，减少签名噪声。
pub type Result<T, E = SiriError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StructKind;

    #[test]
    fn plan_defect_display_names_property_and_versions() {
        let err = SiriError::PlanDefect {
            source_version: SiriVersion::V1_0,
            target_version: SiriVersion::V1_3,
            source_kind: StructKind::VehicleMonitoringRequest,
            property: "LineRef",
            reason: "scalar family mismatch".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("LineRef"), "应包含冲突属性名");
        assert!(text.contains("1.0"), "应包含源版本号");
        assert!(text.contains("1.3"), "应包含目标版本号");
    }

    #[test]
    fn missing_argument_display_names_field() {
        let err = SiriError::MissingArgument {
            name: "SubscriptionRef",
        };
        assert_eq!(err.to_string(), "missing required argument `SubscriptionRef`");
    }
}
