//! # subscription 模块说明
//!
//! ## 角色定位（Why）
//! - 定义订阅身份值类型 [`SubscriptionId`]，以及从各类报文中提取身份、
//!   组合协议异常告警的关联层支撑逻辑；
//! - 转换引擎本身不参与关联：这里的消费者拿到的是已转换完毕的报文图。
//!
//! ## 行为契约（What）
//! - `SubscriptionId` 是纯值类型：结构相等、两分量共同决定哈希，可直接
//!   作为 map 键关联请求、响应与投递；
//! - 两分量缺一不可，构造失败以 [`SiriError::MissingArgument`] 指名缺失
//!   字段（`SubscriberRef` / `SubscriptionRef`）——这是格式错误的协议
//!   报文，应上浮给调用方裁决，不得吞掉；
//! - 告警组合统一走 `tracing`，字段化输出取代手工字符串拼接。

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::{
    error::SiriError,
    model::{ModuleKind, StructValue},
};

/// 订阅方引用字段的公认名称。
pub const SUBSCRIBER_REF: &str = "SubscriberRef";
/// 订阅标识字段的公认名称。
pub const SUBSCRIPTION_REF: &str = "SubscriptionRef";

/// 订阅身份：订阅方标识 + 订阅标识。
///
/// # 教案式说明
/// - **意图 (Why)**：请求、响应与投递通过该键互相关联；等价/哈希契约是
///   关联正确性的不变量，任何一分量参与比较都不可省略；
/// - **契约 (What)**：
///   - 两分量必须非空；[`new`](Self::new) 对空串等同缺失；
///   - 实例按报文构造、关联后即弃，不持有任何资源；
/// - **设计权衡 (Trade-offs)**：只派生 `Serialize`，不提供反序列化入口，
///   避免绕过非空校验构造出非法身份。
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub struct SubscriptionId {
    subscriber_id: String,
    subscription_id: String,
}

impl SubscriptionId {
    /// 构造订阅身份；任一分量为空即失败并指名缺失字段。
    pub fn new(
        subscriber_id: impl Into<String>,
        subscription_id: impl Into<String>,
    ) -> Result<Self, SiriError> {
        Self::from_refs(
            Some(&subscriber_id.into()),
            Some(&subscription_id.into()),
        )
    }

    /// 从可选引用构造，`None` 与空串一视同仁。
    ///
    /// 提取路径（报文字段天然可选）统一走这里，错误命名以
    /// [`SUBSCRIBER_REF`]/[`SUBSCRIPTION_REF`] 为准。
    pub fn from_refs(
        subscriber_ref: Option<&str>,
        subscription_ref: Option<&str>,
    ) -> Result<Self, SiriError> {
        let subscriber_id = subscriber_ref
            .filter(|value| !value.is_empty())
            .ok_or(SiriError::MissingArgument {
                name: SUBSCRIBER_REF,
            })?;
        let subscription_id = subscription_ref
            .filter(|value| !value.is_empty())
            .ok_or(SiriError::MissingArgument {
                name: SUBSCRIPTION_REF,
            })?;
        Ok(Self {
            subscriber_id: subscriber_id.to_string(),
            subscription_id: subscription_id.to_string(),
        })
    }

    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(subscriber={} subscription={})",
            self.subscriber_id, self.subscription_id
        )
    }
}

/// 从订阅请求 + 功能模块订阅中提取订阅身份。
///
/// 订阅方优先取模块订阅自身的 `SubscriberRef`，缺失时回退到请求级的
/// `RequestorRef`；订阅标识取模块订阅的 `SubscriptionIdentifier`。
pub fn subscription_id_for_subscription_request(
    subscription_request: &StructValue,
    module_subscription: &StructValue,
) -> Result<SubscriptionId, SiriError> {
    let subscriber_ref = module_subscription
        .text(SUBSCRIBER_REF)
        .or_else(|| subscription_request.text("RequestorRef"));
    SubscriptionId::from_refs(
        subscriber_ref,
        module_subscription.text("SubscriptionIdentifier"),
    )
}

/// 从订阅/终止响应中的单条状态条目提取订阅身份。
pub fn subscription_id_for_status_response(
    status: &StructValue,
) -> Result<SubscriptionId, SiriError> {
    SubscriptionId::from_refs(status.text(SUBSCRIBER_REF), status.text(SUBSCRIPTION_REF))
}

/// 从功能模块投递中提取订阅身份。
pub fn subscription_id_for_module_delivery(
    module_delivery: &StructValue,
) -> Result<SubscriptionId, SiriError> {
    SubscriptionId::from_refs(
        module_delivery.text(SUBSCRIBER_REF),
        module_delivery.text(SUBSCRIPTION_REF),
    )
}

/// `ErrorCondition` 中按公认顺序检查的错误字段。
const ERROR_FIELDS: [&str; 8] = [
    "AccessNotAllowedError",
    "AllowedResourceUsageExceededError",
    "CapabilityNotSupportedError",
    "NoInfoForTopicError",
    "ServiceNotAvailableError",
    "UnknownSubscriberError",
    "UnknownSubscriptionError",
    "OtherError",
];

/// 将错误条件压缩为单行诊断文本（`errorType=… errorText=…` 片段拼接）。
///
/// 供告警组合使用；单独暴露以便直接断言文本内容。
pub fn error_condition_summary(condition: &StructValue) -> String {
    let mut summary = String::new();
    for field in ERROR_FIELDS {
        if let Some(text) = condition.text(field) {
            summary.push_str(" errorType=");
            summary.push_str(field);
            if !text.is_empty() {
                summary.push_str(" errorText=");
                summary.push_str(text);
            }
        }
    }
    if let Some(description) = condition.text("Description") {
        summary.push_str(" errorDescription=");
        summary.push_str(description);
    }
    summary
}

/// 收到订阅响应但没有任何在途订阅请求与之对应。
pub fn warn_unknown_subscription_response(response: &StructValue, id: &SubscriptionId) {
    warn!(
        address = response.text("Address").unwrap_or_default(),
        subscription_manager_address = response
            .text("SubscriptionManagerAddress")
            .unwrap_or_default(),
        responder_ref = response.text("ResponderRef").unwrap_or_default(),
        subscription_id = %id,
        "subscription response received with no pending subscription request"
    );
}

/// 订阅响应中的状态条目携带错误条件。
pub fn warn_error_in_subscription_response(
    response: &StructValue,
    status: &StructValue,
    id: &SubscriptionId,
) {
    let error = status
        .structure("ErrorCondition")
        .map(error_condition_summary)
        .unwrap_or_default();
    warn!(
        address = response.text("Address").unwrap_or_default(),
        responder_ref = response.text("ResponderRef").unwrap_or_default(),
        subscription_id = %id,
        error = error.as_str(),
        "error response received for a subscription request"
    );
}

/// 终止订阅响应中的状态条目携带错误条件。
pub fn warn_error_in_terminate_subscription_response(
    response: &StructValue,
    status: &StructValue,
    id: &SubscriptionId,
) {
    let error = status
        .structure("ErrorCondition")
        .map(error_condition_summary)
        .unwrap_or_default();
    warn!(
        address = response.text("Address").unwrap_or_default(),
        responder_ref = response.text("ResponderRef").unwrap_or_default(),
        subscription_id = %id,
        error = error.as_str(),
        "error response received for a terminate subscription request"
    );
}

/// 通道状态检查失败（服务重启或响应携带错误条件）。
pub fn warn_check_status_failure(
    address: &str,
    previous_service_started: Option<DateTime<Utc>>,
    response: &StructValue,
) {
    let error = response
        .structure("ErrorCondition")
        .map(error_condition_summary)
        .unwrap_or_default();
    warn!(
        address,
        previous_service_started = previous_service_started
            .map(|time| time.to_rfc3339())
            .unwrap_or_default(),
        new_service_started = response
            .time("ServiceStartedTime")
            .map(|time| time.to_rfc3339())
            .unwrap_or_default(),
        error = error.as_str(),
        "check status failed for channel"
    );
}

/// 同一订阅身份被不同功能模块复用：不受支持，提示调用方整改。
pub fn warn_module_type_conflict(
    id: &SubscriptionId,
    existing: ModuleKind,
    requested: ModuleKind,
) {
    warn!(
        subscription_id = %id,
        existing_module = existing.module_id(),
        requested_module = requested.module_id(),
        "subscription id reuse across different module types is not supported"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{StructKind, TypeTag, Value},
        version::SiriVersion,
    };
    use std::collections::HashMap;

    #[test]
    fn identity_requires_both_components() {
        let err = SubscriptionId::new("agency_1", "").expect_err("空订阅标识应失败");
        assert_eq!(
            err,
            SiriError::MissingArgument {
                name: "SubscriptionRef"
            }
        );

        let err = SubscriptionId::new("", "sub_1").expect_err("空订阅方应失败");
        assert_eq!(
            err,
            SiriError::MissingArgument {
                name: "SubscriberRef"
            }
        );
    }

    #[test]
    fn identity_is_a_usable_map_key() {
        let a = SubscriptionId::new("agency_1", "sub_1").expect("合法身份");
        let b = SubscriptionId::new("agency_1", "sub_1").expect("合法身份");
        let c = SubscriptionId::new("agency_1", "sub_2").expect("合法身份");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut pending = HashMap::new();
        pending.insert(a, "vehicle-monitoring");
        assert_eq!(pending.get(&b), Some(&"vehicle-monitoring"));
        assert!(!pending.contains_key(&c));
    }

    #[test]
    fn status_response_extraction_reads_well_known_fields() {
        let mut status = StructValue::new(TypeTag::new(
            SiriVersion::V1_3,
            StructKind::StatusResponse,
        ));
        status.set_text(SUBSCRIBER_REF, "agency_1");
        status.set_text(SUBSCRIPTION_REF, "sub_9");

        let id = subscription_id_for_status_response(&status).expect("两字段在场应成功");
        assert_eq!(id.subscriber_id(), "agency_1");
        assert_eq!(id.subscription_id(), "sub_9");
    }

    #[test]
    fn subscription_request_extraction_falls_back_to_requestor_ref() {
        let mut request = StructValue::new(TypeTag::new(
            SiriVersion::V1_3,
            StructKind::SubscriptionRequest,
        ));
        request.set_text("RequestorRef", "agency_1");
        let mut module = StructValue::new(TypeTag::new(
            SiriVersion::V1_3,
            StructKind::VehicleMonitoringSubscription,
        ));
        module.set_text("SubscriptionIdentifier", "sub_1");

        let id = subscription_id_for_subscription_request(&request, &module)
            .expect("回退 RequestorRef 应成功");
        assert_eq!(id.subscriber_id(), "agency_1");
    }

    #[test]
    fn error_condition_summary_names_type_and_text() {
        let mut condition = StructValue::new(TypeTag::new(
            SiriVersion::V1_3,
            StructKind::ErrorCondition,
        ));
        condition.set_text("OtherError", "backend unavailable");
        condition.set_text("Description", "try later");
        condition.set_field("ignored", Value::text("not an error field"));

        let summary = error_condition_summary(&condition);
        assert!(summary.contains("errorType=OtherError"));
        assert!(summary.contains("errorText=backend unavailable"));
        assert!(summary.contains("errorDescription=try later"));
    }
}
