//! # schema 模块说明
//!
//! ## 角色定位（Why）
//! - 属性对应关系不在运行期发现，而是手工编纂为静态描述符表：
//!   每个 `(版本, 结构种类)` 一张有序属性表；
//! - 属性名是跨版本对应关系的稳定键（与模式生成方的契约：同一语义字段
//!   即使基数不同也共享同名），计划解析只做名字匹配与形状分类。
//!
//! ## 行为契约（What）
//! - 表中声明顺序即源属性的声明顺序，转换计划按此顺序执行；
//! - 某版本缺失的结构（如 1.0 没有 SituationExchange 家族）直接不给表，
//!   [`descriptor`] 返回 `None`；
//! - 仅在某一版本出现的属性（如 1.3 的 `Language`）在另一方向上按名字
//!   不匹配静默丢弃，这不是错误。
//!
//! ## 维护指引（How）
//! - 新增版本：为差异结构补充 `_V1_X` 表，无差异结构复用共享表；
//! - 新增结构：在 [`StructKind`] 增加变体后补表，并让
//!   `descriptor` 的 match 保持穷尽。

use crate::{
    model::{ScalarKind, StructKind, TypeTag},
    version::SiriVersion,
};

/// 属性形状：单个可选值或有序序列。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Shape {
    Single,
    Sequence,
}

/// 属性元素类型：标量族或嵌套复合结构。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ElementKind {
    Scalar(ScalarKind),
    Complex(StructKind),
}

/// 单个属性的静态描述。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub shape: Shape,
    pub element: ElementKind,
}

/// 某版本下某结构种类的完整描述：有序属性表。
#[derive(Clone, Copy, Debug)]
pub struct TypeDescriptor {
    pub kind: StructKind,
    pub properties: &'static [PropertyDescriptor],
}

const fn prop(name: &'static str, shape: Shape, element: ElementKind) -> PropertyDescriptor {
    PropertyDescriptor {
        name,
        shape,
        element,
    }
}

const fn text(name: &'static str) -> PropertyDescriptor {
    prop(name, Shape::Single, ElementKind::Scalar(ScalarKind::Text))
}

const fn text_seq(name: &'static str) -> PropertyDescriptor {
    prop(name, Shape::Sequence, ElementKind::Scalar(ScalarKind::Text))
}

const fn integer(name: &'static str) -> PropertyDescriptor {
    prop(name, Shape::Single, ElementKind::Scalar(ScalarKind::Integer))
}

const fn boolean(name: &'static str) -> PropertyDescriptor {
    prop(name, Shape::Single, ElementKind::Scalar(ScalarKind::Boolean))
}

const fn duration(name: &'static str) -> PropertyDescriptor {
    prop(name, Shape::Single, ElementKind::Scalar(ScalarKind::Duration))
}

const fn time(name: &'static str) -> PropertyDescriptor {
    prop(name, Shape::Single, ElementKind::Scalar(ScalarKind::Time))
}

const fn nested(name: &'static str, kind: StructKind) -> PropertyDescriptor {
    prop(name, Shape::Single, ElementKind::Complex(kind))
}

const fn nested_seq(name: &'static str, kind: StructKind) -> PropertyDescriptor {
    prop(name, Shape::Sequence, ElementKind::Complex(kind))
}

const fn desc(kind: StructKind, properties: &'static [PropertyDescriptor]) -> TypeDescriptor {
    TypeDescriptor { kind, properties }
}

// ---------------------------------------------------------------------------
// 信封与通用请求/响应（两代形状一致，共享一张表）
// ---------------------------------------------------------------------------

static SIRI: TypeDescriptor = desc(
    StructKind::Siri,
    &[
        nested("ServiceRequest", StructKind::ServiceRequest),
        nested("SubscriptionRequest", StructKind::SubscriptionRequest),
        nested("CheckStatusRequest", StructKind::CheckStatusRequest),
        nested(
            "TerminateSubscriptionRequest",
            StructKind::TerminateSubscriptionRequest,
        ),
        nested("ServiceDelivery", StructKind::ServiceDelivery),
        nested("SubscriptionResponse", StructKind::SubscriptionResponse),
        nested("CheckStatusResponse", StructKind::CheckStatusResponse),
        nested(
            "TerminateSubscriptionResponse",
            StructKind::TerminateSubscriptionResponse,
        ),
    ],
);

static CHECK_STATUS_REQUEST: TypeDescriptor = desc(
    StructKind::CheckStatusRequest,
    &[
        time("RequestTimestamp"),
        text("RequestorRef"),
        text("MessageIdentifier"),
    ],
);

static TERMINATE_SUBSCRIPTION_REQUEST: TypeDescriptor = desc(
    StructKind::TerminateSubscriptionRequest,
    &[
        time("RequestTimestamp"),
        text("MessageIdentifier"),
        text("SubscriberRef"),
        text_seq("SubscriptionRef"),
        text("All"),
    ],
);

static SUBSCRIPTION_RESPONSE: TypeDescriptor = desc(
    StructKind::SubscriptionResponse,
    &[
        time("ResponseTimestamp"),
        text("ResponderRef"),
        text("Address"),
        text("SubscriptionManagerAddress"),
        nested_seq("ResponseStatus", StructKind::StatusResponse),
    ],
);

static CHECK_STATUS_RESPONSE: TypeDescriptor = desc(
    StructKind::CheckStatusResponse,
    &[
        time("ResponseTimestamp"),
        boolean("Status"),
        time("ServiceStartedTime"),
        nested("ErrorCondition", StructKind::ErrorCondition),
    ],
);

static TERMINATE_SUBSCRIPTION_RESPONSE: TypeDescriptor = desc(
    StructKind::TerminateSubscriptionResponse,
    &[
        time("ResponseTimestamp"),
        text("ResponderRef"),
        text("Address"),
        nested_seq("TerminationResponseStatus", StructKind::StatusResponse),
    ],
);

static STATUS_RESPONSE: TypeDescriptor = desc(
    StructKind::StatusResponse,
    &[
        time("ResponseTimestamp"),
        text("SubscriberRef"),
        text("SubscriptionRef"),
        boolean("Status"),
        nested("ErrorCondition", StructKind::ErrorCondition),
    ],
);

static ERROR_CONDITION: TypeDescriptor = desc(
    StructKind::ErrorCondition,
    &[
        text("AccessNotAllowedError"),
        text("AllowedResourceUsageExceededError"),
        text("CapabilityNotSupportedError"),
        text("NoInfoForTopicError"),
        text("ServiceNotAvailableError"),
        text("UnknownSubscriberError"),
        text("UnknownSubscriptionError"),
        text("OtherError"),
        text("Description"),
    ],
);

// ---------------------------------------------------------------------------
// ServiceRequest / SubscriptionRequest：1.3 将各模块条目从单值升格为序列，
// 并引入 SituationExchange 家族。
// ---------------------------------------------------------------------------

static SERVICE_REQUEST_V1_0: TypeDescriptor = desc(
    StructKind::ServiceRequest,
    &[
        time("RequestTimestamp"),
        text("MessageIdentifier"),
        text("RequestorRef"),
        nested(
            "ProductionTimetableRequest",
            StructKind::ProductionTimetableRequest,
        ),
        nested(
            "EstimatedTimetableRequest",
            StructKind::EstimatedTimetableRequest,
        ),
        nested("StopTimetableRequest", StructKind::StopTimetableRequest),
        nested("StopMonitoringRequest", StructKind::StopMonitoringRequest),
        nested(
            "VehicleMonitoringRequest",
            StructKind::VehicleMonitoringRequest,
        ),
    ],
);

static SERVICE_REQUEST_V1_3: TypeDescriptor = desc(
    StructKind::ServiceRequest,
    &[
        time("RequestTimestamp"),
        text("MessageIdentifier"),
        text("RequestorRef"),
        nested_seq(
            "ProductionTimetableRequest",
            StructKind::ProductionTimetableRequest,
        ),
        nested_seq(
            "EstimatedTimetableRequest",
            StructKind::EstimatedTimetableRequest,
        ),
        nested_seq("StopTimetableRequest", StructKind::StopTimetableRequest),
        nested_seq("StopMonitoringRequest", StructKind::StopMonitoringRequest),
        nested_seq(
            "VehicleMonitoringRequest",
            StructKind::VehicleMonitoringRequest,
        ),
        nested_seq(
            "SituationExchangeRequest",
            StructKind::SituationExchangeRequest,
        ),
    ],
);

static SUBSCRIPTION_REQUEST_V1_0: TypeDescriptor = desc(
    StructKind::SubscriptionRequest,
    &[
        time("RequestTimestamp"),
        text("MessageIdentifier"),
        text("RequestorRef"),
        text("ConsumerAddress"),
        nested(
            "ProductionTimetableSubscriptionRequest",
            StructKind::ProductionTimetableSubscription,
        ),
        nested(
            "EstimatedTimetableSubscriptionRequest",
            StructKind::EstimatedTimetableSubscription,
        ),
        nested(
            "StopTimetableSubscriptionRequest",
            StructKind::StopTimetableSubscription,
        ),
        nested(
            "StopMonitoringSubscriptionRequest",
            StructKind::StopMonitoringSubscription,
        ),
        nested(
            "VehicleMonitoringSubscriptionRequest",
            StructKind::VehicleMonitoringSubscription,
        ),
    ],
);

static SUBSCRIPTION_REQUEST_V1_3: TypeDescriptor = desc(
    StructKind::SubscriptionRequest,
    &[
        time("RequestTimestamp"),
        text("MessageIdentifier"),
        text("RequestorRef"),
        text("ConsumerAddress"),
        nested_seq(
            "ProductionTimetableSubscriptionRequest",
            StructKind::ProductionTimetableSubscription,
        ),
        nested_seq(
            "EstimatedTimetableSubscriptionRequest",
            StructKind::EstimatedTimetableSubscription,
        ),
        nested_seq(
            "StopTimetableSubscriptionRequest",
            StructKind::StopTimetableSubscription,
        ),
        nested_seq(
            "StopMonitoringSubscriptionRequest",
            StructKind::StopMonitoringSubscription,
        ),
        nested_seq(
            "VehicleMonitoringSubscriptionRequest",
            StructKind::VehicleMonitoringSubscription,
        ),
        nested_seq(
            "SituationExchangeSubscriptionRequest",
            StructKind::SituationExchangeSubscription,
        ),
    ],
);

// ---------------------------------------------------------------------------
// 投递面：1.3 将模块投递从单值升格为序列，并新增 MoreData。
// ---------------------------------------------------------------------------

static SERVICE_DELIVERY_V1_0: TypeDescriptor = desc(
    StructKind::ServiceDelivery,
    &[
        time("ResponseTimestamp"),
        text("ProducerRef"),
        boolean("Status"),
        nested(
            "VehicleMonitoringDelivery",
            StructKind::VehicleMonitoringDelivery,
        ),
    ],
);

static SERVICE_DELIVERY_V1_3: TypeDescriptor = desc(
    StructKind::ServiceDelivery,
    &[
        time("ResponseTimestamp"),
        text("ProducerRef"),
        boolean("Status"),
        boolean("MoreData"),
        nested_seq(
            "VehicleMonitoringDelivery",
            StructKind::VehicleMonitoringDelivery,
        ),
    ],
);

static VEHICLE_MONITORING_DELIVERY: TypeDescriptor = desc(
    StructKind::VehicleMonitoringDelivery,
    &[
        time("ResponseTimestamp"),
        text("SubscriberRef"),
        text("SubscriptionRef"),
        boolean("Status"),
        nested_seq("VehicleActivity", StructKind::VehicleActivity),
    ],
);

static VEHICLE_ACTIVITY: TypeDescriptor = desc(
    StructKind::VehicleActivity,
    &[
        time("RecordedAtTime"),
        time("ValidUntilTime"),
        text("LineRef"),
        text("DirectionRef"),
        text("VehicleRef"),
        duration("Delay"),
    ],
);

// ---------------------------------------------------------------------------
// VehicleMonitoring：1.3 将过滤引用升格为序列并新增 Language。
// ---------------------------------------------------------------------------

static VEHICLE_MONITORING_REQUEST_V1_0: TypeDescriptor = desc(
    StructKind::VehicleMonitoringRequest,
    &[
        text("VehicleMonitoringRef"),
        text("LineRef"),
        text("DirectionRef"),
        text("VehicleRef"),
        integer("MaximumVehicles"),
    ],
);

static VEHICLE_MONITORING_REQUEST_V1_3: TypeDescriptor = desc(
    StructKind::VehicleMonitoringRequest,
    &[
        text_seq("VehicleMonitoringRef"),
        text_seq("LineRef"),
        text("DirectionRef"),
        text("VehicleRef"),
        integer("MaximumVehicles"),
        text("Language"),
    ],
);

static VEHICLE_MONITORING_SUBSCRIPTION: TypeDescriptor = desc(
    StructKind::VehicleMonitoringSubscription,
    &[
        text("SubscriberRef"),
        text("SubscriptionIdentifier"),
        time("InitialTerminationTime"),
        boolean("IncrementalUpdates"),
        duration("ChangeBeforeUpdates"),
        nested(
            "VehicleMonitoringRequest",
            StructKind::VehicleMonitoringRequest,
        ),
    ],
);

// ---------------------------------------------------------------------------
// StopMonitoring：1.3 新增 MaximumStopVisits。
// ---------------------------------------------------------------------------

static STOP_MONITORING_REQUEST_V1_0: TypeDescriptor = desc(
    StructKind::StopMonitoringRequest,
    &[
        text("MonitoringRef"),
        text("LineRef"),
        duration("PreviewInterval"),
    ],
);

static STOP_MONITORING_REQUEST_V1_3: TypeDescriptor = desc(
    StructKind::StopMonitoringRequest,
    &[
        text("MonitoringRef"),
        text("LineRef"),
        duration("PreviewInterval"),
        integer("MaximumStopVisits"),
    ],
);

static STOP_MONITORING_SUBSCRIPTION: TypeDescriptor = desc(
    StructKind::StopMonitoringSubscription,
    &[
        text("SubscriberRef"),
        text("SubscriptionIdentifier"),
        time("InitialTerminationTime"),
        boolean("IncrementalUpdates"),
        duration("ChangeBeforeUpdates"),
        nested("StopMonitoringRequest", StructKind::StopMonitoringRequest),
    ],
);

// ---------------------------------------------------------------------------
// SituationExchange：1.3 引入，1.0 无对应结构。
// ---------------------------------------------------------------------------

static SITUATION_EXCHANGE_REQUEST: TypeDescriptor = desc(
    StructKind::SituationExchangeRequest,
    &[time("RequestTimestamp"), duration("PreviewInterval")],
);

static SITUATION_EXCHANGE_SUBSCRIPTION: TypeDescriptor = desc(
    StructKind::SituationExchangeSubscription,
    &[
        text("SubscriberRef"),
        text("SubscriptionIdentifier"),
        time("InitialTerminationTime"),
        nested(
            "SituationExchangeRequest",
            StructKind::SituationExchangeRequest,
        ),
    ],
);

// ---------------------------------------------------------------------------
// 时刻表家族：两代形状一致。
// ---------------------------------------------------------------------------

static PRODUCTION_TIMETABLE_REQUEST: TypeDescriptor = desc(
    StructKind::ProductionTimetableRequest,
    &[time("RequestTimestamp"), text("MessageIdentifier")],
);

static PRODUCTION_TIMETABLE_SUBSCRIPTION: TypeDescriptor = desc(
    StructKind::ProductionTimetableSubscription,
    &[
        text("SubscriberRef"),
        text("SubscriptionIdentifier"),
        time("InitialTerminationTime"),
        nested(
            "ProductionTimetableRequest",
            StructKind::ProductionTimetableRequest,
        ),
    ],
);

static ESTIMATED_TIMETABLE_REQUEST: TypeDescriptor = desc(
    StructKind::EstimatedTimetableRequest,
    &[
        time("RequestTimestamp"),
        text("MessageIdentifier"),
        duration("PreviewInterval"),
    ],
);

static ESTIMATED_TIMETABLE_SUBSCRIPTION: TypeDescriptor = desc(
    StructKind::EstimatedTimetableSubscription,
    &[
        text("SubscriberRef"),
        text("SubscriptionIdentifier"),
        time("InitialTerminationTime"),
        boolean("IncrementalUpdates"),
        nested(
            "EstimatedTimetableRequest",
            StructKind::EstimatedTimetableRequest,
        ),
    ],
);

static STOP_TIMETABLE_REQUEST: TypeDescriptor = desc(
    StructKind::StopTimetableRequest,
    &[
        time("RequestTimestamp"),
        text("MessageIdentifier"),
        text("MonitoringRef"),
    ],
);

static STOP_TIMETABLE_SUBSCRIPTION: TypeDescriptor = desc(
    StructKind::StopTimetableSubscription,
    &[
        text("SubscriberRef"),
        text("SubscriptionIdentifier"),
        time("InitialTerminationTime"),
        nested("StopTimetableRequest", StructKind::StopTimetableRequest),
    ],
);

/// 查询 `(版本, 种类)` 的描述符。
///
/// `None` 表示该版本不包含该结构种类；顶层转换遇到这种情况会以
/// [`SiriError::UnknownStructure`](crate::SiriError::UnknownStructure) 报错，
/// 嵌套场景则在父结构的名字匹配阶段静默丢弃。
pub fn descriptor(tag: TypeTag) -> Option<&'static TypeDescriptor> {
    use SiriVersion::{V1_0, V1_3};
    use StructKind::*;

    let descriptor = match (tag.version, tag.kind) {
        (_, Siri) => &SIRI,
        (V1_0, ServiceRequest) => &SERVICE_REQUEST_V1_0,
        (V1_3, ServiceRequest) => &SERVICE_REQUEST_V1_3,
        (V1_0, SubscriptionRequest) => &SUBSCRIPTION_REQUEST_V1_0,
        (V1_3, SubscriptionRequest) => &SUBSCRIPTION_REQUEST_V1_3,
        (_, CheckStatusRequest) => &CHECK_STATUS_REQUEST,
        (_, TerminateSubscriptionRequest) => &TERMINATE_SUBSCRIPTION_REQUEST,
        (V1_0, ServiceDelivery) => &SERVICE_DELIVERY_V1_0,
        (V1_3, ServiceDelivery) => &SERVICE_DELIVERY_V1_3,
        (_, SubscriptionResponse) => &SUBSCRIPTION_RESPONSE,
        (_, CheckStatusResponse) => &CHECK_STATUS_RESPONSE,
        (_, TerminateSubscriptionResponse) => &TERMINATE_SUBSCRIPTION_RESPONSE,
        (_, StatusResponse) => &STATUS_RESPONSE,
        (_, ErrorCondition) => &ERROR_CONDITION,
        (V1_0, VehicleMonitoringRequest) => &VEHICLE_MONITORING_REQUEST_V1_0,
        (V1_3, VehicleMonitoringRequest) => &VEHICLE_MONITORING_REQUEST_V1_3,
        (_, VehicleMonitoringSubscription) => &VEHICLE_MONITORING_SUBSCRIPTION,
        (_, VehicleMonitoringDelivery) => &VEHICLE_MONITORING_DELIVERY,
        (_, VehicleActivity) => &VEHICLE_ACTIVITY,
        (V1_0, StopMonitoringRequest) => &STOP_MONITORING_REQUEST_V1_0,
        (V1_3, StopMonitoringRequest) => &STOP_MONITORING_REQUEST_V1_3,
        (_, StopMonitoringSubscription) => &STOP_MONITORING_SUBSCRIPTION,
        (V1_0, SituationExchangeRequest | SituationExchangeSubscription) => return None,
        (V1_3, SituationExchangeRequest) => &SITUATION_EXCHANGE_REQUEST,
        (V1_3, SituationExchangeSubscription) => &SITUATION_EXCHANGE_SUBSCRIPTION,
        (_, ProductionTimetableRequest) => &PRODUCTION_TIMETABLE_REQUEST,
        (_, ProductionTimetableSubscription) => &PRODUCTION_TIMETABLE_SUBSCRIPTION,
        (_, EstimatedTimetableRequest) => &ESTIMATED_TIMETABLE_REQUEST,
        (_, EstimatedTimetableSubscription) => &ESTIMATED_TIMETABLE_SUBSCRIPTION,
        (_, StopTimetableRequest) => &STOP_TIMETABLE_REQUEST,
        (_, StopTimetableSubscription) => &STOP_TIMETABLE_SUBSCRIPTION,
    };
    Some(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [StructKind; 25] = [
        StructKind::Siri,
        StructKind::ServiceRequest,
        StructKind::SubscriptionRequest,
        StructKind::CheckStatusRequest,
        StructKind::TerminateSubscriptionRequest,
        StructKind::ServiceDelivery,
        StructKind::SubscriptionResponse,
        StructKind::CheckStatusResponse,
        StructKind::TerminateSubscriptionResponse,
        StructKind::StatusResponse,
        StructKind::ErrorCondition,
        StructKind::VehicleMonitoringRequest,
        StructKind::VehicleMonitoringSubscription,
        StructKind::VehicleMonitoringDelivery,
        StructKind::VehicleActivity,
        StructKind::StopMonitoringRequest,
        StructKind::StopMonitoringSubscription,
        StructKind::SituationExchangeRequest,
        StructKind::SituationExchangeSubscription,
        StructKind::ProductionTimetableRequest,
        StructKind::ProductionTimetableSubscription,
        StructKind::EstimatedTimetableRequest,
        StructKind::EstimatedTimetableSubscription,
        StructKind::StopTimetableRequest,
        StructKind::StopTimetableSubscription,
    ];

    #[test]
    fn descriptor_kind_matches_lookup_key() {
        for version in SiriVersion::ALL {
            for kind in ALL_KINDS {
                if let Some(descriptor) = descriptor(TypeTag::new(version, kind)) {
                    assert_eq!(descriptor.kind, kind, "{version} 下描述符种类应与键一致");
                }
            }
        }
    }

    #[test]
    fn nested_kinds_are_defined_within_their_own_revision() {
        for version in SiriVersion::ALL {
            for kind in ALL_KINDS {
                let Some(descriptor) = descriptor(TypeTag::new(version, kind)) else {
                    continue;
                };
                for property in descriptor.properties {
                    if let ElementKind::Complex(nested_kind) = property.element {
                        assert!(
                            super::descriptor(TypeTag::new(version, nested_kind)).is_some(),
                            "{version} 下 {kind:?}.{} 引用的 {nested_kind:?} 缺少描述符",
                            property.name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn property_names_are_unique_per_descriptor() {
        for version in SiriVersion::ALL {
            for kind in ALL_KINDS {
                let Some(descriptor) = descriptor(TypeTag::new(version, kind)) else {
                    continue;
                };
                for (index, property) in descriptor.properties.iter().enumerate() {
                    assert!(
                        descriptor.properties[index + 1..]
                            .iter()
                            .all(|other| other.name != property.name),
                        "{version} 下 {kind:?} 存在重复属性 `{}`",
                        property.name
                    );
                }
            }
        }
    }

    #[test]
    fn situation_exchange_family_only_exists_in_v1_3() {
        for kind in [
            StructKind::SituationExchangeRequest,
            StructKind::SituationExchangeSubscription,
        ] {
            assert!(descriptor(TypeTag::new(SiriVersion::V1_0, kind)).is_none());
            assert!(descriptor(TypeTag::new(SiriVersion::V1_3, kind)).is_some());
        }
    }
}
