//! # model 模块说明
//!
//! ## 角色定位（Why）
//! - 提供“版本标签 + 封闭结构种类”的内存报文图表示：转换引擎只面对
//!   [`StructValue`]，不关心任何线编码（XML 序列化完全在本 crate 之外）；
//! - 不做任何运行期类型探测：结构种类收敛为封闭枚举 [`StructKind`]，
//!   属性发现交给静态描述符表（见 [`schema`]），字段匹配在表格层完成。
//!
//! ## 行为契约（What）
//! - 字段缺失即“可选值不存在”，任何转换策略对缺失字段保持 no-op；
//! - 序列字段存放 [`Value::List`]，单值字段存放标量或嵌套结构；
//! - 字段名以 `&'static str` 出现，全部来源于 [`schema`] 的静态表格，
//!   属性名是跨版本对应关系的稳定键（与模式生成方的既定契约）。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::version::SiriVersion;

pub mod schema;

/// 报文图中全部结构种类的封闭集合。
///
/// # 教案式说明
/// - **意图 (Why)**：以封闭枚举取代开放式子类层级，转换策略按标签匹配选择，
///   不做任何运行期类型探测；
/// - **契约 (What)**：同一种类在不同版本下形状可以不同（单值/序列、字段增减），
///   差异全部记录在 [`schema`] 的每版本描述符表中；
/// - **扩展指引 (How)**：新增结构时补充变体与两张（或多张）描述符表。
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum StructKind {
    /// 顶层信封，承载一条完整的请求或投递。
    Siri,
    ServiceRequest,
    SubscriptionRequest,
    CheckStatusRequest,
    TerminateSubscriptionRequest,
    ServiceDelivery,
    SubscriptionResponse,
    CheckStatusResponse,
    TerminateSubscriptionResponse,
    /// 订阅/终止响应中的单条状态条目。
    StatusResponse,
    ErrorCondition,
    VehicleMonitoringRequest,
    VehicleMonitoringSubscription,
    VehicleMonitoringDelivery,
    VehicleActivity,
    StopMonitoringRequest,
    StopMonitoringSubscription,
    SituationExchangeRequest,
    SituationExchangeSubscription,
    ProductionTimetableRequest,
    ProductionTimetableSubscription,
    EstimatedTimetableRequest,
    EstimatedTimetableSubscription,
    StopTimetableRequest,
    StopTimetableSubscription,
}

/// 功能模块种类（封闭集合），对应 SIRI 的六个功能域。
///
/// - **意图 (Why)**：请求工厂与订阅关联层按模块分派，枚举匹配取代字符串分支；
/// - **契约 (What)**：[`request_kind`](Self::request_kind) 等方法给出该模块在
///   报文图中的结构种类；投递结构仅对建模了投递面的模块存在。
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum ModuleKind {
    ProductionTimetable,
    EstimatedTimetable,
    StopTimetable,
    StopMonitoring,
    VehicleMonitoring,
    SituationExchange,
}

impl ModuleKind {
    /// 全部模块种类。
    pub const ALL: [ModuleKind; 6] = [
        ModuleKind::ProductionTimetable,
        ModuleKind::EstimatedTimetable,
        ModuleKind::StopTimetable,
        ModuleKind::StopMonitoring,
        ModuleKind::VehicleMonitoring,
        ModuleKind::SituationExchange,
    ];

    /// 配置中使用的模块标识（大写下划线形式，忽略大小写解析）。
    pub const fn module_id(self) -> &'static str {
        match self {
            ModuleKind::ProductionTimetable => "PRODUCTION_TIMETABLE",
            ModuleKind::EstimatedTimetable => "ESTIMATED_TIMETABLE",
            ModuleKind::StopTimetable => "STOP_TIMETABLE",
            ModuleKind::StopMonitoring => "STOP_MONITORING",
            ModuleKind::VehicleMonitoring => "VEHICLE_MONITORING",
            ModuleKind::SituationExchange => "SITUATION_EXCHANGE",
        }
    }

    /// 按模块标识解析（忽略大小写）。
    pub fn from_module_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.module_id().eq_ignore_ascii_case(id))
    }

    /// 模块的服务请求结构种类。
    pub const fn request_kind(self) -> StructKind {
        match self {
            ModuleKind::ProductionTimetable => StructKind::ProductionTimetableRequest,
            ModuleKind::EstimatedTimetable => StructKind::EstimatedTimetableRequest,
            ModuleKind::StopTimetable => StructKind::StopTimetableRequest,
            ModuleKind::StopMonitoring => StructKind::StopMonitoringRequest,
            ModuleKind::VehicleMonitoring => StructKind::VehicleMonitoringRequest,
            ModuleKind::SituationExchange => StructKind::SituationExchangeRequest,
        }
    }

    /// 模块的订阅请求结构种类。
    pub const fn subscription_kind(self) -> StructKind {
        match self {
            ModuleKind::ProductionTimetable => StructKind::ProductionTimetableSubscription,
            ModuleKind::EstimatedTimetable => StructKind::EstimatedTimetableSubscription,
            ModuleKind::StopTimetable => StructKind::StopTimetableSubscription,
            ModuleKind::StopMonitoring => StructKind::StopMonitoringSubscription,
            ModuleKind::VehicleMonitoring => StructKind::VehicleMonitoringSubscription,
            ModuleKind::SituationExchange => StructKind::SituationExchangeSubscription,
        }
    }

    /// `ServiceRequest` 中承载该模块服务请求的属性名。
    pub const fn request_property(self) -> &'static str {
        match self {
            ModuleKind::ProductionTimetable => "ProductionTimetableRequest",
            ModuleKind::EstimatedTimetable => "EstimatedTimetableRequest",
            ModuleKind::StopTimetable => "StopTimetableRequest",
            ModuleKind::StopMonitoring => "StopMonitoringRequest",
            ModuleKind::VehicleMonitoring => "VehicleMonitoringRequest",
            ModuleKind::SituationExchange => "SituationExchangeRequest",
        }
    }

    /// `SubscriptionRequest` 中承载该模块订阅的属性名。
    pub const fn subscription_property(self) -> &'static str {
        match self {
            ModuleKind::ProductionTimetable => "ProductionTimetableSubscriptionRequest",
            ModuleKind::EstimatedTimetable => "EstimatedTimetableSubscriptionRequest",
            ModuleKind::StopTimetable => "StopTimetableSubscriptionRequest",
            ModuleKind::StopMonitoring => "StopMonitoringSubscriptionRequest",
            ModuleKind::VehicleMonitoring => "VehicleMonitoringSubscriptionRequest",
            ModuleKind::SituationExchange => "SituationExchangeSubscriptionRequest",
        }
    }
}

/// 结构值的运行期类型标签：版本 + 种类。
///
/// 转换计划缓存以 `(源标签, 目标标签)` 为键；标签是 `Copy` 的小值，
/// 不持有任何堆资源。
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct TypeTag {
    pub version: SiriVersion,
    pub kind: StructKind,
}

impl TypeTag {
    pub const fn new(version: SiriVersion, kind: StructKind) -> Self {
        Self { version, kind }
    }
}

/// 标量族标签，用于描述符中的元素类型声明与族匹配检查。
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum ScalarKind {
    Text,
    Integer,
    Boolean,
    Duration,
    Time,
}

/// 叶子标量值。
///
/// XML 包装型引用结构（如 `ParticipantRefStructure`）是生成器产物，
/// 本模型直接摊平为 [`Scalar::Text`]。
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Duration(std::time::Duration),
    Time(DateTime<Utc>),
}

impl Scalar {
    /// 返回标量所属的族标签。
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Text(_) => ScalarKind::Text,
            Scalar::Integer(_) => ScalarKind::Integer,
            Scalar::Boolean(_) => ScalarKind::Boolean,
            Scalar::Duration(_) => ScalarKind::Duration,
            Scalar::Time(_) => ScalarKind::Time,
        }
    }

    /// 以 `&str` 访问文本标量。
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// 字段值：标量、嵌套结构或有序序列。
///
/// 序列元素只会是标量或结构，不存在嵌套列表；该约束由
/// [`schema`] 的描述符形状（单值/序列 + 元素类型）保证。
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Value {
    Scalar(Scalar),
    Struct(StructValue),
    List(Vec<Value>),
}

impl Value {
    /// 便捷构造：文本标量。
    pub fn text(text: impl Into<String>) -> Self {
        Value::Scalar(Scalar::Text(text.into()))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<StructValue> for Value {
    fn from(value: StructValue) -> Self {
        Value::Struct(value)
    }
}

/// 带版本标签的结构值：转换引擎的唯一工作对象。
///
/// # 教案式说明
/// - **意图 (Why)**：一个 `StructValue` 即“某版本下某种类的一棵子树”，
///   引擎据标签查描述符、按计划逐属性填充新实例；
/// - **契约 (What)**：
///   - 字段表按名字有序存放，缺失字段表示可选值不存在；
///   - 引擎只读源结构（`&self` 访问器），仅对构建中的目标结构调用
///     [`set_field`](Self::set_field)；
/// - **风险 (Trade-offs)**：字段形状不做写入时校验，换取构图代码的轻量；
///   转换执行期发现形状与描述符不符时以
///   [`SiriError::MalformedValue`](crate::SiriError::MalformedValue) 报错。
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StructValue {
    tag: TypeTag,
    fields: BTreeMap<&'static str, Value>,
}

impl StructValue {
    /// 创建指定标签的空结构（全部字段处于缺省/缺失状态）。
    pub fn new(tag: TypeTag) -> Self {
        Self {
            tag,
            fields: BTreeMap::new(),
        }
    }

    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    pub const fn version(&self) -> SiriVersion {
        self.tag.version
    }

    pub const fn kind(&self) -> StructKind {
        self.tag.kind
    }

    /// 读取字段；`None` 表示可选值不存在。
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// 写入字段（覆盖旧值）。字段名必须来自描述符表，故为 `&'static str`。
    pub fn set_field(&mut self, name: &'static str, value: Value) {
        self.fields.insert(name, value);
    }

    /// Builder 风格写入，便于工厂内联构图。
    #[must_use]
    pub fn with_field(mut self, name: &'static str, value: Value) -> Self {
        self.set_field(name, value);
        self
    }

    /// 写入文本标量的便捷方法。
    pub fn set_text(&mut self, name: &'static str, text: impl Into<String>) {
        self.set_field(name, Value::text(text));
    }

    /// 以 `&str` 读取文本标量字段。
    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name)?.as_scalar()?.as_text()
    }

    /// 以 `i64` 读取整数标量字段。
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.field(name)?.as_scalar()? {
            Scalar::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// 以 `bool` 读取布尔标量字段。
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.field(name)?.as_scalar()? {
            Scalar::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// 以 [`std::time::Duration`] 读取时长标量字段。
    pub fn duration(&self, name: &str) -> Option<std::time::Duration> {
        match self.field(name)?.as_scalar()? {
            Scalar::Duration(value) => Some(*value),
            _ => None,
        }
    }

    /// 以 [`DateTime<Utc>`] 读取时间标量字段。
    pub fn time(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.field(name)?.as_scalar()? {
            Scalar::Time(value) => Some(*value),
            _ => None,
        }
    }

    /// 以切片读取序列字段。
    pub fn sequence(&self, name: &str) -> Option<&[Value]> {
        self.field(name)?.as_list()
    }

    /// 以引用读取嵌套结构字段。
    pub fn structure(&self, name: &str) -> Option<&StructValue> {
        self.field(name)?.as_struct()
    }

    /// 当前已设置的字段名集合（字典序）。
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    /// 是否没有任何字段被设置。
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_parse_is_case_insensitive() {
        assert_eq!(
            ModuleKind::from_module_id("vehicle_monitoring"),
            Some(ModuleKind::VehicleMonitoring)
        );
        assert_eq!(ModuleKind::from_module_id("TRAM_MONITORING"), None);
    }

    #[test]
    fn absent_field_reads_as_none() {
        let value = StructValue::new(TypeTag::new(
            SiriVersion::V1_0,
            StructKind::VehicleMonitoringRequest,
        ));
        assert!(value.field("LineRef").is_none());
        assert!(value.is_empty());
    }

    #[test]
    fn field_accessors_match_written_shape() {
        let mut value = StructValue::new(TypeTag::new(
            SiriVersion::V1_3,
            StructKind::VehicleMonitoringRequest,
        ));
        value.set_text("DirectionRef", "inbound");
        value.set_field(
            "LineRef",
            Value::List(vec![Value::text("10"), Value::text("12")]),
        );

        assert_eq!(value.text("DirectionRef"), Some("inbound"));
        let lines = value.sequence("LineRef").expect("LineRef 应为序列");
        assert_eq!(lines.len(), 2);
        assert!(value.text("LineRef").is_none(), "序列不应按标量读取");
    }
}
