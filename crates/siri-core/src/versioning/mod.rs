//! # versioning 模块说明
//!
//! ## 角色定位（Why）
//! - 跨版本报文转换引擎的入口：对任意源结构与目标版本，解析（或复用）
//!   转换计划并递归执行，产出目标版本下的等价对象图；
//! - 免去为“每种报文 × 每对版本”手写翻译函数——对应关系全部由
//!   `model::schema` 的静态表格驱动。
//!
//! ## 并发模型（What）
//! - 唯一的共享可变状态是计划缓存（`DashMap`）；计划一经构建即不可变，
//!   以 `Arc` 共享，进程生命周期内不失效（模式版本在生成期固定）；
//! - 缓存键为 `(源标签, 目标标签)`；计划是键的纯函数，因此并发首建允许
//!   冗余解析、竞争安装（`entry().or_insert` 先写者胜），任何读者都只会
//!   观察到完整计划，不存在半构建状态；
//! - 解析期间不持有任何分片锁：`get` 的 guard 在返回前释放，`entry`
//!   仅在安装瞬间持锁，嵌套递归解析因此不会自锁。
//!
//! ## 资源模型（Trade-offs）
//! - 转换是纯同步内存变换，无 I/O、无阻塞点，不需要取消/超时语义；
//! - 超大序列（上千条投递）会被急切转换，注重响应性的调用方应避免在
//!   I/O 线程上执行。

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    error::SiriError,
    model::{StructValue, TypeTag},
    version::SiriVersion,
};

pub mod plan;
pub mod property;

pub use plan::ConversionPlan;
pub use property::{Cardinality, ElementConversion, PropertyConverter};

/// 对象图转换器：计划缓存 + 递归执行器。
///
/// # 教案式说明
/// - **意图 (Why)**：调用方只面对一个入口 [`convert`](Self::convert)，
///   嵌套结构、基数升降格、字段增删全部由缓存的计划处理；
/// - **契约 (What)**：
///   - 引擎自身无任何可观察副作用：不改动源结构，相同输入必得相同输出；
///   - 可被任意多请求处理线程同时调用（`&self` 接口，内部仅 `DashMap`）；
///   - 源版本等于目标版本时直接克隆返回，不触碰缓存；
/// - **风险 (Trade-offs)**：计划缓存永不驱逐——键空间受封闭枚举约束，
///   上界为 `|版本|² × |结构种类|`，常驻内存可忽略。
#[derive(Debug, Default)]
pub struct VersionConverter {
    plans: DashMap<(TypeTag, TypeTag), Arc<ConversionPlan>>,
}

impl VersionConverter {
    /// 创建空缓存的转换器。
    pub fn new() -> Self {
        Self::default()
    }

    /// 将源结构转换为目标版本下的等价结构。
    ///
    /// # 教案式说明
    /// - **执行步骤 (How)**：
    ///   1. 目标标签 = `(目标版本, 源结构种类)`；
    ///   2. 源版本即目标版本时克隆返回；
    ///   3. 否则取计划（或首建），新建空目标实例，按计划顺序逐属性执行；
    /// - **后置条件**：返回的结构只包含计划写入的字段，其余字段保持
    ///   缺省——源侧缺失的可选数据不会被合成。
    pub fn convert(
        &self,
        source: &StructValue,
        target_version: SiriVersion,
    ) -> Result<StructValue, SiriError> {
        self.convert_to(source, TypeTag::new(target_version, source.kind()))
    }

    /// `Option` 包装的转换：缺失在结构上传播，不消耗任何计划。
    pub fn convert_opt(
        &self,
        source: Option<&StructValue>,
        target_version: SiriVersion,
    ) -> Result<Option<StructValue>, SiriError> {
        source
            .map(|value| self.convert(value, target_version))
            .transpose()
    }

    /// 按显式目标标签转换，供嵌套元素（含跨版本改名的结构）递归使用。
    pub(crate) fn convert_to(
        &self,
        source: &StructValue,
        target: TypeTag,
    ) -> Result<StructValue, SiriError> {
        if source.tag() == target {
            return Ok(source.clone());
        }

        let plan = self.plan_for(source.tag(), target)?;
        let mut converted = StructValue::new(target);
        for converter in plan.converters() {
            converter.apply(self, source, &mut converted)?;
        }
        Ok(converted)
    }

    /// 取（或首建）一对标签的转换计划。
    ///
    /// # 教案式说明
    /// - **并发契约 (What)**：按键可线性化——并发首建的各方要么命中已安装
    ///   计划，要么冗余解析后竞争安装（先写者胜）；计划是键的纯函数，
    ///   最终状态一致；
    /// - **执行步骤 (How)**：`get` 快路径 → 无锁解析 → `entry().or_insert`
    ///   安装并返回胜者；解析期间不持有分片锁，嵌套递归安全；
    /// - **错误语义**：解析失败不污染缓存，首个触发构建的调用方立即收到
    ///   [`SiriError::PlanDefect`] 或 [`SiriError::UnknownStructure`]。
    pub fn plan_for(
        &self,
        source: TypeTag,
        target: TypeTag,
    ) -> Result<Arc<ConversionPlan>, SiriError> {
        let key = (source, target);
        if let Some(cached) = self.plans.get(&key) {
            return Ok(Arc::clone(cached.value()));
        }

        let plan = ConversionPlan::resolve(self, source, target)?;
        let installed = self.plans.entry(key).or_insert_with(|| Arc::new(plan));
        Ok(Arc::clone(installed.value()))
    }

    /// 当前缓存的计划条目数（观测用）。
    pub fn cached_plan_count(&self) -> usize {
        self.plans.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StructKind, Value};

    #[test]
    fn same_version_conversion_is_a_clone_and_bypasses_cache() {
        let engine = VersionConverter::new();
        let mut source = StructValue::new(TypeTag::new(
            SiriVersion::V1_3,
            StructKind::VehicleMonitoringRequest,
        ));
        source.set_field("LineRef", Value::List(vec![Value::text("10")]));

        let converted = engine
            .convert(&source, SiriVersion::V1_3)
            .expect("同版本转换应成功");
        assert_eq!(converted, source);
        assert_eq!(engine.cached_plan_count(), 0, "同版本不应触碰缓存");
    }

    #[test]
    fn second_lookup_returns_the_installed_plan() {
        let engine = VersionConverter::new();
        let source = TypeTag::new(SiriVersion::V1_0, StructKind::VehicleMonitoringRequest);
        let target = TypeTag::new(SiriVersion::V1_3, StructKind::VehicleMonitoringRequest);

        let first = engine.plan_for(source, target).expect("首建应成功");
        let second = engine.plan_for(source, target).expect("二次查询应命中缓存");
        assert!(Arc::ptr_eq(&first, &second), "二次查询应返回同一计划实例");
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn absence_propagates_without_consulting_any_plan() {
        let engine = VersionConverter::new();
        let converted = engine
            .convert_opt(None, SiriVersion::V1_0)
            .expect("缺失输入应直接传播");
        assert!(converted.is_none());
        assert_eq!(engine.cached_plan_count(), 0);
    }

    #[test]
    fn structure_missing_from_target_revision_is_rejected() {
        let engine = VersionConverter::new();
        let source = StructValue::new(TypeTag::new(
            SiriVersion::V1_3,
            StructKind::SituationExchangeRequest,
        ));

        let err = engine
            .convert(&source, SiriVersion::V1_0)
            .expect_err("1.0 不存在 SituationExchange，应拒绝");
        assert!(matches!(
            err,
            SiriError::UnknownStructure {
                version: SiriVersion::V1_0,
                kind: StructKind::SituationExchangeRequest,
            }
        ));
    }

    #[test]
    fn nested_plans_are_installed_alongside_their_parent() {
        let engine = VersionConverter::new();
        let source = TypeTag::new(SiriVersion::V1_0, StructKind::SubscriptionRequest);
        let target = TypeTag::new(SiriVersion::V1_3, StructKind::SubscriptionRequest);
        engine.plan_for(source, target).expect("父计划应可解析");

        let nested = engine
            .plan_for(
                TypeTag::new(SiriVersion::V1_0, StructKind::VehicleMonitoringSubscription),
                TypeTag::new(SiriVersion::V1_3, StructKind::VehicleMonitoringSubscription),
            )
            .expect("嵌套计划应已随父计划构建");
        assert!(!nested.is_empty());
    }
}
