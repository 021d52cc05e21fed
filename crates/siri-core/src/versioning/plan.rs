//! # plan 模块说明
//!
//! ## 角色定位（Why）
//! - 实现类型对应关系的解析算法：对一对 `(源描述符, 目标描述符)` 按属性名
//!   匹配、按形状分类策略，产出有序且不可变的转换计划；
//! - 解析对每个类型对只发生一次（结果进入计划缓存），因此这里偏向清晰而非
//!   微优化。
//!
//! ## 行为契约（What）
//! - 仅在一侧出现的属性名静默丢弃（版本演进允许增删可选字段，不是错误）；
//! - 两侧同名但元素类型无法以任何策略调和（标量族不一致、标量对复合）时，
//!   在解析期以 [`SiriError::PlanDefect`] 大声失败，绝不静默丢数据；
//! - 嵌套复合元素在解析期即递归解析（或命中缓存），使深层表格缺陷
//!   也在首次构建时暴露；
//! - 零匹配属性的计划合法：两版本对该结构没有结构性交集，记 debug 日志。

use tracing::debug;

use crate::{
    error::SiriError,
    model::{
        TypeTag,
        schema::{self, ElementKind, Shape, TypeDescriptor},
    },
    versioning::{
        VersionConverter,
        property::{Cardinality, ElementConversion, PropertyConverter},
    },
};

/// 一对类型标签的完整转换计划：有序属性转换单元列表。
///
/// 构建后不可变，经 `Arc` 在缓存中共享；对同一键的重复解析必然产出
/// 同序同量的计划（解析是键的纯函数）。
#[derive(Clone, Debug)]
pub struct ConversionPlan {
    source: TypeTag,
    target: TypeTag,
    converters: Vec<PropertyConverter>,
}

impl ConversionPlan {
    pub const fn source(&self) -> TypeTag {
        self.source
    }

    pub const fn target(&self) -> TypeTag {
        self.target
    }

    /// 计划中属性转换单元的数量。
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// 是否为零交集计划。
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// 按源属性声明顺序排列的转换单元。
    pub fn converters(&self) -> &[PropertyConverter] {
        &self.converters
    }

    /// 解析 `(source, target)` 标签对的计划。
    ///
    /// # 教案式说明
    /// - **执行步骤 (How)**：
    ///   1. 两侧标签各查一次静态描述符，缺表即
    ///      [`SiriError::UnknownStructure`]；
    ///   2. 委托 [`resolve_descriptors`] 做名字匹配与策略分类；
    /// - **前置条件**：`engine` 仅用于嵌套元素的递归解析；解析期间不持有
    ///   任何缓存分片锁（见 `versioning` 模块的缓存说明）。
    pub(crate) fn resolve(
        engine: &VersionConverter,
        source: TypeTag,
        target: TypeTag,
    ) -> Result<Self, SiriError> {
        let source_descriptor =
            schema::descriptor(source).ok_or(SiriError::UnknownStructure {
                version: source.version,
                kind: source.kind,
            })?;
        let target_descriptor =
            schema::descriptor(target).ok_or(SiriError::UnknownStructure {
                version: target.version,
                kind: target.kind,
            })?;
        Self::resolve_descriptors(engine, source, target, source_descriptor, target_descriptor)
    }

    /// 对给定的描述符对执行解析算法本体。
    ///
    /// 与 [`resolve`](Self::resolve) 分离是为了让缺陷分类逻辑可以用
    /// 手工构造的描述符单独验证。
    fn resolve_descriptors(
        engine: &VersionConverter,
        source: TypeTag,
        target: TypeTag,
        source_descriptor: &'static TypeDescriptor,
        target_descriptor: &'static TypeDescriptor,
    ) -> Result<Self, SiriError> {
        let mut converters = Vec::new();

        for source_property in source_descriptor.properties {
            let Some(target_property) = target_descriptor
                .properties
                .iter()
                .find(|candidate| candidate.name == source_property.name)
            else {
                // 仅一侧存在的属性：版本演进增删了可选字段，静默丢弃。
                continue;
            };

            let cardinality = match (source_property.shape, target_property.shape) {
                (Shape::Single, Shape::Single) => Cardinality::OneToOne,
                (Shape::Single, Shape::Sequence) => Cardinality::OneToMany,
                (Shape::Sequence, Shape::Sequence) => Cardinality::ManyToMany,
                (Shape::Sequence, Shape::Single) => Cardinality::ManyToOne,
            };

            let element = match (source_property.element, target_property.element) {
                (ElementKind::Scalar(source_kind), ElementKind::Scalar(target_kind)) => {
                    if source_kind != target_kind {
                        return Err(SiriError::PlanDefect {
                            source_version: source.version,
                            target_version: target.version,
                            source_kind: source.kind,
                            property: source_property.name,
                            reason: format!(
                                "scalar family mismatch: {source_kind:?} vs {target_kind:?}"
                            ),
                        });
                    }
                    ElementConversion::Copy
                }
                (ElementKind::Complex(source_kind), ElementKind::Complex(target_kind)) => {
                    let nested_source = TypeTag::new(source.version, source_kind);
                    let nested_target = TypeTag::new(target.version, target_kind);
                    // 递归解析（或命中缓存），让深层缺陷在首次构建时即暴露。
                    engine.plan_for(nested_source, nested_target)?;
                    ElementConversion::Nested {
                        source: nested_source,
                        target: nested_target,
                    }
                }
                (source_element, target_element) => {
                    return Err(SiriError::PlanDefect {
                        source_version: source.version,
                        target_version: target.version,
                        source_kind: source.kind,
                        property: source_property.name,
                        reason: format!(
                            "irreconcilable element types: {source_element:?} vs {target_element:?}"
                        ),
                    });
                }
            };

            converters.push(PropertyConverter::new(
                source_property.name,
                target_property.name,
                cardinality,
                element,
            ));
        }

        if converters.is_empty() {
            debug!(
                source = ?source,
                target = ?target,
                "conversion plan has zero structural overlap"
            );
        }

        Ok(Self {
            source,
            target,
            converters,
        })
    }
}
