//! # property 模块说明
//!
//! ## 角色定位（Why）
//! - 承载属性级转换策略：一个 [`PropertyConverter`] 绑定一对（源访问名，
//!   目标访问名），以基数策略 × 元素策略的组合描述全部转换形态；
//! - 全部转换形态收敛为两个封闭枚举（[`Cardinality`] × [`ElementConversion`]）
//!   的笛卡尔组合，不为每种形态单设类型。
//!
//! ## 行为契约（What）
//! - `apply` 的唯一可观察效果是写入目标结构的对应字段，绝不改动源结构；
//! - 源字段缺失永远是 no-op，策略不会合成默认值；
//! - 空的源序列同样 no-op（“显式清空”与“从未设置”在本域合并，见 DESIGN.md）；
//! - 序列转换保持元素顺序；单值升格为序列时产出恰好一个元素。

use tracing::warn;

use crate::{
    error::SiriError,
    model::{StructKind, StructValue, TypeTag, Value},
    versioning::VersionConverter,
};

/// 基数策略：源形状 × 目标形状的四种组合。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Cardinality {
    /// 单值 → 单值。
    OneToOne,
    /// 单值 → 序列：产出一个单元素序列。
    OneToMany,
    /// 序列 → 序列：逐元素转换，保持顺序。
    ManyToMany,
    /// 序列 → 单值（降级方向）：取首元素，多余元素丢弃并告警。
    ManyToOne,
}

/// 元素策略：标量原样拷贝，或嵌套结构递归转换。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ElementConversion {
    /// 同族标量，拷贝即等价。
    Copy,
    /// 复合元素，委托图转换器按 `(source, target)` 标签对递归转换。
    Nested { source: TypeTag, target: TypeTag },
}

/// 单个属性的转换单元。
///
/// # 教案式说明
/// - **意图 (Why)**：计划即有序的 `PropertyConverter` 列表，执行与解析彻底
///   分离；同一计划可被任意多线程并发执行；
/// - **契约 (What)**：
///   - **前置条件**：`source`/`target` 名来自解析期的描述符匹配，调用方保证
///     目标结构种类与解析时一致；
///   - **后置条件**：源字段在场且形状合法时，目标对应字段被写入一次；
///     否则目标保持原样；
/// - **风险 (Trade-offs)**：运行期仍校验值形状（防上游构图缺陷），
///   校验失败返回 [`SiriError::MalformedValue`] 而非静默丢数据。
#[derive(Clone, Debug)]
pub struct PropertyConverter {
    source: &'static str,
    target: &'static str,
    cardinality: Cardinality,
    element: ElementConversion,
}

impl PropertyConverter {
    pub(crate) const fn new(
        source: &'static str,
        target: &'static str,
        cardinality: Cardinality,
        element: ElementConversion,
    ) -> Self {
        Self {
            source,
            target,
            cardinality,
            element,
        }
    }

    /// 源属性名。
    pub const fn source_property(&self) -> &'static str {
        self.source
    }

    /// 目标属性名。
    pub const fn target_property(&self) -> &'static str {
        self.target
    }

    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub const fn element(&self) -> ElementConversion {
        self.element
    }

    /// 执行本属性的转换：读源、按策略变换、写目标。
    pub(crate) fn apply(
        &self,
        engine: &VersionConverter,
        source: &StructValue,
        target: &mut StructValue,
    ) -> Result<(), SiriError> {
        let Some(value) = source.field(self.source) else {
            return Ok(());
        };

        match self.cardinality {
            Cardinality::OneToOne => {
                let converted = self.convert_element(engine, source.kind(), value)?;
                target.set_field(self.target, converted);
            }
            Cardinality::OneToMany => {
                let converted = self.convert_element(engine, source.kind(), value)?;
                target.set_field(self.target, Value::List(vec![converted]));
            }
            Cardinality::ManyToMany => {
                let items = self.expect_sequence(source.kind(), value)?;
                if items.is_empty() {
                    return Ok(());
                }
                let mut converted = Vec::with_capacity(items.len());
                for item in items {
                    converted.push(self.convert_element(engine, source.kind(), item)?);
                }
                target.set_field(self.target, Value::List(converted));
            }
            Cardinality::ManyToOne => {
                let items = self.expect_sequence(source.kind(), value)?;
                let Some(first) = items.first() else {
                    return Ok(());
                };
                if items.len() > 1 {
                    warn!(
                        property = self.source,
                        kind = ?source.kind(),
                        dropped = items.len() - 1,
                        "downgrading repeated property to single value, surplus elements dropped"
                    );
                }
                let converted = self.convert_element(engine, source.kind(), first)?;
                target.set_field(self.target, converted);
            }
        }
        Ok(())
    }

    fn expect_sequence<'a>(
        &self,
        kind: StructKind,
        value: &'a Value,
    ) -> Result<&'a [Value], SiriError> {
        value.as_list().ok_or(SiriError::MalformedValue {
            kind,
            property: self.source,
            expected: "sequence",
        })
    }

    fn convert_element(
        &self,
        engine: &VersionConverter,
        kind: StructKind,
        value: &Value,
    ) -> Result<Value, SiriError> {
        match (self.element, value) {
            (ElementConversion::Copy, Value::Scalar(scalar)) => Ok(Value::Scalar(scalar.clone())),
            (ElementConversion::Nested { target, .. }, Value::Struct(nested)) => {
                Ok(Value::Struct(engine.convert_to(nested, target)?))
            }
            (ElementConversion::Copy, _) => Err(SiriError::MalformedValue {
                kind,
                property: self.source,
                expected: "scalar element",
            }),
            (ElementConversion::Nested { .. }, _) => Err(SiriError::MalformedValue {
                kind,
                property: self.source,
                expected: "nested structure element",
            }),
        }
    }
}
