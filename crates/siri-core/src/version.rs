//! # version 模块说明
//!
//! ## 角色定位（Why）
//! - 以封闭枚举表示受支持的 SIRI 模式版本集合，取代开放式字符串比较；
//! - 版本号在编译/生成期即固定，进程生命周期内不会增减，因此枚举天然成立。
//!
//! ## 设计要求（What）
//! - 线上配置以版本串（`"1.0"`、`"1.3"`）出现，解析失败必须在任何转换
//!   计划构建之前返回 [`SiriError::UnknownVersion`]；
//! - 枚举实现 `Copy` 与全序比较，便于作为缓存键的组成部分。

use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::SiriError;

/// 受支持的 SIRI 模式版本（封闭集合）。
///
/// # 教案式说明
/// - **意图 (Why)**：不同版本的报文结构互不线兼容，版本标签是转换计划缓存键
///   的一半；封闭枚举让“请求不支持的版本”在解析边界即被拒绝。
/// - **契约 (What)**：
///   - [`version_id`](Self::version_id) 返回稳定的线上标识，round-trip 安全；
///   - [`CANONICAL`](Self::CANONICAL) 为进程内部规范版本，上游请求工厂
///     一律先构建规范版本的报文图，再按需降级；
/// - **扩展指引 (How)**：新增版本时补充枚举变体、`ALL` 常量与
///   `model::schema` 中对应的描述符表即可，其余引擎逻辑无需改动。
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum SiriVersion {
    /// SIRI 1.0 一代模式。
    V1_0,
    /// SIRI 1.3 一代模式，同时作为进程内部的规范版本。
    V1_3,
}

impl SiriVersion {
    /// 进程内部统一采用的规范版本。
    pub const CANONICAL: SiriVersion = SiriVersion::V1_3;

    /// 全部受支持版本，按代际排序。
    pub const ALL: [SiriVersion; 2] = [SiriVersion::V1_0, SiriVersion::V1_3];

    /// 返回线上使用的稳定版本标识。
    pub const fn version_id(self) -> &'static str {
        match self {
            SiriVersion::V1_0 => "1.0",
            SiriVersion::V1_3 => "1.3",
        }
    }

    /// 按版本标识解析版本。
    ///
    /// - **契约 (What)**：仅接受 [`version_id`](Self::version_id) 的精确输出；
    ///   其他任何串返回 [`SiriError::UnknownVersion`]，携带原始输入便于排障。
    pub fn from_version_id(version_id: &str) -> Result<Self, SiriError> {
        Self::ALL
            .into_iter()
            .find(|version| version.version_id() == version_id)
            .ok_or_else(|| SiriError::UnknownVersion {
                version_id: version_id.to_string(),
            })
    }
}

impl fmt::Display for SiriVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.version_id())
    }
}

impl FromStr for SiriVersion {
    type Err = SiriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_version_id(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_id_round_trips() {
        for version in SiriVersion::ALL {
            assert_eq!(
                SiriVersion::from_version_id(version.version_id()).expect("稳定标识应可解析"),
                version
            );
        }
    }

    #[test]
    fn unknown_version_id_is_rejected_with_original_input() {
        let err = SiriVersion::from_version_id("2.0").expect_err("未支持版本应被拒绝");
        assert_eq!(
            err,
            SiriError::UnknownVersion {
                version_id: "2.0".to_string()
            }
        );
    }

    #[test]
    fn canonical_version_is_latest_generation() {
        assert_eq!(SiriVersion::CANONICAL, SiriVersion::V1_3);
    }
}
