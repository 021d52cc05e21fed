//! # factory 模块说明
//!
//! ## 角色定位（Why）
//! - 上游请求工厂：把扁平的字符串键值配置物化为规范版本
//!   （[`SiriVersion::CANONICAL`]）的报文图，转换引擎只消费产物、
//!   从不接触配置键本身；
//! - 时长既接受 ISO-8601 形式（`PT30S`），也接受裸数值（按键位语义取
//!   秒或分钟），与既有线上配置保持兼容。
//!
//! ## 行为契约（What）
//! - `Url` 为必填项，缺失以 [`SiriError::MissingArgument`] 失败；
//! - `Version` 可选，非法值以 [`SiriError::UnknownVersion`] 失败，
//!   缺省为规范版本；
//! - 公共参数非法（如 `PollInterval` 非数字）直接报错；模块内过滤参数
//!   非法（如 `ChangeBeforeUpdates` 格式错）记告警后跳过，保持与
//!   既有部署相同的容错面。

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::{
    error::SiriError,
    model::{ModuleKind, Scalar, StructKind, StructValue, TypeTag, Value},
    version::SiriVersion,
};

pub const ARG_URL: &str = "Url";
pub const ARG_MANAGE_SUBSCRIPTION_URL: &str = "ManageSubscriptionUrl";
pub const ARG_CHECK_STATUS_URL: &str = "CheckStatusUrl";

pub const ARG_VERSION: &str = "Version";
pub const ARG_MODULE_TYPE: &str = "ModuleType";
pub const ARG_SUBSCRIBE: &str = "Subscribe";
pub const ARG_POLL_INTERVAL: &str = "PollInterval";

pub const ARG_RECONNECTION_ATTEMPTS: &str = "ReconnectionAttempts";
pub const ARG_RECONNECTION_INTERVAL: &str = "ReconnectionInterval";

pub const ARG_HEARTBEAT_INTERVAL: &str = "HeartbeatInterval";
pub const ARG_CHECK_STATUS_INTERVAL: &str = "CheckStatusInterval";
pub const ARG_INITIAL_TERMINATION_TIME: &str = "InitialTerminationTime";

pub const ARG_MESSAGE_IDENTIFIER: &str = "MessageIdentifier";
pub const ARG_SUBSCRIPTION_IDENTIFIER: &str = "SubscriptionIdentifier";
pub const ARG_MAXIMUM_VEHICLES: &str = "MaximumVehicles";
pub const ARG_VEHICLE_REF: &str = "VehicleRef";
pub const ARG_LINE_REF: &str = "LineRef";
pub const ARG_DIRECTION_REF: &str = "DirectionRef";
pub const ARG_VEHICLE_MONITORING_REF: &str = "VehicleMonitoringRef";

pub const ARG_CHANGE_BEFORE_UPDATES: &str = "ChangeBeforeUpdates";
pub const ARG_INCREMENTAL_UPDATES: &str = "IncrementalUpdates";
pub const ARG_PREVIEW_INTERVAL: &str = "PreviewInterval";

pub const ARG_MONITORING_REF: &str = "MonitoringRef";

/// 缺省订阅有效期：24 小时。
const DEFAULT_INITIAL_TERMINATION: Duration = Duration::from_secs(24 * 60 * 60);

/// 一次客户端交互的完整描述：连接参数 + 规范版本报文图。
///
/// # 教案式说明
/// - **意图 (Why)**：传输层（本 crate 之外）按 `target_version` 调用转换
///   引擎降级 `payload`，再交由序列化器上线；
/// - **契约 (What)**：`payload` 恒为规范版本的 `Siri` 信封；
///   `initial_termination` 为相对当前时刻的有效期时长。
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SiriClientRequest {
    pub target_url: String,
    pub manage_subscription_url: Option<String>,
    pub check_status_url: Option<String>,
    pub target_version: SiriVersion,
    pub subscribe: bool,
    pub poll_interval: Option<Duration>,
    pub reconnection_attempts: Option<u32>,
    pub reconnection_interval: Option<Duration>,
    pub check_status_interval: Option<Duration>,
    pub heartbeat_interval: Option<Duration>,
    pub initial_termination: Duration,
    pub payload: StructValue,
}

/// 请求工厂：无状态，方法均以配置映射为唯一输入。
#[derive(Clone, Copy, Debug, Default)]
pub struct SiriRequestFactory;

impl SiriRequestFactory {
    pub fn new() -> Self {
        Self
    }

    /// 按 `Subscribe` 开关构建服务请求或订阅请求。
    pub fn create_request(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<SiriClientRequest, SiriError> {
        let mut request = self.process_common_args(args)?;
        if request.subscribe {
            request.payload = self.build_subscription_payload(args)?;
        } else {
            request.payload = self.build_service_payload(args)?;
        }
        Ok(request)
    }

    /// 构建一次性服务请求。
    pub fn create_service_request(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<SiriClientRequest, SiriError> {
        let mut request = self.process_common_args(args)?;
        request.payload = self.build_service_payload(args)?;
        Ok(request)
    }

    /// 构建订阅请求。
    pub fn create_subscription_request(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<SiriClientRequest, SiriError> {
        let mut request = self.process_common_args(args)?;
        request.payload = self.build_subscription_payload(args)?;
        Ok(request)
    }

    /// 构建状态检查请求。
    pub fn create_check_status_request(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<SiriClientRequest, SiriError> {
        let mut request = self.process_common_args(args)?;
        let check_status = canonical(StructKind::CheckStatusRequest);
        request.payload =
            envelope().with_field("CheckStatusRequest", Value::Struct(check_status));
        Ok(request)
    }

    /// 构建终止订阅请求。
    ///
    /// 指定 `SubscriptionIdentifier` 时仅终止该订阅，否则设置 `All` 终止
    /// 全部订阅。
    pub fn create_terminate_subscription_request(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<SiriClientRequest, SiriError> {
        let mut request = self.process_common_args(args)?;

        let mut terminate = canonical(StructKind::TerminateSubscriptionRequest);
        if let Some(message_identifier) = args.get(ARG_MESSAGE_IDENTIFIER) {
            terminate.set_text("MessageIdentifier", message_identifier);
        }
        match args.get(ARG_SUBSCRIPTION_IDENTIFIER) {
            Some(subscription_identifier) => terminate.set_field(
                "SubscriptionRef",
                Value::List(vec![Value::text(subscription_identifier)]),
            ),
            None => terminate.set_text("All", "true"),
        }

        request.payload = envelope().with_field(
            "TerminateSubscriptionRequest",
            Value::Struct(terminate),
        );
        Ok(request)
    }

    fn process_common_args(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<SiriClientRequest, SiriError> {
        let target_url = args
            .get(ARG_URL)
            .ok_or(SiriError::MissingArgument { name: ARG_URL })?
            .clone();

        let target_version = match args.get(ARG_VERSION) {
            Some(version_id) => SiriVersion::from_version_id(version_id)?,
            None => SiriVersion::CANONICAL,
        };

        // Boolean.parseBoolean 语义：仅 "true"（忽略大小写）为真。
        let subscribe = args
            .get(ARG_SUBSCRIBE)
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        let initial_termination = match args.get(ARG_INITIAL_TERMINATION_TIME) {
            Some(value) => parse_initial_termination(value)?,
            None => DEFAULT_INITIAL_TERMINATION,
        };

        Ok(SiriClientRequest {
            target_url,
            manage_subscription_url: args.get(ARG_MANAGE_SUBSCRIPTION_URL).cloned(),
            check_status_url: args.get(ARG_CHECK_STATUS_URL).cloned(),
            target_version,
            subscribe,
            poll_interval: parse_seconds_arg(args, ARG_POLL_INTERVAL)?,
            reconnection_attempts: parse_integer_arg(args, ARG_RECONNECTION_ATTEMPTS)?,
            reconnection_interval: parse_seconds_arg(args, ARG_RECONNECTION_INTERVAL)?,
            check_status_interval: parse_seconds_arg(args, ARG_CHECK_STATUS_INTERVAL)?,
            heartbeat_interval: parse_seconds_arg(args, ARG_HEARTBEAT_INTERVAL)?,
            initial_termination,
            payload: envelope(),
        })
    }

    fn build_service_payload(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<StructValue, SiriError> {
        let mut service_request = canonical(StructKind::ServiceRequest);
        if let Some(message_identifier) = args.get(ARG_MESSAGE_IDENTIFIER) {
            service_request.set_text("MessageIdentifier", message_identifier);
        }

        if let Some(module) = parse_module_type(args)? {
            let module_request = self.build_module_request(module, args)?;
            service_request.set_field(
                module.request_property(),
                Value::List(vec![Value::Struct(module_request)]),
            );
        }

        Ok(envelope().with_field("ServiceRequest", Value::Struct(service_request)))
    }

    fn build_subscription_payload(
        &self,
        args: &BTreeMap<String, String>,
    ) -> Result<StructValue, SiriError> {
        let mut subscription_request = canonical(StructKind::SubscriptionRequest);
        if let Some(message_identifier) = args.get(ARG_MESSAGE_IDENTIFIER) {
            subscription_request.set_text("MessageIdentifier", message_identifier);
        }

        if let Some(module) = parse_module_type(args)? {
            let module_subscription = self.build_module_subscription(module, args)?;
            subscription_request.set_field(
                module.subscription_property(),
                Value::List(vec![Value::Struct(module_subscription)]),
            );
        }

        Ok(envelope().with_field(
            "SubscriptionRequest",
            Value::Struct(subscription_request),
        ))
    }

    fn build_module_request(
        &self,
        module: ModuleKind,
        args: &BTreeMap<String, String>,
    ) -> Result<StructValue, SiriError> {
        let mut request = canonical(module.request_kind());
        match module {
            ModuleKind::VehicleMonitoring => {
                apply_vehicle_monitoring_args(&mut request, args)?;
            }
            ModuleKind::StopMonitoring => apply_stop_monitoring_args(&mut request, args),
            _ => {}
        }
        Ok(request)
    }

    fn build_module_subscription(
        &self,
        module: ModuleKind,
        args: &BTreeMap<String, String>,
    ) -> Result<StructValue, SiriError> {
        let mut subscription = canonical(module.subscription_kind());
        if let Some(subscription_identifier) = args.get(ARG_SUBSCRIPTION_IDENTIFIER) {
            subscription.set_text("SubscriptionIdentifier", subscription_identifier);
        }

        match module {
            ModuleKind::VehicleMonitoring | ModuleKind::StopMonitoring => {
                apply_update_filter_args(&mut subscription, args);
            }
            _ => {}
        }

        let nested = self.build_module_request(module, args)?;
        subscription.set_field(module.request_property(), Value::Struct(nested));
        Ok(subscription)
    }
}

fn envelope() -> StructValue {
    canonical(StructKind::Siri)
}

fn canonical(kind: StructKind) -> StructValue {
    StructValue::new(TypeTag::new(SiriVersion::CANONICAL, kind))
}

fn parse_module_type(
    args: &BTreeMap<String, String>,
) -> Result<Option<ModuleKind>, SiriError> {
    let Some(value) = args.get(ARG_MODULE_TYPE) else {
        return Ok(None);
    };
    ModuleKind::from_module_id(value)
        .map(Some)
        .ok_or_else(|| SiriError::InvalidArgument {
            name: ARG_MODULE_TYPE,
            reason: format!("unrecognized module type `{value}`"),
        })
}

fn apply_vehicle_monitoring_args(
    request: &mut StructValue,
    args: &BTreeMap<String, String>,
) -> Result<(), SiriError> {
    // 规范版本（1.3）中过滤引用是序列，单值配置装入单元素序列。
    if let Some(vehicle_monitoring_ref) = args.get(ARG_VEHICLE_MONITORING_REF) {
        request.set_field(
            "VehicleMonitoringRef",
            Value::List(vec![Value::text(vehicle_monitoring_ref)]),
        );
    }
    if let Some(line_ref) = args.get(ARG_LINE_REF) {
        request.set_field("LineRef", Value::List(vec![Value::text(line_ref)]));
    }
    if let Some(direction_ref) = args.get(ARG_DIRECTION_REF) {
        request.set_text("DirectionRef", direction_ref);
    }
    if let Some(vehicle_ref) = args.get(ARG_VEHICLE_REF) {
        request.set_text("VehicleRef", vehicle_ref);
    }
    if let Some(maximum_vehicles) = args.get(ARG_MAXIMUM_VEHICLES) {
        let value: i64 =
            maximum_vehicles
                .parse()
                .map_err(|_| SiriError::InvalidArgument {
                    name: ARG_MAXIMUM_VEHICLES,
                    reason: format!("expected an integer, got `{maximum_vehicles}`"),
                })?;
        request.set_field("MaximumVehicles", Value::Scalar(Scalar::Integer(value)));
    }
    Ok(())
}

fn apply_stop_monitoring_args(request: &mut StructValue, args: &BTreeMap<String, String>) {
    if let Some(monitoring_ref) = args.get(ARG_MONITORING_REF) {
        request.set_text("MonitoringRef", monitoring_ref);
    }
    if let Some(line_ref) = args.get(ARG_LINE_REF) {
        request.set_text("LineRef", line_ref);
    }
    if let Some(preview_interval) = args.get(ARG_PREVIEW_INTERVAL) {
        // 裸数值按分钟解释，与既有配置约定一致。
        match parse_duration_value(preview_interval, 60) {
            Some(duration) => {
                request.set_field("PreviewInterval", Value::Scalar(Scalar::Duration(duration)));
            }
            None => warn!(
                argument = ARG_PREVIEW_INTERVAL,
                value = preview_interval.as_str(),
                "value must be numeric (minutes) or in ISO-8601 duration format, skipping"
            ),
        }
    }
}

/// 订阅级增量更新过滤参数（VehicleMonitoring 与 StopMonitoring 共享）。
fn apply_update_filter_args(subscription: &mut StructValue, args: &BTreeMap<String, String>) {
    if let Some(change_before_updates) = args.get(ARG_CHANGE_BEFORE_UPDATES) {
        match parse_duration_value(change_before_updates, 1) {
            Some(duration) => subscription.set_field(
                "ChangeBeforeUpdates",
                Value::Scalar(Scalar::Duration(duration)),
            ),
            None => warn!(
                argument = ARG_CHANGE_BEFORE_UPDATES,
                value = change_before_updates.as_str(),
                "value must be numeric (seconds) or in ISO-8601 duration format, skipping"
            ),
        }
    }

    if let Some(incremental_updates) = args.get(ARG_INCREMENTAL_UPDATES) {
        match incremental_updates.trim().to_ascii_lowercase().as_str() {
            "true" => subscription
                .set_field("IncrementalUpdates", Value::Scalar(Scalar::Boolean(true))),
            "false" => subscription
                .set_field("IncrementalUpdates", Value::Scalar(Scalar::Boolean(false))),
            _ => warn!(
                argument = ARG_INCREMENTAL_UPDATES,
                value = incremental_updates.as_str(),
                "value must be either true or false, skipping"
            ),
        }
    }
}

fn parse_integer_arg(
    args: &BTreeMap<String, String>,
    name: &'static str,
) -> Result<Option<u32>, SiriError> {
    args.get(name)
        .map(|value| {
            value.parse().map_err(|_| SiriError::InvalidArgument {
                name,
                reason: format!("expected an integer, got `{value}`"),
            })
        })
        .transpose()
}

fn parse_seconds_arg(
    args: &BTreeMap<String, String>,
    name: &'static str,
) -> Result<Option<Duration>, SiriError> {
    Ok(parse_integer_arg(args, name)?.map(|seconds| Duration::from_secs(u64::from(seconds))))
}

/// 解析有效期：ISO-8601 时长，或 RFC-3339 绝对时刻（换算为相对时长）。
fn parse_initial_termination(value: &str) -> Result<Duration, SiriError> {
    if value.starts_with('P') {
        return parse_iso8601_duration(value).ok_or_else(|| SiriError::InvalidArgument {
            name: ARG_INITIAL_TERMINATION_TIME,
            reason: format!("malformed ISO-8601 duration `{value}`"),
        });
    }

    let instant: DateTime<Utc> = DateTime::parse_from_rfc3339(value)
        .map_err(|error| SiriError::InvalidArgument {
            name: ARG_INITIAL_TERMINATION_TIME,
            reason: format!("malformed ISO-8601 timestamp `{value}`: {error}"),
        })?
        .with_timezone(&Utc);
    // 已过期的时刻按零时长处理，交由上层决定是否立即续订。
    Ok((instant - Utc::now()).to_std().unwrap_or_default())
}

/// 时长参数：ISO-8601 形式或裸数值（`bare_unit_seconds` 给出裸数值单位）。
fn parse_duration_value(value: &str, bare_unit_seconds: u64) -> Option<Duration> {
    if value.starts_with('P') {
        return parse_iso8601_duration(value);
    }
    if !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit()) {
        let amount: u64 = value.parse().ok()?;
        return Some(Duration::from_secs(amount.checked_mul(bare_unit_seconds)?));
    }
    None
}

/// ISO-8601 时长子集解析：`P[nD][T[nH][nM][nS]]`，整数分量。
///
/// 覆盖线上配置实际出现的形态；不支持的形态（周、小数秒、负号）返回
/// `None`，由调用方决定报错或告警跳过。
fn parse_iso8601_duration(text: &str) -> Option<Duration> {
    let rest = text.strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date_part, time_part)) => (date_part, Some(time_part)),
        None => (rest, None),
    };
    if time_part == Some("") {
        return None;
    }

    let mut total_seconds = parse_duration_components(date_part, &[('D', 86_400)])?;
    if let Some(time_part) = time_part {
        let time_seconds =
            parse_duration_components(time_part, &[('H', 3_600), ('M', 60), ('S', 1)])?;
        total_seconds = total_seconds.checked_add(time_seconds)?;
    }
    Some(Duration::from_secs(total_seconds))
}

/// 按单位表顺序解析 `<数字><单位>` 片段序列；单位乱序或未知即失败。
fn parse_duration_components(text: &str, units: &[(char, u64)]) -> Option<u64> {
    let mut total: u64 = 0;
    let mut next_unit = 0;
    let mut cursor = text;

    while !cursor.is_empty() {
        let digits_len = cursor
            .bytes()
            .take_while(|byte| byte.is_ascii_digit())
            .count();
        if digits_len == 0 {
            return None;
        }
        let amount: u64 = cursor[..digits_len].parse().ok()?;
        let unit = cursor[digits_len..].chars().next()?;
        let position = units[next_unit..]
            .iter()
            .position(|(candidate, _)| *candidate == unit)?
            + next_unit;
        total = total.checked_add(amount.checked_mul(units[position].1)?)?;
        next_unit = position + 1;
        cursor = &cursor[digits_len + unit.len_utf8()..];
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> BTreeMap<String, String> {
        let mut args = BTreeMap::new();
        args.insert(ARG_URL.to_string(), "http://transit.example/siri".to_string());
        args
    }

    #[test]
    fn missing_url_fails_with_named_argument() {
        let factory = SiriRequestFactory::new();
        let err = factory
            .create_request(&BTreeMap::new())
            .expect_err("缺 Url 应失败");
        assert_eq!(err, SiriError::MissingArgument { name: ARG_URL });
    }

    #[test]
    fn unknown_version_is_rejected_before_payload_build() {
        let factory = SiriRequestFactory::new();
        let mut args = base_args();
        args.insert(ARG_VERSION.to_string(), "0.9".to_string());
        let err = factory.create_request(&args).expect_err("未知版本应失败");
        assert!(matches!(err, SiriError::UnknownVersion { .. }));
    }

    #[test]
    fn default_target_version_is_canonical() {
        let factory = SiriRequestFactory::new();
        let request = factory
            .create_service_request(&base_args())
            .expect("仅有 Url 的请求应成功");
        assert_eq!(request.target_version, SiriVersion::CANONICAL);
        assert_eq!(request.initial_termination, DEFAULT_INITIAL_TERMINATION);
        assert!(!request.subscribe);
    }

    #[test]
    fn subscription_request_carries_module_subscription_with_nested_request() {
        let factory = SiriRequestFactory::new();
        let mut args = base_args();
        args.insert(ARG_SUBSCRIBE.to_string(), "TRUE".to_string());
        args.insert(ARG_MODULE_TYPE.to_string(), "vehicle_monitoring".to_string());
        args.insert(ARG_SUBSCRIPTION_IDENTIFIER.to_string(), "sub_1".to_string());
        args.insert(ARG_VEHICLE_MONITORING_REF.to_string(), "block_1_1".to_string());
        args.insert(ARG_CHANGE_BEFORE_UPDATES.to_string(), "PT30S".to_string());
        args.insert(ARG_INCREMENTAL_UPDATES.to_string(), "true".to_string());

        let request = factory.create_request(&args).expect("订阅请求应成功");
        assert!(request.subscribe);

        let subscription_request = request
            .payload
            .structure("SubscriptionRequest")
            .expect("信封应含订阅请求");
        let modules = subscription_request
            .sequence("VehicleMonitoringSubscriptionRequest")
            .expect("应有模块订阅序列");
        assert_eq!(modules.len(), 1);
        let module = modules[0].as_struct().expect("元素应为结构");
        assert_eq!(module.text("SubscriptionIdentifier"), Some("sub_1"));
        assert_eq!(
            module.duration("ChangeBeforeUpdates"),
            Some(Duration::from_secs(30))
        );
        assert_eq!(module.boolean("IncrementalUpdates"), Some(true));

        let nested = module
            .structure("VehicleMonitoringRequest")
            .expect("模块订阅应内嵌服务请求");
        let refs = nested
            .sequence("VehicleMonitoringRef")
            .expect("规范版本下过滤引用为序列");
        assert_eq!(refs, [Value::text("block_1_1")]);
    }

    #[test]
    fn terminate_request_without_identifier_terminates_all() {
        let factory = SiriRequestFactory::new();
        let request = factory
            .create_terminate_subscription_request(&base_args())
            .expect("终止请求应成功");
        let terminate = request
            .payload
            .structure("TerminateSubscriptionRequest")
            .expect("信封应含终止请求");
        assert_eq!(terminate.text("All"), Some("true"));
        assert!(terminate.field("SubscriptionRef").is_none());
    }

    #[test]
    fn terminate_request_with_identifier_targets_single_subscription() {
        let factory = SiriRequestFactory::new();
        let mut args = base_args();
        args.insert(ARG_SUBSCRIPTION_IDENTIFIER.to_string(), "sub_7".to_string());
        let request = factory
            .create_terminate_subscription_request(&args)
            .expect("终止请求应成功");
        let terminate = request
            .payload
            .structure("TerminateSubscriptionRequest")
            .expect("信封应含终止请求");
        assert_eq!(
            terminate.sequence("SubscriptionRef"),
            Some(&[Value::text("sub_7")][..])
        );
        assert!(terminate.field("All").is_none());
    }

    #[test]
    fn malformed_module_filter_is_skipped_not_fatal() {
        let factory = SiriRequestFactory::new();
        let mut args = base_args();
        args.insert(ARG_SUBSCRIBE.to_string(), "true".to_string());
        args.insert(ARG_MODULE_TYPE.to_string(), "STOP_MONITORING".to_string());
        args.insert(ARG_PREVIEW_INTERVAL.to_string(), "soon".to_string());

        let request = factory.create_request(&args).expect("非法过滤参数不应致命");
        let subscription_request = request
            .payload
            .structure("SubscriptionRequest")
            .expect("信封应含订阅请求");
        let modules = subscription_request
            .sequence("StopMonitoringSubscriptionRequest")
            .expect("应有模块订阅序列");
        let nested = modules[0]
            .as_struct()
            .and_then(|module| module.structure("StopMonitoringRequest"))
            .expect("应内嵌服务请求");
        assert!(nested.field("PreviewInterval").is_none(), "非法值应被跳过");
    }

    #[test]
    fn iso8601_duration_subset_parses_expected_forms() {
        assert_eq!(parse_iso8601_duration("PT30S"), Some(Duration::from_secs(30)));
        assert_eq!(
            parse_iso8601_duration("PT1H30M"),
            Some(Duration::from_secs(5_400))
        );
        assert_eq!(
            parse_iso8601_duration("P1DT12H"),
            Some(Duration::from_secs(129_600))
        );
        assert_eq!(parse_iso8601_duration("P1D"), Some(Duration::from_secs(86_400)));

        assert_eq!(parse_iso8601_duration("P"), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("PT30X"), None);
        assert_eq!(parse_iso8601_duration("PT1S30M"), None, "单位乱序应失败");
        assert_eq!(parse_iso8601_duration("30S"), None);
    }

    #[test]
    fn bare_numeric_durations_use_per_argument_units() {
        assert_eq!(
            parse_duration_value("45", 1),
            Some(Duration::from_secs(45)),
            "ChangeBeforeUpdates 按秒"
        );
        assert_eq!(
            parse_duration_value("5", 60),
            Some(Duration::from_secs(300)),
            "PreviewInterval 按分钟"
        );
        assert_eq!(parse_duration_value("5m", 60), None);
    }

    #[test]
    fn initial_termination_accepts_duration_and_timestamp() {
        let duration = parse_initial_termination("PT2H").expect("时长形式应可解析");
        assert_eq!(duration, Duration::from_secs(7_200));

        let future = (Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
        let relative = parse_initial_termination(&future).expect("时间戳形式应可解析");
        assert!(relative <= Duration::from_secs(3_600));
        assert!(relative > Duration::from_secs(3_500), "应接近一小时");

        let err = parse_initial_termination("tomorrow").expect_err("非法形式应报错");
        assert!(matches!(
            err,
            SiriError::InvalidArgument {
                name: ARG_INITIAL_TERMINATION_TIME,
                ..
            }
        ));
    }

    #[test]
    fn common_interval_arguments_reject_non_numeric_values() {
        let factory = SiriRequestFactory::new();
        let mut args = base_args();
        args.insert(ARG_POLL_INTERVAL.to_string(), "often".to_string());
        let err = factory.create_request(&args).expect_err("公共参数非法应报错");
        assert!(matches!(
            err,
            SiriError::InvalidArgument {
                name: ARG_POLL_INTERVAL,
                ..
            }
        ));
    }
}
