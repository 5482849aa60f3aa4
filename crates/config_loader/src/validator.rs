//! 配置校验模块
//!
//! 校验规则：
//! - tick_period_ms > 0
//! - compliance_probability 在 [0, 1] 内且为有限值
//! - worker_id 唯一且非空
//! - max_ticks (若设置) > 0
//! - sink 名称非空且唯一，必填参数齐全

use std::collections::HashSet;

use ::validator::Validate;
use contracts::{ContractError, MonitorBlueprint, SinkType};

/// 校验 MonitorBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    validate_fleet(blueprint)?;
    validate_scheduler(blueprint)?;
    validate_source(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 将 validator 派生校验的错误转换为 ContractError
fn check_ranges<T: Validate>(section: &str, value: &T) -> Result<(), ContractError> {
    value.validate().map_err(|errors| {
        let first = errors.field_errors().into_iter().next().map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string());
            (format!("{section}.{field}"), message)
        });
        let (field, message) = first.unwrap_or_else(|| (section.to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })
}

/// 校验工人名册
fn validate_fleet(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let roster = blueprint.fleet.roster()?;
    for (idx, worker) in roster.iter().enumerate() {
        if worker.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("fleet.workers[{idx}]"),
                "worker_id cannot be empty",
            ));
        }
    }
    Ok(())
}

/// 校验调度配置
fn validate_scheduler(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let scheduler = &blueprint.scheduler;
    check_ranges("scheduler", scheduler)?;

    if scheduler.max_ticks == Some(0) {
        return Err(ContractError::config_validation(
            "scheduler.max_ticks",
            "max_ticks must be > 0 when set",
        ));
    }
    Ok(())
}

/// 校验传感器来源配置
fn validate_source(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;
    // NaN passes range comparisons
    if !source.compliance_probability.is_finite() {
        return Err(ContractError::config_validation(
            "source.compliance_probability",
            "compliance_probability must be a finite number",
        ));
    }
    check_ranges("source", source)
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &MonitorBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }

        let required = match sink.sink_type {
            SinkType::Log => None,
            SinkType::File => Some("path"),
            SinkType::Network => Some("addr"),
        };
        if let Some(param) = required {
            if !sink.params.contains_key(param) {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.{}", sink.name, param),
                    format!("{:?} sink requires '{}' parameter", sink.sink_type, param),
                ));
            }
        }
    }
    Ok(())
}
