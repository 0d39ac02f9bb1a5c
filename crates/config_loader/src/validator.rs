//! 配置校验模块
//!
//! 校验规则：
//! - endpoints 为合法 URL
//! - http.timeout_secs >= 1
//! - preload.batch_size 在 1..=10 之间
//! - input.max_concurrent_files >= 1, processed_suffix 非空
//! - schedule.process_time 为 HH:MM
//! - input.dir 与 logging.dir 非空

use ::validator::{Validate, ValidationErrors, ValidationErrorsKind};
use contracts::{ContractError, Settings};

/// 校验 Settings 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(settings: &Settings) -> Result<(), ContractError> {
    settings.validate().map_err(|errors| first_error("", &errors))?;
    validate_paths(settings)?;
    Ok(())
}

/// 校验目录配置非空
fn validate_paths(settings: &Settings) -> Result<(), ContractError> {
    if settings.input.dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "input.dir",
            "input directory cannot be empty",
        ));
    }
    if settings.logging.dir.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "logging.dir",
            "log directory cannot be empty",
        ));
    }
    Ok(())
}

/// 将 validator 的嵌套错误展开为第一个带完整路径的错误
fn first_error(prefix: &str, errors: &ValidationErrors) -> ContractError {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(error) = list.first() {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' check", error.code));
                    return ContractError::config_validation(path, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => return first_error(&path, nested),
            ValidationErrorsKind::List(items) => {
                if let Some((idx, nested)) = items.iter().next() {
                    return first_error(&format!("{path}[{idx}]"), nested);
                }
            }
        }
    }

    ContractError::config_validation(prefix, "invalid settings")
}
