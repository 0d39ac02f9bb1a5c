//! 任务输入校验
//!
//! 规则：
//! - `type`: 必填字符串，2..=32 个字符，仅 `[A-Za-z_]`
//! - age 任务的 `name`: 必填字符串，2..=64 个字符，字母 (含 À-ÿ)、空白与 `-`
//! - age 任务的 `country`: 必填字符串，大写后为两个 ASCII 字母
//!
//! 所有违规项一并收集返回。

use ::validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};
use contracts::{ContractError, TaskRecord};
use serde_json::Value;

#[derive(Debug, Validate)]
struct TypeField {
    #[validate(
        length(min = 2, max = 32, message = "must be between 2 and 32 characters"),
        custom(function = "validate_type_chars")
    )]
    task_type: String,
}

#[derive(Debug, Validate)]
struct AgeFields {
    #[validate(
        length(min = 2, max = 64, message = "must be between 2 and 64 characters"),
        custom(function = "validate_name_chars")
    )]
    name: String,

    #[validate(custom(function = "validate_country"))]
    country: String,
}

fn validate_type_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        Ok(())
    } else {
        Err(ValidationError::new("chars")
            .with_message(format!("'{value}' contains invalid characters").into()))
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{C0}'..='\u{FF}').contains(&c) || c.is_whitespace() || c == '-'
}

fn validate_name_chars(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(is_name_char) {
        Ok(())
    } else {
        Err(ValidationError::new("chars")
            .with_message(format!("'{value}' contains invalid characters").into()))
    }
}

fn validate_country(value: &str) -> Result<(), ValidationError> {
    let upper = value.to_uppercase();
    if upper.len() == 2 && upper.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("country").with_message(
            format!("invalid country code '{value}', must be ISO 3166-1 alpha-2").into(),
        ))
    }
}

/// 校验任务记录，所有违规项以 `; ` 连接
pub fn validate_task(task: &TaskRecord) -> Result<(), ContractError> {
    let violations = violations(task);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ContractError::invalid_task(violations.join("; ")))
    }
}

/// 列出任务记录的所有违规项
pub fn violations(task: &TaskRecord) -> Vec<String> {
    let mut found = Vec::new();

    match required_str(task, "type") {
        Some(task_type) => collect(
            TypeField {
                task_type: task_type.to_string(),
            }
            .validate(),
            &mut found,
        ),
        None => found.push("missing or invalid 'type' field".to_string()),
    }

    if task.task_type() == "age" {
        let name = required_str(task, "name");
        let country = required_str(task, "country");
        if name.is_none() {
            found.push("missing or invalid 'name' field".to_string());
        }
        if country.is_none() {
            found.push("missing or invalid 'country' field".to_string());
        }

        let fields = AgeFields {
            name: name.unwrap_or_default().to_string(),
            country: country.unwrap_or_default().to_string(),
        };
        if let Err(errors) = fields.validate() {
            collect_fields(&errors, name.is_some(), country.is_some(), &mut found);
        }
    }

    found
}

/// Non-empty string field
fn required_str<'a>(task: &'a TaskRecord, key: &str) -> Option<&'a str> {
    match task.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn collect(result: Result<(), ValidationErrors>, found: &mut Vec<String>) {
    if let Err(errors) = result {
        push_messages(&errors, |_| true, found);
    }
}

/// Only report rule violations for fields that were present
fn collect_fields(errors: &ValidationErrors, has_name: bool, has_country: bool, found: &mut Vec<String>) {
    push_messages(
        errors,
        |field| match field {
            "name" => has_name,
            "country" => has_country,
            _ => true,
        },
        found,
    );
}

fn push_messages<F>(errors: &ValidationErrors, include: F, found: &mut Vec<String>)
where
    F: Fn(&str) -> bool,
{
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| field_order(field));

    for (field, kind) in fields {
        let field = display_name(field);
        if !include(field) {
            continue;
        }
        if let ValidationErrorsKind::Field(list) = kind {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed '{}' check", error.code));
                found.push(format!("invalid '{field}': {message}"));
            }
        }
    }
}

/// Record key a struct field was read from
fn display_name(field: &str) -> &str {
    match field {
        "task_type" => "type",
        other => other,
    }
}

fn field_order(field: &str) -> u8 {
    match display_name(field) {
        "type" => 0,
        "name" => 1,
        "country" => 2,
        _ => 3,
    }
}
