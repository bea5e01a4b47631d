use crate::core::import::text::{fold_width, is_space, trim_spaces};
use crate::domain::model::{Gender, NewEmployee, RawEmployee};
use crate::utils::error::{CizError, Result, RowErrorKind};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn parse_gender(token: &str) -> Option<Gender> {
    let folded = fold_width(trim_spaces(token));
    match folded.to_ascii_lowercase().as_str() {
        "男性" | "男" | "m" | "male" | "1" => Some(Gender::Male),
        "女性" | "女" | "f" | "female" | "2" => Some(Gender::Female),
        "その他" | "other" | "3" => Some(Gender::Other),
        _ => None,
    }
}

pub fn parse_employee_number(raw: &str) -> Option<i64> {
    let folded = fold_width(trim_spaces(raw));
    if folded.is_empty() || !folded.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    folded.parse().ok()
}

/// 「姓 名」在第一段空白處切開，名的部分內部空白壓成一個半形空白
pub fn split_name(name: &str) -> (String, String) {
    let name = trim_spaces(name);
    match name.find(is_space) {
        Some(pos) => {
            let last = &name[..pos];
            let first = name[pos..]
                .split(is_space)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (last.to_string(), first)
        }
        None => (name.to_string(), String::new()),
    }
}

/// `taro.yamada@example.jp` -> `Taro Yamada`
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    local
        .split(['.', '_', '-'])
        .filter(|segment| !segment.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_ascii_lowercase()),
        None => email.to_string(),
    }
}

fn required<'a>(value: &'a str, field: &'static str, line: usize) -> Result<&'a str> {
    let trimmed = trim_spaces(value);
    if trimmed.is_empty() {
        return Err(CizError::row(line, RowErrorKind::MissingField(field)));
    }
    Ok(trimmed)
}

/// 驗證單一列並轉成可寫入的資料
pub fn validate_row(row: &RawEmployee) -> Result<NewEmployee> {
    let line = row.line;

    let number_raw = required(&row.employee_number, "社員番号", line)?;
    let employee_number = parse_employee_number(number_raw).ok_or_else(|| {
        CizError::row(
            line,
            RowErrorKind::NonNumericEmployeeNumber(number_raw.to_string()),
        )
    })?;

    let name = required(&row.name, "氏名", line)?;

    let email = fold_width(required(&row.email, "メールアドレス", line)?);
    if !is_valid_email(&email) {
        return Err(CizError::row(line, RowErrorKind::InvalidEmail(email)));
    }
    let email = normalize_email(&email);

    let gender_raw = required(&row.gender, "性別", line)?;
    let gender = parse_gender(gender_raw)
        .ok_or_else(|| CizError::row(line, RowErrorKind::InvalidGender(gender_raw.to_string())))?;

    let (last_name, first_name) = split_name(name);

    Ok(NewEmployee {
        employee_number,
        last_name,
        first_name,
        display_name: display_name_from_email(&email),
        email,
        gender,
    })
}

/// 依序驗證，遇到第一個錯誤就中止；同一批內重複的社員編號或 email 也視為錯誤
pub fn validate_rows(rows: &[RawEmployee]) -> Result<Vec<NewEmployee>> {
    let mut numbers = HashSet::new();
    let mut emails = HashSet::new();
    let mut employees = Vec::with_capacity(rows.len());

    for row in rows {
        let employee = validate_row(row)?;

        if !numbers.insert(employee.employee_number) {
            return Err(CizError::row(
                row.line,
                RowErrorKind::DuplicateEmployeeNumber(employee.employee_number),
            ));
        }
        if !emails.insert(employee.email.to_lowercase()) {
            return Err(CizError::row(
                row.line,
                RowErrorKind::DuplicateEmail(employee.email.clone()),
            ));
        }

        employees.push(employee);
    }

    Ok(employees)
}
