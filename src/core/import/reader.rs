use crate::core::import::text::{fold_width, is_space, trim_spaces};
use crate::domain::model::RawEmployee;
use crate::utils::error::{CizError, Result};
use csv::{ReaderBuilder, StringRecord};

/// 匯入檔的四個固定欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    EmployeeNumber,
    Name,
    Email,
    Gender,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::EmployeeNumber,
        Column::Name,
        Column::Email,
        Column::Gender,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Column::EmployeeNumber => "社員番号",
            Column::Name => "氏名",
            Column::Email => "メールアドレス",
            Column::Gender => "性別",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::EmployeeNumber => &[
                "社員番号",
                "従業員番号",
                "社員no",
                "employee_number",
                "employeenumber",
            ],
            Column::Name => &["氏名", "名前", "name", "fullname"],
            Column::Email => &["メールアドレス", "メール", "email", "mail"],
            Column::Gender => &["性別", "gender", "sex"],
        }
    }

    fn matches(&self, normalized_header: &str) -> bool {
        self.aliases().iter().any(|alias| *alias == normalized_header)
    }
}

/// 表頭正規化: BOM、前後空白、全形英數字、引號、中間空白
pub fn normalize_header(raw: &str) -> String {
    let without_bom = raw.trim_start_matches('\u{FEFF}');
    let folded = fold_width(trim_spaces(without_bom));
    let unquoted = folded.trim_matches(|c| c == '"' || c == '\'');
    unquoted
        .chars()
        .filter(|c| !is_space(*c))
        .collect::<String>()
        .to_ascii_lowercase()
}

pub fn detect_delimiter(text: &str) -> u8 {
    let header_line = text.lines().next().unwrap_or_default();
    if header_line.contains('\t') && !header_line.contains(',') {
        b'\t'
    } else {
        b','
    }
}

#[derive(Debug, Clone, Copy)]
struct ColumnIndexes {
    employee_number: usize,
    name: usize,
    email: usize,
    gender: usize,
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnIndexes> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();

    let find = |column: Column| -> Result<usize> {
        normalized
            .iter()
            .position(|h| column.matches(h))
            .ok_or_else(|| CizError::MissingColumnError {
                column: column.label().to_string(),
            })
    };

    Ok(ColumnIndexes {
        employee_number: find(Column::EmployeeNumber)?,
        name: find(Column::Name)?,
        email: find(Column::Email)?,
        gender: find(Column::Gender)?,
    })
}

/// 解析已解碼的 CSV/TSV 文字，回傳保留原始值的資料列
pub fn parse_table(text: &str, max_rows: usize) -> Result<Vec<RawEmployee>> {
    let delimiter = detect_delimiter(text);
    tracing::debug!("Using delimiter {:?}", delimiter as char);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;

        if record.iter().all(|cell| trim_spaces(cell).is_empty()) {
            continue;
        }

        if rows.len() >= max_rows {
            return Err(CizError::validation(format!(
                "取り込める行数は最大 {} 行です",
                max_rows
            )));
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();

        rows.push(RawEmployee {
            line,
            employee_number: cell(columns.employee_number),
            name: cell(columns.name),
            email: cell(columns.email),
            gender: cell(columns.gender),
        });
    }

    if rows.is_empty() {
        return Err(CizError::validation("取り込むデータがありません"));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("\u{FEFF}社員番号"), "社員番号");
        assert_eq!(normalize_header(" \"氏名\"\u{3000}"), "氏名");
        assert_eq!(normalize_header("社員ＮＯ"), "社員no");
        assert_eq!(normalize_header("Employee Number"), "employeenumber");
    }

    #[test]
    fn test_parse_table_maps_columns_by_label() {
        let text = "性別,メールアドレス,氏名,社員番号,部署\n\
                    男性,taro.yamada@example.jp,山田 太郎,1001,営業\n";
        let rows = parse_table(text, 100).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].employee_number, "1001");
        assert_eq!(rows[0].name, "山田 太郎");
        assert_eq!(rows[0].email, "taro.yamada@example.jp");
        assert_eq!(rows[0].gender, "男性");
    }

    #[test]
    fn test_parse_table_tab_delimited_with_english_headers() {
        let text = "employee_number\tname\temail\tgender\n7\tSato Hana\thana@example.jp\tF\n";
        let rows = parse_table(text, 100).unwrap();
        assert_eq!(rows[0].employee_number, "7");
        assert_eq!(rows[0].gender, "F");
    }

    #[test]
    fn test_blank_rows_are_skipped_and_lines_kept() {
        let text = "社員番号,氏名,メールアドレス,性別\n\
                    1,山田 太郎,a@example.jp,男\n\
                    ,,,\n\
                    2,佐藤 花子,b@example.jp,女\n";
        let rows = parse_table(text, 100).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_missing_column() {
        let text = "社員番号,氏名,性別\n1,山田 太郎,男\n";
        let err = parse_table(text, 100).unwrap_err();
        assert_eq!(err.to_string(), "必須の列が見つかりません: メールアドレス");
    }

    #[test]
    fn test_header_only_file() {
        let text = "社員番号,氏名,メールアドレス,性別\n";
        let err = parse_table(text, 100).unwrap_err();
        assert_eq!(err.user_friendly_message(), "取り込むデータがありません");
    }

    #[test]
    fn test_max_rows() {
        let text = "社員番号,氏名,メールアドレス,性別\n\
                    1,A B,a@example.jp,男\n\
                    2,C D,c@example.jp,女\n";
        assert!(parse_table(text, 1).is_err());
        assert_eq!(parse_table(text, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_short_rows_become_empty_cells() {
        let text = "社員番号,氏名,メールアドレス,性別\n1,山田 太郎\n";
        let rows = parse_table(text, 10).unwrap();
        assert_eq!(rows[0].email, "");
        assert_eq!(rows[0].gender, "");
    }
}
