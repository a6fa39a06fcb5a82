use crate::error::{CompareError, Result};
use regex::Regex;

/// 规范化例程/视图/触发器的定义文本，消除注释与排版噪音
///
/// 依次剥离块注释（`/* ... */`）、行注释（`--`、`#` 到行尾），
/// 最后把所有空白折叠为单个空格。表结构不走文本规范化，
/// 表使用字段级结构比对。
pub fn normalize_definition(definition: &str) -> Result<String> {
    let block_comments = Regex::new(r"(?s)/\*.*?\*/")
        .map_err(|e| CompareError::comparison(format!("无效的块注释正则: {e}")))?;
    let line_comments = Regex::new(r"(--|#)[^\r\n]*")
        .map_err(|e| CompareError::comparison(format!("无效的行注释正则: {e}")))?;

    let without_blocks = block_comments.replace_all(definition, " ");
    let without_lines = line_comments.replace_all(&without_blocks, " ");

    Ok(without_lines
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" "))
}

/// 判断两个定义在规范化之后是否等价
pub fn definitions_equivalent(source: &str, target: &str) -> Result<bool> {
    Ok(normalize_definition(source)? == normalize_definition(target)?)
}
