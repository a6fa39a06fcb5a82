mod config_diff;
mod normalize;
mod sql;
mod table;
mod text;
mod types;

#[cfg(test)]
mod tests;

// 重新导出公共接口
pub use config_diff::{CONFIG_OBJECT_NAME, diff_config_variables};
pub use normalize::{definitions_equivalent, normalize_definition};
pub use table::{
    TableDiff, TablePresence, classify_table_presence, diff_table_structures,
    table_missing_in_source, table_missing_in_target, table_record,
};
pub use text::diff_text_catalogs;
pub use types::{
    CatalogSnapshot, ColumnSpec, ConstraintKind, ConstraintSpec, DiffSummary, DifferenceRecord,
    IndexSpec, ObjectKind, TableStructure,
};
