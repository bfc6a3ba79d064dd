use sea_orm::prelude::{DateTimeWithTimeZone, Decimal, *};
use serde::{Deserialize, Serialize};

/// One persisted employee row. All four payload columns are `NOT NULL`;
/// defaults are resolved before insert.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub employee_name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(with = "rust_decimal::serde::float")]
    pub employee_salary: Decimal,
    pub employee_rate: i32,
    pub employee_field: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
