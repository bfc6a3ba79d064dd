use std::sync::Arc;

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, ID, InputObject, Object, Schema, SimpleObject,
};
use platform_api::ApiError;
use platform_db::EmployeeStore;
use products_hr::{Employee, EmployeeInput};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use tracing::instrument;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Store handle injected into every resolver.
pub type StoreHandle = Arc<dyn EmployeeStore>;

pub fn build_schema(store: StoreHandle) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

fn store<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a StoreHandle> {
    ctx.data::<StoreHandle>()
}

fn api_error(err: impl Into<ApiError>) -> async_graphql::Error {
    err.into().extend()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self, ctx: &Context<'_>) -> async_graphql::Result<HealthPayload> {
        let ok = store(ctx)?.ping().await.is_ok();
        Ok(HealthPayload { ok })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Every employee, in store order.
    #[instrument(name = "graphql.employees", skip_all)]
    async fn employees(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EmployeeNode>> {
        let rows = products_hr::list_employees(store(ctx)?.as_ref())
            .await
            .map_err(api_error)?;
        Ok(rows.into_iter().map(EmployeeNode::from).collect())
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create one employee; absent fields take their defaults.
    #[instrument(name = "graphql.create_employee", skip_all)]
    async fn create_employee(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] input: CreateEmployeeInput,
    ) -> async_graphql::Result<EmployeeNode> {
        let created = products_hr::create_employee(store(ctx)?.as_ref(), input.into())
            .await
            .map_err(api_error)?;
        Ok(created.into())
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct CreateEmployeeInput {
    pub emp_name: Option<String>,
    pub emp_salary: Option<Decimal>,
    pub emp_rate: Option<i32>,
    pub emp_field: Option<String>,
}

impl From<CreateEmployeeInput> for EmployeeInput {
    fn from(value: CreateEmployeeInput) -> Self {
        EmployeeInput {
            emp_name: value.emp_name,
            emp_salary: value.emp_salary,
            emp_rate: value.emp_rate,
            emp_field: value.emp_field,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeNode {
    pub id: ID,
    pub employee_name: String,
    pub employee_salary: Decimal,
    pub employee_rate: i32,
    pub employee_field: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Employee> for EmployeeNode {
    fn from(model: Employee) -> Self {
        Self {
            id: ID(model.id.to_string()),
            employee_name: model.employee_name,
            employee_salary: model.employee_salary,
            employee_rate: model.employee_rate,
            employee_field: model.employee_field,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}
