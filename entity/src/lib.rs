//! sea-orm entities for the employee records service.

pub mod employees;

pub mod prelude {
    pub use crate::employees::Entity as Employees;
}
