pub mod app_error;
pub mod provision_error;

pub use app_error::{AppError, AppResult};
pub use provision_error::{ProvisionError, ProvisionResult};
