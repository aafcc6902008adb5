pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CatalogUseCase, QuestionImportUseCase, ReviewTrackingUseCase};
pub use domain::error::{AppError, Result};
