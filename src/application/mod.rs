pub mod use_cases;

pub use use_cases::catalog::CatalogUseCase;
pub use use_cases::question_import::QuestionImportUseCase;
pub use use_cases::review_tracking::ReviewTrackingUseCase;
