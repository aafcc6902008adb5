pub mod catalog;
pub mod question_import;
pub mod review_tracking;
