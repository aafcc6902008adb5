mod incorrect;
mod question;
mod subject;

pub use incorrect::Incorrect;
pub use question::{Answer, Question, QuestionFilter, QuestionType};
pub use subject::Subject;
