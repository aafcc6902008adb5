pub mod connection;
pub mod repository;

pub use connection::init_quiz_db;
pub use repository::QuizRepository;
