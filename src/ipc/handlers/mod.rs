pub mod analytics;
pub mod assignments;
pub mod attendance;
pub mod backup;
pub mod classes;
pub mod core;
pub mod feedback;
pub mod grades;
pub mod snippets;
pub mod students;
pub mod todos;
