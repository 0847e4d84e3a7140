use crate::model::{Assignment, AttendanceRecord, ClassGroup, Grade, Snippet, Student, Todo};

/// Per-collection defaults installed when a slot is missing or unreadable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Seeds {
    pub classes: Vec<ClassGroup>,
    pub students: Vec<Student>,
    pub assignments: Vec<Assignment>,
    pub grades: Vec<Grade>,
    pub attendance: Vec<AttendanceRecord>,
    pub snippets: Vec<Snippet>,
    pub todos: Vec<Todo>,
}

impl Seeds {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The sample roster a fresh install starts with.
    pub fn sample() -> Self {
        Self {
            classes: vec![
                class("c1", "AP Computer Science A", "Period 1", "08:00 AM"),
                class("c2", "Intro to Python", "Period 3", "10:30 AM"),
            ],
            students: vec![
                student("s1", "Alice Chen", "alice@school.edu", "c1"),
                student("s2", "Bob Smith", "bob@school.edu", "c1"),
                student("s3", "Charlie Davis", "charlie@school.edu", "c1"),
                student("s4", "Diana Prince", "diana@school.edu", "c2"),
                student("s5", "Evan Wright", "evan@school.edu", "c2"),
            ],
            assignments: vec![
                assignment("a1", "c1", "Unit 1: Java Basics", 100.0, "2023-09-15", true),
                assignment("a2", "c1", "Unit 2: Objects", 50.0, "2023-10-01", false),
                assignment("a3", "c2", "Python Loops", 20.0, "2023-09-20", true),
            ],
            grades: vec![
                grade("s1", "a1", 95.0),
                grade("s1", "a2", 48.0),
                grade("s2", "a1", 82.0),
                grade("s3", "a1", 70.0),
                grade("s4", "a3", 18.0),
            ],
            attendance: Vec::new(),
            snippets: vec![
                Snippet {
                    id: "sn1".into(),
                    title: "Java Main Method".into(),
                    language: "java".into(),
                    code: "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello world!\");\n    }\n}".into(),
                    tags: vec!["boilerplate".into()],
                },
                Snippet {
                    id: "sn2".into(),
                    title: "Python File Read".into(),
                    language: "python".into(),
                    code: "with open(\"file.txt\", \"r\") as f:\n    content = f.read()\n    print(content)".into(),
                    tags: vec!["io".into()],
                },
            ],
            todos: vec![
                todo("t1", "Grade AP CSA Unit 2 Exams", false),
                todo("t2", "Email parents about field trip", true),
                todo("t3", "Update Python syllabus", false),
            ],
        }
    }
}

fn class(id: &str, name: &str, section: &str, schedule: &str) -> ClassGroup {
    ClassGroup {
        id: id.into(),
        name: name.into(),
        section: section.into(),
        schedule: schedule.into(),
    }
}

fn student(id: &str, name: &str, email: &str, class_id: &str) -> Student {
    Student {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        class_id: class_id.into(),
    }
}

fn assignment(
    id: &str,
    class_id: &str,
    title: &str,
    max_points: f64,
    date: &str,
    completed: bool,
) -> Assignment {
    Assignment {
        id: id.into(),
        class_id: class_id.into(),
        title: title.into(),
        max_points,
        date: date.into(),
        completed,
    }
}

fn grade(student_id: &str, assignment_id: &str, score: f64) -> Grade {
    Grade {
        student_id: student_id.into(),
        assignment_id: assignment_id.into(),
        score,
    }
}

fn todo(id: &str, text: &str, completed: bool) -> Todo {
    Todo {
        id: id.into(),
        text: text.into(),
        completed,
    }
}
