use classroomd::calc::{student_average, student_series};
use classroomd::db::MemorySlots;
use classroomd::model::AttendanceStatus;
use classroomd::seed::Seeds;
use classroomd::store::{ClassroomStore, Outcome, Rejection};

fn sample_store() -> ClassroomStore {
    ClassroomStore::open(Box::new(MemorySlots::new()), Seeds::sample())
}

#[test]
fn delete_assignment_cascades_to_every_grade() {
    let mut store = sample_store();
    for id in ["a1", "a2", "a3"] {
        assert!(store.delete_assignment(id).applied());
        assert!(store.assignments().iter().all(|a| a.id != id));
        assert!(store.grades().iter().all(|g| g.assignment_id != id));
    }
    assert!(store.grades().is_empty());
}

#[test]
fn delete_assignment_leaves_other_grades() {
    let mut store = sample_store();
    assert_eq!(store.delete_assignment("a1"), Outcome::Removed(1));
    let left: Vec<(&str, &str)> = store
        .grades()
        .iter()
        .map(|g| (g.student_id.as_str(), g.assignment_id.as_str()))
        .collect();
    assert_eq!(left, vec![("s1", "a2"), ("s4", "a3")]);
}

#[test]
fn delete_class_does_not_cascade() {
    let mut store = sample_store();
    assert_eq!(store.delete_class("c1"), Outcome::Removed(1));
    assert!(store.classes().iter().all(|c| c.id != "c1"));
    assert_eq!(
        store.students().iter().filter(|s| s.class_id == "c1").count(),
        3
    );
    assert_eq!(
        store.assignments().iter().filter(|a| a.class_id == "c1").count(),
        2
    );
    assert_eq!(store.grades().len(), 5);
}

#[test]
fn delete_student_does_not_cascade() {
    let mut store = sample_store();
    store.update_attendance("2024-01-08", "c1", "s1", AttendanceStatus::Absent);
    assert_eq!(store.delete_student("s1"), Outcome::Removed(1));
    assert!(store.grades().iter().any(|g| g.student_id == "s1"));
    assert!(store.attendance().iter().any(|r| r.student_id == "s1"));
}

#[test]
fn dangling_references_read_as_absent() {
    let mut store = sample_store();
    store.delete_student("s1");
    let snap = store.snapshot();
    assert_eq!(student_average(&snap, "s1"), None);
    assert!(student_series(&snap, "s1").is_empty());

    store.delete_class("c2");
    let snap = store.snapshot();
    // Diana still points at c2 and still has her grade.
    assert!(student_average(&snap, "s4").is_some());
}

#[test]
fn deleting_unknown_ids_is_ignored() {
    let mut store = sample_store();
    let rejected = Outcome::Rejected(Rejection::NotFound);
    assert_eq!(store.delete_class("zz"), rejected);
    assert_eq!(store.delete_student("zz"), rejected);
    assert_eq!(store.delete_assignment("zz"), rejected);
    assert_eq!(store.delete_snippet("zz"), rejected);
    assert_eq!(store.delete_todo("zz"), rejected);
    assert_eq!(store.classes().len(), 2);
    assert_eq!(store.students().len(), 5);
    assert_eq!(store.assignments().len(), 3);
    assert_eq!(store.snippets().len(), 2);
    assert_eq!(store.todos().len(), 3);
}

#[test]
fn orphan_grades_are_cleaned_by_assignment_id() {
    let mut store = sample_store();
    store.update_grade("s2", "gone", 5.0);
    assert_eq!(store.delete_assignment("gone"), Outcome::Removed(0));
    assert!(store.grades().iter().all(|g| g.assignment_id != "gone"));
}
