use classroomd::db::{MemorySlots, SlotStore, SqliteSlots, DB_FILE};
use classroomd::model::{AttendanceStatus, Collection, Grade, Snippet};
use classroomd::seed::Seeds;
use classroomd::store::{decode_collection, encode_collection, ClassroomStore};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

/// Reads succeed with nothing stored; every write fails.
struct ReadOnlySlots;

impl SlotStore for ReadOnlySlots {
    fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn write(&mut self, key: &str, _value: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("quota exceeded writing {}", key))
    }

    fn mode(&self) -> &'static str {
        "read-only"
    }
}

/// Fails the first `failures` writes, then behaves like memory slots.
struct FlakySlots {
    failures: usize,
    inner: MemorySlots,
}

impl SlotStore for FlakySlots {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(anyhow::anyhow!("quota"));
        }
        self.inner.write(key, value)
    }

    fn mode(&self) -> &'static str {
        "flaky"
    }
}

#[test]
fn encode_then_decode_preserves_every_field() {
    let seeds = Seeds::sample();
    let raw = encode_collection(&seeds.snippets).expect("encode snippets");
    let back: Vec<Snippet> = decode_collection(&raw).expect("decode snippets");
    assert_eq!(back, seeds.snippets);

    let raw = encode_collection(&seeds.grades).expect("encode grades");
    assert!(raw.contains("\"studentId\":\"s1\""));
    assert!(raw.contains("\"assignmentId\":\"a1\""));
    let back: Vec<Grade> = decode_collection(&raw).expect("decode grades");
    assert_eq!(back, seeds.grades);
}

#[test]
fn older_records_without_optional_fields_still_load() {
    let slots = MemorySlots::new()
        .with_slot(
            "tcc_assignments",
            r#"[{"id":"x1","classId":"c1","title":"Old","maxPoints":10,"date":"2022-01-01"}]"#,
        )
        .with_slot(
            "tcc_snippets",
            r#"[{"id":"y1","title":"Old","language":"java","code":"x"}]"#,
        );
    let store = ClassroomStore::open(Box::new(slots), Seeds::sample());
    assert_eq!(store.assignments().len(), 1);
    assert!(!store.assignments()[0].completed);
    assert!(store.snippets()[0].tags.is_empty());
}

#[test]
fn sqlite_workspace_survives_reopen() {
    let workspace = temp_dir("classroomd-persist-reopen");

    let mut store = ClassroomStore::open(
        Box::new(SqliteSlots::open(&workspace).expect("open slots")),
        Seeds::sample(),
    );
    assert_eq!(store.persistence_mode(), "sqlite");
    let class_id = store
        .add_class("Robotics", "Period 6", "")
        .created_id()
        .expect("class id")
        .to_string();
    store.update_grade("s5", "a3", 15.0);
    store.update_attendance("2024-04-02", "c2", "s5", AttendanceStatus::Excused);
    store.delete_todo("t2");
    drop(store);

    assert!(workspace.join(DB_FILE).is_file());

    // Seeds are ignored for every slot that was written.
    let reopened = ClassroomStore::open(
        Box::new(SqliteSlots::open(&workspace).expect("reopen slots")),
        Seeds::empty(),
    );
    assert_eq!(reopened.classes().len(), 3);
    assert!(reopened.classes().iter().any(|c| c.id == class_id && c.schedule == "TBA"));
    assert!(reopened
        .grades()
        .iter()
        .any(|g| g.student_id == "s5" && g.assignment_id == "a3" && g.score == 15.0));
    assert_eq!(reopened.attendance().len(), 1);
    assert_eq!(reopened.attendance()[0].status, AttendanceStatus::Excused);
    assert_eq!(reopened.todos().len(), 2);
    // Never written, so the slot is missing and falls back to the (empty) seed.
    assert!(reopened.snippets().is_empty());

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn sqlite_slot_records_update_time() {
    let workspace = temp_dir("classroomd-persist-updated-at");
    let mut slots = SqliteSlots::open(&workspace).expect("open slots");
    assert_eq!(slots.updated_at("tcc_todos").expect("query"), None);
    slots.write("tcc_todos", "[]").expect("write slot");
    assert_eq!(slots.read("tcc_todos").expect("read"), Some("[]".to_string()));
    assert!(slots.updated_at("tcc_todos").expect("query").is_some());
    slots.write("tcc_todos", "[1]").expect("overwrite slot");
    assert_eq!(slots.read("tcc_todos").expect("read"), Some("[1]".to_string()));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn corrupt_slot_falls_back_to_its_seed_only() {
    let mut custom = Seeds::sample();
    custom.todos.truncate(1);
    let slots = MemorySlots::new()
        .with_slot("tcc_classes", "{not json")
        .with_slot("tcc_todos", &encode_collection(&custom.todos).expect("encode"))
        .with_slot("tcc_grades", r#"[{"studentId":"s1"}]"#);
    let store = ClassroomStore::open(Box::new(slots), Seeds::sample());

    assert_eq!(store.classes(), Seeds::sample().classes.as_slice());
    assert_eq!(store.grades(), Seeds::sample().grades.as_slice());
    assert_eq!(store.todos().len(), 1);
    assert_eq!(store.students().len(), 5);
}

#[test]
fn failed_writes_warn_but_keep_memory_state() {
    let mut store = ClassroomStore::open(Box::new(ReadOnlySlots), Seeds::empty());
    assert_eq!(store.persistence_warning(), None);

    let out = store.add_todo("Collect permission slips");
    assert!(out.applied());
    assert_eq!(store.todos().len(), 1);
    let warning = store.persistence_warning().expect("warning after failed write");
    assert!(warning.contains("todos"), "warning was {}", warning);

    store.update_grade("s1", "a1", 10.0);
    assert_eq!(store.grades().len(), 1);
    assert!(store.export_slot(Collection::Grades).expect("export").contains("\"score\":10"));
}

#[test]
fn reopen_swaps_backend_and_clears_warning() {
    let mut store = ClassroomStore::open(Box::new(ReadOnlySlots), Seeds::empty());
    store.add_todo("Lost on reopen");
    assert!(store.persistence_warning().is_some());

    store.reopen(Box::new(MemorySlots::new()), Seeds::sample());
    assert_eq!(store.persistence_warning(), None);
    assert_eq!(store.persistence_mode(), "memory");
    assert_eq!(store.todos().len(), 3);
}

#[test]
fn warning_clears_once_the_collection_saves_again() {
    let slots = FlakySlots {
        failures: 1,
        inner: MemorySlots::new(),
    };
    let mut store = ClassroomStore::open(Box::new(slots), Seeds::empty());

    store.add_todo("a");
    assert_eq!(
        store.persistence_warning(),
        Some("could not save todos: quota")
    );
    assert_eq!(store.unsaved_collections(), vec![Collection::Todos]);

    store.add_todo("b");
    assert_eq!(store.persistence_warning(), None);
    assert!(store.unsaved_collections().is_empty());
    assert_eq!(store.todos().len(), 2);
}

#[test]
fn warning_is_tracked_per_collection() {
    let slots = FlakySlots {
        failures: 1,
        inner: MemorySlots::new(),
    };
    let mut store = ClassroomStore::open(Box::new(slots), Seeds::empty());

    store.add_todo("lost write");
    // A good write elsewhere does not hide the unsaved todos.
    store.add_class("Art", "Period 7", "");
    assert_eq!(store.unsaved_collections(), vec![Collection::Todos]);
    assert!(store
        .persistence_warning()
        .is_some_and(|w| w.contains("todos")));
}
