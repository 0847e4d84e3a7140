use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::db::SlotStore;
use crate::model::{
    AppView, Assignment, AttendanceRecord, AttendanceStatus, ClassGroup, Collection, Grade,
    Snippet, Student, Todo,
};
use crate::seed::Seeds;

/// Result of a store command. Commands never fail; they either apply or are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(String),
    /// New record keyed by its references rather than an id of its own (grades).
    Inserted,
    Updated,
    Removed(usize),
    Rejected(Rejection),
}

impl Outcome {
    pub fn applied(&self) -> bool {
        !matches!(self, Outcome::Rejected(_))
    }

    pub fn created_id(&self) -> Option<&str> {
        match self {
            Outcome::Created(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingField(&'static str),
    InvalidNumber(&'static str),
    NotFound,
}

impl Rejection {
    pub fn reason(&self) -> String {
        match self {
            Rejection::MissingField(f) => format!("missing {}", f),
            Rejection::InvalidNumber(f) => format!("{} must be a number", f),
            Rejection::NotFound => "no matching record".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Changed(Collection),
    ViewSelected(AppView),
    Reloaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&StoreEvent)>;

/// Borrowed, read-only view of every collection at one instant.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub classes: &'a [ClassGroup],
    pub students: &'a [Student],
    pub assignments: &'a [Assignment],
    pub grades: &'a [Grade],
    pub attendance: &'a [AttendanceRecord],
    pub snippets: &'a [Snippet],
    pub todos: &'a [Todo],
}

impl<'a> Snapshot<'a> {
    pub fn class(&self, id: &str) -> Option<&'a ClassGroup> {
        self.classes.iter().find(|c| c.id == id)
    }

    pub fn student(&self, id: &str) -> Option<&'a Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn assignment(&self, id: &str) -> Option<&'a Assignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    pub fn grade(&self, student_id: &str, assignment_id: &str) -> Option<&'a Grade> {
        self.grades
            .iter()
            .find(|g| g.student_id == student_id && g.assignment_id == assignment_id)
    }

    pub fn students_in_class<'b>(
        &self,
        class_id: &'b str,
    ) -> impl Iterator<Item = &'a Student> + 'b
    where
        'a: 'b,
    {
        self.students.iter().filter(move |s| s.class_id == class_id)
    }

    pub fn assignments_in_class<'b>(
        &self,
        class_id: &'b str,
    ) -> impl Iterator<Item = &'a Assignment> + 'b
    where
        'a: 'b,
    {
        self.assignments.iter().filter(move |a| a.class_id == class_id)
    }
}

/// Replacement collections read from a backup bundle. `None` leaves a collection untouched.
#[derive(Debug, Default, Clone)]
pub struct Restore {
    pub classes: Option<Vec<ClassGroup>>,
    pub students: Option<Vec<Student>>,
    pub assignments: Option<Vec<Assignment>>,
    pub grades: Option<Vec<Grade>>,
    pub attendance: Option<Vec<AttendanceRecord>>,
    pub snippets: Option<Vec<Snippet>>,
    pub todos: Option<Vec<Todo>>,
}

pub struct ClassroomStore {
    classes: Vec<ClassGroup>,
    students: Vec<Student>,
    assignments: Vec<Assignment>,
    grades: Vec<Grade>,
    attendance: Vec<AttendanceRecord>,
    snippets: Vec<Snippet>,
    todos: Vec<Todo>,
    view: AppView,
    slots: Box<dyn SlotStore>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    /// Last failed write per collection; cleared by that collection's next good write.
    write_failures: BTreeMap<Collection, String>,
}

pub fn encode_collection<T: Serialize>(items: &[T]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}

pub fn decode_collection<T: DeserializeOwned>(raw: &str) -> serde_json::Result<Vec<T>> {
    serde_json::from_str(raw)
}

fn load_slot<T: DeserializeOwned>(slots: &dyn SlotStore, c: Collection, seed: Vec<T>) -> Vec<T> {
    let key = c.slot_key();
    match slots.read(key) {
        Ok(Some(raw)) => match decode_collection(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key, error = %e, "slot unparseable, using seed");
                seed
            }
        },
        Ok(None) => seed,
        Err(e) => {
            tracing::warn!(key, error = %e, "slot unreadable, using seed");
            seed
        }
    }
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

fn required(raw: &str, field: &'static str) -> Result<String, Rejection> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(Rejection::MissingField(field));
    }
    Ok(t.to_string())
}

fn finite(v: f64, field: &'static str) -> Result<f64, Rejection> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(Rejection::InvalidNumber(field))
    }
}

/// Parses user-entered numeric text. Empty or non-numeric text yields `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Today's UTC calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

impl ClassroomStore {
    /// Loads every collection from its slot, falling back to `seeds` per slot.
    pub fn open(slots: Box<dyn SlotStore>, seeds: Seeds) -> Self {
        let mut store = Self {
            classes: Vec::new(),
            students: Vec::new(),
            assignments: Vec::new(),
            grades: Vec::new(),
            attendance: Vec::new(),
            snippets: Vec::new(),
            todos: Vec::new(),
            view: AppView::default(),
            slots,
            observers: Vec::new(),
            next_subscription: 1,
            write_failures: BTreeMap::new(),
        };
        store.load(seeds);
        store
    }

    fn load(&mut self, seeds: Seeds) {
        let slots = self.slots.as_ref();
        self.classes = load_slot(slots, Collection::Classes, seeds.classes);
        self.students = load_slot(slots, Collection::Students, seeds.students);
        self.assignments = load_slot(slots, Collection::Assignments, seeds.assignments);
        self.grades = load_slot(slots, Collection::Grades, seeds.grades);
        self.attendance = load_slot(slots, Collection::Attendance, seeds.attendance);
        self.snippets = load_slot(slots, Collection::Snippets, seeds.snippets);
        self.todos = load_slot(slots, Collection::Todos, seeds.todos);
        tracing::info!(
            mode = self.slots.mode(),
            classes = self.classes.len(),
            students = self.students.len(),
            assignments = self.assignments.len(),
            grades = self.grades.len(),
            "store loaded"
        );
    }

    /// Swaps the slot backend and reloads. Observers stay registered.
    pub fn reopen(&mut self, slots: Box<dyn SlotStore>, seeds: Seeds) {
        self.slots = slots;
        self.write_failures.clear();
        self.load(seeds);
        self.notify(StoreEvent::Reloaded);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            classes: &self.classes,
            students: &self.students,
            assignments: &self.assignments,
            grades: &self.grades,
            attendance: &self.attendance,
            snippets: &self.snippets,
            todos: &self.todos,
        }
    }

    pub fn classes(&self) -> &[ClassGroup] {
        &self.classes
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn persistence_mode(&self) -> &'static str {
        self.slots.mode()
    }

    /// A collection whose latest slot write failed, if any. Non-fatal: in-memory state is still current.
    pub fn persistence_warning(&self) -> Option<&str> {
        self.write_failures.values().next().map(String::as_str)
    }

    pub fn unsaved_collections(&self) -> Vec<Collection> {
        self.write_failures.keys().copied().collect()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    fn encoded(&self, c: Collection) -> serde_json::Result<String> {
        match c {
            Collection::Classes => encode_collection(&self.classes),
            Collection::Students => encode_collection(&self.students),
            Collection::Assignments => encode_collection(&self.assignments),
            Collection::Grades => encode_collection(&self.grades),
            Collection::Attendance => encode_collection(&self.attendance),
            Collection::Snippets => encode_collection(&self.snippets),
            Collection::Todos => encode_collection(&self.todos),
        }
    }

    /// Serialized form of one collection, as written to its slot.
    pub fn export_slot(&self, c: Collection) -> anyhow::Result<String> {
        Ok(self.encoded(c)?)
    }

    /// Writes the whole collection to its slot, then notifies observers.
    fn commit(&mut self, c: Collection) {
        let key = c.slot_key();
        let write = self
            .encoded(c)
            .map_err(anyhow::Error::from)
            .and_then(|raw| self.slots.write(key, &raw));
        match write {
            Ok(()) => {
                if self.write_failures.remove(&c).is_some() {
                    tracing::info!(key, "slot write recovered");
                }
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "slot write failed; continuing in memory");
                self.write_failures
                    .insert(c, format!("could not save {}: {}", c.name(), e));
            }
        }
        self.notify(StoreEvent::Changed(c));
    }

    pub fn select_view(&mut self, view: AppView) {
        self.view = view;
        self.notify(StoreEvent::ViewSelected(view));
    }

    pub fn add_class(&mut self, name: &str, section: &str, schedule: &str) -> Outcome {
        let (name, section) = match (required(name, "name"), required(section, "section")) {
            (Ok(n), Ok(s)) => (n, s),
            (Err(r), _) | (_, Err(r)) => return Outcome::Rejected(r),
        };
        let schedule = match schedule.trim() {
            "" => "TBA".to_string(),
            s => s.to_string(),
        };
        let id = fresh_id();
        self.classes.push(ClassGroup {
            id: id.clone(),
            name,
            section,
            schedule,
        });
        tracing::debug!(class_id = %id, "class added");
        self.commit(Collection::Classes);
        Outcome::Created(id)
    }

    /// Students, assignments and attendance of the class are left in place.
    pub fn delete_class(&mut self, id: &str) -> Outcome {
        let removed = remove_where(&mut self.classes, |c| c.id == id);
        if removed == 0 {
            return Outcome::Rejected(Rejection::NotFound);
        }
        tracing::debug!(class_id = id, "class deleted");
        self.commit(Collection::Classes);
        Outcome::Removed(removed)
    }

    pub fn add_student(&mut self, name: &str, email: &str, class_id: &str) -> Outcome {
        let name = match required(name, "name") {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        let email = match email.trim() {
            "" => "no-email".to_string(),
            e => e.to_string(),
        };
        let id = fresh_id();
        self.students.push(Student {
            id: id.clone(),
            name,
            email,
            class_id: class_id.to_string(),
        });
        tracing::debug!(student_id = %id, class_id, "student added");
        self.commit(Collection::Students);
        Outcome::Created(id)
    }

    /// Grades and attendance for the student are left in place.
    pub fn delete_student(&mut self, id: &str) -> Outcome {
        let removed = remove_where(&mut self.students, |s| s.id == id);
        if removed == 0 {
            return Outcome::Rejected(Rejection::NotFound);
        }
        tracing::debug!(student_id = id, "student deleted");
        self.commit(Collection::Students);
        Outcome::Removed(removed)
    }

    pub fn add_assignment(
        &mut self,
        class_id: &str,
        title: &str,
        max_points: f64,
        date: &str,
    ) -> Outcome {
        let title = match required(title, "title") {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        let max_points = match finite(max_points, "maxPoints") {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        let date = match date.trim() {
            "" => today(),
            d => d.to_string(),
        };
        let id = fresh_id();
        self.assignments.push(Assignment {
            id: id.clone(),
            class_id: class_id.to_string(),
            title,
            max_points,
            date,
            completed: false,
        });
        tracing::debug!(assignment_id = %id, class_id, "assignment added");
        self.commit(Collection::Assignments);
        Outcome::Created(id)
    }

    /// Replaces the assignment with the same id, completed flag included.
    pub fn update_assignment(&mut self, updated: Assignment) -> Outcome {
        if let Err(r) = finite(updated.max_points, "maxPoints") {
            return Outcome::Rejected(r);
        }
        let Some(slot) = self.assignments.iter_mut().find(|a| a.id == updated.id) else {
            return Outcome::Rejected(Rejection::NotFound);
        };
        *slot = updated;
        self.commit(Collection::Assignments);
        Outcome::Updated
    }

    /// Removes the assignment and every grade recorded against it.
    pub fn delete_assignment(&mut self, id: &str) -> Outcome {
        let removed = remove_where(&mut self.assignments, |a| a.id == id);
        let cascaded = remove_where(&mut self.grades, |g| g.assignment_id == id);
        if removed == 0 && cascaded == 0 {
            return Outcome::Rejected(Rejection::NotFound);
        }
        tracing::debug!(assignment_id = id, grades_removed = cascaded, "assignment deleted");
        if removed > 0 {
            self.commit(Collection::Assignments);
        }
        if cascaded > 0 {
            self.commit(Collection::Grades);
        }
        Outcome::Removed(removed)
    }

    /// Upsert keyed on `(student_id, assignment_id)`. Scores above max points are kept.
    pub fn update_grade(&mut self, student_id: &str, assignment_id: &str, score: f64) -> Outcome {
        let score = match finite(score, "score") {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        let outcome = match self
            .grades
            .iter_mut()
            .find(|g| g.student_id == student_id && g.assignment_id == assignment_id)
        {
            Some(existing) => {
                existing.score = score;
                Outcome::Updated
            }
            None => {
                self.grades.push(Grade {
                    student_id: student_id.to_string(),
                    assignment_id: assignment_id.to_string(),
                    score,
                });
                Outcome::Inserted
            }
        };
        self.commit(Collection::Grades);
        outcome
    }

    /// Grade entry from a text field; non-numeric text is rejected without writing.
    pub fn update_grade_text(
        &mut self,
        student_id: &str,
        assignment_id: &str,
        raw: &str,
    ) -> Outcome {
        match parse_number(raw) {
            Some(score) => self.update_grade(student_id, assignment_id, score),
            None => Outcome::Rejected(Rejection::InvalidNumber("score")),
        }
    }

    /// Upsert keyed on `(date, class_id, student_id)`; an existing record keeps its id.
    pub fn update_attendance(
        &mut self,
        date: &str,
        class_id: &str,
        student_id: &str,
        status: AttendanceStatus,
    ) -> Outcome {
        let date = match required(date, "date") {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        let outcome = match self.attendance.iter_mut().find(|r| {
            r.date == date && r.class_id == class_id && r.student_id == student_id
        }) {
            Some(existing) => {
                existing.status = status;
                Outcome::Updated
            }
            None => {
                let id = fresh_id();
                self.attendance.push(AttendanceRecord {
                    id: id.clone(),
                    date,
                    class_id: class_id.to_string(),
                    student_id: student_id.to_string(),
                    status,
                });
                Outcome::Created(id)
            }
        };
        self.commit(Collection::Attendance);
        outcome
    }

    pub fn add_snippet(
        &mut self,
        title: &str,
        language: &str,
        code: &str,
        tags: &[String],
    ) -> Outcome {
        let title = match required(title, "title") {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        if code.trim().is_empty() {
            return Outcome::Rejected(Rejection::MissingField("code"));
        }
        let id = fresh_id();
        self.snippets.push(Snippet {
            id: id.clone(),
            title,
            language: language.trim().to_string(),
            code: code.to_string(),
            tags: tags
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        });
        self.commit(Collection::Snippets);
        Outcome::Created(id)
    }

    pub fn delete_snippet(&mut self, id: &str) -> Outcome {
        let removed = remove_where(&mut self.snippets, |s| s.id == id);
        if removed == 0 {
            return Outcome::Rejected(Rejection::NotFound);
        }
        self.commit(Collection::Snippets);
        Outcome::Removed(removed)
    }

    pub fn add_todo(&mut self, text: &str) -> Outcome {
        let text = match required(text, "text") {
            Ok(v) => v,
            Err(r) => return Outcome::Rejected(r),
        };
        let id = fresh_id();
        self.todos.push(Todo {
            id: id.clone(),
            text,
            completed: false,
        });
        self.commit(Collection::Todos);
        Outcome::Created(id)
    }

    pub fn toggle_todo(&mut self, id: &str) -> Outcome {
        let Some(todo) = self.todos.iter_mut().find(|t| t.id == id) else {
            return Outcome::Rejected(Rejection::NotFound);
        };
        todo.completed = !todo.completed;
        self.commit(Collection::Todos);
        Outcome::Updated
    }

    pub fn delete_todo(&mut self, id: &str) -> Outcome {
        let removed = remove_where(&mut self.todos, |t| t.id == id);
        if removed == 0 {
            return Outcome::Rejected(Rejection::NotFound);
        }
        self.commit(Collection::Todos);
        Outcome::Removed(removed)
    }

    /// Replaces the collections present in `restore` and persists each of them.
    pub fn restore(&mut self, restore: Restore) -> Vec<Collection> {
        let mut touched = Vec::new();
        if let Some(v) = restore.classes {
            self.classes = v;
            touched.push(Collection::Classes);
        }
        if let Some(v) = restore.students {
            self.students = v;
            touched.push(Collection::Students);
        }
        if let Some(v) = restore.assignments {
            self.assignments = v;
            touched.push(Collection::Assignments);
        }
        if let Some(v) = restore.grades {
            self.grades = v;
            touched.push(Collection::Grades);
        }
        if let Some(v) = restore.attendance {
            self.attendance = v;
            touched.push(Collection::Attendance);
        }
        if let Some(v) = restore.snippets {
            self.snippets = v;
            touched.push(Collection::Snippets);
        }
        if let Some(v) = restore.todos {
            self.todos = v;
            touched.push(Collection::Todos);
        }
        for c in &touched {
            self.commit(*c);
        }
        touched
    }
}

fn remove_where<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(|it| !pred(it));
    before - items.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_is_the_utc_date() {
        let before = chrono::Utc::now().date_naive().to_string();
        let t = today();
        let after = chrono::Utc::now().date_naive().to_string();
        assert!(t == before || t == after, "today() was {}", t);
    }

    #[test]
    fn parse_number_rejects_blank_and_non_finite() {
        assert_eq!(parse_number(" 7.5 "), Some(7.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12abc"), None);
    }
}
