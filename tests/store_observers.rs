use classroomd::db::MemorySlots;
use classroomd::model::{AppView, Collection};
use classroomd::seed::Seeds;
use classroomd::store::{ClassroomStore, StoreEvent};
use std::cell::RefCell;
use std::rc::Rc;

fn recording_store(seeds: Seeds) -> (ClassroomStore, Rc<RefCell<Vec<StoreEvent>>>) {
    let mut store = ClassroomStore::open(Box::new(MemorySlots::new()), seeds);
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe(move |e| sink.borrow_mut().push(*e));
    (store, events)
}

#[test]
fn each_applied_mutation_notifies_once() {
    let (mut store, events) = recording_store(Seeds::empty());
    store.add_class("Chemistry", "Period 4", "");
    store.add_todo("Order beakers");
    store.update_grade("s1", "a1", 9.0);
    assert_eq!(
        *events.borrow(),
        vec![
            StoreEvent::Changed(Collection::Classes),
            StoreEvent::Changed(Collection::Todos),
            StoreEvent::Changed(Collection::Grades),
        ]
    );
}

#[test]
fn rejected_mutations_do_not_notify() {
    let (mut store, events) = recording_store(Seeds::sample());
    store.add_class("", "Period 4", "");
    store.delete_student("nobody");
    store.update_grade_text("s1", "a1", "eleven");
    store.toggle_todo("nope");
    assert!(events.borrow().is_empty());
}

#[test]
fn assignment_delete_reports_both_collections() {
    let (mut store, events) = recording_store(Seeds::sample());
    store.delete_assignment("a1");
    assert_eq!(
        *events.borrow(),
        vec![
            StoreEvent::Changed(Collection::Assignments),
            StoreEvent::Changed(Collection::Grades),
        ]
    );
}

#[test]
fn view_selection_and_reload_are_announced() {
    let (mut store, events) = recording_store(Seeds::sample());
    assert_eq!(store.view(), AppView::Dashboard);
    store.select_view(AppView::Gradebook);
    assert_eq!(store.view(), AppView::Gradebook);
    store.reopen(Box::new(MemorySlots::new()), Seeds::empty());
    assert_eq!(
        *events.borrow(),
        vec![
            StoreEvent::ViewSelected(AppView::Gradebook),
            StoreEvent::Reloaded,
        ]
    );
}

#[test]
fn unsubscribed_observer_stops_hearing() {
    let mut store = ClassroomStore::open(Box::new(MemorySlots::new()), Seeds::empty());
    let first = Rc::new(RefCell::new(0usize));
    let second = Rc::new(RefCell::new(0usize));
    let a = Rc::clone(&first);
    let b = Rc::clone(&second);
    let id_a = store.subscribe(move |_| *a.borrow_mut() += 1);
    let id_b = store.subscribe(move |_| *b.borrow_mut() += 1);
    assert_ne!(id_a, id_b);

    store.add_todo("One");
    assert!(store.unsubscribe(id_a));
    assert!(!store.unsubscribe(id_a));
    store.add_todo("Two");

    assert_eq!(*first.borrow(), 1);
    assert_eq!(*second.borrow(), 2);
}
