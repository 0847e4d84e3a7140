use classroomd::backup::{self, BUNDLE_FORMAT_V1};
use classroomd::db::MemorySlots;
use classroomd::model::Collection;
use classroomd::seed::Seeds;
use classroomd::store::ClassroomStore;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::ZipWriter;

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

fn write_zip(path: &PathBuf, entries: &[(&str, &str)]) {
    let f = File::create(path).expect("create zip");
    let mut zip = ZipWriter::new(f);
    for (name, body) in entries {
        zip.start_file(*name, FileOptions::default()).expect("start entry");
        zip.write_all(body.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

#[test]
fn zip_export_and_import_roundtrip() {
    let out_dir = temp_dir("classroomd-backup-out");
    let bundle_path = out_dir.join("classroom.backup.zip");

    let mut src = ClassroomStore::open(Box::new(MemorySlots::new()), Seeds::sample());
    src.add_todo("Photocopy rubrics");
    src.update_grade("s5", "a3", 11.0);

    let export = backup::export_bundle(&src, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, BUNDLE_FORMAT_V1);
    assert_eq!(export.entry_count, 8);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(BUNDLE_FORMAT_V1));
    archive
        .by_name("slots/tcc_grades.json")
        .expect("grades entry in bundle");

    let mut dst = ClassroomStore::open(Box::new(MemorySlots::new()), Seeds::empty());
    let import = backup::import_bundle(&mut dst, &bundle_path).expect("import bundle");
    assert_eq!(import.bundle_format_detected, BUNDLE_FORMAT_V1);
    assert_eq!(import.collections, Collection::ALL.to_vec());

    assert_eq!(dst.classes(), src.classes());
    assert_eq!(dst.students(), src.students());
    assert_eq!(dst.grades(), src.grades());
    assert_eq!(dst.todos(), src.todos());
    assert_eq!(dst.snippets(), src.snippets());

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn tampered_entry_is_refused_and_nothing_applies() {
    let out_dir = temp_dir("classroomd-backup-tampered");
    let good = out_dir.join("good.zip");
    let bad = out_dir.join("bad.zip");

    let src = ClassroomStore::open(Box::new(MemorySlots::new()), Seeds::sample());
    backup::export_bundle(&src, &good).expect("export bundle");

    let mut archive = zip::ZipArchive::new(File::open(&good).expect("open")).expect("zip");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    let classes = src.export_slot(Collection::Classes).expect("export classes");
    let forged = classes.replace("Intro to Python", "Intro to Rust");
    write_zip(
        &bad,
        &[
            ("manifest.json", manifest.as_str()),
            ("slots/tcc_classes.json", forged.as_str()),
        ],
    );

    let mut dst = ClassroomStore::open(Box::new(MemorySlots::new()), Seeds::empty());
    let err = backup::import_bundle(&mut dst, &bad).expect_err("checksum mismatch");
    assert!(format!("{err:#}").contains("checksum mismatch"));
    assert!(dst.classes().is_empty());

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn unknown_bundle_format_is_refused() {
    let out_dir = temp_dir("classroomd-backup-format");
    let path = out_dir.join("other.zip");
    write_zip(
        &path,
        &[("manifest.json", r#"{"format":"something-else","entries":{}}"#)],
    );
    let err = backup::read_bundle(&path).expect_err("unsupported format");
    assert!(format!("{err:#}").contains("unsupported bundle format"));

    let not_zip = out_dir.join("plain.txt");
    std::fs::write(&not_zip, b"not a zip").expect("write file");
    assert!(backup::read_bundle(&not_zip).is_err());

    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn partial_bundle_restores_only_listed_collections() {
    let out_dir = temp_dir("classroomd-backup-partial");
    let path = out_dir.join("todos-only.zip");

    let todos = r#"[{"id":"t9","text":"Only this","completed":false}]"#;
    let sum = {
        use sha2::{Digest, Sha256};
        format!("{:x}", Sha256::digest(todos.as_bytes()))
    };
    let manifest = format!(
        r#"{{"format":"{}","entries":{{"slots/tcc_todos.json":"{}"}}}}"#,
        BUNDLE_FORMAT_V1, sum
    );
    write_zip(
        &path,
        &[
            ("manifest.json", manifest.as_str()),
            ("slots/tcc_todos.json", todos),
        ],
    );

    let mut dst = ClassroomStore::open(Box::new(MemorySlots::new()), Seeds::sample());
    let import = backup::import_bundle(&mut dst, &path).expect("import bundle");
    assert_eq!(import.collections, vec![Collection::Todos]);
    assert_eq!(dst.todos().len(), 1);
    assert_eq!(dst.todos()[0].id, "t9");
    assert_eq!(dst.classes().len(), 2);

    let _ = std::fs::remove_dir_all(out_dir);
}
