//! Integration tests for nested archive discovery
//!
//! Builds real zip archives on disk and checks the shape of the resulting
//! search path.

use std::io::{Cursor, Write};
use std::path::Path;

use nestload_archive::{
    ArchiveError, ArchiveSuffixes, BuildError, DiscoveryOptions, EntryOrigin, FailurePolicy,
    SearchPathBuilder, TempArena,
};
use zip::write::SimpleFileOptions;

fn zip_bytes(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), SimpleFileOptions::default())
                .unwrap();
        } else {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

fn write_archive(path: &Path, entries: &[(&str, Vec<u8>)]) {
    std::fs::write(path, zip_bytes(entries)).unwrap();
}

/// An archive nested `depth` levels deep, each level holding one unit.
fn nested_chain(depth: usize) -> Vec<u8> {
    let leaf = format!("units/Level{}.unit", depth);
    let mut current = zip_bytes(&[(leaf.as_str(), b"leaf".to_vec())]);
    for level in (1..depth).rev() {
        let unit = format!("units/Level{}.unit", level);
        let child = format!("lib/level{}.jar", level + 1);
        current = zip_bytes(&[
            (unit.as_str(), b"unit".to_vec()),
            (child.as_str(), current),
        ]);
    }
    current
}

#[test]
fn test_root_only() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app.jar");
    write_archive(&root, &[("com/example/Main.unit", b"main".to_vec())]);

    let options = DiscoveryOptions::default();
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&options, &mut arena).build(&root).unwrap();

    assert_eq!(path.len(), 1);
    assert!(path.entries()[0].is_root());
    assert_eq!(path.entries()[0].location(), root.as_path());
    assert!(path.failures().is_empty());
    assert!(arena.is_empty());
}

#[test]
fn test_discovery_completeness() {
    for depth in 1..=4 {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app.jar");
        write_archive(
            &root,
            &[
                ("units/Root.unit", b"root".to_vec()),
                ("lib/level1.jar", nested_chain(depth)),
            ],
        );

        let options = DiscoveryOptions::default();
        let mut arena = TempArena::in_dir(dir.path());
        let path = SearchPathBuilder::new(&options, &mut arena).build(&root).unwrap();

        assert_eq!(path.len(), depth + 1, "depth {}", depth);
        assert_eq!(arena.len(), depth);
        for (i, entry) in path.iter().enumerate() {
            assert_eq!(entry.index(), i);
            if i > 0 {
                assert_eq!(
                    entry.origin(),
                    &EntryOrigin::Nested {
                        parent: i - 1,
                        entry: format!("lib/level{}.jar", i),
                    }
                );
            }
        }
    }
}

#[test]
fn test_depth_first_pre_order() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app.war");

    let b = zip_bytes(&[("B.unit", b"b".to_vec())]);
    let a = zip_bytes(&[("A.unit", b"a".to_vec()), ("deep/b.jar", b)]);
    let c = zip_bytes(&[("C.unit", b"c".to_vec())]);
    write_archive(&root, &[("lib/a.jar", a), ("lib/c.jar", c)]);

    let options = DiscoveryOptions::default();
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&options, &mut arena).build(&root).unwrap();

    let origins: Vec<_> = path.iter().map(|e| e.origin().clone()).collect();
    assert_eq!(
        origins,
        vec![
            EntryOrigin::Root,
            EntryOrigin::Nested { parent: 0, entry: "lib/a.jar".into() },
            EntryOrigin::Nested { parent: 1, entry: "deep/b.jar".into() },
            EntryOrigin::Nested { parent: 0, entry: "lib/c.jar".into() },
        ]
    );

    let names: Vec<String> = path
        .locations()
        .iter()
        .skip(1)
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names[0].starts_with("lib_a.") && names[0].ends_with(".jar"));
    assert!(names[1].starts_with("deep_b.") && names[1].ends_with(".jar"));
    assert!(names[2].starts_with("lib_c.") && names[2].ends_with(".jar"));
}

#[test]
fn test_directories_and_resources_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app.jar");
    write_archive(
        &root,
        &[
            ("folder.jar/", Vec::new()),
            ("notes.txt", b"hello".to_vec()),
            ("Main.unit", b"main".to_vec()),
        ],
    );

    let options = DiscoveryOptions::default();
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&options, &mut arena).build(&root).unwrap();

    assert_eq!(path.len(), 1);
    assert!(arena.is_empty());
}

#[test]
fn test_suffix_case_and_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("Bundle.JAR");
    let ear_root = dir.path().join("bundle.ear");
    let inner = zip_bytes(&[("X.unit", b"x".to_vec())]);
    let entries = [("LIB/UPPER.JAR", inner.clone()), ("lib/extra.ear", inner)];
    write_archive(&root, &entries);
    write_archive(&ear_root, &entries);

    let default_options = DiscoveryOptions::default();
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&default_options, &mut arena)
        .build(&root)
        .unwrap();
    assert_eq!(path.len(), 2);

    let ear_options = DiscoveryOptions {
        suffixes: ArchiveSuffixes::new(["ear"]),
        policy: FailurePolicy::BestEffort,
    };
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&ear_options, &mut arena)
        .build(&ear_root)
        .unwrap();
    assert_eq!(path.len(), 2);
    assert_eq!(
        path.entries()[1].origin(),
        &EntryOrigin::Nested { parent: 0, entry: "lib/extra.ear".into() }
    );
}

#[test]
fn test_corrupted_nested_archive_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app.jar");
    let valid = zip_bytes(&[("Y.unit", b"y".to_vec())]);
    write_archive(
        &root,
        &[
            ("lib/broken.jar", b"definitely not a zip".to_vec()),
            ("lib/valid.jar", valid),
        ],
    );

    let options = DiscoveryOptions::default();
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&options, &mut arena).build(&root).unwrap();

    assert_eq!(path.len(), 2);
    assert_eq!(
        path.entries()[1].origin(),
        &EntryOrigin::Nested { parent: 0, entry: "lib/valid.jar".into() }
    );

    assert_eq!(path.failures().len(), 1);
    let failure = &path.failures()[0];
    assert_eq!(failure.entry, "lib/broken.jar");
    assert_eq!(failure.archive, root);
    assert!(matches!(failure.cause, ArchiveError::Open { .. }));

    // The broken extraction is still owned by the arena.
    assert_eq!(arena.len(), 2);
}

#[test]
fn test_strict_policy_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app.jar");
    write_archive(
        &root,
        &[
            ("lib/broken.jar", b"garbage".to_vec()),
            ("lib/valid.jar", zip_bytes(&[("Y.unit", b"y".to_vec())])),
        ],
    );

    let options = DiscoveryOptions {
        policy: FailurePolicy::Strict,
        ..DiscoveryOptions::default()
    };
    let mut arena = TempArena::in_dir(dir.path());
    let err = SearchPathBuilder::new(&options, &mut arena)
        .build(&root)
        .unwrap_err();

    match err {
        BuildError::Extraction(failure) => assert_eq!(failure.entry, "lib/broken.jar"),
        other => panic!("expected extraction failure, got {:?}", other),
    }
}

#[test]
fn test_unreadable_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app.jar");
    std::fs::write(&root, b"not an archive").unwrap();

    let options = DiscoveryOptions::default();
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&options, &mut arena)
        .build(&root)
        .unwrap();
    assert!(path.is_empty());
    assert!(matches!(path.root_error(), Some(ArchiveError::Open { .. })));

    let strict = DiscoveryOptions {
        policy: FailurePolicy::Strict,
        ..DiscoveryOptions::default()
    };
    let err = SearchPathBuilder::new(&strict, &mut arena)
        .build(&root)
        .unwrap_err();
    assert!(matches!(err, BuildError::Root(ArchiveError::Open { .. })));
}

#[test]
fn test_arena_drop_cleans_extractions() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("app.jar");
    write_archive(&root, &[("lib/level1.jar", nested_chain(2))]);

    let options = DiscoveryOptions::default();
    let mut arena = TempArena::in_dir(dir.path());
    let path = SearchPathBuilder::new(&options, &mut arena).build(&root).unwrap();
    let extracted: Vec<_> = path.locations()[1..].iter().map(|p| p.to_path_buf()).collect();

    assert_eq!(extracted.len(), 2);
    assert!(extracted.iter().all(|p| p.exists()));

    drop(arena);
    assert!(extracted.iter().all(|p| !p.exists()));
    assert!(root.exists());
}
