//! Input enumeration and output planning tests.

mod common;

use std::path::Path;

use common::touch;
use mkvaudio::{AudioFormat, Batch, ExtractionRequest, MkvAudioError, find_containers};

#[test]
fn finds_nested_containers_case_insensitively() {
    let input = tempfile::tempdir().unwrap();
    touch(input.path(), "a/movie1.mkv");
    touch(input.path(), "b/deeper/MOVIE2.MKV");
    touch(input.path(), "b/notes.txt");
    touch(input.path(), "c/clip.mp4");

    let found = find_containers(input.path(), &["mkv"]).unwrap();
    let relative: Vec<_> = found
        .iter()
        .map(|path| path.strip_prefix(input.path()).unwrap().to_path_buf())
        .collect();

    assert_eq!(
        relative,
        [
            Path::new("a/movie1.mkv").to_path_buf(),
            Path::new("b/deeper/MOVIE2.MKV").to_path_buf(),
        ]
    );
}

#[test]
fn enumeration_order_is_stable() {
    let input = tempfile::tempdir().unwrap();
    for name in ["z.mkv", "m/a.mkv", "a.mkv", "m/b.mkv"] {
        touch(input.path(), name);
    }

    let first = find_containers(input.path(), &["mkv"]).unwrap();
    let second = find_containers(input.path(), &["mkv"]).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn directories_named_like_containers_are_skipped() {
    let input = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(input.path().join("folder.mkv")).unwrap();
    touch(input.path(), "folder.mkv/inner.mkv");

    let found = find_containers(input.path(), &["mkv"]).unwrap();
    assert_eq!(found, [input.path().join("folder.mkv/inner.mkv")]);
}

#[test]
fn empty_tree_is_not_an_error() {
    let input = tempfile::tempdir().unwrap();
    touch(input.path(), "readme.md");
    assert!(find_containers(input.path(), &["mkv"]).unwrap().is_empty());
}

#[test]
fn missing_root_is_input_not_found() {
    let input = tempfile::tempdir().unwrap();
    let missing = input.path().join("gone");
    let error = find_containers(&missing, &["mkv"]).unwrap_err();
    assert!(matches!(error, MkvAudioError::InputNotFound { ref path } if path == &missing));
}

#[test]
fn plan_mirrors_relative_paths() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "a/movie1.mkv");
    touch(input.path(), "b/movie2.mkv");
    touch(input.path(), "b/season.1/ep.01.Mkv");

    let request = ExtractionRequest::new()
        .with_input_root(input.path())
        .with_output_root(output.path())
        .with_format(AudioFormat::Flac);
    let batch = Batch::plan(&request).unwrap();

    assert_eq!(batch.len(), 3);
    for job in batch.jobs() {
        let output_relative = job.output().strip_prefix(output.path()).unwrap();
        assert_eq!(output_relative, job.relative().with_extension("flac"));
        assert_eq!(job.output().extension().unwrap(), "flac");
    }
    assert_eq!(
        batch.jobs()[2].output(),
        output.path().join("b/season.1/ep.01.flac")
    );
}

#[test]
fn prepare_creates_output_directories() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "x/y/z.mkv");

    let request = ExtractionRequest::new()
        .with_input_root(input.path())
        .with_output_root(output.path().join("fresh"));
    let batch = Batch::plan(&request).unwrap();
    let job = &batch.jobs()[0];

    assert!(!job.output().parent().unwrap().exists());
    job.prepare().unwrap();
    assert!(job.output().parent().unwrap().is_dir());
}

#[test]
fn plan_honours_extra_extensions() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    touch(input.path(), "one.mkv");
    touch(input.path(), "two.webm");

    let request = ExtractionRequest::new()
        .with_input_root(input.path())
        .with_output_root(output.path())
        .with_extensions(["mkv", "webm"]);
    assert_eq!(Batch::plan(&request).unwrap().len(), 2);
}
