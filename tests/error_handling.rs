//! Error handling integration tests.
//!
//! These verify that meaningful errors are returned when the external tools
//! are missing or fail.

use std::path::Path;

use epsplit::{
    ChapterReader, EpisodeExtractor, EpsplitError, FfmpegRemuxer, FfprobeReader, GroupingConfig,
    NoTitle, Splitter, Timestamp,
};

const MISSING_PROGRAM: &str = "epsplit-test-program-that-does-not-exist";

#[test]
fn missing_probe_program() {
    let reader = FfprobeReader::new().with_program(MISSING_PROGRAM);
    let result = reader.read_chapters(Path::new("input.mkv"));

    let error = result.unwrap_err();
    assert!(matches!(error, EpsplitError::Probe { .. }));
    let error_message = error.to_string();
    assert!(
        error_message.contains("Failed to read chapters from input.mkv"),
        "Error message should name the input: {error_message}",
    );
    assert!(
        error_message.contains(MISSING_PROGRAM),
        "Error message should name the program: {error_message}",
    );
}

#[test]
fn missing_extract_program() {
    let remuxer = FfmpegRemuxer::new().with_program(MISSING_PROGRAM);
    let result = remuxer.extract(
        Path::new("input.mkv"),
        &Timestamp::from_seconds(0.0),
        &Timestamp::from_seconds(10.0),
        Path::new("01.mkv"),
    );

    let error_message = result.unwrap_err().to_string();
    assert!(
        error_message.contains("Failed to extract episode to 01.mkv"),
        "Error message should name the output: {error_message}",
    );
}

#[cfg(unix)]
#[test]
fn failing_probe_program() {
    let reader = FfprobeReader::new().with_program("false");
    let error = reader.read_chapters(Path::new("input.mkv")).unwrap_err();

    let error_message = error.to_string();
    assert!(
        error_message.contains("exited with"),
        "Error message should mention the exit status: {error_message}",
    );
}

#[cfg(unix)]
#[test]
fn probe_program_with_unexpected_output() {
    // `true` exits successfully without printing anything.
    let reader = FfprobeReader::new().with_program("true");
    let error = reader.read_chapters(Path::new("input.mkv")).unwrap_err();

    assert!(matches!(error, EpsplitError::Probe { .. }));
    assert!(error.to_string().contains("unexpected probe output"));
}

#[cfg(unix)]
#[test]
fn failing_extract_program() {
    let remuxer = FfmpegRemuxer::new().with_program("false");
    let error = remuxer
        .extract(
            Path::new("input.mkv"),
            &Timestamp::from_seconds(0.0),
            &Timestamp::from_seconds(10.0),
            Path::new("01.mkv"),
        )
        .unwrap_err();

    assert!(matches!(error, EpsplitError::Extract { .. }));
    assert_eq!(error.exit_code(), 1);
}

#[cfg(unix)]
#[test]
fn successful_extract_program() {
    let remuxer = FfmpegRemuxer::new().with_program("true");
    let result = remuxer.extract(
        Path::new("input.mkv"),
        &Timestamp::from_seconds(0.0),
        &Timestamp::from_seconds(10.0),
        Path::new("01.mkv"),
    );
    assert!(result.is_ok());
}

#[test]
fn splitter_reports_probe_failure() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let input = temporary_directory.path().join("not_media.mkv");
    std::fs::write(&input, b"this is not a media file").expect("Failed to write input file");

    let reader = FfprobeReader::new().with_program(MISSING_PROGRAM);
    let remuxer = FfmpegRemuxer::new().with_program(MISSING_PROGRAM);
    let result = Splitter::new(reader, remuxer, GroupingConfig::new())
        .with_title_resolver(NoTitle)
        .split(&[&input]);

    assert!(matches!(result, Err(EpsplitError::Probe { ref path, .. }) if path == &input));
}
