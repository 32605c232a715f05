//! Progress callback integration tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use epsplit::{
    Chapter, ChapterReader, EpisodeExtractor, EpsplitError, ExtrasPolicy, GroupingConfig,
    ProgressCallback, ProgressInfo, ProgressStage, Splitter, Timestamp,
};

/// Every file has `self.0` chapters.
struct UniformReader(usize);

impl ChapterReader for UniformReader {
    fn read_chapters(&self, _path: &Path) -> Result<Vec<Chapter>, EpsplitError> {
        Ok((0..self.0)
            .map(|i| Chapter::from_seconds(i as f64, (i + 1) as f64))
            .collect())
    }
}

struct NullExtractor;

impl EpisodeExtractor for NullExtractor {
    fn extract(
        &self,
        _source: &Path,
        _start: &Timestamp,
        _end: &Timestamp,
        _output: &Path,
    ) -> Result<(), EpsplitError> {
        Ok(())
    }
}

// ── ProgressInfo ───────────────────────────────────────────────────

#[derive(Default)]
struct RecordingProgress {
    infos: Mutex<Vec<ProgressInfo>>,
}

impl RecordingProgress {
    fn stages(&self) -> Vec<ProgressStage> {
        self.infos.lock().unwrap().iter().map(|info| info.stage).collect()
    }
}

impl ProgressCallback for RecordingProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.infos.lock().unwrap().push(info.clone());
    }
}

#[test]
fn progress_reports_each_step_in_order() {
    let progress = Arc::new(RecordingProgress::default());
    let config = GroupingConfig::new()
        .with_episode_length(2)
        .with_progress(progress.clone());

    Splitter::new(UniformReader(5), NullExtractor, config)
        .split(&["a.mkv", "b.mkv"])
        .unwrap();

    assert_eq!(
        progress.stages(),
        [
            ProgressStage::FileProbed,
            ProgressStage::ExtrasFound,
            ProgressStage::EpisodeWritten,
            ProgressStage::EpisodeWritten,
            ProgressStage::FileProbed,
            ProgressStage::ExtrasFound,
            ProgressStage::EpisodeWritten,
            ProgressStage::EpisodeWritten,
            ProgressStage::Finished,
        ]
    );
}

#[test]
fn progress_counts_are_cumulative() {
    let progress = Arc::new(RecordingProgress::default());
    let config = GroupingConfig::new().with_progress(progress.clone());

    Splitter::new(UniformReader(2), NullExtractor, config)
        .split(&["a.mkv", "b.mkv"])
        .unwrap();

    let infos = progress.infos.lock().unwrap();
    let written: Vec<u64> = infos
        .iter()
        .filter(|info| info.stage == ProgressStage::EpisodeWritten)
        .map(|info| info.episodes_emitted)
        .collect();
    assert_eq!(written, [1, 2, 3, 4]);

    let last = infos.last().unwrap();
    assert_eq!(last.stage, ProgressStage::Finished);
    assert_eq!(last.files_probed, 2);
    assert_eq!(last.files_total, 2);
    assert_eq!(last.episodes_emitted, 4);
}

#[test]
fn progress_carries_file_and_output_details() {
    let progress = Arc::new(RecordingProgress::default());
    let config = GroupingConfig::new()
        .with_episode_length(2)
        .with_max_episodes(Some(1))
        .with_progress(progress.clone());

    Splitter::new(UniformReader(3), NullExtractor, config)
        .split(&["show.mkv"])
        .unwrap();

    let infos = progress.infos.lock().unwrap();
    let probed = &infos[0];
    assert_eq!(probed.stage, ProgressStage::FileProbed);
    assert_eq!(probed.source.as_deref(), Some(Path::new("show.mkv")));
    assert_eq!(probed.chapter_count, Some(3));
    assert_eq!(probed.episode_limit, Some(1));

    let extras = &infos[1];
    assert_eq!(extras.stage, ProgressStage::ExtrasFound);
    assert_eq!(extras.leftover, Some(1));

    let written = &infos[2];
    assert_eq!(written.output.as_deref(), Some(Path::new("01.mkv")));
}

#[test]
fn drop_policy_reports_no_extras() {
    let progress = Arc::new(RecordingProgress::default());
    let config = GroupingConfig::new()
        .with_episode_length(2)
        .with_extras_policy(ExtrasPolicy::Drop)
        .with_progress(progress.clone());

    Splitter::new(UniformReader(3), NullExtractor, config)
        .split(&["show.mkv"])
        .unwrap();

    assert!(!progress.stages().contains(&ProgressStage::ExtrasFound));
}
