//! GroupingConfig, ExtrasPolicy, and OutputTemplate tests.

use std::sync::Arc;

use epsplit::{
    DEFAULT_FORMAT, EpsplitError, ExtrasPolicy, GroupingConfig, OutputTemplate, ProgressCallback,
    ProgressInfo, TemplateValues,
};

// ── GroupingConfig builder ─────────────────────────────────────────

#[test]
fn config_defaults() {
    let config = GroupingConfig::new();
    let debug = format!("{config:?}");
    assert!(debug.contains("GroupingConfig"));
    assert!(debug.contains("episode_length: 1"));
    assert!(debug.contains("max_episodes: None"));
    assert!(config.validate().is_ok());
}

#[test]
fn config_builder_sets_every_option() {
    let config = GroupingConfig::new()
        .with_output_format(OutputTemplate::parse("{episode_num}.{ext}").unwrap())
        .with_start_number(0)
        .with_episode_length(3)
        .with_extras_policy(ExtrasPolicy::Error)
        .with_skip_count(2)
        .with_title_prompt(true)
        .with_max_episodes(Some(12));

    assert_eq!(config.output_format().as_str(), "{episode_num}.{ext}");
    assert_eq!(config.start_number(), 0);
    assert_eq!(config.episode_length(), 3);
    assert_eq!(config.extras_policy(), ExtrasPolicy::Error);
    assert_eq!(config.skip_count(), 2);
    assert!(config.title_prompt());
    assert_eq!(config.max_episodes(), Some(12));
}

#[test]
fn config_rejects_zero_length() {
    let result = GroupingConfig::new().with_episode_length(0).validate();
    assert!(matches!(result, Err(EpsplitError::InvalidConfiguration(_))));
}

#[test]
fn config_with_progress_is_cloneable() {
    struct Silent;
    impl ProgressCallback for Silent {
        fn on_progress(&self, _info: &ProgressInfo) {}
    }

    let config = GroupingConfig::new().with_progress(Arc::new(Silent));
    let clone = config.clone();
    assert_eq!(format!("{config:?}"), format!("{clone:?}"));
}

// ── ExtrasPolicy ───────────────────────────────────────────────────

#[test]
fn extras_policy_default_is_warn() {
    assert_eq!(ExtrasPolicy::default(), ExtrasPolicy::Warn);
}

#[test]
fn extras_policy_parses_case_insensitively() {
    assert_eq!("DROP".parse::<ExtrasPolicy>().unwrap(), ExtrasPolicy::Drop);
    assert_eq!("Error".parse::<ExtrasPolicy>().unwrap(), ExtrasPolicy::Error);
}

// ── OutputTemplate ─────────────────────────────────────────────────

#[test]
fn default_format_pads_episode_number() {
    let template: OutputTemplate = DEFAULT_FORMAT.parse().unwrap();
    let name = template.render(&TemplateValues {
        episode_num: 1,
        title: " - Pilot",
        ext: "mkv",
    });
    assert_eq!(name, "01 - Pilot.mkv");
}

#[test]
fn template_can_place_output_in_a_directory() {
    let template = OutputTemplate::parse("out/{title:.10}/{episode_num:04d}.{ext}").unwrap();
    let name = template.render(&TemplateValues {
        episode_num: 42,
        title: "Season One Finale",
        ext: "mp4",
    });
    assert_eq!(name, "out/Season One/0042.mp4");
}

#[test]
fn invalid_template_error_names_the_template() {
    let error = OutputTemplate::parse("{episode}.{ext}").unwrap_err();
    let message = error.to_string();
    assert!(message.contains("{episode}.{ext}"), "{message}");
    assert!(message.contains("unknown placeholder"), "{message}");
}
