use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use epsplit::{
    DEFAULT_FORMAT, EXTRAS_LOG_TARGET, EpsplitError, ExtrasPolicy, FfmpegRemuxer, FfprobeReader,
    GroupingConfig, OutputTemplate, ProgressCallback, ProgressInfo, ProgressStage, SplitSummary,
    Splitter,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  epsplit season1.mkv --length 2\n  epsplit disc1.mkv disc2.mkv --skip 1 --format 'S01E{episode_num:02d}{title}.{ext}'\n  epsplit box.mkv --episodes 3 --title-prompt\n  epsplit box.mkv --length 2 --dry-run --json\n  epsplit --completions zsh > _epsplit";

#[derive(Debug, Parser)]
#[command(
    name = "epsplit",
    version,
    about = "Split a video by episode with chapters",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// The video files to split, in order.
    #[arg(required_unless_present = "completions")]
    inputs: Vec<PathBuf>,

    /// Format for the output filenames ({episode_num}, {title}, {ext}).
    ///
    /// Placeholders take Python-style format specs
    /// `[[fill]align][sign][#][0][width][,|_][.precision][type]`. The type is one of
    /// d, x, X, o, b for {episode_num} and s for {title} and {ext}; other
    /// types and !s/!r conversions are not supported.
    #[arg(long, default_value = DEFAULT_FORMAT, value_parser = OutputTemplate::parse)]
    format: OutputTemplate,

    /// Episode number to start with.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    startnum: i64,

    /// Length of an episode in chapters.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    length: u64,

    /// Max number of episodes to pull.
    #[arg(long)]
    episodes: Option<u64>,

    /// Specifies how extra chapters should be handled.
    #[arg(long, value_enum, default_value_t = ExtrasPolicy::Warn)]
    extras: ExtrasPolicy,

    /// Number of chapters to skip at the beginning of each file.
    #[arg(long, default_value_t = 0)]
    skip: usize,

    /// Prompt for each episode title.
    #[arg(long)]
    title_prompt: bool,

    /// Print the episodes that would be written without running ffmpeg.
    #[arg(long)]
    dry_run: bool,

    /// Print the dry-run plan as JSON.
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Refuse to overwrite existing output files.
    #[arg(long)]
    no_overwrite: bool,

    /// ffprobe executable used to read chapters.
    #[arg(long, default_value = "ffprobe")]
    ffprobe: PathBuf,

    /// ffmpeg executable used to extract episodes.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar (ignored with --title-prompt).
    #[arg(long)]
    progress: bool,

    /// Generate a shell completion script and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

struct TerminalProgress {
    bar: Option<ProgressBar>,
    verbose: bool,
}

impl TerminalProgress {
    fn new(
        show_bar: bool,
        episode_limit: Option<u64>,
        verbose: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = if show_bar {
            let bar = match episode_limit {
                Some(limit) => {
                    let bar = ProgressBar::new(limit);
                    bar.set_style(
                        ProgressStyle::with_template(
                            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                        )?
                        .progress_chars("##-"),
                    );
                    bar
                }
                None => {
                    let bar = ProgressBar::new_spinner();
                    bar.set_style(ProgressStyle::with_template(
                        "{spinner:.green} {pos} episode(s) {msg}",
                    )?);
                    bar
                }
            };
            Some(bar)
        } else {
            None
        };
        Ok(Self { bar, verbose })
    }

    fn print(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.suspend(|| eprintln!("{line}")),
            None => eprintln!("{line}"),
        }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.stage {
            ProgressStage::FileProbed => {
                if let (Some(bar), Some(source)) = (&self.bar, &info.source) {
                    bar.set_message(format!(
                        "{} [{}/{}]",
                        source.display(),
                        info.files_probed,
                        info.files_total
                    ));
                }
                if self.verbose {
                    if let (Some(source), Some(count)) = (&info.source, info.chapter_count) {
                        self.print(format!("probed {} ({count} chapters)", source.display()));
                    }
                }
            }
            ProgressStage::ExtrasFound => {
                if let Some(leftover) = info.leftover {
                    self.print(format!(
                        "{} {}",
                        "WARNING:".yellow().bold(),
                        format!("Found {leftover} unused chapters at the end").yellow()
                    ));
                }
            }
            ProgressStage::EpisodeWritten => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                if self.verbose {
                    if let Some(output) = &info.output {
                        self.print(format!("saved {}", output.display()));
                    }
                }
            }
            ProgressStage::Finished => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message("done");
                }
            }
            _ => {}
        }
    }
}

/// The extras warning is printed by [`TerminalProgress`], so its log record
/// is muted.
fn log_filter(verbose: bool) -> String {
    if verbose {
        format!("epsplit=debug,{EXTRAS_LOG_TARGET}=off")
    } else {
        "error".to_string()
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter(verbose)))
        .format_target(false)
        .format_timestamp(None)
        .init();
}

fn grouping_config(cli: &Cli) -> Result<GroupingConfig, Box<dyn std::error::Error>> {
    let config = GroupingConfig::new()
        .with_output_format(cli.format.clone())
        .with_start_number(cli.startnum)
        .with_episode_length(usize::try_from(cli.length)?)
        .with_extras_policy(cli.extras)
        .with_skip_count(cli.skip)
        .with_title_prompt(cli.title_prompt)
        .with_max_episodes(cli.episodes);
    config.validate()?;
    Ok(config)
}

fn print_plan(summary: &SplitSummary, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        let payload = json!({
            "files_probed": summary.files_probed,
            "episodes": summary.episodes.iter().map(|episode| json!({
                "episode_num": episode.spec.episode_number,
                "source": episode.source.display().to_string(),
                "start_time": episode.spec.start_time.as_str(),
                "end_time": episode.spec.end_time.as_str(),
                "first_chapter": episode.spec.first_chapter,
                "chapter_count": episode.spec.chapter_count,
                "title": episode.title,
                "output": episode.output.display().to_string(),
            })).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for episode in &summary.episodes {
            println!(
                "{:>4}  {} [{} -> {}] -> {}",
                episode.spec.episode_number,
                episode.source.display(),
                episode.spec.start_time,
                episode.spec.end_time,
                episode.output.display()
            );
        }
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        clap_complete::generate(shell, &mut command, "epsplit", &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);

    let show_bar = cli.progress && !cli.title_prompt;
    let progress = TerminalProgress::new(show_bar, cli.episodes, cli.verbose)?;
    let config = grouping_config(&cli)?.with_progress(Arc::new(progress));

    let reader = FfprobeReader::new().with_program(&cli.ffprobe);
    let mut remuxer = FfmpegRemuxer::new().with_program(&cli.ffmpeg);
    if cli.no_overwrite {
        remuxer = remuxer.no_overwrite();
    }

    let summary = Splitter::new(reader, remuxer, config)
        .with_dry_run(cli.dry_run)
        .split(&cli.inputs)?;

    if cli.dry_run {
        print_plan(&summary, cli.json)?;
    } else {
        println!(
            "{} {}",
            "success:".green().bold(),
            format!(
                "Wrote {} episode(s) from {} file(s)",
                summary.episodes.len(),
                summary.files_probed
            )
            .green()
        );
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        let code = match error.downcast_ref::<EpsplitError>() {
            Some(error) => {
                let label = match error {
                    EpsplitError::ExtrasPolicyViolation { .. } => "ERROR:",
                    _ => "error:",
                };
                eprintln!("{} {error}", label.red().bold());
                error.exit_code()
            }
            None => {
                eprintln!("{} {error}", "error:".red().bold());
                1
            }
        };
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("epsplit").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_library_defaults() {
        let cli = parse(&["show.mkv"]).unwrap();
        let config = grouping_config(&cli).unwrap();
        assert_eq!(cli.format.as_str(), DEFAULT_FORMAT);
        assert_eq!(config.start_number(), 1);
        assert_eq!(config.episode_length(), 1);
        assert_eq!(config.skip_count(), 0);
        assert_eq!(config.extras_policy(), ExtrasPolicy::Warn);
        assert_eq!(config.max_episodes(), None);
        assert!(!config.title_prompt());
    }

    #[test]
    fn inputs_keep_their_order() {
        let cli = parse(&["b.mkv", "a.mkv", "c.mkv"]).unwrap();
        assert_eq!(
            cli.inputs,
            [PathBuf::from("b.mkv"), PathBuf::from("a.mkv"), PathBuf::from("c.mkv")]
        );
    }

    #[test]
    fn grouping_options_are_applied() {
        let cli = parse(&[
            "show.mkv",
            "--startnum",
            "5",
            "--length",
            "2",
            "--episodes",
            "3",
            "--extras",
            "error",
            "--skip",
            "1",
            "--title-prompt",
        ])
        .unwrap();
        let config = grouping_config(&cli).unwrap();
        assert_eq!(config.start_number(), 5);
        assert_eq!(config.episode_length(), 2);
        assert_eq!(config.max_episodes(), Some(3));
        assert_eq!(config.extras_policy(), ExtrasPolicy::Error);
        assert_eq!(config.skip_count(), 1);
        assert!(config.title_prompt());
    }

    #[test]
    fn negative_start_number_is_accepted() {
        let cli = parse(&["show.mkv", "--startnum", "-1"]).unwrap();
        assert_eq!(grouping_config(&cli).unwrap().start_number(), -1);

        let cli = parse(&["show.mkv", "--startnum=-1"]).unwrap();
        assert_eq!(cli.startnum, -1);
        assert_eq!(
            cli.format.render(&epsplit::TemplateValues {
                episode_num: cli.startnum,
                title: "",
                ext: "mkv",
            }),
            "-1.mkv"
        );
    }

    #[test]
    fn verbose_logging_mutes_the_extras_record() {
        assert!(log_filter(true).contains("epsplit=debug"));
        assert!(log_filter(true).ends_with(&format!("{EXTRAS_LOG_TARGET}=off")));
        assert_eq!(log_filter(false), "error");
    }

    #[test]
    fn zero_length_is_rejected() {
        assert!(parse(&["show.mkv", "--length", "0"]).is_err());
    }

    #[test]
    fn unknown_extras_policy_is_rejected() {
        assert!(parse(&["show.mkv", "--extras", "ignore"]).is_err());
    }

    #[test]
    fn bad_format_is_rejected() {
        assert!(parse(&["show.mkv", "--format", "{season}.{ext}"]).is_err());
    }

    #[test]
    fn inputs_required_unless_generating_completions() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--completions", "bash"]).is_ok());
    }

    #[test]
    fn json_requires_dry_run() {
        assert!(parse(&["show.mkv", "--json"]).is_err());
        assert!(parse(&["show.mkv", "--dry-run", "--json"]).is_ok());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
