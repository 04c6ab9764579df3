use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use soundshift::batch::{self, BatchConfig, BatchResults, Direction, WordResult};
use soundshift::config::runtime::{LogLevel, LoggingPreferences};
use soundshift::pipeline::{read_source_file, Session};
use soundshift::{logging, CompiledRuleSet, RuleCompiler};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "soundshift")]
#[command(about = "Apply sound change rules forward, or reconstruct source words from their outcomes")]
#[command(version)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Minimum level of diagnostics written to stderr
    #[arg(long, global = true, value_enum)]
    log_level: Option<LevelArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a rule file and list the concrete rules
    Compile {
        /// Rule file
        rules: PathBuf,
    },

    /// Derive target words from source words
    Apply {
        #[command(flatten)]
        run: RunArgs,

        /// Show the word after every rule that changed it
        #[arg(long)]
        trace: bool,
    },

    /// Reconstruct every source word that derives each target word
    Reverse {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Classify the phonemes a rule file mentions and suggest inventories
    Derive {
        /// Rule file
        rules: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Rule file
    #[arg(short, long)]
    rules: PathBuf,

    /// Source inventory file
    #[arg(short, long)]
    source: PathBuf,

    /// Target inventory file
    #[arg(short, long)]
    target: PathBuf,

    /// Words to process
    words: Vec<String>,

    /// File with additional words, whitespace separated
    #[arg(short, long)]
    words_file: Option<PathBuf>,

    /// Worker threads for batch processing
    #[arg(long, default_value_t = num_cpus::get())]
    threads: usize,

    /// Stop at the first word that fails
    #[arg(long)]
    fail_fast: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LevelArg {
    Error,
    Warning,
    Info,
    Debug,
}

impl From<LevelArg> for LogLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Error => LogLevel::Error,
            LevelArg::Warning => LogLevel::Warning,
            LevelArg::Info => LogLevel::Info,
            LevelArg::Debug => LogLevel::Debug,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_level) {
        eprintln!("Error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<LevelArg>) -> CliResult<()> {
    let mut preferences = LoggingPreferences::default();
    if let Some(level) = level {
        preferences.min_log_level = level.into();
    }
    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()?;
    Ok(())
}

fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Compile { rules } => {
            let compiled = compile_file(rules)?;
            print_compiled(&compiled, cli.json)
        }
        Commands::Derive { rules } => {
            let compiled = compile_file(rules)?;
            let derivation = soundshift::derive(&compiled.rules);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&derivation)?);
            } else {
                print_set("Produced only", &derivation.produced_only);
                print_set("Consumed only", &derivation.consumed_only);
                print_set("Intermediate", &derivation.intermediate);
                print_set("Persistent", &derivation.persistent);
                print_set("Context only", &derivation.context_only);
                print_set("Suggested source", &derivation.suggested_source());
                print_set("Suggested target", &derivation.suggested_target());
            }
            Ok(())
        }
        Commands::Apply { run, trace: true } => {
            let session = open_session(run)?;
            trace_words(&session, &collect_words(run)?, cli.json)
        }
        Commands::Apply { run, trace: false } => {
            process(run, Direction::Forward, cli.json)
        }
        Commands::Reverse { run } => process(run, Direction::Reverse, cli.json),
    }
}

fn compile_file(path: &Path) -> CliResult<CompiledRuleSet> {
    let file = read_source_file(path)?;
    let compiled = logging::with_source_context(&file.path, || {
        RuleCompiler::new().compile(&file.contents)
    })?;
    Ok(compiled)
}

fn open_session(run: &RunArgs) -> CliResult<Session> {
    Ok(Session::from_files(&run.rules, &run.source, &run.target)?)
}

/// Positional words followed by the words file, in order
fn collect_words(run: &RunArgs) -> CliResult<Vec<String>> {
    let mut words = run.words.clone();
    if let Some(path) = &run.words_file {
        let file = read_source_file(path)?;
        words.extend(parse_word_list(&file.contents));
    }

    if words.is_empty() {
        return Err("no words given (pass them as arguments or with --words-file)".into());
    }
    Ok(words)
}

fn parse_word_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

fn process(run: &RunArgs, direction: Direction, json: bool) -> CliResult<()> {
    let session = open_session(run)?;
    let words = collect_words(run)?;
    let config = BatchConfig::default()
        .with_threads(run.threads)
        .with_fail_fast(run.fail_fast);

    let results = batch::process_words(&session, &words, direction, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_results(&results);
    }

    match results.failure_count() {
        0 => Ok(()),
        failed => Err(format!("{} of {} words failed", failed, results.words_processed()).into()),
    }
}

fn print_compiled(compiled: &CompiledRuleSet, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(compiled)?);
        return Ok(());
    }

    for rule in &compiled.rules {
        println!("{}", rule);
    }
    eprintln!(
        "{} rules from {} statements ({} variables)",
        compiled.stats.rules_emitted, compiled.stats.rule_statements, compiled.stats.variables
    );
    Ok(())
}

fn print_results(results: &BatchResults) {
    for outcome in &results.outcomes {
        match &outcome.result {
            WordResult::Derived { output } => println!("{} -> {}", outcome.word, output),
            WordResult::Reconstructed { sources } if sources.is_empty() => {
                println!("{} <- (no source words)", outcome.word)
            }
            WordResult::Reconstructed { sources } => {
                let sources: Vec<&str> = sources.iter().map(String::as_str).collect();
                println!("{} <- {}", outcome.word, sources.join(", "))
            }
            WordResult::Failed { code, message } => {
                eprintln!("error[{}]: {}: {}", code, outcome.word, message)
            }
        }
    }
}

#[derive(Serialize)]
struct TracedWord<'a> {
    word: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<soundshift::TraceStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<TraceFailure>,
}

#[derive(Serialize)]
struct TraceFailure {
    code: String,
    message: String,
}

/// Trace every word, recording failures per word instead of stopping
fn trace_all<'a>(session: &Session, words: &'a [String]) -> Vec<TracedWord<'a>> {
    words
        .iter()
        .map(|word| match session.trace(word) {
            Ok(steps) => TracedWord {
                word,
                steps: Some(steps),
                error: None,
            },
            Err(e) => TracedWord {
                word,
                steps: None,
                error: Some(TraceFailure {
                    code: e.error_code().to_string(),
                    message: e.to_string(),
                }),
            },
        })
        .collect()
}

fn trace_words(session: &Session, words: &[String], json: bool) -> CliResult<()> {
    let traced = trace_all(session, words);

    if json {
        println!("{}", serde_json::to_string_pretty(&traced)?);
    } else {
        for entry in &traced {
            match (&entry.steps, &entry.error) {
                (_, Some(failure)) => {
                    eprintln!("error[{}]: {}: {}", failure.code, entry.word, failure.message)
                }
                (Some(steps), None) => {
                    println!("{}", entry.word);
                    for step in steps {
                        println!("  {:<24} [{}] {}", step.word, step.rule_index, step.rule);
                    }
                }
                (None, None) => {}
            }
        }
    }

    match traced.iter().filter(|entry| entry.error.is_some()).count() {
        0 => Ok(()),
        failed => Err(format!("{} of {} words failed", failed, traced.len()).into()),
    }
}

fn print_set(label: &str, set: &std::collections::BTreeSet<String>) {
    let members: Vec<&str> = set.iter().map(String::as_str).collect();
    println!("{:<17} {}", format!("{}:", label), members.join(" "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reverse_arguments() {
        let cli = Cli::try_parse_from([
            "soundshift", "reverse", "-r", "rules.txt", "-s", "src.txt", "-t", "tgt.txt", "--json",
            "xyx", "yy",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Reverse { run } => {
                assert_eq!(run.words, vec!["xyx", "yy"]);
                assert_eq!(run.rules, PathBuf::from("rules.txt"));
                assert!(run.threads >= 1);
            }
            _ => panic!("expected reverse"),
        }
    }

    #[test]
    fn test_apply_requires_inventories() {
        assert!(Cli::try_parse_from(["soundshift", "apply", "-r", "rules.txt", "abc"]).is_err());
    }

    #[test]
    fn test_word_list_skips_comments() {
        let words = parse_word_list("# targets\nxyx yy\n\n  x\n");
        assert_eq!(words, vec!["xyx", "yy", "x"]);
    }

    #[test]
    fn test_run_reports_failed_words() {
        let dir = tempfile::tempdir().unwrap();
        let rules = dir.path().join("rules.txt");
        let source = dir.path().join("source.txt");
        let target = dir.path().join("target.txt");
        fs::write(&rules, "a>x; b>y; c>x;").unwrap();
        fs::write(&source, "a b c").unwrap();
        fs::write(&target, "x y").unwrap();

        let args = |word: &str| {
            Cli::try_parse_from([
                "soundshift",
                "apply",
                "-r",
                rules.to_str().unwrap(),
                "-s",
                source.to_str().unwrap(),
                "-t",
                target.to_str().unwrap(),
                "--threads",
                "1",
                word,
            ])
            .unwrap()
        };

        assert!(run(&args("abc")).is_ok());
        assert!(run(&args("zzz")).is_err());
    }

    #[test]
    fn test_trace_continues_past_failed_word() {
        let session = Session::from_text("a>x; b>y; c>x;", "a b c", "x y").unwrap();
        let words = vec!["zz".to_string(), "abc".to_string()];
        let traced = trace_all(&session, &words);

        assert_eq!(traced.len(), 2);
        assert_eq!(traced[0].error.as_ref().map(|f| f.code.as_str()), Some("E050"));
        assert_eq!(traced[1].steps.as_ref().map(Vec::len), Some(3));
        assert!(trace_words(&session, &words, false).is_err());
    }

    #[test]
    fn test_words_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let words_file = dir.path().join("words.txt");
        fs::write(&words_file, "yy\nxx").unwrap();

        let run = RunArgs {
            rules: PathBuf::from("rules.txt"),
            source: PathBuf::from("source.txt"),
            target: PathBuf::from("target.txt"),
            words: vec!["xyx".to_string()],
            words_file: Some(words_file),
            threads: 1,
            fail_fast: false,
        };
        assert_eq!(collect_words(&run).unwrap(), vec!["xyx", "yy", "xx"]);
    }
}
