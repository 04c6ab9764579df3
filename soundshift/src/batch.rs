//! Batch processing of word lists in either direction
//!
//! Words are split into contiguous chunks, one per scoped worker thread. Each
//! worker reverses with its own [`Reverser`] so caches are never shared. Results
//! come back in input order regardless of thread count.

use crate::config::compile_time::batch_processing::{MAX_WORDS_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::BatchPreferences;
use crate::engine::Reverser;
use crate::logging::codes;
use crate::pipeline::{PipelineError, Session};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Which way words go through the rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Reverse,
}

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub fail_fast: bool,
    pub progress_reporting: bool,
    pub progress_interval: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let preferences = BatchPreferences::default();
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(MAX_WORKER_THREADS))
                .unwrap_or(4),
            fail_fast: false,
            progress_reporting: preferences.progress_reporting,
            progress_interval: preferences.progress_interval,
        }
    }
}

impl BatchConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// What happened to one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WordResult {
    Derived { output: String },
    Reconstructed { sources: BTreeSet<String> },
    Failed { code: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordOutcome {
    /// Position of the word in the submitted list
    pub index: usize,
    pub word: String,
    #[serde(flatten)]
    pub result: WordResult,
}

impl WordOutcome {
    fn failed(index: usize, word: &str, error: &PipelineError) -> Self {
        Self {
            index,
            word: word.to_string(),
            result: WordResult::Failed {
                code: error.error_code().to_string(),
                message: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.result, WordResult::Failed { .. })
    }
}

/// Batch processing results, in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchResults {
    pub direction: Direction,
    pub outcomes: Vec<WordOutcome>,
    pub words_submitted: usize,
    pub threads_used: usize,
    #[serde(skip)]
    pub processing_duration: Duration,
}

impl BatchResults {
    fn new(direction: Direction, words_submitted: usize) -> Self {
        Self {
            direction,
            outcomes: Vec::with_capacity(words_submitted),
            words_submitted,
            threads_used: 0,
            processing_duration: Duration::new(0, 0),
        }
    }

    pub fn words_processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.words_processed() - self.success_count()
    }

    pub fn success_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.words_processed() as f64
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &WordOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} of {} words processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.words_processed(),
            self.words_submitted,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

/// Batch processing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    #[error("Too many words: {count} (max: {max})")]
    TooManyWords { count: usize, max: usize },

    #[error("Worker thread failed: {message}")]
    WorkerFailure { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            BatchError::TooManyWords { .. } => codes::batch::TOO_MANY_WORDS,
            BatchError::WorkerFailure { .. } => codes::batch::WORKER_FAILURE,
        }
    }
}

/// Shared state the workers report through
struct Progress<'a> {
    config: &'a BatchConfig,
    total: usize,
    done: AtomicUsize,
    stop: AtomicBool,
}

impl Progress<'_> {
    fn record(&self, outcome: &WordOutcome) {
        if !outcome.is_success() && self.config.fail_fast {
            self.stop.store(true, Ordering::Relaxed);
        }

        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if self.config.progress_reporting && done % self.config.progress_interval.max(1) == 0 {
            crate::log_info!("Batch progress",
                "processed" => done,
                "total" => self.total
            );
        }
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// Run every word through the session's rules in the given direction
pub fn process_words(
    session: &Session,
    words: &[String],
    direction: Direction,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    if words.len() > MAX_WORDS_PER_BATCH {
        let error = BatchError::TooManyWords {
            count: words.len(),
            max: MAX_WORDS_PER_BATCH,
        };
        crate::log_error!(error.error_code(), &error.to_string());
        return Err(error);
    }

    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS).min(words.len().max(1));
    let chunk_size = words.len().div_ceil(threads).max(1);

    crate::log_info!("Starting batch processing",
        "words" => words.len(),
        "direction" => format!("{:?}", direction),
        "threads" => threads
    );

    let progress = Progress {
        config,
        total: words.len(),
        done: AtomicUsize::new(0),
        stop: AtomicBool::new(false),
    };

    let mut results = BatchResults::new(direction, words.len());
    results.threads_used = threads;

    if threads == 1 {
        results
            .outcomes
            .extend(process_chunk(session, words, 0, direction, &progress));
    } else {
        let chunks = thread::scope(|scope| {
            let handles: Vec<_> = words
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk_index, chunk)| {
                    let progress = &progress;
                    scope.spawn(move || {
                        process_chunk(session, chunk, chunk_index * chunk_size, direction, progress)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        });

        for chunk in chunks {
            let outcomes = chunk.map_err(|_| {
                let error = BatchError::WorkerFailure {
                    message: "worker thread panicked".to_string(),
                };
                crate::log_error!(error.error_code(), &error.to_string());
                error
            })?;
            results.outcomes.extend(outcomes);
        }
    }

    if config.fail_fast && progress.should_stop() {
        crate::log_warning!("Fail-fast mode enabled, stopped after first failure",
            "processed" => results.words_processed(),
            "submitted" => words.len()
        );
    }

    results.processing_duration = start_time.elapsed();

    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch processing completed",
        "processed" => results.words_processed(),
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );

    Ok(results)
}

fn process_chunk(
    session: &Session,
    words: &[String],
    first_index: usize,
    direction: Direction,
    progress: &Progress<'_>,
) -> Vec<WordOutcome> {
    let mut reverser: Option<Reverser> =
        (direction == Direction::Reverse).then(|| session.new_reverser());
    let mut outcomes = Vec::with_capacity(words.len());

    for (offset, word) in words.iter().enumerate() {
        if progress.should_stop() {
            break;
        }

        let index = first_index + offset;
        let outcome = match reverser.as_mut() {
            None => match session.apply(word) {
                Ok(output) => WordOutcome {
                    index,
                    word: word.clone(),
                    result: WordResult::Derived { output },
                },
                Err(error) => WordOutcome::failed(index, word, &error),
            },
            Some(reverser) => match reverser.reverse(word) {
                Ok(sources) => WordOutcome {
                    index,
                    word: word.clone(),
                    result: WordResult::Reconstructed { sources },
                },
                Err(error) => WordOutcome::failed(index, word, &PipelineError::from(error)),
            },
        };

        progress.record(&outcome);
        outcomes.push(outcome);
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn session() -> Session {
        Session::from_text("a>x; b>y; c>x;", "a b c", "x y").unwrap()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_forward_batch_keeps_order() {
        let input = words(&["abc", "cab", "bb", "a", "ccc", "ba"]);
        let config = BatchConfig::default().with_threads(3);
        let results = process_words(&session(), &input, Direction::Forward, &config).unwrap();

        let outputs: Vec<&WordResult> = results.outcomes.iter().map(|o| &o.result).collect();
        assert_eq!(results.words_processed(), 6);
        assert_eq!(
            outputs[0],
            &WordResult::Derived {
                output: "xyx".to_string()
            }
        );
        assert_eq!(
            results.outcomes.iter().map(|o| o.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn test_reverse_batch_matches_single_threaded() {
        let input = words(&["xyx", "yy", "x", "xx"]);
        let session = session();
        let parallel = process_words(
            &session,
            &input,
            Direction::Reverse,
            &BatchConfig::default().with_threads(4),
        )
        .unwrap();
        let sequential = process_words(
            &session,
            &input,
            Direction::Reverse,
            &BatchConfig::default().with_threads(1),
        )
        .unwrap();

        assert_eq!(parallel.outcomes, sequential.outcomes);
        assert_matches!(
            &parallel.outcomes[2].result,
            WordResult::Reconstructed { sources } if sources.len() == 2
        );
    }

    #[test]
    fn test_failures_recorded_per_word() {
        let input = words(&["ab", "zz", "ba"]);
        let results = process_words(
            &session(),
            &input,
            Direction::Forward,
            &BatchConfig::default().with_threads(2),
        )
        .unwrap();

        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        let failure = results.failures().next().unwrap();
        assert_eq!(failure.word, "zz");
        assert_matches!(&failure.result, WordResult::Failed { code, .. } if code == "E050");
    }

    #[test]
    fn test_fail_fast_stops_sequential_run() {
        let input = words(&["zz", "ab", "ba"]);
        let config = BatchConfig::default().with_threads(1).with_fail_fast(true);
        let results = process_words(&session(), &input, Direction::Forward, &config).unwrap();
        assert_eq!(results.words_processed(), 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let results =
            process_words(&session(), &[], Direction::Reverse, &BatchConfig::default()).unwrap();
        assert_eq!(results.words_processed(), 0);
        assert_eq!(results.success_rate(), 0.0);
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = WordOutcome {
            index: 0,
            word: "xyx".to_string(),
            result: WordResult::Derived {
                output: "aba".to_string(),
            },
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "derived");
        assert_eq!(json["output"], "aba");
    }
}
