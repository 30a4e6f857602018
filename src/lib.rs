//! Heuristic text metrics for fiction manuscripts.
//!
//! A document is normalised and segmented once, then handed to any subset of
//! the scoring modules: emotion arc, readability and style, lexical
//! diversity, mechanics, continuity, dialogue, beats and structure. Every
//! scorer is a pure function over the shared [`Document`]; degenerate input
//! yields zero-valued results, never an error.
//!
//! ```no_run
//! use manuscript_metrics::{analyze, AnalysisConfig, Canon, Modules};
//!
//! let report = analyze(
//!     "I am happy today. But yesterday I was sad.",
//!     &AnalysisConfig::default(),
//!     &Canon::new(),
//!     &Modules::all(),
//! )?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod beats;
pub mod config;
pub mod continuity;
pub mod dialogue;
pub mod diversity;
pub mod emotion;
pub mod error;
pub mod lexicon;
pub mod mechanics;
pub mod metrics;
pub mod normalize;
pub mod readability;
pub mod report;
pub mod rolling;
pub mod segment;
pub mod structure;

pub use config::AnalysisConfig;
pub use continuity::{Canon, CanonEntry};
pub use error::{MetricsError, Result};
pub use normalize::{normalize, restyle, TextStyle};
pub use report::{Module, Modules, Report};
pub use rolling::{rolling, RollingWindow};
pub use segment::Document;

use crate::lexicon::LEXICON_VERSION;
use crate::normalize::normalize_line_endings;

// ---------------------------------------------------------------------------
// Main analysis
// ---------------------------------------------------------------------------

/// Run the selected modules over `text`.
///
/// Fails only on an invalid `config` or input longer than
/// `config.max_text_length` characters.
#[tracing::instrument(skip_all, fields(bytes = text.len()))]
pub fn analyze(
    text: &str,
    config: &AnalysisConfig,
    canon: &Canon,
    modules: &Modules,
) -> Result<Report> {
    config.validate()?;
    let characters = text.chars().count();
    if characters > config.max_text_length {
        return Err(MetricsError::TextTooLong {
            len: characters,
            max: config.max_text_length,
        });
    }

    let doc = Document::new(text);
    let tokens = doc.tokens();
    tracing::debug!(
        sentences = doc.sentences().len(),
        tokens = tokens.len(),
        "document ready"
    );

    let run = |m: Module| modules.contains(m);

    let emotion = run(Module::Emotion)
        .then(|| emotion::analyze_emotion_arc(doc.sentences(), config.rolling_window.get()));
    let readability = run(Module::Readability).then(|| readability::analyze_readability(&doc));
    let diversity = run(Module::Diversity).then(|| {
        diversity::analyze_diversity(&tokens, config.ttr_window, config.mtld_threshold)
    });
    // Counted before right-trimming so trailing spaces and tabs stay visible.
    let mechanics = run(Module::Mechanics).then(|| {
        mechanics::analyze_mechanics(
            &normalize_line_endings(text),
            config.repetition_window,
            config.repetition_threshold,
        )
    });
    let continuity = run(Module::Continuity).then(|| {
        continuity::analyze_continuity(
            &doc,
            canon,
            config.variant_min_len,
            config.similarity_cutoff,
        )
    });
    let dialogue = run(Module::Dialogue).then(|| dialogue::analyze_dialogue(doc.text(), canon));
    let beats = run(Module::Beats).then(|| beats::analyze_beats(doc.sentences(), config.beat_top_k));
    let structure =
        run(Module::Structure).then(|| structure::analyze_structure(&doc, config.words_per_minute));

    Ok(Report {
        lexicon_version: LEXICON_VERSION,
        characters,
        config: config.clone(),
        modules: modules.iter().collect(),
        emotion,
        readability,
        diversity,
        mechanics,
        continuity,
        dialogue,
        beats,
        structure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrequested_modules_are_absent() {
        let modules = Modules::only([Module::Emotion]);
        let report = analyze("Calm.", &AnalysisConfig::default(), &Canon::new(), &modules).unwrap();
        assert!(report.emotion.is_some());
        assert!(report.readability.is_none());
        assert!(report.structure.is_none());
        assert_eq!(report.modules, vec![Module::Emotion]);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn spans_record_their_settings() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NEW)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            analyze("Calm. Quiet.", &AnalysisConfig::default(), &Canon::new(), &Modules::all())
                .unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        for field in ["window=5", "window=200", "top_k=3", "words_per_minute=250"] {
            assert!(logs.contains(field), "missing {field} in:\n{logs}");
        }
    }

    #[test]
    fn length_limit_counts_characters() {
        let config = AnalysisConfig {
            max_text_length: 3,
            ..AnalysisConfig::default()
        };
        assert!(analyze("\u{00E9}\u{00E9}\u{00E9}", &config, &Canon::new(), &Modules::all()).is_ok());
        let err = analyze("abcd", &config, &Canon::new(), &Modules::all()).unwrap_err();
        assert!(matches!(err, MetricsError::TextTooLong { len: 4, max: 3 }));
    }
}
