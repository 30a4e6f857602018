use std::io::Write;

use manuscript_metrics::lexicon::Emotion;
use manuscript_metrics::{analyze, AnalysisConfig, Canon, MetricsError, Module, Modules, RollingWindow};

fn run(text: &str) -> manuscript_metrics::Report {
    analyze(text, &AnalysisConfig::default(), &Canon::new(), &Modules::all()).unwrap()
}

const CHAPTER: &str = "Thea arrived at the Blackwood Inn on Monday. The routine was ordinary and quiet.

She found a mysterious message under the door. Katherine had gone missing!

But the storm grew worse, and then the road flooded. However, Thea decided she must stay.

***

At midnight she had to confront the truth. Katharine was dead, and Thea screamed.

Finally, morning came. Who had locked the door?";

#[test]
fn emotion_scenario_through_pipeline() {
    let config = AnalysisConfig {
        rolling_window: RollingWindow::try_from(3i64).unwrap(),
        ..AnalysisConfig::default()
    };
    let text = "I am happy today. But yesterday I was sad. Tomorrow will be better!";
    let report = analyze(text, &config, &Canon::new(), &Modules::all()).unwrap();
    let arc = report.emotion.unwrap();
    assert_eq!(arc.summary.sentences, 3);
    assert!(arc.scores[0].valence_raw > 0);
    assert!(arc.scores[1].valence_raw < 0);
    assert!(arc.summary.top_emotions.contains(&Emotion::Joy));
    assert!(arc.summary.top_emotions.contains(&Emotion::Sadness));
    assert_eq!(arc.window, 3);
}

#[test]
fn empty_input_is_a_valid_report() {
    let report = run("");
    let arc = report.emotion.as_ref().unwrap();
    assert_eq!(arc.summary.sentences, 0);
    assert_eq!(arc.summary.avg_valence, 0.0);
    assert!(arc.valence_rolling.is_empty());
    assert!(arc.emotions_rolling.values().all(Vec::is_empty));

    let style = report.readability.as_ref().unwrap();
    assert_eq!(style.flesch_reading_ease, 0.0);
    assert_eq!(style.flesch_kincaid_grade, 0.0);
    assert_eq!(style.gunning_fog, 0.0);

    let diversity = report.diversity.as_ref().unwrap();
    assert_eq!(diversity.ttr, 0.0);
    assert_eq!(diversity.mtld_approx, 0.0);

    assert_eq!(report.structure.as_ref().unwrap().scenes, 0);
    assert!(report.beats.as_ref().unwrap().values().all(Vec::is_empty));
}

#[test]
fn immediate_duplicate_word() {
    let report = run("the the cat sat.");
    let dups = &report.mechanics.unwrap().repetition.immediate_duplicates;
    assert_eq!(dups, &vec![("the".to_string(), 1)]);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let a = serde_json::to_string(&run(CHAPTER)).unwrap();
    let b = serde_json::to_string(&run(CHAPTER)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn chapter_report_has_every_section() {
    let value = serde_json::to_value(run(CHAPTER)).unwrap();
    for key in [
        "lexicon_version",
        "config",
        "emotion",
        "readability",
        "diversity",
        "mechanics",
        "continuity",
        "dialogue",
        "beats",
        "structure",
    ] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    let rolling = &value["emotion"]["emotions_rolling"];
    for emotion in Emotion::ALL {
        assert!(rolling.get(emotion.as_str()).is_some());
    }
    assert!(value["beats"].get("crisis_climax").is_some());
}

#[test]
fn chapter_structure_and_continuity() {
    let mut canon = Canon::new();
    canon
        .add_json_str(r#"{"canon":[{"name":"Thea"},{"name":"Blackwood Inn","aliases":["the Inn"]}]}"#)
        .unwrap();
    let report = analyze(CHAPTER, &AnalysisConfig::default(), &canon, &Modules::all()).unwrap();

    let continuity = report.continuity.unwrap();
    assert_eq!(continuity.canon["Thea"].total, 3);
    assert_eq!(continuity.canon["Blackwood Inn"].aliases["Blackwood Inn"], 1);
    assert!(!continuity.canon["Blackwood Inn"].aliases.contains_key("the Inn"));
    assert!(continuity
        .probable_variants
        .iter()
        .any(|p| p.a == "Katharine" && p.b == "Katherine"));
    assert_eq!(continuity.time_markers.weekdays, vec!["monday"]);

    let structure = report.structure.unwrap();
    assert_eq!(structure.scene_boundaries, vec![0, 4]);
    assert_eq!(structure.scenes, 2);
    assert_eq!(structure.paragraphs, 5);
    assert_eq!(structure.last_sentence.as_deref(), Some("Who had locked the door?"));
    assert_eq!(structure.hook_score, 0.6);

    let beats = report.beats.unwrap();
    let inciting = &beats[&manuscript_metrics::beats::Beat::Inciting];
    assert!(!inciting.is_empty());
    assert!(inciting.len() <= 3);
}

#[test]
fn only_selected_modules_serialize() {
    let modules: Modules = "mechanics".parse().unwrap();
    let report = analyze(CHAPTER, &AnalysisConfig::default(), &Canon::new(), &modules).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert!(value.get("mechanics").is_some());
    assert!(value.get("emotion").is_none());
    assert_eq!(report.modules, vec![Module::Mechanics]);
}

#[test]
fn non_positive_window_is_rejected() {
    let err = RollingWindow::try_from(0i64).unwrap_err();
    assert!(matches!(err, MetricsError::InvalidWindow { value: 0, .. }));
    assert!(RollingWindow::try_from(-2i64).is_err());
}

#[test]
fn oversized_input_is_rejected() {
    let config = AnalysisConfig {
        max_text_length: 10,
        ..AnalysisConfig::default()
    };
    let err = analyze("far too long for this", &config, &Canon::new(), &Modules::all()).unwrap_err();
    assert!(err.to_string().contains("too long"), "{err}");
}

#[test]
fn invalid_config_fails_before_scoring() {
    let config = AnalysisConfig {
        beat_top_k: 0,
        ..AnalysisConfig::default()
    };
    assert!(analyze("Fine.", &config, &Canon::new(), &Modules::all()).is_err());
}

#[test]
fn config_and_canon_files() {
    let dir = tempfile::tempdir().unwrap();

    let config_path = dir.path().join("metrics.toml");
    let mut f = std::fs::File::create(&config_path).unwrap();
    writeln!(f, "rolling_window = 2\nbeat_top_k = 1").unwrap();
    let config = AnalysisConfig::from_file(&config_path).unwrap();
    assert_eq!(config.rolling_window.get(), 2);

    let csv_path = dir.path().join("canon.csv");
    std::fs::write(&csv_path, "Thea,Declan\nKatherine\n").unwrap();
    let mut canon = Canon::new();
    canon.load_csv_file(&csv_path).unwrap();
    assert_eq!(canon.len(), 3);

    let report = analyze(CHAPTER, &config, &canon, &Modules::all()).unwrap();
    assert_eq!(report.emotion.unwrap().window, 2);
    assert!(report.beats.unwrap().values().all(|hits| hits.len() <= 1));
    let continuity = report.continuity.unwrap();
    assert_eq!(continuity.canon["Katherine"].total, 1);
    assert!(!continuity.canon.contains_key("Declan"));
}

#[test]
fn missing_canon_file_is_io_error() {
    let mut canon = Canon::new();
    let err = canon
        .load_json_file(std::path::Path::new("/nonexistent/canon.json"))
        .unwrap_err();
    assert!(matches!(err, MetricsError::Io(_)));
}

#[test]
fn dialogue_through_pipeline() {
    let text = "Thea set down the lamp.\n\n\u{201C}Who locked it?\u{201D} Thea asked. \u{201C}Not me,\u{201D} she snapped.";
    let mut canon = Canon::new();
    canon.add_inline("Thea, Enid");
    let report = analyze(text, &AnalysisConfig::default(), &canon, &Modules::all()).unwrap();
    let dialogue = report.dialogue.unwrap();
    assert_eq!(dialogue.dialogue_lines, 2);
    assert_eq!(dialogue.attributed_by_name, vec![("Thea".to_string(), 1)]);
    assert_eq!(dialogue.unattributed_lines, 1);
    assert_eq!(dialogue.neutral_tags.count, 1);
    assert_eq!(dialogue.ornate_tags.top, vec![("snapped".to_string(), 2)]);
    assert_eq!(dialogue.character_mentions, vec![("Thea".to_string(), 2)]);
}

#[test]
fn malformed_canon_entries_do_not_block_the_rest() {
    let mut canon = Canon::new();
    canon
        .add_json_str(r#"{"canon":[{"aliases":["Theia"]},{"name":"Thea","aliases":["Theia",null]}]}"#)
        .unwrap();
    assert_eq!(canon.len(), 1);
    let report = analyze(CHAPTER, &AnalysisConfig::default(), &canon, &Modules::all()).unwrap();
    assert_eq!(report.continuity.unwrap().canon["Thea"].total, 3);
}
