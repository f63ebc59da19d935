use std::io::Cursor;

use pdfanon_application::{Pipeline, anonymize};
use pdfanon_core::{
    ExtractedWord, FontMetrics, Helvetica, MIN_FONT_SIZE, PageGeometry, RedactError,
    RedactionConfig,
};
use pdfanon_storage::{ConfigFile, Overrides, resolve};
use pdfanon_test::{
    FakeBackend, FakeDocument, FakePage, LETTER, input_path, line_of_words, single_line_document,
};

fn redact_line(texts: &[&str], config: &RedactionConfig) -> anyhow::Result<Vec<String>> {
    let backend = FakeBackend::new();
    let (bytes, _) = Pipeline::new(&backend, config)?.run(single_line_document(texts).to_bytes()?)?;
    let output = FakeDocument::from_bytes(&bytes)?;
    Ok(output.pages[0]
        .drawn_texts()
        .into_iter()
        .map(str::to_string)
        .collect())
}

#[test]
fn adjacent_terms_stay_separate_words() -> anyhow::Result<()> {
    let config = RedactionConfig::with_terms(["John", "Doe"]);
    assert_eq!(
        redact_line(&["Hello", "John", "Doe!"], &config)?,
        vec!["Hello", "[REDACTED]", "[REDACTED]!"]
    );
    Ok(())
}

#[test]
fn only_whole_words_match_in_any_case() -> anyhow::Result<()> {
    let config = RedactionConfig::with_terms(["fix"]);
    assert_eq!(
        redact_line(&["fix", "and", "suffix", "Fix"], &config)?,
        vec!["[REDACTED]", "and", "suffix", "[REDACTED]"]
    );
    Ok(())
}

#[test]
fn alphanumeric_tokens_are_redacted_with_their_edge_symbols() -> anyhow::Result<()> {
    let config = RedactionConfig {
        anonymize_alphanumeric: true,
        ..RedactionConfig::default()
    };
    assert_eq!(
        redact_line(&["My", "code", "is", "abc123", "and", "xy6z890."], &config)?,
        vec!["My", "code", "is", "[REDACTED]", "and", "[REDACTED]"]
    );
    Ok(())
}

#[test]
fn special_characters_count_only_inside_a_token() -> anyhow::Result<()> {
    let config = RedactionConfig {
        anonymize_letters_special: true,
        ..RedactionConfig::default()
    };
    assert_eq!(
        redact_line(&["-JohnLongLong", "jane@mail.com", "(someone)"], &config)?,
        vec!["-JohnLongLong", "[REDACTED]", "(someone)"]
    );
    Ok(())
}

#[test]
fn the_replacement_is_never_redacted_again() -> anyhow::Result<()> {
    let config = RedactionConfig::with_terms(["REDACTED"]).with_all_heuristics();
    assert_eq!(
        redact_line(&["REDACTED", "redacted."], &config)?,
        vec!["[REDACTED]", "[REDACTED]."]
    );
    Ok(())
}

#[test]
fn drawn_text_is_fitted_and_centered_on_each_word_box() -> anyhow::Result<()> {
    let config = RedactionConfig::with_terms(["Jo", "secret"]).with_all_heuristics();
    let source = FakeDocument::new(vec![FakePage::new(
        LETTER,
        vec![
            ExtractedWord::new("Jo", 72.0, 100.0, 11.0, 12.0),
            ExtractedWord::new("secret", 120.0, 100.0, 35.0, 12.0),
            ExtractedWord::new("x9y8z7w6", 200.0, 300.0, 1.0, 9.0),
            ExtractedWord::new("plain", 300.0, 700.5, 27.0, 10.0),
        ],
    )]);
    let backend = FakeBackend::new();
    let (bytes, _) = Pipeline::new(&backend, &config)?.run(source.to_bytes()?)?;
    let output = FakeDocument::from_bytes(&bytes)?;

    let page = &output.pages[0];
    assert_eq!(page.draws.len(), source.pages[0].words.len());
    for (draw, word) in page.draws.iter().zip(&source.pages[0].words) {
        assert_eq!(draw.font, Helvetica::NAME);
        assert!(draw.size >= MIN_FONT_SIZE, "{draw:?}");

        let drawn = Helvetica.measure_width(&draw.text, draw.size);
        let left = draw.x - word.x0;
        let right = word.x1() - (draw.x + drawn);
        assert!((left - right).abs() < 1e-3, "{draw:?}");

        let box_bottom = LETTER.height - word.bottom;
        let below = draw.y - box_bottom;
        let above = box_bottom + word.height - (draw.y + draw.size);
        assert!((below - above).abs() < 1e-3, "{draw:?}");
    }
    Ok(())
}

#[test]
fn page_count_and_blank_page_sizes_are_preserved() -> anyhow::Result<()> {
    let a4 = PageGeometry::new(595.0, 842.0);
    let small = PageGeometry::new(300.0, 400.0);
    let source = FakeDocument::new(vec![
        FakePage::new(LETTER, line_of_words(&["first", "page"], 72.0, 100.0, 12.0)),
        FakePage::blank(small),
        FakePage::new(a4, line_of_words(&["third"], 50.0, 60.0, 14.0)),
    ]);
    let backend = FakeBackend::new();
    let (bytes, summary) =
        Pipeline::new(&backend, &RedactionConfig::default())?.run(source.to_bytes()?)?;
    let output = FakeDocument::from_bytes(&bytes)?;

    assert_eq!(output.pages.len(), 3);
    let geometries: Vec<_> = output.pages.iter().map(|p| p.geometry).collect();
    assert_eq!(geometries, vec![LETTER, small, a4]);
    assert!(output.pages[1].draws.is_empty());
    assert_eq!(output.pages[2].drawn_texts(), vec!["third"]);

    assert_eq!(summary.pages, 3);
    assert_eq!(summary.words, 3);
    let numbers: Vec<_> = summary.per_page.iter().map(|p| p.page).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn runs_are_deterministic() -> anyhow::Result<()> {
    let config = RedactionConfig::with_terms(["Doe"]).with_all_heuristics();
    let input = single_line_document(&["Jane", "Doe", "ID", "A1B2C3", "2024-01-17"]).to_bytes()?;
    let backend = FakeBackend::new();
    let pipeline = Pipeline::new(&backend, &config)?;
    let (first, _) = pipeline.run(input.clone())?;
    let (second, _) = pipeline.run(input)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn multi_word_terms_from_a_config_file() -> anyhow::Result<()> {
    let file = ConfigFile::parse(
        r#"
        terms = ["Secret Company"]
        "#,
    )?;
    let config = resolve(&file, &Overrides::default())?;
    assert_eq!(
        redact_line(&["Please", "contact", "Secret", "Company.", "ID:", "A1B2C3"], &config)?,
        vec!["Please", "contact", "[REDACTED]", "[REDACTED].", "ID:", "[REDACTED]"]
    );
    Ok(())
}

#[test]
fn a_failing_page_aborts_the_whole_run() -> anyhow::Result<()> {
    let source = FakeDocument::new(vec![
        FakePage::new(LETTER, line_of_words(&["one"], 72.0, 100.0, 12.0)),
        FakePage::new(LETTER, line_of_words(&["two"], 72.0, 100.0, 12.0)),
    ]);
    let backend = FakeBackend {
        fail_on_page: Some(1),
        ..FakeBackend::default()
    };
    let err = Pipeline::new(&backend, &RedactionConfig::default())?
        .run(source.to_bytes()?)
        .unwrap_err();
    assert!(matches!(err, RedactError::Extraction { .. }));
    assert!(err.to_string().contains("page 2"));
    Ok(())
}

#[test]
fn stream_output_is_untouched_on_failure() -> anyhow::Result<()> {
    let config = RedactionConfig::with_terms(["secret"]);
    let input = single_line_document(&["a", "secret"]).to_bytes()?;

    let backend = FakeBackend::new();
    let mut output = Vec::new();
    let summary = Pipeline::new(&backend, &config)?.run_stream(Cursor::new(&input), &mut output)?;
    assert_eq!(summary.redacted, 1);
    assert_eq!(FakeDocument::from_bytes(&output)?.pages.len(), 1);

    let failing = FakeBackend {
        fail_on_text: Some("[REDACTED]".to_string()),
        ..FakeBackend::default()
    };
    let mut output = Vec::new();
    let err = Pipeline::new(&failing, &config)?
        .run_stream(Cursor::new(&input), &mut output)
        .unwrap_err();
    assert!(matches!(err, RedactError::Render { .. }));
    assert!(output.is_empty());
    Ok(())
}

#[test]
fn file_run_writes_output_and_creates_parents() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = input_path(dir.path(), "in.pdf", &single_line_document(&["John", "Smith"]))?;
    let output = dir.path().join("out/nested/in_anonymized.pdf");

    let config = RedactionConfig::with_terms(["smith"]);
    let summary = anonymize(&FakeBackend::new(), &config, &input, &output)?;
    assert_eq!((summary.pages, summary.words, summary.redacted), (1, 2, 1));

    let written = FakeDocument::read_from(&output)?;
    assert_eq!(written.pages[0].drawn_texts(), vec!["John", "[REDACTED]"]);
    Ok(())
}

#[test]
fn missing_input_produces_nothing() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("absent.pdf");
    let output = dir.path().join("out/absent_anonymized.pdf");

    let err = anonymize(&FakeBackend::new(), &RedactionConfig::default(), &input, &output)
        .unwrap_err();
    assert!(matches!(err, RedactError::InputNotFound(ref path) if *path == input));
    assert!(!output.exists());
    assert!(!dir.path().join("out").exists());
    Ok(())
}

#[test]
fn bad_configuration_fails_before_touching_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = RedactionConfig {
        replacement: String::new(),
        ..RedactionConfig::default()
    };
    let err = anonymize(
        &FakeBackend::new(),
        &config,
        &dir.path().join("absent.pdf"),
        &dir.path().join("out.pdf"),
    )
    .unwrap_err();
    assert!(matches!(err, RedactError::Configuration(_)));
    Ok(())
}

#[test]
fn failures_leave_an_existing_output_alone() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = input_path(dir.path(), "in.pdf", &single_line_document(&["top", "secret"]))?;
    let output = dir.path().join("out.pdf");
    std::fs::write(&output, b"previous run")?;

    let backend = FakeBackend {
        fail_on_text: Some("[REDACTED]".to_string()),
        ..FakeBackend::default()
    };
    let err = anonymize(
        &backend,
        &RedactionConfig::with_terms(["secret"]),
        &input,
        &output,
    )
    .unwrap_err();
    assert!(matches!(err, RedactError::Render { .. }));
    assert_eq!(std::fs::read(&output)?, b"previous run");

    let names: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .collect();
    assert_eq!(names.len(), 2);
    Ok(())
}

#[test]
fn a_short_output_document_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let source = FakeDocument::new(vec![FakePage::blank(LETTER), FakePage::blank(LETTER)]);
    let input = input_path(dir.path(), "in.pdf", &source)?;
    let output = dir.path().join("out.pdf");

    let backend = FakeBackend {
        drop_last_page: true,
        ..FakeBackend::default()
    };
    let err = anonymize(&backend, &RedactionConfig::default(), &input, &output).unwrap_err();
    assert!(matches!(err, RedactError::Render { .. }));
    assert!(err.to_string().contains("1 pages"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn corrupt_input_is_an_extraction_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("broken.pdf");
    std::fs::write(&input, b"%PDF-1.4 truncated")?;
    let output = dir.path().join("broken_anonymized.pdf");

    let err = anonymize(&FakeBackend::new(), &RedactionConfig::default(), &input, &output)
        .unwrap_err();
    assert!(matches!(err, RedactError::Extraction { .. }));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn page_count_falls_back_to_the_extractor() -> anyhow::Result<()> {
    let source = FakeDocument::new(vec![
        FakePage::new(LETTER, line_of_words(&["one", "abc123"], 72.0, 100.0, 12.0)),
        FakePage::blank(LETTER),
    ]);
    let backend = FakeBackend {
        fail_page_count: true,
        ..FakeBackend::default()
    };
    let config = RedactionConfig::default().with_all_heuristics();
    let (bytes, summary) = Pipeline::new(&backend, &config)?.run(source.to_bytes()?)?;

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.redacted, 1);
    let output = FakeDocument::from_bytes(&bytes)?;
    assert_eq!(output.pages.len(), 2);
    assert_eq!(output.pages[0].drawn_texts(), vec!["one", "[REDACTED]"]);
    Ok(())
}

#[test]
fn fallback_count_still_catches_a_short_output() -> anyhow::Result<()> {
    let source = FakeDocument::new(vec![FakePage::blank(LETTER), FakePage::blank(LETTER)]);
    let backend = FakeBackend {
        fail_page_count: true,
        drop_last_page: true,
        ..FakeBackend::default()
    };
    let err = Pipeline::new(&backend, &RedactionConfig::default())?
        .run(source.to_bytes()?)
        .unwrap_err();
    assert!(matches!(err, RedactError::Render { .. }));
    assert!(err.to_string().contains("output has 1 pages"));
    Ok(())
}

#[test]
fn terms_with_inner_punctuation_redact_every_word() -> anyhow::Result<()> {
    let config = RedactionConfig::with_terms(["Smith, John", "J. Doe"]);
    assert_eq!(
        redact_line(&["Dear", "Smith,", "John", "and", "J.", "Doe."], &config)?,
        vec!["Dear", "[REDACTED]", "[REDACTED]", "and", "[REDACTED]", "[REDACTED]."]
    );
    Ok(())
}
