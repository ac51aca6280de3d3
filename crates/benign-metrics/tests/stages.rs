use benign_core::coding::code_records;
use benign_core::config::LengthBounds;
use benign_core::engine::{ExplanationCollector, RunAudit};
use benign_core::errors::ProviderErrorKind;
use benign_core::model::{ApiInfo, Category, JokeRecord, JokeStatus, ModelSpec, Provider};
use benign_core::parse::parse_joke;
use benign_core::providers::llm::fake::{FakeClient, FakeReply};
use benign_core::providers::llm::{Clients, LlmClient};
use benign_core::storage::Store;
use benign_metrics::{analyze_all, KeywordCoder, SurpriseAnalyzer};
use std::sync::Arc;

fn joke(i: usize, category: Category, raw: &str) -> JokeRecord {
    let mut j = JokeRecord {
        id: format!("gen_{}_t0.7_{}", category, i),
        timestamp: String::new(),
        model: "gen".into(),
        model_name: "gen".into(),
        category,
        temperature: 0.7,
        prompt_index: i,
        prompt: String::new(),
        raw_response: Some(raw.into()),
        setup: String::new(),
        punchline: String::new(),
        full_text: raw.trim().into(),
        word_counts: None,
        status: JokeStatus::ParseFailed,
        parse_error: None,
        api: ApiInfo::default(),
        manual_ratings: None,
    };
    if let Ok(p) = parse_joke(raw) {
        j.setup = p.setup;
        j.punchline = p.punchline;
        j.status = JokeStatus::Parsed;
    }
    j
}

#[tokio::test]
async fn surprise_failures_stay_local() -> anyhow::Result<()> {
    let jokes = [
        joke(0, Category::Linguistic, "Setup: Why is six afraid of seven? Punchline: Because seven ate nine."),
        joke(1, Category::Physical, "Setup: I tripped over my shadow. Punchline: It was a dark day."),
    ];
    let refs: Vec<&JokeRecord> = jokes.iter().collect();
    let client = Arc::new(FakeClient::new("guesser").with_script([
        FakeReply::Fail(ProviderErrorKind::RateLimit),
        FakeReply::Fail(ProviderErrorKind::RateLimit),
        FakeReply::Text("Because seven ate nine.".into()),
    ]));

    let store = Store::memory()?;
    let mut analyzer = SurpriseAnalyzer::new(client.clone(), "guesser");
    analyzer.audit = Some(RunAudit::start(store.clone(), "surprise", "fp")?);
    let records = analyzer.analyze(&refs).await;

    assert_eq!(records.len(), 2);
    assert!(!records[0].success);
    assert!(records[0].surprise_score.is_none());
    assert!(records[0].error.is_some());
    assert!(records[1].success);
    let s = records[1].surprise_score.unwrap();
    assert!((0.0..=1.0).contains(&s));
    assert_eq!(client.calls(), 3);
    assert_eq!(store.recent_runs(1)?[0].status, "completed_with_failures");
    Ok(())
}

#[tokio::test]
async fn explanations_get_keyword_codes() -> anyhow::Result<()> {
    let jokes = [joke(0, Category::Dark, "Setup: Why did the ghost skip the party? Punchline: It had no body to go with.")];
    let refs: Vec<&JokeRecord> = jokes.iter().collect();
    let mut clients = Clients::new();
    clients.insert("fake".into(), Arc::new(FakeClient::new("fake")) as Arc<dyn LlmClient>);
    let spec = ModelSpec {
        key: "fake".into(),
        name: "fake".into(),
        provider: Provider::Fake,
        max_tokens: 150,
        description: String::new(),
    };

    let collector = ExplanationCollector {
        clients: &clients,
        temperature: 0.3,
        retries: 0,
        audit: None,
    };
    let mut records = collector.collect(&refs, &[&spec]).await;
    let rows = code_records(&mut records, &KeywordCoder);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].joke_id, jokes[0].id);
    assert!(rows[0].has_semantic);
    assert!(rows[0].has_threat);
    assert_eq!(records[0].codes.map(|c| c.semantic_count), Some(rows[0].semantic_count));
    Ok(())
}

#[test]
fn structural_pass_drops_parse_failures() {
    let jokes = [
        joke(0, Category::Social, "Setup: I waved back at someone. Punchline: They were waving at the person behind me."),
        joke(1, Category::Social, ""),
    ];
    let rows = analyze_all(&jokes, LengthBounds::default());
    assert_eq!(rows.len(), 1);
    assert!(rows[0].structure_valid);
    assert!(rows[0].explicit_format_markers);
}
