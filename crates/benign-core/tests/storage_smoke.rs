use benign_core::storage::{AttemptRow, Store};
use tempfile::tempdir;

#[test]
fn audit_store_survives_reopen() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let db_path = dir.path().join("nested").join("benign.db");

    {
        let store = Store::open(&db_path)?;
        store.init_schema()?;
        let run = store.create_run("explain", "abc")?;
        store.insert_attempt(
            run,
            &AttemptRow {
                item_id: "j1::m".into(),
                model: "m".into(),
                attempt_no: 1,
                status: "error".into(),
                latency_ms: Some(12),
                error: Some("rate limited".into()),
            },
        )?;
        store.finalize_run(run, "completed_with_failures")?;
    }

    let store = Store::open(&db_path)?;
    store.init_schema()?;
    let stats = store.stats_best_effort()?;
    assert_eq!(stats.runs, Some(1));
    assert_eq!(stats.attempts, Some(1));
    let runs = store.recent_runs(5)?;
    assert_eq!(runs[0].stage, "explain");
    assert_eq!(runs[0].failed_attempts, 1);
    Ok(())
}
