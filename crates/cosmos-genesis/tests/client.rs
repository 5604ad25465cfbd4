mod common;

use common::{RecordingExecutor, ScriptedService, cell, row};
use cosmos_genesis::{
    ClientConfig, CosmosClient, CosmosError, ExecutionStatus, PollingExecutor, QueryBuilder,
    ResultSet, SortDirection, select_from,
};
use std::time::Duration;

fn star_rows() -> ResultSet {
    ResultSet::new(
        vec!["system_id".into(), "stellar_mass_msun".into()],
        vec![vec![cell("17"), cell("12.4")], vec![cell("42"), None]],
    )
}

#[tokio::test]
async fn query_galaxy_scopes_raw_sql() {
    let client = CosmosClient::with_executor(RecordingExecutor::new(star_rows()));

    let records = client
        .query_galaxy(
            "spiral-sm-2arm-001",
            "SELECT system_id, stellar_mass_msun FROM star WHERE stellar_mass_msun > 10 LIMIT 100",
            0,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].try_get::<u32>("system_id").unwrap(), 17);
    assert_eq!(records[1].get("stellar_mass_msun"), None);

    let calls = client.executor().calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "cosmological_production");
    assert_eq!(
        calls[0].1,
        "SELECT system_id, stellar_mass_msun FROM star WHERE galaxy_id = 'spiral-sm-2arm-001' AND (stellar_mass_msun > 10) LIMIT 100"
    );
}

#[tokio::test]
async fn query_galaxy_builder_adds_time_filter() {
    let client = CosmosClient::with_executor(RecordingExecutor::new(star_rows()));
    let qb = select_from("star")
        .unwrap()
        .select(["system_id", "stellar_mass_msun"])
        .unwrap()
        .order_by("stellar_mass_msun", SortDirection::Desc)
        .unwrap()
        .limit(10)
        .unwrap();

    client
        .query_galaxy_builder("elliptical-lg-007", &qb, 4600)
        .await
        .unwrap();

    assert_eq!(
        client.executor().last_sql().unwrap(),
        "SELECT system_id, stellar_mass_msun FROM star WHERE galaxy_id = 'elliptical-lg-007' AND universe_time = 4600 ORDER BY stellar_mass_msun DESC LIMIT 10"
    );
}

#[tokio::test]
async fn incomplete_builder_never_reaches_executor() {
    let client = CosmosClient::with_executor(RecordingExecutor::new(ResultSet::default()));
    let qb = QueryBuilder::new().select(["system_id"]).unwrap();

    let err = client.execute_builder(&qb).await.unwrap_err();
    assert!(err.is_incomplete());
    assert_eq!(client.executor().call_count(), 0);

    let err = client.query_galaxy_builder("", &qb, 0).await.unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(client.executor().call_count(), 0);
}

#[tokio::test]
async fn execute_runs_against_configured_database() {
    let config = ClientConfig::new().database("cosmological_staging").unwrap();
    let client = CosmosClient::new(RecordingExecutor::new(star_rows()), config);

    let qb = select_from("star").unwrap();
    let rs = client.execute_builder(&qb).await.unwrap();
    assert_eq!(rs.len(), 2);

    let calls = client.executor().calls.lock().unwrap().clone();
    assert_eq!(calls[0], ("cosmological_staging".to_string(), "SELECT * FROM star".to_string()));

    assert!(client.execute("  ").await.unwrap_err().is_invalid_argument());
}

#[tokio::test]
async fn list_galaxies_parses_counts() {
    let rs = ResultSet::new(
        vec!["galaxy_id".into(), "system_count".into()],
        vec![
            vec![cell("elliptical-lg-007"), cell("1200")],
            vec![cell("spiral-sm-2arm-001"), cell("845")],
        ],
    );
    let client = CosmosClient::with_executor(RecordingExecutor::new(rs));

    let galaxies = client.list_galaxies().await.unwrap();
    assert_eq!(galaxies.len(), 2);
    assert_eq!(galaxies[0].galaxy_id, "elliptical-lg-007");
    assert_eq!(galaxies[0].system_count, 1200);
    assert_eq!(galaxies[1].system_count, 845);
    assert!(
        client
            .executor()
            .last_sql()
            .unwrap()
            .contains("FROM cosmological_production.starsystem GROUP BY galaxy_id")
    );
}

#[tokio::test]
async fn list_galaxies_rejects_bad_count() {
    let rs = ResultSet::new(
        vec!["galaxy_id".into(), "system_count".into()],
        vec![vec![cell("spiral-sm-2arm-001"), cell("many")]],
    );
    let client = CosmosClient::with_executor(RecordingExecutor::new(rs));

    let err = client.list_galaxies().await.unwrap_err();
    assert!(matches!(err, CosmosError::Decode { ref column, .. } if column == "system_count"));
}

#[tokio::test(start_paused = true)]
async fn client_timeout_cuts_slow_executor() {
    let executor = RecordingExecutor::new(star_rows()).with_delay(Duration::from_secs(30));
    let config = ClientConfig::new().timeout(Duration::from_secs(2));
    let client = CosmosClient::new(executor, config);

    let err = client.execute("SELECT * FROM star").await.unwrap_err();
    assert_eq!(err, CosmosError::Timeout(Duration::from_secs(2)));
}

#[tokio::test(start_paused = true)]
async fn client_over_polling_executor() {
    let service = ScriptedService::new(vec![ExecutionStatus::Running], ExecutionStatus::Succeeded)
        .with_pages(vec![vec![
            row(&["galaxy_id", "system_count"]),
            row(&["barred-md-003", "77"]),
        ]]);
    let config = ClientConfig::new()
        .poll_interval(Duration::from_millis(500))
        .unwrap();
    let client = CosmosClient::new(PollingExecutor::with_config(service, &config), config);

    let galaxies = client.list_galaxies().await.unwrap();
    assert_eq!(galaxies.len(), 1);
    assert_eq!(galaxies[0].galaxy_id, "barred-md-003");
    assert_eq!(galaxies[0].system_count, 77);

    let request = client.executor().service().last_request().unwrap();
    assert_eq!(request.dataset, "cosmological_production");
}

#[tokio::test]
async fn independent_builders_across_tasks() {
    let base = select_from("star").unwrap();

    let handles: Vec<_> = ["O", "B", "A"]
        .into_iter()
        .map(|spectral| {
            let qb = base.clone();
            tokio::spawn(async move {
                qb.r#where(&format!("spectral_type = '{spectral}'"))
                    .unwrap()
                    .build()
                    .unwrap()
            })
        })
        .collect();

    let mut out = Vec::new();
    for h in handles {
        out.push(h.await.unwrap());
    }

    assert_eq!(out[0], "SELECT * FROM star WHERE spectral_type = 'O'");
    assert_eq!(out[2], "SELECT * FROM star WHERE spectral_type = 'A'");
    assert_eq!(base.build().unwrap(), "SELECT * FROM star");
}
