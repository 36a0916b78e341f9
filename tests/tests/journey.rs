use serde_json::json;
use trolley::{EventLog, JourneyRunner, ReqwestTransport, Step, StepFailure, StepOutcome};
use trolley_core::SwarmConfig;
use trolley_tests::*;

#[tokio::test]
async fn healthy_gateway_passes_every_step() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    let log = EventLog::new();
    let mut runner = JourneyRunner::new(gateway.transport()?);

    let report = runner.run(&log).await?;

    assert!(report.all_passed(), "{report:?}");
    assert_eq!(runner.product_id(), Some(1));
    assert!(log.failures().is_empty());
    for route in [PRODUCTS, PRODUCT, FAVOURITES, SHIPPINGS, PAYMENTS] {
        assert_eq!(gateway.state.hits(route), 1, "{route}");
    }
    Ok(())
}

#[tokio::test]
async fn server_errors_carry_the_status_code() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    gateway.state.set(FAVOURITES, 500, "{\"msg\":\"boom\"}");
    let log = EventLog::new();
    let mut runner = JourneyRunner::new(gateway.transport()?);

    let report = runner.run(&log).await?;

    assert_eq!(
        report.outcome(Step::ReviewFavourites),
        Some(&StepOutcome::Failed(StepFailure::UnexpectedStatus(500)))
    );
    assert_eq!(
        log.failures(),
        vec![(Step::ReviewFavourites.label(), "Unexpected status 500".to_string())]
    );
    assert_eq!(gateway.state.hits(PAYMENTS), 1);
    Ok(())
}

#[tokio::test]
async fn html_error_page_is_a_json_failure() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    gateway
        .state
        .set(SHIPPINGS, 200, "<html><body>Whitelabel Error Page</body></html>");
    let log = EventLog::new();
    let mut runner = JourneyRunner::new(gateway.transport()?);

    runner.run(&log).await?;

    let failures = log.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, Step::InspectShipping.label());
    assert!(failures[0].1.starts_with("Invalid JSON"));
    Ok(())
}

#[tokio::test]
async fn detail_request_uses_the_catalogue_id() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    gateway.state.set_json(
        PRODUCTS,
        200,
        json!({"collection": [{"productId": 42, "name": "x"}]}),
    );
    gateway
        .state
        .set_json("/product-service/api/products/42", 200, json!({"productId": 99}));
    let log = EventLog::new();
    let mut runner = JourneyRunner::new(gateway.transport()?);

    runner.run(&log).await?;

    assert_eq!(runner.product_id(), Some(42));
    assert_eq!(gateway.state.hits(PRODUCT), 1);
    assert_eq!(
        log.failures(),
        vec![(
            Step::ViewProductDetails.label(),
            "Product endpoint did not return the expected id".to_string()
        )]
    );
    Ok(())
}

#[tokio::test]
async fn empty_catalogue_never_calls_the_detail_route() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    gateway
        .state
        .set_json(PRODUCTS, 200, json!({"collection": []}));
    let log = EventLog::new();
    let mut runner = JourneyRunner::new(gateway.transport()?);

    let report = runner.run(&log).await?;

    assert_eq!(
        report.outcome(Step::ViewProductDetails),
        Some(&StepOutcome::Skipped)
    );
    assert_eq!(gateway.state.hits(PRODUCT), 0);
    assert_eq!(log.failures().len(), 1);
    assert_eq!(gateway.state.total_hits(), 4);
    Ok(())
}

#[tokio::test]
async fn identical_responses_give_identical_runs() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    gateway
        .state
        .set_json(PAYMENTS, 200, json!({"collection": [{"order": {}}]}));
    let mut runner = JourneyRunner::new(gateway.transport()?);

    let first_log = EventLog::new();
    let first = runner.run(&first_log).await?;
    let second_log = EventLog::new();
    let second = runner.run(&second_log).await?;

    assert_eq!(first, second);
    assert_eq!(first_log.events(), second_log.events());
    Ok(())
}

#[tokio::test]
async fn closed_port_is_a_transport_error() -> anyhow::Result<()> {
    init();
    let addr = closed_addr().await?;
    let config = SwarmConfig::new(&format!("http://{addr}"))?;
    let log = EventLog::new();
    let mut runner = JourneyRunner::new(ReqwestTransport::new(&config)?);

    assert!(runner.run(&log).await.is_err());
    assert!(log.events().is_empty());
    Ok(())
}
