use serde_json::json;
use std::num::NonZeroU32;
use trolley::{Step, Swarm};
use trolley_core::{SwarmConfig, ThinkTime};
use trolley_tests::*;

fn fast(config: SwarmConfig) -> SwarmConfig {
    config
        .spawn_rate(NonZeroU32::new(100).unwrap())
        .think_time(ThinkTime::none())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn swarm_completes_its_iterations() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    let config = fast(gateway.config()?).users(4).iterations(2);

    let stats = Swarm::from_config(config)?.run().await?;

    assert_eq!(stats.users, 4);
    assert_eq!(stats.iterations, 8);
    assert_eq!(stats.total_requests(), 40);
    assert!(!stats.has_failures(), "{stats}");
    assert_eq!(gateway.state.total_hits(), 40);
    assert_eq!(gateway.state.hits(PRODUCT), 8);
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn swarm_reports_shape_failures() -> anyhow::Result<()> {
    let gateway = Gateway::start().await?;
    gateway.state.set_json(
        PAYMENTS,
        200,
        json!({"collection": [{"order": {"orderId": 1}}]}),
    );
    let config = fast(gateway.config()?).users(2).iterations(1);

    let stats = Swarm::from_config(config)?.run().await?;

    let payments = stats.step(Step::CheckPayments.label()).expect("payments label");
    assert_eq!(payments.failure_count(), 2);
    assert_eq!(
        payments.failures().collect::<Vec<_>>(),
        vec![("Payload missing fields: paymentStatus", 2)]
    );
    assert!(stats.has_failures());
    assert!(stats.to_string().contains("Payload missing fields: paymentStatus"));
    Ok(())
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn unreachable_gateway_fails_every_request() -> anyhow::Result<()> {
    init();
    let addr = closed_addr().await?;
    let config = fast(SwarmConfig::new(&format!("http://{addr}"))?)
        .users(1)
        .iterations(1);

    let stats = Swarm::from_config(config)?.run().await?;

    // No id is ever stored, so the detail step is skipped.
    assert_eq!(stats.total_requests(), 4);
    assert_eq!(stats.total_failures(), 4);
    assert_eq!(
        stats.step(Step::ViewProductDetails.label()).map(|s| s.total()),
        Some(0)
    );
    Ok(())
}
