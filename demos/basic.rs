use dream::{Store, StoreConfig};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (DEBUG level to watch the sweeper work)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into())
        )
        .init();

    let plain = Store::new();
    plain.put("foo", "bar");
    plain.put("blah", 100i64);
    info!("foo={}", plain.get_string("foo"));

    plain.delete("blah");
    plain.delete("blah");
    info!("blah={}", plain.get_i64("blah"));

    let config = StoreConfig::from_json(r#"{ "cleanup_interval_ms": 50 }"#)?;
    let expiring = Store::with_config(config);

    expiring.put("foo", true);
    expiring.put("bar", true);
    info!("before sweep: foo={} bar={}", expiring.get_bool("foo"), expiring.get_bool("bar"));

    tokio::time::sleep(Duration::from_millis(150)).await;
    info!("after sweep: foo={} bar={}", expiring.get_bool("foo"), expiring.get_bool("bar"));

    expiring.stop_cleanup();
    Ok(())
}
