use rstest::fixture;
use tracing::info;

mod fake_exchange;
pub use self::fake_exchange::*;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub async fn exchange() -> FakeExchange {
    init_tracing();
    match FakeExchange::start().await {
        Ok(exchange) => exchange,
        Err(error) => {
            panic!("fail to start fake exchange: {error:?}");
        }
    }
}
