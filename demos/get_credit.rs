use smsir::{Config, SmsIrClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = SmsIrClient::new(Config::from_env()?)?;

    let response = client.get_credit().await?;
    println!("credit: {}, message: {:?}", response.credit, response.message);

    Ok(())
}
