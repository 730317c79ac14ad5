use std::io;

use smsir::{Config, MobileNumber, SendVerificationCode, SmsIrClient, VerificationCode};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mobile = std::env::var("SMSIR_MOBILE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSIR_MOBILE environment variable is required",
        )
    })?;
    let code = std::env::var("SMSIR_CODE").unwrap_or_else(|_| "12345".to_owned());

    let client = SmsIrClient::new(Config::from_env()?)?;
    let request =
        SendVerificationCode::new(MobileNumber::new(mobile)?, VerificationCode::new(code)?);

    let response = client.send_verification_code(request).await?;
    println!(
        "verification_code_id: {}, message: {:?}",
        response.verification_code_id, response.message
    );

    Ok(())
}
