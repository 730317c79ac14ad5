use std::io;

use smsir::{Config, MobileNumber, SendByTemplate, SmsIrClient, TemplateId};
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
    let template_id = std::env::var("SMSIR_TEMPLATE_ID")
        .map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "SMSIR_TEMPLATE_ID environment variable is required",
            )
        })?
        .parse::<i64>()?;
    let name = std::env::var("SMSIR_PARAMETER").unwrap_or_else(|_| "code".to_owned());
    let value = std::env::var("SMSIR_PARAMETER_VALUE").unwrap_or_else(|_| "12345".to_owned());

    let client = SmsIrClient::new(Config::from_env()?)?;
    let request = SendByTemplate::with_pairs(
        MobileNumber::new(mobile)?,
        TemplateId::new(template_id)?,
        [(name, value)],
    )?;

    let response = client.send_by_template(request).await?;
    println!(
        "verification_code_id: {}, message: {:?}",
        response.verification_code_id, response.message
    );

    Ok(())
}
