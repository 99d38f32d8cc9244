//! Send inquiry command handler

use crate::clients::ContactClient;
use crate::config::Config;
use crate::models::inquiry::InquiryDraft;

pub async fn cmd_send_inquiry(
    config: &Config,
    draft: InquiryDraft,
    url: Option<&str>,
) -> anyhow::Result<()> {
    let base_url = url.map_or_else(
        || format!("http://127.0.0.1:{}", config.server.port),
        ToString::to_string,
    );

    let client = ContactClient::new(&base_url)?;

    match client.submit(&draft).await {
        Ok(receipt) => {
            println!("✓ {}", receipt.message);
            println!("  ID: {}", receipt.id);
            Ok(())
        }
        Err(e) => {
            println!("✗ {e}");
            Err(e.into())
        }
    }
}
