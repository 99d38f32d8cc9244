//! List inquiries command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_inquiries(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_url).await?;
    let total = store.count_inquiries().await?;
    let inquiries = store.list_recent_inquiries(limit).await?;

    if inquiries.is_empty() {
        println!("No inquiries stored yet.");
        return Ok(());
    }

    println!("Recent inquiries ({} of {} total)", inquiries.len(), total);
    println!("{:-<70}", "");

    for inquiry in inquiries {
        println!(
            "{} | {} <{}>",
            inquiry.submitted_at.format("%Y-%m-%d %H:%M"),
            inquiry.name,
            inquiry.email
        );
        if !inquiry.phone.is_empty() {
            println!("  Phone: {}", inquiry.phone);
        }
        println!("  ID: {}", inquiry.id);

        let preview: String = inquiry.message.chars().take(80).collect();
        let ellipsis = if inquiry.message.chars().count() > 80 {
            "…"
        } else {
            ""
        };
        println!("  {preview}{ellipsis}");
    }

    Ok(())
}
