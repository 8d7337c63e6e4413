//! API liveness check.

use streamlay_store_client::OverlayStore;

use super::Context;

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    let health = ctx.store.health().await?;
    let message = health.message.as_deref().unwrap_or("");

    if !health.is_healthy() {
        anyhow::bail!("API reported status {:?} {message}", health.status);
    }
    println!("[OK] {} {}", ctx.store.base_url(), message);
    Ok(())
}
