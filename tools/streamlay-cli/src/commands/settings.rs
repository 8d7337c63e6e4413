//! Saved stream URL.

use streamlay_overlay_model::StreamSettings;
use streamlay_store_client::OverlayStore;

use super::Context;

pub async fn get(ctx: &Context) -> anyhow::Result<()> {
    let settings = ctx.store.get_stream_settings().await?;
    if settings.rtsp_url.is_empty() {
        println!("No stream URL saved.");
    } else {
        println!("{}", settings.rtsp_url);
    }
    Ok(())
}

pub async fn set(ctx: &Context, url: String) -> anyhow::Result<()> {
    let surface = &ctx.config.surface;
    let mut studio = ctx.studio(surface.width, surface.height);
    studio.set_rtsp_url(url);

    let saved = studio.save_stream_url().await?;
    println!("Stream settings saved successfully: {}", saved.rtsp_url);
    Ok(())
}

pub async fn clear(ctx: &Context) -> anyhow::Result<()> {
    ctx.store
        .save_stream_settings(&StreamSettings::new(""))
        .await?;
    println!("Stream URL cleared.");
    Ok(())
}
