//! Server-side stream control.

use streamlay_store_client::OverlayStore;
use streamlay_stream_session::validate_rtsp_url;

use super::Context;

pub async fn start(ctx: &Context, url: Option<String>) -> anyhow::Result<()> {
    let url = match url {
        Some(url) => url,
        None => ctx.store.get_stream_settings().await?.rtsp_url,
    };
    validate_rtsp_url(&url)?;

    let started = ctx.store.start_stream(&url).await?;
    println!(
        "{}",
        started
            .message
            .as_deref()
            .unwrap_or("Stream started successfully")
    );
    if let Some(hls) = started.hls_url {
        println!("HLS playlist: {hls}");
    }
    Ok(())
}

pub async fn stop(ctx: &Context) -> anyhow::Result<()> {
    ctx.store.stop_stream().await?;
    println!("Stream stopped.");
    Ok(())
}

pub async fn status(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let status = ctx.store.stream_status().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "Running: {}",
        if status.is_running { "yes" } else { "no" }
    );
    if let Some(url) = &status.current_url {
        println!("Source: {url}");
    }
    if let Some(hls) = &status.hls_url {
        println!("HLS playlist: {hls}");
    }
    Ok(())
}
