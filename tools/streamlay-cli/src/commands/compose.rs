//! Preview overlay placement on a surface.

use streamlay_render_engine::RenderContent;

use super::Context;

pub async fn run(
    ctx: &Context,
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    json: bool,
) -> anyhow::Result<()> {
    let defaults = &ctx.config.surface;
    let mut studio = ctx.studio(
        width.unwrap_or(defaults.width),
        height.unwrap_or(defaults.height),
    );
    studio.set_volume(defaults.volume);
    studio.load().await?;
    if let Some(url) = url {
        studio.set_rtsp_url(url);
    }
    studio.start_stream()?;

    let view = studio.render();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("Stream: {} ({})", view.stream.url, view.stream.status);
    println!(
        "Surface: {}x{}",
        view.scene.surface.width, view.scene.surface.height
    );
    if view.scene.overlays.is_empty() {
        println!("No overlays created yet.");
        return Ok(());
    }

    println!();
    for overlay in &view.scene.overlays {
        let content = match &overlay.content {
            RenderContent::Text { text } => format!("text {text:?}"),
            RenderContent::Image { src, .. } => format!("image {src}"),
        };
        println!(
            "  #{} {:<20} left {:>7.1} top {:>7.1} {}x{}  {}",
            overlay.z_index,
            overlay.name,
            overlay.rect.left,
            overlay.rect.top,
            overlay.rect.width,
            overlay.rect.height,
            content
        );
    }
    Ok(())
}
