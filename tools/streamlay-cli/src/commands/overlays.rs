//! Overlay CRUD commands.

use std::io::{self, BufRead, Write};

use streamlay_overlay_form::{Deletion, OverlayForm};
use streamlay_overlay_model::{Overlay, OverlayId, OverlayKind};
use streamlay_store_client::OverlayStore;

use super::{Context, OverlayArgs, OverlayPatch};

pub async fn list(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let overlays = ctx.store.list_overlays().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overlays)?);
        return Ok(());
    }

    if overlays.is_empty() {
        println!("No overlays created yet.");
        return Ok(());
    }
    println!("Overlays ({}):", overlays.len());
    for overlay in &overlays {
        println!("  [{}] {}", overlay.id, overlay.summary());
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: String, json: bool) -> anyhow::Result<()> {
    let overlay = ctx.store.get_overlay(&OverlayId::new(id)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&overlay)?);
    } else {
        print_overlay(&overlay);
    }
    Ok(())
}

pub async fn create(ctx: &Context, args: OverlayArgs) -> anyhow::Result<()> {
    let mut form = OverlayForm::new();
    for (field, value) in args.inputs() {
        form.input(field, &value)?;
    }

    let submission = form.submit(ctx.store.as_ref()).await?;
    println!("Overlay created successfully.");
    print_overlay(&submission.overlay);
    Ok(())
}

pub async fn update(ctx: &Context, id: String, fields: OverlayPatch) -> anyhow::Result<()> {
    let id = OverlayId::new(id);
    let current = ctx.store.get_overlay(&id).await?;

    let mut form = OverlayForm::new();
    form.begin_edit(&current);
    for (field, value) in fields.inputs() {
        form.input(field, &value)?;
    }

    let submission = form.submit(ctx.store.as_ref()).await?;
    println!("Overlay updated successfully.");
    print_overlay(&submission.overlay);
    Ok(())
}

pub async fn delete(ctx: &Context, id: String, yes: bool) -> anyhow::Result<()> {
    let id = OverlayId::new(id);
    let gate = move |prompt: &str| yes || confirm_on_stdin(prompt);

    let mut form = OverlayForm::new();
    match form.delete(ctx.store.as_ref(), &id, &gate).await? {
        Deletion::Declined => println!("Delete cancelled."),
        Deletion::Deleted(remaining) => {
            println!(
                "Overlay deleted successfully. {} overlay(s) remaining.",
                remaining.len()
            );
        }
    }
    Ok(())
}

fn print_overlay(overlay: &Overlay) {
    println!("Overlay {}", overlay.id);
    println!("  Name: {}", overlay.name);
    println!("  Type: {}", overlay.kind);
    match overlay.kind {
        OverlayKind::Text => println!("  Text: {}", overlay.content),
        OverlayKind::Image => println!("  Image: {}", overlay.content),
    }
    println!(
        "  Position: ({}%, {}%)",
        overlay.position.x, overlay.position.y
    );
    println!("  Size: {}x{}", overlay.size.width, overlay.size.height);
    if let Some(created) = overlay.created_at {
        println!("  Created: {created}");
    }
    if let Some(updated) = overlay.updated_at {
        println!("  Updated: {updated}");
    }
}

/// Ask on stdin; anything but `y`/`yes` declines.
fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
