use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use pickersheet::thumbnails::LibraryAsset;
use pickersheet::{
    Action, ActionId, ActionStyle, MemoryAssetProvider, Sheet, SheetEvent, SheetSnapshot, SlotId,
};

const VIEW_WIDTH: f32 = 375.0;
const STRIP_SLOTS: usize = 4;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pickersheet=info".parse()?),
        )
        .init();

    let library = vec![
        LibraryAsset::image(1, 4032, 3024),
        LibraryAsset::image(2, 3024, 4032),
        LibraryAsset::video(3, 1920, 1080),
        LibraryAsset::image(4, 4032, 3024).burst(),
        LibraryAsset::image(5, 60, 2400),
        LibraryAsset::image(6, 2048, 2048),
    ];
    let provider = Arc::new(MemoryAssetProvider::with_default_workers(library));

    let mut sheet = Sheet::builder()
        .title("Recent Photos")
        .max_selection(3)
        .view_width(VIEW_WIDTH)
        .build();
    sheet.add_action(
        Action::new(ActionId(1), "Photo Library", ActionStyle::Default)
            .with_secondary_label(|n| format!("Send {} Photo{}", n, if n == 1 { "" } else { "s" }))
            .with_handler(|n| info!(count = n, "Sending photos")),
    );
    sheet.add_action(Action::cancel(ActionId(2), "Cancel"));
    sheet.add_action(Action::new(ActionId(3), "Take Photo", ActionStyle::Default));

    let status = sheet.open(provider).context("Failed to open sheet")?;
    info!(?status, assets = sheet.assets().len(), "Opened sheet");
    log_snapshot(&sheet.snapshot());

    sheet.scrolled_to(0.0, VIEW_WIDTH);
    for index in 0..sheet.assets().len().min(STRIP_SLOTS) {
        sheet.bind_slot(SlotId(index as u32), index)?;
    }

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut loaded = 0;
    while loaded < STRIP_SLOTS.min(sheet.assets().len()) && Instant::now() < deadline {
        for ready in sheet.poll_thumbnails() {
            info!(
                slot = ready.slot.0,
                index = ready.index,
                width = ready.thumbnail.width,
                height = ready.thumbnail.height,
                "Thumbnail ready"
            );
            loaded += 1;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    for index in [0, 2] {
        let snapshot = sheet.handle_event(SheetEvent::SelectAt(index))?;
        log_snapshot(&snapshot);
    }
    if let Some(offset) = sheet.focus_offset(VIEW_WIDTH) {
        info!(offset, "Centering last selection");
        sheet.scrolled_to(offset, VIEW_WIDTH);
    }

    sheet.handle_event(SheetEvent::InvokeAction(ActionId(1)))?;
    let sent: Vec<_> = sheet.selected_assets().iter().map(|a| a.id.0).collect();
    info!(?sent, "Done");
    Ok(())
}

fn log_snapshot(snapshot: &SheetSnapshot) {
    info!(
        width = snapshot.sheet_width,
        height = snapshot.sheet_height,
        preview = snapshot.preview_height,
        enlarged = snapshot.enlarged,
        selected = ?snapshot.selected,
        labels = ?snapshot.labels(),
        "Sheet"
    );
}
