//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `textwidget_core` linkage without a mobile runtime.
//! - Print what an installed widget would currently draw from the
//!   configured shared storage (`TEXTWIDGET_*` environment variables).

use textwidget_core::db::open_db;
use textwidget_core::widget::renderer::WIDGET_TITLE;
use textwidget_core::{StorageConfig, WidgetProvider};

fn main() {
    println!("textwidget_core ping={}", textwidget_core::ping());
    println!("textwidget_core version={}", textwidget_core::core_version());

    let config = StorageConfig::from_env();
    println!("shared_db={}", config.shared_db_path.display());
    println!("namespace={}", config.shared_namespace);

    let conn = match open_db(&config.shared_db_path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("shared storage unavailable: {err}");
            std::process::exit(1);
        }
    };
    let provider =
        match WidgetProvider::try_new(&conn, &config.shared_namespace, config.line_width) {
            Ok(provider) => provider,
            Err(err) => {
                eprintln!("widget provider init failed: {err}");
                std::process::exit(1);
            }
        };

    let timeline = provider.snapshot();
    println!("{WIDGET_TITLE}");
    for line in timeline.view.lines() {
        println!("  {line}");
    }
    println!("next_refresh_at_ms={}", timeline.next_refresh_at_ms);
}
