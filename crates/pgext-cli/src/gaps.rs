use nu_ansi_term::Color::{Blue, Cyan, Green};
use pgext_operations::{gaps::catalog_gaps, PgextContext, PlatformGaps, Result};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::utils::{print_json, print_legend, status_color, status_icon, Colored};

fn display_platform(gaps: &PlatformGaps) {
    if gaps.entries.is_empty() {
        info!(
            "{}: {}",
            Colored(Blue, &gaps.platform),
            Colored(Green, "everything available")
        );
        return;
    }

    let mut builder = Builder::new();
    builder.push_record(["Package", "Extension", "Gaps"]);
    for entry in &gaps.entries {
        let cells = entry
            .cells
            .iter()
            .map(|(pg, status)| {
                format!(
                    "{}{}",
                    Colored(status_color(*status), status_icon(*status)),
                    pg
                )
            })
            .collect::<Vec<_>>()
            .join(" ");
        builder.push_record([
            Colored(Cyan, &entry.pkg).to_string(),
            entry.extension.clone(),
            cells,
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header(format!(
            "{} ({} packages)",
            gaps.platform,
            gaps.entries.len()
        )))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();
    info!("\n{table}");
}

pub fn show_gaps(ctx: &PgextContext, platforms: Option<Vec<String>>, json: bool) -> Result<()> {
    let mut gaps = catalog_gaps(ctx)?;
    if let Some(platforms) = platforms {
        gaps.retain(|g| platforms.contains(&g.platform.to_string()));
    }

    if json {
        print_json(&gaps)?;
        return Ok(());
    }

    for platform in &gaps {
        display_platform(platform);
    }
    print_legend();
    Ok(())
}
