use nu_ansi_term::Color::{Blue, Cyan, Magenta};
use pgext_core::MatrixCell;
use pgext_operations::{matrix::query_matrices, GroupMatrix, PgextContext, Result};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::utils::{print_json, print_legend, status_color, status_icon, Colored, Icons};

fn cell_text(cell: &MatrixCell) -> String {
    let icon = Colored(status_color(cell.status), status_icon(cell.status));
    match (&cell.version, cell.origin) {
        (Some(version), Some(origin)) => format!("{icon} {version} {}", origin.as_str()),
        _ => icon.to_string(),
    }
}

fn display_group(group: &GroupMatrix, show_packages: bool) {
    let matrix = &group.matrix;
    let rows = matrix.rows();

    let mut builder = Builder::new();
    let mut header = vec!["Platform".to_string()];
    if let Some((_, cells)) = rows.first() {
        header.extend(cells.iter().map(|cell| format!("PG {}", cell.pg)));
    }
    builder.push_record(header);

    for (platform, cells) in &rows {
        let mut record = vec![Colored(Blue, platform).to_string()];
        record.extend(cells.iter().map(|cell| cell_text(cell)));
        builder.push_record(record);
    }

    let title = if matrix.contrib {
        format!("{} (contrib)", group.extension)
    } else {
        format!("{} [{}]", group.extension, matrix.pkg)
    };
    let table = builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();
    info!("\n{table}");

    if group.siblings.len() > 1 {
        info!(
            "{} {}",
            Colored(Magenta, "Extensions:"),
            group.siblings.join(", ")
        );
    }

    if show_packages {
        for record in &matrix.packages {
            info!(
                "  {} {} {} ({} {})",
                Icons::ARROW,
                Colored(Cyan, &record.name),
                record.version,
                record.repo,
                record.pg.map_or_else(|| "any".to_string(), |pg| format!("PG{pg}")),
            );
        }
    }
}

pub fn show_matrix(
    ctx: &PgextContext,
    extensions: &[String],
    show_packages: bool,
    json: bool,
) -> Result<()> {
    let matrices = query_matrices(ctx, extensions)?;
    if json {
        print_json(&matrices)?;
        return Ok(());
    }

    for group in &matrices {
        display_group(group, show_packages);
    }
    print_legend();
    Ok(())
}
