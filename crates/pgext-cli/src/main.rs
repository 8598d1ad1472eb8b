use std::path::PathBuf;

use clap::Parser;
use cli::{Args, Commands};
use logging::setup_logging;
use pgext_config::config::{default_config_path, generate_default_config, Config};
use pgext_dl::{http_client::configure_http_client, DownloadError};
use pgext_operations::{
    export::{dump_packages, export_catalog},
    PgextContext, Result,
};
use pgext_utils::path::resolve_path;
use tracing::{debug, info, warn};
use ureq::{
    http::{HeaderMap, HeaderName, HeaderValue},
    Proxy,
};
use utils::COLOR;

mod cli;
mod gaps;
mod logging;
mod matrix;
mod sync;
mod utils;

fn config_path(args: &Args) -> Result<PathBuf> {
    let Some(path) = args.config.as_deref() else {
        return Ok(default_config_path());
    };
    let path = resolve_path(path).map_err(pgext_config::error::ConfigError::from)?;
    Ok(path)
}

fn parse_headers(headers: &[String]) -> HeaderMap {
    headers
        .iter()
        .filter_map(|header| {
            let (key, value) = header.split_once(':')?;
            let name = key.trim().parse::<HeaderName>().ok();
            let value = value.trim().parse::<HeaderValue>().ok();
            if name.is_none() || value.is_none() {
                warn!("ignoring invalid header: {header}");
            }
            Some((name?, value?))
        })
        .collect()
}

fn configure_client(args: &Args) -> Result<()> {
    let proxy = args
        .proxy
        .as_deref()
        .map(Proxy::new)
        .transpose()
        .map_err(DownloadError::from)?;
    let user_agent = args.user_agent.clone();
    let headers = args.header.as_deref().map(parse_headers);

    configure_http_client(|config| {
        if proxy.is_some() {
            config.proxy = proxy;
        }
        if let Some(user_agent) = user_agent {
            config.user_agent = Some(user_agent);
        }
        if let Some(headers) = headers {
            config.headers = Some(headers);
        }
    });
    Ok(())
}

async fn handle_cli() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        if let Ok(mut color) = COLOR.write() {
            *color = false;
        }
    }

    let config_path = config_path(&args)?;

    if let Commands::DefConfig { output } = &args.command {
        let path = match output {
            Some(output) => {
                resolve_path(output).map_err(pgext_config::error::ConfigError::from)?
            }
            None => config_path,
        };
        generate_default_config(&path)?;
        return Ok(());
    }

    configure_client(&args)?;

    debug!("using configuration {}", config_path.display());
    let config = Config::load(Some(&config_path))?;
    let ctx = PgextContext::new(config);

    match args.command {
        Commands::Sync {
            force,
            repositories,
        } => sync::sync(&ctx, force, repositories, args.json).await?,
        Commands::Reload { repositories } => sync::reload(&ctx, &repositories, args.json)?,
        Commands::Matrix {
            extensions,
            packages,
        } => matrix::show_matrix(&ctx, &extensions, packages, args.json)?,
        Commands::Export => {
            let report = export_catalog(&ctx)?;
            for failed in &report.failed {
                warn!("{}: {}", failed.extension, failed.error);
            }
        }
        Commands::Dump { output } => {
            let output = output
                .as_deref()
                .map(resolve_path)
                .transpose()
                .map_err(pgext_config::error::ConfigError::from)?;
            dump_packages(&ctx, output.as_deref())?;
        }
        Commands::Gaps { platform } => gaps::show_gaps(&ctx, platform, args.json)?,
        Commands::Config => {
            let document = ctx.config().to_annotated_document()?;
            info!("{document}");
        }
        // handled before the configuration is loaded
        Commands::DefConfig { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli().await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
