// src/commands/images.rs
//! Stable image release command

use crate::cli::ImagesArgs;
use anyhow::{Context, Result};
use pulp_images::{plan_release, ImageFamily, ImagesConfig, IndexClient};
use std::path::Path;
use tracing::info;

/// Resolve the next stable image and record it in the workspace
pub fn cmd_images(args: &ImagesArgs) -> Result<()> {
    let mut config = ImagesConfig::load_or_default(args.config.as_deref().map(Path::new))?;
    if let Some(releases) = args.releases_to_check {
        config.core.releases_to_check = releases;
    }
    if let Some(url) = &args.index_url {
        config.index.url = url.clone();
    }
    config.validate()?;

    let family = match &args.family {
        Some(family) => family.parse::<ImageFamily>()?,
        None => ImageFamily::from_ci_test(std::env::var("CI_TEST").ok().as_deref()),
    };
    info!("Planning {} stable image against {}", family, config.index.url);

    let index = IndexClient::new(&config.index.url)?;
    let plan = plan_release(family, &index, &config)
        .with_context(|| format!("Failed to plan {} release", family))?;

    let Some(plan) = plan else {
        println!("No compatible plugin set found, nothing written");
        return Ok(());
    };

    if args.dry_run {
        println!("{}", plan.summary());
        println!("Dry run: no files written");
        return Ok(());
    }

    plan.persist(Path::new(&args.workspace), &config.output)
        .with_context(|| format!("Failed to record {} release in {}", family, args.workspace))?;

    println!("{}", plan.summary());
    Ok(())
}
