use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::cli::AssetsArgs;
use crate::model::{AssetEntry, AssetKind, AssetManifest};
use crate::util::{default_asset_manifest_path, now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: AssetsArgs) -> Result<()> {
    let manifest = build_manifest(&args.movie_dir, &args.actor_dir)?;

    if args.dry_run {
        info!(
            movies = manifest.movie_count,
            actors = manifest.actor_count,
            "asset dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| default_asset_manifest_path(&args.data_root));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(
        path = %manifest_path.display(),
        movies = manifest.movie_count,
        actors = manifest.actor_count,
        "wrote asset manifest"
    );

    Ok(())
}

pub fn build_manifest(movie_dir: &Path, actor_dir: &Path) -> Result<AssetManifest> {
    let pattern =
        Regex::new(r"^(\d+)_(.+)\.jpg$").context("failed to compile asset filename regex")?;

    let mut assets = collect_assets(movie_dir, AssetKind::Movie, &pattern)?;
    assets.extend(collect_assets(actor_dir, AssetKind::Actor, &pattern)?);

    let movie_count = assets.iter().filter(|a| a.kind == AssetKind::Movie).count();
    let actor_count = assets.len() - movie_count;
    if assets.is_empty() {
        warn!(
            movie_dir = %movie_dir.display(),
            actor_dir = %actor_dir.display(),
            "no image assets found"
        );
    }

    Ok(AssetManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        movie_count,
        actor_count,
        assets,
    })
}

fn collect_assets(dir: &Path, kind: AssetKind, pattern: &Regex) -> Result<Vec<AssetEntry>> {
    if !dir.exists() {
        warn!(path = %dir.display(), "asset directory missing");
        return Ok(Vec::new());
    }

    let mut assets = Vec::new();
    for path in discover_images(dir)? {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let Some((order, name)) = parse_order_name(filename, pattern) else {
            warn!(path = %path.display(), "skipping image without <order>_<name>.jpg name");
            continue;
        };

        assets.push(AssetEntry {
            kind,
            order,
            slug: slugify(&name),
            name,
            path: path.to_string_lossy().replace('\\', "/"),
            sha256: sha256_file(&path)?,
        });
    }

    assets.sort_by(|a, b| a.order.cmp(&b.order).then(a.name.cmp(&b.name)));
    Ok(assets)
}

fn discover_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_jpg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "jpg")
            .unwrap_or(false);
        if is_jpg {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

fn parse_order_name(filename: &str, pattern: &Regex) -> Option<(u32, String)> {
    let captures = pattern.captures(filename)?;
    let order = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let name = captures.get(2)?.as_str().to_string();
    Some((order, name))
}

/// URL path segment for a title: spaces become underscores, lowercased.
pub fn slugify(title: &str) -> String {
    title.replace(' ', "_").to_lowercase()
}
