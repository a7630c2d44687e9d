use crate::config::AppConfig;
use crate::data;
use crate::join::join_features;
use crate::page::render_page;
use crate::projection::Mercator;
use crate::render::{probe_overlay, render_to_string};
use crate::scale::FillRule;
use crate::scene::Scene;
use anyhow::{Context, Result};
use std::fs;
use tracing::info;

pub async fn build_scene(config: &AppConfig) -> Result<Scene> {
    // 1. Load boundaries and population together
    let (raw, records) = data::load_inputs(&config.input).await?;

    if let Some(path) = &config.input.north_arrow {
        probe_overlay(path)?;
    }

    // 2. Join populations onto the features
    let subzones = join_features(raw, &records)?;

    // 3. Fit the projection to the drawing extent
    let render = &config.render;
    let projection = Mercator::fit_extent(
        render.center,
        render.fit_extent,
        subzones.iter().map(|s| &s.geometry),
    )?;
    info!(
        scale = projection.scale(),
        translate = ?projection.translate(),
        "Projection fitted"
    );

    // 4. Colour scale over [0, max population]
    let rule = FillRule::for_populations(
        subzones.iter().map(|s| s.population),
        render.neutral_fill.clone(),
        render.highlight_fill.clone(),
    );
    info!(domain = ?rule.scale().domain(), "Colour scale built");

    Ok(Scene::build(&subzones, &projection, rule))
}

pub fn write_outputs(config: &AppConfig, scene: &Scene) -> Result<()> {
    let svg = render_to_string(&config.render, scene);
    let page = render_page(&config.render, &svg)?;

    fs::create_dir_all(&config.output.dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output.dir))?;

    let svg_path = config.output.svg_path();
    fs::write(&svg_path, &svg).with_context(|| format!("Failed to write {:?}", svg_path))?;
    let page_path = config.output.page_path();
    fs::write(&page_path, &page).with_context(|| format!("Failed to write {:?}", page_path))?;

    info!(shapes = scene.shapes().len(), "Wrote {:?} and {:?}", svg_path, page_path);
    Ok(())
}
