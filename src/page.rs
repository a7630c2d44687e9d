use crate::config::RenderConfig;
use crate::render::escape_xml;
use crate::scene::TOOLTIP_OFFSET;
use anyhow::{Context, Result};

pub fn render_page(config: &RenderConfig, svg: &str) -> Result<String> {
    let highlight = script_string(&config.highlight_fill)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
</head>
<body>
{svg}
    <div id="tooltip"></div>
    <script>
const HIGHLIGHT = {highlight};
const OFFSET_X = {offset_x};
const OFFSET_Y = {offset_y};
{js}
    </script>
</body>
</html>
"#,
        title = escape_xml(&config.title),
        css = inline_css(),
        svg = svg,
        highlight = highlight,
        offset_x = TOOLTIP_OFFSET.0,
        offset_y = TOOLTIP_OFFSET.1,
        js = inline_javascript(),
    ))
}

// JSON string literal that cannot close the surrounding <script> element
fn script_string(value: &str) -> Result<String> {
    let literal = serde_json::to_string(value).context("Failed to encode script string")?;
    Ok(literal.replace("</", "<\\/"))
}

fn inline_css() -> &'static str {
    r#"
        body { margin: 0; font-family: Cambria, serif; }
        svg { display: block; width: 100%; height: auto; max-height: 100vh; }
        #tooltip {
            position: absolute;
            pointer-events: none;
            opacity: 0;
            background: white;
            border: 1px solid #333;
            border-radius: 4px;
            padding: 6px 8px;
            font-size: 12px;
        }
    "#
}

fn inline_javascript() -> &'static str {
    r##"
const tooltip = document.getElementById("tooltip");

function escapeHtml(text) {
    const span = document.createElement("span");
    span.textContent = text;
    return span.innerHTML;
}

function place(event) {
    tooltip.style.left = (event.pageX + OFFSET_X) + "px";
    tooltip.style.top = (event.pageY + OFFSET_Y) + "px";
}

document.querySelectorAll("#subzones path").forEach(path => {
    path.addEventListener("mouseover", event => {
        const d = path.dataset;
        tooltip.innerHTML =
            `<strong>${escapeHtml(d.subzone)}</strong><br/>Planning Area: ${escapeHtml(d.planningArea)} <br/>Region: ${escapeHtml(d.region)} <br/>Population: ${d.population}`;
        tooltip.style.opacity = 1;
        place(event);
        path.style.fill = HIGHLIGHT;
    });
    path.addEventListener("mousemove", place);
    path.addEventListener("mouseout", () => {
        tooltip.style.opacity = 0;
        tooltip.textContent = "";
        path.style.fill = path.dataset.fill;
    });
});
"##
}
