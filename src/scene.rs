use crate::format::group_thousands;
use crate::projection::{Mercator, path_data};
use crate::scale::{Fill, FillRule};
use crate::types::{Subzone, SubzoneInfo};
use geo::{BoundingRect, Contains, MultiPolygon, Point};
use rstar::{RTree, RTreeObject, AABB};

pub const TOOLTIP_OFFSET: (f64, f64) = (10.0, -28.0);

#[derive(Debug, Clone)]
pub struct Shape {
    pub info: SubzoneInfo,
    /// Projected outline, in drawing coordinates.
    pub outline: MultiPolygon<f64>,
    pub path: String,
    pub fill: Fill,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub html: String,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub page_x: f64,
    pub page_y: f64,
}

// R-tree entry for a shape's bounding box
struct ShapeEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for ShapeEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct Scene {
    shapes: Vec<Shape>,
    rule: FillRule,
    tooltip: Tooltip,
    hovered: Option<usize>,
    tree: RTree<ShapeEnvelope>,
}

pub fn tooltip_html(info: &SubzoneInfo) -> String {
    format!(
        "<strong>{}</strong><br/>Planning Area: {} <br/>Region: {} <br/>Population: {}",
        escape_html(&info.subzone_name),
        escape_html(&info.planning_area),
        escape_html(&info.region),
        group_thousands(info.population)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl Scene {
    pub fn build(subzones: &[Subzone], projection: &Mercator, rule: FillRule) -> Self {
        let shapes: Vec<Shape> = subzones
            .iter()
            .map(|subzone| {
                let outline = projection.project_multipolygon(&subzone.geometry);
                Shape {
                    info: SubzoneInfo::from(subzone),
                    path: path_data(&outline),
                    fill: rule.fill_for(subzone.population),
                    outline,
                }
            })
            .collect();

        let envelopes = shapes
            .iter()
            .enumerate()
            .filter_map(|(index, shape)| {
                let rect = shape.outline.bounding_rect()?;
                Some(ShapeEnvelope {
                    index,
                    aabb: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                })
            })
            .collect();

        Self {
            shapes,
            rule,
            tooltip: Tooltip::default(),
            hovered: None,
            tree: RTree::bulk_load(envelopes),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn rule(&self) -> &FillRule {
        &self.rule
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn resting_fill(&self, index: usize) -> Option<Fill> {
        self.shapes.get(index).map(|s| self.rule.fill_for(s.info.population))
    }

    pub fn pointer_enter(&mut self, index: usize, event: PointerEvent) {
        let Some(shape) = self.shapes.get_mut(index) else {
            return;
        };
        shape.fill = Fill::Highlight;
        self.tooltip.visible = true;
        self.tooltip.html = tooltip_html(&shape.info);
        self.hovered = Some(index);
        self.place_tooltip(event);
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        if self.hovered.is_some() {
            self.place_tooltip(event);
        }
    }

    pub fn pointer_leave(&mut self, index: usize) {
        let Some(fill) = self.resting_fill(index) else {
            return;
        };
        self.shapes[index].fill = fill;
        self.tooltip.visible = false;
        self.tooltip.html.clear();
        if self.hovered == Some(index) {
            self.hovered = None;
        }
    }

    fn place_tooltip(&mut self, event: PointerEvent) {
        self.tooltip.left = event.page_x + TOOLTIP_OFFSET.0;
        self.tooltip.top = event.page_y + TOOLTIP_OFFSET.1;
    }

    /// Topmost shape containing the drawing coordinate.
    pub fn shape_at(&self, x: f64, y: f64) -> Option<usize> {
        let point = Point::new(x, y);
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .map(|candidate| candidate.index)
            .filter(|&i| self.shapes[i].outline.contains(&point))
            // later shapes are drawn on top
            .max()
    }

    pub fn pointer_at(&mut self, x: f64, y: f64, event: PointerEvent) {
        let target = self.shape_at(x, y);
        if target == self.hovered {
            self.pointer_move(event);
            return;
        }
        if let Some(previous) = self.hovered {
            self.pointer_leave(previous);
        }
        if let Some(next) = target {
            self.pointer_enter(next, event);
        }
    }

    pub fn info_at(&self, x: f64, y: f64) -> Option<&SubzoneInfo> {
        self.shape_at(x, y).map(|i| &self.shapes[i].info)
    }
}
