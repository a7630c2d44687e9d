use anyhow::{Result, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use std::f64::consts::FRAC_PI_4;
use std::fmt::Write;

// Scale at which bounds are measured before fitting.
const PROBE_SCALE: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    center: [f64; 2],
    scale: f64,
    translate: [f64; 2],
}

fn raw_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lambda = lon.to_radians();
    let phi = lat.to_radians();
    (lambda, (FRAC_PI_4 + phi / 2.0).tan().ln())
}

impl Mercator {
    pub fn new(center: [f64; 2], scale: f64, translate: [f64; 2]) -> Self {
        Self { center, scale, translate }
    }

    /// Chooses scale and translation so every vertex of `features` fits inside
    /// `extent` (`[[x0, y0], [x1, y1]]`), preserving aspect ratio and centring
    /// the slack on the shorter axis.
    pub fn fit_extent<'a, I>(center: [f64; 2], extent: [[f64; 2]; 2], features: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a MultiPolygon<f64>>,
    {
        let probe = Self::new(center, PROBE_SCALE, [0.0, 0.0]);

        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for mp in features {
            for coord in mp.0.iter().flat_map(rings).flat_map(|ring| ring.0.iter()) {
                let (x, y) = probe.project(coord.x, coord.y);
                min = [min[0].min(x), min[1].min(y)];
                max = [max[0].max(x), max[1].max(y)];
            }
        }

        if !(min[0].is_finite() && max[0].is_finite()) {
            bail!("Cannot fit projection: no coordinates to fit");
        }

        let w = extent[1][0] - extent[0][0];
        let h = extent[1][1] - extent[0][1];
        let k = (w / (max[0] - min[0])).min(h / (max[1] - min[1]));
        if !k.is_finite() || k <= 0.0 {
            bail!("Cannot fit projection: features have no extent");
        }

        let x = extent[0][0] + (w - k * (max[0] + min[0])) / 2.0;
        let y = extent[0][1] + (h - k * (max[1] + min[1])) / 2.0;

        Ok(Self::new(center, PROBE_SCALE * k, [x, y]))
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> [f64; 2] {
        self.translate
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (x, y) = raw_mercator(lon, lat);
        let (cx, cy) = raw_mercator(self.center[0], self.center[1]);
        (
            self.translate[0] + self.scale * (x - cx),
            self.translate[1] - self.scale * (y - cy),
        )
    }

    pub fn project_coord(&self, coord: Coord<f64>) -> Coord<f64> {
        let (x, y) = self.project(coord.x, coord.y);
        Coord { x, y }
    }

    pub fn project_multipolygon(&self, mp: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        let project_ring = |ring: &LineString<f64>| {
            LineString::new(ring.0.iter().map(|c| self.project_coord(*c)).collect())
        };

        MultiPolygon::new(
            mp.0.iter()
                .map(|p| {
                    Polygon::new(
                        project_ring(p.exterior()),
                        p.interiors().iter().map(project_ring).collect(),
                    )
                })
                .collect(),
        )
    }
}

fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors().iter())
}

pub fn fmt_coord(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let mut s = format!("{:.3}", rounded);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

pub fn path_data(projected: &MultiPolygon<f64>) -> String {
    let mut d = String::new();

    for ring in projected.0.iter().flat_map(rings) {
        // closing vertex repeats the first one; `Z` covers it
        let coords = match ring.0.split_last() {
            Some((last, rest)) if rest.first() == Some(last) => rest,
            _ => &ring.0[..],
        };
        if coords.is_empty() {
            continue;
        }
        for (i, c) in coords.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(d, "{}{},{}", cmd, fmt_coord(c.x), fmt_coord(c.y));
        }
        d.push('Z');
    }

    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(lon: f64, lat: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: lon, y: lat),
            (x: lon + size, y: lat),
            (x: lon + size, y: lat + size),
            (x: lon, y: lat + size),
            (x: lon, y: lat),
        ]])
    }

    const CENTER: [f64; 2] = [103.851959, 1.290270];
    const EXTENT: [[f64; 2]; 2] = [[60.0, 50.0], [990.0, 580.0]];

    #[test]
    fn fitted_features_stay_inside_extent() {
        let features = vec![square(103.6, 1.2, 0.1), square(103.9, 1.35, 0.1)];
        let projection = Mercator::fit_extent(CENTER, EXTENT, &features).expect("fit");

        for mp in &features {
            for coord in mp.0.iter().flat_map(rings).flat_map(|r| r.0.iter()) {
                let (x, y) = projection.project(coord.x, coord.y);
                assert!(x >= 60.0 - 1e-6 && x <= 990.0 + 1e-6, "x = {}", x);
                assert!(y >= 50.0 - 1e-6 && y <= 580.0 + 1e-6, "y = {}", y);
            }
        }
    }

    #[test]
    fn wide_features_touch_both_horizontal_edges() {
        // 0.8 degrees wide, 0.25 tall: width is the binding side
        let features = vec![square(103.6, 1.2, 0.1), square(104.3, 1.35, 0.1)];
        let projection = Mercator::fit_extent(CENTER, EXTENT, &features).expect("fit");

        let (left, _) = projection.project(103.6, 1.2);
        let (right, _) = projection.project(104.4, 1.2);
        assert!((left - 60.0).abs() < 1e-6);
        assert!((right - 990.0).abs() < 1e-6);

        // vertical slack is split evenly
        let (_, bottom) = projection.project(103.6, 1.2);
        let (_, top) = projection.project(103.6, 1.45);
        assert!(((top - 50.0) - (580.0 - bottom)).abs() < 1e-6);
    }

    #[test]
    fn north_is_up() {
        let features = vec![square(103.6, 1.2, 0.3)];
        let projection = Mercator::fit_extent(CENTER, EXTENT, &features).expect("fit");

        let (_, south) = projection.project(103.7, 1.2);
        let (_, north) = projection.project(103.7, 1.4);
        assert!(north < south);
    }

    #[test]
    fn nothing_to_fit_is_an_error() {
        let empty: Vec<MultiPolygon<f64>> = Vec::new();
        assert!(Mercator::fit_extent(CENTER, EXTENT, &empty).is_err());

        let point_like = vec![MultiPolygon::new(vec![polygon![(x: 103.8, y: 1.3), (x: 103.8, y: 1.3)]])];
        assert!(Mercator::fit_extent(CENTER, EXTENT, &point_like).is_err());
    }

    #[test]
    fn coordinates_are_rounded_and_trimmed() {
        assert_eq!(fmt_coord(12.0), "12");
        assert_eq!(fmt_coord(12.5), "12.5");
        assert_eq!(fmt_coord(1.23456), "1.235");
        assert_eq!(fmt_coord(-0.0001), "0");
    }

    #[test]
    fn path_closes_each_ring_once() {
        let mp = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.5),
            (x: 0.0, y: 0.0),
        ]]);

        assert_eq!(path_data(&mp), "M0,0L10,0L10,10.5Z");
    }
}
