//! Vector markup parsing: composite-document markup in, flattened closed
//! contours (and their fill colors, for rasterization) out.
//!
//! Malformed or empty markup degrades to an empty result with a logged
//! diagnostic; downstream stages treat "no contours" as recoverable.

use kurbo::{BezPath, PathEl};
use nalgebra::Point2;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::constants::PATH_FLATTEN_TOLERANCE;

/// Segment count used when polygonizing circles.
const CIRCLE_SEGMENTS: usize = 32;

/// One drawable element's closed contours plus its resolved fill color.
#[derive(Debug, Clone)]
pub struct FilledPath {
    pub contours: Vec<Vec<Point2<f64>>>,
    /// RGBA fill, 0-255 channels. `None` for `fill="none"`.
    pub fill: Option<[u8; 4]>,
}

/// Extract every closed contour from the markup, ignoring styling.
pub fn parse_contours(markup: &str) -> Vec<Vec<Point2<f64>>> {
    parse_filled_paths(markup)
        .into_iter()
        .flat_map(|path| path.contours)
        .collect()
}

/// Extract drawable elements in document order with their fill colors.
pub fn parse_filled_paths(markup: &str) -> Vec<FilledPath> {
    if markup.trim().is_empty() {
        return Vec::new();
    }

    let mut reader = Reader::from_str(markup);
    let mut paths = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if let Some(path) = element_to_path(&e) {
                    if !path.contours.is_empty() {
                        paths.push(path);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                log::warn!("malformed vector markup: {err}");
                return Vec::new();
            }
        }
    }

    paths
}

fn element_to_path(element: &BytesStart<'_>) -> Option<FilledPath> {
    let contours = match element.name().as_ref() {
        b"path" => flatten_path_data(&attribute(element, b"d")?),
        b"rect" => rect_contour(element),
        b"circle" => circle_contour(element),
        b"polygon" | b"polyline" => points_contour(&attribute(element, b"points")?),
        _ => return None,
    };

    let fill = match attribute(element, b"fill") {
        Some(value) if value.eq_ignore_ascii_case("none") => None,
        // An unrecognized color loses the fill but keeps the contours
        Some(value) => parse_color(&value),
        // SVG default fill is black
        None => Some([0, 0, 0, 255]),
    };

    let fill = fill.map(|mut rgba| {
        if let Some(opacity) = attribute(element, b"fill-opacity").and_then(|v| v.parse::<f32>().ok())
        {
            rgba[3] = (rgba[3] as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        }
        rgba
    });

    Some(FilledPath { contours, fill })
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Flatten SVG path data into closed polyline contours.
///
/// A subpath with three or more points and no explicit close is treated
/// as closed; board outlines routinely omit the trailing `Z`.
pub fn flatten_path_data(data: &str) -> Vec<Vec<Point2<f64>>> {
    let path = match BezPath::from_svg(data) {
        Ok(path) => path,
        Err(err) => {
            log::warn!("unparseable path data: {err}");
            return Vec::new();
        }
    };

    let mut contours = Vec::new();
    let mut current: Vec<Point2<f64>> = Vec::new();

    path.flatten(PATH_FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            finish_contour(&mut contours, std::mem::take(&mut current));
            current.push(Point2::new(p.x, p.y));
        }
        PathEl::LineTo(p) => current.push(Point2::new(p.x, p.y)),
        PathEl::ClosePath => {
            finish_contour(&mut contours, std::mem::take(&mut current));
        }
        // flatten only emits MoveTo/LineTo/ClosePath
        _ => {}
    });
    finish_contour(&mut contours, current);

    contours
}

fn finish_contour(contours: &mut Vec<Vec<Point2<f64>>>, mut points: Vec<Point2<f64>>) {
    // Drop an explicit closing point coincident with the start
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if points.len() > 1 && (first - last).norm() < 1e-9 {
            points.pop();
        }
    }
    points.dedup_by(|a, b| (*a - *b).norm() < 1e-9);
    if points.len() >= 3 {
        contours.push(points);
    }
}

fn rect_contour(element: &BytesStart<'_>) -> Vec<Vec<Point2<f64>>> {
    let x = numeric_attribute(element, b"x").unwrap_or(0.0);
    let y = numeric_attribute(element, b"y").unwrap_or(0.0);
    let (Some(width), Some(height)) = (
        numeric_attribute(element, b"width"),
        numeric_attribute(element, b"height"),
    ) else {
        return Vec::new();
    };
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    vec![vec![
        Point2::new(x, y),
        Point2::new(x + width, y),
        Point2::new(x + width, y + height),
        Point2::new(x, y + height),
    ]]
}

fn circle_contour(element: &BytesStart<'_>) -> Vec<Vec<Point2<f64>>> {
    let cx = numeric_attribute(element, b"cx").unwrap_or(0.0);
    let cy = numeric_attribute(element, b"cy").unwrap_or(0.0);
    let Some(radius) = numeric_attribute(element, b"r") else {
        return Vec::new();
    };
    if radius <= 0.0 {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(CIRCLE_SEGMENTS);
    for i in 0..CIRCLE_SEGMENTS {
        let angle = (i as f64 / CIRCLE_SEGMENTS as f64) * 2.0 * std::f64::consts::PI;
        points.push(Point2::new(cx + radius * angle.cos(), cy + radius * angle.sin()));
    }
    vec![points]
}

fn points_contour(points_attr: &str) -> Vec<Vec<Point2<f64>>> {
    let values: Vec<f64> = points_attr
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    let points: Vec<Point2<f64>> = values
        .chunks_exact(2)
        .map(|xy| Point2::new(xy[0], xy[1]))
        .collect();

    if points.len() >= 3 {
        vec![points]
    } else {
        Vec::new()
    }
}

fn numeric_attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<f64> {
    attribute(element, key).and_then(|value| value.trim().parse().ok())
}

static RGB_FN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^rgb\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*\)$").unwrap());

/// Parse `#rgb`, `#rrggbb`, `rgb(r,g,b)` and the color names the
/// compositor emits. Unknown colors are dropped (element skipped for
/// fills, still usable for contour extraction).
fn parse_color(value: &str) -> Option<[u8; 4]> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        return match hex.len() {
            3 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
                Some([channel(0)?, channel(1)?, channel(2)?, 255])
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some([channel(0)?, channel(2)?, channel(4)?, 255])
            }
            _ => None,
        };
    }

    if let Some(caps) = RGB_FN.captures(value) {
        let channel = |i: usize| caps[i].parse::<u16>().ok().map(|v| v.min(255) as u8);
        return Some([channel(1)?, channel(2)?, channel(3)?, 255]);
    }

    match value.to_ascii_lowercase().as_str() {
        "black" => Some([0, 0, 0, 255]),
        "white" => Some([255, 255, 255, 255]),
        "red" => Some([255, 0, 0, 255]),
        "green" => Some([0, 128, 0, 255]),
        "blue" => Some([0, 0, 255, 255]),
        "yellow" => Some([255, 255, 0, 255]),
        "silver" => Some([192, 192, 192, 255]),
        "gray" | "grey" => Some([128, 128, 128, 255]),
        other => {
            log::debug!("unrecognized fill color {other:?}");
            None
        }
    }
}
