use crate::error::ExportError;
use crate::palette::Rgb;
use crate::renderer::{ArcView, SunburstRenderer};

pub fn to_csv(renderer: &SunburstRenderer, mut w: impl std::io::Write) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(&mut w);
    writer.write_record([
        "path", "name", "depth", "weight", "x0", "x1", "y0", "y1", "visible", "label",
    ])?;
    let h = renderer.hierarchy();
    for v in renderer.frame() {
        writer.write_record([
            h.path(v.id),
            v.name,
            v.depth.to_string(),
            v.weight.to_string(),
            v.geometry.x0.to_string(),
            v.geometry.x1.to_string(),
            v.geometry.y0.to_string(),
            v.geometry.y1.to_string(),
            v.visible.to_string(),
            v.label_visible.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_json(renderer: &SunburstRenderer) -> Result<serde_json::Value, ExportError> {
    let (width, height) = renderer.size();
    Ok(serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "focus": renderer.hierarchy().path(renderer.focus()),
        "width": width,
        "height": height,
        "total": renderer.hierarchy().total_weight(),
        "arcs": serde_json::to_value(renderer.frame())?,
    }))
}

fn path_data(points: &[(f64, f64)]) -> Option<String> {
    let (first, rest) = points.split_first()?;
    let mut d = format!("M {:.3} {:.3}", first.0, first.1);
    for p in rest {
        d.push_str(&format!(" L {:.3} {:.3}", p.0, p.1));
    }
    d.push_str(" Z");
    Some(d)
}

/// Static SVG of the current frame, centred on the origin. Only arcs inside
/// the ring window are emitted.
pub fn to_svg(renderer: &SunburstRenderer) -> String {
    use svg::node::element::{Circle, Group, Path, Text, Title};
    use svg::node::Text as SvgText;
    use svg::Document;

    let (width, height) = renderer.size();
    let frame = renderer.frame();
    let mut arcs = Group::new();
    let mut labels = Group::new()
        .set("text-anchor", "middle")
        .set("font-family", "sans-serif")
        .set("font-size", 10)
        .set("pointer-events", "none");

    for v in frame.iter().filter(|v| v.visible) {
        let Some(d) = path_data(&v.shape.outline(32.0)) else {
            continue;
        };
        arcs = arcs.add(
            Path::new()
                .set("d", d)
                .set("fill", v.color.to_hex())
                .set("fill-opacity", v.fill_opacity)
                .add(Title::new(v.tooltip.clone())),
        );
        if v.label_visible {
            let text = Text::new("")
                .set("x", v.label.x as f32)
                .set("y", v.label.y as f32)
                .set("dy", "0.35em")
                .add(SvgText::new(v.name.clone()));
            labels = labels.add(text);
        }
    }

    let center = Circle::new()
        .set("r", renderer.unit() as f32)
        .set("fill", "none")
        .set("pointer-events", "all")
        .add(Title::new(renderer.hierarchy().path(renderer.center_target())));

    Document::new()
        .set(
            "viewBox",
            format!("{} {} {} {}", -width / 2.0, -height / 2.0, width, height),
        )
        .set("width", width as f32)
        .set("height", height as f32)
        .set("xmlns", "http://www.w3.org/2000/svg")
        .add(arcs)
        .add(labels)
        .add(center)
        .to_string()
}

pub fn write_svg(renderer: &SunburstRenderer, out: &std::path::Path) -> Result<(), ExportError> {
    std::fs::write(out, to_svg(renderer))?;
    tracing::info!(path = %out.display(), "svg written");
    Ok(())
}

fn pdf_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(e.to_string())
}

fn blend_on_white(c: Rgb, alpha: f32) -> (f32, f32, f32) {
    let mix = |v: u8| (v as f32 * alpha + 255.0 * (1.0 - alpha)) / 255.0;
    (mix(c.0), mix(c.1), mix(c.2))
}

/// One-page A4 report: title plus the visible arcs as filled polygons.
pub fn to_pdf(renderer: &SunburstRenderer, out: &std::path::Path) -> Result<(), ExportError> {
    use printpdf::path::{PaintMode, WindingOrder};
    use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Point, Polygon};

    let (doc, page1, layer1) = PdfDocument::new("Sunburst Report", Mm(210.0), Mm(297.0), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let title = format!(
        "Sunburst: {}",
        renderer.hierarchy().path(renderer.focus())
    );
    layer.use_text(title, 14.0, Mm(15.0), Mm(280.0), &font);

    let window = renderer.config().ring_window.max(1) as f64 * renderer.unit();
    let scale = if window > 0.0 { 90.0 / window } else { 0.0 };
    let (cx, cy) = (105.0, 150.0);
    let visible: Vec<ArcView> = renderer.frame().into_iter().filter(|v| v.visible).collect();
    for v in &visible {
        let ring: Vec<(Point, bool)> = v
            .shape
            .outline(16.0)
            .into_iter()
            .map(|(x, y)| {
                let p = Point::new(Mm((cx + x * scale) as f32), Mm((cy - y * scale) as f32));
                (p, false)
            })
            .collect();
        if ring.len() < 3 {
            continue;
        }
        let (r, g, b) = blend_on_white(v.color, v.fill_opacity);
        layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(r, g, b, None)));
        layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    let file = std::fs::File::create(out)?;
    let mut buf = std::io::BufWriter::new(file);
    doc.save(&mut buf).map_err(pdf_err)?;
    tracing::info!(path = %out.display(), arcs = visible.len(), "pdf written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;
    use crate::model::Document;

    fn renderer() -> SunburstRenderer {
        let doc = Document::from_json_str(
            r#"{"name":"root","children":[{"name":"A","children":[{"name":"A1","value":2000}]},{"name":"B","value":1000}]}"#,
        )
        .unwrap();
        SunburstRenderer::new(&doc, 600.0, 600.0, ViewConfig::default()).unwrap()
    }

    #[test]
    fn csv_has_a_row_per_arc() {
        let mut buf = Vec::new();
        to_csv(&renderer(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("path,name,depth,weight"));
        assert!(lines[1].starts_with("root/A,A,1,2000,"));
    }

    #[test]
    fn json_lists_arcs_and_focus() {
        let json = to_json(&renderer()).unwrap();
        assert_eq!(json["focus"], "root");
        assert_eq!(json["arcs"].as_array().unwrap().len(), 3);
        assert_eq!(json["arcs"][0]["tooltip"], "root/A\n2,000");
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn svg_contains_visible_arcs_with_tooltips() {
        let svg = to_svg(&renderer());
        assert!(svg.contains("<svg"));
        assert_eq!(svg.matches("<path").count(), 3);
        assert_eq!(svg.matches("<text").count(), 3);
        assert!(svg.contains("root/B\n1,000"));
    }

    #[test]
    fn pdf_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.pdf");
        to_pdf(&renderer(), &out).unwrap();
        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
