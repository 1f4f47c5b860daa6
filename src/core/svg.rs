//! Serializes the current frame of a [`Scene`] as a standalone SVG document.
//!
//! Only geometry, opacity, per-thumbnail filters and class names are written; how
//! the classes look is up to whoever embeds the document.

use std::fmt::{self, Write};
use std::path::Path;

use crate::edges::{EdgeCategory, Segment};
use crate::error::Result;
use crate::scene::Scene;

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_markers<W: Write>(out: &mut W) -> fmt::Result {
    out.write_str("<defs>")?;
    for category in [EdgeCategory::Forward, EdgeCategory::Weight, EdgeCategory::Gradient] {
        write!(
            out,
            r#"<marker id="{}" class="{}" markerWidth="10" markerHeight="10" refX="10" refY="0" orient="auto" viewBox="0 -5 10 10"><path d="M0,-5L10,0L0,5"/></marker>"#,
            category.marker_id(),
            category.class_name()
        )?;
    }
    out.write_str("</defs>")
}

fn write_line<W: Write>(
    out: &mut W,
    class: &str,
    seg: &Segment,
    opacity: f64,
    marker: &str,
    id: &str,
) -> fmt::Result {
    write!(
        out,
        r#"<line data-id="{}" class="{}" x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" opacity="{:.3}" marker-end="url(#{})"/>"#,
        escape(id),
        class,
        seg.x1,
        seg.y1,
        seg.x2,
        seg.y2,
        opacity,
        marker
    )
}

pub fn write_svg<W: Write>(scene: &Scene, out: &mut W) -> fmt::Result {
    let layout = scene.layout();
    let [x, y, w, h] = layout.view_box();
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x} {y} {w} {h}">"#
    )?;
    write_markers(out)?;

    for r in layout.regions() {
        let c = r.center();
        write!(
            out,
            r#"<g class="region" data-id="{name}"><rect class="compBox {name}" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"/><text class="compLabel" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text></g>"#,
            r.x,
            r.y,
            r.width,
            r.height,
            c.x,
            c.y + 5.0,
            escape(r.kind.label()),
            name = r.kind.name(),
        )?;
    }

    out.write_str(r#"<g class="edges">"#)?;
    for (id, node) in scene.edges().iter() {
        let edge = node.datum();
        let mut class = format!("archEdge {}", edge.category.class_name());
        if edge.dashed {
            class.push_str(" dashed");
        }
        write_line(
            out,
            &class,
            node.shape(),
            node.opacity(),
            edge.category.marker_id(),
            id,
        )?;
    }
    out.write_str("</g>")?;

    let size = scene.thumbnail_size();
    out.write_str(r#"<g class="prototypes">"#)?;
    for (id, node) in scene.prototypes().iter() {
        let p = node.datum();
        let shape = node.shape();
        write!(
            out,
            r#"<image data-id="{}" class="protoImage" href="{}" x="{:.1}" y="{:.1}" width="{size}" height="{size}" opacity="{:.3}""#,
            escape(id),
            escape(&p.image_ref),
            shape.position.x,
            shape.position.y,
            node.opacity()
        )?;
        if let Some(filter) = shape.filter {
            write!(out, r#" style="filter: {filter}""#)?;
        }
        write!(out, "><title>{}</title></image>", escape(&p.label))?;
    }
    out.write_str("</g>")?;

    out.write_str(r#"<g class="losses">"#)?;
    for (id, node) in scene.losses().iter() {
        let marker = node.datum();
        let c = node.shape();
        write!(
            out,
            r#"<g class="lossGroup" data-id="{}" opacity="{:.3}">"#,
            escape(id),
            node.opacity()
        )?;
        if let Some(stem) = &marker.stem {
            write_line(
                out,
                "archEdge gradArrow",
                stem,
                1.0,
                EdgeCategory::Gradient.marker_id(),
                &format!("{id}_grad"),
            )?;
        }
        write!(
            out,
            r#"<circle class="lossCircle" cx="{:.1}" cy="{:.1}" r="15"/><text class="lossLabel" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text></g>"#,
            c.x,
            c.y,
            c.x,
            c.y + 5.0,
            escape(marker.label)
        )?;
    }
    out.write_str("</g></svg>")
}

pub fn render_svg(scene: &Scene) -> String {
    let mut s = String::new();
    // Writing into a String cannot fail.
    let _ = write_svg(scene, &mut s);
    s
}

pub fn export_svg(scene: &Scene, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path, render_svg(scene))?;
    Ok(())
}
