//! Zoomable sunburst: owns the partitioned hierarchy, the focus, and the
//! geometry snapshots a zoom transition interpolates between.

use serde::Serialize;
use std::time::Duration;

use crate::config::ViewConfig;
use crate::error::LayoutError;
use crate::geometry::{arc_visible, label_visible, lerp, to_polar, ArcGeometry, ArcShape, LabelAnchor};
use crate::hierarchy::{Hierarchy, NodeId};
use crate::human::human_weight;
use crate::model::Document;
use crate::palette::{Palette, Rgb};
use crate::transition::Transition;

/// What a point on the canvas lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The disc inside the first ring; clicking it zooms out.
    Center,
    Arc(NodeId),
}

/// Everything needed to draw one arc for the current frame.
#[derive(Debug, Clone, Serialize)]
pub struct ArcView {
    pub id: NodeId,
    pub name: String,
    pub depth: u32,
    pub weight: f64,
    pub has_children: bool,
    pub geometry: ArcGeometry,
    pub shape: ArcShape,
    pub color: Rgb,
    pub fill_opacity: f32,
    pub visible: bool,
    pub label_visible: bool,
    pub label: LabelAnchor,
    pub tooltip: String,
}

pub struct SunburstRenderer {
    hierarchy: Hierarchy,
    cfg: ViewConfig,
    width: f64,
    height: f64,
    /// Geometry at the start of the running transition, or the settled
    /// geometry when idle.
    from: Vec<ArcGeometry>,
    target: Vec<ArcGeometry>,
    transition: Option<Transition>,
    focus: NodeId,
    center_target: NodeId,
    colors: Vec<Rgb>,
    tooltips: Vec<String>,
}

impl SunburstRenderer {
    pub fn new(doc: &Document, width: f64, height: f64, cfg: ViewConfig) -> Result<Self, LayoutError> {
        let hierarchy = Hierarchy::build(doc);
        let total = hierarchy.total_weight();
        if !(total > 0.0 && total.is_finite()) {
            tracing::warn!(root = %doc.root().name, "document has no weight to draw");
            return Err(LayoutError::NoData);
        }

        let colors = match cfg.parsed_palette() {
            Ok(colors) => colors,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to the default palette");
                ViewConfig::default().parsed_palette().unwrap_or_default()
            }
        };
        let mut palette = Palette::new(colors);
        let root = hierarchy.root;
        if let Some(r) = hierarchy.node(root) {
            for c in &r.children {
                if let Some(n) = hierarchy.node(*c) {
                    palette.color_for(&n.name);
                }
            }
        }
        let colors = hierarchy
            .nodes
            .iter()
            .map(|n| {
                hierarchy
                    .top_level(n.id)
                    .and_then(|t| hierarchy.node(t))
                    .and_then(|t| palette.get(&t.name))
                    .unwrap_or(Rgb(0x99, 0x99, 0x99))
            })
            .collect();
        let tooltips = hierarchy
            .nodes
            .iter()
            .map(|n| format!("{}\n{}", hierarchy.path(n.id), human_weight(n.weight)))
            .collect();

        let base: Vec<ArcGeometry> = hierarchy.nodes.iter().map(|n| n.base).collect();
        Ok(Self {
            from: base.clone(),
            target: base,
            transition: None,
            focus: root,
            center_target: root,
            hierarchy,
            cfg,
            width: width.max(0.0),
            height: height.max(0.0),
            colors,
            tooltips,
        })
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn config(&self) -> &ViewConfig {
        &self.cfg
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    /// The node a click on the centre disc zooms to.
    pub fn center_target(&self) -> NodeId {
        self.center_target
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Pixel radius of one ring.
    pub fn unit(&self) -> f64 {
        self.width.min(self.height) / 6.0
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Geometry as drawn right now, interpolated if a transition runs.
    pub fn current(&self, id: NodeId) -> Option<ArcGeometry> {
        let i = id.0 as usize;
        let (from, to) = (self.from.get(i)?, self.target.get(i)?);
        Some(match &self.transition {
            Some(t) => lerp(from, to, t.eased()),
            None => *to,
        })
    }

    pub fn target(&self, id: NodeId) -> Option<ArcGeometry> {
        self.target.get(id.0 as usize).copied()
    }

    /// Zooms into a visible arc that has children. Leaves, hidden arcs and
    /// unknown ids are ignored.
    pub fn click_arc(&mut self, id: NodeId) -> bool {
        let Some(node) = self.hierarchy.node(id) else {
            return false;
        };
        if node.is_leaf() {
            return false;
        }
        match self.target(id) {
            Some(g) if arc_visible(&g, &self.cfg) => {
                self.retarget(id);
                true
            }
            _ => false,
        }
    }

    /// Zooms out to the parent of the focus. No-op at the root.
    pub fn click_center(&mut self) -> bool {
        if self.focus == self.hierarchy.root {
            return false;
        }
        self.retarget(self.center_target);
        true
    }

    /// Focuses any node directly. A leaf has nothing to show in its own
    /// frame, so its parent is focused instead. A zero-width node would
    /// blank the diagram, so the nearest ancestor with angular extent is
    /// focused in its place.
    pub fn zoom_to(&mut self, id: NodeId) -> bool {
        let Some(node) = self.hierarchy.node(id) else {
            return false;
        };
        let start = if node.is_leaf() {
            self.hierarchy.parent_or_root(id)
        } else {
            id
        };
        let focus = self
            .hierarchy
            .ancestors(start)
            .into_iter()
            .find(|a| {
                self.hierarchy
                    .node(*a)
                    .is_some_and(|n| n.base.angular_span() > 0.0)
            })
            .unwrap_or(self.hierarchy.root);
        self.retarget(focus);
        true
    }

    pub fn click_at(&mut self, x: f64, y: f64) -> bool {
        match self.hit_test(x, y) {
            Some(Hit::Center) => self.click_center(),
            Some(Hit::Arc(id)) => self.click_arc(id),
            None => false,
        }
    }

    /// Resolves a point given relative to the canvas centre.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<Hit> {
        let unit = self.unit();
        let (radius, angle) = to_polar(x, y);
        if radius < unit {
            return Some(Hit::Center);
        }
        self.hierarchy
            .nodes
            .iter()
            .filter(|n| n.id != self.hierarchy.root)
            .filter(|n| {
                self.target(n.id)
                    .map(|g| arc_visible(&g, &self.cfg))
                    .unwrap_or(false)
            })
            .find(|n| {
                self.current(n.id)
                    .map(|g| ArcShape::from_geometry(&g, unit, &self.cfg).contains_polar(radius, angle))
                    .unwrap_or(false)
            })
            .map(|n| Hit::Arc(n.id))
    }

    /// Advances the running transition. Returns whether one is still in
    /// flight afterwards.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if let Some(t) = &mut self.transition {
            t.tick(dt);
            if t.is_complete() {
                self.settle();
            }
        }
        self.transition.is_some()
    }

    /// Jumps the running transition to its end.
    pub fn finish(&mut self) {
        if self.transition.is_some() {
            self.settle();
        }
    }

    pub fn frame(&self) -> Vec<ArcView> {
        let unit = self.unit();
        self.hierarchy
            .nodes
            .iter()
            .filter(|n| n.id != self.hierarchy.root)
            .filter_map(|n| {
                let i = n.id.0 as usize;
                let g = self.current(n.id)?;
                let visible = arc_visible(&g, &self.cfg);
                let fill_opacity = match (visible, n.is_leaf()) {
                    (false, _) => 0.0,
                    (true, true) => self.cfg.leaf_opacity,
                    (true, false) => self.cfg.branch_opacity,
                };
                Some(ArcView {
                    id: n.id,
                    name: n.name.clone(),
                    depth: n.depth,
                    weight: n.weight,
                    has_children: !n.is_leaf(),
                    geometry: g,
                    shape: ArcShape::from_geometry(&g, unit, &self.cfg),
                    color: self.colors[i],
                    fill_opacity,
                    visible,
                    label_visible: label_visible(&g, &self.cfg),
                    label: LabelAnchor::for_geometry(&g, unit),
                    tooltip: self.tooltips[i].clone(),
                })
            })
            .collect()
    }

    /// Recomputes every target relative to `focus` and starts a transition
    /// from whatever is on screen, so a click mid-flight retargets smoothly.
    fn retarget(&mut self, focus: NodeId) {
        let Some(p) = self.hierarchy.node(focus) else {
            return;
        };
        let (pbase, pdepth) = (p.base, p.depth as f64);
        let on_screen: Vec<ArcGeometry> = (0..self.hierarchy.len())
            .filter_map(|i| self.current(NodeId(i as u64)))
            .collect();
        self.target = self
            .hierarchy
            .nodes
            .iter()
            .map(|n| n.base.relative_to(&pbase, pdepth))
            .collect();
        self.from = on_screen;
        self.focus = focus;
        self.center_target = self.hierarchy.parent_or_root(focus);
        self.transition = Some(Transition::new(self.cfg.transition_duration()));
        tracing::debug!(
            focus = %self.hierarchy.path(focus),
            center = self.center_target.0,
            "zoom retargeted"
        );
    }

    fn settle(&mut self) {
        self.from = self.target.clone();
        self.transition = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    const EPS: f64 = 1e-9;

    fn renderer(json: &str) -> SunburstRenderer {
        let doc = Document::from_json_str(json).unwrap();
        SunburstRenderer::new(&doc, 600.0, 600.0, ViewConfig::default()).unwrap()
    }

    fn id(r: &SunburstRenderer, name: &str) -> NodeId {
        r.hierarchy().nodes.iter().find(|n| n.name == name).unwrap().id
    }

    const TWO: &str = r#"{"name":"root","children":[
        {"name":"A","children":[{"name":"A1","value":2},{"name":"A2","value":1,"children":[{"name":"A2a","value":1}]}]},
        {"name":"B","value":1}
    ]}"#;

    #[test]
    fn zero_weight_root_is_no_data() {
        for json in [
            r#"{"name":"root"}"#,
            r#"{"name":"root","children":[]}"#,
            r#"{"name":"root","children":[{"name":"a","value":0}]}"#,
        ] {
            let doc = Document::from_json_str(json).unwrap();
            let err = SunburstRenderer::new(&doc, 100.0, 100.0, ViewConfig::default()).err();
            assert_eq!(err, Some(LayoutError::NoData), "{json}");
        }
    }

    #[test]
    fn initial_layout_of_two_leaves() {
        let r = renderer(r#"{"name":"root","children":[{"name":"A","value":3},{"name":"B","value":1}]}"#);
        let a = r.current(id(&r, "A")).unwrap();
        let b = r.current(id(&r, "B")).unwrap();
        assert!(a.approx_eq(&ArcGeometry::new(0.0, 1.5 * PI, 1.0, 2.0), EPS));
        assert!(b.approx_eq(&ArcGeometry::new(1.5 * PI, TAU, 1.0, 2.0), EPS));
        assert_eq!(r.focus(), r.hierarchy().root);
        assert_eq!(r.frame().len(), 2);
    }

    #[test]
    fn clicking_a_branch_makes_it_the_centre() {
        let mut r = renderer(TWO);
        let a = id(&r, "A");
        assert!(r.click_arc(a));
        assert_eq!(r.focus(), a);
        assert_eq!(r.center_target(), r.hierarchy().root);
        let t = r.target(a).unwrap();
        assert!(t.approx_eq(&ArcGeometry::new(0.0, TAU, 0.0, 1.0), EPS));
        r.finish();
        let views = r.frame();
        let view = |n: &str| views.iter().find(|v| v.name == n).unwrap();
        assert!(!view("A").visible);
        assert!(!view("B").visible);
        assert!(view("A1").visible);
        assert_eq!(view("A1").geometry.y0, 1.0);
        assert!(view("A2a").visible);
    }

    #[test]
    fn leaves_and_hidden_arcs_ignore_clicks() {
        let mut r = renderer(TWO);
        assert!(!r.click_arc(id(&r, "B")));
        assert!(!r.click_arc(id(&r, "A2a")));
        assert!(!r.click_arc(r.hierarchy().root));
        assert!(!r.click_arc(NodeId(999)));
        assert!(!r.click_center());
        assert!(!r.is_animating());
    }

    #[test]
    fn zoom_out_restores_initial_targets() {
        let mut r = renderer(TWO);
        let before: Vec<_> = r.hierarchy().nodes.iter().map(|n| r.target(n.id).unwrap()).collect();
        r.click_arc(id(&r, "A"));
        r.finish();
        assert!(r.click_center());
        assert_eq!(r.focus(), r.hierarchy().root);
        for (n, g) in r.hierarchy().nodes.iter().zip(before) {
            assert!(r.target(n.id).unwrap().approx_eq(&g, EPS), "{}", n.name);
        }
    }

    #[test]
    fn transition_interpolates_then_settles() {
        let mut r = renderer(TWO);
        let a = id(&r, "A");
        let start = r.current(a).unwrap();
        r.click_arc(a);
        assert!(r.is_animating());
        assert_eq!(r.current(a).unwrap(), start);
        assert!(r.tick(Duration::from_millis(375)));
        let mid = r.current(a).unwrap();
        assert!(mid.x1 > start.x1 && mid.x1 < TAU);
        assert!(!r.tick(Duration::from_millis(400)));
        assert_eq!(r.current(a), r.target(a));
    }

    #[test]
    fn click_mid_flight_starts_from_interpolated_state() {
        let mut r = renderer(TWO);
        let a = id(&r, "A");
        r.click_arc(a);
        r.tick(Duration::from_millis(300));
        let mid = r.current(id(&r, "B")).unwrap();
        assert!(r.click_center());
        assert_eq!(r.current(id(&r, "B")).unwrap(), mid);
        r.finish();
        let b = r.current(id(&r, "B")).unwrap();
        assert!(b.approx_eq(&r.hierarchy().node(id(&r, "B")).unwrap().base, EPS));
    }

    #[test]
    fn hit_testing() {
        let r = renderer(r#"{"name":"root","children":[{"name":"A","value":3},{"name":"B","value":1}]}"#);
        // unit = 100px; ring 1 spans radius 100..199.
        assert_eq!(r.hit_test(0.0, 0.0), Some(Hit::Center));
        assert_eq!(r.hit_test(150.0, 0.0), Some(Hit::Arc(id(&r, "A"))));
        assert_eq!(r.hit_test(-100.0, -100.0), Some(Hit::Arc(id(&r, "B"))));
        assert_eq!(r.hit_test(250.0, 0.0), None);
    }

    #[test]
    fn colours_follow_top_level_ancestor() {
        let r = renderer(TWO);
        let views = r.frame();
        let color = |n: &str| views.iter().find(|v| v.name == n).unwrap().color;
        assert_eq!(color("A1"), color("A"));
        assert_eq!(color("A2a"), color("A"));
        assert_ne!(color("A"), color("B"));
    }

    #[test]
    fn opacity_and_tooltips() {
        let r = renderer(TWO);
        let views = r.frame();
        let view = |n: &str| views.iter().find(|v| v.name == n).unwrap();
        assert_eq!(view("A").fill_opacity, 0.6);
        assert_eq!(view("B").fill_opacity, 0.4);
        assert_eq!(view("A2a").fill_opacity, 0.0);
        assert_eq!(view("A2").tooltip, "root/A/A2\n1");
    }

    #[test]
    fn zoom_to_leaf_focuses_parent() {
        let mut r = renderer(TWO);
        assert!(r.zoom_to(id(&r, "A2a")));
        assert_eq!(r.focus(), id(&r, "A2"));
        assert_eq!(r.center_target(), id(&r, "A"));
        assert!(!r.zoom_to(NodeId(42)));
    }

    #[test]
    fn zoom_to_zero_weight_branch_keeps_diagram_drawn() {
        let mut r = renderer(
            r#"{"name":"root","children":[
                {"name":"a","children":[{"name":"a1","value":1},{"name":"z","children":[{"name":"z1","value":0}]}]},
                {"name":"b","value":1}
            ]}"#,
        );
        assert!(r.zoom_to(id(&r, "z")));
        assert_eq!(r.focus(), id(&r, "a"));
        r.finish();
        assert!(r.frame().iter().any(|v| v.visible));

        assert!(r.zoom_to(id(&r, "z1")));
        assert_eq!(r.focus(), id(&r, "a"));
    }

    #[test]
    fn bad_palette_falls_back_to_default_colours() {
        let doc = Document::from_json_str(TWO).unwrap();
        let cfg = ViewConfig {
            palette: vec!["bad".into()],
            ..ViewConfig::default()
        };
        let r = SunburstRenderer::new(&doc, 600.0, 600.0, cfg).unwrap();
        let views = r.frame();
        let color = |n: &str| views.iter().find(|v| v.name == n).unwrap().color;
        assert_eq!(color("A"), Rgb::from_hex("#4e79a7").unwrap());
        assert_eq!(color("B"), Rgb::from_hex("#f28e2c").unwrap());
    }
}
