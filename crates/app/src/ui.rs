use eframe::egui::{self, Color32, Pos2, Ui};
use egui_extras::{Column, TableBuilder};
use std::time::Duration;
use sunburst_core::human::human_weight;
use sunburst_core::{ArcView, Hit, NodeId, SunburstRenderer};

use crate::state::{AppState, Status};

pub fn draw(app: &mut AppState, ctx: &egui::Context) {
    let canvas = ctx.screen_rect().size();
    poll_load(app, ctx, (canvas.x as f64, canvas.y as f64));

    if app.load_rx.is_some() {
        ctx.request_repaint();
    }

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        top_bar(ui, app);
    });

    egui::SidePanel::left("sidebar")
        .resizable(true)
        .default_width(280.0)
        .show(ctx, |ui| {
            sidebar(ui, app);
        });

    egui::CentralPanel::default().show(ctx, |ui| match (&app.status, app.renderer.as_mut()) {
        (Status::Ready, Some(r)) => sunburst(ui, r),
        (Status::Loading, _) => {
            ui.centered_and_justified(|ui| {
                ui.spinner();
            });
        }
        (Status::NoData, _) => placeholder(ui, "No data: the dataset has nothing to weigh."),
        (Status::Failed(e), _) => placeholder(ui, &format!("Could not load dataset.\n{e}")),
        _ => placeholder(ui, "Open a dataset to start."),
    });

    tour_window(app, ctx);
}

fn placeholder(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui| {
        ui.label(text);
    });
}

fn top_bar(ui: &mut Ui, app: &mut AppState) {
    ui.horizontal(|ui| {
        if ui.button("Open dataset…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("JSON", &["json"])
                .pick_file()
            {
                app.start_load(path);
            }
        }
        if app.status == Status::Loading && ui.button("Cancel").clicked() {
            app.cancel_load();
        }
        ui.separator();
        let ready = app.renderer.is_some();
        if ui.add_enabled(ready, egui::Button::new("Zoom out")).clicked() {
            app.zoom_out();
        }
        if ui.add_enabled(ready, egui::Button::new("Reset")).clicked() {
            app.reset_view();
        }
        ui.separator();
        if ui.button("Show tour").clicked() {
            app.reset_tour();
        }
    });
}

fn sidebar(ui: &mut Ui, app: &mut AppState) {
    ui.heading("Dataset");
    match &app.dataset {
        Some(p) => ui.label(p.display().to_string()),
        None => ui.label("Choose a dataset to start"),
    };
    if let Some(at) = app.loaded_at {
        ui.label(format!(
            "Loaded {} ({} bytes)",
            at.format("%H:%M:%S"),
            app.loaded_bytes
        ));
    }

    let mut zoom: Option<NodeId> = None;
    if let Some(r) = &app.renderer {
        let h = r.hierarchy();
        ui.label(format!(
            "{} nodes, total {}",
            h.len(),
            human_weight(h.total_weight())
        ));
        ui.separator();
        ui.strong(format!("Focus: {}", h.path(r.focus())));

        let children = h.node(r.focus()).map(|n| n.children.clone()).unwrap_or_default();
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder())
            .column(Column::auto())
            .max_scroll_height(240.0)
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Name");
                });
                header.col(|ui| {
                    ui.strong("Weight");
                });
            })
            .body(|mut body| {
                for id in children {
                    let Some(n) = h.node(id) else { continue };
                    body.row(18.0, |mut row| {
                        row.col(|ui| {
                            if n.is_leaf() {
                                ui.label(&n.name);
                            } else if ui.link(&n.name).clicked() {
                                zoom = Some(id);
                            }
                        });
                        row.col(|ui| {
                            ui.label(human_weight(n.weight));
                        });
                    });
                }
            });
    }

    ui.separator();
    ui.label("Search:");
    ui.text_edit_singleline(&mut app.search);
    if let Some(r) = &app.renderer {
        for hit in app.search_hits(20) {
            if ui.button(r.hierarchy().path(hit.id)).clicked() {
                zoom = Some(hit.id);
            }
        }
    }

    if let Some(id) = zoom {
        app.zoom_to(id);
    }
}

fn sunburst(ui: &mut Ui, r: &mut SunburstRenderer) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
    let rect = response.rect;
    let center = rect.center();
    r.resize(rect.width() as f64, rect.height() as f64);

    let dt = ui.ctx().input(|i| i.stable_dt).min(0.1);
    if r.tick(Duration::from_secs_f32(dt)) {
        ui.ctx().request_repaint();
    }

    let frame = r.frame();
    for v in frame.iter().filter(|v| v.visible) {
        paint_arc(&painter, center, v);
    }
    for v in frame.iter().filter(|v| v.label_visible) {
        painter.text(
            center + egui::vec2(v.label.x as f32, v.label.y as f32),
            egui::Align2::CENTER_CENTER,
            &v.name,
            egui::FontId::proportional(10.0),
            Color32::WHITE,
        );
    }

    let hover = response
        .hover_pos()
        .and_then(|pos| r.hit_test((pos.x - center.x) as f64, (pos.y - center.y) as f64));
    let tooltip = match hover {
        Some(Hit::Arc(id)) => frame.iter().find(|v| v.id == id).map(|v| v.tooltip.clone()),
        Some(Hit::Center) if r.focus() != r.hierarchy().root => {
            Some(format!("Back to {}", r.hierarchy().path(r.center_target())))
        }
        _ => None,
    };
    let clickable = match hover {
        Some(Hit::Arc(id)) => frame.iter().any(|v| v.id == id && v.has_children),
        Some(Hit::Center) => r.focus() != r.hierarchy().root,
        None => false,
    };
    if clickable {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    let response = match tooltip {
        Some(text) => response.on_hover_text_at_pointer(text),
        None => response,
    };
    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            if r.click_at((pos.x - center.x) as f64, (pos.y - center.y) as f64) {
                ui.ctx().request_repaint();
            }
        }
    }
}

/// Fills an annular sector as a triangle strip between its outer and inner
/// edges.
fn paint_arc(painter: &egui::Painter, center: Pos2, v: &ArcView) {
    let points = v.shape.outline(24.0);
    let n = points.len() / 2;
    if n < 2 {
        return;
    }
    let alpha = (v.fill_opacity.clamp(0.0, 1.0) * 255.0) as u8;
    let color = Color32::from_rgba_unmultiplied(v.color.0, v.color.1, v.color.2, alpha);
    let mut mesh = egui::Mesh::default();
    for (x, y) in &points {
        mesh.colored_vertex(center + egui::vec2(*x as f32, *y as f32), color);
    }
    let last = points.len() as u32 - 1;
    for i in 0..(n as u32 - 1) {
        let (o0, o1) = (i, i + 1);
        let (i0, i1) = (last - i, last - i - 1);
        mesh.add_triangle(o0, o1, i0);
        mesh.add_triangle(o1, i1, i0);
    }
    painter.add(egui::Shape::mesh(mesh));
}

fn tour_window(app: &mut AppState, ctx: &egui::Context) {
    if !app.tour.is_open() {
        return;
    }
    let (title, body) = app.tour.current();
    let step = app.tour.step();
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label(body);
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label(format!("{}/{}", step + 1, crate::tour::STEPS.len()));
                if ui.add_enabled(step > 0, egui::Button::new("Back")).clicked() {
                    app.tour.back();
                }
                let next = if app.tour.is_last() { "Done" } else { "Next" };
                if ui.button(next).clicked() {
                    app.tour.next();
                }
                if ui.button("Skip").clicked() {
                    app.tour.skip();
                }
            });
        });
}

fn poll_load(app: &mut AppState, ctx: &egui::Context, canvas: (f64, f64)) {
    // Take ownership of the receiver to avoid borrowing while we might assign to it.
    let Some(rx) = app.load_rx.take() else {
        return;
    };
    let mut had_msg = false;
    let mut finished = false;
    while let Ok(msg) = rx.try_recv() {
        had_msg = true;
        if app.apply(msg, canvas) {
            finished = true;
            break;
        }
    }
    if !finished {
        // Put the receiver back to keep polling next frame
        app.load_rx = Some(rx);
    }
    if had_msg {
        ctx.request_repaint();
    }
}
