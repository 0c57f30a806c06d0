#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use dragsort::MemoryDom;
use dragsort::sortable::{
    Capabilities, Dom as _, ElementId, EventKind, EventTarget, SortableDrag, SortableOptions,
};
use eframe::egui;

const ROW: egui::Vec2 = egui::vec2(260.0, 36.0);
const SPACING: f32 = 6.0;
const ORIGIN: egui::Pos2 = egui::pos2(20.0, 20.0);

const FRUITS: [&str; 6] = ["Apple", "Banana", "Cherry", "Damson", "Elderberry", "Fig"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rendering {
    Transform,
    Layout,
}

impl Rendering {
    fn capabilities(self) -> Capabilities {
        match self {
            Self::Transform => Capabilities::manual(),
            Self::Layout => Capabilities::manual_layout_only(),
        }
    }
}

struct App {
    dom: MemoryDom,
    list: ElementId,
    labels: ahash::HashMap<ElementId, &'static str>,
    drag: SortableDrag,
    rendering: Rendering,
    options: SortableOptions,
}

impl Default for App {
    fn default() -> Self {
        let mut dom = MemoryDom::new();
        let list = dom.create_element(
            dom.root(),
            "ul",
            egui::Rect::from_min_size(ORIGIN, egui::vec2(ROW.x, 400.0)),
        );
        let mut labels = ahash::HashMap::default();
        for fruit in FRUITS {
            let item = dom.create_element(list, "li", egui::Rect::from_min_size(ORIGIN, ROW));
            labels.insert(item, fruit);
        }

        let options = SortableOptions {
            debug_event_log: true,
            ..SortableOptions::sortable()
        };
        let rendering = Rendering::Transform;
        let mut app = Self {
            drag: SortableDrag::new(rendering.capabilities(), options.clone()),
            dom,
            list,
            labels,
            rendering,
            options,
        };
        app.rebuild();
        app
    }
}

impl App {
    /// Put every row back in its slot and attach a fresh controller with the current settings.
    fn rebuild(&mut self) {
        self.drag.detach(&mut self.dom);

        let items = self.dom.children(self.list).to_vec();
        for &item in &items {
            self.dom.remove_attribute(item, "style");
        }
        self.dom.layout_column(self.list, ORIGIN, SPACING);

        let caps = self.rendering.capabilities();
        match SortableDrag::attach_new(&mut self.dom, caps, items, self.options.clone()) {
            Ok(drag) => self.drag = drag,
            Err(err) => log::error!("attach failed: {err}"),
        }
    }

    /// Turn this frame's pointer input into host events.
    fn feed_pointer(&mut self, ctx: &egui::Context, offset: egui::Vec2) {
        let (pos, pressed, released, moving) = ctx.input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.is_moving(),
            )
        });
        let Some(pos) = pos else {
            return;
        };
        let page = pos - offset;
        let target = self
            .dom
            .element_at(page)
            .map_or(EventTarget::Document, EventTarget::Element);

        if pressed {
            let _ = self.dom.dispatch(&mut self.drag, EventKind::MouseDown, target, page);
        } else if released {
            let _ = self.dom.dispatch(&mut self.drag, EventKind::MouseUp, target, page);
            if self.options.sort {
                // The in-memory host has no layout engine.
                self.dom.layout_column(self.list, ORIGIN, SPACING);
            }
        } else if moving {
            let _ = self.dom.dispatch(&mut self.drag, EventKind::MouseMove, target, page);
        }
    }

    fn paint(&self, ui: &egui::Ui, offset: egui::Vec2) {
        let painter = ui.painter();
        let mut items = self.dom.children(self.list).to_vec();
        items.sort_by_key(|&id| {
            self.dom
                .inline_style(id, "z-index")
                .and_then(|z| z.parse::<i64>().ok())
                .unwrap_or(0)
        });

        for id in items {
            let Some(rect) = self.dom.visual_rect(id) else {
                continue;
            };
            let rect = rect.translate(offset);
            let fill = if self.drag.drag_item() == Some(id) {
                ui.visuals().selection.bg_fill
            } else if self.drag.beneath() == Some(id) {
                ui.visuals().widgets.hovered.bg_fill
            } else {
                ui.visuals().widgets.inactive.bg_fill
            };
            painter.rect_filled(rect, 4.0, fill);
            painter.text(
                rect.left_center() + egui::vec2(12.0, 0.0),
                egui::Align2::LEFT_CENTER,
                self.labels.get(&id).copied().unwrap_or("?"),
                egui::TextStyle::Button.resolve(ui.style()),
                ui.visuals().text_color(),
            );
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::right("dragsort_demo_controls")
            .min_width(280.0)
            .show(ctx, |ui| {
                let mut changed = false;
                changed |= ui.checkbox(&mut self.options.sort, "Sort on drop").changed();
                changed |= ui
                    .checkbox(&mut self.options.hit_test_beneath, "Hit-test rows beneath")
                    .changed();
                changed |= ui
                    .radio_value(&mut self.rendering, Rendering::Transform, "Render with transform")
                    .changed();
                changed |= ui
                    .radio_value(&mut self.rendering, Rendering::Layout, "Render with left/top")
                    .changed();
                if ui.button("Reset").clicked() || changed {
                    self.rebuild();
                }

                ui.separator();
                ui.label(format!("phase: {:?}", self.drag.phase()));
                ui.label(format!("beneath: {:?}", self.drag.beneath()));
                ui.label(format!("listeners: {}", self.drag.listener_count()));

                ui.separator();
                ui.horizontal(|ui| {
                    ui.strong("Event log");
                    if ui.small_button("Clear").clicked() {
                        self.drag.debug_log_clear();
                    }
                });
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        ui.monospace(self.drag.debug_log_text());
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, _resp) = ui.allocate_exact_size(
                ui.available_size_before_wrap(),
                egui::Sense::click_and_drag(),
            );
            let offset = rect.min.to_vec2();

            self.feed_pointer(ctx, offset);
            self.dom.run_frames(&mut self.drag);
            self.paint(ui, offset);
        });

        if self.drag.is_dragging() {
            ctx.request_repaint();
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 520.0])
            .with_title("dragsort: sortable list"),
        ..Default::default()
    };
    eframe::run_native(
        "dragsort: sortable list",
        options,
        Box::new(|_cc| Ok(Box::new(App::default()))),
    )
}
