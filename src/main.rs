mod block;
mod block_manager;
mod chain;
mod config;
mod connect;
mod constants;
mod deferred;
mod layout;
mod paths;
mod snap;

use block::{Block, BlockConfig, BlockContent, BLOCK_CATALOG};
use block_manager::BlockManager;
use config::EditorConfig;
use constants::{
    BLOCK_CORNER_RADIUS, COLOR_CONNECTOR_HIGHLIGHT, COLOR_DELETE_BUTTON, COLOR_LINKED_STROKE,
    COLOR_SNAP_TARGET, COLOR_STANDALONE_STROKE, COLOR_TOOLBAR_BG, CONNECTOR_DEPTH,
    CONNECTOR_WIDTH, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH, TOOLBAR_BUTTON_SIZE,
    TOOLBAR_START_SPACING,
};
use eframe::egui::{self, Align2, Color32, FontId, Id, Rect, RichText, Sense, Shape, Stroke, Vec2};
use egui::{pos2, vec2};
use paths::AppPaths;
use uuid::Uuid;

const DELETE_BUTTON_SIZE: f32 = 20.0;
const MAX_SETTING: f32 = 400.0;
const SPAWN_ORIGIN: [f32; 2] = [160.0, 120.0];
const SPAWN_STEP: [f32; 2] = [40.0, 30.0];

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT])
            .with_app_id("snap_blocks"),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "Snap Blocks",
        options,
        Box::new(|cc| Ok(Box::new(SnapBlocksApp::new(cc)))),
    )
}

/// Pointer drag currently feeding the manager.
struct DragInput {
    id: Uuid,
    total: Vec2,
    cancelled: bool,
}

enum MenuAction {
    InsertAfter(&'static BlockConfig),
    Delete,
}

/// Per-block painting inputs gathered from the manager.
struct BlockStyle {
    label: Option<String>,
    has_incoming: bool,
    opacity: f32,
    snap_target: bool,
}

struct SnapBlocksApp {
    manager: BlockManager,
    config: EditorConfig,
    paths: Option<AppPaths>,
    drag: Option<DragInput>,
    menu_target: Option<Uuid>,
    delete_affordance: Option<Uuid>,
    show_help: bool,
    show_settings: bool,
    spawned: usize,
}

impl SnapBlocksApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let paths = AppPaths::from_project_dirs();
        let config = EditorConfig::load_or_default(paths.as_ref());
        Self {
            manager: BlockManager::with_config(&config),
            config,
            paths,
            drag: None,
            menu_target: None,
            delete_affordance: None,
            show_help: false,
            show_settings: false,
            spawned: 0,
        }
    }

    fn spawn_block(&mut self, kind: &'static BlockConfig) {
        let step = (self.spawned % 5) as f32;
        let position = pos2(
            SPAWN_ORIGIN[0] + step * SPAWN_STEP[0],
            SPAWN_ORIGIN[1] + step * SPAWN_STEP[1],
        );
        self.manager.add_block(position, BlockContent::new(kind));
        self.spawned += 1;
    }

    fn reset_interaction(&mut self) {
        self.drag = None;
        self.menu_target = None;
        self.delete_affordance = None;
    }

    fn save_config(&self) {
        let Some(paths) = &self.paths else {
            log::warn!("no config directory available, settings not saved");
            return;
        };
        if let Err(err) = paths.ensure_dirs_exist() {
            log::error!("{}", err);
            return;
        }
        match self.config.save_to(&paths.config_file()) {
            Ok(()) => log::info!("settings saved to {}", paths.config_file().display()),
            Err(err) => log::error!("{err:#}"),
        }
    }

    fn advance_deferred(&mut self, dt: f32, ctx: &egui::Context) {
        if self.manager.advance(dt) > 0 {
            if let Some(id) = self.menu_target {
                if self.manager.get(id).is_none() {
                    self.menu_target = None;
                }
            }
            ctx.request_repaint();
        }
        // Keep painting while a fade-out is running.
        if self.manager.time_until_next_task().is_some() {
            ctx.request_repaint();
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar")
            .frame(
                egui::Frame::default()
                    .fill(COLOR_TOOLBAR_BG)
                    .inner_margin(4.0)
                    .outer_margin(0.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add_space(TOOLBAR_START_SPACING);
                    for kind in BLOCK_CATALOG.iter() {
                        let text = RichText::new(kind.name).color(Color32::WHITE);
                        let button = egui::Button::new(text)
                            .fill(kind.color)
                            .min_size(Vec2::new(0.0, TOOLBAR_BUTTON_SIZE));
                        if ui
                            .add(button)
                            .on_hover_text(kind.input.hint())
                            .clicked()
                        {
                            self.spawn_block(kind);
                        }
                    }

                    ui.separator();

                    if toolbar_icon(ui, "⛓", "Disconnect All") {
                        self.manager.clear_all_links();
                    }
                    if toolbar_icon(ui, "🗑", "Clear All") {
                        self.manager.clear_all();
                        self.reset_interaction();
                    }
                    if toolbar_icon(ui, "⚙", "Settings") {
                        self.show_settings = !self.show_settings;
                    }
                    if toolbar_icon(ui, "❓", "Help") {
                        self.show_help = !self.show_help;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!("{} blocks", self.manager.block_count()))
                                .color(Color32::LIGHT_GRAY),
                        );
                    });
                });
            });
    }

    fn show_canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (canvas, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
            let origin = canvas.rect.min.to_vec2();

            if canvas.clicked() {
                self.menu_target = None;
                self.delete_affordance = None;
            }

            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                if let Some(drag) = self.drag.as_mut() {
                    drag.cancelled = true;
                    self.manager.cancel_drag();
                }
                self.menu_target = None;
            }

            let hit_rects: Vec<(Uuid, Rect)> = self
                .manager
                .blocks()
                .iter()
                .map(|b| (b.id, b.rect().translate(origin)))
                .collect();

            for (id, rect) in hit_rects {
                let response = ui.interact(rect, Id::new(id), Sense::click_and_drag());

                if response.drag_started_by(egui::PointerButton::Primary) {
                    self.drag = Some(DragInput {
                        id,
                        total: Vec2::ZERO,
                        cancelled: false,
                    });
                    self.menu_target = None;
                    self.delete_affordance = None;
                }

                if response.dragged_by(egui::PointerButton::Primary) {
                    let delta = response.drag_delta();
                    if let Some(drag) = self.drag.as_mut() {
                        if drag.id == id && !drag.cancelled && delta != Vec2::ZERO {
                            drag.total += delta;
                            self.manager.on_drag_changed(id, delta);
                        }
                    }
                }

                if response.drag_stopped() {
                    if let Some(drag) = self.drag.take() {
                        if drag.id == id && !drag.cancelled {
                            self.manager.on_drag_ended(id, drag.total);
                        }
                    }
                }

                if response.clicked() {
                    self.menu_target = Some(id);
                    self.delete_affordance = None;
                }

                if response.secondary_clicked() || response.long_touched() {
                    self.delete_affordance = match self.delete_affordance {
                        Some(current) if current == id => None,
                        _ => Some(id),
                    };
                }
            }

            if let Some(id) = self.delete_affordance {
                match self.manager.get(id).map(|b| b.rect().translate(origin)) {
                    Some(rect) => {
                        let button = Rect::from_center_size(
                            rect.right_top(),
                            Vec2::splat(DELETE_BUTTON_SIZE),
                        );
                        let response = ui
                            .interact(button, Id::new((id, "delete")), Sense::click())
                            .on_hover_text("Delete block");
                        if response.clicked() {
                            self.manager.schedule_delete(id);
                            self.delete_affordance = None;
                        }
                    }
                    None => self.delete_affordance = None,
                }
            }

            self.paint_blocks(&painter, origin);
        });
    }

    fn paint_blocks(&self, painter: &egui::Painter, origin: Vec2) {
        let session = self.manager.drag_session();
        let snap_target = session.and_then(|s| s.candidate_target());
        let dragged_unit: Vec<Uuid> = session
            .map(|s| s.unit_start.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default();

        // The dragged sub-chain is painted last so it stays on top.
        let (moving, resting): (Vec<&Block>, Vec<&Block>) = self
            .manager
            .blocks()
            .iter()
            .partition(|b| dragged_unit.contains(&b.id));

        for block in resting.into_iter().chain(moving) {
            let style = BlockStyle {
                label: self.manager.display_label(block.id),
                has_incoming: self.manager.has_incoming_link(block.id),
                opacity: self.manager.opacity(block.id),
                snap_target: snap_target == Some(block.id),
            };
            paint_block(painter, block, block.rect().translate(origin), &style);
        }

        if let Some(id) = self.delete_affordance {
            if let Some(block) = self.manager.get(id) {
                let center = block.rect().translate(origin).right_top();
                painter.circle_filled(center, DELETE_BUTTON_SIZE / 2.0, COLOR_DELETE_BUTTON);
                painter.text(
                    center,
                    Align2::CENTER_CENTER,
                    "✖",
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
        }
    }

    fn show_block_menu(&mut self, ctx: &egui::Context) {
        let Some(id) = self.menu_target else {
            return;
        };
        let Some(block) = self.manager.get(id) else {
            self.menu_target = None;
            return;
        };
        let title = format!("{} · {}", block.content.kind.name, block.short_id());
        let mut content = block.content.clone();

        let mut open = true;
        let mut action = None;
        egui::Window::new(title)
            .id(Id::new("block_menu"))
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                if edit_parameters(ui, id, &mut content) {
                    self.manager.set_content(id, content);
                }
                ui.separator();
                ui.horizontal(|ui| {
                    ui.menu_button("➕ Insert after", |ui| {
                        for kind in BLOCK_CATALOG.iter() {
                            if ui.button(kind.name).clicked() {
                                action = Some(MenuAction::InsertAfter(kind));
                                ui.close_menu();
                            }
                        }
                    });
                    if ui.button("🗑 Delete").clicked() {
                        action = Some(MenuAction::Delete);
                    }
                });
            });

        match action {
            Some(MenuAction::InsertAfter(kind)) => {
                if let Some(new_id) = self.manager.insert_after(id, BlockContent::new(kind)) {
                    self.menu_target = Some(new_id);
                }
            }
            Some(MenuAction::Delete) => {
                self.manager.schedule_delete(id);
                self.menu_target = None;
            }
            None if !open => self.menu_target = None,
            None => {}
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        let mut changed = false;
        let mut save = false;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid").num_columns(2).show(ui, |ui| {
                    let config = &mut self.config;
                    let snap = &mut config.snap;
                    changed |=
                        setting(ui, "Horizontal tolerance", &mut snap.horizontal_tolerance, 1.0);
                    changed |= setting(ui, "Min vertical gap", &mut snap.min_vertical_gap, 0.0);
                    changed |= setting(ui, "Max vertical gap", &mut snap.max_vertical_gap, 0.0);
                    let layout = &mut config.layout;
                    changed |= setting(ui, "Block spacing", &mut layout.block_spacing, 1.0);
                    changed |= setting(ui, "Connector inset", &mut layout.connector_inset, 0.0);

                    ui.label("Fade-out (ms)");
                    changed |= ui
                        .add(egui::DragValue::new(&mut config.fade_out_ms).range(0..=5000))
                        .changed();
                    ui.end_row();
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Reset").clicked() {
                        self.config = EditorConfig::default();
                        changed = true;
                    }
                    save = ui.button("Save").clicked();
                });
            });
        self.show_settings = open;

        if changed {
            match self.config.validate() {
                Ok(()) => self.manager.apply_config(&self.config),
                Err(err) => log::warn!("settings not applied: {err}"),
            }
        }
        if save {
            self.save_config();
        }
    }

    fn help_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("Help")
            .open(&mut self.show_help)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Add blocks from the toolbar.");
                ui.label("Drag a block near another one to connect them.");
                ui.label("A yellow outline shows where the block will snap.");
                ui.label("Dragging a block out of a chain takes the blocks below it along.");
                ui.label("Press Escape while dragging to put the blocks back.");
                ui.label("Click a block to edit it or insert a block after it.");
                ui.label("Right-click or long-press a block to show its delete button.");
                ui.label("⛓ disconnects every chain, 🗑 removes every block.");
            });
    }
}

impl eframe::App for SnapBlocksApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dt = ctx.input(|i| i.unstable_dt).max(0.0);
        self.advance_deferred(dt, ctx);

        self.show_toolbar(ctx);
        self.show_canvas(ctx);
        self.show_block_menu(ctx);
        self.settings_window(ctx);
        self.help_window(ctx);
    }
}

fn toolbar_icon(ui: &mut egui::Ui, icon: &str, hover: &str) -> bool {
    ui.add(
        egui::Button::new(RichText::new(icon).size(24.0))
            .min_size(Vec2::new(TOOLBAR_BUTTON_SIZE, TOOLBAR_BUTTON_SIZE))
            .frame(false),
    )
    .on_hover_text(hover)
    .clicked()
}

fn setting(ui: &mut egui::Ui, label: &str, value: &mut f32, min: f32) -> bool {
    ui.label(label);
    let changed = ui
        .add(egui::DragValue::new(value).range(min..=MAX_SETTING).speed(0.5))
        .changed();
    ui.end_row();
    changed
}

/// Parameter widgets for one block. Returns true if anything changed.
fn edit_parameters(ui: &mut egui::Ui, id: Uuid, content: &mut BlockContent) -> bool {
    let mut changed = false;
    let input = content.kind.input;
    ui.horizontal(|ui| {
        let options = input.options();
        if !options.is_empty() {
            let selected = content.data.selected.as_deref().unwrap_or("Select").to_string();
            egui::ComboBox::from_id_salt(("options", id))
                .selected_text(selected)
                .show_ui(ui, |ui| {
                    for option in options {
                        changed |= ui
                            .selectable_value(
                                &mut content.data.selected,
                                Some(option.to_string()),
                                *option,
                            )
                            .changed();
                    }
                });
        }
        if let Some(placeholder) = input.placeholder() {
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut content.data.text)
                        .hint_text(placeholder)
                        .desired_width(80.0),
                )
                .changed();
        }
        if options.is_empty() && input.placeholder().is_none() {
            ui.label("No parameters");
        }
    });
    changed
}

fn paint_block(painter: &egui::Painter, block: &Block, rect: Rect, style: &BlockStyle) {
    let fade = |color: Color32| color.gamma_multiply(style.opacity);
    let rounding = egui::Rounding::same(BLOCK_CORNER_RADIUS);
    let fill = fade(block.content.kind.color);
    let connector_x = rect.left() + (block.connector_x() - block.rect().left());
    let half = CONNECTOR_WIDTH / 2.0;

    painter.rect_filled(rect, rounding, fill);

    // Top slot: a notch, highlighted once something is linked into it.
    let slot = Rect::from_min_size(
        pos2(connector_x - half, rect.top()),
        vec2(CONNECTOR_WIDTH, CONNECTOR_DEPTH),
    );
    let slot_fill = if style.has_incoming {
        fade(COLOR_CONNECTOR_HIGHLIGHT)
    } else {
        fade(Color32::from_black_alpha(90))
    };
    painter.rect_filled(slot, egui::Rounding::same(2.0), slot_fill);

    // Bottom tab: a bump, highlighted once it links to a successor.
    let tab_fill = if block.next.is_some() {
        fade(COLOR_CONNECTOR_HIGHLIGHT)
    } else {
        fill
    };
    painter.add(Shape::convex_polygon(
        vec![
            pos2(connector_x - half, rect.bottom()),
            pos2(connector_x + half, rect.bottom()),
            pos2(connector_x + half - 3.0, rect.bottom() + CONNECTOR_DEPTH),
            pos2(connector_x - half + 3.0, rect.bottom() + CONNECTOR_DEPTH),
        ],
        tab_fill,
        Stroke::NONE,
    ));

    let stroke = if style.label.is_some() {
        Stroke::new(2.0, fade(COLOR_LINKED_STROKE))
    } else {
        Stroke::new(1.0, fade(COLOR_STANDALONE_STROKE))
    };
    painter.rect_stroke(rect, rounding, stroke);

    if style.snap_target {
        painter.rect_stroke(
            rect.expand(3.0),
            egui::Rounding::same(BLOCK_CORNER_RADIUS + 3.0),
            Stroke::new(3.0, COLOR_SNAP_TARGET),
        );
    }

    let text_color = fade(Color32::WHITE);
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        format!("{} {}", block.content.kind.name, block.content.display_text()),
        FontId::proportional(14.0),
        text_color,
    );
    if let Some(label) = &style.label {
        painter.text(
            rect.left_top() + vec2(6.0, 4.0),
            Align2::LEFT_TOP,
            label,
            FontId::monospace(10.0),
            text_color,
        );
    }
    painter.text(
        rect.right_bottom() - vec2(6.0, 4.0),
        Align2::RIGHT_BOTTOM,
        block.short_id(),
        FontId::monospace(9.0),
        fade(Color32::from_white_alpha(160)),
    );
}
