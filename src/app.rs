use crate::client::HttpBackend;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::export::ExportFormat;
use crate::login::LoginGate;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Dashboard => "/dashboard",
        }
    }
}

pub struct App {
    label: String,
    route: Route,
    login: LoginGate,
    dashboard: Dashboard,
}

impl App {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, settings: &Settings) -> Result<Self> {
        let backend = HttpBackend::new(&settings.server.base_url, settings.server.timeout())?;
        log::info!("using backend at {}", settings.server.base_url);
        let mut dashboard = Dashboard::new(Arc::new(backend), settings.export.format);
        dashboard.set_repaint_context(cc.egui_ctx.clone());
        Ok(Self {
            label: "Filter Dashboard".to_owned(),
            route: Route::Login,
            login: LoginGate::default(),
            dashboard,
        })
    }

    fn navigate(&mut self, route: Route) {
        log::info!("navigating to {}", route.path());
        self.route = route;
    }

    fn show_menu(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.label(&self.label);
                ui.separator();
                if self.route == Route::Dashboard {
                    ui.menu_button("File", |ui| {
                        if ui.button("Open…").clicked() {
                            ui.close_menu();
                            self.dashboard.browse_for_file();
                        }
                        ui.menu_button("Export", |ui| {
                            for format in ExportFormat::ALL {
                                if ui.button(format.label()).clicked() {
                                    ui.close_menu();
                                    self.dashboard.export_with_dialog(format);
                                }
                            }
                        });
                    });
                }
                #[cfg(not(target_arch = "wasm32"))] // no File->Quit on web pages!
                ui.menu_button("App", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }
}

impl eframe::App for App {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.show_menu(ctx);

        match self.route {
            Route::Login => {
                egui::CentralPanel::default().show(ctx, |ui| self.login.show(ui));
                if let Some(route) = self.login.poll(now) {
                    self.navigate(route);
                    ctx.request_repaint();
                } else if let Some(wait) = self.login.pending_redirect(now) {
                    ctx.request_repaint_after(wait);
                }
            }
            Route::Dashboard => {
                self.dashboard.handle_file_drop(ctx);
                self.dashboard.poll_tasks();
                if let Some(wait) = self.dashboard.tick(now) {
                    ctx.request_repaint_after(wait);
                }
                self.dashboard.show_sidebar(ctx);
                self.dashboard.show_main(ctx);
            }
        }
    }
}
