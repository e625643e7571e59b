use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::io::{FileStore, KeyValueStore};
use crate::model::{CollisionPolicy, Lane, Plan, TimelineError, ViewMode, VisibleWindow};
use crate::services::SuggestionClient;
use crate::ui;
use crate::ui::suggestion_bar::SuggestionState;
use crate::ui::task_editor::TaskDraft;

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Main application state.
pub struct TimelineApp {
    pub plan: Plan,
    pub window: VisibleWindow,
    pub config: AppConfig,
    /// Working-copy storage; `None` when no data directory is available.
    store: Option<FileStore>,
    pub file_path: Option<PathBuf>,

    // Dialog state
    pub task_draft: Option<TaskDraft>,
    pub task_error: Option<String>,
    pub show_about: bool,
    pub show_csv_help: bool,

    pub suggestion: SuggestionState,
    suggestion_client: SuggestionClient,

    pub status_message: String,
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self, TimelineError> {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let window = VisibleWindow::months_from(today(), config.window_months)?;

        let store = match FileStore::open_default() {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!(error = %e, "no data directory, changes will not be kept");
                None
            }
        };
        let stored = store.as_ref().and_then(|s| match crate::io::load_plan(s) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!(error = %e, "failed to read stored plan");
                None
            }
        });
        let (plan, status_message) = match stored {
            Some(plan) => {
                let message = format!("Loaded {} tasks", plan.tasks().len());
                (plan, message)
            }
            None => (Plan::sample(today()), "Started from the sample plan".to_string()),
        };

        let suggestion_client = SuggestionClient::from_config(&config.suggestion);
        tracing::info!(endpoint = suggestion_client.endpoint(), "suggestion service configured");

        let mut app = Self {
            plan,
            window,
            config,
            store,
            file_path: None,
            task_draft: None,
            task_error: None,
            show_about: false,
            show_csv_help: false,
            suggestion: SuggestionState::default(),
            suggestion_client,
            status_message,
        };
        app.persist();
        Ok(app)
    }

    /// Write the working plan to the store.
    fn persist(&mut self) {
        let Some(store) = self.store.as_mut() else {
            return;
        };
        if let Err(e) = crate::io::save_plan(store as &mut dyn KeyValueStore, &self.plan) {
            tracing::error!(error = %e, "failed to store plan");
            self.status_message = format!("Could not store plan: {}", e);
        }
    }

    fn replace_plan(&mut self, plan: Plan, file_path: Option<PathBuf>) {
        self.plan = plan;
        self.file_path = file_path;
        self.task_draft = None;
        self.persist();
    }

    // --- File operations ---

    pub fn new_plan(&mut self) {
        self.replace_plan(Plan::default(), None);
        self.status_message = "New plan created".to_string();
    }

    pub fn load_sample(&mut self) {
        self.replace_plan(Plan::sample(today()), None);
        self.reset_window();
        self.status_message = "Sample plan loaded".to_string();
    }

    pub fn open_plan(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Lane Plan", &["plan.json", "json"])
            .pick_file()
        {
            match crate::io::load_plan_file(&path) {
                Ok(plan) => {
                    self.status_message = format!("Opened '{}'", plan.name);
                    self.replace_plan(plan, Some(path));
                    self.fit_window_to_plan();
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    pub fn save_plan_file(&mut self) {
        if let Some(path) = self.file_path.clone() {
            self.plan.touch();
            match crate::io::save_plan_file(&self.plan, &path) {
                Ok(()) => self.status_message = "Plan saved".to_string(),
                Err(e) => self.status_message = format!("Error saving: {}", e),
            }
        } else {
            self.save_plan_file_as();
        }
    }

    pub fn save_plan_file_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Lane Plan", &["plan.json", "json"])
            .set_file_name(format!("{}.plan.json", self.plan.name))
            .save_file()
        {
            self.file_path = Some(path.clone());
            self.plan.touch();
            match crate::io::save_plan_file(&self.plan, &path) {
                Ok(()) => self.status_message = "Plan saved".to_string(),
                Err(e) => self.status_message = format!("Error saving: {}", e),
            }
        }
    }

    pub fn import_csv(&mut self) {
        if !self.plan.is_empty() {
            let confirm = rfd::MessageDialog::new()
                .set_title("Import CSV")
                .set_description("This will replace the current plan. Continue?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        {
            match crate::io::csv_import::import_csv(&path) {
                Ok((tasks, skipped)) => {
                    let name = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("Imported Plan")
                        .to_string();
                    let (plan, rejected) = Plan::from_tasks(name, tasks);
                    let count = plan.tasks().len();
                    self.replace_plan(plan, None);
                    self.fit_window_to_plan();

                    let skipped = skipped + rejected;
                    self.status_message = if skipped > 0 {
                        format!("Imported {} tasks ({} rows skipped)", count, skipped)
                    } else {
                        format!("Imported {} tasks", count)
                    };
                }
                Err(e) => {
                    self.status_message = format!("CSV import failed: {}", e);
                }
            }
        }
    }

    pub fn export_csv(&mut self) {
        if self.plan.is_empty() {
            self.status_message = "Nothing to export, the plan has no tasks".to_string();
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(format!("{}.csv", self.plan.name))
            .save_file()
        {
            match crate::io::csv_export::export_csv(&self.plan.tasks_grouped_by_lane(), &path) {
                Ok(count) => self.status_message = format!("Exported {} tasks to CSV", count),
                Err(e) => self.status_message = format!("CSV export failed: {}", e),
            }
        }
    }

    pub fn open_data_folder(&mut self) {
        let Some(dir) = self.store.as_ref().map(|s| s.dir().to_path_buf()) else {
            self.status_message = "No data folder available".to_string();
            return;
        };
        if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| open::that(&dir)) {
            tracing::warn!(dir = %dir.display(), error = %e, "could not open data folder");
            self.status_message = format!("Could not open {}: {}", dir.display(), e);
        }
    }

    // --- View ---

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.config.view_mode = mode;
        self.config.save();
    }

    pub fn set_collision_policy(&mut self, policy: CollisionPolicy) {
        self.config.layout.policy = policy;
        self.config.save();
    }

    /// Scroll step for the current ruler granularity.
    pub fn page_days(&self) -> i64 {
        match self.config.view_mode {
            ViewMode::Months => 30,
            ViewMode::Weeks => 14,
            ViewMode::Days => 7,
        }
    }

    pub fn scroll_window(&mut self, days: i64) {
        self.window.scroll_days(days);
    }

    pub fn reset_window(&mut self) {
        if let Ok(window) = VisibleWindow::months_from(today(), self.config.window_months) {
            self.window = window;
        }
    }

    /// Move the window so it starts at the plan's first task.
    fn fit_window_to_plan(&mut self) {
        let Some((start, _)) = self.plan.date_extent() else {
            return;
        };
        if let Ok(window) = VisibleWindow::months_from(start, self.config.window_months) {
            self.window = window;
        }
    }

    // --- Task operations ---

    pub fn open_new_task(&mut self, at: Option<(Lane, NaiveDate)>) {
        let (lane, start) = at.unwrap_or((Lane::Testing, today()));
        self.task_error = None;
        self.task_draft = Some(TaskDraft::new_in(lane, start));
    }

    pub fn open_task(&mut self, id: Uuid) {
        if let Some(task) = self.plan.get(id) {
            self.task_error = None;
            self.task_draft = Some(TaskDraft::from_task(task));
        }
    }

    /// Validate and store the dialog's draft. Keeps the dialog open on error.
    pub fn save_draft(&mut self, draft: TaskDraft) {
        let result = draft.to_task().and_then(|task| {
            let title = task.title.clone();
            if draft.is_new() {
                self.plan.add_task(task).map(|_| format!("Added '{}'", title))
            } else {
                self.plan.update_task(task).map(|_| format!("Updated '{}'", title))
            }
        });

        match result {
            Ok(message) => {
                self.task_error = None;
                self.status_message = message;
                self.persist();
            }
            Err(e) => {
                self.task_error = Some(e.to_string());
                self.task_draft = Some(draft);
            }
        }
    }

    pub fn delete_task(&mut self, id: Uuid) {
        match self.plan.remove_task(id) {
            Ok(task) => {
                self.status_message = format!("Deleted '{}'", task.title);
                self.persist();
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    fn apply_reschedule(&mut self, id: Uuid, start: NaiveDate, end: NaiveDate) {
        match self.plan.on_task_dates_changed(id, start, end) {
            Ok(()) => {
                let title = self.plan.get(id).map(|t| t.title.clone()).unwrap_or_default();
                self.status_message = format!(
                    "Moved '{}' ({} → {})",
                    title,
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                );
                self.persist();
            }
            Err(e) => self.status_message = format!("Move rejected: {}", e),
        }
    }

    // --- Suggestions ---

    fn request_suggestion(&mut self) {
        if self.suggestion.submit(&self.suggestion_client, self.plan.tasks()) {
            self.status_message = "Asking for a suggestion…".to_string();
        }
    }

    fn poll_suggestion(&mut self, ctx: &egui::Context) {
        match self.suggestion.poll() {
            Some(Ok(task)) => {
                self.status_message = format!("Suggested '{}', review and create it", task.title);
                self.task_error = None;
                self.task_draft = Some(TaskDraft::from_suggestion(&task));
            }
            Some(Err(e)) => {
                self.status_message = format!("Suggestion failed: {}", e);
            }
            None if self.suggestion.is_busy() => {
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            None => {}
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_suggestion(ctx);

        // Handle keyboard shortcuts outside closures to avoid borrow issues
        let dialog_open = self.task_draft.is_some();
        let should_save = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S));
        let should_add = ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::N));
        let scroll = ctx.input(|i| {
            if i.key_pressed(egui::Key::PageUp) {
                -1
            } else if i.key_pressed(egui::Key::PageDown) {
                1
            } else {
                0
            }
        });
        if should_save {
            self.save_plan_file();
        }
        if should_add && !dialog_open {
            self.open_new_task(None);
        }
        if scroll != 0 && !dialog_open {
            self.scroll_window(scroll * self.page_days());
        }

        // Top panels: toolbar and suggestion prompt
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });
        let mut ask = false;
        egui::TopBottomPanel::top("suggestion_bar")
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 6.0)),
            )
            .show(ctx, |ui| {
                ask = ui::suggestion_bar::show_suggestion_bar(&mut self.suggestion, ui);
            });
        if ask {
            self.request_suggestion();
        }

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · {} view",
                                self.plan.tasks().len(),
                                self.config.view_mode.label()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: lanes
        let frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(frame)
            .show(ctx, |ui| {
                ui::timeline_view::show_timeline(
                    &self.plan,
                    &self.window,
                    &self.config.layout,
                    self.config.view_mode,
                    ui,
                )
            })
            .inner;

        if let Some((id, start, end)) = interaction.reschedule {
            self.apply_reschedule(id, start, end);
        }
        if let Some(message) = interaction.error {
            self.status_message = message;
        }
        if !dialog_open {
            if let Some(id) = interaction.open_task {
                self.open_task(id);
            } else if let Some(at) = interaction.add_at {
                self.open_new_task(Some(at));
            } else if let Some(lane) = interaction.add_in_lane {
                self.open_new_task(Some((lane, today())));
            }
        }

        // Dialogs
        if self.task_draft.is_some() {
            ui::dialogs::show_task_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.show_csv_help {
            ui::dialogs::show_csv_help_dialog(self, ctx);
        }
    }
}
