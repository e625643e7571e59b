use crate::app::TimelineApp;
use crate::model::{CollisionPolicy, ViewMode};
use crate::ui::theme;
use egui::{menu, RichText, Ui};

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  New Plan").clicked() {
                app.new_plan();
                ui.close_menu();
            }
            if ui.button("  Load Sample Plan").clicked() {
                app.load_sample();
                ui.close_menu();
            }
            if ui.button("  Open...").clicked() {
                app.open_plan();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Save          Ctrl+S").clicked() {
                app.save_plan_file();
                ui.close_menu();
            }
            if ui.button("  Save As...").clicked() {
                app.save_plan_file_as();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import CSV...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
            if ui.button("  CSV Format...").clicked() {
                app.show_csv_help = true;
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Open Data Folder").clicked() {
                app.open_data_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Ruler").small().weak());
            for mode in ViewMode::ALL {
                if ui.radio(app.config.view_mode == mode, mode.label()).clicked() {
                    app.set_view_mode(mode);
                    ui.close_menu();
                }
            }
            ui.separator();
            ui.label(RichText::new("Overlapping Tasks").small().weak());
            for (policy, label) in [
                (CollisionPolicy::LaneSplit, "Side by side"),
                (CollisionPolicy::Overlay, "Overlay"),
            ] {
                if ui.radio(app.config.layout.policy == policy, label).clicked() {
                    app.set_collision_policy(policy);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("  Earlier       PgUp").clicked() {
                app.scroll_window(-app.page_days());
                ui.close_menu();
            }
            if ui.button("  Later          PgDn").clicked() {
                app.scroll_window(app.page_days());
                ui.close_menu();
            }
            if ui.button("  Back to Today").clicked() {
                app.reset_window();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();
        if ui
            .button(format!("{} Add Task", egui_phosphor::regular::PLUS))
            .clicked()
        {
            app.open_new_task(None);
        }

        // Right-aligned plan name and window
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let saved = if app.file_path.is_some() { "" } else { " (not saved to file)" };
            ui.label(
                RichText::new(format!("{}{}", app.plan.name, saved))
                    .size(11.0)
                    .weak(),
            );
            ui.label(
                RichText::new(format!(
                    "{} – {}",
                    app.window.start().format("%b %-d, %Y"),
                    app.window.end().format("%b %-d, %Y"),
                ))
                .size(11.0)
                .color(theme::TEXT_SECONDARY),
            );
        });
    });
}
