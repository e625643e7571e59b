use crate::app::TimelineApp;
use crate::ui::task_editor::{self, EditorAction, TaskDraft};
use crate::ui::theme;
use egui::{Context, RichText, Window};
use uuid::Uuid;

/// What happens to the draft once the editor has answered.
#[derive(Debug, PartialEq)]
enum DraftOutcome {
    Keep(TaskDraft),
    Save(TaskDraft),
    Delete(Uuid),
    Close,
}

/// Deleting a stored task only goes ahead once `confirm_delete` agrees.
fn resolve_action(
    action: EditorAction,
    draft: TaskDraft,
    confirm_delete: impl FnOnce(&TaskDraft) -> bool,
) -> DraftOutcome {
    match action {
        EditorAction::None => DraftOutcome::Keep(draft),
        EditorAction::Save => DraftOutcome::Save(draft),
        EditorAction::Delete => match draft.id {
            Some(id) if confirm_delete(&draft) => DraftOutcome::Delete(id),
            Some(_) => DraftOutcome::Keep(draft),
            None => DraftOutcome::Close,
        },
        EditorAction::Cancel => DraftOutcome::Close,
    }
}

fn ask_delete(draft: &TaskDraft) -> bool {
    let answer = rfd::MessageDialog::new()
        .set_title("Delete Task")
        .set_description(format!(
            "Are you sure you want to delete \"{}\"?",
            draft.title.trim()
        ))
        .set_buttons(rfd::MessageButtons::YesNo)
        .show();
    answer == rfd::MessageDialogResult::Yes
}

/// Render the add/edit task dialog for the current draft.
pub fn show_task_dialog(app: &mut TimelineApp, ctx: &Context) {
    let Some(mut draft) = app.task_draft.take() else {
        return;
    };
    let title = if draft.is_new() { "Add Task" } else { "Edit Task" };
    let mut action = EditorAction::None;

    Window::new(RichText::new(title).strong().size(14.0))
        .id(egui::Id::new("task_dialog"))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([380.0, 0.0])
        .show(ctx, |ui| {
            action = task_editor::show_task_editor(&mut draft, app.task_error.as_deref(), ui);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = EditorAction::Cancel;
    }

    match resolve_action(action, draft, ask_delete) {
        DraftOutcome::Keep(draft) => app.task_draft = Some(draft),
        DraftOutcome::Save(draft) => app.save_draft(draft),
        DraftOutcome::Delete(id) => {
            app.delete_task(id);
            app.task_error = None;
        }
        DraftOutcome::Close => app.task_error = None,
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 190.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Lane Planner").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("A three-month execution plan");
                ui.label("in four parallel lanes.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the "CSV Import Format" help dialog.
pub fn show_csv_help_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;

    Window::new(RichText::new("CSV Import Format").strong().size(14.0))
        .resizable(true)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_size([520.0, 420.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.label(RichText::new("Delimiters").strong());
                ui.label("Comma, semicolon or tab, detected from the header line.");
                ui.add_space(8.0);

                ui.label(RichText::new("Columns").strong());
                egui::Grid::new("csv_columns")
                    .num_columns(2)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for (column, headers) in [
                            ("Title *", "Title, Name, Task, Task Name, Label"),
                            ("Start *", "Start, Start Date, From, Begin"),
                            ("End *", "End, End Date, To, Finish, Due"),
                            ("Lane *", "Lane, Timeline, Stream, Workstream, Track"),
                            ("Category", "Category, Type, Kind"),
                            ("Description", "Description, Notes, Details"),
                        ] {
                            ui.label(RichText::new(column).strong());
                            ui.label(headers);
                            ui.end_row();
                        }
                    });
                ui.add_space(8.0);

                ui.label(RichText::new("Values").strong());
                let lanes: Vec<&str> = crate::model::Lane::ALL.iter().map(|l| l.key()).collect();
                let categories: Vec<&str> =
                    crate::model::Category::ALL.iter().map(|c| c.key()).collect();
                ui.label(format!("Lane: {} (or the full lane heading)", lanes.join(", ")));
                ui.label(format!("Category: {} (default planning)", categories.join(", ")));
                ui.label("Dates: YYYY-MM-DD, DD/MM/YYYY, MM/DD/YYYY, DD-MM-YYYY, DD.MM.YYYY");
                ui.add_space(8.0);

                ui.label(
                    RichText::new("Rows with a missing title, unreadable dates, an unknown lane or an end before the start are skipped.")
                        .small(),
                );
            });

            ui.separator();
            if ui.add_sized([80.0, 28.0], egui::Button::new("Close")).clicked() {
                should_close = true;
            }
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_csv_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lane, Task};
    use chrono::NaiveDate;

    fn stored_draft() -> TaskDraft {
        let d = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        TaskDraft::from_task(&Task::new("Write testing plan", Lane::Testing, d, d))
    }

    #[test]
    fn declined_delete_keeps_the_task_open() {
        let draft = stored_draft();
        let outcome = resolve_action(EditorAction::Delete, draft.clone(), |_| false);
        assert_eq!(outcome, DraftOutcome::Keep(draft));
    }

    #[test]
    fn confirmed_delete_removes_the_task() {
        let draft = stored_draft();
        let mut asked_for = None;
        let outcome = resolve_action(EditorAction::Delete, draft.clone(), |d| {
            asked_for = Some(d.title.clone());
            true
        });
        assert_eq!(outcome, DraftOutcome::Delete(draft.id.unwrap()));
        assert_eq!(asked_for.as_deref(), Some("Write testing plan"));
    }

    #[test]
    fn unsaved_draft_closes_without_asking() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let draft = TaskDraft::new_in(Lane::Design, d);
        let outcome = resolve_action(EditorAction::Delete, draft, |_| panic!("should not ask"));
        assert_eq!(outcome, DraftOutcome::Close);
    }

    #[test]
    fn save_and_cancel_never_ask() {
        let draft = stored_draft();
        let saved = resolve_action(EditorAction::Save, draft.clone(), |_| panic!("should not ask"));
        assert_eq!(saved, DraftOutcome::Save(draft.clone()));
        let cancelled = resolve_action(EditorAction::Cancel, draft, |_| panic!("should not ask"));
        assert_eq!(cancelled, DraftOutcome::Close);
    }
}
