use crate::model::plan::validate_task;
use crate::model::{Category, Lane, Task, TimelineError};
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};
use uuid::Uuid;

/// Editable copy of a task held by the dialog until the user saves.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    /// `None` while creating a new task.
    pub id: Option<Uuid>,
    pub title: String,
    pub lane: Lane,
    pub category: Category,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: String,
}

impl TaskDraft {
    /// Blank one-week task starting on `start`.
    pub fn new_in(lane: Lane, start: NaiveDate) -> Self {
        Self {
            id: None,
            title: String::new(),
            lane,
            category: Category::Planning,
            start,
            end: start + chrono::Duration::days(7),
            description: String::new(),
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title.clone(),
            lane: task.lane,
            category: task.category,
            start: task.start_date,
            end: task.end_date,
            description: task.description.clone().unwrap_or_default(),
        }
    }

    /// A model-suggested task the user has not accepted yet.
    pub fn from_suggestion(task: &Task) -> Self {
        Self {
            id: None,
            ..Self::from_task(task)
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Build the task, keeping the id of the task being edited.
    pub fn to_task(&self) -> Result<Task, TimelineError> {
        let mut task = Task::new(self.title.trim(), self.lane, self.start, self.end)
            .with_category(self.category)
            .with_description(self.description.clone());
        if let Some(id) = self.id {
            task.id = id;
        }
        validate_task(&task)?;
        Ok(task)
    }
}

/// Actions the editor can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    None,
    Save,
    Delete,
    Cancel,
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

/// Render the task form. `error` is shown above the buttons.
pub fn show_task_editor(draft: &mut TaskDraft, error: Option<&str>, ui: &mut Ui) -> EditorAction {
    let mut action = EditorAction::None;

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(theme::CARD_ROUNDING),
        inner_margin: egui::Margin::same(10.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;

        // ── Title ──────────────────────────────────────────────────────
        field_label(ui, "Title");
        ui.add_sized(
            [ui.available_width(), 24.0],
            egui::TextEdit::singleline(&mut draft.title)
                .hint_text("What needs doing?")
                .font(egui::FontId::proportional(12.0)),
        );

        // ── Lane & category ────────────────────────────────────────────
        ui.columns(2, |cols| {
            field_label(&mut cols[0], "Lane");
            egui::ComboBox::from_id_salt("task_lane_combo")
                .selected_text(draft.lane.label())
                .width(cols[0].available_width())
                .show_ui(&mut cols[0], |ui| {
                    for lane in Lane::ALL {
                        ui.selectable_value(&mut draft.lane, lane, lane.label());
                    }
                });

            field_label(&mut cols[1], "Category");
            egui::ComboBox::from_id_salt("task_category_combo")
                .selected_text(
                    RichText::new(draft.category.label()).color(theme::category_color(draft.category)),
                )
                .width(cols[1].available_width())
                .show_ui(&mut cols[1], |ui| {
                    for category in Category::ALL {
                        ui.selectable_value(
                            &mut draft.category,
                            category,
                            RichText::new(category.label()).color(theme::category_color(category)),
                        );
                    }
                });
        });

        // ── Dates ──────────────────────────────────────────────────────
        ui.horizontal(|ui| {
            field_label(ui, "Start");
            ui.add(egui_extras::DatePickerButton::new(&mut draft.start).id_salt("task_dp_start"));
            ui.add_space(8.0);
            field_label(ui, "End");
            ui.add(egui_extras::DatePickerButton::new(&mut draft.end).id_salt("task_dp_end"));
        });
        let days = (draft.end - draft.start).num_days();
        ui.label(
            RichText::new(match days {
                0 => "Single day".to_string(),
                d if d < 0 => "Ends before it starts".to_string(),
                d => format!("{} days", d + 1),
            })
            .size(10.0)
            .color(if days < 0 { theme::ERROR_TEXT } else { theme::TEXT_DIM }),
        );

        // ── Description ────────────────────────────────────────────────
        field_label(ui, "Description");
        ui.add(
            egui::TextEdit::multiline(&mut draft.description)
                .desired_rows(3)
                .desired_width(f32::INFINITY)
                .hint_text("Optional notes"),
        );
    });

    if let Some(error) = error {
        ui.add_space(4.0);
        ui.label(RichText::new(error).size(11.0).color(theme::ERROR_TEXT));
    }

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let label = if draft.is_new() { "Create" } else { "Save" };
        let save_btn = egui::Button::new(RichText::new(label).color(Color32::WHITE))
            .fill(theme::ACCENT)
            .rounding(egui::Rounding::same(4.0));
        if ui.add_sized([80.0, 28.0], save_btn).clicked() {
            action = EditorAction::Save;
        }
        if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
            action = EditorAction::Cancel;
        }
        if !draft.is_new() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let delete = egui::Button::new(
                    RichText::new(format!("{} Delete", egui_phosphor::regular::TRASH))
                        .color(theme::ERROR_TEXT),
                );
                if ui.add(delete).clicked() {
                    action = EditorAction::Delete;
                }
            });
        }
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_draft_spans_one_week() {
        let draft = TaskDraft::new_in(Lane::Design, date(2025, 3, 3));
        assert!(draft.is_new());
        assert_eq!(draft.end, date(2025, 3, 10));
    }

    #[test]
    fn editing_keeps_task_identity() {
        let task = Task::new("Review mocks", Lane::Design, date(2025, 3, 3), date(2025, 3, 5))
            .with_description("round two");
        let mut draft = TaskDraft::from_task(&task);
        draft.title = "  Review final mocks ".into();
        draft.description.clear();

        let edited = draft.to_task().unwrap();
        assert_eq!(edited.id, task.id);
        assert_eq!(edited.title, "Review final mocks");
        assert!(edited.description.is_none());
    }

    #[test]
    fn suggestion_draft_is_new() {
        let task = Task::new("Call partners", Lane::Outreach, date(2025, 3, 3), date(2025, 3, 4));
        let draft = TaskDraft::from_suggestion(&task);
        assert!(draft.is_new());
        assert_ne!(draft.to_task().unwrap().id, task.id);
    }

    #[test]
    fn invalid_drafts_are_rejected() {
        let mut draft = TaskDraft::new_in(Lane::Testing, date(2025, 3, 3));
        assert_eq!(draft.to_task(), Err(TimelineError::EmptyTitle));

        draft.title = "Load test".into();
        draft.end = date(2025, 3, 1);
        assert!(matches!(draft.to_task(), Err(TimelineError::InvalidInterval { .. })));
    }
}
