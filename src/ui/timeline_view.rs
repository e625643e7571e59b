use crate::model::drag::DragSnapshot;
use crate::model::layout::{layout_by_lane, max_extent};
use crate::model::timeline::{date_to_pixel, pixel_to_date, ruler_markers};
use crate::model::{Lane, LayoutConfig, Placement, Plan, Task, ViewMode, VisibleWindow};
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, Id, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use uuid::Uuid;

const HEADER_HEIGHT: f32 = theme::LANE_HEADER_HEIGHT;
const RULER_WIDTH: f32 = theme::RULER_WIDTH;

/// What the user did in the timeline this frame.
#[derive(Debug, Clone, Default)]
pub struct TimelineInteraction {
    /// A drag finished on new dates: `(task, start, end)`.
    pub reschedule: Option<(Uuid, NaiveDate, NaiveDate)>,
    pub open_task: Option<Uuid>,
    /// Empty lane area was clicked at this date.
    pub add_at: Option<(Lane, NaiveDate)>,
    pub add_in_lane: Option<Lane>,
    /// Drag failed to map to a date; message for the status bar.
    pub error: Option<String>,
}

/// Geometry of the body below the lane headers, shared by all drawing helpers.
struct Body {
    rect: Rect,
    /// Pixel height of the 0..100% span of the window.
    scale_height: f32,
    lane_width: f32,
}

impl Body {
    fn lane_rect(&self, index: usize) -> Rect {
        Rect::from_min_size(
            Pos2::new(
                self.rect.left() + RULER_WIDTH + index as f32 * self.lane_width,
                self.rect.top(),
            ),
            Vec2::new(self.lane_width, self.rect.height()),
        )
    }

    fn y_for_percent(&self, percent: f64) -> f32 {
        self.rect.top() + (percent / 100.0) as f32 * self.scale_height
    }

    fn card_rect(&self, lane_index: usize, placement: &Placement, gap: f64) -> Rect {
        let lane = self.lane_rect(lane_index);
        let inner_width = lane.width() - theme::CARD_INSET * 2.0;
        let left = lane.left()
            + theme::CARD_INSET
            + (placement.left_percent(gap) / 100.0) as f32 * inner_width;
        let width = (placement.width_percent(gap) / 100.0) as f32 * inner_width;
        let top = self.y_for_percent(placement.top_percent);
        let height = ((placement.height_percent / 100.0) as f32 * self.scale_height)
            .max(theme::MIN_CARD_HEIGHT);
        Rect::from_min_size(Pos2::new(left, top), Vec2::new(width.max(8.0), height))
    }
}

/// Render the four lanes with their ruler (central panel).
pub fn show_timeline(
    plan: &Plan,
    window: &VisibleWindow,
    config: &LayoutConfig,
    view_mode: ViewMode,
    ui: &mut Ui,
) -> TimelineInteraction {
    let mut interaction = TimelineInteraction::default();
    let available = ui.available_size();

    let placements = layout_by_lane(plan.tasks(), window, config);
    let extent = placements
        .values()
        .map(|p| max_extent(p))
        .fold(100.0, f64::max);

    let lane_width = ((available.x - RULER_WIDTH) / Lane::ALL.len() as f32).max(theme::LANE_MIN_WIDTH);
    let scale_height = (available.y - HEADER_HEIGHT).max(theme::MIN_CONTENT_HEIGHT);
    // Grow past the window end when a card reaches further down.
    let body_height = scale_height * (extent / 100.0) as f32 + theme::MIN_CARD_HEIGHT;
    let canvas_width = RULER_WIDTH + lane_width * Lane::ALL.len() as f32;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(canvas_width, HEADER_HEIGHT + body_height),
                Sense::click(),
            );
            let origin = response.rect.min;
            let body = Body {
                rect: Rect::from_min_size(
                    Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
                    Vec2::new(canvas_width, body_height),
                ),
                scale_height,
                lane_width,
            };
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            for (i, _) in Lane::ALL.iter().enumerate() {
                if i % 2 == 1 {
                    painter.rect_filled(body.lane_rect(i), 0.0, theme::BG_LANE_ALT);
                }
            }

            draw_ruler(&painter, &body, window, view_mode);
            draw_today_line(&painter, &body, window);

            let body_painter = painter.with_clip_rect(body.rect);
            for (lane_index, lane) in Lane::ALL.iter().enumerate() {
                let Some(lane_placements) = placements.get(lane) else {
                    continue;
                };
                for placement in lane_placements {
                    let Some(task) = plan.get(placement.task_id) else {
                        continue;
                    };
                    let card = body.card_rect(lane_index, placement, config.slot_gap_percent);
                    draw_card(&body_painter, task, card, false);

                    let card_response = ui.interact(
                        card.intersect(body.rect),
                        ui.make_persistent_id(("task-card", task.id)),
                        Sense::click_and_drag(),
                    );

                    if card_response.clicked() {
                        interaction.open_task = Some(task.id);
                        consumed_click = true;
                    }

                    if card_response.drag_started() {
                        let ptr_y = card_response.interact_pointer_pos().map(|p| p.y).unwrap_or(card.top());
                        ui.ctx().data_mut(|data| {
                            data.insert_persisted(
                                drag_id(task.id),
                                DragSnapshot {
                                    start: task.start_date,
                                    end: task.end_date,
                                    grab_offset: ptr_y - card.top(),
                                },
                            );
                        });
                        consumed_click = true;
                    }

                    let snapshot = ui
                        .ctx()
                        .data_mut(|data| data.get_persisted::<DragSnapshot>(drag_id(task.id)));
                    let Some(snapshot) = snapshot else {
                        show_card_tooltip(ui, &card_response, task);
                        continue;
                    };

                    let ptr_y = card_response.interact_pointer_pos().map(|p| p.y);
                    let preview = ptr_y.map(|y| {
                        let top_px = y - snapshot.grab_offset - body.rect.top();
                        (top_px, snapshot.dates_at(top_px as f64, scale_height as f64, window))
                    });

                    if card_response.dragged() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                        if let Some((top_px, Ok((start, end)))) = &preview {
                            ui.ctx().data_mut(|data| {
                                data.insert_temp(preview_id(task.id), (*start, *end));
                            });
                            let ghost = card.translate(Vec2::new(0.0, body.rect.top() + top_px - card.top()));
                            draw_card(&body_painter, task, ghost, true);
                            egui::show_tooltip_at_pointer(
                                ui.ctx(),
                                ui.layer_id(),
                                Id::new(("drag-tip", task.id)),
                                |ui| {
                                    ui.strong(&task.title);
                                    ui.label(format!(
                                        "{} → {}",
                                        start.format("%Y-%m-%d"),
                                        end.format("%Y-%m-%d")
                                    ));
                                },
                            );
                        }
                    }

                    if card_response.drag_stopped() {
                        let last_preview = ui.ctx().data_mut(|data| {
                            data.remove::<DragSnapshot>(drag_id(task.id));
                            data.remove_temp::<(NaiveDate, NaiveDate)>(preview_id(task.id))
                        });
                        let dates = match preview {
                            Some((_, Ok(dates))) => Some(dates),
                            Some((_, Err(e))) => {
                                interaction.error = Some(e.to_string());
                                None
                            }
                            // No pointer on the release frame.
                            None => last_preview,
                        };
                        if let Some((start, end)) = dates.filter(|(start, _)| *start != snapshot.start) {
                            interaction.reschedule = Some((task.id, start, end));
                        }
                    }
                }
            }

            // Headers last so they sit above cards that start before the window.
            draw_lane_headers(ui, &painter, origin, &body, plan, &mut interaction);

            if response.clicked() && !consumed_click {
                if let Some(pos) = response.interact_pointer_pos() {
                    interaction.add_at = empty_click_target(&body, pos, window);
                }
            }
        });

    interaction
}

fn drag_id(task_id: Uuid) -> Id {
    Id::new(("drag", task_id))
}

fn preview_id(task_id: Uuid) -> Id {
    Id::new(("drag-preview", task_id))
}

/// Lane and date under a click on empty lane space.
fn empty_click_target(body: &Body, pos: Pos2, window: &VisibleWindow) -> Option<(Lane, NaiveDate)> {
    if !body.rect.contains(pos) || pos.x < body.rect.left() + RULER_WIDTH {
        return None;
    }
    let index = ((pos.x - body.rect.left() - RULER_WIDTH) / body.lane_width) as usize;
    let lane = *Lane::ALL.get(index)?;
    let date = pixel_to_date(
        (pos.y - body.rect.top()) as f64,
        body.scale_height as f64,
        window,
    )
    .ok()?;
    Some((lane, date))
}

fn draw_lane_headers(
    ui: &mut Ui,
    painter: &egui::Painter,
    origin: Pos2,
    body: &Body,
    plan: &Plan,
    interaction: &mut TimelineInteraction,
) {
    let header_rect = Rect::from_min_size(origin, Vec2::new(body.rect.width(), HEADER_HEIGHT));
    painter.rect_filled(header_rect, 0.0, theme::BG_HEADER);
    painter.line_segment(
        [header_rect.left_bottom(), header_rect.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    painter.text(
        Pos2::new(origin.x + 8.0, header_rect.center().y),
        egui::Align2::LEFT_CENTER,
        "Date",
        theme::font_header(),
        theme::TEXT_SECONDARY,
    );

    for (i, lane) in Lane::ALL.iter().enumerate() {
        let left = origin.x + RULER_WIDTH + i as f32 * body.lane_width;
        painter.line_segment(
            [Pos2::new(left, origin.y), Pos2::new(left, body.rect.bottom())],
            Stroke::new(1.0, theme::BORDER_SUBTLE),
        );
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(left, origin.y), Vec2::new(body.lane_width, 3.0)),
            0.0,
            theme::lane_accent(*lane),
        );
        painter.text(
            Pos2::new(left + 10.0, origin.y + 18.0),
            egui::Align2::LEFT_CENTER,
            lane.label(),
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
        painter.text(
            Pos2::new(left + 10.0, origin.y + 33.0),
            egui::Align2::LEFT_CENTER,
            format!("{} tasks", plan.lane_count(*lane)),
            theme::font_small(),
            theme::TEXT_DIM,
        );

        let add_rect = Rect::from_center_size(
            Pos2::new(left + body.lane_width - 18.0, origin.y + HEADER_HEIGHT / 2.0),
            Vec2::splat(22.0),
        );
        let add = ui
            .put(
                add_rect,
                egui::Button::new(egui_phosphor::regular::PLUS).frame(false),
            )
            .on_hover_text(format!("Add task to {}", lane.label()));
        if add.clicked() {
            interaction.add_in_lane = Some(*lane);
        }
    }
}

fn draw_ruler(painter: &egui::Painter, body: &Body, window: &VisibleWindow, mode: ViewMode) {
    let ruler_rect = Rect::from_min_size(body.rect.min, Vec2::new(RULER_WIDTH, body.rect.height()));
    painter.rect_filled(ruler_rect, 0.0, theme::BG_PANEL);

    // Labels closer than this overlap.
    let min_gap = 14.0;
    let mut last_label_y = f32::NEG_INFINITY;

    for marker in ruler_markers(window, mode) {
        if marker.percent > 100.0 {
            continue;
        }
        // A period that began before the window is labelled at the top edge.
        let y = body.y_for_percent(window.percent_clamped(marker.date));
        painter.line_segment(
            [Pos2::new(body.rect.left() + RULER_WIDTH - 6.0, y), Pos2::new(body.rect.right(), y)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        if y - last_label_y >= min_gap {
            painter.text(
                Pos2::new(body.rect.left() + 8.0, y + 2.0),
                egui::Align2::LEFT_TOP,
                &marker.label,
                theme::font_sub(),
                theme::TEXT_SECONDARY,
            );
            last_label_y = y;
        }
    }

    painter.line_segment(
        [ruler_rect.right_top(), ruler_rect.right_bottom()],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_today_line(painter: &egui::Painter, body: &Body, window: &VisibleWindow) {
    let today = chrono::Local::now().date_naive();
    if !window.contains(today) {
        return;
    }
    let y = body.rect.top() + date_to_pixel(today, body.scale_height as f64, window) as f32;

    painter.line_segment(
        [Pos2::new(body.rect.left() + RULER_WIDTH, y), Pos2::new(body.rect.right(), y)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    let badge_rect = Rect::from_min_size(
        Pos2::new(body.rect.left() + RULER_WIDTH - 44.0, y - 7.0),
        Vec2::new(42.0, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_card(painter: &egui::Painter, task: &Task, rect: Rect, ghost: bool) {
    let rounding = Rounding::same(theme::CARD_ROUNDING);
    let color = theme::category_color(task.category);

    if ghost {
        painter.rect_filled(rect, rounding, color.gamma_multiply(0.45));
        painter.rect_stroke(rect, rounding, Stroke::new(1.5, theme::BORDER_ACCENT));
        return;
    }

    painter.rect_filled(rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(rect, rounding, color.gamma_multiply(0.85));
    // Category stripe on the left edge
    painter.rect_filled(
        Rect::from_min_size(rect.min, Vec2::new(3.0, rect.height())),
        Rounding {
            nw: theme::CARD_ROUNDING,
            sw: theme::CARD_ROUNDING,
            ne: 0.0,
            se: 0.0,
        },
        color,
    );

    if rect.width() > 24.0 {
        let clipped = painter.with_clip_rect(rect.shrink(2.0).intersect(painter.clip_rect()));
        let title = painter.layout_no_wrap(task.title.clone(), theme::font_card(), theme::TEXT_ON_CARD);
        clipped.galley(Pos2::new(rect.left() + 7.0, rect.top() + 4.0), title, Color32::TRANSPARENT);

        if rect.height() > 36.0 {
            clipped.text(
                Pos2::new(rect.left() + 7.0, rect.top() + 20.0),
                egui::Align2::LEFT_TOP,
                card_dates_label(task),
                theme::font_small(),
                Color32::from_white_alpha(200),
            );
        }
    }
}

fn show_card_tooltip(ui: &Ui, response: &egui::Response, task: &Task) {
    if !response.hovered() {
        return;
    }
    ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
    egui::show_tooltip_at_pointer(ui.ctx(), ui.layer_id(), Id::new(("task-tip", task.id)), |ui| {
        ui.strong(&task.title);
        ui.label(format!(
            "{} → {}",
            task.start_date.format("%Y-%m-%d"),
            task.end_date.format("%Y-%m-%d"),
        ));
        ui.label(format!(
            "{} · {} · {}",
            task.lane.label(),
            task.category.label(),
            duration_label(task)
        ));
        if let Some(description) = &task.description {
            ui.label(egui::RichText::new(description).small());
        }
    });
}

/// Short date line drawn inside a card.
fn card_dates_label(task: &Task) -> String {
    if task.is_point() {
        task.start_date.format("%b %-d").to_string()
    } else {
        format!("{} → {}", task.start_date.format("%b %-d"), task.end_date.format("%b %-d"))
    }
}

fn duration_label(task: &Task) -> String {
    match task.duration().num_days() {
        0 => "milestone".to_string(),
        1 => "1 day".to_string(),
        days => format!("{days} days"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn point_task_card_shows_single_date() {
        let task = Task::new("Launch", Lane::Outreach, date(2025, 3, 4), date(2025, 3, 4));
        assert_eq!(card_dates_label(&task), "Mar 4");
        assert_eq!(duration_label(&task), "milestone");
    }

    #[test]
    fn ranged_task_card_shows_both_dates_and_length() {
        let task = Task::new("Build", Lane::Prototype, date(2025, 1, 30), date(2025, 2, 3));
        assert_eq!(card_dates_label(&task), "Jan 30 → Feb 3");
        assert_eq!(duration_label(&task), "4 days");

        let short = Task::new("Sync", Lane::Design, date(2025, 1, 1), date(2025, 1, 2));
        assert_eq!(duration_label(&short), "1 day");
    }
}
