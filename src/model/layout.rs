//! Collision-free placement of tasks inside one lane.
//!
//! Vertical position and height come straight from the window's linear
//! time scale, so a task's on-screen position always matches its dates.
//! Collisions are resolved horizontally: tasks whose intervals overlap are
//! given different slots, and the caller divides the lane width by the number
//! of slots in the task's overlap group.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::{Lane, Task};
use super::timeline::VisibleWindow;

/// How tasks with overlapping dates are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Split overlapping tasks into side-by-side slots.
    #[default]
    LaneSplit,
    /// Pure date position, tasks may be drawn over each other.
    Overlay,
}

/// Tuning for a layout pass.
///
/// Slots are assigned from task dates alone. The height floor is applied
/// afterwards and never feeds back into collision detection, so a short task
/// ending on the day its neighbour starts shares slot 0 with it and its floored
/// card can cover the top of the next one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub policy: CollisionPolicy,
    /// Visual floor for short tasks, as a percent of the window. Does not
    /// affect slot assignment.
    pub min_height_percent: f64,
    /// Horizontal gap between neighbouring slots, as a percent of lane width.
    pub slot_gap_percent: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            policy: CollisionPolicy::LaneSplit,
            min_height_percent: 5.0,
            slot_gap_percent: 2.0,
        }
    }
}

/// Computed rectangle for one task for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub task_id: Uuid,
    pub top_percent: f64,
    pub height_percent: f64,
    pub slot: usize,
    pub slot_count: usize,
}

impl Placement {
    pub fn bottom_percent(&self) -> f64 {
        self.top_percent + self.height_percent
    }

    /// Width of one slot in percent of the lane, after removing the gaps.
    pub fn width_percent(&self, gap_percent: f64) -> f64 {
        let count = self.slot_count.max(1) as f64;
        ((100.0 - gap_percent * (count - 1.0)) / count).max(0.0)
    }

    pub fn left_percent(&self, gap_percent: f64) -> f64 {
        self.slot as f64 * (self.width_percent(gap_percent) + gap_percent)
    }
}

/// Lay out `tasks` against `window`.
///
/// Placements are returned in input order. Identical input always yields
/// identical output: ties on dates are broken by input position.
pub fn layout(tasks: &[Task], window: &VisibleWindow, config: &LayoutConfig) -> Vec<Placement> {
    if tasks.is_empty() {
        return Vec::new();
    }

    let slots = match config.policy {
        CollisionPolicy::LaneSplit => assign_slots(tasks, window.start()),
        CollisionPolicy::Overlay => vec![(0, 1); tasks.len()],
    };

    let placements: Vec<Placement> = tasks
        .iter()
        .zip(slots)
        .map(|(task, (slot, slot_count))| {
            let top = window.percent(task.start_date);
            let span = window.percent(task.end_date) - top;
            Placement {
                task_id: task.id,
                top_percent: top,
                height_percent: span.max(config.min_height_percent),
                slot,
                slot_count,
            }
        })
        .collect();

    tracing::debug!(
        tasks = placements.len(),
        slots = placements.iter().map(|p| p.slot_count).max().unwrap_or(0),
        "layout pass"
    );
    placements
}

/// Lay out each domain lane independently.
pub fn layout_by_lane(
    tasks: &[Task],
    window: &VisibleWindow,
    config: &LayoutConfig,
) -> BTreeMap<Lane, Vec<Placement>> {
    let mut grouped: BTreeMap<Lane, Vec<Task>> = BTreeMap::new();
    for task in tasks {
        grouped.entry(task.lane).or_default().push(task.clone());
    }
    grouped
        .into_iter()
        .map(|(lane, lane_tasks)| (lane, layout(&lane_tasks, window, config)))
        .collect()
}

/// Lowest point reached by any placement, for growing the scroll area.
pub fn max_extent(placements: &[Placement]) -> f64 {
    placements
        .iter()
        .map(Placement::bottom_percent)
        .fold(0.0, f64::max)
}

/// Interval of a task in milliseconds since `origin`, half-open.
///
/// Point tasks are widened to one millisecond so they still collide with
/// anything covering their instant.
fn interval_millis(task: &Task, origin: NaiveDate) -> (i64, i64) {
    let start = (task.start_date - origin).num_milliseconds();
    let end = (task.end_date - origin).num_milliseconds();
    (start, end.max(start + 1))
}

/// Greedy first-fit interval partitioning in start order.
///
/// Returns `(slot, slot_count)` per task in input order. `slot_count` is the
/// number of slots used by the connected overlap group the task belongs to.
fn assign_slots(tasks: &[Task], origin: NaiveDate) -> Vec<(usize, usize)> {
    let intervals: Vec<(i64, i64)> = tasks.iter().map(|t| interval_millis(t, origin)).collect();

    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by_key(|&i| (intervals[i].0, intervals[i].1, i));

    let mut lane_ends: Vec<i64> = Vec::new();
    let mut slots = vec![(0usize, 1usize); tasks.len()];

    let mut group: Vec<usize> = Vec::new();
    let mut group_end = i64::MIN;
    let mut group_slots = 0usize;

    for &i in &order {
        let (start, end) = intervals[i];

        if !group.is_empty() && start >= group_end {
            for &member in &group {
                slots[member].1 = group_slots;
            }
            group.clear();
            group_slots = 0;
        }

        let slot = match lane_ends.iter().position(|&lane_end| lane_end <= start) {
            Some(free) => {
                lane_ends[free] = end;
                free
            }
            None => {
                lane_ends.push(end);
                lane_ends.len() - 1
            }
        };

        slots[i].0 = slot;
        group.push(i);
        group_end = if group.len() == 1 { end } else { group_end.max(end) };
        group_slots = group_slots.max(slot + 1);
    }

    for &member in &group {
        slots[member].1 = group_slots;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Lane;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(title: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task::new(title, Lane::Testing, start, end)
    }

    fn window() -> VisibleWindow {
        VisibleWindow::new(date(2025, 1, 1), date(2025, 4, 1)).unwrap()
    }

    fn slot_of(placements: &[Placement], task: &Task) -> (usize, usize) {
        let p = placements.iter().find(|p| p.task_id == task.id).unwrap();
        (p.slot, p.slot_count)
    }

    #[test]
    fn empty_input_yields_no_placements() {
        assert!(layout(&[], &window(), &LayoutConfig::default()).is_empty());
        assert_eq!(max_extent(&[]), 0.0);
    }

    #[test]
    fn sequential_tasks_share_slot_zero() {
        let tasks = vec![
            task("a", date(2025, 1, 1), date(2025, 1, 5)),
            task("b", date(2025, 1, 5), date(2025, 1, 9)),
            task("c", date(2025, 2, 1), date(2025, 2, 3)),
            task("d", date(2025, 1, 10), date(2025, 1, 20)),
        ];
        let placements = layout(&tasks, &window(), &LayoutConfig::default());
        assert!(placements.iter().all(|p| p.slot == 0 && p.slot_count == 1));
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(6)]
    fn mutually_overlapping_tasks_use_one_slot_each(#[case] n: usize) {
        let tasks: Vec<Task> = (0..n)
            .map(|i| task("t", date(2025, 1, 1 + i as u32), date(2025, 2, 1)))
            .collect();
        let placements = layout(&tasks, &window(), &LayoutConfig::default());

        let mut slots: Vec<usize> = placements.iter().map(|p| p.slot).collect();
        slots.sort_unstable();
        assert_eq!(slots, (0..n).collect::<Vec<_>>());
        assert!(placements.iter().all(|p| p.slot_count == n));
    }

    #[test]
    fn overlap_groups_get_their_own_slot_counts() {
        let a = task("A", date(2025, 1, 1), date(2025, 1, 10));
        let b = task("B", date(2025, 1, 5), date(2025, 1, 15));
        let c = task("C", date(2025, 1, 20), date(2025, 1, 25));
        let placements = layout(&[c.clone(), a.clone(), b.clone()], &window(), &LayoutConfig::default());

        assert_eq!(slot_of(&placements, &a), (0, 2));
        assert_eq!(slot_of(&placements, &b), (1, 2));
        assert_eq!(slot_of(&placements, &c), (0, 1));
    }

    #[test]
    fn slot_count_matches_maximum_overlap_depth_in_chain() {
        // a overlaps b, b overlaps c, but a and c never meet: two slots suffice.
        let a = task("a", date(2025, 1, 1), date(2025, 1, 10));
        let b = task("b", date(2025, 1, 8), date(2025, 1, 18));
        let c = task("c", date(2025, 1, 12), date(2025, 1, 22));
        let placements = layout(&[a.clone(), b.clone(), c.clone()], &window(), &LayoutConfig::default());

        assert_eq!(slot_of(&placements, &a), (0, 2));
        assert_eq!(slot_of(&placements, &b), (1, 2));
        assert_eq!(slot_of(&placements, &c), (0, 2));
    }

    #[test]
    fn point_tasks_collide_with_covering_tasks_and_each_other() {
        let span = task("span", date(2025, 1, 1), date(2025, 1, 10));
        let p1 = task("p1", date(2025, 1, 7), date(2025, 1, 7));
        let p2 = task("p2", date(2025, 1, 7), date(2025, 1, 7));
        let placements = layout(&[span.clone(), p1.clone(), p2.clone()], &window(), &LayoutConfig::default());

        assert_eq!(slot_of(&placements, &span).0, 0);
        assert_eq!(slot_of(&placements, &p1).0, 1);
        assert_eq!(slot_of(&placements, &p2).0, 2);
    }

    #[test]
    fn point_task_at_end_boundary_reuses_slot() {
        let span = task("span", date(2025, 1, 1), date(2025, 1, 10));
        let point = task("point", date(2025, 1, 10), date(2025, 1, 10));
        let placements = layout(&[span, point.clone()], &window(), &LayoutConfig::default());
        assert_eq!(slot_of(&placements, &point), (0, 1));
    }

    #[test]
    fn point_task_gets_minimum_height() {
        let config = LayoutConfig {
            min_height_percent: 4.0,
            ..LayoutConfig::default()
        };
        let point = task("freeze", date(2025, 2, 1), date(2025, 2, 1));
        let placements = layout(&[point.clone()], &window(), &config);

        assert_eq!(placements[0].height_percent, 4.0);
        assert_eq!(point.start_date, point.end_date);
    }

    #[test]
    fn height_floor_does_not_split_back_to_back_tasks() {
        let config = LayoutConfig {
            min_height_percent: 20.0,
            ..LayoutConfig::default()
        };
        let decide = task("decide stages", date(2025, 1, 7), date(2025, 1, 10));
        let write = task("write plan", date(2025, 1, 10), date(2025, 1, 14));
        let placements = layout(&[decide.clone(), write.clone()], &window(), &config);

        assert_eq!(slot_of(&placements, &decide), (0, 1));
        assert_eq!(slot_of(&placements, &write), (0, 1));

        let first = placements.iter().find(|p| p.task_id == decide.id).unwrap();
        let second = placements.iter().find(|p| p.task_id == write.id).unwrap();
        assert_eq!(first.height_percent, 20.0);
        assert!(first.bottom_percent() > second.top_percent);
    }

    #[test]
    fn position_follows_dates_exactly() {
        let win = window();
        let t = task("t", date(2025, 2, 1), date(2025, 3, 1));
        let p = layout(&[t.clone()], &win, &LayoutConfig::default())[0];

        assert_eq!(p.top_percent, win.percent(t.start_date));
        assert!((p.bottom_percent() - win.percent(t.end_date)).abs() < 1e-9);
    }

    #[test]
    fn tasks_outside_window_are_still_placed() {
        let late = task("late", date(2025, 5, 1), date(2025, 5, 20));
        let placements = layout(&[late], &window(), &LayoutConfig::default());

        assert_eq!(placements.len(), 1);
        assert!(placements[0].top_percent > 100.0);
        assert!(max_extent(&placements) > 100.0);
    }

    #[test]
    fn layout_is_idempotent() {
        let tasks = vec![
            task("a", date(2025, 1, 3), date(2025, 1, 9)),
            task("b", date(2025, 1, 3), date(2025, 1, 9)),
            task("c", date(2025, 1, 4), date(2025, 1, 4)),
            task("d", date(2025, 1, 1), date(2025, 1, 30)),
        ];
        let config = LayoutConfig::default();
        assert_eq!(layout(&tasks, &window(), &config), layout(&tasks, &window(), &config));
    }

    #[test]
    fn identical_intervals_keep_input_order() {
        let a = task("a", date(2025, 1, 3), date(2025, 1, 9));
        let b = task("b", date(2025, 1, 3), date(2025, 1, 9));
        let placements = layout(&[a.clone(), b.clone()], &window(), &LayoutConfig::default());
        assert_eq!(slot_of(&placements, &a).0, 0);
        assert_eq!(slot_of(&placements, &b).0, 1);
    }

    #[test]
    fn overlay_policy_never_splits() {
        let config = LayoutConfig {
            policy: CollisionPolicy::Overlay,
            ..LayoutConfig::default()
        };
        let tasks = vec![
            task("a", date(2025, 1, 1), date(2025, 1, 10)),
            task("b", date(2025, 1, 2), date(2025, 1, 10)),
        ];
        let placements = layout(&tasks, &window(), &config);
        assert!(placements.iter().all(|p| p.slot == 0 && p.slot_count == 1));
    }

    #[test]
    fn layout_by_lane_keeps_lanes_apart() {
        let a = task("a", date(2025, 1, 1), date(2025, 1, 10));
        let mut b = task("b", date(2025, 1, 1), date(2025, 1, 10));
        b.lane = Lane::Design;
        let by_lane = layout_by_lane(&[a, b], &window(), &LayoutConfig::default());

        assert_eq!(by_lane.len(), 2);
        assert!(by_lane.values().flatten().all(|p| p.slot == 0 && p.slot_count == 1));
    }

    #[test]
    fn slot_geometry_divides_width() {
        let p = Placement {
            task_id: Uuid::nil(),
            top_percent: 0.0,
            height_percent: 10.0,
            slot: 1,
            slot_count: 2,
        };
        assert_eq!(p.width_percent(2.0), 49.0);
        assert_eq!(p.left_percent(2.0), 51.0);
        assert_eq!(p.width_percent(0.0), 50.0);
    }
}
