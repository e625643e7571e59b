use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::TimelineError;
use super::task::{Category, Lane, Task};

/// An execution plan: the task store the timeline reads from.
///
/// Every mutation goes through a validating method, so tasks held here always
/// satisfy `start_date <= end_date` and have a non-empty title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,
    tasks: Vec<Task>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            name: "Execution Plan".to_string(),
            tasks: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

/// Reject ranges whose end precedes their start.
pub fn validate_interval(start: NaiveDate, end: NaiveDate) -> Result<(), TimelineError> {
    if end < start {
        return Err(TimelineError::InvalidInterval { start, end });
    }
    Ok(())
}

/// Check everything a task must satisfy before it is admitted to a plan.
pub fn validate_task(task: &Task) -> Result<(), TimelineError> {
    if task.title.trim().is_empty() {
        return Err(TimelineError::EmptyTitle);
    }
    validate_interval(task.start_date, task.end_date)
}

impl Plan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a plan from untrusted tasks, dropping any that fail validation.
    /// Returns the plan and the number of tasks dropped.
    pub fn from_tasks(name: impl Into<String>, tasks: Vec<Task>) -> (Self, usize) {
        let mut plan = Self::new(name);
        let mut rejected = 0;
        for task in tasks {
            if let Err(e) = plan.add_task(task) {
                tracing::warn!(error = %e, "dropping invalid task");
                rejected += 1;
            }
        }
        (plan, rejected)
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn add_task(&mut self, task: Task) -> Result<(), TimelineError> {
        validate_task(&task)?;
        self.tasks.push(task);
        self.touch();
        Ok(())
    }

    /// Replace the stored task that has the same id.
    pub fn update_task(&mut self, task: Task) -> Result<(), TimelineError> {
        validate_task(&task)?;
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(TimelineError::TaskNotFound(task.id))?;
        *slot = task;
        self.touch();
        Ok(())
    }

    pub fn remove_task(&mut self, id: Uuid) -> Result<Task, TimelineError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TimelineError::TaskNotFound(id))?;
        self.touch();
        Ok(self.tasks.remove(index))
    }

    /// Apply revised dates from a reposition drag.
    pub fn on_task_dates_changed(
        &mut self,
        id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), TimelineError> {
        validate_interval(start, end)?;
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TimelineError::TaskNotFound(id))?;
        task.start_date = start;
        task.end_date = end;
        self.touch();
        Ok(())
    }

    /// Tasks belonging to `lane`, in stored order.
    pub fn tasks_in_lane(&self, lane: Lane) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.lane == lane).cloned().collect()
    }

    /// All tasks ordered lane by lane, stored order within a lane.
    pub fn tasks_grouped_by_lane(&self) -> Vec<Task> {
        Lane::ALL
            .iter()
            .flat_map(|lane| self.tasks_in_lane(*lane))
            .collect()
    }

    pub fn lane_count(&self, lane: Lane) -> usize {
        self.tasks.iter().filter(|t| t.lane == lane).count()
    }

    /// Earliest start and latest end across all tasks.
    pub fn date_extent(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.tasks.iter().map(|t| t.start_date).min()?;
        let end = self.tasks.iter().map(|t| t.end_date).max()?;
        Some((start, end))
    }

    /// The four-week kickoff plan shown on first launch.
    pub fn sample(today: NaiveDate) -> Self {
        use Category::*;
        use Lane::*;

        #[rustfmt::skip]
        let rows: [(&str, Lane, Category, i64, i64, &str); 25] = [
            ("Create shared project folder structure", Outreach, Planning, 0, 2,
             "Create /Outreach, /Product & Tech, /Testing, /Notes & Learnings folders"),
            ("Split target list into 3 categories", Outreach, Planning, 0, 3,
             "ADHD clinics (kids/adults), ADHD organizations/nonprofits, After-school academies"),
            ("Pick 3-5 priority targets", Outreach, Planning, 0, 5,
             "Select priority targets only, not all"),
            ("Lock roles (outreach, testing, product leads)", Outreach, Planning, 0, 5,
             "Assign outreach lead, testing & validation lead, product/design coordination"),
            ("Research priority targets", Outreach, Planning, 7, 10,
             "Who is the right person, their mission, how they handle ADHD/focus"),
            ("Draft master email template", Outreach, Development, 7, 10,
             "Create master email, then customize for each target"),
            ("Prepare 1-paragraph product summary", Outreach, Development, 7, 10,
             "Problem, what you measure, why it's useful (no tech details)"),
            ("Freeze current hardware/design", Prototype, Milestone, 7, 7,
             "No big changes - freeze current state"),
            ("Define current capabilities", Prototype, Planning, 7, 10,
             "What it can do today, what it cannot do yet, known issues & risks"),
            ("Decide testing stages", Testing, Planning, 7, 10,
             "Internal team testing, controlled external testing, at-home testing (future)"),
            ("Define success criteria", Testing, Planning, 7, 10,
             "Signal stability, repeatability, usability"),
            ("Write testing plan (1-2 pages)", Testing, Delivery, 10, 14,
             "Document testing framework and success criteria"),
            ("Send customized emails to 3-5 priority targets", Outreach, Delivery, 14, 16,
             "Send custom emails and log: date sent, who contacted, follow-up date"),
            ("Prepare 15-minute meeting agenda", Outreach, Planning, 14, 16,
             "Who we are, problem we see, what we're building, what feedback we want"),
            ("Internal team testing", Testing, Development, 14, 18,
             "Test device on team members, run consistent scenarios (focused/distracted tasks)"),
            ("Record internal test results", Testing, Review, 14, 18,
             "Signal behavior, failures, setup friction"),
            ("Create basic demo flow", Prototype, Development, 14, 18,
             "Put it on, show signal, explain in human language - no dashboards polish yet"),
            ("Follow up with non-responders", Outreach, Delivery, 21, 23,
             "Follow up on outreach emails"),
            ("Run first intro calls", Outreach, Review, 21, 25,
             "Capture: their questions, concerns, definition of \"useful\""),
            ("Fix critical blockers", Prototype, Development, 21, 25,
             "Stability, comfort, setup time - do not redesign everything"),
            ("Test with 2-3 external adults (controlled)", Testing, Development, 21, 25,
             "Focus on: ease of use, signal consistency - document everything"),
            ("Summarize conversations and feedback", Outreach, Review, 28, 30,
             "Who you talked to, what resonated, what didn't - update target prioritization"),
            ("Write testing summary", Testing, Delivery, 28, 30,
             "Who, how many, what scenarios, what worked/didn't - credibility asset"),
            ("Draft next 2-month plan", Prototype, Planning, 28, 30,
             "Prototype readiness date, at-home testing timeline, partner engagement plan"),
            ("Decide on patent filing and expansion", Prototype, Milestone, 28, 30,
             "Decide if/when to file provisional patent, expand outreach"),
        ];

        let mut plan = Plan::new("3-Month Execution Plan");
        plan.tasks = rows
            .into_iter()
            .map(|(title, lane, category, from, to, description)| {
                Task::new(
                    title,
                    lane,
                    today + chrono::Duration::days(from),
                    today + chrono::Duration::days(to),
                )
                .with_category(category)
                .with_description(description)
            })
            .collect();
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_task() -> Task {
        Task::new("Internal testing", Lane::Testing, date(2025, 1, 14), date(2025, 1, 18))
    }

    #[test]
    fn rejects_inverted_interval_at_the_boundary() {
        let mut plan = Plan::default();
        let mut task = sample_task();
        task.end_date = date(2025, 1, 10);

        assert_eq!(
            plan.add_task(task),
            Err(TimelineError::InvalidInterval {
                start: date(2025, 1, 14),
                end: date(2025, 1, 10),
            })
        );
        assert!(plan.is_empty());
    }

    #[test]
    fn rejects_blank_title() {
        let mut plan = Plan::default();
        let mut task = sample_task();
        task.title = "  ".into();
        assert_eq!(plan.add_task(task), Err(TimelineError::EmptyTitle));
    }

    #[test]
    fn date_change_updates_only_the_target() {
        let mut plan = Plan::default();
        let a = sample_task();
        let b = sample_task();
        plan.add_task(a.clone()).unwrap();
        plan.add_task(b.clone()).unwrap();

        plan.on_task_dates_changed(a.id, date(2025, 2, 1), date(2025, 2, 5))
            .unwrap();

        assert_eq!(plan.get(a.id).unwrap().start_date, date(2025, 2, 1));
        assert_eq!(plan.get(b.id).unwrap().start_date, date(2025, 1, 14));
    }

    #[test]
    fn date_change_validates_and_reports_missing_task() {
        let mut plan = Plan::default();
        let task = sample_task();
        plan.add_task(task.clone()).unwrap();

        assert!(plan
            .on_task_dates_changed(task.id, date(2025, 2, 5), date(2025, 2, 1))
            .is_err());
        let ghost = Uuid::new_v4();
        assert_eq!(
            plan.on_task_dates_changed(ghost, date(2025, 2, 1), date(2025, 2, 5)),
            Err(TimelineError::TaskNotFound(ghost))
        );
    }

    #[test]
    fn update_and_remove_round_trip() {
        let mut plan = Plan::default();
        let mut task = sample_task();
        plan.add_task(task.clone()).unwrap();

        task.title = "Renamed".into();
        plan.update_task(task.clone()).unwrap();
        assert_eq!(plan.get(task.id).unwrap().title, "Renamed");

        let removed = plan.remove_task(task.id).unwrap();
        assert_eq!(removed.id, task.id);
        assert_eq!(plan.remove_task(task.id), Err(TimelineError::TaskNotFound(task.id)));
    }

    #[test]
    fn from_tasks_drops_invalid_entries() {
        let mut bad = sample_task();
        bad.start_date = date(2025, 3, 1);
        let (plan, rejected) = Plan::from_tasks("imported", vec![sample_task(), bad]);
        assert_eq!(plan.tasks().len(), 1);
        assert_eq!(rejected, 1);
    }

    #[test]
    fn sample_plan_is_valid_and_fills_lanes() {
        let today = date(2025, 1, 6);
        let plan = Plan::sample(today);

        assert_eq!(plan.tasks().len(), 25);
        assert!(plan.tasks().iter().all(|t| validate_task(t).is_ok()));
        assert_eq!(plan.lane_count(Lane::Outreach), 12);
        assert_eq!(plan.lane_count(Lane::Design), 0);
        assert_eq!(plan.date_extent(), Some((today, today + chrono::Duration::days(30))));
        assert_eq!(plan.tasks_in_lane(Lane::Prototype).len(), 6);
    }

    #[test]
    fn grouped_tasks_follow_lane_order() {
        let d = date(2025, 1, 1);
        let tasks = vec![
            Task::new("t1", Lane::Testing, d, d),
            Task::new("o1", Lane::Outreach, d, d),
            Task::new("t2", Lane::Testing, d, d),
            Task::new("p1", Lane::Prototype, d, d),
        ];
        let (plan, _) = Plan::from_tasks("mixed", tasks);

        let titles: Vec<_> = plan
            .tasks_grouped_by_lane()
            .into_iter()
            .map(|t| t.title)
            .collect();
        let expected: Vec<String> = Lane::ALL
            .iter()
            .flat_map(|lane| plan.tasks_in_lane(*lane))
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, expected);
        assert_eq!(titles.len(), 4);
        let t1 = titles.iter().position(|t| t == "t1").unwrap();
        assert_eq!(titles[t1 + 1], "t2");
    }
}
