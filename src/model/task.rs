use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The parallel work stream a task belongs to.
///
/// Tasks are only ever laid out against other tasks in the same lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Testing,
    Design,
    Prototype,
    Outreach,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::Testing, Lane::Design, Lane::Prototype, Lane::Outreach];

    /// Column heading shown above the lane.
    pub fn label(&self) -> &'static str {
        match self {
            Lane::Testing => "Testing Timeline",
            Lane::Design => "Design Revisions",
            Lane::Prototype => "Prototype Readiness",
            Lane::Outreach => "Outreach Timing",
        }
    }

    /// Stable lowercase key used in files and prompts.
    pub fn key(&self) -> &'static str {
        match self {
            Lane::Testing => "testing",
            Lane::Design => "design",
            Lane::Prototype => "prototype",
            Lane::Outreach => "outreach",
        }
    }

    /// Parse either the key or the heading, ignoring case.
    pub fn parse(s: &str) -> Option<Lane> {
        let s = s.trim().to_lowercase();
        Lane::ALL
            .into_iter()
            .find(|lane| s == lane.key() || s == lane.label().to_lowercase())
    }
}

/// Display-only classification of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Planning,
    Development,
    Review,
    Milestone,
    Delivery,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Planning,
        Category::Development,
        Category::Review,
        Category::Milestone,
        Category::Delivery,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Planning => "Planning",
            Category::Development => "Development",
            Category::Review => "Review",
            Category::Milestone => "Milestone",
            Category::Delivery => "Delivery",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::Planning => "planning",
            Category::Development => "development",
            Category::Review => "review",
            Category::Milestone => "milestone",
            Category::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        let s = s.trim().to_lowercase();
        Category::ALL.into_iter().find(|c| s == c.key())
    }
}

/// A single time-bounded task on the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub lane: Lane,
    pub category: Category,
    pub start_date: NaiveDate,
    /// Inclusive of `start_date`; equal dates mark a point event.
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Task {
    /// Create a new planning task with a fresh id.
    pub fn new(
        title: impl Into<String>,
        lane: Lane,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            lane,
            category: Category::Planning,
            start_date,
            end_date,
            description: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end_date - self.start_date
    }

    /// True for zero-duration tasks such as milestones pinned to one day.
    pub fn is_point(&self) -> bool {
        self.start_date == self.end_date
    }
}
