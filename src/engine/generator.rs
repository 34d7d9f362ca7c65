//! Template-based draft schedule generation
//!
//! Forward-schedules every template that applies to a project type:
//!
//! - A template's dependencies are placed before the template itself.
//! - Without placed dependencies, a draft starts on the running cursor
//!   (initially the project start).
//! - Otherwise it starts the day after the latest end among its
//!   dependency drafts.
//! - A draft ends `estimated_duration_days` after it starts, and the
//!   cursor moves to the latest end seen so far.
//!
//! The library must be acyclic, which [`TemplateLibrary::new`] guarantees.

use chrono::{Days, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    DraftId, Milestone, MilestoneId, MilestoneStatus, MilestoneTemplate, Priority, ProjectType,
    TemplateLibrary, Trade,
};

/// An unpersisted milestone proposed by the generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDraft {
    pub id: DraftId,

    /// Template the draft was generated from
    pub template_id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade: Option<Trade>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub priority: Priority,

    pub planned_start: NaiveDate,

    pub planned_end: NaiveDate,

    /// Draft IDs this draft depends on
    pub dependencies: Vec<DraftId>,

    pub critical_path_flag: bool,
}

impl MilestoneDraft {
    /// Converts the draft into an upcoming milestone keyed by its draft ID
    pub fn into_milestone(self) -> Milestone {
        let mut milestone = Milestone::new(MilestoneId::from(self.id), self.name);
        milestone.trade = self.trade;
        milestone.category = self.category;
        milestone.priority = self.priority;
        milestone.planned_start = Some(self.planned_start);
        milestone.planned_end = Some(self.planned_end);
        milestone.status = MilestoneStatus::Upcoming;
        milestone.critical_path_flag = self.critical_path_flag;
        milestone.dependencies = self.dependencies.into_iter().map(MilestoneId::from).collect();
        milestone
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

struct ScheduleBuilder<'l> {
    library: &'l TemplateLibrary,
    project_type: ProjectType,
    project_start: NaiveDate,
    cursor: NaiveDate,
    placed: HashMap<&'l str, usize>,
    drafts: Vec<MilestoneDraft>,
}

impl<'l> ScheduleBuilder<'l> {
    fn new(library: &'l TemplateLibrary, project_type: ProjectType, project_start: NaiveDate) -> Self {
        Self {
            library,
            project_type,
            project_start,
            cursor: project_start,
            placed: HashMap::new(),
            drafts: Vec::new(),
        }
    }

    /// Places a template (and its dependencies first), returning its draft position
    fn place(&mut self, template: &'l MilestoneTemplate) -> usize {
        if let Some(&pos) = self.placed.get(template.id.as_str()) {
            return pos;
        }

        let library = self.library;
        let mut dependencies = Vec::new();
        for dep in template.dependencies.iter().filter_map(|id| library.get(id)) {
            if dep.applies_to(self.project_type) {
                dependencies.push(self.place(dep));
            }
        }

        let start = dependencies
            .iter()
            .map(|&pos| self.drafts[pos].planned_end)
            .max()
            .map(|latest| add_days(latest, 1))
            .unwrap_or(self.cursor);
        let end = add_days(start, u64::from(template.estimated_duration_days));

        let draft = MilestoneDraft {
            id: DraftId::new(&template.id, self.project_start),
            template_id: template.id.clone(),
            name: template.name.clone(),
            trade: template.trade.clone(),
            category: template.category.clone(),
            priority: template.default_priority,
            planned_start: start,
            planned_end: end,
            dependencies: dependencies
                .iter()
                .map(|&pos| self.drafts[pos].id.clone())
                .collect(),
            critical_path_flag: template.is_critical_path,
        };

        if end > self.cursor {
            self.cursor = end;
        }

        let pos = self.drafts.len();
        self.drafts.push(draft);
        self.placed.insert(template.id.as_str(), pos);
        pos
    }

    fn finish(self) -> Vec<MilestoneDraft> {
        self.drafts
    }
}

/// Generates a draft programme for a project type starting on `project_start`
pub fn generate_schedule(
    project_start: NaiveDate,
    project_type: ProjectType,
    library: &TemplateLibrary,
) -> Vec<MilestoneDraft> {
    let mut builder = ScheduleBuilder::new(library, project_type, project_start);
    for template in library.for_project_type(project_type) {
        builder.place(template);
    }

    let drafts = builder.finish();
    debug!(
        "generated {} drafts for a {} project starting {}",
        drafts.len(),
        project_type,
        project_start
    );
    drafts
}
