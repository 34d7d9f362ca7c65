//! Dependency inference from templates and trade sequencing
//!
//! Two additive strategies propose predecessors for a milestone being
//! authored:
//!
//! - **Template matching**: the template that best describes the candidate
//!   names its own dependency templates; the first existing milestone
//!   matching each of those is suggested.
//! - **Trade sequencing**: every existing milestone in a trade expected to
//!   finish before the candidate's trade is suggested.
//!
//! Suggestions keep discovery order, contain no duplicates, and never
//! include the candidate itself or a predecessor it already declares.
//! Inputs are never modified.

use log::debug;

use crate::domain::{
    predecessor_trades, successor_trades, Milestone, MilestoneId, MilestoneTemplate,
    TemplateLibrary, Trade,
};

/// Ordered, duplicate-free suggestion set with exclusions
struct Suggestions<'a> {
    excluded: Vec<&'a MilestoneId>,
    ids: Vec<MilestoneId>,
}

impl<'a> Suggestions<'a> {
    fn new(excluded: Vec<&'a MilestoneId>) -> Self {
        Self {
            excluded,
            ids: Vec::new(),
        }
    }

    fn is_excluded(&self, id: &MilestoneId) -> bool {
        self.excluded.contains(&id)
    }

    fn push(&mut self, id: &MilestoneId) {
        if !self.is_excluded(id) && !self.ids.contains(id) {
            self.ids.push(id.clone());
        }
    }

    fn into_ids(self) -> Vec<MilestoneId> {
        self.ids
    }
}

/// First existing milestone that is an instance of `template`, skipping excluded IDs
fn first_instance<'m>(
    template: &MilestoneTemplate,
    existing: &'m [Milestone],
    suggestions: &Suggestions<'_>,
) -> Option<&'m Milestone> {
    existing
        .iter()
        .filter(|m| !suggestions.is_excluded(&m.id))
        .find(|m| template.matches(m.trade.as_ref(), &m.name))
}

/// Suggests predecessors for `candidate` among `existing` milestones
pub fn suggest_dependencies(
    candidate: &Milestone,
    existing: &[Milestone],
    library: &TemplateLibrary,
) -> Vec<MilestoneId> {
    let mut excluded = vec![&candidate.id];
    excluded.extend(candidate.dependencies.iter());
    let mut suggestions = Suggestions::new(excluded);

    if let Some(template) = library.best_match(candidate.trade.as_ref(), &candidate.name) {
        debug!("'{}' matches template '{}'", candidate.name, template.id);
        for dep_template in template.dependencies.iter().filter_map(|id| library.get(id)) {
            if let Some(found) = first_instance(dep_template, existing, &suggestions) {
                suggestions.push(&found.id);
            }
        }
    }

    if let Some(trade) = candidate.trade.as_ref() {
        for &pred in predecessor_trades(trade) {
            let pred_trade = Trade::new(pred);
            for milestone in existing {
                if milestone.matches_trade_or_name(Some(&pred_trade), pred) {
                    suggestions.push(&milestone.id);
                }
            }
        }
    }

    let ids = suggestions.into_ids();
    debug!("suggested {} dependencies for '{}'", ids.len(), candidate.name);
    ids
}

/// Suggests existing milestones that should follow `candidate`
///
/// Uses the best template's typical successors and reads the trade
/// sequence forwards. Milestones the candidate depends on, or that already
/// depend on it, are not suggested.
pub fn suggest_successors(
    candidate: &Milestone,
    existing: &[Milestone],
    library: &TemplateLibrary,
) -> Vec<MilestoneId> {
    let mut excluded = vec![&candidate.id];
    excluded.extend(candidate.dependencies.iter());
    excluded.extend(
        existing
            .iter()
            .filter(|m| m.depends_on_id(&candidate.id))
            .map(|m| &m.id),
    );
    let mut suggestions = Suggestions::new(excluded);

    if let Some(template) = library.best_match(candidate.trade.as_ref(), &candidate.name) {
        for next in template.typical_successors.iter().filter_map(|id| library.get(id)) {
            if let Some(found) = first_instance(next, existing, &suggestions) {
                suggestions.push(&found.id);
            }
        }
    }

    if let Some(trade) = candidate.trade.as_ref() {
        for next in successor_trades(trade) {
            let next_trade = Trade::new(next);
            for milestone in existing {
                if milestone.matches_trade_or_name(Some(&next_trade), next) {
                    suggestions.push(&milestone.id);
                }
            }
        }
    }

    suggestions.into_ids()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> MilestoneId {
        MilestoneId::new(s).unwrap()
    }

    fn milestone(id_str: &str, name: &str, trade: Option<&str>) -> Milestone {
        let m = Milestone::new(id(id_str), name);
        match trade {
            Some(t) => m.with_trade(t),
            None => m,
        }
    }

    fn existing() -> Vec<Milestone> {
        vec![
            milestone("m1", "Site setup", Some("preliminaries")),
            milestone("m2", "Bulk excavation", Some("excavation")),
            milestone("m3", "Slab pour", Some("concrete")),
            milestone("m4", "Second slab pour", Some("concrete")),
            milestone("m5", "Plasterboard level 1", None),
        ]
    }

    #[test]
    fn template_and_trade_rules_combine() {
        let candidate = milestone("new", "Footings", Some("concrete"));

        let ids = suggest_dependencies(&candidate, &existing(), TemplateLibrary::builtin());
        // Template: footings_slab depends on excavation -> m2
        // Trade rule: concrete follows excavation -> m2 (deduplicated)
        assert_eq!(ids, vec![id("m2")]);
    }

    #[test]
    fn trade_rule_suggests_every_match() {
        let candidate = milestone("new", "Portal frames", Some("steel"));

        let ids = suggest_dependencies(&candidate, &existing(), TemplateLibrary::builtin());
        assert_eq!(ids, vec![id("m3"), id("m4")]);
    }

    #[test]
    fn name_match_finds_untraded_milestones() {
        let candidate = milestone("new", "Fix Carpentry", Some("carpentry"));

        let ids = suggest_dependencies(&candidate, &existing(), TemplateLibrary::builtin());
        assert_eq!(ids, vec![id("m5")]);
    }

    #[test]
    fn excludes_self_and_declared_dependencies() {
        let mut candidate = milestone("m4", "Second slab pour", Some("concrete"));
        candidate.add_dependency(id("m2"));

        let ids = suggest_dependencies(&candidate, &existing(), TemplateLibrary::builtin());
        assert!(ids.is_empty());
    }

    #[test]
    fn unknown_candidate_gets_nothing() {
        let candidate = milestone("new", "Team lunch", None);
        let ids = suggest_dependencies(&candidate, &existing(), TemplateLibrary::builtin());
        assert!(ids.is_empty());
    }

    #[test]
    fn does_not_mutate_inputs() {
        let candidate = milestone("new", "Roofing", Some("roofing"));
        let before = existing();
        let after = before.clone();

        let _ = suggest_dependencies(&candidate, &after, TemplateLibrary::builtin());
        assert_eq!(before, after);
        assert!(candidate.dependencies.is_empty());
    }

    #[test]
    fn successors_from_template_and_trade() {
        let existing = vec![
            milestone("s1", "Portal frames", Some("steel")),
            milestone("s2", "House frame", Some("framing")),
            milestone("s3", "Roof sheeting", Some("roofing")),
        ];
        let candidate = milestone("new", "Slab", Some("concrete"));

        let ids = suggest_successors(&candidate, &existing, TemplateLibrary::builtin());
        assert_eq!(ids, vec![id("s1"), id("s2")]);
    }

    #[test]
    fn successors_skip_existing_dependents() {
        let mut frame = milestone("s2", "House frame", Some("framing"));
        frame.add_dependency(id("new"));
        let existing = vec![frame];
        let candidate = milestone("new", "Slab", Some("concrete"));

        let ids = suggest_successors(&candidate, &existing, TemplateLibrary::builtin());
        assert!(ids.is_empty());
    }
}
