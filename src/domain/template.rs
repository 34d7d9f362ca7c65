//! Milestone templates and trade sequencing knowledge
//!
//! The template library is a catalog of reusable milestone archetypes with
//! default durations and typical dependency chains. It is immutable once
//! built: the built-in library is compile-time data initialised on first
//! use, custom libraries are validated when constructed.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use super::milestone::{Priority, Trade};

#[derive(Debug, Error, PartialEq)]
pub enum LibraryError {
    #[error("Duplicate template ID: {0}")]
    DuplicateTemplate(String),

    #[error("Template '{template}' references unknown template '{reference}'")]
    UnknownReference { template: String, reference: String },

    #[error("Template dependencies form a cycle involving '{0}'")]
    Cycle(String),

    #[error("Unknown project type: {0}")]
    UnknownProjectType(String),
}

/// Kind of project a programme is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    #[default]
    Residential,
    Commercial,
    Industrial,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Residential => "residential",
            ProjectType::Commercial => "commercial",
            ProjectType::Industrial => "industrial",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "residential" => Ok(ProjectType::Residential),
            "commercial" => Ok(ProjectType::Commercial),
            "industrial" => Ok(ProjectType::Industrial),
            other => Err(LibraryError::UnknownProjectType(other.to_string())),
        }
    }
}

/// A reusable milestone archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneTemplate {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade: Option<Trade>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    pub estimated_duration_days: u32,

    /// Template IDs that must finish first
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub default_priority: Priority,

    #[serde(default)]
    pub is_critical_path: bool,

    /// Template IDs that usually follow this one
    #[serde(default)]
    pub typical_successors: Vec<String>,

    /// Project types this template applies to (empty means all)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_types: Vec<ProjectType>,
}

impl MilestoneTemplate {
    /// Returns true if this template is used for the given project type
    pub fn applies_to(&self, project_type: ProjectType) -> bool {
        self.project_types.is_empty() || self.project_types.contains(&project_type)
    }

    /// Returns true if a milestone with this trade or name is an instance of this template
    pub fn matches(&self, trade: Option<&Trade>, name: &str) -> bool {
        if self.trade.is_some() && self.trade.as_ref() == trade {
            return true;
        }
        let own = self.name.to_lowercase();
        !own.is_empty() && name.to_lowercase().contains(&own)
    }

    /// How well a milestone named `name` in `trade` matches this template
    ///
    /// Higher is better, `None` means no match.
    fn match_score(&self, trade: Option<&Trade>, name: &str) -> Option<u8> {
        let own = self.name.trim().to_lowercase();
        let other = name.trim().to_lowercase();

        if !own.is_empty() && own == other {
            Some(3)
        } else if !own.is_empty()
            && !other.is_empty()
            && (other.contains(&own) || own.contains(&other))
        {
            Some(2)
        } else if self.trade.is_some() && self.trade.as_ref() == trade {
            Some(1)
        } else {
            None
        }
    }
}

/// An immutable, validated set of milestone templates
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<MilestoneTemplate>,
    index: HashMap<String, usize>,
}

impl TemplateLibrary {
    /// Builds a library, rejecting duplicate IDs, dangling references and dependency cycles
    pub fn new(templates: Vec<MilestoneTemplate>) -> Result<Self, LibraryError> {
        let mut index = HashMap::new();
        for (pos, template) in templates.iter().enumerate() {
            if index.insert(template.id.clone(), pos).is_some() {
                return Err(LibraryError::DuplicateTemplate(template.id.clone()));
            }
        }

        let library = Self { templates, index };
        library.check_references()?;
        library.check_acyclic()?;
        Ok(library)
    }

    /// Returns the built-in library
    pub fn builtin() -> &'static TemplateLibrary {
        static BUILTIN: OnceLock<TemplateLibrary> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let templates = builtin_templates();
            let index = templates
                .iter()
                .enumerate()
                .map(|(pos, t)| (t.id.clone(), pos))
                .collect();
            TemplateLibrary { templates, index }
        })
    }

    fn check_references(&self) -> Result<(), LibraryError> {
        for template in &self.templates {
            for reference in template
                .dependencies
                .iter()
                .chain(template.typical_successors.iter())
            {
                if !self.index.contains_key(reference) {
                    return Err(LibraryError::UnknownReference {
                        template: template.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), LibraryError> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.templates.len())
            .map(|pos| graph.add_node(pos))
            .collect();

        for (pos, template) in self.templates.iter().enumerate() {
            for dep in &template.dependencies {
                if let Some(&dep_pos) = self.index.get(dep) {
                    graph.add_edge(nodes[dep_pos], nodes[pos], ());
                }
            }
        }

        toposort(&graph, None)
            .map(|_| ())
            .map_err(|cycle| LibraryError::Cycle(self.templates[graph[cycle.node_id()]].id.clone()))
    }

    /// Looks up a template by ID
    pub fn get(&self, id: &str) -> Option<&MilestoneTemplate> {
        self.index.get(id).map(|&pos| &self.templates[pos])
    }

    /// All templates in library order
    pub fn templates(&self) -> &[MilestoneTemplate] {
        &self.templates
    }

    /// Templates applicable to a project type, in library order
    pub fn for_project_type(
        &self,
        project_type: ProjectType,
    ) -> impl Iterator<Item = &MilestoneTemplate> {
        self.templates
            .iter()
            .filter(move |t| t.applies_to(project_type))
    }

    /// Finds the template that best describes a milestone
    ///
    /// An exact name match beats a name substring match, which beats a
    /// trade match. The earliest template wins ties.
    pub fn best_match(&self, trade: Option<&Trade>, name: &str) -> Option<&MilestoneTemplate> {
        let mut best: Option<(u8, &MilestoneTemplate)> = None;
        for template in &self.templates {
            if let Some(score) = template.match_score(trade, name) {
                if best.map_or(true, |(top, _)| score > top) {
                    best = Some((score, template));
                }
            }
        }
        best.map(|(_, template)| template)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Expected predecessor trades for one trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeRule {
    pub trade: &'static str,
    pub predecessors: &'static [&'static str],
}

/// Typical construction sequencing, earliest trade first
pub const TRADE_SEQUENCE: &[TradeRule] = &[
    TradeRule { trade: "excavation", predecessors: &[] },
    TradeRule { trade: "concrete", predecessors: &["excavation"] },
    TradeRule { trade: "steel", predecessors: &["concrete"] },
    TradeRule { trade: "framing", predecessors: &["concrete"] },
    TradeRule { trade: "roofing", predecessors: &["steel", "framing"] },
    TradeRule { trade: "electrical", predecessors: &["roofing"] },
    TradeRule { trade: "plumbing", predecessors: &["electrical"] },
    TradeRule { trade: "insulation", predecessors: &["plumbing"] },
    TradeRule { trade: "plasterboard", predecessors: &["insulation"] },
    TradeRule { trade: "carpentry", predecessors: &["plasterboard"] },
    TradeRule { trade: "tiling", predecessors: &["carpentry"] },
    TradeRule { trade: "painting", predecessors: &["tiling"] },
    TradeRule { trade: "flooring", predecessors: &["painting"] },
    TradeRule { trade: "fit-off", predecessors: &["flooring"] },
];

/// Returns the trades expected to finish before `trade`
pub fn predecessor_trades(trade: &Trade) -> &'static [&'static str] {
    TRADE_SEQUENCE
        .iter()
        .find(|rule| rule.trade == trade.as_str())
        .map(|rule| rule.predecessors)
        .unwrap_or(&[])
}

/// Returns the trades that usually follow `trade`
pub fn successor_trades(trade: &Trade) -> impl Iterator<Item = &'static str> + '_ {
    TRADE_SEQUENCE
        .iter()
        .filter(move |rule| rule.predecessors.contains(&trade.as_str()))
        .map(|rule| rule.trade)
}

struct BuiltinTemplate {
    id: &'static str,
    name: &'static str,
    trade: Option<&'static str>,
    category: &'static str,
    days: u32,
    dependencies: &'static [&'static str],
    priority: Priority,
    critical: bool,
    successors: &'static [&'static str],
    project_types: &'static [ProjectType],
}

use ProjectType::{Commercial, Industrial, Residential};

const BUILTIN: &[BuiltinTemplate] = &[
    BuiltinTemplate {
        id: "site_establishment",
        name: "Site Establishment",
        trade: Some("preliminaries"),
        category: "Preliminaries",
        days: 5,
        dependencies: &[],
        priority: Priority::High,
        critical: true,
        successors: &["excavation"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "excavation",
        name: "Excavation",
        trade: Some("excavation"),
        category: "Earthworks",
        days: 7,
        dependencies: &["site_establishment"],
        priority: Priority::High,
        critical: true,
        successors: &["footings_slab", "landscaping"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "footings_slab",
        name: "Footings & Slab",
        trade: Some("concrete"),
        category: "Foundation",
        days: 10,
        dependencies: &["excavation"],
        priority: Priority::High,
        critical: true,
        successors: &["structural_steel", "framing"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "structural_steel",
        name: "Structural Steel",
        trade: Some("steel"),
        category: "Structure",
        days: 14,
        dependencies: &["footings_slab"],
        priority: Priority::High,
        critical: true,
        successors: &["roofing"],
        project_types: &[Commercial, Industrial],
    },
    BuiltinTemplate {
        id: "framing",
        name: "Wall & Roof Framing",
        trade: Some("framing"),
        category: "Structure",
        days: 12,
        dependencies: &["footings_slab"],
        priority: Priority::High,
        critical: true,
        successors: &["roofing"],
        project_types: &[Residential, Commercial],
    },
    BuiltinTemplate {
        id: "roofing",
        name: "Roofing",
        trade: Some("roofing"),
        category: "Envelope",
        days: 7,
        dependencies: &["framing", "structural_steel"],
        priority: Priority::High,
        critical: true,
        successors: &["electrical_rough_in", "plumbing_rough_in", "fire_services"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "electrical_rough_in",
        name: "Electrical Rough-In",
        trade: Some("electrical"),
        category: "Services",
        days: 5,
        dependencies: &["roofing"],
        priority: Priority::Medium,
        critical: false,
        successors: &["insulation"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "plumbing_rough_in",
        name: "Plumbing Rough-In",
        trade: Some("plumbing"),
        category: "Services",
        days: 5,
        dependencies: &["roofing"],
        priority: Priority::Medium,
        critical: false,
        successors: &["insulation"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "fire_services",
        name: "Fire Services",
        trade: Some("fire protection"),
        category: "Services",
        days: 8,
        dependencies: &["roofing"],
        priority: Priority::High,
        critical: false,
        successors: &["plasterboard"],
        project_types: &[Commercial, Industrial],
    },
    BuiltinTemplate {
        id: "insulation",
        name: "Insulation",
        trade: Some("insulation"),
        category: "Internal",
        days: 3,
        dependencies: &["electrical_rough_in", "plumbing_rough_in"],
        priority: Priority::Medium,
        critical: true,
        successors: &["plasterboard"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "plasterboard",
        name: "Plasterboard",
        trade: Some("plasterboard"),
        category: "Internal",
        days: 7,
        dependencies: &["insulation", "fire_services"],
        priority: Priority::Medium,
        critical: true,
        successors: &["fix_carpentry", "tiling"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "fix_carpentry",
        name: "Fix Carpentry",
        trade: Some("carpentry"),
        category: "Internal",
        days: 10,
        dependencies: &["plasterboard"],
        priority: Priority::Medium,
        critical: true,
        successors: &["painting"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "tiling",
        name: "Tiling",
        trade: Some("tiling"),
        category: "Finishes",
        days: 5,
        dependencies: &["plasterboard"],
        priority: Priority::Medium,
        critical: false,
        successors: &["painting"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "painting",
        name: "Painting",
        trade: Some("painting"),
        category: "Finishes",
        days: 7,
        dependencies: &["fix_carpentry", "tiling"],
        priority: Priority::Medium,
        critical: true,
        successors: &["flooring"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "flooring",
        name: "Floor Coverings",
        trade: Some("flooring"),
        category: "Finishes",
        days: 5,
        dependencies: &["painting"],
        priority: Priority::Low,
        critical: false,
        successors: &["electrical_fit_off"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "electrical_fit_off",
        name: "Final Electrical Fit-Off",
        trade: Some("fit-off"),
        category: "Services",
        days: 3,
        dependencies: &["flooring"],
        priority: Priority::Medium,
        critical: true,
        successors: &["plant_commissioning", "practical_completion"],
        project_types: &[],
    },
    BuiltinTemplate {
        id: "plant_commissioning",
        name: "Plant & Equipment Commissioning",
        trade: Some("mechanical"),
        category: "Services",
        days: 10,
        dependencies: &["electrical_fit_off"],
        priority: Priority::High,
        critical: true,
        successors: &["practical_completion"],
        project_types: &[Industrial],
    },
    BuiltinTemplate {
        id: "landscaping",
        name: "Landscaping",
        trade: Some("landscaping"),
        category: "External",
        days: 5,
        dependencies: &["excavation"],
        priority: Priority::Low,
        critical: false,
        successors: &["practical_completion"],
        project_types: &[Residential],
    },
    BuiltinTemplate {
        id: "practical_completion",
        name: "Practical Completion",
        trade: None,
        category: "Handover",
        days: 2,
        dependencies: &["electrical_fit_off", "plant_commissioning", "landscaping"],
        priority: Priority::High,
        critical: true,
        successors: &[],
        project_types: &[],
    },
];

fn builtin_templates() -> Vec<MilestoneTemplate> {
    let owned = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    BUILTIN
        .iter()
        .map(|t| MilestoneTemplate {
            id: t.id.to_string(),
            name: t.name.to_string(),
            trade: t.trade.map(Trade::new),
            category: Some(t.category.to_string()),
            estimated_duration_days: t.days,
            dependencies: owned(t.dependencies),
            default_priority: t.priority,
            is_critical_path: t.critical,
            typical_successors: owned(t.successors),
            project_types: t.project_types.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(id: &str, deps: &[&str]) -> MilestoneTemplate {
        MilestoneTemplate {
            id: id.to_string(),
            name: id.to_string(),
            trade: None,
            category: None,
            estimated_duration_days: 1,
            dependencies: deps.iter().map(|s| s.to_string()).collect(),
            default_priority: Priority::Medium,
            is_critical_path: false,
            typical_successors: vec![],
            project_types: vec![],
        }
    }

    #[test]
    fn builtin_library_is_valid() {
        let builtin = TemplateLibrary::builtin();
        let rebuilt = TemplateLibrary::new(builtin.templates().to_vec());
        assert!(rebuilt.is_ok(), "{:?}", rebuilt.err());
        assert!(!builtin.is_empty());
    }

    #[test]
    fn builtin_library_has_core_templates() {
        let lib = TemplateLibrary::builtin();

        let site = lib.get("site_establishment").unwrap();
        assert_eq!(site.estimated_duration_days, 5);
        assert!(site.dependencies.is_empty());

        let excavation = lib.get("excavation").unwrap();
        assert_eq!(excavation.estimated_duration_days, 7);
        assert_eq!(excavation.dependencies, vec!["site_establishment"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = TemplateLibrary::new(vec![template("a", &[]), template("a", &[])]);
        assert_eq!(result.err(), Some(LibraryError::DuplicateTemplate("a".into())));
    }

    #[test]
    fn rejects_unknown_reference() {
        let result = TemplateLibrary::new(vec![template("a", &["ghost"])]);
        assert!(matches!(result, Err(LibraryError::UnknownReference { .. })));
    }

    #[test]
    fn rejects_cycles() {
        let result = TemplateLibrary::new(vec![
            template("a", &["c"]),
            template("b", &["a"]),
            template("c", &["b"]),
        ]);
        assert!(matches!(result, Err(LibraryError::Cycle(_))));

        let result = TemplateLibrary::new(vec![template("self", &["self"])]);
        assert!(matches!(result, Err(LibraryError::Cycle(_))));
    }

    #[test]
    fn project_type_filter() {
        let lib = TemplateLibrary::builtin();

        let residential: Vec<_> = lib
            .for_project_type(ProjectType::Residential)
            .map(|t| t.id.as_str())
            .collect();
        assert!(residential.contains(&"framing"));
        assert!(!residential.contains(&"plant_commissioning"));
        assert!(!residential.contains(&"structural_steel"));

        let industrial: Vec<_> = lib
            .for_project_type(ProjectType::Industrial)
            .map(|t| t.id.as_str())
            .collect();
        assert!(industrial.contains(&"plant_commissioning"));
        assert!(!industrial.contains(&"landscaping"));
    }

    #[test]
    fn parse_project_type() {
        assert_eq!("Commercial".parse::<ProjectType>().unwrap(), ProjectType::Commercial);
        assert!("castle".parse::<ProjectType>().is_err());
    }

    #[test]
    fn best_match_prefers_name_over_trade() {
        let lib = TemplateLibrary::builtin();

        let exact = lib.best_match(Some(&Trade::new("electrical")), "Final Electrical Fit-Off");
        assert_eq!(exact.unwrap().id, "electrical_fit_off");

        let by_trade = lib.best_match(Some(&Trade::new("electrical")), "Switchboard install");
        assert_eq!(by_trade.unwrap().id, "electrical_rough_in");

        let substring = lib.best_match(None, "level 2 plasterboard");
        assert_eq!(substring.unwrap().id, "plasterboard");

        assert!(lib.best_match(None, "Something unrelated").is_none());
    }

    #[test]
    fn trade_rules() {
        assert_eq!(predecessor_trades(&Trade::new("concrete")), &["excavation"]);
        assert!(predecessor_trades(&Trade::new("excavation")).is_empty());
        assert!(predecessor_trades(&Trade::new("unknown")).is_empty());

        let after_concrete: Vec<_> = successor_trades(&Trade::new("concrete")).collect();
        assert_eq!(after_concrete, vec!["steel", "framing"]);
    }

    #[test]
    fn template_matches_trade_or_name() {
        let lib = TemplateLibrary::builtin();
        let roofing = lib.get("roofing").unwrap();

        assert!(roofing.matches(Some(&Trade::new("roofing")), "Anything"));
        assert!(roofing.matches(None, "Roofing - east wing"));
        assert!(!roofing.matches(Some(&Trade::new("tiling")), "Bathroom"));
    }

    #[test]
    fn parse_template_yaml() {
        let yaml = r#"
- id: demo
  name: Demolition
  trade: Demolition
  estimated_duration_days: 4
  default_priority: high
  project_types: [commercial]
"#;
        let templates: Vec<MilestoneTemplate> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(templates[0].trade, Some(Trade::new("demolition")));
        assert_eq!(templates[0].default_priority, Priority::High);
        assert!(templates[0].applies_to(ProjectType::Commercial));
        assert!(!templates[0].applies_to(ProjectType::Residential));
    }
}
