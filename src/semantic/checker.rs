use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::SourceLocation;
use crate::diagnostics::{IssueCollector, ValidationIssue, codes, did_you_mean};
use crate::graph::{DependencyGraph, NodeKind, format_cycle};
use crate::model::{ComponentSpec, PatternSpec, PropDefinition, PropType, Styling};

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Cross-entity checks over a fully resolved batch.
///
/// Every check runs independently; none suppresses another.
pub struct SemanticChecker<'a> {
    components: &'a [ComponentSpec],
    patterns: &'a [PatternSpec],
    graph: &'a DependencyGraph,
    component_names: FxHashSet<&'a str>,
    pattern_names: FxHashSet<&'a str>,
    collector: IssueCollector,
}

impl<'a> SemanticChecker<'a> {
    pub fn new(
        components: &'a [ComponentSpec],
        patterns: &'a [PatternSpec],
        graph: &'a DependencyGraph,
    ) -> Self {
        Self {
            components,
            patterns,
            graph,
            component_names: components.iter().map(|c| c.name.as_str()).collect(),
            pattern_names: patterns.iter().map(|p| p.name.as_str()).collect(),
            collector: IssueCollector::new(),
        }
    }

    /// Run every check.
    pub fn check_all(&mut self) {
        self.check_duplicates();
        for component in self.components {
            self.check_component(component);
        }
        for pattern in self.patterns {
            self.check_pattern(pattern);
        }
        self.check_structural_cycles();
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        self.collector.issues()
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.collector.into_issues()
    }

    fn report(&mut self, issue: ValidationIssue, path: &[&str], location: &SourceLocation) {
        self.collector.add(
            issue
                .with_path(path.iter().copied())
                .with_location(location.clone()),
        );
    }

    // ============================================================================
    // Duplicates
    // ============================================================================

    fn check_duplicates(&mut self) {
        let components = self.components;
        let patterns = self.patterns;
        self.duplicates_in("components", components.iter().map(|c| (&c.name, &c.location)));
        self.duplicates_in("patterns", patterns.iter().map(|p| (&p.name, &p.location)));
    }

    fn duplicates_in<'b>(
        &mut self,
        collection: &str,
        entries: impl Iterator<Item = (&'b SmolStr, &'b SourceLocation)>,
    ) {
        let mut first: IndexMap<&SmolStr, &SourceLocation> = IndexMap::new();
        for (name, location) in entries {
            match first.get(name) {
                Some(original) => {
                    let issue = ValidationIssue::error(
                        codes::DUPLICATE_DEFINITION,
                        format!(
                            "{} '{name}' is already defined at {original}",
                            singular(collection)
                        ),
                    );
                    self.report(issue, &[collection, name.as_str()], location);
                }
                None => {
                    first.insert(name, location);
                }
            }
        }
    }

    // ============================================================================
    // Components
    // ============================================================================

    fn check_component(&mut self, component: &ComponentSpec) {
        let name = component.name.as_str();
        self.check_enums(&component.props, &["components", name, "props"]);
        self.check_enums(&component.context, &["components", name, "context"]);
        self.check_component_refs(component);

        let declared: Vec<&PropDefinition> = component.props.iter().chain(&component.context).collect();
        self.check_styling(&component.styling, &declared, &["components", name, "styling"]);

        for part in &component.parts {
            let part_path = ["components", name, "parts", part.name.as_str()];
            self.check_enums(&part.props, &join(&part_path, &["props"]));
            let visible: Vec<&PropDefinition> = part.props.iter().chain(declared.iter().copied()).collect();
            self.check_styling(&part.styling, &visible, &join(&part_path, &["styling"]));
        }
    }

    fn check_enums(&mut self, props: &[PropDefinition], path: &[&str]) {
        for prop in props {
            let empty = match &prop.prop_type {
                PropType::Enum { values } => values.is_empty(),
                PropType::Array { items } => matches!(&**items, PropType::Enum { values } if values.is_empty()),
                _ => false,
            };
            if empty {
                let issue = ValidationIssue::error(
                    codes::EMPTY_ENUM,
                    format!("enum prop '{}' declares no values", prop.name),
                );
                self.report(issue, &join(path, &[prop.name.as_str()]), &prop.location);
            }
            if let PropType::Object { fields } = &prop.prop_type {
                self.check_enums(fields, &join(path, &[prop.name.as_str(), "fields"]));
            }
        }
    }

    fn check_component_refs(&mut self, component: &ComponentSpec) {
        let props = component
            .props
            .iter()
            .chain(&component.context)
            .chain(component.parts.iter().flat_map(|p| &p.props));
        for prop in props {
            for target in prop.prop_type.component_refs() {
                if self.component_names.contains(target.as_str()) {
                    continue;
                }
                let issue = self.missing_component(
                    target,
                    format!(
                        "prop '{}' of component '{}' refers to unknown component '{target}'",
                        prop.name, component.name
                    ),
                );
                self.report(
                    issue,
                    &["components", component.name.as_str(), "props", prop.name.as_str()],
                    &prop.location,
                );
            }
        }
    }

    fn check_styling(&mut self, styling: &Styling, props: &[&PropDefinition], path: &[&str]) {
        let find = |name: &str| props.iter().copied().find(|p| p.name == name);
        let prop_names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();

        for (prop_name, group) in &styling.variants {
            let group_path = join(path, &["variants", prop_name.as_str()]);
            let Some(prop) = find(prop_name.as_str()) else {
                let mut issue = ValidationIssue::warning(
                    codes::ORPHANED_VARIANT,
                    format!("variant group '{prop_name}' has no matching prop"),
                );
                if let Some(hint) = did_you_mean(prop_name, prop_names.iter().copied()) {
                    issue = issue.with_suggestion(hint);
                }
                self.report(issue, &group_path, &group.location);
                continue;
            };

            let Some(allowed) = variant_values(&prop.prop_type) else {
                continue;
            };
            for option in group.options.values() {
                if allowed.iter().any(|v| *v == option.name) {
                    continue;
                }
                let mut issue = ValidationIssue::warning(
                    codes::ORPHANED_VARIANT,
                    format!(
                        "variant '{}' is not a value of prop '{prop_name}' (expected one of {})",
                        option.name,
                        allowed.join(", ")
                    ),
                );
                if let Some(hint) = did_you_mean(&option.name, allowed.iter().map(SmolStr::as_str)) {
                    issue = issue.with_suggestion(hint);
                }
                self.report(
                    issue,
                    &join(&group_path, &[option.name.as_str()]),
                    &option.location,
                );
            }
        }

        for (index, compound) in styling.compound_variants.iter().enumerate() {
            let index = index.to_string();
            for condition in compound.conditions.keys() {
                if find(condition.as_str()).is_some() {
                    continue;
                }
                let mut issue = ValidationIssue::error(
                    codes::UNKNOWN_VARIANT_CONDITION,
                    format!("compound variant condition '{condition}' does not name a declared prop"),
                );
                if let Some(hint) = did_you_mean(condition, prop_names.iter().copied()) {
                    issue = issue.with_suggestion(hint);
                }
                let condition_path = join(path, &["compoundVariants", index.as_str(), "conditions", condition.as_str()]);
                self.report(issue, &condition_path, &compound.location);
            }
        }

        for (prop_name, value) in &styling.default_variants {
            let default_path = join(path, &["defaultVariants", prop_name.as_str()]);
            let location = styling
                .variants
                .get(prop_name)
                .map(|g| g.location.clone())
                .or_else(|| props.first().map(|p| p.location.clone()));
            let Some(prop) = find(prop_name.as_str()) else {
                let issue = ValidationIssue::warning(
                    codes::ORPHANED_VARIANT,
                    format!("default variant '{prop_name}' has no matching prop"),
                )
                .with_path(default_path.iter().copied())
                .with_location_opt(location);
                self.collector.add(issue);
                continue;
            };
            if let Some(allowed) = variant_values(&prop.prop_type) {
                if !allowed.contains(value) {
                    let issue = ValidationIssue::warning(
                        codes::ORPHANED_VARIANT,
                        format!("default variant '{value}' is not a value of prop '{prop_name}'"),
                    )
                    .with_path(default_path.iter().copied())
                    .with_location(prop.location.clone());
                    self.collector.add(issue);
                }
            }
        }
    }

    // ============================================================================
    // Patterns
    // ============================================================================

    fn check_pattern(&mut self, pattern: &PatternSpec) {
        let name = pattern.name.as_str();
        self.check_enums(&pattern.props, &["patterns", name, "props"]);

        for component in &pattern.components {
            if self.component_names.contains(component.as_str()) {
                continue;
            }
            let issue = self.missing_component(
                component,
                format!("pattern '{name}' uses unknown component '{component}'"),
            );
            let location = pattern
                .component_usage(component)
                .unwrap_or(&pattern.location);
            self.report(issue, &["patterns", name, "components", component.as_str()], location);
        }

        for embedded in &pattern.patterns {
            if self.pattern_names.contains(embedded.as_str()) {
                continue;
            }
            let mut issue = ValidationIssue::error(
                codes::MISSING_PATTERN,
                format!("pattern '{name}' embeds unknown pattern '{embedded}'"),
            );
            if let Some(hint) = did_you_mean(embedded, self.pattern_names.iter().copied()) {
                issue = issue.with_suggestion(hint);
            }
            self.report(issue, &["patterns", name, "patterns", embedded.as_str()], &pattern.location);
        }
    }

    fn missing_component(&self, name: &str, message: String) -> ValidationIssue {
        let mut issue = ValidationIssue::error(codes::MISSING_COMPONENT, message);
        if let Some(hint) = did_you_mean(name, self.component_names.iter().copied()) {
            issue = issue.with_suggestion(hint);
        }
        issue
    }

    // ============================================================================
    // Structure
    // ============================================================================

    fn check_structural_cycles(&mut self) {
        for cycle in self.graph.detect_cycles() {
            let Some(first) = cycle.first() else {
                continue;
            };
            let (collection, location) = match first.kind {
                NodeKind::Pattern => (
                    "patterns",
                    self.patterns
                        .iter()
                        .find(|p| p.name == first.name)
                        .map(|p| p.location.clone()),
                ),
                _ => (
                    "components",
                    self.components
                        .iter()
                        .find(|c| c.name == first.name)
                        .map(|c| c.location.clone()),
                ),
            };
            let issue = ValidationIssue::error(
                codes::STRUCTURAL_CYCLE,
                format!("structural cycle: {}", format_cycle(&cycle)),
            )
            .with_path([collection, first.name.as_str()])
            .with_location_opt(location);
            self.collector.add(issue);
        }
    }
}

/// Option names a variant group may use for a prop of this type.
fn variant_values(prop_type: &PropType) -> Option<Vec<SmolStr>> {
    match prop_type {
        PropType::Enum { values } => Some(values.clone()),
        PropType::Boolean => Some(vec![SmolStr::new_static("true"), SmolStr::new_static("false")]),
        _ => None,
    }
}

fn join<'p>(base: &[&'p str], rest: &[&'p str]) -> Vec<&'p str> {
    base.iter().chain(rest).copied().collect()
}

fn singular(collection: &str) -> &str {
    collection.strip_suffix('s').unwrap_or(collection)
}
