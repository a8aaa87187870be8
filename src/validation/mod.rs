//! Validation gate run immediately before dispatch.
//!
//! The engine is a pure function of its inputs: it merges the default part's
//! shared fields into each real part, applies structural rules, and
//! delegates destination-specific rules to that destination's adapter.
//! Problems block posting; warnings do not. The engine only reports; the
//! orchestrator owns the policy of skipping failing parts while posting the
//! rest.

pub mod merge;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Submission, SubmissionPart};
use crate::registry::AdapterRegistry;

pub use merge::merge_part_options;

/// Problems and warnings for one validation target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub problems: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn problem(mut self, message: impl Into<String>) -> Self {
        self.problems.push(message.into());
        self
    }

    pub fn warning(mut self, message: impl Into<String>) -> Self {
        self.warnings.push(message.into());
        self
    }

    pub fn extend(&mut self, other: ValidationResult) {
        self.problems.extend(other.problems);
        self.warnings.extend(other.warnings);
    }

    /// Any problem blocks posting for the part it belongs to.
    pub fn is_blocked(&self) -> bool {
        !self.problems.is_empty()
    }
}

/// Validation outcome for one real part, with the merged option bag the
/// dispatch path reuses so validation and posting see identical data.
#[derive(Debug, Clone)]
pub struct PartValidation {
    pub part_uuid: Uuid,
    pub destination_id: String,
    pub merged_options: Value,
    pub result: ValidationResult,
}

/// Aggregated per-part validation for a whole submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionValidation {
    pub parts: Vec<PartValidation>,
}

impl SubmissionValidation {
    pub fn part(&self, part_uuid: Uuid) -> Option<&PartValidation> {
        self.parts.iter().find(|p| p.part_uuid == part_uuid)
    }

    pub fn has_problems(&self) -> bool {
        self.parts.iter().any(|p| p.result.is_blocked())
    }

    /// Flattened problem list, prefixed with the destination they belong to.
    pub fn all_problems(&self) -> Vec<String> {
        self.parts
            .iter()
            .flat_map(|p| {
                p.result
                    .problems
                    .iter()
                    .map(move |m| format!("{}: {m}", p.destination_id))
            })
            .collect()
    }

    pub fn to_event_payload(&self, submission_uuid: Uuid) -> Value {
        serde_json::json!({
            "submission_uuid": submission_uuid,
            "parts": self
                .parts
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "part_uuid": p.part_uuid,
                        "destination_id": p.destination_id,
                        "problems": p.result.problems,
                        "warnings": p.result.warnings,
                    })
                })
                .collect::<Vec<_>>(),
        })
    }
}

/// Runs structural and destination rules over a submission's parts.
pub struct ValidationEngine;

impl ValidationEngine {
    /// Validate every non-default part. Pure: no store writes, no events.
    pub fn validate(submission: &Submission, registry: &AdapterRegistry) -> SubmissionValidation {
        let default_part = submission.default_part().cloned().unwrap_or_else(|| {
            SubmissionPart::default_part(submission.submission_uuid)
        });

        let mut validation = SubmissionValidation::default();

        for part in submission.postable_parts() {
            let merged_options = merge_part_options(&default_part.options, &part.options);
            let mut result = Self::structural_rules(submission, part);

            let mut merged_part = part.clone();
            merged_part.options = merged_options.clone();

            match registry.get(&part.destination_id) {
                Some(adapter) => {
                    result.extend(adapter.validate(submission, &merged_part, &default_part));
                }
                None => {
                    result.problems.push(format!(
                        "no adapter registered for destination '{}'",
                        part.destination_id
                    ));
                }
            }

            validation.parts.push(PartValidation {
                part_uuid: part.part_uuid,
                destination_id: part.destination_id.clone(),
                merged_options,
                result,
            });
        }

        validation
    }

    fn structural_rules(submission: &Submission, part: &SubmissionPart) -> ValidationResult {
        let mut result = ValidationResult::default();

        if submission.title.trim().is_empty() {
            result.problems.push("submission title is required".into());
        }

        if part.destination_id.trim().is_empty() {
            result.problems.push("part has no destination".into());
        }

        if submission.files.is_empty() && submission.description.is_none() {
            result
                .warnings
                .push("submission has neither files nor a description".into());
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionFile;

    #[test]
    fn test_missing_adapter_is_a_problem() {
        let registry = AdapterRegistry::default();
        let mut submission = Submission::new("title");
        submission.files.push(SubmissionFile::primary("a.png"));
        submission.parts.push(SubmissionPart::new(
            submission.submission_uuid,
            "unregistered",
        ));

        let validation = ValidationEngine::validate(&submission, &registry);
        assert!(validation.has_problems());
        assert_eq!(validation.parts.len(), 1);
        assert!(validation.parts[0].result.problems[0].contains("unregistered"));
    }

    #[test]
    fn test_empty_title_blocks_every_part() {
        let registry = AdapterRegistry::default();
        let mut submission = Submission::new("  ");
        submission
            .parts
            .push(SubmissionPart::new(submission.submission_uuid, "artfort"));

        let validation = ValidationEngine::validate(&submission, &registry);
        assert!(validation.parts[0]
            .result
            .problems
            .iter()
            .any(|p| p.contains("title")));
    }

    #[test]
    fn test_default_part_is_not_validated() {
        let registry = AdapterRegistry::default();
        let submission = Submission::new("title");

        let validation = ValidationEngine::validate(&submission, &registry);
        assert!(validation.parts.is_empty());
    }
}
