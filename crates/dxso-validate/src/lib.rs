//! Consistency checks for a fully populated subobject registry.
//!
//! Subobjects may be created in any order, so an association can name a
//! subobject that is only added later. These checks run once population is
//! done. They log each problem and return it; they never modify the registry.

use std::collections::HashSet;

use dxso_ir::{SubobjectKind, SubobjectRef, SubobjectRegistry};

/// A consistency problem found in a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    /// An association names a subobject that is not in the registry.
    #[error("association '{association}' refers to unknown subobject '{subobject}'")]
    DanglingAssociation {
        association: String,
        subobject: String,
    },

    /// An association names another association.
    #[error("association '{association}' refers to association '{subobject}'")]
    AssociationToAssociation {
        association: String,
        subobject: String,
    },

    /// An export is listed more than once in one association.
    #[error("association '{association}' lists export '{export}' more than once")]
    DuplicateExport { association: String, export: String },

    /// A hit group binds no shader at all.
    #[error("hit group '{hit_group}' binds no shaders")]
    EmptyHitGroup { hit_group: String },
}

/// Checks every subobject in `registry` and returns the issues found.
pub fn validate(registry: &SubobjectRegistry) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for subobject in registry.iter() {
        match subobject.kind() {
            SubobjectKind::SubobjectToExportsAssociation => {
                validate_association(registry, subobject, &mut issues)
            }
            SubobjectKind::HitGroup => validate_hit_group(subobject, &mut issues),
            _ => {}
        }
    }
    for issue in &issues {
        log::warn!("{issue}");
    }
    issues
}

fn validate_association(
    registry: &SubobjectRegistry,
    subobject: SubobjectRef<'_>,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(assoc) = subobject.subobject_to_exports_association() else {
        return;
    };
    let association = subobject.name();
    let target = assoc.subobject();

    match registry.find_subobject(target) {
        None => issues.push(ValidationIssue::DanglingAssociation {
            association: association.to_owned(),
            subobject: target.to_owned(),
        }),
        Some(found) if found.kind() == SubobjectKind::SubobjectToExportsAssociation => {
            issues.push(ValidationIssue::AssociationToAssociation {
                association: association.to_owned(),
                subobject: target.to_owned(),
            })
        }
        Some(_) => {}
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for export in assoc.exports() {
        if !seen.insert(export) && reported.insert(export) {
            issues.push(ValidationIssue::DuplicateExport {
                association: association.to_owned(),
                export: export.to_owned(),
            });
        }
    }
}

fn validate_hit_group(subobject: SubobjectRef<'_>, issues: &mut Vec<ValidationIssue>) {
    let Some(hit_group) = subobject.hit_group() else {
        return;
    };
    if hit_group.intersection.is_empty()
        && hit_group.any_hit.is_empty()
        && hit_group.closest_hit.is_empty()
    {
        issues.push(ValidationIssue::EmptyHitGroup {
            hit_group: subobject.name().to_owned(),
        });
    }
}
