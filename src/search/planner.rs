//! Predicate planner.
//!
//! Decides, per request, which related-entity existence checks and which
//! ordering source the compiler needs. Pure and total: a flag is true iff at
//! least one active filter, exclusion or the active sort key references that
//! entity - never defensively.

use crate::schema::{sort_field, Entity};
use crate::search::spec::FilterSpecification;

/// Which entity the ORDER BY expression reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSource {
    #[default]
    Primary,
    RelatedEntity,
    PrimaryMetadata,
    RelatedMetadata,
}

/// Derived, per-request plan of required related-entity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredicatePlan {
    pub needs_company: bool,
    pub needs_contact_metadata: bool,
    pub needs_company_metadata: bool,
    pub order_source: OrderSource,
}

impl PredicatePlan {
    pub fn needs_entity(&self, entity: Entity) -> bool {
        match entity {
            Entity::Contact => true,
            Entity::Company => self.needs_company,
            Entity::ContactMetadata => self.needs_contact_metadata,
            Entity::CompanyMetadata => self.needs_company_metadata,
        }
    }
}

/// Compute the predicate plan for a specification.
pub fn plan(spec: &FilterSpecification) -> PredicatePlan {
    let mut out = PredicatePlan::default();

    let mut mark = |entity: Entity| match entity {
        Entity::Contact => {}
        Entity::Company => out.needs_company = true,
        Entity::ContactMetadata => out.needs_contact_metadata = true,
        Entity::CompanyMetadata => out.needs_company_metadata = true,
    };

    for f in spec.filters() {
        mark(f.field.entity());
    }
    for e in spec.exclusions() {
        mark(e.field.entity());
    }

    // An unknown sort key is reported by the compiler; the planner stays total.
    if let Some(sort) = spec.sort() {
        if let Some((entity, _)) = sort_field(&sort.field) {
            mark(entity);
            out.order_source = match entity {
                Entity::Contact => OrderSource::Primary,
                Entity::Company => OrderSource::RelatedEntity,
                Entity::ContactMetadata => OrderSource::PrimaryMetadata,
                Entity::CompanyMetadata => OrderSource::RelatedMetadata,
            };
        }
    }

    tracing::debug!(
        company = out.needs_company,
        contact_metadata = out.needs_contact_metadata,
        company_metadata = out.needs_company_metadata,
        "predicate plan computed"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FilterField;
    use crate::search::spec::{FilterPredicate, FilterSpecification};

    #[test]
    fn empty_spec_needs_nothing() {
        let p = plan(&FilterSpecification::default());
        assert!(!p.needs_company);
        assert!(!p.needs_contact_metadata);
        assert!(!p.needs_company_metadata);
        assert_eq!(p.order_source, OrderSource::Primary);
    }

    #[test]
    fn primary_only_filters_need_nothing() {
        let spec = FilterSpecification::builder()
            .filter(FilterField::Title, FilterPredicate::text(vec!["CEO".into()]))
            .unwrap()
            .free_text("smith")
            .build();
        let p = plan(&spec);
        assert!(!p.needs_company);
        assert!(!p.needs_contact_metadata);
        assert!(!p.needs_company_metadata);
    }

    #[test]
    fn single_company_filter_sets_exactly_that_flag() {
        let spec = FilterSpecification::builder()
            .filter(
                FilterField::EmployeeCount,
                FilterPredicate::range(Some(11), Some(50)),
            )
            .unwrap()
            .build();
        let p = plan(&spec);
        assert!(p.needs_company);
        assert!(!p.needs_contact_metadata);
        assert!(!p.needs_company_metadata);
    }

    #[test]
    fn exclusions_count_as_references() {
        let spec = FilterSpecification::builder()
            .exclude(FilterField::Industry, vec!["tobacco".into()])
            .unwrap()
            .build();
        assert!(plan(&spec).needs_company);
    }

    #[test]
    fn metadata_filters_set_their_own_flags() {
        let spec = FilterSpecification::builder()
            .filter(FilterField::Stage, FilterPredicate::text(vec!["qualified".into()]))
            .unwrap()
            .filter(
                FilterField::EnrichmentStatus,
                FilterPredicate::text(vec!["done".into()]),
            )
            .unwrap()
            .build();
        let p = plan(&spec);
        assert!(!p.needs_company);
        assert!(p.needs_contact_metadata);
        assert!(p.needs_company_metadata);
    }

    #[test]
    fn related_sort_key_sets_flag_and_order_source() {
        let spec = FilterSpecification::builder()
            .sort("num_employees", false)
            .build();
        let p = plan(&spec);
        assert!(p.needs_company);
        assert_eq!(p.order_source, OrderSource::RelatedEntity);
    }

    #[test]
    fn unknown_sort_key_does_not_set_flags() {
        let spec = FilterSpecification::builder().sort("bogus", true).build();
        let p = plan(&spec);
        assert!(!p.needs_company);
        assert_eq!(p.order_source, OrderSource::Primary);
    }
}
