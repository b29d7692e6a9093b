//! Apollo search-URL translation.
//!
//! Parses an Apollo people-search URL (query string carried in the URL
//! fragment, e.g. `https://app.apollo.io/#/people?personTitles[]=CEO`) into a
//! `FilterSpecification` plus a mapping report. Every input parameter lands in
//! exactly one of the mapped or unmapped lists; unmapped parameters never fail
//! the request. Only structurally invalid input is an error.

use crate::schema::FilterField;
use crate::search::spec::{FilterPredicate, FilterSpecification, TextMatchMode};
use crate::{Error, Result};
use url::form_urlencoded;
use url::Url;

/// Category taxonomy for vendor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCategory {
    Pagination,
    Sorting,
    PersonFilter,
    OrganizationFilter,
    EmailStatus,
    Keyword,
    Technology,
    Other,
}

/// A parameter that could not be translated, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmappedParameter {
    pub name: String,
    pub category: ParamCategory,
    pub reason: String,
}

/// Outcome of a URL translation. `mapped` and `unmapped` partition the input
/// parameters exactly; `notices` carries non-fatal partial-translation notes
/// (e.g. an industry tag id kept raw because the lookup table missed).
#[derive(Debug)]
pub struct MappingResult {
    pub spec: FilterSpecification,
    pub mapped: Vec<String>,
    pub unmapped: Vec<UnmappedParameter>,
    pub notices: Vec<String>,
}

/// Per-parameter transformation rule.
#[derive(Debug, Clone, Copy)]
enum Rule {
    Page,
    PerPage,
    SortField,
    SortAscending,
    Titles,
    NotTitles,
    TitleMatchMode,
    Seniorities,
    PersonLocations,
    Departments,
    EmailStatuses,
    FreeText,
    OrgLocations,
    EmployeeRanges,
    RevenueMin,
    RevenueMax,
    IndustryTagIds,
    Technologies,
    RequireAllTechnologies,
    OrgDomains,
    FundingStages,
    Unsupported(&'static str),
}

/// Static classification table: vendor parameter name (without any `[]`
/// suffix) to category and rule.
static PARAMS: phf::Map<&'static str, (ParamCategory, Rule)> = phf::phf_map! {
    "page" => (ParamCategory::Pagination, Rule::Page),
    "perPage" => (ParamCategory::Pagination, Rule::PerPage),
    "sortByField" => (ParamCategory::Sorting, Rule::SortField),
    "sortAscending" => (ParamCategory::Sorting, Rule::SortAscending),
    "personTitles" => (ParamCategory::PersonFilter, Rule::Titles),
    "personNotTitles" => (ParamCategory::PersonFilter, Rule::NotTitles),
    "titleMatchMode" => (ParamCategory::PersonFilter, Rule::TitleMatchMode),
    "personSeniorities" => (ParamCategory::PersonFilter, Rule::Seniorities),
    "personLocations" => (ParamCategory::PersonFilter, Rule::PersonLocations),
    "personDepartmentOrSubdepartments" => (ParamCategory::PersonFilter, Rule::Departments),
    "contactEmailStatusV2" => (ParamCategory::EmailStatus, Rule::EmailStatuses),
    "qKeywords" => (ParamCategory::Keyword, Rule::FreeText),
    "qPersonName" => (ParamCategory::Keyword, Rule::FreeText),
    "organizationLocations" => (ParamCategory::OrganizationFilter, Rule::OrgLocations),
    "organizationNumEmployeesRanges" => (ParamCategory::OrganizationFilter, Rule::EmployeeRanges),
    "revenueRange[min]" => (ParamCategory::OrganizationFilter, Rule::RevenueMin),
    "revenueRange[max]" => (ParamCategory::OrganizationFilter, Rule::RevenueMax),
    "organizationIndustryTagIds" => (ParamCategory::OrganizationFilter, Rule::IndustryTagIds),
    "currentTechnologies" => (ParamCategory::Technology, Rule::Technologies),
    "requireAllCurrentTechnologies" => (ParamCategory::Technology, Rule::RequireAllTechnologies),
    "organizationDomains" => (ParamCategory::OrganizationFilter, Rule::OrgDomains),
    "organizationFundingStages" => (ParamCategory::OrganizationFilter, Rule::FundingStages),
    // Recognized but untranslatable.
    "contactLabelIds" => (
        ParamCategory::Other,
        Rule::Unsupported("identifier-based filter - not resolvable without a lookup table"),
    ),
    "qOrganizationSearchListId" => (
        ParamCategory::Other,
        Rule::Unsupported("identifier-based filter - not resolvable without a lookup table"),
    ),
    "prospectedByCurrentTeam" => (
        ParamCategory::Other,
        Rule::Unsupported("vendor-specific feature with no internal equivalent"),
    ),
    "personLocationRadius" => (
        ParamCategory::PersonFilter,
        Rule::Unsupported("radius-based location search is not supported"),
    ),
};

/// Vendor sort field names to internal sort keys.
static SORT_FIELDS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "person_name" => "last_name",
    "person_title" => "title",
    "person_email" => "email",
    "person_created_at" => "created_at",
    "organization_name" => "company_name",
    "organization_estimated_number_employees" => "num_employees",
    "organization_annual_revenue" => "annual_revenue",
};

/// Industry tag identifiers to human-readable industry names. On a miss the
/// raw identifier is kept as the filter value and a notice is recorded.
static INDUSTRY_TAGS: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "5567cd4e7369643b70010000" => "information technology & services",
    "5567cd467369644d39040000" => "computer software",
    "5567cdd67369643b78100000" => "financial services",
    "5567e0bf7369641d115f0200" => "hospital & health care",
    "5567cd4d736964397e030000" => "marketing & advertising",
    "5567e1387369641ec75d0200" => "internet",
    "5567cd8e7369645409450000" => "retail",
    "5567ce1f7369643b806a0000" => "real estate",
    "5567cdb77369645401080000" => "construction",
    "5567cdd97369644cf95d0000" => "education management",
};

const EXPECTED_HOST_SUFFIX: &str = "apollo.io";

/// Apollo renders 25 results per page; applied when a URL carries a page
/// number without an explicit size, so offset and limit stay in step.
const VENDOR_PAGE_SIZE: usize = 25;

/// Translate an Apollo people-search URL into a filter specification.
pub fn map_url(raw_url: &str) -> Result<MappingResult> {
    if raw_url.trim().is_empty() {
        return Err(Error::Validation("Empty search URL".to_string()));
    }
    let url = Url::parse(raw_url.trim())
        .map_err(|e| Error::Validation(format!("Invalid search URL: {e}")))?;

    let host = url.host_str().unwrap_or_default();
    if host != EXPECTED_HOST_SUFFIX && !host.ends_with(&format!(".{EXPECTED_HOST_SUFFIX}")) {
        return Err(Error::Validation(format!(
            "URL host '{host}' is not an Apollo search host"
        )));
    }

    // Apollo keeps the query string inside the fragment (`/#/people?...`);
    // fall back to the standard query component for pre-hashbang links.
    let query = match url.fragment().and_then(|f| f.split_once('?')) {
        Some((_, query)) => query.to_string(),
        None => url
            .query()
            .map(|q| q.to_string())
            .ok_or_else(|| Error::Validation("Search URL has no query parameters".to_string()))?,
    };
    if query.is_empty() {
        return Err(Error::Validation(
            "Search URL has no query parameters".to_string(),
        ));
    }

    let params = group_params(&query);
    translate(params)
}

/// Decode and group `name=value` pairs, preserving first-occurrence order and
/// multi-valued (`name[]`) parameters.
fn group_params(query: &str) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        let name = name.into_owned();
        let value = value.into_owned();
        match grouped.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((name, vec![value])),
        }
    }
    grouped
}

/// Lookup key for the classification table: array-style suffix stripped,
/// except for bracketed sub-keys like `revenueRange[min]`.
fn table_key(name: &str) -> &str {
    name.strip_suffix("[]").unwrap_or(name)
}

fn translate(params: Vec<(String, Vec<String>)>) -> Result<MappingResult> {
    let mut mapped = Vec::new();
    let mut unmapped = Vec::new();
    let mut notices = Vec::new();

    // Cross-parameter state resolved after classification.
    let mut titles: Vec<String> = Vec::new();
    let mut title_mode = TextMatchMode::Substring;
    let mut sort_field_raw: Option<(String, String)> = None; // (param name, value)
    let mut sort_ascending: Option<(String, bool)> = None;
    let mut page: Option<(String, u64)> = None;
    let mut per_page: Option<usize> = None;
    let mut free_text_terms: Vec<String> = Vec::new();
    let mut technologies: Vec<String> = Vec::new();
    let mut require_all_technologies = false;
    let mut employee_bounds: Option<(Option<i64>, Option<i64>)> = None;
    let mut revenue_min: Option<i64> = None;
    let mut revenue_max: Option<i64> = None;

    let mut builder = FilterSpecification::builder();

    for (name, values) in params {
        let Some((category, rule)) = PARAMS.get(table_key(&name)) else {
            tracing::debug!(param = %name, "unmapped vendor parameter");
            unmapped.push(UnmappedParameter {
                name,
                category: ParamCategory::Other,
                reason: "not a recognized Apollo search parameter".to_string(),
            });
            continue;
        };

        match rule {
            Rule::Unsupported(reason) => {
                unmapped.push(UnmappedParameter {
                    name,
                    category: *category,
                    reason: (*reason).to_string(),
                });
                continue;
            }

            Rule::Page => match values[0].parse::<u64>() {
                // Mapped/unmapped is decided later: the offset computation
                // can still reject the value.
                Ok(p) if p >= 1 => page = Some((name, p)),
                _ => unmapped.push(UnmappedParameter {
                    name,
                    category: *category,
                    reason: format!("invalid page number '{}'", values[0]),
                }),
            },

            Rule::PerPage => match values[0].parse::<usize>() {
                Ok(n) if n >= 1 => {
                    per_page = Some(n);
                    mapped.push(name);
                }
                _ => unmapped.push(UnmappedParameter {
                    name,
                    category: *category,
                    reason: format!("invalid page size '{}'", values[0]),
                }),
            },

            Rule::SortField => {
                sort_field_raw = Some((name, values[0].clone()));
            }

            Rule::SortAscending => {
                sort_ascending = Some((name, values[0] == "true"));
            }

            Rule::Titles => {
                titles.extend(values);
                mapped.push(name);
            }

            Rule::NotTitles => {
                builder = builder.exclude(FilterField::Title, values)?;
                mapped.push(name);
            }

            Rule::TitleMatchMode => {
                match values[0].as_str() {
                    "partial" => title_mode = TextMatchMode::Substring,
                    "rearranged" => title_mode = TextMatchMode::WordOrder,
                    "keywords" => title_mode = TextMatchMode::WordSet,
                    other => {
                        notices.push(format!(
                            "unknown titleMatchMode '{other}', using substring matching"
                        ));
                    }
                }
                mapped.push(name);
            }

            Rule::Seniorities => {
                builder = builder.filter(FilterField::Seniority, FilterPredicate::text(values))?;
                mapped.push(name);
            }

            Rule::PersonLocations => {
                builder = builder.filter(FilterField::Location, FilterPredicate::text(values))?;
                mapped.push(name);
            }

            Rule::Departments => {
                builder =
                    builder.filter(FilterField::Departments, FilterPredicate::array_any(values))?;
                mapped.push(name);
            }

            Rule::EmailStatuses => {
                builder = builder.filter(FilterField::EmailStatus, FilterPredicate::text(values))?;
                mapped.push(name);
            }

            Rule::FreeText => {
                free_text_terms.extend(values);
                mapped.push(name);
            }

            Rule::OrgLocations => {
                builder =
                    builder.filter(FilterField::CompanyLocation, FilterPredicate::text(values))?;
                mapped.push(name);
            }

            Rule::EmployeeRanges => match parse_ranges(&values) {
                Some(bounds) => {
                    employee_bounds = Some(merge_bounds(employee_bounds, bounds));
                    mapped.push(name);
                }
                None => unmapped.push(UnmappedParameter {
                    name,
                    category: *category,
                    reason: format!("malformed employee range '{}'", values.join(";")),
                }),
            },

            Rule::RevenueMin => match values[0].parse::<i64>() {
                Ok(v) => {
                    revenue_min = Some(v);
                    mapped.push(name);
                }
                Err(_) => unmapped.push(UnmappedParameter {
                    name,
                    category: *category,
                    reason: format!("invalid revenue bound '{}'", values[0]),
                }),
            },

            Rule::RevenueMax => match values[0].parse::<i64>() {
                Ok(v) => {
                    revenue_max = Some(v);
                    mapped.push(name);
                }
                Err(_) => unmapped.push(UnmappedParameter {
                    name,
                    category: *category,
                    reason: format!("invalid revenue bound '{}'", values[0]),
                }),
            },

            Rule::IndustryTagIds => {
                let mut industries = Vec::new();
                for id in &values {
                    match INDUSTRY_TAGS.get(id.as_str()) {
                        Some(industry) => industries.push((*industry).to_string()),
                        None => {
                            // Keep the raw identifier rather than dropping the
                            // filter; partial translation, not a failure.
                            industries.push(id.clone());
                            notices
                                .push(format!("industry tag id '{id}' not in lookup table, kept raw"));
                        }
                    }
                }
                builder =
                    builder.filter(FilterField::Industry, FilterPredicate::array_any(industries))?;
                mapped.push(name);
            }

            Rule::Technologies => {
                technologies.extend(values);
                mapped.push(name);
            }

            Rule::RequireAllTechnologies => {
                require_all_technologies = values[0] == "true";
                mapped.push(name);
            }

            Rule::OrgDomains => {
                builder =
                    builder.filter(FilterField::CompanyDomain, FilterPredicate::domains(values))?;
                mapped.push(name);
            }

            Rule::FundingStages => {
                builder = builder.filter(FilterField::FundingStage, FilterPredicate::text(values))?;
                mapped.push(name);
            }
        }
    }

    // Combined parameters assembled after the classification pass.

    if !titles.is_empty() {
        builder = builder.filter(
            FilterField::Title,
            FilterPredicate::text_with_mode(titles, title_mode),
        )?;
    }

    if !technologies.is_empty() {
        let predicate = if require_all_technologies {
            FilterPredicate::array_all(technologies)
        } else {
            FilterPredicate::array_any(technologies)
        };
        builder = builder.filter(FilterField::Technologies, predicate)?;
    }

    if let Some((min, max)) = employee_bounds {
        builder = builder.filter(FilterField::EmployeeCount, FilterPredicate::range(min, max))?;
    }
    if revenue_min.is_some() || revenue_max.is_some() {
        builder = builder.filter(
            FilterField::Revenue,
            FilterPredicate::range(revenue_min, revenue_max),
        )?;
    }

    if !free_text_terms.is_empty() {
        builder = builder.free_text(free_text_terms.join(" "));
    }

    // Sort field and direction combine into one internal sort key. The `-`
    // prefix convention covers URLs that fold direction into the field name.
    let mut ascending_consumed = false;
    if let Some((name, raw_value)) = sort_field_raw {
        let (value, prefixed_descending) = match raw_value.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw_value.as_str(), false),
        };
        match SORT_FIELDS.get(value) {
            Some(internal) => {
                let ascending = if prefixed_descending {
                    false
                } else {
                    sort_ascending.as_ref().map(|(_, asc)| *asc).unwrap_or(true)
                };
                ascending_consumed = sort_ascending.is_some();
                builder = builder.sort(*internal, ascending);
                mapped.push(name);
            }
            None => unmapped.push(UnmappedParameter {
                name,
                category: ParamCategory::Sorting,
                reason: format!("unsupported sort field '{value}'"),
            }),
        }
    }
    if let Some((name, _)) = sort_ascending {
        if ascending_consumed {
            mapped.push(name);
        } else {
            unmapped.push(UnmappedParameter {
                name,
                category: ParamCategory::Sorting,
                reason: "sort direction without a translatable sort field".to_string(),
            });
        }
    }

    if let Some(per_page) = per_page {
        builder = builder.page_size(per_page);
    }
    if let Some((name, page)) = page {
        let page_size = per_page.unwrap_or(VENDOR_PAGE_SIZE);
        match page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(page_size as u64))
        {
            Some(offset) => {
                if per_page.is_none() {
                    builder = builder.page_size(page_size);
                }
                builder = builder.offset(offset);
                mapped.push(name);
            }
            None => unmapped.push(UnmappedParameter {
                name,
                category: ParamCategory::Pagination,
                reason: "page number out of range".to_string(),
            }),
        }
    }

    Ok(MappingResult {
        spec: builder.build(),
        mapped,
        unmapped,
        notices,
    })
}

/// Parse `"min,max"` range strings, merging multiple ranges into one span.
/// An empty side is an open bound.
fn parse_ranges(values: &[String]) -> Option<(Option<i64>, Option<i64>)> {
    let mut merged: Option<(Option<i64>, Option<i64>)> = None;
    for value in values {
        let (lo, hi) = value.split_once(',')?;
        let lo = parse_optional_bound(lo)?;
        let hi = parse_optional_bound(hi)?;
        merged = Some(merge_bounds(merged, (lo, hi)));
    }
    merged
}

fn parse_optional_bound(raw: &str) -> Option<Option<i64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    raw.parse::<i64>().ok().map(Some)
}

/// Widen an accumulated span to cover another range: multiple vendor ranges
/// OR together, which our single range filter expresses as their hull.
fn merge_bounds(
    acc: Option<(Option<i64>, Option<i64>)>,
    next: (Option<i64>, Option<i64>),
) -> (Option<i64>, Option<i64>) {
    let Some((acc_min, acc_max)) = acc else {
        return next;
    };
    let min = match (acc_min, next.0) {
        (Some(a), Some(b)) => Some(a.min(b)),
        _ => None,
    };
    let max = match (acc_max, next.1) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    };
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::spec::ActiveFilter;

    fn title_filter(result: &MappingResult) -> &ActiveFilter {
        result
            .spec
            .filters()
            .iter()
            .find(|f| f.field == FilterField::Title)
            .expect("title filter present")
    }

    #[test]
    fn maps_titles_and_employee_ranges() {
        let result = map_url(
            "https://app.apollo.io/#/people?personTitles[]=CEO&organizationNumEmployeesRanges[]=11%2C50",
        )
        .unwrap();

        assert_eq!(
            title_filter(&result).predicate,
            FilterPredicate::text(vec!["CEO".into()])
        );
        let employees = result
            .spec
            .filters()
            .iter()
            .find(|f| f.field == FilterField::EmployeeCount)
            .unwrap();
        assert_eq!(employees.predicate, FilterPredicate::range(Some(11), Some(50)));

        assert_eq!(
            result.mapped,
            vec!["personTitles[]", "organizationNumEmployeesRanges[]"]
        );
        assert!(result.unmapped.is_empty());
    }

    #[test]
    fn mapped_and_unmapped_partition_the_input() {
        let result = map_url(
            "https://app.apollo.io/#/people?personTitles[]=CTO&flurbleFactor=9&contactLabelIds[]=abc",
        )
        .unwrap();
        assert_eq!(result.mapped, vec!["personTitles[]"]);
        let unmapped_names: Vec<&str> =
            result.unmapped.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(unmapped_names, vec!["flurbleFactor", "contactLabelIds[]"]);
        assert_eq!(result.unmapped[0].category, ParamCategory::Other);
        assert!(result.unmapped[1].reason.contains("lookup table"));
    }

    #[test]
    fn multiple_employee_ranges_merge_to_their_hull() {
        let result = map_url(
            "https://app.apollo.io/#/people?organizationNumEmployeesRanges[]=11,50&organizationNumEmployeesRanges[]=51,200",
        )
        .unwrap();
        let employees = &result.spec.filters()[0];
        assert_eq!(
            employees.predicate,
            FilterPredicate::range(Some(11), Some(200))
        );
    }

    #[test]
    fn open_ended_range_sides_stay_unbounded() {
        let result = map_url(
            "https://app.apollo.io/#/people?organizationNumEmployeesRanges[]=1001,",
        )
        .unwrap();
        assert_eq!(
            result.spec.filters()[0].predicate,
            FilterPredicate::range(Some(1001), None)
        );
    }

    #[test]
    fn title_match_mode_switches_strategy() {
        let result = map_url(
            "https://app.apollo.io/#/people?personTitles[]=Engineering%20Manager&titleMatchMode=rearranged",
        )
        .unwrap();
        assert_eq!(
            title_filter(&result).predicate,
            FilterPredicate::text_with_mode(
                vec!["Engineering Manager".into()],
                TextMatchMode::WordOrder
            )
        );

        let result = map_url(
            "https://app.apollo.io/#/people?personTitles[]=growth+marketing&titleMatchMode=keywords",
        )
        .unwrap();
        assert!(matches!(
            &title_filter(&result).predicate,
            FilterPredicate::Text { mode: TextMatchMode::WordSet, .. }
        ));
    }

    #[test]
    fn industry_tag_ids_resolve_with_raw_fallback() {
        let result = map_url(
            "https://app.apollo.io/#/people?organizationIndustryTagIds[]=5567cd467369644d39040000&organizationIndustryTagIds[]=00000000deadbeef00000000",
        )
        .unwrap();
        assert_eq!(
            result.spec.filters()[0].predicate,
            FilterPredicate::array_any(vec![
                "computer software".into(),
                "00000000deadbeef00000000".into()
            ])
        );
        assert!(result.mapped.contains(&"organizationIndustryTagIds[]".to_string()));
        assert_eq!(result.notices.len(), 1);
        assert!(result.notices[0].contains("deadbeef"));
    }

    #[test]
    fn sort_field_and_direction_combine() {
        let result = map_url(
            "https://app.apollo.io/#/people?sortByField=organization_estimated_number_employees&sortAscending=false",
        )
        .unwrap();
        let sort = result.spec.sort().unwrap();
        assert_eq!(sort.field, "num_employees");
        assert!(!sort.ascending);
        assert!(result.mapped.contains(&"sortByField".to_string()));
        assert!(result.mapped.contains(&"sortAscending".to_string()));
    }

    #[test]
    fn dash_prefixed_sort_field_means_descending() {
        let result =
            map_url("https://app.apollo.io/#/people?sortByField=-person_created_at").unwrap();
        let sort = result.spec.sort().unwrap();
        assert_eq!(sort.field, "created_at");
        assert!(!sort.ascending);
    }

    #[test]
    fn unknown_sort_field_goes_unmapped_without_failing() {
        let result = map_url(
            "https://app.apollo.io/#/people?sortByField=astrology_sign&sortAscending=true&personTitles[]=CEO",
        )
        .unwrap();
        assert_eq!(result.unmapped.len(), 2);
        assert_eq!(result.unmapped[0].category, ParamCategory::Sorting);
        assert!(result.spec.sort().is_none());
    }

    #[test]
    fn excluded_titles_become_an_exclusion_set() {
        let result = map_url(
            "https://app.apollo.io/#/people?personNotTitles[]=Intern&personNotTitles[]=Assistant",
        )
        .unwrap();
        assert_eq!(result.spec.exclusions().len(), 1);
        assert_eq!(
            result.spec.exclusions()[0].values,
            vec!["Intern".to_string(), "Assistant".to_string()]
        );
    }

    #[test]
    fn domains_and_technologies_map_through() {
        let result = map_url(
            "https://app.apollo.io/#/people?organizationDomains[]=www.acme.com&currentTechnologies[]=salesforce&currentTechnologies[]=hubspot&requireAllCurrentTechnologies=true",
        )
        .unwrap();
        let tech = result
            .spec
            .filters()
            .iter()
            .find(|f| f.field == FilterField::Technologies)
            .unwrap();
        assert_eq!(
            tech.predicate,
            FilterPredicate::array_all(vec!["salesforce".into(), "hubspot".into()])
        );
        assert!(result
            .spec
            .filters()
            .iter()
            .any(|f| f.field == FilterField::CompanyDomain));
    }

    #[test]
    fn page_translates_to_offset() {
        let result =
            map_url("https://app.apollo.io/#/people?page=3&perPage=50&personTitles[]=CEO").unwrap();
        let pagination = result.spec.pagination();
        assert_eq!(pagination.page_size, Some(50));
        assert_eq!(pagination.offset, Some(100));
    }

    #[test]
    fn oversized_page_number_goes_unmapped_without_panicking() {
        let result = map_url(
            "https://app.apollo.io/#/people?page=18446744073709551615&personTitles[]=CEO",
        )
        .unwrap();
        assert_eq!(result.mapped, vec!["personTitles[]"]);
        assert_eq!(result.unmapped.len(), 1);
        assert_eq!(result.unmapped[0].name, "page");
        assert_eq!(result.unmapped[0].category, ParamCategory::Pagination);
        assert!(result.unmapped[0].reason.contains("out of range"));
        assert_eq!(result.spec.pagination().offset, None);
        assert_eq!(result.spec.pagination().page_size, None);
    }

    #[test]
    fn page_without_explicit_size_uses_the_vendor_page_size() {
        let result = map_url("https://app.apollo.io/#/people?page=2").unwrap();
        let pagination = result.spec.pagination();
        assert_eq!(pagination.page_size, Some(25));
        assert_eq!(pagination.offset, Some(25));
        assert_eq!(result.mapped, vec!["page"]);
    }

    #[test]
    fn query_component_is_accepted_without_fragment() {
        let result = map_url("https://app.apollo.io/people?personTitles[]=CEO").unwrap();
        assert_eq!(result.mapped, vec!["personTitles[]"]);
    }

    #[test]
    fn structural_problems_are_validation_errors() {
        assert!(matches!(map_url(""), Err(Error::Validation(_))));
        assert!(matches!(map_url("not a url"), Err(Error::Validation(_))));
        assert!(matches!(
            map_url("https://evil.example.com/#/people?personTitles[]=CEO"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            map_url("https://app.apollo.io/#/people"),
            Err(Error::Validation(_))
        ));
    }
}
