//! Field catalog for the contact/company search schema.
//!
//! The search schema is four tables:
//! - `contacts` (primary; every query scans this table and nothing else)
//! - `contact_metadata` (1:1 with contacts via `contact_metadata.contact_id`)
//! - `companies` (via `contacts.company_id`)
//! - `company_metadata` (1:1 with companies via `company_metadata.company_id`)
//!
//! Every recognized filter or sort field maps to exactly one column of exactly
//! one of these tables. The catalog is the single source of truth consulted by
//! the planner (entity flags) and the compiler (column names, filter kinds).

/// One of the four entities a field can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Contact,
    ContactMetadata,
    Company,
    CompanyMetadata,
}

impl Entity {
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::ContactMetadata => "contact_metadata",
            Self::Company => "companies",
            Self::CompanyMetadata => "company_metadata",
        }
    }

    /// Table alias used by the SQL translator.
    pub fn alias(self) -> &'static str {
        match self {
            Self::Contact => "c",
            Self::ContactMetadata => "cm",
            Self::Company => "co",
            Self::CompanyMetadata => "om",
        }
    }

    /// Correlation between this entity and the primary `contacts` row,
    /// expressed as (local key column, primary-side key expression).
    pub fn correlation(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Contact => None,
            Self::ContactMetadata => Some(("contact_id", "c.id")),
            Self::Company => Some(("id", "c.company_id")),
            Self::CompanyMetadata => Some(("company_id", "c.company_id")),
        }
    }
}

/// How values bound to a field are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match; multiple values OR-combine.
    /// Title fields additionally support normalized and word-set modes.
    Text,
    /// Numeric range with independently optional bounds.
    Range,
    /// Array-valued column; containment with OR or AND semantics.
    Array,
    /// URL column compared by registrable domain.
    Domain,
}

/// Recognized filterable/sortable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    // contacts
    FirstName,
    LastName,
    Title,
    Email,
    EmailStatus,
    Seniority,
    Departments,
    Location,
    Keywords,
    LinkedinUrl,
    // contact_metadata
    Stage,
    Source,
    Lists,
    Owner,
    // companies
    CompanyName,
    CompanyDomain,
    CompanyLocation,
    Industry,
    Technologies,
    EmployeeCount,
    Revenue,
    FundingStage,
    CompanyKeywords,
    // company_metadata
    EnrichmentStatus,
    CompanyTags,
    LastEnrichedDays,
}

impl FilterField {
    pub fn entity(self) -> Entity {
        match self {
            Self::FirstName
            | Self::LastName
            | Self::Title
            | Self::Email
            | Self::EmailStatus
            | Self::Seniority
            | Self::Departments
            | Self::Location
            | Self::Keywords
            | Self::LinkedinUrl => Entity::Contact,

            Self::Stage | Self::Source | Self::Lists | Self::Owner => Entity::ContactMetadata,

            Self::CompanyName
            | Self::CompanyDomain
            | Self::CompanyLocation
            | Self::Industry
            | Self::Technologies
            | Self::EmployeeCount
            | Self::Revenue
            | Self::FundingStage
            | Self::CompanyKeywords => Entity::Company,

            Self::EnrichmentStatus | Self::CompanyTags | Self::LastEnrichedDays => {
                Entity::CompanyMetadata
            }
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Title => "title",
            Self::Email => "email",
            Self::EmailStatus => "email_status",
            Self::Seniority => "seniority",
            Self::Departments => "departments",
            Self::Location => "location",
            Self::Keywords => "keywords",
            Self::LinkedinUrl => "linkedin_url",
            Self::Stage => "stage",
            Self::Source => "source",
            Self::Lists => "list_names",
            Self::Owner => "owner_email",
            Self::CompanyName => "name",
            Self::CompanyDomain => "website_url",
            Self::CompanyLocation => "location",
            Self::Industry => "industries",
            Self::Technologies => "technologies",
            Self::EmployeeCount => "num_employees",
            Self::Revenue => "annual_revenue",
            Self::FundingStage => "funding_stage",
            Self::CompanyKeywords => "keywords",
            Self::EnrichmentStatus => "enrichment_status",
            Self::CompanyTags => "tags",
            Self::LastEnrichedDays => "last_enriched_days",
        }
    }

    pub fn kind(self) -> FilterKind {
        match self {
            Self::Departments
            | Self::Keywords
            | Self::Lists
            | Self::Industry
            | Self::Technologies
            | Self::CompanyKeywords
            | Self::CompanyTags => FilterKind::Array,

            Self::EmployeeCount | Self::Revenue | Self::LastEnrichedDays => FilterKind::Range,

            Self::CompanyDomain => FilterKind::Domain,

            _ => FilterKind::Text,
        }
    }
}

/// Columns scanned by the general free-text search term. Primary entity only,
/// so a bare free-text search never forces a related-entity check.
pub const FREE_TEXT_COLUMNS: &[&str] = &["first_name", "last_name", "title", "email"];

/// Resolve a sort key name to its entity and column.
///
/// Sort keys are a deliberately small subset of the catalog; sorting on array
/// or derived columns is not supported.
pub fn sort_field(name: &str) -> Option<(Entity, &'static str)> {
    let resolved = match name {
        "created_at" => (Entity::Contact, "created_at"),
        "first_name" => (Entity::Contact, "first_name"),
        "last_name" => (Entity::Contact, "last_name"),
        "title" => (Entity::Contact, "title"),
        "email" => (Entity::Contact, "email"),
        "stage" => (Entity::ContactMetadata, "stage"),
        "company_name" => (Entity::Company, "name"),
        "num_employees" => (Entity::Company, "num_employees"),
        "annual_revenue" => (Entity::Company, "annual_revenue"),
        "enrichment_status" => (Entity::CompanyMetadata, "enrichment_status"),
        _ => return None,
    };
    Some(resolved)
}
