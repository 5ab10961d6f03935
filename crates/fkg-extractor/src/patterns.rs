//! Pattern library
//!
//! Static tables consumed by the recognizer and the relationship extractor:
//! entity patterns, relationship trigger/preposition pairs, the entity-type
//! compatibility matrix, sentiment and certainty lexicons, indicator cues,
//! keyword flag sets and the named-capture regex families used for metric,
//! ratio and trend extraction. Nothing here holds state.

use fkg_core::{EntityType, RelationshipType};
use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Entity Patterns
// ============================================================================

/// Regex rule tagging a span with an entity type
#[derive(Debug, Clone, Copy)]
pub struct EntityPattern {
    pub entity_type: EntityType,
    pub pattern: &'static str,
}

pub const ENTITY_PATTERNS: &[EntityPattern] = &[
    // Financial metrics
    EntityPattern {
        entity_type: EntityType::FinancialMetric,
        pattern: r"(?i)\b(?:revenue|income|profit|loss|earnings|expenses)(?:\s+(?:growth|margin|ratio|rate))?\b",
    },
    EntityPattern {
        entity_type: EntityType::FinancialMetric,
        pattern: r"(?i)\b(?:ebitda|roi|roe|roa|eps|pe)\b",
    },
    // Currency amounts
    EntityPattern {
        entity_type: EntityType::Currency,
        pattern: r"[$€£¥]\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s+(?i:million|billion|trillion)\b)?",
    },
    EntityPattern {
        entity_type: EntityType::Currency,
        pattern: r"\b\d+(?:,\d{3})*(?:\.\d+)?\s+(?i:million|billion|trillion)\b",
    },
    // Percentages
    EntityPattern {
        entity_type: EntityType::Percentage,
        pattern: r"\b\d+(?:\.\d+)?\s?%",
    },
    // Accounts
    EntityPattern {
        entity_type: EntityType::Account,
        pattern: r"(?i)\b(?:cash|accounts|inventory|assets|liabilities)(?:\s+(?:receivable|payable|equity|capital))?\b",
    },
    // Transactions
    EntityPattern {
        entity_type: EntityType::Transaction,
        pattern: r"(?i)\b(?:purchase|sale|payment|receipt|transfer)(?:\s+(?:order|invoice|receipt|transaction))?\b",
    },
    // Markets
    EntityPattern {
        entity_type: EntityType::Market,
        pattern: r"(?i)\b(?:nyse|nasdaq|lse|tsx|asx)\b",
    },
    // Industries
    EntityPattern {
        entity_type: EntityType::Industry,
        pattern: r"(?i)\b(?:technology|finance|healthcare|manufacturing|retail)(?:\s+(?:sector|industry|market))?\b",
    },
];

// ============================================================================
// Relationship Patterns
// ============================================================================

/// Trigger and preposition vocabularies for one relationship kind.
///
/// Terms are stored lower-case; a pattern fires when the trigger and the
/// preposition at the same index both occur in the lower-cased context.
#[derive(Debug, Clone, Copy)]
pub struct RelationPattern {
    pub relation: RelationshipType,
    pub triggers: &'static [&'static str],
    pub prepositions: &'static [&'static str],
}

impl RelationPattern {
    /// Index-paired match over a lower-cased context
    pub fn matches(&self, context_lower: &str) -> bool {
        self.triggers
            .iter()
            .zip(self.prepositions.iter())
            .any(|(verb, prep)| context_lower.contains(verb) && context_lower.contains(prep))
    }

    /// `0.6 * trigger hit ratio + 0.4 * preposition hit ratio`
    pub fn quality(&self, context_lower: &str) -> f64 {
        let ratio = |terms: &[&str]| {
            if terms.is_empty() {
                return 0.0;
            }
            let hits = terms.iter().filter(|t| context_lower.contains(*t)).count();
            hits as f64 / terms.len() as f64
        };
        ratio(self.triggers) * 0.6 + ratio(self.prepositions) * 0.4
    }
}

/// Relationship patterns in evaluation order; ties keep the earlier entry
pub const RELATION_PATTERNS: &[RelationPattern] = &[
    // Ownership and control
    RelationPattern {
        relation: RelationshipType::Owns,
        triggers: &["owns", "acquired", "purchased", "bought", "acquires", "acquiring"],
        prepositions: &["subsidiary", "division", "unit", "stake", "shares", "equity"],
    },
    RelationPattern {
        relation: RelationshipType::Controls,
        triggers: &["controls", "manages", "operates", "runs", "directs"],
        prepositions: &["operations", "business", "company", "entity"],
    },
    RelationPattern {
        relation: RelationshipType::HasSubsidiary,
        triggers: &["subsidiary", "subsidiaries", "wholly-owned"],
        prepositions: &["of", "under", "owned by"],
    },
    // Employment and organization
    RelationPattern {
        relation: RelationshipType::WorksFor,
        triggers: &["works", "employed", "hired", "joined", "staff", "employee"],
        prepositions: &["at", "by", "for", "with"],
    },
    RelationPattern {
        relation: RelationshipType::ReportsTo,
        triggers: &["reports", "reported", "reporting", "reports directly to"],
        prepositions: &["to", "under", "under the supervision of"],
    },
    RelationPattern {
        relation: RelationshipType::Manages,
        triggers: &["manages", "managing", "oversees", "supervises", "leads"],
        prepositions: &["team", "department", "division", "group"],
    },
    // Financial
    RelationPattern {
        relation: RelationshipType::InvestsIn,
        triggers: &["invested", "investing", "investment", "funded", "financed"],
        prepositions: &["in", "into", "through"],
    },
    RelationPattern {
        relation: RelationshipType::HasMetric,
        triggers: &["revenue", "income", "profit", "loss", "earnings", "ebitda", "ebit"],
        prepositions: &["of", "at", "reached", "amounting to", "totaling"],
    },
    RelationPattern {
        relation: RelationshipType::HasRevenue,
        triggers: &["revenue", "sales", "turnover", "top line"],
        prepositions: &["of", "at", "reached", "amounting to"],
    },
    // Business relationships
    RelationPattern {
        relation: RelationshipType::PartnersWith,
        triggers: &["partnered", "partnership", "collaborated", "alliance", "joint venture"],
        prepositions: &["with", "between", "alongside"],
    },
    RelationPattern {
        relation: RelationshipType::CompetesWith,
        triggers: &["competes", "competitor", "competition", "rival", "market share"],
        prepositions: &["with", "against", "in the market"],
    },
    RelationPattern {
        relation: RelationshipType::SuppliesTo,
        triggers: &["supplies", "supplier", "vendor", "provides", "sources"],
        prepositions: &["to", "for", "on behalf of"],
    },
    // Industry and market
    RelationPattern {
        relation: RelationshipType::OperatesIn,
        triggers: &["operates", "operating", "active", "present"],
        prepositions: &["in", "within", "across"],
    },
    RelationPattern {
        relation: RelationshipType::BelongsTo,
        triggers: &["member", "part", "belongs", "affiliated", "associated"],
        prepositions: &["of", "to", "with"],
    },
    // Temporal
    RelationPattern {
        relation: RelationshipType::Founded,
        triggers: &["founded", "established", "created", "incorporated", "started"],
        prepositions: &["in", "on", "during"],
    },
    RelationPattern {
        relation: RelationshipType::AcquiredOn,
        triggers: &["acquired", "purchased", "bought", "taken over"],
        prepositions: &["on", "in", "during"],
    },
    // Location
    RelationPattern {
        relation: RelationshipType::HeadquarteredIn,
        triggers: &["headquartered", "head office", "main office", "corporate office"],
        prepositions: &["in", "at", "located in"],
    },
    RelationPattern {
        relation: RelationshipType::HasOfficeIn,
        triggers: &["office", "branch", "location", "presence"],
        prepositions: &["in", "at", "located in"],
    },
];

/// Look up the pattern declared for a relationship kind
pub fn relation_pattern(relation: RelationshipType) -> Option<&'static RelationPattern> {
    RELATION_PATTERNS.iter().find(|p| p.relation == relation)
}

// ============================================================================
// Compatibility Matrix
// ============================================================================

type CompatibilityRow = (EntityType, RelationshipType, &'static [EntityType]);

const COMPATIBILITY: &[CompatibilityRow] = &[
    (EntityType::Company, RelationshipType::Owns, &[EntityType::Company, EntityType::Subsidiary, EntityType::Division]),
    (EntityType::Company, RelationshipType::Controls, &[EntityType::Company, EntityType::Subsidiary, EntityType::Division]),
    (EntityType::Company, RelationshipType::HasSubsidiary, &[EntityType::Subsidiary]),
    (EntityType::Company, RelationshipType::WorksFor, &[EntityType::Person]),
    (EntityType::Company, RelationshipType::ReportsTo, &[EntityType::Person, EntityType::Position]),
    (EntityType::Company, RelationshipType::InvestsIn, &[EntityType::Company, EntityType::Project, EntityType::Venture]),
    (EntityType::Company, RelationshipType::HasMetric, &[EntityType::FinancialMetric]),
    (EntityType::Company, RelationshipType::HasRevenue, &[EntityType::Currency, EntityType::Amount]),
    (EntityType::Company, RelationshipType::PartnersWith, &[EntityType::Company, EntityType::Organization]),
    (EntityType::Company, RelationshipType::CompetesWith, &[EntityType::Company]),
    (EntityType::Company, RelationshipType::SuppliesTo, &[EntityType::Company, EntityType::Organization]),
    (EntityType::Company, RelationshipType::OperatesIn, &[EntityType::Market, EntityType::Industry, EntityType::Region]),
    (EntityType::Company, RelationshipType::BelongsTo, &[EntityType::Industry, EntityType::Association]),
    (EntityType::Company, RelationshipType::HeadquarteredIn, &[EntityType::Location, EntityType::City, EntityType::Country]),
    (EntityType::Company, RelationshipType::HasOfficeIn, &[EntityType::Location, EntityType::City, EntityType::Country]),
    (EntityType::Person, RelationshipType::WorksFor, &[EntityType::Company, EntityType::Organization]),
    (EntityType::Person, RelationshipType::ReportsTo, &[EntityType::Person, EntityType::Position]),
    (EntityType::Person, RelationshipType::Manages, &[EntityType::Team, EntityType::Department, EntityType::Division]),
    (EntityType::Person, RelationshipType::BoardMember, &[EntityType::Company, EntityType::Organization]),
    (EntityType::Person, RelationshipType::Advisor, &[EntityType::Company, EntityType::Organization]),
    (EntityType::FinancialMetric, RelationshipType::HasMetric, &[EntityType::Currency, EntityType::Amount, EntityType::Percentage]),
];

/// Whether `(source, relation, target)` is declared valid
pub fn is_compatible(source: EntityType, relation: RelationshipType, target: EntityType) -> bool {
    COMPATIBILITY
        .iter()
        .any(|(s, r, targets)| *s == source && *r == relation && targets.contains(&target))
}

// ============================================================================
// Sentiment and Certainty Lexicons
// ============================================================================

/// Named group of sentiment terms
#[derive(Debug, Clone, Copy)]
pub struct LexiconCategory {
    pub name: &'static str,
    pub terms: &'static [&'static str],
}

pub const POSITIVE_TERMS: &[LexiconCategory] = &[
    LexiconCategory { name: "growth", terms: &["growth", "increase", "rise", "surge", "jump", "spike", "soar", "climb"] },
    LexiconCategory { name: "profitability", terms: &["profit", "gain", "earnings", "income", "revenue", "margin", "return"] },
    LexiconCategory { name: "performance", terms: &["outperform", "exceed", "beat", "surpass", "outpace", "outstrip"] },
    LexiconCategory { name: "strength", terms: &["strong", "robust", "solid", "healthy", "stable", "resilient"] },
    LexiconCategory { name: "opportunity", terms: &["opportunity", "potential", "prospect", "upside", "promise"] },
    LexiconCategory { name: "innovation", terms: &["innovative", "breakthrough", "pioneering", "leading", "cutting-edge"] },
    LexiconCategory { name: "efficiency", terms: &["efficient", "optimized", "streamlined", "productive", "effective"] },
    LexiconCategory { name: "market_position", terms: &["leader", "dominant", "premium", "preferred", "trusted"] },
    LexiconCategory { name: "financial_health", terms: &["solvent", "liquid", "well-capitalized", "debt-free", "cash-rich"] },
    LexiconCategory { name: "dividend", terms: &["dividend", "yield", "payout", "distribution", "return"] },
];

pub const NEGATIVE_TERMS: &[LexiconCategory] = &[
    LexiconCategory { name: "decline", terms: &["decline", "decrease", "fall", "drop", "plunge", "dip", "slump", "tumble"] },
    LexiconCategory { name: "loss", terms: &["loss", "deficit", "shortfall", "write-down", "write-off", "impairment"] },
    LexiconCategory { name: "risk", terms: &["risk", "exposure", "vulnerability", "threat", "uncertainty", "volatility"] },
    LexiconCategory { name: "weakness", terms: &["weak", "fragile", "vulnerable", "exposed", "at risk"] },
    LexiconCategory { name: "competition", terms: &["competitive", "challenged", "pressured", "squeezed", "eroded"] },
    LexiconCategory { name: "cost", terms: &["costly", "expensive", "overhead", "burden", "drag"] },
    LexiconCategory { name: "debt", terms: &["debt", "leverage", "liability", "obligation", "burden"] },
    LexiconCategory { name: "market_position", terms: &["lagging", "trailing", "struggling", "challenged", "underperforming"] },
    LexiconCategory { name: "financial_health", terms: &["insolvent", "illiquid", "overleveraged", "distressed", "troubled"] },
    LexiconCategory { name: "dividend", terms: &["cut", "suspended", "reduced", "eliminated", "missed"] },
];

pub const NEUTRAL_TERMS: &[LexiconCategory] = &[
    LexiconCategory { name: "trend", terms: &["trend", "pattern", "movement", "direction", "trajectory"] },
    LexiconCategory { name: "change", terms: &["change", "shift", "adjustment", "modification", "transition"] },
    LexiconCategory { name: "comparison", terms: &["compared", "relative", "versus", "against"] },
    LexiconCategory { name: "forecast", terms: &["forecast", "projection", "outlook", "guidance", "expectation"] },
    LexiconCategory { name: "analysis", terms: &["analysis", "assessment", "evaluation", "review", "examination"] },
];

pub const HIGH_CERTAINTY_TERMS: &[&str] = &["confirmed", "certain", "definite", "established", "proven"];

pub const LOW_CERTAINTY_TERMS: &[&str] = &["potential", "possible", "might", "may", "could", "expected"];

// ============================================================================
// Indicator Cues
// ============================================================================

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

/// Temporal cues that add to relationship confidence (case-insensitive)
pub static TEMPORAL_CUES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[
        r"(?i)\b(in|on|during|since|until|before|after)\s+\d{4}\b",
        r"(?i)\b(annual|quarterly|monthly|yearly)\b",
        r"(?i)\b(fiscal|financial)\s+year\b",
    ])
});

/// Negation cues that subtract from relationship confidence (case-insensitive)
pub static NEGATION_CUES: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile_all(&[
        r"(?i)\b(not|no|never|neither|nor|none|nothing|nowhere)\b",
        r"(?i)\b(doesn't|don't|didn't|isn't|aren't|wasn't|weren't)\b",
        r"(?i)\b(failed|declined|rejected|denied)\b",
    ])
});

// ============================================================================
// Keyword Flag Sets
// ============================================================================

/// Named boolean flags, each set when its regex finds a match
#[derive(Debug, Clone, Copy)]
pub struct FlagSet {
    pub name: &'static str,
    pub flags: &'static [(&'static str, &'static str)],
}

pub const TEMPORAL_INDICATORS: FlagSet = FlagSet {
    name: "temporal_indicators",
    flags: &[
        ("has_date", r"\b\d{4}\b"),
        ("has_time_period", r"\b(annual|quarterly|monthly|yearly)\b"),
        ("is_historical", r"\b(previous|past|former|historic)\b"),
        ("is_future", r"\b(future|upcoming|planned|scheduled)\b"),
    ],
};

pub const QUANTITATIVE_INDICATORS: FlagSet = FlagSet {
    name: "quantitative_indicators",
    flags: &[
        ("has_amount", r"\$\d+(?:,\d+)*(?:\.\d+)?"),
        ("has_percentage", r"\d+(?:\.\d+)?%"),
        ("has_ratio", r"\d+(?:\.\d+)?:\d+(?:\.\d+)?"),
    ],
};

pub const FINANCIAL_DETAILS: FlagSet = FlagSet {
    name: "financial_details",
    flags: &[
        ("has_currency", r"[$€£¥]"),
        ("has_amount", r"\d+(?:,\d+)*(?:\.\d+)?"),
        ("has_percentage", r"\d+(?:\.\d+)?%"),
        ("has_ratio", r"\d+(?:\.\d+)?:\d+(?:\.\d+)?"),
        ("is_growth", r"\b(growth|increase|up|rise|gain|improvement)\b"),
        ("is_decline", r"\b(decline|decrease|down|fall|drop|reduction)\b"),
        ("has_timeframe", r"\b(annual|quarterly|monthly|yearly|fiscal|financial)\b"),
        ("has_comparison", r"\b(compared|versus|against|relative|previous|prior)\b"),
        ("has_forecast", r"\b(forecast|projection|outlook|guidance|expectation)\b"),
        ("has_benchmark", r"\b(benchmark|target|goal|objective|milestone)\b"),
        ("has_risk", r"\b(risk|exposure|vulnerability|uncertainty|volatility)\b"),
        ("has_hedge", r"\b(hedge|hedging|protection|mitigation|safeguard)\b"),
    ],
};

pub const TRANSACTION_DETAILS: FlagSet = FlagSet {
    name: "transaction_details",
    flags: &[
        ("has_amount", r"\$\d+(?:,\d+)*(?:\.\d+)?"),
        ("has_date", r"\b\d{4}\b"),
        ("has_valuation", r"\b(valuation|value|worth|price|cost)\b"),
        ("has_consideration", r"\b(consideration|payment|compensation|exchange)\b"),
        ("has_structure", r"\b(structure|form|type|nature|arrangement)\b"),
        ("has_terms", r"\b(terms|conditions|provisions|agreement|contract)\b"),
        ("has_approval", r"\b(approved|approval|authorized|authorization|consent)\b"),
        ("has_closing", r"\b(closing|completion|finalization|execution|consummation)\b"),
        ("has_announcement", r"\b(announced|announcement|disclosure|release|statement)\b"),
        ("has_regulatory", r"\b(regulatory|approval|clearance|consent|authorization)\b"),
        ("has_synergy", r"\b(synergy|benefit|advantage|opportunity|potential)\b"),
        ("has_risk", r"\b(risk|exposure|uncertainty|challenge|concern)\b"),
    ],
};

pub const VALUATION_DETAILS: FlagSet = FlagSet {
    name: "valuation_details",
    flags: &[
        ("has_enterprise_value", r"\b(enterprise value|EV)\b"),
        ("has_equity_value", r"\b(equity value|market cap|market capitalization)\b"),
        ("has_valuation_multiple", r"\b(valuation multiple|multiple|x)\b"),
        ("has_discount_rate", r"\b(discount rate|required return|hurdle rate)\b"),
        ("has_growth_rate", r"\b(growth rate|growth projection|growth forecast)\b"),
        ("has_terminal_value", r"\b(terminal value|perpetuity value)\b"),
        ("has_synergy_value", r"\b(synergy value|synergy benefits|cost synergies)\b"),
        ("has_premium", r"\b(premium|acquisition premium|takeover premium)\b"),
        ("has_control_premium", r"\b(control premium|minority discount)\b"),
        ("has_liquidity_discount", r"\b(liquidity discount|marketability discount)\b"),
    ],
};

pub const SYNERGY_DETAILS: FlagSet = FlagSet {
    name: "synergy_details",
    flags: &[
        ("has_cost_synergies", r"\b(cost synergies|cost savings|operating synergies)\b"),
        ("has_revenue_synergies", r"\b(revenue synergies|revenue growth|top-line synergies)\b"),
        ("has_technology_synergies", r"\b(technology synergies|technical synergies|R&D synergies)\b"),
        ("has_market_synergies", r"\b(market synergies|market access|distribution synergies)\b"),
        ("has_scale_synergies", r"\b(scale synergies|economies of scale|operating leverage)\b"),
        ("has_scope_synergies", r"\b(scope synergies|scope economies|diversification benefits)\b"),
        ("has_financial_synergies", r"\b(financial synergies|tax synergies|financing synergies)\b"),
        ("has_management_synergies", r"\b(management synergies|leadership synergies|talent synergies)\b"),
        ("has_cultural_synergies", r"\b(cultural synergies|cultural fit|organizational synergies)\b"),
        ("has_strategic_synergies", r"\b(strategic synergies|strategic benefits|strategic advantages)\b"),
    ],
};

pub const LOCATION_DETAILS: FlagSet = FlagSet {
    name: "location_details",
    flags: &[
        ("has_country", r"\b(country|nation|state|province)\b"),
        ("has_city", r"\b(city|town|municipality|metro)\b"),
        ("has_region", r"\b(region|area|zone|territory)\b"),
        ("has_address", r"\b(address|street|avenue|road|boulevard)\b"),
        ("has_coordinates", r"\b(latitude|longitude|coordinates|GPS)\b"),
        ("is_headquarters", r"\b(headquarters|HQ|head office|main office)\b"),
        ("is_branch", r"\b(branch|office|location|outlet)\b"),
        ("is_facility", r"\b(facility|plant|factory|warehouse)\b"),
    ],
};

pub const GEOGRAPHIC_DETAILS: FlagSet = FlagSet {
    name: "geographic_details",
    flags: &[
        ("has_continent", r"\b(continent|region|area)\b"),
        ("has_country", r"\b(country|nation|state|province)\b"),
        ("has_city", r"\b(city|town|municipality|metro)\b"),
        ("has_address", r"\b(address|street|avenue|road|boulevard)\b"),
        ("has_coordinates", r"\b(latitude|longitude|coordinates|GPS)\b"),
        ("has_timezone", r"\b(timezone|time zone|UTC|GMT)\b"),
        ("has_climate", r"\b(climate|weather|temperature|precipitation)\b"),
        ("has_population", r"\b(population|inhabitants|residents|citizens)\b"),
        ("has_economy", r"\b(economy|GDP|GNP|economic indicators)\b"),
        ("has_infrastructure", r"\b(infrastructure|transportation|utilities|facilities)\b"),
    ],
};

pub const IP_DETAILS: FlagSet = FlagSet {
    name: "intellectual_property_details",
    flags: &[
        ("has_patent_number", r"\b(patent|pat\.|pat\. no\.)\s*#?\s*[A-Z0-9-]+\b"),
        ("has_trademark", r"\b(trademark|™|®|registered mark)\b"),
        ("has_license_number", r"\b(license|lic\.|lic\. no\.)\s*#?\s*[A-Z0-9-]+\b"),
        ("has_expiration", r"\b(expires|expiration|valid until|valid through)\b"),
        ("has_application_date", r"\b(filed|applied|application date)\b"),
        ("has_grant_date", r"\b(granted|issued|grant date)\b"),
        ("is_pending", r"\b(pending|under review|in process)\b"),
        ("is_expired", r"\b(expired|lapsed|terminated)\b"),
    ],
};

pub const IP_VALUATION_DETAILS: FlagSet = FlagSet {
    name: "ip_valuation_details",
    flags: &[
        ("has_patent_value", r"\b(patent value|patent worth|patent valuation)\b"),
        ("has_trademark_value", r"\b(trademark value|brand value|brand worth)\b"),
        ("has_license_value", r"\b(license value|royalty value|license worth)\b"),
        ("has_royalty_rate", r"\b(royalty rate|royalty percentage|license fee)\b"),
        ("has_remaining_life", r"\b(remaining life|patent term|license term)\b"),
        ("has_technology_readiness", r"\b(technology readiness|TRL|development stage)\b"),
        ("has_market_potential", r"\b(market potential|market size|addressable market)\b"),
        ("has_competitive_advantage", r"\b(competitive advantage|market position|competitive position)\b"),
        ("has_legal_protection", r"\b(legal protection|enforcement|infringement)\b"),
        ("has_development_cost", r"\b(development cost|R&D cost|research cost)\b"),
    ],
};

pub const REGULATORY_DETAILS: FlagSet = FlagSet {
    name: "regulatory_details",
    flags: &[
        ("has_regulator", r"\b(regulator|regulatory|authority|agency)\b"),
        ("has_certification", r"\b(certified|certification|accredited|accreditation)\b"),
        ("has_compliance", r"\b(complies|compliance|conforms|conformity)\b"),
        ("has_standard", r"\b(standard|requirement|guideline|specification)\b"),
        ("has_inspection", r"\b(inspected|inspection|audited|audit)\b"),
        ("has_violation", r"\b(violation|breach|non-compliance|infraction)\b"),
        ("has_penalty", r"\b(penalty|fine|sanction|punishment)\b"),
        ("has_approval", r"\b(approved|approval|authorized|authorization)\b"),
    ],
};

pub const COMPLIANCE_DETAILS: FlagSet = FlagSet {
    name: "compliance_details",
    flags: &[
        ("has_compliance_program", r"\b(compliance program|compliance framework|compliance system)\b"),
        ("has_risk_assessment", r"\b(risk assessment|risk analysis|risk evaluation)\b"),
        ("has_controls", r"\b(controls|internal controls|control framework)\b"),
        ("has_monitoring", r"\b(monitoring|surveillance|oversight)\b"),
        ("has_reporting", r"\b(reporting|disclosure|filing)\b"),
        ("has_training", r"\b(training|education|awareness)\b"),
        ("has_audit", r"\b(audit|review|examination)\b"),
        ("has_remediation", r"\b(remediation|corrective action|improvement)\b"),
        ("has_whistleblower", r"\b(whistleblower|reporting line|hotline)\b"),
        ("has_documentation", r"\b(documentation|records|evidence)\b"),
    ],
};

// ============================================================================
// Named-capture Regex Families
// ============================================================================

/// Metric-of-value phrases; groups `metric`, `value` and optional `value2`
pub const FINANCIAL_METRIC_PATTERNS: &[&str] = &[
    // metric of value
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:of|at|reached|amounting to|totaling)\s+(?P<value>\$?\d+(?:,\d+)*(?:\.\d+)?(?:\s*(?:million|billion|trillion))?)",
    // percentage
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:of|at|reached|amounting to|totaling)\s+(?P<value>\d+(?:\.\d+)?%)",
    // ratio
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:of|at|reached|amounting to|totaling)\s+(?P<value>\d+(?:\.\d+)?:\d+(?:\.\d+)?)",
    // year over year
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:increased|decreased|grew|declined|rose|fell)\s+(?:by|to)\s+(?P<value>\d+(?:\.\d+)?%)\s+(?:year-over-year|yoy|y/y)",
    // quarter over quarter
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:increased|decreased|grew|declined|rose|fell)\s+(?:by|to)\s+(?P<value>\d+(?:\.\d+)?%)\s+(?:quarter-over-quarter|qoq|q/q)",
    // sequential
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:increased|decreased|grew|declined|rose|fell)\s+(?:by|to)\s+(?P<value>\d+(?:\.\d+)?%)\s+(?:sequentially|seq)",
    // comparison
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:compared to|versus|vs\.?)\s+(?P<value>\$?\d+(?:,\d+)*(?:\.\d+)?(?:\s*(?:million|billion|trillion))?)",
    // range
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:between|from)\s+(?P<value>\$?\d+(?:,\d+)*(?:\.\d+)?)\s+(?:and|to)\s+(?P<value2>\$?\d+(?:,\d+)*(?:\.\d+)?)",
    // forecast
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:is expected|is projected|is forecasted|is estimated)\s+(?:to be|to reach|to amount to)\s+(?P<value>\$?\d+(?:,\d+)*(?:\.\d+)?(?:\s*(?:million|billion|trillion))?)",
    // guidance
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:guidance|outlook|forecast)\s+(?:of|at|for)\s+(?P<value>\$?\d+(?:,\d+)*(?:\.\d+)?(?:\s*(?:million|billion|trillion))?)",
];

/// Ratio phrases; groups `numerator`, `denominator`, `value` and optional `value2`
pub const FINANCIAL_RATIO_PATTERNS: &[&str] = &[
    r"(?P<numerator>\w+(?:\s+\w+)*)\s+(?:to|per)\s+(?P<denominator>\w+(?:\s+\w+)*)\s+(?:ratio|multiple)\s+(?:of|at|reached|amounting to|totaling)\s+(?P<value>\d+(?:\.\d+)?)",
    r"(?P<numerator>\w+(?:\s+\w+)*)\s+(?:to|per)\s+(?P<denominator>\w+(?:\s+\w+)*)\s+(?:ratio|multiple)\s+(?:compared to|versus|vs\.?)\s+(?:industry average|peer group|competitors)\s+(?:of|at|reached|amounting to|totaling)\s+(?P<value>\d+(?:\.\d+)?)",
    r"(?P<numerator>\w+(?:\s+\w+)*)\s+(?:to|per)\s+(?P<denominator>\w+(?:\s+\w+)*)\s+(?:ratio|multiple)\s+(?:compared to|versus|vs\.?)\s+(?:previous year|last year|prior year)\s+(?:of|at|reached|amounting to|totaling)\s+(?P<value>\d+(?:\.\d+)?)",
    r"(?P<numerator>\w+(?:\s+\w+)*)\s+(?:to|per)\s+(?P<denominator>\w+(?:\s+\w+)*)\s+(?:ratio|multiple)\s+(?:has|have)\s+(?:increased|decreased|improved|deteriorated)\s+(?:from|to)\s+(?P<value>\d+(?:\.\d+)?)\s+(?:to|from)\s+(?P<value2>\d+(?:\.\d+)?)",
];

/// Trend phrases; groups `metric` and `value`
pub const FINANCIAL_TREND_PATTERNS: &[&str] = &[
    // growth
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:has|have)\s+(?:grown|increased|risen|climbed)\s+(?:by|at)\s+(?P<value>\d+(?:\.\d+)?%)\s+(?:annually|per year|yearly|yoy|y/y)",
    // decline
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:has|have)\s+(?:declined|decreased|fallen|dropped)\s+(?:by|at)\s+(?P<value>\d+(?:\.\d+)?%)\s+(?:annually|per year|yearly|yoy|y/y)",
    // compound growth
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:has|have)\s+(?:grown|increased|risen|climbed)\s+(?:at a|at an)\s+(?:compound annual growth rate|CAGR)\s+(?:of|at|reached|amounting to|totaling)\s+(?P<value>\d+(?:\.\d+)?%)",
    // seasonal
    r"(?P<metric>\w+(?:\s+\w+)*)\s+(?:shows|exhibits|displays)\s+(?:seasonal|cyclical)\s+(?:pattern|trend|variation)\s+(?:with|of)\s+(?P<value>\d+(?:\.\d+)?%)\s+(?:variation|fluctuation|change)",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_static_pattern_compiles() {
        for p in ENTITY_PATTERNS {
            assert!(Regex::new(p.pattern).is_ok(), "entity pattern: {}", p.pattern);
        }
        let flag_sets = [
            TEMPORAL_INDICATORS,
            QUANTITATIVE_INDICATORS,
            FINANCIAL_DETAILS,
            TRANSACTION_DETAILS,
            VALUATION_DETAILS,
            SYNERGY_DETAILS,
            LOCATION_DETAILS,
            GEOGRAPHIC_DETAILS,
            IP_DETAILS,
            IP_VALUATION_DETAILS,
            REGULATORY_DETAILS,
            COMPLIANCE_DETAILS,
        ];
        for set in flag_sets {
            for (name, pattern) in set.flags {
                assert!(Regex::new(pattern).is_ok(), "{}.{}", set.name, name);
            }
        }
        for p in FINANCIAL_METRIC_PATTERNS
            .iter()
            .chain(FINANCIAL_RATIO_PATTERNS)
            .chain(FINANCIAL_TREND_PATTERNS)
        {
            assert!(Regex::new(&format!("(?i){p}")).is_ok(), "family pattern: {p}");
        }
        assert_eq!(TEMPORAL_CUES.len(), 3);
        assert_eq!(NEGATION_CUES.len(), 3);
    }

    #[test]
    fn test_index_paired_matching() {
        let revenue = relation_pattern(RelationshipType::HasRevenue).unwrap();
        assert!(revenue.matches("xyz corp reported revenue of $10 million"));
        // "sales" pairs with "at"; "of" alone does not complete it
        assert!(!revenue.matches("sales of the unit"));
        assert!(revenue.matches("sales at record levels"));
    }

    #[test]
    fn test_pattern_quality() {
        let revenue = relation_pattern(RelationshipType::HasRevenue).unwrap();
        let quality = revenue.quality("revenue of $10 million");
        assert!((quality - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_compatibility_matrix() {
        assert!(is_compatible(EntityType::Company, RelationshipType::HasRevenue, EntityType::Currency));
        assert!(is_compatible(EntityType::FinancialMetric, RelationshipType::HasMetric, EntityType::Percentage));
        assert!(!is_compatible(EntityType::Company, RelationshipType::HasRevenue, EntityType::Date));
        assert!(!is_compatible(EntityType::Currency, RelationshipType::HasRevenue, EntityType::Company));
    }

    #[test]
    fn test_every_pattern_has_a_pair() {
        for p in RELATION_PATTERNS {
            assert!(!p.triggers.is_empty() && !p.prepositions.is_empty(), "{}", p.relation);
            assert!(p.triggers.iter().all(|t| *t == t.to_lowercase()));
        }
    }
}
