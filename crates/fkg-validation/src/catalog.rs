//! Built-in validation rule catalog

use fkg_core::{EntityType, FinancialDomain, RelationshipType};

use crate::rules::{
    CardinalityConstraint, EntityRule, FinancialConstraints, FinancialDomainRule, FieldRange,
    RegulatoryCompliance, RelationshipRule, Requirement, ValidationRule,
};

const INF: f64 = f64::INFINITY;

fn metrics(required: &[&str], ranges: &[(&str, f64, f64)]) -> FinancialConstraints {
    FinancialConstraints {
        required_metrics: required.iter().map(|s| s.to_string()).collect(),
        metric_ranges: ranges
            .iter()
            .map(|(field, min, max)| FieldRange::new(*field, *min, *max))
            .collect(),
    }
}

fn compliance(documents: &[&str], reporting: &[&str]) -> RegulatoryCompliance {
    RegulatoryCompliance {
        required_documents: documents.iter().map(|s| s.to_string()).collect(),
        reporting_requirements: reporting.iter().map(|s| s.to_string()).collect(),
    }
}

/// Every built-in rule: entity, relationship and financial-domain rules
pub fn default_rules() -> Vec<ValidationRule> {
    let mut rules: Vec<ValidationRule> = Vec::new();
    rules.extend(entity_rules().into_iter().map(ValidationRule::from));
    rules.extend(relationship_rules().into_iter().map(ValidationRule::from));
    rules.extend(domain_rules().into_iter().map(ValidationRule::from));
    rules
}

// ============================================================================
// Entity Rules
// ============================================================================

fn entity_rules() -> Vec<EntityRule> {
    vec![
        EntityRule::new(
            "company_required_fields",
            "Validates required fields for company entities",
            EntityType::Company,
        )
        .with_required_fields(&["name", "industry", "founding_date"])
        .with_pattern("ticker", r"^[A-Z]{1,5}$")
        .with_pattern("website", r"^https?://[^\s/$.?#].[^\s]*$")
        .with_unique_fields(&["ticker", "name"])
        .with_financial_constraints(metrics(
            &["revenue", "market_cap", "employees"],
            &[("revenue", 0.0, INF), ("market_cap", 0.0, INF), ("employees", 1.0, INF)],
        )),
        EntityRule::new(
            "person_required_fields",
            "Validates required fields for person entities",
            EntityType::Person,
        )
        .with_required_fields(&["name", "role"])
        .with_pattern("email", r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .with_pattern("phone", r"^\+?[1-9]\d{1,14}$")
        .with_temporal_validity("birth_date", "death_date"),
        EntityRule::new(
            "financial_instrument_required_fields",
            "Validates required fields for financial instruments",
            EntityType::FinancialInstrument,
        )
        .with_required_fields(&["name", "type", "issuer"])
        .with_pattern("isin", r"^[A-Z]{2}[A-Z0-9]{9}[0-9]$")
        .with_pattern("cusip", r"^[0-9A-Z]{9}$")
        .with_financial_constraints(metrics(
            &["face_value", "maturity_date"],
            &[("face_value", 0.0, INF), ("coupon_rate", 0.0, 100.0)],
        ))
        .with_regulatory_compliance(compliance(
            &["prospectus", "offering_memorandum"],
            &["quarterly_reports", "annual_reports"],
        )),
        EntityRule::new(
            "transaction_required_fields",
            "Validates required fields for transactions",
            EntityType::Transaction,
        )
        .with_required_fields(&["amount", "date", "type"])
        .with_financial_constraints(metrics(
            &["amount", "currency", "exchange_rate"],
            &[("amount", 0.0, INF), ("exchange_rate", 0.0, INF)],
        ))
        .with_temporal_validity("transaction_date", "settlement_date"),
    ]
}

// ============================================================================
// Relationship Rules
// ============================================================================

fn relationship_rules() -> Vec<RelationshipRule> {
    vec![
        RelationshipRule::new(
            "company_person_relationship",
            "Validates employment relationships between companies and people",
            RelationshipType::Employment,
            EntityType::Company,
            EntityType::Person,
        )
        .with_required_properties(&["start_date", "role"])
        .with_temporal_constraint("start_date", Requirement::Required)
        .with_temporal_constraint("end_date", Requirement::Optional)
        .with_cardinality(CardinalityConstraint {
            max_per_source: None,
            max_per_target: Some(1),
        }),
        RelationshipRule::new(
            "company_financial_instrument",
            "Validates instruments issued by companies",
            RelationshipType::Issues,
            EntityType::Company,
            EntityType::FinancialInstrument,
        )
        .with_required_properties(&["issue_date", "issue_price"])
        .with_financial_constraints(metrics(
            &["issue_price", "issue_size"],
            &[("issue_price", 0.0, INF), ("issue_size", 0.0, INF)],
        ))
        .with_regulatory_compliance(compliance(
            &["offering_document", "regulatory_filing"],
            &["disclosure_requirements"],
        )),
        RelationshipRule::new(
            "transaction_relationship",
            "Validates transactions between people and instruments",
            RelationshipType::Transaction,
            EntityType::Person,
            EntityType::FinancialInstrument,
        )
        .with_required_properties(&["transaction_date", "amount", "currency"])
        .with_financial_constraints(metrics(
            &["amount", "currency", "exchange_rate"],
            &[("amount", 0.0, INF), ("exchange_rate", 0.0, INF)],
        ))
        .with_temporal_constraint("transaction_date", Requirement::Required)
        .with_temporal_constraint("settlement_date", Requirement::Required),
    ]
}

// ============================================================================
// Financial Domain Rules
// ============================================================================

fn domain_rules() -> Vec<FinancialDomainRule> {
    use EntityType as E;
    use FinancialDomain as D;

    vec![
        FinancialDomainRule::new(
            "banking_account_validation",
            "Validates bank accounts",
            D::Banking,
            E::Account,
            "Basel III",
        )
        .with_required_fields(&["account_number", "account_type", "currency", "balance"])
        .with_pattern("account_number", r"^[A-Z0-9]{8,20}$")
        .with_pattern("iban", r"^[A-Z]{2}[0-9]{2}[A-Z0-9]{1,30}$")
        .with_pattern("swift_code", r"^[A-Z]{6}[A-Z0-9]{2}([A-Z0-9]{3})?$")
        .with_metric_range("balance", -INF, INF)
        .with_metric_range("interest_rate", 0.0, 100.0)
        .with_metric_range("overdraft_limit", 0.0, INF)
        .with_compliance_requirements(&["KYC", "AML", "Transaction Monitoring", "Risk Assessment"])
        .with_risk_factors(&["credit_risk", "operational_risk", "market_risk", "liquidity_risk"]),
        FinancialDomainRule::new(
            "investment_portfolio_validation",
            "Validates investment portfolios",
            D::Investment,
            E::Portfolio,
            "MiFID II",
        )
        .with_required_fields(&["portfolio_id", "investor_id", "risk_profile", "investment_strategy"])
        .with_metric_range("total_value", 0.0, INF)
        .with_metric_range("risk_score", 1.0, 10.0)
        .with_metric_range("diversification_ratio", 0.0, 1.0)
        .with_compliance_requirements(&[
            "Suitability Assessment",
            "Best Execution",
            "Transaction Reporting",
            "Client Categorization",
        ])
        .with_risk_factors(&["market_risk", "credit_risk", "liquidity_risk", "concentration_risk"]),
        FinancialDomainRule::new(
            "insurance_policy_validation",
            "Validates insurance policies",
            D::Insurance,
            E::Policy,
            "Solvency II",
        )
        .with_required_fields(&["policy_number", "coverage_type", "premium", "coverage_amount"])
        .with_pattern("policy_number", r"^[A-Z0-9]{10,15}$")
        .with_pattern("coverage_type", r"^(LIFE|HEALTH|PROPERTY|LIABILITY|AUTO)$")
        .with_metric_range("premium", 0.0, INF)
        .with_metric_range("coverage_amount", 0.0, INF)
        .with_metric_range("deductible", 0.0, INF)
        .with_compliance_requirements(&[
            "Policy Documentation",
            "Risk Assessment",
            "Claims Processing",
            "Reserve Requirements",
        ])
        .with_risk_factors(&[
            "underwriting_risk",
            "reserve_risk",
            "catastrophe_risk",
            "operational_risk",
        ]),
        FinancialDomainRule::new(
            "real_estate_property_validation",
            "Validates real estate properties",
            D::RealEstate,
            E::Property,
            "Real Estate Regulations",
        )
        .with_required_fields(&["property_id", "address", "property_type", "valuation"])
        .with_pattern("property_id", r"^[A-Z0-9]{8,12}$")
        .with_pattern("property_type", r"^(RESIDENTIAL|COMMERCIAL|INDUSTRIAL|LAND)$")
        .with_metric_range("valuation", 0.0, INF)
        .with_metric_range("rental_income", 0.0, INF)
        .with_metric_range("operating_expenses", 0.0, INF)
        .with_compliance_requirements(&[
            "Property Documentation",
            "Valuation Standards",
            "Environmental Assessment",
            "Zoning Compliance",
        ])
        .with_risk_factors(&["market_risk", "location_risk", "environmental_risk", "legal_risk"]),
        FinancialDomainRule::new(
            "crypto_asset_validation",
            "Validates crypto assets",
            D::Crypto,
            E::CryptoAsset,
            "Crypto Regulations",
        )
        .with_required_fields(&["asset_id", "blockchain", "token_standard", "total_supply"])
        .with_pattern("asset_id", r"^[A-Z0-9]{3,10}$")
        .with_pattern("token_standard", r"^(ERC20|ERC721|ERC1155|BEP20)$")
        .with_metric_range("market_cap", 0.0, INF)
        .with_metric_range("circulating_supply", 0.0, INF)
        .with_metric_range("trading_volume", 0.0, INF)
        .with_compliance_requirements(&[
            "KYC/AML",
            "Transaction Monitoring",
            "Smart Contract Audit",
            "Security Assessment",
        ])
        .with_risk_factors(&["market_risk", "technical_risk", "regulatory_risk", "security_risk"]),
        FinancialDomainRule::new(
            "fintech_service_validation",
            "Validates fintech services",
            D::Fintech,
            E::FintechService,
            "FinTech Regulations",
        )
        .with_required_fields(&["service_id", "service_type", "api_version", "security_level"])
        .with_pattern("service_id", r"^[A-Z0-9]{6,12}$")
        .with_pattern("api_version", r"^v[0-9]+\.[0-9]+\.[0-9]+$")
        .with_metric_range("uptime", 0.0, 100.0)
        .with_metric_range("response_time", 0.0, 1000.0)
        .with_metric_range("error_rate", 0.0, 1.0)
        .with_compliance_requirements(&[
            "API Security",
            "Data Protection",
            "Service Level Agreement",
            "Incident Response",
        ])
        .with_risk_factors(&[
            "operational_risk",
            "security_risk",
            "compliance_risk",
            "reputation_risk",
        ]),
        FinancialDomainRule::new(
            "regulatory_report_validation",
            "Validates regulatory reports",
            D::Regulatory,
            E::RegulatoryReport,
            "Regulatory Reporting Standards",
        )
        .with_required_fields(&["report_id", "report_type", "reporting_period", "submission_date"])
        .with_pattern("report_id", r"^[A-Z0-9]{10,15}$")
        .with_pattern("report_type", r"^(FINANCIAL|COMPLIANCE|RISK|AUDIT)$")
        .with_metric_range("completeness_score", 0.0, 100.0)
        .with_metric_range("accuracy_score", 0.0, 100.0)
        .with_metric_range("timeliness_score", 0.0, 100.0)
        .with_compliance_requirements(&[
            "Data Accuracy",
            "Timely Submission",
            "Documentation",
            "Audit Trail",
        ])
        .with_risk_factors(&["compliance_risk", "reporting_risk", "audit_risk", "reputation_risk"]),
        FinancialDomainRule::new(
            "compliance_check_validation",
            "Validates compliance checks",
            D::Compliance,
            E::ComplianceCheck,
            "Compliance Standards",
        )
        .with_required_fields(&["check_id", "check_type", "check_date", "status"])
        .with_pattern("check_id", r"^[A-Z0-9]{8,12}$")
        .with_pattern("check_type", r"^(KYC|AML|SANCTIONS|PEP|ADVERSE_MEDIA)$")
        .with_metric_range("risk_score", 0.0, 100.0)
        .with_metric_range("confidence_score", 0.0, 100.0)
        .with_metric_range("completion_rate", 0.0, 100.0)
        .with_compliance_requirements(&[
            "Risk Assessment",
            "Due Diligence",
            "Documentation",
            "Monitoring",
        ])
        .with_risk_factors(&[
            "compliance_risk",
            "operational_risk",
            "reputation_risk",
            "legal_risk",
        ]),
        FinancialDomainRule::new(
            "wealth_portfolio_validation",
            "Validates wealth management portfolios",
            D::WealthManagement,
            E::Portfolio,
            "MiFID II",
        )
        .with_required_fields(&[
            "portfolio_id",
            "client_id",
            "risk_profile",
            "investment_strategy",
            "asset_allocation",
        ])
        .with_metric_range("total_value", 0.0, INF)
        .with_metric_range("risk_score", 1.0, 10.0)
        .with_metric_range("diversification_ratio", 0.0, 1.0)
        .with_metric_range("sharpe_ratio", -INF, INF)
        .with_metric_range("alpha", -INF, INF)
        .with_compliance_requirements(&[
            "Suitability Assessment",
            "Best Execution",
            "Transaction Reporting",
            "Client Categorization",
            "Portfolio Rebalancing",
            "Performance Attribution",
        ])
        .with_risk_factors(&[
            "market_risk",
            "credit_risk",
            "liquidity_risk",
            "concentration_risk",
            "currency_risk",
            "interest_rate_risk",
        ]),
        FinancialDomainRule::new(
            "hedge_fund_validation",
            "Validates hedge funds",
            D::HedgeFund,
            E::Fund,
            "AIFMD",
        )
        .with_required_fields(&[
            "fund_id",
            "strategy",
            "aum",
            "leverage_ratio",
            "performance_fee",
            "management_fee",
        ])
        .with_metric_range("aum", 0.0, INF)
        .with_metric_range("leverage_ratio", 0.0, INF)
        .with_metric_range("performance_fee", 0.0, 50.0)
        .with_metric_range("management_fee", 0.0, 5.0)
        .with_metric_range("sharpe_ratio", -INF, INF)
        .with_metric_range("sortino_ratio", -INF, INF)
        .with_compliance_requirements(&[
            "Risk Management",
            "Leverage Limits",
            "Reporting Requirements",
            "Investor Protection",
            "Transparency",
        ])
        .with_risk_factors(&[
            "market_risk",
            "credit_risk",
            "liquidity_risk",
            "leverage_risk",
            "counterparty_risk",
            "model_risk",
        ]),
        FinancialDomainRule::new(
            "private_equity_validation",
            "Validates private equity funds",
            D::PrivateEquity,
            E::Fund,
            "AIFMD",
        )
        .with_required_fields(&[
            "fund_id",
            "vintage_year",
            "target_size",
            "committed_capital",
            "called_capital",
            "distributed_capital",
        ])
        .with_metric_range("irr", -100.0, INF)
        .with_metric_range("moic", 0.0, INF)
        .with_metric_range("rvpi", 0.0, INF)
        .with_metric_range("dvpi", 0.0, INF)
        .with_metric_range("total_value_to_paid_in", 0.0, INF)
        .with_compliance_requirements(&[
            "Investment Strategy",
            "Capital Calls",
            "Distributions",
            "Valuation",
            "Reporting",
        ])
        .with_risk_factors(&[
            "investment_risk",
            "valuation_risk",
            "liquidity_risk",
            "concentration_risk",
            "exit_risk",
        ]),
        FinancialDomainRule::new(
            "venture_capital_validation",
            "Validates venture capital funds",
            D::VentureCapital,
            E::Fund,
            "AIFMD",
        )
        .with_required_fields(&[
            "fund_id",
            "vintage_year",
            "target_size",
            "committed_capital",
            "called_capital",
            "portfolio_companies",
        ])
        .with_metric_range("irr", -100.0, INF)
        .with_metric_range("moic", 0.0, INF)
        .with_metric_range("rvpi", 0.0, INF)
        .with_metric_range("dvpi", 0.0, INF)
        .with_metric_range("total_value_to_paid_in", 0.0, INF)
        .with_metric_range("portfolio_diversity_score", 0.0, 1.0)
        .with_compliance_requirements(&[
            "Investment Strategy",
            "Capital Calls",
            "Distributions",
            "Valuation",
            "Reporting",
            "Portfolio Management",
        ])
        .with_risk_factors(&[
            "investment_risk",
            "valuation_risk",
            "liquidity_risk",
            "concentration_risk",
            "exit_risk",
            "technology_risk",
        ]),
        FinancialDomainRule::new(
            "asset_management_validation",
            "Validates asset management companies",
            D::AssetManagement,
            E::Company,
            "UCITS",
        )
        .with_required_fields(&[
            "company_id",
            "aum",
            "number_of_funds",
            "investment_strategies",
            "client_types",
        ])
        .with_metric_range("aum", 0.0, INF)
        .with_metric_range("revenue", 0.0, INF)
        .with_metric_range("profit_margin", 0.0, 100.0)
        .with_metric_range("client_retention_rate", 0.0, 100.0)
        .with_metric_range("fund_performance", -INF, INF)
        .with_compliance_requirements(&[
            "Risk Management",
            "Client Reporting",
            "Performance Attribution",
            "Compliance Monitoring",
            "Client Communication",
        ])
        .with_risk_factors(&[
            "market_risk",
            "operational_risk",
            "compliance_risk",
            "reputation_risk",
            "client_risk",
        ]),
        FinancialDomainRule::new(
            "market_making_validation",
            "Validates market making firms",
            D::MarketMaking,
            E::Company,
            "MiFID II",
        )
        .with_required_fields(&[
            "company_id",
            "trading_venues",
            "instruments",
            "inventory_limits",
            "risk_limits",
        ])
        .with_metric_range("inventory_value", -INF, INF)
        .with_metric_range("spread", 0.0, INF)
        .with_metric_range("volume", 0.0, INF)
        .with_metric_range("profit_loss", -INF, INF)
        .with_metric_range("risk_metrics", -INF, INF)
        .with_compliance_requirements(&[
            "Best Execution",
            "Market Making Obligations",
            "Risk Management",
            "Reporting",
            "Compliance",
        ])
        .with_risk_factors(&[
            "market_risk",
            "inventory_risk",
            "liquidity_risk",
            "operational_risk",
            "regulatory_risk",
        ]),
        FinancialDomainRule::new(
            "quantitative_trading_validation",
            "Validates quantitative trading systems",
            D::QuantitativeTrading,
            E::System,
            "MiFID II",
        )
        .with_required_fields(&[
            "system_id",
            "strategy_type",
            "trading_parameters",
            "risk_parameters",
            "performance_metrics",
        ])
        .with_metric_range("sharpe_ratio", -INF, INF)
        .with_metric_range("sortino_ratio", -INF, INF)
        .with_metric_range("max_drawdown", -100.0, 0.0)
        .with_metric_range("win_rate", 0.0, 100.0)
        .with_metric_range("profit_factor", 0.0, INF)
        .with_compliance_requirements(&[
            "Algorithm Testing",
            "Risk Management",
            "Monitoring",
            "Reporting",
            "Compliance",
        ])
        .with_risk_factors(&[
            "model_risk",
            "execution_risk",
            "market_risk",
            "operational_risk",
            "regulatory_risk",
        ]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_names_are_unique() {
        let rules = default_rules();
        let names: HashSet<_> = rules.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn test_company_rule_bounds() {
        let company = entity_rules()
            .into_iter()
            .find(|r| r.entity_type == EntityType::Company)
            .unwrap();
        let constraints = company.financial_constraints.unwrap();
        let employees = constraints
            .metric_ranges
            .iter()
            .find(|r| r.field == "employees")
            .unwrap();
        assert_eq!(employees.min, Some(1.0));
        assert_eq!(employees.max, None);
    }

    #[test]
    fn test_domain_rules_are_errors() {
        assert!(domain_rules()
            .iter()
            .all(|r| r.level == crate::rules::RuleLevel::Error && !r.risk_factors.is_empty()));
    }
}
