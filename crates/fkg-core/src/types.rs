//! Closed vocabularies shared by extraction, validation and persistence:
//! entity types, the relationship catalog and financial domains.

use crate::FkgError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Entity Types
// ============================================================================

/// Kinds of entity a graph node can represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityType {
    // Emitted by the recognizer
    Company,
    Person,
    Currency,
    Percentage,
    Date,
    FinancialMetric,
    Account,
    Transaction,
    Market,
    Industry,

    // Graph model types
    Location,
    Document,
    Regulation,
    IntellectualProperty,
    FinancialInstrument,
    Portfolio,
    Policy,
    Property,
    CryptoAsset,
    FintechService,
    RegulatoryReport,
    ComplianceCheck,
    Fund,
    System,

    // Targets named by the compatibility matrix
    Subsidiary,
    Division,
    Position,
    Project,
    Venture,
    Amount,
    Organization,
    Region,
    Association,
    City,
    Country,
    Team,
    Department,
}

impl EntityType {
    /// Types the entity recognizer is allowed to emit
    pub const RECOGNIZED: [EntityType; 10] = [
        EntityType::Company,
        EntityType::Person,
        EntityType::Currency,
        EntityType::Percentage,
        EntityType::Date,
        EntityType::FinancialMetric,
        EntityType::Account,
        EntityType::Transaction,
        EntityType::Market,
        EntityType::Industry,
    ];

    pub const ALL: [EntityType; 37] = [
        EntityType::Company,
        EntityType::Person,
        EntityType::Currency,
        EntityType::Percentage,
        EntityType::Date,
        EntityType::FinancialMetric,
        EntityType::Account,
        EntityType::Transaction,
        EntityType::Market,
        EntityType::Industry,
        EntityType::Location,
        EntityType::Document,
        EntityType::Regulation,
        EntityType::IntellectualProperty,
        EntityType::FinancialInstrument,
        EntityType::Portfolio,
        EntityType::Policy,
        EntityType::Property,
        EntityType::CryptoAsset,
        EntityType::FintechService,
        EntityType::RegulatoryReport,
        EntityType::ComplianceCheck,
        EntityType::Fund,
        EntityType::System,
        EntityType::Subsidiary,
        EntityType::Division,
        EntityType::Position,
        EntityType::Project,
        EntityType::Venture,
        EntityType::Amount,
        EntityType::Organization,
        EntityType::Region,
        EntityType::Association,
        EntityType::City,
        EntityType::Country,
        EntityType::Team,
        EntityType::Department,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Person => "Person",
            Self::Currency => "Currency",
            Self::Percentage => "Percentage",
            Self::Date => "Date",
            Self::FinancialMetric => "FinancialMetric",
            Self::Account => "Account",
            Self::Transaction => "Transaction",
            Self::Market => "Market",
            Self::Industry => "Industry",
            Self::Location => "Location",
            Self::Document => "Document",
            Self::Regulation => "Regulation",
            Self::IntellectualProperty => "IntellectualProperty",
            Self::FinancialInstrument => "FinancialInstrument",
            Self::Portfolio => "Portfolio",
            Self::Policy => "Policy",
            Self::Property => "Property",
            Self::CryptoAsset => "CryptoAsset",
            Self::FintechService => "FintechService",
            Self::RegulatoryReport => "RegulatoryReport",
            Self::ComplianceCheck => "ComplianceCheck",
            Self::Fund => "Fund",
            Self::System => "System",
            Self::Subsidiary => "Subsidiary",
            Self::Division => "Division",
            Self::Position => "Position",
            Self::Project => "Project",
            Self::Venture => "Venture",
            Self::Amount => "Amount",
            Self::Organization => "Organization",
            Self::Region => "Region",
            Self::Association => "Association",
            Self::City => "City",
            Self::Country => "Country",
            Self::Team => "Team",
            Self::Department => "Department",
        }
    }

    /// Human-readable description used by `get_entity_types`
    pub fn description(&self) -> &'static str {
        match self {
            Self::Company => "Company or organization name",
            Self::Person => "Person name",
            Self::Currency => "Monetary value",
            Self::Percentage => "Percentage value",
            Self::Date => "Date or time period",
            Self::FinancialMetric => "Financial metric or KPI",
            Self::Account => "Financial account or category",
            Self::Transaction => "Financial transaction",
            Self::Market => "Market or exchange",
            Self::Industry => "Industry or sector",
            Self::Location => "Geographic location",
            Self::Document => "Source document",
            Self::Regulation => "Law or regulation",
            Self::IntellectualProperty => "Patent, trademark or license",
            Self::FinancialInstrument => "Security or other tradable instrument",
            Self::Portfolio => "Investment portfolio",
            Self::Policy => "Insurance policy",
            Self::Property => "Real estate property",
            Self::CryptoAsset => "Crypto asset or token",
            Self::FintechService => "Financial technology service",
            Self::RegulatoryReport => "Report filed with a regulator",
            Self::ComplianceCheck => "Compliance screening",
            Self::Fund => "Pooled investment fund",
            Self::System => "Trading or processing system",
            Self::Subsidiary => "Subsidiary company",
            Self::Division => "Business division",
            Self::Position => "Role or position",
            Self::Project => "Project",
            Self::Venture => "Venture",
            Self::Amount => "Quantity or amount",
            Self::Organization => "Non-company organization",
            Self::Region => "Geographic region",
            Self::Association => "Industry association",
            Self::City => "City",
            Self::Country => "Country",
            Self::Team => "Team",
            Self::Department => "Department",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = FkgError;

    /// Accepts `FinancialMetric`, `FINANCIAL_METRIC` and `financial_metric`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        Self::ALL
            .iter()
            .copied()
            .find(|t| normalize_name(t.as_str()) == wanted)
            .ok_or_else(|| FkgError::ValidationError(format!("Unknown entity type: {s}")))
    }
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// Relationship Types
// ============================================================================

/// Coarse grouping of relationship kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipGroup {
    Ownership,
    Employment,
    Financial,
    Business,
    IndustryMarket,
    Temporal,
    Location,
    RatioMetric,
}

impl RelationshipGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ownership => "ownership",
            Self::Employment => "employment",
            Self::Financial => "financial",
            Self::Business => "business",
            Self::IndustryMarket => "industry_market",
            Self::Temporal => "temporal",
            Self::Location => "location",
            Self::RatioMetric => "ratio_metric",
        }
    }
}

macro_rules! relationship_catalog {
    ($( $group:ident { $( $variant:ident => $name:literal, $desc:literal; )* } )*) => {
        /// Kinds of relationship between two entities
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum RelationshipType {
            $($( $variant, )*)*
        }

        impl RelationshipType {
            const CATALOG: &'static [RelationshipType] = &[
                $($( RelationshipType::$variant, )*)*
            ];

            /// Machine name, e.g. `HAS_REVENUE`
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($( Self::$variant => $name, )*)*
                }
            }

            pub fn description(&self) -> &'static str {
                match self {
                    $($( Self::$variant => $desc, )*)*
                }
            }

            pub fn group(&self) -> RelationshipGroup {
                match self {
                    $($( Self::$variant => RelationshipGroup::$group, )*)*
                }
            }
        }
    };
}

relationship_catalog! {
    Ownership {
        Owns => "OWNS", "Ownership relationship";
        Controls => "CONTROLS", "Control relationship";
        HasSubsidiary => "HAS_SUBSIDIARY", "Subsidiary relationship";
        HasDivision => "HAS_DIVISION", "Division relationship";
        HasMajorityStake => "HAS_MAJORITY_STAKE", "Majority ownership stake";
        HasMinorityStake => "HAS_MINORITY_STAKE", "Minority ownership stake";
        HasVotingRights => "HAS_VOTING_RIGHTS", "Voting rights relationship";
        HasBoardSeat => "HAS_BOARD_SEAT", "Board seat relationship";
        HasJointVenture => "HAS_JOINT_VENTURE", "Joint venture ownership";
    }
    Employment {
        WorksFor => "WORKS_FOR", "Employment relationship";
        ReportsTo => "REPORTS_TO", "Reporting relationship";
        Manages => "MANAGES", "Management relationship";
        BoardMember => "BOARD_MEMBER", "Board membership";
        IsBoardMember => "IS_BOARD_MEMBER", "Board membership of a person";
        Advisor => "ADVISOR", "Advisory relationship";
        Consultant => "CONSULTANT", "Consulting relationship";
        Contractor => "CONTRACTOR", "Contractor relationship";
        Founder => "FOUNDER", "Founding relationship";
        CoFounder => "CO_FOUNDER", "Co-founding relationship";
        Executive => "EXECUTIVE", "Executive position";
        Director => "DIRECTOR", "Director position";
        Shareholder => "SHAREHOLDER", "Shareholder relationship";
        Employment => "EMPLOYMENT", "Employment record between a company and a person";
    }
    Financial {
        InvestsIn => "INVESTS_IN", "Investment relationship";
        Acquires => "ACQUIRES", "Acquisition relationship";
        MergesWith => "MERGES_WITH", "Merger relationship";
        HasMetric => "HAS_METRIC", "Financial metric relationship";
        HasRevenue => "HAS_REVENUE", "Revenue relationship";
        HasProfit => "HAS_PROFIT", "Profit relationship";
        HasAsset => "HAS_ASSET", "Asset relationship";
        HasLiability => "HAS_LIABILITY", "Liability relationship";
        HasDebt => "HAS_DEBT", "Debt relationship";
        HasEquity => "HAS_EQUITY", "Equity relationship";
        HasCashFlow => "HAS_CASH_FLOW", "Cash flow relationship";
        HasDividend => "HAS_DIVIDEND", "Dividend relationship";
        HasMarketCap => "HAS_MARKET_CAP", "Market capitalization relationship";
        HasSharePrice => "HAS_SHARE_PRICE", "Share price relationship";
        HasPeRatio => "HAS_PE_RATIO", "P/E ratio relationship";
        HasEvEbitda => "HAS_EV_EBITDA", "EV/EBITDA ratio relationship";
        HasRoe => "HAS_ROE", "Return on Equity relationship";
        HasRoa => "HAS_ROA", "Return on Assets relationship";
        HasGrossMargin => "HAS_GROSS_MARGIN", "Gross margin relationship";
        HasOperatingMargin => "HAS_OPERATING_MARGIN", "Operating margin relationship";
        HasNetMargin => "HAS_NET_MARGIN", "Net margin relationship";
        HasInvestment => "HAS_INVESTMENT", "Investment holding";
        Issues => "ISSUES", "Issuance of a financial instrument";
        Transaction => "TRANSACTION", "Transaction between a party and an instrument";
    }
    Business {
        PartnersWith => "PARTNERS_WITH", "Partnership relationship";
        CompetesWith => "COMPETES_WITH", "Competition relationship";
        SuppliesTo => "SUPPLIES_TO", "Supply relationship";
        CustomerOf => "CUSTOMER_OF", "Customer relationship";
        DistributesFor => "DISTRIBUTES_FOR", "Distribution relationship";
        LicensesTo => "LICENSES_TO", "Licensing relationship";
        JointVenture => "JOINT_VENTURE", "Joint venture relationship";
        StrategicAlliance => "STRATEGIC_ALLIANCE", "Strategic alliance relationship";
        ResearchCollaboration => "RESEARCH_COLLABORATION", "Research collaboration";
        TechnologyPartner => "TECHNOLOGY_PARTNER", "Technology partnership";
        ServiceProvider => "SERVICE_PROVIDER", "Service provider relationship";
        Vendor => "VENDOR", "Vendor relationship";
        Reseller => "RESELLER", "Reseller relationship";
        Franchisee => "FRANCHISEE", "Franchisee relationship";
        Franchisor => "FRANCHISOR", "Franchisor relationship";
    }
    IndustryMarket {
        OperatesIn => "OPERATES_IN", "Market operation relationship";
        BelongsTo => "BELONGS_TO", "Industry membership";
        RegulatedBy => "REGULATED_BY", "Regulatory relationship";
        CertifiedBy => "CERTIFIED_BY", "Certification relationship";
        CompliesWith => "COMPLIES_WITH", "Compliance relationship";
        HasPatent => "HAS_PATENT", "Patent relationship";
        HasTrademark => "HAS_TRADEMARK", "Trademark relationship";
        HasLicense => "HAS_LICENSE", "License relationship";
        HasPermit => "HAS_PERMIT", "Permit relationship";
        HasApproval => "HAS_APPROVAL", "Regulatory approval relationship";
    }
    Temporal {
        Founded => "FOUNDED", "Founding relationship";
        FoundedOn => "FOUNDED_ON", "Founding date relationship";
        AcquiredOn => "ACQUIRED_ON", "Acquisition date relationship";
        MergedOn => "MERGED_ON", "Merger date relationship";
        ListedOn => "LISTED_ON", "Listing date relationship";
        DelistedOn => "DELISTED_ON", "Delisting date relationship";
        BankruptOn => "BANKRUPT_ON", "Bankruptcy date relationship";
        RestructuredOn => "RESTRUCTURED_ON", "Restructuring date relationship";
        SpunOffOn => "SPUN_OFF_ON", "Spin-off date relationship";
        IpoOn => "IPO_ON", "Initial public offering date relationship";
    }
    Location {
        HeadquarteredIn => "HEADQUARTERED_IN", "Headquarters location";
        LocatedIn => "LOCATED_IN", "Generic location";
        OperatesInRegion => "OPERATES_IN_REGION", "Regional operation";
        HasOfficeIn => "HAS_OFFICE_IN", "Office location";
        HasFacilityIn => "HAS_FACILITY_IN", "Facility location";
        HasPlantIn => "HAS_PLANT_IN", "Manufacturing plant location";
        HasWarehouseIn => "HAS_WAREHOUSE_IN", "Warehouse location";
        HasRetailIn => "HAS_RETAIL_IN", "Retail location";
        HasDistributionIn => "HAS_DISTRIBUTION_IN", "Distribution center location";
    }
    RatioMetric {
        HasCurrentRatio => "HAS_CURRENT_RATIO", "Current ratio relationship";
        HasQuickRatio => "HAS_QUICK_RATIO", "Quick ratio relationship";
        HasDebtToEquity => "HAS_DEBT_TO_EQUITY", "Debt-to-equity ratio relationship";
        HasInterestCoverage => "HAS_INTEREST_COVERAGE", "Interest coverage ratio relationship";
        HasAssetTurnover => "HAS_ASSET_TURNOVER", "Asset turnover ratio relationship";
        HasInventoryTurnover => "HAS_INVENTORY_TURNOVER", "Inventory turnover ratio relationship";
        HasReceivablesTurnover => "HAS_RECEIVABLES_TURNOVER", "Receivables turnover ratio relationship";
        HasPayablesTurnover => "HAS_PAYABLES_TURNOVER", "Payables turnover ratio relationship";
        HasWorkingCapital => "HAS_WORKING_CAPITAL", "Working capital relationship";
        HasFreeCashFlow => "HAS_FREE_CASH_FLOW", "Free cash flow relationship";
        HasOperatingCashFlow => "HAS_OPERATING_CASH_FLOW", "Operating cash flow relationship";
        HasInvestingCashFlow => "HAS_INVESTING_CASH_FLOW", "Investing cash flow relationship";
        HasFinancingCashFlow => "HAS_FINANCING_CASH_FLOW", "Financing cash flow relationship";
        HasCapitalExpenditure => "HAS_CAPITAL_EXPENDITURE", "Capital expenditure relationship";
        HasDepreciation => "HAS_DEPRECIATION", "Depreciation relationship";
        HasAmortization => "HAS_AMORTIZATION", "Amortization relationship";
        HasGoodwill => "HAS_GOODWILL", "Goodwill relationship";
        HasIntangibleAssets => "HAS_INTANGIBLE_ASSETS", "Intangible assets relationship";
        HasTangibleAssets => "HAS_TANGIBLE_ASSETS", "Tangible assets relationship";
        HasFixedAssets => "HAS_FIXED_ASSETS", "Fixed assets relationship";
        HasCurrentAssets => "HAS_CURRENT_ASSETS", "Current assets relationship";
        HasNonCurrentAssets => "HAS_NON_CURRENT_ASSETS", "Non-current assets relationship";
        HasCurrentLiabilities => "HAS_CURRENT_LIABILITIES", "Current liabilities relationship";
        HasNonCurrentLiabilities => "HAS_NON_CURRENT_LIABILITIES", "Non-current liabilities relationship";
        HasLongTermDebt => "HAS_LONG_TERM_DEBT", "Long-term debt relationship";
        HasShortTermDebt => "HAS_SHORT_TERM_DEBT", "Short-term debt relationship";
        HasAccountsReceivable => "HAS_ACCOUNTS_RECEIVABLE", "Accounts receivable relationship";
        HasAccountsPayable => "HAS_ACCOUNTS_PAYABLE", "Accounts payable relationship";
        HasInventory => "HAS_INVENTORY", "Inventory relationship";
        HasPrepaidExpenses => "HAS_PREPAID_EXPENSES", "Prepaid expenses relationship";
        HasDeferredRevenue => "HAS_DEFERRED_REVENUE", "Deferred revenue relationship";
        HasAccumulatedDepreciation => "HAS_ACCUMULATED_DEPRECIATION", "Accumulated depreciation relationship";
        HasRetainedEarnings => "HAS_RETAINED_EARNINGS", "Retained earnings relationship";
        HasTreasuryStock => "HAS_TREASURY_STOCK", "Treasury stock relationship";
        HasPreferredStock => "HAS_PREFERRED_STOCK", "Preferred stock relationship";
        HasCommonStock => "HAS_COMMON_STOCK", "Common stock relationship";
        HasAdditionalPaidInCapital => "HAS_ADDITIONAL_PAID_IN_CAPITAL", "Additional paid-in capital relationship";
        HasOtherComprehensiveIncome => "HAS_OTHER_COMPREHENSIVE_INCOME", "Other comprehensive income relationship";
        HasMinorityInterest => "HAS_MINORITY_INTEREST", "Minority interest relationship";
        HasOperatingIncome => "HAS_OPERATING_INCOME", "Operating income relationship";
        HasNonOperatingIncome => "HAS_NON_OPERATING_INCOME", "Non-operating income relationship";
        HasExtraordinaryItems => "HAS_EXTRAORDINARY_ITEMS", "Extraordinary items relationship";
        HasDiscontinuedOperations => "HAS_DISCONTINUED_OPERATIONS", "Discontinued operations relationship";
        HasTaxExpense => "HAS_TAX_EXPENSE", "Tax expense relationship";
        HasInterestExpense => "HAS_INTEREST_EXPENSE", "Interest expense relationship";
        HasDividendPayout => "HAS_DIVIDEND_PAYOUT", "Dividend payout relationship";
        HasDividendYield => "HAS_DIVIDEND_YIELD", "Dividend yield relationship";
        HasEarningsYield => "HAS_EARNINGS_YIELD", "Earnings yield relationship";
        HasBookValue => "HAS_BOOK_VALUE", "Book value relationship";
        HasTangibleBookValue => "HAS_TANGIBLE_BOOK_VALUE", "Tangible book value relationship";
        HasPriceToBook => "HAS_PRICE_TO_BOOK", "Price-to-book ratio relationship";
        HasPriceToSales => "HAS_PRICE_TO_SALES", "Price-to-sales ratio relationship";
        HasPriceToCashFlow => "HAS_PRICE_TO_CASH_FLOW", "Price-to-cash flow ratio relationship";
        HasEnterpriseValue => "HAS_ENTERPRISE_VALUE", "Enterprise value relationship";
        HasEvToSales => "HAS_EV_TO_SALES", "EV-to-sales ratio relationship";
        HasEvToEbitda => "HAS_EV_TO_EBITDA", "EV-to-EBITDA ratio relationship";
        HasEvToEbit => "HAS_EV_TO_EBIT", "EV-to-EBIT ratio relationship";
        HasNetDebt => "HAS_NET_DEBT", "Net debt relationship";
        HasNetDebtToEbitda => "HAS_NET_DEBT_TO_EBITDA", "Net debt-to-EBITDA ratio relationship";
        HasCapitalStructure => "HAS_CAPITAL_STRUCTURE", "Capital structure relationship";
        HasWeightedAverageCostOfCapital => "HAS_WEIGHTED_AVERAGE_COST_OF_CAPITAL", "WACC relationship";
        HasBeta => "HAS_BETA", "Beta relationship";
        HasAlpha => "HAS_ALPHA", "Alpha relationship";
        HasSharpeRatio => "HAS_SHARPE_RATIO", "Sharpe ratio relationship";
        HasSortinoRatio => "HAS_SORTINO_RATIO", "Sortino ratio relationship";
        HasInformationRatio => "HAS_INFORMATION_RATIO", "Information ratio relationship";
        HasTreynorRatio => "HAS_TREYNOR_RATIO", "Treynor ratio relationship";
        HasJensensAlpha => "HAS_JENSENS_ALPHA", "Jensen's alpha relationship";
        HasCapm => "HAS_CAPM", "Capital Asset Pricing Model relationship";
        HasDividendDiscountModel => "HAS_DIVIDEND_DISCOUNT_MODEL", "Dividend Discount Model relationship";
        HasDcf => "HAS_DCF", "Discounted Cash Flow relationship";
        HasResidualIncome => "HAS_RESIDUAL_INCOME", "Residual income relationship";
        HasEva => "HAS_EVA", "Economic Value Added relationship";
        HasMva => "HAS_MVA", "Market Value Added relationship";
        HasTotalShareholderReturn => "HAS_TOTAL_SHAREHOLDER_RETURN", "Total Shareholder Return relationship";
        HasInternalRateOfReturn => "HAS_INTERNAL_RATE_OF_RETURN", "Internal Rate of Return relationship";
        HasNetPresentValue => "HAS_NET_PRESENT_VALUE", "Net Present Value relationship";
        HasPaybackPeriod => "HAS_PAYBACK_PERIOD", "Payback period relationship";
        HasProfitabilityIndex => "HAS_PROFITABILITY_INDEX", "Profitability Index relationship";
        HasModifiedInternalRateOfReturn => "HAS_MODIFIED_INTERNAL_RATE_OF_RETURN", "Modified Internal Rate of Return relationship";
    }
}

impl RelationshipType {
    /// Every relationship kind, in catalog order
    pub fn all() -> &'static [RelationshipType] {
        Self::CATALOG
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = FkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| FkgError::ValidationError(format!("Unknown relationship type: {s}")))
    }
}

// ============================================================================
// Financial Domains
// ============================================================================

/// Business domains with their own validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialDomain {
    Banking,
    Investment,
    Insurance,
    RealEstate,
    Crypto,
    Fintech,
    Regulatory,
    Compliance,
    WealthManagement,
    HedgeFund,
    PrivateEquity,
    VentureCapital,
    AssetManagement,
    MarketMaking,
    QuantitativeTrading,
}

impl FinancialDomain {
    pub const ALL: [FinancialDomain; 15] = [
        FinancialDomain::Banking,
        FinancialDomain::Investment,
        FinancialDomain::Insurance,
        FinancialDomain::RealEstate,
        FinancialDomain::Crypto,
        FinancialDomain::Fintech,
        FinancialDomain::Regulatory,
        FinancialDomain::Compliance,
        FinancialDomain::WealthManagement,
        FinancialDomain::HedgeFund,
        FinancialDomain::PrivateEquity,
        FinancialDomain::VentureCapital,
        FinancialDomain::AssetManagement,
        FinancialDomain::MarketMaking,
        FinancialDomain::QuantitativeTrading,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banking => "banking",
            Self::Investment => "investment",
            Self::Insurance => "insurance",
            Self::RealEstate => "real_estate",
            Self::Crypto => "crypto",
            Self::Fintech => "fintech",
            Self::Regulatory => "regulatory",
            Self::Compliance => "compliance",
            Self::WealthManagement => "wealth_management",
            Self::HedgeFund => "hedge_fund",
            Self::PrivateEquity => "private_equity",
            Self::VentureCapital => "venture_capital",
            Self::AssetManagement => "asset_management",
            Self::MarketMaking => "market_making",
            Self::QuantitativeTrading => "quantitative_trading",
        }
    }
}

impl fmt::Display for FinancialDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinancialDomain {
    type Err = FkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| FkgError::InvalidDomain(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entity_type_parse_accepts_common_spellings() {
        assert_eq!("FinancialMetric".parse::<EntityType>().unwrap(), EntityType::FinancialMetric);
        assert_eq!("FINANCIAL_METRIC".parse::<EntityType>().unwrap(), EntityType::FinancialMetric);
        assert_eq!("company".parse::<EntityType>().unwrap(), EntityType::Company);
        assert!("Spaceship".parse::<EntityType>().is_err());
    }

    #[test]
    fn test_entity_type_serde_uses_pascal_case() {
        let json = serde_json::to_string(&EntityType::CryptoAsset).unwrap();
        assert_eq!(json, "\"CryptoAsset\"");
    }

    #[test]
    fn test_relationship_catalog_names_are_unique() {
        let names: HashSet<_> = RelationshipType::all().iter().map(|r| r.as_str()).collect();
        assert_eq!(names.len(), RelationshipType::all().len());
        assert!(RelationshipType::all().len() > 100);
    }

    #[test]
    fn test_relationship_serde_matches_machine_name() {
        for rel in RelationshipType::all() {
            let json = serde_json::to_string(rel).unwrap();
            assert_eq!(json, format!("\"{}\"", rel.as_str()));
            let back: RelationshipType = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *rel);
        }
    }

    #[test]
    fn test_relationship_groups() {
        assert_eq!(RelationshipType::HasRevenue.group(), RelationshipGroup::Financial);
        assert_eq!(RelationshipType::HasBeta.group(), RelationshipGroup::RatioMetric);
        assert_eq!(RelationshipType::FoundedOn.group(), RelationshipGroup::Temporal);
        assert_eq!(RelationshipType::HasRevenue.description(), "Revenue relationship");
    }

    #[test]
    fn test_domain_parse() {
        assert_eq!("real_estate".parse::<FinancialDomain>().unwrap(), FinancialDomain::RealEstate);
        assert_eq!("Hedge-Fund".parse::<FinancialDomain>().unwrap(), FinancialDomain::HedgeFund);
        assert!(matches!(
            "astrology".parse::<FinancialDomain>(),
            Err(FkgError::InvalidDomain(_))
        ));
    }
}
