use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven analyses the dashboard offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    MarketAnalysis,
    SalesReport,
    SupplyChainRecommendations,
    PetIndustryAnalysis,
    CompetitorAnalysis,
    MarketShare,
    MarketingCost,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::MarketAnalysis,
        AnalysisKind::SalesReport,
        AnalysisKind::SupplyChainRecommendations,
        AnalysisKind::PetIndustryAnalysis,
        AnalysisKind::CompetitorAnalysis,
        AnalysisKind::MarketShare,
        AnalysisKind::MarketingCost,
    ];

    /// URL-safe identifier, identical to the serde representation.
    pub fn slug(self) -> &'static str {
        match self {
            AnalysisKind::MarketAnalysis => "market-analysis",
            AnalysisKind::SalesReport => "sales-report",
            AnalysisKind::SupplyChainRecommendations => "supply-chain-recommendations",
            AnalysisKind::PetIndustryAnalysis => "pet-industry-analysis",
            AnalysisKind::CompetitorAnalysis => "competitor-analysis",
            AnalysisKind::MarketShare => "market-share",
            AnalysisKind::MarketingCost => "marketing-cost",
        }
    }

    /// Panel heading shown on the dashboard.
    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::MarketAnalysis => "AI Market Analysis",
            AnalysisKind::SalesReport => "AI-Powered Sales Report",
            AnalysisKind::SupplyChainRecommendations => "AI-Powered Recommendations",
            AnalysisKind::PetIndustryAnalysis => "Pet Industry Analysis",
            AnalysisKind::CompetitorAnalysis => "Competitor Analysis",
            AnalysisKind::MarketShare => "Market Share Analysis",
            AnalysisKind::MarketingCost => "Marketing Cost Analysis",
        }
    }

    /// Prompt shown when the user submits without the required input.
    pub fn missing_input_message(self) -> &'static str {
        match self {
            AnalysisKind::MarketAnalysis => "Please enter a market topic.",
            AnalysisKind::SalesReport => "Please enter a time period.",
            AnalysisKind::SupplyChainRecommendations => "Supply chain data is unavailable.",
            AnalysisKind::PetIndustryAnalysis => "Please enter a topic.",
            AnalysisKind::CompetitorAnalysis => "Please enter a competitor name.",
            AnalysisKind::MarketShare => "Please enter a market or industry.",
            AnalysisKind::MarketingCost => "Please fill in all fields.",
        }
    }

    /// Notification text for any failure after input validation.
    pub fn failure_message(self) -> &'static str {
        match self {
            AnalysisKind::MarketAnalysis => "There was a problem generating the market analysis.",
            AnalysisKind::SalesReport => "There was a problem generating the sales report.",
            AnalysisKind::SupplyChainRecommendations => {
                "There was a problem generating AI recommendations."
            }
            AnalysisKind::PetIndustryAnalysis => "There was a problem generating the analysis.",
            AnalysisKind::CompetitorAnalysis => {
                "There was a problem generating the competitor analysis."
            }
            AnalysisKind::MarketShare => "There was a problem generating the market share analysis.",
            AnalysisKind::MarketingCost => {
                "There was a problem generating the marketing cost analysis."
            }
        }
    }

    /// Inline panel text offering a retry.
    pub fn retry_message(self) -> &'static str {
        match self {
            AnalysisKind::MarketAnalysis => "Failed to get market analysis. Please try again.",
            AnalysisKind::SalesReport => "Failed to get sales report. Please try again.",
            AnalysisKind::SupplyChainRecommendations => {
                "Failed to get recommendations. Please try again."
            }
            AnalysisKind::PetIndustryAnalysis => {
                "Failed to get pet industry analysis. Please try again."
            }
            AnalysisKind::CompetitorAnalysis => {
                "Failed to get competitor analysis. Please try again."
            }
            AnalysisKind::MarketShare => "Failed to get market share analysis. Please try again.",
            AnalysisKind::MarketingCost => {
                "Failed to get marketing cost analysis. Please try again."
            }
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("Unknown analysis kind: {}", s))
    }
}
