//! Typed views of the seven analyses.
//!
//! The core moves plain JSON records around; these structs give callers a
//! typed front door (`Analyst::run_typed`) that mirrors the record shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kind::AnalysisKind;

/// An input record that knows which analysis it belongs to.
pub trait AnalysisRequest: Serialize {
    const KIND: AnalysisKind;
    type Output: DeserializeOwned;
}

macro_rules! analysis_request {
    ($input:ty => $output:ty, $kind:expr) => {
        impl AnalysisRequest for $input {
            const KIND: AnalysisKind = $kind;
            type Output = $output;
        }
    };
}

// --- Market analysis ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysisInput {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysisOutput {
    pub analysis: String,
    pub key_takeaways: Vec<String>,
}

analysis_request!(MarketAnalysisInput => MarketAnalysisOutput, AnalysisKind::MarketAnalysis);

// --- Sales report ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportInput {
    pub time_period: String,
    /// Raw sales rows as JSON text.
    pub sales_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportOutput {
    pub title: String,
    pub summary: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
}

analysis_request!(SalesReportInput => SalesReportOutput, AnalysisKind::SalesReport);

// --- Supply chain ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyChainInput {
    pub metrics: String,
    pub historical_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyChainOutput {
    pub recommendations: String,
    pub reasoning: String,
}

analysis_request!(SupplyChainInput => SupplyChainOutput, AnalysisKind::SupplyChainRecommendations);

// --- Pet industry ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetIndustryInput {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetIndustryOutput {
    pub analysis: String,
    pub opportunities: Vec<String>,
}

analysis_request!(PetIndustryInput => PetIndustryOutput, AnalysisKind::PetIndustryAnalysis);

// --- Competitor ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorInput {
    pub competitor_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorOutput {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub strategy: String,
    pub market_positioning: String,
}

analysis_request!(CompetitorInput => CompetitorOutput, AnalysisKind::CompetitorAnalysis);

// --- Market share ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketShareInput {
    pub market: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyShare {
    pub company: String,
    /// Percentage, 0-100.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketShareOutput {
    pub market_summary: String,
    pub market_share: Vec<CompanyShare>,
    pub key_trends: Vec<String>,
}

analysis_request!(MarketShareInput => MarketShareOutput, AnalysisKind::MarketShare);

// --- Marketing cost ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingCostInput {
    pub campaign_name: String,
    pub cost_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub roi: String,
    pub cpa: String,
    pub spend_vs_budget: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingCostOutput {
    pub campaign_summary: String,
    pub key_metrics: KeyMetrics,
    pub recommendations: Vec<String>,
}

analysis_request!(MarketingCostInput => MarketingCostOutput, AnalysisKind::MarketingCost);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use serde_json::Value;

    // Typed inputs must serialize to exactly the field names the schema declares.
    fn assert_matches_schema<R: AnalysisRequest>(input: R) {
        let value = serde_json::to_value(&input).unwrap();
        let mut actual: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let def = Registry::global().lookup(R::KIND).unwrap();
        let mut expected: Vec<&str> = def.input.field_names().collect();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(actual, expected, "{}", R::KIND);
    }

    #[test]
    fn typed_inputs_line_up_with_schemas() {
        assert_matches_schema(MarketAnalysisInput { topic: "x".into() });
        assert_matches_schema(SalesReportInput {
            time_period: "x".into(),
            sales_data: "[]".into(),
        });
        assert_matches_schema(SupplyChainInput {
            metrics: "{}".into(),
            historical_data: "{}".into(),
        });
        assert_matches_schema(PetIndustryInput { topic: "x".into() });
        assert_matches_schema(CompetitorInput {
            competitor_name: "x".into(),
        });
        assert_matches_schema(MarketShareInput { market: "x".into() });
        assert_matches_schema(MarketingCostInput {
            campaign_name: "x".into(),
            cost_data: "{}".into(),
        });
    }

    #[test]
    fn marketing_cost_output_reads_nested_metrics() {
        let value: Value = serde_json::json!({
            "campaignSummary": "Email outperformed paid channels.",
            "keyMetrics": { "roi": "614%", "cpa": "$41.04", "spendVsBudget": "95% of budget" },
            "recommendations": ["Shift spend to email"]
        });
        let out: MarketingCostOutput = serde_json::from_value(value).unwrap();
        assert_eq!(out.key_metrics.spend_vs_budget, "95% of budget");
    }
}
