use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::RegistryError;
use crate::kind::AnalysisKind;
use crate::schema::{Field, FieldKind, Schema};
use crate::template::PromptTemplate;

// One row per analysis: what goes in, what must come back, and how we ask.
#[derive(Debug, Clone)]
pub struct AnalysisDefinition {
    pub kind: AnalysisKind,
    pub input: Schema,
    pub output: Schema,
    pub template: PromptTemplate,
}

#[derive(Debug, Clone)]
pub struct Registry {
    definitions: Vec<AnalysisDefinition>,
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::builtin);

impl Registry {
    /// Builds a registry from arbitrary rows and checks it.
    pub fn new(definitions: Vec<AnalysisDefinition>) -> Result<Self, RegistryError> {
        let registry = Self { definitions };
        registry.verify()?;
        Ok(registry)
    }

    /// The process-wide, read-only table.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// The seven analyses shipped with the dashboard.
    pub fn builtin() -> Self {
        let registry = Self {
            definitions: AnalysisKind::ALL.iter().map(|k| builtin_definition(*k)).collect(),
        };
        // The table is static data; a failure here is a bug in this file.
        debug_assert!(registry.verify().is_ok(), "builtin registry is inconsistent");
        registry
    }

    pub fn lookup(&self, kind: AnalysisKind) -> Result<&AnalysisDefinition, RegistryError> {
        self.definitions
            .iter()
            .find(|d| d.kind == kind)
            .ok_or(RegistryError::Unregistered(kind))
    }

    pub fn definitions(&self) -> &[AnalysisDefinition] {
        &self.definitions
    }

    /// Sanity check: no duplicate kinds, and every placeholder names an input field.
    pub fn verify(&self) -> Result<(), RegistryError> {
        let mut seen = HashSet::new();
        for def in &self.definitions {
            if !seen.insert(def.kind) {
                return Err(RegistryError::Duplicate(def.kind));
            }

            let placeholders = def
                .template
                .placeholders()
                .map_err(|source| RegistryError::MalformedTemplate {
                    kind: def.kind,
                    source,
                })?;

            for placeholder in placeholders {
                if def.input.field(placeholder).is_none() {
                    return Err(RegistryError::UnknownPlaceholder {
                        kind: def.kind,
                        placeholder: placeholder.to_string(),
                    });
                }
            }
            debug!(kind = %def.kind, "analysis definition verified");
        }
        Ok(())
    }
}

// --- BUILTIN TABLE ---

fn builtin_definition(kind: AnalysisKind) -> AnalysisDefinition {
    let (input, output, template) = match kind {
        AnalysisKind::MarketAnalysis => (
            vec![Field::text("topic", "The market topic to be analyzed.")],
            vec![
                Field::text(
                    "analysis",
                    "A detailed market analysis of the topic, including trends, opportunities, and challenges.",
                ),
                Field::text_list("keyTakeaways", "A list of key takeaways from the analysis."),
            ],
            MARKET_ANALYSIS_PROMPT,
        ),
        AnalysisKind::SalesReport => (
            vec![
                Field::text(
                    "timePeriod",
                    "The time period for the sales report (e.g., \"Last Quarter\", \"Last Month\").",
                ),
                Field::text("salesData", "The raw sales data in JSON format."),
            ],
            vec![
                Field::text("title", "A concise title for the sales report."),
                Field::text("summary", "A high-level summary of sales performance for the period."),
                Field::text_list("keyInsights", "A list of key insights discovered from the sales data."),
                Field::text_list("recommendations", "Actionable recommendations based on the analysis."),
            ],
            SALES_REPORT_PROMPT,
        ),
        AnalysisKind::SupplyChainRecommendations => (
            vec![
                Field::text(
                    "metrics",
                    "Key supply chain metrics in JSON format, including supplier locations, transit times, and inventory levels.",
                ),
                Field::text(
                    "historicalData",
                    "Historical supply chain data in JSON format, including past performance and disruptions.",
                ),
            ],
            vec![
                Field::text(
                    "recommendations",
                    "Recommendations for supply chain improvement, including areas to investigate and potential solutions.",
                ),
                Field::text(
                    "reasoning",
                    "The reasoning behind the recommendations, explaining why certain areas are flagged for improvement.",
                ),
            ],
            SUPPLY_CHAIN_PROMPT,
        ),
        AnalysisKind::PetIndustryAnalysis => (
            vec![Field::text("topic", "The pet industry topic to be analyzed.")],
            vec![
                Field::text(
                    "analysis",
                    "A detailed analysis of the topic within the pet industry, including market size, trends, and consumer behavior.",
                ),
                Field::text_list("opportunities", "A list of key business opportunities related to the topic."),
            ],
            PET_INDUSTRY_PROMPT,
        ),
        AnalysisKind::CompetitorAnalysis => (
            vec![Field::text(
                "competitorName",
                "The name of the competitor company to be analyzed.",
            )],
            vec![
                Field::text("summary", "A brief summary of the competitor."),
                Field::text_list("strengths", "A list of the competitor's key strengths."),
                Field::text_list("weaknesses", "A list of the competitor's key weaknesses."),
                Field::text("strategy", "An analysis of the competitor's likely strategy."),
                Field::text(
                    "marketPositioning",
                    "An overview of the competitor's market positioning.",
                ),
            ],
            COMPETITOR_PROMPT,
        ),
        AnalysisKind::MarketShare => (
            vec![Field::text(
                "market",
                "The market or industry to analyze for market share.",
            )],
            vec![
                Field::text("marketSummary", "A summary of the overall market."),
                Field::new(
                    "marketShare",
                    FieldKind::list_of(FieldKind::Record(Schema::new(vec![
                        Field::text("company", "The name of the company."),
                        Field::new(
                            "share",
                            FieldKind::Number,
                            "The estimated market share percentage for the company.",
                        ),
                    ]))),
                    "A list of key companies and their estimated market share percentages.",
                ),
                Field::text_list("keyTrends", "Key trends affecting market share in this sector."),
            ],
            MARKET_SHARE_PROMPT,
        ),
        AnalysisKind::MarketingCost => (
            vec![
                Field::text("campaignName", "The name of the marketing campaign."),
                Field::text(
                    "costData",
                    "The raw cost and performance data for the campaign in JSON format (e.g., budget, spend, clicks, conversions, revenue).",
                ),
            ],
            vec![
                Field::text(
                    "campaignSummary",
                    "A brief summary of the campaign and its performance.",
                ),
                Field::new(
                    "keyMetrics",
                    FieldKind::Record(Schema::new(vec![
                        Field::text("roi", "Return on Investment (ROI) calculated from the data."),
                        Field::text("cpa", "Cost Per Acquisition/Conversion (CPA)."),
                        Field::text(
                            "spendVsBudget",
                            "Analysis of the actual spend versus the allocated budget.",
                        ),
                    ])),
                    "Key cost-efficiency metrics for the campaign.",
                ),
                Field::text_list(
                    "recommendations",
                    "Actionable recommendations to improve campaign efficiency and ROI.",
                ),
            ],
            MARKETING_COST_PROMPT,
        ),
    };

    AnalysisDefinition {
        kind,
        input: Schema::new(input),
        output: Schema::new(output),
        template,
    }
}

const MARKET_ANALYSIS_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are an expert market analyst for a large company.
Your task is to provide a concise but insightful market analysis for the given topic.
Focus on current trends, potential opportunities for a large enterprise, and potential challenges or risks.

Your output must be structured as a detailed analysis paragraph and a list of key takeaways.

Topic to analyze: {{{topic}}}
",
);

const SALES_REPORT_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are an expert sales analyst for a large company.
Your task is to analyze the provided sales data and generate a comprehensive report.
The report should cover the specified time period.

Your analysis should include a summary of performance, key insights (like top-performing products, regional trends, or customer behavior), and actionable recommendations for the sales team.

Time Period: {{{timePeriod}}}
Sales Data (JSON): {{{salesData}}}

Provide a clear and structured report.
",
);

const SUPPLY_CHAIN_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are an expert supply chain analyst providing recommendations for improvement.

Based on the key supply chain metrics and historical data provided, identify potential issues and suggest areas for investigation.
Explain your reasoning for each recommendation.

Key Supply Chain Metrics: {{{metrics}}}
Historical Data: {{{historicalData}}}

Provide your recommendations and reasoning in a structured format.
",
);

const PET_INDUSTRY_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are an expert analyst specializing in the pet industry, with deep knowledge of Royal Canin's business.
Your task is to provide a concise but insightful analysis for the given topic related to the pet industry.
Focus on market size, current trends, consumer behavior, and potential business opportunities for a large enterprise like Royal Canin.

Your output must be structured as a detailed analysis paragraph and a list of key opportunities.

Topic to analyze: {{{topic}}}
",
);

const COMPETITOR_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are an expert competitive intelligence analyst working for Royal Canin.
Your task is to provide a comprehensive analysis of the specified competitor.
Focus on their strengths, weaknesses, likely business strategy, and overall market positioning, especially in relation to the pet food or consumer goods industry.

Your output must be structured with a summary, lists for strengths and weaknesses, and paragraphs for strategy and market positioning.

Competitor to analyze: {{{competitorName}}}
",
);

const MARKET_SHARE_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are an expert market research analyst specializing in market share analysis for Royal Canin.
Your task is to provide a detailed market share breakdown for the given market or industry.
Focus on identifying the key players and estimating their market share percentages.
Also, provide a brief summary of the market and identify key trends impacting the competitive landscape.

Your output must be structured with a market summary, a list of companies with their shares, and a list of key trends.

Market to analyze: {{{market}}}
",
);

const MARKETING_COST_PROMPT: PromptTemplate = PromptTemplate::new(
    "You are an expert marketing analyst for Royal Canin.
Your task is to analyze the provided marketing campaign data and generate a report on its cost-effectiveness.

Your analysis must include:
1. A summary of the campaign.
2. Calculation and interpretation of key metrics like Return on Investment (ROI) and Cost Per Acquisition (CPA).
3. An analysis of the spend versus the budget.
4. Actionable recommendations for optimizing the campaign.

Campaign: {{{campaignName}}}
Data (JSON): {{{costData}}}

Provide a clear, structured report.
",
);
