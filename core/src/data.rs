//! Dashboard dataset, injected behind [`DataProvider`].
//!
//! The analyses only ever see the JSON-bearing fields as opaque strings.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::kind::AnalysisKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Increase,
    Decrease,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCard {
    pub title: String,
    pub value: String,
    pub change: String,
    pub change_type: ChangeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryOrders {
    pub country: String,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub month: String,
    #[serde(rename = "Product A")]
    pub product_a: u64,
    #[serde(rename = "Product B")]
    pub product_b: u64,
}

/// Chart data for the overview page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub kpis: Vec<KpiCard>,
    pub orders_by_country: Vec<CountryOrders>,
    pub inventory_levels: Vec<InventoryLevel>,
}

pub trait DataProvider: Send + Sync {
    fn dashboard(&self) -> DashboardData;
    fn supply_chain_metrics(&self) -> String;
    fn historical_data(&self) -> String;
    fn sales_data(&self) -> String;
    fn marketing_cost_data(&self) -> String;
}

/// Input fields a panel takes from the dataset rather than from the user.
pub fn dataset_fields(kind: AnalysisKind) -> &'static [&'static str] {
    match kind {
        AnalysisKind::SalesReport => &["salesData"],
        AnalysisKind::SupplyChainRecommendations => &["metrics", "historicalData"],
        AnalysisKind::MarketingCost => &["costData"],
        _ => &[],
    }
}

/// Fills dataset-bound fields the caller left out. Supplied values win,
/// including blank ones, so validation still sees what the user sent.
pub fn prefill(kind: AnalysisKind, input: Value, provider: &dyn DataProvider) -> Value {
    let Value::Object(mut record) = input else {
        return input;
    };

    for &field in dataset_fields(kind) {
        let absent = matches!(record.get(field), None | Some(Value::Null));
        if !absent {
            continue;
        }
        let blob = match field {
            "salesData" => provider.sales_data(),
            "metrics" => provider.supply_chain_metrics(),
            "historicalData" => provider.historical_data(),
            "costData" => provider.marketing_cost_data(),
            _ => continue,
        };
        record.insert(field.to_string(), Value::String(blob));
    }
    Value::Object(record)
}

/// The built-in sample dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleDataset;

fn pretty(value: Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

impl DataProvider for SampleDataset {
    fn dashboard(&self) -> DashboardData {
        let kpi = |title: &str, value: &str, change: &str, change_type| KpiCard {
            title: title.into(),
            value: value.into(),
            change: change.into(),
            change_type,
        };
        let orders = |country: &str, count| CountryOrders {
            country: country.into(),
            orders: count,
        };
        let inventory = |month: &str, product_a, product_b| InventoryLevel {
            month: month.into(),
            product_a,
            product_b,
        };

        DashboardData {
            kpis: vec![
                kpi("Total Orders", "12,450", "+12.5%", ChangeType::Increase),
                kpi("Avg. Transit Time", "4.2 days", "-5.2%", ChangeType::Decrease),
                kpi("Warehouses", "8", "Operational", ChangeType::Neutral),
                kpi("On-time Delivery", "97.8%", "+1.1%", ChangeType::Increase),
            ],
            orders_by_country: vec![
                orders("USA", 4200),
                orders("Germany", 2100),
                orders("France", 1850),
                orders("Canada", 1500),
                orders("UK", 1250),
                orders("Japan", 1050),
                orders("Australia", 500),
            ],
            inventory_levels: vec![
                inventory("Jan", 4000, 2400),
                inventory("Feb", 3000, 1398),
                inventory("Mar", 2000, 9800),
                inventory("Apr", 2780, 3908),
                inventory("May", 1890, 4800),
                inventory("Jun", 2390, 3800),
                inventory("Jul", 3490, 4300),
            ],
        }
    }

    fn supply_chain_metrics(&self) -> String {
        pretty(json!({
            "supplierLocations": [
                { "supplier": "Supplier A", "country": "USA", "leadTime": 5 },
                { "supplier": "Supplier B", "country": "China", "leadTime": 20 },
                { "supplier": "Supplier C", "country": "Germany", "leadTime": 7 }
            ],
            "transitTimes": { "average": 4.2, "min": 2, "max": 25, "stdDev": 3.1 },
            "inventoryLevels": { "totalUnits": 45820, "turnoverRatio": 5.8, "stockoutRate": "2.1%" }
        }))
    }

    fn historical_data(&self) -> String {
        pretty(json!({
            "pastPerformance": [
                { "year": 2022, "onTimeDelivery": "96.5%", "totalOrders": 11000 },
                { "year": 2023, "onTimeDelivery": "97.1%", "totalOrders": 11800 }
            ],
            "disruptions": [
                { "date": "2023-04-15", "event": "Port congestion in Shanghai", "impact": "Delayed shipments by 10 days" },
                { "date": "2023-11-20", "event": "Warehouse C temporary shutdown", "impact": "Reduced capacity by 25% for 1 week" }
            ]
        }))
    }

    fn sales_data(&self) -> String {
        pretty(json!([
            { "date": "2024-04-01", "product": "Product A", "units_sold": 150, "revenue": 7500, "region": "USA" },
            { "date": "2024-04-05", "product": "Product B", "units_sold": 100, "revenue": 8000, "region": "Germany" },
            { "date": "2024-04-12", "product": "Product A", "units_sold": 200, "revenue": 10000, "region": "USA" },
            { "date": "2024-05-02", "product": "Product C", "units_sold": 50, "revenue": 4500, "region": "France" },
            { "date": "2024-05-18", "product": "Product B", "units_sold": 120, "revenue": 9600, "region": "USA" },
            { "date": "2024-06-10", "product": "Product A", "units_sold": 180, "revenue": 9000, "region": "UK" },
            { "date": "2024-06-25", "product": "Product C", "units_sold": 80, "revenue": 7200, "region": "Germany" }
        ]))
    }

    fn marketing_cost_data(&self) -> String {
        pretty(json!({
            "campaign": "Summer Pet Health",
            "budget": 20000,
            "channels": [
                { "name": "Social Media", "spend": 8500, "conversions": 150, "revenue": 45000 },
                { "name": "Search Ads", "spend": 7500, "conversions": 120, "revenue": 40000 },
                { "name": "Email Marketing", "spend": 3000, "conversions": 200, "revenue": 55000 }
            ]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn prefill_fills_absent_dataset_fields() {
        let input = json!({ "timePeriod": "Last Quarter" });
        let filled = prefill(AnalysisKind::SalesReport, input, &SampleDataset);
        let sales = filled["salesData"].as_str().unwrap();
        assert!(sales.contains("Product A"));
        assert_eq!(filled["timePeriod"], "Last Quarter");
    }

    #[test]
    fn prefill_never_overwrites_supplied_values() {
        let input = json!({ "campaignName": "Winter", "costData": "{\"budget\": 1}" });
        let filled = prefill(AnalysisKind::MarketingCost, input.clone(), &SampleDataset);
        assert_eq!(filled, input);

        let blank = json!({ "campaignName": "Winter", "costData": "" });
        let filled = prefill(AnalysisKind::MarketingCost, blank.clone(), &SampleDataset);
        assert_eq!(filled, blank);
    }

    #[test]
    fn prefill_leaves_user_only_kinds_alone() {
        let input = json!({});
        assert_eq!(prefill(AnalysisKind::MarketAnalysis, input.clone(), &SampleDataset), input);
    }

    #[test]
    fn dataset_fields_exist_in_input_schemas() {
        for kind in AnalysisKind::ALL {
            let def = Registry::global().lookup(kind).unwrap();
            for field in dataset_fields(kind) {
                assert!(def.input.field(field).is_some(), "{} has no field {}", kind, field);
            }
        }
    }

    #[test]
    fn sample_blobs_are_valid_json() {
        let data = SampleDataset;
        for blob in [
            data.supply_chain_metrics(),
            data.historical_data(),
            data.sales_data(),
            data.marketing_cost_data(),
        ] {
            serde_json::from_str::<Value>(&blob).unwrap();
        }
        assert_eq!(data.dashboard().kpis.len(), 4);
    }
}
