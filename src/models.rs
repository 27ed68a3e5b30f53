use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// `GET /auth/status`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthStatus {
    pub logged_in: bool,
}

/// `GET /integrations/google/status`
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationStatus {
    #[serde(default)]
    pub connected: bool,
}

/// `POST /reviews/sync`. Only newly stored reviews are counted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewSync {
    #[serde(default)]
    pub inserted: u64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Verbatim response of the file analysis endpoint. The client never looks
/// inside it; it is only handed to the dashboard route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub Value);

impl AnalysisResult {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub store_id: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportQuery {
    pub fn new(store_id: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            from: None,
            to: None,
        }
    }

    pub fn with_period(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn period_label(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{} ~ {}", from, to),
            _ => "entire period".to_string(),
        }
    }

    /// Query parameters in the order the backend documents them. Unset bounds
    /// are omitted rather than sent empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("store_id", self.store_id.clone())];
        if let Some(from) = self.from {
            pairs.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExecutiveSummary {
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Sentiment {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Kpi {
    pub sentiment: Sentiment,
    pub nps: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoredLabel {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategicInsight {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChurnRisk {
    #[serde(alias = "low", alias = "Low")]
    Low,
    #[serde(alias = "medium", alias = "Medium")]
    Medium,
    #[serde(alias = "high", alias = "High")]
    High,
}

impl ChurnRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChurnRisk::Low => "LOW",
            ChurnRisk::Medium => "MEDIUM",
            ChurnRisk::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlannedAction {
    pub area: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RiskAndActionPlan {
    pub churn_risk: ChurnRisk,
    #[serde(default)]
    pub actions: Vec<PlannedAction>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CxReport {
    pub executive_summary: ExecutiveSummary,
    pub rating: f64,
    pub kpi: Kpi,
    #[serde(default)]
    pub drivers_of_satisfaction: Vec<ScoredLabel>,
    #[serde(default)]
    pub areas_for_improvement: Vec<ScoredLabel>,
    #[serde(default)]
    pub strategic_insights: Vec<StrategicInsight>,
    pub risk_and_action_plan: RiskAndActionPlan,
    #[serde(default)]
    pub total: Option<u64>,
}

impl CxReport {
    pub fn nps_band(&self) -> NpsBand {
        NpsBand::from_score(self.kpi.nps)
    }

    pub fn stars(&self) -> RatingStars {
        RatingStars::from_rating(self.rating)
    }
}

/// Decoded `/analysis/cx-analysis` response.
#[derive(Debug, Clone, PartialEq)]
pub enum CxAnalysis {
    /// No reviews fell inside the requested period.
    Empty,
    Report(Box<CxReport>),
}

impl CxAnalysis {
    pub fn from_value(value: Value) -> Result<Self, AppError> {
        let total = value.get("total").and_then(Value::as_u64);
        let is_empty_object = value.as_object().map_or(false, |obj| obj.is_empty());

        if total == Some(0) || is_empty_object {
            return Ok(CxAnalysis::Empty);
        }

        let report: CxReport = serde_json::from_value(value)?;
        Ok(CxAnalysis::Report(Box::new(report)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NpsBand {
    Promoters,
    Passives,
    Detractors,
}

impl NpsBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            NpsBand::Promoters
        } else if score >= 7.0 {
            NpsBand::Passives
        } else {
            NpsBand::Detractors
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NpsBand::Promoters => "Promoters",
            NpsBand::Passives => "Passives",
            NpsBand::Detractors => "Detractors",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingStars {
    pub full: u8,
    pub half: bool,
}

impl RatingStars {
    pub fn from_rating(rating: f64) -> Self {
        let rating = rating.clamp(0.0, 5.0);
        let full = rating.floor();
        Self {
            full: full as u8,
            half: full < 5.0 && rating - full >= 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrendUnit {
    #[default]
    Day,
    Month,
}

impl TrendUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendUnit::Day => "day",
            TrendUnit::Month => "month",
        }
    }
}

/// One bucket of `/dashboard/rating-trend`. `date` is `YYYY-MM-DD` for daily
/// buckets and `YYYY-MM` for monthly ones.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub avg_rating: f64,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub highlight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_report() -> Value {
        json!({
            "executive_summary": { "summary": "Guests love the coffee." },
            "rating": 4.3,
            "kpi": {
                "sentiment": { "positive": 71.0, "neutral": 19.0, "negative": 10.0 },
                "nps": 8.0
            },
            "drivers_of_satisfaction": [{ "label": "Coffee", "value": 62.0 }],
            "areas_for_improvement": [{ "label": "Wait time", "value": 35.0 }],
            "strategic_insights": [{ "title": "Peak hours", "description": "Add staff." }],
            "risk_and_action_plan": {
                "churn_risk": "MEDIUM",
                "actions": [{ "area": "Service", "action": "Second register" }]
            },
            "total": 42
        })
    }

    #[test]
    fn zero_total_is_the_empty_state() {
        assert_eq!(CxAnalysis::from_value(json!({ "total": 0 })).unwrap(), CxAnalysis::Empty);
        assert_eq!(CxAnalysis::from_value(json!({})).unwrap(), CxAnalysis::Empty);
    }

    #[test]
    fn decodes_full_report() {
        let analysis = CxAnalysis::from_value(full_report()).unwrap();
        let CxAnalysis::Report(report) = analysis else {
            panic!("expected a report");
        };
        assert_eq!(report.total, Some(42));
        assert_eq!(report.risk_and_action_plan.churn_risk, ChurnRisk::Medium);
        assert_eq!(report.nps_band(), NpsBand::Passives);
        assert_eq!(report.drivers_of_satisfaction[0].label, "Coffee");
    }

    #[test]
    fn unknown_churn_risk_is_an_error() {
        let mut value = full_report();
        value["risk_and_action_plan"]["churn_risk"] = json!("SEVERE");
        assert!(matches!(
            CxAnalysis::from_value(value),
            Err(AppError::ParseError(_))
        ));
    }

    #[test]
    fn nps_bands() {
        assert_eq!(NpsBand::from_score(9.0), NpsBand::Promoters);
        assert_eq!(NpsBand::from_score(7.5), NpsBand::Passives);
        assert_eq!(NpsBand::from_score(6.9), NpsBand::Detractors);
    }

    #[test]
    fn half_star_from_fraction() {
        assert_eq!(RatingStars::from_rating(4.5), RatingStars { full: 4, half: true });
        assert_eq!(RatingStars::from_rating(4.4), RatingStars { full: 4, half: false });
        assert_eq!(RatingStars::from_rating(5.0), RatingStars { full: 5, half: false });
    }

    #[test]
    fn period_label_needs_both_bounds() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 1);
        let to = NaiveDate::from_ymd_opt(2025, 3, 31);

        let query = ReportQuery::new("store-1").with_period(from, to);
        assert_eq!(query.period_label(), "2025-01-01 ~ 2025-03-31");
        assert_eq!(
            query.query_pairs(),
            vec![
                ("store_id", "store-1".to_string()),
                ("from", "2025-01-01".to_string()),
                ("to", "2025-03-31".to_string()),
            ]
        );

        let open = ReportQuery::new("store-1").with_period(from, None);
        assert_eq!(open.period_label(), "entire period");
        assert_eq!(open.query_pairs().len(), 2);
    }

    #[test]
    fn trend_point_defaults_optional_fields() {
        let point: TrendPoint =
            serde_json::from_value(json!({ "date": "2025-01", "avg_rating": 4.12 })).unwrap();
        assert!(!point.highlight);
        assert_eq!(point.review_count, 0);
    }
}
