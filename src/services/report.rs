use tracing::{info, warn};

use crate::clients::BackendClient;
use crate::error::AppError;
use crate::models::{CxAnalysis, CxReport, ReportQuery, TrendPoint, TrendUnit};

/// What the CX report page shows once loading finishes.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportView {
    /// Successful response with zero reviews. Carries no chart data.
    NoReviews { period: String },
    Report {
        report: Box<CxReport>,
        trend: Vec<TrendPoint>,
        unit: TrendUnit,
        period: String,
    },
}

impl ReportView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ReportView::NoReviews { .. })
    }

    pub fn trend(&self) -> &[TrendPoint] {
        match self {
            ReportView::NoReviews { .. } => &[],
            ReportView::Report { trend, .. } => trend,
        }
    }
}

/// Fetches the CX report and, only when it has reviews, the rating trend.
/// A failed trend fetch degrades to an empty chart instead of failing the
/// whole report.
pub async fn load_report(
    client: &BackendClient,
    query: &ReportQuery,
    unit: TrendUnit,
) -> Result<ReportView, AppError> {
    let period = query.period_label();
    info!("Loading CX report for store {} ({})", query.store_id, period);

    let report = match client.cx_analysis(query).await? {
        CxAnalysis::Empty => {
            info!("No reviews for store {} in {}", query.store_id, period);
            return Ok(ReportView::NoReviews { period });
        }
        CxAnalysis::Report(report) => report,
    };

    let trend = load_trend(client, query, unit).await;

    Ok(ReportView::Report {
        report,
        trend,
        unit,
        period,
    })
}

pub async fn load_trend(client: &BackendClient, query: &ReportQuery, unit: TrendUnit) -> Vec<TrendPoint> {
    match client.rating_trend(query, unit).await {
        Ok(points) => points,
        Err(e) => {
            warn!("Rating trend fetch failed for store {}: {}", query.store_id, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn empty_view_has_no_chart_data() {
        let view = ReportView::NoReviews {
            period: "entire period".to_string(),
        };
        assert!(view.is_empty());
        assert!(view.trend().is_empty());
    }

    #[tokio::test]
    async fn trend_failure_degrades_to_empty() {
        let config = Config::default().with_api_url("http://127.0.0.1:1");
        let client = BackendClient::new(&config).unwrap();

        let points = load_trend(&client, &ReportQuery::new("store-1"), TrendUnit::Month).await;
        assert!(points.is_empty());
    }
}
