use cx_dashboard::models::{TrendPoint, TrendUnit};
use cx_dashboard::services::ingest::ParseSummary;
use cx_dashboard::services::report::ReportView;

pub fn print_summary(summary: &ParseSummary, rows: usize) {
    println!("File: {}", summary.file_name);
    println!("Rows: {}", summary.row_count);
    println!("Columns: {}", summary.columns.join(", "));
    println!("Reviews detected: {}", summary.reviews_detected);

    if summary.preview.is_empty() || rows == 0 {
        return;
    }

    println!();
    println!("{}", summary.columns.join("\t"));
    for row in summary.preview.iter().take(rows) {
        println!("{}", row.values().join("\t"));
    }
}

pub fn print_report(view: &ReportView) {
    let (report, trend, unit, period) = match view {
        ReportView::NoReviews { period } => {
            println!("No reviews in period ({})", period);
            return;
        }
        ReportView::Report {
            report,
            trend,
            unit,
            period,
        } => (report, trend, *unit, period),
    };

    let stars = report.stars();
    println!("CX STRATEGIC REPORT ({})", period);
    println!();
    println!("Executive summary: {}", report.executive_summary.summary);
    println!(
        "Overall rating: {:.1} ({}{})",
        report.rating,
        "★".repeat(stars.full as usize),
        if stars.half { "½" } else { "" }
    );

    let sentiment = &report.kpi.sentiment;
    println!(
        "Sentiment: positive {}% / neutral {}% / negative {}%",
        sentiment.positive, sentiment.neutral, sentiment.negative
    );
    println!("NPS: {} ({})", report.kpi.nps, report.nps_band().label());

    println!();
    println!("Key drivers of satisfaction:");
    for item in &report.drivers_of_satisfaction {
        println!("  {:<30} {:>5}%", item.label, item.value);
    }
    println!("Areas for improvement:");
    for item in &report.areas_for_improvement {
        println!("  {:<30} {:>5}%", item.label, item.value);
    }

    println!();
    println!("Strategic insights:");
    for insight in &report.strategic_insights {
        println!("  - {}: {}", insight.title, insight.description);
    }

    let plan = &report.risk_and_action_plan;
    println!();
    println!("Churn risk: {}", plan.churn_risk.as_str());
    for (idx, action) in plan.actions.iter().enumerate() {
        println!("  {}. [{}] {}", idx + 1, action.area, action.action);
    }

    println!();
    print_trend(trend, unit);
}

pub fn print_trend(points: &[TrendPoint], unit: TrendUnit) {
    if points.is_empty() {
        println!("No rating trend data ({})", unit.as_str());
        return;
    }

    println!("Rating trend by {}:", unit.as_str());
    for point in points {
        // * marks a sharp change from the previous bucket
        println!(
            "  {} {:.2} ({} reviews){}",
            point.date,
            point.avg_rating,
            point.review_count,
            if point.highlight { " *" } else { "" }
        );
    }
}
