use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;

use cx_dashboard::clients::BackendClient;
use cx_dashboard::models::{ReportQuery, TrendUnit};
use cx_dashboard::pages::{CxReportPage, PageContext, StoreDetailPage, UploadPage};
use cx_dashboard::services::ingest::{IngestPipeline, PREVIEW_SIZE};
use cx_dashboard::services::{History, Route, SessionGuard, SessionState};
use cx_dashboard::{AppError, Config};

use crate::output;
use crate::Commands;

pub async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Status => status(&config).await,
        Commands::Preview { file, rows } => preview(&config, &file, rows).await,
        Commands::Analyze { file, output } => analyze(config, &file, output.as_deref()).await,
        Commands::Report {
            store_id,
            from,
            to,
            unit,
        } => {
            let query = ReportQuery::new(store_id).with_period(from, to);
            report(config, query, unit).await
        }
        Commands::Sync { store_id } => sync(config, store_id).await,
        Commands::Trend {
            store_id,
            unit,
            from,
            to,
        } => {
            let query = ReportQuery::new(store_id).with_period(from, to);
            let client = BackendClient::new(&config)?;
            require_login(&client).await?;
            let points = client.rating_trend(&query, unit).await?;
            output::print_trend(&points, unit);
            Ok(())
        }
        Commands::Logout => {
            let client = BackendClient::new(&config)?;
            let history = History::new(Route::Home);
            SessionGuard::new(client)
                .logout(&history, std::time::Duration::ZERO)
                .await;
            println!("logged out");
            Ok(())
        }
    }
}

async fn require_login(client: &BackendClient) -> Result<()> {
    match SessionGuard::new(client.clone()).check_session().await {
        SessionState::Authenticated => Ok(()),
        _ => Err(AppError::Unauthenticated.into()),
    }
}

async fn read_file(path: &Path) -> Result<(String, Bytes)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("{} has no usable file name", path.display()))?
        .to_string();
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((name, Bytes::from(data)))
}

async fn status(config: &Config) -> Result<()> {
    let client = BackendClient::new(config)?;
    match SessionGuard::new(client).check_session().await {
        SessionState::Authenticated => println!("logged in"),
        _ => println!("not logged in"),
    }
    Ok(())
}

async fn preview(config: &Config, path: &Path, rows: usize) -> Result<()> {
    let (name, data) = read_file(path).await?;
    let pipeline = IngestPipeline::new(config.max_file_size);

    let summary = pipeline
        .select_file(&name, data)
        .await
        .map_err(|e| anyhow!("{}: {}", e.user_message(), e))?;

    output::print_summary(&summary, rows.min(PREVIEW_SIZE));
    Ok(())
}

async fn analyze(config: Config, path: &Path, output_path: Option<&Path>) -> Result<()> {
    let (name, data) = read_file(path).await?;

    let history = Arc::new(History::new(Route::Upload));
    let ctx = PageContext::new(config, history.clone())?;
    let page = UploadPage::new(ctx);

    if !page.mount().await.is_authenticated() {
        return Err(AppError::Unauthenticated.into());
    }

    let summary = page
        .select_file(&name, data)
        .await
        .map_err(|e| anyhow!("{}: {}", e.user_message(), e))?;
    eprintln!("{}: {} rows", summary.file_name, summary.row_count);
    if summary.row_count == 0 {
        return Err(AppError::EmptyFile.into());
    }

    page.analyze()
        .await
        .map_err(|e| anyhow!("{}: {}", e.user_message(), e))?;

    let Some(Route::Dashboard(Some(result))) = history.current() else {
        return Err(anyhow!("analysis finished without a result"));
    };

    let json = serde_json::to_string_pretty(result.as_value())?;
    match output_path {
        Some(out) => {
            tokio::fs::write(out, json)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!("result written to {}", out.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn report(config: Config, query: ReportQuery, unit: TrendUnit) -> Result<()> {
    let history = Arc::new(History::new(Route::CxReport(query.clone())));
    let ctx = PageContext::new(config, history)?;
    let page = CxReportPage::new(ctx, Some(query));

    if !page.mount().await.is_authenticated() {
        return Err(AppError::Unauthenticated.into());
    }
    page.set_unit(unit).await?;

    match page.load().await? {
        Some(view) => output::print_report(&view),
        None => println!("no store selected"),
    }
    Ok(())
}

async fn sync(config: Config, store_id: String) -> Result<()> {
    let history = Arc::new(History::new(Route::StoreDetail(store_id.clone())));
    let ctx = PageContext::new(config, history)?;
    let page = StoreDetailPage::new(ctx, store_id);

    if !page.mount().await.is_authenticated() {
        return Err(AppError::Unauthenticated.into());
    }
    let inserted = page
        .sync_reviews()
        .await
        .with_context(|| format!("syncing reviews for store {}", page.store_id()))?;
    println!("{} new reviews stored", inserted);
    Ok(())
}
