use std::path::{Path, PathBuf};

use plotters::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::models::{CategoryRevenue, MonthlyRevenue, SalesRecord};
use crate::report::{monthly_revenue, qty_amount_points, revenue_by_category};

/// An image written by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    pub title: &'static str,
    pub path: PathBuf,
}

pub trait ChartRenderer {
    fn render(&self, table: &[SalesRecord]) -> anyhow::Result<Vec<ImageArtifact>>;
}

/// Draws the three descriptive charts as PNG files with plotters.
pub struct PngChartRenderer {
    pub out_dir: PathBuf,
    pub date_formats: Vec<String>,
}

impl PngChartRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, date_formats: Vec<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            date_formats,
        }
    }

    fn artifact(&self, title: &'static str, file_name: &str) -> ImageArtifact {
        ImageArtifact {
            title,
            path: self.out_dir.join(file_name),
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(&self, table: &[SalesRecord]) -> anyhow::Result<Vec<ImageArtifact>> {
        let formats: Vec<&str> = self.date_formats.iter().map(String::as_str).collect();

        // Collect every series first so a bad date fails before any file is written.
        let categories = revenue_by_category(table)?;
        let points = qty_amount_points(table);
        let months = monthly_revenue(table, &formats)?;

        std::fs::create_dir_all(&self.out_dir)?;

        let by_category = self.artifact("Revenue by Category", "revenue_by_category.png");
        draw_category_bars(&categories, &by_category.path, by_category.title)?;

        let correlation = self.artifact(
            "Quantity vs Amount",
            "qty_amount_correlation.png",
        );
        draw_scatter(&points, &correlation.path, correlation.title)?;

        let monthly = self.artifact("Monthly Sales", "monthly_sales.png");
        draw_monthly_line(&months, &monthly.path, monthly.title)?;

        let artifacts = vec![by_category, correlation, monthly];
        for artifact in &artifacts {
            info!(path = %artifact.path.display(), "chart saved");
        }
        Ok(artifacts)
    }
}

fn draw_category_bars(
    categories: &[CategoryRevenue],
    output_path: &Path,
    title: &str,
) -> anyhow::Result<()> {
    let values: Vec<f64> = categories
        .iter()
        .map(|c| c.revenue.to_f64().unwrap_or(0.0))
        .collect();
    let max_value = values.iter().cloned().fold(0.0, f64::max).max(1.0);
    let bar_count = (categories.len() as u32).max(1);

    let root = BitMapBackend::new(output_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..bar_count).into_segmented(), 0.0..max_value * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len().max(1))
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(index) => categories
                .get(*index as usize)
                .map(|c| c.category.clone())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_desc("Category")
        .y_desc("Total revenue")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.6).filled())
            .margin(8)
            .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
    )?;

    root.present()?;
    Ok(())
}

fn draw_scatter(points: &[(f64, f64)], output_path: &Path, title: &str) -> anyhow::Result<()> {
    let qty_max = points.iter().map(|p| p.0).fold(0.0, f64::max).max(1.0);
    let amount_max = points.iter().map(|p| p.1).fold(0.0, f64::max).max(1.0);

    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..qty_max * 1.05, 0.0..amount_max * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("Quantity sold")
        .y_desc("Amount")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(qty, amount)| Circle::new((qty, amount), 3, BLUE.mix(0.7).filled())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_monthly_line(
    months: &[MonthlyRevenue],
    output_path: &Path,
    title: &str,
) -> anyhow::Result<()> {
    let series: Vec<(u32, f64)> = months
        .iter()
        .enumerate()
        .map(|(i, m)| (i as u32, m.revenue.to_f64().unwrap_or(0.0)))
        .collect();
    let max_value = series.iter().map(|p| p.1).fold(0.0, f64::max).max(1.0);
    let last_index = (months.len() as u32).saturating_sub(1).max(1);

    let root = BitMapBackend::new(output_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0u32..last_index, 0.0..max_value * 1.1)?;

    chart
        .configure_mesh()
        .x_labels(months.len().max(1))
        .x_label_formatter(&|index| {
            months
                .get(*index as usize)
                .map(|m| m.month.clone())
                .unwrap_or_default()
        })
        .x_desc("Month")
        .y_desc("Total revenue")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(LineSeries::new(series.iter().cloned(), &RED))?;
    chart.draw_series(
        series
            .iter()
            .map(|&point| Circle::new(point, 4, RED.filled())),
    )?;

    root.present()?;
    Ok(())
}
