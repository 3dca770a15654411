//! SVG summary of a meal-to-waste forecast
//!
//! Four bar panels: input composition, predicted waste split, predicted
//! receipts, and waste per customer against a reference line.

use crate::data::{MealComposition, MEAL_FEATURES};
use crate::error::Result;
use crate::pipelines::WasteForecast;
use askama::Template;

/// MIME type of [`RenderedImage::bytes`]
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

const WIDTH: u32 = 800;
const HEIGHT: u32 = 640;
const PANEL_WIDTH: f64 = 360.0;
const PANEL_HEIGHT: f64 = 260.0;
const PLOT_LEFT: f64 = 20.0;
const PLOT_RIGHT: f64 = 340.0;
const PLOT_TOP: f64 = 48.0;
const PLOT_BOTTOM: f64 = 226.0;
const PALETTE: [&str; 5] = ["#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3"];

/// Encoded image with its MIME type
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedImage {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Everything drawn on the summary
#[derive(Debug, Clone, PartialEq)]
pub struct WasteSummary {
    pub date: String,
    pub composition: MealComposition,
    pub waste: WasteForecast,
    pub receipts: i64,
    pub per_customer_grams: f64,
    pub threshold_grams: f64,
}

struct Bar {
    x: String,
    y: String,
    width: String,
    height: String,
    center: String,
    value_y: String,
    color: &'static str,
    value: String,
    label: String,
}

struct Threshold {
    y: String,
    label_y: String,
    label: String,
}

struct Panel {
    x: u32,
    y: u32,
    title: String,
    bars: Vec<Bar>,
    thresholds: Vec<Threshold>,
}

#[derive(Template)]
#[template(path = "waste_summary.svg")]
struct WasteSummaryTemplate {
    width: u32,
    height: u32,
    title: String,
    title_x: u32,
    panels: Vec<Panel>,
    panel_width: f64,
    panel_height: f64,
    title_x_in_panel: f64,
    plot_left: f64,
    plot_right: f64,
    plot_bottom: f64,
    label_y: f64,
}

/// (label, height, text above the bar)
type BarSpec = (String, f64, String);

fn panel(x: u32, y: u32, title: &str, specs: Vec<BarSpec>, threshold: Option<f64>) -> Panel {
    let peak = specs
        .iter()
        .map(|(_, value, _)| *value)
        .chain(threshold)
        .fold(0.0_f64, f64::max);
    let top = if peak > 0.0 { peak * 1.15 } else { 1.0 };
    let scale = (PLOT_BOTTOM - PLOT_TOP) / top;

    let slot = (PLOT_RIGHT - PLOT_LEFT) / specs.len().max(1) as f64;
    let bars = specs
        .into_iter()
        .enumerate()
        .map(|(i, (label, value, text))| {
            let height = value.max(0.0) * scale;
            let left = PLOT_LEFT + i as f64 * slot + slot * 0.2;
            let bar_top = PLOT_BOTTOM - height;
            Bar {
                x: format!("{:.1}", left),
                y: format!("{:.1}", bar_top),
                width: format!("{:.1}", slot * 0.6),
                height: format!("{:.1}", height),
                center: format!("{:.1}", left + slot * 0.3),
                value_y: format!("{:.1}", bar_top - 4.0),
                color: PALETTE[i % PALETTE.len()],
                value: text,
                label,
            }
        })
        .collect();

    let thresholds = threshold
        .map(|grams| {
            let line_y = PLOT_BOTTOM - grams.max(0.0) * scale;
            Threshold {
                y: format!("{:.1}", line_y),
                label_y: format!("{:.1}", line_y - 4.0),
                label: format!("{:.0} g", grams),
            }
        })
        .into_iter()
        .collect();

    Panel {
        x,
        y,
        title: title.to_string(),
        bars,
        thresholds,
    }
}

/// Render the summary as a standalone SVG document
pub fn render_waste_summary(summary: &WasteSummary) -> Result<RenderedImage> {
    let meals = MEAL_FEATURES
        .iter()
        .zip(summary.composition.to_features())
        .map(|(name, count)| (name.to_string(), count, format!("{}", count.trunc() as i64)))
        .collect();

    let waste = vec![
        (
            "Customer".to_string(),
            summary.waste.customer,
            format!("{:.2}", summary.waste.customer),
        ),
        (
            "Kitchen".to_string(),
            summary.waste.kitchen,
            format!("{:.2}", summary.waste.kitchen),
        ),
    ];

    let receipts = vec![(
        "Num. receipts".to_string(),
        summary.receipts as f64,
        summary.receipts.to_string(),
    )];

    let per_customer = vec![(
        "Amount".to_string(),
        summary.per_customer_grams,
        format!("{:.2}", summary.per_customer_grams),
    )];

    let template = WasteSummaryTemplate {
        width: WIDTH,
        height: HEIGHT,
        title: format!("Forecast in date: {}", summary.date),
        title_x: WIDTH / 2,
        panels: vec![
            panel(30, 50, "Input: number of meals per type", meals, None),
            panel(410, 50, "Predicted amount of waste per type", waste, None),
            panel(30, 350, "Forecasted number of receipts (POS)", receipts, None),
            panel(
                410,
                350,
                "Amnt. waste per customer (in gram)",
                per_customer,
                Some(summary.threshold_grams),
            ),
        ],
        panel_width: PANEL_WIDTH,
        panel_height: PANEL_HEIGHT,
        title_x_in_panel: PANEL_WIDTH / 2.0,
        plot_left: PLOT_LEFT,
        plot_right: PLOT_RIGHT,
        plot_bottom: PLOT_BOTTOM,
        label_y: PLOT_BOTTOM + 16.0,
    };

    Ok(RenderedImage {
        content_type: SVG_CONTENT_TYPE,
        bytes: template.render()?.into_bytes(),
    })
}
