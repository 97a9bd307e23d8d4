//! Vega-Lite v5 specifications for each chart.
//!
//! Every chart carries its data inline, so a spec can be dropped into any
//! Vega-Lite renderer on its own.

use super::Writer;
use super::treemap::{self, Rect};
use crate::config::DashboardSettings;
use crate::dashboard::types::{
    BoxSummary, ChartData, ChartKind, ChartSpec, CorrelationMatrix, HistogramBin, LabelValue,
    Page, StackedValue, TimePoint, TreeNode,
};
use crate::error::{EdaError, Result};
use serde_json::{Value, json};

pub const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

pub struct VegaLiteWriter {
    schema: String,
    width: u32,
    height: u32,
    donut_hole: f64,
}

impl Default for VegaLiteWriter {
    fn default() -> Self {
        Self::new(&DashboardSettings::default())
    }
}

impl VegaLiteWriter {
    pub fn new(settings: &DashboardSettings) -> Self {
        Self {
            schema: SCHEMA.to_owned(),
            width: settings.chart_width,
            height: settings.chart_height,
            donut_hole: settings.donut_hole,
        }
    }

    /// Full Vega-Lite spec for one chart.
    pub fn chart(&self, chart: &ChartSpec) -> Result<Value> {
        let mut spec = json!({
            "$schema": self.schema,
            "title": chart.title,
            "width": self.width,
            "height": self.height,
        });

        let body = match (&chart.kind, &chart.data) {
            (ChartKind::Bar, ChartData::Categories(values)) => self.bar(chart, values),
            (ChartKind::Pie | ChartKind::Donut, ChartData::Categories(values)) => {
                self.arc(chart, values)
            }
            (ChartKind::Histogram, ChartData::Histogram(bins)) => self.histogram(chart, bins),
            (ChartKind::Line, ChartData::TimeSeries(points)) => self.line(chart, points),
            (ChartKind::Box, ChartData::Boxes(boxes)) => self.boxplot(chart, boxes),
            (ChartKind::StackedBar, ChartData::Stacked(values)) => self.stacked(chart, values),
            (ChartKind::Treemap, ChartData::Hierarchy(nodes)) => self.treemap(chart, nodes),
            (ChartKind::Heatmap, ChartData::Matrix(matrix)) => self.heatmap(chart, matrix),
            (kind, data) => {
                return Err(EdaError::Render(format!(
                    "{:?} chart cannot show {} data",
                    kind,
                    data_name(data)
                )));
            }
        };

        if let (Some(target), Value::Object(extra)) = (spec.as_object_mut(), body) {
            target.extend(extra);
        }
        Ok(spec)
    }

    fn axis_title(label: Option<&String>, fallback: &str) -> Value {
        json!(label.map_or(fallback, String::as_str))
    }

    fn color(chart: &ChartSpec, field: &str) -> Value {
        let mut color = json!({ "field": field, "type": "nominal" });
        if let Some(scheme) = &chart.options.color_scheme {
            color["scale"] = json!({ "scheme": scheme });
        }
        color
    }

    fn bar(&self, chart: &ChartSpec, values: &[LabelValue]) -> Value {
        let x_title = Self::axis_title(chart.x_label.as_ref(), "label");
        let y_title = Self::axis_title(chart.y_label.as_ref(), "value");

        let mut encoding = json!({
            "x": { "field": "label", "type": "nominal", "sort": null, "title": x_title },
            "y": { "field": "value", "type": "quantitative", "title": y_title },
        });
        if chart.options.color_by_label {
            encoding["color"] = Self::color(chart, "label");
            encoding["color"]["legend"] = Value::Null;
        }

        let mut layers = vec![json!({ "mark": "bar", "encoding": encoding })];
        if chart.options.value_labels {
            layers.push(json!({
                "mark": { "type": "text", "dy": -6 },
                "encoding": {
                    "x": { "field": "label", "type": "nominal", "sort": null },
                    "y": { "field": "value", "type": "quantitative" },
                    "text": { "field": "value", "type": "quantitative", "format": ",.0f" },
                },
            }));
        }

        json!({
            "data": { "values": values },
            "layer": layers,
        })
    }

    fn arc(&self, chart: &ChartSpec, values: &[LabelValue]) -> Value {
        let outer = f64::from(self.width.min(self.height)) / 2.0;
        let mut mark = json!({ "type": "arc", "outerRadius": outer });
        if chart.kind == ChartKind::Donut {
            let hole = chart.options.hole.unwrap_or(self.donut_hole);
            mark["innerRadius"] = json!(outer * hole);
        }

        json!({
            "data": { "values": values },
            "mark": mark,
            "encoding": {
                "theta": { "field": "value", "type": "quantitative", "stack": true },
                "color": Self::color(chart, "label"),
                "tooltip": [
                    { "field": "label", "type": "nominal" },
                    { "field": "value", "type": "quantitative", "format": ",.2f" },
                ],
            },
            "view": { "stroke": null },
        })
    }

    fn histogram(&self, chart: &ChartSpec, bins: &[HistogramBin]) -> Value {
        json!({
            "data": { "values": bins },
            "mark": "bar",
            "encoding": {
                "x": {
                    "field": "start",
                    "type": "quantitative",
                    "bin": "binned",
                    "title": Self::axis_title(chart.x_label.as_ref(), "value"),
                },
                "x2": { "field": "end" },
                "y": {
                    "field": "count",
                    "type": "quantitative",
                    "title": Self::axis_title(chart.y_label.as_ref(), "count"),
                },
            },
        })
    }

    fn line(&self, chart: &ChartSpec, points: &[TimePoint]) -> Value {
        let values: Vec<Value> = points
            .iter()
            .map(|p| json!({ "period": p.period.format("%Y-%m-%d").to_string(), "value": p.value }))
            .collect();

        json!({
            "data": { "values": values },
            "mark": { "type": "line", "point": chart.options.markers },
            "encoding": {
                "x": {
                    "field": "period",
                    "type": "temporal",
                    "timeUnit": "yearmonth",
                    "title": Self::axis_title(chart.x_label.as_ref(), "period"),
                },
                "y": {
                    "field": "value",
                    "type": "quantitative",
                    "title": Self::axis_title(chart.y_label.as_ref(), "value"),
                },
            },
        })
    }

    /// Box plots from precomputed summaries: whisker rule, IQR bar, median
    /// tick and, optionally, outlier points.
    fn boxplot(&self, chart: &ChartSpec, boxes: &[BoxSummary]) -> Value {
        let x = json!({
            "field": "label",
            "type": "nominal",
            "sort": null,
            "title": Self::axis_title(chart.x_label.as_ref(), "group"),
        });
        let y_title = Self::axis_title(chart.y_label.as_ref(), "value");

        let mut iqr_encoding = json!({
            "x": x,
            "y": { "field": "q1", "type": "quantitative", "title": y_title },
            "y2": { "field": "q3" },
        });
        if chart.options.color_by_label {
            iqr_encoding["color"] = Self::color(chart, "label");
            iqr_encoding["color"]["legend"] = Value::Null;
        }

        let mut layers = vec![
            json!({
                "mark": "rule",
                "encoding": {
                    "x": x,
                    "y": { "field": "lower_whisker", "type": "quantitative", "title": y_title },
                    "y2": { "field": "upper_whisker" },
                },
            }),
            json!({ "mark": { "type": "bar", "size": 28 }, "encoding": iqr_encoding }),
            json!({
                "mark": { "type": "tick", "color": "white", "size": 28 },
                "encoding": {
                    "x": x,
                    "y": { "field": "median", "type": "quantitative" },
                },
            }),
        ];

        if chart.options.show_outliers {
            let outliers: Vec<Value> = boxes
                .iter()
                .flat_map(|b| {
                    b.outliers
                        .iter()
                        .map(|v| json!({ "label": b.label, "value": v }))
                })
                .collect();
            layers.push(json!({
                "data": { "values": outliers },
                "mark": { "type": "point", "filled": true },
                "encoding": {
                    "x": x,
                    "y": { "field": "value", "type": "quantitative" },
                },
            }));
        }

        json!({
            "data": { "values": boxes },
            "layer": layers,
        })
    }

    fn stacked(&self, chart: &ChartSpec, values: &[StackedValue]) -> Value {
        let value_axis = json!({
            "field": "value",
            "type": "quantitative",
            "stack": "zero",
            "title": Self::axis_title(
                if chart.options.horizontal { chart.x_label.as_ref() } else { chart.y_label.as_ref() },
                "value",
            ),
        });
        let category_axis = json!({
            "field": "category",
            "type": "nominal",
            "title": Self::axis_title(
                if chart.options.horizontal { chart.y_label.as_ref() } else { chart.x_label.as_ref() },
                "category",
            ),
        });

        let (x, y) = if chart.options.horizontal {
            (value_axis, category_axis)
        } else {
            (category_axis, value_axis)
        };

        json!({
            "data": { "values": values },
            "mark": "bar",
            "encoding": {
                "x": x,
                "y": y,
                "color": Self::color(chart, "group"),
            },
        })
    }

    fn treemap(&self, chart: &ChartSpec, nodes: &[TreeNode]) -> Value {
        let bounds = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        let tiles = treemap::layout(nodes, bounds);
        let nested = tiles.iter().any(|t| t.depth > 0);

        // Leaves are what gets drawn; roots only frame them
        let values: Vec<Value> = tiles
            .iter()
            .filter(|t| !nested || t.depth > 0)
            .map(|t| {
                json!({
                    "id": t.id,
                    "parent": t.parent,
                    "label": t.label,
                    "value": t.value,
                    "x": t.rect.x,
                    "x2": t.rect.x + t.rect.w,
                    "y": t.rect.y,
                    "y2": t.rect.y + t.rect.h,
                    "cx": t.rect.x + t.rect.w / 2.0,
                    "cy": t.rect.y + t.rect.h / 2.0,
                })
            })
            .collect();

        let x_scale = json!({ "domain": [0, self.width], "nice": false, "zero": false });
        let y_scale = json!({ "domain": [0, self.height], "nice": false, "zero": false, "reverse": true });

        let color = if nested {
            Self::color(chart, "parent")
        } else {
            let mut c = json!({ "field": "value", "type": "quantitative" });
            if let Some(scheme) = &chart.options.color_scheme {
                c["scale"] = json!({ "scheme": scheme });
            }
            c
        };

        let mut layers = vec![json!({
            "mark": { "type": "rect", "stroke": "white", "strokeWidth": 2 },
            "encoding": {
                "x": { "field": "x", "type": "quantitative", "scale": x_scale, "axis": null },
                "x2": { "field": "x2" },
                "y": { "field": "y", "type": "quantitative", "scale": y_scale, "axis": null },
                "y2": { "field": "y2" },
                "color": color,
                "tooltip": [
                    { "field": "label", "type": "nominal" },
                    { "field": "value", "type": "quantitative", "format": ",.2f" },
                ],
            },
        })];
        if chart.options.value_labels {
            layers.push(json!({
                "mark": { "type": "text", "baseline": "middle" },
                "encoding": {
                    "x": { "field": "cx", "type": "quantitative", "scale": x_scale, "axis": null },
                    "y": { "field": "cy", "type": "quantitative", "scale": y_scale, "axis": null },
                    "text": { "field": "label", "type": "nominal" },
                },
            }));
        }

        json!({
            "data": { "values": values },
            "layer": layers,
            "view": { "stroke": null },
        })
    }

    fn heatmap(&self, chart: &ChartSpec, matrix: &CorrelationMatrix) -> Value {
        let mut values = Vec::with_capacity(matrix.columns.len() * matrix.columns.len());
        for (r, row_name) in matrix.columns.iter().enumerate() {
            for (c, col_name) in matrix.columns.iter().enumerate() {
                values.push(json!({
                    "row": row_name,
                    "column": col_name,
                    "value": matrix.get(r, c),
                }));
            }
        }

        let scheme = chart.options.color_scheme.as_deref().unwrap_or("redblue");
        let order = &matrix.columns;
        let mut layers = vec![json!({
            "mark": "rect",
            "encoding": {
                "x": { "field": "column", "type": "nominal", "sort": order, "title": null },
                "y": { "field": "row", "type": "nominal", "sort": order, "title": null },
                "color": {
                    "field": "value",
                    "type": "quantitative",
                    "scale": { "scheme": scheme, "domain": [-1, 1], "reverse": true },
                },
            },
        })];
        if chart.options.value_labels {
            layers.push(json!({
                "mark": "text",
                "encoding": {
                    "x": { "field": "column", "type": "nominal", "sort": order },
                    "y": { "field": "row", "type": "nominal", "sort": order },
                    "text": { "field": "value", "type": "quantitative", "format": ".2f" },
                },
            }));
        }

        json!({
            "data": { "values": values },
            "layer": layers,
        })
    }
}

fn data_name(data: &ChartData) -> &'static str {
    match data {
        ChartData::Categories(_) => "category",
        ChartData::TimeSeries(_) => "time series",
        ChartData::Histogram(_) => "histogram",
        ChartData::Boxes(_) => "box summary",
        ChartData::Stacked(_) => "stacked",
        ChartData::Hierarchy(_) => "hierarchy",
        ChartData::Matrix(_) => "matrix",
    }
}

impl Writer for VegaLiteWriter {
    /// One spec per chart, in page order. The advisory page has none.
    type Output = Vec<Value>;

    fn write(&self, page: &Page) -> Result<Self::Output> {
        match page.report() {
            None => Ok(Vec::new()),
            Some(report) => report.charts.iter().map(|c| self.chart(c)).collect(),
        }
    }
}
