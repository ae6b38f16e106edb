//! Presentación en texto de la tabla de `show`.

use indexmap::IndexSet;
use reg_core::ShowRow;
use serde_json::Value;

pub fn format_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "-".into(),
        other => other.to_string(),
    }
}

pub fn format_metric(v: f64) -> String {
    format!("{v:.5}")
}

fn label(row: &ShowRow) -> String {
    let id = if row.queued {
        format!("queued:{}", row.id.get(..8).unwrap_or(&row.id))
    } else if row.is_workspace() && row.dirty {
        format!("{}*", row.id)
    } else {
        row.id.clone()
    };
    match &row.name {
        Some(n) => format!("{id} ({n})"),
        None => id,
    }
}

/// Tabla alineada: experimento, fecha, métricas y parámetros.
pub fn show_table(rows: &[ShowRow]) -> String {
    let metrics: IndexSet<&String> = rows.iter().flat_map(|r| r.metrics.keys()).collect();
    let params: IndexSet<&String> = rows.iter().flat_map(|r| r.params.keys()).collect();

    let mut header = vec!["Experiment".to_string(), "Created".to_string()];
    header.extend(metrics.iter().map(|k| k.to_string()));
    header.extend(params.iter().map(|k| k.to_string()));

    let mut table = vec![header];
    for r in rows {
        let mut line = vec![label(r),
                            r.created_at
                             .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                             .unwrap_or_else(|| "-".into())];
        line.extend(metrics.iter()
                           .map(|k| r.metrics.get(*k).map(|v| format_metric(*v)).unwrap_or_else(|| "-".into())));
        line.extend(params.iter()
                          .map(|k| r.params.get(*k).map(format_value).unwrap_or_else(|| "-".into())));
        table.push(line);
    }

    let widths: Vec<usize> = (0..table[0].len()).map(|c| table.iter().map(|l| l[c].chars().count()).max().unwrap_or(0))
                                                .collect();
    let mut out = String::new();
    for line in &table {
        let cells: Vec<String> = line.iter()
                                     .zip(&widths)
                                     .map(|(cell, w)| format!("{cell:<w$}", w = *w))
                                     .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}
