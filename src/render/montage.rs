//! Several rendered levels laid out in a grid within one document

use super::svg::{LevelSvg, f};
use std::collections::BTreeMap;

/// Lay `levels` out row-major in `columns` columns separated by `gap`.
///
/// Each column is as wide as its widest level and each row as tall as its
/// tallest. Returns `None` when there is nothing to lay out.
pub fn montage(levels: &[LevelSvg], columns: usize, gap: f64) -> Option<LevelSvg> {
    let first = levels.first()?;
    let columns = columns.clamp(1, levels.len());
    let rows = levels.len().div_ceil(columns);

    let mut col_w = vec![0.0f64; columns];
    let mut row_h = vec![0.0f64; rows];
    for (i, level) in levels.iter().enumerate() {
        col_w[i % columns] = col_w[i % columns].max(level.width);
        row_h[i / columns] = row_h[i / columns].max(level.height);
    }

    let offsets = |sizes: &[f64]| -> Vec<f64> {
        sizes
            .iter()
            .scan(0.0, |acc, size| {
                let at = *acc;
                *acc += size + gap;
                Some(at)
            })
            .collect()
    };
    let col_x = offsets(&col_w);
    let row_y = offsets(&row_h);

    let mut defs = BTreeMap::new();
    let mut body = String::new();
    let mut warnings = Vec::new();

    for (i, level) in levels.iter().enumerate() {
        for (id, def) in &level.defs {
            defs.entry(id.clone()).or_insert_with(|| def.clone());
        }
        warnings.extend(level.warnings.iter().cloned());

        body.push_str(&format!(
            "  <svg x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-size=\"{}pt\">\n",
            f(col_x[i % columns]),
            f(row_y[i / columns]),
            f(level.width),
            f(level.height),
            f(level.width),
            f(level.height),
            level.font_size
        ));
        body.push_str(&level.body);
        body.push_str("  </svg>\n");
    }

    let total = |sizes: &[f64]| sizes.iter().sum::<f64>() + gap * (sizes.len() - 1) as f64;

    Some(LevelSvg {
        width: total(&col_w),
        height: total(&row_h),
        font_size: first.font_size,
        defs,
        body,
        warnings,
    })
}
