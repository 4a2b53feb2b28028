//! ASCII line charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal or a log
//! - deterministic output (helpful for golden tests)
//!
//! Each line gets a glyph by position (`*`, `+`, `o`, ...); undefined cells
//! leave gaps because segments are drawn independently.

use crate::chart::{ChartSpec, format_x};

const GLYPHS: [char; 6] = ['*', '+', 'o', 'x', '#', '%'];

/// Render `spec` into a `width` × `height` character grid with a title,
/// value range, legend and source note.
pub fn render_ascii_chart(spec: &ChartSpec, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", spec.title, spec.unit_label));

    let Some(([x_min, x_max], [y_min, y_max])) = spec.bounds() else {
        out.push_str("(no data)\n");
        return out;
    };

    let mut grid = vec![vec![' '; width]; height];
    for (pos, line) in spec.lines.iter().enumerate() {
        let glyph = GLYPHS[pos % GLYPHS.len()];
        for seg in spec.visible_segments(line) {
            let cells: Vec<(usize, usize)> = seg
                .iter()
                .map(|&(x, y)| (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height)))
                .collect();
            if let [(x, y)] = cells.as_slice() {
                grid[*y][*x] = glyph;
            }
            for pair in cells.windows(2) {
                draw_line(&mut grid, pair[0], pair[1], glyph);
            }
        }
    }

    out.push_str(&format!(
        "y=[{}, {}] | x=[{}, {}]\n",
        spec.format_y(y_min),
        spec.format_y(y_max),
        format_x(x_min),
        format_x(x_max)
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let legend: Vec<String> = spec
        .lines
        .iter()
        .enumerate()
        .map(|(pos, l)| format!("{} {}", GLYPHS[pos % GLYPHS.len()], l.label))
        .collect();
    out.push_str(&legend.join("   "));
    out.push('\n');
    out.push_str(spec.source);
    out.push('\n');
    out
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham). Later lines overwrite earlier ones.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            grid[y0 as usize][x0 as usize] = ch;
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
