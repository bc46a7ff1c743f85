use featsel_data::chromosome::Chromosome;

/// Renders `mask` as rows of `width` cells, `X` for selected bits and a space otherwise.
///
/// Useful when features are pixels of a square image (8 for 8x8 digits).
pub fn render_grid(mask: &Chromosome, width: usize) -> String {
    let width = width.max(1);
    let mut out = String::with_capacity(mask.len() + mask.len() / width + 1);
    for i in 0..mask.len() {
        out.push(if mask.get(i) { 'X' } else { ' ' });
        if (i + 1) % width == 0 {
            out.push('\n');
        }
    }
    if mask.len() % width != 0 {
        out.push('\n');
    }
    out
}
