// src/contours.rs
//
// Connected-component extraction over a binary mask. This is the one
// classical-CV primitive the boundary extractor depends on: each blob
// carries its pixel area and bounding rect, which is all the stripe
// qualification rules need.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Blob {
    pub area: u32,
    pub rect: Rect,
}

/// Label 8-connected foreground components of `mask` (non-zero = set).
///
/// Iterative flood fill with an explicit stack; mask dimensions up to a
/// few megapixels stay well inside the per-frame budget.
pub fn find_blobs(mask: &[u8], width: usize, height: usize) -> Vec<Blob> {
    debug_assert_eq!(mask.len(), width * height);

    let mut visited = vec![false; width * height];
    let mut blobs = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            let start_idx = start_y * width + start_x;
            if mask[start_idx] == 0 || visited[start_idx] {
                continue;
            }

            let mut area: u32 = 0;
            let mut min_x = start_x;
            let mut max_x = start_x;
            let mut min_y = start_y;
            let mut max_y = start_y;

            visited[start_idx] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                area += 1;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                let x0 = x.saturating_sub(1);
                let y0 = y.saturating_sub(1);
                let x1 = (x + 1).min(width - 1);
                let y1 = (y + 1).min(height - 1);

                for ny in y0..=y1 {
                    for nx in x0..=x1 {
                        let nidx = ny * width + nx;
                        if mask[nidx] != 0 && !visited[nidx] {
                            visited[nidx] = true;
                            stack.push((nx, ny));
                        }
                    }
                }
            }

            blobs.push(Blob {
                area,
                rect: Rect {
                    x: min_x as u32,
                    y: min_y as u32,
                    width: (max_x - min_x + 1) as u32,
                    height: (max_y - min_y + 1) as u32,
                },
            });
        }
    }

    blobs
}
