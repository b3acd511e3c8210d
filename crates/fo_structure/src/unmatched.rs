use crate::PairTable;
use crate::StructureError;

/// Maximal runs of unpaired positions in the closed interval `[from, to]`,
/// as inclusive `(start, end)` ranges in 5'→3' order.
///
/// An empty interval (`from > to`) has no runs. A non-empty interval must
/// lie within `[1, n]`.
pub fn find_unmatched(pt: &PairTable, from: usize, to: usize) -> Result<Vec<(usize, usize)>, StructureError> {
    if from > to {
        return Ok(Vec::new());
    }
    let n = pt.length();
    if from == 0 || to > n {
        return Err(StructureError::InvalidRange { from, to, len: n });
    }

    let mut runs = Vec::new();
    let mut start = None;
    for k in from..=to {
        match (pt[k], start) {
            (0, None) => start = Some(k),
            (0, Some(_)) => (),
            (_, Some(s)) => {
                runs.push((s, k - 1));
                start = None;
            }
            (_, None) => (),
        }
    }
    if let Some(s) = start {
        runs.push((s, to));
    }
    Ok(runs)
}

/// Split ranges so that none of them contains a strand break. A break `b`
/// separates nucleotide b from b + 1.
pub fn split_at_breaks(runs: &[(usize, usize)], breaks: &[usize]) -> Vec<(usize, usize)> {
    let mut out = Vec::with_capacity(runs.len());
    for &(start, end) in runs {
        let mut s = start;
        for &b in breaks.iter().filter(|&&b| b >= start && b < end) {
            out.push((s, b));
            s = b + 1;
        }
        out.push((s, end));
    }
    out.sort_unstable();
    out
}
