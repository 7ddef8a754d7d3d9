//! Line diff between two saved scenes, for showing what a fix changed

/// Unchanged lines kept around each change
const CONTEXT: usize = 2;

/// Diff two scene TOML strings.
///
/// Output lines are prefixed with `+ `, `- ` or two spaces for context; runs
/// of unchanged lines beyond the context are collapsed to `...`. Identical
/// inputs give an empty string.
pub fn diff_scene_text(before: &str, after: &str) -> String {
    let old: Vec<&str> = before.lines().collect();
    let new: Vec<&str> = after.lines().collect();
    let ops = line_ops(&old, &new);

    if ops.iter().all(|op| matches!(op, Op::Same(_))) {
        return String::new();
    }

    let changed: Vec<bool> = ops.iter().map(|op| !matches!(op, Op::Same(_))).collect();
    let near_change = |i: usize| {
        let lo = i.saturating_sub(CONTEXT);
        let hi = (i + CONTEXT).min(ops.len() - 1);
        changed[lo..=hi].iter().any(|&c| c)
    };

    let mut out = String::new();
    let mut skipped = false;
    for (i, op) in ops.iter().enumerate() {
        match op {
            Op::Same(line) if near_change(i) => {
                out.push_str(&format!("  {}\n", line));
                skipped = false;
            }
            Op::Same(_) => {
                if !skipped {
                    out.push_str("...\n");
                    skipped = true;
                }
            }
            Op::Removed(line) => {
                out.push_str(&format!("- {}\n", line));
                skipped = false;
            }
            Op::Added(line) => {
                out.push_str(&format!("+ {}\n", line));
                skipped = false;
            }
        }
    }
    out
}

enum Op<'a> {
    Same(&'a str),
    Removed(&'a str),
    Added(&'a str),
}

/// Longest-common-subsequence edit script
fn line_ops<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<Op<'a>> {
    let (n, m) = (old.len(), new.len());
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(Op::Same(old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(Op::Removed(old[i]));
            i += 1;
        } else {
            ops.push(Op::Added(new[j]));
            j += 1;
        }
    }
    ops.extend(old[i..].iter().map(|line| Op::Removed(line)));
    ops.extend(new[j..].iter().map(|line| Op::Added(line)));
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_is_empty() {
        let content = "[scene]\nname = \"test\"\n";
        assert_eq!(diff_scene_text(content, content), "");
    }

    #[test]
    fn test_changed_line() {
        let before = "[scene]\nname = \"test\"\n\n[[node]]\nscale = [-1.0, 1.0, 1.0]\n";
        let after = "[scene]\nname = \"test\"\n\n[[node]]\nscale = [1.0, 1.0, 1.0]\n";
        let diff = diff_scene_text(before, after);
        assert!(diff.contains("- scale = [-1.0, 1.0, 1.0]"));
        assert!(diff.contains("+ scale = [1.0, 1.0, 1.0]"));
        assert!(diff.contains("  [[node]]"));
    }

    #[test]
    fn test_far_context_is_collapsed() {
        let before: String = (0..20).map(|i| format!("line{i}\n")).collect();
        let after = before.replace("line10\n", "changed\n");
        let diff = diff_scene_text(&before, &after);
        assert!(diff.starts_with("...\n"));
        assert!(diff.contains("  line8\n"));
        assert!(!diff.contains("line7\n"));
        assert!(diff.contains("- line10\n+ changed\n"));
    }

    #[test]
    fn test_added_and_removed_tail() {
        assert_eq!(diff_scene_text("a\n", "a\nb\n"), "  a\n+ b\n");
        assert_eq!(diff_scene_text("a\nb\n", "a\n"), "  a\n- b\n");
    }
}
