//! Fragment formatting
//!
//! Turns emitted fragments into source text. The emitter never decides on
//! indentation or line endings; a formatter does.

use crate::fragment::Fragment;

/// Renders fragments into text
pub trait Formatter {
    /// Text of one fragment, each line terminated by a newline
    fn format(&self, fragment: &Fragment) -> String;

    /// Text of a whole fragment sequence, in order
    fn render(&self, fragments: &[Fragment]) -> String {
        fragments.iter().map(|f| self.format(f)).collect()
    }
}

/// C formatter with space indentation
#[derive(Debug, Clone)]
pub struct CFormatter {
    indent_width: usize,
}

impl CFormatter {
    pub fn new(indent_width: usize) -> Self {
        Self { indent_width }
    }
}

impl Default for CFormatter {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Formatter for CFormatter {
    fn format(&self, fragment: &Fragment) -> String {
        let base = fragment.depth();
        let mut out = String::new();
        for (depth, line) in fragment.lines() {
            if !line.is_empty() {
                out.push_str(&" ".repeat((base + depth) * self.indent_width));
                out.push_str(&line);
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::EntryParams;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_indents_by_depth() {
        let fragments = vec![
            Fragment::EntryBegin {
                name: "m_f".to_string(),
                params: EntryParams::Fixed(vec![]),
            },
            Fragment::Raw("return mp_const_none;".to_string()),
            Fragment::BlockEnd,
            Fragment::Blank,
        ];

        let text = CFormatter::default().render(&fragments);
        assert_eq!(text, "static mp_obj_t m_f(void) {\n    return mp_const_none;\n}\n\n");

        let text = CFormatter::new(2).render(&fragments);
        assert_eq!(text, "static mp_obj_t m_f(void) {\n  return mp_const_none;\n}\n\n");
    }

    #[test]
    fn test_multi_line_fragment_nests() {
        let layout = Fragment::InstanceLayout {
            name: "m_C_obj_t".to_string(),
        };
        assert_eq!(
            CFormatter::new(2).format(&layout),
            "typedef struct _m_C_obj_t {\n  mp_obj_base_t base;\n} m_C_obj_t;\n"
        );
    }
}
