use std::fmt::{self, Display};

use crate::Problem;

/// Displays a problem in the Sugar CSP format:
///
/// ```text
/// (domain D1 (1 2 3))
/// (int V1 D1)
/// (int V2 D1)
/// (weightedsum ( ( 1 V1 ) ( 1 V2 ) ) eq 4)
/// ```
///
/// Domains come first in order of discovery, then one declaration per variable, then the single
/// constraint. There is no newline after the constraint.
pub struct SugarCsp<'a>(pub &'a Problem);

impl Display for SugarCsp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let problem = self.0;

        for (id, domain) in problem.domains() {
            write!(f, "(domain {id} (")?;
            for (idx, value) in domain.values().enumerate() {
                if idx > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{value}")?;
            }
            writeln!(f, "))")?;
        }

        for variable in problem.variables() {
            writeln!(f, "(int {} {})", variable.id, variable.domain)?;
        }

        f.write_str("(weightedsum (")?;
        for variable in problem.variables() {
            write!(f, " ( 1 {} )", variable.id)?;
        }
        write!(f, " ) eq {})", problem.target())
    }
}
