use std::fmt::{self, Display};

use crate::Problem;

const INDENT: &str = "    ";

/// Displays a problem as an XCSP 2.1 instance with a single `global:weightedSum` constraint. The
/// domain and variable names are the same as in the Sugar CSP rendering.
pub struct Xcsp<'a>(pub &'a Problem);

impl Display for Xcsp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let problem = self.0;
        let arity = problem.num_variables();

        writeln!(f, r#"<?xml version="1.0" ?>"#)?;
        writeln!(f, "<instance>")?;
        writeln!(
            f,
            r#"{INDENT}<presentation format="XCSP 2.1" maxConstraintArity="{arity}" nbSolutions="?" type="CSP"/>"#
        )?;

        writeln!(
            f,
            r#"{INDENT}<domains nbDomains="{}">"#,
            problem.domains().count()
        )?;
        for (id, domain) in problem.domains() {
            write!(
                f,
                r#"{INDENT}{INDENT}<domain name="{id}" nbValues="{}">"#,
                domain.len()
            )?;
            for (idx, value) in domain.values().enumerate() {
                if idx > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{value}")?;
            }
            writeln!(f, "</domain>")?;
        }
        writeln!(f, "{INDENT}</domains>")?;

        writeln!(f, r#"{INDENT}<variables nbVariables="{arity}">"#)?;
        for variable in problem.variables() {
            writeln!(
                f,
                r#"{INDENT}{INDENT}<variable domain="{}" name="{}"/>"#,
                variable.domain, variable.id
            )?;
        }
        writeln!(f, "{INDENT}</variables>")?;

        writeln!(f, r#"{INDENT}<constraints nbConstraints="1">"#)?;
        write!(
            f,
            r#"{INDENT}{INDENT}<constraint arity="{arity}" name="C0" reference="global:weightedSum" scope=""#
        )?;
        for (idx, variable) in problem.variables().iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", variable.id)?;
        }
        writeln!(f, r#"">"#)?;

        writeln!(f, "{INDENT}{INDENT}{INDENT}<parameters>")?;
        write!(f, "{INDENT}{INDENT}{INDENT}{INDENT}[")?;
        for variable in problem.variables() {
            write!(f, " {{ 1 {} }}", variable.id)?;
        }
        writeln!(f, " ]")?;
        writeln!(f, "{INDENT}{INDENT}{INDENT}{INDENT}<eq/>")?;
        writeln!(f, "{INDENT}{INDENT}{INDENT}{INDENT}{}", problem.target())?;
        writeln!(f, "{INDENT}{INDENT}{INDENT}</parameters>")?;
        writeln!(f, "{INDENT}{INDENT}</constraint>")?;
        writeln!(f, "{INDENT}</constraints>")?;
        writeln!(f, "</instance>")
    }
}
